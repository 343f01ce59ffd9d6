//! Node icon description.
//!
//! Descriptor files give either a bare icon path or an object with a path and
//! three colors. Colors are written as `#AABBGGRR` hex strings or as
//! `[r, g, b, a]` integer lists; both normalize to [`Color`].

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// RGBA color value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    /// Create a new color from RGBA components.
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Parse a descriptor hex color.
    ///
    /// Exactly `#` followed by 8 hex digits, in `AABBGGRR` byte order.
    pub fn from_hex(hex: &str) -> Result<Self, String> {
        let digits = hex
            .strip_prefix('#')
            .ok_or_else(|| format!("hex color '{}' must start with '#'", hex))?;
        if hex.len() != 9 || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(format!(
                "hex color '{}' must be '#' followed by exactly 8 hex digits",
                hex
            ));
        }

        let byte = |i: usize| u8::from_str_radix(&digits[i..i + 2], 16).map_err(|e| e.to_string());
        Ok(Self {
            a: byte(0)?,
            b: byte(2)?,
            g: byte(4)?,
            r: byte(6)?,
        })
    }

    /// Build from an `[r, g, b, a]` JSON list of integers in `0..=255`.
    pub fn from_components(value: &serde_json::Value) -> Result<Self, String> {
        let items = value
            .as_array()
            .filter(|items| items.len() == 4)
            .ok_or_else(|| "color list must hold exactly 4 integers".to_string())?;

        let mut channels = [0u8; 4];
        for (channel, item) in channels.iter_mut().zip(items) {
            *channel = item
                .as_u64()
                .and_then(|v| u8::try_from(v).ok())
                .ok_or_else(|| format!("color component {} is not an integer in 0..=255", item))?;
        }
        let [r, g, b, a] = channels;
        Ok(Self::new(r, g, b, a))
    }

    /// Parse either accepted JSON form.
    pub fn from_json(value: &serde_json::Value) -> Result<Self, String> {
        match value {
            serde_json::Value::String(hex) => Self::from_hex(hex),
            serde_json::Value::Array(_) => Self::from_components(value),
            _ => Err("color must be a '#AABBGGRR' string or an [r, g, b, a] list".to_string()),
        }
    }

    /// Convert to the descriptor hex form.
    pub fn to_hex(&self) -> String {
        format!("#{:02X}{:02X}{:02X}{:02X}", self.a, self.b, self.g, self.r)
    }

    pub const WHITE: Color = Color::new(255, 255, 255, 255);
    pub const TRANSPARENT: Color = Color::new(0, 0, 0, 0);
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl Serialize for Color {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Color {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = serde_json::Value::deserialize(deserializer)?;
        Color::from_json(&value).map_err(serde::de::Error::custom)
    }
}

/// Colors used when an icon omits them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct IconColors {
    pub color: Color,
    pub background_color: Color,
    pub border_color: Color,
}

impl Default for IconColors {
    fn default() -> Self {
        Self {
            color: Color::WHITE,
            background_color: Color::TRANSPARENT,
            border_color: Color::TRANSPARENT,
        }
    }
}

/// Fully expanded icon description.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IconSpec {
    pub path: String,
    pub color: Color,
    pub background_color: Color,
    pub border_color: Color,
}

impl IconSpec {
    /// Expand the bare-path shorthand.
    pub fn from_path(path: impl Into<String>, defaults: &IconColors) -> Self {
        Self {
            path: path.into(),
            color: defaults.color,
            background_color: defaults.background_color,
            border_color: defaults.border_color,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_hex_byte_order() {
        // Same color written both ways in the descriptor format docs.
        let hex = Color::from_hex("#FF123456").unwrap();
        let list = Color::from_components(&json!([86, 52, 18, 255])).unwrap();
        assert_eq!(hex, list);
        assert_eq!(hex.to_hex(), "#FF123456");
    }

    #[test]
    fn test_hex_must_be_nine_chars() {
        assert!(Color::from_hex("#FFFFFF").is_err());
        assert!(Color::from_hex("#FFFFFFFFF").is_err());
        assert!(Color::from_hex("FFFFFFFF").is_err());
        assert!(Color::from_hex("#GGFFFFFF").is_err());
        assert!(Color::from_hex("#ff3e3e3e").is_ok());
    }

    #[test]
    fn test_component_bounds() {
        assert!(Color::from_components(&json!([0, 0, 0, 256])).is_err());
        assert!(Color::from_components(&json!([0, 0, 0])).is_err());
        assert!(Color::from_components(&json!([0, 0, -1, 0])).is_err());
        assert!(Color::from_components(&json!([0.5, 0, 0, 0])).is_err());
    }

    #[test]
    fn test_shorthand_defaults() {
        let icon = IconSpec::from_path("icons/Foo.svg", &IconColors::default());
        assert_eq!(icon.path, "icons/Foo.svg");
        assert_eq!(icon.color, Color::WHITE);
        assert_eq!(icon.border_color, Color::TRANSPARENT);
    }

    #[test]
    fn test_serde_round_trip() {
        let icon = IconSpec::from_path("a.svg", &IconColors::default());
        let json = serde_json::to_value(&icon).unwrap();
        assert_eq!(json["backgroundColor"], "#00000000");
        let back: IconSpec = serde_json::from_value(json).unwrap();
        assert_eq!(back, icon);
    }
}
