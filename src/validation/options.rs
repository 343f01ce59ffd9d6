//! Validation options.
//!
//! Options can be built in code or loaded from a TOML file; every key is
//! optional and falls back to the defaults below.
//!
//! ```toml
//! strict = true
//! require_node_metadata = false
//! parallel = true
//! max_threads = 4
//!
//! [default_icon_colors]
//! color = "#FF00FF00"
//! backgroundColor = [0, 0, 0, 0]
//! ```

use crate::core::error::OgnResult;
use crate::core::icon::IconColors;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Validation options.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationOptions {
    /// Colors for icons that omit them (and for the bare-path shorthand).
    pub default_icon_colors: IconColors,
    /// Whether an entry without `metadata` is an error.
    pub require_node_metadata: bool,
    /// Whether warnings reject a document too.
    pub strict: bool,
    /// Whether batches run on the rayon pool.
    pub parallel: bool,
    /// Maximum number of batch threads (0 = use all available).
    pub max_threads: usize,
}

impl Default for ValidationOptions {
    fn default() -> Self {
        Self {
            default_icon_colors: IconColors::default(),
            require_node_metadata: true,
            strict: false,
            parallel: true,
            max_threads: 0,
        }
    }
}

impl ValidationOptions {
    /// Create a new options builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Require (or not) node-level metadata.
    pub fn with_required_metadata(mut self, required: bool) -> Self {
        self.require_node_metadata = required;
        self
    }

    /// Enable/disable strict acceptance.
    pub fn with_strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    /// Enable/disable parallel batches.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Set maximum threads.
    pub fn with_max_threads(mut self, max: usize) -> Self {
        self.max_threads = max;
        self
    }

    /// Parse options from TOML text.
    pub fn from_toml_str(text: &str) -> OgnResult<Self> {
        Ok(toml::from_str(text)?)
    }

    /// Load options from a TOML file.
    pub fn from_toml_file(path: impl AsRef<Path>) -> OgnResult<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::icon::Color;
    use std::io::Write;

    #[test]
    fn test_empty_toml_is_default() {
        let options = ValidationOptions::from_toml_str("").unwrap();
        assert_eq!(options, ValidationOptions::default());
    }

    #[test]
    fn test_partial_toml() {
        let options = ValidationOptions::from_toml_str(
            r##"
            strict = true
            [default_icon_colors]
            color = "#FF0000FF"
            "##,
        )
        .unwrap();
        assert!(options.strict);
        assert!(options.require_node_metadata);
        assert_eq!(options.default_icon_colors.color, Color::new(255, 0, 0, 255));
        assert_eq!(options.default_icon_colors.border_color, Color::TRANSPARENT);
    }

    #[test]
    fn test_bad_toml() {
        assert!(ValidationOptions::from_toml_str("strict = \"yes\"").is_err());
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "parallel = false\nmax_threads = 2").unwrap();
        let options = ValidationOptions::from_toml_file(file.path()).unwrap();
        assert!(!options.parallel);
        assert_eq!(options.max_threads, 2);
    }

    #[test]
    fn test_builder() {
        let options = ValidationOptions::new()
            .with_strict(true)
            .with_required_metadata(false)
            .with_parallel(false)
            .with_max_threads(3);
        assert!(options.strict);
        assert!(!options.require_node_metadata);
        assert_eq!(options.max_threads, 3);
    }
}
