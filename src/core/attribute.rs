//! Attribute definitions for node inputs, outputs and state.
//!
//! Attributes define the interface of a node: what data it reads, what it
//! produces and what it keeps between evaluations. Each attribute has one
//! type (or a set of alternative types) plus optional default and range
//! values whose JSON shape must fit that type.

use crate::core::types::{TypeToken, ValueShape};
use indexmap::{IndexMap, IndexSet};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Attribute section of a node definition.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Section {
    Inputs,
    Outputs,
    State,
}

impl Section {
    /// Sections in document order.
    pub const ALL: [Section; 3] = [Section::Inputs, Section::Outputs, Section::State];

    /// Key of the section in a node definition.
    pub fn as_str(&self) -> &'static str {
        match self {
            Section::Inputs => "inputs",
            Section::Outputs => "outputs",
            Section::State => "state",
        }
    }
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where attribute (or node) data lives.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum MemoryType {
    Cpu,
    Cuda,
    Any,
}

impl MemoryType {
    /// Parse a descriptor keyword.
    pub fn from_keyword(keyword: &str) -> Option<Self> {
        match keyword {
            "cpu" => Some(MemoryType::Cpu),
            "cuda" => Some(MemoryType::Cuda),
            "any" => Some(MemoryType::Any),
            _ => None,
        }
    }
}

/// The declared type of an attribute.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttributeType {
    /// `"type": "float"`
    Single(TypeToken),
    /// `"type": ["float", "double"]`, deduplicated, input order kept.
    AnyOf(IndexSet<TypeToken>),
}

impl AttributeType {
    /// Every member type.
    pub fn tokens(&self) -> Vec<TypeToken> {
        match self {
            AttributeType::Single(token) => vec![*token],
            AttributeType::AnyOf(set) => set.iter().copied().collect(),
        }
    }

    /// Whether the attribute accepts more than one concrete type.
    pub fn is_polymorphic(&self) -> bool {
        match self {
            AttributeType::Single(token) => !token.is_concrete(),
            AttributeType::AnyOf(set) => set.len() > 1 || set.iter().any(|t| !t.is_concrete()),
        }
    }

    /// Whether a literal value fits at least one member type.
    pub fn accepts_value(&self, value: &Value) -> bool {
        self.tokens().iter().any(|t| t.value_shape().matches(value))
    }

    /// Whether a range bound fits at least one member type.
    pub fn accepts_range(&self, value: &Value) -> bool {
        self.tokens()
            .iter()
            .any(|t| t.value_shape().range_shape().matches(value))
    }

    /// Expected value shapes, for messages.
    pub fn describe_shapes(&self, range: bool) -> String {
        let mut shapes: Vec<ValueShape> = Vec::new();
        for token in self.tokens() {
            let shape = token.value_shape();
            let shape = if range { shape.range_shape().clone() } else { shape };
            if !shapes.contains(&shape) {
                shapes.push(shape);
            }
        }
        shapes
            .iter()
            .map(|s| s.to_string())
            .collect::<Vec<_>>()
            .join(" or ")
    }
}

impl fmt::Display for AttributeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttributeType::Single(token) => write!(f, "{}", token),
            AttributeType::AnyOf(set) => {
                let names: Vec<String> = set.iter().map(|t| t.to_string()).collect();
                write!(f, "[{}]", names.join(", "))
            }
        }
    }
}

/// Open-ended attribute metadata.
///
/// Arbitrary keys are kept verbatim; a handful of reserved keys have typed
/// accessors.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AttributeMetadata(pub IndexMap<String, Value>);

impl AttributeMetadata {
    pub const ALLOWED_TOKENS: &'static str = "allowedTokens";
    pub const ALLOW_MULTI_INPUTS: &'static str = "allowMultiInputs";
    pub const HIDDEN: &'static str = "hidden";
    pub const INTERNAL: &'static str = "internal";
    pub const LITERAL_ONLY: &'static str = "literalOnly";
    pub const OUTPUT_ONLY: &'static str = "outputOnly";

    /// Raw value for a key.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// String form generators store: list values are comma-joined.
    pub fn get_joined(&self, key: &str) -> Option<String> {
        match self.0.get(key)? {
            Value::String(s) => Some(s.clone()),
            Value::Array(items) => Some(
                items
                    .iter()
                    .map(|item| match item {
                        Value::String(s) => s.clone(),
                        other => other.to_string(),
                    })
                    .collect::<Vec<_>>()
                    .join(","),
            ),
            other => Some(other.to_string()),
        }
    }

    /// Tokens an input accepts, mapped to their display names.
    pub fn allowed_tokens(&self) -> Option<IndexMap<String, String>> {
        allowed_tokens_of(self.0.get(Self::ALLOWED_TOKENS)?)
    }

    pub fn allow_multi_inputs(&self) -> bool {
        self.flag(Self::ALLOW_MULTI_INPUTS)
    }

    pub fn hidden(&self) -> bool {
        self.flag(Self::HIDDEN)
    }

    pub fn internal(&self) -> bool {
        self.flag(Self::INTERNAL)
    }

    pub fn literal_only(&self) -> bool {
        self.flag(Self::LITERAL_ONLY)
    }

    pub fn output_only(&self) -> bool {
        self.flag(Self::OUTPUT_ONLY)
    }

    fn flag(&self, key: &str) -> bool {
        self.0.get(key).and_then(flag_value).unwrap_or(false)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Boolean-ish metadata values: `"1"`, `"0"`, `"true"`, `"false"` or a bool.
pub fn flag_value(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(b) => Some(*b),
        Value::String(s) => match s.as_str() {
            "1" | "true" => Some(true),
            "0" | "false" => Some(false),
            _ => None,
        },
        _ => None,
    }
}

/// `allowedTokens` may be a comma string, a list, or a token → name mapping.
pub fn allowed_tokens_of(value: &Value) -> Option<IndexMap<String, String>> {
    match value {
        Value::String(s) => Some(
            s.split(',')
                .map(str::trim)
                .filter(|t| !t.is_empty())
                .map(|t| (t.to_string(), t.to_string()))
                .collect(),
        ),
        Value::Array(items) => items
            .iter()
            .map(|item| item.as_str().map(|t| (t.to_string(), t.to_string())))
            .collect(),
        Value::Object(map) => map
            .iter()
            .map(|(k, v)| v.as_str().map(|name| (k.clone(), name.to_string())))
            .collect(),
        _ => None,
    }
}

/// A validated input, output or state attribute.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Attribute {
    /// Name within its section.
    pub name: String,
    pub description: String,
    #[serde(rename = "type")]
    pub attr_type: AttributeType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
    #[serde(default)]
    pub optional: bool,
    /// Deprecation notes; empty when the attribute is current.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub deprecated: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub memory_type: Option<MemoryType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub minimum: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub maximum: Option<Value>,
    #[serde(default, skip_serializing_if = "AttributeMetadata::is_empty")]
    pub metadata: AttributeMetadata,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ui_name: Option<String>,
    #[serde(default)]
    pub unvalidated: bool,
}

impl Attribute {
    /// Create an attribute with a single type.
    pub fn new(name: impl Into<String>, token: TypeToken) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            attr_type: AttributeType::Single(token),
            default: None,
            optional: false,
            deprecated: Vec::new(),
            memory_type: None,
            minimum: None,
            maximum: None,
            metadata: AttributeMetadata::default(),
            ui_name: None,
            unvalidated: false,
        }
    }

    /// Set the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Set the default value.
    pub fn with_default(mut self, value: Value) -> Self {
        self.default = Some(value);
        self
    }

    /// Whether the attribute is being phased out.
    pub fn is_deprecated(&self) -> bool {
        !self.deprecated.is_empty()
    }

    /// Name shown in UIs: `uiName` when given, otherwise derived from the name.
    pub fn display_name(&self) -> String {
        match &self.ui_name {
            Some(name) => name.clone(),
            None => name_to_display(&self.name),
        }
    }
}

/// Convert camelCase or snake_case names to Title Case.
fn name_to_display(name: &str) -> String {
    let mut words: Vec<String> = Vec::new();
    let mut current = String::new();
    for c in name.chars() {
        if c == '_' {
            if !current.is_empty() {
                words.push(std::mem::take(&mut current));
            }
        } else if c.is_uppercase() && !current.is_empty() {
            words.push(std::mem::take(&mut current));
            current.push(c);
        } else {
            current.push(c);
        }
    }
    if !current.is_empty() {
        words.push(current);
    }

    words
        .iter()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                None => String::new(),
                Some(first) => first.to_uppercase().chain(chars).collect(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}
