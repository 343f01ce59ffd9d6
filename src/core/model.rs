//! Normalized model serialization.
//!
//! The normalized model is the only artifact handed to downstream tooling
//! (schema publishers, code generators), so it round-trips through JSON.

use crate::core::node::NodeDefinition;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Validated node definitions keyed by node type name, in document order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedModel {
    /// Model format version
    pub version: String,
    /// All node definitions
    pub nodes: IndexMap<String, NodeDefinition>,
}

impl Default for NormalizedModel {
    fn default() -> Self {
        Self::new()
    }
}

impl NormalizedModel {
    /// Current format version.
    pub const VERSION: &'static str = "1.0.0";

    /// Create an empty model.
    pub fn new() -> Self {
        Self {
            version: Self::VERSION.to_string(),
            nodes: IndexMap::new(),
        }
    }

    /// Commit a node definition.
    pub fn insert(&mut self, node: NodeDefinition) {
        self.nodes.insert(node.name.clone(), node);
    }

    /// Look up a node by type name.
    pub fn get(&self, name: &str) -> Option<&NodeDefinition> {
        self.nodes.get(name)
    }

    /// Whether a node with this name was committed.
    pub fn contains(&self, name: &str) -> bool {
        self.nodes.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Node definitions in document order.
    pub fn iter(&self) -> impl Iterator<Item = &NodeDefinition> {
        self.nodes.values()
    }

    /// Serialize to JSON string.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Deserialize from JSON string.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Serialize to compact JSON (no whitespace).
    pub fn to_json_compact(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::attribute::Attribute;
    use crate::core::types::TypeToken;
    use serde_json::json;

    #[test]
    fn test_serialize_model() {
        let mut node = NodeDefinition::new("Add");
        node.ui_name = "Add".to_string();
        node.description = vec!["Adds things".to_string()];
        node.categories = vec!["math".to_string()];
        node.inputs.insert(
            "a".to_string(),
            Attribute::new("a", TypeToken::parse("float[3]").unwrap())
                .with_description("First")
                .with_default(json!([1, 2, 3])),
        );

        let mut model = NormalizedModel::new();
        model.insert(node);

        let text = model.to_json().unwrap();
        assert!(text.contains("\"float[3]\""));
        assert!(text.contains("\"uiName\": \"Add\""));

        let back = NormalizedModel::from_json(&text).unwrap();
        assert_eq!(back, model);
        assert!(back.contains("Add"));
        assert_eq!(back.len(), 1);
    }
}
