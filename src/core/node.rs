//! Node definitions and their node-level vocabularies.
//!
//! A [`NodeDefinition`] is the normalized form of one entry of a descriptor
//! document: every shorthand expanded, every type string parsed.

use crate::core::attribute::{Attribute, MemoryType, Section};
use crate::core::icon::IconSpec;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Implementation language of the node's compute function.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Language {
    #[default]
    #[serde(rename = "c++")]
    Cpp,
    #[serde(rename = "python")]
    Python,
}

impl Language {
    pub fn from_keyword(keyword: &str) -> Option<Self> {
        match keyword {
            "c++" => Some(Language::Cpp),
            "python" => Some(Language::Python),
            _ => None,
        }
    }
}

/// Generated artifacts a node can opt out of.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ExcludeTarget {
    #[serde(rename = "c++")]
    Cpp,
    #[serde(rename = "docs")]
    Docs,
    #[serde(rename = "icon")]
    Icon,
    #[serde(rename = "python")]
    Python,
    #[serde(rename = "template")]
    Template,
    #[serde(rename = "tests")]
    Tests,
    #[serde(rename = "usd")]
    Usd,
}

impl ExcludeTarget {
    pub const ALL: [ExcludeTarget; 7] = [
        ExcludeTarget::Cpp,
        ExcludeTarget::Docs,
        ExcludeTarget::Icon,
        ExcludeTarget::Python,
        ExcludeTarget::Template,
        ExcludeTarget::Tests,
        ExcludeTarget::Usd,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ExcludeTarget::Cpp => "c++",
            ExcludeTarget::Docs => "docs",
            ExcludeTarget::Icon => "icon",
            ExcludeTarget::Python => "python",
            ExcludeTarget::Template => "template",
            ExcludeTarget::Tests => "tests",
            ExcludeTarget::Usd => "usd",
        }
    }

    pub fn from_keyword(keyword: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.as_str() == keyword)
    }
}

/// How CUDA array pointers are handed to the compute function.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CudaPointers {
    Cuda,
    Cpu,
}

impl CudaPointers {
    pub fn from_keyword(keyword: &str) -> Option<Self> {
        match keyword {
            "cuda" => Some(CudaPointers::Cuda),
            "cpu" => Some(CudaPointers::Cpu),
            _ => None,
        }
    }
}

/// Data class a scheduling flag talks about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SchedulingScope {
    Global,
    Static,
    Topology,
    Usd,
}

impl SchedulingScope {
    pub const ALL: [SchedulingScope; 4] = [
        SchedulingScope::Global,
        SchedulingScope::Static,
        SchedulingScope::Topology,
        SchedulingScope::Usd,
    ];
}

/// Access level of a scoped scheduling flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SchedulingAccess {
    ReadWrite,
    Read,
    Write,
}

/// Hint telling the scheduler what shared data a node touches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SchedulingFlag {
    Global,
    GlobalRead,
    GlobalWrite,
    Static,
    StaticRead,
    StaticWrite,
    Threadsafe,
    Topology,
    TopologyRead,
    TopologyWrite,
    Usd,
    UsdRead,
    UsdWrite,
    ComputeDefault,
    ComputeOnRequest,
    Pure,
}

impl SchedulingFlag {
    pub const ALL: [SchedulingFlag; 16] = [
        SchedulingFlag::Global,
        SchedulingFlag::GlobalRead,
        SchedulingFlag::GlobalWrite,
        SchedulingFlag::Static,
        SchedulingFlag::StaticRead,
        SchedulingFlag::StaticWrite,
        SchedulingFlag::Threadsafe,
        SchedulingFlag::Topology,
        SchedulingFlag::TopologyRead,
        SchedulingFlag::TopologyWrite,
        SchedulingFlag::Usd,
        SchedulingFlag::UsdRead,
        SchedulingFlag::UsdWrite,
        SchedulingFlag::ComputeDefault,
        SchedulingFlag::ComputeOnRequest,
        SchedulingFlag::Pure,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SchedulingFlag::Global => "global",
            SchedulingFlag::GlobalRead => "global-read",
            SchedulingFlag::GlobalWrite => "global-write",
            SchedulingFlag::Static => "static",
            SchedulingFlag::StaticRead => "static-read",
            SchedulingFlag::StaticWrite => "static-write",
            SchedulingFlag::Threadsafe => "threadsafe",
            SchedulingFlag::Topology => "topology",
            SchedulingFlag::TopologyRead => "topology-read",
            SchedulingFlag::TopologyWrite => "topology-write",
            SchedulingFlag::Usd => "usd",
            SchedulingFlag::UsdRead => "usd-read",
            SchedulingFlag::UsdWrite => "usd-write",
            SchedulingFlag::ComputeDefault => "compute-default",
            SchedulingFlag::ComputeOnRequest => "compute-on-request",
            SchedulingFlag::Pure => "pure",
        }
    }

    pub fn from_keyword(keyword: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|f| f.as_str() == keyword)
    }

    /// Scope and access level, for the scoped flags.
    pub fn scope(&self) -> Option<(SchedulingScope, SchedulingAccess)> {
        use SchedulingAccess::*;
        use SchedulingScope::*;
        match self {
            SchedulingFlag::Global => Some((Global, ReadWrite)),
            SchedulingFlag::GlobalRead => Some((Global, Read)),
            SchedulingFlag::GlobalWrite => Some((Global, Write)),
            SchedulingFlag::Static => Some((Static, ReadWrite)),
            SchedulingFlag::StaticRead => Some((Static, Read)),
            SchedulingFlag::StaticWrite => Some((Static, Write)),
            SchedulingFlag::Topology => Some((Topology, ReadWrite)),
            SchedulingFlag::TopologyRead => Some((Topology, Read)),
            SchedulingFlag::TopologyWrite => Some((Topology, Write)),
            SchedulingFlag::Usd => Some((Usd, ReadWrite)),
            SchedulingFlag::UsdRead => Some((Usd, Read)),
            SchedulingFlag::UsdWrite => Some((Usd, Write)),
            _ => None,
        }
    }

    /// The flag for a scope and access level.
    pub fn scoped(scope: SchedulingScope, access: SchedulingAccess) -> Self {
        Self::ALL
            .into_iter()
            .find(|f| f.scope() == Some((scope, access)))
            .unwrap_or(SchedulingFlag::Pure)
    }
}

impl fmt::Display for SchedulingFlag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One test case from the `tests` list.
///
/// Values are keyed by attribute name within their section.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestCase {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub inputs: IndexMap<String, Value>,
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub outputs: IndexMap<String, Value>,
    /// Expected state after compute.
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub state: IndexMap<String, Value>,
    /// State seeded before compute.
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub state_set: IndexMap<String, Value>,
    /// Opaque scene setup passed to the test runner.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub setup: Option<Value>,
}

/// A fully normalized node definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeDefinition {
    /// Node type name (the document key).
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    /// Description lines; a bare string becomes one line.
    pub description: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<IconSpec>,
    pub version: u32,
    pub language: Language,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub memory_type: Option<MemoryType>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub exclude: Vec<ExcludeTarget>,
    pub categories: Vec<String>,
    /// Category descriptions from the mapping form of `categories`.
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub category_definitions: IndexMap<String, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cuda_pointers: Option<CudaPointers>,
    pub metadata: IndexMap<String, Value>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub scheduling: Vec<SchedulingFlag>,
    pub singleton: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    /// Token name → display value.
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub tokens: IndexMap<String, String>,
    pub ui_name: String,
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub inputs: IndexMap<String, Attribute>,
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub outputs: IndexMap<String, Attribute>,
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub state: IndexMap<String, Attribute>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tests: Vec<TestCase>,
}

impl NodeDefinition {
    /// A definition carrying only defaults, filled in by validation.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            comment: None,
            description: Vec::new(),
            icon: None,
            version: 1,
            language: Language::default(),
            memory_type: None,
            exclude: Vec::new(),
            categories: Vec::new(),
            category_definitions: IndexMap::new(),
            cuda_pointers: None,
            metadata: IndexMap::new(),
            scheduling: Vec::new(),
            singleton: false,
            tags: Vec::new(),
            tokens: IndexMap::new(),
            ui_name: String::new(),
            inputs: IndexMap::new(),
            outputs: IndexMap::new(),
            state: IndexMap::new(),
            tests: Vec::new(),
        }
    }

    /// Attributes of one section.
    pub fn section(&self, section: Section) -> &IndexMap<String, Attribute> {
        match section {
            Section::Inputs => &self.inputs,
            Section::Outputs => &self.outputs,
            Section::State => &self.state,
        }
    }

    /// Mutable attributes of one section.
    pub fn section_mut(&mut self, section: Section) -> &mut IndexMap<String, Attribute> {
        match section {
            Section::Inputs => &mut self.inputs,
            Section::Outputs => &mut self.outputs,
            Section::State => &mut self.state,
        }
    }

    /// Look up an attribute by section and name.
    pub fn attribute(&self, section: Section, name: &str) -> Option<&Attribute> {
        self.section(section).get(name)
    }

    /// Author from the metadata, when given as a string.
    pub fn author(&self) -> Option<&str> {
        self.metadata.get("author").and_then(Value::as_str)
    }

    /// Node metadata as generators store it: string values, with the
    /// `uiName`, `tags` and `singleton` shortcuts folded in.
    pub fn metadata_view(&self) -> IndexMap<String, String> {
        let mut view: IndexMap<String, String> = self
            .metadata
            .iter()
            .map(|(k, v)| {
                let text = match v {
                    Value::String(s) => s.clone(),
                    Value::Array(items) => items
                        .iter()
                        .map(|i| i.as_str().map(str::to_string).unwrap_or_else(|| i.to_string()))
                        .collect::<Vec<_>>()
                        .join(","),
                    other => other.to_string(),
                };
                (k.clone(), text)
            })
            .collect();

        view.insert("uiName".to_string(), self.ui_name.clone());
        if !self.tags.is_empty() {
            view.insert("tags".to_string(), self.tags.join(","));
        }
        if self.singleton {
            view.insert("singleton".to_string(), "1".to_string());
        }
        view
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_scheduling_keywords() {
        for flag in SchedulingFlag::ALL {
            assert_eq!(SchedulingFlag::from_keyword(flag.as_str()), Some(flag));
            let json = serde_json::to_value(flag).unwrap();
            assert_eq!(json, json!(flag.as_str()));
        }
        assert_eq!(SchedulingFlag::from_keyword("Global"), None);
    }

    #[test]
    fn test_scheduling_scope() {
        assert_eq!(
            SchedulingFlag::scoped(SchedulingScope::Usd, SchedulingAccess::Write),
            SchedulingFlag::UsdWrite
        );
        assert_eq!(SchedulingFlag::Threadsafe.scope(), None);
    }

    #[test]
    fn test_exclude_keywords() {
        assert_eq!(ExcludeTarget::from_keyword("c++"), Some(ExcludeTarget::Cpp));
        assert_eq!(ExcludeTarget::from_keyword("rust"), None);
        assert_eq!(serde_json::to_value(ExcludeTarget::Cpp).unwrap(), json!("c++"));
    }

    #[test]
    fn test_metadata_view() {
        let mut node = NodeDefinition::new("Add");
        node.ui_name = "Add Values".to_string();
        node.singleton = true;
        node.tags = vec!["math".to_string(), "basic".to_string()];
        node.metadata.insert("author".to_string(), json!("Someone"));
        node.metadata.insert("keywords".to_string(), json!(["sum", "plus"]));

        let view = node.metadata_view();
        assert_eq!(view["uiName"], "Add Values");
        assert_eq!(view["singleton"], "1");
        assert_eq!(view["tags"], "math,basic");
        assert_eq!(view["keywords"], "sum,plus");
        assert_eq!(node.author(), Some("Someone"));
    }

    #[test]
    fn test_defaults() {
        let node = NodeDefinition::new("N");
        assert_eq!(node.version, 1);
        assert_eq!(node.language, Language::Cpp);
        assert!(!node.singleton);
        assert!(node.section(Section::State).is_empty());
    }
}
