//! Validation context.
//!
//! The context tracks the dotted path of the field being looked at and
//! collects every diagnostic raised beneath it. Field readers on the context
//! report shape problems themselves and hand back `None`, so callers can keep
//! going and surface every problem in a single pass.

use crate::core::error::Diagnostic;
use serde_json::{Map, Value};
use std::fmt;

/// Dotted path to a field inside a descriptor document.
///
/// Object keys are joined with `.`; list indices render as `[i]`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct FieldPath(String);

impl FieldPath {
    /// Path of the document root.
    pub fn root() -> Self {
        Self(String::new())
    }

    /// Path of a top-level key.
    pub fn entry(name: &str) -> Self {
        Self(name.to_string())
    }

    /// Path of an object member below this one.
    pub fn key(&self, key: &str) -> Self {
        if self.0.is_empty() {
            Self(key.to_string())
        } else {
            Self(format!("{}.{}", self.0, key))
        }
    }

    /// Path of a list element below this one.
    pub fn index(&self, index: usize) -> Self {
        Self(format!("{}[{}]", self.0, index))
    }

    /// Path as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&FieldPath> for String {
    fn from(path: &FieldPath) -> Self {
        path.0.clone()
    }
}

/// Whether an object key is a comment (`$comment`, `$todo`, ...).
pub fn is_comment_key(key: &str) -> bool {
    key.starts_with('$')
}

/// Collector for diagnostics raised while validating one unit of a document.
#[derive(Debug, Clone, Default)]
pub struct ValidationContext {
    diagnostics: Vec<Diagnostic>,
}

impl ValidationContext {
    /// Create a new, empty context.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a diagnostic.
    pub fn report(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.push(diagnostic);
    }

    /// Record every diagnostic from an iterator.
    pub fn report_all(&mut self, diagnostics: impl IntoIterator<Item = Diagnostic>) {
        self.diagnostics.extend(diagnostics);
    }

    /// Record a missing required field.
    pub fn missing(&mut self, path: &FieldPath) {
        self.report(Diagnostic::RequiredFieldMissing { path: path.into() });
    }

    /// Record a field with the wrong JSON kind or arity.
    pub fn wrong_shape(&mut self, path: &FieldPath, expected: impl Into<String>) {
        self.report(Diagnostic::WrongFieldShape {
            path: path.into(),
            expected: expected.into(),
        });
    }

    /// All diagnostics recorded so far.
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// Consume the context.
    pub fn into_diagnostics(self) -> Vec<Diagnostic> {
        self.diagnostics
    }

    /// Number of error-class diagnostics recorded so far.
    pub fn error_count(&self) -> usize {
        self.diagnostics.iter().filter(|d| d.is_error()).count()
    }

    /// Whether any error-class diagnostic was recorded.
    pub fn has_errors(&self) -> bool {
        self.error_count() > 0
    }

    // ========================================================================
    // Field readers
    // ========================================================================

    /// Read a string member.
    pub fn string(
        &mut self,
        object: &Map<String, Value>,
        key: &str,
        path: &FieldPath,
        required: bool,
    ) -> Option<String> {
        let field = path.key(key);
        match object.get(key) {
            Some(Value::String(s)) => Some(s.clone()),
            Some(_) => {
                self.wrong_shape(&field, "a string");
                None
            }
            None => {
                if required {
                    self.missing(&field);
                }
                None
            }
        }
    }

    /// Read a boolean member.
    pub fn boolean(
        &mut self,
        object: &Map<String, Value>,
        key: &str,
        path: &FieldPath,
    ) -> Option<bool> {
        match object.get(key) {
            Some(Value::Bool(b)) => Some(*b),
            Some(_) => {
                self.wrong_shape(&path.key(key), "a boolean");
                None
            }
            None => None,
        }
    }

    /// Read a member that may be a string or a list of strings.
    pub fn string_or_list(
        &mut self,
        object: &Map<String, Value>,
        key: &str,
        path: &FieldPath,
        required: bool,
    ) -> Option<Vec<String>> {
        let field = path.key(key);
        match object.get(key) {
            Some(value) => {
                let strings = strings_of(value);
                if strings.is_none() {
                    self.wrong_shape(&field, "a string or a list of strings");
                }
                strings
            }
            None => {
                if required {
                    self.missing(&field);
                }
                None
            }
        }
    }

    /// Read an object member.
    pub fn object<'v>(
        &mut self,
        object: &'v Map<String, Value>,
        key: &str,
        path: &FieldPath,
        required: bool,
    ) -> Option<&'v Map<String, Value>> {
        let field = path.key(key);
        match object.get(key) {
            Some(Value::Object(map)) => Some(map),
            Some(_) => {
                self.wrong_shape(&field, "an object");
                None
            }
            None => {
                if required {
                    self.missing(&field);
                }
                None
            }
        }
    }
}

/// A string becomes a one-element list; a list must hold only strings.
pub fn strings_of(value: &Value) -> Option<Vec<String>> {
    match value {
        Value::String(s) => Some(vec![s.clone()]),
        Value::Array(items) => items
            .iter()
            .map(|item| item.as_str().map(str::to_string))
            .collect(),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::error::DiagnosticKind;
    use serde_json::json;

    fn obj(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => panic!("not an object"),
        }
    }

    #[test]
    fn test_field_path() {
        let path = FieldPath::entry("Node").key("inputs").key("a");
        assert_eq!(path.as_str(), "Node.inputs.a");
        assert_eq!(path.key("type").index(2).as_str(), "Node.inputs.a.type[2]");
        assert_eq!(FieldPath::root().key("x").as_str(), "x");
    }

    #[test]
    fn test_string_reader() {
        let mut ctx = ValidationContext::new();
        let map = obj(json!({"uiName": "Add", "version": 2}));
        let base = FieldPath::entry("N");

        assert_eq!(ctx.string(&map, "uiName", &base, true), Some("Add".to_string()));
        assert_eq!(ctx.string(&map, "version", &base, true), None);
        assert_eq!(ctx.string(&map, "missing", &base, true), None);
        assert_eq!(ctx.string(&map, "optional", &base, false), None);

        let kinds: Vec<_> = ctx.diagnostics().iter().map(|d| d.kind()).collect();
        assert_eq!(
            kinds,
            vec![DiagnosticKind::WrongFieldShape, DiagnosticKind::RequiredFieldMissing]
        );
        assert_eq!(ctx.diagnostics()[1].path(), "N.missing");
    }

    #[test]
    fn test_string_or_list() {
        let mut ctx = ValidationContext::new();
        let map = obj(json!({"a": "x", "b": ["x", "y"], "c": ["x", 1]}));
        let base = FieldPath::root();

        assert_eq!(ctx.string_or_list(&map, "a", &base, false), Some(vec!["x".to_string()]));
        assert_eq!(ctx.string_or_list(&map, "b", &base, false).map(|v| v.len()), Some(2));
        assert_eq!(ctx.string_or_list(&map, "c", &base, false), None);
        assert_eq!(ctx.error_count(), 1);
    }

    #[test]
    fn test_comment_keys() {
        assert!(is_comment_key("$comment"));
        assert!(is_comment_key("$"));
        assert!(!is_comment_key("comment"));
    }
}
