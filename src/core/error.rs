//! Error types for the descriptor validator.
//!
//! Uses thiserror for structured errors with context. Diagnostics are designed to:
//! - Be serializable for editors and CI tooling
//! - Carry the dotted path of the offending field (`node.inputs.a.type`)
//! - Be collected, not thrown: one validation run reports every problem

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Top-level error type.
///
/// Only conditions that abort a whole document end up here; everything that
/// can be attributed to a field is a [`Diagnostic`] instead.
#[derive(Error, Debug)]
pub enum OgnError {
    #[error("Syntax error: {0}")]
    Syntax(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] toml::de::Error),

    #[error("Document rejected with {} diagnostic(s)", .0.len())]
    Rejected(Vec<Diagnostic>),
}

/// Result type alias for document-level operations.
pub type OgnResult<T> = Result<T, OgnError>;

/// Kind of a diagnostic, independent of its payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DiagnosticKind {
    RequiredFieldMissing,
    WrongFieldShape,
    UnknownTypeToken,
    DuplicateTypeInSet,
    InvalidDefaultShape,
    InvalidRangeShape,
    InvalidExcludeValue,
    RedundantSchedulingFlag,
    UnresolvedTestReference,
}

/// How bad a diagnostic is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// The owning entry is dropped from the normalized model.
    Error,
    /// Reported, but the entry is still normalized.
    Warning,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Error => write!(f, "error"),
            Severity::Warning => write!(f, "warning"),
        }
    }
}

/// A path-qualified problem found in a descriptor document.
#[derive(Error, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum Diagnostic {
    #[error("{}: required field is missing", display_path(.path))]
    RequiredFieldMissing { path: String },

    #[error("{}: expected {expected}", display_path(.path))]
    WrongFieldShape { path: String, expected: String },

    #[error("{}: unknown type token '{token}'", display_path(.path))]
    UnknownTypeToken { path: String, token: String },

    #[error("{}: type '{token}' is listed more than once", display_path(.path))]
    DuplicateTypeInSet { path: String, token: String },

    #[error(
        "{}: default does not fit type '{type_name}', expected {expected}",
        display_path(.path)
    )]
    InvalidDefaultShape {
        path: String,
        type_name: String,
        expected: String,
    },

    #[error(
        "{}: range bound does not fit type '{type_name}', expected {expected}",
        display_path(.path)
    )]
    InvalidRangeShape {
        path: String,
        type_name: String,
        expected: String,
    },

    #[error("{}: '{value}' is not a legal exclude value", display_path(.path))]
    InvalidExcludeValue { path: String, value: String },

    #[error("{}: {reason}", display_path(.path))]
    RedundantSchedulingFlag { path: String, reason: String },

    #[error("{}: no attribute '{name}' in section '{section}'", display_path(.path))]
    UnresolvedTestReference {
        path: String,
        section: String,
        name: String,
    },
}

fn display_path(path: &str) -> &str {
    if path.is_empty() {
        "<document>"
    } else {
        path
    }
}

// ============================================================================
// Diagnostic Utilities
// ============================================================================

impl Diagnostic {
    /// Payload-free kind of this diagnostic.
    pub fn kind(&self) -> DiagnosticKind {
        match self {
            Diagnostic::RequiredFieldMissing { .. } => DiagnosticKind::RequiredFieldMissing,
            Diagnostic::WrongFieldShape { .. } => DiagnosticKind::WrongFieldShape,
            Diagnostic::UnknownTypeToken { .. } => DiagnosticKind::UnknownTypeToken,
            Diagnostic::DuplicateTypeInSet { .. } => DiagnosticKind::DuplicateTypeInSet,
            Diagnostic::InvalidDefaultShape { .. } => DiagnosticKind::InvalidDefaultShape,
            Diagnostic::InvalidRangeShape { .. } => DiagnosticKind::InvalidRangeShape,
            Diagnostic::InvalidExcludeValue { .. } => DiagnosticKind::InvalidExcludeValue,
            Diagnostic::RedundantSchedulingFlag { .. } => DiagnosticKind::RedundantSchedulingFlag,
            Diagnostic::UnresolvedTestReference { .. } => DiagnosticKind::UnresolvedTestReference,
        }
    }

    /// Dotted path of the offending field. Empty for the document root.
    pub fn path(&self) -> &str {
        match self {
            Diagnostic::RequiredFieldMissing { path }
            | Diagnostic::WrongFieldShape { path, .. }
            | Diagnostic::UnknownTypeToken { path, .. }
            | Diagnostic::DuplicateTypeInSet { path, .. }
            | Diagnostic::InvalidDefaultShape { path, .. }
            | Diagnostic::InvalidRangeShape { path, .. }
            | Diagnostic::InvalidExcludeValue { path, .. }
            | Diagnostic::RedundantSchedulingFlag { path, .. }
            | Diagnostic::UnresolvedTestReference { path, .. } => path,
        }
    }

    /// Severity class.
    pub fn severity(&self) -> Severity {
        match self {
            Diagnostic::RedundantSchedulingFlag { .. } => Severity::Warning,
            _ => Severity::Error,
        }
    }

    /// Check if this diagnostic keeps its entry out of the normalized model.
    pub fn is_error(&self) -> bool {
        self.severity() == Severity::Error
    }

    /// Get suggestion for fixing this diagnostic.
    pub fn suggested_fix(&self) -> Option<String> {
        match self {
            Diagnostic::RequiredFieldMissing { path } => {
                Some(format!("Add the '{}' field", last_segment(path)))
            }
            Diagnostic::UnknownTypeToken { .. } => {
                Some("Run `ogn types` to list every accepted type".to_string())
            }
            Diagnostic::DuplicateTypeInSet { token, .. } => {
                Some(format!("Remove the repeated '{}'", token))
            }
            Diagnostic::InvalidExcludeValue { .. } => Some(
                "Use one of: c++, docs, icon, python, template, tests, usd".to_string(),
            ),
            Diagnostic::RedundantSchedulingFlag { .. } => {
                Some("Keep only the broader flag".to_string())
            }
            Diagnostic::UnresolvedTestReference { section, name, .. } => Some(format!(
                "Declare '{}' under '{}' or fix the test",
                name, section
            )),
            _ => None,
        }
    }
}

fn last_segment(path: &str) -> &str {
    path.rsplit('.').next().unwrap_or(path)
}

// ============================================================================
// Validation Report
// ============================================================================

/// Ordered collection of diagnostics for one document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ValidationReport {
    /// Diagnostics in emission order.
    pub diagnostics: Vec<Diagnostic>,
}

impl ValidationReport {
    /// Create a new empty report.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a diagnostic to the report.
    pub fn push(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.push(diagnostic);
    }

    /// Append every diagnostic from an iterator.
    pub fn extend(&mut self, diagnostics: impl IntoIterator<Item = Diagnostic>) {
        self.diagnostics.extend(diagnostics);
    }

    /// Error-class diagnostics.
    pub fn errors(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics.iter().filter(|d| d.is_error())
    }

    /// Warning-class diagnostics.
    pub fn warnings(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics.iter().filter(|d| !d.is_error())
    }

    /// Whether any error-class diagnostic was reported.
    pub fn has_errors(&self) -> bool {
        self.errors().next().is_some()
    }

    /// Number of diagnostics.
    pub fn len(&self) -> usize {
        self.diagnostics.len()
    }

    /// Whether nothing was reported.
    pub fn is_empty(&self) -> bool {
        self.diagnostics.is_empty()
    }

    /// Get a human-readable summary.
    pub fn summary(&self) -> String {
        let errors = self.errors().count();
        let warnings = self.warnings().count();
        match (errors, warnings) {
            (0, 0) => "valid".to_string(),
            (0, w) => format!("valid with {} warning(s)", w),
            (e, 0) => format!("{} error(s)", e),
            (e, w) => format!("{} error(s), {} warning(s)", e, w),
        }
    }

    /// Get detailed messages with suggestions.
    pub fn detailed(&self) -> Vec<String> {
        self.diagnostics
            .iter()
            .map(|diagnostic| {
                let mut msg = format!("{}: {}", diagnostic.severity(), diagnostic);
                if let Some(fix) = diagnostic.suggested_fix() {
                    msg.push_str(&format!("\n   -> {}", fix));
                }
                msg
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_includes_path() {
        let d = Diagnostic::UnknownTypeToken {
            path: "Add.inputs.a.type".to_string(),
            token: "flaot".to_string(),
        };
        assert_eq!(d.to_string(), "Add.inputs.a.type: unknown type token 'flaot'");
        assert_eq!(d.kind(), DiagnosticKind::UnknownTypeToken);
    }

    #[test]
    fn test_root_path() {
        let d = Diagnostic::RequiredFieldMissing {
            path: String::new(),
        };
        assert!(d.to_string().starts_with("<document>"));
    }

    #[test]
    fn test_report_severity_split() {
        let mut report = ValidationReport::new();
        report.push(Diagnostic::RedundantSchedulingFlag {
            path: "N.scheduling".to_string(),
            reason: "redundant".to_string(),
        });
        assert!(!report.has_errors());
        assert_eq!(report.summary(), "valid with 1 warning(s)");

        report.push(Diagnostic::RequiredFieldMissing {
            path: "N.uiName".to_string(),
        });
        assert!(report.has_errors());
        assert_eq!(report.errors().count(), 1);
        assert_eq!(report.warnings().count(), 1);
        assert!(report.detailed()[1].contains("Add the 'uiName' field"));
    }

    #[test]
    fn test_serialize_tagged() {
        let d = Diagnostic::DuplicateTypeInSet {
            path: "N.inputs.a.type[1]".to_string(),
            token: "int".to_string(),
        };
        let json = serde_json::to_value(&d).unwrap();
        assert_eq!(json["kind"], "DuplicateTypeInSet");
        assert_eq!(json["path"], "N.inputs.a.type[1]");
    }
}
