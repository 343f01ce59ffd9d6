//! # ogn - Node Descriptor Validation
//!
//! `ogn` checks node-definition documents (`.ogn` files) and turns them into
//! a normalized model. A document is a JSON object whose keys are node type
//! names; each value describes the node's inputs, outputs, state, tests and
//! presentation.
//!
//! ## Features
//!
//! - **Type grammar**: Parse and print attribute type strings (`float[3]`,
//!   `matrixd[4][]`, `numerics`, ...)
//! - **Attribute checks**: Defaults and ranges are checked against the
//!   declared type, including multi-type sets
//! - **Every problem at once**: Diagnostics carry the dotted path of the
//!   offending field and are collected, never thrown
//! - **Normalized output**: Shorthands are expanded and defaults filled in
//! - **Batches**: Many files validated in parallel
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use ogn::prelude::*;
//!
//! let text = std::fs::read_to_string("OgnAdd.ogn")?;
//! let outcome = ValidationPipeline::default().validate_str(&text)?;
//!
//! for line in outcome.report.detailed() {
//!     eprintln!("{}", line);
//! }
//!
//! let model = outcome.into_result()?;
//! let add = model.get("Add").unwrap();
//! println!("{} has {} input(s)", add.ui_name, add.inputs.len());
//! ```
//!
//! ## Architecture
//!
//! - [`core`]: Type grammar, normalized model, diagnostics
//! - [`validation`]: Attribute validator, entry stages, pipeline and batches

#![warn(clippy::all)]

pub mod core;
pub mod validation;

/// Prelude module for convenient imports.
///
/// Import everything commonly needed with:
/// ```rust,ignore
/// use ogn::prelude::*;
/// ```
pub mod prelude {
    // Type grammar
    pub use crate::core::types::{
        parse_type, stringify_type, PrimitiveType, Role, TypeToken, UnionGroup, UnknownTypeToken,
        ValueShape,
    };

    // Normalized model
    pub use crate::core::attribute::{
        Attribute, AttributeMetadata, AttributeType, MemoryType, Section,
    };
    pub use crate::core::icon::{Color, IconColors, IconSpec};
    pub use crate::core::model::NormalizedModel;
    pub use crate::core::node::{
        CudaPointers, ExcludeTarget, Language, NodeDefinition, SchedulingFlag, TestCase,
    };

    // Diagnostics
    pub use crate::core::context::{FieldPath, ValidationContext};
    pub use crate::core::error::{
        Diagnostic, DiagnosticKind, OgnError, OgnResult, Severity, ValidationReport,
    };

    // Validation
    pub use crate::validation::attribute::validate_attribute;
    pub use crate::validation::batch::{
        collect_descriptor_files, validate_batch, BatchReport, BatchStatus,
    };
    pub use crate::validation::options::ValidationOptions;
    pub use crate::validation::pipeline::{ValidationOutcome, ValidationPipeline};
    pub use crate::validation::stages::ValidationStage;
    pub use crate::validation::{validate_document, validate_str};
}

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name.
pub const NAME: &str = env!("CARGO_PKG_NAME");

#[cfg(test)]
mod tests {
    use super::prelude::*;
    use serde_json::json;

    #[test]
    fn test_version() {
        assert!(!super::VERSION.is_empty());
        assert_eq!(super::NAME, "ogn");
    }

    #[test]
    fn test_model_round_trips_through_json() {
        let outcome = validate_document(&json!({
            "Counter": {
                "description": ["Counts evaluations", "of the node"],
                "uiName": "Counter",
                "categories": {"internal:test": "Test nodes"},
                "metadata": {"author": "Tests"},
                "scheduling": "threadsafe",
                "inputs": {
                    "step": {"description": "Step", "type": ["int", "int64"], "default": 1}
                },
                "state": {"count": {"description": "Count", "type": "int64"}},
                "tests": [{"state_set": {"count": 2}, "state_get": {"count": 3}}]
            }
        }));
        assert!(outcome.report.is_empty(), "{:?}", outcome.report);

        let text = outcome.model.to_json().unwrap();
        let restored = NormalizedModel::from_json(&text).unwrap();
        assert_eq!(restored, outcome.model);
    }

    #[test]
    fn test_validate_str_reports_paths() {
        let outcome = validate_str(r#"{"N": {"uiName": "N node"}}"#).unwrap();
        let paths: Vec<_> = outcome.report.diagnostics.iter().map(|d| d.path()).collect();
        assert_eq!(paths, vec!["N.description", "N.categories", "N.metadata"]);
        assert!(outcome.into_result().is_err());
    }
}
