//! Validation of descriptor documents.
//!
//! The pipeline runs every entry of a document through the validation
//! stages and keeps the entries that come out clean.

pub mod attribute;
pub mod batch;
pub mod options;
pub mod pipeline;
pub mod stages;

pub use attribute::{validate_attribute, validate_attribute_at};
pub use batch::{collect_descriptor_files, validate_batch, BatchReport, FileOutcome};
pub use options::ValidationOptions;
pub use pipeline::{ValidationOutcome, ValidationPipeline};
pub use stages::{
    AttributeValidation, EntryInput, ExcludeValidation, RequiredFieldValidation,
    SchedulingValidation, ShorthandNormalization, TestReferenceValidation, ValidationStage,
};

use crate::core::error::OgnResult;
use serde_json::Value;

/// Validate a parsed document with the default pipeline.
pub fn validate_document(document: &Value) -> ValidationOutcome {
    ValidationPipeline::default_pipeline().validate_document(document)
}

/// Parse and validate document text with the default pipeline.
pub fn validate_str(text: &str) -> OgnResult<ValidationOutcome> {
    ValidationPipeline::default_pipeline().validate_str(text)
}
