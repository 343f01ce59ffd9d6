//! Core types for the descriptor validator.
//!
//! This module contains the foundational types:
//! - The attribute type grammar
//! - Attribute and node definitions (the normalized model)
//! - Icons and colors
//! - Diagnostics and the validation context

pub mod types;
pub mod attribute;
pub mod error;
pub mod context;
pub mod icon;
pub mod node;
pub mod model;

// Re-export commonly used types
pub use types::{parse_type, stringify_type, TypeToken, UnknownTypeToken, ValueShape};
pub use attribute::{Attribute, AttributeMetadata, AttributeType, MemoryType, Section};
pub use error::{Diagnostic, DiagnosticKind, OgnError, Severity, ValidationReport};
pub use context::{FieldPath, ValidationContext};
pub use icon::{Color, IconColors, IconSpec};
pub use node::{CudaPointers, ExcludeTarget, Language, NodeDefinition, SchedulingFlag, TestCase};
pub use model::NormalizedModel;
