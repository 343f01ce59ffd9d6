//! Validation pipeline implementation.

use crate::core::context::{is_comment_key, FieldPath, ValidationContext};
use crate::core::error::{OgnError, OgnResult, ValidationReport};
use crate::core::model::NormalizedModel;
use crate::core::node::NodeDefinition;
use crate::validation::options::ValidationOptions;
use crate::validation::stages::{
    AttributeValidation, EntryInput, ExcludeValidation, RequiredFieldValidation,
    SchedulingValidation, ShorthandNormalization, TestReferenceValidation, ValidationStage,
};
use serde_json::Value;
use std::path::Path;
use std::time::Instant;

/// Result of validating one document.
///
/// The model holds every entry that raised no error-class diagnostic; the
/// report holds every diagnostic, in document order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ValidationOutcome {
    pub model: NormalizedModel,
    pub report: ValidationReport,
}

impl ValidationOutcome {
    /// Whether the document is accepted, under normal or strict rules.
    pub fn is_accepted(&self, strict: bool) -> bool {
        if strict {
            self.report.is_empty()
        } else {
            !self.report.has_errors()
        }
    }

    /// The model, or every diagnostic when any of them is an error.
    pub fn into_result(self) -> OgnResult<NormalizedModel> {
        if self.report.has_errors() {
            Err(OgnError::Rejected(self.report.diagnostics))
        } else {
            Ok(self.model)
        }
    }

    /// The model, or every diagnostic when there are any at all.
    pub fn into_strict(self) -> OgnResult<NormalizedModel> {
        if self.report.is_empty() {
            Ok(self.model)
        } else {
            Err(OgnError::Rejected(self.report.diagnostics))
        }
    }
}

/// Multi-stage validation pipeline.
///
/// Every entry of a document runs through all stages in order. Stages never
/// stop on errors, so one run reports every problem in the document.
pub struct ValidationPipeline {
    stages: Vec<Box<dyn ValidationStage>>,
    options: ValidationOptions,
}

impl ValidationPipeline {
    /// Create a new pipeline with the given stages.
    pub fn new(stages: Vec<Box<dyn ValidationStage>>) -> Self {
        Self {
            stages,
            options: ValidationOptions::default(),
        }
    }

    /// Create the default validation pipeline with all standard stages.
    pub fn default_pipeline() -> Self {
        Self::new(vec![
            Box::new(RequiredFieldValidation),
            Box::new(ShorthandNormalization),
            Box::new(ExcludeValidation),
            Box::new(SchedulingValidation),
            Box::new(AttributeValidation),
            Box::new(TestReferenceValidation),
        ])
    }

    /// Set the options handed to every stage.
    pub fn with_options(mut self, options: ValidationOptions) -> Self {
        self.options = options;
        self
    }

    /// Add a custom validation stage.
    pub fn add_stage(&mut self, stage: Box<dyn ValidationStage>) {
        self.stages.push(stage);
    }

    pub fn options(&self) -> &ValidationOptions {
        &self.options
    }

    /// Names of the stages, in run order.
    pub fn stage_names(&self) -> Vec<&str> {
        self.stages.iter().map(|s| s.name()).collect()
    }

    /// Validate a parsed document.
    pub fn validate_document(&self, document: &Value) -> ValidationOutcome {
        let start = Instant::now();
        let mut outcome = ValidationOutcome::default();
        let root = FieldPath::root();

        let Some(entries) = document.as_object() else {
            let mut ctx = ValidationContext::new();
            ctx.wrong_shape(&root, "an object of node definitions");
            outcome.report.extend(ctx.into_diagnostics());
            return outcome;
        };

        let mut seen = 0;
        for (name, value) in entries {
            if is_comment_key(name) {
                continue;
            }
            seen += 1;

            let mut ctx = ValidationContext::new();
            match value.as_object() {
                Some(raw) => {
                    let node = self.validate_entry(&EntryInput::new(name, raw), &mut ctx);
                    if ctx.has_errors() {
                        log::debug!("dropping '{}': {} error(s)", name, ctx.error_count());
                    } else {
                        outcome.model.insert(node);
                    }
                }
                None => ctx.wrong_shape(&FieldPath::entry(name), "a node definition object"),
            }
            outcome.report.extend(ctx.into_diagnostics());
        }

        if seen == 0 {
            let mut ctx = ValidationContext::new();
            ctx.missing(&root);
            outcome.report.extend(ctx.into_diagnostics());
        }

        log::debug!(
            "validated {} entr(ies) in {}ms: {}",
            seen,
            start.elapsed().as_millis(),
            outcome.report.summary()
        );
        outcome
    }

    fn validate_entry(
        &self,
        entry: &EntryInput<'_>,
        ctx: &mut ValidationContext,
    ) -> NodeDefinition {
        let mut node = NodeDefinition::new(entry.name);
        for stage in &self.stages {
            let before = ctx.diagnostics().len();
            stage.apply(entry, &mut node, ctx, &self.options);
            log::trace!(
                "{}: stage '{}' raised {} diagnostic(s)",
                entry.name,
                stage.name(),
                ctx.diagnostics().len() - before
            );
        }
        node
    }

    /// Parse and validate document text.
    ///
    /// Text that is not JSON fails as a whole with [`OgnError::Syntax`].
    pub fn validate_str(&self, text: &str) -> OgnResult<ValidationOutcome> {
        let document: Value = serde_json::from_str(text)?;
        Ok(self.validate_document(&document))
    }

    /// Read, parse and validate a descriptor file.
    pub fn validate_file(&self, path: impl AsRef<Path>) -> OgnResult<ValidationOutcome> {
        let text = std::fs::read_to_string(path)?;
        self.validate_str(&text)
    }
}

impl Default for ValidationPipeline {
    fn default() -> Self {
        Self::default_pipeline()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::attribute::{AttributeType, Section};
    use crate::core::error::{Diagnostic, DiagnosticKind};
    use crate::core::types::{PrimitiveType, TypeToken};
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn validate(document: Value) -> ValidationOutcome {
        ValidationPipeline::default_pipeline().validate_document(&document)
    }

    fn kinds(outcome: &ValidationOutcome) -> Vec<DiagnosticKind> {
        outcome.report.diagnostics.iter().map(Diagnostic::kind).collect()
    }

    fn minimal(extra: Value) -> Value {
        let mut entry = json!({
            "description": "Test node",
            "uiName": "Test Node",
            "categories": ["examples"],
            "metadata": {"author": "Tests"}
        });
        if let (Some(entry), Value::Object(extra)) = (entry.as_object_mut(), extra) {
            entry.extend(extra);
        }
        entry
    }

    #[test]
    fn test_float3_default_is_accepted() {
        let outcome = validate(json!({
            "Scale": minimal(json!({
                "inputs": {
                    "v": {"description": "Vector", "type": "float[3]", "default": [1.0, 2.0, 3.0]}
                }
            }))
        }));
        assert!(outcome.report.is_empty(), "{:?}", outcome.report);

        let node = outcome.model.get("Scale").unwrap();
        let attribute = node.attribute(Section::Inputs, "v").unwrap();
        assert_eq!(
            attribute.attr_type,
            AttributeType::Single(TypeToken::PrimitiveTuple {
                base: PrimitiveType::Float,
                size: 3
            })
        );
        assert_eq!(attribute.default, Some(json!([1.0, 2.0, 3.0])));
    }

    #[test]
    fn test_wrong_arity_default_reports_once() {
        let outcome = validate(json!({
            "Scale": minimal(json!({
                "inputs": {
                    "v": {"description": "Vector", "type": "float[3]", "default": [1.0, 2.0]}
                }
            }))
        }));
        assert_eq!(kinds(&outcome), vec![DiagnosticKind::InvalidDefaultShape]);
        assert_eq!(outcome.report.diagnostics[0].path(), "Scale.inputs.v.default");
        assert!(outcome.model.is_empty());
    }

    #[test]
    fn test_scheduling_warning_keeps_entry() {
        let outcome = validate(json!({
            "Busy": minimal(json!({"scheduling": ["global", "global-read", "global-write"]}))
        }));
        assert_eq!(kinds(&outcome), vec![DiagnosticKind::RedundantSchedulingFlag]);
        assert!(outcome.model.contains("Busy"));
        assert!(outcome.is_accepted(false));
        assert!(!outcome.is_accepted(true));
        assert!(outcome.clone().into_result().is_ok());
        assert!(outcome.into_strict().is_err());
    }

    #[test]
    fn test_unresolved_reference_drops_only_its_entry() {
        let outcome = validate(json!({
            "Good": minimal(json!({})),
            "Bad": minimal(json!({
                "outputs": {"sum": {"description": "Sum", "type": "int"}},
                "tests": [{"outputs:doesNotExist": 3}]
            }))
        }));
        assert_eq!(kinds(&outcome), vec![DiagnosticKind::UnresolvedTestReference]);
        assert_eq!(
            outcome.report.diagnostics[0].path(),
            "Bad.tests[0].outputs.doesNotExist"
        );
        assert!(outcome.model.contains("Good"));
        assert!(!outcome.model.contains("Bad"));
    }

    #[test]
    fn test_cross_section_names() {
        let outcome = validate(json!({
            "Copy": minimal(json!({
                "inputs": {"mesh": {"description": "In", "type": "bundle"}},
                "outputs": {"mesh": {"description": "Out", "type": "bundle"}},
                "tests": [{"inputs:mesh": "/World/Cube", "outputs:mesh": "/World/Cube"}]
            }))
        }));
        assert!(outcome.report.is_empty(), "{:?}", outcome.report);
        let node = outcome.model.get("Copy").unwrap();
        assert!(node.attribute(Section::Inputs, "mesh").is_some());
        assert!(node.attribute(Section::Outputs, "mesh").is_some());
    }

    #[test]
    fn test_shorthands_expand() {
        let outcome = validate(json!({
            "Fruit": minimal(json!({
                "icon": "icons/Foo.svg",
                "tags": "fruit,example,chocolate"
            }))
        }));
        let node = outcome.model.get("Fruit").unwrap();
        let icon = node.icon.as_ref().unwrap();
        assert_eq!(icon.path, "icons/Foo.svg");
        assert_eq!(node.tags, vec!["fruit", "example", "chocolate"]);
    }

    #[test]
    fn test_root_shapes() {
        let outcome = validate(json!([]));
        assert_eq!(kinds(&outcome), vec![DiagnosticKind::WrongFieldShape]);
        assert_eq!(outcome.report.diagnostics[0].path(), "");

        let outcome = validate(json!({"$comment": "nothing here"}));
        assert_eq!(kinds(&outcome), vec![DiagnosticKind::RequiredFieldMissing]);

        let outcome = validate(json!({"Node": 3}));
        assert_eq!(kinds(&outcome), vec![DiagnosticKind::WrongFieldShape]);
        assert_eq!(outcome.report.diagnostics[0].path(), "Node");
    }

    #[test]
    fn test_diagnostics_follow_document_order() {
        let outcome = validate(json!({
            "B": {"uiName": "B node", "categories": [], "metadata": {}},
            "A": minimal(json!({"exclude": ["rust"]}))
        }));
        let paths: Vec<_> = outcome.report.diagnostics.iter().map(|d| d.path()).collect();
        assert_eq!(paths, vec!["B.description", "A.exclude[0]"]);
        assert!(outcome.model.is_empty());
    }

    #[test]
    fn test_validation_is_deterministic() {
        let document = json!({
            "N": {"inputs": {"a": {"type": "nope"}, "b": {"type": ["int", "int"]}}}
        });
        let first = validate(document.clone());
        let second = validate(document);
        assert_eq!(first, second);
        assert!(first.report.len() >= 5);
    }

    #[test]
    fn test_metadata_can_be_optional() {
        let pipeline = ValidationPipeline::default_pipeline()
            .with_options(ValidationOptions::new().with_required_metadata(false));
        let outcome = pipeline.validate_document(&json!({
            "Plain": {"description": "d", "uiName": "Plain", "categories": "misc"}
        }));
        assert!(outcome.report.is_empty(), "{:?}", outcome.report);
    }

    #[test]
    fn test_syntax_error() {
        let pipeline = ValidationPipeline::default_pipeline();
        assert!(matches!(
            pipeline.validate_str("{ not json"),
            Err(OgnError::Syntax(_))
        ));
        assert!(pipeline.validate_str("{}").is_ok());
    }

    #[test]
    fn test_stage_names() {
        let pipeline = ValidationPipeline::default_pipeline();
        assert_eq!(pipeline.stage_names().len(), 6);
        assert_eq!(pipeline.stage_names()[0], "Required Fields");
    }
}
