//! Individual validation stages.
//!
//! Each stage checks one group of node-level fields and writes its part of
//! the normalized [`NodeDefinition`]. Stages never stop early: every problem
//! goes into the context and the stage carries on.

use crate::core::attribute::{MemoryType, Section};
use crate::core::context::{is_comment_key, strings_of, FieldPath, ValidationContext};
use crate::core::error::Diagnostic;
use crate::core::icon::{Color, IconSpec};
use crate::core::node::{
    CudaPointers, ExcludeTarget, Language, NodeDefinition, SchedulingAccess, SchedulingFlag,
    SchedulingScope, TestCase,
};
use crate::validation::attribute::validate_attribute_at;
use crate::validation::options::ValidationOptions;
use indexmap::IndexMap;
use serde_json::{Map, Value};

/// One raw entry of the document, as handed to each stage.
#[derive(Debug, Clone)]
pub struct EntryInput<'a> {
    /// Node type name.
    pub name: &'a str,
    /// Path of the entry (its name).
    pub path: FieldPath,
    /// The raw definition object.
    pub raw: &'a Map<String, Value>,
}

impl<'a> EntryInput<'a> {
    pub fn new(name: &'a str, raw: &'a Map<String, Value>) -> Self {
        Self {
            name,
            path: FieldPath::entry(name),
            raw,
        }
    }

    /// Names declared in a raw attribute section, valid or not.
    pub fn declares(&self, section: Section, name: &str) -> bool {
        self.raw
            .get(section.as_str())
            .and_then(Value::as_object)
            .is_some_and(|map| map.contains_key(name))
    }
}

/// Trait for validation stages.
pub trait ValidationStage: Send + Sync {
    /// Name of this validation stage.
    fn name(&self) -> &str;

    /// Validate one entry, filling in its part of `node`.
    fn apply(
        &self,
        entry: &EntryInput<'_>,
        node: &mut NodeDefinition,
        ctx: &mut ValidationContext,
        options: &ValidationOptions,
    );
}

// ============================================================================
// Required fields
// ============================================================================

/// Required and scalar node fields.
///
/// Verifies:
/// - `description`, `uiName`, `categories` and `metadata` are present
/// - `version` is an integer >= 1 and `language` is a known language
/// - `memoryType`, `cudaPointers` and `singleton` have legal values
pub struct RequiredFieldValidation;

impl ValidationStage for RequiredFieldValidation {
    fn name(&self) -> &str {
        "Required Fields"
    }

    fn apply(
        &self,
        entry: &EntryInput<'_>,
        node: &mut NodeDefinition,
        ctx: &mut ValidationContext,
        options: &ValidationOptions,
    ) {
        let raw = entry.raw;
        let path = &entry.path;

        node.comment = ctx.string(raw, "$comment", path, false);

        if let Some(lines) = ctx.string_or_list(raw, "description", path, true) {
            node.description = lines;
        }

        match raw.get("version") {
            Some(value) => {
                let version = value
                    .as_u64()
                    .filter(|v| *v >= 1)
                    .and_then(|v| u32::try_from(v).ok());
                match version {
                    Some(version) => node.version = version,
                    None => ctx.wrong_shape(&path.key("version"), "an integer >= 1"),
                }
            }
            None => node.version = 1,
        }

        match raw.get("language") {
            Some(Value::String(s)) => match Language::from_keyword(s) {
                Some(language) => node.language = language,
                None => ctx.wrong_shape(&path.key("language"), "\"c++\" or \"python\""),
            },
            Some(_) => ctx.wrong_shape(&path.key("language"), "\"c++\" or \"python\""),
            None => node.language = Language::Cpp,
        }

        if let Some(ui_name) = ctx.string(raw, "uiName", path, true) {
            if ui_name.chars().count() >= 2 {
                node.ui_name = ui_name;
            } else {
                ctx.wrong_shape(&path.key("uiName"), "a string of at least 2 characters");
            }
        }

        if !raw.contains_key("categories") {
            ctx.missing(&path.key("categories"));
        }

        if let Some(metadata) = ctx.object(raw, "metadata", path, options.require_node_metadata) {
            let metadata_path = path.key("metadata");
            if let Some(author) = metadata.get("author") {
                if !author.is_string() {
                    ctx.wrong_shape(&metadata_path.key("author"), "a string");
                }
            }
            node.metadata = metadata
                .iter()
                .filter(|(key, _)| !is_comment_key(key))
                .map(|(key, value)| (key.clone(), value.clone()))
                .collect();
        }

        if let Some(keyword) = ctx.string(raw, "memoryType", path, false) {
            node.memory_type = MemoryType::from_keyword(&keyword);
            if node.memory_type.is_none() {
                ctx.wrong_shape(&path.key("memoryType"), "one of cpu, cuda, any");
            }
        }

        if let Some(keyword) = ctx.string(raw, "cudaPointers", path, false) {
            node.cuda_pointers = CudaPointers::from_keyword(&keyword);
            if node.cuda_pointers.is_none() {
                ctx.wrong_shape(&path.key("cudaPointers"), "\"cuda\" or \"cpu\"");
            }
        }

        node.singleton = ctx.boolean(raw, "singleton", path).unwrap_or(false);
    }
}

// ============================================================================
// Shorthand normalization
// ============================================================================

/// Expands the shorthand forms of `icon`, `tags`, `tokens` and `categories`.
pub struct ShorthandNormalization;

impl ValidationStage for ShorthandNormalization {
    fn name(&self) -> &str {
        "Shorthand Normalization"
    }

    fn apply(
        &self,
        entry: &EntryInput<'_>,
        node: &mut NodeDefinition,
        ctx: &mut ValidationContext,
        options: &ValidationOptions,
    ) {
        let raw = entry.raw;
        let path = &entry.path;

        if let Some(icon) = raw.get("icon") {
            node.icon = normalize_icon(icon, &path.key("icon"), ctx, options);
        }

        if let Some(tags) = raw.get("tags") {
            match tags {
                Value::String(s) => node.tags = split_commas(s),
                other => match strings_of(other) {
                    Some(list) => node.tags = list,
                    None => ctx.wrong_shape(
                        &path.key("tags"),
                        "a comma-separated string or a list of strings",
                    ),
                },
            }
        }

        if let Some(tokens) = raw.get("tokens") {
            match normalize_tokens(tokens) {
                Some(map) => node.tokens = map,
                None => ctx.wrong_shape(
                    &path.key("tokens"),
                    "a string, a list of strings or a mapping of token to string",
                ),
            }
        }

        if let Some(categories) = raw.get("categories") {
            match categories {
                Value::String(s) => node.categories = split_commas(s),
                Value::Object(map) => {
                    let mut definitions = IndexMap::new();
                    for (name, description) in map {
                        match description.as_str() {
                            Some(text) => {
                                definitions.insert(name.clone(), text.to_string());
                            }
                            None => ctx.wrong_shape(&path.key("categories").key(name), "a string"),
                        }
                    }
                    node.categories = map.keys().cloned().collect();
                    node.category_definitions = definitions;
                }
                other => match strings_of(other) {
                    Some(list) => node.categories = list,
                    None => ctx.wrong_shape(
                        &path.key("categories"),
                        "a string, a list of strings or a mapping of name to description",
                    ),
                },
            }
        }
    }
}

fn split_commas(s: &str) -> Vec<String> {
    s.split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(str::to_string)
        .collect()
}

fn normalize_tokens(value: &Value) -> Option<IndexMap<String, String>> {
    match value {
        Value::Object(map) => map
            .iter()
            .map(|(k, v)| v.as_str().map(|display| (k.clone(), display.to_string())))
            .collect(),
        other => strings_of(other).map(|names| {
            names
                .into_iter()
                .map(|name| (name.clone(), name))
                .collect()
        }),
    }
}

fn normalize_icon(
    value: &Value,
    path: &FieldPath,
    ctx: &mut ValidationContext,
    options: &ValidationOptions,
) -> Option<IconSpec> {
    let defaults = &options.default_icon_colors;
    match value {
        Value::String(icon_path) => Some(IconSpec::from_path(icon_path.clone(), defaults)),
        Value::Object(map) => {
            let icon_path = ctx.string(map, "path", path, true);
            let mut color = |key: &str, fallback: Color| match map.get(key) {
                Some(value) => Color::from_json(value).unwrap_or_else(|reason| {
                    ctx.wrong_shape(&path.key(key), reason);
                    fallback
                }),
                None => fallback,
            };
            let spec = IconSpec {
                path: String::new(),
                color: color("color", defaults.color),
                background_color: color("backgroundColor", defaults.background_color),
                border_color: color("borderColor", defaults.border_color),
            };
            icon_path.map(|p| IconSpec { path: p, ..spec })
        }
        _ => {
            ctx.wrong_shape(path, "an icon path or an icon object");
            None
        }
    }
}

// ============================================================================
// Exclude list
// ============================================================================

/// Checks every `exclude` value against the legal artifact names.
pub struct ExcludeValidation;

impl ValidationStage for ExcludeValidation {
    fn name(&self) -> &str {
        "Exclude Validation"
    }

    fn apply(
        &self,
        entry: &EntryInput<'_>,
        node: &mut NodeDefinition,
        ctx: &mut ValidationContext,
        _options: &ValidationOptions,
    ) {
        let path = entry.path.key("exclude");
        let items = match entry.raw.get("exclude") {
            Some(Value::Array(items)) => items,
            Some(_) => {
                ctx.wrong_shape(&path, "a list of exclude values");
                return;
            }
            None => return,
        };

        for (i, item) in items.iter().enumerate() {
            let target = item.as_str().and_then(ExcludeTarget::from_keyword);
            match target {
                Some(target) => {
                    if !node.exclude.contains(&target) {
                        node.exclude.push(target);
                    }
                }
                None => ctx.report(Diagnostic::InvalidExcludeValue {
                    path: (&path.index(i)).into(),
                    value: item.as_str().map(str::to_string).unwrap_or_else(|| item.to_string()),
                }),
            }
        }
    }
}

// ============================================================================
// Scheduling hints
// ============================================================================

/// Checks scheduling flags and warns about redundant combinations.
pub struct SchedulingValidation;

impl ValidationStage for SchedulingValidation {
    fn name(&self) -> &str {
        "Scheduling Validation"
    }

    fn apply(
        &self,
        entry: &EntryInput<'_>,
        node: &mut NodeDefinition,
        ctx: &mut ValidationContext,
        _options: &ValidationOptions,
    ) {
        let path = entry.path.key("scheduling");
        let keywords: Vec<Value> = match entry.raw.get("scheduling") {
            Some(Value::String(s)) => split_commas(s).into_iter().map(Value::String).collect(),
            Some(Value::Array(items)) => items.clone(),
            Some(_) => {
                ctx.wrong_shape(&path, "a scheduling flag or a list of scheduling flags");
                return;
            }
            None => return,
        };

        for (i, keyword) in keywords.iter().enumerate() {
            let element = path.index(i);
            match keyword.as_str().and_then(SchedulingFlag::from_keyword) {
                Some(flag) if node.scheduling.contains(&flag) => {
                    ctx.report(Diagnostic::RedundantSchedulingFlag {
                        path: (&element).into(),
                        reason: format!("'{}' is listed more than once", flag),
                    });
                }
                Some(flag) => node.scheduling.push(flag),
                None => ctx.wrong_shape(&element, "a scheduling flag"),
            }
        }

        for scope in SchedulingScope::ALL {
            let [both, read, write] = [
                SchedulingAccess::ReadWrite,
                SchedulingAccess::Read,
                SchedulingAccess::Write,
            ]
            .map(|access| SchedulingFlag::scoped(scope, access));

            if [both, read, write].iter().all(|f| node.scheduling.contains(f)) {
                ctx.report(Diagnostic::RedundantSchedulingFlag {
                    path: (&path).into(),
                    reason: format!("'{}' already covers '{}' and '{}'", both, read, write),
                });
            }
        }
    }
}

// ============================================================================
// Attributes
// ============================================================================

/// Delegates every attribute of `inputs`, `outputs` and `state`.
///
/// Names only need to be unique within a section; `inputs.mesh` and
/// `outputs.mesh` coexist.
pub struct AttributeValidation;

impl ValidationStage for AttributeValidation {
    fn name(&self) -> &str {
        "Attribute Validation"
    }

    fn apply(
        &self,
        entry: &EntryInput<'_>,
        node: &mut NodeDefinition,
        ctx: &mut ValidationContext,
        _options: &ValidationOptions,
    ) {
        for section in Section::ALL {
            let Some(attributes) = ctx.object(entry.raw, section.as_str(), &entry.path, false)
            else {
                continue;
            };
            let section_path = entry.path.key(section.as_str());

            for (name, value) in attributes {
                if is_comment_key(name) {
                    continue;
                }
                match validate_attribute_at(name, value, &section_path.key(name)) {
                    Ok(attribute) => {
                        node.section_mut(section).insert(name.clone(), attribute);
                    }
                    Err(diagnostics) => ctx.report_all(diagnostics),
                }
            }
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

/// Parses the `tests` list and resolves every attribute it names.
pub struct TestReferenceValidation;

impl ValidationStage for TestReferenceValidation {
    fn name(&self) -> &str {
        "Test References"
    }

    fn apply(
        &self,
        entry: &EntryInput<'_>,
        node: &mut NodeDefinition,
        ctx: &mut ValidationContext,
        _options: &ValidationOptions,
    ) {
        let path = entry.path.key("tests");
        let tests = match entry.raw.get("tests") {
            Some(Value::Array(tests)) => tests,
            Some(_) => {
                ctx.wrong_shape(&path, "a list of test objects");
                return;
            }
            None => return,
        };

        for (i, test) in tests.iter().enumerate() {
            let test_path = path.index(i);
            let Some(object) = test.as_object() else {
                ctx.wrong_shape(&test_path, "a test object");
                continue;
            };

            let (case, references) = parse_test_case(object, &test_path, ctx);
            for reference in references {
                if !entry.declares(reference.section, &reference.name) {
                    ctx.report(Diagnostic::UnresolvedTestReference {
                        path: (&test_path.key(reference.key).key(&reference.name)).into(),
                        section: reference.section.as_str().to_string(),
                        name: reference.name,
                    });
                }
            }
            node.tests.push(case);
        }
    }
}

/// An attribute named by a test, with the key it was written under.
struct TestReference {
    section: Section,
    key: &'static str,
    name: String,
}

/// Values map for a test key, the section it resolves in, and the key's
/// canonical spelling.
fn test_values<'c>(
    case: &'c mut TestCase,
    key: &str,
) -> Option<(Section, &'static str, &'c mut IndexMap<String, Value>)> {
    match key {
        "inputs" => Some((Section::Inputs, "inputs", &mut case.inputs)),
        "outputs" => Some((Section::Outputs, "outputs", &mut case.outputs)),
        "state" => Some((Section::State, "state", &mut case.state)),
        "state_get" => Some((Section::State, "state_get", &mut case.state)),
        "state_set" => Some((Section::State, "state_set", &mut case.state_set)),
        _ => None,
    }
}

/// Accepts nested sections (`"inputs": {"a": 1}`) and namespaced keys
/// (`"inputs:a": 1`) alike. References come back in document order.
fn parse_test_case(
    object: &Map<String, Value>,
    path: &FieldPath,
    ctx: &mut ValidationContext,
) -> (TestCase, Vec<TestReference>) {
    let mut case = TestCase::default();
    let mut references = Vec::new();

    for (key, value) in object {
        if is_comment_key(key) {
            continue;
        }
        match key.as_str() {
            "description" => match strings_of(value) {
                Some(lines) => case.description = Some(lines.join("\n")),
                None => ctx.wrong_shape(&path.key(key), "a string or a list of strings"),
            },
            "setup" => case.setup = Some(value.clone()),
            _ => {
                if let Some((section, canonical, values)) = test_values(&mut case, key) {
                    let Value::Object(given) = value else {
                        ctx.wrong_shape(&path.key(key), "an object of attribute values");
                        continue;
                    };
                    for (name, v) in given {
                        if is_comment_key(name) {
                            continue;
                        }
                        values.insert(name.clone(), v.clone());
                        references.push(TestReference {
                            section,
                            key: canonical,
                            name: name.clone(),
                        });
                    }
                } else if let Some((prefix, name)) = key.split_once(':') {
                    match test_values(&mut case, prefix) {
                        Some((section, canonical, values)) => {
                            values.insert(name.to_string(), value.clone());
                            references.push(TestReference {
                                section,
                                key: canonical,
                                name: name.to_string(),
                            });
                        }
                        None => log::debug!("{}: ignoring test key '{}'", path, key),
                    }
                } else {
                    log::debug!("{}: ignoring test key '{}'", path, key);
                }
            }
        }
    }

    (case, references)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::error::DiagnosticKind;
    use serde_json::json;

    fn run(stage: &dyn ValidationStage, raw: Value) -> (NodeDefinition, Vec<Diagnostic>) {
        let raw = match raw {
            Value::Object(map) => map,
            _ => panic!("entry must be an object"),
        };
        let entry = EntryInput::new("N", &raw);
        let mut node = NodeDefinition::new("N");
        let mut ctx = ValidationContext::new();
        stage.apply(&entry, &mut node, &mut ctx, &ValidationOptions::default());
        (node, ctx.into_diagnostics())
    }

    fn kinds(diagnostics: &[Diagnostic]) -> Vec<DiagnosticKind> {
        diagnostics.iter().map(|d| d.kind()).collect()
    }

    #[test]
    fn test_required_fields_missing() {
        let (_, diagnostics) = run(&RequiredFieldValidation, json!({}));
        let paths: Vec<_> = diagnostics.iter().map(|d| d.path().to_string()).collect();
        assert_eq!(paths, vec!["N.description", "N.uiName", "N.categories", "N.metadata"]);
        assert!(diagnostics
            .iter()
            .all(|d| d.kind() == DiagnosticKind::RequiredFieldMissing));
    }

    #[test]
    fn test_required_fields_shapes() {
        let (node, diagnostics) = run(
            &RequiredFieldValidation,
            json!({
                "description": ["Line one", "Line two"],
                "uiName": "X",
                "version": 0,
                "language": "rust",
                "categories": "math",
                "metadata": {"author": "Me"},
                "singleton": true
            }),
        );
        assert_eq!(
            kinds(&diagnostics),
            vec![DiagnosticKind::WrongFieldShape; 3]
        );
        assert_eq!(diagnostics[0].path(), "N.version");
        assert_eq!(diagnostics[1].path(), "N.language");
        assert_eq!(diagnostics[2].path(), "N.uiName");
        assert_eq!(node.description.len(), 2);
        assert!(node.singleton);
        assert_eq!(node.author(), Some("Me"));
    }

    #[test]
    fn test_version_and_language_default() {
        let (node, diagnostics) = run(
            &RequiredFieldValidation,
            json!({"description": "d", "uiName": "Node", "categories": [], "metadata": {}}),
        );
        assert!(diagnostics.is_empty());
        assert_eq!(node.version, 1);
        assert_eq!(node.language, Language::Cpp);
        assert!(!node.singleton);
    }

    #[test]
    fn test_icon_shorthand() {
        let (node, diagnostics) = run(&ShorthandNormalization, json!({"icon": "icons/Foo.svg"}));
        assert!(diagnostics.is_empty());
        let icon = node.icon.unwrap();
        assert_eq!(icon.path, "icons/Foo.svg");
        assert_eq!(icon.color, Color::WHITE);
        assert_eq!(icon.background_color, Color::TRANSPARENT);
    }

    #[test]
    fn test_icon_object() {
        let (node, diagnostics) = run(
            &ShorthandNormalization,
            json!({"icon": {
                "path": "icons/CompanyLogo.svg",
                "color": "#FF123456",
                "backgroundColor": [86, 52, 18, 255],
                "borderColor": "#FF3E3E3E"
            }}),
        );
        assert!(diagnostics.is_empty());
        let icon = node.icon.unwrap();
        assert_eq!(icon.color, icon.background_color);

        let (node, diagnostics) = run(
            &ShorthandNormalization,
            json!({"icon": {"color": "#FFF", "borderColor": [1, 2, 3, 999]}}),
        );
        assert!(node.icon.is_none());
        let paths: Vec<_> = diagnostics.iter().map(|d| d.path()).collect();
        assert_eq!(paths, vec!["N.icon.path", "N.icon.color", "N.icon.borderColor"]);
    }

    #[test]
    fn test_tags() {
        let (node, _) = run(&ShorthandNormalization, json!({"tags": "fruit,example,chocolate"}));
        assert_eq!(node.tags, vec!["fruit", "example", "chocolate"]);

        let (node, _) = run(&ShorthandNormalization, json!({"tags": ["fruit", "a,b"]}));
        assert_eq!(node.tags, vec!["fruit", "a,b"]);

        let (_, diagnostics) = run(&ShorthandNormalization, json!({"tags": 4}));
        assert_eq!(kinds(&diagnostics), vec![DiagnosticKind::WrongFieldShape]);
    }

    #[test]
    fn test_tokens() {
        let (node, _) = run(&ShorthandNormalization, json!({"tokens": "apple"}));
        assert_eq!(node.tokens["apple"], "apple");

        let (node, _) = run(&ShorthandNormalization, json!({"tokens": ["apple", "banana"]}));
        assert_eq!(node.tokens.len(), 2);

        let (node, _) = run(
            &ShorthandNormalization,
            json!({"tokens": {"apple": "Granny Smith", "pear": "Bosc Pear"}}),
        );
        assert_eq!(node.tokens["pear"], "Bosc Pear");

        let (_, diagnostics) = run(&ShorthandNormalization, json!({"tokens": {"a": 1}}));
        assert_eq!(diagnostics[0].path(), "N.tokens");
    }

    #[test]
    fn test_categories() {
        let (node, _) = run(
            &ShorthandNormalization,
            json!({"categories": "math:operator,function"}),
        );
        assert_eq!(node.categories, vec!["math:operator", "function"]);

        let (node, _) = run(
            &ShorthandNormalization,
            json!({"categories": {"myCategory": "Things of mine"}}),
        );
        assert_eq!(node.categories, vec!["myCategory"]);
        assert_eq!(node.category_definitions["myCategory"], "Things of mine");
    }

    #[test]
    fn test_exclude() {
        let (node, diagnostics) = run(
            &ExcludeValidation,
            json!({"exclude": ["python", "rust", "docs", 3]}),
        );
        assert_eq!(node.exclude, vec![ExcludeTarget::Python, ExcludeTarget::Docs]);
        assert_eq!(
            kinds(&diagnostics),
            vec![DiagnosticKind::InvalidExcludeValue; 2]
        );
        assert_eq!(diagnostics[0].path(), "N.exclude[1]");
        assert_eq!(diagnostics[1].path(), "N.exclude[3]");
    }

    #[test]
    fn test_scheduling_redundant() {
        let (node, diagnostics) = run(
            &SchedulingValidation,
            json!({"scheduling": ["global", "global-read", "global-write"]}),
        );
        assert_eq!(node.scheduling.len(), 3);
        assert_eq!(kinds(&diagnostics), vec![DiagnosticKind::RedundantSchedulingFlag]);
        assert!(!diagnostics[0].is_error());
    }

    #[test]
    fn test_scheduling_partial_is_fine() {
        let (node, diagnostics) = run(
            &SchedulingValidation,
            json!({"scheduling": "usd-read, usd-write, threadsafe"}),
        );
        assert!(diagnostics.is_empty());
        assert_eq!(
            node.scheduling,
            vec![SchedulingFlag::UsdRead, SchedulingFlag::UsdWrite, SchedulingFlag::Threadsafe]
        );
    }

    #[test]
    fn test_scheduling_unknown_and_repeated() {
        let (node, diagnostics) = run(
            &SchedulingValidation,
            json!({"scheduling": ["pure", "fast", "pure"]}),
        );
        assert_eq!(node.scheduling, vec![SchedulingFlag::Pure]);
        assert_eq!(
            kinds(&diagnostics),
            vec![DiagnosticKind::WrongFieldShape, DiagnosticKind::RedundantSchedulingFlag]
        );
    }

    #[test]
    fn test_attributes_cross_section_reuse() {
        let (node, diagnostics) = run(
            &AttributeValidation,
            json!({
                "inputs": {"mesh": {"description": "in", "type": "bundle"}},
                "outputs": {"mesh": {"description": "out", "type": "bundle"}},
                "state": {"$comment": "nothing yet"}
            }),
        );
        assert!(diagnostics.is_empty());
        assert!(node.inputs.contains_key("mesh"));
        assert!(node.outputs.contains_key("mesh"));
        assert!(node.state.is_empty());
    }

    #[test]
    fn test_attribute_diagnostic_order() {
        let (_, diagnostics) = run(
            &AttributeValidation,
            json!({
                "state": {"s": {"description": "s", "type": "nope"}},
                "inputs": {
                    "b": {"description": "b", "type": "int", "default": [1]},
                    "a": {"type": "int"}
                }
            }),
        );
        let paths: Vec<_> = diagnostics.iter().map(|d| d.path()).collect();
        assert_eq!(
            paths,
            vec!["N.inputs.b.default", "N.inputs.a.description", "N.state.s.type"]
        );
    }

    #[test]
    fn test_test_references() {
        let (node, diagnostics) = run(
            &TestReferenceValidation,
            json!({
                "inputs": {"a": {}},
                "outputs": {"sum": {}},
                "tests": [
                    {"inputs:a": 1, "outputs:sum": 1, "description": "flat"},
                    {"inputs": {"a": 2}, "outputs": {"doesNotExist": 3}},
                    {"state_set": {"counter": 0}}
                ]
            }),
        );
        assert_eq!(node.tests.len(), 3);
        assert_eq!(node.tests[0].inputs["a"], json!(1));
        assert_eq!(node.tests[0].description.as_deref(), Some("flat"));
        assert_eq!(
            kinds(&diagnostics),
            vec![DiagnosticKind::UnresolvedTestReference; 2]
        );
        assert_eq!(diagnostics[0].path(), "N.tests[1].outputs.doesNotExist");
        assert_eq!(diagnostics[1].path(), "N.tests[2].state_set.counter");
    }

    #[test]
    fn test_state_get_reports_under_its_own_key() {
        let (node, diagnostics) = run(
            &TestReferenceValidation,
            json!({
                "state": {"count": {}},
                "tests": [
                    {"state_get": {"count": 1, "missing": 1}},
                    {"state_get:gone": 2, "state:count": 3}
                ]
            }),
        );
        let paths: Vec<_> = diagnostics.iter().map(|d| d.path()).collect();
        assert_eq!(
            paths,
            vec!["N.tests[0].state_get.missing", "N.tests[1].state_get.gone"]
        );
        assert_eq!(node.tests[1].state["count"], json!(3));
    }

    #[test]
    fn test_illegal_memory_settings() {
        let (node, diagnostics) = run(
            &RequiredFieldValidation,
            json!({
                "description": "d",
                "uiName": "Node",
                "categories": [],
                "metadata": {},
                "memoryType": "gpu",
                "cudaPointers": "host"
            }),
        );
        let paths: Vec<_> = diagnostics.iter().map(|d| d.path()).collect();
        assert_eq!(paths, vec!["N.memoryType", "N.cudaPointers"]);
        assert_eq!(
            kinds(&diagnostics),
            vec![DiagnosticKind::WrongFieldShape; 2]
        );
        assert!(node.memory_type.is_none());
        assert!(node.cuda_pointers.is_none());

        let (node, diagnostics) = run(
            &RequiredFieldValidation,
            json!({
                "description": "d",
                "uiName": "Node",
                "categories": [],
                "metadata": {},
                "memoryType": "cuda",
                "cudaPointers": "cpu"
            }),
        );
        assert!(diagnostics.is_empty());
        assert_eq!(node.memory_type, Some(MemoryType::Cuda));
        assert_eq!(node.cuda_pointers, Some(CudaPointers::Cpu));
    }
}
