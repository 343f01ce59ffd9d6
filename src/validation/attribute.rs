//! Attribute validation.
//!
//! Validates one entry of an `inputs`, `outputs` or `state` section. All
//! problems are collected; nothing stops at the first error.

use crate::core::attribute::{
    allowed_tokens_of, flag_value, Attribute, AttributeMetadata, AttributeType, MemoryType,
};
use crate::core::context::{is_comment_key, strings_of, FieldPath, ValidationContext};
use crate::core::error::Diagnostic;
use crate::core::types::TypeToken;
use indexmap::{IndexMap, IndexSet};
use serde_json::{Map, Value};

const KNOWN_KEYS: [&str; 11] = [
    "description",
    "type",
    "default",
    "optional",
    "deprecated",
    "memoryType",
    "minimum",
    "maximum",
    "metadata",
    "uiName",
    "unvalidated",
];

/// Validate a standalone attribute; diagnostic paths start at `name`.
pub fn validate_attribute(name: &str, json: &Value) -> Result<Attribute, Vec<Diagnostic>> {
    validate_attribute_at(name, json, &FieldPath::entry(name))
}

/// Validate an attribute located at `path` inside a document.
pub fn validate_attribute_at(
    name: &str,
    json: &Value,
    path: &FieldPath,
) -> Result<Attribute, Vec<Diagnostic>> {
    let mut ctx = ValidationContext::new();

    let object = match json {
        Value::Object(object) => object,
        _ => {
            ctx.wrong_shape(path, "an attribute object");
            return Err(ctx.into_diagnostics());
        }
    };

    let description = match object.get("description") {
        Some(value) => match strings_of(value) {
            Some(lines) => Some(lines.join("\n")),
            None => {
                ctx.wrong_shape(&path.key("description"), "a string or a list of strings");
                None
            }
        },
        None => {
            ctx.missing(&path.key("description"));
            None
        }
    };

    let attr_type = match object.get("type") {
        Some(value) => parse_attribute_type(value, &path.key("type"), &mut ctx),
        None => {
            ctx.missing(&path.key("type"));
            None
        }
    };

    let default = object.get("default").cloned();
    let minimum = object.get("minimum").cloned();
    let maximum = object.get("maximum").cloned();
    if let Some(attr_type) = &attr_type {
        check_values(attr_type, object, path, &mut ctx);
    }

    let optional = ctx.boolean(object, "optional", path).unwrap_or(false);
    let unvalidated = ctx.boolean(object, "unvalidated", path).unwrap_or(false);
    let deprecated = ctx
        .string_or_list(object, "deprecated", path, false)
        .unwrap_or_default();
    let ui_name = ctx.string(object, "uiName", path, false);

    let memory_type = match object.get("memoryType") {
        Some(Value::String(keyword)) => {
            let memory_type = MemoryType::from_keyword(keyword);
            if memory_type.is_none() {
                ctx.wrong_shape(&path.key("memoryType"), "one of cpu, cuda, any");
            }
            memory_type
        }
        Some(_) => {
            ctx.wrong_shape(&path.key("memoryType"), "one of cpu, cuda, any");
            None
        }
        None => None,
    };

    let metadata = match ctx.object(object, "metadata", path, false) {
        Some(map) => validate_metadata(map, &path.key("metadata"), &mut ctx),
        None => AttributeMetadata::default(),
    };

    for key in object.keys() {
        if !is_comment_key(key) && !KNOWN_KEYS.contains(&key.as_str()) {
            log::debug!("{}: ignoring unknown attribute key '{}'", path, key);
        }
    }

    match (description, attr_type) {
        (Some(description), Some(attr_type)) if !ctx.has_errors() => Ok(Attribute {
            name: name.to_string(),
            description,
            attr_type,
            default,
            optional,
            deprecated,
            memory_type,
            minimum,
            maximum,
            metadata,
            ui_name,
            unvalidated,
        }),
        _ => Err(ctx.into_diagnostics()),
    }
}

/// Parse the `type` member: one token or a non-empty list of distinct tokens.
fn parse_attribute_type(
    value: &Value,
    path: &FieldPath,
    ctx: &mut ValidationContext,
) -> Option<AttributeType> {
    match value {
        Value::String(s) => match TypeToken::parse(s) {
            Ok(token) => Some(AttributeType::Single(token)),
            Err(err) => {
                ctx.report(Diagnostic::UnknownTypeToken {
                    path: path.into(),
                    token: err.token,
                });
                None
            }
        },
        Value::Array(items) if !items.is_empty() => {
            let mut set = IndexSet::new();
            let mut ok = true;
            for (i, item) in items.iter().enumerate() {
                let element = path.index(i);
                let Some(s) = item.as_str() else {
                    ctx.wrong_shape(&element, "a type name string");
                    ok = false;
                    continue;
                };
                match TypeToken::parse(s) {
                    Ok(token) => {
                        if !set.insert(token) {
                            ctx.report(Diagnostic::DuplicateTypeInSet {
                                path: (&element).into(),
                                token: token.to_string(),
                            });
                            ok = false;
                        }
                    }
                    Err(err) => {
                        ctx.report(Diagnostic::UnknownTypeToken {
                            path: (&element).into(),
                            token: err.token,
                        });
                        ok = false;
                    }
                }
            }
            ok.then_some(AttributeType::AnyOf(set))
        }
        _ => {
            ctx.wrong_shape(path, "a type name or a non-empty list of type names");
            None
        }
    }
}

/// Shape-check `default`, `minimum` and `maximum` against the type.
fn check_values(
    attr_type: &AttributeType,
    object: &Map<String, Value>,
    path: &FieldPath,
    ctx: &mut ValidationContext,
) {
    if let Some(default) = object.get("default") {
        if !attr_type.accepts_value(default) {
            ctx.report(Diagnostic::InvalidDefaultShape {
                path: (&path.key("default")).into(),
                type_name: attr_type.to_string(),
                expected: attr_type.describe_shapes(false),
            });
        }
    }

    for key in ["minimum", "maximum"] {
        if let Some(bound) = object.get(key) {
            if !attr_type.accepts_range(bound) {
                ctx.report(Diagnostic::InvalidRangeShape {
                    path: (&path.key(key)).into(),
                    type_name: attr_type.to_string(),
                    expected: attr_type.describe_shapes(true),
                });
            }
        }
    }
}

/// Keep every metadata key; shape-check the reserved ones.
fn validate_metadata(
    map: &Map<String, Value>,
    path: &FieldPath,
    ctx: &mut ValidationContext,
) -> AttributeMetadata {
    let mut metadata = IndexMap::new();

    for (key, value) in map {
        if is_comment_key(key) {
            continue;
        }
        match key.as_str() {
            AttributeMetadata::ALLOWED_TOKENS => {
                if allowed_tokens_of(value).is_none() {
                    ctx.wrong_shape(
                        &path.key(key),
                        "a comma-separated string, a list of strings or a string mapping",
                    );
                }
            }
            AttributeMetadata::ALLOW_MULTI_INPUTS
            | AttributeMetadata::HIDDEN
            | AttributeMetadata::INTERNAL
            | AttributeMetadata::LITERAL_ONLY
            | AttributeMetadata::OUTPUT_ONLY => {
                if flag_value(value).is_none() {
                    ctx.wrong_shape(
                        &path.key(key),
                        "\"1\", \"0\", \"true\", \"false\" or a boolean",
                    );
                }
            }
            _ => {}
        }
        metadata.insert(key.clone(), value.clone());
    }

    AttributeMetadata(metadata)
}
