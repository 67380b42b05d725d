//! The fixed record schema and its validator.
//!
//! Every input record must be an object with exactly three fields:
//!
//! | field   | type    |
//! |---------|---------|
//! | `id`    | integer |
//! | `ts`    | string  |
//! | `value` | number  |
//!
//! Additional properties are rejected. The same shape is published as a
//! Draft 7 JSON Schema document by [`record_schema`].

use serde_json::{json, Value};
use thiserror::Error;

/// Version of the record schema.
///
/// Follows semver: MAJOR.MINOR.PATCH
/// - MAJOR: Breaking changes (field removals, type changes)
/// - MINOR: Additive changes (new optional fields)
/// - PATCH: Bug fixes, documentation
pub const SCHEMA_VERSION: &str = "1.0.0";

/// Required fields, in the order they are checked.
pub const REQUIRED_FIELDS: [&str; 3] = ["id", "ts", "value"];

/// Why a record failed validation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaViolation {
    #[error("record must be a JSON object, got {found}")]
    NotAnObject { found: &'static str },

    #[error("missing required field '{0}'")]
    MissingField(&'static str),

    #[error("unexpected field '{0}' (additional properties are not allowed)")]
    UnexpectedField(String),

    #[error("field '{field}' must be {expected}, got {found}")]
    WrongType {
        field: &'static str,
        expected: &'static str,
        found: String,
    },

    #[error("field '{0}' is reserved for enrichment metadata")]
    ReservedField(&'static str),
}

/// The record schema as a Draft 7 JSON Schema document.
pub fn record_schema() -> Value {
    json!({
        "$schema": "http://json-schema.org/draft-07/schema#",
        "title": "Record",
        "version": SCHEMA_VERSION,
        "type": "object",
        "properties": {
            "id": {"type": "integer"},
            "ts": {"type": "string"},
            "value": {"type": "number"}
        },
        "required": REQUIRED_FIELDS,
        "additionalProperties": false
    })
}

/// Check a parsed record against the fixed schema.
///
/// Violations are reported in a fixed order: shape, missing fields,
/// unexpected fields, then field types.
pub fn validate(record: &Value) -> Result<(), SchemaViolation> {
    let fields = match record {
        Value::Object(fields) => fields,
        other => {
            return Err(SchemaViolation::NotAnObject {
                found: json_type_name(other),
            })
        }
    };

    for name in REQUIRED_FIELDS {
        if !fields.contains_key(name) {
            return Err(SchemaViolation::MissingField(name));
        }
    }

    if let Some(extra) = fields
        .keys()
        .find(|key| !REQUIRED_FIELDS.contains(&key.as_str()))
    {
        return Err(SchemaViolation::UnexpectedField(extra.clone()));
    }

    let id = &fields["id"];
    if as_integer(id).is_none() {
        let found = match id {
            Value::Number(_) => format!("non-integral or out-of-range number {id}"),
            other => json_type_name(other).to_string(),
        };
        return Err(SchemaViolation::WrongType {
            field: "id",
            expected: "an integer",
            found,
        });
    }

    if !fields["ts"].is_string() {
        return Err(SchemaViolation::WrongType {
            field: "ts",
            expected: "a string",
            found: json_type_name(&fields["ts"]).to_string(),
        });
    }

    if !fields["value"].is_number() {
        return Err(SchemaViolation::WrongType {
            field: "value",
            expected: "a number",
            found: json_type_name(&fields["value"]).to_string(),
        });
    }

    Ok(())
}

/// Interpret a JSON value as a 64-bit integer.
///
/// Floats with no fractional part count as integers, as in Draft 7.
pub fn as_integer(value: &Value) -> Option<i64> {
    let number = value.as_number()?;
    if let Some(i) = number.as_i64() {
        return Some(i);
    }
    if number.is_u64() {
        return None;
    }
    let f = number.as_f64()?;
    if f.fract() == 0.0 && f >= i64::MIN as f64 && f < i64::MAX as f64 {
        Some(f as i64)
    } else {
        None
    }
}

/// Human-readable JSON type name used in violation messages.
pub fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(n) if n.is_f64() => "number",
        Value::Number(_) => "integer",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
