//! Validated and enriched record types.
//!
//! A [`Record`] can only be built from a value that passed
//! [`validate`](crate::schema::validate), so holding one is proof of schema
//! conformance. Field order of the source document is preserved.

use crate::schema::{as_integer, validate, SchemaViolation};
use serde::Serialize;
use serde_json::{Map, Number, Value};

/// Ordered field map backing every record.
pub type Fields = Map<String, Value>;

/// Enrichment field carrying the processing timestamp.
pub const INGESTED_AT_FIELD: &str = "_ingested_at";

/// Enrichment field carrying the originating artifact key.
pub const SOURCE_FILE_FIELD: &str = "_source_file";

/// A record that satisfies the fixed schema.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Record(Fields);

impl Record {
    /// Validate a parsed value and normalize its numeric fields.
    ///
    /// `id` becomes a JSON integer and `value` a 64-bit float, so every
    /// encoding reproduces the same values on decode.
    pub fn from_value(value: Value) -> Result<Self, SchemaViolation> {
        validate(&value)?;
        let mut fields = match value {
            Value::Object(fields) => fields,
            _ => return Err(SchemaViolation::NotAnObject { found: "non-object" }),
        };

        if let Some(id) = fields.get("id").and_then(as_integer) {
            fields.insert("id".to_string(), Value::from(id));
        }
        if let Some(number) = fields
            .get("value")
            .and_then(Value::as_f64)
            .and_then(Number::from_f64)
        {
            fields.insert("value".to_string(), Value::Number(number));
        }

        Ok(Record(fields))
    }

    pub fn value(&self) -> f64 {
        self.0.get("value").and_then(Value::as_f64).unwrap_or_default()
    }

    pub fn fields(&self) -> &Fields {
        &self.0
    }

    pub fn into_fields(self) -> Fields {
        self.0
    }
}

/// A validated record carrying provenance metadata.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct EnrichedRecord(Fields);

impl EnrichedRecord {
    /// Append the two enrichment fields after the record's own fields.
    ///
    /// Fails if either field name is already present.
    pub fn from_parts(
        record: Record,
        ingested_at: &str,
        source_file: &str,
    ) -> Result<Self, SchemaViolation> {
        let mut fields = record.into_fields();
        for reserved in [INGESTED_AT_FIELD, SOURCE_FILE_FIELD] {
            if fields.contains_key(reserved) {
                return Err(SchemaViolation::ReservedField(reserved));
            }
        }
        fields.insert(
            INGESTED_AT_FIELD.to_string(),
            Value::String(ingested_at.to_string()),
        );
        fields.insert(
            SOURCE_FILE_FIELD.to_string(),
            Value::String(source_file.to_string()),
        );
        Ok(EnrichedRecord(fields))
    }

    pub fn ts(&self) -> &str {
        self.0.get("ts").and_then(Value::as_str).unwrap_or_default()
    }

    pub fn ingested_at(&self) -> &str {
        self.0
            .get(INGESTED_AT_FIELD)
            .and_then(Value::as_str)
            .unwrap_or_default()
    }

    pub fn source_file(&self) -> &str {
        self.0
            .get(SOURCE_FILE_FIELD)
            .and_then(Value::as_str)
            .unwrap_or_default()
    }

    pub fn fields(&self) -> &Fields {
        &self.0
    }
}
