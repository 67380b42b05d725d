//! Indented JSON encoder.

use crate::{EncodedBody, EncodeError, Encoder};
use ic_common::schema::json_type_name;
use ic_common::{EnrichedRecord, Fields, OutputFormat};
use serde_json::Value;
use tracing::debug;

/// Writes the batch as a pretty-printed JSON array.
///
/// An empty batch produces `[]`.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonEncoder;

impl Encoder for JsonEncoder {
    fn format(&self) -> OutputFormat {
        OutputFormat::Json
    }

    fn encode(&self, records: &[EnrichedRecord]) -> Result<EncodedBody, EncodeError> {
        let bytes = serde_json::to_vec_pretty(records)?;
        debug!(rows = records.len(), bytes = bytes.len(), "encoded json artifact");
        Ok(EncodedBody::new(OutputFormat::Json, bytes))
    }

    fn decode(&self, bytes: &[u8]) -> Result<Vec<Fields>, EncodeError> {
        let items = match serde_json::from_slice::<Value>(bytes)? {
            Value::Array(items) => items,
            other => {
                return Err(EncodeError::malformed(
                    OutputFormat::Json,
                    format!("expected an array of records, got {}", json_type_name(&other)),
                ))
            }
        };

        items
            .into_iter()
            .enumerate()
            .map(|(index, item)| match item {
                Value::Object(fields) => Ok(fields),
                other => Err(EncodeError::malformed(
                    OutputFormat::Json,
                    format!("element {index} is {}, not an object", json_type_name(&other)),
                )),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::batch;

    #[test]
    fn test_output_is_indented_utf8() {
        let body = JsonEncoder.encode(&batch()).unwrap();
        let text = String::from_utf8(body.bytes).unwrap();
        assert!(text.starts_with("[\n  {\n    \"id\": 1,"));
        assert!(text.contains("\"_source_file\": \"raw/input.json\""));
        assert_eq!(body.content_type, "application/json");
        assert_eq!(body.content_encoding, None);
        assert_eq!(body.extension, "json");
    }

    #[test]
    fn test_empty_batch_is_empty_array() {
        let body = JsonEncoder.encode(&[]).unwrap();
        assert_eq!(body.bytes, b"[]");
        assert!(JsonEncoder.decode(&body.bytes).unwrap().is_empty());
    }

    #[test]
    fn test_decode_rejects_non_array() {
        let err = JsonEncoder.decode(br#"{"id": 1}"#).unwrap_err();
        assert!(matches!(err, EncodeError::Malformed { .. }));
    }

    #[test]
    fn test_decode_rejects_non_object_element() {
        let err = JsonEncoder.decode(b"[1, 2]").unwrap_err();
        assert!(err.to_string().contains("element 0"));
    }

    #[test]
    fn test_decode_keeps_nulls() {
        let decoded = JsonEncoder
            .decode(br#"[{"id": 1, "value": null}]"#)
            .unwrap();
        assert!(decoded[0]["value"].is_null());
    }
}
