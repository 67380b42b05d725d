//! Gzip-compressed CSV encoder.
//!
//! Column order is taken from the first record's field order. The header row
//! and every data row are written to an in-memory CSV stream which is then
//! gzip-compressed as a whole, so the compression ratio can be reported.

use crate::{EncodedBody, EncodeError, Encoder};
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use ic_common::{EnrichedRecord, Fields, OutputFormat};
use serde_json::{Number, Value};
use std::io::{Read, Write};
use tracing::info;

/// Writes the batch as gzip-compressed CSV with a header row.
///
/// Unlike the JSON encoder, an empty batch is refused with
/// [`EncodeError::EmptyBatch`] instead of producing an empty file.
#[derive(Debug, Clone, Copy)]
pub struct CsvGzipEncoder {
    level: Compression,
}

impl CsvGzipEncoder {
    /// Encoder with an explicit gzip level (0-9).
    pub fn with_level(level: u32) -> Self {
        Self {
            level: Compression::new(level.min(9)),
        }
    }
}

impl Default for CsvGzipEncoder {
    fn default() -> Self {
        Self {
            level: Compression::default(),
        }
    }
}

/// Fraction of bytes saved by compression: `1 - compressed / original`.
///
/// Zero when there was nothing to compress.
pub fn compression_ratio(original: usize, compressed: usize) -> f64 {
    if original == 0 {
        return 0.0;
    }
    1.0 - compressed as f64 / original as f64
}

impl Encoder for CsvGzipEncoder {
    fn format(&self) -> OutputFormat {
        OutputFormat::CsvGzip
    }

    fn encode(&self, records: &[EnrichedRecord]) -> Result<EncodedBody, EncodeError> {
        let first = records.first().ok_or(EncodeError::EmptyBatch)?;
        let columns: Vec<&str> = first.fields().keys().map(String::as_str).collect();

        let mut writer = csv::Writer::from_writer(Vec::new());
        writer.write_record(&columns)?;
        for record in records {
            let fields = record.fields();
            writer.write_record(columns.iter().map(|column| cell(fields.get(*column))))?;
        }
        let raw = writer
            .into_inner()
            .map_err(|err| EncodeError::Io(err.into_error()))?;

        let mut gzip = GzEncoder::new(Vec::with_capacity(raw.len() / 2), self.level);
        gzip.write_all(&raw)?;
        let compressed = gzip.finish()?;

        let ratio = compression_ratio(raw.len(), compressed.len());
        info!(
            rows = records.len(),
            original_bytes = raw.len(),
            compressed_bytes = compressed.len(),
            compression_ratio = format!("{:.1}%", ratio * 100.0),
            "compressed csv artifact"
        );

        Ok(EncodedBody::new(OutputFormat::CsvGzip, compressed))
    }

    fn decode(&self, bytes: &[u8]) -> Result<Vec<Fields>, EncodeError> {
        let mut raw = Vec::new();
        GzDecoder::new(bytes).read_to_end(&mut raw)?;

        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .from_reader(raw.as_slice());
        let headers = reader.headers()?.clone();

        let mut rows = Vec::new();
        for row in reader.records() {
            // Rows with a different cell count than the header fail in the reader.
            let row = row?;
            let fields: Fields = headers
                .iter()
                .zip(row.iter())
                .map(|(column, text)| (column.to_string(), typed_cell(column, text)))
                .collect();
            rows.push(fields);
        }
        Ok(rows)
    }
}

/// Render one field as CSV cell text. Missing and null fields are empty.
fn cell(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

/// Recover a typed value from cell text using the record schema.
///
/// `id` and `value` are numeric columns where an empty cell means null; text
/// that does not parse is kept as a string so inspection can flag it.
fn typed_cell(column: &str, text: &str) -> Value {
    match column {
        "id" | "value" if text.is_empty() => Value::Null,
        "id" => text
            .parse::<i64>()
            .map(Value::from)
            .unwrap_or_else(|_| Value::String(text.to_string())),
        "value" => text
            .parse::<f64>()
            .ok()
            .and_then(Number::from_f64)
            .map(Value::Number)
            .unwrap_or_else(|| Value::String(text.to_string())),
        _ => Value::String(text.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{batch, enriched};
    use ic_common::{EnrichedRecord, Record};
    use serde_json::json;

    fn gunzip(bytes: &[u8]) -> String {
        let mut text = String::new();
        GzDecoder::new(bytes).read_to_string(&mut text).unwrap();
        text
    }

    #[test]
    fn test_empty_batch_is_refused() {
        let err = CsvGzipEncoder::default().encode(&[]).unwrap_err();
        assert!(matches!(err, EncodeError::EmptyBatch));
    }

    #[test]
    fn test_output_is_gzip_with_header() {
        let body = CsvGzipEncoder::default().encode(&batch()).unwrap();
        assert_eq!(&body.bytes[..2], &[0x1f, 0x8b]);
        assert_eq!(body.content_type, "text/csv");
        assert_eq!(body.content_encoding, Some("gzip"));
        assert_eq!(body.extension, "csv.gz");

        let text = gunzip(&body.bytes);
        let mut lines = text.lines();
        assert_eq!(
            lines.next(),
            Some("id,ts,value,_ingested_at,_source_file")
        );
        assert_eq!(
            lines.next(),
            Some("1,2024-01-15T08:00:00Z,42.5,2024-01-15T09:30:00.000000Z,raw/input.json")
        );
        assert_eq!(lines.count(), 2);
    }

    #[test]
    fn test_columns_follow_first_record_order() {
        let raw: Value =
            serde_json::from_str(r#"{"value": 5.0, "id": 9, "ts": "2024-02-01T00:00:00Z"}"#)
                .unwrap();
        let record = Record::from_value(raw).unwrap();
        let first = EnrichedRecord::from_parts(record, "now", "raw/b.json").unwrap();
        let records = vec![first, enriched(10, "2024-02-01T00:00:01Z", 6.0)];

        let body = CsvGzipEncoder::default().encode(&records).unwrap();
        let text = gunzip(&body.bytes);
        let mut lines = text.lines();
        assert_eq!(lines.next(), Some("value,id,ts,_ingested_at,_source_file"));
        assert_eq!(lines.nth(1).map(|l| l.starts_with("6.0,10,")), Some(true));
    }

    #[test]
    fn test_fields_with_commas_are_quoted() {
        let record =
            Record::from_value(json!({"id": 1, "ts": "2024-01-15T08:00:00Z", "value": 1.0}))
                .unwrap();
        let enriched = EnrichedRecord::from_parts(record, "now", "raw/a,b.json").unwrap();
        let encoder = CsvGzipEncoder::default();
        let body = encoder.encode(&[enriched.clone()]).unwrap();
        assert!(gunzip(&body.bytes).contains("\"raw/a,b.json\""));
        assert_eq!(encoder.decode(&body.bytes).unwrap()[0], *enriched.fields());
    }

    #[test]
    fn test_decode_types_schema_columns() {
        let csv = "id,ts,value\n7,2024-01-01T00:00:00Z,\n8,2024-01-01T00:00:00Z,abc\n";
        let mut gz = GzEncoder::new(Vec::new(), Compression::default());
        gz.write_all(csv.as_bytes()).unwrap();
        let rows = CsvGzipEncoder::default().decode(&gz.finish().unwrap()).unwrap();
        assert_eq!(rows[0]["id"], json!(7));
        assert!(rows[0]["value"].is_null());
        assert_eq!(rows[1]["value"], json!("abc"));
    }

    #[test]
    fn test_decode_rejects_non_gzip() {
        assert!(CsvGzipEncoder::default().decode(b"id,ts\n1,x\n").is_err());
    }

    #[test]
    fn test_compression_ratio() {
        assert_eq!(compression_ratio(0, 0), 0.0);
        assert!((compression_ratio(1000, 250) - 0.75).abs() < 1e-12);
        let records: Vec<_> = (0..200)
            .map(|i| enriched(i, "2024-01-15T08:00:00Z", 50.0))
            .collect();
        let encoder = CsvGzipEncoder::with_level(9);
        let body = encoder.encode(&records).unwrap();
        assert_eq!(encoder.decode(&body.bytes).unwrap().len(), 200);
    }
}
