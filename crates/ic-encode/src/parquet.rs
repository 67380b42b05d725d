//! Arrow/Parquet columnar encoder.
//!
//! The batch is converted into a single Arrow `RecordBatch` whose columns
//! follow the first record's fields, then written as one Parquet file with
//! Snappy-compressed column chunks. Every column is nullable.
//!
//! Column types are inferred from the first record:
//!
//! | JSON value        | Arrow type |
//! |-------------------|------------|
//! | integer           | `Int64`    |
//! | float             | `Float64`  |
//! | boolean           | `Boolean`  |
//! | string, null, ... | `Utf8`     |

use crate::{EncodedBody, EncodeError, Encoder};
use arrow::array::{
    Array, ArrayRef, BooleanArray, Float64Array, Int32Array, Int64Array, StringArray,
};
use arrow::datatypes::{DataType, Field, Schema, SchemaRef};
use arrow::record_batch::RecordBatch;
use bytes::Bytes;
use ic_common::{EnrichedRecord, Fields, OutputFormat, INGESTED_AT_FIELD, SOURCE_FILE_FIELD};
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use parquet::arrow::ArrowWriter;
use parquet::basic::Compression;
use parquet::file::properties::WriterProperties;
use serde_json::{Number, Value};
use std::sync::Arc;
use tracing::debug;

/// Schema of an enriched record, used when a batch has no rows to infer from.
pub fn canonical_schema() -> Schema {
    Schema::new(vec![
        Field::new("id", DataType::Int64, true),
        Field::new("ts", DataType::Utf8, true),
        Field::new("value", DataType::Float64, true),
        Field::new(INGESTED_AT_FIELD, DataType::Utf8, true),
        Field::new(SOURCE_FILE_FIELD, DataType::Utf8, true),
    ])
}

/// Writes the batch as a Parquet file.
#[derive(Debug, Clone)]
pub struct ParquetEncoder {
    compression: Compression,
}

impl Default for ParquetEncoder {
    fn default() -> Self {
        Self {
            compression: Compression::SNAPPY,
        }
    }
}

impl ParquetEncoder {
    pub fn with_compression(compression: Compression) -> Self {
        Self { compression }
    }

    fn schema_for(records: &[EnrichedRecord]) -> Schema {
        match records.first() {
            Some(first) => Schema::new(
                first
                    .fields()
                    .iter()
                    .map(|(name, value)| Field::new(name, arrow_type(value), true))
                    .collect::<Vec<_>>(),
            ),
            None => canonical_schema(),
        }
    }

    fn to_record_batch(records: &[EnrichedRecord]) -> Result<RecordBatch, EncodeError> {
        let schema: SchemaRef = Arc::new(Self::schema_for(records));
        let columns = schema
            .fields()
            .iter()
            .map(|field| build_column(field.name(), field.data_type(), records))
            .collect::<Vec<ArrayRef>>();
        Ok(RecordBatch::try_new(schema, columns)?)
    }
}

impl Encoder for ParquetEncoder {
    fn format(&self) -> OutputFormat {
        OutputFormat::Parquet
    }

    fn encode(&self, records: &[EnrichedRecord]) -> Result<EncodedBody, EncodeError> {
        let batch = Self::to_record_batch(records)?;
        let props = WriterProperties::builder()
            .set_compression(self.compression)
            .build();

        let mut writer = ArrowWriter::try_new(Vec::new(), batch.schema(), Some(props))?;
        writer.write(&batch)?;
        let bytes = writer.into_inner()?;

        debug!(
            rows = batch.num_rows(),
            columns = batch.num_columns(),
            bytes = bytes.len(),
            "encoded parquet artifact"
        );
        Ok(EncodedBody::new(OutputFormat::Parquet, bytes))
    }

    fn decode(&self, bytes: &[u8]) -> Result<Vec<Fields>, EncodeError> {
        let reader =
            ParquetRecordBatchReaderBuilder::try_new(Bytes::copy_from_slice(bytes))?.build()?;

        let mut rows = Vec::new();
        for batch in reader {
            let batch = batch?;
            let schema = batch.schema();
            for row in 0..batch.num_rows() {
                let mut fields = Fields::new();
                for (index, field) in schema.fields().iter().enumerate() {
                    let value = cell_value(batch.column(index).as_ref(), row)?;
                    fields.insert(field.name().clone(), value);
                }
                rows.push(fields);
            }
        }
        Ok(rows)
    }
}

fn arrow_type(value: &Value) -> DataType {
    match value {
        Value::Number(n) if n.is_f64() => DataType::Float64,
        Value::Number(_) => DataType::Int64,
        Value::Bool(_) => DataType::Boolean,
        _ => DataType::Utf8,
    }
}

fn build_column(name: &str, data_type: &DataType, records: &[EnrichedRecord]) -> ArrayRef {
    let values = records.iter().map(|record| record.fields().get(name));
    match data_type {
        DataType::Int64 => Arc::new(
            values
                .map(|v| v.and_then(Value::as_i64))
                .collect::<Int64Array>(),
        ),
        DataType::Float64 => Arc::new(
            values
                .map(|v| v.and_then(Value::as_f64))
                .collect::<Float64Array>(),
        ),
        DataType::Boolean => Arc::new(
            values
                .map(|v| v.and_then(Value::as_bool))
                .collect::<BooleanArray>(),
        ),
        _ => Arc::new(
            values
                .map(|v| match v {
                    None | Some(Value::Null) => None,
                    Some(Value::String(s)) => Some(s.clone()),
                    Some(other) => Some(other.to_string()),
                })
                .collect::<StringArray>(),
        ),
    }
}

fn cell_value(column: &dyn Array, row: usize) -> Result<Value, EncodeError> {
    if column.is_null(row) {
        return Ok(Value::Null);
    }

    let unsupported = || {
        EncodeError::malformed(
            OutputFormat::Parquet,
            format!("unsupported column type {}", column.data_type()),
        )
    };
    let any = column.as_any();

    let value = match column.data_type() {
        DataType::Int64 => any
            .downcast_ref::<Int64Array>()
            .map(|a| Value::from(a.value(row))),
        DataType::Int32 => any
            .downcast_ref::<Int32Array>()
            .map(|a| Value::from(a.value(row))),
        DataType::Float64 => any
            .downcast_ref::<Float64Array>()
            .map(|a| Number::from_f64(a.value(row)).map_or(Value::Null, Value::Number)),
        DataType::Boolean => any
            .downcast_ref::<BooleanArray>()
            .map(|a| Value::Bool(a.value(row))),
        DataType::Utf8 => any
            .downcast_ref::<StringArray>()
            .map(|a| Value::String(a.value(row).to_string())),
        _ => None,
    };
    value.ok_or_else(unsupported)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::batch;
    use serde_json::json;

    #[test]
    fn test_output_is_parquet() {
        let body = ParquetEncoder::default().encode(&batch()).unwrap();
        assert_eq!(&body.bytes[..4], b"PAR1");
        assert_eq!(&body.bytes[body.bytes.len() - 4..], b"PAR1");
        assert_eq!(body.content_type, "application/octet-stream");
        assert_eq!(body.extension, "parquet");
    }

    #[test]
    fn test_columns_follow_record_shape() {
        let batch = ParquetEncoder::to_record_batch(&batch()).unwrap();
        let schema = batch.schema();
        let names: Vec<&str> = schema.fields().iter().map(|f| f.name().as_str()).collect();
        assert_eq!(names, vec!["id", "ts", "value", "_ingested_at", "_source_file"]);
        assert_eq!(schema.field(0).data_type(), &DataType::Int64);
        assert_eq!(schema.field(2).data_type(), &DataType::Float64);
        assert_eq!(batch.num_rows(), 3);
    }

    #[test]
    fn test_empty_batch_writes_zero_rows_with_canonical_schema() {
        let encoder = ParquetEncoder::default();
        let body = encoder.encode(&[]).unwrap();
        assert!(encoder.decode(&body.bytes).unwrap().is_empty());

        let reader = ParquetRecordBatchReaderBuilder::try_new(Bytes::from(body.bytes)).unwrap();
        let expected = canonical_schema();
        let schema = reader.schema();
        assert_eq!(schema.fields().len(), expected.fields().len());
        for (actual, wanted) in schema.fields().iter().zip(expected.fields().iter()) {
            assert_eq!(actual.name(), wanted.name());
            assert_eq!(actual.data_type(), wanted.data_type());
        }
    }

    #[test]
    fn test_round_trip_preserves_values() {
        let encoder = ParquetEncoder::with_compression(Compression::UNCOMPRESSED);
        let records = batch();
        let body = encoder.encode(&records).unwrap();
        let decoded = encoder.decode(&body.bytes).unwrap();
        assert_eq!(decoded.len(), 3);
        assert_eq!(decoded[0]["id"], json!(1));
        assert_eq!(decoded[2]["value"], json!(99.75));
        assert_eq!(decoded[1]["_source_file"], json!("raw/input.json"));
    }

    #[test]
    fn test_decode_rejects_garbage() {
        assert!(ParquetEncoder::default().decode(b"not parquet").is_err());
    }
}
