//! Ingest Curator artifact encoders.
//!
//! This crate provides:
//! - The [`Encoder`] capability shared by every output format
//! - Indented JSON, gzip-compressed CSV, and Arrow/Parquet encoders
//! - Matching decoders used for round-trips and quality inspection

pub mod csv_gzip;
pub mod encoder;
pub mod error;
pub mod json;
pub mod parquet;

pub use csv_gzip::{compression_ratio, CsvGzipEncoder};
pub use encoder::{encoder_for, EncodedBody, Encoder};
pub use error::EncodeError;
pub use json::JsonEncoder;
pub use parquet::{canonical_schema, ParquetEncoder};

#[cfg(test)]
pub(crate) mod test_support {
    use ic_common::{EnrichedRecord, Record};
    use serde_json::json;

    pub fn enriched(id: i64, ts: &str, value: f64) -> EnrichedRecord {
        let record = Record::from_value(json!({"id": id, "ts": ts, "value": value}))
            .expect("valid record");
        EnrichedRecord::from_parts(record, "2024-01-15T09:30:00.000000Z", "raw/input.json")
            .expect("enrichable record")
    }

    pub fn batch() -> Vec<EnrichedRecord> {
        vec![
            enriched(1, "2024-01-15T08:00:00Z", 42.5),
            enriched(2, "2024-01-15T08:05:00Z", 0.0),
            enriched(3, "2024-01-15T08:10:00+00:00", 99.75),
        ]
    }
}
