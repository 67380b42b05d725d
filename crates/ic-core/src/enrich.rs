//! Record enrichment with provenance metadata.
//!
//! Enrichment only ever runs on validated records: the schema forbids
//! additional properties, so an input record can never already carry the
//! enrichment fields.

use chrono::{DateTime, SecondsFormat, Utc};
use ic_common::{EnrichedRecord, Error, Record, Result, SchemaViolation};

/// Render an ingestion instant as RFC 3339 UTC with microseconds.
pub fn format_timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// Stamp one record with `_ingested_at` and `_source_file`.
pub fn enrich(
    record: Record,
    source_file: &str,
    ingested_at: DateTime<Utc>,
) -> std::result::Result<EnrichedRecord, SchemaViolation> {
    EnrichedRecord::from_parts(record, &format_timestamp(ingested_at), source_file)
}

/// Enrich a whole batch with one ingestion instant, preserving order.
pub fn enrich_batch(
    records: Vec<Record>,
    source_file: &str,
    ingested_at: DateTime<Utc>,
) -> Result<Vec<EnrichedRecord>> {
    records
        .into_iter()
        .enumerate()
        .map(|(index, record)| {
            enrich(record, source_file, ingested_at)
                .map_err(|violation| Error::SchemaViolation { index, violation })
        })
        .collect()
}
