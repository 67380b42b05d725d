//! Ingest Curator common types, record schema, and errors.
//!
//! This crate provides foundational types shared across the curator crates:
//! - The fixed record schema and its validator
//! - Validated and enriched record types
//! - Output format selection
//! - Common error types

pub mod error;
pub mod output;
pub mod record;
pub mod schema;

pub use error::{Error, Result, StorageError};
pub use output::OutputFormat;
pub use record::{EnrichedRecord, Fields, Record, INGESTED_AT_FIELD, SOURCE_FILE_FIELD};
pub use schema::{record_schema, validate, SchemaViolation, SCHEMA_VERSION};

/// Key prefix under which every curated artifact is stored.
pub const VALIDATED_PREFIX: &str = "validated/";
