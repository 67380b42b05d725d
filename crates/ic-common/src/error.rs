//! Error types for Ingest Curator.

use crate::schema::SchemaViolation;
use thiserror::Error;

/// Result type alias for curator operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Unified error type for Ingest Curator.
#[derive(Error, Debug)]
pub enum Error {
    // Input errors (10-19)
    #[error("malformed input in {key}: {reason}")]
    MalformedInput { key: String, reason: String },

    #[error("schema violation in record {index}: {violation}")]
    SchemaViolation {
        index: usize,
        #[source]
        violation: SchemaViolation,
    },

    #[error("malformed timestamp {value:?}: {reason}")]
    MalformedTimestamp { value: String, reason: String },

    #[error("batch has no records to encode")]
    EmptyBatch,

    // Encoding errors (20-29)
    #[error("encoding failed: {0}")]
    Encode(String),

    // Collaborator errors (30-39)
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("alert delivery failed: {0}")]
    Alert(String),

    // Configuration errors (40-49)
    #[error("configuration error: {0}")]
    Config(String),

    // I/O errors (60-69)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Returns the error code for this error type.
    /// Used for detailed error reporting in JSON output.
    pub fn code(&self) -> u32 {
        match self {
            Error::MalformedInput { .. } => 10,
            Error::SchemaViolation { .. } => 11,
            Error::MalformedTimestamp { .. } => 12,
            Error::EmptyBatch => 13,
            Error::Encode(_) => 20,
            Error::Storage(_) => 30,
            Error::Alert(_) => 31,
            Error::Config(_) => 40,
            Error::Io(_) => 60,
            Error::Json(_) => 61,
        }
    }

    /// Whether the error was caused by the content of an input artifact
    /// rather than by the environment it was processed in.
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            Error::MalformedInput { .. }
                | Error::SchemaViolation { .. }
                | Error::MalformedTimestamp { .. }
                | Error::EmptyBatch
        )
    }
}

/// Failures reported by the storage collaborator.
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("object not found: {bucket}/{key}")]
    NotFound { bucket: String, key: String },

    #[error("permission denied for {bucket}/{key}")]
    PermissionDenied { bucket: String, key: String },

    #[error("invalid object key: {0:?}")]
    InvalidKey(String),

    #[error("I/O error at {bucket}/{key}: {source}")]
    Io {
        bucket: String,
        key: String,
        #[source]
        source: std::io::Error,
    },
}

impl StorageError {
    /// Classify an I/O failure on a specific object.
    pub fn from_io(bucket: &str, key: &str, source: std::io::Error) -> Self {
        match source.kind() {
            std::io::ErrorKind::NotFound => StorageError::NotFound {
                bucket: bucket.to_string(),
                key: key.to_string(),
            },
            std::io::ErrorKind::PermissionDenied => StorageError::PermissionDenied {
                bucket: bucket.to_string(),
                key: key.to_string(),
            },
            _ => StorageError::Io {
                bucket: bucket.to_string(),
                key: key.to_string(),
                source,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_input_errors_are_classified() {
        assert!(Error::EmptyBatch.is_input_error());
        assert!(Error::MalformedTimestamp {
            value: "x".to_string(),
            reason: "bad".to_string()
        }
        .is_input_error());
        assert!(!Error::Alert("down".to_string()).is_input_error());
    }

    #[test]
    fn test_storage_error_from_io_kind() {
        let err = StorageError::from_io(
            "raw",
            "a.json",
            std::io::Error::new(std::io::ErrorKind::NotFound, "gone"),
        );
        assert!(matches!(err, StorageError::NotFound { .. }));

        let err = StorageError::from_io(
            "raw",
            "a.json",
            std::io::Error::new(std::io::ErrorKind::PermissionDenied, "nope"),
        );
        assert!(matches!(err, StorageError::PermissionDenied { .. }));

        let wrapped: Error = StorageError::InvalidKey("../x".to_string()).into();
        assert_eq!(wrapped.code(), 30);
    }
}
