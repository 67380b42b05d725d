//! Error types for encoding and decoding.

use ic_common::OutputFormat;
use thiserror::Error;

/// Errors that can occur while encoding or decoding an artifact.
#[derive(Error, Debug)]
pub enum EncodeError {
    /// The encoder refuses to write an artifact with no rows.
    #[error("batch has no records to encode")]
    EmptyBatch,

    /// Decoded content does not have the expected shape.
    #[error("malformed {format} artifact: {reason}")]
    Malformed {
        format: OutputFormat,
        reason: String,
    },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Arrow error: {0}")]
    Arrow(#[from] arrow::error::ArrowError),

    #[error("Parquet error: {0}")]
    Parquet(#[from] parquet::errors::ParquetError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl EncodeError {
    pub(crate) fn malformed(format: OutputFormat, reason: impl Into<String>) -> Self {
        EncodeError::Malformed {
            format,
            reason: reason.into(),
        }
    }

    /// Convert a decode failure on a stored artifact.
    ///
    /// Anything other than an empty batch means the artifact bytes could not
    /// be read back, which is reported as malformed input for `key`.
    pub fn into_decode_error(self, key: &str) -> ic_common::Error {
        match self {
            EncodeError::EmptyBatch => ic_common::Error::EmptyBatch,
            other => ic_common::Error::MalformedInput {
                key: key.to_string(),
                reason: other.to_string(),
            },
        }
    }
}

impl From<EncodeError> for ic_common::Error {
    fn from(err: EncodeError) -> Self {
        match err {
            EncodeError::EmptyBatch => ic_common::Error::EmptyBatch,
            other => ic_common::Error::Encode(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_batch_maps_to_common_variant() {
        let err: ic_common::Error = EncodeError::EmptyBatch.into();
        assert!(matches!(err, ic_common::Error::EmptyBatch));
    }

    #[test]
    fn test_decode_failures_name_the_artifact() {
        let err = EncodeError::malformed(OutputFormat::Json, "not an array")
            .into_decode_error("validated/x/a.json");
        match err {
            ic_common::Error::MalformedInput { key, reason } => {
                assert_eq!(key, "validated/x/a.json");
                assert!(reason.contains("not an array"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
