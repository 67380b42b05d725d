//! The encoder capability.
//!
//! Validation, enrichment, and partitioning are format independent; only the
//! final serialization step differs. Each format implements [`Encoder`] and
//! the orchestrator selects one by [`OutputFormat`].

use crate::{CsvGzipEncoder, EncodeError, JsonEncoder, ParquetEncoder};
use ic_common::{EnrichedRecord, Fields, OutputFormat};

/// Serialized batch plus the metadata storage needs.
#[derive(Debug, Clone, PartialEq)]
pub struct EncodedBody {
    pub bytes: Vec<u8>,
    pub content_type: &'static str,
    pub content_encoding: Option<&'static str>,
    /// Extension appended to the artifact base name, without a leading dot.
    pub extension: &'static str,
}

impl EncodedBody {
    pub fn new(format: OutputFormat, bytes: Vec<u8>) -> Self {
        Self {
            bytes,
            content_type: format.content_type(),
            content_encoding: format.content_encoding(),
            extension: format.extension(),
        }
    }
}

/// One output encoding of a batch of enriched records.
pub trait Encoder: Send + Sync {
    fn format(&self) -> OutputFormat;

    /// Serialize the batch in order.
    fn encode(&self, records: &[EnrichedRecord]) -> Result<EncodedBody, EncodeError>;

    /// Read records back from bytes produced by [`Encoder::encode`].
    ///
    /// Stored artifacts are not trusted to be schema conformant, so records
    /// come back as plain field maps.
    fn decode(&self, bytes: &[u8]) -> Result<Vec<Fields>, EncodeError>;
}

/// The encoder for a configured output format.
pub fn encoder_for(format: OutputFormat) -> Box<dyn Encoder> {
    match format {
        OutputFormat::Json => Box::new(JsonEncoder),
        OutputFormat::CsvGzip => Box::new(CsvGzipEncoder::default()),
        OutputFormat::Parquet => Box::new(ParquetEncoder::default()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::batch;

    #[test]
    fn test_encoder_for_matches_format() {
        for format in OutputFormat::ALL {
            assert_eq!(encoder_for(format).format(), format);
        }
    }

    #[test]
    fn test_every_encoder_round_trips() {
        let records = batch();
        let expected: Vec<Fields> = records.iter().map(|r| r.fields().clone()).collect();
        for format in OutputFormat::ALL {
            let encoder = encoder_for(format);
            let body = encoder.encode(&records).unwrap();
            assert_eq!(body.extension, format.extension());
            let decoded = encoder.decode(&body.bytes).unwrap();
            assert_eq!(decoded, expected, "round-trip through {format}");
        }
    }
}
