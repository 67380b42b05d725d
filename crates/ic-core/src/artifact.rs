//! Curated artifact naming.

use crate::partition::PartitionKey;
use ic_common::{Error, Result, VALIDATED_PREFIX};
use ic_encode::EncodedBody;

/// An encoded batch addressed to its curated location.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedArtifact {
    pub key: String,
    pub bytes: Vec<u8>,
    pub content_type: &'static str,
    pub content_encoding: Option<&'static str>,
}

impl EncodedArtifact {
    pub fn new(body: EncodedBody, key: String) -> Self {
        Self {
            key,
            bytes: body.bytes,
            content_type: body.content_type,
            content_encoding: body.content_encoding,
        }
    }
}

/// Final path segment of `key` with its last extension removed.
///
/// `raw/2024/data.json` gives `data`; `archive.tar.gz` gives `archive.tar`.
/// A dot-file such as `.env` keeps its full name.
pub fn base_name(key: &str) -> Result<&str> {
    let file_name = key.rsplit('/').next().unwrap_or(key);
    if file_name.is_empty() {
        return Err(Error::MalformedInput {
            key: key.to_string(),
            reason: "object key has no file name".to_string(),
        });
    }
    Ok(match file_name.rsplit_once('.') {
        Some((stem, _)) if !stem.is_empty() => stem,
        _ => file_name,
    })
}

/// `validated/<partition>/<base>.<extension>`.
pub fn output_key(partition: &PartitionKey, source_key: &str, extension: &str) -> Result<String> {
    Ok(format!(
        "{VALIDATED_PREFIX}{partition}/{}.{extension}",
        base_name(source_key)?
    ))
}
