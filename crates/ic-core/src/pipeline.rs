//! Pipeline orchestrator: fetch → parse → validate → enrich → partition →
//! encode → store, once per notified artifact.
//!
//! Every batch is all-or-nothing. The first failing stage is logged with the
//! artifact key and propagated unchanged, and any remaining artifacts in the
//! notification are not attempted.

use crate::artifact::{output_key, EncodedArtifact};
use crate::clock::Clock;
use crate::enrich::enrich_batch;
use crate::event::{InvocationResult, Notification};
use crate::partition::{derive_partition, PartitionKey};
use crate::services::Services;
use crate::storage::ObjectStore;
use ic_common::{Error, OutputFormat, Record, Result};
use ic_config::CuratorConfig;
use ic_encode::{encoder_for, Encoder};
use serde::Serialize;
use serde_json::Value;
use std::fmt;
use std::sync::Arc;
use tracing::{error, info, info_span, warn};
use uuid::Uuid;

/// Body returned when every artifact was curated.
pub const COMPLETE_BODY: &str = "Processing complete";

/// Stage an artifact is in when a failure occurs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ArtifactStage {
    Fetch,
    Parse,
    Validate,
    Enrich,
    DerivePartition,
    Encode,
    Store,
}

impl fmt::Display for ArtifactStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ArtifactStage::Fetch => "fetch",
            ArtifactStage::Parse => "parse",
            ArtifactStage::Validate => "validate",
            ArtifactStage::Enrich => "enrich",
            ArtifactStage::DerivePartition => "derive_partition",
            ArtifactStage::Encode => "encode",
            ArtifactStage::Store => "store",
        };
        f.write_str(name)
    }
}

/// Summary of one curated artifact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StoredArtifact {
    pub source_bucket: String,
    pub source_key: String,
    pub bucket: String,
    pub key: String,
    pub records: usize,
    pub partition: PartitionKey,
}

/// Curates raw artifacts into partitioned, encoded outputs.
pub struct Pipeline {
    store: Arc<dyn ObjectStore>,
    clock: Arc<dyn Clock>,
    encoder: Box<dyn Encoder>,
    curated_bucket: String,
}

impl Pipeline {
    pub fn new(
        store: Arc<dyn ObjectStore>,
        clock: Arc<dyn Clock>,
        format: OutputFormat,
        curated_bucket: impl Into<String>,
    ) -> Self {
        Self {
            store,
            clock,
            encoder: encoder_for(format),
            curated_bucket: curated_bucket.into(),
        }
    }

    pub fn from_config(services: &Services, config: &CuratorConfig) -> Self {
        Self::new(
            Arc::clone(&services.store),
            Arc::clone(&services.clock),
            config.output_format,
            config.curated_bucket.clone(),
        )
    }

    /// Process every artifact in the notification, in order.
    pub fn handle(&self, event: &Notification) -> Result<InvocationResult> {
        let span = info_span!(
            "invocation",
            id = %Uuid::new_v4(),
            kind = "ingest",
            artifacts = event.len()
        );
        let _guard = span.enter();

        for (bucket, key) in event.objects() {
            self.process_object(bucket, key)?;
        }

        info!(artifacts = event.len(), "ingest complete");
        Ok(InvocationResult::body(COMPLETE_BODY))
    }

    /// Curate one artifact.
    pub fn process_object(&self, bucket: &str, key: &str) -> Result<StoredArtifact> {
        let mut stage = ArtifactStage::Fetch;
        let result = self.run_stages(bucket, key, &mut stage);

        match &result {
            Ok(stored) => info!(
                source = %format!("{bucket}/{key}"),
                bucket = %stored.bucket,
                key = %stored.key,
                records = stored.records,
                partition = %stored.partition,
                "artifact curated"
            ),
            Err(e) => error!(
                bucket,
                key,
                stage = %stage,
                code = e.code(),
                error = %e,
                "artifact processing failed"
            ),
        }
        result
    }

    fn run_stages(
        &self,
        bucket: &str,
        key: &str,
        stage: &mut ArtifactStage,
    ) -> Result<StoredArtifact> {
        *stage = ArtifactStage::Fetch;
        let bytes = self.store.get(bucket, key)?;

        *stage = ArtifactStage::Parse;
        let items = parse_batch(key, &bytes)?;

        *stage = ArtifactStage::Validate;
        let records = validate_batch(key, items)?;

        *stage = ArtifactStage::Enrich;
        let ingested_at = self.clock.now();
        let enriched = enrich_batch(records, key, ingested_at)?;

        *stage = ArtifactStage::DerivePartition;
        let partition = match enriched.first() {
            Some(first) => derive_partition(first.ts())?,
            None => {
                warn!(key, "empty batch, partitioning by processing date");
                PartitionKey::for_date(ingested_at.date_naive())
            }
        };
        let output = output_key(&partition, key, self.encoder.format().extension())?;

        *stage = ArtifactStage::Encode;
        let body = self.encoder.encode(&enriched)?;
        let artifact = EncodedArtifact::new(body, output);

        *stage = ArtifactStage::Store;
        self.store.put(
            &self.curated_bucket,
            &artifact.key,
            &artifact.bytes,
            artifact.content_type,
            artifact.content_encoding,
        )?;

        Ok(StoredArtifact {
            source_bucket: bucket.to_string(),
            source_key: key.to_string(),
            bucket: self.curated_bucket.clone(),
            key: artifact.key,
            records: enriched.len(),
            partition,
        })
    }
}

/// Parse raw bytes into batch items.
///
/// A top-level array is the batch; a single object is a one-record batch.
pub fn parse_batch(key: &str, bytes: &[u8]) -> Result<Vec<Value>> {
    let malformed = |reason: String| Error::MalformedInput {
        key: key.to_string(),
        reason,
    };

    match serde_json::from_slice::<Value>(bytes) {
        Ok(Value::Array(items)) => Ok(items),
        Ok(object @ Value::Object(_)) => Ok(vec![object]),
        Ok(other) => Err(malformed(format!(
            "expected a JSON array or object, found {}",
            ic_common::schema::json_type_name(&other)
        ))),
        Err(e) => Err(malformed(e.to_string())),
    }
}

/// Validate every item, failing on the first violation.
pub fn validate_batch(key: &str, items: Vec<Value>) -> Result<Vec<Record>> {
    items
        .into_iter()
        .enumerate()
        .map(|(index, item)| {
            Record::from_value(item).map_err(|violation| {
                warn!(key, index, violation = %violation, "record failed validation");
                Error::SchemaViolation { index, violation }
            })
        })
        .collect()
}
