//! Quality inspection of curated artifacts.
//!
//! Each inspected artifact is decoded according to its extension and scored
//! for null values, out-of-range values and duplicate ids. Counters add up
//! across all artifacts of one invocation. A single alert is raised at the
//! end when any issue counter is nonzero.

use crate::alert::AlertSink;
use crate::clock::Clock;
use crate::event::{InvocationResult, Notification};
use crate::services::Services;
use crate::storage::ObjectStore;
use chrono::{DateTime, SecondsFormat, Utc};
use ic_common::schema::as_integer;
use ic_common::{Fields, OutputFormat, Result, VALIDATED_PREFIX};
use ic_config::{CuratorConfig, QualityThresholds};
use ic_encode::encoder_for;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, error, info, info_span, warn};
use uuid::Uuid;

/// Subject of every quality alert.
pub const ALERT_SUBJECT: &str = "Data Quality Alert";

/// Aggregate quality counters for one invocation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QualityMetrics {
    pub total_files: u64,
    pub total_records: u64,
    pub null_values: u64,
    pub out_of_range: u64,
    pub duplicates: u64,
}

impl QualityMetrics {
    /// Whether any issue counter is nonzero.
    pub fn has_issues(&self) -> bool {
        self.null_values > 0 || self.out_of_range > 0 || self.duplicates > 0
    }

    pub fn merge(&mut self, other: &QualityMetrics) {
        self.total_files += other.total_files;
        self.total_records += other.total_records;
        self.null_values += other.null_values;
        self.out_of_range += other.out_of_range;
        self.duplicates += other.duplicates;
    }
}

/// Score the records of one artifact.
pub fn score_records(records: &[Fields], thresholds: &QualityThresholds) -> QualityMetrics {
    let mut metrics = QualityMetrics {
        total_files: 1,
        total_records: records.len() as u64,
        ..QualityMetrics::default()
    };
    let mut seen_ids = HashSet::new();

    for record in records {
        match record.get("value") {
            None | Some(Value::Null) => metrics.null_values += 1,
            Some(Value::Number(n)) => {
                if !n.as_f64().is_some_and(|v| thresholds.contains(v)) {
                    metrics.out_of_range += 1;
                }
            }
            Some(_) => metrics.out_of_range += 1,
        }

        if !seen_ids.insert(id_key(record.get("id"))) {
            metrics.duplicates += 1;
        }
    }
    metrics
}

/// Equality key for duplicate detection.
///
/// Integral numbers compare by value (`7` equals `7.0`), and a missing id is
/// the same key as an explicit null.
fn id_key(id: Option<&Value>) -> String {
    match id {
        None | Some(Value::Null) => "null".to_string(),
        Some(number @ Value::Number(_)) => match as_integer(number) {
            Some(int) => int.to_string(),
            None => number.to_string(),
        },
        Some(other) => other.to_string(),
    }
}

/// Render the alert body.
pub fn alert_message(at: DateTime<Utc>, keys: &[String], metrics: &QualityMetrics) -> String {
    format!(
        "{ALERT_SUBJECT} - {}\n\nFiles: {}\nIssues Found:\n- Null values: {}\n- Out of range: {}\n- Duplicates: {}\n",
        at.to_rfc3339_opts(SecondsFormat::Secs, true),
        keys.join(", "),
        metrics.null_values,
        metrics.out_of_range,
        metrics.duplicates,
    )
}

/// Computes quality metrics over curated artifacts.
pub struct QualityInspector {
    store: Arc<dyn ObjectStore>,
    alerts: Option<Arc<dyn AlertSink>>,
    clock: Arc<dyn Clock>,
    thresholds: QualityThresholds,
}

impl QualityInspector {
    pub fn new(
        store: Arc<dyn ObjectStore>,
        alerts: Option<Arc<dyn AlertSink>>,
        clock: Arc<dyn Clock>,
        thresholds: QualityThresholds,
    ) -> Self {
        Self {
            store,
            alerts,
            clock,
            thresholds,
        }
    }

    pub fn from_config(services: &Services, config: &CuratorConfig) -> Self {
        Self::new(
            Arc::clone(&services.store),
            services.alerts.clone(),
            Arc::clone(&services.clock),
            config.quality,
        )
    }

    pub fn handle(&self, event: &Notification) -> Result<InvocationResult> {
        let span = info_span!(
            "invocation",
            id = %Uuid::new_v4(),
            kind = "inspect",
            artifacts = event.len()
        );
        let _guard = span.enter();

        self.inspect(event).map(InvocationResult::metrics)
    }

    /// Inspect every validated artifact in the notification.
    pub fn inspect(&self, event: &Notification) -> Result<QualityMetrics> {
        let mut metrics = QualityMetrics::default();
        let mut inspected = Vec::new();

        for (bucket, key) in event.objects() {
            if !key.starts_with(VALIDATED_PREFIX) {
                debug!(bucket, key, "skipping artifact outside validated prefix");
                continue;
            }

            let artifact = self.inspect_artifact(bucket, key).map_err(|e| {
                error!(bucket, key, code = e.code(), error = %e, "quality check failed");
                e
            })?;
            metrics.merge(&artifact);
            inspected.push(key.to_string());

            info!(
                key,
                total_files = metrics.total_files,
                total_records = metrics.total_records,
                null_values = metrics.null_values,
                out_of_range = metrics.out_of_range,
                duplicates = metrics.duplicates,
                "quality metrics"
            );
        }

        if metrics.has_issues() {
            let message = alert_message(self.clock.now(), &inspected, &metrics);
            warn!(alert = %message, "data quality issues found");
            match &self.alerts {
                Some(sink) => sink.publish(ALERT_SUBJECT, &message)?,
                None => debug!("no alert topic configured, alert not published"),
            }
        }

        Ok(metrics)
    }

    fn inspect_artifact(&self, bucket: &str, key: &str) -> Result<QualityMetrics> {
        let bytes = self.store.get(bucket, key)?;
        let format = OutputFormat::from_key(key);
        let records = encoder_for(format)
            .decode(&bytes)
            .map_err(|e| e.into_decode_error(key))?;
        Ok(score_records(&records, &self.thresholds))
    }
}
