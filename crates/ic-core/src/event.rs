//! Storage notification events and invocation results.
//!
//! Notifications use the object-storage event shape
//! `{"Records": [{"s3": {"bucket": {"name": ..}, "object": {"key": ..}}}]}`;
//! every other field of a real event is ignored.

use crate::inspect::QualityMetrics;
use ic_common::{Error, Result};
use serde::{Deserialize, Serialize};

/// A batch of object-created notifications.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    #[serde(rename = "Records", default)]
    pub records: Vec<NotificationRecord>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationRecord {
    pub s3: ObjectEntity,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectEntity {
    pub bucket: BucketRef,
    pub object: ObjectRef,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BucketRef {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectRef {
    pub key: String,
}

impl Notification {
    /// A notification for one object.
    pub fn single(bucket: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            records: vec![NotificationRecord {
                s3: ObjectEntity {
                    bucket: BucketRef {
                        name: bucket.into(),
                    },
                    object: ObjectRef { key: key.into() },
                },
            }],
        }
    }

    /// Parse a notification document.
    pub fn from_json(bytes: &[u8]) -> Result<Self> {
        serde_json::from_slice(bytes).map_err(|e| Error::MalformedInput {
            key: "<event>".to_string(),
            reason: e.to_string(),
        })
    }

    /// `(bucket, key)` of each entry, in notification order.
    pub fn objects(&self) -> impl Iterator<Item = (&str, &str)> {
        self.records
            .iter()
            .map(|r| (r.s3.bucket.name.as_str(), r.s3.object.key.as_str()))
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Outcome of a successful invocation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InvocationResult {
    #[serde(rename = "statusCode")]
    pub status_code: u16,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub metrics: Option<QualityMetrics>,
}

impl InvocationResult {
    pub fn body(body: impl Into<String>) -> Self {
        Self {
            status_code: 200,
            body: Some(body.into()),
            metrics: None,
        }
    }

    pub fn metrics(metrics: QualityMetrics) -> Self {
        Self {
            status_code: 200,
            body: None,
            metrics: Some(metrics),
        }
    }
}
