//! Alert delivery collaborator.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::PathBuf;
use std::sync::Mutex;
use thiserror::Error;
use tracing::debug;

/// Errors from alert delivery.
#[derive(Debug, Error)]
pub enum AlertError {
    #[error("I/O error writing alert to {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl From<AlertError> for ic_common::Error {
    fn from(err: AlertError) -> Self {
        ic_common::Error::Alert(err.to_string())
    }
}

/// Publishes a subject and message to a configured topic.
pub trait AlertSink: Send + Sync {
    fn publish(&self, subject: &str, message: &str) -> Result<(), AlertError>;
}

/// One delivered alert.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublishedAlert {
    pub topic: String,
    pub subject: String,
    pub message: String,
    pub published_at: String,
}

/// Appends alerts as JSON lines to `<dir>/<topic>.jsonl`.
#[derive(Debug, Clone)]
pub struct JsonlAlertSink {
    dir: PathBuf,
    topic: String,
}

impl JsonlAlertSink {
    pub fn new(dir: impl Into<PathBuf>, topic: impl Into<String>) -> Self {
        Self {
            dir: dir.into(),
            topic: topic.into(),
        }
    }

    /// File the topic's alerts are appended to.
    pub fn path(&self) -> PathBuf {
        let file_name: String = self
            .topic
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.') {
                    c
                } else {
                    '_'
                }
            })
            .collect();
        self.dir.join(format!("{file_name}.jsonl"))
    }

    /// Read back every alert published to this topic.
    pub fn read_all(&self) -> Result<Vec<PublishedAlert>, AlertError> {
        let path = self.path();
        let contents = match fs::read_to_string(&path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(source) => return Err(AlertError::Io { path, source }),
        };
        contents
            .lines()
            .filter(|line| !line.trim().is_empty())
            .map(|line| serde_json::from_str(line).map_err(AlertError::from))
            .collect()
    }
}

impl AlertSink for JsonlAlertSink {
    fn publish(&self, subject: &str, message: &str) -> Result<(), AlertError> {
        let path = self.path();
        let alert = PublishedAlert {
            topic: self.topic.clone(),
            subject: subject.to_string(),
            message: message.to_string(),
            published_at: Utc::now().to_rfc3339(),
        };
        let mut line = serde_json::to_string(&alert)?;
        line.push('\n');

        let io = |source| AlertError::Io {
            path: path.clone(),
            source,
        };
        fs::create_dir_all(&self.dir).map_err(io)?;
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(io)?;
        file.write_all(line.as_bytes()).map_err(io)?;

        debug!(topic = %self.topic, path = %path.display(), "alert published");
        Ok(())
    }
}

/// Records alerts in memory.
#[derive(Debug, Default)]
pub struct MemoryAlertSink {
    published: Mutex<Vec<PublishedAlert>>,
}

impl MemoryAlertSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn published(&self) -> Vec<PublishedAlert> {
        self.published
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }
}

impl AlertSink for MemoryAlertSink {
    fn publish(&self, subject: &str, message: &str) -> Result<(), AlertError> {
        self.published
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(PublishedAlert {
                topic: "memory".to_string(),
                subject: subject.to_string(),
                message: message.to_string(),
                published_at: Utc::now().to_rfc3339(),
            });
        Ok(())
    }
}
