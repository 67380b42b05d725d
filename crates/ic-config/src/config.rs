//! Curator configuration types.

use ic_common::OutputFormat;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

/// Default root directory of the local object store.
pub const DEFAULT_STORAGE_ROOT: &str = "./data";

/// Default log level when neither flag nor environment sets one.
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Log output style.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    /// Human-readable lines.
    #[default]
    Text,
    /// One JSON object per event.
    Json,
}

impl fmt::Display for LogFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogFormat::Text => write!(f, "text"),
            LogFormat::Json => write!(f, "json"),
        }
    }
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "text" | "pretty" => Ok(LogFormat::Text),
            "json" => Ok(LogFormat::Json),
            other => Err(format!("unknown log format '{other}' (expected text or json)")),
        }
    }
}

/// Acceptable domain of the `value` field during quality inspection.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct QualityThresholds {
    #[serde(default = "default_min_value")]
    pub min_value: f64,

    #[serde(default = "default_max_value")]
    pub max_value: f64,
}

impl QualityThresholds {
    pub fn contains(&self, value: f64) -> bool {
        (self.min_value..=self.max_value).contains(&value)
    }
}

impl Default for QualityThresholds {
    fn default() -> Self {
        Self {
            min_value: default_min_value(),
            max_value: default_max_value(),
        }
    }
}

fn default_min_value() -> f64 {
    0.0
}

fn default_max_value() -> f64 {
    100.0
}

/// Fully resolved configuration for one curator process.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CuratorConfig {
    /// Bucket receiving curated artifacts.
    pub curated_bucket: String,

    /// Encoding of curated artifacts.
    #[serde(default)]
    pub output_format: OutputFormat,

    /// Alert channel; `None` disables alert delivery.
    #[serde(default)]
    pub alert_topic: Option<String>,

    /// Root directory of the filesystem object store.
    pub storage_root: PathBuf,

    /// Directory receiving alert files.
    pub alerts_dir: PathBuf,

    pub log_level: String,

    #[serde(default)]
    pub log_format: LogFormat,

    #[serde(default)]
    pub quality: QualityThresholds,
}

impl CuratorConfig {
    /// Configuration with defaults for everything except the bucket.
    pub fn with_bucket(curated_bucket: impl Into<String>) -> Self {
        let storage_root = PathBuf::from(DEFAULT_STORAGE_ROOT);
        Self {
            curated_bucket: curated_bucket.into(),
            output_format: OutputFormat::default(),
            alert_topic: None,
            alerts_dir: storage_root.join("_alerts"),
            storage_root,
            log_level: DEFAULT_LOG_LEVEL.to_string(),
            log_format: LogFormat::default(),
            quality: QualityThresholds::default(),
        }
    }

    /// Whether an alert channel is configured.
    pub fn alerts_enabled(&self) -> bool {
        self.alert_topic
            .as_deref()
            .is_some_and(|topic| !topic.trim().is_empty())
    }
}

/// Partial configuration as read from a TOML file.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    pub curated_bucket: Option<String>,
    pub output_format: Option<OutputFormat>,
    pub alert_topic: Option<String>,
    pub storage_root: Option<PathBuf>,
    pub alerts_dir: Option<PathBuf>,
    pub log_level: Option<String>,
    pub log_format: Option<LogFormat>,
    pub quality: Option<QualityThresholds>,
}
