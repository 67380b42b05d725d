//! Config resolution: defaults → file → environment → CLI.
//!
//! Each layer only overrides the values it actually sets. The config file is
//! taken from the CLI, then `IC_CONFIG`, then the per-user config directory
//! (only if it exists there).

use crate::config::{
    CuratorConfig, FileConfig, LogFormat, DEFAULT_LOG_LEVEL, DEFAULT_STORAGE_ROOT,
};
use crate::validate::validate_config;
use crate::{ConfigError, CONFIG_DIR_NAME, CONFIG_FILE_NAME};
use ic_common::OutputFormat;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Environment variables consulted during resolution.
pub mod env {
    pub const CONFIG: &str = "IC_CONFIG";
    pub const CURATED_BUCKET: &str = "CURATED_BUCKET";
    pub const OUTPUT_FORMAT: &str = "IC_OUTPUT_FORMAT";
    pub const ALERT_TOPIC: &str = "ALERT_TOPIC";
    /// Accepted as a fallback alert channel name.
    pub const SNS_TOPIC_ARN: &str = "SNS_TOPIC_ARN";
    pub const STORAGE_ROOT: &str = "IC_STORAGE_ROOT";
    pub const ALERTS_DIR: &str = "IC_ALERTS_DIR";
    pub const LOG_LEVEL: &str = "LOG_LEVEL";
    pub const LOG_FORMAT: &str = "IC_LOG_FORMAT";
}

/// Values supplied on the command line.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub config_file: Option<PathBuf>,
    pub curated_bucket: Option<String>,
    pub output_format: Option<OutputFormat>,
    pub alert_topic: Option<String>,
    pub storage_root: Option<PathBuf>,
    pub log_level: Option<String>,
    pub log_format: Option<LogFormat>,
}

/// Where configuration files are looked up.
#[derive(Debug, Clone, Default)]
pub struct ConfigPaths {
    /// Fallback file, used only when it exists.
    pub default_file: Option<PathBuf>,
}

impl ConfigPaths {
    /// The per-user config location (`<config_dir>/ingest_curator/config.toml`).
    pub fn discover() -> Self {
        Self {
            default_file: dirs::config_dir()
                .map(|dir| dir.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME)),
        }
    }

    /// No fallback file.
    pub fn none() -> Self {
        Self::default()
    }
}

/// Resolve configuration from the process environment.
pub fn resolve_config(overrides: &ConfigOverrides) -> Result<CuratorConfig, ConfigError> {
    resolve_with_env(overrides, &ConfigPaths::discover(), |name| {
        std::env::var(name).ok()
    })
}

/// Resolve configuration with an explicit environment lookup.
pub fn resolve_with_env<F>(
    overrides: &ConfigOverrides,
    paths: &ConfigPaths,
    lookup: F,
) -> Result<CuratorConfig, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let env_var = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

    let file = match config_file_path(overrides, paths, &env_var) {
        Some(path) => load_file(&path)?,
        None => FileConfig::default(),
    };

    let curated_bucket = overrides
        .curated_bucket
        .clone()
        .or_else(|| env_var(env::CURATED_BUCKET))
        .or(file.curated_bucket)
        .map(|bucket| bucket.trim().to_string())
        .ok_or(ConfigError::MissingBucket)?;

    let output_format = match (overrides.output_format, env_var(env::OUTPUT_FORMAT)) {
        (Some(format), _) => format,
        (None, Some(raw)) => raw.parse().map_err(|reason| ConfigError::Invalid {
            field: env::OUTPUT_FORMAT,
            reason,
        })?,
        (None, None) => file.output_format.unwrap_or_default(),
    };

    let alert_topic = overrides
        .alert_topic
        .clone()
        .or_else(|| env_var(env::ALERT_TOPIC))
        .or_else(|| env_var(env::SNS_TOPIC_ARN))
        .or(file.alert_topic)
        .filter(|topic| !topic.trim().is_empty());

    let storage_root = overrides
        .storage_root
        .clone()
        .or_else(|| env_var(env::STORAGE_ROOT).map(PathBuf::from))
        .or(file.storage_root)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_STORAGE_ROOT));

    let alerts_dir = env_var(env::ALERTS_DIR)
        .map(PathBuf::from)
        .or(file.alerts_dir)
        .unwrap_or_else(|| storage_root.join("_alerts"));

    let log_level = overrides
        .log_level
        .clone()
        .or_else(|| env_var(env::LOG_LEVEL))
        .or(file.log_level)
        .unwrap_or_else(|| DEFAULT_LOG_LEVEL.to_string())
        .to_ascii_lowercase();

    let log_format = match (overrides.log_format, env_var(env::LOG_FORMAT)) {
        (Some(format), _) => format,
        (None, Some(raw)) => raw.parse().map_err(|reason| ConfigError::Invalid {
            field: env::LOG_FORMAT,
            reason,
        })?,
        (None, None) => file.log_format.unwrap_or_default(),
    };

    let config = CuratorConfig {
        curated_bucket,
        output_format,
        alert_topic,
        storage_root,
        alerts_dir,
        log_level,
        log_format,
        quality: file.quality.unwrap_or_default(),
    };

    validate_config(&config)?;
    Ok(config)
}

fn config_file_path<F>(
    overrides: &ConfigOverrides,
    paths: &ConfigPaths,
    env_var: &F,
) -> Option<PathBuf>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(path) = &overrides.config_file {
        return Some(path.clone());
    }
    if let Some(path) = env_var(env::CONFIG) {
        return Some(PathBuf::from(path));
    }
    paths
        .default_file
        .as_ref()
        .filter(|path| path.is_file())
        .cloned()
}

fn load_file(path: &Path) -> Result<FileConfig, ConfigError> {
    debug!(path = %path.display(), "loading config file");
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    toml::from_str(&content).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}
