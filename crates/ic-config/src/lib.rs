//! Ingest Curator configuration loading and validation.
//!
//! This crate provides:
//! - The typed [`CuratorConfig`] shared by every invocation
//! - Config resolution (defaults → file → env → CLI)
//! - Semantic validation of the resolved values

pub mod config;
pub mod resolve;
pub mod validate;

pub use config::{CuratorConfig, LogFormat, QualityThresholds};
pub use resolve::{resolve_config, resolve_with_env, ConfigOverrides, ConfigPaths};
pub use validate::{log_level_directive, validate_config};

/// Name of the per-user configuration directory.
pub const CONFIG_DIR_NAME: &str = "ingest_curator";

/// File name of the TOML configuration file.
pub const CONFIG_FILE_NAME: &str = "config.toml";

/// Errors raised while loading or validating configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: std::path::PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: std::path::PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("curated bucket is not configured (set CURATED_BUCKET or curated_bucket)")]
    MissingBucket,

    #[error("invalid value for {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}

impl From<ConfigError> for ic_common::Error {
    fn from(err: ConfigError) -> Self {
        ic_common::Error::Config(err.to_string())
    }
}
