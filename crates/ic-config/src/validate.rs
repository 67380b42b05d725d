//! Semantic validation of resolved configuration.

use crate::config::CuratorConfig;
use crate::ConfigError;

/// Level names accepted for `log_level`, each with the tracing directive it maps to.
///
/// Python-style names such as `warning` and `critical` are accepted too.
pub const LOG_LEVELS: [(&str, &str); 8] = [
    ("trace", "trace"),
    ("debug", "debug"),
    ("info", "info"),
    ("warn", "warn"),
    ("warning", "warn"),
    ("error", "error"),
    ("critical", "error"),
    ("fatal", "error"),
];

/// Tracing directive for a level name, case-insensitively.
pub fn log_level_directive(level: &str) -> Option<&'static str> {
    let level = level.trim().to_ascii_lowercase();
    LOG_LEVELS
        .iter()
        .find(|(name, _)| *name == level)
        .map(|(_, directive)| *directive)
}

/// Reject configurations the pipeline cannot run with.
pub fn validate_config(config: &CuratorConfig) -> Result<(), ConfigError> {
    let bucket = config.curated_bucket.trim();
    if bucket.is_empty() {
        return Err(ConfigError::MissingBucket);
    }
    if bucket.contains('/') || bucket == "." || bucket == ".." {
        return Err(ConfigError::Invalid {
            field: "curated_bucket",
            reason: format!("'{bucket}' is not a valid bucket name"),
        });
    }

    let level = config.log_level.as_str();
    if log_level_directive(level).is_none() {
        let names: Vec<&str> = LOG_LEVELS.iter().map(|(name, _)| *name).collect();
        return Err(ConfigError::Invalid {
            field: "log_level",
            reason: format!("'{level}' is not one of {}", names.join(", ")),
        });
    }

    let quality = &config.quality;
    if !quality.min_value.is_finite() || !quality.max_value.is_finite() {
        return Err(ConfigError::Invalid {
            field: "quality",
            reason: "bounds must be finite".to_string(),
        });
    }
    if quality.min_value > quality.max_value {
        return Err(ConfigError::Invalid {
            field: "quality",
            reason: format!(
                "min_value {} exceeds max_value {}",
                quality.min_value, quality.max_value
            ),
        });
    }

    Ok(())
}
