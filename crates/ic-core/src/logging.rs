//! Tracing subscriber setup for the ic-core binary.

use ic_common::{Error, Result};
use ic_config::{log_level_directive, LogFormat};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

/// Environment variable holding a full filter directive, e.g. `ic_core=debug`.
pub const FILTER_ENV: &str = "IC_LOG";

/// Map a configured level name onto a tracing level directive.
///
/// Uses the names config validation accepts. Unknown names fall back to `info`.
pub fn level_directive(level: &str) -> &'static str {
    log_level_directive(level).unwrap_or("info")
}

/// Install the global subscriber. Output goes to stderr.
pub fn init(level: &str, format: LogFormat) -> Result<()> {
    let filter = EnvFilter::try_from_env(FILTER_ENV)
        .unwrap_or_else(|_| EnvFilter::new(level_directive(level)));

    let layer = match format {
        LogFormat::Text => tracing_subscriber::fmt::layer()
            .with_target(false)
            .with_writer(std::io::stderr)
            .boxed(),
        LogFormat::Json => tracing_subscriber::fmt::layer()
            .json()
            .with_current_span(true)
            .with_span_list(false)
            .with_writer(std::io::stderr)
            .boxed(),
    };

    tracing_subscriber::registry()
        .with(layer.with_filter(filter))
        .try_init()
        .map_err(|e| Error::Config(format!("failed to initialize logging: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_directive() {
        assert_eq!(level_directive("INFO"), "info");
        assert_eq!(level_directive("Debug"), "debug");
        assert_eq!(level_directive("warning"), "warn");
        assert_eq!(level_directive("CRITICAL"), "error");
        assert_eq!(level_directive("fatal"), "error");
        assert_eq!(level_directive("verbose"), "info");
    }
}
