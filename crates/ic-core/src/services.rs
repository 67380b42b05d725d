//! Process-wide collaborators, created once at startup.

use crate::alert::{AlertSink, JsonlAlertSink};
use crate::clock::{Clock, SystemClock};
use crate::storage::{FsStore, ObjectStore};
use ic_config::CuratorConfig;
use std::sync::Arc;
use tracing::debug;

/// Shared storage, alerting and clock handles.
#[derive(Clone)]
pub struct Services {
    pub store: Arc<dyn ObjectStore>,
    pub alerts: Option<Arc<dyn AlertSink>>,
    pub clock: Arc<dyn Clock>,
}

impl Services {
    pub fn new(
        store: Arc<dyn ObjectStore>,
        alerts: Option<Arc<dyn AlertSink>>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            store,
            alerts,
            clock,
        }
    }

    /// Filesystem store, JSONL alerts (when a topic is set) and the system clock.
    pub fn from_config(config: &CuratorConfig) -> Self {
        let alerts: Option<Arc<dyn AlertSink>> = match config.alert_topic.as_deref() {
            Some(topic) if config.alerts_enabled() => {
                Some(Arc::new(JsonlAlertSink::new(&config.alerts_dir, topic)))
            }
            _ => None,
        };
        debug!(
            storage_root = %config.storage_root.display(),
            alerts = alerts.is_some(),
            "services initialized"
        );
        Self::new(
            Arc::new(FsStore::new(&config.storage_root)),
            alerts,
            Arc::new(SystemClock),
        )
    }
}
