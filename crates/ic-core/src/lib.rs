//! Ingest Curator core: the validate → enrich → partition → encode pipeline
//! and the quality inspection pass over curated artifacts.
//!
//! Collaborators (object storage, alert delivery, clock) are traits created
//! once per process and injected through [`Services`], so every component
//! can run against in-memory doubles in tests.

pub mod alert;
pub mod artifact;
pub mod clock;
pub mod enrich;
pub mod event;
pub mod exit_codes;
pub mod inspect;
pub mod logging;
pub mod partition;
pub mod pipeline;
pub mod services;
pub mod storage;

pub use alert::{AlertError, AlertSink, JsonlAlertSink, MemoryAlertSink};
pub use artifact::{output_key, EncodedArtifact};
pub use clock::{Clock, FixedClock, SystemClock};
pub use enrich::{enrich, enrich_batch};
pub use event::{InvocationResult, Notification};
pub use exit_codes::ExitCode;
pub use inspect::{QualityInspector, QualityMetrics};
pub use partition::{derive_partition, PartitionKey};
pub use pipeline::{ArtifactStage, Pipeline, StoredArtifact};
pub use services::Services;
pub use storage::{FsStore, MemoryStore, ObjectStore};
