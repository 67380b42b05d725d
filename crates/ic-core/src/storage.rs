//! Object storage collaborator.
//!
//! [`FsStore`] maps `bucket/key` onto a directory tree so the pipeline can run
//! locally; [`MemoryStore`] backs tests.

use ic_common::StorageError;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Component, Path, PathBuf};
use std::sync::Mutex;
use tracing::{debug, warn};

/// Directory under the storage root that holds object metadata sidecars.
pub const METADATA_DIR: &str = ".meta";

/// Read and write whole objects by bucket and key.
pub trait ObjectStore: Send + Sync {
    fn get(&self, bucket: &str, key: &str) -> Result<Vec<u8>, StorageError>;

    fn put(
        &self,
        bucket: &str,
        key: &str,
        bytes: &[u8],
        content_type: &str,
        content_encoding: Option<&str>,
    ) -> Result<(), StorageError>;
}

/// Transport metadata stored alongside an object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectMetadata {
    pub content_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_encoding: Option<String>,
}

/// An object held by [`MemoryStore`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredObject {
    pub bytes: Vec<u8>,
    pub metadata: ObjectMetadata,
}

#[derive(Default)]
struct MemoryState {
    objects: BTreeMap<(String, String), StoredObject>,
    read_only: BTreeSet<String>,
}

/// In-memory object store.
#[derive(Default)]
pub struct MemoryStore {
    state: Mutex<MemoryState>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> std::sync::MutexGuard<'_, MemoryState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Seed an object without going through `put`.
    pub fn insert(&self, bucket: &str, key: &str, bytes: impl Into<Vec<u8>>) {
        self.state().objects.insert(
            (bucket.to_string(), key.to_string()),
            StoredObject {
                bytes: bytes.into(),
                metadata: ObjectMetadata {
                    content_type: "application/json".to_string(),
                    content_encoding: None,
                },
            },
        );
    }

    /// Reject every subsequent `put` into `bucket`.
    pub fn deny_writes(&self, bucket: &str) {
        self.state().read_only.insert(bucket.to_string());
    }

    pub fn object(&self, bucket: &str, key: &str) -> Option<StoredObject> {
        self.state()
            .objects
            .get(&(bucket.to_string(), key.to_string()))
            .cloned()
    }

    /// Keys in `bucket`, sorted.
    pub fn keys(&self, bucket: &str) -> Vec<String> {
        self.state()
            .objects
            .keys()
            .filter(|(b, _)| b == bucket)
            .map(|(_, k)| k.clone())
            .collect()
    }
}

impl ObjectStore for MemoryStore {
    fn get(&self, bucket: &str, key: &str) -> Result<Vec<u8>, StorageError> {
        self.object(bucket, key)
            .map(|object| object.bytes)
            .ok_or_else(|| StorageError::NotFound {
                bucket: bucket.to_string(),
                key: key.to_string(),
            })
    }

    fn put(
        &self,
        bucket: &str,
        key: &str,
        bytes: &[u8],
        content_type: &str,
        content_encoding: Option<&str>,
    ) -> Result<(), StorageError> {
        let mut state = self.state();
        if state.read_only.contains(bucket) {
            return Err(StorageError::PermissionDenied {
                bucket: bucket.to_string(),
                key: key.to_string(),
            });
        }
        state.objects.insert(
            (bucket.to_string(), key.to_string()),
            StoredObject {
                bytes: bytes.to_vec(),
                metadata: ObjectMetadata {
                    content_type: content_type.to_string(),
                    content_encoding: content_encoding.map(str::to_string),
                },
            },
        );
        Ok(())
    }
}

/// Filesystem-backed object store rooted at a directory.
///
/// Objects live at `<root>/<bucket>/<key>`; their metadata at
/// `<root>/.meta/<bucket>/<key>.json`.
#[derive(Debug, Clone)]
pub struct FsStore {
    root: PathBuf,
}

impl FsStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Filesystem path of an object.
    pub fn object_path(&self, bucket: &str, key: &str) -> Result<PathBuf, StorageError> {
        let relative = relative_path(bucket, key)?;
        Ok(self.root.join(relative))
    }

    fn metadata_path(&self, bucket: &str, key: &str) -> Result<PathBuf, StorageError> {
        let relative = relative_path(bucket, key)?;
        let mut path = self.root.join(METADATA_DIR).join(relative).into_os_string();
        path.push(".json");
        Ok(PathBuf::from(path))
    }

    /// Metadata recorded when the object was written.
    pub fn metadata(&self, bucket: &str, key: &str) -> Result<ObjectMetadata, StorageError> {
        let path = self.metadata_path(bucket, key)?;
        let contents =
            fs::read(&path).map_err(|e| StorageError::from_io(bucket, key, e))?;
        serde_json::from_slice(&contents).map_err(|e| StorageError::Io {
            bucket: bucket.to_string(),
            key: key.to_string(),
            source: e.into(),
        })
    }
}

impl ObjectStore for FsStore {
    fn get(&self, bucket: &str, key: &str) -> Result<Vec<u8>, StorageError> {
        let path = self.object_path(bucket, key)?;
        fs::read(&path).map_err(|e| StorageError::from_io(bucket, key, e))
    }

    fn put(
        &self,
        bucket: &str,
        key: &str,
        bytes: &[u8],
        content_type: &str,
        content_encoding: Option<&str>,
    ) -> Result<(), StorageError> {
        let path = self.object_path(bucket, key)?;
        let metadata = ObjectMetadata {
            content_type: content_type.to_string(),
            content_encoding: content_encoding.map(str::to_string),
        };
        let sidecar = serde_json::to_vec_pretty(&metadata).map_err(|e| StorageError::Io {
            bucket: bucket.to_string(),
            key: key.to_string(),
            source: e.into(),
        })?;

        // The sidecar goes first so a failed put never leaves the object in place.
        let io = |e| StorageError::from_io(bucket, key, e);
        let meta_path = self.metadata_path(bucket, key)?;
        let previous = fs::read(&meta_path).ok();
        write_atomic(&meta_path, &sidecar).map_err(io)?;
        if let Err(e) = write_atomic(&path, bytes) {
            let restored = match &previous {
                Some(old) => write_atomic(&meta_path, old),
                None => fs::remove_file(&meta_path),
            };
            if let Err(cleanup) = restored {
                warn!(path = %meta_path.display(), error = %cleanup, "failed to roll back metadata");
            }
            return Err(io(e));
        }

        debug!(
            path = %path.display(),
            bytes = bytes.len(),
            content_type,
            "object written"
        );
        Ok(())
    }
}

/// Validate a bucket/key pair and join it into a relative path.
fn relative_path(bucket: &str, key: &str) -> Result<PathBuf, StorageError> {
    let invalid = || StorageError::InvalidKey(format!("{bucket}/{key}"));

    if bucket.is_empty() || bucket.contains('/') || bucket == "." || bucket == ".." {
        return Err(invalid());
    }
    if bucket == METADATA_DIR {
        return Err(invalid());
    }
    if key.is_empty() || key.ends_with('/') || key.contains('\\') {
        return Err(invalid());
    }

    let key_path = Path::new(key);
    if !key_path
        .components()
        .all(|component| matches!(component, Component::Normal(_)))
    {
        return Err(invalid());
    }

    Ok(Path::new(bucket).join(key_path))
}

fn write_atomic(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    let tmp = PathBuf::from(tmp);
    let written = write_file(&tmp, bytes).and_then(|()| fs::rename(&tmp, path));
    if written.is_err() {
        let _ = fs::remove_file(&tmp);
    }
    written
}

fn write_file(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    let mut file = OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(true)
        .open(path)?;
    file.write_all(bytes)?;
    file.flush()
}
