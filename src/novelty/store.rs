//! Snapshot storage behind a get-last / replace interface.
//!
//! The tracker logic never changes with the backend:
//!
//! | Backend | Lifetime | Use |
//! |---------|----------|-----|
//! | [`MemoryStore`] | Process | Default, best-effort by contract |
//! | [`FileStore`] | Durable | Survives restarts, shareable between processes via one path |
//!
//! # File layout
//!
//! ```text
//! snapshot.json
//! {"links": ["https://...", ...], "updated_at": "2025-05-06T10:00:00Z"}
//! ```

use crate::errors::SnapshotError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::io::ErrorKind;
use std::path::PathBuf;
use tokio::fs;
use tokio::sync::RwLock;
use tracing::{debug, info, instrument};

/// Storage for the most recent set of seen links.
pub trait SnapshotStore {
    /// The last stored snapshot, or `None` when nothing was ever stored.
    async fn load(&self) -> Result<Option<Vec<String>>, SnapshotError>;

    /// Replace the stored snapshot wholesale.
    async fn replace(&self, links: Vec<String>) -> Result<(), SnapshotError>;
}

/// In-process snapshot. Empty again after every restart.
#[derive(Debug, Default)]
pub struct MemoryStore {
    links: RwLock<Option<Vec<String>>>,
}

impl SnapshotStore for MemoryStore {
    async fn load(&self) -> Result<Option<Vec<String>>, SnapshotError> {
        Ok(self.links.read().await.clone())
    }

    async fn replace(&self, links: Vec<String>) -> Result<(), SnapshotError> {
        *self.links.write().await = Some(links);
        Ok(())
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct SnapshotFile {
    links: Vec<String>,
    updated_at: DateTime<Utc>,
}

/// JSON-file snapshot.
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl SnapshotStore for FileStore {
    #[instrument(level = "debug", skip_all, fields(path = %self.path.display()))]
    async fn load(&self) -> Result<Option<Vec<String>>, SnapshotError> {
        let raw = match fs::read_to_string(&self.path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("No snapshot file yet");
                return Ok(None);
            }
            Err(e) => return Err(e.into()),
        };
        let snapshot: SnapshotFile = serde_json::from_str(&raw)?;
        debug!(count = snapshot.links.len(), updated_at = %snapshot.updated_at, "Loaded snapshot");
        Ok(Some(snapshot.links))
    }

    #[instrument(level = "debug", skip_all, fields(path = %self.path.display()))]
    async fn replace(&self, links: Vec<String>) -> Result<(), SnapshotError> {
        let count = links.len();
        let json = serde_json::to_string(&SnapshotFile {
            links,
            updated_at: Utc::now(),
        })?;

        // Write next to the target and rename so readers never see half a file.
        let tmp_path = self.path.with_extension("json.tmp");
        fs::write(&tmp_path, json).await?;
        fs::rename(&tmp_path, &self.path).await?;
        info!(count, "Wrote snapshot file");
        Ok(())
    }
}

/// The configured backend.
#[derive(Debug)]
pub enum SnapshotBackend {
    Memory(MemoryStore),
    File(FileStore),
}

impl SnapshotStore for SnapshotBackend {
    async fn load(&self) -> Result<Option<Vec<String>>, SnapshotError> {
        match self {
            SnapshotBackend::Memory(store) => store.load().await,
            SnapshotBackend::File(store) => store.load().await,
        }
    }

    async fn replace(&self, links: Vec<String>) -> Result<(), SnapshotError> {
        match self {
            SnapshotBackend::Memory(store) => store.replace(links).await,
            SnapshotBackend::File(store) => store.replace(links).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn links(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[tokio::test]
    async fn test_memory_store_starts_empty() {
        let store = MemoryStore::default();
        assert_eq!(store.load().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_memory_store_replaces_wholesale() {
        let store = MemoryStore::default();
        store.replace(links(&["a", "b"])).await.unwrap();
        store.replace(links(&["c"])).await.unwrap();
        assert_eq!(store.load().await.unwrap(), Some(links(&["c"])));
    }

    #[tokio::test]
    async fn test_memory_store_distinguishes_empty_snapshot() {
        let store = MemoryStore::default();
        store.replace(Vec::new()).await.unwrap();
        assert_eq!(store.load().await.unwrap(), Some(Vec::new()));
    }

    #[tokio::test]
    async fn test_file_store_missing_file_is_none() {
        let tmp = tempfile::tempdir().unwrap();
        let store = FileStore::new(tmp.path().join("snapshot.json"));
        assert_eq!(store.load().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_file_store_survives_new_instance() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("snapshot.json");

        FileStore::new(&path)
            .replace(links(&["http://x/1", "http://x/2"]))
            .await
            .unwrap();

        let reopened = FileStore::new(&path);
        assert_eq!(
            reopened.load().await.unwrap(),
            Some(links(&["http://x/1", "http://x/2"]))
        );
        assert!(!path.with_extension("json.tmp").exists());
    }

    #[tokio::test]
    async fn test_file_store_corrupt_file() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("snapshot.json");
        std::fs::write(&path, "not json").unwrap();

        let err = FileStore::new(&path).load().await.unwrap_err();
        assert!(matches!(err, SnapshotError::Corrupt(_)));
    }
}
