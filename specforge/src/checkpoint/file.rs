//! File-backed checkpoint store.

use super::{Checkpoint, CheckpointStore};
use crate::errors::CheckpointError;
use crate::pipeline::RunToken;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::path::{Path, PathBuf};

/// A checkpoint store writing one JSON file per run token.
///
/// Gives suspended runs cross-process durability: a CLI invocation can
/// suspend, exit, and a later invocation can resume against the same
/// directory.
#[derive(Debug, Clone)]
pub struct FileCheckpointStore {
    dir: PathBuf,
}

impl FileCheckpointStore {
    /// Creates a store rooted at `dir`. The directory is created lazily on
    /// first save.
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Returns the backing directory.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, token: RunToken) -> PathBuf {
        self.dir.join(format!("{token}.json"))
    }

    /// Deletes checkpoints saved before `cutoff`, returning how many were
    /// removed. Abandoned suspended runs never resume; this is the store's
    /// eviction hook for them.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be read.
    pub async fn sweep_older_than(&self, cutoff: DateTime<Utc>) -> Result<usize, CheckpointError> {
        let mut removed = 0;
        let mut entries = match tokio::fs::read_dir(&self.dir).await {
            Ok(entries) => entries,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(0),
            Err(err) => return Err(err.into()),
        };

        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().map_or(true, |ext| ext != "json") {
                continue;
            }
            let Ok(bytes) = tokio::fs::read(&path).await else {
                continue;
            };
            let Ok(checkpoint) = serde_json::from_slice::<Checkpoint>(&bytes) else {
                continue;
            };
            if checkpoint.saved_at < cutoff {
                tokio::fs::remove_file(&path).await?;
                removed += 1;
            }
        }

        Ok(removed)
    }
}

#[async_trait]
impl CheckpointStore for FileCheckpointStore {
    async fn save(&self, token: RunToken, checkpoint: Checkpoint) -> Result<(), CheckpointError> {
        tokio::fs::create_dir_all(&self.dir).await?;
        let bytes = serde_json::to_vec_pretty(&checkpoint)?;
        tokio::fs::write(self.path_for(token), bytes).await?;
        Ok(())
    }

    async fn load(&self, token: RunToken) -> Result<Option<Checkpoint>, CheckpointError> {
        match tokio::fs::read(self.path_for(token)).await {
            Ok(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    async fn delete(&self, token: RunToken) -> Result<(), CheckpointError> {
        match tokio::fs::remove_file(self.path_for(token)).await {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[tokio::test]
    async fn survives_a_new_store_instance() {
        let dir = tempfile::tempdir().unwrap();
        let token = RunToken::new();

        let writer = FileCheckpointStore::new(dir.path());
        writer
            .save(token, Checkpoint::new(serde_json::json!({"k": 7}), "image"))
            .await
            .unwrap();

        // A fresh store over the same directory models a second process.
        let reader = FileCheckpointStore::new(dir.path());
        let loaded = reader.load(token).await.unwrap().unwrap();

        assert_eq!(loaded.cursor, "image");
        assert_eq!(loaded.state["k"], 7);
    }

    #[tokio::test]
    async fn delete_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileCheckpointStore::new(dir.path());
        let token = RunToken::new();

        store
            .save(token, Checkpoint::new(serde_json::json!({}), "a"))
            .await
            .unwrap();
        store.delete(token).await.unwrap();
        store.delete(token).await.unwrap();

        assert!(store.load(token).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn sweep_removes_only_stale_checkpoints() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileCheckpointStore::new(dir.path());

        let stale_token = RunToken::new();
        let mut stale = Checkpoint::new(serde_json::json!({}), "a");
        stale.saved_at = Utc::now() - chrono::Duration::days(30);
        store.save(stale_token, stale).await.unwrap();

        let fresh_token = RunToken::new();
        store
            .save(fresh_token, Checkpoint::new(serde_json::json!({}), "b"))
            .await
            .unwrap();

        let cutoff = Utc::now() - chrono::Duration::days(7);
        let removed = store.sweep_older_than(cutoff).await.unwrap();

        assert_eq!(removed, 1);
        assert!(store.load(stale_token).await.unwrap().is_none());
        assert!(store.load(fresh_token).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn sweep_on_missing_dir_is_zero() {
        let store = FileCheckpointStore::new("/nonexistent/specforge-checkpoints");
        let removed = store.sweep_older_than(Utc::now()).await.unwrap();
        assert_eq!(removed, 0);
    }
}
