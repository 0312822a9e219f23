//! In-memory checkpoint store.

use super::{Checkpoint, CheckpointStore};
use crate::errors::CheckpointError;
use crate::pipeline::RunToken;
use async_trait::async_trait;
use dashmap::DashMap;

/// A process-local checkpoint store.
///
/// Suited to interactive sessions where the suspend/resume round trip stays
/// inside one process. Nothing survives a restart.
#[derive(Debug, Default)]
pub struct MemoryCheckpointStore {
    entries: DashMap<RunToken, Checkpoint>,
}

impl MemoryCheckpointStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of stored checkpoints.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true when no checkpoints are stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[async_trait]
impl CheckpointStore for MemoryCheckpointStore {
    async fn save(&self, token: RunToken, checkpoint: Checkpoint) -> Result<(), CheckpointError> {
        self.entries.insert(token, checkpoint);
        Ok(())
    }

    async fn load(&self, token: RunToken) -> Result<Option<Checkpoint>, CheckpointError> {
        Ok(self.entries.get(&token).map(|entry| entry.value().clone()))
    }

    async fn delete(&self, token: RunToken) -> Result<(), CheckpointError> {
        self.entries.remove(&token);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[tokio::test]
    async fn save_then_load_round_trips() {
        let store = MemoryCheckpointStore::new();
        let token = RunToken::new();
        let checkpoint = Checkpoint::new(serde_json::json!({"k": "v"}), "ask_style");

        store.save(token, checkpoint).await.unwrap();
        let loaded = store.load(token).await.unwrap().unwrap();

        assert_eq!(loaded.cursor, "ask_style");
        assert_eq!(loaded.state["k"], "v");
    }

    #[tokio::test]
    async fn later_save_supersedes_earlier() {
        let store = MemoryCheckpointStore::new();
        let token = RunToken::new();

        store
            .save(token, Checkpoint::new(serde_json::json!({"n": 1}), "a"))
            .await
            .unwrap();
        store
            .save(token, Checkpoint::new(serde_json::json!({"n": 2}), "b"))
            .await
            .unwrap();

        let loaded = store.load(token).await.unwrap().unwrap();
        assert_eq!(loaded.cursor, "b");
        assert_eq!(loaded.state["n"], 2);
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn unknown_token_loads_none() {
        let store = MemoryCheckpointStore::new();
        assert!(store.load(RunToken::new()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn distinct_tokens_are_independent() {
        let store = MemoryCheckpointStore::new();
        let first = RunToken::new();
        let second = RunToken::new();

        store
            .save(first, Checkpoint::new(serde_json::json!({"run": 1}), "x"))
            .await
            .unwrap();
        store
            .save(second, Checkpoint::new(serde_json::json!({"run": 2}), "y"))
            .await
            .unwrap();

        store.delete(first).await.unwrap();

        assert!(store.load(first).await.unwrap().is_none());
        let remaining = store.load(second).await.unwrap().unwrap();
        assert_eq!(remaining.cursor, "y");
    }
}
