//! Checkpoint persistence for suspended runs.
//!
//! A checkpoint is a snapshot of (state, cursor) taken immediately before a
//! suspending stage halts, keyed by the run token. The next save for the
//! same token supersedes the previous one; completion deletes it. Eviction
//! of abandoned suspended runs is the store's own concern; the executor
//! never schedules it.

mod file;
mod memory;

pub use file::FileCheckpointStore;
pub use memory::MemoryCheckpointStore;

use crate::errors::CheckpointError;
use crate::pipeline::RunToken;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::Debug;

/// A persisted snapshot of a suspended run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Checkpoint {
    /// The serialized pipeline state at the suspension point.
    pub state: serde_json::Value,
    /// The name of the stage to re-enter on resume.
    pub cursor: String,
    /// When the checkpoint was written.
    pub saved_at: DateTime<Utc>,
}

impl Checkpoint {
    /// Creates a checkpoint stamped with the current time.
    #[must_use]
    pub fn new(state: serde_json::Value, cursor: impl Into<String>) -> Self {
        Self {
            state,
            cursor: cursor.into(),
            saved_at: Utc::now(),
        }
    }
}

/// Persists and recalls checkpoints keyed by run token.
///
/// Implementations must guarantee read-after-write consistency for a single
/// run token within one process. Cross-process durability is a deployment
/// choice, not a core guarantee.
#[async_trait]
pub trait CheckpointStore: Send + Sync + Debug {
    /// Stores the checkpoint, replacing any prior one for the same token.
    async fn save(&self, token: RunToken, checkpoint: Checkpoint) -> Result<(), CheckpointError>;

    /// Loads the checkpoint for the token, or `None` when unknown.
    async fn load(&self, token: RunToken) -> Result<Option<Checkpoint>, CheckpointError>;

    /// Removes the checkpoint for the token. Unknown tokens are a no-op.
    async fn delete(&self, token: RunToken) -> Result<(), CheckpointError>;
}
