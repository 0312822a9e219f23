//! Error types for the specforge pipelines.
//!
//! The taxonomy follows the run-level failure policy: provider and renderer
//! failures are fatal and abort the run naming the stage, malformed provider
//! payloads are recovered inside the extraction layer and never surface here,
//! and assembly refuses to produce partial artifacts.

use crate::pipeline::RunToken;
use thiserror::Error;

/// The main error type for specforge operations.
#[derive(Debug, Error)]
pub enum SpecforgeError {
    /// A stage aborted the run.
    #[error("stage '{stage}' failed: {source}")]
    StageFailed {
        /// The name of the failing stage.
        stage: String,
        /// The underlying stage error.
        #[source]
        source: StageError,
    },

    /// A resume was requested for a run token with no stored checkpoint.
    #[error("no checkpoint found for run {token}; cannot resume")]
    CheckpointNotFound {
        /// The unknown or expired run token.
        token: RunToken,
    },

    /// A stored checkpoint names a stage the pipeline no longer contains.
    #[error("checkpoint for run {token} points at unknown stage '{stage}'")]
    UnknownCursor {
        /// The run token whose checkpoint is stale.
        token: RunToken,
        /// The cursor stage name.
        stage: String,
    },

    /// The checkpoint store backend failed.
    #[error("{0}")]
    Checkpoint(#[from] CheckpointError),

    /// A pipeline definition failed validation.
    #[error("{0}")]
    Validation(#[from] PipelineValidationError),

    /// State snapshot encoding or decoding failed.
    #[error("state serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Error raised inside a stage body. Always fatal for the run.
#[derive(Debug, Error)]
pub enum StageError {
    /// The generation provider call failed (network, auth, bad status).
    #[error("{0}")]
    Provider(#[from] ProviderError),

    /// Mockup rendering failed (rasterizer unavailable or crashed).
    #[error("{0}")]
    Render(#[from] RenderError),
}

/// Error from the generation provider collaborator.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// Transport-level failure.
    #[error("provider request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The endpoint answered with a non-success status.
    #[error("provider returned status {status}: {body}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Response body, truncated by the caller.
        body: String,
    },

    /// The endpoint answered but carried no choices/content.
    #[error("provider response contained no content")]
    Empty,
}

/// Error from the mockup rasterizer collaborator.
#[derive(Debug, Error)]
pub enum RenderError {
    /// No usable browser binary was found on the host.
    #[error("no headless browser binary found (tried {tried})")]
    BrowserNotFound {
        /// Comma-separated list of binaries probed.
        tried: String,
    },

    /// The screenshot command exited unsuccessfully.
    #[error("screenshot command failed with {status}: {stderr}")]
    CommandFailed {
        /// Exit status description.
        status: String,
        /// Captured stderr.
        stderr: String,
    },

    /// IO around the temporary render directory failed.
    #[error("render IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Error from the checkpoint store backend.
#[derive(Debug, Error)]
pub enum CheckpointError {
    /// Reading or writing the backing storage failed.
    #[error("checkpoint IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A stored checkpoint could not be decoded.
    #[error("checkpoint decode error: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Error raised when a pipeline definition fails validation.
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct PipelineValidationError {
    /// The error message.
    pub message: String,
    /// The stages involved in the error.
    pub stages: Vec<String>,
}

impl PipelineValidationError {
    /// Creates a new pipeline validation error.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            stages: Vec::new(),
        }
    }

    /// Sets the stages involved.
    #[must_use]
    pub fn with_stages(mut self, stages: Vec<String>) -> Self {
        self.stages = stages;
        self
    }
}

/// Error raised when assembling the final artifact.
#[derive(Debug, Error)]
pub enum AssemblyError {
    /// A required-by-construction field is absent from the final state.
    #[error("cannot assemble artifact: required field '{field}' is missing")]
    MissingField {
        /// The absent field name.
        field: &'static str,
    },

    /// Writing the artifact to its destination failed.
    #[error("failed to write artifact: {0}")]
    Io(#[from] std::io::Error),
}
