//! Pipeline definition and the staged executor.
//!
//! Execution is single-threaded and cooperative: exactly one stage is active
//! at a time within a run, and a run advances only through explicit
//! [`Executor::run`] / [`Executor::resume`] calls. Suspension points are
//! exactly the interrupt requests returned by stages flagged as
//! human-in-the-loop; nothing else yields control.

mod builder;
mod token;


pub use builder::PipelineBuilder;
pub use token::RunToken;

use crate::checkpoint::{Checkpoint, CheckpointStore};
use crate::errors::SpecforgeError;
use crate::events::{EventSink, NoOpEventSink};
use crate::stages::{InterruptPayload, StageContext, StageOutcome, StageSpec};
use crate::state::PipelineState;
use std::collections::HashMap;
use std::sync::Arc;

/// A validated pipeline: stage descriptors in execution order.
///
/// Immutable for the process lifetime once built.
#[derive(Debug)]
pub struct Pipeline<S: PipelineState> {
    name: String,
    stages: Vec<StageSpec<S>>,
    positions: HashMap<String, usize>,
}

impl<S: PipelineState> Pipeline<S> {
    pub(crate) fn from_parts(name: String, stages: Vec<StageSpec<S>>) -> Self {
        let positions = stages
            .iter()
            .enumerate()
            .map(|(idx, spec)| (spec.name.clone(), idx))
            .collect();
        Self {
            name,
            stages,
            positions,
        }
    }

    /// Returns the pipeline name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the number of stages.
    #[must_use]
    pub fn stage_count(&self) -> usize {
        self.stages.len()
    }

    /// Returns the stage names in execution order.
    #[must_use]
    pub fn execution_order(&self) -> Vec<&str> {
        self.stages.iter().map(|spec| spec.name.as_str()).collect()
    }

    /// Returns the position of a stage in execution order.
    #[must_use]
    pub fn position(&self, stage: &str) -> Option<usize> {
        self.positions.get(stage).copied()
    }
}

/// The result of driving a run as far as it will go.
#[derive(Debug)]
pub enum RunOutcome<S> {
    /// The terminal stage returned; the state is final.
    Complete(S),
    /// A stage requested operator input; the run is checkpointed.
    Suspended {
        /// Token to pass to [`Executor::resume`].
        token: RunToken,
        /// What the operator is being asked.
        payload: InterruptPayload,
    },
}

impl<S> RunOutcome<S> {
    /// Returns true when the run reached the terminal stage.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        matches!(self, Self::Complete(_))
    }

    /// Returns the final state, or `None` while suspended.
    #[must_use]
    pub fn into_state(self) -> Option<S> {
        match self {
            Self::Complete(state) => Some(state),
            Self::Suspended { .. } => None,
        }
    }
}

/// Drives runs of one pipeline against a checkpoint store.
pub struct Executor<S: PipelineState> {
    pipeline: Pipeline<S>,
    store: Arc<dyn CheckpointStore>,
    events: Arc<dyn EventSink>,
}

impl<S: PipelineState> Executor<S> {
    /// Creates an executor with a no-op event sink.
    #[must_use]
    pub fn new(pipeline: Pipeline<S>, store: Arc<dyn CheckpointStore>) -> Self {
        Self {
            pipeline,
            store,
            events: Arc::new(NoOpEventSink),
        }
    }

    /// Replaces the event sink.
    #[must_use]
    pub fn with_events(mut self, events: Arc<dyn EventSink>) -> Self {
        self.events = events;
        self
    }

    /// Returns the pipeline being executed.
    #[must_use]
    pub fn pipeline(&self) -> &Pipeline<S> {
        &self.pipeline
    }

    /// Starts a fresh run under a new token.
    ///
    /// Walks the stages in dependency order, folding each stage's update
    /// into the state. If a stage suspends, the checkpoint is persisted and
    /// the interrupt payload is returned immediately; no further stages run.
    ///
    /// # Errors
    ///
    /// A stage failure aborts the run and names the failing stage.
    pub async fn run(&self, initial: S) -> Result<RunOutcome<S>, SpecforgeError> {
        self.run_with_token(RunToken::new(), initial).await
    }

    /// Starts a fresh run under a caller-chosen token.
    ///
    /// # Errors
    ///
    /// Same failure modes as [`Self::run`].
    pub async fn run_with_token(
        &self,
        token: RunToken,
        initial: S,
    ) -> Result<RunOutcome<S>, SpecforgeError> {
        self.advance(token, initial, 0, None).await
    }

    /// Resumes a suspended run, injecting `value` at the interrupt point.
    ///
    /// Loads the checkpoint, re-enters the suspended stage with the value
    /// substituted for the suspended input, merges its update, and continues
    /// traversal from the next stage.
    ///
    /// # Errors
    ///
    /// Fails fatally when no checkpoint exists for the token.
    pub async fn resume(
        &self,
        token: RunToken,
        value: serde_json::Value,
    ) -> Result<RunOutcome<S>, SpecforgeError> {
        let checkpoint = self
            .store
            .load(token)
            .await?
            .ok_or(SpecforgeError::CheckpointNotFound { token })?;

        let state: S = serde_json::from_value(checkpoint.state)?;
        let start = self
            .pipeline
            .position(&checkpoint.cursor)
            .ok_or_else(|| SpecforgeError::UnknownCursor {
                token,
                stage: checkpoint.cursor.clone(),
            })?;

        self.advance(token, state, start, Some(value)).await
    }

    async fn advance(
        &self,
        token: RunToken,
        mut state: S,
        start: usize,
        mut resume: Option<serde_json::Value>,
    ) -> Result<RunOutcome<S>, SpecforgeError> {
        for spec in &self.pipeline.stages[start..] {
            let ctx = StageContext::new(token, &spec.name, resume.take(), self.events.clone());

            self.events.try_emit(
                "stage.started",
                Some(serde_json::json!({
                    "run": token.to_string(),
                    "stage": &spec.name,
                })),
            );
            tracing::debug!(run = %token, stage = %spec.name, "stage started");

            let outcome = spec.runner.execute(&state, &ctx).await.map_err(|source| {
                self.events.try_emit(
                    "stage.failed",
                    Some(serde_json::json!({
                        "run": token.to_string(),
                        "stage": &spec.name,
                        "error": source.to_string(),
                    })),
                );
                SpecforgeError::StageFailed {
                    stage: spec.name.clone(),
                    source,
                }
            })?;

            match outcome {
                StageOutcome::Update(update) => {
                    state = state.merge(update);
                    self.events.try_emit(
                        "stage.completed",
                        Some(serde_json::json!({
                            "run": token.to_string(),
                            "stage": &spec.name,
                        })),
                    );
                }
                StageOutcome::Interrupt(payload) => {
                    let snapshot = serde_json::to_value(&state)?;
                    self.store
                        .save(token, Checkpoint::new(snapshot, &spec.name))
                        .await?;
                    self.events.try_emit(
                        "stage.suspended",
                        Some(serde_json::json!({
                            "run": token.to_string(),
                            "stage": &spec.name,
                        })),
                    );
                    tracing::debug!(run = %token, stage = %spec.name, "run suspended");
                    return Ok(RunOutcome::Suspended { token, payload });
                }
            }
        }

        self.store.delete(token).await?;
        self.events.try_emit(
            "run.completed",
            Some(serde_json::json!({
                "run": token.to_string(),
                "pipeline": self.pipeline.name(),
            })),
        );
        tracing::debug!(run = %token, pipeline = %self.pipeline.name(), "run completed");
        Ok(RunOutcome::Complete(state))
    }
}
