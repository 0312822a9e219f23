//! Stage trait, descriptors, and execution context.
//!
//! Stages are the units of enrichment in a specforge pipeline. A stage reads
//! the current state, optionally queries the generation provider through the
//! extraction layer, and returns a partial update, or an interrupt request
//! when it needs operator input. Stages never mutate the state they are
//! given; the executor folds their updates in.

use crate::errors::{PipelineValidationError, StageError};
use crate::events::EventSink;
use crate::extraction::ExtractionOrigin;
use crate::pipeline::RunToken;
use crate::state::PipelineState;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt::Debug;
use std::sync::Arc;

/// One selectable answer offered with an interrupt.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InterruptChoice {
    /// Short key the operator can type (e.g. "a").
    pub key: String,
    /// Human-readable label for the choice.
    pub label: String,
}

/// The message handed back to the caller when a stage suspends.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InterruptPayload {
    /// Human-readable prompt describing the input needed.
    pub message: String,
    /// Optional structured choices.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub choices: Vec<InterruptChoice>,
}

impl InterruptPayload {
    /// Creates a payload with a prompt and no choices.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            choices: Vec::new(),
        }
    }

    /// Adds one choice.
    #[must_use]
    pub fn with_choice(mut self, key: impl Into<String>, label: impl Into<String>) -> Self {
        self.choices.push(InterruptChoice {
            key: key.into(),
            label: label.into(),
        });
        self
    }

    /// Renders the prompt and choices as terminal-ready text.
    #[must_use]
    pub fn render(&self) -> String {
        let mut out = self.message.clone();
        for choice in &self.choices {
            out.push('\n');
            out.push_str(&format!("  {}. {}", choice.key.to_uppercase(), choice.label));
        }
        out
    }
}

/// What a stage execution produced.
#[derive(Debug)]
pub enum StageOutcome<S: PipelineState> {
    /// A partial update to fold into the run state.
    Update(S::Update),
    /// A request for operator input; the run suspends here.
    Interrupt(InterruptPayload),
}

/// Read-only execution context handed to each stage invocation.
#[derive(Debug, Clone)]
pub struct StageContext {
    token: RunToken,
    stage: String,
    resume: Option<serde_json::Value>,
    events: Arc<dyn EventSink>,
}

impl StageContext {
    /// Creates a stage context.
    #[must_use]
    pub fn new(
        token: RunToken,
        stage: impl Into<String>,
        resume: Option<serde_json::Value>,
        events: Arc<dyn EventSink>,
    ) -> Self {
        Self {
            token,
            stage: stage.into(),
            resume,
            events,
        }
    }

    /// Returns the run token.
    #[must_use]
    pub fn run_token(&self) -> RunToken {
        self.token
    }

    /// Returns the executing stage's name.
    #[must_use]
    pub fn stage_name(&self) -> &str {
        &self.stage
    }

    /// Returns the caller-supplied resume value, present only when this
    /// invocation re-enters the stage after a suspension.
    #[must_use]
    pub fn resume_value(&self) -> Option<&serde_json::Value> {
        self.resume.as_ref()
    }

    /// Returns the resume value coerced to text.
    #[must_use]
    pub fn resume_text(&self) -> Option<String> {
        self.resume.as_ref().map(|value| match value {
            serde_json::Value::String(text) => text.clone(),
            other => other.to_string(),
        })
    }

    /// Emits an event through the run's sink.
    pub fn try_emit(&self, event: &str, payload: Option<serde_json::Value>) {
        self.events.try_emit(event, payload);
    }

    /// Reports an extraction origin; recovered extractions emit
    /// `extraction.recovered` so degradations stay observable without
    /// interrupting the run.
    pub fn note_extraction(&self, origin: ExtractionOrigin) {
        if origin.is_recovered() {
            self.try_emit(
                "extraction.recovered",
                Some(serde_json::json!({
                    "run": self.token.to_string(),
                    "stage": &self.stage,
                })),
            );
        }
    }
}

/// Trait for pipeline stages over state `S`.
#[async_trait]
pub trait Stage<S: PipelineState>: Send + Sync + Debug {
    /// Returns the name of the stage.
    fn name(&self) -> &str;

    /// Returns true when this stage may request operator input.
    fn suspends(&self) -> bool {
        false
    }

    /// Executes the stage against an immutable view of the run state.
    ///
    /// # Errors
    ///
    /// Any error is fatal for the run; malformed provider responses are not
    /// errors; they degrade to defaults inside the stage.
    async fn execute(&self, state: &S, ctx: &StageContext) -> Result<StageOutcome<S>, StageError>;
}

/// Immutable descriptor for one stage in a pipeline definition.
#[derive(Debug, Clone)]
pub struct StageSpec<S: PipelineState> {
    /// The unique name of the stage.
    pub name: String,
    /// The stage implementation.
    pub runner: Arc<dyn Stage<S>>,
    /// Names of stages this stage depends on.
    pub dependencies: Vec<String>,
    /// Whether the stage may suspend.
    pub suspendable: bool,
    /// State fields the stage reads.
    pub reads: Vec<String>,
    /// State fields the stage writes.
    pub writes: Vec<String>,
}

impl<S: PipelineState> StageSpec<S> {
    /// Creates a descriptor for the given runner.
    #[must_use]
    pub fn new(runner: Arc<dyn Stage<S>>) -> Self {
        Self {
            name: runner.name().to_string(),
            suspendable: runner.suspends(),
            runner,
            dependencies: Vec::new(),
            reads: Vec::new(),
            writes: Vec::new(),
        }
    }

    /// Adds a dependency on another stage.
    #[must_use]
    pub fn with_dependency(mut self, dep: impl Into<String>) -> Self {
        self.dependencies.push(dep.into());
        self
    }

    /// Declares the fields this stage reads.
    #[must_use]
    pub fn reads(mut self, fields: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.reads = fields.into_iter().map(Into::into).collect();
        self
    }

    /// Declares the fields this stage writes.
    #[must_use]
    pub fn writes(mut self, fields: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.writes = fields.into_iter().map(Into::into).collect();
        self
    }

    /// Validates the descriptor in isolation.
    ///
    /// # Errors
    ///
    /// Returns an error if the stage depends on itself.
    pub fn validate(&self) -> Result<(), PipelineValidationError> {
        if self.dependencies.iter().any(|dep| dep == &self.name) {
            return Err(PipelineValidationError::new(format!(
                "stage '{}' cannot depend on itself",
                self.name
            ))
            .with_stages(vec![self.name.clone()]));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::NoOpEventSink;
    use crate::state::keep_or;
    use pretty_assertions::assert_eq;

    #[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
    struct TestState {
        text: String,
    }

    #[derive(Debug, Default)]
    struct TestUpdate {
        text: Option<String>,
    }

    impl PipelineState for TestState {
        type Update = TestUpdate;

        fn merge(&self, update: Self::Update) -> Self {
            Self {
                text: keep_or(&self.text, update.text),
            }
        }
    }

    #[derive(Debug)]
    struct EchoStage;

    #[async_trait]
    impl Stage<TestState> for EchoStage {
        fn name(&self) -> &str {
            "echo"
        }

        async fn execute(
            &self,
            state: &TestState,
            _ctx: &StageContext,
        ) -> Result<StageOutcome<TestState>, StageError> {
            Ok(StageOutcome::Update(TestUpdate {
                text: Some(format!("{}!", state.text)),
            }))
        }
    }

    fn test_ctx(stage: &str) -> StageContext {
        StageContext::new(RunToken::new(), stage, None, Arc::new(NoOpEventSink))
    }

    #[tokio::test]
    async fn stage_returns_update_without_mutating_input() {
        let state = TestState {
            text: "hi".to_string(),
        };
        let outcome = EchoStage.execute(&state, &test_ctx("echo")).await.unwrap();

        match outcome {
            StageOutcome::Update(update) => assert_eq!(update.text.as_deref(), Some("hi!")),
            StageOutcome::Interrupt(_) => panic!("unexpected interrupt"),
        }
        assert_eq!(state.text, "hi");
    }

    #[test]
    fn payload_renders_choices() {
        let payload = InterruptPayload::new("Pick a style:")
            .with_choice("a", "Minimal")
            .with_choice("b", "Dark");
        let rendered = payload.render();

        assert!(rendered.starts_with("Pick a style:"));
        assert!(rendered.contains("A. Minimal"));
        assert!(rendered.contains("B. Dark"));
    }

    #[test]
    fn resume_text_coerces_non_strings() {
        let ctx = StageContext::new(
            RunToken::new(),
            "s",
            Some(serde_json::json!(42)),
            Arc::new(NoOpEventSink),
        );
        assert_eq!(ctx.resume_text().as_deref(), Some("42"));
    }

    #[test]
    fn self_dependency_fails_validation() {
        let spec = StageSpec::new(Arc::new(EchoStage) as Arc<dyn Stage<TestState>>)
            .with_dependency("echo");
        assert!(spec.validate().is_err());
    }
}
