//! The PRD pipeline: free-text requirement in, structured document out.
//!
//! Six provider-backed stages enrich a [`PrdState`] in a fixed linear order;
//! the assembler then renders the final state to markdown. The architecture
//! stage is human-in-the-loop: it suspends for a target language when the
//! caller supplied no hint.

mod assembler;
mod stages;
mod state;

pub use assembler::{PrdArtifact, PrdAssembler};
pub use stages::{
    normalize_language, ApiStage, ArchitectureStage, DataModelStage, FeaturesStage, IntentStage,
    NfrStage, LANGUAGE_QUESTION,
};
pub use state::{
    ApiField, ApiSpec, Domain, DtoContract, FeatureSpec, FrameworkInsight, NfrProfile, PrdState,
    PrdUpdate, TableField, TableSchema,
};

use crate::errors::PipelineValidationError;
use crate::pipeline::{Pipeline, PipelineBuilder};
use crate::provider::GenerationProvider;
use crate::stages::StageSpec;
use std::sync::Arc;

/// Builds the PRD pipeline over the given provider.
///
/// # Errors
///
/// Returns an error if the stage wiring fails validation (which would be a
/// programming error in this crate).
pub fn build_pipeline(
    provider: Arc<dyn GenerationProvider>,
) -> Result<Pipeline<PrdState>, PipelineValidationError> {
    PipelineBuilder::new("prd")
        .inputs(["user_input", "tech_stack"])
        .stage(
            StageSpec::new(Arc::new(IntentStage::new(provider.clone())))
                .reads(["user_input"])
                .writes([
                    "project_name",
                    "project_goal",
                    "background",
                    "value",
                    "user_segments",
                    "vision",
                    "domain",
                ]),
        )
        .stage(
            StageSpec::new(Arc::new(FeaturesStage::new(provider.clone())))
                .with_dependency("intent")
                .reads(["project_name", "domain", "project_goal"])
                .writes(["features"]),
        )
        .stage(
            StageSpec::new(Arc::new(ArchitectureStage::new(provider.clone())))
                .with_dependency("features")
                .reads(["project_name", "domain", "project_goal", "tech_stack"])
                .writes([
                    "tech_stack",
                    "frameworks",
                    "business_architecture",
                    "technical_architecture",
                    "data_flow",
                    "scalability",
                ]),
        )
        .stage(
            StageSpec::new(Arc::new(DataModelStage::new(provider.clone())))
                .with_dependency("architecture")
                .reads(["project_name", "domain", "features"])
                .writes(["core_entities", "tables", "dto_contracts"]),
        )
        .stage(
            StageSpec::new(Arc::new(ApiStage::new(provider.clone())))
                .with_dependency("datamodel")
                .reads(["project_name", "domain", "features", "core_entities"])
                .writes(["apis"]),
        )
        .stage(
            StageSpec::new(Arc::new(NfrStage::new(provider)))
                .with_dependency("api")
                .reads(["project_name", "domain", "frameworks"])
                .writes(["nfr", "risks", "glossary"]),
        )
        .build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checkpoint::MemoryCheckpointStore;
    use crate::pipeline::{Executor, RunOutcome};
    use crate::testing::ScriptedProvider;
    use pretty_assertions::assert_eq;

    #[test]
    fn pipeline_orders_the_six_stages() {
        let provider = Arc::new(ScriptedProvider::new());
        let pipeline = build_pipeline(provider).unwrap();

        assert_eq!(
            pipeline.execution_order(),
            vec!["intent", "features", "architecture", "datamodel", "api", "nfr"]
        );
    }

    /// End-to-end over a scripted provider: "Build a blog platform" with no
    /// language override suspends for the language, then completes with the
    /// generated name in the title and a closed-set domain.
    #[tokio::test]
    async fn blog_requirement_runs_end_to_end() {
        let provider = Arc::new(ScriptedProvider::new());
        provider.push_text(
            r#"{"project_name": "Inkwell", "project_goal": "let writers publish",
                "background": "bg", "value": "val", "user_segments": ["writers"],
                "vision": "the home for long-form writing", "domain": "blog"}"#,
        );
        provider.push_text(r#"{"features": [{"name": "Post Editor", "description": "d"}]}"#);
        provider.push_text(
            r#"{"business_architecture": "ba", "technical_architecture": "ta",
                "data_flow": "df", "scalability": "sc",
                "frameworks": {"language": "python", "rationale": "mature",
                               "backend": ["django"], "frontend": ["react"],
                               "orchestration": []}}"#,
        );
        provider.push_text(
            r#"{"core_entities": ["Post"], "tables": [], "dto_contracts": []}"#,
        );
        provider.push_text(r#"{"apis": [{"name": "List Posts", "url": "/posts", "method": "GET"}]}"#);
        provider.push_text(r#"{"nfr": {"performance": "p99 < 200ms"}, "risks": ["spam"], "glossary": ["post"]}"#);

        let pipeline = build_pipeline(provider).unwrap();
        let executor = Executor::new(pipeline, Arc::new(MemoryCheckpointStore::new()));

        let outcome = executor
            .run(PrdState::from_requirement("Build a blog platform", None))
            .await
            .unwrap();
        let RunOutcome::Suspended { token, payload } = outcome else {
            panic!("expected the language question");
        };
        assert!(payload.message.contains("language"));

        let outcome = executor
            .resume(token, serde_json::json!(""))
            .await
            .unwrap();
        let state = outcome.into_state().unwrap();

        assert_eq!(state.project_name, "Inkwell");
        assert_eq!(state.domain, Domain::Blog);
        assert_eq!(state.tech_stack.as_deref(), Some("python"));
        assert_eq!(state.features.len(), 1);
        assert_eq!(state.risks, vec!["spam".to_string()]);

        let artifact = PrdAssembler::assemble(&state);
        assert!(artifact.markdown.starts_with("# Inkwell PRD"));
        assert!(artifact.markdown.contains("Post Editor"));
    }

    /// A language hint removes the only suspension point.
    #[tokio::test]
    async fn language_hint_completes_without_suspending() {
        let provider = Arc::new(ScriptedProvider::new());
        for _ in 0..6 {
            provider.push_text("{}");
        }

        let pipeline = build_pipeline(provider).unwrap();
        let executor = Executor::new(pipeline, Arc::new(MemoryCheckpointStore::new()));

        let outcome = executor
            .run(PrdState::from_requirement("req", Some("go".to_string())))
            .await
            .unwrap();
        let state = outcome.into_state().unwrap();

        assert_eq!(state.tech_stack.as_deref(), Some("go"));
        assert_eq!(state.domain, Domain::Generic);
    }
}
