//! The six provider-backed enrichment stages of the PRD pipeline.

use super::state::{
    ApiSpec, Domain, DtoContract, FeatureSpec, FrameworkInsight, NfrProfile, PrdState, PrdUpdate,
    TableSchema,
};
use crate::errors::StageError;
use crate::extraction::extract_payload;
use crate::provider::GenerationProvider;
use crate::stages::{InterruptPayload, Stage, StageContext, StageOutcome};
use async_trait::async_trait;
use serde::Deserialize;
use std::sync::Arc;

const INTENT_PROMPT: &str = "You are a senior product strategist. Based on the provided \
requirement, summarize the product intent and return JSON with the following keys:\n{\n  \
\"project_name\": string,\n  \"project_goal\": string,\n  \"background\": string,\n  \
\"value\": string,\n  \"user_segments\": [string,...],\n  \"vision\": string,\n  \
\"domain\": one of [\"blog\",\"ecommerce\",\"chat\",\"analytics\",\"generic\"]\n}\n\
Be concise but informative. Always pick the closest domain.";

const FEATURES_PROMPT: &str = "You are a product requirement expert. Given the context, \
propose 3-5 core features. Return JSON with a `features` array. Each feature must contain:\n{\n  \
\"name\": string,\n  \"description\": string,\n  \"inputs\": [string,...],\n  \
\"outputs\": [string,...],\n  \"preconditions\": [string,...],\n  \
\"postconditions\": [string,...],\n  \"edge_cases\": [string,...],\n  \
\"dependencies\": [string,...]\n}\nFocus on practical workflows that align with the stated domain.";

const ARCHITECTURE_PROMPT: &str = "You are a software architect. Given the product context and \
preferred programming language, recommend popular mainstream frameworks (no hallucinations) \
widely adopted for building business software in that ecosystem. Return JSON with:\n{\n  \
\"business_architecture\": string,\n  \"technical_architecture\": string,\n  \
\"data_flow\": string,\n  \"scalability\": string,\n  \"frameworks\": {\n       \
\"language\": string,\n       \"rationale\": string,\n       \"backend\": [string,...],\n       \
\"frontend\": [string,...],\n       \"orchestration\": [string,...]\n  }\n}\n\
Explain why each framework grouping fits the problem.";

const DATAMODEL_PROMPT: &str = "You are a data architect. Provide a concise relational design \
for the product. Return JSON:\n{\n  \"core_entities\": [string,...],\n  \"tables\": [\n       \
{\n           \"name\": string,\n           \"description\": string,\n           \
\"primary_key\": string,\n           \"fields\": [\n                 {\"name\": string, \
\"type\": string, \"description\": string, \"constraints\": string}\n           ]\n       }\n  \
],\n  \"dto_contracts\": [\n       {\"provider\": string, \"consumer\": string, \
\"payload\": object, \"notes\": string}\n  ]\n}\nFocus on the domain described.";

const API_PROMPT: &str = "You are an API designer. Produce representative endpoints following \
RESTful style. Return JSON with `apis` array where each entry has:\n{\n  \"name\": string,\n  \
\"url\": string,\n  \"method\": string,\n  \"request\": [ { \"name\": string, \"type\": string, \
\"required\": bool, \"description\": string } ],\n  \"response\": [ { ... } ],\n  \
\"errors\": { \"code\": \"description\" },\n  \"example\": { \"request\": object, \
\"response\": object }\n}\nEnsure fields align with the data model.";

const NFR_PROMPT: &str = "You are responsible for non-functional requirements of a PRD. \
Return JSON with:\n{\n  \"nfr\": {\n       \"performance\": string,\n       \
\"security\": string,\n       \"scalability\": string,\n       \"observability\": string,\n       \
\"internationalization\": string,\n       \"external_services\": string\n  },\n  \
\"risks\": [string,...],\n  \"glossary\": [string,...]\n}\n\
Tailor the response to the product domain.";

/// The question asked when no target language is known.
pub const LANGUAGE_QUESTION: &str =
    "Which language should the product be built in? (default: python)";

/// Normalizes a raw language answer through fixed aliases.
///
/// Empty input defaults to python; unknown languages pass through lowercased.
#[must_use]
pub fn normalize_language(raw: &str) -> String {
    let candidate = raw.trim().to_lowercase();
    match candidate.as_str() {
        "" => "python".to_string(),
        "python" | "py" => "python".to_string(),
        "javascript" | "js" | "typescript" | "ts" | "node" => "javascript".to_string(),
        "java" => "java".to_string(),
        "go" | "golang" => "go".to_string(),
        _ => candidate,
    }
}

async fn ask<T>(
    provider: &Arc<dyn GenerationProvider>,
    ctx: &StageContext,
    system: &str,
    user: String,
) -> Result<T, StageError>
where
    T: serde::de::DeserializeOwned + Default,
{
    let reply = provider.invoke(system, &user).await?;
    let (payload, origin) = extract_payload::<T>(&reply.into_text());
    ctx.note_extraction(origin);
    Ok(payload)
}

/// Interprets the raw requirement into project identity and domain.
#[derive(Debug)]
pub struct IntentStage {
    provider: Arc<dyn GenerationProvider>,
}

impl IntentStage {
    /// Creates the stage.
    #[must_use]
    pub fn new(provider: Arc<dyn GenerationProvider>) -> Self {
        Self { provider }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct IntentPayload {
    project_name: String,
    project_goal: String,
    background: String,
    value: String,
    user_segments: Vec<String>,
    vision: String,
    domain: String,
}

#[async_trait]
impl Stage<PrdState> for IntentStage {
    fn name(&self) -> &str {
        "intent"
    }

    async fn execute(
        &self,
        state: &PrdState,
        ctx: &StageContext,
    ) -> Result<StageOutcome<PrdState>, StageError> {
        let user = format!(
            "Requirement:\n{}\nRespond ONLY with JSON following the schema.",
            state.user_input
        );
        let payload: IntentPayload = ask(&self.provider, ctx, INTENT_PROMPT, user).await?;

        Ok(StageOutcome::Update(PrdUpdate {
            project_name: Some(payload.project_name),
            project_goal: Some(payload.project_goal),
            background: Some(payload.background),
            value: Some(payload.value),
            user_segments: Some(payload.user_segments),
            vision: Some(payload.vision),
            domain: Some(Domain::classify(&payload.domain)),
            ..PrdUpdate::default()
        }))
    }
}

/// Proposes the core feature backlog.
#[derive(Debug)]
pub struct FeaturesStage {
    provider: Arc<dyn GenerationProvider>,
}

impl FeaturesStage {
    /// Creates the stage.
    #[must_use]
    pub fn new(provider: Arc<dyn GenerationProvider>) -> Self {
        Self { provider }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct FeaturesPayload {
    features: Vec<FeatureSpec>,
}

#[async_trait]
impl Stage<PrdState> for FeaturesStage {
    fn name(&self) -> &str {
        "features"
    }

    async fn execute(
        &self,
        state: &PrdState,
        ctx: &StageContext,
    ) -> Result<StageOutcome<PrdState>, StageError> {
        let user = format!(
            "Project: {}\nDomain: {}\nGoal: {}\n\nRespond ONLY with JSON.",
            state.project_name, state.domain, state.project_goal
        );
        let payload: FeaturesPayload = ask(&self.provider, ctx, FEATURES_PROMPT, user).await?;

        Ok(StageOutcome::Update(PrdUpdate {
            features: Some(payload.features),
            ..PrdUpdate::default()
        }))
    }
}

/// Plans the architecture; suspends for a language when none is known.
#[derive(Debug)]
pub struct ArchitectureStage {
    provider: Arc<dyn GenerationProvider>,
}

impl ArchitectureStage {
    /// Creates the stage.
    #[must_use]
    pub fn new(provider: Arc<dyn GenerationProvider>) -> Self {
        Self { provider }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ArchitecturePayload {
    business_architecture: String,
    technical_architecture: String,
    data_flow: String,
    scalability: String,
    frameworks: Option<FrameworkInsight>,
}

#[async_trait]
impl Stage<PrdState> for ArchitectureStage {
    fn name(&self) -> &str {
        "architecture"
    }

    fn suspends(&self) -> bool {
        true
    }

    async fn execute(
        &self,
        state: &PrdState,
        ctx: &StageContext,
    ) -> Result<StageOutcome<PrdState>, StageError> {
        let raw_language = match state.tech_stack.clone().or_else(|| ctx.resume_text()) {
            Some(raw) => raw,
            None => {
                return Ok(StageOutcome::Interrupt(InterruptPayload::new(
                    LANGUAGE_QUESTION,
                )));
            }
        };
        let language = normalize_language(&raw_language);

        let user = format!(
            "Project: {}\nDomain: {}\nGoal: {}\nPreferred Language: {}\nRespond ONLY with JSON.",
            state.project_name, state.domain, state.project_goal, language
        );
        let payload: ArchitecturePayload =
            ask(&self.provider, ctx, ARCHITECTURE_PROMPT, user).await?;

        Ok(StageOutcome::Update(PrdUpdate {
            tech_stack: Some(language),
            frameworks: payload.frameworks,
            business_architecture: Some(payload.business_architecture),
            technical_architecture: Some(payload.technical_architecture),
            data_flow: Some(payload.data_flow),
            scalability: Some(payload.scalability),
            ..PrdUpdate::default()
        }))
    }
}

/// Designs entities, tables, and DTO contracts.
#[derive(Debug)]
pub struct DataModelStage {
    provider: Arc<dyn GenerationProvider>,
}

impl DataModelStage {
    /// Creates the stage.
    #[must_use]
    pub fn new(provider: Arc<dyn GenerationProvider>) -> Self {
        Self { provider }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct DataModelPayload {
    core_entities: Vec<String>,
    tables: Vec<TableSchema>,
    dto_contracts: Vec<DtoContract>,
}

#[async_trait]
impl Stage<PrdState> for DataModelStage {
    fn name(&self) -> &str {
        "datamodel"
    }

    async fn execute(
        &self,
        state: &PrdState,
        ctx: &StageContext,
    ) -> Result<StageOutcome<PrdState>, StageError> {
        let feature_names: Vec<&str> =
            state.features.iter().map(|f| f.name.as_str()).collect();
        let user = format!(
            "Project: {}\nDomain: {}\nKey Features: {feature_names:?}\n\nRespond ONLY with JSON.",
            state.project_name, state.domain
        );
        let payload: DataModelPayload = ask(&self.provider, ctx, DATAMODEL_PROMPT, user).await?;

        Ok(StageOutcome::Update(PrdUpdate {
            core_entities: Some(payload.core_entities),
            tables: Some(payload.tables),
            dto_contracts: Some(payload.dto_contracts),
            ..PrdUpdate::default()
        }))
    }
}

/// Drafts representative API contracts.
#[derive(Debug)]
pub struct ApiStage {
    provider: Arc<dyn GenerationProvider>,
}

impl ApiStage {
    /// Creates the stage.
    #[must_use]
    pub fn new(provider: Arc<dyn GenerationProvider>) -> Self {
        Self { provider }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ApiPayload {
    apis: Vec<ApiSpec>,
}

#[async_trait]
impl Stage<PrdState> for ApiStage {
    fn name(&self) -> &str {
        "api"
    }

    async fn execute(
        &self,
        state: &PrdState,
        ctx: &StageContext,
    ) -> Result<StageOutcome<PrdState>, StageError> {
        let feature_names: Vec<&str> =
            state.features.iter().map(|f| f.name.as_str()).collect();
        let user = format!(
            "Project: {}\nDomain: {}\nFeatures: {feature_names:?}\nEntities: {:?}\n\nRespond ONLY with JSON.",
            state.project_name, state.domain, state.core_entities
        );
        let payload: ApiPayload = ask(&self.provider, ctx, API_PROMPT, user).await?;

        Ok(StageOutcome::Update(PrdUpdate {
            apis: Some(payload.apis),
            ..PrdUpdate::default()
        }))
    }
}

/// Captures NFRs, risks, and the glossary.
#[derive(Debug)]
pub struct NfrStage {
    provider: Arc<dyn GenerationProvider>,
}

impl NfrStage {
    /// Creates the stage.
    #[must_use]
    pub fn new(provider: Arc<dyn GenerationProvider>) -> Self {
        Self { provider }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct NfrPayload {
    nfr: NfrProfile,
    risks: Vec<String>,
    glossary: Vec<String>,
}

#[async_trait]
impl Stage<PrdState> for NfrStage {
    fn name(&self) -> &str {
        "nfr"
    }

    async fn execute(
        &self,
        state: &PrdState,
        ctx: &StageContext,
    ) -> Result<StageOutcome<PrdState>, StageError> {
        let frameworks = state
            .frameworks
            .as_ref()
            .map_or_else(String::new, |f| format!("{f:?}"));
        let user = format!(
            "Project: {}\nDomain: {}\nArchitecture frameworks: {frameworks}\n\nRespond ONLY with JSON.",
            state.project_name, state.domain
        );
        let payload: NfrPayload = ask(&self.provider, ctx, NFR_PROMPT, user).await?;

        Ok(StageOutcome::Update(PrdUpdate {
            nfr: Some(payload.nfr),
            risks: Some(payload.risks),
            glossary: Some(payload.glossary),
            ..PrdUpdate::default()
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::NoOpEventSink;
    use crate::pipeline::RunToken;
    use crate::testing::StaticProvider;
    use pretty_assertions::assert_eq;

    fn ctx(resume: Option<serde_json::Value>) -> StageContext {
        StageContext::new(RunToken::new(), "test", resume, Arc::new(NoOpEventSink))
    }

    #[test]
    fn language_aliases_normalize() {
        assert_eq!(normalize_language("TS"), "javascript");
        assert_eq!(normalize_language("golang"), "go");
        assert_eq!(normalize_language(" py "), "python");
        assert_eq!(normalize_language(""), "python");
        assert_eq!(normalize_language("Rust"), "rust");
    }

    #[tokio::test]
    async fn intent_extracts_identity_and_domain() {
        let provider: Arc<dyn GenerationProvider> = Arc::new(StaticProvider::new(
            r#"```json
{"project_name": "Inkwell", "project_goal": "publish posts", "domain": "blog",
 "background": "b", "value": "v", "user_segments": ["writers"], "vision": "vi"}
```"#,
        ));
        let stage = IntentStage::new(provider);
        let state = PrdState::from_requirement("Build a blog platform", None);

        let outcome = stage.execute(&state, &ctx(None)).await.unwrap();
        let StageOutcome::Update(update) = outcome else {
            panic!("expected update");
        };

        assert_eq!(update.project_name.as_deref(), Some("Inkwell"));
        assert_eq!(update.domain, Some(Domain::Blog));
    }

    #[tokio::test]
    async fn intent_degrades_to_defaults_on_garbage() {
        let provider: Arc<dyn GenerationProvider> =
            Arc::new(StaticProvider::new("I cannot answer that."));
        let stage = IntentStage::new(provider);
        let state = PrdState::from_requirement("anything", None);

        let outcome = stage.execute(&state, &ctx(None)).await.unwrap();
        let StageOutcome::Update(update) = outcome else {
            panic!("expected update");
        };

        assert_eq!(update.project_name.as_deref(), Some(""));
        assert_eq!(update.domain, Some(Domain::Generic));
    }

    #[tokio::test]
    async fn architecture_suspends_without_a_language() {
        let provider: Arc<dyn GenerationProvider> = Arc::new(StaticProvider::new("{}"));
        let stage = ArchitectureStage::new(provider);
        let state = PrdState::from_requirement("req", None);

        let outcome = stage.execute(&state, &ctx(None)).await.unwrap();
        match outcome {
            StageOutcome::Interrupt(payload) => {
                assert!(payload.message.contains("language"));
            }
            StageOutcome::Update(_) => panic!("expected interrupt"),
        }
    }

    #[tokio::test]
    async fn architecture_uses_the_resume_answer() {
        let provider: Arc<dyn GenerationProvider> = Arc::new(StaticProvider::new(
            r#"{"business_architecture": "layered", "technical_architecture": "t",
                "data_flow": "d", "scalability": "s",
                "frameworks": {"language": "go", "rationale": "r",
                               "backend": ["gin"], "frontend": [], "orchestration": []}}"#,
        ));
        let stage = ArchitectureStage::new(provider);
        let state = PrdState::from_requirement("req", None);

        let outcome = stage
            .execute(&state, &ctx(Some(serde_json::json!("golang"))))
            .await
            .unwrap();
        let StageOutcome::Update(update) = outcome else {
            panic!("expected update");
        };

        assert_eq!(update.tech_stack.as_deref(), Some("go"));
        assert_eq!(update.business_architecture.as_deref(), Some("layered"));
        assert!(update.frameworks.is_some());
    }

    #[tokio::test]
    async fn architecture_skips_the_question_with_a_hint() {
        let provider: Arc<dyn GenerationProvider> = Arc::new(StaticProvider::new("{}"));
        let stage = ArchitectureStage::new(provider);
        let state = PrdState::from_requirement("req", Some("ts".to_string()));

        let outcome = stage.execute(&state, &ctx(None)).await.unwrap();
        let StageOutcome::Update(update) = outcome else {
            panic!("expected update");
        };
        assert_eq!(update.tech_stack.as_deref(), Some("javascript"));
    }

    #[tokio::test]
    async fn features_parse_into_typed_specs() {
        let provider: Arc<dyn GenerationProvider> = Arc::new(StaticProvider::new(
            r#"{"features": [{"name": "Editor", "description": "write posts",
                "inputs": ["draft"], "outputs": ["post"], "preconditions": [],
                "postconditions": [], "edge_cases": ["empty draft"], "dependencies": []}]}"#,
        ));
        let stage = FeaturesStage::new(provider);
        let state = PrdState::default();

        let outcome = stage.execute(&state, &ctx(None)).await.unwrap();
        let StageOutcome::Update(update) = outcome else {
            panic!("expected update");
        };
        let features = update.features.unwrap();

        assert_eq!(features.len(), 1);
        assert_eq!(features[0].name, "Editor");
        assert_eq!(features[0].edge_cases, vec!["empty draft".to_string()]);
    }
}
