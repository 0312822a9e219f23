//! Typed state for the PRD pipeline.

use crate::state::{keep_or, PipelineState};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Product domain classification, drawn from a closed set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Domain {
    /// Blogging / publishing products.
    Blog,
    /// Commerce and storefront products.
    Ecommerce,
    /// Messaging and conversation products.
    Chat,
    /// Dashboards and reporting products.
    Analytics,
    /// Everything else.
    #[default]
    Generic,
}

impl Domain {
    /// Maps free text onto the closed domain set; unrecognized input becomes
    /// [`Domain::Generic`].
    #[must_use]
    pub fn classify(raw: &str) -> Self {
        match raw.trim().to_lowercase().as_str() {
            "blog" => Self::Blog,
            "ecommerce" => Self::Ecommerce,
            "chat" => Self::Chat,
            "analytics" => Self::Analytics,
            _ => Self::Generic,
        }
    }
}

impl fmt::Display for Domain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Blog => write!(f, "blog"),
            Self::Ecommerce => write!(f, "ecommerce"),
            Self::Chat => write!(f, "chat"),
            Self::Analytics => write!(f, "analytics"),
            Self::Generic => write!(f, "generic"),
        }
    }
}

/// One planned product feature.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
#[allow(missing_docs)]
pub struct FeatureSpec {
    pub name: String,
    pub description: String,
    pub inputs: Vec<String>,
    pub outputs: Vec<String>,
    pub preconditions: Vec<String>,
    pub postconditions: Vec<String>,
    pub edge_cases: Vec<String>,
    pub dependencies: Vec<String>,
}

/// One column of a relational table.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
#[allow(missing_docs)]
pub struct TableField {
    pub name: String,
    #[serde(rename = "type")]
    pub field_type: String,
    pub description: String,
    pub constraints: String,
}

/// One relational table.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
#[allow(missing_docs)]
pub struct TableSchema {
    pub name: String,
    pub description: String,
    pub primary_key: String,
    pub fields: Vec<TableField>,
}

/// A service-to-service data contract.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
#[allow(missing_docs)]
pub struct DtoContract {
    pub provider: String,
    pub consumer: String,
    pub payload: serde_json::Value,
    pub notes: String,
}

/// One request or response field of an API endpoint.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
#[allow(missing_docs)]
pub struct ApiField {
    pub name: String,
    #[serde(rename = "type")]
    pub field_type: String,
    pub required: bool,
    pub description: String,
}

/// One API endpoint contract.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
#[allow(missing_docs)]
pub struct ApiSpec {
    pub name: String,
    pub url: String,
    pub method: String,
    pub request: Vec<ApiField>,
    pub response: Vec<ApiField>,
    pub errors: std::collections::BTreeMap<String, String>,
    pub example: serde_json::Value,
}

/// Framework recommendations for the chosen language.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
#[allow(missing_docs)]
pub struct FrameworkInsight {
    pub language: String,
    pub rationale: String,
    pub backend: Vec<String>,
    pub frontend: Vec<String>,
    pub orchestration: Vec<String>,
}

/// The six fixed non-functional requirement dimensions.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
#[allow(missing_docs)]
pub struct NfrProfile {
    pub performance: String,
    pub security: String,
    pub scalability: String,
    pub observability: String,
    pub internationalization: String,
    pub external_services: String,
}

/// The accumulating state of one PRD run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
#[allow(missing_docs)]
pub struct PrdState {
    /// The raw requirement the caller supplied.
    pub user_input: String,
    /// Domain classification from the intent stage.
    pub domain: Domain,
    pub project_name: String,
    pub project_goal: String,
    /// Target implementation language; absent until the architecture stage
    /// resolves it (possibly by suspending for operator input).
    pub tech_stack: Option<String>,
    pub frameworks: Option<FrameworkInsight>,
    pub background: String,
    pub value: String,
    pub user_segments: Vec<String>,
    pub vision: String,
    pub features: Vec<FeatureSpec>,
    pub business_architecture: String,
    pub technical_architecture: String,
    pub data_flow: String,
    pub scalability: String,
    pub core_entities: Vec<String>,
    pub tables: Vec<TableSchema>,
    pub dto_contracts: Vec<DtoContract>,
    pub apis: Vec<ApiSpec>,
    pub nfr: NfrProfile,
    pub risks: Vec<String>,
    pub glossary: Vec<String>,
}

/// A partial update to [`PrdState`]; absent fields are retained.
#[derive(Debug, Default)]
#[allow(missing_docs)]
pub struct PrdUpdate {
    pub domain: Option<Domain>,
    pub project_name: Option<String>,
    pub project_goal: Option<String>,
    pub tech_stack: Option<String>,
    pub frameworks: Option<FrameworkInsight>,
    pub background: Option<String>,
    pub value: Option<String>,
    pub user_segments: Option<Vec<String>>,
    pub vision: Option<String>,
    pub features: Option<Vec<FeatureSpec>>,
    pub business_architecture: Option<String>,
    pub technical_architecture: Option<String>,
    pub data_flow: Option<String>,
    pub scalability: Option<String>,
    pub core_entities: Option<Vec<String>>,
    pub tables: Option<Vec<TableSchema>>,
    pub dto_contracts: Option<Vec<DtoContract>>,
    pub apis: Option<Vec<ApiSpec>>,
    pub nfr: Option<NfrProfile>,
    pub risks: Option<Vec<String>>,
    pub glossary: Option<Vec<String>>,
}

impl PipelineState for PrdState {
    type Update = PrdUpdate;

    fn merge(&self, update: Self::Update) -> Self {
        Self {
            user_input: self.user_input.clone(),
            domain: update.domain.unwrap_or(self.domain),
            project_name: keep_or(&self.project_name, update.project_name),
            project_goal: keep_or(&self.project_goal, update.project_goal),
            tech_stack: update.tech_stack.or_else(|| self.tech_stack.clone()),
            frameworks: update.frameworks.or_else(|| self.frameworks.clone()),
            background: keep_or(&self.background, update.background),
            value: keep_or(&self.value, update.value),
            user_segments: keep_or(&self.user_segments, update.user_segments),
            vision: keep_or(&self.vision, update.vision),
            features: keep_or(&self.features, update.features),
            business_architecture: keep_or(&self.business_architecture, update.business_architecture),
            technical_architecture: keep_or(&self.technical_architecture, update.technical_architecture),
            data_flow: keep_or(&self.data_flow, update.data_flow),
            scalability: keep_or(&self.scalability, update.scalability),
            core_entities: keep_or(&self.core_entities, update.core_entities),
            tables: keep_or(&self.tables, update.tables),
            dto_contracts: keep_or(&self.dto_contracts, update.dto_contracts),
            apis: keep_or(&self.apis, update.apis),
            nfr: keep_or(&self.nfr, update.nfr),
            risks: keep_or(&self.risks, update.risks),
            glossary: keep_or(&self.glossary, update.glossary),
        }
    }
}

impl PrdState {
    /// Seeds a run from a raw requirement and an optional language hint.
    #[must_use]
    pub fn from_requirement(user_input: impl Into<String>, language: Option<String>) -> Self {
        Self {
            user_input: user_input.into(),
            tech_stack: language.filter(|l| !l.trim().is_empty()),
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn domain_classification_falls_back_to_generic() {
        assert_eq!(Domain::classify("blog"), Domain::Blog);
        assert_eq!(Domain::classify("  Ecommerce "), Domain::Ecommerce);
        assert_eq!(Domain::classify("spaceships"), Domain::Generic);
        assert_eq!(Domain::classify(""), Domain::Generic);
    }

    #[test]
    fn merge_overwrites_only_present_fields() {
        let base = PrdState {
            user_input: "req".to_string(),
            project_name: "Old Name".to_string(),
            risks: vec!["r1".to_string()],
            ..PrdState::default()
        };
        let merged = base.merge(PrdUpdate {
            project_name: Some("New Name".to_string()),
            ..PrdUpdate::default()
        });

        assert_eq!(merged.project_name, "New Name");
        assert_eq!(merged.user_input, "req");
        assert_eq!(merged.risks, vec!["r1".to_string()]);
    }

    #[test]
    fn tech_stack_set_once_is_retained() {
        let base = PrdState {
            tech_stack: Some("python".to_string()),
            ..PrdState::default()
        };
        let merged = base.merge(PrdUpdate::default());
        assert_eq!(merged.tech_stack.as_deref(), Some("python"));
    }

    #[test]
    fn state_round_trips_through_json() {
        let state = PrdState {
            user_input: "Build a blog platform".to_string(),
            domain: Domain::Blog,
            features: vec![FeatureSpec {
                name: "Posts".to_string(),
                ..FeatureSpec::default()
            }],
            ..PrdState::default()
        };
        let json = serde_json::to_value(&state).unwrap();
        let back: PrdState = serde_json::from_value(json).unwrap();

        assert_eq!(back.domain, Domain::Blog);
        assert_eq!(back.features.len(), 1);
    }

    #[test]
    fn payload_field_renames_match_the_wire_shape() {
        let field: TableField =
            serde_json::from_value(serde_json::json!({"name": "id", "type": "uuid"})).unwrap();
        assert_eq!(field.field_type, "uuid");
    }
}
