//! Typed state for the mockup pipeline.

use super::presets::StylePreset;
use crate::state::{base64_bytes, keep_or, PipelineState};
use serde::{Deserialize, Serialize};

/// High-level description of one screen detected in the PRD.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
#[allow(missing_docs)]
pub struct PageSummary {
    pub name: String,
    pub summary: String,
    pub intent: String,
    pub priority: u32,
}

/// Information hierarchy inferred for a page.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
#[allow(missing_docs)]
pub struct InformationBlock {
    pub page: String,
    pub sections: Vec<String>,
    pub data_points: Vec<String>,
    pub user_tasks: Vec<String>,
}

/// Component tree describing widgets and their grouping.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
#[allow(missing_docs)]
pub struct ComponentBlueprint {
    pub page: String,
    pub group: String,
    pub components: Vec<String>,
    pub rationale: String,
}

/// Layout-level details for arranging components on a canvas.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
#[allow(missing_docs)]
pub struct LayoutInstruction {
    pub page: String,
    pub grid: String,
    pub hero: String,
    pub flow: String,
    pub responsive: String,
    pub emphasis: Vec<String>,
}

/// Interaction logic tying a trigger to the expected response.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
#[allow(missing_docs)]
pub struct InteractionModel {
    pub trigger: String,
    pub response: String,
    pub feedback: String,
    pub priority: String,
}

/// The accumulating state of one mockup run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
#[allow(missing_docs)]
pub struct MockupState {
    /// The PRD text the caller supplied.
    pub prd_text: String,
    pub pages: Vec<PageSummary>,
    pub information_blocks: Vec<InformationBlock>,
    pub component_tree: Vec<ComponentBlueprint>,
    pub layout_plan: Vec<LayoutInstruction>,
    pub interaction_map: Vec<InteractionModel>,
    /// Operator-selected style; absent until the ask stage resumes.
    pub preferred_style: Option<StylePreset>,
    pub style_question: String,
    pub ui_prompt: String,
    pub mockup_html: String,
    /// Rasterized mockup; base64 inside checkpoints.
    #[serde(with = "base64_bytes")]
    pub image_bytes: Vec<u8>,
}

/// A partial update to [`MockupState`]; absent fields are retained.
#[derive(Debug, Default)]
#[allow(missing_docs)]
pub struct MockupUpdate {
    pub pages: Option<Vec<PageSummary>>,
    pub information_blocks: Option<Vec<InformationBlock>>,
    pub component_tree: Option<Vec<ComponentBlueprint>>,
    pub layout_plan: Option<Vec<LayoutInstruction>>,
    pub interaction_map: Option<Vec<InteractionModel>>,
    pub preferred_style: Option<StylePreset>,
    pub style_question: Option<String>,
    pub ui_prompt: Option<String>,
    pub mockup_html: Option<String>,
    pub image_bytes: Option<Vec<u8>>,
}

impl PipelineState for MockupState {
    type Update = MockupUpdate;

    fn merge(&self, update: Self::Update) -> Self {
        Self {
            prd_text: self.prd_text.clone(),
            pages: keep_or(&self.pages, update.pages),
            information_blocks: keep_or(&self.information_blocks, update.information_blocks),
            component_tree: keep_or(&self.component_tree, update.component_tree),
            layout_plan: keep_or(&self.layout_plan, update.layout_plan),
            interaction_map: keep_or(&self.interaction_map, update.interaction_map),
            preferred_style: update.preferred_style.or(self.preferred_style),
            style_question: keep_or(&self.style_question, update.style_question),
            ui_prompt: keep_or(&self.ui_prompt, update.ui_prompt),
            mockup_html: keep_or(&self.mockup_html, update.mockup_html),
            image_bytes: keep_or(&self.image_bytes, update.image_bytes),
        }
    }
}

impl MockupState {
    /// Seeds a run from PRD text.
    #[must_use]
    pub fn from_prd_text(prd_text: impl Into<String>) -> Self {
        Self {
            prd_text: prd_text.into(),
            ..Self::default()
        }
    }
}
