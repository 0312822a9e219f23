//! The enrichment stages of the mockup pipeline.
//!
//! The inference stages here are deterministic heuristics over the PRD text;
//! only the style question involves the operator, and only the render stage
//! leaves the process (through the rasterizer collaborator).

use super::presets::StylePreset;
use super::rasterizer::Rasterizer;
use super::render::render_mockup;
use super::state::{
    ComponentBlueprint, InformationBlock, InteractionModel, LayoutInstruction, MockupState,
    MockupUpdate, PageSummary,
};
use crate::errors::StageError;
use crate::stages::{InterruptPayload, Stage, StageContext, StageOutcome};
use async_trait::async_trait;
use regex::Regex;
use std::sync::{Arc, OnceLock};

/// The question posed at the style suspension point.
pub const STYLE_QUESTION: &str = "Which UI style do you prefer?";

const SUMMARY_WINDOW: usize = 200;
const FALLBACK_PAGES: [&str; 3] = ["Homepage", "Details", "Settings"];

#[allow(clippy::unwrap_used)]
fn heading_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?m)^#+\s+(.+)$").unwrap())
}

#[allow(clippy::unwrap_used)]
fn whitespace_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\s+").unwrap())
}

/// Detects candidate screens from the PRD's markdown headings.
#[derive(Debug, Default)]
pub struct PagesStage;

impl PagesStage {
    fn summarize(heading: &str, prd_text: &str) -> String {
        let start = prd_text.find(heading).unwrap_or(0);
        let snippet: String = prd_text[start..].chars().take(SUMMARY_WINDOW).collect();
        let collapsed = whitespace_pattern().replace_all(&snippet, " ");
        let trimmed = collapsed.trim();
        if trimmed.is_empty() {
            "Core journey overview".to_string()
        } else {
            trimmed.to_string()
        }
    }
}

#[async_trait]
impl Stage<MockupState> for PagesStage {
    fn name(&self) -> &str {
        "pages"
    }

    async fn execute(
        &self,
        state: &MockupState,
        _ctx: &StageContext,
    ) -> Result<StageOutcome<MockupState>, StageError> {
        let prd_text = state.prd_text.trim();
        let mut headings: Vec<String> = heading_pattern()
            .captures_iter(prd_text)
            .map(|cap| cap[1].trim().to_string())
            .filter(|h| !h.is_empty())
            .collect();
        if headings.is_empty() {
            headings = FALLBACK_PAGES.iter().map(ToString::to_string).collect();
        }

        let pages = headings
            .into_iter()
            .enumerate()
            .map(|(idx, name)| {
                let summary = Self::summarize(&name, prd_text);
                PageSummary {
                    name,
                    summary,
                    intent: "Guide the user through the core task".to_string(),
                    priority: u32::try_from(idx).unwrap_or(u32::MAX) + 1,
                }
            })
            .collect();

        Ok(StageOutcome::Update(MockupUpdate {
            pages: Some(pages),
            ..MockupUpdate::default()
        }))
    }
}

const COMMON_SECTIONS: [&str; 5] = ["Hero", "Highlights", "Featured Items", "Metrics", "Actions"];

/// Infers the information hierarchy for each detected page.
#[derive(Debug, Default)]
pub struct InfoStage;

impl InfoStage {
    fn derive_sections(page_name: &str, summary: &str) -> Vec<String> {
        let lowered = summary.to_lowercase();
        let mut sections = Vec::new();
        if lowered.contains("data") || lowered.contains("metric") {
            sections.push("Key Metrics".to_string());
        }
        if lowered.contains("flow") || lowered.contains("journey") {
            sections.push("User Journey".to_string());
        }
        if page_name.to_lowercase().contains("settings") || lowered.contains("settings") {
            sections.push("Preferences".to_string());
        }
        for section in COMMON_SECTIONS {
            sections.push(section.to_string());
        }
        sections.dedup();
        sections
    }

    fn derive_tasks(summary: &str) -> Vec<String> {
        let lowered = summary.to_lowercase();
        let mut tasks = Vec::new();
        if lowered.contains("signup") || lowered.contains("register") || lowered.contains("login") {
            tasks.push("Sign up or log in".to_string());
        }
        if lowered.contains("checkout") || lowered.contains("purchase") || lowered.contains("order")
        {
            tasks.push("Complete the checkout flow".to_string());
        }
        if tasks.is_empty() {
            tasks.push("Browse content and trigger the primary CTA".to_string());
        }
        tasks
    }
}

#[async_trait]
impl Stage<MockupState> for InfoStage {
    fn name(&self) -> &str {
        "info"
    }

    async fn execute(
        &self,
        state: &MockupState,
        _ctx: &StageContext,
    ) -> Result<StageOutcome<MockupState>, StageError> {
        let blocks = state
            .pages
            .iter()
            .map(|page| InformationBlock {
                page: page.name.clone(),
                sections: Self::derive_sections(&page.name, &page.summary),
                data_points: vec![
                    "Headline and subheadline".to_string(),
                    "Value proposition".to_string(),
                    "Primary CTA and its state".to_string(),
                ],
                user_tasks: Self::derive_tasks(&page.summary),
            })
            .collect();

        Ok(StageOutcome::Update(MockupUpdate {
            information_blocks: Some(blocks),
            ..MockupUpdate::default()
        }))
    }
}

/// Expands information sections into concrete UI components.
#[derive(Debug, Default)]
pub struct ComponentsStage;

impl ComponentsStage {
    fn components_for(section: &str) -> Vec<String> {
        let known: &[&str] = match section {
            "Hero" => &["Top Navigation", "Logo", "Hero Title", "Primary CTA"],
            "Highlights" => &["Stat Badge", "Illustration", "Secondary CTA"],
            "Featured Items" => &["Card Grid", "Filter Tabs", "Hover Actions"],
            "Metrics" | "Key Metrics" => &["KPI Row", "Trend Sparkline", "Tag List"],
            "Actions" => &["Floating CTA", "Context Menu", "Support Link"],
            "Preferences" => &["Toggle Row", "Dropdown", "Save Banner"],
            _ => return vec![format!("Custom {section}")],
        };
        known.iter().map(ToString::to_string).collect()
    }
}

#[async_trait]
impl Stage<MockupState> for ComponentsStage {
    fn name(&self) -> &str {
        "components"
    }

    async fn execute(
        &self,
        state: &MockupState,
        _ctx: &StageContext,
    ) -> Result<StageOutcome<MockupState>, StageError> {
        let blueprints = state
            .information_blocks
            .iter()
            .map(|block| {
                let components = block
                    .sections
                    .iter()
                    .flat_map(|section| Self::components_for(section))
                    .collect();
                ComponentBlueprint {
                    page: block.page.clone(),
                    group: "Root".to_string(),
                    components,
                    rationale: "Covers first-screen narrative, content display, and guided \
                                actions while keeping the hierarchy legible"
                        .to_string(),
                }
            })
            .collect();

        Ok(StageOutcome::Update(MockupUpdate {
            component_tree: Some(blueprints),
            ..MockupUpdate::default()
        }))
    }
}

/// Produces layout tokens for each page.
#[derive(Debug, Default)]
pub struct LayoutStage;

#[async_trait]
impl Stage<MockupState> for LayoutStage {
    fn name(&self) -> &str {
        "layout"
    }

    async fn execute(
        &self,
        state: &MockupState,
        _ctx: &StageContext,
    ) -> Result<StageOutcome<MockupState>, StageError> {
        let layout_plan = state
            .component_tree
            .iter()
            .map(|blueprint| {
                let hero = blueprint
                    .components
                    .first()
                    .cloned()
                    .unwrap_or_else(|| "Hero".to_string());
                let emphasis: Vec<String> =
                    blueprint.components.iter().take(3).cloned().collect();
                LayoutInstruction {
                    page: blueprint.page.clone(),
                    grid: "12-column fluid grid with 64px margin".to_string(),
                    hero,
                    flow: "Hero -> Highlight metrics -> Cards -> Action footer".to_string(),
                    responsive: "Collapse to stacked blocks on mobile, keep the CTA sticky"
                        .to_string(),
                    emphasis: if emphasis.is_empty() {
                        vec!["Hero".to_string()]
                    } else {
                        emphasis
                    },
                }
            })
            .collect();

        Ok(StageOutcome::Update(MockupUpdate {
            layout_plan: Some(layout_plan),
            ..MockupUpdate::default()
        }))
    }
}

/// Describes how users interact with the inferred component tree.
#[derive(Debug, Default)]
pub struct InteractionsStage;

#[async_trait]
impl Stage<MockupState> for InteractionsStage {
    fn name(&self) -> &str {
        "interactions"
    }

    async fn execute(
        &self,
        state: &MockupState,
        _ctx: &StageContext,
    ) -> Result<StageOutcome<MockupState>, StageError> {
        let mut interactions = Vec::new();
        for blueprint in &state.component_tree {
            let Some(first) = blueprint.components.first() else {
                continue;
            };
            interactions.push(InteractionModel {
                trigger: format!("Click the {first} CTA"),
                response: format!(
                    "Open a bottom drawer on {} guiding the user through the core form",
                    blueprint.page
                ),
                feedback: "Inline validation, loading animation, success toast".to_string(),
                priority: "P0".to_string(),
            });
            interactions.push(InteractionModel {
                trigger: "Scroll to the metrics block".to_string(),
                response: "Animate the counters and pin the navigation with the CTA".to_string(),
                feedback: "Background blur with a slight scale to hold attention".to_string(),
                priority: "P1".to_string(),
            });
        }

        Ok(StageOutcome::Update(MockupUpdate {
            interaction_map: Some(interactions),
            ..MockupUpdate::default()
        }))
    }
}

/// Human-in-the-loop stage asking for the preferred visual style.
#[derive(Debug, Default)]
pub struct AskStyleStage;

impl AskStyleStage {
    fn payload() -> InterruptPayload {
        let mut payload = InterruptPayload::new(STYLE_QUESTION);
        let letters = ["a", "b", "c", "d", "e"];
        for (letter, preset) in letters.iter().zip(StylePreset::ALL) {
            payload = payload.with_choice(*letter, preset.to_string());
        }
        payload
    }
}

#[async_trait]
impl Stage<MockupState> for AskStyleStage {
    fn name(&self) -> &str {
        "ask_style"
    }

    fn suspends(&self) -> bool {
        true
    }

    async fn execute(
        &self,
        _state: &MockupState,
        ctx: &StageContext,
    ) -> Result<StageOutcome<MockupState>, StageError> {
        let Some(answer) = ctx.resume_text() else {
            return Ok(StageOutcome::Interrupt(Self::payload()));
        };

        Ok(StageOutcome::Update(MockupUpdate {
            preferred_style: Some(StylePreset::normalize(&answer)),
            style_question: Some(Self::payload().render()),
            ..MockupUpdate::default()
        }))
    }
}

/// Builds the image prompt, renders the markup, and rasterizes it.
#[derive(Debug)]
pub struct RenderStage {
    rasterizer: Arc<dyn Rasterizer>,
    width: u32,
    height: u32,
}

impl RenderStage {
    /// Creates the stage with the default 1440x1024 canvas.
    #[must_use]
    pub fn new(rasterizer: Arc<dyn Rasterizer>) -> Self {
        Self {
            rasterizer,
            width: 1440,
            height: 1024,
        }
    }

    /// Overrides the canvas size.
    #[must_use]
    pub fn with_size(mut self, width: u32, height: u32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    fn build_prompt(state: &MockupState, style: StylePreset) -> String {
        let components = state
            .component_tree
            .iter()
            .map(|blueprint| {
                let list: Vec<&str> = blueprint
                    .components
                    .iter()
                    .take(6)
                    .map(String::as_str)
                    .collect();
                format!("{}: {}", blueprint.page, list.join(", "))
            })
            .collect::<Vec<_>>()
            .join("; ");
        let layouts = state
            .layout_plan
            .iter()
            .map(|layout| format!("{} uses {} with flow {}", layout.page, layout.grid, layout.flow))
            .collect::<Vec<_>>()
            .join("; ");
        let interactions = state
            .interaction_map
            .iter()
            .map(|item| format!("{} -> {}", item.trigger, item.response))
            .collect::<Vec<_>>()
            .join("; ");

        format!(
            "Design a {style} SaaS web UI. Components: {components}. Layout rules: {layouts}. \
             Interaction affordances: {interactions}. Use sharp typography, professional \
             spacing, export as high fidelity product shot."
        )
    }
}

#[async_trait]
impl Stage<MockupState> for RenderStage {
    fn name(&self) -> &str {
        "render"
    }

    async fn execute(
        &self,
        state: &MockupState,
        _ctx: &StageContext,
    ) -> Result<StageOutcome<MockupState>, StageError> {
        let style = state.preferred_style.unwrap_or_default();
        let prompt = Self::build_prompt(state, style);
        let html = render_mockup(state, style);
        let image_bytes = self
            .rasterizer
            .rasterize(&html, self.width, self.height)
            .await?;

        Ok(StageOutcome::Update(MockupUpdate {
            ui_prompt: Some(prompt),
            mockup_html: Some(html),
            image_bytes: Some(image_bytes),
            ..MockupUpdate::default()
        }))
    }
}
