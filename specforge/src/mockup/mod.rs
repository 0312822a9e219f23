//! The mockup pipeline: PRD text in, visual mockup out.
//!
//! Five deterministic inference stages derive pages, information hierarchy,
//! components, layout, and interactions from the PRD; the style stage
//! suspends for the operator's preference; the render stage composes the
//! markup and rasterizes it. The assembler then writes the markup, the PNG,
//! and a sidecar naming style and prompt.

mod assembler;
mod presets;
mod rasterizer;
mod render;
mod stages;
mod state;

pub use assembler::{MockupArtifact, MockupAssembler, MockupPaths};
pub use presets::{Palette, StylePreset};
pub use rasterizer::{ChromiumRasterizer, Rasterizer};
pub use render::render_mockup;
pub use stages::{
    AskStyleStage, ComponentsStage, InfoStage, InteractionsStage, LayoutStage, PagesStage,
    RenderStage, STYLE_QUESTION,
};
pub use state::{
    ComponentBlueprint, InformationBlock, InteractionModel, LayoutInstruction, MockupState,
    MockupUpdate, PageSummary,
};

use crate::errors::PipelineValidationError;
use crate::pipeline::{Pipeline, PipelineBuilder};
use crate::stages::StageSpec;
use std::sync::Arc;

/// Builds the mockup pipeline over the given rasterizer.
///
/// # Errors
///
/// Returns an error if the stage wiring fails validation (which would be a
/// programming error in this crate).
pub fn build_pipeline(
    rasterizer: Arc<dyn Rasterizer>,
) -> Result<Pipeline<MockupState>, PipelineValidationError> {
    PipelineBuilder::new("mockup")
        .inputs(["prd_text"])
        .stage(
            StageSpec::new(Arc::new(PagesStage))
                .reads(["prd_text"])
                .writes(["pages"]),
        )
        .stage(
            StageSpec::new(Arc::new(InfoStage))
                .with_dependency("pages")
                .reads(["pages"])
                .writes(["information_blocks"]),
        )
        .stage(
            StageSpec::new(Arc::new(ComponentsStage))
                .with_dependency("info")
                .reads(["information_blocks"])
                .writes(["component_tree"]),
        )
        .stage(
            StageSpec::new(Arc::new(LayoutStage))
                .with_dependency("components")
                .reads(["component_tree"])
                .writes(["layout_plan"]),
        )
        .stage(
            StageSpec::new(Arc::new(InteractionsStage))
                .with_dependency("layout")
                .reads(["component_tree"])
                .writes(["interaction_map"]),
        )
        .stage(
            StageSpec::new(Arc::new(AskStyleStage))
                .with_dependency("interactions")
                .writes(["preferred_style", "style_question"]),
        )
        .stage(
            StageSpec::new(Arc::new(RenderStage::new(rasterizer)))
                .with_dependency("ask_style")
                .reads([
                    "preferred_style",
                    "component_tree",
                    "layout_plan",
                    "interaction_map",
                ])
                .writes(["ui_prompt", "mockup_html", "image_bytes"]),
        )
        .build()
}
