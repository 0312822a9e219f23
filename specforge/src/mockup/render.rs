//! HTML mockup rendering.
//!
//! Turns the inferred pages, components, and interactions into a styled
//! single-page markup document. Rasterization of this document is the
//! [`super::Rasterizer`] collaborator's job.

use super::presets::StylePreset;
use super::state::MockupState;
use std::fmt::Write as _;

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

/// Renders the mockup document for the given state and style.
#[must_use]
pub fn render_mockup(state: &MockupState, style: StylePreset) -> String {
    let palette = style.palette();
    let mut html = String::new();

    let _ = write!(
        html,
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\" />\n\
         <meta name=\"viewport\" content=\"width=device-width, initial-scale=1\" />\n<style>\n\
         * {{ box-sizing: border-box; }}\n\
         body {{ margin: 0; font-family: 'Inter', 'Segoe UI', sans-serif;\n\
           background: {background}; color: {text}; padding: 32px; }}\n\
         .canvas {{ max-width: 1280px; margin: 0 auto; background: {surface};\n\
           border-radius: 32px; padding: 48px; box-shadow: {shadow}; border: 1px solid {border}; }}\n\
         .hero {{ background: linear-gradient(135deg, {accent} 0%, {accent_secondary} 100%);\n\
           padding: 48px; border-radius: 28px; color: white; }}\n\
         .hero h1 {{ margin: 0 0 12px; font-size: 40px; }}\n\
         .hero p {{ margin: 0; font-size: 18px; line-height: 1.6; }}\n\
         .style-tag {{ font-size: 14px; padding: 8px 16px; border: 1px solid rgba(255,255,255,0.5);\n\
           border-radius: 999px; display: inline-block; margin-bottom: 16px;\n\
           letter-spacing: 2px; text-transform: uppercase; }}\n\
         .grid {{ display: grid; grid-template-columns: repeat(2, minmax(0, 1fr));\n\
           gap: 24px; margin-top: 32px; }}\n\
         .page-card {{ background: {card}; border: 1px solid {border}; border-radius: 24px;\n\
           padding: 32px; box-shadow: {shadow}; }}\n\
         .page-card h2 {{ margin: 0 0 12px; font-size: 24px; }}\n\
         .page-card p {{ margin: 0 0 16px; color: {muted}; }}\n\
         .pill {{ display: inline-flex; padding: 6px 14px; margin: 4px 8px 4px 0;\n\
           border-radius: 999px; background: rgba(37,99,235,0.08); color: {accent};\n\
           font-size: 13px; font-weight: 600; }}\n\
         .interactions {{ margin-top: 40px; padding: 32px; background: {card};\n\
           border-radius: 24px; border: 1px solid {border}; }}\n\
         .interaction-item {{ padding: 16px 0; border-bottom: 1px solid {border}; }}\n\
         .interaction-item:last-child {{ border-bottom: 0; }}\n\
         .interaction-item strong {{ color: {accent}; display: block; font-size: 15px;\n\
           margin-bottom: 6px; }}\n\
         </style>\n</head>\n<body>\n<div class=\"canvas\">\n",
        background = palette.background,
        surface = palette.surface,
        card = palette.card,
        text = palette.text,
        muted = palette.muted_text,
        accent = palette.accent,
        accent_secondary = palette.accent_secondary,
        border = palette.border,
        shadow = palette.shadow,
    );

    // Hero: first page headlines the canvas.
    let headline = state
        .pages
        .first()
        .map_or("Product Mockup", |page| page.name.as_str());
    let subline = state
        .pages
        .first()
        .map_or("", |page| page.summary.as_str());
    let _ = write!(
        html,
        "<div class=\"hero\">\n<span class=\"style-tag\">{style}</span>\n\
         <h1>{}</h1>\n<p>{}</p>\n</div>\n",
        escape(headline),
        escape(subline),
    );

    // One card per page with its components as pills.
    html.push_str("<div class=\"grid\">\n");
    for blueprint in &state.component_tree {
        let _ = write!(html, "<div class=\"page-card\">\n<h2>{}</h2>\n", escape(&blueprint.page));
        if let Some(layout) = state
            .layout_plan
            .iter()
            .find(|layout| layout.page == blueprint.page)
        {
            let _ = write!(html, "<p>{}</p>\n", escape(&layout.flow));
        }
        for component in &blueprint.components {
            let _ = write!(html, "<span class=\"pill\">{}</span>\n", escape(component));
        }
        html.push_str("</div>\n");
    }
    html.push_str("</div>\n");

    // Interaction affordances.
    html.push_str("<div class=\"interactions\">\n");
    for interaction in &state.interaction_map {
        let _ = write!(
            html,
            "<div class=\"interaction-item\">\n<strong>{}</strong>\n<span>{} &middot; {}</span>\n</div>\n",
            escape(&interaction.trigger),
            escape(&interaction.response),
            escape(&interaction.feedback),
        );
    }
    html.push_str("</div>\n</div>\n</body>\n</html>\n");

    html
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mockup::state::{ComponentBlueprint, InteractionModel, LayoutInstruction, PageSummary};

    fn sample_state() -> MockupState {
        MockupState {
            pages: vec![PageSummary {
                name: "Homepage".to_string(),
                summary: "Landing experience".to_string(),
                ..PageSummary::default()
            }],
            component_tree: vec![ComponentBlueprint {
                page: "Homepage".to_string(),
                components: vec!["Hero Title".to_string(), "Primary CTA".to_string()],
                ..ComponentBlueprint::default()
            }],
            layout_plan: vec![LayoutInstruction {
                page: "Homepage".to_string(),
                flow: "Hero -> Cards".to_string(),
                ..LayoutInstruction::default()
            }],
            interaction_map: vec![InteractionModel {
                trigger: "Click <CTA>".to_string(),
                response: "Open drawer".to_string(),
                feedback: "Toast".to_string(),
                priority: "P0".to_string(),
            }],
            ..MockupState::default()
        }
    }

    #[test]
    fn renders_pages_components_and_interactions() {
        let html = render_mockup(&sample_state(), StylePreset::Minimal);

        assert!(html.contains("<h1>Homepage</h1>"));
        assert!(html.contains("Hero Title"));
        assert!(html.contains("Hero -&gt; Cards"));
        assert!(html.contains("Open drawer"));
    }

    #[test]
    fn style_palette_flows_into_the_css() {
        let html = render_mockup(&sample_state(), StylePreset::Dark);
        assert!(html.contains("#05060b"));
        assert!(html.contains(">dark<"));
    }

    #[test]
    fn markup_is_escaped() {
        let html = render_mockup(&sample_state(), StylePreset::Minimal);
        assert!(html.contains("Click &lt;CTA&gt;"));
        assert!(!html.contains("Click <CTA>"));
    }

    #[test]
    fn empty_state_still_renders_a_document() {
        let html = render_mockup(&MockupState::default(), StylePreset::Minimal);
        assert!(html.contains("<!DOCTYPE html>"));
        assert!(html.contains("Product Mockup"));
    }
}
