//! Renders the final PRD state into a markdown artifact.
//!
//! Every section renders even when its backing data is absent: a run whose
//! extraction degraded along the way produces a sparser document, never a
//! missing section. The PRD has no required-by-construction fields, so
//! assembly itself cannot fail; only writing can.

use super::state::{ApiField, PrdState};
use crate::errors::AssemblyError;
use std::fmt::Write as _;
use std::path::Path;

const FALLBACK_TITLE: &str = "Untitled Product";

/// The assembled PRD document.
#[derive(Debug, Clone)]
pub struct PrdArtifact {
    /// The rendered markdown.
    pub markdown: String,
}

impl PrdArtifact {
    /// Writes the document to an explicit destination path.
    ///
    /// # Errors
    ///
    /// Propagates filesystem errors.
    pub fn write_to(&self, path: &Path) -> Result<(), AssemblyError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, &self.markdown)?;
        Ok(())
    }
}

fn bullets(out: &mut String, items: &[String]) {
    for item in items {
        let _ = writeln!(out, "- {item}");
    }
}

fn field_table(out: &mut String, fields: &[ApiField]) {
    out.push_str("| Field | Type | Required | Description |\n");
    out.push_str("| --- | --- | --- | --- |\n");
    for field in fields {
        let required = if field.required { "yes" } else { "no" };
        let _ = writeln!(
            out,
            "| {} | {} | {required} | {} |",
            field.name, field.field_type, field.description
        );
    }
}

/// Renders a [`PrdState`] into its markdown artifact.
#[derive(Debug, Clone, Copy, Default)]
pub struct PrdAssembler;

impl PrdAssembler {
    /// Assembles the document. Absent fields render as empty sections.
    #[must_use]
    pub fn assemble(state: &PrdState) -> PrdArtifact {
        let mut out = String::new();

        // Title
        let title = if state.project_name.trim().is_empty() {
            FALLBACK_TITLE
        } else {
            state.project_name.as_str()
        };
        let _ = writeln!(out, "# {title} PRD\n");

        // Context
        out.push_str("## Background & Goals\n\n");
        let _ = writeln!(out, "### Background\n{}\n", state.background);
        let _ = writeln!(out, "### Value\n{}\n", state.value);
        out.push_str("### User Segments\n");
        bullets(&mut out, &state.user_segments);
        let _ = writeln!(out, "\n### Vision\n{}\n", state.vision);

        // Architecture
        out.push_str("## Architecture Overview\n\n");
        let _ = writeln!(out, "### Business Architecture\n{}\n", state.business_architecture);
        let _ = writeln!(out, "### Technical Architecture\n{}\n", state.technical_architecture);
        if let Some(ref frameworks) = state.frameworks {
            out.push_str("### Recommended Stack\n");
            if !frameworks.backend.is_empty() {
                let _ = writeln!(out, "- Backend: {}", frameworks.backend.join(", "));
            }
            if !frameworks.frontend.is_empty() {
                let _ = writeln!(out, "- Frontend: {}", frameworks.frontend.join(", "));
            }
            if !frameworks.orchestration.is_empty() {
                let _ = writeln!(out, "- Orchestration: {}", frameworks.orchestration.join(", "));
            }
            if !frameworks.rationale.is_empty() {
                let _ = writeln!(out, "- Rationale: {}", frameworks.rationale);
            }
            out.push('\n');
        }
        let _ = writeln!(out, "### Data Flow\n{}\n", state.data_flow);
        let _ = writeln!(out, "### Scalability\n{}\n", state.scalability);

        // Features
        out.push_str("## Feature List\n\n");
        for (idx, feature) in state.features.iter().enumerate() {
            let _ = writeln!(out, "### Feature {}: {}", idx + 1, feature.name);
            let _ = writeln!(out, "- Description: {}", feature.description);
            let _ = writeln!(out, "- Inputs: {}", feature.inputs.join(", "));
            let _ = writeln!(out, "- Outputs: {}", feature.outputs.join(", "));
            let _ = writeln!(out, "- Preconditions: {}", feature.preconditions.join(", "));
            let _ = writeln!(out, "- Postconditions: {}", feature.postconditions.join(", "));
            let _ = writeln!(out, "- Edge Cases: {}", feature.edge_cases.join(", "));
            let _ = writeln!(out, "- Dependencies: {}\n", feature.dependencies.join(", "));
        }

        // Data model
        out.push_str("## Data Model\n\n");
        out.push_str("### Core Entities\n");
        bullets(&mut out, &state.core_entities);
        out.push_str("\n### Tables\n");
        for table in &state.tables {
            let _ = writeln!(out, "\n#### {}", table.name);
            let _ = writeln!(out, "{}\n", table.description);
            let _ = writeln!(out, "Primary key: {}\n", table.primary_key);
            out.push_str("| Field | Type | Description | Constraints |\n");
            out.push_str("| --- | --- | --- | --- |\n");
            for field in &table.fields {
                let _ = writeln!(
                    out,
                    "| {} | {} | {} | {} |",
                    field.name, field.field_type, field.description, field.constraints
                );
            }
        }
        out.push_str("\n### Service Contracts (DTO)\n");
        for dto in &state.dto_contracts {
            let _ = writeln!(
                out,
                "- {} -> {}: payload {}, notes: {}",
                dto.provider, dto.consumer, dto.payload, dto.notes
            );
        }
        out.push('\n');

        // API contracts
        out.push_str("## API Contracts\n\n");
        for api in &state.apis {
            let _ = writeln!(out, "### {}", api.name);
            let _ = writeln!(out, "- URL: `{}`", api.url);
            let _ = writeln!(out, "- Method: {}", api.method);
            out.push_str("- Request:\n\n");
            field_table(&mut out, &api.request);
            out.push_str("\n- Response:\n\n");
            field_table(&mut out, &api.response);
            if !api.errors.is_empty() {
                out.push_str("\n- Errors:\n");
                for (code, description) in &api.errors {
                    let _ = writeln!(out, "  - {code}: {description}");
                }
            }
            if !api.example.is_null() {
                out.push_str("\n- Example:\n\n```json\n");
                let _ = writeln!(out, "{}", api.example);
                out.push_str("```\n");
            }
            out.push('\n');
        }

        // NFRs
        out.push_str("## Non-Functional Requirements\n\n");
        let _ = writeln!(out, "- Performance: {}", state.nfr.performance);
        let _ = writeln!(out, "- Security: {}", state.nfr.security);
        let _ = writeln!(out, "- Scalability: {}", state.nfr.scalability);
        let _ = writeln!(out, "- Observability: {}", state.nfr.observability);
        let _ = writeln!(out, "- Internationalization: {}", state.nfr.internationalization);
        let _ = writeln!(out, "- External Services: {}\n", state.nfr.external_services);

        // Risks
        out.push_str("## Risks\n\n");
        bullets(&mut out, &state.risks);
        out.push('\n');

        // Glossary
        out.push_str("## Appendix\n\n### Glossary\n");
        bullets(&mut out, &state.glossary);

        PrdArtifact { markdown: out }
    }
}
