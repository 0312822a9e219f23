//! Renders the final mockup state into its artifact files.

use super::presets::StylePreset;
use super::state::MockupState;
use crate::errors::AssemblyError;
use std::path::{Path, PathBuf};

/// The assembled mockup: markup, image, and sidecar metadata.
#[derive(Debug, Clone)]
pub struct MockupArtifact {
    /// The rendered markup document.
    pub html: String,
    /// The rasterized PNG bytes.
    pub image: Vec<u8>,
    /// The style preset the operator selected.
    pub style: StylePreset,
    /// The prompt used to compose the mockup.
    pub prompt: String,
}

/// Paths written by [`MockupArtifact::write_to`].
#[derive(Debug, Clone)]
pub struct MockupPaths {
    /// The markup document.
    pub html: PathBuf,
    /// The PNG image.
    pub image: PathBuf,
    /// The sidecar text file naming style and prompt.
    pub sidecar: PathBuf,
}

impl MockupArtifact {
    /// Writes all three files under an explicit destination directory.
    ///
    /// Callers pick the directory (typically keyed by run token), so
    /// concurrent runs never race on a shared fixed path.
    ///
    /// # Errors
    ///
    /// Propagates filesystem errors; nothing is cleaned up on partial
    /// failure.
    pub fn write_to(&self, dir: &Path) -> Result<MockupPaths, AssemblyError> {
        std::fs::create_dir_all(dir)?;
        let paths = MockupPaths {
            html: dir.join("mockup.html"),
            image: dir.join("mockup.png"),
            sidecar: dir.join("mockup.txt"),
        };

        std::fs::write(&paths.html, &self.html)?;
        std::fs::write(&paths.image, &self.image)?;
        std::fs::write(
            &paths.sidecar,
            format!("style: {}\nprompt: {}\n", self.style, self.prompt),
        )?;
        Ok(paths)
    }
}

/// Assembles the final mockup state into an artifact.
#[derive(Debug, Clone, Copy, Default)]
pub struct MockupAssembler;

impl MockupAssembler {
    /// Assembles the artifact.
    ///
    /// The markup and the image bytes are required by construction: no
    /// meaningful mockup exists without them. Every other field may be
    /// absent.
    ///
    /// # Errors
    ///
    /// Returns [`AssemblyError::MissingField`] naming the absent field; no
    /// partial artifact is produced.
    pub fn assemble(state: &MockupState) -> Result<MockupArtifact, AssemblyError> {
        if state.mockup_html.is_empty() {
            return Err(AssemblyError::MissingField {
                field: "mockup_html",
            });
        }
        if state.image_bytes.is_empty() {
            return Err(AssemblyError::MissingField {
                field: "image_bytes",
            });
        }

        Ok(MockupArtifact {
            html: state.mockup_html.clone(),
            image: state.image_bytes.clone(),
            style: state.preferred_style.unwrap_or_default(),
            prompt: state.ui_prompt.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn renderable_state() -> MockupState {
        MockupState {
            mockup_html: "<html></html>".to_string(),
            image_bytes: vec![0x89, 0x50],
            preferred_style: Some(StylePreset::Glass),
            ui_prompt: "Design a glass SaaS web UI.".to_string(),
            ..MockupState::default()
        }
    }

    #[test]
    fn missing_image_is_fatal_and_named() {
        let state = MockupState {
            mockup_html: "<html></html>".to_string(),
            ..MockupState::default()
        };
        let err = MockupAssembler::assemble(&state).unwrap_err();
        assert!(err.to_string().contains("image_bytes"));
    }

    #[test]
    fn missing_markup_is_fatal_and_named() {
        let state = MockupState {
            image_bytes: vec![1],
            ..MockupState::default()
        };
        let err = MockupAssembler::assemble(&state).unwrap_err();
        assert!(err.to_string().contains("mockup_html"));
    }

    #[test]
    fn unselected_style_defaults_to_minimal() {
        let mut state = renderable_state();
        state.preferred_style = None;
        let artifact = MockupAssembler::assemble(&state).unwrap();
        assert_eq!(artifact.style, StylePreset::Minimal);
    }

    #[test]
    fn write_to_places_all_three_files() {
        let dir = tempfile::tempdir().unwrap();
        let artifact = MockupAssembler::assemble(&renderable_state()).unwrap();

        let paths = artifact.write_to(dir.path()).unwrap();

        assert!(paths.html.exists());
        assert!(paths.image.exists());
        let sidecar = std::fs::read_to_string(&paths.sidecar).unwrap();
        assert!(sidecar.contains("style: glass"));
        assert!(sidecar.contains("prompt: Design a glass"));
    }
}
