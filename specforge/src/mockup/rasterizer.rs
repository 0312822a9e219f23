//! Rasterization of the mockup document into image bytes.
//!
//! Treated as an external collaborator: the pipeline only needs "HTML in,
//! PNG bytes out". The bundled implementation shells out to a headless
//! browser; deployments with other capture infrastructure implement the
//! trait themselves.

use crate::errors::RenderError;
use async_trait::async_trait;
use std::fmt::Debug;
use std::path::PathBuf;
use uuid::Uuid;

/// Converts a markup document into image bytes.
#[async_trait]
pub trait Rasterizer: Send + Sync + Debug {
    /// Renders `html` at the given viewport size and returns PNG bytes.
    ///
    /// # Errors
    ///
    /// Any failure is fatal for the render stage.
    async fn rasterize(&self, html: &str, width: u32, height: u32)
        -> Result<Vec<u8>, RenderError>;
}

const BROWSER_CANDIDATES: [&str; 4] =
    ["chromium", "chromium-browser", "google-chrome", "chrome"];

/// A [`Rasterizer`] driving a headless Chromium `--screenshot` run.
#[derive(Debug, Clone, Default)]
pub struct ChromiumRasterizer {
    binary: Option<PathBuf>,
}

impl ChromiumRasterizer {
    /// Probes the well-known browser binaries at rasterize time.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Uses a specific browser binary instead of probing.
    #[must_use]
    pub fn with_binary(binary: impl Into<PathBuf>) -> Self {
        Self {
            binary: Some(binary.into()),
        }
    }

    fn candidates(&self) -> Vec<PathBuf> {
        match &self.binary {
            Some(binary) => vec![binary.clone()],
            None => BROWSER_CANDIDATES.iter().map(PathBuf::from).collect(),
        }
    }

    async fn screenshot(
        binary: &PathBuf,
        page: &PathBuf,
        shot: &PathBuf,
        width: u32,
        height: u32,
    ) -> Result<std::process::Output, std::io::Error> {
        tokio::process::Command::new(binary)
            .arg("--headless")
            .arg("--disable-gpu")
            .arg("--hide-scrollbars")
            .arg(format!("--window-size={width},{height}"))
            .arg(format!("--screenshot={}", shot.display()))
            .arg(format!("file://{}", page.display()))
            .output()
            .await
    }
}

#[async_trait]
impl Rasterizer for ChromiumRasterizer {
    async fn rasterize(
        &self,
        html: &str,
        width: u32,
        height: u32,
    ) -> Result<Vec<u8>, RenderError> {
        let work_dir = std::env::temp_dir().join(format!("specforge-render-{}", Uuid::new_v4()));
        tokio::fs::create_dir_all(&work_dir).await?;
        let page = work_dir.join("mockup.html");
        let shot = work_dir.join("mockup.png");
        tokio::fs::write(&page, html).await?;

        let mut result = None;
        for binary in self.candidates() {
            match Self::screenshot(&binary, &page, &shot, width, height).await {
                Ok(output) => {
                    result = Some(output);
                    break;
                }
                Err(err) if err.kind() == std::io::ErrorKind::NotFound => {}
                Err(err) => {
                    let _ = tokio::fs::remove_dir_all(&work_dir).await;
                    return Err(err.into());
                }
            }
        }

        let Some(output) = result else {
            let _ = tokio::fs::remove_dir_all(&work_dir).await;
            return Err(RenderError::BrowserNotFound {
                tried: self
                    .candidates()
                    .iter()
                    .map(|p| p.display().to_string())
                    .collect::<Vec<_>>()
                    .join(", "),
            });
        };

        if !output.status.success() {
            let _ = tokio::fs::remove_dir_all(&work_dir).await;
            return Err(RenderError::CommandFailed {
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            });
        }

        let bytes = tokio::fs::read(&shot).await?;
        let _ = tokio::fs::remove_dir_all(&work_dir).await;
        Ok(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_binary_is_the_only_candidate() {
        let rasterizer = ChromiumRasterizer::with_binary("/opt/bin/chromium");
        let candidates = rasterizer.candidates();
        assert_eq!(candidates, vec![PathBuf::from("/opt/bin/chromium")]);
    }

    #[test]
    fn probing_covers_the_known_binaries() {
        let rasterizer = ChromiumRasterizer::new();
        assert_eq!(rasterizer.candidates().len(), BROWSER_CANDIDATES.len());
    }

    #[tokio::test]
    async fn missing_browser_reports_what_was_tried() {
        let rasterizer = ChromiumRasterizer::with_binary("/nonexistent/browser-binary");
        let err = rasterizer.rasterize("<html></html>", 100, 100).await.unwrap_err();
        match err {
            RenderError::BrowserNotFound { tried } => {
                assert!(tried.contains("/nonexistent/browser-binary"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
