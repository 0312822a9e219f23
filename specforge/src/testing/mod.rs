//! Test doubles for the provider and rasterizer seams.
//!
//! Mirrors how production code is wired: doubles implement the same traits
//! and are handed in as `Arc<dyn ...>`, so pipelines under test are
//! indistinguishable from real ones above the seam.

use crate::errors::{ProviderError, RenderError};
use crate::mockup::Rasterizer;
use crate::provider::{GenerationProvider, ProviderReply};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::VecDeque;

/// A provider that always returns the same text.
#[derive(Debug)]
pub struct StaticProvider {
    text: String,
    calls: Mutex<usize>,
}

impl StaticProvider {
    /// Creates a provider returning `text` on every call.
    #[must_use]
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            calls: Mutex::new(0),
        }
    }

    /// Returns how many times the provider was invoked.
    #[must_use]
    pub fn call_count(&self) -> usize {
        *self.calls.lock()
    }
}

#[async_trait]
impl GenerationProvider for StaticProvider {
    async fn invoke(&self, _system: &str, _user: &str) -> Result<ProviderReply, ProviderError> {
        *self.calls.lock() += 1;
        Ok(ProviderReply::Text(self.text.clone()))
    }
}

/// A provider that replays a queued script of replies in FIFO order.
///
/// Running past the script returns [`ProviderError::Empty`], which makes an
/// under-provisioned test fail loudly instead of hanging on defaults.
#[derive(Debug, Default)]
pub struct ScriptedProvider {
    replies: Mutex<VecDeque<ProviderReply>>,
    prompts: Mutex<Vec<(String, String)>>,
}

impl ScriptedProvider {
    /// Creates an empty script.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues a plain-text reply.
    pub fn push_text(&self, text: impl Into<String>) {
        self.replies
            .lock()
            .push_back(ProviderReply::Text(text.into()));
    }

    /// Queues an arbitrary reply shape.
    pub fn push_reply(&self, reply: ProviderReply) {
        self.replies.lock().push_back(reply);
    }

    /// Returns the (system, user) prompt pairs seen so far.
    #[must_use]
    pub fn recorded_prompts(&self) -> Vec<(String, String)> {
        self.prompts.lock().clone()
    }
}

#[async_trait]
impl GenerationProvider for ScriptedProvider {
    async fn invoke(&self, system: &str, user: &str) -> Result<ProviderReply, ProviderError> {
        self.prompts
            .lock()
            .push((system.to_string(), user.to_string()));
        self.replies.lock().pop_front().ok_or(ProviderError::Empty)
    }
}

/// A provider that always fails, for exercising the fatal path.
#[derive(Debug, Default)]
pub struct FailingProvider;

#[async_trait]
impl GenerationProvider for FailingProvider {
    async fn invoke(&self, _system: &str, _user: &str) -> Result<ProviderReply, ProviderError> {
        Err(ProviderError::Status {
            status: 503,
            body: "service unavailable".to_string(),
        })
    }
}

/// PNG signature bytes used as the stub's default output.
const PNG_SIGNATURE: [u8; 8] = [0x89, 0x50, 0x4e, 0x47, 0x0d, 0x0a, 0x1a, 0x0a];

/// A rasterizer that returns fixed bytes and records its inputs.
#[derive(Debug)]
pub struct StubRasterizer {
    bytes: Vec<u8>,
    captured_html: Mutex<Vec<String>>,
}

impl Default for StubRasterizer {
    fn default() -> Self {
        Self {
            bytes: PNG_SIGNATURE.to_vec(),
            captured_html: Mutex::new(Vec::new()),
        }
    }
}

impl StubRasterizer {
    /// Creates a stub returning the given bytes.
    #[must_use]
    pub fn with_bytes(bytes: Vec<u8>) -> Self {
        Self {
            bytes,
            captured_html: Mutex::new(Vec::new()),
        }
    }

    /// Returns the HTML documents passed to the stub.
    #[must_use]
    pub fn captured_html(&self) -> Vec<String> {
        self.captured_html.lock().clone()
    }
}

#[async_trait]
impl Rasterizer for StubRasterizer {
    async fn rasterize(
        &self,
        html: &str,
        _width: u32,
        _height: u32,
    ) -> Result<Vec<u8>, RenderError> {
        self.captured_html.lock().push(html.to_string());
        Ok(self.bytes.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[tokio::test]
    async fn scripted_provider_pops_in_order() {
        let provider = ScriptedProvider::new();
        provider.push_text("first");
        provider.push_text("second");

        let one = provider.invoke("s", "u").await.unwrap().into_text();
        let two = provider.invoke("s", "u").await.unwrap().into_text();

        assert_eq!(one, "first");
        assert_eq!(two, "second");
        assert!(provider.invoke("s", "u").await.is_err());
    }

    #[tokio::test]
    async fn scripted_provider_records_prompts() {
        let provider = ScriptedProvider::new();
        provider.push_text("{}");
        let _ = provider.invoke("system prompt", "user context").await;

        let prompts = provider.recorded_prompts();
        assert_eq!(prompts.len(), 1);
        assert_eq!(prompts[0].0, "system prompt");
    }

    #[tokio::test]
    async fn stub_rasterizer_captures_html() {
        let stub = StubRasterizer::default();
        let bytes = stub.rasterize("<html>x</html>", 10, 10).await.unwrap();

        assert_eq!(bytes, PNG_SIGNATURE.to_vec());
        assert_eq!(stub.captured_html(), vec!["<html>x</html>".to_string()]);
    }
}
