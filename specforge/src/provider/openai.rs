//! Provider backed by an OpenAI-compatible chat-completions endpoint.

use super::{GenerationProvider, ProviderConfig, ProviderReply, ReplyChunk};
use crate::errors::ProviderError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

const BODY_PREVIEW_LIMIT: usize = 512;

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    temperature: f32,
    messages: [ChatMessage<'a>; 2],
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: serde_json::Value,
}

/// A [`GenerationProvider`] speaking the OpenAI chat-completions protocol.
///
/// Works against api.openai.com as well as self-hosted compatible servers
/// (vLLM, gateways) selected through [`ProviderConfig::base_url`].
#[derive(Debug, Clone)]
pub struct OpenAiProvider {
    config: ProviderConfig,
    client: reqwest::Client,
}

impl OpenAiProvider {
    /// Creates a provider from the given configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be constructed.
    pub fn new(config: ProviderConfig) -> Result<Self, ProviderError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()?;
        Ok(Self { config, client })
    }

    /// Returns the active configuration.
    #[must_use]
    pub fn config(&self) -> &ProviderConfig {
        &self.config
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.config.base_url.trim_end_matches('/'))
    }

    fn reply_from_content(content: serde_json::Value) -> Result<ProviderReply, ProviderError> {
        match content {
            serde_json::Value::String(text) => Ok(ProviderReply::Text(text)),
            serde_json::Value::Array(parts) => {
                let chunks: Vec<ReplyChunk> =
                    serde_json::from_value(serde_json::Value::Array(parts))
                        .unwrap_or_default();
                if chunks.is_empty() {
                    return Err(ProviderError::Empty);
                }
                Ok(ProviderReply::Chunks(chunks))
            }
            _ => Err(ProviderError::Empty),
        }
    }
}

#[async_trait]
impl GenerationProvider for OpenAiProvider {
    async fn invoke(&self, system: &str, user: &str) -> Result<ProviderReply, ProviderError> {
        let request = ChatRequest {
            model: &self.config.model,
            temperature: self.config.temperature,
            messages: [
                ChatMessage {
                    role: "system",
                    content: system,
                },
                ChatMessage {
                    role: "user",
                    content: user,
                },
            ],
        };

        let mut builder = self.client.post(self.endpoint()).json(&request);
        if let Some(ref api_key) = self.config.api_key {
            builder = builder.bearer_auth(api_key);
        }

        let response = builder.send().await?;
        let status = response.status();
        if !status.is_success() {
            let mut body = response.text().await.unwrap_or_default();
            body.truncate(BODY_PREVIEW_LIMIT);
            return Err(ProviderError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: ChatResponse = response.json().await?;
        let choice = parsed.choices.into_iter().next().ok_or(ProviderError::Empty)?;
        Self::reply_from_content(choice.message.content)
    }
}
