//! Provider configuration with layered overrides.

use serde::{Deserialize, Serialize};

/// Default model identifier.
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";
/// Default sampling temperature.
pub const DEFAULT_TEMPERATURE: f32 = 0.15;
/// Default OpenAI-compatible endpoint root.
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
/// Default request timeout in seconds.
pub const DEFAULT_TIMEOUT_SECONDS: u64 = 120;

/// Configuration for the generation provider.
///
/// Constructed once per process and passed to whoever builds the stages;
/// there is no cached global client. Settings layer as: call-time override >
/// environment variable > built-in default.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// Model identifier.
    pub model: String,
    /// Sampling temperature.
    pub temperature: f32,
    /// Endpoint root URL (an OpenAI-compatible server).
    pub base_url: String,
    /// Optional bearer credential.
    pub api_key: Option<String>,
    /// Request timeout in seconds.
    pub timeout_seconds: u64,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            temperature: DEFAULT_TEMPERATURE,
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: None,
            timeout_seconds: DEFAULT_TIMEOUT_SECONDS,
        }
    }
}

fn env_var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

impl ProviderConfig {
    /// Builds a configuration from environment variables over the defaults.
    ///
    /// Recognized variables: `LLM_MODEL`, `LLM_TEMPERATURE`,
    /// `OPENAI_BASE_URL`, `OPENAI_API_KEY` (with `LANGCHAIN_API_KEY` as a
    /// fallback credential for self-hosted gateways).
    #[must_use]
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            model: env_var("LLM_MODEL").unwrap_or(defaults.model),
            temperature: env_var("LLM_TEMPERATURE")
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.temperature),
            base_url: env_var("OPENAI_BASE_URL").unwrap_or(defaults.base_url),
            api_key: env_var("OPENAI_API_KEY").or_else(|| env_var("LANGCHAIN_API_KEY")),
            timeout_seconds: defaults.timeout_seconds,
        }
    }

    /// Applies call-time overrides on top of this configuration.
    ///
    /// `None` leaves the corresponding layer untouched.
    #[must_use]
    pub fn with_overrides(mut self, model: Option<String>, temperature: Option<f32>) -> Self {
        if let Some(model) = model {
            self.model = model;
        }
        if let Some(temperature) = temperature {
            self.temperature = temperature;
        }
        self
    }

    /// Sets the endpoint root.
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Sets the credential.
    #[must_use]
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }
}
