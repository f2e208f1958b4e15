//! Configuration for LLM providers.

use std::env;
use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};
use summary_core::ProviderKind;
use thiserror::Error;

/// Default timeout for a single completion request.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// Errors raised while building a provider configuration or client.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A required variable or key is missing.
    #[error("missing configuration: {0}")]
    Missing(String),

    /// A value could not be parsed.
    #[error("invalid configuration: {0}")]
    Invalid(String),

    /// The HTTP client could not be created.
    #[error("failed to create HTTP client: {0}")]
    Client(String),
}

/// Credentials and request settings for one provider.
///
/// The API key is held as a [`SecretString`]; it is only exposed when the
/// request headers are built and never appears in `Debug` output.
#[derive(Debug, Clone)]
pub struct ProviderConfig {
    /// Which backend to call.
    pub kind: ProviderKind,

    /// API key for authentication.
    pub api_key: SecretString,

    /// Model name to use.
    pub model: String,

    /// Base API URL.
    pub api_url: String,

    /// Maximum tokens for the response.
    pub max_tokens: Option<u32>,

    /// Temperature for generation.
    pub temperature: Option<f32>,

    /// Timeout for a single HTTP request.
    pub request_timeout: Duration,
}

impl ProviderConfig {
    /// Create a configuration with the defaults for `kind`.
    pub fn new(kind: ProviderKind, api_key: impl Into<String>) -> Self {
        let (api_url, model, max_tokens, temperature) = match kind {
            ProviderKind::Gemini => (
                "https://generativelanguage.googleapis.com",
                "gemini-2.0-flash-exp",
                Some(1024),
                None,
            ),
            ProviderKind::OpenAi => ("https://api.openai.com", "gpt-4o-mini", Some(500), Some(0.7)),
            ProviderKind::Anthropic => (
                "https://api.anthropic.com",
                "claude-3-5-haiku-20241022",
                Some(1024),
                None,
            ),
        };

        Self {
            kind,
            api_key: SecretString::from(api_key.into()),
            model: model.to_string(),
            api_url: api_url.to_string(),
            max_tokens,
            temperature,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }

    /// Create configuration from environment variables.
    ///
    /// Environment variables:
    /// - `LLM_PROVIDER` - `gemini`, `openai` or `anthropic` (default: gemini)
    /// - `GEMINI_API_KEY` / `OPENAI_API_KEY` / `ANTHROPIC_API_KEY` - key for the
    ///   selected provider (required)
    /// - `LLM_MODEL` - Model name (default depends on provider)
    /// - `LLM_API_URL` - Base URL override
    /// - `LLM_MAX_TOKENS` - Max response tokens
    /// - `LLM_TEMPERATURE` - Temperature
    /// - `LLM_TIMEOUT_SECS` - Per-request timeout (default: 60)
    pub fn from_env() -> Result<Self, ConfigError> {
        let kind = match env::var("LLM_PROVIDER") {
            Ok(value) if !value.trim().is_empty() => {
                value.parse::<ProviderKind>().map_err(ConfigError::Invalid)?
            }
            _ => ProviderKind::Gemini,
        };

        let key_var = api_key_var(kind);
        let api_key = env::var(key_var)
            .ok()
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| ConfigError::Missing(format!("{} not set", key_var)))?;

        let mut config = Self::new(kind, api_key);

        if let Ok(model) = env::var("LLM_MODEL") {
            config.model = model;
        }
        if let Ok(url) = env::var("LLM_API_URL") {
            config.api_url = url;
        }
        if let Some(tokens) = env::var("LLM_MAX_TOKENS").ok().and_then(|v| v.parse().ok()) {
            config.max_tokens = Some(tokens);
        }
        if let Some(temp) = env::var("LLM_TEMPERATURE").ok().and_then(|v| v.parse().ok()) {
            config.temperature = Some(temp);
        }
        if let Some(secs) = env::var("LLM_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
        {
            config.request_timeout = Duration::from_secs(secs);
        }

        Ok(config)
    }

    /// Create a new config builder.
    pub fn builder(kind: ProviderKind) -> ProviderConfigBuilder {
        ProviderConfigBuilder {
            config: Self::new(kind, String::new()),
        }
    }

    /// Whether an API key is present.
    pub fn has_api_key(&self) -> bool {
        !self.api_key.expose_secret().trim().is_empty()
    }
}

/// Name of the environment variable holding the key for `kind`.
pub fn api_key_var(kind: ProviderKind) -> &'static str {
    match kind {
        ProviderKind::Gemini => "GEMINI_API_KEY",
        ProviderKind::OpenAi => "OPENAI_API_KEY",
        ProviderKind::Anthropic => "ANTHROPIC_API_KEY",
    }
}

/// Builder for ProviderConfig.
#[derive(Debug)]
pub struct ProviderConfigBuilder {
    config: ProviderConfig,
}

impl ProviderConfigBuilder {
    /// Set the API key.
    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.config.api_key = SecretString::from(key.into());
        self
    }

    /// Set the API URL.
    pub fn api_url(mut self, url: impl Into<String>) -> Self {
        self.config.api_url = url.into();
        self
    }

    /// Set the model name.
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.config.model = model.into();
        self
    }

    /// Set the max tokens.
    pub fn max_tokens(mut self, tokens: u32) -> Self {
        self.config.max_tokens = Some(tokens);
        self
    }

    /// Set the temperature.
    pub fn temperature(mut self, temp: f32) -> Self {
        self.config.temperature = Some(temp);
        self
    }

    /// Set the per-request timeout.
    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.config.request_timeout = timeout;
        self
    }

    /// Build the configuration.
    pub fn build(self) -> ProviderConfig {
        self.config
    }
}
