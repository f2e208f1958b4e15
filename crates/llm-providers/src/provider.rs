//! Runtime selection of the configured provider.

use summary_core::{async_trait, CompletionRequest, LlmProvider, ProviderError, ProviderKind};

use crate::anthropic::AnthropicProvider;
use crate::config::{ConfigError, ProviderConfig};
use crate::gemini::GeminiProvider;
use crate::openai::OpenAiProvider;

/// The provider chosen by configuration.
pub enum Provider {
    Gemini(GeminiProvider),
    OpenAi(OpenAiProvider),
    Anthropic(AnthropicProvider),
}

impl Provider {
    /// Build the adapter matching `config.kind`.
    pub fn new(config: ProviderConfig) -> Result<Self, ConfigError> {
        Ok(match config.kind {
            ProviderKind::Gemini => Provider::Gemini(GeminiProvider::new(config)?),
            ProviderKind::OpenAi => Provider::OpenAi(OpenAiProvider::new(config)?),
            ProviderKind::Anthropic => Provider::Anthropic(AnthropicProvider::new(config)?),
        })
    }

    /// Build the adapter from environment variables.
    ///
    /// See [`ProviderConfig::from_env`] for the variables read.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::new(ProviderConfig::from_env()?)
    }

    /// Get the configuration.
    pub fn config(&self) -> &ProviderConfig {
        match self {
            Provider::Gemini(p) => p.config(),
            Provider::OpenAi(p) => p.config(),
            Provider::Anthropic(p) => p.config(),
        }
    }
}

#[async_trait]
impl LlmProvider for Provider {
    async fn complete(&self, request: CompletionRequest) -> Result<String, ProviderError> {
        match self {
            Provider::Gemini(p) => p.complete(request).await,
            Provider::OpenAi(p) => p.complete(request).await,
            Provider::Anthropic(p) => p.complete(request).await,
        }
    }

    fn kind(&self) -> ProviderKind {
        match self {
            Provider::Gemini(p) => p.kind(),
            Provider::OpenAi(p) => p.kind(),
            Provider::Anthropic(p) => p.kind(),
        }
    }

    fn model(&self) -> &str {
        match self {
            Provider::Gemini(p) => p.model(),
            Provider::OpenAi(p) => p.model(),
            Provider::Anthropic(p) => p.model(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dispatch_by_kind() {
        for kind in [ProviderKind::Gemini, ProviderKind::OpenAi, ProviderKind::Anthropic] {
            let provider = Provider::new(ProviderConfig::new(kind, "key")).unwrap();
            assert_eq!(provider.kind(), kind);
            assert_eq!(provider.model(), provider.config().model);
        }
    }

    #[test]
    fn test_model_override_from_config() {
        let config = ProviderConfig::builder(ProviderKind::Anthropic)
            .api_key("key")
            .model("claude-sonnet-4-20250514")
            .build();
        let provider = Provider::new(config).unwrap();
        assert_eq!(provider.model(), "claude-sonnet-4-20250514");
    }

    #[test]
    fn test_missing_key() {
        let config = ProviderConfig::builder(ProviderKind::OpenAi).build();
        assert!(matches!(Provider::new(config), Err(ConfigError::Missing(_))));
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_is_transient() {
        let config = ProviderConfig::builder(ProviderKind::OpenAi)
            .api_key("key")
            .api_url("http://127.0.0.1:9")
            .request_timeout(std::time::Duration::from_secs(2))
            .build();
        let provider = Provider::new(config).unwrap();

        let err = provider
            .complete(CompletionRequest::new("d", "p"))
            .await
            .unwrap_err();
        assert!(err.is_retriable());
    }
}
