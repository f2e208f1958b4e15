//! OpenAI chat completions adapter.

mod api_types;

use std::time::Duration;

use reqwest::{Client, StatusCode};
use secrecy::ExposeSecret;
use summary_core::{async_trait, CompletionRequest, LlmProvider, ProviderError, ProviderKind};
use tracing::{debug, info};

use crate::config::{ConfigError, ProviderConfig};
use crate::error::{classify_status, empty_response, map_transport_error, parse_retry_after};

use api_types::{ApiError, ChatCompletionRequest, ChatCompletionResponse, ChatMessage};

/// Completion adapter for the OpenAI chat completions API.
pub struct OpenAiProvider {
    client: Client,
    config: ProviderConfig,
}

impl OpenAiProvider {
    /// Create a new adapter with the given configuration.
    pub fn new(config: ProviderConfig) -> Result<Self, ConfigError> {
        if !config.has_api_key() {
            return Err(ConfigError::Missing("OpenAI API key".to_string()));
        }

        let client = Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| ConfigError::Client(e.to_string()))?;

        info!("OpenAI provider initialized with model: {}", config.model);

        Ok(Self { client, config })
    }

    /// Get the configuration.
    pub fn config(&self) -> &ProviderConfig {
        &self.config
    }

    fn build_request(&self, request: &CompletionRequest) -> ChatCompletionRequest {
        let mut messages = Vec::with_capacity(2);
        if !request.style_directive.is_empty() {
            messages.push(ChatMessage::system(request.style_directive.clone()));
        }
        messages.push(ChatMessage::user(request.prompt.clone()));

        ChatCompletionRequest {
            model: request
                .model
                .clone()
                .unwrap_or_else(|| self.config.model.clone()),
            messages,
            max_tokens: self.config.max_tokens,
            temperature: self.config.temperature,
        }
    }
}

#[async_trait]
impl LlmProvider for OpenAiProvider {
    async fn complete(&self, request: CompletionRequest) -> Result<String, ProviderError> {
        let url = format!(
            "{}/v1/chat/completions",
            self.config.api_url.trim_end_matches('/')
        );
        let body = self.build_request(&request);

        debug!("Sending OpenAI request to model {}", body.model);

        let response = self
            .client
            .post(&url)
            .bearer_auth(self.config.api_key.expose_secret())
            .json(&body)
            .send()
            .await
            .map_err(map_transport_error)?;

        let status = response.status();
        let retry_after = parse_retry_after(response.headers());

        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(map_error_response(status, retry_after, &error_text));
        }

        let parsed: ChatCompletionResponse = response.json().await.map_err(map_transport_error)?;
        extract_text(parsed)
    }

    fn kind(&self) -> ProviderKind {
        ProviderKind::OpenAi
    }

    fn model(&self) -> &str {
        &self.config.model
    }
}

/// Map a non-success OpenAI response.
fn map_error_response(
    status: StatusCode,
    retry_after: Option<Duration>,
    body: &str,
) -> ProviderError {
    let detail = match serde_json::from_str::<ApiError>(body) {
        Ok(api_error) => {
            match api_error.error.code.as_deref() {
                Some("invalid_api_key") => return ProviderError::InvalidCredentials,
                Some("content_policy_violation") | Some("content_filter") => {
                    return ProviderError::ContentRejected(api_error.error.message);
                }
                _ => {}
            }
            api_error.error.message
        }
        Err(_) => body.to_string(),
    };

    classify_status(status, retry_after, &detail)
}

/// Pull the generated text out of a successful response.
fn extract_text(response: ChatCompletionResponse) -> Result<String, ProviderError> {
    let choice = response.choices.into_iter().next().ok_or_else(empty_response)?;

    if let Some(refusal) = choice.message.refusal {
        return Err(ProviderError::ContentRejected(refusal));
    }
    if choice.finish_reason.as_deref() == Some("content_filter") {
        return Err(ProviderError::ContentRejected(
            "response withheld by content filter".to_string(),
        ));
    }

    match choice.message.content {
        Some(text) if !text.trim().is_empty() => Ok(text.trim().to_string()),
        _ => Err(empty_response()),
    }
}
