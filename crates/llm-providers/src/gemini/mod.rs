//! Google Gemini adapter.

mod api_types;

use std::time::Duration;

use reqwest::{Client, StatusCode};
use secrecy::ExposeSecret;
use summary_core::{async_trait, CompletionRequest, LlmProvider, ProviderError, ProviderKind};
use tracing::{debug, info};

use crate::config::{ConfigError, ProviderConfig};
use crate::error::{classify_status, empty_response, map_transport_error, parse_retry_after, truncate};

use api_types::{
    ApiError, Content, GenerateContentRequest, GenerateContentResponse, GenerationConfig,
};

/// Finish reasons that mean the output was withheld.
const BLOCKED_FINISH_REASONS: &[&str] = &["SAFETY", "PROHIBITED_CONTENT", "BLOCKLIST", "SPII"];

/// Completion adapter for the Gemini `generateContent` API.
pub struct GeminiProvider {
    client: Client,
    config: ProviderConfig,
}

impl GeminiProvider {
    /// Create a new adapter with the given configuration.
    pub fn new(config: ProviderConfig) -> Result<Self, ConfigError> {
        if !config.has_api_key() {
            return Err(ConfigError::Missing("Gemini API key".to_string()));
        }

        let client = Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| ConfigError::Client(e.to_string()))?;

        info!("Gemini provider initialized with model: {}", config.model);

        Ok(Self { client, config })
    }

    /// Get the configuration.
    pub fn config(&self) -> &ProviderConfig {
        &self.config
    }

    fn build_request(&self, request: &CompletionRequest) -> GenerateContentRequest {
        let system_instruction = if request.style_directive.is_empty() {
            None
        } else {
            Some(Content::instruction(request.style_directive.clone()))
        };

        GenerateContentRequest {
            system_instruction,
            contents: vec![Content::user(request.prompt.clone())],
            generation_config: Some(GenerationConfig {
                max_output_tokens: self.config.max_tokens,
                temperature: self.config.temperature,
            }),
        }
    }
}

#[async_trait]
impl LlmProvider for GeminiProvider {
    async fn complete(&self, request: CompletionRequest) -> Result<String, ProviderError> {
        let model = request.model.as_deref().unwrap_or(&self.config.model);
        let url = format!(
            "{}/v1beta/models/{}:generateContent",
            self.config.api_url.trim_end_matches('/'),
            model
        );
        let body = self.build_request(&request);

        debug!("Sending Gemini request to model {}", model);

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", self.config.api_key.expose_secret())
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

        let parsed: GenerateContentResponse = response.json().await.map_err(map_transport_error)?;
        extract_text(parsed)
    }

    fn kind(&self) -> ProviderKind {
        ProviderKind::Gemini
    }

    fn model(&self) -> &str {
        &self.config.model
    }
}

/// Map a non-success Gemini response.
///
/// Gemini reports a bad key as a 400 with `API_KEY_INVALID`, so that case is
/// checked before the shared status mapping.
fn map_error_response(
    status: StatusCode,
    retry_after: Option<Duration>,
    body: &str,
) -> ProviderError {
    let detail = match serde_json::from_str::<ApiError>(body) {
        Ok(api_error) => {
            if api_error.error.has_reason("API_KEY_INVALID")
                || api_error.error.message.contains("API key not valid")
            {
                return ProviderError::InvalidCredentials;
            }
            api_error.error.message
        }
        Err(_) => body.to_string(),
    };

    classify_status(status, retry_after, &detail)
}

/// Pull the generated text out of a successful response.
fn extract_text(response: GenerateContentResponse) -> Result<String, ProviderError> {
    if let Some(reason) = response
        .prompt_feedback
        .as_ref()
        .and_then(|feedback| feedback.block_reason.as_deref())
    {
        return Err(ProviderError::ContentRejected(format!(
            "prompt blocked: {}",
            reason
        )));
    }

    let candidate = response.candidates.into_iter().next().ok_or_else(empty_response)?;

    if let Some(reason) = candidate.finish_reason.as_deref() {
        if BLOCKED_FINISH_REASONS.contains(&reason) {
            return Err(ProviderError::ContentRejected(format!(
                "response blocked: {}",
                truncate(reason)
            )));
        }
    }

    let text: String = candidate
        .content
        .map(|content| {
            content
                .parts
                .into_iter()
                .filter_map(|part| part.text)
                .collect::<Vec<_>>()
                .join("")
        })
        .unwrap_or_default();

    let text = text.trim();
    if text.is_empty() {
        return Err(empty_response());
    }
    Ok(text.to_string())
}
