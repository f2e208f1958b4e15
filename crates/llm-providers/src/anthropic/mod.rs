//! Anthropic messages API adapter.

mod api_types;

use std::time::Duration;

use reqwest::{Client, StatusCode};
use secrecy::ExposeSecret;
use summary_core::{async_trait, CompletionRequest, LlmProvider, ProviderError, ProviderKind};
use tracing::{debug, info};

use crate::config::{ConfigError, ProviderConfig};
use crate::error::{classify_status, empty_response, map_transport_error, parse_retry_after};

use api_types::{ApiError, InputMessage, MessagesRequest, MessagesResponse};

const ANTHROPIC_VERSION: &str = "2023-06-01";
const DEFAULT_MAX_TOKENS: u32 = 1024;

/// Completion adapter for the Anthropic messages API.
pub struct AnthropicProvider {
    client: Client,
    config: ProviderConfig,
}

impl AnthropicProvider {
    /// Create a new adapter with the given configuration.
    pub fn new(config: ProviderConfig) -> Result<Self, ConfigError> {
        if !config.has_api_key() {
            return Err(ConfigError::Missing("Anthropic API key".to_string()));
        }

        let client = Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| ConfigError::Client(e.to_string()))?;

        info!("Anthropic provider initialized with model: {}", config.model);

        Ok(Self { client, config })
    }

    /// Get the configuration.
    pub fn config(&self) -> &ProviderConfig {
        &self.config
    }

    fn build_request(&self, request: &CompletionRequest) -> MessagesRequest {
        MessagesRequest {
            model: request
                .model
                .clone()
                .unwrap_or_else(|| self.config.model.clone()),
            max_tokens: self.config.max_tokens.unwrap_or(DEFAULT_MAX_TOKENS),
            system: (!request.style_directive.is_empty())
                .then(|| request.style_directive.clone()),
            messages: vec![InputMessage {
                role: "user".to_string(),
                content: request.prompt.clone(),
            }],
            temperature: self.config.temperature,
        }
    }
}

#[async_trait]
impl LlmProvider for AnthropicProvider {
    async fn complete(&self, request: CompletionRequest) -> Result<String, ProviderError> {
        let url = format!("{}/v1/messages", self.config.api_url.trim_end_matches('/'));
        let body = self.build_request(&request);

        debug!("Sending Anthropic request to model {}", body.model);

        let response = self
            .client
            .post(&url)
            .header("x-api-key", self.config.api_key.expose_secret())
            .header("anthropic-version", ANTHROPIC_VERSION)
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

        let parsed: MessagesResponse = response.json().await.map_err(map_transport_error)?;
        extract_text(parsed)
    }

    fn kind(&self) -> ProviderKind {
        ProviderKind::Anthropic
    }

    fn model(&self) -> &str {
        &self.config.model
    }
}

/// Map a non-success Anthropic response.
///
/// 529 means the API is overloaded and falls into the shared 5xx handling.
fn map_error_response(
    status: StatusCode,
    retry_after: Option<Duration>,
    body: &str,
) -> ProviderError {
    let detail = match serde_json::from_str::<ApiError>(body) {
        Ok(api_error) => {
            match api_error.error.error_type.as_str() {
                "authentication_error" | "permission_error" => {
                    return ProviderError::InvalidCredentials;
                }
                "rate_limit_error" => return ProviderError::RateLimited { retry_after },
                "overloaded_error" | "api_error" => {
                    return ProviderError::Transient(api_error.error.message);
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
fn extract_text(response: MessagesResponse) -> Result<String, ProviderError> {
    if response.stop_reason.as_deref() == Some("refusal") {
        return Err(ProviderError::ContentRejected(
            "model declined to respond".to_string(),
        ));
    }

    let text = response
        .content
        .into_iter()
        .filter(|block| block.block_type == "text")
        .filter_map(|block| block.text)
        .collect::<Vec<_>>()
        .join("");

    let text = text.trim();
    if text.is_empty() {
        return Err(empty_response());
    }
    Ok(text.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(json: &str) -> MessagesResponse {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_request_shape() {
        let provider =
            AnthropicProvider::new(ProviderConfig::new(ProviderKind::Anthropic, "sk-ant")).unwrap();
        let body = provider.build_request(&CompletionRequest::new("Be technical.", "carol: deploy?"));
        let json = serde_json::to_value(&body).unwrap();

        assert_eq!(json["model"], "claude-3-5-haiku-20241022");
        assert_eq!(json["max_tokens"], 1024);
        assert_eq!(json["system"], "Be technical.");
        assert_eq!(json["messages"][0]["role"], "user");
        assert_eq!(json["messages"][0]["content"], "carol: deploy?");
        assert!(json.get("temperature").is_none());
    }

    #[test]
    fn test_extract_text() {
        let response = parse(
            r#"{"id":"msg_1","type":"message","role":"assistant","content":[{"type":"text","text":"Deploy is on hold."}],"stop_reason":"end_turn"}"#,
        );
        assert_eq!(extract_text(response).unwrap(), "Deploy is on hold.");
    }

    #[test]
    fn test_extract_text_refusal() {
        let response = parse(r#"{"content":[],"stop_reason":"refusal"}"#);
        assert!(matches!(
            extract_text(response),
            Err(ProviderError::ContentRejected(_))
        ));
    }

    #[test]
    fn test_extract_text_empty() {
        let response = parse(r#"{"content":[{"type":"text","text":""}],"stop_reason":"end_turn"}"#);
        assert!(extract_text(response).unwrap_err().is_retriable());
    }

    #[test]
    fn test_error_mapping() {
        let auth = r#"{"type":"error","error":{"type":"authentication_error","message":"invalid x-api-key"}}"#;
        assert_eq!(
            map_error_response(StatusCode::UNAUTHORIZED, None, auth),
            ProviderError::InvalidCredentials
        );

        let overloaded = r#"{"type":"error","error":{"type":"overloaded_error","message":"Overloaded"}}"#;
        let status = StatusCode::from_u16(529).unwrap();
        assert!(map_error_response(status, None, overloaded).is_retriable());
        assert!(map_error_response(status, None, "").is_retriable());

        let limited = r#"{"type":"error","error":{"type":"rate_limit_error","message":"slow down"}}"#;
        assert_eq!(
            map_error_response(
                StatusCode::TOO_MANY_REQUESTS,
                Some(Duration::from_secs(9)),
                limited
            ),
            ProviderError::RateLimited {
                retry_after: Some(Duration::from_secs(9))
            }
        );

        let invalid = r#"{"type":"error","error":{"type":"invalid_request_error","message":"prompt is too long"}}"#;
        assert!(matches!(
            map_error_response(StatusCode::BAD_REQUEST, None, invalid),
            ProviderError::ContentRejected(msg) if msg.contains("too long")
        ));
    }
}
