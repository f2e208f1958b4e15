//! The summarization pipeline.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;
use summary_core::{
    build_prompt, CompletionRequest, LlmProvider, ProviderError, ProviderKind, SummaryStyle,
    TextCleaner,
};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::config::SummarizerConfig;
use crate::message_store::MessageStore;
use crate::retry::RetryPolicy;
use crate::settings::ChatSettingsStore;
use crate::SummarizeError;

/// A request for one summary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SummaryRequest {
    pub chat_id: i64,
    /// Window size; the chat or process default applies when `None`.
    pub count: Option<usize>,
    /// Style for this summary only.
    pub style_override: Option<SummaryStyle>,
    /// Bound on each provider call; the configured timeout applies when `None`.
    ///
    /// A provider's own HTTP client timeout still applies underneath, so a
    /// value above it is effectively capped there.
    pub timeout: Option<Duration>,
}

impl SummaryRequest {
    pub fn new(chat_id: i64) -> Self {
        Self {
            chat_id,
            count: None,
            style_override: None,
            timeout: None,
        }
    }

    pub fn with_count(mut self, count: usize) -> Self {
        self.count = Some(count);
        self
    }

    pub fn with_style(mut self, style: SummaryStyle) -> Self {
        self.style_override = Some(style);
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

/// A generated summary and how it was produced.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryResult {
    pub chat_id: i64,
    pub text: String,
    pub style: SummaryStyle,
    /// Messages fetched from the store for this window.
    pub message_count_used: usize,
    /// Window size asked for, before clamping.
    pub requested_count: usize,
    /// Window size after clamping.
    pub effective_count: usize,
    pub provider_kind: ProviderKind,
    pub model: String,
    /// Provider calls made, including the successful one.
    pub attempts: u32,
    pub generated_at: DateTime<Utc>,
}

impl SummaryResult {
    /// Whether the requested count was outside the allowed range.
    pub fn was_clamped(&self) -> bool {
        self.requested_count != self.effective_count
    }
}

/// Fetches a window, builds the prompt and calls the provider with retries.
///
/// Holds no per-chat state between calls. Store reads finish before the
/// provider is called, so no lock or connection is held across the network.
pub struct SummarizationEngine<P: LlmProvider> {
    messages: MessageStore,
    settings: Arc<ChatSettingsStore>,
    provider: P,
    retry: RetryPolicy,
    request_timeout: Duration,
    cleaner: TextCleaner,
    max_summary_count: usize,
}

impl<P: LlmProvider> SummarizationEngine<P> {
    pub fn new(
        messages: MessageStore,
        settings: Arc<ChatSettingsStore>,
        provider: P,
        config: &SummarizerConfig,
    ) -> Self {
        info!(
            "Summarization engine using {} ({}), max {} messages, {} retries",
            provider.kind(),
            provider.model(),
            config.max_summary_count,
            config.max_retries
        );

        Self {
            messages,
            settings,
            provider,
            retry: config.retry_policy(),
            request_timeout: config.request_timeout,
            cleaner: config.cleaner,
            max_summary_count: config.max_summary_count.max(1),
        }
    }

    pub fn messages(&self) -> &MessageStore {
        &self.messages
    }

    pub fn settings(&self) -> &ChatSettingsStore {
        &self.settings
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    /// Summarize the last `count` messages of a chat.
    pub async fn summarize(
        &self,
        chat_id: i64,
        count: Option<usize>,
        style_override: Option<SummaryStyle>,
    ) -> Result<SummaryResult, SummarizeError> {
        self.summarize_request(SummaryRequest {
            chat_id,
            count,
            style_override,
            timeout: None,
        })
        .await
    }

    /// Like [`summarize_request`](Self::summarize_request), but returns
    /// [`SummarizeError::Cancelled`] as soon as `token` fires.
    ///
    /// A pending provider call or backoff sleep is dropped immediately.
    pub async fn summarize_cancellable(
        &self,
        request: SummaryRequest,
        token: &CancellationToken,
    ) -> Result<SummaryResult, SummarizeError> {
        let chat_id = request.chat_id;
        tokio::select! {
            biased;
            _ = token.cancelled() => {
                info!(chat_id, "Summary request cancelled");
                Err(SummarizeError::Cancelled)
            }
            result = self.summarize_request(request) => result,
        }
    }

    pub async fn summarize_request(
        &self,
        request: SummaryRequest,
    ) -> Result<SummaryResult, SummarizeError> {
        let chat_id = request.chat_id;
        let settings = self.settings.get_settings(chat_id).await?;

        let requested_count = request.count.unwrap_or(settings.default_summary_count);
        let effective_count = requested_count.clamp(1, self.max_summary_count);
        if effective_count != requested_count {
            debug!(
                chat_id,
                "Requested {} messages, using {}", requested_count, effective_count
            );
        }

        let window = self.messages.fetch_recent(chat_id, effective_count).await?;
        if window.is_empty() {
            return Err(SummarizeError::NoMessages { chat_id });
        }

        let style = request.style_override.unwrap_or(settings.style);

        let lines = self.cleaner.clean_messages(&window);
        if lines.is_empty() {
            return Err(SummarizeError::NoMeaningfulMessages {
                chat_id,
                fetched: window.len(),
            });
        }

        let prompt = build_prompt(style, &lines);
        debug!(
            chat_id,
            "Prompt fingerprint {} ({} of {} messages kept)",
            prompt.fingerprint(),
            lines.len(),
            window.len()
        );

        let timeout = request.timeout.unwrap_or(self.request_timeout);
        let (text, attempts) = self.complete_with_retry(prompt.into_request(), timeout).await?;

        info!(
            chat_id,
            "Generated {} summary of {} messages in {} attempt(s)",
            style.as_str(),
            window.len(),
            attempts
        );

        Ok(SummaryResult {
            chat_id,
            text,
            style,
            message_count_used: window.len(),
            requested_count,
            effective_count,
            provider_kind: self.provider.kind(),
            model: self.provider.model().to_string(),
            attempts,
            generated_at: Utc::now(),
        })
    }

    /// Call the provider, retrying retriable failures sequentially.
    async fn complete_with_retry(
        &self,
        request: CompletionRequest,
        timeout: Duration,
    ) -> Result<(String, u32), SummarizeError> {
        let provider = self.provider.kind();
        let max_attempts = self.retry.max_attempts();
        let mut attempt = 0;

        loop {
            attempt += 1;

            let outcome = match tokio::time::timeout(timeout, self.provider.complete(request.clone()))
                .await
            {
                Ok(result) => result,
                Err(_) => Err(ProviderError::Transient(format!(
                    "no response within {:?}",
                    timeout
                ))),
            };

            match outcome {
                Ok(text) => return Ok((text, attempt)),
                Err(error) if error.is_retriable() && attempt < max_attempts => {
                    let delay = self.retry.delay_for(attempt, &error);
                    warn!(
                        "{} attempt {}/{} failed ({}), retrying in {:?}",
                        provider,
                        attempt,
                        max_attempts,
                        error.kind_label(),
                        delay
                    );
                    tokio::time::sleep(delay).await;
                }
                Err(error) => {
                    warn!(
                        "{} attempt {}/{} failed ({}), giving up",
                        provider,
                        attempt,
                        max_attempts,
                        error.kind_label()
                    );
                    return Err(SummarizeError::from_provider(provider, attempt, error));
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_builder() {
        let request = SummaryRequest::new(5)
            .with_count(12)
            .with_style(SummaryStyle::Funny)
            .with_timeout(Duration::from_secs(3));
        assert_eq!(request.chat_id, 5);
        assert_eq!(request.count, Some(12));
        assert_eq!(request.style_override, Some(SummaryStyle::Funny));
        assert_eq!(request.timeout, Some(Duration::from_secs(3)));
    }

    #[test]
    fn test_was_clamped() {
        let mut result = SummaryResult {
            chat_id: 1,
            text: "ok".to_string(),
            style: SummaryStyle::Casual,
            message_count_used: 10,
            requested_count: 10,
            effective_count: 10,
            provider_kind: ProviderKind::Gemini,
            model: "m".to_string(),
            attempts: 1,
            generated_at: Utc::now(),
        };
        assert!(!result.was_clamped());

        result.requested_count = 500;
        assert!(result.was_clamped());
    }
}
