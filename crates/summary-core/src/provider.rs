//! The provider capability trait.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::ProviderError;

/// The closed set of supported LLM backends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    Gemini,
    OpenAi,
    Anthropic,
}

impl ProviderKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderKind::Gemini => "gemini",
            ProviderKind::OpenAi => "openai",
            ProviderKind::Anthropic => "anthropic",
        }
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProviderKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "gemini" | "google" => Ok(ProviderKind::Gemini),
            "openai" | "open_ai" => Ok(ProviderKind::OpenAi),
            "anthropic" | "claude" => Ok(ProviderKind::Anthropic),
            other => Err(format!("unsupported LLM provider: {}", other)),
        }
    }
}

/// A provider-agnostic completion request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionRequest {
    /// Style directive, sent as the system instruction where supported.
    pub style_directive: String,
    /// The user prompt containing the transcript.
    pub prompt: String,
    /// Model override; the provider's configured model is used when `None`.
    pub model: Option<String>,
}

impl CompletionRequest {
    pub fn new(style_directive: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self {
            style_directive: style_directive.into(),
            prompt: prompt.into(),
            model: None,
        }
    }

    /// Use a specific model for this request.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }
}

/// A text-completion backend.
///
/// Implementations translate a [`CompletionRequest`] into their own wire
/// format and map every failure into [`ProviderError`]. This trait is
/// object-safe and can be used as `Arc<dyn LlmProvider>`.
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Run a single completion. Must not retry internally.
    async fn complete(&self, request: CompletionRequest) -> Result<String, ProviderError>;

    /// Which backend this is.
    fn kind(&self) -> ProviderKind;

    /// The configured default model.
    fn model(&self) -> &str;
}

#[async_trait]
impl<P: LlmProvider + ?Sized> LlmProvider for Arc<P> {
    async fn complete(&self, request: CompletionRequest) -> Result<String, ProviderError> {
        (**self).complete(request).await
    }

    fn kind(&self) -> ProviderKind {
        (**self).kind()
    }

    fn model(&self) -> &str {
        (**self).model()
    }
}
