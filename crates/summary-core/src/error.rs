//! Error types for provider calls.

use std::time::Duration;

use thiserror::Error;

/// The shared failure taxonomy every provider maps its errors into.
///
/// Provider-specific HTTP statuses, SDK errors and response bodies never
/// cross the provider boundary; callers only ever see these four kinds.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProviderError {
    /// The provider throttled the request. Retriable after backoff.
    #[error("rate limited (retry after {retry_after:?})")]
    RateLimited { retry_after: Option<Duration> },

    /// The API key, model or endpoint was rejected. Fatal until the
    /// configuration is fixed.
    #[error("invalid credentials")]
    InvalidCredentials,

    /// A network, timeout or server-side failure. Retriable.
    #[error("transient provider failure: {0}")]
    Transient(String),

    /// The provider refused the content or the request. Fatal.
    #[error("content rejected: {0}")]
    ContentRejected(String),
}

impl ProviderError {
    /// Whether the failure may succeed if the same request is sent again.
    pub fn is_retriable(&self) -> bool {
        matches!(
            self,
            ProviderError::RateLimited { .. } | ProviderError::Transient(_)
        )
    }

    /// Provider-requested minimum wait before the next attempt, if any.
    pub fn retry_after(&self) -> Option<Duration> {
        match self {
            ProviderError::RateLimited { retry_after } => *retry_after,
            _ => None,
        }
    }

    /// Short stable label for logs and metrics.
    pub fn kind_label(&self) -> &'static str {
        match self {
            ProviderError::RateLimited { .. } => "rate_limited",
            ProviderError::InvalidCredentials => "invalid_credentials",
            ProviderError::Transient(_) => "transient",
            ProviderError::ContentRejected(_) => "content_rejected",
        }
    }
}
