//! Delayed provider - wraps another provider with artificial latency.

use std::time::Duration;

use async_trait::async_trait;
use summary_core::{CompletionRequest, LlmProvider, ProviderError, ProviderKind};
use tokio::time::sleep;

/// A provider that wraps another provider and adds artificial delay.
///
/// Useful for testing timeout and cancellation handling.
pub struct DelayedProvider<P: LlmProvider> {
    inner: P,
    delay: Duration,
}

impl<P: LlmProvider> DelayedProvider<P> {
    /// Create a new DelayedProvider wrapping the given provider.
    pub fn new(inner: P, delay: Duration) -> Self {
        Self { inner, delay }
    }

    /// Create a provider with a delay in milliseconds.
    pub fn with_millis(inner: P, millis: u64) -> Self {
        Self::new(inner, Duration::from_millis(millis))
    }

    /// Create a provider with a delay in seconds.
    pub fn with_secs(inner: P, secs: u64) -> Self {
        Self::new(inner, Duration::from_secs(secs))
    }
}

#[async_trait]
impl<P: LlmProvider> LlmProvider for DelayedProvider<P> {
    async fn complete(&self, request: CompletionRequest) -> Result<String, ProviderError> {
        sleep(self.delay).await;
        self.inner.complete(request).await
    }

    fn kind(&self) -> ProviderKind {
        self.inner.kind()
    }

    fn model(&self) -> &str {
        self.inner.model()
    }
}
