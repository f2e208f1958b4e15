//! Echo provider - returns the prompt as the completion.

use async_trait::async_trait;
use summary_core::{CompletionRequest, LlmProvider, ProviderError, ProviderKind};

/// A provider that echoes the prompt back as its summary.
///
/// Useful for checking exactly what the engine sent without any network.
#[derive(Debug, Clone)]
pub struct EchoProvider {
    /// Optional prefix to add before the echo.
    prefix: Option<String>,
    kind: ProviderKind,
}

impl Default for EchoProvider {
    fn default() -> Self {
        Self {
            prefix: None,
            kind: ProviderKind::Gemini,
        }
    }
}

impl EchoProvider {
    /// Create a new EchoProvider with no prefix.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a new EchoProvider with a custom prefix.
    ///
    /// # Example
    ///
    /// ```rust
    /// use mock_provider::EchoProvider;
    ///
    /// let provider = EchoProvider::with_prefix("Summary: ");
    /// // Will respond with "Summary: <prompt>"
    /// ```
    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        Self {
            prefix: Some(prefix.into()),
            ..Self::default()
        }
    }

    /// Report a different provider kind.
    pub fn with_kind(mut self, kind: ProviderKind) -> Self {
        self.kind = kind;
        self
    }
}

#[async_trait]
impl LlmProvider for EchoProvider {
    async fn complete(&self, request: CompletionRequest) -> Result<String, ProviderError> {
        Ok(match &self.prefix {
            Some(prefix) => format!("{}{}", prefix, request.prompt),
            None => request.prompt,
        })
    }

    fn kind(&self) -> ProviderKind {
        self.kind
    }

    fn model(&self) -> &str {
        "echo"
    }
}
