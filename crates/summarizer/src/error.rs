//! Error types for summarization.

use database::DatabaseError;
use summary_core::{ProviderError, ProviderKind};
use thiserror::Error;

/// Outcomes of a summary request other than success.
///
/// Rate limits and transient provider failures are retried inside the
/// engine and only surface as [`SummarizeError::ProviderUnavailable`] once
/// the retry budget is spent. Out-of-range counts are clamped, not raised.
#[derive(Debug, Error)]
pub enum SummarizeError {
    /// The chat has no stored messages.
    #[error("no messages stored for chat {chat_id}")]
    NoMessages { chat_id: i64 },

    /// Every fetched message was dropped by the text cleaner.
    #[error("none of the last {fetched} messages in chat {chat_id} had summarizable content")]
    NoMeaningfulMessages { chat_id: i64, fetched: usize },

    /// The provider rejected the configured API key.
    #[error("{provider} rejected the configured credentials")]
    ProviderInvalidCredentials { provider: ProviderKind },

    /// The provider refused the content.
    #[error("{provider} rejected the request: {reason}")]
    ProviderContentRejected {
        provider: ProviderKind,
        reason: String,
    },

    /// Retries were exhausted on retriable failures.
    #[error("{provider} unavailable after {attempts} attempts: {last}")]
    ProviderUnavailable {
        provider: ProviderKind,
        attempts: u32,
        last: ProviderError,
    },

    /// The message log or settings store could not be reached.
    #[error("storage unavailable: {0}")]
    StorageUnavailable(#[from] DatabaseError),

    /// The caller cancelled the request.
    #[error("summary request cancelled")]
    Cancelled,
}

impl SummarizeError {
    /// Map a provider failure that will not be retried.
    pub(crate) fn from_provider(provider: ProviderKind, attempts: u32, error: ProviderError) -> Self {
        match error {
            ProviderError::InvalidCredentials => Self::ProviderInvalidCredentials { provider },
            ProviderError::ContentRejected(reason) => {
                Self::ProviderContentRejected { provider, reason }
            }
            last => Self::ProviderUnavailable {
                provider,
                attempts,
                last,
            },
        }
    }

    /// Whether an operator should look at this.
    ///
    /// Empty windows and cancellation are normal outcomes.
    pub fn is_fault(&self) -> bool {
        !matches!(
            self,
            Self::NoMessages { .. } | Self::NoMeaningfulMessages { .. } | Self::Cancelled
        )
    }

    /// Text safe to show to chat members.
    ///
    /// Never includes credentials, provider names or internal error text.
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::NoMessages { .. } => {
                "📭 No messages found to summarize. I only started logging messages \
                 after being added to this chat."
            }
            Self::NoMeaningfulMessages { .. } => {
                "📭 No meaningful messages found to summarize (only system messages or media)."
            }
            Self::ProviderContentRejected { .. } => {
                "⚠️ The summary service declined to summarize these messages. \
                 Try a different range or style."
            }
            Self::Cancelled => "Summary cancelled.",
            Self::ProviderInvalidCredentials { .. }
            | Self::ProviderUnavailable { .. }
            | Self::StorageUnavailable(_) => {
                "❌ Couldn't generate a summary right now. Please try again later."
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fault_classification() {
        assert!(!SummarizeError::NoMessages { chat_id: 1 }.is_fault());
        assert!(!SummarizeError::NoMeaningfulMessages { chat_id: 1, fetched: 3 }.is_fault());
        assert!(!SummarizeError::Cancelled.is_fault());
        assert!(SummarizeError::ProviderInvalidCredentials {
            provider: ProviderKind::OpenAi
        }
        .is_fault());
    }

    #[tokio::test]
    async fn test_closed_pool_is_storage_fault() {
        let db = database::Database::connect_with_pool_size("sqlite::memory:", 1)
            .await
            .unwrap();
        db.close().await;

        let err: SummarizeError = database::message::count_messages(db.pool(), 1)
            .await
            .unwrap_err()
            .into();
        assert!(matches!(err, SummarizeError::StorageUnavailable(_)));
        assert!(err.is_fault());
        assert_eq!(
            err.user_message(),
            "❌ Couldn't generate a summary right now. Please try again later."
        );
    }

    #[test]
    fn test_from_provider() {
        assert!(matches!(
            SummarizeError::from_provider(ProviderKind::Gemini, 1, ProviderError::InvalidCredentials),
            SummarizeError::ProviderInvalidCredentials { provider: ProviderKind::Gemini }
        ));
        assert!(matches!(
            SummarizeError::from_provider(
                ProviderKind::Gemini,
                1,
                ProviderError::ContentRejected("blocked".into())
            ),
            SummarizeError::ProviderContentRejected { reason, .. } if reason == "blocked"
        ));
        assert!(matches!(
            SummarizeError::from_provider(
                ProviderKind::Anthropic,
                3,
                ProviderError::Transient("502".into())
            ),
            SummarizeError::ProviderUnavailable { attempts: 3, .. }
        ));
    }

    #[test]
    fn test_user_message_hides_internals() {
        let err = SummarizeError::ProviderUnavailable {
            provider: ProviderKind::OpenAi,
            attempts: 3,
            last: ProviderError::Transient("upstream 10.0.0.7 refused sk-secret".into()),
        };
        let text = err.user_message();
        assert!(text.contains("try again later"));
        assert!(!text.contains("sk-secret"));
        assert!(!text.contains("openai"));
    }
}
