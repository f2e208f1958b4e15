//! Mock LLM providers for summarizer tests.
//!
//! This crate provides mock implementations of the `LlmProvider` trait:
//! - `EchoProvider` - Returns the prompt it was given
//! - `ScriptedProvider` - Replays a queue of canned results and records calls
//! - `DelayedProvider` - Wraps another provider with artificial latency
//!
//! For real backends, use the `llm-providers` crate instead.
//!
//! # Example
//!
//! ```rust
//! use mock_provider::{CompletionRequest, LlmProvider, ProviderError, ScriptedProvider};
//!
//! #[tokio::main]
//! async fn main() {
//!     let provider = ScriptedProvider::new()
//!         .then_err(ProviderError::Transient("503".into()))
//!         .then_ok("Everyone agreed on Friday.");
//!
//!     let request = CompletionRequest::new("Be brief.", "alice: friday?");
//!     assert!(provider.complete(request.clone()).await.is_err());
//!     assert_eq!(provider.complete(request).await.unwrap(), "Everyone agreed on Friday.");
//!     assert_eq!(provider.call_count(), 2);
//! }
//! ```

mod delayed;
mod echo;
mod scripted;

// Re-export summary-core types for convenience
pub use summary_core::{async_trait, CompletionRequest, LlmProvider, ProviderError, ProviderKind};

// Export mock implementations
pub use delayed::DelayedProvider;
pub use echo::EchoProvider;
pub use scripted::ScriptedProvider;
