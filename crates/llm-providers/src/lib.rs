//! LLM provider adapters for the chat summarizer.
//!
//! Each supported backend has its own adapter that translates the
//! provider-agnostic [`CompletionRequest`] into the backend's wire format
//! and maps every failure into the shared [`ProviderError`] taxonomy:
//!
//! - [`GeminiProvider`] - Google Gemini `generateContent`
//! - [`OpenAiProvider`] - OpenAI chat completions
//! - [`AnthropicProvider`] - Anthropic Messages API
//!
//! [`Provider`] is the closed set of the three, selected from a
//! [`ProviderConfig`] at startup.
//!
//! # Example
//!
//! ```rust,no_run
//! use llm_providers::{Provider, ProviderConfig};
//! use summary_core::{CompletionRequest, LlmProvider};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ProviderConfig::from_env()?;
//!     let provider = Provider::new(config)?;
//!
//!     let request = CompletionRequest::new("Be brief.", "alice: lunch at noon?\nbob: yes");
//!     let text = provider.complete(request).await?;
//!     println!("{}", text);
//!     Ok(())
//! }
//! ```

mod anthropic;
mod config;
mod error;
mod gemini;
mod openai;
mod provider;

pub use anthropic::AnthropicProvider;
pub use config::{api_key_var, ConfigError, ProviderConfig, ProviderConfigBuilder, DEFAULT_REQUEST_TIMEOUT};
pub use gemini::GeminiProvider;
pub use openai::OpenAiProvider;
pub use provider::Provider;

// Re-export summary-core types for convenience
pub use summary_core::{CompletionRequest, LlmProvider, ProviderError, ProviderKind};
