//! Core types and traits shared by the chat summarizer crates.
//!
//! This crate defines:
//!
//! - [`Message`] - A logged chat message, the unit stored by the message log
//! - [`SummaryStyle`] - The closed set of summary tones and their directives
//! - [`LlmProvider`] - The capability every LLM backend implements
//! - [`ProviderError`] - The shared provider failure taxonomy
//! - [`build_prompt`] / [`TextCleaner`] - Deterministic prompt construction
//!
//! # Example
//!
//! ```rust
//! use summary_core::{
//!     async_trait, CompletionRequest, LlmProvider, ProviderError, ProviderKind,
//! };
//!
//! struct FixedProvider;
//!
//! #[async_trait]
//! impl LlmProvider for FixedProvider {
//!     async fn complete(&self, _request: CompletionRequest) -> Result<String, ProviderError> {
//!         Ok("Nothing happened.".to_string())
//!     }
//!
//!     fn kind(&self) -> ProviderKind {
//!         ProviderKind::Gemini
//!     }
//!
//!     fn model(&self) -> &str {
//!         "fixed"
//!     }
//! }
//! ```

mod cleaner;
mod error;
mod message;
mod prompt;
mod provider;
mod style;

pub use cleaner::{CleanedLine, TextCleaner};
pub use error::ProviderError;
pub use message::{MediaKind, Message};
pub use prompt::{build_prompt, format_transcript, hash_prompt, Prompt};
pub use provider::{CompletionRequest, LlmProvider, ProviderKind};
pub use style::{ParseStyleError, SummaryStyle};

// Re-export async_trait for convenience
pub use async_trait::async_trait;
