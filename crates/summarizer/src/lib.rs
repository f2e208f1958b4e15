//! Message retention and summarization for group chats.
//!
//! This crate ties the message log, per-chat settings and an LLM provider
//! together:
//!
//! - [`MessageStore`] - append-only log with bounded retrieval and expiry
//! - [`ChatSettingsStore`] - per-chat style and default window size
//! - [`SummarizationEngine`] - fetch, clean, prompt and call with retries
//! - [`RetentionScheduler`] - background purge of expired messages
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use database::Database;
//! use mock_provider::EchoProvider;
//! use summarizer::{ChatSettingsStore, MessageStore, SummarizationEngine, SummarizerConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = SummarizerConfig::from_env();
//!     let db = Database::connect("sqlite:data/messages.db?mode=rwc").await?;
//!     db.migrate().await?;
//!
//!     let messages = MessageStore::new(db.clone(), config.max_summary_count);
//!     let settings = Arc::new(ChatSettingsStore::new(db, &config));
//!     let engine = SummarizationEngine::new(messages, settings, EchoProvider::new(), &config);
//!
//!     match engine.summarize(-1001234, Some(20), None).await {
//!         Ok(result) => println!("{}", summarizer::formatting::format_summary(&result)),
//!         Err(err) => println!("{}", err.user_message()),
//!     }
//!     Ok(())
//! }
//! ```

pub mod formatting;

mod config;
mod engine;
mod error;
mod message_store;
mod retention;
mod retry;
mod settings;

pub use config::SummarizerConfig;
pub use engine::{SummarizationEngine, SummaryRequest, SummaryResult};
pub use error::SummarizeError;
pub use message_store::{ChatStatistics, MessageStore};
pub use retention::RetentionScheduler;
pub use retry::RetryPolicy;
pub use settings::{ChatSettings, ChatSettingsStore};

// Re-export core types callers need alongside the engine
pub use summary_core::{
    LlmProvider, MediaKind, Message, ProviderError, ProviderKind, SummaryStyle, TextCleaner,
};
pub use tokio_util::sync::CancellationToken;
