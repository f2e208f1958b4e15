//! `chat-summarizer`: operator CLI for the message log and summaries.

mod config;
mod ingest;

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use database::Database;
use llm_providers::Provider;
use summarizer::formatting::{
    format_statistics, format_style_changed, format_style_menu, format_summary,
};
use summarizer::{
    CancellationToken, ChatSettingsStore, MessageStore, RetentionScheduler, SummarizationEngine,
    SummaryRequest, SummaryStyle,
};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use crate::config::{database_file, AppConfig};

#[derive(Debug, Parser)]
#[command(name = "chat-summarizer")]
#[command(about = "Log group chat messages and summarize them with an LLM")]
struct Args {
    /// BYOK JSON config file. Without it, .env and environment variables are used.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// SQLite URL or path, overriding the configured database.
    #[arg(long, global = true)]
    database: Option<String>,

    /// Emit logs as JSON
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Append messages from a JSON-lines file
    Ingest {
        #[arg(long)]
        file: PathBuf,
    },

    /// Summarize the most recent messages of a chat
    Summarize {
        #[arg(long)]
        chat: i64,

        /// Number of messages (defaults to the chat or global default)
        #[arg(long)]
        count: Option<usize>,

        /// Style for this summary only
        #[arg(long)]
        style: Option<SummaryStyle>,
    },

    /// Show or change a chat's summary style
    Style {
        #[arg(long)]
        chat: i64,

        #[arg(long)]
        set: Option<SummaryStyle>,
    },

    /// Show or change a chat's default summary count
    Count {
        #[arg(long)]
        chat: i64,

        #[arg(long, conflicts_with = "clear")]
        set: Option<usize>,

        /// Return to the global default
        #[arg(long)]
        clear: bool,
    },

    /// Show message statistics for a chat
    Stats {
        #[arg(long)]
        chat: i64,
    },

    /// Delete messages past the retention period once
    Purge,

    /// Run the retention scheduler until Ctrl-C
    Serve,
}

fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load .env file if present
    let _ = dotenvy::dotenv();

    let args = Args::parse();
    init_tracing(args.log_json);

    let mut app = match &args.config {
        Some(path) => AppConfig::from_file(path)?,
        None => AppConfig::from_env(),
    };
    if let Some(database) = &args.database {
        app.database_url = config::database_url_for(database);
    }

    if let Some(path) = database_file(&app.database_url) {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
    }

    let db = Database::connect(&app.database_url).await?;
    db.migrate().await?;

    let config = app.summarizer.clone();
    let messages = MessageStore::new(db.clone(), config.max_summary_count);

    match args.command {
        Command::Ingest { file } => {
            let report = ingest::ingest_file(&messages, &file).await?;
            println!(
                "Ingested {} new messages ({} duplicates, {} invalid lines)",
                report.inserted, report.duplicates, report.invalid
            );
        }

        Command::Summarize { chat, count, style } => {
            info!("Using provider credentials from {}", app.provider_source());
            let provider = Provider::new(app.provider_config()?)?;
            let settings = Arc::new(ChatSettingsStore::new(db.clone(), &config));
            let engine = SummarizationEngine::new(messages, settings, provider, &config);

            let mut request = SummaryRequest::new(chat);
            request.count = count;
            request.style_override = style;

            let token = CancellationToken::new();
            let on_interrupt = token.clone();
            tokio::spawn(async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    on_interrupt.cancel();
                }
            });

            match engine.summarize_cancellable(request, &token).await {
                Ok(result) => println!("{}", format_summary(&result)),
                Err(err) => {
                    if err.is_fault() {
                        error!("Summary for chat {} failed: {}", chat, err);
                    }
                    println!("{}", err.user_message());
                }
            }
        }

        Command::Style { chat, set } => {
            let settings = ChatSettingsStore::new(db.clone(), &config);
            match set {
                Some(style) => {
                    settings.set_style(chat, style).await?;
                    println!("{}", format_style_changed(style));
                }
                None => println!("{}", format_style_menu(settings.get_style(chat).await?)),
            }
        }

        Command::Count { chat, set, clear } => {
            let settings = ChatSettingsStore::new(db.clone(), &config);
            if clear {
                settings.set_default_count(chat, None).await?;
            } else if let Some(count) = set {
                if count == 0 || count > config.max_summary_count {
                    warn!(
                        "Default count {} is outside 1..={}, it will be clamped",
                        count, config.max_summary_count
                    );
                }
                settings.set_default_count(chat, Some(count)).await?;
            }
            println!(
                "Default summary count for chat {}: {}",
                chat,
                settings.get_default_count(chat).await?
            );
        }

        Command::Stats { chat } => {
            let stats = messages.statistics(chat).await?;
            println!("{}", format_statistics(&stats, config.retention_days));
        }

        Command::Purge => {
            let deleted = RetentionScheduler::new(messages, &config).run_once().await?;
            println!("Purged {} expired messages", deleted);
        }

        Command::Serve => {
            let shutdown = CancellationToken::new();
            let handle = RetentionScheduler::new(messages, &config).spawn(shutdown.clone());

            info!(
                "Retention service running: {} day retention, every {:?}",
                config.retention_days, config.cleanup_interval
            );

            tokio::signal::ctrl_c().await?;
            info!("Shutting down");
            shutdown.cancel();
            handle.await?;
        }
    }

    db.close().await;
    Ok(())
}
