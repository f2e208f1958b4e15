//! Deployment configuration: environment variables or a BYOK JSON file.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use llm_providers::{ConfigError, ProviderConfig};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use summarizer::SummarizerConfig;
use summary_core::{ProviderKind, SummaryStyle};
use thiserror::Error;

/// Default SQLite location.
pub const DEFAULT_DATABASE_URL: &str = "sqlite:data/messages.db?mode=rwc";

/// Errors raised while loading deployment configuration.
#[derive(Debug, Error)]
pub enum AppConfigError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid config file {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("invalid config value: {0}")]
    Invalid(String),
}

/// Everything the binary needs, resolved once at startup.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub summarizer: SummarizerConfig,
    pub database_url: String,
    provider: ProviderSource,
}

/// Where provider credentials come from.
///
/// Resolved lazily so commands that never call a provider run without keys.
#[derive(Debug, Clone)]
enum ProviderSource {
    Env,
    File {
        kind: ProviderKind,
        api_keys: ApiKeys,
        model: Option<String>,
    },
}

/// Per-provider keys from the config file. Redacted in `Debug` output.
#[derive(Debug, Clone, Default)]
struct ApiKeys {
    gemini: Option<SecretString>,
    openai: Option<SecretString>,
    anthropic: Option<SecretString>,
}

impl ApiKeys {
    fn get(&self, kind: ProviderKind) -> Option<&SecretString> {
        match kind {
            ProviderKind::Gemini => self.gemini.as_ref(),
            ProviderKind::OpenAi => self.openai.as_ref(),
            ProviderKind::Anthropic => self.anthropic.as_ref(),
        }
    }
}

/// Keys as they appear on disk; converted to [`ApiKeys`] right after parsing.
#[derive(Default, Deserialize)]
struct RawApiKeys {
    #[serde(default)]
    gemini: Option<String>,
    #[serde(default)]
    openai: Option<String>,
    #[serde(default)]
    anthropic: Option<String>,
}

impl From<RawApiKeys> for ApiKeys {
    fn from(raw: RawApiKeys) -> Self {
        Self {
            gemini: raw.gemini.map(SecretString::from),
            openai: raw.openai.map(SecretString::from),
            anthropic: raw.anthropic.map(SecretString::from),
        }
    }
}

#[derive(Deserialize)]
struct ConfigFile {
    #[serde(default = "default_provider")]
    llm_provider: String,
    #[serde(default)]
    model: Option<String>,
    #[serde(default)]
    api_keys: RawApiKeys,
    #[serde(default)]
    bot: BotSection,
    #[serde(default)]
    storage: StorageSection,
}

#[derive(Debug, Default, Deserialize)]
struct BotSection {
    default_summary_count: Option<usize>,
    max_summary_count: Option<usize>,
    default_style: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct StorageSection {
    message_retention_days: Option<u64>,
    cleanup_interval_hours: Option<u64>,
    database_path: Option<String>,
}

fn default_provider() -> String {
    "gemini".to_string()
}

impl AppConfig {
    /// Hosted mode: `.env` plus process environment.
    pub fn from_env() -> Self {
        let database_url = env::var("DATABASE_URL")
            .ok()
            .filter(|url| !url.trim().is_empty())
            .map(|url| database_url_for(&url))
            .unwrap_or_else(|| DEFAULT_DATABASE_URL.to_string());

        Self {
            summarizer: SummarizerConfig::from_env(),
            database_url,
            provider: ProviderSource::Env,
        }
    }

    /// BYOK mode: a JSON file with provider keys and bot/storage sections.
    pub fn from_file(path: &Path) -> Result<Self, AppConfigError> {
        let raw = fs::read_to_string(path).map_err(|source| AppConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let file: ConfigFile =
            serde_json::from_str(&raw).map_err(|source| AppConfigError::Parse {
                path: path.to_path_buf(),
                source,
            })?;

        let kind = file
            .llm_provider
            .parse::<ProviderKind>()
            .map_err(AppConfigError::Invalid)?;

        let mut summarizer = SummarizerConfig::default();
        if let Some(style) = file.bot.default_style {
            summarizer.default_style = style
                .parse::<SummaryStyle>()
                .map_err(|e| AppConfigError::Invalid(e.to_string()))?;
        }
        if let Some(count) = file.bot.default_summary_count {
            summarizer.default_summary_count = count;
        }
        if let Some(max) = file.bot.max_summary_count {
            summarizer.max_summary_count = max;
        }
        if let Some(days) = file.storage.message_retention_days {
            summarizer.retention_days = days;
        }
        if let Some(hours) = file.storage.cleanup_interval_hours {
            summarizer.cleanup_interval = Duration::from_secs(hours.saturating_mul(3600));
        }

        let database_url = file
            .storage
            .database_path
            .as_deref()
            .map(database_url_for)
            .unwrap_or_else(|| DEFAULT_DATABASE_URL.to_string());

        Ok(Self {
            summarizer: summarizer.normalized(),
            database_url,
            provider: ProviderSource::File {
                kind,
                api_keys: file.api_keys.into(),
                model: file.model,
            },
        })
    }

    /// Provider credentials for the configured backend.
    ///
    /// The engine's per-attempt timeout (`SUMMARY_TIMEOUT_SECS`) is the one
    /// that bounds a call. The HTTP client timeout keeps `LLM_TIMEOUT_SECS`
    /// when that is larger and is raised to the engine timeout otherwise, so
    /// it never cuts an attempt short.
    pub fn provider_config(&self) -> Result<ProviderConfig, ConfigError> {
        let mut config = match &self.provider {
            ProviderSource::Env => ProviderConfig::from_env()?,
            ProviderSource::File {
                kind,
                api_keys,
                model,
            } => {
                let key = api_keys
                    .get(*kind)
                    .filter(|key| !key.expose_secret().trim().is_empty())
                    .ok_or_else(|| {
                        ConfigError::Missing(format!("api_keys.{} not set", kind.as_str()))
                    })?;
                let mut config = ProviderConfig::new(*kind, key.expose_secret());
                if let Some(model) = model {
                    config.model = model.clone();
                }
                config
            }
        };
        config.request_timeout = config.request_timeout.max(self.summarizer.request_timeout);
        Ok(config)
    }

    /// Description of the credential source for startup logs.
    pub fn provider_source(&self) -> String {
        match &self.provider {
            ProviderSource::Env => "environment".to_string(),
            ProviderSource::File { kind, .. } => format!("config file ({})", kind),
        }
    }
}

/// Accept either a full sqlx URL or a bare file path.
pub fn database_url_for(value: &str) -> String {
    let value = value.trim();
    if value.starts_with("sqlite:") {
        value.to_string()
    } else {
        format!("sqlite:{}?mode=rwc", value)
    }
}

/// Filesystem path behind a SQLite URL, if it names a file.
pub fn database_file(url: &str) -> Option<PathBuf> {
    let rest = url.strip_prefix("sqlite://").or_else(|| url.strip_prefix("sqlite:"))?;
    let path = rest.split('?').next().unwrap_or_default();
    if path.is_empty() || path == ":memory:" {
        None
    } else {
        Some(PathBuf::from(path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_config(json: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(json.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_database_url_for() {
        assert_eq!(database_url_for("data/messages.db"), "sqlite:data/messages.db?mode=rwc");
        assert_eq!(database_url_for("sqlite::memory:"), "sqlite::memory:");
    }

    #[test]
    fn test_database_file() {
        assert_eq!(
            database_file("sqlite:data/messages.db?mode=rwc"),
            Some(PathBuf::from("data/messages.db"))
        );
        assert_eq!(database_file("sqlite::memory:"), None);
    }

    #[test]
    fn test_from_file() {
        let file = write_config(
            r#"{
                "mode": "byok",
                "llm_provider": "anthropic",
                "api_keys": { "anthropic": "sk-ant-test", "openai": null },
                "bot": { "default_summary_count": 15, "max_summary_count": 60, "default_style": "Executive" },
                "storage": { "message_retention_days": 7, "cleanup_interval_hours": 12, "database_path": "chats.db" }
            }"#,
        );

        let config = AppConfig::from_file(file.path()).unwrap();
        assert_eq!(config.summarizer.default_summary_count, 15);
        assert_eq!(config.summarizer.max_summary_count, 60);
        assert_eq!(config.summarizer.default_style, SummaryStyle::Executive);
        assert_eq!(config.summarizer.retention_days, 7);
        assert_eq!(config.summarizer.cleanup_interval, Duration::from_secs(12 * 3600));
        assert_eq!(config.database_url, "sqlite:chats.db?mode=rwc");

        let provider = config.provider_config().unwrap();
        assert_eq!(provider.kind, ProviderKind::Anthropic);
        assert_eq!(provider.model, "claude-3-5-haiku-20241022");
        assert!(!format!("{:?}", provider).contains("sk-ant-test"));
    }

    #[test]
    fn test_from_file_missing_key() {
        let file = write_config(r#"{ "llm_provider": "openai", "api_keys": { "gemini": "g" } }"#);
        let config = AppConfig::from_file(file.path()).unwrap();
        assert!(matches!(
            config.provider_config(),
            Err(ConfigError::Missing(_))
        ));
    }

    #[test]
    fn test_debug_redacts_file_keys() {
        let file = write_config(r#"{ "llm_provider": "openai", "api_keys": { "openai": "sk-do-not-print" } }"#);
        let config = AppConfig::from_file(file.path()).unwrap();

        let debug = format!("{:?}", config);
        assert!(!debug.contains("sk-do-not-print"));
        assert!(config.provider_config().is_ok());
    }

    #[test]
    fn test_provider_timeout_covers_engine_timeout() {
        let file = write_config(r#"{ "llm_provider": "gemini", "api_keys": { "gemini": "g" } }"#);
        let mut config = AppConfig::from_file(file.path()).unwrap();

        config.summarizer.request_timeout = Duration::from_secs(120);
        assert_eq!(
            config.provider_config().unwrap().request_timeout,
            Duration::from_secs(120)
        );

        config.summarizer.request_timeout = Duration::from_secs(5);
        assert_eq!(
            config.provider_config().unwrap().request_timeout,
            llm_providers::DEFAULT_REQUEST_TIMEOUT
        );
    }

    #[test]
    fn test_from_file_rejects_unknown_provider() {
        let file = write_config(r#"{ "llm_provider": "mistral" }"#);
        assert!(matches!(
            AppConfig::from_file(file.path()),
            Err(AppConfigError::Invalid(_))
        ));
    }
}
