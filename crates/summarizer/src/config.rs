//! Runtime settings for the summarization core.

use std::env;
use std::time::Duration;

use summary_core::{SummaryStyle, TextCleaner};
use tracing::warn;

use crate::retry::RetryPolicy;

/// Settings consumed by the stores, the engine and the retention task.
///
/// Built once at startup and passed into constructors; nothing re-reads
/// the environment afterwards.
#[derive(Debug, Clone)]
pub struct SummarizerConfig {
    /// Style used when neither the request nor the chat selects one.
    pub default_style: SummaryStyle,
    /// Window size used when neither the request nor the chat sets one.
    pub default_summary_count: usize,
    /// Upper bound for any window.
    pub max_summary_count: usize,
    /// Messages older than this many days are purged.
    pub retention_days: u64,
    /// Time between retention runs.
    pub cleanup_interval: Duration,
    /// Retries after the first provider attempt.
    pub max_retries: u32,
    /// Backoff before the first retry.
    pub retry_base_delay: Duration,
    /// Longest backoff between attempts.
    pub retry_max_delay: Duration,
    /// Bound on a single provider call.
    pub request_timeout: Duration,
    /// Prompt preprocessing switches.
    pub cleaner: TextCleaner,
}

impl Default for SummarizerConfig {
    fn default() -> Self {
        Self {
            default_style: SummaryStyle::default(),
            default_summary_count: 20,
            max_summary_count: 100,
            retention_days: 30,
            cleanup_interval: Duration::from_secs(24 * 60 * 60),
            max_retries: 2,
            retry_base_delay: Duration::from_millis(500),
            retry_max_delay: Duration::from_secs(8),
            request_timeout: Duration::from_secs(60),
            cleaner: TextCleaner::default(),
        }
    }
}

impl SummarizerConfig {
    /// Load settings from environment variables, keeping defaults for
    /// anything unset or unparsable.
    ///
    /// Environment variables:
    /// - `DEFAULT_STYLE` - professional, funny, executive, technical or casual
    /// - `DEFAULT_SUMMARY_COUNT` - default window size (default: 20)
    /// - `MAX_SUMMARY_COUNT` - largest window (default: 100)
    /// - `MESSAGE_RETENTION_DAYS` - retention period (default: 30)
    /// - `CLEANUP_INTERVAL_HOURS` - retention cadence (default: 24)
    /// - `SUMMARY_MAX_RETRIES` - retries after the first attempt (default: 2)
    /// - `SUMMARY_TIMEOUT_SECS` - per provider call (default: 60)
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(value) = env::var("DEFAULT_STYLE") {
            match value.parse::<SummaryStyle>() {
                Ok(style) => config.default_style = style,
                Err(err) => warn!("Ignoring DEFAULT_STYLE: {}", err),
            }
        }
        if let Some(value) = env_usize("DEFAULT_SUMMARY_COUNT") {
            config.default_summary_count = value;
        }
        if let Some(value) = env_usize("MAX_SUMMARY_COUNT") {
            config.max_summary_count = value;
        }
        if let Some(value) = env_u64("MESSAGE_RETENTION_DAYS") {
            config.retention_days = value;
        }
        if let Some(hours) = env_u64("CLEANUP_INTERVAL_HOURS") {
            config.cleanup_interval = hours_to_duration(hours);
        }
        if let Some(value) = env_u64("SUMMARY_MAX_RETRIES") {
            config.max_retries = value.min(u32::MAX as u64) as u32;
        }
        if let Some(secs) = env_u64("SUMMARY_TIMEOUT_SECS") {
            if secs > 0 {
                config.request_timeout = Duration::from_secs(secs);
            }
        }

        config.normalized()
    }

    /// Repair values that would make the bounds inconsistent.
    pub fn normalized(mut self) -> Self {
        if self.max_summary_count == 0 {
            warn!("MAX_SUMMARY_COUNT must be positive, using 1");
            self.max_summary_count = 1;
        }
        self.default_summary_count = self.clamp_count(self.default_summary_count);
        if self.cleanup_interval.is_zero() {
            self.cleanup_interval = Self::default().cleanup_interval;
        }
        self
    }

    /// Clamp a window size into `[1, max_summary_count]`.
    pub fn clamp_count(&self, count: usize) -> usize {
        count.clamp(1, self.max_summary_count.max(1))
    }

    /// Retention period as a chrono duration.
    pub fn retention_period(&self) -> chrono::Duration {
        chrono::Duration::days(self.retention_days.min(i64::MAX as u64 / 86_400) as i64)
    }

    /// Backoff policy for provider retries.
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(self.max_retries, self.retry_base_delay, self.retry_max_delay)
    }
}

fn env_usize(key: &str) -> Option<usize> {
    env::var(key).ok()?.trim().parse().ok()
}

fn env_u64(key: &str) -> Option<u64> {
    env::var(key).ok()?.trim().parse().ok()
}

fn hours_to_duration(hours: u64) -> Duration {
    Duration::from_secs(hours.saturating_mul(60 * 60))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = SummarizerConfig::default();
        assert_eq!(config.default_style, SummaryStyle::Professional);
        assert_eq!(config.default_summary_count, 20);
        assert_eq!(config.max_summary_count, 100);
        assert_eq!(config.retention_period(), chrono::Duration::days(30));
        assert_eq!(config.cleanup_interval, Duration::from_secs(86_400));
        assert_eq!(config.max_retries, 2);
    }

    #[test]
    fn test_clamp_count() {
        let config = SummarizerConfig::default();
        assert_eq!(config.clamp_count(0), 1);
        assert_eq!(config.clamp_count(50), 50);
        assert_eq!(config.clamp_count(500), 100);
    }

    #[test]
    fn test_normalized_repairs_bounds() {
        let config = SummarizerConfig {
            default_summary_count: 250,
            max_summary_count: 0,
            cleanup_interval: Duration::ZERO,
            ..SummarizerConfig::default()
        }
        .normalized();

        assert_eq!(config.max_summary_count, 1);
        assert_eq!(config.default_summary_count, 1);
        assert_eq!(config.cleanup_interval, Duration::from_secs(86_400));
    }

    // Env vars are process-global, so all scenarios run under one lock.
    #[test]
    fn test_from_env_scenarios() {
        use std::sync::Mutex;
        static ENV_LOCK: Mutex<()> = Mutex::new(());
        let _guard = ENV_LOCK.lock().unwrap();

        const VARS: [&str; 7] = [
            "DEFAULT_STYLE",
            "DEFAULT_SUMMARY_COUNT",
            "MAX_SUMMARY_COUNT",
            "MESSAGE_RETENTION_DAYS",
            "CLEANUP_INTERVAL_HOURS",
            "SUMMARY_MAX_RETRIES",
            "SUMMARY_TIMEOUT_SECS",
        ];
        let clear = || {
            for var in VARS {
                std::env::remove_var(var);
            }
        };

        clear();
        let config = SummarizerConfig::from_env();
        assert_eq!(config.default_summary_count, 20);

        std::env::set_var("DEFAULT_STYLE", "Technical");
        std::env::set_var("DEFAULT_SUMMARY_COUNT", "40");
        std::env::set_var("MAX_SUMMARY_COUNT", "50");
        std::env::set_var("MESSAGE_RETENTION_DAYS", "7");
        std::env::set_var("CLEANUP_INTERVAL_HOURS", "6");
        std::env::set_var("SUMMARY_MAX_RETRIES", "4");
        std::env::set_var("SUMMARY_TIMEOUT_SECS", "15");
        let config = SummarizerConfig::from_env();
        assert_eq!(config.default_style, SummaryStyle::Technical);
        assert_eq!(config.default_summary_count, 40);
        assert_eq!(config.max_summary_count, 50);
        assert_eq!(config.retention_days, 7);
        assert_eq!(config.cleanup_interval, Duration::from_secs(6 * 3600));
        assert_eq!(config.max_retries, 4);
        assert_eq!(config.request_timeout, Duration::from_secs(15));

        clear();
        std::env::set_var("DEFAULT_STYLE", "poetic");
        std::env::set_var("DEFAULT_SUMMARY_COUNT", "many");
        let config = SummarizerConfig::from_env();
        assert_eq!(config.default_style, SummaryStyle::Professional);
        assert_eq!(config.default_summary_count, 20);

        clear();
    }
}
