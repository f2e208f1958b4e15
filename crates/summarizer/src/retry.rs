//! Backoff policy for provider retries.

use std::time::Duration;

use summary_core::ProviderError;

/// Bounded exponential backoff.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Retries after the first attempt.
    pub max_retries: u32,
    /// Delay before the first retry.
    pub base_delay: Duration,
    /// Cap on any single delay.
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(2, Duration::from_millis(500), Duration::from_secs(8))
    }
}

impl RetryPolicy {
    pub fn new(max_retries: u32, base_delay: Duration, max_delay: Duration) -> Self {
        Self {
            max_retries,
            base_delay,
            max_delay,
        }
    }

    /// A policy that never retries.
    pub fn none() -> Self {
        Self::new(0, Duration::ZERO, Duration::ZERO)
    }

    /// Total attempts including the first.
    pub fn max_attempts(&self) -> u32 {
        self.max_retries.saturating_add(1)
    }

    /// Delay before retry number `retry` (1-based).
    ///
    /// `min(base * 2^(retry-1), max)`, raised to a provider's `Retry-After`
    /// when one was given, still capped by `max`.
    pub fn delay_for(&self, retry: u32, error: &ProviderError) -> Duration {
        let exponent = retry.saturating_sub(1).min(31);
        let backoff = self
            .base_delay
            .saturating_mul(1u32 << exponent)
            .min(self.max_delay);

        match error.retry_after() {
            Some(hint) => backoff.max(hint).min(self.max_delay),
            None => backoff,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn transient() -> ProviderError {
        ProviderError::Transient("503".to_string())
    }

    #[test]
    fn test_exponential_growth_and_cap() {
        let policy = RetryPolicy::new(6, Duration::from_millis(500), Duration::from_secs(3));
        assert_eq!(policy.delay_for(1, &transient()), Duration::from_millis(500));
        assert_eq!(policy.delay_for(2, &transient()), Duration::from_millis(1000));
        assert_eq!(policy.delay_for(3, &transient()), Duration::from_millis(2000));
        assert_eq!(policy.delay_for(4, &transient()), Duration::from_secs(3));
        assert_eq!(policy.delay_for(60, &transient()), Duration::from_secs(3));
    }

    #[test]
    fn test_retry_after_raises_delay() {
        let policy = RetryPolicy::new(2, Duration::from_millis(500), Duration::from_secs(8));
        let limited = ProviderError::RateLimited {
            retry_after: Some(Duration::from_secs(2)),
        };
        assert_eq!(policy.delay_for(1, &limited), Duration::from_secs(2));

        let huge = ProviderError::RateLimited {
            retry_after: Some(Duration::from_secs(120)),
        };
        assert_eq!(policy.delay_for(1, &huge), Duration::from_secs(8));
    }

    #[test]
    fn test_attempts() {
        assert_eq!(RetryPolicy::default().max_attempts(), 3);
        assert_eq!(RetryPolicy::none().max_attempts(), 1);
    }
}
