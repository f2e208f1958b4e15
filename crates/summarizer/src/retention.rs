//! Periodic expiry of old messages.

use std::time::Duration;

use chrono::Utc;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

use crate::config::SummarizerConfig;
use crate::message_store::MessageStore;
use crate::SummarizeError;

/// Purges messages older than the retention period on a fixed cadence.
#[derive(Debug, Clone)]
pub struct RetentionScheduler {
    store: MessageStore,
    retention: chrono::Duration,
    interval: Duration,
}

impl RetentionScheduler {
    pub fn new(store: MessageStore, config: &SummarizerConfig) -> Self {
        Self {
            store,
            retention: config.retention_period(),
            interval: config.cleanup_interval,
        }
    }

    /// Set the time between runs.
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// Run a single purge. Returns the number of messages deleted.
    pub async fn run_once(&self) -> Result<u64, SummarizeError> {
        let cutoff = Utc::now() - self.retention;
        let deleted = self.store.purge_older_than(cutoff).await?;

        if deleted > 0 {
            info!("Retention purged {} messages older than {}", deleted, cutoff);
        } else {
            debug!("Retention run found nothing older than {}", cutoff);
        }
        Ok(deleted)
    }

    /// Run the purge loop until `shutdown` is cancelled.
    ///
    /// The first purge happens one interval after start. A failed run is
    /// logged and the next one proceeds on schedule; missed ticks are
    /// skipped rather than replayed.
    pub fn spawn(self, shutdown: CancellationToken) -> JoinHandle<()> {
        tokio::spawn(async move {
            let period = self.interval.max(Duration::from_millis(1));
            let mut ticker = interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

            info!(interval = ?period, "Starting retention scheduler");

            loop {
                tokio::select! {
                    _ = shutdown.cancelled() => {
                        info!("Retention scheduler stopped");
                        break;
                    }
                    _ = ticker.tick() => {
                        if let Err(e) = self.run_once().await {
                            error!("Retention run failed: {}", e);
                        }
                    }
                }
            }
        })
    }
}
