//! Per-chat summary settings.

use std::collections::HashMap;

use database::{chat_settings as settings_table, ChatSettingsRecord, Database};
use summary_core::SummaryStyle;
use tokio::sync::RwLock;
use tracing::warn;

use crate::config::SummarizerConfig;
use crate::SummarizeError;

type Result<T> = std::result::Result<T, SummarizeError>;

/// Effective settings for a chat, with process defaults filled in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChatSettings {
    pub chat_id: i64,
    pub style: SummaryStyle,
    pub default_summary_count: usize,
}

/// What the chat has explicitly chosen.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct StoredSettings {
    style: Option<SummaryStyle>,
    default_summary_count: Option<usize>,
}

/// Settings store with a read-through cache in front of SQLite.
///
/// Writes go to the database first and the cache entry is then reloaded from
/// the stored row, so a failed write never leaves the cache ahead of durable
/// state and a cache fill never replaces a newer entry.
pub struct ChatSettingsStore {
    database: Database,
    cache: RwLock<HashMap<i64, StoredSettings>>,
    default_style: SummaryStyle,
    default_summary_count: usize,
    max_summary_count: usize,
}

impl ChatSettingsStore {
    pub fn new(database: Database, config: &SummarizerConfig) -> Self {
        Self {
            database,
            cache: RwLock::new(HashMap::new()),
            default_style: config.default_style,
            default_summary_count: config.clamp_count(config.default_summary_count),
            max_summary_count: config.max_summary_count.max(1),
        }
    }

    /// The chat's style, or the process default if unset.
    pub async fn get_style(&self, chat_id: i64) -> Result<SummaryStyle> {
        Ok(self.stored(chat_id).await?.style.unwrap_or(self.default_style))
    }

    pub async fn set_style(&self, chat_id: i64, style: SummaryStyle) -> Result<()> {
        let mut cache = self.cache.write().await;
        settings_table::upsert_style(self.database.pool(), chat_id, style.as_str()).await?;
        self.refresh(&mut cache, chat_id).await
    }

    /// The chat's default window size, or the process default if unset.
    pub async fn get_default_count(&self, chat_id: i64) -> Result<usize> {
        Ok(self
            .stored(chat_id)
            .await?
            .default_summary_count
            .unwrap_or(self.default_summary_count))
    }

    /// Set or clear the chat's default window size. Values are clamped.
    pub async fn set_default_count(&self, chat_id: i64, count: Option<usize>) -> Result<()> {
        let count = count.map(|n| n.clamp(1, self.max_summary_count));
        let mut cache = self.cache.write().await;
        settings_table::upsert_default_count(
            self.database.pool(),
            chat_id,
            count.map(|n| n as i64),
        )
        .await?;
        self.refresh(&mut cache, chat_id).await
    }

    pub async fn get_settings(&self, chat_id: i64) -> Result<ChatSettings> {
        let stored = self.stored(chat_id).await?;
        Ok(ChatSettings {
            chat_id,
            style: stored.style.unwrap_or(self.default_style),
            default_summary_count: stored
                .default_summary_count
                .unwrap_or(self.default_summary_count),
        })
    }

    async fn stored(&self, chat_id: i64) -> Result<StoredSettings> {
        if let Some(settings) = self.cache.read().await.get(&chat_id).copied() {
            return Ok(settings);
        }

        let settings = self.load(chat_id).await?;

        // A setter may have refreshed the entry while we were reading; its
        // value is never older than ours.
        Ok(*self.cache.write().await.entry(chat_id).or_insert(settings))
    }

    /// Reload a chat's row into the cache after a write.
    ///
    /// Callers hold the cache write lock across their upsert and this reload,
    /// so concurrent setters for different fields cannot interleave.
    async fn refresh(
        &self,
        cache: &mut HashMap<i64, StoredSettings>,
        chat_id: i64,
    ) -> Result<()> {
        match self.load(chat_id).await {
            Ok(settings) => {
                cache.insert(chat_id, settings);
                Ok(())
            }
            Err(err) => {
                cache.remove(&chat_id);
                Err(err)
            }
        }
    }

    async fn load(&self, chat_id: i64) -> Result<StoredSettings> {
        let record = settings_table::get_settings(self.database.pool(), chat_id).await?;
        Ok(record
            .map(|record| self.from_record(record))
            .unwrap_or_default())
    }

    fn from_record(&self, record: ChatSettingsRecord) -> StoredSettings {
        let style = record.style.as_deref().and_then(|raw| match raw.parse::<SummaryStyle>() {
            Ok(style) => Some(style),
            Err(err) => {
                warn!(
                    "Stored style for chat {} is unusable, using default: {}",
                    record.chat_id, err
                );
                None
            }
        });
        let default_summary_count = record
            .default_summary_count
            .filter(|n| *n > 0)
            .map(|n| (n as usize).min(self.max_summary_count));

        StoredSettings {
            style,
            default_summary_count,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn test_db() -> Database {
        let db = Database::connect_with_pool_size("sqlite::memory:", 1)
            .await
            .unwrap();
        db.migrate().await.unwrap();
        db
    }

    fn config() -> SummarizerConfig {
        SummarizerConfig {
            default_style: SummaryStyle::Casual,
            default_summary_count: 30,
            max_summary_count: 50,
            ..SummarizerConfig::default()
        }
    }

    #[tokio::test]
    async fn test_defaults_when_unset() {
        let store = ChatSettingsStore::new(test_db().await, &config());
        assert_eq!(store.get_style(1).await.unwrap(), SummaryStyle::Casual);
        assert_eq!(store.get_default_count(1).await.unwrap(), 30);
    }

    #[tokio::test]
    async fn test_set_style_is_per_chat() {
        let store = ChatSettingsStore::new(test_db().await, &config());
        store.set_style(1, SummaryStyle::Funny).await.unwrap();
        store.set_style(1, SummaryStyle::Technical).await.unwrap();

        assert_eq!(store.get_style(1).await.unwrap(), SummaryStyle::Technical);
        assert_eq!(store.get_style(2).await.unwrap(), SummaryStyle::Casual);
    }

    #[tokio::test]
    async fn test_settings_survive_new_store() {
        let db = test_db().await;
        let store = ChatSettingsStore::new(db.clone(), &config());
        store.set_style(7, SummaryStyle::Executive).await.unwrap();
        store.set_default_count(7, Some(500)).await.unwrap();

        let fresh = ChatSettingsStore::new(db, &config());
        let settings = fresh.get_settings(7).await.unwrap();
        assert_eq!(settings.style, SummaryStyle::Executive);
        assert_eq!(settings.default_summary_count, 50);
    }

    #[tokio::test]
    async fn test_clear_default_count() {
        let store = ChatSettingsStore::new(test_db().await, &config());
        store.set_default_count(3, Some(10)).await.unwrap();
        assert_eq!(store.get_default_count(3).await.unwrap(), 10);

        store.set_default_count(3, None).await.unwrap();
        assert_eq!(store.get_default_count(3).await.unwrap(), 30);
    }

    #[tokio::test]
    async fn test_unparsable_style_falls_back() {
        let db = test_db().await;
        settings_table::upsert_style(db.pool(), 4, "shakespearean")
            .await
            .unwrap();

        let store = ChatSettingsStore::new(db, &config());
        assert_eq!(store.get_style(4).await.unwrap(), SummaryStyle::Casual);
    }

    #[tokio::test]
    async fn test_storage_failure_propagates() {
        let db = test_db().await;
        let store = ChatSettingsStore::new(db.clone(), &config());
        db.close().await;

        assert!(matches!(
            store.get_style(9).await,
            Err(SummarizeError::StorageUnavailable(_))
        ));
    }

    #[tokio::test]
    async fn test_set_style_keeps_stored_count() {
        let db = test_db().await;
        settings_table::upsert_default_count(db.pool(), 5, Some(12))
            .await
            .unwrap();

        let store = ChatSettingsStore::new(db, &config());
        store.set_style(5, SummaryStyle::Funny).await.unwrap();

        let settings = store.get_settings(5).await.unwrap();
        assert_eq!(settings.style, SummaryStyle::Funny);
        assert_eq!(settings.default_summary_count, 12);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_reads_never_hide_a_write() {
        let dir = tempfile::tempdir().unwrap();
        let url = format!("sqlite:{}?mode=rwc", dir.path().join("settings.db").display());
        let db = Database::connect(&url).await.unwrap();
        db.migrate().await.unwrap();

        let store = std::sync::Arc::new(ChatSettingsStore::new(db.clone(), &config()));

        let mut handles = Vec::new();
        for chat_id in 1..=200i64 {
            for _ in 0..3 {
                let store = std::sync::Arc::clone(&store);
                handles.push(tokio::spawn(async move {
                    store.get_style(chat_id).await.unwrap();
                }));
            }
            let store = std::sync::Arc::clone(&store);
            handles.push(tokio::spawn(async move {
                store.set_style(chat_id, SummaryStyle::Funny).await.unwrap();
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        for chat_id in 1..=200i64 {
            assert_eq!(
                store.get_style(chat_id).await.unwrap(),
                SummaryStyle::Funny,
                "chat {} served a stale style",
                chat_id
            );
        }

        let fresh = ChatSettingsStore::new(db, &config());
        assert_eq!(fresh.get_style(200).await.unwrap(), SummaryStyle::Funny);
    }
}
