//! Durable chat message log.

use chrono::{DateTime, TimeZone, Utc};
use database::{message as message_log, Database, MessageRecord, NewMessage};
use serde::Serialize;
use summary_core::{MediaKind, Message};
use tracing::{debug, warn};

use crate::SummarizeError;

type Result<T> = std::result::Result<T, SummarizeError>;

/// Aggregate statistics for one chat.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChatStatistics {
    pub total_messages: u64,
    pub unique_senders: u64,
    pub first_message_at: Option<DateTime<Utc>>,
    pub last_message_at: Option<DateTime<Utc>>,
}

/// Append-only message log backed by SQLite.
///
/// Uniqueness of `(chat_id, message_id)` is enforced by the table
/// constraint, so concurrent appends never need an application lock.
#[derive(Debug, Clone)]
pub struct MessageStore {
    database: Database,
    max_summary_count: usize,
}

impl MessageStore {
    pub fn new(database: Database, max_summary_count: usize) -> Self {
        Self {
            database,
            max_summary_count: max_summary_count.max(1),
        }
    }

    pub fn database(&self) -> &Database {
        &self.database
    }

    /// Largest window `fetch_recent` will return.
    pub fn max_summary_count(&self) -> usize {
        self.max_summary_count
    }

    /// Append a message. Returns `false` if it was already stored.
    pub async fn append(&self, message: &Message) -> Result<bool> {
        let row = to_new_message(message);
        let inserted = message_log::insert_message(self.database.pool(), &row).await?;
        if !inserted {
            debug!(
                chat_id = message.chat_id,
                message_id = message.message_id,
                "Duplicate message ignored"
            );
        }
        Ok(inserted)
    }

    /// The `n` most recent messages for a chat, oldest first.
    ///
    /// `n` is clamped to `[1, max_summary_count]`. An unknown chat yields an
    /// empty vector.
    pub async fn fetch_recent(&self, chat_id: i64, n: usize) -> Result<Vec<Message>> {
        let limit = n.clamp(1, self.max_summary_count);
        let rows = message_log::fetch_recent(self.database.pool(), chat_id, limit as i64).await?;
        Ok(rows.into_iter().map(from_record).collect())
    }

    /// Delete every message sent before `cutoff`, across all chats.
    ///
    /// The comparison runs at the full precision of the stored timestamps.
    pub async fn purge_older_than(&self, cutoff: DateTime<Utc>) -> Result<u64> {
        let deleted =
            message_log::purge_older_than(self.database.pool(), to_nanos(cutoff)).await?;
        Ok(deleted)
    }

    /// Number of stored messages for a chat.
    pub async fn count(&self, chat_id: i64) -> Result<u64> {
        let count = message_log::count_messages(self.database.pool(), chat_id).await?;
        Ok(count.max(0) as u64)
    }

    pub async fn statistics(&self, chat_id: i64) -> Result<ChatStatistics> {
        let stats = message_log::chat_statistics(self.database.pool(), chat_id).await?;
        Ok(ChatStatistics {
            total_messages: stats.total_messages.max(0) as u64,
            unique_senders: stats.unique_senders.max(0) as u64,
            first_message_at: stats.first_message_ns.map(from_nanos),
            last_message_at: stats.last_message_ns.map(from_nanos),
        })
    }
}

/// Nanoseconds since the epoch, the precision `DateTime<Utc>` carries.
///
/// Times outside the `i64` nanosecond range (years 1677 to 2262) saturate,
/// which keeps their ordering against any cutoff.
fn to_nanos(at: DateTime<Utc>) -> i64 {
    at.timestamp_nanos_opt().unwrap_or(if at.timestamp() < 0 {
        i64::MIN
    } else {
        i64::MAX
    })
}

fn from_nanos(nanos: i64) -> DateTime<Utc> {
    Utc.timestamp_nanos(nanos)
}

fn to_new_message(message: &Message) -> NewMessage {
    let media = message.media.as_ref().and_then(|media| {
        serde_json::to_string(media)
            .map_err(|err| warn!("Failed to serialize media descriptor: {}", err))
            .ok()
    });

    NewMessage {
        chat_id: message.chat_id,
        message_id: message.message_id,
        sender_id: message.sender_id,
        sender_name: message.sender_display_name.clone(),
        text: message.text.clone(),
        media,
        caption: message.caption.clone(),
        is_system: message.is_system,
        timestamp_ns: to_nanos(message.timestamp),
    }
}

fn from_record(record: MessageRecord) -> Message {
    let media = record.media.as_deref().and_then(|raw| {
        serde_json::from_str::<MediaKind>(raw)
            .map_err(|err| warn!("Unreadable media descriptor on message {}: {}", record.id, err))
            .ok()
    });
    Message {
        chat_id: record.chat_id,
        message_id: record.message_id,
        sender_id: record.sender_id,
        sender_display_name: record.sender_name,
        text: record.text,
        timestamp: from_nanos(record.timestamp_ns),
        media,
        caption: record.caption,
        is_system: record.is_system,
    }
}
