//! Database models.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A message to be appended to the log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewMessage {
    /// Chat the message belongs to.
    pub chat_id: i64,
    /// Platform message ID, unique within the chat.
    pub message_id: i64,
    /// Platform sender ID, if known.
    pub sender_id: Option<i64>,
    /// Sender display name.
    pub sender_name: String,
    /// Message text.
    pub text: String,
    /// Serialized media descriptor, if any.
    pub media: Option<String>,
    /// Media caption, if any.
    pub caption: Option<String>,
    /// Platform service message flag.
    pub is_system: bool,
    /// Send time in UTC nanoseconds since the epoch.
    pub timestamp_ns: i64,
}

/// A stored message row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct MessageRecord {
    /// Auto-incrementing insertion sequence.
    pub id: i64,
    pub chat_id: i64,
    pub message_id: i64,
    pub sender_id: Option<i64>,
    pub sender_name: String,
    pub text: String,
    pub media: Option<String>,
    pub caption: Option<String>,
    pub is_system: bool,
    /// Send time in UTC nanoseconds since the epoch.
    pub timestamp_ns: i64,
}

/// Stored per-chat settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct ChatSettingsRecord {
    /// Chat the settings belong to.
    pub chat_id: i64,
    /// Selected summary style key, if set.
    pub style: Option<String>,
    /// Per-chat default window size, if set.
    pub default_summary_count: Option<i64>,
    /// Last update timestamp.
    pub updated_at: String,
}

/// Aggregate statistics for one chat's stored messages.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct ChatStatistics {
    /// Stored messages.
    pub total_messages: i64,
    /// Distinct known sender IDs.
    pub unique_senders: i64,
    /// Oldest stored message time (UTC ns).
    pub first_message_ns: Option<i64>,
    /// Newest stored message time (UTC ns).
    pub last_message_ns: Option<i64>,
}
