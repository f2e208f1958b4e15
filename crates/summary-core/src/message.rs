//! Logged chat message types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Non-text content attached to a message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MediaKind {
    Photo,
    Video,
    Document { file_name: Option<String> },
    Sticker { emoji: Option<String> },
    Voice,
    Audio,
    Location,
    Poll { question: String },
}

impl MediaKind {
    /// Human-readable placeholder used when a message has no text.
    pub fn placeholder(&self, caption: Option<&str>) -> String {
        let caption = caption.map(str::trim).filter(|c| !c.is_empty());
        match self {
            MediaKind::Photo => with_caption("[Photo]", caption),
            MediaKind::Video => with_caption("[Video]", caption),
            MediaKind::Document { file_name } => {
                format!("[Document: {}]", file_name.as_deref().unwrap_or("file"))
            }
            MediaKind::Sticker { emoji } => match emoji.as_deref() {
                Some(emoji) if !emoji.is_empty() => format!("[Sticker: {}]", emoji),
                _ => "[Sticker]".to_string(),
            },
            MediaKind::Voice => "[Voice message]".to_string(),
            MediaKind::Audio => "[Audio]".to_string(),
            MediaKind::Location => "[Location]".to_string(),
            MediaKind::Poll { question } => format!("[Poll: {}]", question),
        }
    }
}

fn with_caption(label: &str, caption: Option<&str>) -> String {
    match caption {
        Some(caption) => format!("{} - {}", label, caption),
        None => label.to_string(),
    }
}

/// A chat message as observed on the messaging platform.
///
/// Messages are immutable once stored and unique by `(chat_id, message_id)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// Chat (group or direct conversation) the message belongs to.
    pub chat_id: i64,
    /// Platform message ID, unique within the chat.
    pub message_id: i64,
    /// Platform user ID of the sender, if known.
    pub sender_id: Option<i64>,
    /// Display name of the sender at the time the message was sent.
    pub sender_display_name: String,
    /// Message text (may be empty for media-only messages).
    #[serde(default)]
    pub text: String,
    /// When the message was sent.
    pub timestamp: DateTime<Utc>,
    /// Attached media, if any.
    #[serde(default)]
    pub media: Option<MediaKind>,
    /// Media caption, if any.
    #[serde(default)]
    pub caption: Option<String>,
    /// Platform service message (joins, leaves, renames).
    #[serde(default)]
    pub is_system: bool,
}

impl Message {
    /// Create a plain text message.
    pub fn text(
        chat_id: i64,
        message_id: i64,
        sender_display_name: impl Into<String>,
        text: impl Into<String>,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            chat_id,
            message_id,
            sender_id: None,
            sender_display_name: sender_display_name.into(),
            text: text.into(),
            timestamp,
            media: None,
            caption: None,
            is_system: false,
        }
    }

    /// Set the sender ID.
    pub fn with_sender_id(mut self, sender_id: i64) -> Self {
        self.sender_id = Some(sender_id);
        self
    }

    /// Attach media with an optional caption.
    pub fn with_media(mut self, media: MediaKind, caption: Option<String>) -> Self {
        self.media = Some(media);
        self.caption = caption;
        self
    }

    /// Mark as a platform service message.
    pub fn system(mut self) -> Self {
        self.is_system = true;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_media_placeholders() {
        assert_eq!(MediaKind::Photo.placeholder(None), "[Photo]");
        assert_eq!(MediaKind::Photo.placeholder(Some("beach")), "[Photo] - beach");
        assert_eq!(MediaKind::Video.placeholder(Some("  ")), "[Video]");
        assert_eq!(
            MediaKind::Document { file_name: None }.placeholder(None),
            "[Document: file]"
        );
        assert_eq!(
            MediaKind::Sticker { emoji: Some("🙂".to_string()) }.placeholder(None),
            "[Sticker: 🙂]"
        );
        assert_eq!(
            MediaKind::Poll { question: "Lunch?".to_string() }.placeholder(None),
            "[Poll: Lunch?]"
        );
    }

    #[test]
    fn test_message_deserializes_with_defaults() {
        let json = r#"{
            "chat_id": -100,
            "message_id": 7,
            "sender_id": 42,
            "sender_display_name": "alice",
            "text": "hi",
            "timestamp": "2024-05-01T10:00:00Z"
        }"#;
        let message: Message = serde_json::from_str(json).unwrap();
        assert_eq!(message.chat_id, -100);
        assert_eq!(message.sender_id, Some(42));
        assert!(message.media.is_none());
        assert!(!message.is_system);
    }
}
