//! Message cleaning before prompt construction.

use std::sync::LazyLock;

use regex::Regex;

use crate::message::Message;

static URL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b(?:https?://|www\.)\S+").expect("static regex"));

static COMMAND_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^/\w+(?:@\w+)?\s*").expect("static regex"));

static WHITESPACE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("static regex"));

static SYSTEM_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^(?:.+ joined the group|.+ left the group|.+ was added|.+ was removed|Group photo updated|Group name changed to.*)$",
    )
    .expect("static regex")
});

/// A cleaned `(sender, text)` pair ready for the transcript.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CleanedLine {
    pub sender: String,
    pub text: String,
}

/// Strips noise from chat messages before they are summarized.
///
/// Cleaning is deterministic: the same messages always produce the same lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextCleaner {
    remove_urls: bool,
    remove_commands: bool,
}

impl Default for TextCleaner {
    fn default() -> Self {
        Self::new(true, true)
    }
}

impl TextCleaner {
    pub fn new(remove_urls: bool, remove_commands: bool) -> Self {
        Self {
            remove_urls,
            remove_commands,
        }
    }

    /// Clean a single piece of text. Returns an empty string if nothing is left.
    pub fn clean_text(&self, text: &str) -> String {
        if text.trim().is_empty() {
            return String::new();
        }

        let mut cleaned = text.trim_start().to_string();
        if self.remove_commands {
            cleaned = COMMAND_RE.replace(&cleaned, "").into_owned();
        }
        if self.remove_urls {
            cleaned = URL_RE.replace_all(&cleaned, "").into_owned();
        }

        WHITESPACE_RE.replace_all(&cleaned, " ").trim().to_string()
    }

    /// Whether the message is a platform service notice rather than conversation.
    pub fn is_system_message(&self, message: &Message) -> bool {
        message.is_system || SYSTEM_RE.is_match(message.text.trim())
    }

    /// Clean a window of messages, preserving order.
    ///
    /// Service notices and messages with nothing left after cleaning are dropped.
    pub fn clean_messages(&self, messages: &[Message]) -> Vec<CleanedLine> {
        messages
            .iter()
            .filter(|message| !self.is_system_message(message))
            .filter_map(|message| {
                let raw = if message.text.trim().is_empty() {
                    message
                        .media
                        .as_ref()
                        .map(|media| media.placeholder(message.caption.as_deref()))?
                } else {
                    message.text.clone()
                };

                let text = self.clean_text(&raw);
                if text.is_empty() {
                    return None;
                }

                let sender = message.sender_display_name.trim();
                Some(CleanedLine {
                    sender: if sender.is_empty() {
                        "Unknown".to_string()
                    } else {
                        sender.to_string()
                    },
                    text,
                })
            })
            .collect()
    }
}
