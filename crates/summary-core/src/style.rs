//! Summary styles and their fixed tone directives.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// The tone a summary is written in.
///
/// Each variant maps to one fixed directive; the set is closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SummaryStyle {
    #[default]
    Professional,
    Funny,
    Executive,
    Technical,
    Casual,
}

/// Returned when a string does not name a known style.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown summary style: {0}")]
pub struct ParseStyleError(pub String);

impl SummaryStyle {
    /// All styles, in display order.
    pub const ALL: [SummaryStyle; 5] = [
        SummaryStyle::Professional,
        SummaryStyle::Funny,
        SummaryStyle::Executive,
        SummaryStyle::Technical,
        SummaryStyle::Casual,
    ];

    /// Stable storage key.
    pub fn as_str(&self) -> &'static str {
        match self {
            SummaryStyle::Professional => "professional",
            SummaryStyle::Funny => "funny",
            SummaryStyle::Executive => "executive",
            SummaryStyle::Technical => "technical",
            SummaryStyle::Casual => "casual",
        }
    }

    /// Label shown to users.
    pub fn label(&self) -> &'static str {
        match self {
            SummaryStyle::Professional => "Professional",
            SummaryStyle::Funny => "Funny",
            SummaryStyle::Executive => "Executive Summary",
            SummaryStyle::Technical => "Technical",
            SummaryStyle::Casual => "Casual",
        }
    }

    /// The tone/format instruction injected into the prompt.
    pub fn directive(&self) -> &'static str {
        match self {
            SummaryStyle::Professional => {
                "You are a professional assistant summarizing a group chat conversation. \
                 Provide a clear, concise summary in bullet points. Focus on key topics, \
                 decisions and action items. Maintain a professional tone."
            }
            SummaryStyle::Funny => {
                "You are a witty assistant summarizing a group chat conversation. \
                 Provide a humorous summary in bullet points, using playful language \
                 and emoji where appropriate. Keep it light-hearted but still capture \
                 the main points."
            }
            SummaryStyle::Executive => {
                "You are an executive assistant providing a high-level summary of a group \
                 chat conversation. Focus only on the most critical points: key decisions, \
                 important announcements and urgent action items. Keep it extremely brief, \
                 3-5 bullet points at most, in clear formal language."
            }
            SummaryStyle::Technical => {
                "You are a technical analyst summarizing a group chat conversation. \
                 Focus on technical details, code, system discussions and technical \
                 decisions. Use precise terminology and organize the summary by \
                 technical topic."
            }
            SummaryStyle::Casual => {
                "You are a friendly assistant summarizing a group chat conversation. \
                 Keep it casual and conversational, like telling a friend what happened. \
                 Relaxed language and emoji are fine, but capture the main points."
            }
        }
    }
}

impl fmt::Display for SummaryStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for SummaryStyle {
    type Err = ParseStyleError;

    /// Accepts the storage key or the label, case-insensitively.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase();
        match normalized.as_str() {
            "professional" => Ok(SummaryStyle::Professional),
            "funny" => Ok(SummaryStyle::Funny),
            "executive" | "executive summary" => Ok(SummaryStyle::Executive),
            "technical" => Ok(SummaryStyle::Technical),
            "casual" => Ok(SummaryStyle::Casual),
            _ => Err(ParseStyleError(s.to_string())),
        }
    }
}
