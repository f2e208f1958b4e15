//! User-facing reply text.
//!
//! The command layer decides where replies go; these helpers only decide
//! what they say.

use summary_core::SummaryStyle;

use crate::engine::SummaryResult;
use crate::message_store::ChatStatistics;
use crate::SummarizeError;

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M UTC";

/// Note shown when a requested count was corrected.
pub fn clamp_notice(result: &SummaryResult) -> Option<String> {
    if !result.was_clamped() {
        return None;
    }
    if result.requested_count > result.effective_count {
        Some(format!(
            "⚠️ Maximum {} messages allowed. Using {} instead.",
            result.effective_count, result.effective_count
        ))
    } else {
        Some(format!(
            "⚠️ At least 1 message is needed. Using {} instead.",
            result.effective_count
        ))
    }
}

/// Full summary reply, with the clamp notice when relevant.
pub fn format_summary(result: &SummaryResult) -> String {
    let body = format!(
        "📊 Summary of last {} messages ({} style)\n\n{}",
        result.message_count_used,
        result.style.label(),
        result.text.trim()
    );

    match clamp_notice(result) {
        Some(notice) => format!("{}\n\n{}", notice, body),
        None => body,
    }
}

/// Reply for a failed summary request.
pub fn format_failure(error: &SummarizeError) -> String {
    error.user_message().to_string()
}

pub fn format_statistics(stats: &ChatStatistics, retention_days: u64) -> String {
    if stats.total_messages == 0 {
        return "📭 No statistics available yet. I'll start collecting data \
                from messages sent after I was added to this chat."
            .to_string();
    }

    let first = stats
        .first_message_at
        .map(|at| at.format(TIMESTAMP_FORMAT).to_string())
        .unwrap_or_else(|| "N/A".to_string());
    let last = stats
        .last_message_at
        .map(|at| at.format(TIMESTAMP_FORMAT).to_string())
        .unwrap_or_else(|| "N/A".to_string());

    format!(
        "📊 Chat Statistics\n\n\
         • Total messages: {}\n\
         • Unique users: {}\n\
         • First message: {}\n\
         • Latest message: {}\n\n\
         Messages are retained for {} days.",
        stats.total_messages, stats.unique_senders, first, last, retention_days
    )
}

/// Current style plus the available choices.
pub fn format_style_menu(current: SummaryStyle) -> String {
    let options = SummaryStyle::ALL
        .iter()
        .map(|style| {
            let marker = if *style == current { "•" } else { " " };
            format!("{} {} ({})", marker, style.label(), style.as_str())
        })
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "⚙️ Settings\n\nCurrent style: {}\n\nAvailable styles:\n{}",
        current.label(),
        options
    )
}

pub fn format_style_changed(style: SummaryStyle) -> String {
    format!(
        "✅ Summary style updated to: {}\n\nThis chat's preference has been saved.",
        style.label()
    )
}
