//! Prompt construction and fingerprinting.

use sha2::{Digest, Sha256};

use crate::cleaner::CleanedLine;
use crate::provider::CompletionRequest;
use crate::style::SummaryStyle;

/// A fully built summarization prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prompt {
    /// The style's tone directive.
    pub style_directive: String,
    /// The transcript wrapped in the summarization instruction.
    pub body: String,
}

impl Prompt {
    /// Stable fingerprint of directive and body.
    pub fn fingerprint(&self) -> String {
        hash_prompt(&format!("{}\n\n{}", self.style_directive, self.body))
    }

    /// Convert into a provider request.
    pub fn into_request(self) -> CompletionRequest {
        CompletionRequest::new(self.style_directive, self.body)
    }
}

/// Render lines as `sender: text`, one per line, in the given order.
pub fn format_transcript(lines: &[CleanedLine]) -> String {
    lines
        .iter()
        .map(|line| format!("{}: {}", line.sender, line.text))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Build the prompt for a chronologically ordered window.
///
/// Pure template substitution: identical inputs give identical prompts.
pub fn build_prompt(style: SummaryStyle, lines: &[CleanedLine]) -> Prompt {
    let body = format!(
        "The following is a conversation from a group chat:\n\n{}\n\nPlease summarize the above conversation.",
        format_transcript(lines)
    );

    Prompt {
        style_directive: style.directive().to_string(),
        body,
    }
}

/// Compute a stable SHA-256 fingerprint for a prompt string.
pub fn hash_prompt(prompt: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(prompt.as_bytes());
    let digest = hasher.finalize();
    let mut hex = String::with_capacity(digest.len() * 2);
    for byte in digest {
        hex.push_str(&format!("{:02x}", byte));
    }
    hex
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(sender: &str, text: &str) -> CleanedLine {
        CleanedLine {
            sender: sender.to_string(),
            text: text.to_string(),
        }
    }

    #[test]
    fn test_hash_prompt_stable() {
        let first = hash_prompt("test prompt");
        let second = hash_prompt("test prompt");
        let different = hash_prompt("another prompt");

        assert_eq!(first, second);
        assert_ne!(first, different);
        assert_eq!(first.len(), 64);
    }

    #[test]
    fn test_transcript_preserves_order() {
        let lines = vec![line("alice", "first"), line("bob", "second")];
        assert_eq!(format_transcript(&lines), "alice: first\nbob: second");
    }

    #[test]
    fn test_build_prompt_is_deterministic() {
        let lines = vec![line("alice", "ship it friday"), line("bob", "agreed")];
        let a = build_prompt(SummaryStyle::Executive, &lines);
        let b = build_prompt(SummaryStyle::Executive, &lines);

        assert_eq!(a, b);
        assert_eq!(a.fingerprint(), b.fingerprint());
        assert_eq!(a.style_directive, SummaryStyle::Executive.directive());
        assert!(a.body.contains("alice: ship it friday\nbob: agreed"));
    }

    #[test]
    fn test_style_changes_fingerprint() {
        let lines = vec![line("alice", "hello")];
        let funny = build_prompt(SummaryStyle::Funny, &lines);
        let casual = build_prompt(SummaryStyle::Casual, &lines);
        assert_eq!(funny.body, casual.body);
        assert_ne!(funny.fingerprint(), casual.fingerprint());
    }
}
