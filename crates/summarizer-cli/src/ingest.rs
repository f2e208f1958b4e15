//! JSON-lines message import.

use std::path::Path;

use summarizer::{MessageStore, SummarizeError};
use summary_core::Message;
use tokio::fs::File;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::warn;

/// Outcome of an import.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct IngestReport {
    pub inserted: u64,
    pub duplicates: u64,
    pub invalid: u64,
}

/// Errors that stop an import.
#[derive(Debug, thiserror::Error)]
pub enum IngestError {
    #[error("failed to read input: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Store(#[from] SummarizeError),
}

/// Append every message in a JSON-lines file.
///
/// Blank lines are skipped; lines that do not parse are counted and logged.
pub async fn ingest_file(store: &MessageStore, path: &Path) -> Result<IngestReport, IngestError> {
    let file = File::open(path).await?;
    let mut lines = BufReader::new(file).lines();
    let mut report = IngestReport::default();
    let mut line_no = 0usize;

    while let Some(line) = lines.next_line().await? {
        line_no += 1;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let message: Message = match serde_json::from_str(line) {
            Ok(message) => message,
            Err(err) => {
                warn!("Skipping line {}: {}", line_no, err);
                report.invalid += 1;
                continue;
            }
        };

        if store.append(&message).await? {
            report.inserted += 1;
        } else {
            report.duplicates += 1;
        }
    }

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use database::Database;
    use std::io::Write;

    #[tokio::test]
    async fn test_ingest_counts_duplicates_and_bad_lines() {
        let db = Database::connect_with_pool_size("sqlite::memory:", 1)
            .await
            .unwrap();
        db.migrate().await.unwrap();
        let store = MessageStore::new(db, 100);

        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"{{"chat_id":1,"message_id":1,"sender_id":10,"sender_display_name":"alice","text":"hi","timestamp":"2024-05-01T09:00:00Z"}}"#
        )
        .unwrap();
        writeln!(
            file,
            r#"{{"chat_id":1,"message_id":2,"sender_id":11,"sender_display_name":"bob","timestamp":"2024-05-01T09:01:00Z","media":{{"type":"photo"}},"caption":"view"}}"#
        )
        .unwrap();
        writeln!(file).unwrap();
        writeln!(
            file,
            r#"{{"chat_id":1,"message_id":1,"sender_id":10,"sender_display_name":"alice","text":"hi","timestamp":"2024-05-01T09:00:00Z"}}"#
        )
        .unwrap();
        writeln!(file, "not json").unwrap();
        file.flush().unwrap();

        let report = ingest_file(&store, file.path()).await.unwrap();
        assert_eq!(
            report,
            IngestReport {
                inserted: 2,
                duplicates: 1,
                invalid: 1
            }
        );
        assert_eq!(store.count(1).await.unwrap(), 2);
    }
}
