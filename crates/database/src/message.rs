//! Append-only message log.

use sqlx::SqlitePool;

use crate::models::{ChatStatistics, MessageRecord, NewMessage};
use crate::Result;

/// Append a message to the log.
///
/// Idempotent on `(chat_id, message_id)`: re-inserting a stored ID leaves the
/// existing row untouched. Returns `true` if a new row was written.
pub async fn insert_message(pool: &SqlitePool, message: &NewMessage) -> Result<bool> {
    let result = sqlx::query(
        r#"
        INSERT INTO messages
            (chat_id, message_id, sender_id, sender_name, text, media, caption, is_system, timestamp_ns)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
        ON CONFLICT(chat_id, message_id) DO NOTHING
        "#,
    )
    .bind(message.chat_id)
    .bind(message.message_id)
    .bind(message.sender_id)
    .bind(&message.sender_name)
    .bind(&message.text)
    .bind(&message.media)
    .bind(&message.caption)
    .bind(message.is_system)
    .bind(message.timestamp_ns)
    .execute(pool)
    .await?;

    Ok(result.rows_affected() == 1)
}

/// Get the `limit` most recent messages for a chat, oldest first.
///
/// Timestamp ties are broken by insertion order.
pub async fn fetch_recent(
    pool: &SqlitePool,
    chat_id: i64,
    limit: i64,
) -> Result<Vec<MessageRecord>> {
    let mut rows = sqlx::query_as::<_, MessageRecord>(
        r#"
        SELECT id, chat_id, message_id, sender_id, sender_name, text, media, caption,
               is_system, timestamp_ns
        FROM messages
        WHERE chat_id = ?
        ORDER BY timestamp_ns DESC, id DESC
        LIMIT ?
        "#,
    )
    .bind(chat_id)
    .bind(limit)
    .fetch_all(pool)
    .await?;

    rows.reverse();
    Ok(rows)
}

/// Count stored messages for a chat.
pub async fn count_messages(pool: &SqlitePool, chat_id: i64) -> Result<i64> {
    let count: i64 = sqlx::query_scalar(
        r#"
        SELECT COUNT(*) FROM messages WHERE chat_id = ?
        "#,
    )
    .bind(chat_id)
    .fetch_one(pool)
    .await?;

    Ok(count)
}

/// Delete messages in every chat sent strictly before `cutoff_ns`.
pub async fn purge_older_than(pool: &SqlitePool, cutoff_ns: i64) -> Result<u64> {
    let result = sqlx::query(
        r#"
        DELETE FROM messages
        WHERE timestamp_ns < ?
        "#,
    )
    .bind(cutoff_ns)
    .execute(pool)
    .await?;

    Ok(result.rows_affected())
}

/// Aggregate statistics for a chat.
pub async fn chat_statistics(pool: &SqlitePool, chat_id: i64) -> Result<ChatStatistics> {
    let stats = sqlx::query_as::<_, ChatStatistics>(
        r#"
        SELECT COUNT(*) AS total_messages,
               COUNT(DISTINCT sender_id) AS unique_senders,
               MIN(timestamp_ns) AS first_message_ns,
               MAX(timestamp_ns) AS last_message_ns
        FROM messages
        WHERE chat_id = ?
        "#,
    )
    .bind(chat_id)
    .fetch_one(pool)
    .await?;

    Ok(stats)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Database;

    async fn test_db() -> Database {
        let db = Database::connect_with_pool_size("sqlite::memory:", 1)
            .await
            .unwrap();
        db.migrate().await.unwrap();
        db
    }

    fn new_message(chat_id: i64, message_id: i64, timestamp_ns: i64) -> NewMessage {
        NewMessage {
            chat_id,
            message_id,
            sender_id: Some(100 + message_id % 3),
            sender_name: format!("user{}", message_id % 3),
            text: format!("message {}", message_id),
            media: None,
            caption: None,
            is_system: false,
            timestamp_ns,
        }
    }

    #[tokio::test]
    async fn test_insert_is_idempotent() {
        let db = test_db().await;
        let message = new_message(1, 10, 1_000);

        assert!(insert_message(db.pool(), &message).await.unwrap());
        let before = fetch_recent(db.pool(), 1, 10).await.unwrap();

        let duplicate = NewMessage {
            text: "edited text".to_string(),
            ..message.clone()
        };
        assert!(!insert_message(db.pool(), &duplicate).await.unwrap());

        let after = fetch_recent(db.pool(), 1, 10).await.unwrap();
        assert_eq!(before, after);
        assert_eq!(after[0].text, "message 10");
    }

    #[tokio::test]
    async fn test_fetch_recent_window_is_chronological() {
        let db = test_db().await;
        for id in 1..=25 {
            insert_message(db.pool(), &new_message(1, id, id * 1_000))
                .await
                .unwrap();
        }

        let rows = fetch_recent(db.pool(), 1, 20).await.unwrap();
        let ids: Vec<i64> = rows.iter().map(|r| r.message_id).collect();
        assert_eq!(ids, (6..=25).collect::<Vec<_>>());

        let all = fetch_recent(db.pool(), 1, 100).await.unwrap();
        assert_eq!(all.len(), 25);
    }

    #[tokio::test]
    async fn test_timestamp_ties_keep_insertion_order() {
        let db = test_db().await;
        // Inserted out of message_id order with identical timestamps
        for id in [3, 1, 2] {
            insert_message(db.pool(), &new_message(1, id, 5_000))
                .await
                .unwrap();
        }

        let rows = fetch_recent(db.pool(), 1, 2).await.unwrap();
        let ids: Vec<i64> = rows.iter().map(|r| r.message_id).collect();
        assert_eq!(ids, vec![1, 2]);
    }

    #[tokio::test]
    async fn test_chats_are_isolated() {
        let db = test_db().await;
        insert_message(db.pool(), &new_message(1, 1, 1_000)).await.unwrap();
        insert_message(db.pool(), &new_message(2, 1, 2_000)).await.unwrap();
        insert_message(db.pool(), &new_message(2, 2, 3_000)).await.unwrap();

        let chat_one = fetch_recent(db.pool(), 1, 10).await.unwrap();
        assert_eq!(chat_one.len(), 1);
        assert!(chat_one.iter().all(|r| r.chat_id == 1));

        assert_eq!(count_messages(db.pool(), 2).await.unwrap(), 2);
        assert!(fetch_recent(db.pool(), 3, 10).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_purge_respects_cutoff() {
        let db = test_db().await;
        for (chat, id, ts) in [(1, 1, 100), (1, 2, 200), (2, 1, 150), (2, 2, 300)] {
            insert_message(db.pool(), &new_message(chat, id, ts)).await.unwrap();
        }

        let deleted = purge_older_than(db.pool(), 200).await.unwrap();
        assert_eq!(deleted, 2);

        let remaining: Vec<i64> = fetch_recent(db.pool(), 1, 10)
            .await
            .unwrap()
            .into_iter()
            .chain(fetch_recent(db.pool(), 2, 10).await.unwrap())
            .map(|r| r.timestamp_ns)
            .collect();
        assert_eq!(remaining, vec![200, 300]);
    }

    #[tokio::test]
    async fn test_chat_statistics() {
        let db = test_db().await;
        let empty = chat_statistics(db.pool(), 1).await.unwrap();
        assert_eq!(empty.total_messages, 0);
        assert_eq!(empty.first_message_ns, None);

        for id in 1..=4 {
            insert_message(db.pool(), &new_message(1, id, id * 10))
                .await
                .unwrap();
        }
        let stats = chat_statistics(db.pool(), 1).await.unwrap();
        assert_eq!(stats.total_messages, 4);
        assert_eq!(stats.unique_senders, 3);
        assert_eq!(stats.first_message_ns, Some(10));
        assert_eq!(stats.last_message_ns, Some(40));
    }
}
