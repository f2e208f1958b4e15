//! Per-chat settings storage.

use sqlx::SqlitePool;

use crate::models::ChatSettingsRecord;
use crate::Result;

/// Create or update the summary style for a chat.
pub async fn upsert_style(pool: &SqlitePool, chat_id: i64, style: &str) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO chat_settings (chat_id, style)
        VALUES (?, ?)
        ON CONFLICT(chat_id) DO UPDATE SET
            style = excluded.style,
            updated_at = datetime('now')
        "#,
    )
    .bind(chat_id)
    .bind(style)
    .execute(pool)
    .await?;

    Ok(())
}

/// Create or update the default summary count for a chat.
///
/// `None` clears the per-chat default.
pub async fn upsert_default_count(
    pool: &SqlitePool,
    chat_id: i64,
    count: Option<i64>,
) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO chat_settings (chat_id, default_summary_count)
        VALUES (?, ?)
        ON CONFLICT(chat_id) DO UPDATE SET
            default_summary_count = excluded.default_summary_count,
            updated_at = datetime('now')
        "#,
    )
    .bind(chat_id)
    .bind(count)
    .execute(pool)
    .await?;

    Ok(())
}

/// Get the settings row for a chat.
pub async fn get_settings(pool: &SqlitePool, chat_id: i64) -> Result<Option<ChatSettingsRecord>> {
    let record = sqlx::query_as::<_, ChatSettingsRecord>(
        r#"
        SELECT chat_id, style, default_summary_count, updated_at
        FROM chat_settings
        WHERE chat_id = ?
        "#,
    )
    .bind(chat_id)
    .fetch_optional(pool)
    .await?;

    Ok(record)
}
