//! Inbound message deduplication by provider message id.

use std::time::Duration;

use sqlx::SqlitePool;

use crate::Result;

/// How long handled message ids are kept. Provider retries span hours.
pub const DEFAULT_RETENTION: Duration = Duration::from_secs(48 * 60 * 60);

/// State of a message id after [`claim_message`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MessageClaim {
    /// First delivery; the caller owns processing.
    Claimed,
    /// Exchange already stored but the reply never went out.
    Pending { reply: String },
    /// Being handled, or already answered.
    Handled,
}

/// Record a message id as being handled.
pub async fn claim_message(pool: &SqlitePool, message_sid: &str) -> Result<MessageClaim> {
    let result = sqlx::query(
        r#"
        INSERT OR IGNORE INTO processed_messages (message_sid)
        VALUES (?)
        "#,
    )
    .bind(message_sid)
    .execute(pool)
    .await?;

    if result.rows_affected() == 1 {
        return Ok(MessageClaim::Claimed);
    }

    let row: Option<(Option<String>, Option<String>)> = sqlx::query_as(
        r#"
        SELECT reply, sent_at
        FROM processed_messages
        WHERE message_sid = ?
        "#,
    )
    .bind(message_sid)
    .fetch_optional(pool)
    .await?;

    Ok(match row {
        Some((Some(reply), None)) => MessageClaim::Pending { reply },
        _ => MessageClaim::Handled,
    })
}

/// Keep the reply for a claimed message so a retry can re-send it
/// without storing the exchange again.
pub async fn store_reply(pool: &SqlitePool, message_sid: &str, reply: &str) -> Result<()> {
    sqlx::query(
        r#"
        UPDATE processed_messages
        SET reply = ?
        WHERE message_sid = ?
        "#,
    )
    .bind(reply)
    .bind(message_sid)
    .execute(pool)
    .await?;

    Ok(())
}

/// Mark the reply for a message as delivered.
pub async fn mark_sent(pool: &SqlitePool, message_sid: &str) -> Result<()> {
    sqlx::query(
        r#"
        UPDATE processed_messages
        SET sent_at = datetime('now')
        WHERE message_sid = ?
        "#,
    )
    .bind(message_sid)
    .execute(pool)
    .await?;

    Ok(())
}

/// Forget a claimed message id so a provider retry is processed again.
pub async fn release_message(pool: &SqlitePool, message_sid: &str) -> Result<()> {
    sqlx::query(
        r#"
        DELETE FROM processed_messages
        WHERE message_sid = ?
        "#,
    )
    .bind(message_sid)
    .execute(pool)
    .await?;

    Ok(())
}

/// Delete message ids claimed more than `older_than` ago.
///
/// Returns the number of rows removed.
pub async fn prune_processed(pool: &SqlitePool, older_than: Duration) -> Result<u64> {
    let result = sqlx::query(
        r#"
        DELETE FROM processed_messages
        WHERE created_at < datetime('now', ?)
        "#,
    )
    .bind(format!("-{} seconds", older_than.as_secs()))
    .execute(pool)
    .await?;

    if result.rows_affected() > 0 {
        tracing::debug!(removed = result.rows_affected(), "Pruned processed message ids");
    }

    Ok(result.rows_affected())
}
