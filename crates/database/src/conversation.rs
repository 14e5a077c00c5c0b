//! Conversation and turn persistence.
//!
//! Turns are insert-only rows, so concurrent appends for the same sender
//! cannot overwrite each other. The partial unique index on open
//! conversations makes the "find or create" step safe under concurrent
//! first contact.

use sqlx::SqlitePool;

use crate::models::{Conversation, ConversationRow, ConversationStatus, Role, Turn, TurnRow};
use crate::{DatabaseError, Result};

/// Append a turn to the sender's open conversation, creating one if needed.
///
/// Returns the conversation id the turn was appended to. A sender whose
/// previous conversations are all closed or handed off gets a new one.
pub async fn append_turn(
    pool: &SqlitePool,
    sender: &str,
    display_name: Option<&str>,
    role: Role,
    content: &str,
) -> Result<i64> {
    let mut tx = pool.begin().await?;

    sqlx::query(
        r#"
        INSERT OR IGNORE INTO conversations (sender, display_name, status)
        VALUES (?, ?, 'bot')
        "#,
    )
    .bind(sender)
    .bind(display_name)
    .execute(&mut *tx)
    .await?;

    let (conversation_id,): (i64,) = sqlx::query_as(
        r#"
        SELECT id FROM conversations
        WHERE sender = ? AND status = 'bot'
        "#,
    )
    .bind(sender)
    .fetch_one(&mut *tx)
    .await?;

    sqlx::query(
        r#"
        INSERT INTO turns (conversation_id, role, content)
        VALUES (?, ?, ?)
        "#,
    )
    .bind(conversation_id)
    .bind(role.as_str())
    .bind(content)
    .execute(&mut *tx)
    .await?;

    sqlx::query(
        r#"
        UPDATE conversations
        SET updated_at = datetime('now'),
            display_name = COALESCE(?, display_name)
        WHERE id = ?
        "#,
    )
    .bind(display_name)
    .bind(conversation_id)
    .execute(&mut *tx)
    .await?;

    tx.commit().await?;

    Ok(conversation_id)
}

/// Get the sender's open (`bot`) conversation, if any.
pub async fn get_open_conversation(pool: &SqlitePool, sender: &str) -> Result<Option<Conversation>> {
    let row = sqlx::query_as::<_, ConversationRow>(
        r#"
        SELECT id, sender, display_name, status, created_at, updated_at
        FROM conversations
        WHERE sender = ? AND status = 'bot'
        "#,
    )
    .bind(sender)
    .fetch_optional(pool)
    .await?;

    row.map(Conversation::try_from).transpose()
}

/// Get a conversation by id.
pub async fn get_conversation(pool: &SqlitePool, id: i64) -> Result<Conversation> {
    let row = sqlx::query_as::<_, ConversationRow>(
        r#"
        SELECT id, sender, display_name, status, created_at, updated_at
        FROM conversations
        WHERE id = ?
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| DatabaseError::NotFound {
        entity: "conversation",
        id: id.to_string(),
    })?;

    Conversation::try_from(row)
}

/// List every conversation with a sender, oldest first.
pub async fn list_conversations(pool: &SqlitePool, sender: &str) -> Result<Vec<Conversation>> {
    let rows = sqlx::query_as::<_, ConversationRow>(
        r#"
        SELECT id, sender, display_name, status, created_at, updated_at
        FROM conversations
        WHERE sender = ?
        ORDER BY id ASC
        "#,
    )
    .bind(sender)
    .fetch_all(pool)
    .await?;

    rows.into_iter().map(Conversation::try_from).collect()
}

/// Get a conversation's turns in chronological order.
pub async fn get_turns(pool: &SqlitePool, conversation_id: i64) -> Result<Vec<Turn>> {
    let rows = sqlx::query_as::<_, TurnRow>(
        r#"
        SELECT id, conversation_id, role, content, created_at
        FROM turns
        WHERE conversation_id = ?
        ORDER BY id ASC
        "#,
    )
    .bind(conversation_id)
    .fetch_all(pool)
    .await?;

    rows.into_iter().map(Turn::try_from).collect()
}

/// Mark a conversation closed. The next message from the sender opens a new one.
pub async fn close_conversation(pool: &SqlitePool, id: i64) -> Result<()> {
    set_status(pool, id, ConversationStatus::Closed).await
}

/// Hand a conversation to a human agent.
pub async fn hand_off_to_human(pool: &SqlitePool, id: i64) -> Result<()> {
    set_status(pool, id, ConversationStatus::Human).await
}

async fn set_status(pool: &SqlitePool, id: i64, status: ConversationStatus) -> Result<()> {
    let result = sqlx::query(
        r#"
        UPDATE conversations
        SET status = ?, updated_at = datetime('now')
        WHERE id = ?
        "#,
    )
    .bind(status.as_str())
    .bind(id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(DatabaseError::NotFound {
            entity: "conversation",
            id: id.to_string(),
        });
    }

    tracing::debug!("Conversation {} is now {}", id, status);
    Ok(())
}
