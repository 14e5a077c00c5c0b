//! SQLite persistence for inbound conversations.
//!
//! Stores one conversation per sender while it is open, its append-only
//! turns, and the provider message ids the relay has already handled.
//!
//! # Example
//!
//! ```no_run
//! use database::{conversation, Database, Role};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let db = Database::connect("sqlite:relay.db?mode=rwc").await?;
//!     db.migrate().await?;
//!
//!     conversation::append_turn(db.pool(), "+13055550100", Some("Ana"), Role::User, "Hola").await?;
//!     Ok(())
//! }
//! ```

pub mod conversation;
pub mod error;
pub mod models;
pub mod processed_message;

pub use error::{DatabaseError, Result};
pub use models::{Conversation, ConversationStatus, Role, Turn};
pub use processed_message::MessageClaim;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::str::FromStr;

/// Default database URL when `SQLITE_PATH` is unset.
pub const DEFAULT_DATABASE_URL: &str = "sqlite:relay.db?mode=rwc";

/// Database connection wrapper.
#[derive(Debug, Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Default pool size for database connections.
    const DEFAULT_POOL_SIZE: u32 = 10;

    /// Connect to a SQLite database.
    ///
    /// The URL should be in the format `sqlite:path/to/db.sqlite?mode=rwc`.
    /// `sqlite::memory:` gives a throwaway database for tests.
    pub async fn connect(url: &str) -> Result<Self> {
        Self::connect_with_pool_size(url, Self::DEFAULT_POOL_SIZE).await
    }

    /// Connect using `SQLITE_PATH`, falling back to [`DEFAULT_DATABASE_URL`].
    pub async fn from_env() -> Result<Self> {
        let url = std::env::var("SQLITE_PATH").unwrap_or_else(|_| DEFAULT_DATABASE_URL.to_string());
        Self::connect(&url).await
    }

    /// Connect to a SQLite database with a custom pool size.
    pub async fn connect_with_pool_size(url: &str, pool_size: u32) -> Result<Self> {
        let options = SqliteConnectOptions::from_str(url)?
            .create_if_missing(true)
            .foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(pool_size)
            .acquire_timeout(std::time::Duration::from_secs(30))
            .connect_with(options)
            .await?;

        tracing::info!("Connected to database: {} (pool size: {})", url, pool_size);

        Ok(Self { pool })
    }

    /// Run database migrations.
    pub async fn migrate(&self) -> Result<()> {
        tracing::info!("Running database migrations...");

        sqlx::migrate!("./migrations").run(&self.pool).await?;

        tracing::info!("Migrations complete");
        Ok(())
    }

    /// Get a reference to the connection pool.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Close the database connection pool.
    pub async fn close(&self) {
        self.pool.close().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn test_db() -> Database {
        let db = Database::connect("sqlite::memory:").await.unwrap();
        db.migrate().await.unwrap();
        db
    }

    const SENDER: &str = "+13055550100";

    #[tokio::test]
    async fn test_first_exchange_creates_one_conversation_with_two_turns() {
        let db = test_db().await;

        let a = conversation::append_turn(db.pool(), SENDER, Some("Ana"), Role::User, "Hola").await.unwrap();
        let b = conversation::append_turn(db.pool(), SENDER, None, Role::Assistant, "¡Hola Ana!").await.unwrap();
        assert_eq!(a, b);

        let open = conversation::get_open_conversation(db.pool(), SENDER).await.unwrap().unwrap();
        assert_eq!(open.id, a);
        assert_eq!(open.status, ConversationStatus::Bot);
        assert_eq!(open.display_name.as_deref(), Some("Ana"));

        let turns = conversation::get_turns(db.pool(), a).await.unwrap();
        let roles: Vec<Role> = turns.iter().map(|t| t.role).collect();
        assert_eq!(roles, vec![Role::User, Role::Assistant]);
        assert_eq!(turns[0].content, "Hola");
    }

    #[tokio::test]
    async fn test_second_exchange_appends_to_same_conversation() {
        let db = test_db().await;

        for (user, bot) in [("first", "reply one"), ("second", "reply two")] {
            conversation::append_turn(db.pool(), SENDER, None, Role::User, user).await.unwrap();
            conversation::append_turn(db.pool(), SENDER, None, Role::Assistant, bot).await.unwrap();
        }

        let all = conversation::list_conversations(db.pool(), SENDER).await.unwrap();
        assert_eq!(all.len(), 1);

        let turns = conversation::get_turns(db.pool(), all[0].id).await.unwrap();
        let contents: Vec<&str> = turns.iter().map(|t| t.content.as_str()).collect();
        assert_eq!(contents, vec!["first", "reply one", "second", "reply two"]);
    }

    #[tokio::test]
    async fn test_closed_conversation_is_not_reused() {
        let db = test_db().await;

        let first = conversation::append_turn(db.pool(), SENDER, None, Role::User, "hi").await.unwrap();
        conversation::close_conversation(db.pool(), first).await.unwrap();
        assert!(conversation::get_open_conversation(db.pool(), SENDER).await.unwrap().is_none());

        let second = conversation::append_turn(db.pool(), SENDER, None, Role::User, "back again").await.unwrap();
        assert_ne!(first, second);

        let closed = conversation::get_conversation(db.pool(), first).await.unwrap();
        assert_eq!(closed.status, ConversationStatus::Closed);
        assert_eq!(conversation::get_turns(db.pool(), first).await.unwrap().len(), 1);
        assert_eq!(conversation::list_conversations(db.pool(), SENDER).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_hand_off_moves_conversation_out_of_bot_status() {
        let db = test_db().await;

        let id = conversation::append_turn(db.pool(), SENDER, None, Role::User, "agent please").await.unwrap();
        conversation::hand_off_to_human(db.pool(), id).await.unwrap();

        let conv = conversation::get_conversation(db.pool(), id).await.unwrap();
        assert_eq!(conv.status, ConversationStatus::Human);
        assert!(conversation::get_open_conversation(db.pool(), SENDER).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_status_change_on_missing_conversation() {
        let db = test_db().await;
        let result = conversation::close_conversation(db.pool(), 42).await;
        assert!(matches!(result, Err(DatabaseError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_senders_are_independent() {
        let db = test_db().await;

        let a = conversation::append_turn(db.pool(), SENDER, None, Role::User, "a").await.unwrap();
        let b = conversation::append_turn(db.pool(), "+573001234567", None, Role::User, "b").await.unwrap();
        assert_ne!(a, b);
    }

    #[tokio::test]
    async fn test_message_claims() {
        let db = test_db().await;
        let sid = "SM0123456789abcdef0123456789abcdef";

        assert_eq!(processed_message::claim_message(db.pool(), sid).await.unwrap(), MessageClaim::Claimed);
        assert_eq!(processed_message::claim_message(db.pool(), sid).await.unwrap(), MessageClaim::Handled);

        processed_message::release_message(db.pool(), sid).await.unwrap();
        assert_eq!(processed_message::claim_message(db.pool(), sid).await.unwrap(), MessageClaim::Claimed);
    }

    #[tokio::test]
    async fn test_stored_reply_is_pending_until_sent() {
        let db = test_db().await;
        let sid = "SM1";

        processed_message::claim_message(db.pool(), sid).await.unwrap();
        processed_message::store_reply(db.pool(), sid, "Con gusto te ayudo.").await.unwrap();
        assert_eq!(
            processed_message::claim_message(db.pool(), sid).await.unwrap(),
            MessageClaim::Pending {
                reply: "Con gusto te ayudo.".to_string()
            }
        );

        processed_message::mark_sent(db.pool(), sid).await.unwrap();
        assert_eq!(processed_message::claim_message(db.pool(), sid).await.unwrap(), MessageClaim::Handled);
    }

    #[tokio::test]
    async fn test_prune_removes_only_old_message_ids() {
        let db = test_db().await;

        sqlx::query("INSERT INTO processed_messages (message_sid, created_at) VALUES ('SMold', datetime('now', '-3 days'))")
            .execute(db.pool())
            .await
            .unwrap();
        processed_message::claim_message(db.pool(), "SMnew").await.unwrap();

        let removed = processed_message::prune_processed(db.pool(), processed_message::DEFAULT_RETENTION)
            .await
            .unwrap();
        assert_eq!(removed, 1);

        assert_eq!(processed_message::claim_message(db.pool(), "SMold").await.unwrap(), MessageClaim::Claimed);
        assert_eq!(processed_message::claim_message(db.pool(), "SMnew").await.unwrap(), MessageClaim::Handled);
    }
}
