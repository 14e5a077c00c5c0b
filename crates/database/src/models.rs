//! Database models.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::DatabaseError;

/// Who is handling a conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConversationStatus {
    /// Open and answered by the bot.
    Bot,
    /// Handed off to a human agent; the bot no longer appends to it.
    Human,
    Closed,
}

impl ConversationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConversationStatus::Bot => "bot",
            ConversationStatus::Human => "human",
            ConversationStatus::Closed => "closed",
        }
    }
}

impl fmt::Display for ConversationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ConversationStatus {
    type Err = DatabaseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "bot" => Ok(ConversationStatus::Bot),
            "human" => Ok(ConversationStatus::Human),
            "closed" => Ok(ConversationStatus::Closed),
            other => Err(DatabaseError::InvalidValue {
                field: "status",
                value: other.to_string(),
            }),
        }
    }
}

/// Author of a turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }
}

impl FromStr for Role {
    type Err = DatabaseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user" => Ok(Role::User),
            "assistant" => Ok(Role::Assistant),
            other => Err(DatabaseError::InvalidValue {
                field: "role",
                value: other.to_string(),
            }),
        }
    }
}

/// Raw conversation row.
#[derive(Debug, Clone, FromRow)]
pub(crate) struct ConversationRow {
    pub id: i64,
    pub sender: String,
    pub display_name: Option<String>,
    pub status: String,
    pub created_at: String,
    pub updated_at: String,
}

/// A conversation with one sender.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Conversation {
    pub id: i64,
    /// Sender phone number in E.164 form, without a channel prefix.
    pub sender: String,
    pub display_name: Option<String>,
    pub status: ConversationStatus,
    pub created_at: String,
    pub updated_at: String,
}

impl TryFrom<ConversationRow> for Conversation {
    type Error = DatabaseError;

    fn try_from(row: ConversationRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: row.id,
            sender: row.sender,
            display_name: row.display_name,
            status: row.status.parse()?,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(Debug, Clone, FromRow)]
pub(crate) struct TurnRow {
    pub id: i64,
    pub conversation_id: i64,
    pub role: String,
    pub content: String,
    pub created_at: String,
}

/// One role-tagged message in a conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    pub id: i64,
    pub conversation_id: i64,
    pub role: Role,
    pub content: String,
    pub created_at: String,
}

impl TryFrom<TurnRow> for Turn {
    type Error = DatabaseError;

    fn try_from(row: TurnRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: row.id,
            conversation_id: row.conversation_id,
            role: row.role.parse()?,
            content: row.content,
            created_at: row.created_at,
        })
    }
}
