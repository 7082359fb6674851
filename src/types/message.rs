//! Conversation messages and their wire form.

use chrono::Local;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Display format for message timestamps (day.month.year, time).
pub const TIMESTAMP_FORMAT: &str = "%d.%m.%Y, %H:%M:%S";

/// Who wrote a message in the conversation log.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Display, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Sender {
    User,
    Assistant,
}

/// One turn in the conversation log.
///
/// `timestamp` is a display string only; ordering comes from the log itself.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Message {
    pub sender: Sender,
    pub content: String,
    pub timestamp: String,
}

impl Message {
    /// Create a message stamped with the current local time.
    pub fn now(sender: Sender, content: impl Into<String>) -> Self {
        Self {
            sender,
            content: content.into(),
            timestamp: Local::now().format(TIMESTAMP_FORMAT).to_string(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::now(Sender::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::now(Sender::Assistant, content)
    }

    /// Map to the role/content pair sent to the endpoint.
    pub fn to_chat_message(&self) -> ChatMessage {
        let role = match self.sender {
            Sender::User => Role::User,
            _ => Role::Assistant,
        };
        ChatMessage {
            role,
            content: self.content.clone(),
        }
    }
}

/// Conversation role on the wire.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Display, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

/// A role/content pair as carried in a chat request.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}
