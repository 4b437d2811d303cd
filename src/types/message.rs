//! Conversation message types
//!
//! A conversation is an ordered, chronological list of role-tagged messages.

use std::fmt;

use serde::{Deserialize, Serialize};

// ─────────────────────────────────────────────────────────────────
// Role
// ─────────────────────────────────────────────────────────────────

/// Author of a conversation message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
    System,
}

impl Role {
    /// Wire name used by chat-completion APIs
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Assistant => "assistant",
            Role::System => "system",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ─────────────────────────────────────────────────────────────────
// Message
// ─────────────────────────────────────────────────────────────────

/// A single conversation message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
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

    #[cfg(test)]
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn is_user(&self) -> bool {
        self.role == Role::User
    }
}

/// Ordered conversation history, oldest first
pub type ConversationHistory = Vec<Message>;

/// Content of the most recent user message that is not blank.
pub fn last_user_message(history: &[Message]) -> Option<&str> {
    history
        .iter()
        .rev()
        .find(|m| m.is_user())
        .map(|m| m.content.as_str())
        .filter(|content| !content.trim().is_empty())
}
