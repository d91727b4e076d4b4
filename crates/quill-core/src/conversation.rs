//! Conversation domain model.
//!
//! A conversation is an append-only sequence of messages identified by an
//! opaque, lexically-sortable id. The id combines a UTC timestamp prefix
//! with a process-unique suffix so that two conversations created within
//! the same second still get distinct ids.

use crate::message::ConversationMessage;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A conversation: an ordered, append-only message log.
///
/// This is the "pure" domain model that business logic operates on,
/// independent of any specific storage format. Message order is never
/// reordered and messages are never deleted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Conversation {
    /// Unique conversation identifier (timestamp prefix + unique suffix).
    pub id: String,
    /// Ordered message history, oldest first.
    #[serde(default)]
    pub messages: Vec<ConversationMessage>,
}

impl Conversation {
    /// Creates an empty conversation with the given id.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            messages: Vec::new(),
        }
    }

    /// Returns the last `k` messages, oldest first.
    ///
    /// Returns fewer than `k` if the conversation is shorter.
    pub fn context_window(&self, k: usize) -> &[ConversationMessage] {
        let start = self.messages.len().saturating_sub(k);
        &self.messages[start..]
    }

    /// Timestamp of the most recent message, if any.
    pub fn last_timestamp(&self) -> Option<&str> {
        self.messages.last().map(|m| m.timestamp.as_str())
    }
}

/// A lightweight listing entry for one stored conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationSummary {
    pub id: String,
    pub message_count: usize,
    pub last_timestamp: Option<String>,
}

/// Generates a new conversation id.
///
/// Format: `YYYYMMDDHHMMSS-xxxxxxxx` where the suffix is the first 8 hex
/// characters of a v4 UUID. The timestamp prefix makes ids lexically
/// sortable by creation time; the suffix keeps them unique within a second.
pub fn generate_conversation_id() -> String {
    let prefix = Utc::now().format("%Y%m%d%H%M%S");
    let suffix = Uuid::new_v4().simple().to_string();
    format!("{}-{}", prefix, &suffix[..8])
}
