//! Wire schema for the remote chat endpoint.
//!
//! The reply is modeled as a small explicit schema with named optional
//! fields rather than a generic dynamic map; a transport success whose body
//! lacks the reply field is treated as a failed attempt by the client.

use quill_core::message::ConversationMessage;
use serde::{Deserialize, Serialize};

/// One context message included with an outbound request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContextMessage {
    pub role: String,
    pub content: String,
}

impl From<&ConversationMessage> for ContextMessage {
    fn from(message: &ConversationMessage) -> Self {
        Self {
            role: message.role.as_str().to_string(),
            content: message.content.clone(),
        }
    }
}

/// The request body sent to the remote endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct ChatRequest {
    pub message: String,
    pub conversation_id: String,
    pub context: Vec<ContextMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
}

/// The reply body returned by the remote endpoint.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ChatReply {
    /// The generated reply text. Absence makes the attempt a failure.
    #[serde(default)]
    pub response: Option<String>,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub done: Option<bool>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use quill_core::message::MessageRole;

    #[test]
    fn test_context_message_from_conversation_message() {
        let msg = ConversationMessage::new(MessageRole::Assistant, "sure");
        let ctx = ContextMessage::from(&msg);
        assert_eq!(ctx.role, "assistant");
        assert_eq!(ctx.content, "sure");
    }

    #[test]
    fn test_reply_tolerates_extra_fields() {
        let reply: ChatReply =
            serde_json::from_str(r#"{"response": "ok", "tokens": 12, "extra": {}}"#).unwrap();
        assert_eq!(reply.response.as_deref(), Some("ok"));
    }

    #[test]
    fn test_reply_without_response_field() {
        let reply: ChatReply = serde_json::from_str(r#"{"done": true}"#).unwrap();
        assert!(reply.response.is_none());
    }
}
