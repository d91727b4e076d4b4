//! Quill domain types and the response parser.
//!
//! This crate holds the pure core of the system: conversation and message
//! models, the operation types produced by parsing and consumed by the
//! execution engine, the shared error type, and the response parser itself.

pub mod conversation;
pub mod error;
pub mod message;
pub mod operation;
pub mod parse;

pub use conversation::{Conversation, ConversationSummary, generate_conversation_id};
pub use error::{QuillError, Result};
pub use message::{ConversationMessage, MessageRole};
pub use operation::{ExecutionOutcome, ExecutionPolicy, FileAction, Operation};
