//! Quill infrastructure: durable conversation storage, paths, and config.

pub mod config;
pub mod conversation_store;
pub mod paths;
pub mod storage;

pub use config::QuillConfig;
pub use conversation_store::{ConversationStore, DEFAULT_CONTEXT_MESSAGES};
pub use paths::QuillPaths;
