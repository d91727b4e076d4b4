//! Quill request client: bounded-retry access to the remote chat endpoint.

pub mod client;
pub mod schema;

pub use client::ChatClient;
pub use schema::{ChatReply, ChatRequest, ContextMessage};
