//! Durable conversation store.
//!
//! One JSON document per conversation under `conversations/`, a bounded
//! backup history under `backups/`, and a single `active` pointer file
//! naming the conversation new turns append to. Appends are atomic
//! (tmp + rename) under an exclusive lock; corrupt documents self-heal on
//! load and degrade to empty as a last resort rather than failing the
//! session.

use crate::storage::atomic_json::AtomicJsonFile;
use quill_core::conversation::{Conversation, ConversationSummary, generate_conversation_id};
use quill_core::message::{ConversationMessage, MessageRole};
use quill_core::{QuillError, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Number of prior document generations retained for repair.
const BACKUP_GENERATIONS: usize = 5;

/// Default context-window size for outbound requests.
pub const DEFAULT_CONTEXT_MESSAGES: usize = 10;

/// Filesystem-backed store for conversation documents.
pub struct ConversationStore {
    root: PathBuf,
}

impl ConversationStore {
    /// Creates a store rooted at `root`. Directories are created lazily.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Opens the store at the platform data directory.
    pub fn open_default() -> Result<Self> {
        Ok(Self::new(crate::paths::QuillPaths::data_dir()?))
    }

    fn conversations_dir(&self) -> PathBuf {
        self.root.join("conversations")
    }

    fn backups_dir(&self) -> PathBuf {
        self.root.join("backups")
    }

    fn active_file(&self) -> PathBuf {
        self.root.join("active")
    }

    fn document(&self, id: &str) -> AtomicJsonFile<Conversation> {
        AtomicJsonFile::new(self.conversations_dir().join(format!("{id}.json")))
            .with_backups(self.backups_dir(), BACKUP_GENERATIONS)
    }

    /// Creates an empty conversation document if none exists. Idempotent.
    pub fn create(&self, id: &str) -> Result<Conversation> {
        let doc = self.document(id);
        if let Some(existing) = doc.load()? {
            return Ok(existing);
        }
        let conversation = Conversation::new(id);
        doc.save(&conversation)?;
        debug!(id, "created conversation");
        Ok(conversation)
    }

    /// Appends one message with a freshly captured timestamp.
    ///
    /// The document is loaded (repaired first if corrupt), extended, and
    /// atomically replaced, all under an exclusive lock.
    pub fn append(&self, id: &str, role: MessageRole, content: &str) -> Result<()> {
        let message = ConversationMessage::new(role, content);
        self.document(id).update(Conversation::new(id), |conv| {
            conv.messages.push(message);
            Ok(())
        })
    }

    /// Returns the last `k` messages, oldest first.
    ///
    /// A missing (or unrecoverable) conversation yields an empty window.
    pub fn context_window(&self, id: &str, k: usize) -> Result<Vec<ConversationMessage>> {
        let Some(conversation) = self.document(id).load()? else {
            return Ok(Vec::new());
        };
        Ok(conversation.context_window(k).to_vec())
    }

    /// Enumerates all known conversations, sorted by id (creation order,
    /// since ids are lexically sortable by timestamp).
    pub fn list(&self) -> Result<Vec<ConversationSummary>> {
        let dir = self.conversations_dir();
        if !dir.exists() {
            return Ok(Vec::new());
        }

        let mut summaries = Vec::new();
        for entry in fs::read_dir(&dir)? {
            let path = entry?.path();
            let Some(id) = conversation_id_from_path(&path) else {
                continue;
            };
            match self.document(&id).load() {
                Ok(Some(conv)) => summaries.push(ConversationSummary {
                    id,
                    message_count: conv.messages.len(),
                    last_timestamp: conv.last_timestamp().map(str::to_string),
                }),
                Ok(None) => summaries.push(ConversationSummary {
                    id,
                    message_count: 0,
                    last_timestamp: None,
                }),
                Err(e) => warn!(id, error = %e, "skipping unreadable conversation"),
            }
        }
        summaries.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(summaries)
    }

    /// Points new turns at the given conversation.
    pub fn set_active(&self, id: &str) -> Result<()> {
        fs::create_dir_all(&self.root)?;
        fs::write(self.active_file(), id).map_err(QuillError::from)
    }

    /// Returns the active conversation id.
    ///
    /// On first-ever use (no pointer on disk) a fresh conversation is
    /// created and becomes the active one.
    pub fn get_active(&self) -> Result<String> {
        let pointer = self.active_file();
        if pointer.exists() {
            let id = fs::read_to_string(&pointer)?;
            let id = id.trim().to_string();
            if !id.is_empty() {
                return Ok(id);
            }
        }

        let id = generate_conversation_id();
        self.create(&id)?;
        self.set_active(&id)?;
        debug!(id, "initialized active conversation");
        Ok(id)
    }
}

fn conversation_id_from_path(path: &Path) -> Option<String> {
    if path.extension()? != "json" {
        return None;
    }
    Some(path.file_stem()?.to_string_lossy().into_owned())
}
