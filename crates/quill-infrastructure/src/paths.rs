//! Unified path management for quill state.
//!
//! # Directory Structure
//!
//! ```text
//! ~/.config/quill/             # Config directory
//! └── config.toml              # Application configuration
//!
//! ~/.local/share/quill/        # Data directory
//! ├── conversations/           # One JSON document per conversation
//! ├── backups/                 # Prior generations of mutated documents
//! └── active                   # Active-conversation pointer
//! ```

use quill_core::{QuillError, Result};
use std::path::PathBuf;

/// Resolves quill's config and data locations for the current platform.
pub struct QuillPaths;

impl QuillPaths {
    /// Returns the quill configuration directory (e.g. `~/.config/quill`).
    pub fn config_dir() -> Result<PathBuf> {
        dirs::config_dir()
            .map(|d| d.join("quill"))
            .ok_or_else(|| QuillError::config("cannot determine config directory"))
    }

    /// Returns the quill data directory (e.g. `~/.local/share/quill`).
    pub fn data_dir() -> Result<PathBuf> {
        dirs::data_dir()
            .map(|d| d.join("quill"))
            .ok_or_else(|| QuillError::config("cannot determine data directory"))
    }

    /// Returns the path to the main configuration file.
    pub fn config_file() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join("config.toml"))
    }
}
