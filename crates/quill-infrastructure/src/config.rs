//! Application configuration.
//!
//! A single `config.toml` with serde defaults for every field, loaded
//! leniently: a missing or unparsable file falls back to the defaults so a
//! bad config never blocks a session.

use crate::paths::QuillPaths;
use quill_core::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::warn;

fn default_endpoint() -> String {
    "http://127.0.0.1:8080/chat".to_string()
}

fn default_model() -> String {
    "quill-default".to_string()
}

fn default_context_messages() -> usize {
    10
}

fn default_command_timeout_secs() -> u64 {
    300
}

/// Top-level quill configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuillConfig {
    /// Remote chat endpoint URL.
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    /// Model name passed through to the endpoint.
    #[serde(default = "default_model")]
    pub model: String,
    /// Context-window size for outbound requests.
    #[serde(default = "default_context_messages")]
    pub context_messages: usize,
    /// Wall-clock ceiling for executed commands, in seconds.
    #[serde(default = "default_command_timeout_secs")]
    pub command_timeout_secs: u64,
}

impl Default for QuillConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            model: default_model(),
            context_messages: default_context_messages(),
            command_timeout_secs: default_command_timeout_secs(),
        }
    }
}

impl QuillConfig {
    /// Loads configuration from `path`, falling back to defaults.
    pub fn load(path: &Path) -> Self {
        if !path.exists() {
            return Self::default();
        }
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "cannot read config; using defaults");
                return Self::default();
            }
        };
        match toml::from_str(&content) {
            Ok(config) => config,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "invalid config; using defaults");
                Self::default()
            }
        }
    }

    /// Loads configuration from the platform config location.
    pub fn load_default() -> Self {
        match QuillPaths::config_file() {
            Ok(path) => Self::load(&path),
            Err(_) => Self::default(),
        }
    }

    /// Writes the configuration to `path`, creating parent directories.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, toml::to_string_pretty(self)?)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = TempDir::new().unwrap();
        let config = QuillConfig::load(&dir.path().join("nope.toml"));
        assert_eq!(config, QuillConfig::default());
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "model = \"big\"\n").unwrap();
        let config = QuillConfig::load(&path);
        assert_eq!(config.model, "big");
        assert_eq!(config.context_messages, 10);
    }

    #[test]
    fn test_garbage_file_gives_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "= not toml =").unwrap();
        assert_eq!(QuillConfig::load(&path), QuillConfig::default());
    }

    #[test]
    fn test_save_round_trip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("deep/config.toml");
        let mut config = QuillConfig::default();
        config.command_timeout_secs = 60;
        config.save(&path).unwrap();
        assert_eq!(QuillConfig::load(&path), config);
    }
}
