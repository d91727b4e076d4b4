//! Atomic, self-healing JSON document storage.
//!
//! Documents are replaced via tmp-file-plus-rename with an fsync in between,
//! so a crash mid-write leaves either the old document or the new one on
//! disk, never a truncated hybrid. Before a destructive rewrite the previous
//! generation is copied into a bounded backup history, which the loader can
//! fall back to when a document fails validation and cannot be repaired.

use fs2::FileExt;
use once_cell::sync::Lazy;
use quill_core::{QuillError, Result};
use regex::Regex;
use serde::{Serialize, de::DeserializeOwned};
use std::fs::{self, File, OpenOptions};
use std::io::Write as IoWrite;
use std::marker::PhantomData;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Trailing separators before a closing bracket: the single most common
/// corruption seen in hand-edited or interrupted JSON documents.
static TRAILING_SEPARATOR: Lazy<Regex> = Lazy::new(|| Regex::new(r",\s*([\]}])").unwrap());

/// Strips trailing commas immediately preceding `]` or `}`.
pub fn repair_trailing_separators(text: &str) -> String {
    TRAILING_SEPARATOR.replace_all(text, "$1").into_owned()
}

/// A handle to one atomically-replaced JSON document.
///
/// Provides:
/// - **Atomicity**: updates are all-or-nothing via tmp file + atomic rename
/// - **Durability**: explicit fsync before rename
/// - **Isolation**: an exclusive file lock around read-modify-write updates
/// - **Self-healing**: trailing-separator repair, then backup restore, then
///   degradation to "absent" - a corrupt document never fails the caller
pub struct AtomicJsonFile<T> {
    path: PathBuf,
    backup_dir: Option<PathBuf>,
    max_backups: usize,
    _phantom: PhantomData<T>,
}

impl<T> AtomicJsonFile<T>
where
    T: Serialize + DeserializeOwned,
{
    /// Creates a handle with no backup history.
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            backup_dir: None,
            max_backups: 0,
            _phantom: PhantomData,
        }
    }

    /// Enables backups: before each rewrite of an existing document, a copy
    /// is kept under `dir`, retaining at most `generations` copies.
    pub fn with_backups(mut self, dir: PathBuf, generations: usize) -> Self {
        self.backup_dir = Some(dir);
        self.max_backups = generations;
        self
    }

    /// Returns the document path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Loads and deserializes the document.
    ///
    /// Returns `Ok(None)` when the file doesn't exist, is empty, or is
    /// corrupt beyond repair with no usable backup. The last case is logged;
    /// it degrades rather than blocking the caller.
    pub fn load(&self) -> Result<Option<T>> {
        if !self.path.exists() {
            return Ok(None);
        }

        let content = fs::read_to_string(&self.path)?;
        if content.trim().is_empty() {
            return Ok(None);
        }

        if let Ok(data) = serde_json::from_str::<T>(&content) {
            return Ok(Some(data));
        }

        // First repair attempt: strip trailing separators and re-validate.
        let repaired = repair_trailing_separators(&content);
        if let Ok(data) = serde_json::from_str::<T>(&repaired) {
            info!(path = %self.path.display(), "repaired document with trailing separators");
            return Ok(Some(data));
        }

        // Second: fall back to the most recent parsable backup.
        if let Some(data) = self.restore_from_backup() {
            return Ok(Some(data));
        }

        warn!(
            path = %self.path.display(),
            "document is corrupt beyond repair and has no usable backup; treating as absent"
        );
        Ok(None)
    }

    /// Saves the document atomically, retaining a backup of the previous
    /// generation when backups are enabled.
    pub fn save(&self, data: &T) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent)?;
            }
        }

        if self.path.exists() {
            self.rotate_backups()?;
        }

        let json = serde_json::to_string_pretty(data)?;
        let tmp_path = self.temp_path()?;
        let mut tmp_file = File::create(&tmp_path)?;
        tmp_file.write_all(json.as_bytes())?;
        tmp_file.sync_all()?;
        drop(tmp_file);

        fs::rename(&tmp_path, &self.path)?;
        Ok(())
    }

    /// Performs a locked read-modify-write update.
    ///
    /// Concurrent processes appending to the same document serialize on the
    /// lock; last writer wins on the rename either way, but the document is
    /// never left unparsable.
    pub fn update<F>(&self, default_value: T, f: F) -> Result<()>
    where
        F: FnOnce(&mut T) -> Result<()>,
    {
        let _lock = FileLock::acquire(&self.path)?;
        let mut data = self.load()?.unwrap_or(default_value);
        f(&mut data)?;
        self.save(&data)
    }

    fn temp_path(&self) -> Result<PathBuf> {
        let parent = self
            .path
            .parent()
            .ok_or_else(|| QuillError::storage("document path has no parent directory"))?;
        let file_name = self
            .path
            .file_name()
            .ok_or_else(|| QuillError::storage("document path has no file name"))?;
        Ok(parent.join(format!(".{}.tmp", file_name.to_string_lossy())))
    }

    fn backup_path(&self, generation: usize) -> Option<PathBuf> {
        let dir = self.backup_dir.as_ref()?;
        let file_name = self.path.file_name()?;
        Some(dir.join(format!("{}.{generation}", file_name.to_string_lossy())))
    }

    /// Shifts existing backups one generation older and copies the current
    /// document into generation 1. The oldest generation falls off.
    fn rotate_backups(&self) -> Result<()> {
        if self.max_backups == 0 {
            return Ok(());
        }
        let Some(dir) = self.backup_dir.as_ref() else {
            return Ok(());
        };
        fs::create_dir_all(dir)?;

        for generation in (1..self.max_backups).rev() {
            let (Some(from), Some(to)) = (
                self.backup_path(generation),
                self.backup_path(generation + 1),
            ) else {
                return Ok(());
            };
            if from.exists() {
                fs::rename(&from, &to)?;
            }
        }
        if let Some(newest) = self.backup_path(1) {
            fs::copy(&self.path, &newest)?;
        }
        Ok(())
    }

    /// Returns the newest backup generation that parses, if any.
    fn restore_from_backup(&self) -> Option<T> {
        for generation in 1..=self.max_backups {
            let path = self.backup_path(generation)?;
            let Ok(content) = fs::read_to_string(&path) else {
                continue;
            };
            if let Ok(data) = serde_json::from_str::<T>(&content) {
                info!(
                    path = %self.path.display(),
                    backup = %path.display(),
                    "restored document from backup"
                );
                return Some(data);
            }
        }
        None
    }
}

/// An exclusive file lock that releases on drop.
struct FileLock {
    #[allow(dead_code)]
    file: File,
    lock_path: PathBuf,
}

impl FileLock {
    fn acquire(path: &Path) -> Result<Self> {
        let lock_path = path.with_extension("lock");
        if let Some(parent) = lock_path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent)?;
            }
        }

        let file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(false)
            .open(&lock_path)?;
        file.lock_exclusive()
            .map_err(|e| QuillError::storage(format!("failed to acquire lock: {e}")))?;

        Ok(FileLock { file, lock_path })
    }
}

impl Drop for FileLock {
    fn drop(&mut self) {
        // Unlock is automatic when the handle is dropped; removing the lock
        // file is best effort.
        let _ = fs::remove_file(&self.lock_path);
    }
}
