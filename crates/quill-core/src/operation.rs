//! Operation types: the actions extracted from an assistant reply.
//!
//! Operations are value objects produced fresh per parse call. They carry no
//! ownership over filesystem state; the execution engine is the sole mutator
//! of the filesystem and process space.

use serde::{Deserialize, Serialize};

/// The kind of filesystem action a file operation performs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FileAction {
    /// Replace file contents entirely, creating parent directories.
    Write,
    /// Append to the end of the file, creating it if absent.
    Append,
    /// Replace occurrences of `match_content` in an existing file, or
    /// overwrite entirely when no match content is given.
    Edit,
    /// Remove the file.
    Delete,
    /// Create the directory and its parents.
    Mkdir,
    /// Load file contents into the outcome detail.
    Read,
}

/// One atomic intended action extracted from a reply.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Operation {
    /// A filesystem mutation or read.
    File {
        action: FileAction,
        path: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        content: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        match_content: Option<String>,
    },
    /// A shell command, treated as an opaque single line.
    Command {
        command: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        working_dir: Option<String>,
    },
}

impl Operation {
    /// Creates a file-write operation.
    pub fn write(path: impl Into<String>, content: impl Into<String>) -> Self {
        Operation::File {
            action: FileAction::Write,
            path: path.into(),
            content: Some(content.into()),
            match_content: None,
        }
    }

    /// Creates a command operation with no explicit working directory.
    pub fn command(command: impl Into<String>) -> Self {
        Operation::Command {
            command: command.into(),
            working_dir: None,
        }
    }
}

/// Policy flags controlling how a batch of operations is executed.
///
/// Modeled as an explicit value object passed into the engine, never as
/// ambient process state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ExecutionPolicy {
    /// Report what would happen without touching the filesystem or spawning
    /// processes.
    pub dry_run: bool,
    /// Allow the single known corrective retry (package-manager manifest
    /// initialization) after a failed command.
    pub auto_fix: bool,
    /// Skip the interactive confirmation gate for dangerous commands.
    pub force_dangerous: bool,
}

/// The result of executing a single operation.
///
/// The engine emits exactly one outcome per submitted operation, in
/// submission order, regardless of individual failures.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionOutcome {
    /// The operation this outcome belongs to.
    pub operation: Operation,
    /// Whether the operation succeeded.
    pub success: bool,
    /// Human-readable detail: file content for reads, stderr excerpt for
    /// failed commands, a description otherwise.
    pub detail: String,
    /// Process exit code for command operations.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exit_code: Option<i32>,
}

impl ExecutionOutcome {
    /// Creates a success outcome for a non-command operation.
    pub fn success(operation: Operation, detail: impl Into<String>) -> Self {
        Self {
            operation,
            success: true,
            detail: detail.into(),
            exit_code: None,
        }
    }

    /// Creates a failure outcome for a non-command operation.
    pub fn failure(operation: Operation, detail: impl Into<String>) -> Self {
        Self {
            operation,
            success: false,
            detail: detail.into(),
            exit_code: None,
        }
    }

    /// Creates an outcome for a finished command.
    pub fn command_result(
        operation: Operation,
        exit_code: Option<i32>,
        detail: impl Into<String>,
    ) -> Self {
        Self {
            operation,
            success: exit_code == Some(0),
            detail: detail.into(),
            exit_code,
        }
    }
}
