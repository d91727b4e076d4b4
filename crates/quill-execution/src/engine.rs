//! Operation execution engine.
//!
//! Consumes the parser's operation list in order and reports one outcome per
//! operation. A failing operation never aborts the batch: the caller always
//! gets back exactly as many outcomes as it submitted operations.

use crate::danger::{self, DangerGate, TerminalGate};
use crate::shell::{self, ShellOutput};
use quill_core::operation::{ExecutionOutcome, ExecutionPolicy, FileAction, Operation};
use std::fs;
use std::io::Write as IoWrite;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, warn};

/// Uniform wall-clock ceiling for spawned commands.
const DEFAULT_COMMAND_TIMEOUT: Duration = Duration::from_secs(300);

/// Longest stderr excerpt carried in a failure outcome.
const STDERR_EXCERPT_LEN: usize = 500;

/// Package managers whose failures can be auto-fixed by initializing a
/// manifest, mapped to the initialization command.
const MANIFEST_FIXES: &[(&str, &str, &str)] = &[
    ("npm", "package.json", "npm init -y"),
    ("yarn", "package.json", "yarn init -y"),
    ("pnpm", "package.json", "pnpm init"),
    ("bun", "package.json", "bun init -y"),
];

/// Executes operation batches against the filesystem and shell.
///
/// The executor is the sole mutator of the filesystem and process space;
/// operations themselves are inert value objects.
pub struct OperationExecutor {
    gate: Box<dyn DangerGate>,
    command_timeout: Duration,
    /// Base directory for relative paths and for commands without an
    /// explicit working directory. Defaults to the process working dir.
    base_dir: Option<PathBuf>,
}

impl Default for OperationExecutor {
    fn default() -> Self {
        Self::new()
    }
}

impl OperationExecutor {
    /// Creates an executor with the interactive danger gate and the default
    /// command timeout.
    pub fn new() -> Self {
        Self {
            gate: Box::new(TerminalGate),
            command_timeout: DEFAULT_COMMAND_TIMEOUT,
            base_dir: None,
        }
    }

    /// Replaces the danger gate (e.g. with [`crate::danger::DenyAll`] for
    /// unattended runs).
    pub fn with_gate(mut self, gate: Box<dyn DangerGate>) -> Self {
        self.gate = gate;
        self
    }

    /// Overrides the command timeout ceiling.
    pub fn with_command_timeout(mut self, timeout: Duration) -> Self {
        self.command_timeout = timeout;
        self
    }

    /// Resolves relative paths against `dir` instead of the process
    /// working directory.
    pub fn with_base_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.base_dir = Some(dir.into());
        self
    }

    /// Executes every operation in order under the given policy.
    ///
    /// Always returns exactly one outcome per submitted operation, in
    /// submission order.
    pub async fn execute(
        &self,
        ops: &[Operation],
        policy: &ExecutionPolicy,
    ) -> Vec<ExecutionOutcome> {
        let mut outcomes = Vec::with_capacity(ops.len());
        for op in ops {
            let outcome = match op {
                Operation::File {
                    action,
                    path,
                    content,
                    match_content,
                } => self.execute_file_op(op, *action, path, content, match_content, policy),
                Operation::Command {
                    command,
                    working_dir,
                } => {
                    self.execute_command_op(op, command, working_dir.as_deref(), policy)
                        .await
                }
            };
            if outcome.success {
                debug!(detail = %outcome.detail, "operation succeeded");
            } else {
                warn!(detail = %outcome.detail, "operation failed");
            }
            outcomes.push(outcome);
        }
        outcomes
    }

    fn resolve(&self, path: &str) -> PathBuf {
        match &self.base_dir {
            Some(base) if Path::new(path).is_relative() => base.join(path),
            _ => PathBuf::from(path),
        }
    }

    fn execute_file_op(
        &self,
        op: &Operation,
        action: FileAction,
        path: &str,
        content: &Option<String>,
        match_content: &Option<String>,
        policy: &ExecutionPolicy,
    ) -> ExecutionOutcome {
        if policy.dry_run {
            return ExecutionOutcome::success(
                op.clone(),
                format!("dry run: would apply {action:?} to {path}"),
            );
        }

        let target = self.resolve(path);
        let content = content.as_deref().unwrap_or_default();
        let result = match action {
            FileAction::Write => write_file(&target, content),
            FileAction::Append => append_file(&target, content),
            FileAction::Edit => edit_file(&target, content, match_content.as_deref()),
            FileAction::Delete => delete_file(&target),
            FileAction::Mkdir => make_dir(&target),
            FileAction::Read => read_file(&target),
        };

        match result {
            Ok(detail) => ExecutionOutcome::success(op.clone(), detail),
            Err(detail) => ExecutionOutcome::failure(op.clone(), detail),
        }
    }

    async fn execute_command_op(
        &self,
        op: &Operation,
        command: &str,
        working_dir: Option<&str>,
        policy: &ExecutionPolicy,
    ) -> ExecutionOutcome {
        if danger::is_dangerous(command) && !policy.force_dangerous {
            if !self.gate.confirm(command) {
                return ExecutionOutcome::failure(op.clone(), "cancelled by operator");
            }
        }

        if policy.dry_run {
            return ExecutionOutcome::success(
                op.clone(),
                format!("dry run: would execute `{command}`"),
            );
        }

        let cwd = working_dir
            .map(PathBuf::from)
            .or_else(|| self.base_dir.clone());

        let mut output = match shell::run_shell_line(command, cwd.as_deref(), self.command_timeout)
            .await
        {
            Ok(output) => output,
            Err(e) => return ExecutionOutcome::failure(op.clone(), e.to_string()),
        };

        if !output.success() && policy.auto_fix {
            if let Some(retried) = self.try_manifest_fix(command, cwd.as_deref()).await {
                output = retried;
            }
        }

        command_outcome(op, command, output)
    }

    /// The single auto-fix rule: a package-manager command that failed in a
    /// directory with no manifest gets one manifest-initialization attempt
    /// followed by one retry of the original command.
    async fn try_manifest_fix(&self, command: &str, cwd: Option<&Path>) -> Option<ShellOutput> {
        let first_word = command.split_whitespace().next()?;
        let (_, manifest, init_cmd) = MANIFEST_FIXES
            .iter()
            .find(|(manager, _, _)| *manager == first_word)?;

        let dir = cwd
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));
        if dir.join(manifest).exists() {
            return None;
        }

        debug!(command = %init_cmd, "auto-fix: initializing manifest before retry");
        let init = shell::run_shell_line(init_cmd, cwd, self.command_timeout)
            .await
            .ok()?;
        if !init.success() {
            warn!(command = %init_cmd, "auto-fix initialization failed");
            return None;
        }

        shell::run_shell_line(command, cwd, self.command_timeout)
            .await
            .ok()
    }
}

fn command_outcome(op: &Operation, command: &str, output: ShellOutput) -> ExecutionOutcome {
    let detail = if output.success() {
        output.stdout.trim_end().to_string()
    } else {
        let excerpt: String = output.stderr.chars().take(STDERR_EXCERPT_LEN).collect();
        format!(
            "`{command}` exited with {}: {}",
            output
                .exit_code
                .map(|c| c.to_string())
                .unwrap_or_else(|| "signal".to_string()),
            excerpt.trim_end()
        )
    };
    ExecutionOutcome::command_result(op.clone(), output.exit_code, detail)
}

fn ensure_parent(path: &Path) -> Result<(), String> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            fs::create_dir_all(parent)
                .map_err(|e| format!("failed to create parent directories: {e}"))?;
        }
    }
    Ok(())
}

fn write_file(path: &Path, content: &str) -> Result<String, String> {
    ensure_parent(path)?;
    fs::write(path, content).map_err(|e| format!("failed to write {}: {e}", path.display()))?;
    Ok(format!("wrote {} bytes to {}", content.len(), path.display()))
}

fn append_file(path: &Path, content: &str) -> Result<String, String> {
    ensure_parent(path)?;
    let mut file = fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|e| format!("failed to open {}: {e}", path.display()))?;
    file.write_all(content.as_bytes())
        .map_err(|e| format!("failed to append to {}: {e}", path.display()))?;
    Ok(format!(
        "appended {} bytes to {}",
        content.len(),
        path.display()
    ))
}

fn edit_file(path: &Path, content: &str, match_content: Option<&str>) -> Result<String, String> {
    if !path.exists() {
        return Err(format!("cannot edit missing file {}", path.display()));
    }
    match match_content {
        Some(needle) if !needle.is_empty() => {
            let existing = fs::read_to_string(path)
                .map_err(|e| format!("failed to read {}: {e}", path.display()))?;
            let occurrences = existing.matches(needle).count();
            let replaced = existing.replace(needle, content);
            fs::write(path, replaced)
                .map_err(|e| format!("failed to write {}: {e}", path.display()))?;
            Ok(format!(
                "replaced {} occurrence(s) in {}",
                occurrences,
                path.display()
            ))
        }
        // No match content: full overwrite, same as a write.
        _ => write_file(path, content),
    }
}

fn delete_file(path: &Path) -> Result<String, String> {
    if !path.exists() {
        return Err(format!("cannot delete missing file {}", path.display()));
    }
    fs::remove_file(path).map_err(|e| format!("failed to delete {}: {e}", path.display()))?;
    Ok(format!("deleted {}", path.display()))
}

fn make_dir(path: &Path) -> Result<String, String> {
    fs::create_dir_all(path)
        .map_err(|e| format!("failed to create directory {}: {e}", path.display()))?;
    Ok(format!("created directory {}", path.display()))
}

fn read_file(path: &Path) -> Result<String, String> {
    fs::read_to_string(path).map_err(|e| format!("failed to read {}: {e}", path.display()))
}
