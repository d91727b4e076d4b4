//! The single narrow seam between the engine and the shell.
//!
//! Commands are opaque single lines delegated to `sh -c`; quoting and
//! globbing are the shell's problem. Every spawn is bounded by a wall-clock
//! ceiling so no operation can hang the session.

use quill_core::{QuillError, Result};
use std::path::Path;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;

/// Captured output of one shell invocation.
#[derive(Debug, Clone)]
pub struct ShellOutput {
    pub stdout: String,
    pub stderr: String,
    /// None when the process was killed by a signal.
    pub exit_code: Option<i32>,
}

impl ShellOutput {
    /// True iff the process exited with status zero.
    pub fn success(&self) -> bool {
        self.exit_code == Some(0)
    }
}

/// Runs one shell-interpreted command line with a bounded timeout.
///
/// Returns `Err` only for spawn failures and timeouts; a non-zero exit is a
/// normal `Ok` result carried in [`ShellOutput`].
pub async fn run_shell_line(
    command: &str,
    working_dir: Option<&Path>,
    timeout: Duration,
) -> Result<ShellOutput> {
    let mut cmd = Command::new("sh");
    cmd.arg("-c")
        .arg(command)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);
    if let Some(dir) = working_dir {
        cmd.current_dir(dir);
    }

    let child = cmd
        .spawn()
        .map_err(|e| QuillError::execution(format!("failed to spawn shell: {e}")))?;

    let output = tokio::time::timeout(timeout, child.wait_with_output())
        .await
        .map_err(|_| {
            QuillError::execution(format!(
                "command timed out after {}s: {command}",
                timeout.as_secs()
            ))
        })?
        .map_err(|e| QuillError::execution(format!("failed to collect output: {e}")))?;

    Ok(ShellOutput {
        stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
        stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        exit_code: output.status.code(),
    })
}
