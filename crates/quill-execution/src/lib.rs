//! Quill operation execution engine.
//!
//! Applies parsed operations to the real filesystem and shell under an
//! explicit [`quill_core::ExecutionPolicy`]. Shell access is isolated behind
//! the [`shell::run_shell_line`] seam; destructive commands go through the
//! [`danger::DangerGate`] first.

pub mod danger;
pub mod engine;
pub mod shell;

pub use danger::{DangerGate, DenyAll, TerminalGate};
pub use engine::OperationExecutor;
pub use shell::{ShellOutput, run_shell_line};
