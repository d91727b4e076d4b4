//! Response parser: recovers intended operations from free-form reply text.
//!
//! The parser is a pure, total function of the input text: it never fails,
//! and an input with no recognizable operations yields an empty sequence.
//! Two independent passes run over the same text:
//!
//! - pass A ([`fence`]) extracts fenced code blocks into file writes, using
//!   the filename-mention heuristics in [`filename`] to attribute paths;
//! - pass B ([`command`]) extracts shell commands.
//!
//! File operations are emitted before command operations, matching the
//! dominant "here is the code, now run it" shape of generated replies.

pub mod command;
pub mod fence;
pub mod filename;

use crate::operation::Operation;

/// Parses one reply into an ordered operation list.
pub fn parse(text: &str) -> Vec<Operation> {
    let mut ops = fence::extract_file_operations(text);
    ops.extend(command::extract_command_operations(text));
    ops
}
