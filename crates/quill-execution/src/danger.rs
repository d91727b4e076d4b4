//! Dangerous-command gate.
//!
//! A small fixed set of catastrophic command shapes must be confirmed by the
//! operator before they run. This is a safety gate, not a sandbox: it only
//! catches the known-fatal patterns, and `force_dangerous` bypasses it.

use colored::Colorize;
use once_cell::sync::Lazy;
use regex::Regex;
use std::io::{self, BufRead, Write};

static DANGEROUS_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        // Recursive delete rooted at / or the home directory.
        r"\brm\s+(-[A-Za-z]+\s+)*(/|~)\s*(\*)?\s*$",
        // Raw writes to a block device.
        r"\bdd\b.*\bof=/dev/",
        r">\s*/dev/sd[a-z]",
        // Filesystem format invocations.
        r"\bmkfs(\.[A-Za-z0-9]+)?\b",
    ]
    .iter()
    .map(|p| Regex::new(p).unwrap())
    .collect()
});

/// Returns true if the command matches a known catastrophic pattern.
pub fn is_dangerous(command: &str) -> bool {
    DANGEROUS_PATTERNS.iter().any(|p| p.is_match(command))
}

/// Decides whether a dangerous command may proceed.
///
/// The engine consults the gate only for commands flagged by
/// [`is_dangerous`] when the policy does not force them through.
pub trait DangerGate: Send + Sync {
    /// Returns true to allow the command, false to cancel it.
    fn confirm(&self, command: &str) -> bool;
}

/// Interactive gate: prints a warning and reads one line from stdin.
///
/// Accepts `y` or `yes` (case-insensitive); anything else, including EOF,
/// declines.
pub struct TerminalGate;

impl DangerGate for TerminalGate {
    fn confirm(&self, command: &str) -> bool {
        eprintln!(
            "{} {}",
            "This command looks destructive:".red().bold(),
            command.yellow()
        );
        eprint!("{}", "Run it anyway? [y/N] ".red());
        let _ = io::stderr().flush();

        let mut answer = String::new();
        if io::stdin().lock().read_line(&mut answer).is_err() {
            return false;
        }
        matches!(answer.trim().to_lowercase().as_str(), "y" | "yes")
    }
}

/// Non-interactive gate that declines everything. Suitable for unattended
/// runs where blocking on stdin is unacceptable.
pub struct DenyAll;

impl DangerGate for DenyAll {
    fn confirm(&self, _command: &str) -> bool {
        false
    }
}
