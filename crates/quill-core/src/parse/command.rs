//! Command extraction (pass B of the response parser).
//!
//! Runs over every line independently of fence state. Each line yields at
//! most one candidate command; candidates that are a bare interpreter name
//! are rejected (they would hang waiting on stdin), and survivors are
//! deduplicated by exact text while preserving first-seen order.

use crate::operation::Operation;
use once_cell::sync::Lazy;
use regex::Regex;

/// "run: `...`", "execute: `...`", "command: `...`".
static RUN_DIRECTIVE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\b(?:run|execute|command):\s*`([^`]+)`").unwrap());

/// A shell-prompt line: "$ <command>".
static PROMPT_LINE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\$\s+(\S.*)$").unwrap());

/// Backtick-delimited text beginning with a known command verb.
static KNOWN_VERB: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"`((?:npm|yarn|pnpm|bun|node|python|git|mkdir|ls|cat|echo|touch|cp|mv|rm|bash|sh|make)\b[^`]*)`",
    )
    .unwrap()
});

/// Interpreter names that must never be executed without arguments: the
/// spawned process would block forever reading stdin.
const BARE_INTERPRETERS: &[&str] = &[
    "node", "python", "python3", "ruby", "perl", "php", "bash", "sh",
];

type Matcher = fn(&str) -> Option<String>;

fn run_directive(line: &str) -> Option<String> {
    RUN_DIRECTIVE.captures(line).map(|c| c[1].to_string())
}

fn prompt_line(line: &str) -> Option<String> {
    PROMPT_LINE.captures(line).map(|c| c[1].to_string())
}

fn known_verb(line: &str) -> Option<String> {
    KNOWN_VERB.captures(line).map(|c| c[1].to_string())
}

const MATCHERS: &[Matcher] = &[run_directive, prompt_line, known_verb];

fn detect(line: &str) -> Option<String> {
    MATCHERS.iter().find_map(|m| m(line))
}

/// Extracts command operations from the whole reply text.
pub fn extract_command_operations(text: &str) -> Vec<Operation> {
    let mut commands: Vec<String> = Vec::new();

    for line in text.lines() {
        let Some(candidate) = detect(line) else {
            continue;
        };
        let candidate = candidate.trim().to_string();
        if candidate.is_empty() || BARE_INTERPRETERS.contains(&candidate.as_str()) {
            continue;
        }
        if !commands.contains(&candidate) {
            commands.push(candidate);
        }
    }

    commands.into_iter().map(Operation::command).collect()
}
