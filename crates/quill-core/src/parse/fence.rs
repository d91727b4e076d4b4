//! Fenced-block extraction (pass A of the response parser).
//!
//! A two-state line scanner: OUTSIDE until a fence-open marker, INSIDE until
//! the matching close. Each closed block becomes at most one file-write
//! operation. Block content is preserved exactly (newline-joined).

use super::filename;
use crate::operation::Operation;
use once_cell::sync::Lazy;
use regex::Regex;

/// Fence-open marker: three backticks, optionally followed by a language tag.
static FENCE_OPEN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^```([A-Za-z0-9_+#.-]+)?\s*$").unwrap());

/// Extracts one `Write` operation per attributable fenced block, in order.
///
/// Path resolution per block, in priority order:
/// 1. the most recent filename mentioned before the fence opened;
/// 2. the per-language default filename;
/// 3. none - the block is dropped (unattributed plaintext fences are not
///    assumed to be files).
pub fn extract_file_operations(text: &str) -> Vec<Operation> {
    let mut ops = Vec::new();
    let mut inside = false;
    let mut language = String::new();
    // Filename captured from the prose at the moment the fence opened.
    let mut block_mention: Option<String> = None;
    let mut buffer: Vec<&str> = Vec::new();
    let mut last_mention: Option<String> = None;

    for line in text.lines() {
        if let Some(name) = filename::detect(line) {
            last_mention = Some(name);
        }

        if !inside {
            if let Some(caps) = FENCE_OPEN.captures(line) {
                language = caps
                    .get(1)
                    .map(|m| m.as_str().to_lowercase())
                    .unwrap_or_else(|| "plaintext".to_string());
                block_mention = last_mention.clone();
                buffer.clear();
                inside = true;
            }
        } else if line.trim_end() == "```" {
            let path = block_mention.take().or_else(|| default_filename(&language));
            if let Some(path) = path {
                ops.push(Operation::write(path, buffer.join("\n")));
            }
            // A closed block must not leak its filename into the next,
            // unrelated block.
            last_mention = None;
            inside = false;
        } else {
            buffer.push(line);
        }
    }

    // An unterminated fence at end of input produces nothing.
    ops
}

/// Default filename for a fence language tag.
///
/// Empty and plaintext tags get no default: writing an unattributed block
/// to a made-up path risks clobbering unrelated files.
fn default_filename(language: &str) -> Option<String> {
    let name = match language {
        "plaintext" | "text" | "txt" => return None,
        "javascript" | "js" => "app.js",
        "typescript" | "ts" => "app.ts",
        "python" | "py" => "app.py",
        "json" => "config.json",
        "html" => "index.html",
        "css" => "styles.css",
        "bash" | "sh" | "shell" | "zsh" => "script.sh",
        "rust" | "rs" => "main.rs",
        other => return Some(format!("file.{other}")),
    };
    Some(name.to_string())
}
