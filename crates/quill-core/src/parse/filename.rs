//! Filename-mention heuristics.
//!
//! Each matcher is an independent function with its own pattern, tried in
//! priority order. The caller keeps only the last mention seen before a
//! fence opens, so the rules here only need to answer "does this single
//! line mention a filename, and which one?".

use once_cell::sync::Lazy;
use regex::Regex;

/// A path-ish token with an extension, e.g. `src/app.js` or `config.json`.
const FILE_TOKEN: &str = r"[A-Za-z0-9_./-]+\.[A-Za-z0-9]+";

/// "create/edit/update/save [a|an|the] `name.ext`" (backticks optional).
static VERB_MENTION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(
        r"(?i)\b(?:create|edit|update|save)\b(?:\s+(?:a|an|the))?\s+`?({FILE_TOKEN})`?"
    ))
    .unwrap()
});

/// "`name.ext` file" or "`name.ext` with ...".
static NAME_THEN_KEYWORD: Lazy<Regex> =
    Lazy::new(|| Regex::new(&format!(r"(?i)`({FILE_TOKEN})`\s+(?:file|with)\b")).unwrap());

/// "file `name.ext`".
static KEYWORD_THEN_NAME: Lazy<Regex> =
    Lazy::new(|| Regex::new(&format!(r"(?i)\bfile\s+`({FILE_TOKEN})`")).unwrap());

/// A markdown heading whose text is exactly the filename.
static HEADING: Lazy<Regex> =
    Lazy::new(|| Regex::new(&format!(r"^###\s+({FILE_TOKEN})\s*$")).unwrap());

/// A line that is nothing but the filename, optionally with a trailing colon.
static BARE_LINE: Lazy<Regex> =
    Lazy::new(|| Regex::new(&format!(r"^({FILE_TOKEN}):?\s*$")).unwrap());

type Matcher = fn(&str) -> Option<String>;

fn verb_mention(line: &str) -> Option<String> {
    VERB_MENTION
        .captures(line)
        .map(|c| c[1].to_string())
}

fn name_then_keyword(line: &str) -> Option<String> {
    NAME_THEN_KEYWORD
        .captures(line)
        .map(|c| c[1].to_string())
}

fn keyword_then_name(line: &str) -> Option<String> {
    KEYWORD_THEN_NAME
        .captures(line)
        .map(|c| c[1].to_string())
}

fn heading(line: &str) -> Option<String> {
    HEADING.captures(line).map(|c| c[1].to_string())
}

fn bare_line(line: &str) -> Option<String> {
    BARE_LINE.captures(line.trim()).map(|c| c[1].to_string())
}

const MATCHERS: &[Matcher] = &[
    verb_mention,
    name_then_keyword,
    keyword_then_name,
    heading,
    bare_line,
];

/// Returns the filename mentioned on this line, if any.
///
/// Matchers are tried in priority order; the first hit wins.
pub fn detect(line: &str) -> Option<String> {
    MATCHERS.iter().find_map(|m| m(line))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verb_with_backticks() {
        assert_eq!(detect("Create `hello.js`:"), Some("hello.js".to_string()));
        assert_eq!(detect("update the src/main.py"), Some("src/main.py".to_string()));
        assert_eq!(detect("Save config.json"), Some("config.json".to_string()));
    }

    #[test]
    fn test_name_then_keyword() {
        assert_eq!(
            detect("Put this in the `index.html` file"),
            Some("index.html".to_string())
        );
        assert_eq!(
            detect("Here is `styles.css` with the fix"),
            Some("styles.css".to_string())
        );
    }

    #[test]
    fn test_keyword_then_name() {
        assert_eq!(
            detect("In the file `app.ts` you need this"),
            Some("app.ts".to_string())
        );
    }

    #[test]
    fn test_heading() {
        assert_eq!(detect("### server.js"), Some("server.js".to_string()));
        assert_eq!(detect("### Setting up server.js stuff"), None);
    }

    #[test]
    fn test_bare_line() {
        assert_eq!(detect("hello.js:"), Some("hello.js".to_string()));
        assert_eq!(detect("hello.js"), Some("hello.js".to_string()));
        assert_eq!(detect("e.g."), None);
    }

    #[test]
    fn test_no_mention() {
        assert_eq!(detect("Run `npm install` afterwards"), None);
        assert_eq!(detect("Just some prose"), None);
    }
}
