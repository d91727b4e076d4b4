//! End-to-end parser scenarios over realistic assistant replies.

use quill_core::operation::{FileAction, Operation};
use quill_core::parse::parse;

#[test]
fn test_file_then_command_scenario() {
    let text = "Create `hello.js`:\n\
                ```javascript\n\
                console.log(\"hi\");\n\
                ```\n\
                Run `npm install`\n";

    let ops = parse(text);
    assert_eq!(
        ops,
        vec![
            Operation::File {
                action: FileAction::Write,
                path: "hello.js".to_string(),
                content: Some("console.log(\"hi\");".to_string()),
                match_content: None,
            },
            Operation::Command {
                command: "npm install".to_string(),
                working_dir: None,
            },
        ]
    );
}

#[test]
fn test_bare_interpreter_alone_yields_nothing() {
    assert!(parse("`node`").is_empty());
    assert!(parse("$ python").is_empty());
    assert!(parse("run: `bash`").is_empty());
}

#[test]
fn test_fence_balance() {
    // Three well-formed pairs, no filename mentions: only the two blocks
    // with a real language tag become writes.
    let text = "```python\na\n```\n```\nb\n```\n```json\nc\n```\n";
    let ops = parse(text);
    let writes = ops
        .iter()
        .filter(|op| matches!(op, Operation::File { .. }))
        .count();
    assert_eq!(writes, 2);
}

#[test]
fn test_multi_file_reply() {
    let text = "First create `index.html`:\n\
                ```html\n\
                <!doctype html>\n\
                ```\n\
                Then the stylesheet:\n\
                ```css\n\
                body {}\n\
                ```\n\
                Finally run: `python -m http.server`\n";

    let ops = parse(text);
    assert_eq!(ops.len(), 3);
    assert!(matches!(
        &ops[0],
        Operation::File { path, .. } if path == "index.html"
    ));
    // No mention between the blocks: the css block falls back to its
    // language default instead of inheriting index.html.
    assert!(matches!(
        &ops[1],
        Operation::File { path, .. } if path == "styles.css"
    ));
    assert!(matches!(
        &ops[2],
        Operation::Command { command, .. } if command == "python -m http.server"
    ));
}

#[test]
fn test_parse_never_fails_on_junk() {
    let junk = "``` ``` ``` `$` $ \n```wat\n";
    let _ = parse(junk);
    assert!(parse("````").is_empty());
}
