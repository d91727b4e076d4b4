//! Engine behavior over whole operation batches.

use quill_core::operation::{ExecutionPolicy, FileAction, Operation};
use quill_execution::danger::DenyAll;
use quill_execution::engine::OperationExecutor;

fn file_op(action: FileAction, path: &str, content: Option<&str>) -> Operation {
    Operation::File {
        action,
        path: path.to_string(),
        content: content.map(str::to_string),
        match_content: None,
    }
}

fn unattended(dir: &std::path::Path) -> OperationExecutor {
    OperationExecutor::new()
        .with_gate(Box::new(DenyAll))
        .with_base_dir(dir)
}

#[tokio::test]
async fn test_batch_length_matches_input_despite_failures() {
    let dir = tempfile::tempdir().unwrap();
    let ops = vec![
        file_op(FileAction::Write, "a.txt", Some("hello")),
        // Fails: cannot delete what was never created.
        file_op(FileAction::Delete, "missing.txt", None),
        // Still runs after the failure above.
        file_op(FileAction::Read, "a.txt", None),
        Operation::command("true"),
        Operation::command("false"),
    ];

    let outcomes = unattended(dir.path())
        .execute(&ops, &ExecutionPolicy::default())
        .await;

    assert_eq!(outcomes.len(), ops.len());
    assert!(outcomes[0].success);
    assert!(!outcomes[1].success);
    assert!(outcomes[2].success);
    assert_eq!(outcomes[2].detail, "hello");
    assert!(outcomes[3].success);
    assert_eq!(outcomes[3].exit_code, Some(0));
    assert!(!outcomes[4].success);
    assert_eq!(outcomes[4].exit_code, Some(1));
}

#[tokio::test]
async fn test_write_creates_parent_directories() {
    let dir = tempfile::tempdir().unwrap();
    let ops = vec![file_op(
        FileAction::Write,
        "deep/nested/dir/file.txt",
        Some("x"),
    )];
    let outcomes = unattended(dir.path())
        .execute(&ops, &ExecutionPolicy::default())
        .await;
    assert!(outcomes[0].success);
    assert_eq!(
        std::fs::read_to_string(dir.path().join("deep/nested/dir/file.txt")).unwrap(),
        "x"
    );
}

#[tokio::test]
async fn test_write_overwrites_existing_file() {
    let dir = tempfile::tempdir().unwrap();
    let executor = unattended(dir.path());
    let policy = ExecutionPolicy::default();

    executor
        .execute(&[file_op(FileAction::Write, "f.txt", Some("old"))], &policy)
        .await;
    executor
        .execute(&[file_op(FileAction::Write, "f.txt", Some("new"))], &policy)
        .await;

    assert_eq!(
        std::fs::read_to_string(dir.path().join("f.txt")).unwrap(),
        "new"
    );
}

#[tokio::test]
async fn test_append_and_edit() {
    let dir = tempfile::tempdir().unwrap();
    let executor = unattended(dir.path());
    let policy = ExecutionPolicy::default();

    executor
        .execute(
            &[
                file_op(FileAction::Write, "f.txt", Some("one two one")),
                file_op(FileAction::Append, "f.txt", Some(" three")),
            ],
            &policy,
        )
        .await;

    let edit = Operation::File {
        action: FileAction::Edit,
        path: "f.txt".to_string(),
        content: Some("ONE".to_string()),
        match_content: Some("one".to_string()),
    };
    let outcomes = executor.execute(&[edit], &policy).await;
    assert!(outcomes[0].success);
    assert_eq!(
        std::fs::read_to_string(dir.path().join("f.txt")).unwrap(),
        "ONE two ONE three"
    );
}

#[tokio::test]
async fn test_edit_missing_file_fails_without_aborting() {
    let dir = tempfile::tempdir().unwrap();
    let ops = vec![
        Operation::File {
            action: FileAction::Edit,
            path: "ghost.txt".to_string(),
            content: Some("x".to_string()),
            match_content: Some("y".to_string()),
        },
        file_op(FileAction::Mkdir, "made", None),
    ];
    let outcomes = unattended(dir.path())
        .execute(&ops, &ExecutionPolicy::default())
        .await;
    assert!(!outcomes[0].success);
    assert!(outcomes[1].success);
    assert!(dir.path().join("made").is_dir());
}

#[tokio::test]
async fn test_edit_without_match_content_overwrites() {
    let dir = tempfile::tempdir().unwrap();
    let executor = unattended(dir.path());
    let policy = ExecutionPolicy::default();

    executor
        .execute(&[file_op(FileAction::Write, "f.txt", Some("old"))], &policy)
        .await;
    let outcomes = executor
        .execute(&[file_op(FileAction::Edit, "f.txt", Some("whole new"))], &policy)
        .await;
    assert!(outcomes[0].success);
    assert_eq!(
        std::fs::read_to_string(dir.path().join("f.txt")).unwrap(),
        "whole new"
    );
}

#[tokio::test]
async fn test_mkdir_is_idempotent() {
    let dir = tempfile::tempdir().unwrap();
    let executor = unattended(dir.path());
    let policy = ExecutionPolicy::default();
    let op = file_op(FileAction::Mkdir, "sub/dir", None);

    assert!(executor.execute(&[op.clone()], &policy).await[0].success);
    assert!(executor.execute(&[op], &policy).await[0].success);
}

#[tokio::test]
async fn test_dry_run_spawns_nothing_and_writes_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let marker = dir.path().join("marker");
    let ops = vec![
        file_op(FileAction::Write, "f.txt", Some("x")),
        Operation::command(format!("touch {}", marker.display())),
    ];
    let policy = ExecutionPolicy {
        dry_run: true,
        ..Default::default()
    };

    let outcomes = unattended(dir.path()).execute(&ops, &policy).await;
    assert!(outcomes.iter().all(|o| o.success));
    assert!(outcomes[1].detail.contains("would execute"));
    assert!(!dir.path().join("f.txt").exists());
    assert!(!marker.exists());
}

#[tokio::test]
async fn test_dangerous_command_cancelled_by_gate() {
    let dir = tempfile::tempdir().unwrap();
    let ops = vec![
        Operation::command("rm -rf /"),
        Operation::command("true"),
    ];
    let outcomes = unattended(dir.path())
        .execute(&ops, &ExecutionPolicy::default())
        .await;

    assert!(!outcomes[0].success);
    assert_eq!(outcomes[0].detail, "cancelled by operator");
    // The batch continues past the cancellation.
    assert!(outcomes[1].success);
}

#[tokio::test]
async fn test_command_working_dir_override() {
    let dir = tempfile::tempdir().unwrap();
    let sub = dir.path().join("sub");
    std::fs::create_dir(&sub).unwrap();

    let op = Operation::Command {
        command: "touch here.txt".to_string(),
        working_dir: Some(sub.to_string_lossy().into_owned()),
    };
    let outcomes = unattended(dir.path())
        .execute(&[op], &ExecutionPolicy::default())
        .await;
    assert!(outcomes[0].success);
    assert!(sub.join("here.txt").exists());
}
