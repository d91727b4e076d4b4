//! Auto-fix retry: a failed package-manager command in a manifest-less
//! directory gets one manifest init plus one retry.
//!
//! Uses a stub `npm` on PATH; kept in its own test binary because PATH is
//! process-wide state.

#![cfg(unix)]

use quill_core::operation::{ExecutionPolicy, Operation};
use quill_execution::danger::DenyAll;
use quill_execution::engine::OperationExecutor;
use std::fs;
use std::os::unix::fs::PermissionsExt;

const STUB_NPM: &str = r#"#!/bin/sh
echo "npm $@" >> invocations.log
if [ "$1" = "init" ]; then
    echo '{}' > package.json
    exit 0
fi
if [ -f package.json ]; then
    exit 0
fi
exit 1
"#;

fn install_stub_npm(bin_dir: &std::path::Path) {
    let npm = bin_dir.join("npm");
    fs::write(&npm, STUB_NPM).unwrap();
    fs::set_permissions(&npm, fs::Permissions::from_mode(0o755)).unwrap();

    let path = format!(
        "{}:{}",
        bin_dir.display(),
        std::env::var("PATH").unwrap_or_default()
    );
    // Safety: this test binary is single-test; nothing else reads PATH
    // concurrently.
    unsafe { std::env::set_var("PATH", path) };
}

#[tokio::test]
async fn test_manifest_init_then_single_retry() {
    let bin = tempfile::tempdir().unwrap();
    let work = tempfile::tempdir().unwrap();
    install_stub_npm(bin.path());

    let executor = OperationExecutor::new()
        .with_gate(Box::new(DenyAll))
        .with_base_dir(work.path());
    let policy = ExecutionPolicy {
        auto_fix: true,
        ..Default::default()
    };

    let outcomes = executor
        .execute(&[Operation::command("npm install")], &policy)
        .await;

    assert!(outcomes[0].success, "retry after init should succeed");
    assert!(work.path().join("package.json").exists());

    let log = fs::read_to_string(work.path().join("invocations.log")).unwrap();
    let calls: Vec<&str> = log.lines().collect();
    assert_eq!(calls, vec!["npm install", "npm init -y", "npm install"]);

    // With the manifest in place a second run needs no fix.
    let outcomes = executor
        .execute(&[Operation::command("npm install")], &policy)
        .await;
    assert!(outcomes[0].success);
    let log = fs::read_to_string(work.path().join("invocations.log")).unwrap();
    assert_eq!(log.lines().count(), 4);
}
