//! Integration tests for explicit session replacement.
//!
//! Validates:
//! - the fixed reset acknowledgement
//! - reset replacing the live process and clearing its state
//! - reset on a cold runner simply starting the first process
//! - close being idempotent and followed by a transparent restart

use tempfile::tempdir;

use super::test_helpers::echo_runner;

#[tokio::test]
async fn reset_reports_a_fixed_acknowledgement() {
    let dir = tempdir().expect("tempdir");
    let runner = echo_runner(&dir);

    let result = runner.reset().await.expect("reset");

    assert!(result.success);
    assert_eq!(result.output, "GAP session reset.");
    assert_eq!(result.error, None);
}

#[tokio::test]
async fn reset_replaces_the_live_process() {
    let dir = tempdir().expect("tempdir");
    let runner = echo_runner(&dir);

    // Two commands against the first generation move its line counter.
    let first = runner.execute("count", None).await.expect("execute");
    assert_eq!(first.output, "2");
    let second = runner.execute("count", None).await.expect("execute");
    assert_eq!(second.output, "4");

    runner.reset().await.expect("reset");

    // The counter starting over proves a fresh process, not a cleared one.
    let after = runner.execute("count", None).await.expect("execute");
    assert_eq!(after.output, "2");
}

#[tokio::test]
async fn reset_on_a_cold_runner_starts_the_first_process() {
    let dir = tempdir().expect("tempdir");
    let runner = echo_runner(&dir);

    let result = runner.reset().await.expect("reset");
    assert!(result.success);

    let count = runner.execute("count", None).await.expect("execute");
    assert_eq!(count.output, "2");
}

#[tokio::test]
async fn close_is_idempotent_and_the_next_command_restarts() {
    let dir = tempdir().expect("tempdir");
    let runner = echo_runner(&dir);

    let before = runner.execute("count", None).await.expect("execute");
    assert_eq!(before.output, "2");

    runner.close().await;
    runner.close().await;

    let after = runner.execute("count", None).await.expect("execute");
    assert_eq!(after.output, "2");
}
