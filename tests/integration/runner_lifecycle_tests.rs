//! Integration tests for the session manager's lifecycle.
//!
//! Validates, against scripted engines:
//! - command round-trips, multi-line pass-through, banner discarding
//! - deny-list rejection before anything reaches the engine
//! - engine-reported errors on stdout and stderr
//! - oversized output lines dropped while the session survives
//! - per-line timeout semantics and inline restart after a timeout
//! - lazy replacement after an unexpected exit
//! - serialized concurrent callers
//! - startup failures: unresponsive engine, instant exit, missing binary

use std::path::PathBuf;
use std::time::Duration;

use gap_mcp::gap::{GapRunner, SessionTimeouts};
use gap_mcp::AppError;
use tempfile::tempdir;

use super::test_helpers::{
    echo_runner, install_engine, test_timeouts, EXITING_ENGINE, SILENT_ENGINE,
};

#[tokio::test]
async fn command_output_round_trips() {
    let dir = tempdir().expect("tempdir");
    let runner = echo_runner(&dir);

    let result = runner
        .execute("Order(SymmetricGroup(4));", None)
        .await
        .expect("execute");

    assert!(result.success);
    assert_eq!(result.output, "Order(SymmetricGroup(4));");
    assert_eq!(result.error, None);
}

#[tokio::test]
async fn multi_line_commands_pass_through_unmodified() {
    let dir = tempdir().expect("tempdir");
    let runner = echo_runner(&dir);

    let code = "for i in [1..3] do\n  Print(i);\nod;";
    let result = runner.execute(code, None).await.expect("execute");

    assert!(result.success);
    assert_eq!(result.output, code);
}

#[tokio::test]
async fn empty_command_yields_empty_successful_output() {
    let dir = tempdir().expect("tempdir");
    let runner = echo_runner(&dir);

    let result = runner.execute("", None).await.expect("execute");

    assert!(result.success);
    assert_eq!(result.output, "");
    assert_eq!(result.error, None);
}

#[tokio::test]
async fn handshake_discards_startup_banner() {
    let dir = tempdir().expect("tempdir");
    let runner = echo_runner(&dir);

    // The banner printed before the handshake sentinel never shows up in
    // command output; the first post-handshake line the engine consumes
    // is line two.
    let result = runner.execute("count", None).await.expect("execute");

    assert!(result.success);
    assert_eq!(result.output, "2");
}

#[tokio::test]
async fn blocked_command_is_rejected_without_reaching_the_engine() {
    let dir = tempdir().expect("tempdir");
    let runner = echo_runner(&dir);

    let result = runner
        .execute("Order(G); QUIT;", None)
        .await
        .expect("execute");

    assert!(!result.success);
    assert_eq!(result.output, "");
    let error = result.error.expect("error message");
    assert!(error.contains("Blocked: command contains denied pattern \"QUIT\""));
    assert!(error.contains("reset tool"));

    // Line counter unmoved: the engine only ever saw the handshake.
    let count = runner.execute("count", None).await.expect("execute");
    assert_eq!(count.output, "2");
}

#[tokio::test]
async fn engine_error_on_stdout_fails_the_command_but_keeps_the_session() {
    let dir = tempdir().expect("tempdir");
    let runner = echo_runner(&dir);

    let result = runner.execute("stdout-error", None).await.expect("execute");

    assert!(!result.success);
    assert_eq!(result.output, "Error, no method found for Foo");
    assert_eq!(result.error.as_deref(), Some("Error, no method found for Foo"));

    // Same generation: handshake (1), failed command (2, 3), this (4).
    let count = runner.execute("count", None).await.expect("execute");
    assert!(count.success);
    assert_eq!(count.output, "4");
}

#[tokio::test]
async fn engine_error_on_stderr_is_detected() {
    let dir = tempdir().expect("tempdir");
    let runner = echo_runner(&dir);

    let result = runner.execute("stderr-error", None).await.expect("execute");

    assert!(!result.success);
    assert_eq!(result.output, "");
    assert_eq!(result.error.as_deref(), Some("Error, no method found for Bar"));
}

#[tokio::test]
async fn oversized_output_line_is_dropped_without_losing_the_session() {
    let dir = tempdir().expect("tempdir");
    let runner = echo_runner(&dir);

    // One line over the reader's limit is dropped from the output, but the
    // sentinel still arrives and the command completes normally.
    let result = runner.execute("huge", None).await.expect("execute");

    assert!(result.success);
    assert_eq!(result.output, "");

    // Same generation: handshake (1), huge (2, 3), this (4).
    let count = runner.execute("count", None).await.expect("execute");
    assert!(count.success);
    assert_eq!(count.output, "4");
}

#[tokio::test]
async fn timeout_bounds_each_line_not_the_whole_response() {
    let dir = tempdir().expect("tempdir");
    let runner = echo_runner(&dir);

    // Three lines, one second apart: the whole response takes longer than
    // the timeout, but no single gap does.
    let result = runner
        .execute("drip", Some(Duration::from_secs(2)))
        .await
        .expect("execute");

    assert!(result.success);
    assert_eq!(result.output, "tick 1\ntick 2\ntick 3");
}

#[tokio::test]
async fn timed_out_command_restarts_the_engine() {
    let dir = tempdir().expect("tempdir");
    let runner = echo_runner(&dir);

    let result = runner
        .execute("slow", Some(Duration::from_secs(1)))
        .await
        .expect("execute");

    assert!(!result.success);
    assert_eq!(result.error.as_deref(), Some("GAP did not respond within 1s"));

    // The replacement generation answers its first count with 2 again.
    let count = runner.execute("count", None).await.expect("execute");
    assert!(count.success);
    assert_eq!(count.output, "2");
}

#[tokio::test]
async fn crashed_engine_is_reported_and_replaced_on_the_next_call() {
    let dir = tempdir().expect("tempdir");
    let runner = echo_runner(&dir);

    let result = runner.execute("die", None).await.expect("execute");

    assert!(!result.success);
    assert_eq!(
        result.error.as_deref(),
        Some("GAP process terminated unexpectedly")
    );

    let count = runner.execute("count", None).await.expect("execute");
    assert!(count.success);
    assert_eq!(count.output, "2");
}

#[tokio::test]
async fn engine_that_exits_between_commands_is_replaced_on_the_next_call() {
    let dir = tempdir().expect("tempdir");
    let runner = echo_runner(&dir);

    let before = runner.execute("depart", None).await.expect("execute");
    assert!(before.success);

    // Give the engine a moment to finish exiting after its last reply, so
    // the next call finds a dead process rather than a broken pipe.
    tokio::time::sleep(Duration::from_millis(200)).await;

    let count = runner.execute("count", None).await.expect("execute");
    assert!(count.success);
    assert_eq!(count.output, "2");
}

#[tokio::test]
async fn concurrent_callers_are_serialized() {
    let dir = tempdir().expect("tempdir");
    let runner = echo_runner(&dir);

    let (first, second) = tokio::join!(
        runner.execute("alpha;", None),
        runner.execute("beta;", None)
    );

    let first = first.expect("first execute");
    let second = second.expect("second execute");
    assert_eq!(first.output, "alpha;");
    assert_eq!(second.output, "beta;");
}

#[tokio::test]
async fn unresponsive_engine_fails_startup_with_a_timeout() {
    let dir = tempdir().expect("tempdir");
    let path = install_engine(&dir, SILENT_ENGINE);
    let runner = GapRunner::new(path, SessionTimeouts::from_secs(5, 1, 1));

    let err = runner
        .execute("1+1;", None)
        .await
        .expect_err("startup should fail");

    match err {
        AppError::Session(message) => {
            assert!(message.contains("did not become ready within 1s"));
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn engine_exiting_at_startup_surfaces_a_session_error() {
    let dir = tempdir().expect("tempdir");
    let path = install_engine(&dir, EXITING_ENGINE);
    let runner = GapRunner::new(path, test_timeouts());

    let err = runner
        .execute("1+1;", None)
        .await
        .expect_err("startup should fail");

    assert!(matches!(err, AppError::Session(_)));
}

#[tokio::test]
async fn missing_executable_reports_spawn_failure() {
    let runner = GapRunner::new(PathBuf::from("/nonexistent/fake-gap"), test_timeouts());

    let err = runner
        .execute("1+1;", None)
        .await
        .expect_err("spawn should fail");

    match err {
        AppError::Session(message) => assert!(message.contains("failed to spawn GAP")),
        other => panic!("unexpected error: {other}"),
    }
}
