//! Integration tests for the lazily-constructed shared runner handle.
//!
//! Validates:
//! - construction deferred to the first accessor call
//! - every caller, including concurrent first callers, sharing one runner
//! - a configured executable override being trusted without probing

use std::path::{Path, PathBuf};

use gap_mcp::config::ServerConfig;
use gap_mcp::gap::SharedRunner;

/// Configuration whose executable override points at `path`.
///
/// The override is trusted verbatim and the accessor spawns nothing, so
/// the path does not need to exist.
fn config_with_override(path: &str) -> ServerConfig {
    ServerConfig {
        gap_executable: Some(PathBuf::from(path)),
        ..ServerConfig::default()
    }
}

#[tokio::test]
async fn construction_is_deferred_until_first_use() {
    let shared = SharedRunner::new(&config_with_override("/opt/fake/gap"));

    assert!(shared.initialized().is_none());

    shared.get().await.expect("runner");
    assert!(shared.initialized().is_some());
}

#[tokio::test]
async fn repeated_accessor_calls_return_the_same_runner() {
    let shared = SharedRunner::new(&config_with_override("/opt/fake/gap"));

    let first = shared.get().await.expect("first get");
    let second = shared.get().await.expect("second get");

    assert!(std::ptr::eq(first, second));
}

#[tokio::test]
async fn concurrent_first_callers_share_one_runner() {
    let shared = SharedRunner::new(&config_with_override("/opt/fake/gap"));

    let (first, second) = tokio::join!(shared.get(), shared.get());

    let first = first.expect("first get");
    let second = second.expect("second get");
    assert!(std::ptr::eq(first, second));
}

#[tokio::test]
async fn configured_override_is_trusted_without_probing() {
    let shared = SharedRunner::new(&config_with_override("/nonexistent/gap-engine"));

    let runner = shared.get().await.expect("runner");
    assert_eq!(runner.executable(), Path::new("/nonexistent/gap-engine"));
}
