//! Shared utilities for GAP tool handlers.

use std::time::Duration;

use rmcp::model::{CallToolResult, Content};

use crate::gap::CommandResult;
use crate::mcp::handler::AppState;

/// Fallback text for commands that complete without printing anything.
pub const NO_OUTPUT: &str = "(no output)";

/// Timeout for enumeration-heavy computations: subgroup lattices,
/// character tables, series, isomorphism searches.
pub const HEAVY_TIMEOUT: Duration = Duration::from_secs(60);

/// Render a command result the way every GAP tool reports it: failures
/// become a `GAP Error:` block, successes pass the output through.
#[must_use]
pub fn render_result(result: &CommandResult) -> String {
    if !result.success {
        if let Some(ref error) = result.error {
            return format!("GAP Error:\n{error}");
        }
    }
    result.output.clone()
}

/// Wrap rendered text in a successful text-content tool result.
#[must_use]
pub fn text_result(text: impl Into<String>) -> CallToolResult {
    CallToolResult::success(vec![Content::text(text.into())])
}

/// Resolve the shared session and run `code` against it.
///
/// `timeout` of `None` uses the configured per-line default.
///
/// # Errors
///
/// Returns `rmcp::ErrorData` when the GAP executable cannot be located,
/// the session fails to start, or the command round-trip fails.
pub async fn run_code(
    state: &AppState,
    code: &str,
    timeout: Option<Duration>,
) -> Result<CommandResult, rmcp::ErrorData> {
    let runner = state.runner.get().await.map_err(|err| {
        rmcp::ErrorData::internal_error(format!("GAP session unavailable: {err}"), None)
    })?;

    runner.execute(code, timeout).await.map_err(|err| {
        rmcp::ErrorData::internal_error(format!("GAP command failed: {err}"), None)
    })
}
