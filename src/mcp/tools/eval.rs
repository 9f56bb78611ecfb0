//! `gap_eval` MCP tool handler.
//!
//! Arbitrary GAP code execution; the escape hatch for anything the
//! specialized tools do not cover.

use std::sync::Arc;
use std::time::Duration;

use rmcp::handler::server::tool::ToolCallContext;
use rmcp::model::CallToolResult;
use tracing::{info_span, Instrument};

use crate::mcp::handler::GapServer;
use crate::mcp::tools::util;

/// Input parameters.
#[derive(Debug, serde::Deserialize)]
struct EvalInput {
    /// GAP code to execute verbatim. Statements must end with semicolons.
    code: String,
    /// Per-line wait bound in seconds; configured default when absent.
    timeout: Option<u64>,
}

/// Handle the `gap_eval` tool call.
///
/// # Errors
///
/// Returns `rmcp::ErrorData` on invalid parameters or when the GAP
/// session cannot be brought up.
pub async fn handle(
    context: ToolCallContext<'_, GapServer>,
) -> Result<CallToolResult, rmcp::ErrorData> {
    let state = Arc::clone(context.service.state());
    let args: serde_json::Map<String, serde_json::Value> = context.arguments.unwrap_or_default();

    let input: EvalInput =
        serde_json::from_value(serde_json::Value::Object(args)).map_err(|err| {
            rmcp::ErrorData::invalid_params(format!("invalid gap_eval parameters: {err}"), None)
        })?;

    let span = info_span!(
        "gap_eval",
        code_len = input.code.len(),
        timeout = ?input.timeout,
    );

    async move {
        let timeout = input.timeout.map(Duration::from_secs);
        let result = util::run_code(&state, &input.code, timeout).await?;

        let text = if result.success && result.output.is_empty() {
            util::NO_OUTPUT.to_owned()
        } else {
            util::render_result(&result)
        };

        Ok(util::text_result(text))
    }
    .instrument(span)
    .await
}
