//! `gap_reset` MCP tool handler.
//!
//! Replaces the live GAP process with a fresh one, discarding every
//! variable and definition held inside the engine.

use std::sync::Arc;

use rmcp::handler::server::tool::ToolCallContext;
use rmcp::model::CallToolResult;
use tracing::{info_span, Instrument};

use crate::mcp::handler::GapServer;
use crate::mcp::tools::util;

/// Handle the `gap_reset` tool call. Takes no parameters.
///
/// # Errors
///
/// Returns `rmcp::ErrorData` when the replacement process cannot be
/// started.
pub async fn handle(
    context: ToolCallContext<'_, GapServer>,
) -> Result<CallToolResult, rmcp::ErrorData> {
    let state = Arc::clone(context.service.state());
    let span = info_span!("gap_reset");

    async move {
        let runner = state.runner.get().await.map_err(|err| {
            rmcp::ErrorData::internal_error(format!("GAP session unavailable: {err}"), None)
        })?;

        let result = runner.reset().await.map_err(|err| {
            rmcp::ErrorData::internal_error(format!("failed to reset GAP session: {err}"), None)
        })?;

        Ok(util::text_result(result.output))
    }
    .instrument(span)
    .await
}
