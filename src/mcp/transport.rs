//! Stdio transport setup for the MCP connection.
//!
//! Wires [`GapServer`] to stdin/stdout for direct invocation by MCP
//! clients (Claude Code, agentic IDEs, `mcp-cli`).

use std::sync::Arc;

use rmcp::service::ServiceExt;
use rmcp::transport::io::stdio;
use tokio_util::sync::CancellationToken;
use tracing::info;

use super::handler::{AppState, GapServer};
use crate::{AppError, Result};

/// Serve the MCP server over stdio until the cancellation token fires.
///
/// # Errors
///
/// Returns `AppError::Mcp` if the transport fails to initialize or the
/// service loop ends with a protocol error.
pub async fn serve_stdio(state: Arc<AppState>, ct: CancellationToken) -> Result<()> {
    let executable_override = state.config.gap_executable.clone();
    let server = GapServer::new(state);
    let transport = stdio();

    info!(?executable_override, "starting stdio MCP transport");
    let service = server
        .serve_with_ct(transport, ct)
        .await
        .map_err(|err| AppError::Mcp(format!("stdio transport failed: {err}")))?;

    service
        .waiting()
        .await
        .map_err(|err| AppError::Mcp(format!("stdio service error: {err}")))?;

    info!("stdio MCP transport shut down");
    Ok(())
}
