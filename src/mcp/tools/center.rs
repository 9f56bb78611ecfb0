//! `gap_center` MCP tool handler.

use std::sync::Arc;

use rmcp::handler::server::tool::ToolCallContext;
use rmcp::model::CallToolResult;
use tracing::{info_span, Instrument};

use crate::mcp::handler::GapServer;
use crate::mcp::tools::util;

/// Input parameters.
#[derive(Debug, serde::Deserialize)]
struct CenterInput {
    /// GAP expression evaluating to a group.
    group_expr: String,
}

/// Handle the `gap_center` tool call.
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

    let input: CenterInput =
        serde_json::from_value(serde_json::Value::Object(args)).map_err(|err| {
            rmcp::ErrorData::invalid_params(format!("invalid gap_center parameters: {err}"), None)
        })?;

    let span = info_span!("gap_center", group_expr = %input.group_expr);

    async move {
        let code = format!(
            r#"G := {group_expr};
Z := Center(G);
Print("Center Z(G):\n");
Print("  Order: ", Order(Z), "\n");
Print("  Elements: ", Elements(Z), "\n");
Print("  G/Z(G) is cyclic: ", IsCyclic(G/Z), "\n");"#,
            group_expr = input.group_expr,
        );

        let result = util::run_code(&state, &code, None).await?;
        Ok(util::text_result(util::render_result(&result)))
    }
    .instrument(span)
    .await
}
