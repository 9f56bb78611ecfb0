//! `gap_automorphisms` MCP tool handler.

use std::sync::Arc;

use rmcp::handler::server::tool::ToolCallContext;
use rmcp::model::CallToolResult;
use tracing::{info_span, Instrument};

use crate::mcp::handler::GapServer;
use crate::mcp::tools::util;

/// Input parameters.
#[derive(Debug, serde::Deserialize)]
struct AutomorphismsInput {
    /// GAP expression evaluating to a group.
    group_expr: String,
}

/// Handle the `gap_automorphisms` tool call.
///
/// `AutomorphismGroup` can be expensive beyond small orders, so this runs
/// under the heavy-computation timeout.
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

    let input: AutomorphismsInput =
        serde_json::from_value(serde_json::Value::Object(args)).map_err(|err| {
            rmcp::ErrorData::invalid_params(
                format!("invalid gap_automorphisms parameters: {err}"),
                None,
            )
        })?;

    let span = info_span!("gap_automorphisms", group_expr = %input.group_expr);

    async move {
        let code = format!(
            r#"G := {group_expr};
A := AutomorphismGroup(G);
Print("Aut(G) order:  ", Order(A), "\n");
Print("Aut(G) is abelian: ", IsAbelian(A), "\n");
Print("Inn(G) order: ", Order(G) / Order(Center(G)), "\n");"#,
            group_expr = input.group_expr,
        );

        let result = util::run_code(&state, &code, Some(util::HEAVY_TIMEOUT)).await?;
        Ok(util::text_result(util::render_result(&result)))
    }
    .instrument(span)
    .await
}
