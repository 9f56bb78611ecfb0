//! `gap_isomorphism` MCP tool handler.

use std::sync::Arc;

use rmcp::handler::server::tool::ToolCallContext;
use rmcp::model::CallToolResult;
use tracing::{info_span, Instrument};

use crate::mcp::handler::GapServer;
use crate::mcp::tools::util;

/// Input parameters.
#[derive(Debug, serde::Deserialize)]
struct IsomorphismInput {
    /// GAP expression evaluating to the first group.
    group_expr1: String,
    /// GAP expression evaluating to the second group.
    group_expr2: String,
}

/// Handle the `gap_isomorphism` tool call.
///
/// `IsomorphismGroups` searches for an explicit isomorphism, which can be
/// slow for larger groups, so this runs under the heavy-computation
/// timeout.
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

    let input: IsomorphismInput =
        serde_json::from_value(serde_json::Value::Object(args)).map_err(|err| {
            rmcp::ErrorData::invalid_params(
                format!("invalid gap_isomorphism parameters: {err}"),
                None,
            )
        })?;

    let span = info_span!(
        "gap_isomorphism",
        group_expr1 = %input.group_expr1,
        group_expr2 = %input.group_expr2,
    );

    async move {
        let code = format!(
            r#"G1 := {group_expr1};
G2 := {group_expr2};
Print("Group 1 order: ", Order(G1), "\n");
Print("Group 2 order: ", Order(G2), "\n");
iso := IsomorphismGroups(G1, G2);
if iso = fail then
  Print("Not isomorphic\n");
else
  Print("Isomorphic\n");
fi;"#,
            group_expr1 = input.group_expr1,
            group_expr2 = input.group_expr2,
        );

        let result = util::run_code(&state, &code, Some(util::HEAVY_TIMEOUT)).await?;
        Ok(util::text_result(util::render_result(&result)))
    }
    .instrument(span)
    .await
}
