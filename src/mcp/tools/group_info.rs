//! `gap_group_info` MCP tool handler.

use std::sync::Arc;

use rmcp::handler::server::tool::ToolCallContext;
use rmcp::model::CallToolResult;
use tracing::{info_span, Instrument};

use crate::mcp::handler::GapServer;
use crate::mcp::tools::util;

/// Input parameters.
#[derive(Debug, serde::Deserialize)]
struct GroupInfoInput {
    /// GAP expression evaluating to a group.
    group_expr: String,
}

/// Handle the `gap_group_info` tool call.
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

    let input: GroupInfoInput =
        serde_json::from_value(serde_json::Value::Object(args)).map_err(|err| {
            rmcp::ErrorData::invalid_params(
                format!("invalid gap_group_info parameters: {err}"),
                None,
            )
        })?;

    let span = info_span!("gap_group_info", group_expr = %input.group_expr);

    async move {
        let code = format!(
            r#"G := {group_expr};
Print("Order: ", Order(G), "\n");
Print("IsAbelian: ", IsAbelian(G), "\n");
Print("IsSimple: ", IsSimple(G), "\n");
Print("IsSolvable: ", IsSolvable(G), "\n");
Print("IsNilpotent: ", IsNilpotentGroup(G), "\n");
Print("NrConjugacyClasses: ", NrConjugacyClasses(G), "\n");
Print("Exponent: ", Exponent(G), "\n");"#,
            group_expr = input.group_expr,
        );

        let result = util::run_code(&state, &code, None).await?;
        Ok(util::text_result(util::render_result(&result)))
    }
    .instrument(span)
    .await
}
