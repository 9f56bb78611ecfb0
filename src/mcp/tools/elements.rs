//! `gap_elements` MCP tool handler.

use std::sync::Arc;

use rmcp::handler::server::tool::ToolCallContext;
use rmcp::model::CallToolResult;
use tracing::{info_span, Instrument};

use crate::mcp::handler::GapServer;
use crate::mcp::tools::util;

/// Default largest group order for which all elements are listed.
const DEFAULT_MAX_ORDER: u64 = 12;

/// Input parameters.
#[derive(Debug, serde::Deserialize)]
struct ElementsInput {
    /// GAP expression evaluating to a group.
    group_expr: String,
    /// Largest group order to enumerate exhaustively.
    #[serde(default = "default_max_order")]
    max_order: u64,
}

fn default_max_order() -> u64 {
    DEFAULT_MAX_ORDER
}

/// Handle the `gap_elements` tool call.
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

    let input: ElementsInput =
        serde_json::from_value(serde_json::Value::Object(args)).map_err(|err| {
            rmcp::ErrorData::invalid_params(format!("invalid gap_elements parameters: {err}"), None)
        })?;

    let span = info_span!(
        "gap_elements",
        group_expr = %input.group_expr,
        max_order = input.max_order,
    );

    async move {
        let code = format!(
            r#"G := {group_expr};
ord := Order(G);
if ord <= {max_order} then
  elts := Elements(G);
  for g in elts do
    Print(g, " (order ", Order(g), ")\n");
  od;
else
  Print("Group too large (order ", ord, ") to list all elements.\n");
  Print("Generators:\n");
  for g in GeneratorsOfGroup(G) do
    Print("  ", g, "\n");
  od;
fi;"#,
            group_expr = input.group_expr,
            max_order = input.max_order,
        );

        let result = util::run_code(&state, &code, None).await?;
        Ok(util::text_result(util::render_result(&result)))
    }
    .instrument(span)
    .await
}
