//! `gap_derived_series` MCP tool handler.

use std::sync::Arc;

use rmcp::handler::server::tool::ToolCallContext;
use rmcp::model::CallToolResult;
use tracing::{info_span, Instrument};

use crate::mcp::handler::GapServer;
use crate::mcp::tools::util;

/// Input parameters.
#[derive(Debug, serde::Deserialize)]
struct DerivedSeriesInput {
    /// GAP expression evaluating to a group.
    group_expr: String,
}

/// Handle the `gap_derived_series` tool call.
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

    let input: DerivedSeriesInput =
        serde_json::from_value(serde_json::Value::Object(args)).map_err(|err| {
            rmcp::ErrorData::invalid_params(
                format!("invalid gap_derived_series parameters: {err}"),
                None,
            )
        })?;

    let span = info_span!("gap_derived_series", group_expr = %input.group_expr);

    async move {
        let code = format!(
            r#"G := {group_expr};
ds := DerivedSeriesOfGroup(G);
Print("Derived series (length ", Length(ds), "):\n");
for i in [1..Length(ds)] do
  Print("  G^(", i-1, "): order ", Order(ds[i]), "\n");
od;
Print("IsSolvable: ", IsSolvable(G), "\n");
cs := CompositionSeries(G);
Print("Composition series (length ", Length(cs), "):\n");
for i in [1..Length(cs)] do
  Print("  order ", Order(cs[i]), "\n");
od;"#,
            group_expr = input.group_expr,
        );

        let result = util::run_code(&state, &code, Some(util::HEAVY_TIMEOUT)).await?;
        Ok(util::text_result(util::render_result(&result)))
    }
    .instrument(span)
    .await
}
