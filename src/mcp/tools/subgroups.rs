//! `gap_subgroups` MCP tool handler.

use std::sync::Arc;

use rmcp::handler::server::tool::ToolCallContext;
use rmcp::model::CallToolResult;
use tracing::{info_span, Instrument};

use crate::mcp::handler::GapServer;
use crate::mcp::tools::util;

/// Input parameters.
#[derive(Debug, serde::Deserialize)]
struct SubgroupsInput {
    /// GAP expression evaluating to a group.
    group_expr: String,
    /// Restrict the enumeration to normal subgroups.
    #[serde(default)]
    normal_only: bool,
}

/// Handle the `gap_subgroups` tool call.
///
/// Full subgroup enumeration is exponential in the group order, so this
/// runs under the heavy-computation timeout.
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

    let input: SubgroupsInput =
        serde_json::from_value(serde_json::Value::Object(args)).map_err(|err| {
            rmcp::ErrorData::invalid_params(
                format!("invalid gap_subgroups parameters: {err}"),
                None,
            )
        })?;

    let span = info_span!(
        "gap_subgroups",
        group_expr = %input.group_expr,
        normal_only = input.normal_only,
    );

    async move {
        let code = if input.normal_only {
            format!(
                r#"G := {group_expr};
ns := NormalSubgroups(G);
Print("Normal subgroups of G (order ", Order(G), "):\n");
for H in ns do
  Print("  Order ", Order(H), ": ", H, "\n");
od;
Print("Total: ", Length(ns), " normal subgroups\n");"#,
                group_expr = input.group_expr,
            )
        } else {
            format!(
                r#"G := {group_expr};
sub := AllSubgroups(G);
Print("Subgroups of G (order ", Order(G), "):\n");
for H in sub do
  isNorm := "";
  if IsNormal(G, H) then isNorm := " [normal]"; fi;
  Print("  Order ", Order(H), isNorm, ": ", H, "\n");
od;
Print("Total: ", Length(sub), " subgroups\n");"#,
                group_expr = input.group_expr,
            )
        };

        let result = util::run_code(&state, &code, Some(util::HEAVY_TIMEOUT)).await?;
        Ok(util::text_result(util::render_result(&result)))
    }
    .instrument(span)
    .await
}
