//! `gap_sylow` MCP tool handler.

use std::sync::Arc;

use rmcp::handler::server::tool::ToolCallContext;
use rmcp::model::CallToolResult;
use tracing::{info_span, Instrument};

use crate::mcp::handler::GapServer;
use crate::mcp::tools::util;

/// Input parameters.
#[derive(Debug, serde::Deserialize)]
struct SylowInput {
    /// GAP expression evaluating to a group.
    group_expr: String,
    /// The prime p. Primality is verified inside GAP.
    prime: u64,
}

/// Handle the `gap_sylow` tool call.
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

    let input: SylowInput =
        serde_json::from_value(serde_json::Value::Object(args)).map_err(|err| {
            rmcp::ErrorData::invalid_params(format!("invalid gap_sylow parameters: {err}"), None)
        })?;

    let span = info_span!(
        "gap_sylow",
        group_expr = %input.group_expr,
        prime = input.prime,
    );

    async move {
        let code = format!(
            r#"G := {group_expr};
p := {prime};
if not IsPrime(p) then
  Print("Error: ", p, " is not prime\n");
else
  S := SylowSubgroup(G, p);
  nS := Length(ConjugateSubgroups(G, S));
  Print("Group order: ", Order(G), "\n");
  Print("Sylow ", p, "-subgroup order: ", Order(S), "\n");
  Print("Number of Sylow ", p, "-subgroups: ", nS, "\n");
  Print("Sylow subgroup: ", S, "\n");
  Print("Is normal: ", IsNormal(G, S), "\n");
fi;"#,
            group_expr = input.group_expr,
            prime = input.prime,
        );

        let result = util::run_code(&state, &code, None).await?;
        Ok(util::text_result(util::render_result(&result)))
    }
    .instrument(span)
    .await
}
