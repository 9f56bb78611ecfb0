//! `gap_conjugacy_classes` MCP tool handler.

use std::sync::Arc;

use rmcp::handler::server::tool::ToolCallContext;
use rmcp::model::CallToolResult;
use tracing::{info_span, Instrument};

use crate::mcp::handler::GapServer;
use crate::mcp::tools::util;

/// Input parameters.
#[derive(Debug, serde::Deserialize)]
struct ConjugacyClassesInput {
    /// GAP expression evaluating to a group.
    group_expr: String,
}

/// Handle the `gap_conjugacy_classes` tool call.
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

    let input: ConjugacyClassesInput =
        serde_json::from_value(serde_json::Value::Object(args)).map_err(|err| {
            rmcp::ErrorData::invalid_params(
                format!("invalid gap_conjugacy_classes parameters: {err}"),
                None,
            )
        })?;

    let span = info_span!("gap_conjugacy_classes", group_expr = %input.group_expr);

    async move {
        let code = format!(
            r#"G := {group_expr};
cc := ConjugacyClasses(G);
Print("Conjugacy classes of G (order ", Order(G), "):\n");
for c in cc do
  Print("  Representative ", Representative(c), ", size ", Size(c), "\n");
od;
Print("Total: ", Length(cc), " classes\n");"#,
            group_expr = input.group_expr,
        );

        let result = util::run_code(&state, &code, None).await?;
        Ok(util::text_result(util::render_result(&result)))
    }
    .instrument(span)
    .await
}
