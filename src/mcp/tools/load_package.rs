//! `gap_load_package` MCP tool handler.

use std::sync::Arc;

use rmcp::handler::server::tool::ToolCallContext;
use rmcp::model::CallToolResult;
use tracing::{info_span, Instrument};

use crate::mcp::handler::GapServer;
use crate::mcp::tools::util;

/// Input parameters.
#[derive(Debug, serde::Deserialize)]
struct LoadPackageInput {
    /// Name of the GAP package, e.g. `GRAPE` or `cohomolo`.
    package_name: String,
}

/// Handle the `gap_load_package` tool call.
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

    let input: LoadPackageInput =
        serde_json::from_value(serde_json::Value::Object(args)).map_err(|err| {
            rmcp::ErrorData::invalid_params(
                format!("invalid gap_load_package parameters: {err}"),
                None,
            )
        })?;

    let span = info_span!("gap_load_package", package_name = %input.package_name);

    async move {
        let code = format!(
            r#"if LoadPackage("{package_name}") = true then
  Print("Package {package_name} loaded successfully.\n");
else
  Print("Failed to load package {package_name}.\n");
  Print("Available packages: use 'gap_eval' with 'DisplayPackageInformation(\"{package_name}\");'\n");
fi;"#,
            package_name = input.package_name,
        );

        let result = util::run_code(&state, &code, None).await?;
        Ok(util::text_result(util::render_result(&result)))
    }
    .instrument(span)
    .await
}
