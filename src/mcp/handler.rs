//! MCP server handler, shared application state, and tool router.

use std::future::Future;
use std::sync::Arc;

use rmcp::handler::server::{
    tool::{ToolCallContext, ToolRoute, ToolRouter},
    ServerHandler,
};
use rmcp::model::{
    CallToolRequestParam, CallToolResult, Implementation, ListToolsResult, PaginatedRequestParam,
    ServerCapabilities, ServerInfo, Tool,
};
use rmcp::service::{RequestContext, RoleServer};
use tracing::info_span;

use crate::config::ServerConfig;
use crate::gap::SharedRunner;

/// Guidance surfaced to MCP clients during the initialize exchange.
const INSTRUCTIONS: &str =
    "Provides access to GAP (Groups, Algorithms, Programming) for exact computational group \
     theory. Use gap_eval for arbitrary GAP code, or the specialized tools for common \
     operations like subgroups, character tables, Sylow subgroups, etc. GAP uses \
     multiplicative notation for groups by default. Elements are permutations written as \
     cycles, e.g. (1,2,3). Always prefer specialized tools over gap_eval when available.";

/// Shared application state accessible by all MCP tool handlers.
pub struct AppState {
    /// Global configuration.
    pub config: Arc<ServerConfig>,
    /// Lazily-constructed shared GAP session.
    pub runner: SharedRunner,
}

impl AppState {
    /// Build state from parsed configuration.
    #[must_use]
    pub fn new(config: Arc<ServerConfig>) -> Self {
        let runner = SharedRunner::new(&config);
        Self { config, runner }
    }
}

/// MCP server implementation that exposes the GAP tool surface.
pub struct GapServer {
    state: Arc<AppState>,
}

impl GapServer {
    /// Create a new MCP server bound to shared application state.
    #[must_use]
    pub fn new(state: Arc<AppState>) -> Self {
        Self { state }
    }

    /// Access the shared application state.
    #[must_use]
    pub fn state(&self) -> &Arc<AppState> {
        &self.state
    }

    fn tool_router() -> ToolRouter<Self> {
        let mut router = ToolRouter::new();

        for tool in Self::all_tools() {
            let name = tool.name.to_string();
            match name.as_str() {
                "gap_eval" => {
                    router.add_route(ToolRoute::new_dyn(tool, |context| {
                        Box::pin(crate::mcp::tools::eval::handle(context))
                    }));
                }
                "gap_group_info" => {
                    router.add_route(ToolRoute::new_dyn(tool, |context| {
                        Box::pin(crate::mcp::tools::group_info::handle(context))
                    }));
                }
                "gap_elements" => {
                    router.add_route(ToolRoute::new_dyn(tool, |context| {
                        Box::pin(crate::mcp::tools::elements::handle(context))
                    }));
                }
                "gap_subgroups" => {
                    router.add_route(ToolRoute::new_dyn(tool, |context| {
                        Box::pin(crate::mcp::tools::subgroups::handle(context))
                    }));
                }
                "gap_character_table" => {
                    router.add_route(ToolRoute::new_dyn(tool, |context| {
                        Box::pin(crate::mcp::tools::character_table::handle(context))
                    }));
                }
                "gap_sylow" => {
                    router.add_route(ToolRoute::new_dyn(tool, |context| {
                        Box::pin(crate::mcp::tools::sylow::handle(context))
                    }));
                }
                "gap_center" => {
                    router.add_route(ToolRoute::new_dyn(tool, |context| {
                        Box::pin(crate::mcp::tools::center::handle(context))
                    }));
                }
                "gap_derived_series" => {
                    router.add_route(ToolRoute::new_dyn(tool, |context| {
                        Box::pin(crate::mcp::tools::derived_series::handle(context))
                    }));
                }
                "gap_conjugacy_classes" => {
                    router.add_route(ToolRoute::new_dyn(tool, |context| {
                        Box::pin(crate::mcp::tools::conjugacy_classes::handle(context))
                    }));
                }
                "gap_isomorphism" => {
                    router.add_route(ToolRoute::new_dyn(tool, |context| {
                        Box::pin(crate::mcp::tools::isomorphism::handle(context))
                    }));
                }
                "gap_abelian_invariants" => {
                    router.add_route(ToolRoute::new_dyn(tool, |context| {
                        Box::pin(crate::mcp::tools::abelian_invariants::handle(context))
                    }));
                }
                "gap_automorphisms" => {
                    router.add_route(ToolRoute::new_dyn(tool, |context| {
                        Box::pin(crate::mcp::tools::automorphisms::handle(context))
                    }));
                }
                "gap_load_package" => {
                    router.add_route(ToolRoute::new_dyn(tool, |context| {
                        Box::pin(crate::mcp::tools::load_package::handle(context))
                    }));
                }
                "gap_reset" => {
                    router.add_route(ToolRoute::new_dyn(tool, |context| {
                        Box::pin(crate::mcp::tools::reset::handle(context))
                    }));
                }
                _ => {
                    router.add_route(ToolRoute::new_dyn(tool, |_context| {
                        Box::pin(async {
                            Err(rmcp::ErrorData::internal_error(
                                "tool not implemented",
                                None,
                            ))
                        })
                    }));
                }
            }
        }

        router
    }

    /// Convert a `serde_json::Value::Object` into the `Arc<Map>` expected by `Tool`.
    fn schema(value: serde_json::Value) -> Arc<serde_json::Map<String, serde_json::Value>> {
        match value {
            serde_json::Value::Object(map) => Arc::new(map),
            _ => Arc::new(serde_json::Map::default()),
        }
    }

    /// The complete tool surface, in the order clients see it.
    #[must_use]
    #[allow(clippy::too_many_lines)] // Tool definitions are intentionally verbose for clarity.
    pub fn all_tools() -> Vec<Tool> {
        vec![
            Tool {
                name: "gap_eval".into(),
                title: None,
                description: Some(
                    "Execute arbitrary GAP code and return its output. GAP uses \
                     multiplicative notation and statements must end with semicolons. \
                     Example: 'Order(SymmetricGroup(4));' returns '24'. Increase the \
                     timeout for heavy computations."
                        .into(),
                ),
                input_schema: Self::schema(serde_json::json!({
                    "type": "object",
                    "properties": {
                        "code": { "type": "string" },
                        "timeout": { "type": "integer" }
                    },
                    "required": ["code"]
                })),
                output_schema: None,
                annotations: None,
                icons: None,
                meta: None,
            },
            Tool {
                name: "gap_group_info".into(),
                title: None,
                description: Some(
                    "Summarize key properties of a group: order, abelian, simple, solvable, \
                     nilpotent, number of conjugacy classes, exponent. Accepts any GAP group \
                     expression, e.g. SymmetricGroup(4), CyclicGroup(12), SmallGroup(16,5)."
                        .into(),
                ),
                input_schema: Self::schema(serde_json::json!({
                    "type": "object",
                    "properties": {
                        "group_expr": { "type": "string" }
                    },
                    "required": ["group_expr"]
                })),
                output_schema: None,
                annotations: None,
                icons: None,
                meta: None,
            },
            Tool {
                name: "gap_elements".into(),
                title: None,
                description: Some(
                    "List a group's elements with their orders. Groups larger than \
                     max_order show generators only."
                        .into(),
                ),
                input_schema: Self::schema(serde_json::json!({
                    "type": "object",
                    "properties": {
                        "group_expr": { "type": "string" },
                        "max_order": { "type": "integer", "default": 12 }
                    },
                    "required": ["group_expr"]
                })),
                output_schema: None,
                annotations: None,
                icons: None,
                meta: None,
            },
            Tool {
                name: "gap_subgroups".into(),
                title: None,
                description: Some(
                    "Compute the subgroups of a group with their orders, marking normal \
                     ones; set normal_only to restrict to normal subgroups."
                        .into(),
                ),
                input_schema: Self::schema(serde_json::json!({
                    "type": "object",
                    "properties": {
                        "group_expr": { "type": "string" },
                        "normal_only": { "type": "boolean", "default": false }
                    },
                    "required": ["group_expr"]
                })),
                output_schema: None,
                annotations: None,
                icons: None,
                meta: None,
            },
            Tool {
                name: "gap_character_table".into(),
                title: None,
                description: Some(
                    "Compute and display the character table of a group: irreducible \
                     characters, conjugacy classes, and character degrees."
                        .into(),
                ),
                input_schema: Self::schema(serde_json::json!({
                    "type": "object",
                    "properties": {
                        "group_expr": { "type": "string" }
                    },
                    "required": ["group_expr"]
                })),
                output_schema: None,
                annotations: None,
                icons: None,
                meta: None,
            },
            Tool {
                name: "gap_sylow".into(),
                title: None,
                description: Some(
                    "Compute the Sylow p-subgroup of a group, the number of its conjugates, \
                     and whether it is normal. The prime must actually be prime."
                        .into(),
                ),
                input_schema: Self::schema(serde_json::json!({
                    "type": "object",
                    "properties": {
                        "group_expr": { "type": "string" },
                        "prime": { "type": "integer" }
                    },
                    "required": ["group_expr", "prime"]
                })),
                output_schema: None,
                annotations: None,
                icons: None,
                meta: None,
            },
            Tool {
                name: "gap_center".into(),
                title: None,
                description: Some(
                    "Compute the center Z(G) of a group: order, elements, and whether \
                     G/Z(G) is cyclic."
                        .into(),
                ),
                input_schema: Self::schema(serde_json::json!({
                    "type": "object",
                    "properties": {
                        "group_expr": { "type": "string" }
                    },
                    "required": ["group_expr"]
                })),
                output_schema: None,
                annotations: None,
                icons: None,
                meta: None,
            },
            Tool {
                name: "gap_derived_series".into(),
                title: None,
                description: Some(
                    "Compute the derived series and composition series of a group, \
                     reporting solvability."
                        .into(),
                ),
                input_schema: Self::schema(serde_json::json!({
                    "type": "object",
                    "properties": {
                        "group_expr": { "type": "string" }
                    },
                    "required": ["group_expr"]
                })),
                output_schema: None,
                annotations: None,
                icons: None,
                meta: None,
            },
            Tool {
                name: "gap_conjugacy_classes".into(),
                title: None,
                description: Some(
                    "List the conjugacy classes of a group with a representative and the \
                     size of each class."
                        .into(),
                ),
                input_schema: Self::schema(serde_json::json!({
                    "type": "object",
                    "properties": {
                        "group_expr": { "type": "string" }
                    },
                    "required": ["group_expr"]
                })),
                output_schema: None,
                annotations: None,
                icons: None,
                meta: None,
            },
            Tool {
                name: "gap_isomorphism".into(),
                title: None,
                description: Some(
                    "Test whether two groups are isomorphic, e.g. SymmetricGroup(3) and \
                     DihedralGroup(6)."
                        .into(),
                ),
                input_schema: Self::schema(serde_json::json!({
                    "type": "object",
                    "properties": {
                        "group_expr1": { "type": "string" },
                        "group_expr2": { "type": "string" }
                    },
                    "required": ["group_expr1", "group_expr2"]
                })),
                output_schema: None,
                annotations: None,
                icons: None,
                meta: None,
            },
            Tool {
                name: "gap_abelian_invariants".into(),
                title: None,
                description: Some(
                    "Compute the abelian invariants (the abelianization) of a group.".into(),
                ),
                input_schema: Self::schema(serde_json::json!({
                    "type": "object",
                    "properties": {
                        "group_expr": { "type": "string" }
                    },
                    "required": ["group_expr"]
                })),
                output_schema: None,
                annotations: None,
                icons: None,
                meta: None,
            },
            Tool {
                name: "gap_automorphisms".into(),
                title: None,
                description: Some(
                    "Compute the automorphism group of a group: its order and basic \
                     properties."
                        .into(),
                ),
                input_schema: Self::schema(serde_json::json!({
                    "type": "object",
                    "properties": {
                        "group_expr": { "type": "string" }
                    },
                    "required": ["group_expr"]
                })),
                output_schema: None,
                annotations: None,
                icons: None,
                meta: None,
            },
            Tool {
                name: "gap_load_package".into(),
                title: None,
                description: Some(
                    "Load a GAP package such as GRAPE, Hecke, or cohomolo.".into(),
                ),
                input_schema: Self::schema(serde_json::json!({
                    "type": "object",
                    "properties": {
                        "package_name": { "type": "string" }
                    },
                    "required": ["package_name"]
                })),
                output_schema: None,
                annotations: None,
                icons: None,
                meta: None,
            },
            Tool {
                name: "gap_reset".into(),
                title: None,
                description: Some(
                    "Reset the GAP session, clearing all variables and defined objects. \
                     Use when the session state has become inconsistent."
                        .into(),
                ),
                input_schema: Self::schema(serde_json::json!({
                    "type": "object",
                    "properties": {}
                })),
                output_schema: None,
                annotations: None,
                icons: None,
                meta: None,
            },
        ]
    }
}

impl ServerHandler for GapServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation::from_build_env(),
            instructions: Some(INSTRUCTIONS.into()),
            ..ServerInfo::default()
        }
    }

    fn call_tool(
        &self,
        request: CallToolRequestParam,
        context: RequestContext<RoleServer>,
    ) -> impl Future<Output = Result<CallToolResult, rmcp::ErrorData>> + Send + '_ {
        let router = Self::tool_router();
        let _span = info_span!("call_tool", tool = %request.name).entered();

        async move {
            router
                .call(ToolCallContext::new(self, request, context))
                .await
        }
    }

    fn list_tools(
        &self,
        _request: Option<PaginatedRequestParam>,
        _context: RequestContext<RoleServer>,
    ) -> impl Future<Output = Result<ListToolsResult, rmcp::ErrorData>> + Send + '_ {
        let tools = Self::all_tools();

        std::future::ready(Ok(ListToolsResult::with_all_items(tools)))
    }
}
