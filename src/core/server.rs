//! MCP Server implementation and lifecycle management.
//!
//! [`McpServer`] implements the rmcp `ServerHandler` trait. The rmcp
//! transports reach tools through the generated `ToolRouter`; the HTTP
//! transport goes through the [`ToolRegistry`]. Both are built from one
//! [`ToolContext`], so a session started over one path can be finished
//! over the other.

use rmcp::{
    ErrorData as McpError, RoleServer, ServerHandler,
    handler::server::tool::{ToolCallContext, ToolRouter},
    model::*,
    service::RequestContext,
};
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, instrument};

use super::config::Config;
use crate::domains::tools::{ToolContext, ToolRegistry, build_tool_router};

/// The main MCP server handler.
#[derive(Clone)]
pub struct McpServer {
    /// Server configuration.
    config: Arc<Config>,

    /// Name-based dispatch used by the HTTP transport.
    registry: ToolRegistry,

    /// Tool router for handling tool calls.
    tool_router: ToolRouter<Self>,
}

impl McpServer {
    /// Create a new MCP server with the given configuration.
    pub fn new(config: Config) -> Self {
        let config = Arc::new(config);
        let ctx = ToolContext::new(config.clone());

        Self {
            tool_router: build_tool_router::<Self>(ctx.clone()),
            registry: ToolRegistry::new(ctx),
            config,
        }
    }

    /// Get the server name.
    pub fn name(&self) -> &str {
        &self.config.server.name
    }

    /// Get the server version.
    pub fn version(&self) -> &str {
        &self.config.server.version
    }

    /// Get the server configuration.
    pub fn config(&self) -> &Arc<Config> {
        &self.config
    }

    pub fn registry(&self) -> &ToolRegistry {
        &self.registry
    }

    // ========================================================================
    // HTTP Transport Support Methods
    // ========================================================================

    /// List all available tools as JSON (for HTTP transport).
    pub fn list_tools(&self) -> Vec<Value> {
        self.tool_router
            .list_all()
            .into_iter()
            .map(|t| {
                serde_json::json!({
                    "name": t.name,
                    "description": t.description,
                    "inputSchema": t.input_schema
                })
            })
            .collect()
    }

    /// Call a tool by name (for HTTP transport).
    ///
    /// Tool failures, including unknown tools, come back as a result with
    /// `isError` set. Only malformed arguments are an `Err`.
    #[instrument(skip(self, arguments))]
    pub async fn call_tool(&self, name: &str, arguments: Value) -> Result<Value, String> {
        let arguments = match arguments {
            Value::Object(map) => map,
            Value::Null => serde_json::Map::new(),
            other => return Err(format!("Tool arguments must be an object, got {other}")),
        };

        let result = self.registry.call_tool(name, &arguments);
        debug!("Tool {} finished, error: {:?}", name, result.is_error);

        Ok(serde_json::json!({
            "content": result.content,
            "isError": result.is_error.unwrap_or(false)
        }))
    }
}

/// ServerHandler implementation. Known tools go through the tool router;
/// anything else is answered by the registry so every transport reports
/// `Unknown tool: <name>` the same way.
impl ServerHandler for McpServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            instructions: Some(
                "Stateful tool server. Tools may be called with only some of their parameters; \
                 the reply names the next missing parameter and a session ID. Pass that \
                 session_id back with the remaining parameters to continue. \
                 Use list_sessions to see open sessions."
                    .to_string(),
            ),
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            ..Default::default()
        }
    }

    #[instrument(skip_all, fields(tool = %request.name))]
    async fn call_tool(
        &self,
        request: CallToolRequestParam,
        context: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, McpError> {
        if !self.tool_router.has_route(&request.name) {
            let arguments = request.arguments.unwrap_or_default();
            return Ok(self.registry.call_tool(&request.name, &arguments));
        }

        let tcc = ToolCallContext::new(self, request, context);
        self.tool_router.call(tcc).await
    }

    async fn list_tools(
        &self,
        _request: Option<PaginatedRequestParam>,
        _context: RequestContext<RoleServer>,
    ) -> Result<ListToolsResult, McpError> {
        Ok(ListToolsResult {
            tools: self.tool_router.list_all(),
            meta: None,
            next_cursor: None,
        })
    }
}
