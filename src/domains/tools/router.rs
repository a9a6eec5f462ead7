//! Tool Router - builds the rmcp ToolRouter for the stdio and tcp transports.
//!
//! Each tool creates its own route; all of them share one [`ToolContext`],
//! and with it one session store.

use rmcp::handler::server::tool::ToolRouter;

use super::context::ToolContext;
use super::definitions::{BuildProfileTool, CalculateTool, CreateFileTool, ListSessionsTool};

/// Build the tool router with all registered tools.
pub fn build_tool_router<S>(ctx: ToolContext) -> ToolRouter<S>
where
    S: Send + Sync + 'static,
{
    ToolRouter::new()
        .with_route(CalculateTool::create_route(ctx.clone()))
        .with_route(CreateFileTool::create_route(ctx.clone()))
        .with_route(BuildProfileTool::create_route(ctx.clone()))
        .with_route(ListSessionsTool::create_route(ctx))
}
