//! Tool Registry - central registration and dispatch for all tools.
//!
//! The set of tools is closed: [`ToolKind`] names each one, and every
//! transport dispatches through [`ToolRegistry`] or the router built from
//! the same list.

use rmcp::model::{CallToolResult, Content, RawContent, Tool};
use serde_json::{Map, Value};
use tracing::{debug, warn};

use super::context::ToolContext;
use super::definitions::{BuildProfileTool, CalculateTool, CreateFileTool, ListSessionsTool};

// ============================================================================
// Tool Kind
// ============================================================================

/// Every tool this server exposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ToolKind {
    Calculate,
    CreateFile,
    BuildProfile,
    ListSessions,
}

impl ToolKind {
    /// All tools, in listing order.
    pub const ALL: [ToolKind; 4] = [
        ToolKind::Calculate,
        ToolKind::CreateFile,
        ToolKind::BuildProfile,
        ToolKind::ListSessions,
    ];

    /// Resolve a tool from its registered name.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.name() == name)
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Calculate => CalculateTool::NAME,
            Self::CreateFile => CreateFileTool::NAME,
            Self::BuildProfile => BuildProfileTool::NAME,
            Self::ListSessions => ListSessionsTool::NAME,
        }
    }

    /// Tool metadata as listed to clients.
    pub fn to_tool(&self) -> Tool {
        match self {
            Self::Calculate => CalculateTool::to_tool(),
            Self::CreateFile => CreateFileTool::to_tool(),
            Self::BuildProfile => BuildProfileTool::to_tool(),
            Self::ListSessions => ListSessionsTool::to_tool(),
        }
    }

    /// Run this tool with the caller's raw arguments.
    pub fn call(&self, arguments: &Map<String, Value>, ctx: &ToolContext) -> CallToolResult {
        match self {
            Self::Calculate => CalculateTool::execute(arguments, ctx),
            Self::CreateFile => CreateFileTool::execute(arguments, ctx),
            Self::BuildProfile => BuildProfileTool::execute(arguments, ctx),
            Self::ListSessions => ListSessionsTool::execute(ctx),
        }
    }
}

// ============================================================================
// Tool Registry
// ============================================================================

/// Tool registry - lists tools and dispatches calls by name.
#[derive(Debug, Clone)]
pub struct ToolRegistry {
    ctx: ToolContext,
}

impl ToolRegistry {
    /// Create a new tool registry sharing `ctx` with every call.
    pub fn new(ctx: ToolContext) -> Self {
        Self { ctx }
    }

    pub fn context(&self) -> &ToolContext {
        &self.ctx
    }

    /// Get all tool names.
    pub fn tool_names(&self) -> Vec<&'static str> {
        ToolKind::ALL.iter().map(ToolKind::name).collect()
    }

    /// Get all tools as Tool models (metadata).
    pub fn get_all_tools() -> Vec<Tool> {
        ToolKind::ALL.iter().map(ToolKind::to_tool).collect()
    }

    /// Dispatch a call. Unknown names produce an error result and never
    /// touch the session store.
    pub fn call_tool(&self, name: &str, arguments: &Map<String, Value>) -> CallToolResult {
        match ToolKind::from_name(name) {
            Some(kind) => {
                debug!("Dispatching {}", name);
                kind.call(arguments, &self.ctx)
            }
            None => {
                warn!("Unknown tool requested: {}", name);
                CallToolResult::error(vec![Content::text(format!("Unknown tool: {name}"))])
            }
        }
    }

    /// Dispatch a call and return only its text.
    pub fn invoke(&self, name: &str, arguments: &Map<String, Value>) -> String {
        let result = self.call_tool(name, arguments);
        result
            .content
            .iter()
            .filter_map(|content| match &content.raw {
                RawContent::Text(text) => Some(text.text.as_str()),
                _ => None,
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}
