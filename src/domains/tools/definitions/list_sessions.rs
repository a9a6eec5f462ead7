//! Session listing tool definition.
//!
//! Reports every open multi-turn session. Runs immediately and never
//! creates a session of its own.

use futures::FutureExt;
use rmcp::{
    handler::server::tool::{ToolCallContext, ToolRoute, cached_schema_for_type},
    model::{CallToolResult, Content, Tool},
};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::domains::sessions::Session;
use crate::domains::tools::context::ToolContext;

/// The list_sessions tool takes no parameters.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct ListSessionsParams {}

/// Lists active conversation sessions.
pub struct ListSessionsTool;

impl ListSessionsTool {
    pub const NAME: &'static str = "list_sessions";

    pub const DESCRIPTION: &'static str = "List all active conversation sessions";

    #[instrument(skip_all)]
    pub fn execute(ctx: &ToolContext) -> CallToolResult {
        let text = Self::render(ctx);
        CallToolResult::success(vec![Content::text(text)])
    }

    /// Render the current sessions, oldest first.
    pub fn render(ctx: &ToolContext) -> String {
        let mut sessions: Vec<(String, Session)> = ctx.sessions().list().into_iter().collect();
        debug!("Listing {} sessions", sessions.len());

        if sessions.is_empty() {
            return "No active sessions.".to_string();
        }
        sessions.sort_by(|(a_id, a), (b_id, b)| {
            a.created_at()
                .cmp(&b.created_at())
                .then_with(|| a_id.cmp(b_id))
        });

        let several = sessions.len() > 1;
        let mut out = String::from("**Active Sessions:**\n\n");
        for (id, session) in &sessions {
            let mut collected: Vec<&str> = session.collected().keys().map(String::as_str).collect();
            collected.sort_unstable();

            out.push_str(&format!(
                "**Session ID:** `{}`\n**Tool:** {}\n**State:** {}\n**Collected params:** [{}]\n**Missing params:** [{}]\n\n",
                id,
                session.tool_name(),
                session.state(),
                collected.join(", "),
                session.missing().join(", ")
            ));
            if several {
                out.push_str("---\n");
            }
        }

        out.trim().to_string()
    }

    pub fn to_tool() -> Tool {
        Tool {
            name: Self::NAME.into(),
            description: Some(Self::DESCRIPTION.into()),
            input_schema: cached_schema_for_type::<ListSessionsParams>(),
            annotations: None,
            output_schema: None,
            icons: None,
            meta: None,
            title: None,
        }
    }

    /// Route for the rmcp transports (stdio, tcp).
    pub fn create_route<S>(ctx: ToolContext) -> ToolRoute<S>
    where
        S: Send + Sync + 'static,
    {
        ToolRoute::new_dyn(Self::to_tool(), move |_call: ToolCallContext<'_, S>| {
            let ctx = ctx.clone();
            async move { Ok(Self::execute(&ctx)) }.boxed()
        })
    }
}
