//! Tools domain module.
//!
//! Tools are the operations MCP clients call. Except for `list_sessions`,
//! every tool may be called with only part of its parameters: the
//! coordinator keeps what was supplied in a session and asks for the rest.
//!
//! ## Architecture
//!
//! - `definitions/` - Individual tool implementations (one file per tool)
//! - `coordinator.rs` - Multi-turn parameter collection and execution
//! - `context.rs` - Configuration and coordinator shared by every call
//! - `router.rs` - rmcp ToolRouter builder for STDIO/TCP transport
//! - `registry.rs` - Closed tool set and name dispatch (HTTP, tests)
//! - `error.rs` - Tool-specific error types

pub mod context;
pub mod coordinator;
pub mod definitions;
mod error;
mod registry;
pub mod router;

pub use context::ToolContext;
pub use coordinator::{InvocationOutcome, SESSION_ID_ARG, ToolInvocationCoordinator};
pub use error::ToolError;
pub use registry::{ToolKind, ToolRegistry};
pub use router::build_tool_router;
