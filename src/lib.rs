//! Stateful MCP Server Library
//!
//! A Model Context Protocol server whose tools may be called with only part
//! of their parameters. The server keeps what each conversation supplied in
//! a session, replies with the next missing parameter, and runs the tool
//! once everything is there.
//!
//! # Architecture
//!
//! - **core**: configuration, error handling, path security, the rmcp server and its transports
//! - **domains**: business logic organized by bounded contexts
//!   - **sessions**: parameter schemas, the session state machine and the session store
//!   - **tools**: the invocation coordinator and the tool definitions
//!
//! # Example
//!
//! ```rust,no_run
//! use stateful_mcp_server::{core::Config, core::McpServer, core::TransportService};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::from_env();
//!     let server = McpServer::new(config.clone());
//!     TransportService::new(config.transport).run(server).await?;
//!     Ok(())
//! }
//! ```

pub mod core;
pub mod domains;

// Re-export commonly used types for convenience
pub use core::{Config, Error, McpServer, Result};
pub use domains::sessions::SessionStore;
pub use domains::tools::{ToolKind, ToolRegistry};
