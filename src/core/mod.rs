//! Core module containing shared infrastructure components.
//!
//! Configuration, error types, path security, the rmcp server handler and
//! the transports that carry it.

pub mod config;
pub mod error;
pub mod security;
pub mod server;
pub mod transport;

pub use config::Config;
pub use error::{Error, Result};
pub use security::{PathSecurityError, validate_write_path};
pub use server::McpServer;
pub use transport::{TransportConfig, TransportService};
