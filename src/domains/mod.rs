//! Domains module containing business logic organized by bounded contexts.
//!
//! `sessions` knows nothing about tools or MCP; `tools` builds the
//! multi-turn behavior on top of it.

pub mod sessions;
pub mod tools;
