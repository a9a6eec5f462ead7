//! Sessions domain module.
//!
//! Tracks the parameters a multi-turn tool invocation has collected so far.
//!
//! - `schema.rs` - Ordered parameter descriptions for a tool
//! - `session.rs` - One in-progress conversation and its state machine
//! - `store.rs` - Concurrent registry of sessions keyed by id

mod schema;
mod session;
mod store;

pub use schema::{OptionalParameter, ParameterSchema, ParameterSpec};
pub use session::{CollectedParams, ConversationState, Session};
pub use store::{SessionHandle, SessionStore};
