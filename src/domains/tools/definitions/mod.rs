//! Tool definitions module.
//!
//! One module per tool. Stateful tools hand their raw arguments to the
//! session coordinator together with a parameter schema and a domain
//! function; `list_sessions` answers directly.

pub mod build_profile;
pub mod calculate;
pub mod common;
pub mod create_file;
pub mod list_sessions;

pub use build_profile::{BuildProfileParams, BuildProfileTool, Profile};
pub use calculate::{CalculateParams, CalculateTool, EvaluationError, ResultFormat, evaluate};
pub use create_file::{CreateFileParams, CreateFileTool};
pub use list_sessions::{ListSessionsParams, ListSessionsTool};
