//! Tool-specific error types.

use thiserror::Error;

use crate::core::security::PathSecurityError;

use super::definitions::calculate::EvaluationError;

/// Errors raised by a tool's domain logic once its parameters are collected.
///
/// The coordinator turns every one of these into a retryable reply; the
/// session that produced it stays alive.
#[derive(Debug, Error)]
pub enum ToolError {
    /// A collected parameter has the wrong type or an unusable value.
    #[error("Invalid arguments: {0}")]
    InvalidArguments(String),

    /// The expression could not be evaluated.
    #[error(transparent)]
    Evaluation(#[from] EvaluationError),

    /// The requested path is not allowed.
    #[error("Path security validation failed: {0}")]
    PathSecurity(#[from] PathSecurityError),

    /// The tool execution failed.
    #[error("Execution failed: {0}")]
    ExecutionFailed(String),

    /// A filesystem operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ToolError {
    /// Create a new "invalid arguments" error.
    pub fn invalid_arguments(msg: impl Into<String>) -> Self {
        Self::InvalidArguments(msg.into())
    }

    /// Create a new "execution failed" error.
    pub fn execution_failed(msg: impl Into<String>) -> Self {
        Self::ExecutionFailed(msg.into())
    }
}
