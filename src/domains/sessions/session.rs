//! A single in-progress multi-turn tool invocation.

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;

use super::schema::ParameterSchema;

/// Parameters gathered so far, keyed by name.
pub type CollectedParams = HashMap<String, Value>;

/// Lifecycle state of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ConversationState {
    /// At least one required parameter has not been supplied yet.
    AwaitingParams,
    /// Every required parameter is present; the tool may run.
    Ready,
    /// The tool ran successfully. Informational only.
    Completed,
}

impl ConversationState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AwaitingParams => "awaiting_params",
            Self::Ready => "ready",
            Self::Completed => "completed",
        }
    }
}

impl fmt::Display for ConversationState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Server-side record of which parameters a conversation has supplied.
///
/// Every required parameter of the schema the session was created with is
/// tracked in exactly one of `collected` or `missing`.
#[derive(Debug, Clone, Serialize)]
pub struct Session {
    tool_name: String,
    state: ConversationState,
    collected: CollectedParams,
    missing: Vec<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl Session {
    /// Start a session for `tool_name` with every required parameter missing.
    pub fn new(tool_name: impl Into<String>, schema: &ParameterSchema) -> Self {
        let missing: Vec<String> = schema.required_names().map(str::to_string).collect();
        let state = if missing.is_empty() {
            ConversationState::Ready
        } else {
            ConversationState::AwaitingParams
        };
        let now = Utc::now();

        Self {
            tool_name: tool_name.into(),
            state,
            collected: HashMap::new(),
            missing,
            created_at: now,
            updated_at: now,
        }
    }

    /// Record a value, replacing any earlier value for the same name.
    ///
    /// Names outside the schema are stored but never affect `missing`.
    pub fn add_param(&mut self, name: impl Into<String>, value: Value) {
        let name = name.into();
        self.missing.retain(|m| *m != name);
        self.collected.insert(name, value);
        self.updated_at = Utc::now();

        if self.missing.is_empty() && self.state == ConversationState::AwaitingParams {
            self.state = ConversationState::Ready;
        }
    }

    pub fn is_complete(&self) -> bool {
        self.missing.is_empty()
    }

    /// The earliest schema-declared parameter not yet supplied.
    pub fn next_missing(&self) -> Option<&str> {
        self.missing.first().map(String::as_str)
    }

    pub fn mark_completed(&mut self) {
        self.state = ConversationState::Completed;
        self.updated_at = Utc::now();
    }

    /// Refresh the activity timestamp without changing any parameter.
    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }

    pub fn tool_name(&self) -> &str {
        &self.tool_name
    }

    pub fn state(&self) -> ConversationState {
        self.state
    }

    pub fn collected(&self) -> &CollectedParams {
        &self.collected
    }

    pub fn missing(&self) -> &[String] {
        &self.missing
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }
}
