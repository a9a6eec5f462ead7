//! Multi-turn invocation coordinator.
//!
//! Every stateful tool call goes through [`ToolInvocationCoordinator::invoke`]:
//! the session named by `session_id` (or a fresh one) absorbs the supplied
//! arguments, then the coordinator either asks for the next missing
//! parameter or runs the tool's domain logic.

use rmcp::model::{CallToolResult, Content};
use serde_json::{Map, Value};
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

use crate::domains::sessions::{
    CollectedParams, ParameterSchema, Session, SessionHandle, SessionStore,
};

use super::ToolError;

/// Reserved argument carrying the session id between calls.
pub const SESSION_ID_ARG: &str = "session_id";

/// Result of one call to a stateful tool.
#[derive(Debug, Clone, PartialEq)]
pub enum InvocationOutcome {
    /// A required parameter is still missing; the session stays open.
    AwaitingInput {
        tool_name: String,
        parameter: String,
        description: String,
        session_id: String,
    },
    /// The tool ran; its session has been removed.
    Completed { session_id: String, output: String },
    /// The tool failed; the session stays open so the caller can retry.
    Failed {
        tool_name: String,
        session_id: String,
        message: String,
    },
}

impl InvocationOutcome {
    pub fn session_id(&self) -> &str {
        match self {
            Self::AwaitingInput { session_id, .. }
            | Self::Completed { session_id, .. }
            | Self::Failed { session_id, .. } => session_id,
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Self::Failed { .. })
    }
}

impl fmt::Display for InvocationOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AwaitingInput {
                tool_name,
                parameter,
                description,
                session_id,
            } => write!(
                f,
                "I need more information to complete the {tool_name} operation.\n\n\
                 Missing parameter: **{parameter}**\n\
                 Description: {description}\n\n\
                 Session ID: `{session_id}`\n\
                 Please call the tool again with this parameter."
            ),
            Self::Completed { session_id, output } => {
                write!(f, "{output}\n\nSession ID: `{session_id}`")
            }
            Self::Failed {
                tool_name,
                session_id,
                message,
            } => write!(
                f,
                "Error in {tool_name}: {message}\n\n\
                 Session ID: `{session_id}`\n\
                 Please call the tool again with corrected parameters."
            ),
        }
    }
}

impl From<InvocationOutcome> for CallToolResult {
    fn from(outcome: InvocationOutcome) -> Self {
        let content = vec![Content::text(outcome.to_string())];
        if outcome.is_error() {
            CallToolResult::error(content)
        } else {
            CallToolResult::success(content)
        }
    }
}

/// Drives sessions through parameter collection and execution.
#[derive(Debug, Clone)]
pub struct ToolInvocationCoordinator {
    store: Arc<SessionStore>,
}

impl ToolInvocationCoordinator {
    pub fn new(store: Arc<SessionStore>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &Arc<SessionStore> {
        &self.store
    }

    /// Merge `arguments` into the caller's session and run `domain` once
    /// every required parameter of `schema` has been supplied.
    ///
    /// The session lock is held from merge to execution, so concurrent
    /// calls for the same session id are applied one after the other.
    #[instrument(skip_all, fields(tool = tool_name))]
    pub fn invoke<F>(
        &self,
        tool_name: &str,
        schema: &ParameterSchema,
        arguments: &Map<String, Value>,
        domain: F,
    ) -> InvocationOutcome
    where
        F: FnOnce(&CollectedParams) -> Result<String, ToolError>,
    {
        let requested_id = requested_session_id(arguments);

        // A handle fetched from the store may be completed and removed by
        // another caller while we wait for its lock; resolve again if so.
        loop {
            let (session_id, handle) = self.resolve(requested_id, tool_name, schema);
            let mut session = handle.lock();
            if !self.store.is_current(&session_id, &handle) {
                debug!("Session {} was replaced while waiting, resolving again", session_id);
                continue;
            }
            return self.advance(tool_name, session_id, &mut session, schema, arguments, domain);
        }
    }

    fn resolve(
        &self,
        requested_id: Option<&str>,
        tool_name: &str,
        schema: &ParameterSchema,
    ) -> (String, SessionHandle) {
        match requested_id {
            Some(id) => {
                let (handle, created) = self.store.get_or_create(id, tool_name, schema);
                if created {
                    info!("Session {} not found, created it for {}", id, tool_name);
                }
                (id.to_string(), handle)
            }
            None => {
                let id = SessionStore::generate_id();
                info!("Starting session {} for {}", id, tool_name);
                let handle = self.store.create(&id, tool_name, schema);
                (id, handle)
            }
        }
    }

    fn advance<F>(
        &self,
        tool_name: &str,
        session_id: String,
        session: &mut Session,
        schema: &ParameterSchema,
        arguments: &Map<String, Value>,
        domain: F,
    ) -> InvocationOutcome
    where
        F: FnOnce(&CollectedParams) -> Result<String, ToolError>,
    {
        if session.tool_name() != tool_name {
            warn!(
                "Session {} belongs to {}, reused for {}",
                session_id,
                session.tool_name(),
                tool_name
            );
        }
        session.touch();

        for name in schema.required_names() {
            if let Some(value) = supplied(arguments, name) {
                session.add_param(name, value.clone());
            }
        }
        for optional in schema.optional_params() {
            let value = supplied(arguments, optional.name)
                .cloned()
                .unwrap_or_else(|| optional.default.clone());
            session.add_param(optional.name, value);
        }

        if let Some(parameter) = session.next_missing() {
            info!(
                "Session {} awaiting parameter '{}' ({} missing)",
                session_id,
                parameter,
                session.missing().len()
            );
            return InvocationOutcome::AwaitingInput {
                tool_name: session.tool_name().to_string(),
                parameter: parameter.to_string(),
                description: schema
                    .description_of(parameter)
                    .unwrap_or(parameter)
                    .to_string(),
                session_id,
            };
        }

        match domain(session.collected()) {
            Ok(output) => {
                session.mark_completed();
                self.store.delete(&session_id);
                info!("Session {} completed", session_id);
                InvocationOutcome::Completed { session_id, output }
            }
            Err(e) => {
                warn!("Session {} failed, kept for retry: {}", session_id, e);
                InvocationOutcome::Failed {
                    tool_name: session.tool_name().to_string(),
                    session_id,
                    message: e.to_string(),
                }
            }
        }
    }
}

/// The caller's session id, if one was supplied as a non-blank string.
fn requested_session_id(arguments: &Map<String, Value>) -> Option<&str> {
    arguments
        .get(SESSION_ID_ARG)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|id| !id.is_empty())
}

/// An argument counts as supplied unless it is absent, null or blank text.
fn supplied<'a>(arguments: &'a Map<String, Value>, name: &str) -> Option<&'a Value> {
    match arguments.get(name)? {
        Value::Null => None,
        Value::String(s) if s.trim().is_empty() => None,
        value => Some(value),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::thread;

    fn coordinator() -> ToolInvocationCoordinator {
        ToolInvocationCoordinator::new(Arc::new(SessionStore::new()))
    }

    fn profile_schema() -> ParameterSchema {
        ParameterSchema::new()
            .required("name", "User's full name")
            .required("email", "User's email address")
    }

    fn args(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => panic!("arguments must be an object"),
        }
    }

    fn join_fields(params: &CollectedParams) -> Result<String, ToolError> {
        let name = params["name"].as_str().unwrap_or_default();
        let email = params["email"].as_str().unwrap_or_default();
        Ok(format!("{name} <{email}>"))
    }

    #[test]
    fn test_first_call_asks_for_first_missing_param() {
        let coordinator = coordinator();
        let outcome =
            coordinator.invoke("build_profile", &profile_schema(), &args(json!({})), join_fields);

        match &outcome {
            InvocationOutcome::AwaitingInput {
                tool_name,
                parameter,
                description,
                ..
            } => {
                assert_eq!(tool_name, "build_profile");
                assert_eq!(parameter, "name");
                assert_eq!(description, "User's full name");
            }
            other => panic!("expected awaiting input, got {other:?}"),
        }
        assert!(coordinator.store().contains(outcome.session_id()));
    }

    #[test]
    fn test_collects_across_calls_then_deletes_session() {
        let coordinator = coordinator();
        let schema = profile_schema();

        let first = coordinator.invoke(
            "build_profile",
            &schema,
            &args(json!({"email": "ada@example.com"})),
            join_fields,
        );
        let id = first.session_id().to_string();
        assert!(matches!(
            &first,
            InvocationOutcome::AwaitingInput { parameter, .. } if parameter == "name"
        ));

        let second = coordinator.invoke(
            "build_profile",
            &schema,
            &args(json!({"session_id": id, "name": "Ada"})),
            join_fields,
        );
        assert_eq!(
            second,
            InvocationOutcome::Completed {
                session_id: id.clone(),
                output: "Ada <ada@example.com>".to_string(),
            }
        );
        assert!(!coordinator.store().contains(&id));
    }

    #[test]
    fn test_any_supply_order_completes() {
        let schema = ParameterSchema::new()
            .required("a", "first")
            .required("b", "second")
            .required("c", "third");
        let orders = [["a", "b", "c"], ["c", "a", "b"], ["b", "c", "a"]];

        for order in orders {
            let coordinator = coordinator();
            let mut session_id: Option<String> = None;
            let mut last = None;

            for name in order {
                let mut arguments = Map::new();
                arguments.insert(name.to_string(), json!(name.to_uppercase()));
                if let Some(id) = &session_id {
                    arguments.insert(SESSION_ID_ARG.to_string(), json!(id));
                }
                let outcome = coordinator.invoke("abc", &schema, &arguments, |p| {
                    let text = |k: &str| p[k].as_str().unwrap().to_string();
                    Ok(format!("{}{}{}", text("a"), text("b"), text("c")))
                });
                session_id = Some(outcome.session_id().to_string());
                last = Some(outcome);
            }

            let last = last.unwrap();
            assert!(matches!(
                &last,
                InvocationOutcome::Completed { output, .. } if output == "ABC"
            ));
            assert!(coordinator.store().is_empty());
        }
    }

    #[test]
    fn test_unknown_session_id_is_honored() {
        let coordinator = coordinator();
        let outcome = coordinator.invoke(
            "build_profile",
            &profile_schema(),
            &args(json!({"session_id": "my-own-id", "name": "Ada"})),
            join_fields,
        );

        assert_eq!(outcome.session_id(), "my-own-id");
        assert!(coordinator.store().contains("my-own-id"));
    }

    #[test]
    fn test_blank_and_null_values_are_not_supplied() {
        let coordinator = coordinator();
        let outcome = coordinator.invoke(
            "build_profile",
            &profile_schema(),
            &args(json!({"name": "   ", "email": null, "session_id": ""})),
            join_fields,
        );

        assert!(matches!(
            &outcome,
            InvocationOutcome::AwaitingInput { parameter, .. } if parameter == "name"
        ));
        assert_ne!(outcome.session_id(), "");
    }

    #[test]
    fn test_failure_keeps_session_for_retry() {
        let coordinator = coordinator();
        let schema = ParameterSchema::new().required("value", "A number");

        let failed = coordinator.invoke("check", &schema, &args(json!({"value": "oops"})), |_| {
            Err(ToolError::invalid_arguments("value must be numeric"))
        });
        let id = failed.session_id().to_string();
        assert!(failed.is_error());
        assert!(coordinator.store().contains(&id));

        let retried = coordinator.invoke(
            "check",
            &schema,
            &args(json!({"session_id": id, "value": 7})),
            |p| Ok(p["value"].to_string()),
        );
        assert!(matches!(&retried, InvocationOutcome::Completed { output, .. } if output == "7"));
        assert!(!coordinator.store().contains(&id));
    }

    #[test]
    fn test_optional_params_always_supplied() {
        let coordinator = coordinator();
        let schema = ParameterSchema::new()
            .required("expression", "Expression")
            .optional("format", "Output format", "decimal");

        let outcome =
            coordinator.invoke("calculate", &schema, &args(json!({})), |_| Ok(String::new()));
        let snapshot = coordinator.store().list();
        let session = &snapshot[outcome.session_id()];
        assert_eq!(session.collected()["format"], json!("decimal"));

        let outcome = coordinator.invoke(
            "calculate",
            &schema,
            &args(json!({"session_id": outcome.session_id(), "format": "fraction"})),
            |_| Ok(String::new()),
        );
        let snapshot = coordinator.store().list();
        assert_eq!(snapshot[outcome.session_id()].collected()["format"], json!("fraction"));
    }

    #[test]
    fn test_outcome_text_embeds_session_marker() {
        let awaiting = InvocationOutcome::AwaitingInput {
            tool_name: "calculate".into(),
            parameter: "expression".into(),
            description: "Expression".into(),
            session_id: "abc".into(),
        };
        let completed = InvocationOutcome::Completed {
            session_id: "abc".into(),
            output: "Result: 4".into(),
        };
        let failed = InvocationOutcome::Failed {
            tool_name: "calculate".into(),
            session_id: "abc".into(),
            message: "Division by zero".into(),
        };

        for outcome in [&awaiting, &completed, &failed] {
            assert!(outcome.to_string().contains("Session ID: `abc`"));
        }
        assert!(awaiting.to_string().contains("Missing parameter: **expression**"));
        assert!(failed.to_string().starts_with("Error in calculate: Division by zero"));
    }

    #[test]
    fn test_outcome_into_call_tool_result() {
        let failed: CallToolResult = InvocationOutcome::Failed {
            tool_name: "calculate".into(),
            session_id: "abc".into(),
            message: "boom".into(),
        }
        .into();
        assert_eq!(failed.is_error, Some(true));

        let completed: CallToolResult = InvocationOutcome::Completed {
            session_id: "abc".into(),
            output: "ok".into(),
        }
        .into();
        assert!(!completed.is_error.unwrap_or(false));
    }

    #[test]
    fn test_concurrent_sessions_keep_their_own_inputs() {
        let coordinator = coordinator();
        let schema = Arc::new(
            ParameterSchema::new()
                .required("left", "left operand")
                .required("right", "right operand")
                .required("tag", "label"),
        );

        let workers: Vec<_> = (0..16)
            .map(|n| {
                let coordinator = coordinator.clone();
                let schema = schema.clone();
                thread::spawn(move || {
                    let id = format!("worker-{n}");
                    let steps = [
                        json!({"session_id": id, "left": n}),
                        json!({"session_id": id, "right": n * 2}),
                        json!({"session_id": id, "tag": format!("t{n}")}),
                    ];
                    let mut last = None;
                    for step in steps {
                        last = Some(coordinator.invoke("pair", &schema, &args(step), |p| {
                            let tag = p["tag"].as_str().unwrap();
                            Ok(format!("{}:{}:{}", p["left"], p["right"], tag))
                        }));
                    }
                    (n, last.unwrap())
                })
            })
            .collect();

        for worker in workers {
            let (n, outcome) = worker.join().unwrap();
            let expected = format!("{}:{}:t{}", n, n * 2, n);
            assert!(
                matches!(
                    &outcome,
                    InvocationOutcome::Completed { output, .. } if *output == expected
                ),
                "worker {n} got {outcome:?}"
            );
        }
        assert!(coordinator.store().is_empty());
    }

    #[test]
    fn test_racing_calls_on_one_session_are_serialized() {
        let coordinator = coordinator();
        let schema = Arc::new(
            ParameterSchema::new()
                .required("a", "a")
                .required("b", "b"),
        );
        coordinator.invoke("pair", &schema, &args(json!({"session_id": "shared"})), |_| {
            Ok(String::new())
        });

        let handles: Vec<_> = ["a", "b"]
            .into_iter()
            .map(|name| {
                let coordinator = coordinator.clone();
                let schema = schema.clone();
                thread::spawn(move || {
                    coordinator.invoke(
                        "pair",
                        &schema,
                        &args(json!({"session_id": "shared", name: 1})),
                        |p| Ok(format!("{}", p.len())),
                    )
                })
            })
            .collect();

        let outcomes: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        let completed = outcomes
            .iter()
            .filter(|o| matches!(o, InvocationOutcome::Completed { .. }))
            .count();
        assert_eq!(completed, 1);
        assert!(!coordinator.store().contains("shared"));
    }
}
