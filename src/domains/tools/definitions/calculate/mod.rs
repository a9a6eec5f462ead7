//! Calculator tool definition.
//!
//! Collects an arithmetic expression, possibly over several calls, then
//! evaluates it and renders the result in the requested format.

mod evaluator;
mod format;

pub use evaluator::{EvaluationError, evaluate};
pub use format::ResultFormat;

use futures::FutureExt;
use rmcp::{
    handler::server::tool::{ToolCallContext, ToolRoute, cached_schema_for_type},
    model::{CallToolResult, Tool},
};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{debug, instrument};

use crate::domains::sessions::{CollectedParams, ParameterSchema};
use crate::domains::tools::ToolError;
use crate::domains::tools::context::ToolContext;
use crate::domains::tools::definitions::common::text_param;

// ============================================================================
// Tool Parameters
// ============================================================================

/// Parameters for the calculate tool. Every field may arrive in a later call.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct CalculateParams {
    /// Session id from an earlier reply, to continue that conversation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,

    /// Mathematical expression to evaluate (e.g. "2 + 2", "sqrt(16)", "(10 + 5) * 2").
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expression: Option<String>,

    /// Output format: decimal (default), scientific, fraction or integer.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
}

// ============================================================================
// Tool Definition
// ============================================================================

/// Stateful calculator.
pub struct CalculateTool;

impl CalculateTool {
    pub const NAME: &'static str = "calculate";

    pub const DESCRIPTION: &'static str = "Perform mathematical calculations. Supports +, -, *, /, ^, parentheses, sqrt, pow, sin, cos, tan, pi and e. Can collect parameters across multiple interactions.";

    /// Parameters collected before the expression is evaluated.
    pub fn schema() -> ParameterSchema {
        ParameterSchema::new()
            .required(
                "expression",
                "Mathematical expression to evaluate (e.g., '2 + 2', 'sqrt(16)', '(10 + 5) * 2')",
            )
            .optional(
                "format",
                "Output format: decimal, scientific, fraction or integer",
                ResultFormat::default().as_str(),
            )
    }

    #[instrument(skip_all)]
    pub fn execute(arguments: &Map<String, Value>, ctx: &ToolContext) -> CallToolResult {
        ctx.coordinator
            .invoke(Self::NAME, &Self::schema(), arguments, Self::run)
            .into()
    }

    /// Evaluate the collected expression.
    pub fn run(params: &CollectedParams) -> Result<String, ToolError> {
        let expression = text_param(params, "expression")?;
        let format = text_param(params, "format")
            .map(|name| ResultFormat::from_name(&name))
            .unwrap_or_default();

        debug!("Evaluating '{}' as {}", expression, format);
        let value = evaluate(&expression)?;

        Ok(format!(
            "Expression: {}\nResult: {}",
            expression,
            format.apply(value)
        ))
    }

    pub fn to_tool() -> Tool {
        Tool {
            name: Self::NAME.into(),
            description: Some(Self::DESCRIPTION.into()),
            input_schema: cached_schema_for_type::<CalculateParams>(),
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
        ToolRoute::new_dyn(Self::to_tool(), move |call: ToolCallContext<'_, S>| {
            let args = call.arguments.clone().unwrap_or_default();
            let ctx = ctx.clone();
            async move { Ok(Self::execute(&args, &ctx)) }.boxed()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::Config;
    use serde_json::json;
    use std::sync::Arc;

    fn test_context() -> ToolContext {
        ToolContext::new(Arc::new(Config::default()))
    }

    fn text_of(result: &CallToolResult) -> &str {
        match &result.content[0].raw {
            rmcp::model::RawContent::Text(text) => &text.text,
            _ => panic!("Expected text content"),
        }
    }

    fn params(value: Value) -> CollectedParams {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_run_formats() {
        let out = CalculateTool::run(&params(json!({"expression": "2 + 2 * 3", "format": "decimal"}))).unwrap();
        assert_eq!(out, "Expression: 2 + 2 * 3\nResult: 8");

        let out = CalculateTool::run(&params(json!({"expression": "355/113", "format": "fraction"}))).unwrap();
        assert_eq!(out, "Expression: 355/113\nResult: 3141593/1000000");

        let out = CalculateTool::run(&params(json!({"expression": "12345", "format": "scientific"}))).unwrap();
        assert!(out.ends_with("Result: 1.23e+04"));
    }

    #[test]
    fn test_run_without_format_uses_decimal() {
        let out = CalculateTool::run(&params(json!({"expression": "7/2"}))).unwrap();
        assert!(out.ends_with("Result: 3.5"));
    }

    #[test]
    fn test_run_division_by_zero() {
        let err = CalculateTool::run(&params(json!({"expression": "5/0"}))).unwrap_err();
        assert!(err.to_string().contains("Division by zero"));
    }

    #[test]
    fn test_execute_two_turns() {
        let ctx = test_context();

        let first = CalculateTool::execute(&Map::new(), &ctx);
        assert!(!first.is_error.unwrap_or(false));
        assert!(text_of(&first).contains("Missing parameter: **expression**"));
        assert_eq!(ctx.sessions().len(), 1);

        let session_id = ctx.sessions().list().into_keys().next().unwrap();
        let mut args = Map::new();
        args.insert("session_id".into(), json!(session_id));
        args.insert("expression".into(), json!("sqrt(144) + pow(2,4)*3 - 10"));

        let second = CalculateTool::execute(&args, &ctx);
        let text = text_of(&second);
        assert!(text.starts_with("Expression: sqrt(144) + pow(2,4)*3 - 10\nResult: 50"));
        assert!(text.contains(&format!("Session ID: `{session_id}`")));
        assert!(ctx.sessions().is_empty());
    }

    #[test]
    fn test_execute_error_keeps_session() {
        let ctx = test_context();
        let mut args = Map::new();
        args.insert("expression".into(), json!("1/0"));

        let result = CalculateTool::execute(&args, &ctx);
        assert!(result.is_error.unwrap_or(false));
        assert!(text_of(&result).starts_with("Error in calculate: Division by zero"));
        assert_eq!(ctx.sessions().len(), 1);
    }

    #[test]
    fn test_to_tool() {
        let tool = CalculateTool::to_tool();
        assert_eq!(tool.name.as_ref(), "calculate");
        let properties = tool.input_schema.get("properties").unwrap();
        assert!(properties.get("session_id").is_some());
        assert!(properties.get("expression").is_some());
    }
}
