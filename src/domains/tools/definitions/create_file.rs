//! File creation tool definition.
//!
//! Collects a destination path and the file content across calls, then
//! writes the file, creating missing parent directories.

use futures::FutureExt;
use rmcp::{
    handler::server::tool::{ToolCallContext, ToolRoute, cached_schema_for_type},
    model::{CallToolResult, Tool},
};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fs;
use tracing::{info, instrument};

use crate::core::config::Config;
use crate::core::security::validate_write_path;
use crate::domains::sessions::{CollectedParams, ParameterSchema};
use crate::domains::tools::ToolError;
use crate::domains::tools::context::ToolContext;
use crate::domains::tools::definitions::common::text_param;

const DEFAULT_ENCODING: &str = "UTF-8";

// ============================================================================
// Tool Parameters
// ============================================================================

/// Parameters for the create_file tool. Every field may arrive in a later call.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct CreateFileParams {
    /// Session id from an earlier reply, to continue that conversation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,

    /// The path where the file should be created (e.g. /tmp/example.txt).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_path: Option<String>,

    /// The content to write to the file.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,

    /// Text encoding of the file. Only UTF-8 is supported.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub encoding: Option<String>,
}

// ============================================================================
// Tool Definition
// ============================================================================

/// Stateful file writer.
pub struct CreateFileTool;

impl CreateFileTool {
    pub const NAME: &'static str = "create_file";

    pub const DESCRIPTION: &'static str = "Create a file with specified content. Can collect parameters across multiple interactions.";

    pub fn schema() -> ParameterSchema {
        ParameterSchema::new()
            .required(
                "file_path",
                "The path where the file should be created (e.g., /tmp/example.txt)",
            )
            .required("content", "The content to write to the file")
            .optional("encoding", "Text encoding of the file", DEFAULT_ENCODING)
    }

    #[instrument(skip_all)]
    pub fn execute(arguments: &Map<String, Value>, ctx: &ToolContext) -> CallToolResult {
        let config = ctx.config.clone();
        ctx.coordinator
            .invoke(Self::NAME, &Self::schema(), arguments, |params| {
                Self::run(params, &config)
            })
            .into()
    }

    /// Write the collected content to the collected path.
    pub fn run(params: &CollectedParams, config: &Config) -> Result<String, ToolError> {
        let file_path = text_param(params, "file_path")?;
        let content = text_param(params, "content")?;
        let encoding = text_param(params, "encoding").unwrap_or_else(|_| DEFAULT_ENCODING.into());

        if !is_utf8(&encoding) {
            return Err(ToolError::invalid_arguments(format!(
                "Unsupported encoding '{encoding}', only UTF-8 is supported"
            )));
        }

        let path = validate_write_path(&file_path, &config.security)?;

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, &content)?;

        let size = content.chars().count();
        info!("Created {} ({} characters)", path.display(), size);

        Ok(format!(
            "Successfully created file: {}\nSize: {} characters",
            file_path, size
        ))
    }

    pub fn to_tool() -> Tool {
        Tool {
            name: Self::NAME.into(),
            description: Some(Self::DESCRIPTION.into()),
            input_schema: cached_schema_for_type::<CreateFileParams>(),
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

fn is_utf8(encoding: &str) -> bool {
    matches!(
        encoding.trim().to_ascii_lowercase().as_str(),
        "utf-8" | "utf8"
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::SecurityConfig;
    use serde_json::json;
    use std::sync::Arc;
    use tempfile::TempDir;

    fn params(value: Value) -> CollectedParams {
        serde_json::from_value(value).unwrap()
    }

    fn rooted_config(root: &TempDir) -> Config {
        let mut config = Config::default();
        config.security = SecurityConfig {
            root_path: Some(root.path().to_path_buf()),
            allow_symlinks: true,
        };
        config
    }

    fn text_of(result: &CallToolResult) -> &str {
        match &result.content[0].raw {
            rmcp::model::RawContent::Text(text) => &text.text,
            _ => panic!("Expected text content"),
        }
    }

    #[test]
    fn test_run_creates_parent_dirs() {
        let temp_dir = TempDir::new().unwrap();
        let target = temp_dir.path().join("a/b/hello.txt");

        let out = CreateFileTool::run(
            &params(json!({
                "file_path": target.to_str().unwrap(),
                "content": "héllo",
                "encoding": "UTF-8"
            })),
            &Config::default(),
        )
        .unwrap();

        assert_eq!(fs::read_to_string(&target).unwrap(), "héllo");
        assert!(out.starts_with("Successfully created file: "));
        assert!(out.ends_with("Size: 5 characters"));
    }

    #[test]
    fn test_run_rejects_other_encodings() {
        let temp_dir = TempDir::new().unwrap();
        let target = temp_dir.path().join("latin.txt");

        let err = CreateFileTool::run(
            &params(json!({
                "file_path": target.to_str().unwrap(),
                "content": "x",
                "encoding": "ISO-8859-1"
            })),
            &Config::default(),
        )
        .unwrap_err();

        assert!(matches!(err, ToolError::InvalidArguments(_)));
        assert!(!target.exists());
    }

    #[test]
    fn test_run_outside_root_is_rejected() {
        let root = TempDir::new().unwrap();
        let outside = TempDir::new().unwrap();
        let target = outside.path().join("escape.txt");

        let err = CreateFileTool::run(
            &params(json!({"file_path": target.to_str().unwrap(), "content": "x"})),
            &rooted_config(&root),
        )
        .unwrap_err();

        assert!(matches!(err, ToolError::PathSecurity(_)));
        assert!(!target.exists());
    }

    #[test]
    fn test_execute_collects_path_then_content() {
        let root = TempDir::new().unwrap();
        let ctx = ToolContext::new(Arc::new(rooted_config(&root)));

        let mut args = Map::new();
        args.insert("file_path".into(), json!("notes/today.txt"));
        let first = CreateFileTool::execute(&args, &ctx);
        assert!(text_of(&first).contains("Missing parameter: **content**"));

        let session_id = ctx.sessions().list().into_keys().next().unwrap();
        let mut args = Map::new();
        args.insert("session_id".into(), json!(session_id));
        args.insert("content".into(), json!("remember the milk"));
        let second = CreateFileTool::execute(&args, &ctx);

        assert!(!second.is_error.unwrap_or(false));
        assert!(text_of(&second).starts_with("Successfully created file: notes/today.txt"));
        let written = fs::read_to_string(root.path().join("notes/today.txt")).unwrap();
        assert_eq!(written, "remember the milk");
        assert!(ctx.sessions().is_empty());
    }

    #[test]
    fn test_execute_failure_keeps_session() {
        let root = TempDir::new().unwrap();
        let ctx = ToolContext::new(Arc::new(rooted_config(&root)));

        let mut args = Map::new();
        args.insert("file_path".into(), json!("../outside.txt"));
        args.insert("content".into(), json!("x"));
        let result = CreateFileTool::execute(&args, &ctx);

        assert!(result.is_error.unwrap_or(false));
        assert!(text_of(&result).starts_with("Error in create_file:"));
        assert_eq!(ctx.sessions().len(), 1);
    }
}
