//! Profile builder tool definition.
//!
//! Gathers a user's name, email, age and preferences over several calls
//! and renders them as a JSON profile, optionally saved to disk.

use chrono::Utc;
use futures::FutureExt;
use rmcp::{
    handler::server::tool::{ToolCallContext, ToolRoute, cached_schema_for_type},
    model::{CallToolResult, Tool},
};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, instrument, warn};

use crate::core::config::Config;
use crate::domains::sessions::{CollectedParams, ParameterSchema};
use crate::domains::tools::ToolError;
use crate::domains::tools::context::ToolContext;
use crate::domains::tools::definitions::common::{flag_param, text_param, whole_number_param};

// ============================================================================
// Tool Parameters
// ============================================================================

/// Parameters for the build_profile tool. Every field may arrive in a later call.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct BuildProfileParams {
    /// Session id from an earlier reply, to continue that conversation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,

    /// User's full name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// User's email address.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,

    /// User's age (as a number).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub age: Option<Value>,

    /// User preferences or interests (comma-separated list).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preferences: Option<String>,

    /// Also write the profile to a JSON file.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub save_to_file: Option<bool>,
}

/// A completed user profile.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Profile {
    pub name: String,
    pub email: String,
    pub age: u64,
    pub preferences: Vec<String>,
    pub created_at: String,
}

impl Profile {
    /// Validate collected values and assemble the profile.
    pub fn from_params(params: &CollectedParams) -> Result<Self, ToolError> {
        let name = text_param(params, "name")?.trim().to_string();
        let email = text_param(params, "email")?.trim().to_string();
        if !email.contains('@') {
            return Err(ToolError::invalid_arguments(format!(
                "'{email}' is not a valid email address"
            )));
        }
        let age = whole_number_param(params, "age")?;
        let preferences = text_param(params, "preferences")?
            .split(',')
            .map(|p| p.trim().to_string())
            .collect();

        Ok(Self {
            name,
            email,
            age,
            preferences,
            created_at: Utc::now().to_rfc3339(),
        })
    }

    /// File name used when saving, e.g. `profile_ada_lovelace.json`.
    pub fn file_name(&self) -> String {
        let slug: String = self
            .name
            .to_lowercase()
            .chars()
            .map(|c| {
                if c.is_alphanumeric() || matches!(c, '-' | '_' | '.') {
                    c
                } else {
                    '_'
                }
            })
            .collect();
        format!("profile_{slug}.json")
    }
}

// ============================================================================
// Tool Definition
// ============================================================================

/// Stateful profile builder.
pub struct BuildProfileTool;

impl BuildProfileTool {
    pub const NAME: &'static str = "build_profile";

    pub const DESCRIPTION: &'static str = "Build a user profile by collecting information across multiple interactions. Can gather name, email, preferences, and other details progressively.";

    pub fn schema() -> ParameterSchema {
        ParameterSchema::new()
            .required("name", "User's full name")
            .required("email", "User's email address")
            .required("age", "User's age (as a number)")
            .required(
                "preferences",
                "User preferences or interests (comma-separated list)",
            )
            .optional("save_to_file", "Also write the profile to a JSON file", false)
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

    /// Build the profile and save it when asked to.
    ///
    /// A failed save is reported in the output but does not fail the call.
    pub fn run(params: &CollectedParams, config: &Config) -> Result<String, ToolError> {
        let profile = Profile::from_params(params)?;
        let save = flag_param(params, "save_to_file", false)?;

        let json = serde_json::to_string_pretty(&profile)
            .map_err(|e| ToolError::execution_failed(e.to_string()))?;
        let mut output = format!("Profile created successfully!\n\n{json}");

        if save {
            match save_profile(&config.tools.profile_dir, &profile.file_name(), &json) {
                Ok(path) => {
                    info!("Saved profile to {}", path.display());
                    output.push_str(&format!("\nProfile saved to: {}", path.display()));
                }
                Err(e) => {
                    warn!("Could not save profile: {}", e);
                    output.push_str(&format!("\nWarning: Could not save to file: {e}"));
                }
            }
        }

        Ok(output)
    }

    pub fn to_tool() -> Tool {
        Tool {
            name: Self::NAME.into(),
            description: Some(Self::DESCRIPTION.into()),
            input_schema: cached_schema_for_type::<BuildProfileParams>(),
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

fn save_profile(dir: &Path, file_name: &str, json: &str) -> std::io::Result<PathBuf> {
    fs::create_dir_all(dir)?;
    let path = dir.join(file_name);
    fs::write(&path, json)?;
    Ok(path)
}
