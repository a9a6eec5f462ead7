//! Helpers for reading collected parameters.
//!
//! Collected values arrive as loosely typed JSON; these accessors convert
//! them and report unusable values as [`ToolError::InvalidArguments`].

use serde_json::Value;

use crate::domains::sessions::CollectedParams;
use crate::domains::tools::ToolError;

/// Read a parameter as text. Numbers and booleans are rendered as text.
pub fn text_param(params: &CollectedParams, name: &str) -> Result<String, ToolError> {
    match params.get(name) {
        Some(Value::String(s)) => Ok(s.clone()),
        Some(Value::Number(n)) => Ok(n.to_string()),
        Some(Value::Bool(b)) => Ok(b.to_string()),
        Some(_) => Err(ToolError::invalid_arguments(format!(
            "'{name}' must be text"
        ))),
        None => Err(ToolError::invalid_arguments(format!(
            "Missing parameter: {name}"
        ))),
    }
}

/// Read a non-negative whole number given as a JSON number or numeric text.
pub fn whole_number_param(params: &CollectedParams, name: &str) -> Result<u64, ToolError> {
    let invalid = || ToolError::invalid_arguments(format!("'{name}' must be a whole number"));

    match params.get(name) {
        Some(Value::Number(n)) => n
            .as_u64()
            .or_else(|| {
                n.as_f64()
                    .filter(|f| *f >= 0.0 && f.fract() == 0.0)
                    .map(|f| f as u64)
            })
            .ok_or_else(invalid),
        Some(Value::String(s)) => s.trim().parse::<u64>().map_err(|_| invalid()),
        Some(_) => Err(invalid()),
        None => Err(ToolError::invalid_arguments(format!(
            "Missing parameter: {name}"
        ))),
    }
}

/// Read a flag given as a JSON boolean or as `"true"` / `"false"` text.
pub fn flag_param(params: &CollectedParams, name: &str, default: bool) -> Result<bool, ToolError> {
    match params.get(name) {
        None | Some(Value::Null) => Ok(default),
        Some(Value::Bool(b)) => Ok(*b),
        Some(Value::String(s)) => match s.trim().to_lowercase().as_str() {
            "true" | "yes" | "1" => Ok(true),
            "false" | "no" | "0" => Ok(false),
            _ => Err(ToolError::invalid_arguments(format!(
                "'{name}' must be true or false"
            ))),
        },
        Some(_) => Err(ToolError::invalid_arguments(format!(
            "'{name}' must be true or false"
        ))),
    }
}
