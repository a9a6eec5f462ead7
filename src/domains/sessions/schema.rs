//! Parameter schemas for stateful tools.
//!
//! A schema lists the parameters a tool needs before it can run. Required
//! parameters are collected across turns in declaration order; optional
//! parameters always carry a value (the supplied one or their default).

use serde::Serialize;
use serde_json::Value;

/// A required parameter: collected across turns, requested in order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParameterSpec {
    pub name: &'static str,
    pub description: &'static str,
}

/// An optional parameter with the value used when the caller omits it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OptionalParameter {
    pub name: &'static str,
    pub description: &'static str,
    pub default: Value,
}

/// Ordered description of a tool's parameters.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ParameterSchema {
    required: Vec<ParameterSpec>,
    optional: Vec<OptionalParameter>,
}

impl ParameterSchema {
    /// Create an empty schema.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a required parameter. Declaration order is the request order.
    pub fn required(mut self, name: &'static str, description: &'static str) -> Self {
        self.required.push(ParameterSpec { name, description });
        self
    }

    /// Append an optional parameter with its default value.
    pub fn optional(
        mut self,
        name: &'static str,
        description: &'static str,
        default: impl Into<Value>,
    ) -> Self {
        self.optional.push(OptionalParameter {
            name,
            description,
            default: default.into(),
        });
        self
    }

    /// Optional parameters in declaration order.
    pub fn optional_params(&self) -> &[OptionalParameter] {
        &self.optional
    }

    /// Names of the required parameters, in order.
    pub fn required_names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.required.iter().map(|p| p.name)
    }

    /// Description of a parameter, required or optional.
    pub fn description_of(&self, name: &str) -> Option<&'static str> {
        self.required
            .iter()
            .find(|p| p.name == name)
            .map(|p| p.description)
            .or_else(|| {
                self.optional
                    .iter()
                    .find(|p| p.name == name)
                    .map(|p| p.description)
            })
    }

    pub fn is_empty(&self) -> bool {
        self.required.is_empty() && self.optional.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_required_order_is_preserved() {
        let schema = ParameterSchema::new()
            .required("name", "Full name")
            .required("email", "Email address")
            .required("age", "Age");

        let names: Vec<_> = schema.required_names().collect();
        assert_eq!(names, vec!["name", "email", "age"]);
    }

    #[test]
    fn test_description_lookup() {
        let schema = ParameterSchema::new()
            .required("expression", "Expression to evaluate")
            .optional("format", "Output format", "decimal");

        assert_eq!(
            schema.description_of("expression"),
            Some("Expression to evaluate")
        );
        assert_eq!(schema.description_of("format"), Some("Output format"));
        assert_eq!(schema.description_of("unknown"), None);
        assert_eq!(schema.optional_params()[0].default, Value::from("decimal"));
    }

    #[test]
    fn test_empty_schema() {
        assert!(ParameterSchema::new().is_empty());
        assert!(!ParameterSchema::new().required("a", "b").is_empty());
    }
}
