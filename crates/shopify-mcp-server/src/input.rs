//! Validate raw tool arguments against a tool's declared input schema

use jsonschema::Validator;
use rmcp::model::JsonObject;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::warn;

use crate::errors::{FieldViolation, ToolError};

/// Checks raw arguments against an input schema before they are parsed.
///
/// Every property is checked independently so a call with several bad
/// fields reports all of them at once.
pub struct InputGate {
    required: Vec<String>,
    properties: Vec<(String, Validator)>,
}

impl InputGate {
    pub fn new(tool: &str, schema: &JsonObject) -> Self {
        let required = schema
            .get("required")
            .and_then(Value::as_array)
            .map(|required| {
                required
                    .iter()
                    .filter_map(Value::as_str)
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();

        let properties = schema
            .get("properties")
            .and_then(Value::as_object)
            .map(|properties| {
                properties
                    .iter()
                    .filter_map(|(name, property)| match jsonschema::validator_for(property) {
                        Ok(validator) => Some((name.clone(), validator)),
                        Err(e) => {
                            warn!(tool, property = %name, "Skipping uncompilable property schema: {e}");
                            None
                        }
                    })
                    .collect()
            })
            .unwrap_or_default();

        Self {
            required,
            properties,
        }
    }

    /// Every violated constraint in `arguments`, in schema order
    pub fn violations(&self, arguments: &JsonObject) -> Vec<FieldViolation> {
        let missing = self
            .required
            .iter()
            .filter(|name| !arguments.contains_key(name.as_str()))
            .map(|name| FieldViolation::new(name, "is a required property"));

        let invalid = self.properties.iter().flat_map(|(name, validator)| {
            arguments
                .get(name)
                .map(|value| {
                    validator
                        .iter_errors(value)
                        .map(|error| FieldViolation::new(name, error.to_string()))
                        .collect::<Vec<_>>()
                })
                .unwrap_or_default()
        });

        missing.chain(invalid).collect()
    }

    /// Validate `arguments` and parse them into a typed input record, with
    /// declared defaults applied to absent fields.
    pub fn parse<T: DeserializeOwned>(
        &self,
        tool: &'static str,
        arguments: Option<JsonObject>,
    ) -> Result<T, ToolError> {
        let arguments = arguments.unwrap_or_default();

        let violations = self.violations(&arguments);
        if !violations.is_empty() {
            return Err(ToolError::InvalidInput { tool, violations });
        }

        serde_path_to_error::deserialize(Value::Object(arguments)).map_err(|e| {
            let field = match e.path().to_string() {
                path if path == "." => String::new(),
                path => path,
            };
            ToolError::InvalidInput {
                tool,
                violations: vec![FieldViolation::new(field, e.into_inner().to_string())],
            }
        })
    }
}
