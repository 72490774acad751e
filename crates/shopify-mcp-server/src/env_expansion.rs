//! Environment variable references in the YAML config file.
//!
//! String values may contain `${env.NAME}` or `${env.NAME:-fallback}`. A
//! literal `$` is written `$$`. References are resolved after the YAML has
//! been parsed, so a value containing YAML syntax never changes the shape of
//! the document.

use serde_yaml::Value;

#[derive(Debug, PartialEq, thiserror::Error)]
pub enum EnvExpansionError {
    #[error("undefined environment variable '{name}' referenced in configuration")]
    UndefinedVariable { name: String },

    #[error("environment variable '{name}' contains non-UTF8 data")]
    NonUnicodeValue { name: String },

    #[error("failed to parse YAML: {0}")]
    YamlParse(String),

    #[error("failed to serialize YAML: {0}")]
    YamlSerialize(String),
}

/// Resolve every environment reference in a YAML document and return the
/// resulting document text.
pub fn expand_yaml(yaml: &str) -> Result<String, EnvExpansionError> {
    let mut document: Value =
        serde_yaml::from_str(yaml).map_err(|e| EnvExpansionError::YamlParse(e.to_string()))?;

    expand_node(&mut document)?;

    serde_yaml::to_string(&document).map_err(|e| EnvExpansionError::YamlSerialize(e.to_string()))
}

fn expand_node(node: &mut Value) -> Result<(), EnvExpansionError> {
    match node {
        Value::String(text) if text.contains('$') => {
            let expanded = expand_str(text)?;
            *node = scalar(&expanded);
        }
        Value::Sequence(items) => items.iter_mut().try_for_each(expand_node)?,
        Value::Mapping(entries) => entries
            .iter_mut()
            .try_for_each(|(_, value)| expand_node(value))?,
        _ => {}
    }
    Ok(())
}

/// Reinterpret an expanded value as a YAML scalar so `"${env.PORT}"` can
/// still fill a numeric field. Anything that is not a plain scalar stays a
/// string.
pub fn scalar(text: &str) -> Value {
    match serde_yaml::from_str(text) {
        Ok(value @ (Value::Bool(_) | Value::Number(_) | Value::Null)) => value,
        _ => Value::String(text.to_string()),
    }
}

fn expand_str(text: &str) -> Result<String, EnvExpansionError> {
    shellexpand::env_with_context(text, lookup)
        .map(|expanded| expanded.into_owned())
        .map_err(|e| e.cause)
}

/// Resolve `env.NAME` keys; any other key is left as written
fn lookup(key: &str) -> Result<Option<String>, EnvExpansionError> {
    let Some(name) = key.strip_prefix("env.") else {
        return Ok(None);
    };

    match std::env::var(name) {
        Ok(value) if !value.is_empty() => Ok(Some(value)),
        Ok(_) | Err(std::env::VarError::NotPresent) => Err(EnvExpansionError::UndefinedVariable {
            name: name.to_string(),
        }),
        Err(std::env::VarError::NotUnicode(_)) => Err(EnvExpansionError::NonUnicodeValue {
            name: name.to_string(),
        }),
    }
}
