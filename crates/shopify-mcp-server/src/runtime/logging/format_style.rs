use schemars::JsonSchema;
use serde::Deserialize;

/// Log line layout, one of the `tracing-subscriber` fmt formats
#[derive(Debug, Default, Clone, Copy, Deserialize, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum FormatStyle {
    /// Single-line, human-readable
    #[default]
    Full,
    /// Like `full` with shorter lines
    Compact,
    /// Newline-delimited JSON objects
    Json,
    /// Multi-line, with source locations
    Pretty,
}
