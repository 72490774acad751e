use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};

/// A business-rule rejection returned in a mutation payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserError {
    /// Path to the offending input field, joined with `.`
    #[serde(default, deserialize_with = "field_path")]
    pub field: Option<String>,
    pub message: String,
}

impl fmt::Display for UserError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.field {
            Some(field) if !field.is_empty() => write!(f, "{}: {}", field, self.message),
            _ => write!(f, "{}", self.message),
        }
    }
}

// The Admin API returns `field` as a list of path segments, but older
// payloads and some mocks use a plain string.
fn field_path<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum FieldPath {
        Single(String),
        Segments(Vec<String>),
    }

    Ok(
        Option::<FieldPath>::deserialize(deserializer)?.map(|path| match path {
            FieldPath::Single(field) => field,
            FieldPath::Segments(segments) => segments.join("."),
        }),
    )
}

#[cfg(test)]
mod tests {
    use rstest::rstest;
    use serde_json::json;

    use super::*;

    #[rstest]
    #[case(json!({"field": "title", "message": "too long"}), "title: too long")]
    #[case(json!({"field": ["input", "title"], "message": "too long"}), "input.title: too long")]
    #[case(json!({"field": null, "message": "Blog not found"}), "Blog not found")]
    #[case(json!({"message": "Blog not found"}), "Blog not found")]
    fn renders_field_and_message(#[case] raw: serde_json::Value, #[case] expected: &str) {
        let error: UserError = serde_json::from_value(raw).unwrap();
        assert_eq!(error.to_string(), expected);
    }
}
