//! Records and helpers shared by several tools

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Page size used when a list call does not ask for one
pub(super) const fn default_limit() -> u32 {
    10
}

/// Build a title filter in the Admin API search syntax.
///
/// The term is wrapped as `title:*term*` verbatim. Wildcard and query-syntax
/// characters inside the term are not escaped, so a term like `a*b` or
/// `x OR y` changes the meaning of the filter.
pub(super) fn title_filter(term: Option<&str>) -> Option<String> {
    term.filter(|term| !term.is_empty())
        .map(|term| format!("title:*{term}*"))
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Money {
    pub amount: String,
    pub currency_code: String,
}

/// A monetary amount in shop and presentment currencies
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct MoneyBag {
    pub shop_money: Money,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MailingAddress {
    pub address1: Option<String>,
    pub address2: Option<String>,
    pub city: Option<String>,
    pub province_code: Option<String>,
    pub zip: Option<String>,
    pub country: Option<String>,
    pub phone: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Seo {
    pub title: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Image {
    pub id: Option<String>,
    pub url: String,
    pub alt_text: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Author {
    /// The author's display name
    #[schemars(length(min = 1))]
    pub name: String,
}

/// SEO fields to change; unset fields are left as they are
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct SeoInput {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// A metafield to set on the owning resource
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct MetafieldInput {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    pub value: String,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case(Some("shirt"), Some("title:*shirt*"))]
    #[case(Some("a*b"), Some("title:*a*b*"))]
    #[case(Some(""), None)]
    #[case(None, None)]
    fn title_filter_wraps_the_term_verbatim(
        #[case] term: Option<&str>,
        #[case] expected: Option<&str>,
    ) {
        assert_eq!(title_filter(term).as_deref(), expected);
    }

    #[test]
    fn metafield_type_keeps_its_wire_name() {
        let metafield = MetafieldInput {
            id: None,
            namespace: Some("custom".to_string()),
            key: Some("care".to_string()),
            value: "Hand wash".to_string(),
            kind: Some("single_line_text_field".to_string()),
        };

        insta::assert_json_snapshot!(metafield, @r#"
        {
          "namespace": "custom",
          "key": "care",
          "value": "Hand wash",
          "type": "single_line_text_field"
        }
        "#);
    }
}
