use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::ShopifyTool;
use super::common::{MetafieldInput, Seo, SeoInput, default_limit, title_filter};
use crate::errors::{ErrorContext, ToolError, TransportError};
use crate::graphql::{Connection, InContext, PageInfo, Requester, UserError, Variables, send};

const GET_PAGES: &str = r#"
    query PageList($first: Int, $last: Int, $after: String, $before: String, $query: String) {
      pages(first: $first, last: $last, after: $after, before: $before, query: $query) {
        edges {
          node {
            id
            title
            handle
            bodySummary
            body
            createdAt
            updatedAt
            publishedAt
          }
        }
        pageInfo {
          hasNextPage
          hasPreviousPage
          startCursor
          endCursor
        }
      }
    }
"#;

const PAGE_UPDATE: &str = r#"
    mutation pageUpdate($id: ID!, $page: PageUpdateInput!) {
      pageUpdate(id: $id, page: $page) {
        page {
          id
          title
          handle
          bodySummary
          body
          isPublished
          updatedAt
          publishedAt
          titleTag: metafield(namespace: "global", key: "title_tag") { value }
          descriptionTag: metafield(namespace: "global", key: "description_tag") { value }
        }
        userErrors {
          field
          message
        }
      }
    }
"#;

/// Pages keep their SEO title and description in these metafields
const SEO_NAMESPACE: &str = "global";
const SEO_TITLE_KEY: &str = "title_tag";
const SEO_DESCRIPTION_KEY: &str = "description_tag";
const SEO_FIELD_TYPE: &str = "single_line_text_field";

// get-pages

/// List pages, optionally filtered by title
pub struct GetPages;

#[derive(JsonSchema, Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct GetPagesInput {
    /// Optional search term to filter pages by title
    search_title: Option<String>,

    /// Maximum number of pages to return (default: 10)
    #[serde(default = "default_limit")]
    #[schemars(range(min = 1, max = 250))]
    limit: u32,

    /// Return pages after this cursor
    after: Option<String>,

    /// Return pages before this cursor
    before: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page {
    pub id: String,
    pub title: String,
    pub handle: String,
    pub body_summary: String,
    pub body: String,
    pub created_at: String,
    pub updated_at: String,
    pub published_at: Option<String>,
}

#[derive(Debug, Deserialize)]
struct PagesData {
    pages: Connection<Page>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PagesOutput {
    pub pages: Vec<Page>,
    pub page_info: Option<PageInfo>,
}

impl ShopifyTool for GetPages {
    const NAME: &'static str = "get-pages";
    const DESCRIPTION: &'static str = "Get all pages or search by title";

    type Input = GetPagesInput;
    type Output = PagesOutput;

    async fn execute(
        &self,
        client: &dyn Requester,
        input: GetPagesInput,
    ) -> Result<PagesOutput, ToolError> {
        const CONTEXT: ErrorContext = ErrorContext::fetch("pages");

        let variables = Variables::new()
            .page(input.limit, input.after.as_deref(), input.before.as_deref())
            .set_opt("query", title_filter(input.search_title.as_deref()))
            .into_value();
        let data: PagesData = send(client, GET_PAGES, variables)
            .await
            .in_context(CONTEXT)?;

        let (pages, page_info) = data.pages.into_page();
        Ok(PagesOutput { pages, page_info })
    }
}

// update-page

/// Update a page's title, content, SEO fields and publish status
pub struct UpdatePage;

#[derive(JsonSchema, Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePageInput {
    /// The GID of the page to update (e.g., "gid://shopify/Page/1234567890")
    #[schemars(length(min = 1))]
    page_id: String,
    /// The new title for the page
    title: Option<String>,
    /// The new body content for the page
    body: Option<String>,
    /// The new HTML body content for the page, used in place of `body` when both are given
    body_html: Option<String>,
    /// SEO information for the page
    seo: Option<SeoInput>,
    /// Whether the page should be published or unpublished
    published: Option<bool>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct PageUpdateInput<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    title: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    body: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    is_published: Option<bool>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    metafields: Vec<MetafieldInput>,
}

impl<'a> From<&'a UpdatePageInput> for PageUpdateInput<'a> {
    fn from(input: &'a UpdatePageInput) -> Self {
        let seo = input.seo.as_ref();
        let metafields = [
            (SEO_TITLE_KEY, seo.and_then(|seo| seo.title.as_ref())),
            (SEO_DESCRIPTION_KEY, seo.and_then(|seo| seo.description.as_ref())),
        ]
        .into_iter()
        .filter_map(|(key, value)| {
            value.map(|value| MetafieldInput {
                id: None,
                namespace: Some(SEO_NAMESPACE.to_string()),
                key: Some(key.to_string()),
                value: value.clone(),
                kind: Some(SEO_FIELD_TYPE.to_string()),
            })
        })
        .collect();

        Self {
            title: input.title.as_deref(),
            body: input.body_html.as_deref().or(input.body.as_deref()),
            is_published: input.published,
            metafields,
        }
    }
}

#[derive(Debug, Deserialize)]
struct MetafieldValue {
    value: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UpdatedPageNode {
    id: String,
    title: String,
    handle: String,
    body_summary: String,
    body: String,
    is_published: bool,
    updated_at: String,
    published_at: Option<String>,
    title_tag: Option<MetafieldValue>,
    description_tag: Option<MetafieldValue>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdatedPage {
    pub id: String,
    pub title: String,
    pub handle: String,
    pub body_summary: String,
    pub body: String,
    pub is_published: bool,
    pub updated_at: String,
    pub published_at: Option<String>,
    pub seo: Seo,
}

impl From<UpdatedPageNode> for UpdatedPage {
    fn from(node: UpdatedPageNode) -> Self {
        Self {
            id: node.id,
            title: node.title,
            handle: node.handle,
            body_summary: node.body_summary,
            body: node.body,
            is_published: node.is_published,
            updated_at: node.updated_at,
            published_at: node.published_at,
            seo: Seo {
                title: node.title_tag.map(|tag| tag.value),
                description: node.description_tag.map(|tag| tag.value),
            },
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PageUpdateData {
    page_update: PageUpdatePayload,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PageUpdatePayload {
    page: Option<UpdatedPageNode>,
    user_errors: Vec<UserError>,
}

#[derive(Debug, Serialize)]
pub struct UpdatedPageOutput {
    pub page: UpdatedPage,
}

impl ShopifyTool for UpdatePage {
    const NAME: &'static str = "update-page";
    const DESCRIPTION: &'static str =
        "Updates a page's details including title, content, SEO information, and publish status";

    type Input = UpdatePageInput;
    type Output = UpdatedPageOutput;

    async fn execute(
        &self,
        client: &dyn Requester,
        input: UpdatePageInput,
    ) -> Result<UpdatedPageOutput, ToolError> {
        const CONTEXT: ErrorContext = ErrorContext::update("page");

        let variables = Variables::new()
            .set("id", input.page_id.as_str())
            .set_serialized("page", &PageUpdateInput::from(&input))
            .in_context(CONTEXT)?
            .into_value();
        let data: PageUpdateData = send(client, PAGE_UPDATE, variables)
            .await
            .in_context(CONTEXT)?;
        CONTEXT.reject_user_errors(data.page_update.user_errors)?;

        let page = data
            .page_update
            .page
            .ok_or_else(|| CONTEXT.transport(TransportError::MissingData))?;
        Ok(UpdatedPageOutput { page: page.into() })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use rmcp::model::JsonObject;
    use serde_json::{Value, json};

    use super::*;
    use crate::tools::BoundTool;
    use crate::tools::testing::FakeShopify;

    fn arguments(value: Value) -> Option<JsonObject> {
        value.as_object().cloned()
    }

    fn page_node(id: u32) -> Value {
        json!({
            "id": format!("gid://shopify/Page/{id}"),
            "title": "About us",
            "handle": "about-us",
            "bodySummary": "Who we are",
            "body": "<p>Who we are</p>",
            "createdAt": "2024-06-01T08:00:00Z",
            "updatedAt": "2025-01-01T08:00:00Z",
            "publishedAt": null
        })
    }

    #[tokio::test]
    async fn pages_keep_their_page_info() {
        let fake = Arc::new(FakeShopify::replying([json!({
            "pages": {
                "edges": [
                    { "cursor": "p1", "node": page_node(1) },
                    { "cursor": "p2", "node": page_node(2) }
                ],
                "pageInfo": { "hasNextPage": true, "hasPreviousPage": false, "startCursor": "p1", "endCursor": "p2" }
            }
        })]));
        let tool = BoundTool::new(GetPages);
        tool.initialize(fake.clone());

        let output = tool
            .execute(arguments(json!({ "limit": 2, "after": "p0" })))
            .await
            .unwrap();

        assert_eq!(
            fake.recorded()[0].variables,
            json!({ "first": 2, "after": "p0" })
        );
        let ids: Vec<_> = output.pages.iter().map(|page| page.id.as_str()).collect();
        assert_eq!(ids, vec!["gid://shopify/Page/1", "gid://shopify/Page/2"]);
        assert_eq!(
            output.page_info,
            Some(PageInfo {
                has_next_page: true,
                has_previous_page: false,
                start_cursor: Some("p1".to_string()),
                end_cursor: Some("p2".to_string()),
            })
        );
    }

    #[tokio::test]
    async fn update_maps_publish_flag_and_seo() {
        let fake = Arc::new(FakeShopify::replying([json!({
            "pageUpdate": {
                "page": {
                    "id": "gid://shopify/Page/1",
                    "title": "About us",
                    "handle": "about-us",
                    "bodySummary": "Hello",
                    "body": "<p>Hello</p>",
                    "isPublished": true,
                    "updatedAt": "2025-01-06T08:00:00Z",
                    "publishedAt": "2025-01-06T08:00:00Z",
                    "titleTag": { "value": "About our shop" },
                    "descriptionTag": null
                },
                "userErrors": []
            }
        })]));
        let tool = BoundTool::new(UpdatePage);
        tool.initialize(fake.clone());

        let output = tool
            .execute(arguments(json!({
                "pageId": "gid://shopify/Page/1",
                "body": "Hello",
                "bodyHtml": "<p>Hello</p>",
                "seo": { "title": "About our shop" },
                "published": true
            })))
            .await
            .unwrap();

        assert_eq!(
            fake.recorded()[0].variables,
            json!({
                "id": "gid://shopify/Page/1",
                "page": {
                    "body": "<p>Hello</p>",
                    "isPublished": true,
                    "metafields": [ {
                        "namespace": "global",
                        "key": "title_tag",
                        "value": "About our shop",
                        "type": "single_line_text_field"
                    } ]
                }
            })
        );
        assert_eq!(output.page.seo.title.as_deref(), Some("About our shop"));
        assert!(output.page.seo.description.is_none());
    }

    #[tokio::test]
    async fn update_without_changes_sends_an_empty_page() {
        let fake = Arc::new(FakeShopify::new());
        fake.push_error(TransportError::GraphQL(vec!["Throttled".to_string()]));
        let tool = BoundTool::new(UpdatePage);
        tool.initialize(fake.clone());

        let error = tool
            .execute(arguments(json!({ "pageId": "gid://shopify/Page/1" })))
            .await
            .unwrap_err();

        assert_eq!(
            fake.recorded()[0].variables,
            json!({ "id": "gid://shopify/Page/1", "page": {} })
        );
        assert_eq!(error.to_string(), "Failed to update page: Throttled");
    }
}
