use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::ShopifyTool;
use super::common::{Seo, SeoInput, default_limit, title_filter};
use crate::errors::{ErrorContext, ToolError, TransportError};
use crate::graphql::{Connection, InContext, Requester, UserError, Variables, send};

const GET_COLLECTIONS: &str = r#"
    query GetCollections($first: Int!, $query: String) {
      collections(first: $first, query: $query) {
        nodes {
          id
          handle
          title
          description
          descriptionHtml
          updatedAt
          sortOrder
          templateSuffix
        }
      }
    }
"#;

const COLLECTION_UPDATE: &str = r#"
    mutation collectionUpdate($input: CollectionInput!) {
      collectionUpdate(input: $input) {
        collection {
          id
          title
          handle
          description
          descriptionHtml
          updatedAt
          seo {
            title
            description
          }
        }
        userErrors {
          field
          message
        }
      }
    }
"#;

// get-collections

/// Fetch collections, optionally filtered by title
pub struct GetCollections;

#[derive(JsonSchema, Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct GetCollectionsInput {
    /// Optional search term to filter collections by title
    search_title: Option<String>,

    /// Maximum number of collections to return (default: 10)
    #[serde(default = "default_limit")]
    #[schemars(range(min = 1, max = 250))]
    limit: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Collection {
    pub id: String,
    pub title: String,
    pub handle: String,
    pub description: String,
    pub description_html: String,
    pub updated_at: String,
    pub sort_order: String,
    pub template_suffix: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CollectionsData {
    collections: Connection<Collection>,
}

#[derive(Debug, Serialize)]
pub struct CollectionsOutput {
    pub collections: Vec<Collection>,
}

impl ShopifyTool for GetCollections {
    const NAME: &'static str = "get-collections";
    const DESCRIPTION: &'static str = "Get all collections or search by title";

    type Input = GetCollectionsInput;
    type Output = CollectionsOutput;

    async fn execute(
        &self,
        client: &dyn Requester,
        input: GetCollectionsInput,
    ) -> Result<CollectionsOutput, ToolError> {
        const CONTEXT: ErrorContext = ErrorContext::fetch("collections");

        let variables = Variables::new()
            .set("first", input.limit)
            .set_opt("query", title_filter(input.search_title.as_deref()))
            .into_value();
        let data: CollectionsData = send(client, GET_COLLECTIONS, variables)
            .await
            .in_context(CONTEXT)?;

        Ok(CollectionsOutput {
            collections: data.collections.into_nodes(),
        })
    }
}

// update-collection

/// Update a collection's title, description and SEO fields
pub struct UpdateCollection;

#[derive(JsonSchema, Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCollectionInput {
    /// The GID of the collection to update (e.g., "gid://shopify/Collection/1234567890")
    #[schemars(length(min = 1))]
    collection_id: String,
    /// The new title for the collection
    title: Option<String>,
    /// The new description for the collection, used when no HTML description is given
    description: Option<String>,
    /// The new HTML description for the collection
    description_html: Option<String>,
    /// New SEO title and description
    seo: Option<SeoInput>,
}

/// The Admin API only stores the HTML description, so a plain description
/// is sent in its place when no HTML is given.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CollectionInput<'a> {
    id: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    title: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    description_html: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    seo: Option<&'a SeoInput>,
}

impl<'a> From<&'a UpdateCollectionInput> for CollectionInput<'a> {
    fn from(input: &'a UpdateCollectionInput) -> Self {
        Self {
            id: &input.collection_id,
            title: input.title.as_deref(),
            description_html: input
                .description_html
                .as_deref()
                .or(input.description.as_deref()),
            seo: input.seo.as_ref(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdatedCollection {
    pub id: String,
    pub title: String,
    pub handle: String,
    pub description: String,
    pub description_html: String,
    pub updated_at: String,
    pub seo: Seo,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CollectionUpdateData {
    collection_update: CollectionUpdatePayload,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CollectionUpdatePayload {
    collection: Option<UpdatedCollection>,
    user_errors: Vec<UserError>,
}

#[derive(Debug, Serialize)]
pub struct UpdatedCollectionOutput {
    pub collection: UpdatedCollection,
}

impl ShopifyTool for UpdateCollection {
    const NAME: &'static str = "update-collection";
    const DESCRIPTION: &'static str = "Update a collection's details including title, description, and SEO fields";

    type Input = UpdateCollectionInput;
    type Output = UpdatedCollectionOutput;

    async fn execute(
        &self,
        client: &dyn Requester,
        input: UpdateCollectionInput,
    ) -> Result<UpdatedCollectionOutput, ToolError> {
        const CONTEXT: ErrorContext = ErrorContext::update("collection");

        let variables = Variables::new()
            .set_serialized("input", &CollectionInput::from(&input))
            .in_context(CONTEXT)?
            .into_value();
        let data: CollectionUpdateData = send(client, COLLECTION_UPDATE, variables)
            .await
            .in_context(CONTEXT)?;
        CONTEXT.reject_user_errors(data.collection_update.user_errors)?;

        let collection = data
            .collection_update
            .collection
            .ok_or_else(|| CONTEXT.transport(TransportError::MissingData))?;
        Ok(UpdatedCollectionOutput { collection })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use rmcp::model::JsonObject;
    use serde_json::{Value, json};

    use super::*;
    use crate::errors::ToolErrorKind;
    use crate::tools::BoundTool;
    use crate::tools::testing::FakeShopify;

    fn arguments(value: Value) -> Option<JsonObject> {
        value.as_object().cloned()
    }

    #[tokio::test]
    async fn collections_are_read_from_nodes() {
        let fake = Arc::new(FakeShopify::replying([json!({
            "collections": { "nodes": [
                {
                    "id": "gid://shopify/Collection/1",
                    "handle": "summer",
                    "title": "Summer",
                    "description": "Hot days",
                    "descriptionHtml": "<p>Hot days</p>",
                    "updatedAt": "2025-01-05T12:00:00Z",
                    "sortOrder": "BEST_SELLING",
                    "templateSuffix": null
                }
            ] }
        })]));
        let tool = BoundTool::new(GetCollections);
        tool.initialize(fake.clone());

        let output = tool
            .execute(arguments(json!({ "searchTitle": "sum" })))
            .await
            .unwrap();

        assert_eq!(
            fake.recorded()[0].variables,
            json!({ "first": 10, "query": "title:*sum*" })
        );
        assert_eq!(output.collections.len(), 1);
        assert_eq!(output.collections[0].sort_order, "BEST_SELLING");

        let rendered = serde_json::to_value(&output).unwrap();
        assert!(rendered.get("pageInfo").is_none());
    }

    #[tokio::test]
    async fn plain_description_fills_in_for_html() {
        let fake = Arc::new(FakeShopify::replying([json!({
            "collectionUpdate": {
                "collection": {
                    "id": "gid://shopify/Collection/1",
                    "title": "Summer",
                    "handle": "summer",
                    "description": "Hot days",
                    "descriptionHtml": "Hot days",
                    "updatedAt": "2025-01-05T12:00:00Z",
                    "seo": { "title": "Summer sale", "description": null }
                },
                "userErrors": []
            }
        })]));
        let tool = BoundTool::new(UpdateCollection);
        tool.initialize(fake.clone());

        let output = tool
            .execute(arguments(json!({
                "collectionId": "gid://shopify/Collection/1",
                "description": "Hot days",
                "seo": { "title": "Summer sale" }
            })))
            .await
            .unwrap();

        assert_eq!(
            fake.recorded()[0].variables,
            json!({ "input": {
                "id": "gid://shopify/Collection/1",
                "descriptionHtml": "Hot days",
                "seo": { "title": "Summer sale" }
            } })
        );
        assert_eq!(output.collection.seo.title.as_deref(), Some("Summer sale"));
    }

    #[tokio::test]
    async fn user_error_names_field_and_message() {
        let fake = Arc::new(FakeShopify::replying([json!({
            "collectionUpdate": {
                "collection": null,
                "userErrors": [ { "field": "title", "message": "too long" } ]
            }
        })]));
        let tool = BoundTool::new(UpdateCollection);
        tool.initialize(fake);

        let error = tool
            .execute(arguments(json!({
                "collectionId": "gid://shopify/Collection/1",
                "title": "x"
            })))
            .await
            .unwrap_err();

        assert_eq!(error.kind(), ToolErrorKind::RemoteUser);
        let message = error.to_string();
        assert!(message.contains("title"), "{message}");
        assert!(message.contains("too long"), "{message}");
    }

    #[tokio::test]
    async fn empty_collection_id_is_rejected() {
        let fake = Arc::new(FakeShopify::new());
        let tool = BoundTool::new(UpdateCollection);
        tool.initialize(fake.clone());

        let error = tool
            .execute(arguments(json!({ "collectionId": "" })))
            .await
            .unwrap_err();

        assert_eq!(error.kind(), ToolErrorKind::InvalidInput);
        assert!(fake.recorded().is_empty());
    }
}
