use std::collections::{BTreeMap, BTreeSet};

use futures::future::join_all;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::ShopifyTool;
use crate::errors::{ErrorContext, ToolError, TransportError};
use crate::graphql::{Connection, Requester, Variables, send};

const SEARCH_ARTICLES: &str = r#"
    query SearchArticles($query: String!, $first: Int!) {
      articles(first: $first, query: $query) {
        nodes {
          id
          title
          handle
          summary
          blog {
            title
          }
        }
      }
    }
"#;

const SEARCH_BLOGS: &str = r#"
    query SearchBlogs($query: String!, $first: Int!) {
      blogs(first: $first, query: $query) {
        nodes {
          id
          title
          handle
        }
      }
    }
"#;

const SEARCH_PAGES: &str = r#"
    query SearchPages($query: String!, $first: Int!) {
      pages(first: $first, query: $query) {
        nodes {
          id
          title
          handle
          bodySummary
        }
      }
    }
"#;

const SEARCH_PRODUCTS: &str = r#"
    query SearchProducts($query: String!, $first: Int!) {
      products(first: $first, query: $query) {
        nodes {
          id
          title
          handle
          description
        }
      }
    }
"#;

/// A kind of store content that can be searched
#[derive(
    JsonSchema, Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord,
)]
#[serde(rename_all = "UPPERCASE")]
pub enum SearchType {
    Article,
    Blog,
    Page,
    Product,
}

impl SearchType {
    const ALL: [SearchType; 4] = [
        SearchType::Article,
        SearchType::Blog,
        SearchType::Page,
        SearchType::Product,
    ];

    fn document(self) -> &'static str {
        match self {
            SearchType::Article => SEARCH_ARTICLES,
            SearchType::Blog => SEARCH_BLOGS,
            SearchType::Page => SEARCH_PAGES,
            SearchType::Product => SEARCH_PRODUCTS,
        }
    }

    /// The root field the type's operation selects
    fn field(self) -> &'static str {
        match self {
            SearchType::Article => "articles",
            SearchType::Blog => "blogs",
            SearchType::Page => "pages",
            SearchType::Product => "products",
        }
    }

    /// The key the type's results are reported under
    fn key(self) -> &'static str {
        match self {
            SearchType::Article => "article",
            SearchType::Blog => "blog",
            SearchType::Page => "page",
            SearchType::Product => "product",
        }
    }
}

/// Search articles, blogs, pages and products at once
pub struct SearchShopify;

#[derive(JsonSchema, Deserialize, Debug)]
pub struct SearchShopifyInput {
    /// The search query to find content across the store
    #[schemars(length(min = 1))]
    query: String,

    /// Types of resources to search for. If not specified, searches all types.
    types: Option<Vec<SearchType>>,

    /// Number of results to return per type (max 50)
    #[serde(default = "default_first")]
    #[schemars(range(min = 1, max = 50))]
    first: u32,
}

const fn default_first() -> u32 {
    10
}

#[derive(Debug, Deserialize)]
struct BlogTitle {
    title: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SearchNode {
    id: String,
    title: String,
    handle: String,
    #[serde(default)]
    summary: Option<String>,
    #[serde(default)]
    body_summary: Option<String>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    blog: Option<BlogTitle>,
}

/// One search hit, whatever its type
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchItem {
    pub id: String,
    pub title: String,
    pub handle: String,
    pub summary: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub blog_title: Option<String>,
}

impl From<SearchNode> for SearchItem {
    fn from(node: SearchNode) -> Self {
        let summary = [node.summary, node.body_summary, node.description]
            .into_iter()
            .flatten()
            .find(|text| !text.is_empty());

        Self {
            id: node.id,
            title: node.title,
            handle: node.handle,
            summary,
            blog_title: node.blog.map(|blog| blog.title),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct SearchOutput {
    pub results: BTreeMap<&'static str, Vec<SearchItem>>,
}

async fn search_one(
    client: &dyn Requester,
    kind: SearchType,
    query: &str,
    first: u32,
) -> Result<Vec<SearchItem>, TransportError> {
    let variables = Variables::new()
        .set("query", query)
        .set("first", first)
        .into_value();
    let mut data: BTreeMap<String, Connection<SearchNode>> =
        send(client, kind.document(), variables).await?;

    let nodes = data
        .remove(kind.field())
        .ok_or(TransportError::MissingData)?
        .into_nodes();
    Ok(nodes.into_iter().map(SearchItem::from).collect())
}

impl ShopifyTool for SearchShopify {
    const NAME: &'static str = "search-shopify";
    const DESCRIPTION: &'static str =
        "Search across all content types in the Shopify store (products, articles, blogs, pages)";

    type Input = SearchShopifyInput;
    type Output = SearchOutput;

    async fn execute(
        &self,
        client: &dyn Requester,
        input: SearchShopifyInput,
    ) -> Result<SearchOutput, ToolError> {
        let types: BTreeSet<SearchType> = match input.types {
            Some(types) => types.into_iter().collect(),
            None => SearchType::ALL.into_iter().collect(),
        };
        debug!(?types, "Searching store content");

        // Every branch runs to completion; a failed type reports no results
        // instead of failing the others.
        let query = input.query.as_str();
        let first = input.first;
        let searches = types.into_iter().map(|kind| async move {
            let items = match search_one(client, kind, query, first).await {
                Ok(items) => items,
                Err(error) => {
                    let error = ErrorContext::search(kind.field()).transport(error);
                    warn!(search_type = kind.key(), "{error}");
                    Vec::new()
                }
            };
            (kind.key(), items)
        });

        Ok(SearchOutput {
            results: join_all(searches).await.into_iter().collect(),
        })
    }
}
