use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::ShopifyTool;
use super::common::{Author, Image, default_limit, title_filter};
use crate::errors::{ErrorContext, ToolError, TransportError};
use crate::graphql::{Connection, InContext, PageInfo, Requester, UserError, Variables, send};

/// The article selection returned by the create and update mutations
macro_rules! article_fragment {
    () => {
        r#"
        fragment ArticleFields on Article {
          id
          title
          handle
          body
          summary
          tags
          isPublished
          author {
            name
          }
          image {
            id
            url
            altText
          }
        }
        "#
    };
}

const GET_ARTICLES: &str = r#"
    query GetArticles($blogId: ID!, $first: Int, $last: Int, $after: String, $before: String, $query: String) {
      blog(id: $blogId) {
        id
        title
        articles(first: $first, last: $last, after: $after, before: $before, query: $query) {
          edges {
            node {
              id
              title
              handle
              author {
                name
              }
              publishedAt
              tags
              image {
                id
                url
                altText
              }
              comments(first: 0) {
                pageInfo {
                  hasNextPage
                  hasPreviousPage
                }
              }
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
    }
"#;

const GET_ARTICLE_BY_ID: &str = r#"
    query GetArticleById($id: ID!) {
      article(id: $id) {
        id
        title
        handle
        author {
          name
        }
        blog {
          id
          title
        }
        body
        summary
        publishedAt
        tags
      }
    }
"#;

const ARTICLE_CREATE: &str = concat!(
    r#"
    mutation CreateArticle($article: ArticleCreateInput!) {
      articleCreate(article: $article) {
        article { ...ArticleFields }
        userErrors {
          field
          message
        }
      }
    }
    "#,
    article_fragment!()
);

const ARTICLE_UPDATE: &str = concat!(
    r#"
    mutation UpdateArticle($id: ID!, $article: ArticleUpdateInput!) {
      articleUpdate(id: $id, article: $article) {
        article { ...ArticleFields }
        userErrors {
          field
          message
        }
      }
    }
    "#,
    article_fragment!()
);

// get-articles

/// List the articles of one blog, optionally filtered by title
pub struct GetArticles;

#[derive(JsonSchema, Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct GetArticlesInput {
    /// The GID of the blog to get articles from (e.g., "gid://shopify/Blog/1234567890")
    #[schemars(length(min = 1))]
    blog_id: String,

    /// Optional search term to filter articles by title
    search_title: Option<String>,

    /// Maximum number of articles to return (default: 10)
    #[serde(default = "default_limit")]
    #[schemars(range(min = 1, max = 250))]
    limit: u32,

    /// Return articles after this cursor
    after: Option<String>,

    /// Return articles before this cursor
    before: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CommentsProbe {
    page_info: CommentsPageInfo,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CommentsPageInfo {
    has_next_page: bool,
    has_previous_page: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ArticleListNode {
    id: String,
    title: String,
    handle: String,
    author: Option<Author>,
    published_at: Option<String>,
    tags: Vec<String>,
    image: Option<Image>,
    comments: CommentsProbe,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ArticleSummary {
    pub id: String,
    pub title: String,
    pub handle: String,
    pub author: Option<Author>,
    pub published_at: Option<String>,
    pub tags: Vec<String>,
    pub image: Option<Image>,
    pub has_comments: bool,
}

impl From<ArticleListNode> for ArticleSummary {
    fn from(node: ArticleListNode) -> Self {
        // The articles query selects an empty page of comments, so any page
        // on either side of it means the article has at least one comment.
        let probe = node.comments.page_info;
        Self {
            id: node.id,
            title: node.title,
            handle: node.handle,
            author: node.author,
            published_at: node.published_at,
            tags: node.tags,
            image: node.image,
            has_comments: probe.has_next_page || probe.has_previous_page,
        }
    }
}

#[derive(Debug, Deserialize)]
struct BlogArticlesData {
    blog: Option<BlogArticlesNode>,
}

#[derive(Debug, Deserialize)]
struct BlogArticlesNode {
    id: String,
    title: String,
    articles: Connection<ArticleListNode>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ArticlesOutput {
    pub blog_id: String,
    pub blog_title: String,
    pub articles: Vec<ArticleSummary>,
    pub page_info: Option<PageInfo>,
}

impl ShopifyTool for GetArticles {
    const NAME: &'static str = "get-articles";
    const DESCRIPTION: &'static str = "Get all articles from a blog or search by title";

    type Input = GetArticlesInput;
    type Output = ArticlesOutput;

    async fn execute(
        &self,
        client: &dyn Requester,
        input: GetArticlesInput,
    ) -> Result<ArticlesOutput, ToolError> {
        const CONTEXT: ErrorContext = ErrorContext::fetch("articles");

        let variables = Variables::new()
            .set("blogId", input.blog_id.as_str())
            .page(input.limit, input.after.as_deref(), input.before.as_deref())
            .set_opt("query", title_filter(input.search_title.as_deref()))
            .into_value();
        let data: BlogArticlesData = send(client, GET_ARTICLES, variables)
            .await
            .in_context(CONTEXT)?;

        let blog = data
            .blog
            .ok_or_else(|| CONTEXT.not_found("Blog", input.blog_id))?;
        let (articles, page_info) = blog.articles.into_page();
        Ok(ArticlesOutput {
            blog_id: blog.id,
            blog_title: blog.title,
            articles: articles.into_iter().map(ArticleSummary::from).collect(),
            page_info,
        })
    }
}

// get-article-by-id

/// Fetch one article with its body and owning blog
pub struct GetArticleById;

#[derive(JsonSchema, Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct GetArticleByIdInput {
    /// The GID of the article to fetch (e.g., "gid://shopify/Article/1234567890")
    #[schemars(length(min = 1))]
    article_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlogRef {
    pub id: String,
    pub title: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArticleDetail {
    pub id: String,
    pub title: String,
    pub handle: String,
    pub author: Option<Author>,
    pub blog: Option<BlogRef>,
    pub body: String,
    pub summary: Option<String>,
    pub published_at: Option<String>,
    pub tags: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct ArticleData {
    article: Option<ArticleDetail>,
}

#[derive(Debug, Serialize)]
pub struct ArticleDetailOutput {
    pub article: ArticleDetail,
}

impl ShopifyTool for GetArticleById {
    const NAME: &'static str = "get-article-by-id";
    const DESCRIPTION: &'static str = "Get a specific article by ID with all its details";

    type Input = GetArticleByIdInput;
    type Output = ArticleDetailOutput;

    async fn execute(
        &self,
        client: &dyn Requester,
        input: GetArticleByIdInput,
    ) -> Result<ArticleDetailOutput, ToolError> {
        const CONTEXT: ErrorContext = ErrorContext::fetch("article");

        let variables = Variables::new()
            .set("id", input.article_id.as_str())
            .into_value();
        let data: ArticleData = send(client, GET_ARTICLE_BY_ID, variables)
            .await
            .in_context(CONTEXT)?;

        let article = data
            .article
            .ok_or_else(|| CONTEXT.not_found("Article", input.article_id))?;
        Ok(ArticleDetailOutput { article })
    }
}

/// An article as returned by the create and update mutations
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Article {
    pub id: String,
    pub title: String,
    pub handle: String,
    pub body: String,
    pub summary: Option<String>,
    pub tags: Vec<String>,
    pub is_published: bool,
    pub author: Option<Author>,
    pub image: Option<Image>,
}

#[derive(Debug, Serialize)]
pub struct ArticleOutput {
    pub article: Article,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ArticlePayload {
    article: Option<Article>,
    user_errors: Vec<UserError>,
}

impl ArticlePayload {
    fn into_article(self, context: ErrorContext) -> Result<ArticleOutput, ToolError> {
        context.reject_user_errors(self.user_errors)?;
        let article = self
            .article
            .ok_or_else(|| context.transport(TransportError::MissingData))?;
        Ok(ArticleOutput { article })
    }
}

// create-article

/// Create an article in a blog
pub struct CreateArticle;

#[derive(JsonSchema, Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct CreateArticleInput {
    /// The GID of the blog to create the article in (e.g., "gid://shopify/Blog/1234567890")
    #[schemars(length(min = 1))]
    blog_id: String,
    /// The title of the article
    #[schemars(length(min = 1))]
    title: String,
    /// The content of the article in HTML format
    #[schemars(length(min = 1))]
    content: String,
    /// The article's author
    author: Author,
    /// Whether to publish the article immediately
    published: Option<bool>,
    /// Tags to categorize the article
    tags: Option<Vec<String>>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ArticleCreateInput<'a> {
    blog_id: &'a str,
    title: &'a str,
    body: &'a str,
    author: &'a Author,
    #[serde(skip_serializing_if = "Option::is_none")]
    is_published: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tags: Option<&'a [String]>,
}

impl<'a> From<&'a CreateArticleInput> for ArticleCreateInput<'a> {
    fn from(input: &'a CreateArticleInput) -> Self {
        Self {
            blog_id: &input.blog_id,
            title: &input.title,
            body: &input.content,
            author: &input.author,
            is_published: input.published,
            tags: input.tags.as_deref(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ArticleCreateData {
    article_create: ArticlePayload,
}

impl ShopifyTool for CreateArticle {
    const NAME: &'static str = "create-article";
    const DESCRIPTION: &'static str = "Create a new blog article with the specified title, content, author and tags";

    type Input = CreateArticleInput;
    type Output = ArticleOutput;

    async fn execute(
        &self,
        client: &dyn Requester,
        input: CreateArticleInput,
    ) -> Result<ArticleOutput, ToolError> {
        const CONTEXT: ErrorContext = ErrorContext::create("article");

        let variables = Variables::new()
            .set_serialized("article", &ArticleCreateInput::from(&input))
            .in_context(CONTEXT)?
            .into_value();
        let data: ArticleCreateData = send(client, ARTICLE_CREATE, variables)
            .await
            .in_context(CONTEXT)?;

        data.article_create.into_article(CONTEXT)
    }
}

// update-article

/// Update an article's title, content, summary, tags and author
pub struct UpdateArticle;

#[derive(JsonSchema, Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct UpdateArticleInput {
    /// The GID of the article to update (e.g., "gid://shopify/Article/1234567890")
    #[schemars(length(min = 1))]
    article_id: String,
    #[serde(flatten)]
    changes: ArticleChanges,
}

#[derive(JsonSchema, Serialize, Deserialize, Debug)]
pub struct ArticleChanges {
    /// The new title for the article
    #[serde(skip_serializing_if = "Option::is_none")]
    title: Option<String>,
    /// The new content for the article
    #[serde(skip_serializing_if = "Option::is_none")]
    body: Option<String>,
    /// A short summary of the article
    #[serde(skip_serializing_if = "Option::is_none")]
    summary: Option<String>,
    /// Tags for the article
    #[serde(skip_serializing_if = "Option::is_none")]
    tags: Option<Vec<String>>,
    /// Author information for the article
    #[serde(skip_serializing_if = "Option::is_none")]
    author: Option<Author>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ArticleUpdateData {
    article_update: ArticlePayload,
}

impl ShopifyTool for UpdateArticle {
    const NAME: &'static str = "update-article";
    const DESCRIPTION: &'static str =
        "Updates an article's details including title, content, summary, tags, and author";

    type Input = UpdateArticleInput;
    type Output = ArticleOutput;

    async fn execute(
        &self,
        client: &dyn Requester,
        input: UpdateArticleInput,
    ) -> Result<ArticleOutput, ToolError> {
        const CONTEXT: ErrorContext = ErrorContext::update("article");

        let variables = Variables::new()
            .set("id", input.article_id.as_str())
            .set_serialized("article", &input.changes)
            .in_context(CONTEXT)?
            .into_value();
        let data: ArticleUpdateData = send(client, ARTICLE_UPDATE, variables)
            .await
            .in_context(CONTEXT)?;

        data.article_update.into_article(CONTEXT)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use rmcp::model::JsonObject;
    use rstest::rstest;
    use serde_json::{Value, json};

    use super::*;
    use crate::errors::ToolErrorKind;
    use crate::tools::BoundTool;
    use crate::tools::testing::FakeShopify;

    fn arguments(value: Value) -> Option<JsonObject> {
        value.as_object().cloned()
    }

    fn article_node(id: u32, has_next: bool, has_previous: bool) -> Value {
        json!({
            "id": format!("gid://shopify/Article/{id}"),
            "title": "Launch",
            "handle": "launch",
            "author": null,
            "publishedAt": null,
            "tags": [],
            "image": null,
            "comments": { "pageInfo": { "hasNextPage": has_next, "hasPreviousPage": has_previous } }
        })
    }

    fn saved_article() -> Value {
        json!({
            "id": "gid://shopify/Article/7",
            "title": "Hello",
            "handle": "hello",
            "body": "<p>Hi</p>",
            "summary": null,
            "tags": ["news"],
            "isPublished": false,
            "author": { "name": "Sam" },
            "image": null
        })
    }

    #[rstest]
    #[case(false, false, false)]
    #[case(true, false, true)]
    #[case(false, true, true)]
    #[tokio::test]
    async fn has_comments_is_derived_from_the_probe(
        #[case] has_next: bool,
        #[case] has_previous: bool,
        #[case] expected: bool,
    ) {
        let fake = Arc::new(FakeShopify::replying([json!({
            "blog": {
                "id": "gid://shopify/Blog/1",
                "title": "News",
                "articles": {
                    "edges": [ { "cursor": "a1", "node": article_node(1, has_next, has_previous) } ],
                    "pageInfo": { "hasNextPage": false, "hasPreviousPage": false, "startCursor": "a1", "endCursor": "a1" }
                }
            }
        })]));
        let tool = BoundTool::new(GetArticles);
        tool.initialize(fake);

        let output = tool
            .execute(arguments(json!({ "blogId": "gid://shopify/Blog/1" })))
            .await
            .unwrap();

        assert_eq!(output.articles[0].has_comments, expected);
    }

    #[tokio::test]
    async fn articles_carry_their_blog() {
        let fake = Arc::new(FakeShopify::replying([json!({
            "blog": {
                "id": "gid://shopify/Blog/1",
                "title": "News",
                "articles": {
                    "edges": [
                        { "node": article_node(1, false, false) },
                        { "node": article_node(2, true, false) }
                    ],
                    "pageInfo": { "hasNextPage": true, "hasPreviousPage": true, "startCursor": "s", "endCursor": "e" }
                }
            }
        })]));
        let tool = BoundTool::new(GetArticles);
        tool.initialize(fake.clone());

        let output = tool
            .execute(arguments(json!({
                "blogId": "gid://shopify/Blog/1",
                "searchTitle": "launch",
                "limit": 2,
                "before": "s0"
            })))
            .await
            .unwrap();

        assert_eq!(
            fake.recorded()[0].variables,
            json!({
                "blogId": "gid://shopify/Blog/1",
                "last": 2,
                "before": "s0",
                "query": "title:*launch*"
            })
        );

        let rendered = serde_json::to_value(&output).unwrap();
        assert_eq!(rendered["blogId"], json!("gid://shopify/Blog/1"));
        assert_eq!(rendered["blogTitle"], json!("News"));
        assert_eq!(rendered["articles"][1]["hasComments"], json!(true));
        assert!(rendered["articles"][0].get("comments").is_none());
        assert_eq!(rendered["pageInfo"]["hasPreviousPage"], json!(true));
    }

    #[tokio::test]
    async fn articles_of_a_missing_blog_are_not_found() {
        let fake = Arc::new(FakeShopify::replying([json!({ "blog": null })]));
        let tool = BoundTool::new(GetArticles);
        tool.initialize(fake);

        let error = tool
            .execute(arguments(json!({ "blogId": "gid://shopify/Blog/404" })))
            .await
            .unwrap_err();

        assert_eq!(error.kind(), ToolErrorKind::NotFound);
        assert_eq!(
            error.to_string(),
            "Failed to fetch articles: Blog with ID gid://shopify/Blog/404 not found"
        );
    }

    #[tokio::test]
    async fn null_article_is_not_found_rather_than_a_transport_error() {
        let fake = Arc::new(FakeShopify::replying([json!({ "article": null })]));
        let tool = BoundTool::new(GetArticleById);
        tool.initialize(fake);

        let error = tool
            .execute(arguments(json!({ "articleId": "gid://shopify/Article/1" })))
            .await
            .unwrap_err();

        assert_eq!(error.kind(), ToolErrorKind::NotFound);
        assert_ne!(error.kind(), ToolErrorKind::Transport);
    }

    #[tokio::test]
    async fn transport_failure_keeps_its_own_kind() {
        let fake = Arc::new(FakeShopify::new());
        fake.push_error(TransportError::GraphQL(vec![
            "Internal error. Looks like something went wrong on our end.".to_string(),
        ]));
        let tool = BoundTool::new(GetArticleById);
        tool.initialize(fake);

        let error = tool
            .execute(arguments(json!({ "articleId": "gid://shopify/Article/1" })))
            .await
            .unwrap_err();

        assert_eq!(error.kind(), ToolErrorKind::Transport);
        assert_eq!(
            error.to_string(),
            "Failed to fetch article: Internal error. Looks like something went wrong on our end."
        );
    }

    #[tokio::test]
    async fn article_without_author_or_blog_passes_through() {
        let fake = Arc::new(FakeShopify::replying([json!({
            "article": {
                "id": "gid://shopify/Article/1",
                "title": "Launch",
                "handle": "launch",
                "author": null,
                "blog": null,
                "body": "<p>Today</p>",
                "summary": null,
                "publishedAt": null,
                "tags": []
            }
        })]));
        let tool = BoundTool::new(GetArticleById);
        tool.initialize(fake);

        let output = tool
            .execute(arguments(json!({ "articleId": "gid://shopify/Article/1" })))
            .await
            .unwrap();

        assert!(output.article.author.is_none());
        assert!(output.article.blog.is_none());
    }

    #[tokio::test]
    async fn create_article_renames_content_and_published() {
        let fake = Arc::new(FakeShopify::replying([json!({
            "articleCreate": { "article": saved_article(), "userErrors": [] }
        })]));
        let tool = BoundTool::new(CreateArticle);
        tool.initialize(fake.clone());

        let output = tool
            .execute(arguments(json!({
                "blogId": "gid://shopify/Blog/1",
                "title": "Hello",
                "content": "<p>Hi</p>",
                "author": { "name": "Sam" },
                "published": false,
                "tags": ["news"]
            })))
            .await
            .unwrap();

        assert_eq!(
            fake.recorded()[0].variables,
            json!({ "article": {
                "blogId": "gid://shopify/Blog/1",
                "title": "Hello",
                "body": "<p>Hi</p>",
                "author": { "name": "Sam" },
                "isPublished": false,
                "tags": ["news"]
            } })
        );
        assert_eq!(output.article.id, "gid://shopify/Article/7");
    }

    #[tokio::test]
    async fn create_article_requires_an_author_name() {
        let fake = Arc::new(FakeShopify::new());
        let tool = BoundTool::new(CreateArticle);
        tool.initialize(fake.clone());

        let error = tool
            .execute(arguments(json!({
                "blogId": "gid://shopify/Blog/1",
                "title": "Hello",
                "content": "<p>Hi</p>"
            })))
            .await
            .unwrap_err();

        assert_eq!(error.kind(), ToolErrorKind::InvalidInput);
        assert!(error.to_string().contains("author"));
        assert!(fake.recorded().is_empty());
    }

    #[tokio::test]
    async fn update_article_reports_every_user_error() {
        let fake = Arc::new(FakeShopify::replying([json!({
            "articleUpdate": {
                "article": saved_article(),
                "userErrors": [
                    { "field": ["article", "title"], "message": "can't be blank" },
                    { "field": ["article", "body"], "message": "is too long" }
                ]
            }
        })]));
        let tool = BoundTool::new(UpdateArticle);
        tool.initialize(fake.clone());

        let error = tool
            .execute(arguments(json!({
                "articleId": "gid://shopify/Article/7",
                "title": "",
                "summary": "Short"
            })))
            .await
            .unwrap_err();

        assert_eq!(
            fake.recorded()[0].variables,
            json!({ "id": "gid://shopify/Article/7", "article": { "title": "", "summary": "Short" } })
        );
        assert_eq!(
            error.to_string(),
            "Failed to update article: article.title: can't be blank, article.body: is too long"
        );
    }
}
