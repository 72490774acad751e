use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::ShopifyTool;
use super::common::{Author, default_limit, title_filter};
use crate::errors::{ErrorContext, ToolError, TransportError};
use crate::graphql::{Connection, InContext, PageInfo, Requester, UserError, Variables, send};

const GET_BLOGS: &str = r#"
    query GetBlogs($first: Int, $last: Int, $after: String, $before: String, $query: String) {
      blogs(first: $first, last: $last, after: $after, before: $before, query: $query) {
        nodes {
          id
          handle
          title
          updatedAt
          commentPolicy
          feed {
            path
            location
          }
          createdAt
          templateSuffix
          tags
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

const GET_BLOG_BY_ID: &str = r#"
    query GetBlogById($id: ID!) {
      blog(id: $id) {
        id
        title
        handle
        templateSuffix
        commentPolicy
        createdAt
        updatedAt
        articles(first: 5) {
          nodes {
            id
            title
            handle
            publishedAt
            author {
              name
            }
            tags
          }
        }
      }
    }
"#;

const BLOG_CREATE: &str = r#"
    mutation CreateBlog($blog: BlogCreateInput!) {
      blogCreate(blog: $blog) {
        blog {
          id
          title
          handle
          templateSuffix
          commentPolicy
          createdAt
        }
        userErrors {
          field
          message
        }
      }
    }
"#;

const BLOG_UPDATE: &str = r#"
    mutation UpdateBlog($id: ID!, $blog: BlogUpdateInput!) {
      blogUpdate(id: $id, blog: $blog) {
        blog {
          id
          title
          handle
          templateSuffix
          commentPolicy
        }
        userErrors {
          field
          message
        }
      }
    }
"#;

/// Whether readers' comments are held for moderation or not accepted
#[derive(JsonSchema, Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CommentPolicy {
    Moderated,
    Closed,
}

// get-blogs

/// List blogs, optionally filtered by title
pub struct GetBlogs;

#[derive(JsonSchema, Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct GetBlogsInput {
    /// Optional search term to filter blogs by title
    search_title: Option<String>,

    /// Maximum number of blogs to return (default: 10)
    #[serde(default = "default_limit")]
    #[schemars(range(min = 1, max = 250))]
    limit: u32,

    /// Return blogs after this cursor
    after: Option<String>,

    /// Return blogs before this cursor
    before: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Feed {
    pub path: String,
    pub location: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Blog {
    pub id: String,
    pub handle: String,
    pub title: String,
    pub updated_at: String,
    pub comment_policy: String,
    pub feed: Option<Feed>,
    pub created_at: String,
    pub template_suffix: Option<String>,
    pub tags: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct BlogsData {
    blogs: Connection<Blog>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BlogsOutput {
    pub blogs: Vec<Blog>,
    pub page_info: Option<PageInfo>,
}

impl ShopifyTool for GetBlogs {
    const NAME: &'static str = "get-blogs";
    const DESCRIPTION: &'static str = "Get all blogs or search by title";

    type Input = GetBlogsInput;
    type Output = BlogsOutput;

    async fn execute(
        &self,
        client: &dyn Requester,
        input: GetBlogsInput,
    ) -> Result<BlogsOutput, ToolError> {
        const CONTEXT: ErrorContext = ErrorContext::fetch("blogs");

        let variables = Variables::new()
            .page(input.limit, input.after.as_deref(), input.before.as_deref())
            .set_opt("query", title_filter(input.search_title.as_deref()))
            .into_value();
        let data: BlogsData = send(client, GET_BLOGS, variables)
            .await
            .in_context(CONTEXT)?;

        let (blogs, page_info) = data.blogs.into_page();
        Ok(BlogsOutput { blogs, page_info })
    }
}

// get-blog-by-id

/// Fetch one blog with its most recent articles
pub struct GetBlogById;

#[derive(JsonSchema, Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct GetBlogByIdInput {
    /// The GID of the blog to fetch (e.g., "gid://shopify/Blog/1234567890")
    #[schemars(length(min = 1))]
    blog_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlogArticle {
    pub id: String,
    pub title: String,
    pub handle: String,
    pub published_at: Option<String>,
    pub author: Option<Author>,
    pub tags: Vec<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BlogDetailNode {
    id: String,
    title: String,
    handle: String,
    template_suffix: Option<String>,
    comment_policy: String,
    created_at: String,
    updated_at: String,
    articles: Connection<BlogArticle>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BlogDetail {
    pub id: String,
    pub title: String,
    pub handle: String,
    pub template_suffix: Option<String>,
    pub comment_policy: String,
    pub created_at: String,
    pub updated_at: String,
    pub articles: Vec<BlogArticle>,
}

impl From<BlogDetailNode> for BlogDetail {
    fn from(node: BlogDetailNode) -> Self {
        Self {
            id: node.id,
            title: node.title,
            handle: node.handle,
            template_suffix: node.template_suffix,
            comment_policy: node.comment_policy,
            created_at: node.created_at,
            updated_at: node.updated_at,
            articles: node.articles.into_nodes(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct BlogData {
    blog: Option<BlogDetailNode>,
}

#[derive(Debug, Serialize)]
pub struct BlogDetailOutput {
    pub blog: BlogDetail,
}

impl ShopifyTool for GetBlogById {
    const NAME: &'static str = "get-blog-by-id";
    const DESCRIPTION: &'static str = "Get a specific blog by ID with all its details";

    type Input = GetBlogByIdInput;
    type Output = BlogDetailOutput;

    async fn execute(
        &self,
        client: &dyn Requester,
        input: GetBlogByIdInput,
    ) -> Result<BlogDetailOutput, ToolError> {
        const CONTEXT: ErrorContext = ErrorContext::fetch("blog");

        let variables = Variables::new()
            .set("id", input.blog_id.as_str())
            .into_value();
        let data: BlogData = send(client, GET_BLOG_BY_ID, variables)
            .await
            .in_context(CONTEXT)?;

        let blog = data
            .blog
            .ok_or_else(|| CONTEXT.not_found("Blog", input.blog_id))?;
        Ok(BlogDetailOutput { blog: blog.into() })
    }
}

// create-blog

/// Create a blog
pub struct CreateBlog;

#[derive(JsonSchema, Serialize, Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct CreateBlogInput {
    /// The title of the blog
    #[schemars(length(min = 1))]
    title: String,
    /// The URL-friendly handle for the blog. If not provided, it will be generated from the title.
    #[serde(skip_serializing_if = "Option::is_none")]
    handle: Option<String>,
    /// The template suffix for the blog
    #[serde(skip_serializing_if = "Option::is_none")]
    template_suffix: Option<String>,
    /// The comment policy for the blog
    #[serde(skip_serializing_if = "Option::is_none")]
    comment_policy: Option<CommentPolicy>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatedBlog {
    pub id: String,
    pub title: String,
    pub handle: String,
    pub template_suffix: Option<String>,
    pub comment_policy: String,
    pub created_at: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BlogCreateData {
    blog_create: BlogCreatePayload,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BlogCreatePayload {
    blog: Option<CreatedBlog>,
    user_errors: Vec<UserError>,
}

#[derive(Debug, Serialize)]
pub struct CreatedBlogOutput {
    pub blog: CreatedBlog,
}

impl ShopifyTool for CreateBlog {
    const NAME: &'static str = "create-blog";
    const DESCRIPTION: &'static str = "Creates a new blog with the specified details";

    type Input = CreateBlogInput;
    type Output = CreatedBlogOutput;

    async fn execute(
        &self,
        client: &dyn Requester,
        input: CreateBlogInput,
    ) -> Result<CreatedBlogOutput, ToolError> {
        const CONTEXT: ErrorContext = ErrorContext::create("blog");

        let variables = Variables::new()
            .set_serialized("blog", &input)
            .in_context(CONTEXT)?
            .into_value();
        let data: BlogCreateData = send(client, BLOG_CREATE, variables)
            .await
            .in_context(CONTEXT)?;
        CONTEXT.reject_user_errors(data.blog_create.user_errors)?;

        let blog = data
            .blog_create
            .blog
            .ok_or_else(|| CONTEXT.transport(TransportError::MissingData))?;
        Ok(CreatedBlogOutput { blog })
    }
}

// update-blog

/// Update a blog's title, handle, template suffix and comment policy
pub struct UpdateBlog;

#[derive(JsonSchema, Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct UpdateBlogInput {
    /// The GID of the blog to update (e.g., "gid://shopify/Blog/1234567890")
    #[schemars(length(min = 1))]
    blog_id: String,
    #[serde(flatten)]
    changes: BlogChanges,
}

#[derive(JsonSchema, Serialize, Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct BlogChanges {
    /// The new title for the blog
    #[serde(skip_serializing_if = "Option::is_none")]
    title: Option<String>,
    /// The URL-friendly handle for the blog
    #[serde(skip_serializing_if = "Option::is_none")]
    handle: Option<String>,
    /// The template suffix for the blog
    #[serde(skip_serializing_if = "Option::is_none")]
    template_suffix: Option<String>,
    /// The comment policy for the blog
    #[serde(skip_serializing_if = "Option::is_none")]
    comment_policy: Option<CommentPolicy>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdatedBlog {
    pub id: String,
    pub title: String,
    pub handle: String,
    pub template_suffix: Option<String>,
    pub comment_policy: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BlogUpdateData {
    blog_update: BlogUpdatePayload,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BlogUpdatePayload {
    blog: Option<UpdatedBlog>,
    user_errors: Vec<UserError>,
}

#[derive(Debug, Serialize)]
pub struct UpdatedBlogOutput {
    pub blog: UpdatedBlog,
}

impl ShopifyTool for UpdateBlog {
    const NAME: &'static str = "update-blog";
    const DESCRIPTION: &'static str =
        "Updates a blog's details including title, handle, template suffix, and comment policy";

    type Input = UpdateBlogInput;
    type Output = UpdatedBlogOutput;

    async fn execute(
        &self,
        client: &dyn Requester,
        input: UpdateBlogInput,
    ) -> Result<UpdatedBlogOutput, ToolError> {
        const CONTEXT: ErrorContext = ErrorContext::update("blog");

        let variables = Variables::new()
            .set("id", input.blog_id.as_str())
            .set_serialized("blog", &input.changes)
            .in_context(CONTEXT)?
            .into_value();
        let data: BlogUpdateData = send(client, BLOG_UPDATE, variables)
            .await
            .in_context(CONTEXT)?;
        CONTEXT.reject_user_errors(data.blog_update.user_errors)?;

        let blog = data
            .blog_update
            .blog
            .ok_or_else(|| CONTEXT.transport(TransportError::MissingData))?;
        Ok(UpdatedBlogOutput { blog })
    }
}
