//! The Shopify tools and the pipeline that runs them
//!
//! Each tool is a [`ShopifyTool`]: a typed input record, one hand-written
//! GraphQL operation, and a typed output record. [`BoundTool`] wraps a tool
//! with its input gate and its own client slot, and [`ToolRegistry`] holds
//! every bound tool behind the type-erased [`DynTool`] interface.

mod articles;
mod blogs;
mod collections;
mod common;
mod customers;
mod orders;
mod pages;
mod products;
mod search;

use std::future::Future;
use std::sync::Arc;

use futures::future::BoxFuture;
use parking_lot::RwLock;
use rmcp::model::{CallToolResult, Content, ErrorCode, JsonObject, Tool};
use schemars::JsonSchema;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::errors::{McpError, ToolError};
use crate::graphql::Requester;
use crate::input::InputGate;
use crate::schema_from_type;

pub use articles::{CreateArticle, GetArticleById, GetArticles, UpdateArticle};
pub use blogs::{CreateBlog, GetBlogById, GetBlogs, UpdateBlog};
pub use collections::{GetCollections, UpdateCollection};
pub use customers::{GetCustomers, UpdateCustomer};
pub use orders::{GetCustomerOrders, GetOrderById, GetOrders, UpdateOrder};
pub use pages::{GetPages, UpdatePage};
pub use products::{GetProductById, GetProducts, UpdateProduct};
pub use search::SearchShopify;

/// A single Shopify operation exposed as an MCP tool
pub trait ShopifyTool: Send + Sync + 'static {
    /// The stable kebab-case tool name
    const NAME: &'static str;
    const DESCRIPTION: &'static str;

    type Input: DeserializeOwned + JsonSchema + Send;
    type Output: Serialize + Send;

    fn execute(
        &self,
        client: &dyn Requester,
        input: Self::Input,
    ) -> impl Future<Output = Result<Self::Output, ToolError>> + Send;
}

/// A tool together with its MCP descriptor, input gate and client slot
pub struct BoundTool<T: ShopifyTool> {
    tool: T,
    descriptor: Tool,
    gate: InputGate,
    client: RwLock<Option<Arc<dyn Requester>>>,
}

impl<T: ShopifyTool> BoundTool<T> {
    pub fn new(tool: T) -> Self {
        let schema = schema_from_type!(T::Input);
        let gate = InputGate::new(T::NAME, &schema);
        Self {
            tool,
            descriptor: Tool::new(T::NAME, T::DESCRIPTION, schema),
            gate,
            client: RwLock::new(None),
        }
    }

    /// Bind the client this tool sends its operations through. A later call
    /// replaces the earlier client.
    pub fn initialize(&self, client: Arc<dyn Requester>) {
        *self.client.write() = Some(client);
    }

    pub fn is_initialized(&self) -> bool {
        self.client.read().is_some()
    }

    pub fn descriptor(&self) -> &Tool {
        &self.descriptor
    }

    /// Validate the raw arguments and run the tool
    #[tracing::instrument(skip_all, fields(tool = T::NAME))]
    pub async fn execute(&self, arguments: Option<JsonObject>) -> Result<T::Output, ToolError> {
        let input: T::Input = self.gate.parse(T::NAME, arguments)?;
        let client = self
            .client
            .read()
            .clone()
            .ok_or(ToolError::Uninitialized { tool: T::NAME })?;
        self.tool.execute(client.as_ref(), input).await
    }
}

/// A bound tool with its input and output types erased
pub trait DynTool: Send + Sync {
    fn descriptor(&self) -> &Tool;

    fn initialize(&self, client: Arc<dyn Requester>);

    /// Run the tool and render its outcome as an MCP tool result
    fn call(&self, arguments: Option<JsonObject>) -> BoxFuture<'_, Result<CallToolResult, McpError>>;
}

impl<T: ShopifyTool> DynTool for BoundTool<T> {
    fn descriptor(&self) -> &Tool {
        BoundTool::descriptor(self)
    }

    fn initialize(&self, client: Arc<dyn Requester>) {
        BoundTool::initialize(self, client)
    }

    fn call(&self, arguments: Option<JsonObject>) -> BoxFuture<'_, Result<CallToolResult, McpError>> {
        Box::pin(async move {
            match self.execute(arguments).await {
                Ok(output) => Ok(CallToolResult::success(vec![Content::json(output)?])),
                Err(error) => {
                    warn!(tool = T::NAME, kind = ?error.kind(), "{error}");
                    Ok(CallToolResult::error(vec![Content::text(error.to_string())]))
                }
            }
        })
    }
}

/// Every Shopify tool, in registration order
pub struct ToolRegistry {
    tools: Vec<Box<dyn DynTool>>,
}

impl ToolRegistry {
    /// Build the registry and bind every tool to `client`
    pub fn new(client: Arc<dyn Requester>) -> Self {
        let registry = Self::unbound();
        registry.initialize(client);
        registry
    }

    /// Build the registry without binding any tool to a client
    pub fn unbound() -> Self {
        fn bind<T: ShopifyTool>(tool: T) -> Box<dyn DynTool> {
            Box::new(BoundTool::new(tool))
        }

        Self {
            tools: vec![
                bind(GetProducts),
                bind(GetProductById),
                bind(UpdateProduct),
                bind(GetCustomers),
                bind(UpdateCustomer),
                bind(GetCustomerOrders),
                bind(GetOrders),
                bind(GetOrderById),
                bind(UpdateOrder),
                bind(GetCollections),
                bind(UpdateCollection),
                bind(GetPages),
                bind(UpdatePage),
                bind(GetBlogs),
                bind(GetBlogById),
                bind(CreateBlog),
                bind(UpdateBlog),
                bind(GetArticles),
                bind(GetArticleById),
                bind(CreateArticle),
                bind(UpdateArticle),
                bind(SearchShopify),
            ],
        }
    }

    /// Bind every tool to `client`, each in its own slot
    pub fn initialize(&self, client: Arc<dyn Requester>) {
        for tool in &self.tools {
            tool.initialize(client.clone());
        }
        debug!(count = self.tools.len(), "Bound Shopify client to tools");
    }

    pub fn tools(&self) -> Vec<Tool> {
        self.tools
            .iter()
            .map(|tool| tool.descriptor().clone())
            .collect()
    }

    pub fn find(&self, name: &str) -> Option<&dyn DynTool> {
        self.tools
            .iter()
            .find(|tool| tool.descriptor().name == name)
            .map(|tool| &**tool)
    }

    /// Run the named tool, or report that no such tool exists
    pub async fn call(
        &self,
        name: &str,
        arguments: Option<JsonObject>,
    ) -> Result<CallToolResult, McpError> {
        match self.find(name) {
            Some(tool) => tool.call(arguments).await,
            None => Err(tool_not_found(name)),
        }
    }
}

fn tool_not_found(name: &str) -> McpError {
    McpError::new(
        ErrorCode::METHOD_NOT_FOUND,
        format!("Tool {name} not found"),
        None,
    )
}
