//! Execute GraphQL operations against the Shopify Admin API

mod connection;
mod user_errors;

use futures::future::BoxFuture;
use reqwest::header::{CONTENT_TYPE, HeaderValue};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use serde::de::DeserializeOwned;
use serde_json::{Map, Value, json};
use tracing::debug;
use url::Url;

use crate::errors::{ErrorContext, ServerError, ToolError, TransportError};

pub use connection::{Connection, PageInfo};
pub use user_errors::UserError;

/// The Admin API version used when none is configured
pub const DEFAULT_API_VERSION: &str = "2025-01";

const ACCESS_TOKEN_HEADER: &str = "X-Shopify-Access-Token";

/// The remote-call capability every tool is bound to.
///
/// Resolves to the `data` member of the GraphQL response. Top-level GraphQL
/// errors and HTTP failures are reported as a [`TransportError`].
pub trait Requester: Send + Sync {
    fn request<'a>(
        &'a self,
        document: &'a str,
        variables: Value,
    ) -> BoxFuture<'a, Result<Value, TransportError>>;
}

/// Send an operation and decode its `data` into a typed record
pub async fn send<T: DeserializeOwned>(
    client: &dyn Requester,
    document: &str,
    variables: Value,
) -> Result<T, TransportError> {
    let data = client.request(document, variables).await?;
    Ok(serde_json::from_value(data)?)
}

/// Attach a tool's error context to a transport result
pub trait InContext<T> {
    fn in_context(self, context: ErrorContext) -> Result<T, ToolError>;
}

impl<T> InContext<T> for Result<T, TransportError> {
    fn in_context(self, context: ErrorContext) -> Result<T, ToolError> {
        self.map_err(|source| context.transport(source))
    }
}

/// Variables for an operation. Only the values that are set get sent, so an
/// absent input field is never forwarded as `null`.
#[derive(Debug, Default)]
pub struct Variables(Map<String, Value>);

impl Variables {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(mut self, name: &str, value: impl Into<Value>) -> Self {
        self.0.insert(name.to_string(), value.into());
        self
    }

    /// Set a structured value, such as a mutation input record
    pub fn set_serialized(self, name: &str, value: &impl Serialize) -> Result<Self, TransportError> {
        Ok(self.set(name, serde_json::to_value(value)?))
    }

    pub fn set_opt(self, name: &str, value: Option<impl Into<Value>>) -> Self {
        match value {
            Some(value) => self.set(name, value),
            None => self,
        }
    }

    /// Add the page-size and cursor arguments of a paginated list.
    ///
    /// A `before` cursor pages backwards, so the size is sent as `last`;
    /// otherwise it is sent as `first`. Cursors are forwarded untouched.
    pub fn page(self, limit: u32, after: Option<&str>, before: Option<&str>) -> Self {
        let sized = match before {
            Some(before) => self.set("last", limit).set("before", before),
            None => self.set("first", limit),
        };
        sized.set_opt("after", after)
    }

    pub fn into_value(self) -> Value {
        Value::Object(self.0)
    }
}

#[derive(Debug, Deserialize)]
struct GraphQLResponse {
    #[serde(default)]
    data: Option<Value>,
    #[serde(default)]
    errors: Vec<GraphQLError>,
}

#[derive(Debug, Deserialize)]
struct GraphQLError {
    message: String,
}

/// Admin API client shared by every tool
#[derive(Clone)]
pub struct AdminClient {
    http: reqwest::Client,
    endpoint: Url,
    access_token: SecretString,
}

impl AdminClient {
    /// Create a client for `https://{domain}/admin/api/{api_version}/graphql.json`
    pub fn new(
        domain: &str,
        api_version: &str,
        access_token: SecretString,
    ) -> Result<Self, ServerError> {
        let endpoint = Self::endpoint_for(domain, api_version)?;
        Self::with_endpoint(endpoint, access_token)
    }

    /// Create a client for an explicit GraphQL endpoint
    pub fn with_endpoint(endpoint: Url, access_token: SecretString) -> Result<Self, ServerError> {
        let http = reqwest::Client::builder()
            .user_agent(concat!("shopify-mcp-server/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(ServerError::HttpClient)?;

        Ok(Self {
            http,
            endpoint,
            access_token,
        })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    fn endpoint_for(domain: &str, api_version: &str) -> Result<Url, ServerError> {
        let host = domain
            .trim()
            .trim_start_matches("https://")
            .trim_start_matches("http://")
            .trim_end_matches('/');
        Ok(Url::parse(&format!(
            "https://{host}/admin/api/{api_version}/graphql.json"
        ))?)
    }

    #[tracing::instrument(skip_all, fields(endpoint = %self.endpoint))]
    async fn execute(&self, document: &str, variables: Value) -> Result<Value, TransportError> {
        debug!(%variables, "Sending GraphQL operation");

        let response = self
            .http
            .post(self.endpoint.clone())
            .header(CONTENT_TYPE, HeaderValue::from_static("application/json"))
            .header(ACCESS_TOKEN_HEADER, self.access_token.expose_secret())
            .json(&json!({ "query": document, "variables": variables }))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(TransportError::Status { status, body });
        }

        let response: GraphQLResponse = response.json().await?;
        if !response.errors.is_empty() {
            return Err(TransportError::GraphQL(
                response.errors.into_iter().map(|e| e.message).collect(),
            ));
        }

        match response.data {
            Some(Value::Null) | None => Err(TransportError::MissingData),
            Some(data) => Ok(data),
        }
    }
}

impl std::fmt::Debug for AdminClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdminClient")
            .field("endpoint", &self.endpoint.as_str())
            .finish_non_exhaustive()
    }
}

impl Requester for AdminClient {
    fn request<'a>(
        &'a self,
        document: &'a str,
        variables: Value,
    ) -> BoxFuture<'a, Result<Value, TransportError>> {
        Box::pin(self.execute(document, variables))
    }
}
