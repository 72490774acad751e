use schemars::JsonSchema;
use secrecy::{ExposeSecret as _, SecretString};
use serde::Deserialize;
use shopify_mcp_server::errors::ServerError;
use shopify_mcp_server::graphql::{AdminClient, DEFAULT_API_VERSION};

pub(crate) const ACCESS_TOKEN_ENV: &str = "SHOPIFY_ACCESS_TOKEN";
pub(crate) const DOMAIN_ENV: &str = "MYSHOPIFY_DOMAIN";

/// Connection settings for the store's Admin API
#[derive(Debug, Deserialize, JsonSchema)]
#[serde(default)]
pub struct ShopifyConfig {
    /// The Admin API access token
    #[schemars(with = "Option<String>")]
    access_token: Option<SecretString>,

    /// The store domain, e.g. `your-store.myshopify.com`
    domain: Option<String>,

    /// The Admin API version to target
    api_version: String,
}

impl Default for ShopifyConfig {
    fn default() -> Self {
        Self {
            access_token: None,
            domain: None,
            api_version: DEFAULT_API_VERSION.to_string(),
        }
    }
}

impl ShopifyConfig {
    /// Replace configured credentials with those given on the command line
    pub fn override_with(
        &mut self,
        access_token: Option<SecretString>,
        domain: Option<String>,
    ) {
        if access_token.is_some() {
            self.access_token = access_token;
        }
        if domain.is_some() {
            self.domain = domain;
        }
    }

    /// The access token from the config, or else from the environment
    pub fn access_token(&self) -> Result<SecretString, ServerError> {
        self.access_token
            .clone()
            .filter(|token| !token.expose_secret().trim().is_empty())
            .or_else(|| env_value(ACCESS_TOKEN_ENV).map(SecretString::from))
            .ok_or(ServerError::MissingCredential(ACCESS_TOKEN_ENV))
    }

    /// The store domain from the config, or else from the environment
    pub fn domain(&self) -> Result<String, ServerError> {
        self.domain
            .clone()
            .filter(|domain| !domain.trim().is_empty())
            .or_else(|| env_value(DOMAIN_ENV))
            .ok_or(ServerError::MissingCredential(DOMAIN_ENV))
    }

    pub fn api_version(&self) -> &str {
        &self.api_version
    }

    /// Build the Admin API client. The token is checked before the domain.
    pub fn client(&self) -> Result<AdminClient, ServerError> {
        let access_token = self.access_token()?;
        let domain = self.domain()?;
        AdminClient::new(&domain, self.api_version(), access_token)
    }
}

fn env_value(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|value| !value.trim().is_empty())
}
