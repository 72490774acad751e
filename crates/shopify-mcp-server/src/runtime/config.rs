use schemars::JsonSchema;
use serde::Deserialize;
use shopify_mcp_server::server_info::ServerInfoConfig;

use super::{logging::Logging, shopify::ShopifyConfig};

/// Configuration for the MCP server
#[derive(Debug, Default, Deserialize, JsonSchema)]
#[serde(default)]
pub struct Config {
    /// Store connection and credentials
    pub shopify: ShopifyConfig,

    /// Logging configuration
    pub logging: Logging,

    /// Overrides for the server identity reported to MCP clients
    pub server_info: ServerInfoConfig,
}
