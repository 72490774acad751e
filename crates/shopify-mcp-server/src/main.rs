use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use clap::builder::Styles;
use clap::builder::styling::{AnsiColor, Effects};
use secrecy::SecretString;
use shopify_mcp_server::server::Server;
use tracing::info;

mod runtime;

/// Clap styling
const STYLES: Styles = Styles::styled()
    .header(AnsiColor::Green.on_default().effects(Effects::BOLD))
    .usage(AnsiColor::Green.on_default().effects(Effects::BOLD))
    .literal(AnsiColor::Cyan.on_default().effects(Effects::BOLD))
    .placeholder(AnsiColor::Cyan.on_default());

/// Arguments to the MCP server
#[derive(Debug, Parser)]
#[command(
    version,
    styles = STYLES,
    about = "Shopify MCP Server - manage a Shopify store from an AI agent",
)]
struct Args {
    /// Path to a YAML config file
    config: Option<PathBuf>,

    /// Admin API access token. Falls back to the config file, then to SHOPIFY_ACCESS_TOKEN.
    #[arg(long = "accessToken", visible_alias = "access-token")]
    access_token: Option<String>,

    /// Store domain, e.g. your-store.myshopify.com. Falls back to the config file, then to MYSHOPIFY_DOMAIN.
    #[arg(long)]
    domain: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // A missing .env file is not an error
    dotenvy::dotenv().ok();

    let args = Args::parse();
    let mut config = match &args.config {
        Some(path) => runtime::read_config(path)?,
        None => runtime::read_config_from_env()?,
    };
    config
        .shopify
        .override_with(args.access_token.map(SecretString::from), args.domain);

    let _guard = config.logging.init()?;

    let client = config.shopify.client()?;
    info!(
        endpoint = %client.endpoint(),
        version = env!("CARGO_PKG_VERSION"),
        "Shopify MCP Server starting"
    );

    Server::builder()
        .client(Arc::new(client))
        .server_info(config.server_info)
        .build()
        .start()
        .await?;

    Ok(())
}
