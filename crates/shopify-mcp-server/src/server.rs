use std::sync::Arc;

use bon::bon;
use rmcp::{ServiceExt as _, transport::stdio};
use tracing::{error, info};

use crate::errors::ServerError;
use crate::graphql::Requester;
use crate::server_info::ServerInfoConfig;
use crate::tools::ToolRegistry;

mod running;

pub use running::Running;

/// A Shopify MCP Server
pub struct Server {
    client: Arc<dyn Requester>,
    server_info: ServerInfoConfig,
}

#[bon]
impl Server {
    #[builder]
    pub fn new(
        client: Arc<dyn Requester>,
        #[builder(default)] server_info: ServerInfoConfig,
    ) -> Self {
        Self {
            client,
            server_info,
        }
    }

    /// The handler that serves this server's tools, with every tool bound to
    /// the configured client
    pub fn into_running(self) -> Running {
        Running::new(ToolRegistry::new(self.client), self.server_info)
    }

    /// Serve the tools over stdio until the client disconnects or the
    /// process is interrupted
    pub async fn start(self) -> Result<(), ServerError> {
        let running = self.into_running();

        info!("Starting MCP server in stdio mode");
        let service = running
            .serve(stdio())
            .await
            .inspect_err(|e| {
                error!("serving error: {:?}", e);
            })
            .map_err(Box::new)?;

        tokio::select! {
            quit = service.waiting() => {
                let reason = quit.map_err(ServerError::StartupError)?;
                info!(?reason, "MCP client disconnected");
            }
            _ = shutdown_signal() => {
                info!("Received shutdown signal, stopping MCP server");
            }
        }

        Ok(())
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {e}");
        std::future::pending::<()>().await;
    }
}
