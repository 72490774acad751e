use std::sync::Arc;

use rmcp::model::{
    CallToolRequestParam, CallToolResult, JsonObject, ListToolsResult, PaginatedRequestParam,
    ServerCapabilities, ServerInfo, ToolsCapability,
};
use rmcp::service::RequestContext;
use rmcp::{RoleServer, ServerHandler};
use tracing::debug;

use crate::errors::McpError;
use crate::server_info::ServerInfoConfig;
use crate::tools::ToolRegistry;

/// The MCP handler for a server whose tools are bound and ready
#[derive(Clone)]
pub struct Running {
    registry: Arc<ToolRegistry>,
    server_info: ServerInfoConfig,
}

impl Running {
    pub fn new(registry: ToolRegistry, server_info: ServerInfoConfig) -> Self {
        Self {
            registry: Arc::new(registry),
            server_info,
        }
    }

    pub(crate) fn list_tools_impl(&self) -> ListToolsResult {
        ListToolsResult {
            meta: None,
            next_cursor: None,
            tools: self.registry.tools(),
        }
    }

    pub(crate) async fn call_tool_impl(
        &self,
        name: &str,
        arguments: Option<JsonObject>,
    ) -> Result<CallToolResult, McpError> {
        debug!(tool = name, "Calling tool");
        self.registry.call(name, arguments).await
    }
}

impl ServerHandler for Running {
    #[tracing::instrument(skip_all, fields(tool = request.name.as_ref(), request_id = %context.id))]
    async fn call_tool(
        &self,
        request: CallToolRequestParam,
        context: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, McpError> {
        self.call_tool_impl(&request.name, request.arguments).await
    }

    #[tracing::instrument(skip_all)]
    async fn list_tools(
        &self,
        _request: Option<PaginatedRequestParam>,
        _context: RequestContext<RoleServer>,
    ) -> Result<ListToolsResult, McpError> {
        Ok(self.list_tools_impl())
    }

    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            server_info: self.server_info.implementation(),
            capabilities: ServerCapabilities {
                tools: Some(ToolsCapability {
                    list_changed: Some(true),
                }),
                ..Default::default()
            },
            ..Default::default()
        }
    }
}
