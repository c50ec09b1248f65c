//! MCP server handler implementation.
//!
//! Routes tool calls to the implementations in [`crate::tools`], all of which
//! share one [`AppState`].
use std::sync::Arc;

use crate::state::AppState;
use crate::tools::{
    CacheGetParams, CachePurgeParams, DeviceNoteParams, HistoryExportParams, HistoryListParams, WarrantyLookupParams,
    cache, history, lookup, notes,
};

use rmcp::{
    ErrorData as McpError, ServerHandler,
    handler::server::{
        tool::{ToolCallContext, ToolRouter},
        wrapper::Parameters,
    },
    model::{
        CallToolRequestParam, CallToolResult, Implementation, ListToolsResult, PaginatedRequestParam, ProtocolVersion,
        ServerCapabilities, ServerInfo,
    },
    service::{RequestContext, RoleServer},
    tool, tool_router,
};

/// The MCP server handler for garanti-mcp.
#[derive(Clone)]
pub struct GarantiServer {
    state: Arc<AppState>,
    tool_router: ToolRouter<Self>,
}

#[tool_router]
impl GarantiServer {
    pub fn new(state: AppState) -> Self {
        Self { state: Arc::new(state), tool_router: Self::tool_router() }
    }

    /// Resolve the warranty status of the first serial found in `text`.
    ///
    /// Consults the cache, then the certificate site, then the service registry.
    #[tool(
        description = "Find a device serial (R + 13 letters/digits) in text and return its warranty status. Uses the local cache when fresh."
    )]
    async fn warranty_lookup(&self, params: Parameters<WarrantyLookupParams>) -> Result<CallToolResult, McpError> {
        lookup::lookup_impl(&self.state, params.0).await
    }

    #[tool(description = "Return the cached warranty result for a serial, if present and not expired.")]
    async fn cache_get(&self, params: Parameters<CacheGetParams>) -> Result<CallToolResult, McpError> {
        cache::get_impl(&self.state, params.0).await
    }

    #[tool(description = "Delete cached results: one serial, every expired entry, or everything.")]
    async fn cache_purge(&self, params: Parameters<CachePurgeParams>) -> Result<CallToolResult, McpError> {
        cache::purge_impl(&self.state, params.0).await
    }

    #[tool(description = "List past lookups newest first, with coverage counts and device notes.")]
    async fn history_list(&self, params: Parameters<HistoryListParams>) -> Result<CallToolResult, McpError> {
        history::list_impl(&self.state, params.0).await
    }

    /// Write the history as CSV on the server host.
    #[tool(description = "Export the lookup history to a CSV file on the server. Returns the file path and row count.")]
    async fn history_export(&self, params: Parameters<HistoryExportParams>) -> Result<CallToolResult, McpError> {
        history::export_impl(&self.state, params.0).await
    }

    #[tool(description = "Read, set or clear (empty text) the note attached to a device serial.")]
    async fn device_note(&self, params: Parameters<DeviceNoteParams>) -> Result<CallToolResult, McpError> {
        notes::note_impl(&self.state, params.0).await
    }
}

impl ServerHandler for GarantiServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            server_info: Implementation {
                name: "garanti-mcp".into(),
                version: env!("CARGO_PKG_VERSION").into(),
                ..Default::default()
            },
            protocol_version: ProtocolVersion::LATEST,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            ..Default::default()
        }
    }

    async fn list_tools(
        &self, _request: Option<PaginatedRequestParam>, _context: RequestContext<RoleServer>,
    ) -> Result<ListToolsResult, rmcp::model::ErrorData> {
        Ok(ListToolsResult { meta: None, tools: self.tool_router.list_all(), next_cursor: None })
    }

    async fn call_tool(
        &self, request: CallToolRequestParam, context: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, rmcp::model::ErrorData> {
        self.tool_router
            .call(ToolCallContext::new(self, request, context))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::testing::test_state;

    #[test]
    fn test_all_tools_registered() {
        let server = GarantiServer::new(test_state(std::env::temp_dir()));
        let mut names: Vec<String> = server.tool_router.list_all().into_iter().map(|t| t.name.to_string()).collect();
        names.sort();
        assert_eq!(
            names,
            ["cache_get", "cache_purge", "device_note", "history_export", "history_list", "warranty_lookup"]
        );
    }

    #[test]
    fn test_server_info() {
        let server = GarantiServer::new(test_state(std::env::temp_dir()));
        assert_eq!(server.get_info().server_info.name, "garanti-mcp");
    }
}
