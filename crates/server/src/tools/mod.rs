//! MCP tool implementations.
//!
//! This module contains all tools exposed by the garanti server.

pub mod cache;
pub mod history;
pub mod lookup;
pub mod notes;

pub use cache::{CacheGetParams, CachePurgeParams};
pub use history::{HistoryExportParams, HistoryListParams};
pub use lookup::WarrantyLookupParams;
pub use notes::DeviceNoteParams;

use rmcp::{
    ErrorData as McpError,
    model::{CallToolResult, Content},
};
use serde::Serialize;

use garanti_core::Error;

/// Render a tool output as pretty JSON text content.
pub(crate) fn json_result<T: Serialize>(output: &T) -> Result<CallToolResult, McpError> {
    let json = serde_json::to_string_pretty(output)
        .map_err(|e| Error::InvalidInput(format!("Failed to serialize output: {e}")))?;
    Ok(CallToolResult::success(vec![Content::text(json)]))
}

#[cfg(test)]
pub(crate) fn output_json(result: &CallToolResult) -> serde_json::Value {
    let content = serde_json::to_value(&result.content[0]).unwrap();
    let text = content.get("text").and_then(|v| v.as_str()).expect("Expected text field in content");
    serde_json::from_str(text).unwrap()
}
