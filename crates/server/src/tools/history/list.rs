//! history_list tool implementation.

use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::current_history;
use crate::state::AppState;
use crate::tools::json_result;

/// Parameters for the history_list tool.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct HistoryListParams {
    /// Only list devices that have a note.
    #[serde(default)]
    pub notes_only: bool,

    /// Return at most this many records, newest first.
    #[serde(default)]
    pub limit: Option<usize>,
}

/// Implementation of the history_list tool.
pub async fn list_impl(state: &AppState, params: HistoryListParams) -> Result<CallToolResult, McpError> {
    let mut history = current_history(state).await;
    if params.notes_only {
        history = history.with_notes_only();
    }
    if let Some(limit) = params.limit {
        history.records.truncate(limit);
    }

    json_result(&history)
}
