//! History MCP tools: list past lookups and export them as CSV.

pub mod export;
pub mod list;

pub use export::{HistoryExportParams, export_impl};
pub use list::{HistoryListParams, list_impl};

use garanti_core::History;

use crate::state::AppState;

/// Snapshot the history from the live cache and notes.
pub(crate) async fn current_history(state: &AppState) -> History {
    let notes = state.notes.lock().await;
    let cache = state.resolver.cache().lock().await;
    History::from_cache(&cache, &notes)
}
