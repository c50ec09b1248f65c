//! history_export tool implementation.
//!
//! Writes the history to a CSV file on the server's filesystem.

use std::path::PathBuf;

use chrono::Local;
use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use garanti_core::history::{default_export_filename, export_csv_to_path};

use super::current_history;
use crate::state::AppState;
use crate::tools::json_result;

/// Parameters for the history_export tool.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct HistoryExportParams {
    /// Target file. Defaults to `warranty_history_<timestamp>.csv`; relative
    /// paths are resolved against the server's export directory.
    #[serde(default)]
    pub path: Option<String>,

    /// Only export devices that have a note.
    #[serde(default)]
    pub notes_only: bool,
}

/// Output from the history_export tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct HistoryExportOutput {
    pub path: String,
    pub rows: usize,
}

/// Implementation of the history_export tool.
pub async fn export_impl(state: &AppState, params: HistoryExportParams) -> Result<CallToolResult, McpError> {
    let mut history = current_history(state).await;
    if params.notes_only {
        history = history.with_notes_only();
    }

    let file = params
        .path
        .filter(|p| !p.trim().is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(default_export_filename(&Local::now())));
    let path = state.export_dir.join(file);

    let rows = export_csv_to_path(&history.records, &path)?;
    json_result(&HistoryExportOutput { path: path.display().to_string(), rows })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::testing::test_state;
    use crate::tools::output_json;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_export_default_name() {
        let dir = TempDir::new().unwrap();
        let state = test_state(dir.path().to_path_buf());
        state.resolver.resolve_text("R0000000000001").await.unwrap();

        let output = output_json(&export_impl(&state, HistoryExportParams::default()).await.unwrap());
        assert_eq!(output["rows"], 1);

        let path = PathBuf::from(output["path"].as_str().unwrap());
        let name = path.file_name().unwrap().to_string_lossy().to_string();
        assert!(name.starts_with("warranty_history_") && name.ends_with(".csv"));

        let csv = std::fs::read_to_string(&path).unwrap();
        assert!(csv.starts_with("Seri Numarası,Model,Durum,Zaman"));
        assert!(csv.contains("R0000000000001,S8 - WHITE,RECCI GARANTİLİ,"));
    }

    #[tokio::test]
    async fn test_export_empty_history() {
        let dir = TempDir::new().unwrap();
        let state = test_state(dir.path().to_path_buf());

        let params = HistoryExportParams { path: Some("out.csv".into()), notes_only: false };
        let err = export_impl(&state, params).await.unwrap_err();
        assert_eq!(err.code.0, -32602);
        assert!(!dir.path().join("out.csv").exists());
    }
}
