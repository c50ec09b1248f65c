//! device_note tool implementation.
//!
//! Reads or sets the free-text note attached to a serial.

use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use garanti_core::SerialNumber;

use crate::state::AppState;
use crate::tools::json_result;

/// Parameters for the device_note tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct DeviceNoteParams {
    pub serial: String,

    /// New note text. Omit to read the current note; an empty string deletes it.
    #[serde(default)]
    pub text: Option<String>,
}

/// Output from the device_note tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct DeviceNoteOutput {
    pub serial: String,
    pub note: Option<String>,
}

/// Implementation of the device_note tool.
pub async fn note_impl(state: &AppState, params: DeviceNoteParams) -> Result<CallToolResult, McpError> {
    let serial = SerialNumber::parse(params.serial.trim())?;
    let mut notes = state.notes.lock().await;

    if let Some(text) = &params.text {
        notes.set(serial.as_str(), text)?;
    }

    let note = notes.get(serial.as_str()).map(str::to_string);
    json_result(&DeviceNoteOutput { serial: serial.into(), note })
}
