//! cache_get tool implementation.
//!
//! Retrieves the cached result for a serial.

use chrono::{DateTime, Utc};
use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use garanti_core::{Error, SerialNumber, WarrantyResult};

use crate::state::AppState;
use crate::tools::json_result;

/// Parameters for the cache_get tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CacheGetParams {
    /// The device serial to look up.
    pub serial: String,
}

/// Output from the cache_get tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CacheGetOutput {
    pub serial: String,
    /// When the result was cached.
    pub timestamp: DateTime<Utc>,
    pub result: WarrantyResult,
}

/// Implementation of the cache_get tool. Expired entries count as missing.
pub async fn get_impl(state: &AppState, params: CacheGetParams) -> Result<CallToolResult, McpError> {
    let serial = SerialNumber::parse(params.serial.trim())?;

    let entry = state
        .resolver
        .cache()
        .lock()
        .await
        .get(serial.as_str())
        .cloned()
        .ok_or_else(|| Error::CacheMiss(serial.to_string()))?;

    json_result(&CacheGetOutput { serial: serial.into(), timestamp: entry.timestamp, result: entry.result })
}
