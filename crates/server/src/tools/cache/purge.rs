//! cache_purge tool implementation.
//!
//! Removes one serial, all expired entries, or everything.

use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use garanti_core::{Error, SerialNumber};

use crate::state::AppState;
use crate::tools::json_result;

/// Parameters for the cache_purge tool.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct CachePurgeParams {
    /// Remove the entry for this serial.
    #[serde(default)]
    pub serial: Option<String>,

    /// Remove every entry past its TTL.
    #[serde(default)]
    pub expired: bool,

    /// Remove every entry.
    #[serde(default)]
    pub all: bool,
}

/// Output from the cache_purge tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CachePurgeOutput {
    /// Number of entries deleted.
    pub deleted: usize,
    /// Entries left in the cache.
    pub remaining: usize,
}

/// Implementation of the cache_purge tool.
pub async fn purge_impl(state: &AppState, params: CachePurgeParams) -> Result<CallToolResult, McpError> {
    if params.serial.is_none() && !params.expired && !params.all {
        return Err(Error::InvalidInput("At least one of serial, expired, or all must be specified".to_string()).into());
    }

    let serial = params.serial.as_deref().map(|s| SerialNumber::parse(s.trim())).transpose()?;

    let mut cache = state.resolver.cache().lock().await;
    let mut deleted = 0;

    if params.all {
        deleted += cache.clear();
    } else {
        if let Some(serial) = &serial
            && cache.remove(serial.as_str())
        {
            deleted += 1;
        }
        if params.expired {
            deleted += cache.purge_expired();
        }
    }

    tracing::info!(deleted, remaining = cache.len(), "cache purged");
    json_result(&CachePurgeOutput { deleted, remaining: cache.len() })
}
