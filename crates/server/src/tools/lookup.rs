//! warranty_lookup tool implementation.
//!
//! Finds a serial number in free text and resolves its warranty status.

use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use garanti_core::WarrantyResult;

use super::json_result;
use crate::state::AppState;

/// Parameters for the warranty_lookup tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct WarrantyLookupParams {
    /// Text containing a device serial (`R` followed by 13 letters or digits).
    pub text: String,
}

/// Output from the warranty_lookup tool.
#[derive(Debug, Clone, Serialize, JsonSchema)]
pub struct WarrantyLookupOutput {
    pub serial: String,
    /// Which step produced the result: cache_hit, certificate, special_case,
    /// registry, not_found or error.
    pub outcome: String,
    pub result: WarrantyResult,
}

/// Implementation of the warranty_lookup tool.
pub async fn lookup_impl(state: &AppState, params: WarrantyLookupParams) -> Result<CallToolResult, McpError> {
    let resolution = state.resolver.resolve_text(&params.text).await?;

    json_result(&WarrantyLookupOutput {
        serial: resolution.serial.into(),
        outcome: resolution.outcome.as_str().to_string(),
        result: resolution.result,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::testing::test_state;
    use crate::tools::output_json;

    #[tokio::test]
    async fn test_lookup_from_text() {
        let state = test_state(std::env::temp_dir());
        let params = WarrantyLookupParams { text: "Seri No: R0000000000001, kutu hasarlı".into() };

        let output = output_json(&lookup_impl(&state, params).await.unwrap());
        assert_eq!(output["serial"], "R0000000000001");
        assert_eq!(output["outcome"], "certificate");
        assert_eq!(output["result"]["info"], "XIAOMI - S8 SONIC - WHITE");
        assert_eq!(output["result"]["status_color"], "green");
    }

    #[tokio::test]
    async fn test_second_lookup_hits_cache() {
        let state = test_state(std::env::temp_dir());
        let params = WarrantyLookupParams { text: "R0000000000002".into() };

        lookup_impl(&state, params.clone()).await.unwrap();
        let output = output_json(&lookup_impl(&state, params).await.unwrap());
        assert_eq!(output["outcome"], "cache_hit");
        assert_eq!(output["result"]["status"], "not_found");
    }

    #[tokio::test]
    async fn test_lookup_without_serial() {
        let state = test_state(std::env::temp_dir());
        let params = WarrantyLookupParams { text: "no serial here".into() };

        let err = lookup_impl(&state, params).await.unwrap_err();
        assert_eq!(err.code.0, -32602);
    }
}
