//! Device registry error types.

use std::sync::Arc;

/// Errors from a registry lookup.
///
/// Fatal errors end the resolution with an error result. Soft errors are read
/// as "the registry has no data for this serial".
#[derive(Debug, Clone, thiserror::Error)]
pub enum RegistryError {
    /// The `curl` executable could not be found.
    #[error("curl executable not found: {0}")]
    ToolMissing(String),

    /// The lookup did not finish in time.
    #[error("registry lookup timed out")]
    Timeout,

    /// The lookup URL could not be built from the configured base.
    #[error("invalid registry URL: {0}")]
    InvalidUrl(String),

    /// The subprocess could not be started for another reason.
    #[error("failed to run curl: {0}")]
    Spawn(String),

    /// `curl` exited with a non-zero status.
    #[error("curl exited with status {code:?}")]
    CommandFailed { code: Option<i32> },

    /// Output was not UTF-8 or not the expected JSON.
    #[error("invalid registry response: {0}")]
    InvalidJson(String),

    /// Native transport network failure.
    #[error("network error: {0}")]
    Network(Arc<reqwest::Error>),

    /// Native transport non-2xx response.
    #[error("HTTP status {0}")]
    HttpStatus(u16),
}

impl RegistryError {
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            RegistryError::ToolMissing(_)
                | RegistryError::Timeout
                | RegistryError::InvalidUrl(_)
                | RegistryError::Spawn(_)
        )
    }
}

impl From<reqwest::Error> for RegistryError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() { RegistryError::Timeout } else { RegistryError::Network(Arc::new(err)) }
    }
}

impl From<serde_json::Error> for RegistryError {
    fn from(err: serde_json::Error) -> Self {
        RegistryError::InvalidJson(err.to_string())
    }
}
