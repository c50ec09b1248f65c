//! Transport error types for page fetches.

use std::sync::Arc;

/// Statuses worth another attempt.
const RETRY_STATUSES: [u16; 5] = [429, 500, 502, 503, 504];

/// Errors from a single GET, after retries.
#[derive(Debug, Clone, thiserror::Error)]
pub enum FetchError {
    /// Request timeout.
    #[error("request timeout")]
    Timeout,

    /// Non-2xx HTTP response.
    #[error("HTTP status {0}")]
    Status(u16),

    /// Connection, TLS or body read failure.
    #[error("network error: {0}")]
    Network(Arc<reqwest::Error>),

    #[error("invalid URL: {0}")]
    InvalidUrl(String),
}

impl FetchError {
    pub fn is_timeout(&self) -> bool {
        matches!(self, FetchError::Timeout)
    }

    /// Statuses 429/5xx and connection failures are retried. Connect and read
    /// timeouts are not.
    pub fn is_retryable(&self) -> bool {
        match self {
            FetchError::Status(status) => RETRY_STATUSES.contains(status),
            FetchError::Network(err) => err.is_connect(),
            FetchError::Timeout | FetchError::InvalidUrl(_) => false,
        }
    }
}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() { FetchError::Timeout } else { FetchError::Network(Arc::new(err)) }
    }
}
