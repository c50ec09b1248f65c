//! Unified error types for garanti.
//!
//! The display string of every variant starts with a stable code so log lines
//! and tool errors can be matched on without parsing prose.

use rmcp::model::{ErrorCode, ErrorData as McpError};

/// Unified error types for the warranty pipeline and its front ends.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Invalid input parameters (e.g., text without a serial).
    #[error("INVALID_INPUT: {0}")]
    InvalidInput(String),

    /// A string that is not a well-formed device serial.
    #[error("INVALID_SERIAL: {0}")]
    InvalidSerial(String),

    /// No cache entry for the given serial.
    #[error("CACHE_MISS: {0}")]
    CacheMiss(String),

    /// Invalid lookup base URL.
    #[error("INVALID_URL: {0}")]
    InvalidUrl(String),

    /// HTTP client could not be constructed.
    #[error("HTTP_CLIENT: {0}")]
    HttpClient(String),

    /// Reading or writing a local file (notes, CSV export) failed.
    #[error("IO_ERROR: {0}")]
    Io(String),

    /// CSV export failed.
    #[error("EXPORT_FAILED: {0}")]
    ExportFailed(String),
}

impl From<csv::Error> for Error {
    fn from(err: csv::Error) -> Self {
        Error::ExportFailed(err.to_string())
    }
}

impl From<Error> for McpError {
    fn from(err: Error) -> Self {
        let (code, message) = match &err {
            Error::InvalidInput(msg) => (-32602, msg.clone()),
            Error::InvalidSerial(msg) => (-32602, format!("invalid serial: {msg}")),
            Error::CacheMiss(msg) => (-32001, msg.clone()),
            Error::InvalidUrl(msg) => (-32003, msg.clone()),
            Error::HttpClient(msg) => (-32004, msg.clone()),
            Error::Io(msg) => (-32005, msg.clone()),
            Error::ExportFailed(msg) => (-32006, msg.clone()),
        };

        McpError { code: ErrorCode(code), message: message.into(), data: None }
    }
}
