//! Core types and shared functionality for garanti.
//!
//! This crate provides:
//! - Serial number extraction and validation
//! - The warranty result model
//! - The JSON-file result cache with expiry and eviction
//! - Query history, device notes and CSV export
//! - Configuration and unified error types

pub mod cache;
pub mod config;
pub mod error;
pub mod history;
pub mod result;
pub mod serial;

pub use cache::{CacheEntry, CachePolicy, ResultCache};
pub use config::{AppConfig, ConfigError, RegistryTransport};
pub use error::Error;
pub use history::{History, HistoryRecord, HistoryStats, NotesStore};
pub use result::{ColorTag, WarrantyResult, WarrantyStatus};
pub use serial::{SerialNumber, extract_serial};
