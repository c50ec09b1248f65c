//! Expiring, size-bounded result cache persisted as a single JSON file.
//!
//! The cache maps serial → `{timestamp, result}`. It supports:
//!
//! - Lazy expiry on read plus a bulk purge
//! - Oldest-first eviction once the capacity is exceeded
//! - Fail-soft persistence: IO and format errors are logged, never returned

pub mod entry;
pub mod store;

pub use entry::{CacheEntry, parse_timestamp};
pub use store::{CachePolicy, ResultCache};
