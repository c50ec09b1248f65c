//! The cache object: in-memory map plus whole-file JSON persistence.

use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, TimeDelta, Utc};

use super::entry::CacheEntry;
use crate::WarrantyResult;

/// Default maximum entry age (one week).
pub const DEFAULT_TTL_HOURS: u64 = 168;

/// Default maximum number of entries.
pub const DEFAULT_CAPACITY: usize = 100;

/// Persistence failures. Logged by the cache, never surfaced to callers.
#[derive(Debug, thiserror::Error)]
pub(crate) enum CacheIoError {
    #[error("io: {0}")]
    Io(#[from] std::io::Error),

    #[error("format: {0}")]
    Format(#[from] serde_json::Error),
}

/// Expiry and size limits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CachePolicy {
    pub ttl: TimeDelta,
    pub capacity: usize,
}

impl Default for CachePolicy {
    fn default() -> Self {
        Self::new(DEFAULT_TTL_HOURS, DEFAULT_CAPACITY)
    }
}

impl CachePolicy {
    pub fn new(ttl_hours: u64, capacity: usize) -> Self {
        let hours = i64::try_from(ttl_hours).unwrap_or(i64::MAX / 3600);
        Self { ttl: TimeDelta::try_hours(hours).unwrap_or(TimeDelta::MAX), capacity }
    }

    /// An entry whose age reaches the TTL is expired.
    pub fn is_expired(&self, timestamp: DateTime<Utc>, now: DateTime<Utc>) -> bool {
        now - timestamp >= self.ttl
    }
}

/// Result cache keyed by serial.
///
/// No internal locking; share it behind a mutex.
#[derive(Debug)]
pub struct ResultCache {
    path: Option<PathBuf>,
    policy: CachePolicy,
    entries: HashMap<String, CacheEntry>,
    next_seq: u64,
}

impl ResultCache {
    /// Load the cache file at `path`, dropping expired entries.
    ///
    /// A missing file yields an empty cache. Unreadable or malformed files are
    /// logged and also yield an empty cache. Individual malformed entries are
    /// skipped. If anything was dropped, the file is rewritten.
    pub fn load(path: impl Into<PathBuf>, policy: CachePolicy) -> Self {
        let path = path.into();
        let (stored, skipped) = match read_entries(&path) {
            Ok(read) => read,
            Err(e) => {
                tracing::error!(path = %path.display(), error = %e, "failed to load result cache");
                (HashMap::new(), 0)
            }
        };

        let mut cache = Self { path: Some(path), policy, entries: HashMap::new(), next_seq: 0 };
        let dropped = cache.adopt(stored) + skipped;
        if dropped > 0 {
            cache.persist();
        }
        cache
    }

    /// A cache that never touches the filesystem.
    pub fn in_memory(policy: CachePolicy) -> Self {
        Self { path: None, policy, entries: HashMap::new(), next_seq: 0 }
    }

    /// Take over loaded entries: drop expired ones and number the rest in
    /// timestamp order. Returns how many were dropped or evicted.
    fn adopt(&mut self, stored: HashMap<String, CacheEntry>) -> usize {
        let now = Utc::now();
        let total = stored.len();

        let mut survivors: Vec<(String, CacheEntry)> = stored
            .into_iter()
            .filter(|(_, entry)| !self.policy.is_expired(entry.timestamp, now))
            .collect();
        survivors.sort_by(|a, b| a.1.timestamp.cmp(&b.1.timestamp).then_with(|| a.0.cmp(&b.0)));

        let kept = survivors.len();
        for (serial, mut entry) in survivors {
            entry.seq = self.bump_seq();
            self.entries.insert(serial, entry);
        }
        let evicted = self.evict_overflow();

        tracing::debug!(total, expired = total - kept, evicted, "result cache loaded");
        total - kept + evicted
    }

    /// Fetch an unexpired entry.
    ///
    /// An expired entry is deleted (and the deletion persisted) as a side
    /// effect, and reported as absent.
    pub fn get(&mut self, serial: &str) -> Option<&CacheEntry> {
        let expired = self.policy.is_expired(self.entries.get(serial)?.timestamp, Utc::now());

        if expired {
            self.entries.remove(serial);
            self.persist();
            tracing::debug!(serial, "cache entry expired");
            return None;
        }

        tracing::debug!(serial, "cache hit");
        self.entries.get(serial)
    }

    /// Insert or overwrite the entry for `serial`, stamped now.
    pub fn put(&mut self, serial: &str, result: WarrantyResult) {
        self.put_at(serial, result, Utc::now());
    }

    /// Insert or overwrite the entry for `serial` with an explicit timestamp.
    pub fn put_at(&mut self, serial: &str, result: WarrantyResult, timestamp: DateTime<Utc>) {
        let seq = self.bump_seq();
        self.entries
            .insert(serial.to_string(), CacheEntry { timestamp, result, seq });

        let evicted = self.evict_overflow();
        if evicted > 0 {
            tracing::debug!(evicted, capacity = self.policy.capacity, "evicted oldest cache entries");
        }

        self.persist();
    }

    /// Remove one entry. Returns whether it existed.
    pub fn remove(&mut self, serial: &str) -> bool {
        let removed = self.entries.remove(serial).is_some();
        if removed {
            self.persist();
        }
        removed
    }

    /// Delete every expired entry. Returns the number deleted.
    pub fn purge_expired(&mut self) -> usize {
        let now = Utc::now();
        let before = self.entries.len();
        let policy = self.policy;
        self.entries
            .retain(|_, entry| !policy.is_expired(entry.timestamp, now));

        let purged = before - self.entries.len();
        if purged > 0 {
            self.persist();
        }
        purged
    }

    /// Delete everything. Returns the number deleted.
    pub fn clear(&mut self) -> usize {
        let count = self.entries.len();
        self.entries.clear();
        self.persist();
        count
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate over all held entries, expired or not, in no particular order.
    pub fn entries(&self) -> impl Iterator<Item = (&str, &CacheEntry)> {
        self.entries.iter().map(|(serial, entry)| (serial.as_str(), entry))
    }

    pub fn policy(&self) -> CachePolicy {
        self.policy
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    fn bump_seq(&mut self) -> u64 {
        self.next_seq += 1;
        self.next_seq
    }

    /// Evict oldest entries (by timestamp, then write order) down to capacity.
    fn evict_overflow(&mut self) -> usize {
        let len = self.entries.len();
        if len <= self.policy.capacity {
            return 0;
        }

        let excess = len - self.policy.capacity;
        let mut order: Vec<(DateTime<Utc>, u64, String)> = self
            .entries
            .iter()
            .map(|(serial, entry)| (entry.timestamp, entry.seq, serial.clone()))
            .collect();
        order.sort();

        for (_, _, serial) in order.into_iter().take(excess) {
            self.entries.remove(&serial);
        }
        excess
    }

    fn persist(&self) {
        let Some(path) = &self.path else {
            return;
        };

        if let Err(e) = write_entries(path, &self.entries) {
            tracing::error!(path = %path.display(), error = %e, "failed to persist result cache");
        }
    }
}

/// Read the cache file entry by entry. Returns the readable entries and the
/// number of malformed ones skipped.
fn read_entries(path: &Path) -> Result<(HashMap<String, CacheEntry>, usize), CacheIoError> {
    if !path.exists() {
        return Ok((HashMap::new(), 0));
    }

    let raw = fs::read_to_string(path)?;
    let stored: serde_json::Map<String, serde_json::Value> = serde_json::from_str(&raw)?;

    let mut entries = HashMap::with_capacity(stored.len());
    let mut skipped = 0;
    for (serial, value) in stored {
        match serde_json::from_value::<CacheEntry>(value) {
            Ok(entry) => {
                entries.insert(serial, entry);
            }
            Err(e) => {
                tracing::warn!(serial, error = %e, "skipping malformed cache entry");
                skipped += 1;
            }
        }
    }
    Ok((entries, skipped))
}

fn write_entries(path: &Path, entries: &HashMap<String, CacheEntry>) -> Result<(), CacheIoError> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)?;
    }

    let ordered: BTreeMap<&str, &CacheEntry> = entries.iter().map(|(k, v)| (k.as_str(), v)).collect();
    let json = serde_json::to_string_pretty(&ordered)?;
    fs::write(path, json)?;
    Ok(())
}
