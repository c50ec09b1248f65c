//! Query history derived from the result cache.
//!
//! Every cached resolution is one history record. Records carry a short model
//! label, a coverage label, the time of the lookup and the user's note for the
//! device, if any.

pub mod export;
pub mod notes;

pub use export::{default_export_filename, export_csv, export_csv_to_path};
pub use notes::NotesStore;

use std::sync::LazyLock;

use chrono::{DateTime, Utc};
use regex::Regex;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::{ColorTag, ResultCache};

/// Model label used when a result carries no model payload.
pub const MODEL_LABEL_MISSING: &str = "MODEL İSMİ BULUNAMADI";

static SONIC_WORD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\s+Sonic\s*").expect("sonic pattern is valid"));

/// One past lookup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct HistoryRecord {
    pub serial: String,
    pub model: String,
    pub status_label: String,
    pub color: ColorTag,
    pub timestamp: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

/// Counts by coverage color.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct HistoryStats {
    pub total: usize,
    pub certificate: usize,
    pub registry: usize,
    pub out_of_warranty: usize,
}

/// History records, newest first, with their statistics.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct History {
    pub records: Vec<HistoryRecord>,
    pub stats: HistoryStats,
}

impl History {
    /// Build the history from every entry currently held by `cache`.
    pub fn from_cache(cache: &ResultCache, notes: &NotesStore) -> Self {
        let mut records: Vec<HistoryRecord> = cache
            .entries()
            .map(|(serial, entry)| HistoryRecord {
                serial: serial.to_string(),
                model: model_label(entry.result.copy_model_payload.as_deref()),
                status_label: status_label(entry.result.color).to_string(),
                color: entry.result.color,
                timestamp: entry.timestamp,
                note: notes.get(serial).map(str::to_string),
            })
            .collect();

        records.sort_by(|a, b| b.timestamp.cmp(&a.timestamp).then_with(|| a.serial.cmp(&b.serial)));

        let stats = HistoryStats::from_records(&records);
        Self { records, stats }
    }

    /// Keep only records with a note. Statistics still describe the full history.
    pub fn with_notes_only(mut self) -> Self {
        self.records.retain(|r| r.note.as_deref().is_some_and(|n| !n.trim().is_empty()));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl HistoryStats {
    fn from_records(records: &[HistoryRecord]) -> Self {
        let mut stats = Self { total: records.len(), ..Default::default() };
        for record in records {
            match record.color {
                ColorTag::Green => stats.certificate += 1,
                ColorTag::Blue => stats.registry += 1,
                ColorTag::Red => stats.out_of_warranty += 1,
            }
        }
        stats
    }
}

/// Short model label for list views: the copy payload without the `Sonic`
/// product word.
pub fn model_label(copy_model_payload: Option<&str>) -> String {
    match copy_model_payload.map(str::trim) {
        Some(model) if !model.is_empty() => SONIC_WORD.replace_all(model, " ").trim().to_string(),
        _ => MODEL_LABEL_MISSING.to_string(),
    }
}

/// Coverage label by result color.
pub fn status_label(color: ColorTag) -> &'static str {
    match color {
        ColorTag::Green => "RECCI GARANTİLİ",
        ColorTag::Blue => "KVK GARANTİLİ",
        ColorTag::Red => "GARANTİ DIŞI",
    }
}
