//! Plain-text rendering of resolutions and history for the terminal.

use std::fmt::Write;

use chrono::Local;
use garanti_client::Resolution;
use garanti_core::{History, HistoryRecord};

/// One block per resolution: serial and outcome, the result text, then the
/// clipboard payloads when present.
pub fn resolution(resolution: &Resolution) -> String {
    let result = &resolution.result;
    let mut out = format!("{} [{}] {}\n", resolution.serial, result.color.as_str(), resolution.outcome.as_str());

    if !result.display_title.is_empty() {
        let _ = writeln!(out, "{}", result.display_title);
    }
    let _ = writeln!(out, "{}", result.display_info);

    if let Some(model) = &result.copy_model_payload {
        let _ = writeln!(out, "  model: {model}");
    }
    if let Some(date) = &result.copy_date_payload {
        let _ = writeln!(out, "  bitiş: {date}");
    }
    out
}

fn record_line(record: &HistoryRecord) -> String {
    let time = record.timestamp.with_timezone(&Local).format("%Y-%m-%d %H:%M:%S");
    let mut line = format!("{}  {:<24}  {:<16}  {}", record.serial, record.model, record.status_label, time);
    if let Some(note) = &record.note {
        let _ = write!(line, "  # {note}");
    }
    line
}

pub fn history(history: &History) -> String {
    let stats = &history.stats;
    let mut out = String::new();
    for record in &history.records {
        let _ = writeln!(out, "{}", record_line(record));
    }
    let _ = writeln!(
        out,
        "Toplam: {}  RECCI: {}  KVK: {}  Garanti dışı: {}",
        stats.total, stats.certificate, stats.registry, stats.out_of_warranty
    );
    out
}
