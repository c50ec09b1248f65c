//! CSV export of the query history.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use chrono::{DateTime, Local, TimeZone};

use super::HistoryRecord;
use crate::Error;

const HEADER: [&str; 4] = ["Seri Numarası", "Model", "Durum", "Zaman"];

/// `warranty_history_<YYYYmmdd_HHMMSS>.csv` for the given moment.
pub fn default_export_filename<Tz: TimeZone>(now: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    format!("warranty_history_{}.csv", now.format("%Y%m%d_%H%M%S"))
}

/// Write `records` as CSV to `writer`. Times are rendered in local time.
///
/// # Errors
///
/// Returns `Error::InvalidInput` when there is nothing to export and
/// `Error::ExportFailed` when writing fails.
pub fn export_csv<W: Write>(records: &[HistoryRecord], writer: W) -> Result<usize, Error> {
    if records.is_empty() {
        return Err(Error::InvalidInput("no history to export".into()));
    }

    let mut csv = csv::Writer::from_writer(writer);
    csv.write_record(HEADER)?;

    for record in records {
        let local = record.timestamp.with_timezone(&Local);
        csv.write_record([
            record.serial.as_str(),
            record.model.as_str(),
            record.status_label.as_str(),
            &local.format("%Y-%m-%d %H:%M:%S").to_string(),
        ])?;
    }

    csv.flush().map_err(|e| Error::ExportFailed(e.to_string()))?;
    Ok(records.len())
}

/// Export `records` to a new file at `path`.
///
/// # Errors
///
/// As [`export_csv`], plus `Error::Io` when the file cannot be created.
pub fn export_csv_to_path(records: &[HistoryRecord], path: &Path) -> Result<usize, Error> {
    if records.is_empty() {
        return Err(Error::InvalidInput("no history to export".into()));
    }

    let file = File::create(path).map_err(|e| Error::Io(format!("{}: {e}", path.display())))?;
    let written = export_csv(records, file)?;
    tracing::info!(path = %path.display(), rows = written, "history exported");
    Ok(written)
}
