//! Subcommands that only touch local state: history, export, notes and cache.

use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::Result;
use chrono::Local;

use garanti_client::Resolver;
use garanti_core::history::{default_export_filename, export_csv_to_path};
use garanti_core::{History, NotesStore, ResultCache, SerialNumber};

use crate::render;

pub async fn lookup(resolver: &Resolver, text: &str, out: &mut impl Write) -> Result<()> {
    let resolution = resolver.resolve_text(text).await?;
    write!(out, "{}", render::resolution(&resolution))?;
    Ok(())
}

fn build_history(cache: &ResultCache, notes: &NotesStore, notes_only: bool) -> History {
    let history = History::from_cache(cache, notes);
    if notes_only { history.with_notes_only() } else { history }
}

pub fn history(cache: &ResultCache, notes: &NotesStore, notes_only: bool, out: &mut impl Write) -> Result<()> {
    let history = build_history(cache, notes, notes_only);
    if history.is_empty() {
        writeln!(out, "Geçmiş boş.")?;
        return Ok(());
    }
    write!(out, "{}", render::history(&history))?;
    Ok(())
}

/// Export to `path`, or to a timestamped file in the current directory.
pub fn export(
    cache: &ResultCache, notes: &NotesStore, path: Option<&Path>, notes_only: bool, out: &mut impl Write,
) -> Result<PathBuf> {
    let history = build_history(cache, notes, notes_only);
    let path = path.map_or_else(|| PathBuf::from(default_export_filename(&Local::now())), Path::to_path_buf);

    let rows = export_csv_to_path(&history.records, &path)?;
    writeln!(out, "{rows} kayıt yazıldı: {}", path.display())?;
    Ok(path)
}

pub fn note(notes: &mut NotesStore, serial: &str, text: Option<&str>, out: &mut impl Write) -> Result<()> {
    let serial = SerialNumber::parse(serial.trim())?;
    if let Some(text) = text {
        notes.set(serial.as_str(), text)?;
    }

    match notes.get(serial.as_str()) {
        Some(note) => writeln!(out, "{serial}: {note}")?,
        None => writeln!(out, "{serial}: not yok")?,
    }
    Ok(())
}

pub fn purge(cache: &mut ResultCache, all: bool, out: &mut impl Write) -> Result<()> {
    let deleted = if all { cache.clear() } else { cache.purge_expired() };
    writeln!(out, "{deleted} kayıt silindi, {} kaldı.", cache.len())?;
    Ok(())
}
