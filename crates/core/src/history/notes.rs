//! Free-text notes attached to serials, stored as one JSON object.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::Error;

/// Serial → note, persisted on every change.
#[derive(Debug, Default)]
pub struct NotesStore {
    path: Option<PathBuf>,
    notes: BTreeMap<String, String>,
}

impl NotesStore {
    /// Load notes from `path`. Missing or unreadable files give an empty store.
    pub fn load(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let notes = match read_notes(&path) {
            Ok(notes) => notes,
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "failed to load device notes");
                BTreeMap::new()
            }
        };
        Self { path: Some(path), notes }
    }

    pub fn in_memory() -> Self {
        Self::default()
    }

    pub fn get(&self, serial: &str) -> Option<&str> {
        self.notes.get(serial).map(String::as_str)
    }

    /// Set the note for `serial`. The text is trimmed; an empty note removes
    /// the entry.
    ///
    /// # Errors
    ///
    /// Returns `Error::Io` if the notes file cannot be written. The in-memory
    /// change is kept.
    pub fn set(&mut self, serial: &str, text: &str) -> Result<(), Error> {
        let text = text.trim();
        if text.is_empty() {
            self.notes.remove(serial);
        } else {
            self.notes.insert(serial.to_string(), text.to_string());
        }
        self.persist()
    }

    pub fn len(&self) -> usize {
        self.notes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.notes.is_empty()
    }

    fn persist(&self) -> Result<(), Error> {
        let Some(path) = &self.path else {
            return Ok(());
        };

        let json = serde_json::to_string_pretty(&self.notes).map_err(|e| Error::Io(e.to_string()))?;
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent).map_err(|e| Error::Io(format!("{}: {e}", parent.display())))?;
        }
        fs::write(path, json).map_err(|e| Error::Io(format!("{}: {e}", path.display())))
    }
}

fn read_notes(path: &Path) -> Result<BTreeMap<String, String>, Error> {
    if !path.exists() {
        return Ok(BTreeMap::new());
    }
    let raw = fs::read_to_string(path).map_err(|e| Error::Io(e.to_string()))?;
    serde_json::from_str(&raw).map_err(|e| Error::Io(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_set_trims_and_persists() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("device_notes.json");

        let mut store = NotesStore::load(&path);
        store.set("RABCDEFGHIJKLM", "  screen cracked  ").unwrap();
        assert_eq!(store.get("RABCDEFGHIJKLM"), Some("screen cracked"));

        let reloaded = NotesStore::load(&path);
        assert_eq!(reloaded.get("RABCDEFGHIJKLM"), Some("screen cracked"));
    }

    #[test]
    fn test_empty_note_removes_entry() {
        let mut store = NotesStore::in_memory();
        store.set("RABCDEFGHIJKLM", "x").unwrap();
        store.set("RABCDEFGHIJKLM", "   ").unwrap();
        assert!(store.get("RABCDEFGHIJKLM").is_none());
        assert!(store.is_empty());
    }

    #[test]
    fn test_corrupt_file_loads_empty() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("device_notes.json");
        fs::write(&path, "[1, 2").unwrap();

        let store = NotesStore::load(&path);
        assert!(store.is_empty());
    }

    #[test]
    fn test_unwritable_path_reports_error() {
        let dir = TempDir::new().unwrap();
        let mut store = NotesStore::load(dir.path());
        let result = store.set("RABCDEFGHIJKLM", "note");
        assert!(matches!(result, Err(Error::Io(_))));
        assert_eq!(store.get("RABCDEFGHIJKLM"), Some("note"));
    }
}
