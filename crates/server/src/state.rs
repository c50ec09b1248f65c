//! Shared state behind every tool call.

use std::path::PathBuf;

use tokio::sync::Mutex;

use garanti_client::Resolver;
use garanti_core::{AppConfig, Error, NotesStore};

/// Resolver, cache and notes shared by all tool handlers.
pub struct AppState {
    pub resolver: Resolver,
    pub notes: Mutex<NotesStore>,
    /// Directory that relative export paths are resolved against.
    pub export_dir: PathBuf,
}

impl AppState {
    pub fn new(resolver: Resolver, notes: NotesStore, export_dir: PathBuf) -> Self {
        Self { resolver, notes: Mutex::new(notes), export_dir }
    }

    pub fn from_config(config: &AppConfig) -> Result<Self, Error> {
        let resolver = Resolver::from_config(config)?;
        let notes = NotesStore::load(config.notes_path.clone());
        Ok(Self::new(resolver, notes, PathBuf::from(".")))
    }
}
