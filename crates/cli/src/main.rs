//! `garanti` command-line entry point.
//!
//! Results go to stdout; logs go to stderr.

use std::io::{self, BufWriter, Write};

use anyhow::{Context, Result};
use clap::Parser;
use tokio::io::BufReader;

use garanti_client::Resolver;
use garanti_core::{AppConfig, NotesStore, ResultCache};

mod args;
mod commands;
mod logger;
mod render;
mod watch;

use args::{Cli, Command};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    logger::init_cli_logger(cli.verbose);

    let config = AppConfig::load().context("loading configuration")?;
    tracing::debug!(?config, "configuration loaded");

    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());

    match cli.command {
        Command::Watch => {
            let resolver = Resolver::from_config(&config)?;
            let input = BufReader::new(tokio::io::stdin());
            let resolved = watch::run(&resolver, input, &mut out).await?;
            tracing::info!(resolved, "stdin closed");
        }
        Command::Lookup { text } => {
            let resolver = Resolver::from_config(&config)?;
            commands::lookup(&resolver, &text.join(" "), &mut out).await?;
        }
        Command::History { notes_only } => {
            let cache = ResultCache::load(config.cache_path.clone(), config.cache_policy());
            let notes = NotesStore::load(config.notes_path.clone());
            commands::history(&cache, &notes, notes_only, &mut out)?;
        }
        Command::Export { path, notes_only } => {
            let cache = ResultCache::load(config.cache_path.clone(), config.cache_policy());
            let notes = NotesStore::load(config.notes_path.clone());
            commands::export(&cache, &notes, path.as_deref(), notes_only, &mut out)?;
        }
        Command::Note { serial, text } => {
            let mut notes = NotesStore::load(config.notes_path.clone());
            commands::note(&mut notes, &serial, text.as_deref(), &mut out)?;
        }
        Command::Purge { all } => {
            let mut cache = ResultCache::load(config.cache_path.clone(), config.cache_policy());
            commands::purge(&mut cache, all, &mut out)?;
        }
    }

    out.flush()?;
    Ok(())
}
