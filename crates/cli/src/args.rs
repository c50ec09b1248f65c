//! Command-line arguments.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(name = "garanti")]
#[command(about = "Resolve device warranty status from serial numbers", version)]
pub struct Cli {
    /// Enable debug logging on stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Read text from stdin line by line and resolve every new serial seen
    Watch,

    /// Resolve the first serial found in TEXT
    Lookup {
        /// Text containing a serial number
        #[arg(required = true, num_args = 1..)]
        text: Vec<String>,
    },

    /// Show past lookups, newest first
    History {
        /// Only devices with a note
        #[arg(long)]
        notes_only: bool,
    },

    /// Write the history to a CSV file
    Export {
        /// Output file (default: warranty_history_<timestamp>.csv)
        path: Option<PathBuf>,

        /// Only devices with a note
        #[arg(long)]
        notes_only: bool,
    },

    /// Show or set the note for a serial; an empty TEXT deletes it
    Note { serial: String, text: Option<String> },

    /// Remove expired cache entries, or every entry with --all
    Purge {
        #[arg(long)]
        all: bool,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_joins_words() {
        let cli = Cli::try_parse_from(["garanti", "lookup", "seri:", "R0000000000001"]).unwrap();
        match cli.command {
            Command::Lookup { text } => assert_eq!(text.join(" "), "seri: R0000000000001"),
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_note_without_text() {
        let cli = Cli::try_parse_from(["garanti", "-v", "note", "R0000000000001"]).unwrap();
        assert!(cli.verbose);
        assert!(matches!(cli.command, Command::Note { text: None, .. }));
    }

    #[test]
    fn test_lookup_requires_text() {
        assert!(Cli::try_parse_from(["garanti", "lookup"]).is_err());
    }

    #[test]
    fn test_purge_flags() {
        let cli = Cli::try_parse_from(["garanti", "purge", "--all"]).unwrap();
        assert!(matches!(cli.command, Command::Purge { all: true }));
    }
}
