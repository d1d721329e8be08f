//! Command-line interface for resistance_table.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Resistance Table - game-state engine for The Resistance
#[derive(Parser, Debug)]
#[command(name = "resistance_table")]
#[command(about = "Deal, inspect, and simulate games of The Resistance", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Directory for session snapshots, overriding config and environment
    #[arg(long, global = true)]
    pub snapshot_dir: Option<PathBuf>,

    /// Subcommand to run
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Deal roles for a table and save the opening snapshot
    New {
        /// Path to table configuration file
        #[arg(short, long, default_value = "table.toml")]
        config: PathBuf,

        /// Replace an existing snapshot for the same session
        #[arg(long)]
        force: bool,
    },

    /// Show a saved session
    Show {
        /// Path to table configuration file
        #[arg(short, long, default_value = "table.toml")]
        config: PathBuf,

        /// Show what this seated player may see
        #[arg(long = "as", conflicts_with = "reveal")]
        viewer: Option<String>,

        /// Reveal every role (moderator view)
        #[arg(long)]
        reveal: bool,
    },

    /// Play a whole game with random decisions
    Simulate {
        /// Path to table configuration file
        #[arg(short, long, default_value = "table.toml")]
        config: PathBuf,

        /// Seed overriding the configured one
        #[arg(long)]
        seed: Option<u64>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_show_as() {
        let cli = Cli::parse_from(["resistance_table", "show", "--as", "ann"]);
        match cli.command {
            Command::Show { viewer, reveal, .. } => {
                assert_eq!(viewer.as_deref(), Some("ann"));
                assert!(!reveal);
            }
            other => panic!("Expected show, got {:?}", other),
        }
    }

    #[test]
    fn test_viewer_conflicts_with_reveal() {
        let result = Cli::try_parse_from(["resistance_table", "show", "--as", "ann", "--reveal"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_parse_simulate_seed() {
        let cli = Cli::parse_from(["resistance_table", "simulate", "-c", "t.toml", "--seed", "3"]);
        match cli.command {
            Command::Simulate { config, seed } => {
                assert_eq!(config, PathBuf::from("t.toml"));
                assert_eq!(seed, Some(3));
            }
            other => panic!("Expected simulate, got {:?}", other),
        }
    }

    #[test]
    fn test_snapshot_dir_is_global() {
        let cli = Cli::parse_from(["resistance_table", "new", "--snapshot-dir", "/tmp/tables"]);
        assert_eq!(cli.snapshot_dir, Some(PathBuf::from("/tmp/tables")));
        assert!(matches!(cli.command, Command::New { force: false, .. }));
    }
}
