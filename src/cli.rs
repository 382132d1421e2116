//! Command-line interface for wordhunt.

use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Wordhunt - word search puzzles with one scored attempt per match
#[derive(Parser, Debug)]
#[command(name = "wordhunt")]
#[command(about = "Validate, show and play word search puzzles", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Path to a TOML config file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Database file, overriding the config
    #[arg(long, global = true)]
    pub db_path: Option<String>,

    /// Subcommand to run
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Check a puzzle file for consistency
    Validate {
        /// Puzzle JSON file
        file: PathBuf,
    },

    /// Print a puzzle's board
    Show {
        /// Puzzle JSON file
        file: PathBuf,

        /// Also list every word with its endpoints
        #[arg(long)]
        reveal: bool,
    },

    /// Play a match from stdin ('r,c r,c' per drag, 'quit' to leave)
    Play {
        /// Compiled puzzle JSON file
        file: PathBuf,

        /// Player id
        #[arg(long)]
        player: String,

        /// Match id
        #[arg(long = "match")]
        match_id: String,

        /// Play is refused before this RFC 3339 time
        #[arg(long)]
        opens_at: Option<DateTime<Utc>>,

        /// Play is refused after this RFC 3339 time
        #[arg(long)]
        closes_at: Option<DateTime<Utc>>,
    },

    /// Show a player's stored attempt
    Attempt {
        /// Player id
        #[arg(long)]
        player: String,

        /// Match id
        #[arg(long = "match")]
        match_id: String,
    },

    /// Show a match leaderboard
    Ranking {
        /// Match id
        #[arg(long = "match")]
        match_id: String,
    },
}
