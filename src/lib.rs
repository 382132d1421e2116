//! Wordhunt: word search puzzles with one scored attempt per player and match.
//!
//! The game itself lives in [`wordhunt_engine`]. This crate adds the outer
//! shell around it:
//!
//! - **Persistence**: [`AttemptRepository`], a SQLite [`AttemptStore`]
//!   whose unique index keeps the one-attempt rule across processes.
//! - **Configuration**: [`WordhuntConfig`] loaded from TOML.
//! - **Console play**: [`run_session`] drives a session from text lines.
//! - **Puzzle files**: [`load_puzzle`] reads compiled puzzles or submissions.
//!
//! [`AttemptStore`]: wordhunt_engine::AttemptStore

#![warn(missing_docs)]
#![forbid(unsafe_code)]

// Private module declarations
mod config;
mod console;
mod db;
mod puzzle_file;

// Crate-level exports - Configuration
pub use config::{ConfigError, DB_PATH_ENV, WordhuntConfig};

// Crate-level exports - Database
pub use db::{AttemptRepository, AttemptRow, DbError, MIGRATIONS, NewAttemptRow};

// Crate-level exports - Console play
pub use console::{ConsoleError, InputError, PlayInput, parse_line, render_board, run_session};

// Crate-level exports - Puzzle files
pub use puzzle_file::{PuzzleFileError, load_puzzle, parse_puzzle};

pub use wordhunt_engine;
