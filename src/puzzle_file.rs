//! Reading puzzles from JSON files.
//!
//! A file holds either a compiled puzzle (with `letterGrid`) or a bare
//! submission as produced by the authoring draft. The presence of the grid
//! key decides which, so a malformed grid is an error rather than a
//! submission.

use derive_more::{Display, From};
use serde_json::Value;
use std::path::Path;
use tracing::{debug, info, instrument};
use wordhunt_engine::{CompiledPuzzle, Puzzle, PuzzleError, PuzzleSubmission};

/// Why a puzzle file could not be used.
#[derive(Debug, Display, From)]
pub enum PuzzleFileError {
    /// The file could not be read.
    #[display("Failed to read puzzle file: {}", _0)]
    Io(std::io::Error),
    /// The file is not a puzzle document.
    #[display("Failed to parse puzzle file: {}", _0)]
    Json(serde_json::Error),
    /// The document describes an inconsistent puzzle.
    #[display("Invalid puzzle: {}", _0)]
    Puzzle(PuzzleError),
}

impl std::error::Error for PuzzleFileError {}

/// Keys under which a compiled document carries its letter grid.
const GRID_KEYS: [&str; 2] = ["letterGrid", "tabuleiro"];

fn has_letter_grid(document: &Value) -> bool {
    document
        .as_object()
        .is_some_and(|fields| GRID_KEYS.iter().any(|key| fields.contains_key(*key)))
}

/// Parses a puzzle document.
#[instrument(skip(json), fields(len = json.len()))]
pub fn parse_puzzle(json: &str) -> Result<Puzzle, PuzzleFileError> {
    let document: Value = serde_json::from_str(json)?;
    let puzzle = if has_letter_grid(&document) {
        debug!("Compiled puzzle document");
        Puzzle::try_from(serde_json::from_value::<CompiledPuzzle>(document)?)?
    } else {
        debug!("Submission document");
        serde_json::from_value::<PuzzleSubmission>(document)?.to_puzzle()?
    };
    Ok(puzzle)
}

/// Reads and parses a puzzle file.
#[instrument(skip(path), fields(path = %path.as_ref().display()))]
pub fn load_puzzle(path: impl AsRef<Path>) -> Result<Puzzle, PuzzleFileError> {
    let json = std::fs::read_to_string(path.as_ref())?;
    let puzzle = parse_puzzle(&json)?;
    info!(
        width = puzzle.width(),
        height = puzzle.height(),
        words = puzzle.placements().len(),
        compiled = puzzle.is_compiled(),
        "Puzzle loaded"
    );
    Ok(puzzle)
}
