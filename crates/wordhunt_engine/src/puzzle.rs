//! The immutable puzzle model.
//!
//! A [`Puzzle`] is built once, either from an author's submission (no letter
//! grid yet) or from a compiled puzzle handed back by the backend, and is
//! never mutated afterwards. Filler letters always come from outside.

use crate::geometry::Cell;
use crate::placement::{Occupancy, PlacementError, PlacementSpan, SpanError, WordPlacement, check_bounds, check_intersections};
use crate::word::{MIN_WORD_LEN, Word, is_board_letter};
use derive_getters::Getters;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::{debug, info, instrument, warn};

/// How hard a puzzle is meant to be.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, strum::EnumIter, strum::Display,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Difficulty {
    /// Shorter, common words.
    #[default]
    #[serde(alias = "FACIL")]
    Easy,
    /// Moderate challenge.
    #[serde(alias = "MEDIO")]
    Medium,
    /// Longer, harder words.
    #[serde(alias = "DIFICIL")]
    Hard,
}

/// Descriptive fields that travel with a puzzle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Getters, derive_setters::Setters)]
#[setters(prefix = "with_", into)]
pub struct PuzzleMetadata {
    /// Title shown to players.
    #[serde(default)]
    title: String,
    /// Theme, e.g. "Animals".
    #[serde(default)]
    theme: String,
    /// Optional longer description.
    #[serde(default)]
    description: String,
    /// Intended difficulty.
    #[serde(default)]
    difficulty: Difficulty,
    /// Inactive puzzles are hidden from players.
    #[serde(default = "default_active")]
    active: bool,
}

fn default_active() -> bool {
    true
}

impl Default for PuzzleMetadata {
    fn default() -> Self {
        Self {
            title: String::new(),
            theme: String::new(),
            description: String::new(),
            difficulty: Difficulty::default(),
            active: true,
        }
    }
}

/// Height × width grid of single uppercase letters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Vec<char>>", into = "Vec<Vec<char>>")]
pub struct LetterGrid {
    width: usize,
    rows: Vec<Vec<char>>,
}

impl LetterGrid {
    /// Builds a grid from rows; every row must have the same length and every
    /// character must be a board letter.
    #[instrument(skip(rows), fields(height = rows.len()))]
    pub fn from_rows(rows: Vec<Vec<char>>) -> Result<Self, PuzzleError> {
        let width = rows.first().map(Vec::len).unwrap_or(0);
        if width == 0 {
            return Err(PuzzleError::GridShape {
                expected: (0, 0),
                found: (width, rows.len()),
            });
        }
        for (r, row) in rows.iter().enumerate() {
            if row.len() != width {
                return Err(PuzzleError::GridShape {
                    expected: (width, rows.len()),
                    found: (row.len(), rows.len()),
                });
            }
            if let Some((c, letter)) = row.iter().enumerate().find(|(_, l)| !is_board_letter(**l)) {
                return Err(PuzzleError::InvalidLetter {
                    cell: Cell::new(r as i32, c as i32),
                    letter: *letter,
                });
            }
        }
        Ok(Self { width, rows })
    }

    /// Parses one string per row, uppercasing as it goes.
    pub fn from_lines<S: AsRef<str>>(lines: &[S]) -> Result<Self, PuzzleError> {
        Self::from_rows(
            lines
                .iter()
                .map(|line| line.as_ref().chars().flat_map(char::to_uppercase).collect())
                .collect(),
        )
    }

    /// Number of columns.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Number of rows.
    pub fn height(&self) -> usize {
        self.rows.len()
    }

    /// Letter at `cell`, `None` off the board.
    pub fn get(&self, cell: Cell) -> Option<char> {
        if !cell.is_within(self.width, self.rows.len()) {
            return None;
        }
        self.rows
            .get(cell.row as usize)
            .and_then(|row| row.get(cell.col as usize))
            .copied()
    }

    /// Rows, top to bottom.
    pub fn rows(&self) -> &[Vec<char>] {
        &self.rows
    }
}

impl TryFrom<Vec<Vec<char>>> for LetterGrid {
    type Error = PuzzleError;

    fn try_from(rows: Vec<Vec<char>>) -> Result<Self, Self::Error> {
        Self::from_rows(rows)
    }
}

impl From<LetterGrid> for Vec<Vec<char>> {
    fn from(grid: LetterGrid) -> Self {
        grid.rows
    }
}

impl std::fmt::Display for LetterGrid {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (i, row) in self.rows.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            let line: Vec<String> = row.iter().map(char::to_string).collect();
            write!(f, "{}", line.join(" "))?;
        }
        Ok(())
    }
}

/// A puzzle that is inconsistent and cannot be built.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display)]
pub enum PuzzleError {
    /// Board is empty or the letter grid has the wrong shape.
    #[display("Grid should be {}x{} but is {}x{}", expected.0, expected.1, found.0, found.1)]
    GridShape {
        /// Expected `(width, height)`.
        expected: (usize, usize),
        /// Actual `(width, height)`.
        found: (usize, usize),
    },
    /// A grid cell is not a board letter.
    #[display("Cell {} holds '{}', which is not a board letter", cell, letter)]
    InvalidLetter {
        /// Where the letter is.
        cell: Cell,
        /// The offending character.
        letter: char,
    },
    /// A word's endpoints are malformed.
    #[display("{}", _0)]
    Span(SpanError),
    /// A word is out of bounds or conflicts with another word.
    #[display("{}", _0)]
    Placement(PlacementError),
    /// The compiled grid disagrees with a placed word.
    #[display("Grid has '{}' at {} but '{}' needs '{}'", found, cell, word, expected)]
    LetterMismatch {
        /// The word whose letter disagrees.
        word: Word,
        /// Where.
        cell: Cell,
        /// Letter the word needs.
        expected: char,
        /// Letter in the grid.
        found: char,
    },
    /// The same word is placed twice.
    #[display("Word '{}' is placed more than once", _0)]
    DuplicateWord(Word),
    /// A placement has no letters.
    #[display("Puzzle contains an empty word")]
    EmptyWord,
    /// A word is too short to ever be selected.
    #[display("Word '{}' is shorter than {} letters", _0, MIN_WORD_LEN)]
    WordTooShort(Word),
}

impl std::error::Error for PuzzleError {}

impl From<SpanError> for PuzzleError {
    fn from(err: SpanError) -> Self {
        Self::Span(err)
    }
}

impl From<PlacementError> for PuzzleError {
    fn from(err: PlacementError) -> Self {
        Self::Placement(err)
    }
}

/// An immutable word-search puzzle.
#[derive(Debug, Clone, PartialEq, Eq, Getters)]
pub struct Puzzle {
    /// Number of columns.
    width: usize,
    /// Number of rows.
    height: usize,
    /// Placed words, unique by text.
    placements: Vec<WordPlacement>,
    /// Full board including filler, present once compiled.
    letter_grid: Option<LetterGrid>,
    /// Title, theme and friends.
    metadata: PuzzleMetadata,
}

impl Puzzle {
    /// Builds an uncompiled puzzle, checking bounds, intersections and word
    /// uniqueness.
    #[instrument(skip(placements, metadata), fields(count = placements.len()))]
    pub fn new(
        width: usize,
        height: usize,
        placements: Vec<WordPlacement>,
        metadata: PuzzleMetadata,
    ) -> Result<Self, PuzzleError> {
        if width == 0 || height == 0 {
            return Err(PuzzleError::GridShape {
                expected: (width.max(1), height.max(1)),
                found: (width, height),
            });
        }
        let mut seen = HashSet::new();
        for (i, placement) in placements.iter().enumerate() {
            if placement.word().is_empty() {
                return Err(PuzzleError::EmptyWord);
            }
            if placement.length() < MIN_WORD_LEN {
                return Err(PuzzleError::WordTooShort(placement.word().clone()));
            }
            if !seen.insert(placement.word().clone()) {
                warn!(word = %placement.word(), "Duplicate word in puzzle");
                return Err(PuzzleError::DuplicateWord(placement.word().clone()));
            }
            check_bounds(placement, width, height)?;
            let others = placements
                .iter()
                .enumerate()
                .filter(|(j, _)| *j != i)
                .map(|(_, p)| p);
            check_intersections(placement, &Occupancy::from_placements(others))?;
        }
        debug!(width, height, "Puzzle built");
        Ok(Self {
            width,
            height,
            placements,
            letter_grid: None,
            metadata,
        })
    }

    /// Attaches the compiled letter grid, which must match the board size and
    /// every placed letter.
    #[instrument(skip(self, grid), fields(title = %self.metadata.title()))]
    pub fn with_letter_grid(mut self, grid: LetterGrid) -> Result<Self, PuzzleError> {
        if (grid.width(), grid.height()) != (self.width, self.height) {
            return Err(PuzzleError::GridShape {
                expected: (self.width, self.height),
                found: (grid.width(), grid.height()),
            });
        }
        for placement in &self.placements {
            for (cell, expected) in placement.letter_cells() {
                let found = grid.get(cell).unwrap_or(' ');
                if found != expected {
                    return Err(PuzzleError::LetterMismatch {
                        word: placement.word().clone(),
                        cell,
                        expected,
                        found,
                    });
                }
            }
        }
        info!(words = self.placements.len(), "Letter grid attached");
        self.letter_grid = Some(grid);
        Ok(self)
    }

    /// Returns true once a letter grid is attached.
    pub fn is_compiled(&self) -> bool {
        self.letter_grid.is_some()
    }

    /// Letter at `cell` in the compiled grid.
    pub fn letter_at(&self, cell: Cell) -> Option<char> {
        self.letter_grid.as_ref().and_then(|grid| grid.get(cell))
    }

    /// Placement of `word`, if any.
    pub fn placement_of(&self, word: &Word) -> Option<&WordPlacement> {
        self.placements.iter().find(|p| p.word() == word)
    }

    /// Letters claimed by placed words; every other cell is filler.
    pub fn occupancy(&self) -> Occupancy {
        Occupancy::from_placements(&self.placements)
    }

    /// Words in placement order.
    pub fn words(&self) -> Vec<&Word> {
        self.placements.iter().map(WordPlacement::word).collect()
    }

    /// Endpoint form of every placement.
    pub fn spans(&self) -> Vec<PlacementSpan> {
        self.placements.iter().map(WordPlacement::to_span).collect()
    }
}

/// Compiled puzzle as delivered by the backend for play or viewing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompiledPuzzle {
    /// Number of columns.
    #[serde(alias = "largura")]
    pub width: usize,
    /// Number of rows.
    #[serde(alias = "altura")]
    pub height: usize,
    /// Full board, one string per row.
    #[serde(alias = "tabuleiro")]
    pub letter_grid: Vec<String>,
    /// Placed words.
    #[serde(alias = "palavras")]
    pub words: Vec<PlacementSpan>,
    /// Title, theme and friends.
    #[serde(flatten)]
    pub metadata: PuzzleMetadata,
}

impl TryFrom<CompiledPuzzle> for Puzzle {
    type Error = PuzzleError;

    fn try_from(compiled: CompiledPuzzle) -> Result<Self, Self::Error> {
        let placements = compiled
            .words
            .iter()
            .map(PlacementSpan::to_placement)
            .collect::<Result<Vec<_>, _>>()?;
        let grid = LetterGrid::from_lines(&compiled.letter_grid)?;
        Puzzle::new(compiled.width, compiled.height, placements, compiled.metadata)?.with_letter_grid(grid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Direction;

    fn sol() -> WordPlacement {
        WordPlacement::new(Word::normalize("SOL"), Cell::new(2, 1), Direction::Right)
    }

    fn grid_8x8() -> LetterGrid {
        LetterGrid::from_lines(&[
            "ABCDEFGH", "IJKLMNOP", "QSOLRTUV", "WXYZABCD", "EFGHIJKL", "MNOPQRST", "UVWXYZAB", "CDEFGHIJ",
        ])
        .expect("valid grid")
    }

    #[test]
    fn test_compiled_puzzle_builds() {
        let puzzle = Puzzle::new(8, 8, vec![sol()], PuzzleMetadata::default())
            .and_then(|p| p.with_letter_grid(grid_8x8()))
            .expect("consistent puzzle");
        assert!(puzzle.is_compiled());
        assert_eq!(puzzle.letter_at(Cell::new(2, 2)), Some('O'));
        assert_eq!(puzzle.letter_at(Cell::new(8, 0)), None);
    }

    #[test]
    fn test_grid_must_agree_with_placements() {
        let placement = WordPlacement::new(Word::normalize("SOL"), Cell::new(0, 0), Direction::Right);
        let result = Puzzle::new(8, 8, vec![placement], PuzzleMetadata::default())
            .and_then(|p| p.with_letter_grid(grid_8x8()));
        assert!(matches!(result, Err(PuzzleError::LetterMismatch { expected: 'S', found: 'A', .. })));
    }

    #[test]
    fn test_grid_shape_checked() {
        let puzzle = Puzzle::new(9, 8, vec![sol()], PuzzleMetadata::default()).expect("valid");
        assert!(matches!(
            puzzle.with_letter_grid(grid_8x8()),
            Err(PuzzleError::GridShape { .. })
        ));
        assert!(matches!(
            LetterGrid::from_lines(&["ABC", "AB"]),
            Err(PuzzleError::GridShape { .. })
        ));
        assert!(matches!(
            LetterGrid::from_lines(&["AB1"]),
            Err(PuzzleError::InvalidLetter { letter: '1', .. })
        ));
    }

    #[test]
    fn test_duplicate_words_rejected() {
        let other = WordPlacement::new(Word::normalize("SOL"), Cell::new(5, 0), Direction::Right);
        assert_eq!(
            Puzzle::new(8, 8, vec![sol(), other], PuzzleMetadata::default()),
            Err(PuzzleError::DuplicateWord(Word::normalize("SOL")))
        );
    }

    #[test]
    fn test_single_letter_words_rejected() {
        let a = WordPlacement::new(Word::normalize("a"), Cell::new(0, 0), Direction::Right);
        assert_eq!(
            Puzzle::new(8, 8, vec![sol(), a], PuzzleMetadata::default()),
            Err(PuzzleError::WordTooShort(Word::normalize("A")))
        );
    }

    #[test]
    fn test_conflicting_words_rejected() {
        let mar = WordPlacement::new(Word::normalize("MAR"), Cell::new(1, 3), Direction::Down);
        assert!(matches!(
            Puzzle::new(8, 8, vec![sol(), mar], PuzzleMetadata::default()),
            Err(PuzzleError::Placement(PlacementError::IntersectionConflict { .. }))
        ));
    }

    #[test]
    fn test_compiled_puzzle_from_backend_json() {
        let json = r#"{
            "largura": 8,
            "altura": 8,
            "tabuleiro": ["ABCDEFGH","IJKLMNOP","QSOLRTUV","WXYZABCD","EFGHIJKL","MNOPQRST","UVWXYZAB","CDEFGHIJ"],
            "palavras": [{"palavra":"SOL","linhaInicio":2,"colunaInicio":1,"linhaFim":2,"colunaFim":3}],
            "title": "Astros",
            "theme": "Espaço",
            "difficulty": "MEDIO"
        }"#;
        let compiled: CompiledPuzzle = serde_json::from_str(json).expect("valid json");
        let puzzle = Puzzle::try_from(compiled).expect("consistent puzzle");
        assert_eq!(puzzle.placements(), &vec![sol()]);
        assert_eq!(puzzle.metadata().difficulty(), &Difficulty::Medium);
        assert!(*puzzle.metadata().active());
    }

    #[test]
    fn test_grid_display() {
        let grid = LetterGrid::from_lines(&["ab", "cd"]).expect("valid");
        assert_eq!(grid.to_string(), "A B\nC D");
    }
}
