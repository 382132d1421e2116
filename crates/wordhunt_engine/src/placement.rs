//! Word placements and the authoring-time validator.
//!
//! A placement is checked on its own against a snapshot of the cells occupied
//! by every other placement. Crossing words are allowed as long as they agree
//! on the shared letter.

use crate::geometry::{Cell, Direction, MAX_COORDINATE, project, steps_between};
use crate::word::Word;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::{debug, instrument};

/// One word fixed at a position and direction on the grid.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, derive_new::new)]
pub struct WordPlacement {
    word: Word,
    start: Cell,
    direction: Direction,
}

impl WordPlacement {
    /// The placed word.
    pub fn word(&self) -> &Word {
        &self.word
    }

    /// First cell.
    pub fn start(&self) -> Cell {
        self.start
    }

    /// Direction the word runs in.
    pub fn direction(&self) -> Direction {
        self.direction
    }

    /// Number of cells covered.
    pub fn length(&self) -> usize {
        self.word.len()
    }

    /// Last cell.
    pub fn end(&self) -> Cell {
        project(self.start, self.direction, self.length())
    }

    /// Cells covered paired with their letters, from start to end.
    pub fn letter_cells(&self) -> Vec<(Cell, char)> {
        let (dx, dy) = self.direction.delta();
        self.word
            .letters()
            .into_iter()
            .enumerate()
            .map(|(i, letter)| {
                let step = i32::try_from(i).unwrap_or(i32::MAX);
                (self.start.offset(dy, dx, step), letter)
            })
            .collect()
    }

    /// Cells covered, from start to end.
    pub fn cells(&self) -> Vec<Cell> {
        self.letter_cells().into_iter().map(|(cell, _)| cell).collect()
    }

    /// Returns true if both endpoints lie on a `width × height` board.
    pub fn fits(&self, width: usize, height: usize) -> bool {
        self.start.is_within(width, height) && self.end().is_within(width, height)
    }

    /// Converts to the endpoint form used on the wire.
    pub fn to_span(&self) -> PlacementSpan {
        let end = self.end();
        PlacementSpan {
            word: self.word.clone(),
            start_row: self.start.row,
            start_col: self.start.col,
            end_row: end.row,
            end_col: end.col,
        }
    }
}

/// Endpoint form of a placement, as exchanged with the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, derive_new::new)]
#[serde(rename_all = "camelCase")]
pub struct PlacementSpan {
    /// The word.
    #[serde(alias = "palavra")]
    pub word: Word,
    /// Row of the first letter.
    #[serde(alias = "linhaInicio")]
    pub start_row: i32,
    /// Column of the first letter.
    #[serde(alias = "colunaInicio")]
    pub start_col: i32,
    /// Row of the last letter.
    #[serde(alias = "linhaFim")]
    pub end_row: i32,
    /// Column of the last letter.
    #[serde(alias = "colunaFim")]
    pub end_col: i32,
}

impl PlacementSpan {
    /// First cell.
    pub fn start(&self) -> Cell {
        Cell::new(self.start_row, self.start_col)
    }

    /// Last cell.
    pub fn end(&self) -> Cell {
        Cell::new(self.end_row, self.end_col)
    }

    /// Recovers the placement, checking that the endpoints describe a straight
    /// run exactly as long as the word.
    #[instrument(skip(self), fields(word = %self.word))]
    pub fn to_placement(&self) -> Result<WordPlacement, SpanError> {
        if self.word.is_empty() {
            return Err(SpanError::EmptyWord);
        }
        if let Some(cell) = [self.start(), self.end()].into_iter().find(|cell| !cell.is_addressable()) {
            return Err(SpanError::CoordinateOutOfRange {
                word: self.word.clone(),
                cell,
            });
        }
        let line = steps_between(self.start(), self.end()).ok_or(SpanError::NotStraight {
            word: self.word.clone(),
        })?;
        let length = line.steps as usize + 1;
        if length != self.word.len() {
            return Err(SpanError::LengthMismatch {
                word: self.word.clone(),
                span: length,
            });
        }
        // A single-letter word has no travel direction of its own.
        let direction = line.direction().unwrap_or_default();
        Ok(WordPlacement::new(self.word.clone(), self.start(), direction))
    }
}

/// A span that does not describe a valid placement.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display)]
pub enum SpanError {
    /// Span carries no letters.
    #[display("Span has an empty word")]
    EmptyWord,
    /// An endpoint is negative or beyond [`MAX_COORDINATE`].
    #[display("Endpoint {} of '{}' is outside 0..={}", cell, word, MAX_COORDINATE)]
    CoordinateOutOfRange {
        /// The offending word.
        word: Word,
        /// The endpoint out of range.
        cell: Cell,
    },
    /// Endpoints are not on one of the eight lines.
    #[display("Endpoints of '{}' are not on a straight line", word)]
    NotStraight {
        /// The offending word.
        word: Word,
    },
    /// Endpoints are straight but the run length differs from the word.
    #[display("'{}' has {} letters but its span covers {} cells", word, word.len(), span)]
    LengthMismatch {
        /// The offending word.
        word: Word,
        /// Cells covered by the endpoints.
        span: usize,
    },
}

impl std::error::Error for SpanError {}

/// Why a placement cannot go where the author put it.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display)]
pub enum PlacementError {
    /// The word runs off the board.
    #[display("'{}' does not fit: it would end at {}", word, end)]
    OutOfBounds {
        /// The word being placed.
        word: Word,
        /// Where the word would end.
        end: Cell,
    },
    /// The word crosses another word on a different letter.
    #[display(
        "Conflict at ({}, {}): letter '{}' crosses '{}'",
        row + 1,
        col + 1,
        actual,
        expected
    )]
    IntersectionConflict {
        /// Row of the shared cell.
        row: i32,
        /// Column of the shared cell.
        col: i32,
        /// Letter already on the board.
        expected: char,
        /// Letter the candidate wants to put there.
        actual: char,
    },
}

impl std::error::Error for PlacementError {}

/// Letters claimed by a set of placements.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Occupancy {
    cells: HashMap<Cell, char>,
}

impl Occupancy {
    /// Builds the occupancy of the given placements.
    ///
    /// Where placements overlap the later one wins, which only matters when
    /// they already conflict.
    pub fn from_placements<'a>(placements: impl IntoIterator<Item = &'a WordPlacement>) -> Self {
        let mut cells = HashMap::new();
        for placement in placements {
            cells.extend(placement.letter_cells());
        }
        Self { cells }
    }

    /// Letter at `cell`, if claimed.
    pub fn get(&self, cell: Cell) -> Option<char> {
        self.cells.get(&cell).copied()
    }

    /// Number of claimed cells.
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Returns true if nothing is claimed.
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Iterates over claimed cells and their letters.
    pub fn iter(&self) -> impl Iterator<Item = (Cell, char)> + '_ {
        self.cells.iter().map(|(cell, letter)| (*cell, *letter))
    }
}

/// Checks `candidate` against the board size and the other placements.
///
/// `existing` must not contain the candidate itself. An empty candidate word
/// is an unfilled slot and always passes.
#[instrument(skip(candidate, existing), fields(word = %candidate.word()))]
pub fn validate<'a>(
    candidate: &WordPlacement,
    existing: impl IntoIterator<Item = &'a WordPlacement>,
    width: usize,
    height: usize,
) -> Result<(), PlacementError> {
    if candidate.word().is_empty() {
        return Ok(());
    }
    check_bounds(candidate, width, height)?;
    check_intersections(candidate, &Occupancy::from_placements(existing))
}

/// Fails with [`PlacementError::OutOfBounds`] if either end leaves the board.
pub fn check_bounds(candidate: &WordPlacement, width: usize, height: usize) -> Result<(), PlacementError> {
    if candidate.fits(width, height) {
        Ok(())
    } else {
        debug!(end = %candidate.end(), width, height, "Placement out of bounds");
        Err(PlacementError::OutOfBounds {
            word: candidate.word().clone(),
            end: candidate.end(),
        })
    }
}

/// Fails on the first shared cell whose letters differ.
pub fn check_intersections(candidate: &WordPlacement, occupancy: &Occupancy) -> Result<(), PlacementError> {
    for (cell, actual) in candidate.letter_cells() {
        if let Some(expected) = occupancy.get(cell)
            && expected != actual
        {
            debug!(%cell, %expected, %actual, "Intersection conflict");
            return Err(PlacementError::IntersectionConflict {
                row: cell.row,
                col: cell.col,
                expected,
                actual,
            });
        }
    }
    Ok(())
}
