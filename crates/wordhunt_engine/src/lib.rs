//! Word search engine: authoring, validation and play.
//!
//! # Architecture
//!
//! - **Authoring**: [`PuzzleDraft`] collects words and placements and turns
//!   them into a [`PuzzleSubmission`] once every word is placed.
//! - **Model**: [`Puzzle`] is an immutable, validated board with its letter grid.
//! - **Play**: [`SessionSetup`] → [`PlaySession`] → [`FinishedSession`], each
//!   phase its own type, driven by [`PointerEvent`]s.
//! - **Persistence seam**: [`AttemptStore`] holds one [`AttemptRecord`] per
//!   player and match; [`PlayService`] wires it around sessions.
//!
//! # Example
//!
//! ```
//! use chrono::Utc;
//! use std::sync::Arc;
//! use wordhunt_engine::{
//!     Cell, Direction, InMemoryAttemptStore, LetterGrid, MatchContext, MatchId, MatchWindow,
//!     PlayService, PlayerId, Puzzle, PuzzleMetadata, SelectionPath, SessionTransition, Word,
//!     WordPlacement,
//! };
//!
//! let grid = LetterGrid::from_lines(&["SOLX", "XXXX", "XXXX", "XXXX", "XXXX"])?;
//! let sol = WordPlacement::new(Word::normalize("sol"), Cell::new(0, 0), Direction::Right);
//! let puzzle = Puzzle::new(4, 5, vec![sol], PuzzleMetadata::default())?.with_letter_grid(grid)?;
//!
//! let service = PlayService::new(InMemoryAttemptStore::new());
//! let context = MatchContext::new(PlayerId::new("ana"), MatchId::new("m1"), MatchWindow::always_open());
//! let session = service.open(context, Arc::new(puzzle), Utc::now())?;
//!
//! let path = SelectionPath::between(Cell::new(0, 0), Cell::new(0, 2)).expect("straight line");
//! if let SessionTransition::Completed(finished) = session.resolve_selection(&path, Utc::now()) {
//!     service.record(finished)?;
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

// Private module declarations
mod attempt;
mod draft;
mod geometry;
mod invariants;
mod matching;
mod placement;
mod puzzle;
mod ranking;
mod scoring;
mod selection;
mod service;
mod session;
mod word;

// Crate-level exports - Geometry
pub use geometry::{Cell, Direction, Line, MAX_COORDINATE, project, steps_between};

// Crate-level exports - Words and placements
pub use placement::{
    Occupancy, PlacementError, PlacementSpan, SpanError, WordPlacement, check_bounds, check_intersections,
    validate,
};
pub use word::{MIN_WORD_LEN, Word, is_board_letter};

// Crate-level exports - Puzzle model
pub use puzzle::{CompiledPuzzle, Difficulty, LetterGrid, Puzzle, PuzzleError, PuzzleMetadata};

// Crate-level exports - Authoring
pub use draft::{DraftError, DraftSlot, GridLimits, PuzzleDraft, PuzzleSubmission, SlotStatus};

// Crate-level exports - Selection and matching
pub use matching::resolve;
pub use selection::{SelectionPath, SelectionTracker};

// Crate-level exports - Sessions
pub use scoring::{ScoreRules, elapsed_seconds, format_elapsed};
pub use session::{
    AccessError, FinishedSession, MatchContext, MatchWindow, PlaySession, PointerEvent, SessionSetup,
    SessionTransition,
};

// Crate-level exports - Invariants
pub use invariants::{
    FoundCellsCoverFoundWords, FoundWordsArePlaced, Invariant, InvariantSet, InvariantViolation,
    SessionInvariants, UniqueFoundWords,
};

// Crate-level exports - Attempts and ranking
pub use attempt::{
    AttemptOutcome, AttemptRecord, AttemptStore, InMemoryAttemptStore, MatchId, PlayerId, SessionSummary,
    StoreError,
};
pub use ranking::{RankingEntry, rank};
pub use service::{PlayError, PlayService};
