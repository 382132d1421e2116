//! First-class invariants for play sessions.
//!
//! Invariants are logical properties that must hold throughout a session.
//! They are checked in debug builds after every accepted word and can be
//! tested on their own.

use crate::session::PlaySession;
use std::collections::{BTreeSet, HashSet};

/// A logical property that must hold for a given state.
pub trait Invariant<S> {
    /// Checks if the invariant holds for the given state.
    fn holds(state: &S) -> bool;

    /// Human-readable description of the invariant.
    fn description() -> &'static str;
}

/// Violation of an invariant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvariantViolation {
    /// Description of the violated invariant.
    pub description: String,
}

impl InvariantViolation {
    /// Creates a new invariant violation.
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
        }
    }
}

/// A set of invariants that can be checked together.
pub trait InvariantSet<S> {
    /// Checks all invariants in the set, collecting every violation.
    fn check_all(state: &S) -> Result<(), Vec<InvariantViolation>>;
}

impl<S, I1, I2, I3> InvariantSet<S> for (I1, I2, I3)
where
    I1: Invariant<S>,
    I2: Invariant<S>,
    I3: Invariant<S>,
{
    fn check_all(state: &S) -> Result<(), Vec<InvariantViolation>> {
        let violations: Vec<_> = [
            (I1::holds(state), I1::description()),
            (I2::holds(state), I2::description()),
            (I3::holds(state), I3::description()),
        ]
        .into_iter()
        .filter(|(holds, _)| !holds)
        .map(|(_, description)| InvariantViolation::new(description))
        .collect();

        if violations.is_empty() {
            Ok(())
        } else {
            Err(violations)
        }
    }
}

/// Invariant: no word is counted twice.
pub struct UniqueFoundWords;

impl Invariant<PlaySession> for UniqueFoundWords {
    fn holds(session: &PlaySession) -> bool {
        let unique: HashSet<_> = session.found_words().iter().collect();
        unique.len() == session.found_words().len()
    }

    fn description() -> &'static str {
        "Found words are unique"
    }
}

/// Invariant: every found word is placed in the puzzle.
pub struct FoundWordsArePlaced;

impl Invariant<PlaySession> for FoundWordsArePlaced {
    fn holds(session: &PlaySession) -> bool {
        session
            .found_words()
            .iter()
            .all(|word| session.puzzle().placement_of(word).is_some())
    }

    fn description() -> &'static str {
        "Found words belong to the puzzle"
    }
}

/// Invariant: found cells are exactly the cells of the found words.
pub struct FoundCellsCoverFoundWords;

impl Invariant<PlaySession> for FoundCellsCoverFoundWords {
    fn holds(session: &PlaySession) -> bool {
        let expected: BTreeSet<_> = session
            .found_words()
            .iter()
            .filter_map(|word| session.puzzle().placement_of(word))
            .flat_map(|placement| placement.cells())
            .collect();
        &expected == session.found_cells()
    }

    fn description() -> &'static str {
        "Found cells are the union of found words' cells"
    }
}

/// All session invariants as a composable set.
pub type SessionInvariants = (UniqueFoundWords, FoundWordsArePlaced, FoundCellsCoverFoundWords);
