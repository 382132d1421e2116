//! Deciding whether a finished selection is one of the puzzle's words.

use crate::placement::WordPlacement;
use crate::puzzle::Puzzle;
use crate::selection::SelectionPath;
use crate::word::{MIN_WORD_LEN, Word};
use tracing::{debug, instrument};

/// Finds the placement a selection spells out.
///
/// The selection must read the word forwards or backwards *and* start and end
/// exactly on the placement's endpoints, so an identical run of letters
/// elsewhere on the board never counts. Words in `found` are skipped, as are
/// paths shorter than two cells and puzzles without a letter grid.
#[instrument(skip_all, fields(len = path.len()))]
pub fn resolve<'p>(path: &SelectionPath, puzzle: &'p Puzzle, found: &[Word]) -> Option<&'p WordPlacement> {
    if path.len() < MIN_WORD_LEN {
        return None;
    }
    let (first, last) = (path.first()?, path.last()?);
    let candidate: String = path
        .cells()
        .iter()
        .map(|cell| puzzle.letter_at(*cell))
        .collect::<Option<String>>()?;

    let hit = puzzle.placements().iter().find(|placement| {
        if found.contains(placement.word()) {
            return false;
        }
        let forward = placement.word().as_str();
        let reversed = placement.word().reversed();
        if candidate != forward && candidate != reversed.as_str() {
            return false;
        }
        let (start, end) = (placement.start(), placement.end());
        (first == start && last == end) || (first == end && last == start)
    });

    match hit {
        Some(placement) => debug!(word = %placement.word(), "Selection matched"),
        None => debug!(%candidate, "Selection matched nothing"),
    }
    hit
}
