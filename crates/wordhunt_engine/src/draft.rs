//! Authoring aggregate: the puzzle an author is still building.
//!
//! Word slots live in an arena indexed by position. Each slot is validated on
//! its own against the other placed slots whenever its status is asked for,
//! so editing one word never silently rewrites another.

use crate::geometry::{Cell, Direction, project};
use crate::placement::{Occupancy, PlacementError, PlacementSpan, WordPlacement, validate};
use crate::puzzle::{Puzzle, PuzzleError, PuzzleMetadata};
use crate::word::{MIN_WORD_LEN, Word};
use derive_getters::Getters;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::{debug, info, instrument, warn};

/// Allowed board sizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Getters)]
#[serde(default)]
pub struct GridLimits {
    /// Smallest side length.
    min_side: usize,
    /// Largest side length.
    max_side: usize,
    /// Side length of a fresh draft.
    default_side: usize,
}

impl GridLimits {
    /// Creates limits; `default_side` is clamped into `[min_side, max_side]`.
    pub fn new(min_side: usize, max_side: usize, default_side: usize) -> Self {
        let min_side = min_side.max(1);
        let max_side = max_side.max(min_side);
        Self {
            min_side,
            max_side,
            default_side: default_side.clamp(min_side, max_side),
        }
    }

    /// Clamps a requested side length.
    pub fn clamp(&self, side: usize) -> usize {
        side.clamp(self.min_side, self.max_side)
    }
}

impl Default for GridLimits {
    fn default() -> Self {
        Self::new(5, 20, 12)
    }
}

/// One word entry in a draft.
#[derive(Debug, Clone, PartialEq, Eq, Default, Getters)]
pub struct DraftSlot {
    /// Normalized text, possibly empty.
    text: Word,
    /// Start cell once the author has put the word on the board.
    start: Option<Cell>,
    /// Direction chosen for the word.
    direction: Direction,
}

impl DraftSlot {
    fn placement(&self) -> Option<WordPlacement> {
        match self.start {
            Some(start) if !self.text.is_empty() => {
                Some(WordPlacement::new(self.text.clone(), start, self.direction))
            }
            _ => None,
        }
    }
}

/// Where a slot stands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SlotStatus {
    /// No text yet; ignored.
    Empty,
    /// Has text but has not been put on the board.
    Unplaced,
    /// On the board, in bounds and agreeing with every crossing word.
    Placed,
    /// On the board but out of bounds or conflicting.
    Invalid(PlacementError),
}

impl SlotStatus {
    /// Returns true for slots that block publishing.
    pub fn blocks_publishing(&self) -> bool {
        matches!(self, SlotStatus::Unplaced | SlotStatus::Invalid(_))
    }
}

/// Why a draft operation or submission was refused.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display)]
pub enum DraftError {
    /// No slot at this index.
    #[display("No word slot {}", _0)]
    UnknownSlot(usize),
    /// Title is blank.
    #[display("The title is required")]
    MissingTitle,
    /// Theme is blank.
    #[display("The theme is required")]
    MissingTheme,
    /// Nothing is on the board.
    #[display("Add and place at least one word on the board")]
    NoPlacedWords,
    /// A word has text but no position.
    #[display("Place '{}' on the board", word)]
    UnplacedWord {
        /// Slot index.
        slot: usize,
        /// The word.
        word: Word,
    },
    /// A word cannot go where it was put.
    #[display("Word {}: {}", slot + 1, error)]
    InvalidPlacement {
        /// Slot index.
        slot: usize,
        /// What is wrong with it.
        error: PlacementError,
    },
    /// The same word appears in two slots.
    #[display("Word '{}' appears more than once", _0)]
    DuplicateWord(Word),
    /// A placed word has fewer than [`MIN_WORD_LEN`] letters.
    #[display("'{}' is too short: words need at least {} letters", word, MIN_WORD_LEN)]
    WordTooShort {
        /// Slot index.
        slot: usize,
        /// The word.
        word: Word,
    },
}

impl std::error::Error for DraftError {}

/// A finished draft, ready to hand to the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PuzzleSubmission {
    /// Title, theme and friends.
    #[serde(flatten)]
    pub metadata: PuzzleMetadata,
    /// Number of columns.
    pub width: usize,
    /// Number of rows.
    pub height: usize,
    /// Placed words in endpoint form.
    pub words: Vec<PlacementSpan>,
}

impl PuzzleSubmission {
    /// Rebuilds the uncompiled puzzle this submission describes.
    pub fn to_puzzle(&self) -> Result<Puzzle, PuzzleError> {
        let placements = self
            .words
            .iter()
            .map(PlacementSpan::to_placement)
            .collect::<Result<Vec<_>, _>>()?;
        Puzzle::new(self.width, self.height, placements, self.metadata.clone())
    }
}

/// A puzzle under construction.
#[derive(Debug, Clone, PartialEq, Eq, Getters)]
pub struct PuzzleDraft {
    /// Title, theme and friends.
    metadata: PuzzleMetadata,
    /// Number of columns.
    width: usize,
    /// Number of rows.
    height: usize,
    /// Allowed sizes.
    limits: GridLimits,
    /// Word slots, never empty.
    slots: Vec<DraftSlot>,
}

impl PuzzleDraft {
    /// Starts a draft with one empty slot on a default-sized board.
    #[instrument]
    pub fn new(limits: GridLimits) -> Self {
        Self {
            metadata: PuzzleMetadata::default(),
            width: *limits.default_side(),
            height: *limits.default_side(),
            limits,
            slots: vec![DraftSlot::default()],
        }
    }

    /// Replaces the descriptive fields.
    pub fn set_metadata(&mut self, metadata: PuzzleMetadata) {
        self.metadata = metadata;
    }

    /// Longest word the board can hold.
    pub fn max_word_len(&self) -> usize {
        self.width.max(self.height)
    }

    /// Resizes the board width. Every slot loses its position.
    #[instrument(skip(self))]
    pub fn set_width(&mut self, width: usize) -> usize {
        self.width = self.limits.clamp(width);
        self.clear_positions();
        self.width
    }

    /// Resizes the board height. Every slot loses its position.
    #[instrument(skip(self))]
    pub fn set_height(&mut self, height: usize) -> usize {
        self.height = self.limits.clamp(height);
        self.clear_positions();
        self.height
    }

    /// Appends an empty slot and returns its index.
    pub fn add_slot(&mut self) -> usize {
        self.slots.push(DraftSlot::default());
        self.slots.len() - 1
    }

    /// Removes a slot. The last remaining slot is kept.
    #[instrument(skip(self))]
    pub fn remove_slot(&mut self, slot: usize) -> bool {
        if self.slots.len() <= 1 || slot >= self.slots.len() {
            debug!(slot, count = self.slots.len(), "Slot not removed");
            return false;
        }
        self.slots.remove(slot);
        true
    }

    fn slot_mut(&mut self, slot: usize) -> Result<&mut DraftSlot, DraftError> {
        self.slots.get_mut(slot).ok_or(DraftError::UnknownSlot(slot))
    }

    /// Sets a slot's text, normalized and cut to the longest word that fits.
    #[instrument(skip(self, raw))]
    pub fn set_text(&mut self, slot: usize, raw: &str) -> Result<SlotStatus, DraftError> {
        let max = self.max_word_len();
        self.slot_mut(slot)?.text = Word::normalize(raw).truncated(max);
        self.status(slot)
    }

    /// Sets a slot's direction.
    #[instrument(skip(self))]
    pub fn set_direction(&mut self, slot: usize, direction: Direction) -> Result<SlotStatus, DraftError> {
        self.slot_mut(slot)?.direction = direction;
        self.status(slot)
    }

    /// Toggles a slot on the board.
    ///
    /// A placed slot is taken off. An unplaced slot is put at `cell` only if
    /// it fits and agrees with every crossing word; otherwise the slot stays
    /// unplaced and the reason is returned. Empty slots are ignored.
    #[instrument(skip(self))]
    pub fn place(&mut self, slot: usize, cell: Cell) -> Result<SlotStatus, DraftError> {
        let current = self.slots.get(slot).ok_or(DraftError::UnknownSlot(slot))?;
        if current.text.is_empty() {
            return Ok(SlotStatus::Empty);
        }
        if current.start.is_some() {
            self.slot_mut(slot)?.start = None;
            debug!(slot, "Word taken off the board");
            return Ok(SlotStatus::Unplaced);
        }

        let candidate = WordPlacement::new(current.text.clone(), cell, current.direction);
        let others = self.placements_except(slot);
        if let Err(error) = validate(&candidate, &others, self.width, self.height) {
            warn!(slot, %error, "Placement refused");
            return Err(DraftError::InvalidPlacement { slot, error });
        }
        self.slot_mut(slot)?.start = Some(cell);
        info!(slot, word = %candidate.word(), start = %cell, "Word placed");
        Ok(SlotStatus::Placed)
    }

    /// Takes every word off the board.
    pub fn clear_positions(&mut self) {
        for slot in &mut self.slots {
            slot.start = None;
        }
    }

    /// Placements of every placed slot except `slot`.
    fn placements_except(&self, slot: usize) -> Vec<WordPlacement> {
        self.slots
            .iter()
            .enumerate()
            .filter(|(i, _)| *i != slot)
            .filter_map(|(_, s)| s.placement())
            .collect()
    }

    /// Current status of a slot.
    pub fn status(&self, slot: usize) -> Result<SlotStatus, DraftError> {
        let current = self.slots.get(slot).ok_or(DraftError::UnknownSlot(slot))?;
        if current.text.is_empty() {
            return Ok(SlotStatus::Empty);
        }
        let Some(candidate) = current.placement() else {
            return Ok(SlotStatus::Unplaced);
        };
        let others = self.placements_except(slot);
        Ok(match validate(&candidate, &others, self.width, self.height) {
            Ok(()) => SlotStatus::Placed,
            Err(error) => SlotStatus::Invalid(error),
        })
    }

    /// Status of every slot, in order.
    pub fn statuses(&self) -> Vec<SlotStatus> {
        (0..self.slots.len())
            .filter_map(|slot| self.status(slot).ok())
            .collect()
    }

    /// Number of slots currently on the board.
    pub fn placed_count(&self) -> usize {
        self.slots.iter().filter(|s| s.placement().is_some()).count()
    }

    /// Letters currently on the board, for rendering the editor.
    pub fn occupancy(&self) -> Occupancy {
        Occupancy::from_placements(&self.placements_except(usize::MAX))
    }

    /// Cells `slot` would cover if put at `cell`, clipped to the board.
    pub fn preview(&self, slot: usize, cell: Cell) -> Vec<(Cell, char)> {
        let Some(current) = self.slots.get(slot) else {
            return Vec::new();
        };
        if current.text.is_empty() || current.start.is_some() {
            return Vec::new();
        }
        WordPlacement::new(current.text.clone(), cell, current.direction)
            .letter_cells()
            .into_iter()
            .filter(|(c, _)| c.is_within(self.width, self.height))
            .collect()
    }

    /// Where the slot's word would end if put at `cell`.
    pub fn projected_end(&self, slot: usize, cell: Cell) -> Option<Cell> {
        self.slots
            .get(slot)
            .map(|s| project(cell, s.direction, s.text.len()))
    }

    /// Returns true when every worded slot is placed and valid and at least
    /// one word is on the board.
    pub fn is_publishable(&self) -> bool {
        self.placed_count() > 0 && !self.statuses().iter().any(SlotStatus::blocks_publishing)
    }

    /// Produces the submission for the backend.
    #[instrument(skip(self), fields(title = %self.metadata.title()))]
    pub fn submit(&self) -> Result<PuzzleSubmission, DraftError> {
        if self.metadata.title().trim().is_empty() {
            return Err(DraftError::MissingTitle);
        }
        if self.metadata.theme().trim().is_empty() {
            return Err(DraftError::MissingTheme);
        }
        if self.placed_count() == 0 {
            return Err(DraftError::NoPlacedWords);
        }

        let mut seen = HashSet::new();
        let mut words = Vec::new();
        for (slot, status) in self.statuses().into_iter().enumerate() {
            let text = self.slots[slot].text.clone();
            match status {
                SlotStatus::Empty => continue,
                SlotStatus::Unplaced => return Err(DraftError::UnplacedWord { slot, word: text }),
                SlotStatus::Invalid(error) => return Err(DraftError::InvalidPlacement { slot, error }),
                SlotStatus::Placed => {}
            }
            if text.len() < MIN_WORD_LEN {
                return Err(DraftError::WordTooShort { slot, word: text });
            }
            if !seen.insert(text.clone()) {
                return Err(DraftError::DuplicateWord(text));
            }
            if let Some(placement) = self.slots[slot].placement() {
                words.push(placement.to_span());
            }
        }

        info!(words = words.len(), width = self.width, height = self.height, "Draft submitted");
        Ok(PuzzleSubmission {
            metadata: self.metadata.clone(),
            width: self.width,
            height: self.height,
            words,
        })
    }
}

impl Default for PuzzleDraft {
    fn default() -> Self {
        Self::new(GridLimits::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft_8x8() -> PuzzleDraft {
        let mut draft = PuzzleDraft::default();
        draft.set_width(8);
        draft.set_height(8);
        draft.set_metadata(PuzzleMetadata::default().with_title("Astros").with_theme("Espaço"));
        draft
    }

    #[test]
    fn test_new_draft_has_one_empty_slot() {
        let draft = PuzzleDraft::default();
        assert_eq!(draft.slots().len(), 1);
        assert_eq!((*draft.width(), *draft.height()), (12, 12));
        assert_eq!(draft.statuses(), vec![SlotStatus::Empty]);
        assert!(!draft.is_publishable());
    }

    #[test]
    fn test_dimensions_are_clamped() {
        let mut draft = PuzzleDraft::default();
        assert_eq!(draft.set_width(3), 5);
        assert_eq!(draft.set_height(99), 20);
    }

    #[test]
    fn test_text_is_normalized_and_truncated() {
        let mut draft = draft_8x8();
        draft.set_text(0, "paralelepípedo").expect("slot exists");
        assert_eq!(draft.slots()[0].text().as_str(), "PARALELE");
        assert_eq!(draft.status(0), Ok(SlotStatus::Unplaced));
    }

    #[test]
    fn test_place_toggles() {
        let mut draft = draft_8x8();
        draft.set_text(0, "sol").expect("slot exists");
        assert_eq!(draft.place(0, Cell::new(2, 1)), Ok(SlotStatus::Placed));
        assert_eq!(draft.place(0, Cell::new(5, 5)), Ok(SlotStatus::Unplaced));
        assert_eq!(draft.slots()[0].start(), &None);
    }

    #[test]
    fn test_place_refuses_out_of_bounds() {
        let mut draft = draft_8x8();
        draft.set_text(0, "sol").expect("slot exists");
        let result = draft.place(0, Cell::new(0, 6));
        assert!(matches!(
            result,
            Err(DraftError::InvalidPlacement { slot: 0, error: PlacementError::OutOfBounds { .. } })
        ));
        assert_eq!(draft.status(0), Ok(SlotStatus::Unplaced));
    }

    #[test]
    fn test_place_refuses_conflicting_crossing() {
        let mut draft = draft_8x8();
        draft.set_text(0, "sol").expect("slot exists");
        draft.place(0, Cell::new(2, 1)).expect("fits");
        let mar = draft.add_slot();
        draft.set_text(mar, "mar").expect("slot exists");
        draft.set_direction(mar, Direction::Down).expect("slot exists");
        assert!(matches!(
            draft.place(mar, Cell::new(1, 3)),
            Err(DraftError::InvalidPlacement {
                error: PlacementError::IntersectionConflict { row: 2, col: 3, .. },
                ..
            })
        ));

        let ovo = draft.add_slot();
        draft.set_text(ovo, "ovo").expect("slot exists");
        draft.set_direction(ovo, Direction::Down).expect("slot exists");
        assert_eq!(draft.place(ovo, Cell::new(2, 2)), Ok(SlotStatus::Placed));
    }

    #[test]
    fn test_editing_text_revalidates_independently() {
        let mut draft = draft_8x8();
        draft.set_text(0, "sol").expect("slot exists");
        draft.place(0, Cell::new(2, 1)).expect("fits");
        let ovo = draft.add_slot();
        draft.set_text(ovo, "ovo").expect("slot exists");
        draft.set_direction(ovo, Direction::Down).expect("slot exists");
        draft.place(ovo, Cell::new(2, 2)).expect("crosses on O");

        // Both words now see a conflict on the shared cell.
        let status = draft.set_text(0, "sal").expect("slot exists");
        assert!(matches!(status, SlotStatus::Invalid(PlacementError::IntersectionConflict { .. })));
        assert!(matches!(draft.status(ovo), Ok(SlotStatus::Invalid(_))));
        assert!(!draft.is_publishable());

        draft.set_text(0, "sol").expect("slot exists");
        assert!(draft.is_publishable());
    }

    #[test]
    fn test_resizing_clears_positions() {
        let mut draft = draft_8x8();
        draft.set_text(0, "sol").expect("slot exists");
        draft.place(0, Cell::new(2, 1)).expect("fits");
        draft.set_width(10);
        assert_eq!(draft.placed_count(), 0);
        assert_eq!(draft.status(0), Ok(SlotStatus::Unplaced));
    }

    #[test]
    fn test_last_slot_is_kept() {
        let mut draft = draft_8x8();
        assert!(!draft.remove_slot(0));
        let second = draft.add_slot();
        assert!(draft.remove_slot(second));
        assert!(!draft.remove_slot(7));
    }

    #[test]
    fn test_preview_is_clipped_to_board() {
        let mut draft = draft_8x8();
        draft.set_text(0, "casa").expect("slot exists");
        let preview = draft.preview(0, Cell::new(0, 6));
        assert_eq!(preview, vec![(Cell::new(0, 6), 'C'), (Cell::new(0, 7), 'A')]);
        assert_eq!(draft.projected_end(0, Cell::new(0, 6)), Some(Cell::new(0, 9)));
    }

    #[test]
    fn test_submit_requires_metadata_and_words() {
        let mut draft = PuzzleDraft::default();
        assert_eq!(draft.submit(), Err(DraftError::MissingTitle));
        draft.set_metadata(PuzzleMetadata::default().with_title("Frutas"));
        assert_eq!(draft.submit(), Err(DraftError::MissingTheme));
        draft.set_metadata(PuzzleMetadata::default().with_title("Frutas").with_theme("Comida"));
        assert_eq!(draft.submit(), Err(DraftError::NoPlacedWords));
    }

    #[test]
    fn test_submit_rejects_unplaced_words() {
        let mut draft = draft_8x8();
        draft.set_text(0, "sol").expect("slot exists");
        draft.place(0, Cell::new(2, 1)).expect("fits");
        let lua = draft.add_slot();
        draft.set_text(lua, "lua").expect("slot exists");
        assert!(matches!(draft.submit(), Err(DraftError::UnplacedWord { slot: 1, .. })));
    }

    #[test]
    fn test_submit_ignores_empty_slots() {
        let mut draft = draft_8x8();
        draft.set_text(0, "sol").expect("slot exists");
        draft.place(0, Cell::new(2, 1)).expect("fits");
        draft.add_slot();

        let submission = draft.submit().expect("publishable");
        assert_eq!(submission.words, vec![PlacementSpan::new(Word::normalize("SOL"), 2, 1, 2, 3)]);
        let puzzle = submission.to_puzzle().expect("consistent");
        assert_eq!(puzzle.placements().len(), 1);
        assert!(!puzzle.is_compiled());
    }

    #[test]
    fn test_submit_rejects_duplicate_words() {
        let mut draft = draft_8x8();
        draft.set_text(0, "sol").expect("slot exists");
        draft.place(0, Cell::new(2, 1)).expect("fits");
        let again = draft.add_slot();
        draft.set_text(again, "sol").expect("slot exists");
        draft.place(again, Cell::new(5, 1)).expect("fits");
        assert_eq!(draft.submit(), Err(DraftError::DuplicateWord(Word::normalize("SOL"))));
    }

    #[test]
    fn test_submit_rejects_single_letter_words() {
        let mut draft = draft_8x8();
        draft.set_text(0, "sol").expect("slot exists");
        draft.place(0, Cell::new(2, 1)).expect("fits");
        let short = draft.add_slot();
        draft.set_text(short, "é").expect("slot exists");
        draft.place(short, Cell::new(6, 6)).expect("fits");
        assert_eq!(
            draft.submit(),
            Err(DraftError::WordTooShort {
                slot: 1,
                word: Word::normalize("É"),
            })
        );
    }

    #[test]
    fn test_submission_serializes_camel_case() {
        let mut draft = draft_8x8();
        draft.set_text(0, "sol").expect("slot exists");
        draft.place(0, Cell::new(2, 1)).expect("fits");
        let json = serde_json::to_value(draft.submit().expect("publishable")).expect("serializes");
        assert_eq!(json["words"][0]["startRow"], 2);
        assert_eq!(json["words"][0]["endCol"], 3);
        assert_eq!(json["title"], "Astros");
        assert_eq!(json["difficulty"], "EASY");
    }
}
