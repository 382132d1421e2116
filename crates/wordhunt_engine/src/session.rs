//! Phase-specific typestate structs for a play session.
//!
//! A session moves `SessionSetup → PlaySession → FinishedSession`. Each phase
//! is its own type, so a finished session cannot take another selection and
//! always carries its attempt record.

use crate::attempt::{AttemptOutcome, AttemptRecord, MatchId, PlayerId, SessionSummary};
use crate::geometry::Cell;
use crate::invariants::{InvariantSet, SessionInvariants};
use crate::matching::resolve;
use crate::puzzle::Puzzle;
use crate::scoring::{ScoreRules, elapsed_seconds};
use crate::selection::{SelectionPath, SelectionTracker};
use crate::word::Word;
use chrono::{DateTime, Utc};
use derive_getters::Getters;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

// ─────────────────────────────────────────────────────────────
//  Access
// ─────────────────────────────────────────────────────────────

/// Optional opening and closing times of a match. Both bounds are inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, Getters, derive_new::new)]
#[serde(rename_all = "camelCase")]
pub struct MatchWindow {
    /// Play is refused before this instant.
    opens_at: Option<DateTime<Utc>>,
    /// Play is refused after this instant.
    closes_at: Option<DateTime<Utc>>,
}

impl MatchWindow {
    /// A window with no bounds.
    pub fn always_open() -> Self {
        Self::default()
    }

    /// Fails if `now` is outside the window.
    #[instrument(skip(self))]
    pub fn check(&self, now: DateTime<Utc>) -> Result<(), AccessError> {
        if let Some(opens_at) = self.opens_at
            && now < opens_at
        {
            return Err(AccessError::NotYetOpen { opens_at });
        }
        if let Some(closed_at) = self.closes_at
            && now > closed_at
        {
            return Err(AccessError::Closed { closed_at });
        }
        Ok(())
    }
}

/// Who is playing which match, passed in explicitly by the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Getters, derive_new::new)]
#[serde(rename_all = "camelCase")]
pub struct MatchContext {
    /// The player.
    player_id: PlayerId,
    /// The match.
    match_id: MatchId,
    /// When the match may be played.
    window: MatchWindow,
}

/// Why a session could not be started.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display)]
pub enum AccessError {
    /// The player already has a result for this match.
    #[display("Already played this match ({})", SessionSummary::from(&**previous))]
    AlreadyAttempted {
        /// The stored result, to show instead of the board.
        previous: Box<AttemptRecord>,
    },
    /// The match has not started yet.
    #[display("This match has not started yet. Opens at {}", opens_at)]
    NotYetOpen {
        /// When it opens.
        opens_at: DateTime<Utc>,
    },
    /// The match is over.
    #[display("This match closed at {}", closed_at)]
    Closed {
        /// When it closed.
        closed_at: DateTime<Utc>,
    },
    /// The puzzle has no letter grid to play on.
    #[display("Puzzle has not been compiled")]
    PuzzleNotCompiled,
    /// The puzzle has nothing to find.
    #[display("Puzzle has no words")]
    EmptyPuzzle,
}

impl std::error::Error for AccessError {}

// ─────────────────────────────────────────────────────────────
//  Actions
// ─────────────────────────────────────────────────────────────

/// Pointer input on the board, as a first-class action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "cell", rename_all = "lowercase")]
pub enum PointerEvent {
    /// Button pressed over a cell.
    Down(Cell),
    /// Pointer moved over a cell.
    Move(Cell),
    /// Button released.
    Up,
    /// Pointer left the board.
    Leave,
}

// ─────────────────────────────────────────────────────────────
//  Setup Phase
// ─────────────────────────────────────────────────────────────

/// A session that has not started.
#[derive(Debug, Clone)]
pub struct SessionSetup {
    context: MatchContext,
    puzzle: Arc<Puzzle>,
    rules: ScoreRules,
}

impl SessionSetup {
    /// Prepares a session with the default score rules.
    #[instrument(skip(puzzle), fields(title = %puzzle.metadata().title()))]
    pub fn new(context: MatchContext, puzzle: Arc<Puzzle>) -> Self {
        Self {
            context,
            puzzle,
            rules: ScoreRules::default(),
        }
    }

    /// Uses different score rules.
    pub fn with_rules(mut self, rules: ScoreRules) -> Self {
        self.rules = rules;
        self
    }

    /// Starts play at `now`.
    ///
    /// `previous` is the player's stored record for this match, if any; its
    /// presence refuses the session before anything else is checked.
    #[instrument(skip(self, previous), fields(player = %self.context.player_id(), match_id = %self.context.match_id()))]
    pub fn start(self, previous: Option<AttemptRecord>, now: DateTime<Utc>) -> Result<PlaySession, AccessError> {
        if let Some(previous) = previous {
            warn!(score = previous.score(), "Player already attempted this match");
            return Err(AccessError::AlreadyAttempted {
                previous: Box::new(previous),
            });
        }
        self.context.window().check(now)?;
        if !self.puzzle.is_compiled() {
            return Err(AccessError::PuzzleNotCompiled);
        }
        if self.puzzle.placements().is_empty() {
            return Err(AccessError::EmptyPuzzle);
        }

        info!(words = self.puzzle.placements().len(), "Session started");
        Ok(PlaySession {
            selection: SelectionTracker::bounded(*self.puzzle.width(), *self.puzzle.height()),
            context: self.context,
            puzzle: self.puzzle,
            rules: self.rules,
            started_at: now,
            found_words: Vec::new(),
            found_cells: BTreeSet::new(),
        })
    }
}

// ─────────────────────────────────────────────────────────────
//  InProgress Phase
// ─────────────────────────────────────────────────────────────

/// A session in play.
#[derive(Debug, Clone, Getters)]
pub struct PlaySession {
    /// Who and what.
    context: MatchContext,
    /// The board being searched.
    puzzle: Arc<Puzzle>,
    /// Scoring in effect.
    rules: ScoreRules,
    /// When play started.
    started_at: DateTime<Utc>,
    /// Words found, in the order they were found.
    found_words: Vec<Word>,
    /// Cells of every found word.
    found_cells: BTreeSet<Cell>,
    /// The drag in progress, if any.
    selection: SelectionTracker,
}

/// Result of feeding a selection to a session.
#[derive(Debug)]
pub enum SessionTransition {
    /// Play continues; `found` names the word just found, if any.
    InProgress {
        /// The session, updated.
        session: PlaySession,
        /// Word accepted by this step.
        found: Option<Word>,
    },
    /// The last word was found.
    Completed(FinishedSession),
}

impl PlaySession {
    /// Whole seconds since the start.
    pub fn elapsed_seconds(&self, now: DateTime<Utc>) -> u64 {
        elapsed_seconds(self.started_at, now)
    }

    /// Score if the session ended at `now`.
    pub fn score_at(&self, now: DateTime<Utc>) -> u32 {
        self.rules.score(self.found_words.len(), self.elapsed_seconds(now))
    }

    /// Returns true if `word` is already found.
    pub fn is_found(&self, word: &Word) -> bool {
        self.found_words.contains(word)
    }

    /// Words still hidden, in placement order.
    pub fn remaining_words(&self) -> Vec<&Word> {
        self.puzzle
            .words()
            .into_iter()
            .filter(|word| !self.is_found(word))
            .collect()
    }

    /// Pointer down over `cell`.
    pub fn begin_selection(&mut self, cell: Cell) {
        self.selection.begin(cell);
    }

    /// Pointer moved over `cell`; returns true if the path changed.
    pub fn extend_selection(&mut self, cell: Cell) -> bool {
        self.selection.extend(cell)
    }

    /// Pointer left the board.
    pub fn cancel_selection(&mut self) {
        self.selection.cancel();
    }

    /// Pointer released: resolves the current path, if any.
    #[instrument(skip(self))]
    pub fn end_selection(mut self, now: DateTime<Utc>) -> SessionTransition {
        match self.selection.end() {
            Some(path) => self.resolve_selection(&path, now),
            None => SessionTransition::InProgress {
                session: self,
                found: None,
            },
        }
    }

    /// Applies one pointer event.
    pub fn apply(mut self, event: PointerEvent, now: DateTime<Utc>) -> SessionTransition {
        match event {
            PointerEvent::Down(cell) => self.begin_selection(cell),
            PointerEvent::Move(cell) => {
                self.extend_selection(cell);
            }
            PointerEvent::Leave => self.cancel_selection(),
            PointerEvent::Up => return self.end_selection(now),
        }
        SessionTransition::InProgress {
            session: self,
            found: None,
        }
    }

    /// Checks `path` against the puzzle and records a new find.
    ///
    /// Misses and words already found leave the session unchanged. Finding
    /// the last word completes the session at `now`.
    #[instrument(skip(self, path), fields(player = %self.context.player_id(), len = path.len()))]
    pub fn resolve_selection(mut self, path: &SelectionPath, now: DateTime<Utc>) -> SessionTransition {
        let Some(placement) = resolve(path, &self.puzzle, &self.found_words).cloned() else {
            return SessionTransition::InProgress {
                session: self,
                found: None,
            };
        };

        self.found_words.push(placement.word().clone());
        self.found_cells.extend(placement.cells());
        info!(
            word = %placement.word(),
            found = self.found_words.len(),
            total = self.puzzle.placements().len(),
            "Word found"
        );

        debug_assert!(
            SessionInvariants::check_all(&self).is_ok(),
            "Session invariants violated"
        );

        if self.found_words.len() == self.puzzle.placements().len() {
            return SessionTransition::Completed(self.finish(AttemptOutcome::Completed, now));
        }
        SessionTransition::InProgress {
            session: self,
            found: Some(placement.word().clone()),
        }
    }

    /// Ends the session early.
    ///
    /// `now` should be the moment the player confirmed leaving; the partial
    /// score is frozen there and still uses up the attempt.
    #[instrument(skip(self), fields(player = %self.context.player_id(), found = self.found_words.len()))]
    pub fn abandon(self, now: DateTime<Utc>) -> FinishedSession {
        self.finish(AttemptOutcome::Abandoned, now)
    }

    fn finish(self, outcome: AttemptOutcome, now: DateTime<Utc>) -> FinishedSession {
        let score = self.score_at(now);
        let record = AttemptRecord::new(
            self.context.player_id().clone(),
            self.context.match_id().clone(),
            score,
            self.found_words.len() as u32,
            self.started_at,
            now,
            outcome,
        );
        info!(%outcome, score, words = self.found_words.len(), "Session finished");
        FinishedSession {
            record,
            found_words: self.found_words,
            found_cells: self.found_cells,
        }
    }
}

// ─────────────────────────────────────────────────────────────
//  Finished Phase
// ─────────────────────────────────────────────────────────────

/// A session that is over. It always carries its record.
#[derive(Debug, Clone, PartialEq, Eq, Getters)]
pub struct FinishedSession {
    /// The one record this session emits.
    record: AttemptRecord,
    /// Words found.
    found_words: Vec<Word>,
    /// Cells of every found word.
    found_cells: BTreeSet<Cell>,
}

impl FinishedSession {
    /// Completed or abandoned.
    pub fn outcome(&self) -> AttemptOutcome {
        *self.record.outcome()
    }

    /// Result as shown to the player, derived from the record alone.
    pub fn summary(&self) -> SessionSummary {
        SessionSummary::from(&self.record)
    }

    /// Hands the record over for persistence, consuming the session.
    pub fn into_record(self) -> AttemptRecord {
        debug!(outcome = %self.record.outcome(), "Releasing attempt record");
        self.record
    }
}

#[cfg(test)]
impl PlaySession {
    /// Overwrites the found state without going through the resolver.
    pub(crate) fn force_found(&mut self, words: Vec<Word>, cells: BTreeSet<Cell>) {
        self.found_words = words;
        self.found_cells = cells;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Direction;
    use crate::placement::WordPlacement;
    use crate::puzzle::{LetterGrid, PuzzleMetadata};
    use chrono::{Duration, TimeZone};

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 1, 10, 10, 0, 0).unwrap()
    }

    fn puzzle() -> Arc<Puzzle> {
        let grid = LetterGrid::from_lines(&[
            "ABCDEFGH", "IJKLMNOP", "QSOLRTUV", "WXYZABCD", "EFGHIJKL", "MNOPQRST", "UVWXYZAB", "CDEFGHIJ",
        ])
        .expect("valid grid");
        let placements = vec![
            WordPlacement::new(Word::normalize("SOL"), Cell::new(2, 1), Direction::Right),
            WordPlacement::new(Word::normalize("MNOP"), Cell::new(5, 0), Direction::Right),
        ];
        Arc::new(
            Puzzle::new(8, 8, placements, PuzzleMetadata::default())
                .and_then(|p| p.with_letter_grid(grid))
                .expect("consistent puzzle"),
        )
    }

    fn context(window: MatchWindow) -> MatchContext {
        MatchContext::new(PlayerId::new("ana"), MatchId::new("m1"), window)
    }

    fn start() -> PlaySession {
        SessionSetup::new(context(MatchWindow::always_open()), puzzle())
            .start(None, t0())
            .expect("open match")
    }

    fn drag(session: PlaySession, from: (i32, i32), to: (i32, i32), now: DateTime<Utc>) -> SessionTransition {
        let session = match session.apply(PointerEvent::Down(from.into()), now) {
            SessionTransition::InProgress { session, .. } => session,
            SessionTransition::Completed(_) => panic!("Pointer down cannot finish"),
        };
        let session = match session.apply(PointerEvent::Move(to.into()), now) {
            SessionTransition::InProgress { session, .. } => session,
            SessionTransition::Completed(_) => panic!("Pointer move cannot finish"),
        };
        session.apply(PointerEvent::Up, now)
    }

    fn in_progress(transition: SessionTransition) -> (PlaySession, Option<Word>) {
        match transition {
            SessionTransition::InProgress { session, found } => (session, found),
            SessionTransition::Completed(_) => panic!("Expected play to continue"),
        }
    }

    #[test]
    fn test_window_bounds() {
        let opens_at = t0() + Duration::hours(1);
        let window = MatchWindow::new(Some(opens_at), None);
        assert_eq!(window.check(t0()), Err(AccessError::NotYetOpen { opens_at }));
        assert_eq!(window.check(opens_at), Ok(()));

        let closed_at = t0() - Duration::minutes(1);
        let window = MatchWindow::new(None, Some(closed_at));
        assert_eq!(window.check(t0()), Err(AccessError::Closed { closed_at }));
        assert_eq!(MatchWindow::always_open().check(t0()), Ok(()));
    }

    #[test]
    fn test_window_bounds_are_inclusive_to_the_nanosecond() {
        let opens_at = t0();
        let closes_at = t0() + Duration::hours(2);
        let window = MatchWindow::new(Some(opens_at), Some(closes_at));
        let tick = Duration::nanoseconds(1);

        assert_eq!(window.check(opens_at - tick), Err(AccessError::NotYetOpen { opens_at }));
        assert_eq!(window.check(opens_at), Ok(()));
        assert_eq!(window.check(closes_at), Ok(()));
        assert_eq!(
            window.check(closes_at + tick),
            Err(AccessError::Closed { closed_at: closes_at })
        );
    }

    #[test]
    fn test_start_refused_before_window() {
        let opens_at = t0() + Duration::hours(1);
        let setup = SessionSetup::new(context(MatchWindow::new(Some(opens_at), None)), puzzle());
        assert!(matches!(setup.start(None, t0()), Err(AccessError::NotYetOpen { opens_at: o }) if o == opens_at));
    }

    #[test]
    fn test_start_refused_with_previous_attempt() {
        let previous = AttemptRecord::new(
            PlayerId::new("ana"),
            MatchId::new("m1"),
            500,
            1,
            t0(),
            t0() + Duration::seconds(90),
            AttemptOutcome::Abandoned,
        );
        let setup = SessionSetup::new(context(MatchWindow::always_open()), puzzle());
        match setup.start(Some(previous.clone()), t0()) {
            Err(AccessError::AlreadyAttempted { previous: stored }) => assert_eq!(*stored, previous),
            other => panic!("Expected AlreadyAttempted, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn test_start_requires_compiled_puzzle() {
        let uncompiled = Puzzle::new(
            8,
            8,
            vec![WordPlacement::new(Word::normalize("SOL"), Cell::new(2, 1), Direction::Right)],
            PuzzleMetadata::default(),
        )
        .expect("valid");
        let setup = SessionSetup::new(context(MatchWindow::always_open()), Arc::new(uncompiled));
        assert!(matches!(setup.start(None, t0()), Err(AccessError::PuzzleNotCompiled)));
    }

    #[test]
    fn test_drag_finds_word() {
        let session = start();
        let (session, found) = in_progress(drag(session, (2, 1), (2, 3), t0() + Duration::seconds(10)));
        assert_eq!(found, Some(Word::normalize("SOL")));
        assert_eq!(session.found_words(), &vec![Word::normalize("SOL")]);
        assert!(session.found_cells().contains(&Cell::new(2, 2)));
        assert_eq!(session.remaining_words(), vec![&Word::normalize("MNOP")]);
    }

    #[test]
    fn test_refinding_a_word_is_a_noop() {
        let session = start();
        let (session, _) = in_progress(drag(session, (2, 1), (2, 3), t0()));
        let (session, found) = in_progress(drag(session, (2, 3), (2, 1), t0()));
        assert_eq!(found, None);
        assert_eq!(session.found_words().len(), 1);
    }

    #[test]
    fn test_click_without_drag_is_a_noop() {
        let session = start();
        let (session, found) = in_progress(drag(session, (2, 1), (2, 1), t0()));
        assert_eq!(found, None);
        assert!(session.found_words().is_empty());
    }

    #[test]
    fn test_leaving_the_board_discards_the_drag() {
        let session = start();
        let (session, _) = in_progress(session.apply(PointerEvent::Down(Cell::new(2, 1)), t0()));
        let (session, _) = in_progress(session.apply(PointerEvent::Move(Cell::new(2, 3)), t0()));
        let (session, _) = in_progress(session.apply(PointerEvent::Leave, t0()));
        let (session, found) = in_progress(session.apply(PointerEvent::Up, t0()));
        assert_eq!(found, None);
        assert!(session.found_words().is_empty());
    }

    #[test]
    fn test_score_observed_while_playing() {
        let session = start();
        let (session, _) = in_progress(drag(session, (2, 1), (2, 3), t0()));
        assert_eq!(session.score_at(t0() + Duration::seconds(50)), 100 + 500);
        assert_eq!(session.score_at(t0() + Duration::seconds(400)), 100);
    }

    #[test]
    fn test_finding_every_word_completes() {
        let session = start();
        let (session, _) = in_progress(drag(session, (2, 1), (2, 3), t0() + Duration::seconds(20)));
        let finished_at = t0() + Duration::seconds(50);
        match drag(session, (5, 3), (5, 0), finished_at) {
            SessionTransition::Completed(finished) => {
                assert_eq!(finished.outcome(), AttemptOutcome::Completed);
                let record = finished.record();
                assert_eq!(*record.score(), 700);
                assert_eq!(*record.words_found(), 2);
                assert_eq!(*record.started_at(), t0());
                assert_eq!(*record.finished_at(), finished_at);
                assert_eq!(*finished.summary().elapsed_seconds(), 50);
            }
            SessionTransition::InProgress { .. } => panic!("All words were found"),
        }
    }

    #[test]
    fn test_abandon_keeps_partial_score() {
        let session = start();
        let (session, _) = in_progress(drag(session, (2, 1), (2, 3), t0()));
        let finished = session.abandon(t0() + Duration::seconds(250));
        assert_eq!(finished.outcome(), AttemptOutcome::Abandoned);
        assert_eq!(*finished.record().score(), 100 + 100);
        assert_eq!(*finished.record().words_found(), 1);

        let record = finished.into_record();
        assert_eq!(record.player_id(), &PlayerId::new("ana"));
        assert_eq!(*record.outcome(), AttemptOutcome::Abandoned);
    }

    #[test]
    fn test_pointer_event_wire_format() {
        let json = serde_json::to_string(&PointerEvent::Down(Cell::new(1, 2))).expect("serializes");
        assert_eq!(json, r#"{"kind":"down","cell":{"row":1,"col":2}}"#);
        let up: PointerEvent = serde_json::from_str(r#"{"kind":"up"}"#).expect("valid");
        assert_eq!(up, PointerEvent::Up);
    }
}
