//! Authoring a puzzle and playing it once compiled.

use chrono::{TimeZone, Utc};
use std::sync::Arc;

use wordhunt::parse_puzzle;
use wordhunt_engine::{
    Cell, CompiledPuzzle, Difficulty, Direction, DraftError, GridLimits, InMemoryAttemptStore, MatchContext, MatchId,
    MatchWindow, PlacementError, PlayService, PlayerId, Puzzle, PuzzleDraft, PuzzleMetadata, SelectionPath,
    SessionTransition, SlotStatus,
};

fn astros_draft() -> PuzzleDraft {
    let mut draft = PuzzleDraft::new(GridLimits::default());
    draft.set_metadata(
        PuzzleMetadata::default()
            .with_title("Astros")
            .with_theme("Céu")
            .with_difficulty(Difficulty::Medium),
    );
    draft.set_width(6);
    draft.set_height(5);

    draft.set_text(0, "sol").expect("slot 0");
    draft.place(0, Cell::new(0, 0)).expect("SOL fits");

    let lua = draft.add_slot();
    draft.set_text(lua, "Lua").expect("slot 1");
    draft.set_direction(lua, Direction::Down).expect("slot 1");
    draft.place(lua, Cell::new(0, 2)).expect("LUA crosses SOL on L");
    draft
}

/// Fills every free cell with `X`, as a backend compiler would with noise.
fn compile(puzzle: &Puzzle) -> CompiledPuzzle {
    let occupancy = puzzle.occupancy();
    let letter_grid = (0..*puzzle.height())
        .map(|row| {
            (0..*puzzle.width())
                .map(|col| occupancy.get(Cell::new(row as i32, col as i32)).unwrap_or('X'))
                .collect::<String>()
        })
        .collect();
    CompiledPuzzle {
        width: *puzzle.width(),
        height: *puzzle.height(),
        letter_grid,
        words: puzzle.spans(),
        metadata: puzzle.metadata().clone(),
    }
}

#[test]
fn test_submission_carries_spans_and_metadata() {
    let submission = astros_draft().submit().expect("publishable");
    assert_eq!((submission.width, submission.height), (6, 5));
    assert_eq!(submission.words.len(), 2);
    assert_eq!(submission.words[1].word.as_str(), "LUA");
    assert_eq!(
        (submission.words[1].end_row, submission.words[1].end_col),
        (2, 2)
    );

    let json = serde_json::to_value(&submission).expect("serializes");
    assert_eq!(json["title"], "Astros");
    assert_eq!(json["difficulty"], "MEDIUM");
    assert_eq!(json["words"][0]["startCol"], 0);
}

#[test]
fn test_conflicting_placement_is_refused() {
    let mut draft = astros_draft();
    let sal = draft.add_slot();
    draft.set_text(sal, "sal").expect("slot 2");
    draft.set_direction(sal, Direction::Down).expect("slot 2");
    // SAL down from (0, 1) puts S where SOL has O.
    match draft.place(sal, Cell::new(0, 1)) {
        Err(DraftError::InvalidPlacement {
            error: PlacementError::IntersectionConflict { .. },
            ..
        }) => {}
        other => panic!("Expected an intersection conflict, got {:?}", other),
    }
    assert_eq!(draft.status(sal), Ok(SlotStatus::Unplaced));
    assert!(matches!(draft.submit(), Err(DraftError::UnplacedWord { slot: 2, .. })));
}

#[test]
fn test_resizing_takes_words_off_the_board() {
    let mut draft = astros_draft();
    assert_eq!(draft.set_width(40), 20);
    assert_eq!(draft.placed_count(), 0);
    assert_eq!(draft.submit(), Err(DraftError::NoPlacedWords));
}

#[test]
fn test_authored_puzzle_plays_to_completion() {
    let submission = astros_draft().submit().expect("publishable");
    let json = serde_json::to_string(&submission).expect("serializes");
    let uncompiled = parse_puzzle(&json).expect("submission parses");
    assert!(!uncompiled.is_compiled());

    let compiled_json = serde_json::to_string(&compile(&uncompiled)).expect("serializes");
    let puzzle = Arc::new(parse_puzzle(&compiled_json).expect("compiled parses"));
    assert!(puzzle.is_compiled());

    let now = Utc.with_ymd_and_hms(2026, 1, 10, 10, 0, 0).unwrap();
    let service = PlayService::new(InMemoryAttemptStore::new());
    let context = MatchContext::new(PlayerId::new("ana"), MatchId::new("m1"), MatchWindow::always_open());
    let session = service.open(context, puzzle, now).expect("open");

    let sol = SelectionPath::between(Cell::new(0, 2), Cell::new(0, 0)).expect("straight");
    let session = match session.resolve_selection(&sol, now) {
        SessionTransition::InProgress { session, found } => {
            assert_eq!(found.map(|w| w.to_string()), Some("SOL".to_string()));
            session
        }
        SessionTransition::Completed(_) => panic!("LUA is still hidden"),
    };

    let lua = SelectionPath::between(Cell::new(0, 2), Cell::new(2, 2)).expect("straight");
    match session.resolve_selection(&lua, now + chrono::Duration::seconds(50)) {
        SessionTransition::Completed(finished) => {
            let record = service.record(finished).expect("recorded");
            assert_eq!(*record.score(), 700);
        }
        SessionTransition::InProgress { .. } => panic!("Both words were found"),
    }
}
