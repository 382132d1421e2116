//! Line-driven play over any reader and writer.
//!
//! Each input line is either a drag `r,c r,c` (zero-based start and end
//! cells) or `quit`. End of input counts as quitting.

use chrono::{DateTime, Utc};
use derive_more::{Display, From};
use std::collections::BTreeSet;
use std::io::{BufRead, Write};
use tracing::{debug, instrument, warn};
use wordhunt_engine::{
    AttemptRecord, AttemptStore, Cell, PlaySession, PlayService, PointerEvent, Puzzle, SessionTransition,
};

/// One parsed input line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayInput {
    /// Press on the first cell, release on the second.
    Drag(Cell, Cell),
    /// Leave the match.
    Quit,
}

/// Line that is neither a drag nor `quit`.
#[derive(Debug, Clone, PartialEq, Eq, Display)]
#[display("Cannot read '{}': expected 'row,col row,col' or 'quit'", _0)]
pub struct InputError(pub String);

impl std::error::Error for InputError {}

fn parse_cell(token: &str) -> Option<Cell> {
    let (row, col) = token.split_once(',')?;
    Some(Cell::new(row.trim().parse().ok()?, col.trim().parse().ok()?))
}

/// Parses one input line.
pub fn parse_line(line: &str) -> Result<PlayInput, InputError> {
    let trimmed = line.trim();
    if trimmed.eq_ignore_ascii_case("quit") {
        return Ok(PlayInput::Quit);
    }
    let mut tokens = trimmed.split_whitespace();
    match (tokens.next().and_then(parse_cell), tokens.next().and_then(parse_cell), tokens.next()) {
        (Some(start), Some(end), None) => Ok(PlayInput::Drag(start, end)),
        _ => Err(InputError(trimmed.to_string())),
    }
}

/// Renders the board, lowercasing letters of found words.
pub fn render_board(puzzle: &Puzzle, found_cells: &BTreeSet<Cell>) -> String {
    let Some(grid) = puzzle.letter_grid() else {
        return String::new();
    };
    grid.rows()
        .iter()
        .enumerate()
        .map(|(row, letters)| {
            letters
                .iter()
                .enumerate()
                .map(|(col, letter)| {
                    let cell = Cell::new(row as i32, col as i32);
                    if found_cells.contains(&cell) {
                        letter.to_lowercase().to_string()
                    } else {
                        letter.to_string()
                    }
                })
                .collect::<Vec<_>>()
                .join(" ")
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Failure while driving a console session.
#[derive(Debug, Display, From)]
pub enum ConsoleError {
    /// Reading input or writing output failed.
    #[display("Console I/O failed: {}", _0)]
    Io(std::io::Error),
    /// The attempt could not be stored.
    #[display("{}", _0)]
    Play(wordhunt_engine::PlayError),
}

impl std::error::Error for ConsoleError {}

fn drag(session: PlaySession, start: Cell, end: Cell, now: DateTime<Utc>) -> SessionTransition {
    let mut session = session;
    session.begin_selection(start);
    session.extend_selection(end);
    session.apply(PointerEvent::Up, now)
}

/// Plays `session` to the end, then records the attempt through `service`.
///
/// `clock` supplies the current time for every step.
#[instrument(skip_all, fields(player = %session.context().player_id()))]
pub fn run_session<S, R, W, C>(
    service: &PlayService<S>,
    session: PlaySession,
    input: R,
    output: &mut W,
    clock: C,
) -> Result<AttemptRecord, ConsoleError>
where
    S: AttemptStore,
    R: BufRead,
    W: Write,
    C: Fn() -> DateTime<Utc>,
{
    writeln!(output, "{}", render_board(session.puzzle(), session.found_cells()))?;
    writeln!(output, "{} words to find", session.puzzle().placements().len())?;

    let mut lines = input.lines();
    let mut session = session;
    let finished = loop {
        let Some(line) = lines.next().transpose()? else {
            debug!("Input closed, abandoning");
            break session.abandon(clock());
        };
        if line.trim().is_empty() {
            continue;
        }
        let (start, end) = match parse_line(&line) {
            Ok(PlayInput::Quit) => break session.abandon(clock()),
            Ok(PlayInput::Drag(start, end)) => (start, end),
            Err(e) => {
                warn!(error = %e, "Unreadable input line");
                writeln!(output, "{}", e)?;
                continue;
            }
        };
        match drag(session, start, end, clock()) {
            SessionTransition::Completed(finished) => break finished,
            SessionTransition::InProgress { session: next, found } => {
                match found {
                    Some(word) => {
                        writeln!(output, "{}", render_board(next.puzzle(), next.found_cells()))?;
                        writeln!(
                            output,
                            "Found {} ({}/{})",
                            word,
                            next.found_words().len(),
                            next.puzzle().placements().len()
                        )?;
                    }
                    None => writeln!(output, "No word there")?,
                }
                session = next;
            }
        }
    };

    writeln!(output, "{}", finished.summary())?;
    let record = service.record(finished)?;
    Ok(record)
}
