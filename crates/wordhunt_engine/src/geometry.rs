//! Grid coordinates, the eight search directions and straight-line math.
//!
//! Rows grow downwards and columns grow to the right. A direction's `dx`
//! moves columns and its `dy` moves rows.

use serde::{Deserialize, Serialize};
use tracing::instrument;

/// Largest row or column index a span or selection may name.
pub const MAX_COORDINATE: i32 = u16::MAX as i32;

/// A cell on the board.
///
/// Coordinates are signed so that a projection past the edge of the board can
/// be represented and reported instead of wrapping around.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Cell {
    /// Row index (0 is the top row).
    pub row: i32,
    /// Column index (0 is the leftmost column).
    pub col: i32,
}

impl Cell {
    /// Creates a new cell.
    pub const fn new(row: i32, col: i32) -> Self {
        Self { row, col }
    }

    /// Returns true if the cell lies inside a `width × height` board.
    pub fn is_within(self, width: usize, height: usize) -> bool {
        self.row >= 0
            && self.col >= 0
            && (self.row as usize) < height
            && (self.col as usize) < width
    }

    /// Returns true if both coordinates lie in `0..=MAX_COORDINATE`.
    pub fn is_addressable(self) -> bool {
        (0..=MAX_COORDINATE).contains(&self.row) && (0..=MAX_COORDINATE).contains(&self.col)
    }

    /// Moves the cell `n` steps along `(d_row, d_col)`, saturating at the
    /// `i32` limits.
    pub fn offset(self, d_row: i32, d_col: i32, n: i32) -> Self {
        Self::new(
            self.row.saturating_add(d_row.saturating_mul(n)),
            self.col.saturating_add(d_col.saturating_mul(n)),
        )
    }
}

impl From<(i32, i32)> for Cell {
    fn from((row, col): (i32, i32)) -> Self {
        Self::new(row, col)
    }
}

impl std::fmt::Display for Cell {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

/// One of the eight directions a word can run in.
///
/// The discriminant is the stable index used on the wire.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    Serialize,
    Deserialize,
    strum::EnumIter,
    strum::Display,
)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    /// Left to right.
    #[default]
    #[strum(to_string = "Horizontal →")]
    Right = 0,
    /// Right to left.
    #[strum(to_string = "Horizontal ←")]
    Left = 1,
    /// Top to bottom.
    #[strum(to_string = "Vertical ↓")]
    Down = 2,
    /// Bottom to top.
    #[strum(to_string = "Vertical ↑")]
    Up = 3,
    /// Towards the bottom-right corner.
    #[strum(to_string = "Diagonal ↘")]
    DownRight = 4,
    /// Towards the top-left corner.
    #[strum(to_string = "Diagonal ↖")]
    UpLeft = 5,
    /// Towards the top-right corner.
    #[strum(to_string = "Diagonal ↗")]
    UpRight = 6,
    /// Towards the bottom-left corner.
    #[strum(to_string = "Diagonal ↙")]
    DownLeft = 7,
}

impl Direction {
    /// All directions in index order.
    pub const ALL: [Direction; 8] = [
        Direction::Right,
        Direction::Left,
        Direction::Down,
        Direction::Up,
        Direction::DownRight,
        Direction::UpLeft,
        Direction::UpRight,
        Direction::DownLeft,
    ];

    /// Looks a direction up by its stable index (0-7).
    #[instrument]
    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    /// Returns the stable index (0-7).
    pub fn index(self) -> usize {
        self as usize
    }

    /// Returns the unit vector `(dx, dy)`.
    pub fn delta(self) -> (i32, i32) {
        match self {
            Direction::Right => (1, 0),
            Direction::Left => (-1, 0),
            Direction::Down => (0, 1),
            Direction::Up => (0, -1),
            Direction::DownRight => (1, 1),
            Direction::UpLeft => (-1, -1),
            Direction::UpRight => (1, -1),
            Direction::DownLeft => (-1, 1),
        }
    }

    /// Finds the direction whose unit step is `(d_row, d_col)`.
    pub fn from_step(d_row: i32, d_col: i32) -> Option<Self> {
        Self::ALL
            .iter()
            .copied()
            .find(|dir| dir.delta() == (d_col, d_row))
    }

    /// Returns the opposite direction.
    pub fn reversed(self) -> Self {
        match self {
            Direction::Right => Direction::Left,
            Direction::Left => Direction::Right,
            Direction::Down => Direction::Up,
            Direction::Up => Direction::Down,
            Direction::DownRight => Direction::UpLeft,
            Direction::UpLeft => Direction::DownRight,
            Direction::UpRight => Direction::DownLeft,
            Direction::DownLeft => Direction::UpRight,
        }
    }
}

/// Projects the last cell of a run of `length` cells starting at `start`.
///
/// A zero length is treated like a single cell.
#[instrument]
pub fn project(start: Cell, direction: Direction, length: usize) -> Cell {
    let (dx, dy) = direction.delta();
    let n = i32::try_from(length.saturating_sub(1)).unwrap_or(i32::MAX);
    start.offset(dy, dx, n)
}

/// A straight line between two cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Line {
    /// Number of unit steps from the first cell to the last.
    pub steps: u32,
    /// Total row delta.
    pub d_row: i32,
    /// Total column delta.
    pub d_col: i32,
}

impl Line {
    /// Unit step `(row, col)`; `(0, 0)` for a zero-length line.
    pub fn unit(&self) -> (i32, i32) {
        (self.d_row.signum(), self.d_col.signum())
    }

    /// Direction of travel, `None` for a zero-length line.
    pub fn direction(&self) -> Option<Direction> {
        let (r, c) = self.unit();
        Direction::from_step(r, c)
    }

    /// Enumerates every cell from `start` to the far end, both included.
    pub fn cells(&self, start: Cell) -> Vec<Cell> {
        let (r, c) = self.unit();
        let last = i32::try_from(self.steps).unwrap_or(i32::MAX);
        (0..=last).map(|i| start.offset(r, c, i)).collect()
    }
}

/// Computes the line joining `a` and `b`.
///
/// Returns `None` when the cells are not on a horizontal, vertical or exact
/// diagonal line, or when they are too far apart for an `i32` delta.
#[instrument]
pub fn steps_between(a: Cell, b: Cell) -> Option<Line> {
    let d_row = b.row.checked_sub(a.row)?;
    let d_col = b.col.checked_sub(a.col)?;
    let (rows, cols) = (d_row.checked_abs()?, d_col.checked_abs()?);
    if rows != 0 && cols != 0 && rows != cols {
        return None;
    }
    Some(Line {
        steps: rows.max(cols).unsigned_abs(),
        d_row,
        d_col,
    })
}
