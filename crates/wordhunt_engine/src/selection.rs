//! Turning pointer drags into straight-line cell paths.

use crate::geometry::{Cell, MAX_COORDINATE, steps_between};
use serde::{Deserialize, Serialize};
use tracing::{instrument, trace};

/// Straight, duplicate-free run of cells starting where the drag began.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectionPath(Vec<Cell>);

impl SelectionPath {
    /// A path holding only the anchor cell.
    pub fn single(cell: Cell) -> Self {
        Self(vec![cell])
    }

    /// The line from `start` to `end`, or `None` if they are not collinear
    /// or span more than [`MAX_COORDINATE`] steps.
    pub fn between(start: Cell, end: Cell) -> Option<Self> {
        steps_between(start, end)
            .filter(|line| line.steps <= MAX_COORDINATE.unsigned_abs())
            .map(|line| Self(line.cells(start)))
    }

    /// Wraps cells as given, without checking them.
    ///
    /// Useful to feed the resolver paths a drag could never produce.
    pub fn from_cells_unchecked(cells: Vec<Cell>) -> Self {
        Self(cells)
    }

    /// First cell.
    pub fn first(&self) -> Option<Cell> {
        self.0.first().copied()
    }

    /// Last cell.
    pub fn last(&self) -> Option<Cell> {
        self.0.last().copied()
    }

    /// Number of cells.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true if there are no cells.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Cells in drag order.
    pub fn cells(&self) -> &[Cell] {
        &self.0
    }

    /// Returns true if `cell` lies on the path.
    pub fn contains(&self, cell: Cell) -> bool {
        self.0.contains(&cell)
    }
}

/// Selection state machine: `Idle` or `Selecting`.
///
/// The path is always a function of the anchor and the latest collinear
/// target, never of the cells passed over on the way.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SelectionTracker {
    bounds: Option<(usize, usize)>,
    path: Option<SelectionPath>,
}

impl SelectionTracker {
    /// A tracker that accepts any cell.
    pub fn new() -> Self {
        Self::default()
    }

    /// A tracker that ignores cells outside a `width × height` board.
    pub fn bounded(width: usize, height: usize) -> Self {
        Self {
            bounds: Some((width, height)),
            path: None,
        }
    }

    fn accepts(&self, cell: Cell) -> bool {
        self.bounds.is_none_or(|(w, h)| cell.is_within(w, h))
    }

    /// Returns true while a drag is in progress.
    pub fn is_selecting(&self) -> bool {
        self.path.is_some()
    }

    /// Current path, if selecting.
    pub fn path(&self) -> Option<&SelectionPath> {
        self.path.as_ref()
    }

    /// Pointer down: starts a new path at `cell`, dropping any old one.
    #[instrument(skip(self))]
    pub fn begin(&mut self, cell: Cell) {
        if self.accepts(cell) {
            self.path = Some(SelectionPath::single(cell));
        }
    }

    /// Pointer moved over `cell`.
    ///
    /// Returns true if the path changed. Idle trackers, off-board cells and
    /// cells not in line with the anchor leave the path alone.
    #[instrument(skip(self))]
    pub fn extend(&mut self, cell: Cell) -> bool {
        if !self.accepts(cell) {
            return false;
        }
        let Some(anchor) = self.path.as_ref().and_then(SelectionPath::first) else {
            return false;
        };
        match SelectionPath::between(anchor, cell) {
            Some(next) if self.path.as_ref() != Some(&next) => {
                trace!(len = next.len(), "Selection path replaced");
                self.path = Some(next);
                true
            }
            _ => false,
        }
    }

    /// Pointer up: returns the finished path and goes idle.
    pub fn end(&mut self) -> Option<SelectionPath> {
        self.path.take()
    }

    /// Pointer left the board: discards the path.
    pub fn cancel(&mut self) {
        self.path = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cells(coords: &[(i32, i32)]) -> Vec<Cell> {
        coords.iter().copied().map(Cell::from).collect()
    }

    #[test]
    fn test_begin_then_end_yields_single_cell() {
        let mut tracker = SelectionTracker::new();
        tracker.begin(Cell::new(2, 1));
        assert!(tracker.is_selecting());
        let path = tracker.end().expect("was selecting");
        assert_eq!(path.cells(), &[Cell::new(2, 1)]);
        assert!(!tracker.is_selecting());
        assert_eq!(tracker.end(), None);
    }

    #[test]
    fn test_extend_replaces_with_full_line() {
        let mut tracker = SelectionTracker::new();
        tracker.begin(Cell::new(2, 1));
        assert!(tracker.extend(Cell::new(2, 3)));
        assert_eq!(tracker.path().map(SelectionPath::cells), Some(cells(&[(2, 1), (2, 2), (2, 3)]).as_slice()));

        // Jitter back to a shorter target shrinks the path.
        assert!(tracker.extend(Cell::new(2, 2)));
        assert_eq!(tracker.path().map(SelectionPath::len), Some(2));

        // Swinging to a diagonal rebuilds from the anchor.
        assert!(tracker.extend(Cell::new(0, 3)));
        assert_eq!(tracker.path().map(SelectionPath::cells), Some(cells(&[(2, 1), (1, 2), (0, 3)]).as_slice()));
    }

    #[test]
    fn test_extend_ignores_non_collinear_targets() {
        let mut tracker = SelectionTracker::new();
        tracker.begin(Cell::new(2, 1));
        tracker.extend(Cell::new(2, 3));
        let before = tracker.clone();
        assert!(!tracker.extend(Cell::new(3, 4)));
        assert_eq!(tracker, before);
        assert!(!tracker.extend(Cell::new(4, 2)));
        assert_eq!(tracker, before);
    }

    #[test]
    fn test_extend_while_idle_is_noop() {
        let mut tracker = SelectionTracker::new();
        assert!(!tracker.extend(Cell::new(1, 1)));
        assert!(!tracker.is_selecting());
    }

    #[test]
    fn test_cancel_discards_path() {
        let mut tracker = SelectionTracker::new();
        tracker.begin(Cell::new(0, 0));
        tracker.extend(Cell::new(3, 3));
        tracker.cancel();
        assert_eq!(tracker.end(), None);
    }

    #[test]
    fn test_bounded_tracker_ignores_off_board_cells() {
        let mut tracker = SelectionTracker::bounded(4, 4);
        tracker.begin(Cell::new(4, 0));
        assert!(!tracker.is_selecting());
        tracker.begin(Cell::new(0, 0));
        assert!(!tracker.extend(Cell::new(0, 4)));
        assert!(tracker.extend(Cell::new(0, 3)));
    }

    #[test]
    fn test_path_between() {
        assert_eq!(SelectionPath::between(Cell::new(0, 0), Cell::new(1, 2)), None);
        let path = SelectionPath::between(Cell::new(3, 0), Cell::new(0, 0)).expect("vertical");
        assert_eq!(path.first(), Some(Cell::new(3, 0)));
        assert_eq!(path.last(), Some(Cell::new(0, 0)));
        assert!(path.contains(Cell::new(1, 0)));
    }

    #[test]
    fn test_path_between_far_cells_is_refused() {
        assert_eq!(SelectionPath::between(Cell::new(0, i32::MIN), Cell::new(0, i32::MAX)), None);
        assert_eq!(SelectionPath::between(Cell::new(0, 0), Cell::new(0, i32::MAX)), None);

        let longest = SelectionPath::between(Cell::new(0, 0), Cell::new(0, MAX_COORDINATE)).expect("in range");
        assert_eq!(longest.len(), MAX_COORDINATE as usize + 1);
        assert_eq!(longest.last(), Some(Cell::new(0, MAX_COORDINATE)));
    }

    #[test]
    fn test_unbounded_tracker_ignores_far_targets() {
        let mut tracker = SelectionTracker::new();
        tracker.begin(Cell::new(0, 0));
        assert!(!tracker.extend(Cell::new(0, i32::MAX)));
        assert_eq!(tracker.path().map(SelectionPath::len), Some(1));
    }
}
