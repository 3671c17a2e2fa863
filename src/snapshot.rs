//! A grid rebuilt from flat status arrays.
//!
//! The wasm bindings hand over the visible board as one `i8` per square
//! (row-major): `-1` hidden, `-2` flagged, `0..=8` revealed count. Moves made
//! on a snapshot are recorded instead of applied so the caller can replay them
//! on its own board.

use serde::Serialize;

use crate::board::{GridState, GridView};
use crate::error::SolverError;
use crate::types::{MoveResult, Square};

pub const HIDDEN: i8 = -1;
pub const FLAGGED: i8 = -2;

/// Moves recorded during one selection cycle on a snapshot.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct PlannedMove {
    pub reveal: Option<Square>,
    pub flags: Vec<Square>,
}

#[derive(Clone, Debug)]
pub struct GridSnapshot {
    rows: usize,
    cols: usize,
    mines: usize,
    cells: Vec<i8>,
    planned: PlannedMove,
}

impl GridSnapshot {
    pub fn new(rows: usize, cols: usize, mines: usize, cells: Vec<i8>) -> Result<Self, SolverError> {
        if cells.len() != rows * cols {
            return Err(SolverError::InvalidLayout(format!(
                "expected {} squares, got {}",
                rows * cols,
                cells.len()
            )));
        }
        if let Some(bad) = cells.iter().find(|&&v| !(FLAGGED..=8).contains(&v)) {
            return Err(SolverError::InvalidLayout(format!("unexpected square value {}", bad)));
        }
        Ok(Self {
            rows,
            cols,
            mines,
            cells,
            planned: PlannedMove::default(),
        })
    }

    pub fn into_planned(self) -> PlannedMove {
        self.planned
    }

    #[inline(always)]
    fn get(&self, square: Square) -> i8 {
        self.cells[square.0 * self.cols + square.1]
    }
}

impl GridView for GridSnapshot {
    fn rows(&self) -> usize {
        self.rows
    }

    fn cols(&self) -> usize {
        self.cols
    }

    fn total_mines(&self) -> usize {
        self.mines
    }

    fn is_known(&self, square: Square) -> bool {
        self.get(square) != HIDDEN
    }

    fn is_safe(&self, square: Square) -> bool {
        self.get(square) >= 0
    }

    fn is_flagged_mine(&self, square: Square) -> bool {
        self.get(square) == FLAGGED
    }

    fn adjacent_mine_count(&self, square: Square) -> u8 {
        self.get(square).max(0) as u8
    }
}

impl GridState for GridSnapshot {
    /// The true layout is unknown here, so the reveal is only recorded.
    fn reveal(&mut self, square: Square) -> MoveResult {
        self.planned.reveal = Some(square);
        MoveResult::Continue
    }

    fn flag_as_mine(&mut self, square: Square) {
        let idx = square.0 * self.cols + square.1;
        if self.cells[idx] == HIDDEN {
            self.cells[idx] = FLAGGED;
            self.planned.flags.push(square);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snapshot_queries() {
        let snap = GridSnapshot::new(1, 3, 1, vec![HIDDEN, 1, FLAGGED]).unwrap();
        assert!(!snap.is_known((0, 0)));
        assert!(snap.is_safe((0, 1)));
        assert!(snap.is_known((0, 2)));
        assert!(snap.is_flagged_mine((0, 2)));
        assert!(!snap.is_safe((0, 2)));
        assert_eq!(snap.adjacent_mine_count((0, 1)), 1);
    }

    #[test]
    fn test_snapshot_rejects_bad_input() {
        assert!(GridSnapshot::new(2, 2, 1, vec![HIDDEN; 3]).is_err());
        assert!(GridSnapshot::new(1, 2, 1, vec![HIDDEN, 9]).is_err());
        assert!(GridSnapshot::new(1, 2, 1, vec![-3, 0]).is_err());
    }

    #[test]
    fn test_snapshot_records_moves() {
        let mut snap = GridSnapshot::new(1, 3, 1, vec![HIDDEN, 1, HIDDEN]).unwrap();
        snap.flag_as_mine((0, 0));
        snap.flag_as_mine((0, 0));
        snap.flag_as_mine((0, 1));
        assert_eq!(snap.reveal((0, 2)), MoveResult::Continue);
        assert!(snap.is_flagged_mine((0, 0)));
        assert_eq!(
            snap.into_planned(),
            PlannedMove {
                reveal: Some((0, 2)),
                flags: vec![(0, 0)],
            }
        );
    }
}
