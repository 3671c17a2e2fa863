//! Exact edge solver.
//!
//! Every mine/safe assignment of an edge is tried as a bit mask. An assignment
//! is consistent when each constraint sees exactly its remaining count of
//! mines among the edge squares it touches.

use std::collections::{HashMap, HashSet};

use crate::board::{adjacent, GridView};
use crate::error::SolverError;
use crate::types::{Filter, Square};

/// A revealed square and the mines it still needs among its unknown neighbors.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Constraint {
    pub square: Square,
    /// Adjacent count minus adjacent flags.
    pub remaining: i32,
    /// Unknown neighbors, in direction order.
    pub neighbors: Vec<Square>,
}

/// Distinct revealed squares bordering `edge`, in the order they are first
/// met (edge order, then direction order).
pub fn constraints_for<G: GridView + ?Sized>(grid: &G, edge: &[Square]) -> Vec<Constraint> {
    let mut seen = HashSet::new();
    let mut constraints = Vec::new();

    for &sq in edge {
        for square in adjacent(grid, sq, Filter::Safe) {
            if !seen.insert(square) {
                continue;
            }
            let flagged = adjacent(grid, square, Filter::Flagged).count() as i32;
            constraints.push(Constraint {
                square,
                remaining: grid.adjacent_mine_count(square) as i32 - flagged,
                neighbors: adjacent(grid, square, Filter::Unknown).collect(),
            });
        }
    }

    constraints
}

/// Raw enumeration counts over one list of squares.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Tally {
    /// Number of consistent assignments, never zero.
    pub consistent: u64,
    /// Per square, the consistent assignments in which it is a mine.
    pub mine_counts: Vec<u64>,
    /// Mines summed over all consistent assignments.
    pub total_mines: u64,
}

/// Try all `2^n` assignments of `squares` against `constraints`.
///
/// Constraint neighbors missing from `squares` are ignored. Zero consistent
/// assignments means the board itself is contradictory.
pub fn enumerate<'a, I>(squares: &[Square], constraints: I) -> Result<Tally, SolverError>
where
    I: IntoIterator<Item = &'a Constraint>,
{
    debug_assert!(squares.len() < 64, "edge of {} squares cannot be masked", squares.len());

    let index: HashMap<Square, usize> = squares.iter().enumerate().map(|(i, &sq)| (sq, i)).collect();

    let mut first = None;
    let checks: Vec<(u64, i32)> = constraints
        .into_iter()
        .map(|c| {
            first.get_or_insert(c.square);
            let members = c
                .neighbors
                .iter()
                .filter_map(|sq| index.get(sq))
                .fold(0u64, |mask, &i| mask | (1 << i));
            (members, c.remaining)
        })
        .collect();

    let mut tally = Tally {
        consistent: 0,
        mine_counts: vec![0; squares.len()],
        total_mines: 0,
    };

    for mask in 0..(1u64 << squares.len()) {
        let valid = checks
            .iter()
            .all(|&(members, remaining)| (mask & members).count_ones() as i32 == remaining);
        if !valid {
            continue;
        }

        tally.consistent += 1;
        tally.total_mines += mask.count_ones() as u64;
        let mut bits = mask;
        while bits != 0 {
            let i = bits.trailing_zeros() as usize;
            tally.mine_counts[i] += 1;
            bits &= bits - 1;
        }
    }

    if tally.consistent == 0 {
        return Err(SolverError::Contradiction {
            constraint: first.unwrap_or_default(),
        });
    }
    Ok(tally)
}

/// Per-square mine probabilities for one solved edge.
#[derive(Clone, Debug, PartialEq)]
pub struct EdgeSolution {
    pub squares: Vec<Square>,
    pub probabilities: Vec<f64>,
    pub expected_mines: f64,
}

impl EdgeSolution {
    /// Edge squares paired with their probability.
    pub fn iter(&self) -> impl Iterator<Item = (Square, f64)> + '_ {
        self.squares.iter().copied().zip(self.probabilities.iter().copied())
    }
}

/// Solve `edge` exactly.
pub fn solve_exact(edge: &[Square], constraints: &[Constraint]) -> Result<EdgeSolution, SolverError> {
    let tally = enumerate(edge, constraints)?;
    log::debug!(
        "{} consistent assignments over {} squares",
        tally.consistent,
        edge.len()
    );

    let total = tally.consistent as f64;
    Ok(EdgeSolution {
        squares: edge.to_vec(),
        probabilities: tally.mine_counts.iter().map(|&n| n as f64 / total).collect(),
        expected_mines: tally.total_mines as f64 / total,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::{Board, GridState};
    use crate::config::BoardConfig;
    use crate::edges::find_edges;
    use crate::rng::BoardRng;
    use crate::types::opening_square;
    use crate::snapshot::{GridSnapshot, HIDDEN};

    fn solve(board: &Board) -> Vec<EdgeSolution> {
        find_edges(board)
            .iter()
            .map(|edge| solve_exact(edge, &constraints_for(board, edge)).unwrap())
            .collect()
    }

    #[test]
    fn test_constraint_remaining_subtracts_flags() {
        let board = Board::parse(&["1F.", "11."]).unwrap();
        let edge = vec![(0, 2), (1, 2)];
        let constraints = constraints_for(&board, &edge);
        assert_eq!(constraints.len(), 1);
        assert_eq!(constraints[0].square, (1, 1));
        assert_eq!(constraints[0].remaining, 0);
        assert_eq!(constraints[0].neighbors, vec![(1, 2), (0, 2)]);
    }

    #[test]
    fn test_one_mine_between_two_squares() {
        let board = Board::parse(&[".1*"]).unwrap();
        let solutions = solve(&board);
        assert_eq!(solutions.len(), 1);
        assert_eq!(solutions[0].squares, vec![(0, 0), (0, 2)]);
        assert_eq!(solutions[0].probabilities, vec![0.5, 0.5]);
        assert_eq!(solutions[0].expected_mines, 1.0);
    }

    #[test]
    fn test_forced_pattern_is_certain() {
        let board = Board::parse(&["121", "*.*"]).unwrap();
        let solutions = solve(&board);
        assert_eq!(solutions.len(), 1);
        let solution = &solutions[0];
        assert_eq!(solution.squares, vec![(1, 0), (1, 1), (1, 2)]);
        assert_eq!(solution.probabilities, vec![1.0, 0.0, 1.0]);
        assert_eq!(solution.expected_mines, 2.0);
    }

    #[test]
    fn test_tally_counts_assignments() {
        let board = Board::parse(&[".1.", "..*"]).unwrap();
        let edge = find_edges(&board).remove(0);
        let tally = enumerate(&edge, &constraints_for(&board, &edge)).unwrap();
        // One mine among the five hidden neighbors of the middle square.
        assert_eq!(edge.len(), 5);
        assert_eq!(tally.consistent, 5);
        assert_eq!(tally.total_mines, 5);
        assert!(tally.mine_counts.iter().all(|&n| n == 1));
    }

    #[test]
    fn test_contradiction_is_an_error() {
        let snap = GridSnapshot::new(1, 3, 2, vec![HIDDEN, 3, HIDDEN]).unwrap();
        let edge = vec![(0, 0), (0, 2)];
        let result = solve_exact(&edge, &constraints_for(&snap, &edge));
        assert!(matches!(
            result,
            Err(SolverError::Contradiction { constraint: (0, 1) })
        ));
    }

    #[test]
    fn test_probabilities_stay_in_bounds() {
        let mut rng = BoardRng::from_seed(7);
        for _ in 0..30 {
            let mut board = Board::random(BoardConfig::new(6, 6, 7).unwrap(), &mut rng);
            board.reveal(opening_square(board.rows(), board.cols()));
            for edge in find_edges(&board) {
                if edge.len() > 16 {
                    continue;
                }
                let solution = solve_exact(&edge, &constraints_for(&board, &edge)).unwrap();
                for (sq, p) in solution.iter() {
                    assert!((0.0..=1.0).contains(&p), "{:?} has probability {}", sq, p);
                    if p == 0.0 {
                        assert!(!board.status(sq).is_mine(), "{:?} reported safe", sq);
                    }
                    if p == 1.0 {
                        assert!(board.status(sq).is_mine(), "{:?} reported mine", sq);
                    }
                }
                assert!(solution.expected_mines >= 0.0);
                assert!(solution.expected_mines <= edge.len() as f64);
            }
        }
    }
}
