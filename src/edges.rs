//! Edge detection.
//!
//! An edge is a maximal set of unknown squares linked through shared revealed
//! neighbors. Edges never overlap, and two different edges share no
//! constraint, so each can be solved on its own. Unknown squares with no
//! revealed neighbor belong to no edge.

use std::collections::VecDeque;

use crate::board::{adjacent, GridView};
use crate::types::{squares, Filter, Square};

/// Unknown squares in breadth-first discovery order.
pub type Edge = Vec<Square>;

/// Partition the constrained unknown squares of `grid` into edges.
///
/// The outer scan is row-major and the frontier is FIFO, so the same board
/// always yields the same edges in the same order.
pub fn find_edges<G: GridView + ?Sized>(grid: &G) -> Vec<Edge> {
    let (rows, cols) = (grid.rows(), grid.cols());
    // Unknown squares already placed (or rejected).
    let mut visited = vec![false; rows * cols];
    // Revealed squares whose unknown neighbors were already queued.
    let mut absorbed = vec![false; rows * cols];
    let mut edges = Vec::new();

    for start in squares(rows, cols) {
        if visited[start.0 * cols + start.1] || grid.is_known(start) {
            continue;
        }

        let mut edge = Vec::new();
        let mut frontier = VecDeque::from([start]);

        while let Some(sq) = frontier.pop_front() {
            let idx = sq.0 * cols + sq.1;
            if visited[idx] {
                continue;
            }
            visited[idx] = true;

            let mut constrained = false;
            for constraint in adjacent(grid, sq, Filter::Safe) {
                constrained = true;
                let c_idx = constraint.0 * cols + constraint.1;
                if absorbed[c_idx] {
                    continue;
                }
                absorbed[c_idx] = true;
                frontier.extend(
                    adjacent(grid, constraint, Filter::Unknown)
                        .filter(|&(r, c)| !visited[r * cols + c]),
                );
            }

            if constrained {
                edge.push(sq);
            }
        }

        if !edge.is_empty() {
            edges.push(edge);
        }
    }

    edges
}
