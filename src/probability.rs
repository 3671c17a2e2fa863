//! Probability aggregation over a whole grid.
//!
//! Every edge is solved (exactly, or by subset approximation once it reaches
//! the size limit) and its probabilities are written into a fresh map. The
//! remaining unknown squares share a uniform background probability. The
//! search only reads the grid; the caller applies the resulting moves.

use crate::board::GridView;
use crate::config::SolverConfig;
use crate::edges::{find_edges, Edge};
use crate::enumerate::{constraints_for, solve_exact, EdgeSolution};
use crate::error::SolverError;
use crate::subsets::approximate;
use crate::types::{squares, ProbabilityMap, Square};

/// Result of one full edge search.
#[derive(Clone, Debug, PartialEq)]
pub struct EdgeSearch {
    pub probabilities: ProbabilityMap,
    /// Unknown squares with probability exactly 0, row-major.
    pub safe: Vec<Square>,
    /// Unknown squares with probability exactly 1, row-major.
    pub mines: Vec<Square>,
    /// Probability given to unknown squares outside every solved edge.
    pub background: f64,
    /// Edges that produced probabilities.
    pub solved_edges: usize,
}

/// Solve one edge, choosing the exact or approximate path by size.
///
/// Returns `None` when the edge is too large and approximation is disabled.
pub fn solve_edge<G: GridView + ?Sized>(
    grid: &G,
    edge: &Edge,
    config: &SolverConfig,
) -> Result<Option<EdgeSolution>, SolverError> {
    let constraints = constraints_for(grid, edge);

    if edge.len() < config.edge_limit {
        return solve_exact(edge, &constraints).map(Some);
    }
    if config.subset_approximation {
        log::debug!("Edge of {} squares too large, using subset edge search", edge.len());
        return approximate(edge, &constraints, config.edge_limit).map(Some);
    }

    log::debug!("Edge of {} squares skipped, limit is {}", edge.len(), config.edge_limit);
    Ok(None)
}

/// Uniform mine probability for unknown squares outside every edge.
///
/// The edge estimate is ignored when it leaves nothing sensible for the
/// outside squares (no outside squares, no mines left for them, or more
/// mines than squares). The fallback spreads the unflagged mines over every
/// unknown square.
pub fn background_probability(
    total_mines: usize,
    flagged: usize,
    unknown: usize,
    edge_squares: usize,
    edge_mines: f64,
) -> f64 {
    if unknown == 0 {
        return 0.0;
    }
    let remaining = total_mines as f64 - flagged as f64;
    let fallback = (remaining / unknown as f64).clamp(0.0, 1.0);

    let outside = unknown.saturating_sub(edge_squares);
    if outside == 0 {
        return fallback;
    }
    let numerator = remaining - edge_mines;
    let denominator = outside as f64;
    if numerator <= 0.0 || numerator >= denominator {
        return fallback;
    }
    numerator / denominator
}

/// Recompute the full probability map of `grid`.
///
/// Revealed squares map to 0 and flagged squares to 1; neither is ever
/// reported as a move.
pub fn edge_search<G: GridView + ?Sized>(grid: &G, config: &SolverConfig) -> Result<EdgeSearch, SolverError> {
    let (rows, cols) = (grid.rows(), grid.cols());
    let mut probabilities = ProbabilityMap::new(rows, cols);
    let mut flagged = 0;
    let mut unknown = 0;

    for sq in squares(rows, cols) {
        if grid.is_flagged_mine(sq) {
            flagged += 1;
            probabilities.set(sq, 1.0);
        } else if !grid.is_known(sq) {
            unknown += 1;
        }
    }
    if flagged > grid.total_mines() {
        return Err(SolverError::FlagsExceedMines {
            flagged,
            mines: grid.total_mines(),
        });
    }

    let mut in_edge = vec![false; rows * cols];
    let mut edge_squares = 0;
    let mut edge_mines = 0.0;
    let mut solved_edges = 0;

    for edge in find_edges(grid) {
        log::debug!("Updating probability for edge: {:?}", edge);
        let Some(solution) = solve_edge(grid, &edge, config)? else {
            continue;
        };
        if solution.squares.is_empty() {
            log::debug!("No subset fits the limit, edge gives no information");
            continue;
        }

        solved_edges += 1;
        edge_squares += solution.squares.len();
        edge_mines += solution.expected_mines;
        for (sq, p) in solution.iter() {
            probabilities.set(sq, p);
            in_edge[sq.0 * cols + sq.1] = true;
        }
    }

    let background = background_probability(grid.total_mines(), flagged, unknown, edge_squares, edge_mines);
    log::debug!(
        "{} edge squares, {:.3} expected edge mines, background probability {:.4}",
        edge_squares,
        edge_mines,
        background
    );

    let mut safe = Vec::new();
    let mut mines = Vec::new();
    for sq in squares(rows, cols) {
        if grid.is_known(sq) {
            continue;
        }
        if !in_edge[sq.0 * cols + sq.1] {
            probabilities.set(sq, background);
        }
        let p = probabilities.get(sq);
        if p == 0.0 {
            safe.push(sq);
        } else if p == 1.0 {
            mines.push(sq);
        }
    }

    Ok(EdgeSearch {
        probabilities,
        safe,
        mines,
        background,
        solved_edges,
    })
}
