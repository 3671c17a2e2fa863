//! Error type shared by the solver, the board and configuration loading.

use thiserror::Error;

use crate::types::Square;

#[derive(Debug, Error)]
pub enum SolverError {
    /// No assignment satisfies the revealed counts. The board bookkeeping is
    /// broken; retrying cannot help.
    #[error("contradictory board: no consistent assignment around constraint {constraint:?}")]
    Contradiction { constraint: Square },

    /// The grid carries more flags than the board has mines.
    #[error("contradictory board: {flagged} squares flagged but only {mines} mines")]
    FlagsExceedMines { flagged: usize, mines: usize },

    #[error("edge size limit must be in 1..={max}, got {limit}")]
    InvalidEdgeLimit { limit: usize, max: usize },

    #[error("invalid board: {rows}x{cols} with {mines} mines")]
    InvalidBoard { rows: usize, cols: usize, mines: usize },

    #[error("invalid seed: {0}")]
    InvalidSeed(String),

    #[error("invalid layout: {0}")]
    InvalidLayout(String),

    #[error("square ({row}, {col}) is outside the board")]
    OutOfBounds { row: usize, col: usize },

    #[error("no unknown square is left but the game is not won")]
    NoMoveAvailable,

    #[error("invalid configuration: {0}")]
    Config(#[from] serde_json::Error),
}
