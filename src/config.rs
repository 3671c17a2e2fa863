//! Solver and board configuration.
//!
//! Both structs are validated when they are built, so a bad limit or an
//! impossible board is rejected before any search starts.

use serde::Deserialize;

use crate::error::SolverError;

/// Largest accepted edge size limit. Enumeration uses `u64` bit masks and its
/// cost doubles per square, so the limit is also the latency bound.
pub const MAX_EDGE_LIMIT: usize = 24;

/// Default edge size limit.
pub const DEFAULT_EDGE_LIMIT: usize = 10;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct SolverConfig {
    /// Edges of at least this many squares are not enumerated exactly.
    pub edge_limit: usize,
    /// Decompose oversized edges into bounded subsets instead of skipping them.
    pub subset_approximation: bool,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            edge_limit: DEFAULT_EDGE_LIMIT,
            subset_approximation: true,
        }
    }
}

impl SolverConfig {
    pub fn new(edge_limit: usize, subset_approximation: bool) -> Result<Self, SolverError> {
        let config = Self {
            edge_limit,
            subset_approximation,
        };
        config.validate()?;
        Ok(config)
    }

    /// Parse a JSON document such as `{"edge_limit": 12}`. Missing fields
    /// take their defaults.
    pub fn from_json(text: &str) -> Result<Self, SolverError> {
        let config: Self = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), SolverError> {
        if self.edge_limit == 0 || self.edge_limit > MAX_EDGE_LIMIT {
            return Err(SolverError::InvalidEdgeLimit {
                limit: self.edge_limit,
                max: MAX_EDGE_LIMIT,
            });
        }
        Ok(())
    }
}

/// Board extent and mine total.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BoardConfig {
    pub rows: usize,
    pub cols: usize,
    pub mines: usize,
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self {
            rows: 9,
            cols: 9,
            mines: 10,
        }
    }
}

impl BoardConfig {
    pub fn new(rows: usize, cols: usize, mines: usize) -> Result<Self, SolverError> {
        if rows == 0 || cols == 0 || mines >= rows * cols {
            return Err(SolverError::InvalidBoard { rows, cols, mines });
        }
        Ok(Self { rows, cols, mines })
    }

    pub fn squares(&self) -> usize {
        self.rows * self.cols
    }
}
