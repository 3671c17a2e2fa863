//! Core data types for the Minesweeper bot.
//!
//! Squares are `(row, col)` tuples. Grid-shaped data uses flat `Vec` storage in
//! row-major layout: `cells[row * cols + col]`.

/// A board coordinate as `(row, col)`.
pub type Square = (usize, usize);

/// Relative neighbor offsets as `(d_row, d_col)`, in the fixed order
/// E, W, S, N, SE, NW, SW, NE.
pub const DIRECTIONS: [(isize, isize); 8] = [
    (0, 1),
    (0, -1),
    (1, 0),
    (-1, 0),
    (1, 1),
    (-1, -1),
    (1, -1),
    (-1, 1),
];

/// Lazily walk the up-to-8 neighbors of `square` that lie inside a
/// `rows` × `cols` board, always in `DIRECTIONS` order.
pub fn neighbors(square: Square, rows: usize, cols: usize) -> impl Iterator<Item = Square> {
    let (row, col) = square;
    DIRECTIONS.iter().filter_map(move |&(d_row, d_col)| {
        let r = row.checked_add_signed(d_row)?;
        let c = col.checked_add_signed(d_col)?;
        (r < rows && c < cols).then_some((r, c))
    })
}

/// Every square of a `rows` × `cols` board in row-major order.
pub fn squares(rows: usize, cols: usize) -> impl Iterator<Item = Square> {
    (0..rows).flat_map(move |r| (0..cols).map(move |c| (r, c)))
}

/// Clockwise spiral from the top-left corner: top row, right column, bottom
/// row reversed, left column upwards, then the same one ring further in.
pub fn spiral_order(rows: usize, cols: usize) -> Vec<Square> {
    let mut order = Vec::with_capacity(rows * cols);
    let (mut top, mut bottom) = (0isize, rows as isize - 1);
    let (mut left, mut right) = (0isize, cols as isize - 1);

    while top <= bottom && left <= right {
        for c in left..=right {
            order.push((top as usize, c as usize));
        }
        top += 1;
        for r in top..=bottom {
            order.push((r as usize, right as usize));
        }
        right -= 1;
        if top <= bottom {
            for c in (left..=right).rev() {
                order.push((bottom as usize, c as usize));
            }
            bottom -= 1;
        }
        if left <= right {
            for r in (top..=bottom).rev() {
                order.push((r as usize, left as usize));
            }
            left += 1;
        }
    }

    order
}

/// Square the bot opens on when nothing is known yet: every probability
/// ties, and the last square of the spiral wins the tie.
pub fn opening_square(rows: usize, cols: usize) -> Square {
    spiral_order(rows, cols).last().copied().unwrap_or((0, 0))
}

/// Cantor pairing of a square's coordinates.
#[inline(always)]
pub fn square_hash(square: Square) -> u64 {
    let (r, c) = (square.0 as u64, square.1 as u64);
    (r + c) * (r + c + 1) / 2 + c
}

/// Hash a whole set of squares.
///
/// The per-square hashes are XOR-combined, so the result does not depend on
/// iteration order: two sets with the same members always hash equally no
/// matter how they were built. Distinct sets may collide, so callers must
/// still compare contents on a hash match.
pub fn hash_square_set<'a, I>(squares: I) -> u64
where
    I: IntoIterator<Item = &'a Square>,
{
    squares.into_iter().fold(0, |acc, &sq| acc ^ square_hash(sq))
}

/// Neighbor filter used by the adjacency walker on a grid.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Filter {
    /// Neither revealed nor flagged.
    Unknown,
    /// Revealed or flagged.
    Known,
    /// Revealed (carries a count).
    Safe,
    /// Flagged as a mine.
    Flagged,
}

/// Status of a single square, owned by the grid.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SquareStatus {
    UnrevealedMine,
    UnrevealedSafe,
    FlaggedMine,
    RevealedSafe,
}

impl SquareStatus {
    #[inline(always)]
    pub fn is_known(self) -> bool {
        matches!(self, SquareStatus::FlaggedMine | SquareStatus::RevealedSafe)
    }

    #[inline(always)]
    pub fn is_mine(self) -> bool {
        matches!(self, SquareStatus::UnrevealedMine | SquareStatus::FlaggedMine)
    }
}

/// Outcome of a single move.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MoveResult {
    Win,
    Continue,
    Loss,
}

impl MoveResult {
    /// `Win` and `Loss` end the game until the board is reset.
    pub fn is_terminal(self) -> bool {
        self != MoveResult::Continue
    }
}

/// Per-square mine probability, owned by one bot instance.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ProbabilityMap {
    pub rows: usize,
    pub cols: usize,
    cells: Vec<f64>,
}

impl ProbabilityMap {
    pub fn new(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            cells: vec![0.0; rows * cols],
        }
    }

    /// Resize to a new board extent, discarding every stored value.
    pub fn resize(&mut self, rows: usize, cols: usize) {
        self.rows = rows;
        self.cols = cols;
        self.cells.clear();
        self.cells.resize(rows * cols, 0.0);
    }

    #[inline(always)]
    pub fn get(&self, square: Square) -> f64 {
        self.cells[square.0 * self.cols + square.1]
    }

    #[inline(always)]
    pub fn set(&mut self, square: Square, p: f64) {
        self.cells[square.0 * self.cols + square.1] = p;
    }

    /// All `(square, probability)` pairs in row-major order.
    pub fn iter(&self) -> impl Iterator<Item = (Square, f64)> + '_ {
        let cols = self.cols.max(1);
        self.cells
            .iter()
            .enumerate()
            .map(move |(i, &p)| ((i / cols, i % cols), p))
    }

    /// Raw row-major values.
    pub fn as_slice(&self) -> &[f64] {
        &self.cells
    }
}
