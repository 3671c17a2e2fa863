//! The grid the bot plays on.
//!
//! `GridView` and `GridState` are the only things the solver knows about a
//! board. `Board` is the in-process implementation: mine placement, adjacent
//! counts, flood-fill reveal, flagging, seeds and stats.

use std::fmt;

use crate::config::BoardConfig;
use crate::error::SolverError;
use crate::rng::BoardRng;
use crate::types::{neighbors, opening_square, Filter, MoveResult, Square, SquareStatus};

/// Read-only queries the solver needs.
pub trait GridView {
    fn rows(&self) -> usize;
    fn cols(&self) -> usize;
    fn total_mines(&self) -> usize;

    /// Revealed or flagged.
    fn is_known(&self, square: Square) -> bool;
    /// Revealed.
    fn is_safe(&self, square: Square) -> bool;
    fn is_flagged_mine(&self, square: Square) -> bool;
    /// Only meaningful for revealed squares.
    fn adjacent_mine_count(&self, square: Square) -> u8;

    fn matches(&self, square: Square, filter: Filter) -> bool {
        match filter {
            Filter::Unknown => !self.is_known(square),
            Filter::Known => self.is_known(square),
            Filter::Safe => self.is_safe(square),
            Filter::Flagged => self.is_flagged_mine(square),
        }
    }
}

/// A grid the bot can act on.
pub trait GridState: GridView {
    /// Reveal a square, flood-filling through zero counts.
    fn reveal(&mut self, square: Square) -> MoveResult;
    /// Flag a square as a mine. The flag is not checked against the layout.
    fn flag_as_mine(&mut self, square: Square);
}

/// Neighbors of `square` on `grid` that pass `filter`, in fixed direction order.
pub fn adjacent<'a, G>(grid: &'a G, square: Square, filter: Filter) -> impl Iterator<Item = Square> + 'a
where
    G: GridView + ?Sized,
{
    neighbors(square, grid.rows(), grid.cols()).filter(move |&sq| grid.matches(sq, filter))
}

// ─── Layout helpers ─────────────────────────────────────────────────────────

/// Place `config.mines` mines at random, never within `safe_radius`
/// (Chebyshev distance) of `safe`.
pub fn place_mines_random(
    config: &BoardConfig,
    safe: Square,
    safe_radius: usize,
    rng: &mut BoardRng,
) -> Vec<bool> {
    let candidates: Vec<usize> = (0..config.squares())
        .filter(|&i| {
            let (r, c) = (i / config.cols, i % config.cols);
            r.abs_diff(safe.0) > safe_radius || c.abs_diff(safe.1) > safe_radius
        })
        .collect();

    let mut mines = vec![false; config.squares()];
    for i in rng.sample_distinct(candidates, config.mines) {
        mines[i] = true;
    }
    mines
}

/// Adjacent mine count for every square (mine squares included).
pub fn calculate_numbers(rows: usize, cols: usize, mines: &[bool]) -> Vec<u8> {
    let mut counts = vec![0u8; rows * cols];
    for r in 0..rows {
        for c in 0..cols {
            counts[r * cols + c] = neighbors((r, c), rows, cols)
                .filter(|&(nr, nc)| mines[nr * cols + nc])
                .count() as u8;
        }
    }
    counts
}

/// Run-length compress a `0`/`1` layout string into `<char><run>` pairs,
/// with runs capped at 9.
pub fn compress_seed(layout: &str) -> String {
    let mut out = String::new();
    let mut chars = layout.chars().peekable();
    while let Some(ch) = chars.next() {
        let mut run = 1u32;
        while run < 9 && chars.peek() == Some(&ch) {
            chars.next();
            run += 1;
        }
        out.push(ch);
        out.push(char::from_digit(run, 10).unwrap_or('9'));
    }
    out
}

/// Expand a seed produced by [`compress_seed`].
pub fn decompress_seed(seed: &str) -> Result<String, SolverError> {
    let chars: Vec<char> = seed.chars().collect();
    if chars.len() % 2 != 0 {
        return Err(SolverError::InvalidSeed(format!("odd length {}", chars.len())));
    }
    let mut out = String::new();
    for pair in chars.chunks(2) {
        let (ch, run) = (pair[0], pair[1]);
        if ch != '0' && ch != '1' {
            return Err(SolverError::InvalidSeed(format!("unexpected square {:?}", ch)));
        }
        let run = run
            .to_digit(10)
            .filter(|&n| n > 0)
            .ok_or_else(|| SolverError::InvalidSeed(format!("bad run length {:?}", run)))?;
        for _ in 0..run {
            out.push(ch);
        }
    }
    Ok(out)
}

// ─── Board ──────────────────────────────────────────────────────────────────

/// Counters reported by the `stats` command.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BoardStats {
    pub mines_marked: usize,
    pub squares_revealed: usize,
    pub unknown_squares: usize,
    pub mines_remaining: isize,
    pub moves: usize,
}

impl fmt::Display for BoardStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Marked mines: {}", self.mines_marked)?;
        writeln!(f, "Revealed squares: {}", self.squares_revealed)?;
        writeln!(f, "Unknown squares: {}", self.unknown_squares)?;
        writeln!(f, "Mines remaining: {}", self.mines_remaining)?;
        write!(f, "Moves: {}", self.moves)
    }
}

#[derive(Clone, Debug)]
pub struct Board {
    config: BoardConfig,
    status: Vec<SquareStatus>,
    counts: Vec<u8>,
    revealed: usize,
    marked: usize,
    moves: usize,
    outcome: MoveResult,
}

impl Board {
    /// Build a board from a row-major mine layout. Nothing is revealed.
    pub fn from_mines(rows: usize, cols: usize, mines: &[bool]) -> Result<Self, SolverError> {
        let total = mines.iter().filter(|&&m| m).count();
        let config = BoardConfig::new(rows, cols, total)?;
        if mines.len() != config.squares() {
            return Err(SolverError::InvalidLayout(format!(
                "expected {} squares, got {}",
                config.squares(),
                mines.len()
            )));
        }

        let status = mines
            .iter()
            .map(|&m| if m { SquareStatus::UnrevealedMine } else { SquareStatus::UnrevealedSafe })
            .collect();

        Ok(Self {
            config,
            status,
            counts: calculate_numbers(rows, cols, mines),
            revealed: 0,
            marked: 0,
            moves: 0,
            outcome: MoveResult::Continue,
        })
    }

    /// Random layout. The bot's opening square is always mine-free.
    pub fn random(config: BoardConfig, rng: &mut BoardRng) -> Self {
        let opening = opening_square(config.rows, config.cols);
        let mines = place_mines_random(&config, opening, 0, rng);
        let counts = calculate_numbers(config.rows, config.cols, &mines);
        let status = mines
            .iter()
            .map(|&m| if m { SquareStatus::UnrevealedMine } else { SquareStatus::UnrevealedSafe })
            .collect();
        Self {
            config,
            status,
            counts,
            revealed: 0,
            marked: 0,
            moves: 0,
            outcome: MoveResult::Continue,
        }
    }

    pub fn from_seed(rows: usize, cols: usize, seed: &str) -> Result<Self, SolverError> {
        let layout = decompress_seed(seed)?;
        if layout.len() != rows * cols {
            return Err(SolverError::InvalidSeed(format!(
                "seed covers {} squares, board has {}",
                layout.len(),
                rows * cols
            )));
        }
        let mines: Vec<bool> = layout.chars().map(|ch| ch == '1').collect();
        Self::from_mines(rows, cols, &mines)
    }

    /// Parse a text fixture, one string per row:
    /// `.` hidden safe, `*` hidden mine, `F` flagged mine, `0`-`8` revealed
    /// (the digit must match the layout).
    pub fn parse(rows: &[&str]) -> Result<Self, SolverError> {
        let cols = rows.first().map_or(0, |r| r.chars().count());
        let mut mines = Vec::new();
        for line in rows {
            if line.chars().count() != cols {
                return Err(SolverError::InvalidLayout(format!("ragged row {:?}", line)));
            }
            mines.extend(line.chars().map(|ch| ch == '*' || ch == 'F'));
        }
        let mut board = Self::from_mines(rows.len(), cols, &mines)?;

        for (r, line) in rows.iter().enumerate() {
            for (c, ch) in line.chars().enumerate() {
                let idx = r * cols + c;
                match ch {
                    '.' | '*' => {}
                    'F' => {
                        board.status[idx] = SquareStatus::FlaggedMine;
                        board.marked += 1;
                    }
                    d if d.is_ascii_digit() => {
                        if d.to_digit(10) != Some(board.counts[idx] as u32) {
                            return Err(SolverError::InvalidLayout(format!(
                                "square ({}, {}) shows {} but has {} adjacent mines",
                                r, c, d, board.counts[idx]
                            )));
                        }
                        board.status[idx] = SquareStatus::RevealedSafe;
                        board.revealed += 1;
                    }
                    other => {
                        return Err(SolverError::InvalidLayout(format!("unexpected square {:?}", other)));
                    }
                }
            }
        }
        Ok(board)
    }

    /// Replace the layout with a fresh random one of the same size.
    pub fn reset(&mut self, rng: &mut BoardRng) {
        *self = Self::random(self.config, rng);
    }

    pub fn status(&self, square: Square) -> SquareStatus {
        self.status[self.index(square)]
    }

    pub fn outcome(&self) -> MoveResult {
        self.outcome
    }

    pub fn check_bounds(&self, square: Square) -> Result<(), SolverError> {
        if square.0 < self.config.rows && square.1 < self.config.cols {
            Ok(())
        } else {
            Err(SolverError::OutOfBounds {
                row: square.0,
                col: square.1,
            })
        }
    }

    /// Compressed seed of the current layout.
    pub fn seed(&self) -> String {
        let layout: String = self
            .status
            .iter()
            .map(|s| if s.is_mine() { '1' } else { '0' })
            .collect();
        compress_seed(&layout)
    }

    pub fn stats(&self) -> BoardStats {
        BoardStats {
            mines_marked: self.marked,
            squares_revealed: self.revealed,
            unknown_squares: self.config.squares() - self.revealed - self.marked,
            mines_remaining: self.config.mines as isize - self.marked as isize,
            moves: self.moves,
        }
    }

    #[inline(always)]
    fn index(&self, square: Square) -> usize {
        square.0 * self.config.cols + square.1
    }
}

impl GridView for Board {
    fn rows(&self) -> usize {
        self.config.rows
    }

    fn cols(&self) -> usize {
        self.config.cols
    }

    fn total_mines(&self) -> usize {
        self.config.mines
    }

    fn is_known(&self, square: Square) -> bool {
        self.status(square).is_known()
    }

    fn is_safe(&self, square: Square) -> bool {
        self.status(square) == SquareStatus::RevealedSafe
    }

    fn is_flagged_mine(&self, square: Square) -> bool {
        self.status(square) == SquareStatus::FlaggedMine
    }

    fn adjacent_mine_count(&self, square: Square) -> u8 {
        self.counts[self.index(square)]
    }
}

impl GridState for Board {
    fn reveal(&mut self, square: Square) -> MoveResult {
        if self.outcome.is_terminal() {
            return self.outcome;
        }
        self.moves += 1;

        if self.status(square).is_mine() {
            self.outcome = MoveResult::Loss;
            return self.outcome;
        }

        let (rows, cols) = (self.config.rows, self.config.cols);
        let mut stack = vec![square];
        while let Some(sq) = stack.pop() {
            let idx = self.index(sq);
            if self.status[idx] != SquareStatus::UnrevealedSafe {
                continue;
            }
            self.status[idx] = SquareStatus::RevealedSafe;
            self.revealed += 1;

            if self.counts[idx] == 0 {
                stack.extend(neighbors(sq, rows, cols));
            }
        }

        if self.revealed == self.config.squares() - self.config.mines {
            self.outcome = MoveResult::Win;
        }
        self.outcome
    }

    fn flag_as_mine(&mut self, square: Square) {
        let idx = self.index(square);
        match self.status[idx] {
            SquareStatus::UnrevealedMine | SquareStatus::UnrevealedSafe => {
                self.status[idx] = SquareStatus::FlaggedMine;
                self.marked += 1;
            }
            SquareStatus::FlaggedMine | SquareStatus::RevealedSafe => {}
        }
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let lost = self.outcome == MoveResult::Loss;
        for r in 0..self.config.rows {
            for c in 0..self.config.cols {
                let idx = r * self.config.cols + c;
                let ch = match self.status[idx] {
                    s if lost && s.is_mine() => 'X',
                    SquareStatus::FlaggedMine => 'F',
                    SquareStatus::RevealedSafe => char::from(b'0' + self.counts[idx]),
                    SquareStatus::UnrevealedMine | SquareStatus::UnrevealedSafe => ' ',
                };
                write!(f, "[{}]", ch)?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_place_mines_count() {
        let mut rng = BoardRng::from_seed(42);
        let config = BoardConfig::new(16, 30, 99).unwrap();
        let mines = place_mines_random(&config, (8, 15), 1, &mut rng);
        assert_eq!(mines.iter().filter(|&&m| m).count(), 99);
    }

    #[test]
    fn test_place_mines_safe_zone() {
        let mut rng = BoardRng::from_seed(42);
        let config = BoardConfig::new(10, 10, 20).unwrap();
        let mines = place_mines_random(&config, (5, 5), 2, &mut rng);

        for r in 3..=7 {
            for c in 3..=7 {
                assert!(!mines[r * 10 + c], "Mine found in safe zone at ({}, {})", r, c);
            }
        }
        assert_eq!(mines.iter().filter(|&&m| m).count(), 20);
    }

    #[test]
    fn test_random_board_keeps_opening_clear() {
        let mut rng = BoardRng::from_seed(3);
        for _ in 0..20 {
            let board = Board::random(BoardConfig::new(3, 3, 8).unwrap(), &mut rng);
            assert_eq!(board.status((1, 1)), SquareStatus::UnrevealedSafe);
        }
        for (rows, cols) in [(1, 5), (2, 3), (4, 7), (16, 30)] {
            let mines = rows * cols - 1;
            let board = Board::random(BoardConfig::new(rows, cols, mines).unwrap(), &mut rng);
            let opening = opening_square(rows, cols);
            assert_eq!(board.status(opening), SquareStatus::UnrevealedSafe, "{}x{}", rows, cols);
        }
    }

    #[test]
    fn test_calculate_numbers_center_mine() {
        let mut mines = vec![false; 9];
        mines[4] = true;
        let counts = calculate_numbers(3, 3, &mines);
        for (i, &n) in counts.iter().enumerate() {
            if i != 4 {
                assert_eq!(n, 1, "square {}", i);
            }
        }
        assert_eq!(counts[4], 0);
    }

    #[test]
    fn test_calculate_numbers_corner_mine() {
        let mut mines = vec![false; 9];
        mines[0] = true;
        let counts = calculate_numbers(3, 3, &mines);
        assert_eq!(counts[1], 1);
        assert_eq!(counts[3], 1);
        assert_eq!(counts[4], 1);
        assert_eq!(counts[2], 0);
        assert_eq!(counts[8], 0);
    }

    #[test]
    fn test_reveal_flood_fills_zero_region() {
        let mut board = Board::parse(&["....", "....", "...*"]).unwrap();
        assert_eq!(board.reveal((0, 0)), MoveResult::Win);
        assert_eq!(board.status((2, 3)), SquareStatus::UnrevealedMine);
        assert_eq!(board.stats().squares_revealed, 11);
    }

    #[test]
    fn test_reveal_stops_at_numbers() {
        let mut board = Board::parse(&["...", "...", "*.*"]).unwrap();
        assert_eq!(board.reveal((0, 0)), MoveResult::Continue);
        assert!(board.is_safe((1, 1)));
        assert!(!board.is_known((2, 1)));
        assert_eq!(board.adjacent_mine_count((1, 1)), 2);
    }

    #[test]
    fn test_loss_latches_until_reset() {
        let mut board = Board::parse(&[".*", ".."]).unwrap();
        assert_eq!(board.reveal((0, 1)), MoveResult::Loss);
        assert_eq!(board.reveal((1, 0)), MoveResult::Loss);
        assert!(!board.is_known((1, 0)));
        assert!(board.to_string().contains('X'));

        let mut rng = BoardRng::from_seed(9);
        board.reset(&mut rng);
        assert_eq!(board.outcome(), MoveResult::Continue);
        assert_eq!(board.stats().moves, 0);
    }

    #[test]
    fn test_flag_is_unchecked() {
        let mut board = Board::parse(&["1*", ".."]).unwrap();
        board.flag_as_mine((1, 1));
        assert!(board.is_flagged_mine((1, 1)));
        board.flag_as_mine((0, 0));
        assert!(board.is_safe((0, 0)));
        assert_eq!(board.stats().mines_marked, 1);
        assert_eq!(board.stats().mines_remaining, 0);
    }

    #[test]
    fn test_seed_roundtrip() {
        let mut rng = BoardRng::from_seed(11);
        let board = Board::random(BoardConfig::new(9, 9, 10).unwrap(), &mut rng);
        let restored = Board::from_seed(9, 9, &board.seed()).unwrap();
        assert_eq!(restored.seed(), board.seed());
        assert_eq!(restored.total_mines(), 10);
    }

    #[test]
    fn test_compress_caps_runs_at_nine() {
        assert_eq!(compress_seed("000000000000"), "0903");
        assert_eq!(compress_seed("0110"), "011201");
        assert_eq!(decompress_seed("0903").unwrap(), "000000000000");
    }

    #[test]
    fn test_bad_seeds_rejected() {
        assert!(matches!(decompress_seed("091"), Err(SolverError::InvalidSeed(_))));
        assert!(matches!(decompress_seed("20"), Err(SolverError::InvalidSeed(_))));
        assert!(matches!(decompress_seed("00"), Err(SolverError::InvalidSeed(_))));
        assert!(Board::from_seed(3, 3, "05").is_err());
    }

    #[test]
    fn test_parse_validates_digits() {
        assert!(Board::parse(&["1*"]).is_ok());
        assert!(matches!(Board::parse(&["2*"]), Err(SolverError::InvalidLayout(_))));
        assert!(matches!(Board::parse(&["..", "."]), Err(SolverError::InvalidLayout(_))));
    }

    #[test]
    fn test_adjacent_filters() {
        let board = Board::parse(&["1F.", "11."]).unwrap();
        let unknown: Vec<Square> = adjacent(&board, (1, 1), Filter::Unknown).collect();
        assert_eq!(unknown, vec![(1, 2), (0, 2)]);
        let flagged: Vec<Square> = adjacent(&board, (1, 1), Filter::Flagged).collect();
        assert_eq!(flagged, vec![(0, 1)]);
        assert_eq!(adjacent(&board, (1, 1), Filter::Safe).count(), 2);
        assert_eq!(adjacent(&board, (1, 1), Filter::Known).count(), 3);
    }
}
