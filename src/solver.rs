//! Move selection.
//!
//! `Bot` drives the solver in priority order on every request:
//! - queued safe moves left over from an earlier cycle
//! - single-square deduction (count equals unknown + flagged, or flagged only)
//! - edge search (exact or approximate probabilities)
//! - a guess at the lowest probability, ties broken by a clockwise spiral
//!
//! Only the pending queue, the probability map and the last move result live
//! across cycles. A `WIN` or `LOSS` stops the bot until `reset`.

use std::collections::VecDeque;

use crate::board::{adjacent, Board, GridState, GridView};
use crate::config::SolverConfig;
use crate::error::SolverError;
use crate::probability;
use crate::rng::BoardRng;
use crate::types::{spiral_order, squares, Filter, MoveResult, ProbabilityMap, Square};

#[derive(Clone, Debug)]
pub struct Bot {
    config: SolverConfig,
    queue: VecDeque<Square>,
    probabilities: ProbabilityMap,
    last_result: MoveResult,
}

impl Bot {
    pub fn new(config: SolverConfig) -> Self {
        Self {
            config,
            queue: VecDeque::new(),
            probabilities: ProbabilityMap::default(),
            last_result: MoveResult::Continue,
        }
    }

    pub fn last_result(&self) -> MoveResult {
        self.last_result
    }

    /// Map from the most recent edge search.
    pub fn probabilities(&self) -> &ProbabilityMap {
        &self.probabilities
    }

    /// Squares still waiting in the safe-move queue.
    pub fn queued(&self) -> impl Iterator<Item = Square> + '_ {
        self.queue.iter().copied()
    }

    /// Forget every pending move and probability; size the map for a new board.
    pub fn reset(&mut self, rows: usize, cols: usize) {
        self.queue.clear();
        self.probabilities.resize(rows, cols);
        self.last_result = MoveResult::Continue;
    }

    /// Reveal `square` on behalf of the user.
    pub fn make_move<G: GridState + ?Sized>(&mut self, grid: &mut G, square: Square) -> MoveResult {
        if self.last_result.is_terminal() {
            return self.last_result;
        }
        self.last_result = grid.reveal(square);
        self.last_result
    }

    /// Pick and play the next move.
    ///
    /// A contradictory board is returned as an error, never as an outcome.
    pub fn select_next_move<G: GridState + ?Sized>(&mut self, grid: &mut G) -> Result<MoveResult, SolverError> {
        if self.last_result.is_terminal() {
            return Ok(self.last_result);
        }
        if is_cleared(grid) {
            self.last_result = MoveResult::Win;
            return Ok(self.last_result);
        }
        if self.probabilities.rows != grid.rows() || self.probabilities.cols != grid.cols() {
            self.probabilities.resize(grid.rows(), grid.cols());
        }

        if let Some(result) = self.play_queued(grid) {
            return Ok(result);
        }

        log::info!("No existing move in queue, beginning single square search");
        self.single_square_search(grid);
        if let Some(result) = self.play_queued(grid) {
            return Ok(result);
        }

        log::info!("No moves found by single square search, beginning edge search");
        self.edge_search(grid)?;
        if let Some(result) = self.play_queued(grid) {
            return Ok(result);
        }

        log::info!("No certain move found, guessing");
        self.guess(grid)
    }

    /// Flag or queue the unknown neighbors of every revealed square whose
    /// count settles them.
    pub fn single_square_search<G: GridState + ?Sized>(&mut self, grid: &mut G) {
        for sq in squares(grid.rows(), grid.cols()) {
            if !grid.is_safe(sq) {
                continue;
            }
            let unknown: Vec<Square> = adjacent(grid, sq, Filter::Unknown).collect();
            if unknown.is_empty() {
                continue;
            }
            let flagged = adjacent(grid, sq, Filter::Flagged).count();
            let count = grid.adjacent_mine_count(sq) as usize;

            if count == unknown.len() + flagged {
                log::debug!("{:?} settles {} mines", sq, unknown.len());
                for mine in unknown {
                    grid.flag_as_mine(mine);
                }
            } else if count == flagged {
                log::debug!("{:?} settles {} safe squares", sq, unknown.len());
                self.queue.extend(unknown);
            }
        }
    }

    fn edge_search<G: GridState + ?Sized>(&mut self, grid: &mut G) -> Result<(), SolverError> {
        let search = probability::edge_search(grid, &self.config)?;
        log::debug!(
            "Edge search over {} edges: {} safe, {} mines",
            search.solved_edges,
            search.safe.len(),
            search.mines.len()
        );
        for &mine in &search.mines {
            grid.flag_as_mine(mine);
        }
        self.queue.extend(search.safe.iter().copied());
        self.probabilities = search.probabilities;
        Ok(())
    }

    fn play_queued<G: GridState + ?Sized>(&mut self, grid: &mut G) -> Option<MoveResult> {
        while let Some(sq) = self.queue.pop_front() {
            if grid.is_known(sq) {
                continue;
            }
            log::info!("Move found in queue: {:?}", sq);
            return Some(self.make_move(grid, sq));
        }
        None
    }

    /// Reveal the unknown square of lowest probability. Among equal minima
    /// the last one in spiral order wins.
    fn guess<G: GridState + ?Sized>(&mut self, grid: &mut G) -> Result<MoveResult, SolverError> {
        let mut best: Option<(Square, f64)> = None;
        for sq in spiral_order(grid.rows(), grid.cols()) {
            if grid.is_known(sq) {
                continue;
            }
            let p = self.probabilities.get(sq);
            if best.map_or(true, |(_, lowest)| p <= lowest) {
                best = Some((sq, p));
            }
        }

        let (square, p) = best.ok_or(SolverError::NoMoveAvailable)?;
        log::info!("Guessing {:?} with mine probability {:.4}", square, p);
        Ok(self.make_move(grid, square))
    }

    /// Play `games` full games, resetting `board` and the bot before each.
    /// Returns the number of games won.
    pub fn simulate(&mut self, board: &mut Board, rng: &mut BoardRng, games: usize) -> Result<usize, SolverError> {
        let mut wins = 0;
        for game in 1..=games {
            board.reset(rng);
            self.reset(board.rows(), board.cols());

            let result = loop {
                let result = self.select_next_move(board)?;
                if result.is_terminal() {
                    break result;
                }
            };
            if result == MoveResult::Win {
                wins += 1;
            }
            log::info!("Game {}: {:?} after {} moves", game, result, board.stats().moves);
        }
        log::info!("Won {} of {} games", wins, games);
        Ok(wins)
    }
}

/// Every non-mine square is revealed.
fn is_cleared<G: GridView + ?Sized>(grid: &G) -> bool {
    let revealed = squares(grid.rows(), grid.cols()).filter(|&sq| grid.is_safe(sq)).count();
    revealed + grid.total_mines() == grid.rows() * grid.cols()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BoardConfig;
    use crate::snapshot::{GridSnapshot, FLAGGED, HIDDEN};
    use crate::types::SquareStatus;

    fn bot() -> Bot {
        Bot::new(SolverConfig::default())
    }

    #[test]
    fn test_even_odds_guess_takes_last_in_spiral() {
        let mut board = Board::parse(&[".1*"]).unwrap();
        let mut bot = bot();
        assert_eq!(bot.select_next_move(&mut board).unwrap(), MoveResult::Loss);
        assert_eq!(bot.probabilities().get((0, 0)), 0.5);
        assert_eq!(bot.probabilities().get((0, 2)), 0.5);
        assert_eq!(board.status((0, 0)), SquareStatus::UnrevealedSafe);
    }

    #[test]
    fn test_single_square_search_flags_settled_mines() {
        let mut board = Board::parse(&["*2*."]).unwrap();
        let mut bot = bot();
        bot.single_square_search(&mut board);
        assert!(board.is_flagged_mine((0, 0)));
        assert!(board.is_flagged_mine((0, 2)));
        assert_eq!(bot.queued().count(), 0);
    }

    #[test]
    fn test_single_square_search_queues_safe_neighbors() {
        let mut board = Board::parse(&["F1.", "...", "..."]).unwrap();
        let mut bot = bot();
        bot.single_square_search(&mut board);
        let queued: Vec<Square> = bot.queued().collect();
        assert_eq!(queued, vec![(0, 2), (1, 1), (1, 2), (1, 0)]);
    }

    #[test]
    fn test_flags_then_background_finishes_game() {
        let mut board = Board::parse(&["*2*."]).unwrap();
        let mut bot = bot();
        assert_eq!(bot.select_next_move(&mut board).unwrap(), MoveResult::Win);
        assert!(board.is_safe((0, 3)));
    }

    #[test]
    fn test_cleared_board_is_a_win() {
        let mut board = Board::parse(&["1*", "11"]).unwrap();
        let mut bot = bot();
        assert_eq!(bot.select_next_move(&mut board).unwrap(), MoveResult::Win);
        assert_eq!(bot.last_result(), MoveResult::Win);
        assert_eq!(board.stats().moves, 0);
    }

    #[test]
    fn test_loss_stops_bot_until_reset() {
        let mut board = Board::parse(&[".*", ".."]).unwrap();
        let mut bot = bot();
        assert_eq!(bot.make_move(&mut board, (0, 1)), MoveResult::Loss);
        assert_eq!(bot.select_next_move(&mut board).unwrap(), MoveResult::Loss);
        assert_eq!(bot.make_move(&mut board, (1, 0)), MoveResult::Loss);
        assert_eq!(board.stats().moves, 1);

        let mut rng = BoardRng::from_seed(5);
        board.reset(&mut rng);
        bot.reset(2, 2);
        assert_eq!(bot.last_result(), MoveResult::Continue);
        bot.select_next_move(&mut board).unwrap();
        assert_eq!(board.stats().moves, 1);
    }

    #[test]
    fn test_first_guess_is_spiral_center() {
        let mut board = Board::parse(&["*..", "...", "..."]).unwrap();
        let mut bot = bot();
        assert_eq!(bot.select_next_move(&mut board).unwrap(), MoveResult::Continue);
        assert!(board.is_safe((1, 1)));
        assert_eq!(board.stats().squares_revealed, 1);
    }

    #[test]
    fn test_opening_move_never_loses() {
        let mut rng = BoardRng::from_seed(400);
        for (rows, cols, mines) in [(9, 9, 10), (16, 16, 40), (16, 30, 99)] {
            for game in 0..100 {
                let mut board = Board::random(BoardConfig::new(rows, cols, mines).unwrap(), &mut rng);
                let mut bot = bot();
                let result = bot.select_next_move(&mut board).unwrap();
                assert_ne!(result, MoveResult::Loss, "{}x{} game {}", rows, cols, game);
                assert_eq!(board.stats().moves, 1);
            }
        }
    }

    #[test]
    fn test_queue_drains_before_search() {
        let mut board = Board::parse(&["..*", "..."]).unwrap();
        board.reveal((0, 1));
        let mut bot = bot();
        bot.queue.extend([(0, 1), (0, 0)]);
        // (0, 1) is already known, so (0, 0) is played straight from the queue.
        assert_eq!(bot.select_next_move(&mut board).unwrap(), MoveResult::Continue);
        assert!(board.is_safe((1, 0)));
        assert!(!board.is_known((1, 2)));
        assert_eq!(bot.queued().count(), 0);
        assert_eq!(board.stats().moves, 2);
    }

    #[test]
    fn test_reset_clears_state() {
        let mut board = Board::parse(&[".1*"]).unwrap();
        let mut bot = bot();
        bot.select_next_move(&mut board).unwrap();
        bot.queue.push_back((0, 0));
        bot.reset(4, 5);
        assert_eq!(bot.last_result(), MoveResult::Continue);
        assert_eq!(bot.queued().count(), 0);
        assert_eq!(bot.probabilities().as_slice(), &[0.0; 20]);
    }

    #[test]
    fn test_snapshot_cycle_records_moves() {
        // "*2*." with nothing flagged yet.
        let mut snap = GridSnapshot::new(1, 4, 2, vec![HIDDEN, 2, HIDDEN, HIDDEN]).unwrap();
        let mut bot = bot();
        assert_eq!(bot.select_next_move(&mut snap).unwrap(), MoveResult::Continue);
        let planned = snap.into_planned();
        assert_eq!(planned.flags, vec![(0, 2), (0, 0)]);
        assert_eq!(planned.reveal, Some((0, 3)));

        let mut done = GridSnapshot::new(1, 3, 1, vec![0, 1, FLAGGED]).unwrap();
        assert_eq!(Bot::new(SolverConfig::default()).select_next_move(&mut done).unwrap(), MoveResult::Win);
    }

    #[test]
    fn test_too_many_flags_is_an_error() {
        let mut snap = GridSnapshot::new(1, 4, 1, vec![FLAGGED, 2, FLAGGED, HIDDEN]).unwrap();
        let mut bot = bot();
        assert!(matches!(
            bot.select_next_move(&mut snap),
            Err(SolverError::FlagsExceedMines { flagged: 2, mines: 1 })
        ));
        assert_eq!(snap.into_planned().reveal, None);
    }

    #[test]
    fn test_simulate_plays_full_games() {
        let mut rng = BoardRng::from_seed(1234);
        let mut board = Board::random(BoardConfig::new(8, 8, 10).unwrap(), &mut rng);
        let mut bot = bot();
        let wins = bot.simulate(&mut board, &mut rng, 5).unwrap();
        assert!(wins <= 5);
        assert!(board.outcome().is_terminal());
    }
}
