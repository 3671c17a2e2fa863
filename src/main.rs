//! Text front end: play a board by hand or let the bot play it.

use std::error::Error;
use std::fs;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;

use minesweeper_bot::board::{Board, GridView};
use minesweeper_bot::config::{BoardConfig, SolverConfig};
use minesweeper_bot::rng::BoardRng;
use minesweeper_bot::solver::Bot;
use minesweeper_bot::types::{MoveResult, Square};

const COMMANDS: &str = "\
Commands:
    next (n, enter): Play the next best move
    reset (r): Start a new game
    stats (s): View relevant stats
    simulate [int]: Let the bot play that many fresh games
    quit (q): Close the program
    [int] [int]: Make the move manually at the specified square";

#[derive(Parser, Debug)]
#[command(name = "minesweeper-bot", version, about = "Start the minesweeper solver.", after_help = COMMANDS)]
struct Args {
    /// Board size as ROWSxCOLUMNS, e.g. 16x30
    dimensions: Option<String>,

    /// Number of rows
    #[arg(short, long)]
    rows: Option<usize>,

    /// Number of columns
    #[arg(short, long)]
    columns: Option<usize>,

    /// Number of mines
    #[arg(short, long)]
    mines: Option<usize>,

    /// Maximum number of squares searched without approximation
    #[arg(short, long)]
    edge_size: Option<usize>,

    /// Disable subset approximation for large edges
    #[arg(short, long)]
    disable_subset_approximations: bool,

    /// Board seed printed by an earlier game
    #[arg(short, long)]
    seed: Option<String>,

    /// Solver configuration as JSON
    #[arg(long)]
    config: Option<PathBuf>,

    /// Seed for the random layout generator
    #[arg(long)]
    rng_seed: Option<u64>,
}

#[derive(Debug, PartialEq, Eq)]
enum Command {
    Next,
    Move(Square),
    Reset,
    Stats,
    Simulate(usize),
    Help,
    Quit,
}

fn parse_command(line: &str) -> Option<Command> {
    let words: Vec<&str> = line.split_whitespace().collect();
    match words.as_slice() {
        [] | ["n"] | ["next"] => Some(Command::Next),
        ["r"] | ["reset"] => Some(Command::Reset),
        ["s"] | ["stats"] => Some(Command::Stats),
        ["q"] | ["quit"] => Some(Command::Quit),
        ["h"] | ["help"] => Some(Command::Help),
        ["simulate", games] => games.parse().ok().map(Command::Simulate),
        [row, col] => Some(Command::Move((row.parse().ok()?, col.parse().ok()?))),
        _ => None,
    }
}

/// `"16x30"` → `(16, 30)`.
fn parse_dimensions(text: &str) -> Option<(usize, usize)> {
    let (rows, cols) = text.split_once(|c| c == 'x' || c == 'X')?;
    Some((rows.trim().parse().ok()?, cols.trim().parse().ok()?))
}

fn solver_config(args: &Args) -> Result<SolverConfig, Box<dyn Error>> {
    let mut config = match &args.config {
        Some(path) => SolverConfig::from_json(&fs::read_to_string(path)?)?,
        None => SolverConfig::default(),
    };
    if let Some(limit) = args.edge_size {
        config.edge_limit = limit;
    }
    if args.disable_subset_approximations {
        config.subset_approximation = false;
    }
    config.validate()?;
    Ok(config)
}

fn board_config(args: &Args) -> Result<BoardConfig, Box<dyn Error>> {
    let defaults = BoardConfig::default();
    let (mut rows, mut cols) = (defaults.rows, defaults.cols);
    if let Some(text) = &args.dimensions {
        (rows, cols) = parse_dimensions(text).ok_or_else(|| format!("Invalid row and column value {:?}", text))?;
    }
    rows = args.rows.unwrap_or(rows);
    cols = args.columns.unwrap_or(cols);
    let mines = args.mines.unwrap_or(defaults.mines);
    Ok(BoardConfig::new(rows, cols, mines)?)
}

fn announce(result: MoveResult) {
    match result {
        MoveResult::Win => println!("You win!"),
        MoveResult::Loss => println!("Game over, reset to play again"),
        MoveResult::Continue => {}
    }
}

fn run(args: Args) -> Result<(), Box<dyn Error>> {
    let solver = solver_config(&args)?;
    let config = board_config(&args)?;
    let mut rng = match args.rng_seed {
        Some(seed) => BoardRng::from_seed(seed),
        None => BoardRng::new(),
    };

    log::info!(
        "Initializing board with {} rows, {} columns, {} mines, maximum edge size of {} and subset approximation {}",
        config.rows,
        config.cols,
        config.mines,
        solver.edge_limit,
        if solver.subset_approximation { "enabled" } else { "disabled" }
    );

    let mut board = match &args.seed {
        Some(seed) => Board::from_seed(config.rows, config.cols, seed)?,
        None => Board::random(config, &mut rng),
    };
    let mut bot = Bot::new(solver);
    bot.reset(board.rows(), board.cols());
    println!("Seed: {}", board.seed());
    print!("{}", board);

    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();
    loop {
        print!("> ");
        io::stdout().flush()?;
        let Some(line) = lines.next() else {
            return Ok(());
        };
        let line = line?;

        match parse_command(&line) {
            Some(Command::Next) => {
                let result = bot.select_next_move(&mut board)?;
                print!("{}", board);
                announce(result);
            }
            Some(Command::Move(square)) => {
                if let Err(e) = board.check_bounds(square) {
                    println!("{}", e);
                    continue;
                }
                let result = bot.make_move(&mut board, square);
                print!("{}", board);
                announce(result);
            }
            Some(Command::Reset) => {
                board.reset(&mut rng);
                bot.reset(board.rows(), board.cols());
                println!("Seed: {}", board.seed());
                print!("{}", board);
            }
            Some(Command::Stats) => println!("{}", board.stats()),
            Some(Command::Simulate(games)) => {
                let wins = bot.simulate(&mut board, &mut rng, games)?;
                println!("Won {} of {} games", wins, games);
            }
            Some(Command::Help) => println!("{}", COMMANDS),
            Some(Command::Quit) => return Ok(()),
            None => println!("Invalid command, type help for a list of commands"),
        }
    }
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    match run(Args::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{}", e);
            ExitCode::FAILURE
        }
    }
}
