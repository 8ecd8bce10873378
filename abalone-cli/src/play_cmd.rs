//! Play command - a single game between AI and/or human players
//!
//! Humans type moves in notation (`C3 to D4`, `C3-C5 to D3`), `undo` to take
//! back their last move, or `quit`.

use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::Args;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use abalone_core::{Agent, Game, GameConfig, GameEvent, GameResult, Layout, Move, Player, SearchError};

#[derive(Args)]
pub struct PlayArgs {
    /// Game config JSON file
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Black player: ai or human
    #[arg(long, value_parser = parse_agent)]
    pub black: Option<Agent>,

    /// White player: ai or human
    #[arg(long, value_parser = parse_agent)]
    pub white: Option<Agent>,

    /// Starting layout: standard, german-daisy or belgian-daisy
    #[arg(long)]
    pub layout: Option<Layout>,

    /// Moves per player
    #[arg(long)]
    pub move_limit: Option<u32>,

    /// AI thinking time per turn, both colors
    #[arg(long, value_name = "MS")]
    pub time_limit_ms: Option<u64>,
}

/// What a human typed
#[derive(Debug, PartialEq, Eq)]
enum Command {
    Move(String),
    Undo,
    Quit,
}

// ============================================================================
// LEVEL 1 - ORCHESTRATION
// ============================================================================

pub fn run(args: PlayArgs, seed: Option<u64>) -> Result<()> {
    let config = load_config(&args)?;
    let mut rng = create_rng(seed);
    let stdin = io::stdin();
    let mut input = stdin.lock();

    tracing::info!(
        "Starting game: black={:?} white={:?} layout={} move_limit={}",
        config.black_agent,
        config.white_agent,
        config.layout,
        config.move_limit
    );

    let game = play_game(&config, &mut input, &mut rng)?;
    report_result(&game);
    Ok(())
}

// ============================================================================
// LEVEL 2 - PHASES
// ============================================================================

fn load_config(args: &PlayArgs) -> Result<GameConfig> {
    let mut config = match &args.config {
        Some(path) => GameConfig::load(path)?,
        None => GameConfig::default(),
    };
    if let Some(agent) = args.black {
        config.black_agent = agent;
    }
    if let Some(agent) = args.white {
        config.white_agent = agent;
    }
    if let Some(layout) = args.layout {
        config.layout = layout;
    }
    if let Some(limit) = args.move_limit {
        config.move_limit = limit;
    }
    if let Some(ms) = args.time_limit_ms {
        config.black_time_limit_ms = ms;
        config.white_time_limit_ms = ms;
    }
    Ok(config)
}

fn play_game<R: BufRead>(config: &GameConfig, input: &mut R, rng: &mut ChaCha8Rng) -> Result<Game> {
    let mut game = config.new_game();
    println!("{:?}", game.board());

    while !game.is_over() {
        let player = game.current_player();
        let events = match config.agent(player) {
            Agent::Ai => match ai_turn(&game, config, rng) {
                Ok(mv) => game.make_move(mv)?,
                Err(SearchError::NoLegalMoves) => {
                    tracing::warn!("{} has no legal moves", player);
                    break;
                }
                Err(e) => return Err(e.into()),
            },
            Agent::Human => match human_turn(&mut game, config, input)? {
                Some(events) => events,
                None => break,
            },
        };
        report_events(&events);
        println!("{:?}", game.board());
    }
    Ok(game)
}

fn report_result(game: &Game) {
    println!(
        "Result: {:?} (black {} - white {}, {} plies)",
        game.result(),
        game.score(Player::Black),
        game.score(Player::White),
        game.plies()
    );
}

// ============================================================================
// LEVEL 3 - STEPS
// ============================================================================

fn ai_turn(game: &Game, config: &GameConfig, rng: &mut ChaCha8Rng) -> Result<Move, SearchError> {
    let player = game.current_player();
    let started = Instant::now();
    let mv = if game.plies() == 0 {
        game.random_opening_move(rng).ok_or(SearchError::NoLegalMoves)?
    } else {
        config.ai_config(player).choose_move(&game.position())?
    };
    tracing::info!("{} plays {} after {:.2?}", player, mv, started.elapsed());
    Ok(mv)
}

/// Prompt until the human plays a legal move. `None` on quit or end of input.
fn human_turn<R: BufRead>(game: &mut Game, config: &GameConfig, input: &mut R) -> Result<Option<Vec<GameEvent>>> {
    loop {
        print!("{} to move> ", game.current_player());
        io::stdout().flush()?;

        let mut line = String::new();
        if input.read_line(&mut line).context("Failed to read move")? == 0 {
            return Ok(None);
        }
        match parse_command(&line) {
            None => continue,
            Some(Command::Quit) => return Ok(None),
            Some(Command::Undo) => undo_turn(game, config),
            Some(Command::Move(text)) => match game.make_move_str(&text) {
                Ok(events) => return Ok(Some(events)),
                Err(e) => println!("{}", e),
            },
        }
    }
}

/// Take back moves until it is a human's turn again
fn undo_turn(game: &mut Game, config: &GameConfig) {
    if game.undo().is_err() {
        println!("Nothing to undo");
        return;
    }
    while config.agent(game.current_player()) == Agent::Ai && game.undo().is_ok() {}
    println!("{:?}", game.board());
}

fn report_events(events: &[GameEvent]) {
    for event in events {
        match event {
            GameEvent::MoveApplied { player, mv, pushed_off } => match pushed_off {
                Some(color) => println!("{} played {}, pushing off a {} marble", player, mv, color),
                None => println!("{} played {}", player, mv),
            },
            GameEvent::ScoreChanged { black, white } => println!("Score: black {} - white {}", black, white),
            GameEvent::TurnEnded { next, moves_left } => {
                tracing::debug!("{} to move, {} moves left", next, moves_left)
            }
            GameEvent::GameOver { result } => println!("Game over: {}", describe(*result)),
        }
    }
}

// ============================================================================
// LEVEL 4 - UTILITIES
// ============================================================================

fn parse_command(line: &str) -> Option<Command> {
    let line = line.trim();
    if line.is_empty() {
        return None;
    }
    Some(match line.to_ascii_lowercase().as_str() {
        "undo" => Command::Undo,
        "quit" | "exit" => Command::Quit,
        _ => Command::Move(line.to_string()),
    })
}

fn parse_agent(s: &str) -> Result<Agent, String> {
    match s.to_ascii_lowercase().as_str() {
        "ai" => Ok(Agent::Ai),
        "human" => Ok(Agent::Human),
        _ => Err(format!("expected 'ai' or 'human', got '{}'", s)),
    }
}

fn describe(result: GameResult) -> &'static str {
    match result {
        GameResult::BlackWins => "black wins",
        GameResult::WhiteWins => "white wins",
        GameResult::Draw => "draw",
        GameResult::Ongoing => "unfinished",
    }
}

/// Create RNG from seed or random
fn create_rng(seed: Option<u64>) -> ChaCha8Rng {
    match seed {
        Some(s) => ChaCha8Rng::seed_from_u64(s),
        None => ChaCha8Rng::from_entropy(),
    }
}

// ============================================================================
// TESTS
// ============================================================================
