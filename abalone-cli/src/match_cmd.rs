//! Match command - AI-vs-AI games at a fixed depth
//!
//! ## Architecture (4-layer granularity)
//!
//! - Level 1: run() - orchestration
//! - Level 2: play_match(), report_results()
//! - Level 3: play_single_game(), compute_match_statistics()
//! - Level 4: formatting utilities

use anyhow::Result;
use clap::{Args, ValueEnum};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;

use abalone_core::{AiConfig, Game, GameResult, Heuristics, Layout, Move, Player, SearchError};

// ============================================================================
// COMMAND ARGUMENTS (Level 4 - Configuration)
// ============================================================================

#[derive(Args)]
pub struct MatchArgs {
    /// Number of games to play
    #[arg(long, default_value = "10")]
    pub games: usize,

    /// AI search depth
    #[arg(long, default_value = "2")]
    pub depth: u32,

    /// Moves per player
    #[arg(long, default_value = "40")]
    pub move_limit: u32,

    /// Starting layout: standard, german-daisy or belgian-daisy
    #[arg(long, default_value = "standard")]
    pub layout: Layout,

    /// Heuristic preset for black
    #[arg(long, value_enum, default_value = "default")]
    pub black_heuristics: Preset,

    /// Heuristic preset for white
    #[arg(long, value_enum, default_value = "default")]
    pub white_heuristics: Preset,

    /// Output results as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum Preset {
    Default,
    Experimental,
}

impl Preset {
    fn heuristics(self) -> Heuristics {
        match self {
            Preset::Default => Heuristics::default(),
            Preset::Experimental => Heuristics::experimental(),
        }
    }
}

/// Result of a single game
#[derive(Clone, Debug)]
struct GameRecord {
    game_number: usize,
    result: GameResult,
    plies: usize,
    black_score: u32,
    white_score: u32,
    #[allow(dead_code)] // Used for detailed analysis/replay
    moves: Vec<Move>,
}

/// Aggregated match results
#[derive(Clone, Debug)]
struct MatchResults {
    games: Vec<GameRecord>,
    white_wins: usize,
    black_wins: usize,
    draws: usize,
    /// Stopped early because a side had no legal move
    unfinished: usize,
    avg_plies: f32,
}

// ============================================================================
// LEVEL 1 - ORCHESTRATION
// ============================================================================

/// Run match command
pub fn run(args: MatchArgs, seed: Option<u64>) -> Result<()> {
    tracing::info!(
        "Starting match: {:?} vs {:?} ({} games, depth={}, layout={})",
        args.black_heuristics,
        args.white_heuristics,
        args.games,
        args.depth,
        args.layout
    );

    let results = play_match(&args, seed.unwrap_or_else(rand::random))?;

    report_results(&results, &args)
}

// ============================================================================
// LEVEL 2 - PHASES
// ============================================================================

/// Play all games in parallel; game `i` seeds its opening from `seed + i`
fn play_match(args: &MatchArgs, seed: u64) -> Result<MatchResults> {
    let black = AiConfig::alpha_beta(args.depth).with_heuristics(args.black_heuristics.heuristics());
    let white = AiConfig::alpha_beta(args.depth).with_heuristics(args.white_heuristics.heuristics());

    let games = (0..args.games)
        .into_par_iter()
        .map(|i| {
            let mut rng = ChaCha8Rng::seed_from_u64(seed.wrapping_add(i as u64));
            let record = play_single_game(i + 1, args, [&black, &white], &mut rng)?;
            tracing::info!(
                "Game {}: {:?} ({} plies, {}-{})",
                record.game_number,
                record.result,
                record.plies,
                record.black_score,
                record.white_score
            );
            Ok(record)
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(compute_match_statistics(games))
}

/// Report match results
fn report_results(results: &MatchResults, args: &MatchArgs) -> Result<()> {
    if args.json {
        print_json_results(results)
    } else {
        print_text_results(results);
        Ok(())
    }
}

// ============================================================================
// LEVEL 3 - STEPS
// ============================================================================

/// Play one game; black opens with a random pick among the best-ordered moves
fn play_single_game(
    game_number: usize,
    args: &MatchArgs,
    players: [&AiConfig; 2],
    rng: &mut ChaCha8Rng,
) -> Result<GameRecord> {
    let mut game = Game::new(args.layout.board(), args.move_limit);
    let mut moves = Vec::new();

    while !game.is_over() {
        let chosen = if game.plies() == 0 {
            game.random_opening_move(rng).ok_or(SearchError::NoLegalMoves)
        } else {
            players[game.current_player().index()].choose_move(&game.position())
        };
        let mv = match chosen {
            Ok(mv) => mv,
            Err(SearchError::NoLegalMoves) => break,
            Err(e) => return Err(e.into()),
        };
        game.make_move(mv)?;
        moves.push(mv);
    }

    Ok(GameRecord {
        game_number,
        result: game.result(),
        plies: moves.len(),
        black_score: game.score(Player::Black),
        white_score: game.score(Player::White),
        moves,
    })
}

/// Compute aggregate statistics from game records
fn compute_match_statistics(games: Vec<GameRecord>) -> MatchResults {
    let count = |result: GameResult| games.iter().filter(|g| g.result == result).count();
    let white_wins = count(GameResult::WhiteWins);
    let black_wins = count(GameResult::BlackWins);
    let draws = count(GameResult::Draw);
    let unfinished = count(GameResult::Ongoing);

    let total_plies: usize = games.iter().map(|g| g.plies).sum();
    let avg_plies = if games.is_empty() {
        0.0
    } else {
        total_plies as f32 / games.len() as f32
    };

    MatchResults {
        games,
        white_wins,
        black_wins,
        draws,
        unfinished,
        avg_plies,
    }
}

// ============================================================================
// LEVEL 4 - UTILITIES
// ============================================================================

fn percent(n: usize, total: usize) -> f32 {
    if total > 0 {
        n as f32 / total as f32 * 100.0
    } else {
        0.0
    }
}

/// Print results as JSON
fn print_json_results(results: &MatchResults) -> Result<()> {
    #[derive(serde::Serialize)]
    struct JsonGame {
        game_number: usize,
        result: GameResult,
        plies: usize,
        black_score: u32,
        white_score: u32,
    }

    #[derive(serde::Serialize)]
    struct JsonOutput {
        total_games: usize,
        white_wins: usize,
        black_wins: usize,
        draws: usize,
        unfinished: usize,
        avg_plies: f32,
        black_win_rate: f32,
        games: Vec<JsonGame>,
    }

    let total = results.games.len();
    let output = JsonOutput {
        total_games: total,
        white_wins: results.white_wins,
        black_wins: results.black_wins,
        draws: results.draws,
        unfinished: results.unfinished,
        avg_plies: results.avg_plies,
        black_win_rate: percent(results.black_wins, total) / 100.0,
        games: results
            .games
            .iter()
            .map(|g| JsonGame {
                game_number: g.game_number,
                result: g.result,
                plies: g.plies,
                black_score: g.black_score,
                white_score: g.white_score,
            })
            .collect(),
    };

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

/// Print results as text
fn print_text_results(results: &MatchResults) {
    let total = results.games.len();

    println!("\n=== Match Results ===");
    println!("Total games: {}", total);
    println!("Black wins:  {} ({:.1}%)", results.black_wins, percent(results.black_wins, total));
    println!("White wins:  {} ({:.1}%)", results.white_wins, percent(results.white_wins, total));
    println!("Draws:       {} ({:.1}%)", results.draws, percent(results.draws, total));
    if results.unfinished > 0 {
        println!("Unfinished:  {} ({:.1}%)", results.unfinished, percent(results.unfinished, total));
    }
    println!("Avg plies:   {:.1}", results.avg_plies);

    println!("\nGame details:");
    for game in &results.games {
        println!(
            "  Game {}: {:?} in {} plies ({}-{})",
            game.game_number, game.result, game.plies, game.black_score, game.white_score
        );
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn record(game_number: usize, result: GameResult, plies: usize) -> GameRecord {
        GameRecord {
            game_number,
            result,
            plies,
            black_score: 0,
            white_score: 0,
            moves: vec![],
        }
    }

    fn args(games: usize, move_limit: u32) -> MatchArgs {
        MatchArgs {
            games,
            depth: 1,
            move_limit,
            layout: Layout::Standard,
            black_heuristics: Preset::Default,
            white_heuristics: Preset::Experimental,
            json: false,
        }
    }

    #[test]
    fn test_compute_match_statistics_empty() {
        let results = compute_match_statistics(vec![]);
        assert_eq!(results.white_wins, 0);
        assert_eq!(results.black_wins, 0);
        assert_eq!(results.draws, 0);
        assert_eq!(results.unfinished, 0);
        assert_eq!(results.avg_plies, 0.0);
    }

    #[test]
    fn test_compute_match_statistics() {
        let games = vec![
            record(1, GameResult::WhiteWins, 10),
            record(2, GameResult::BlackWins, 20),
            record(3, GameResult::Draw, 30),
            record(4, GameResult::WhiteWins, 40),
        ];

        let results = compute_match_statistics(games);
        assert_eq!(results.white_wins, 2);
        assert_eq!(results.black_wins, 1);
        assert_eq!(results.draws, 1);
        assert_eq!(results.unfinished, 0);
        assert_eq!(results.avg_plies, 25.0);
    }

    #[test]
    fn test_unfinished_games_are_not_draws() {
        let games = vec![
            record(1, GameResult::Draw, 80),
            record(2, GameResult::Ongoing, 12),
            record(3, GameResult::Ongoing, 30),
            record(4, GameResult::BlackWins, 50),
        ];

        let results = compute_match_statistics(games);
        assert_eq!(results.draws, 1);
        assert_eq!(results.unfinished, 2);
        assert_eq!(results.black_wins, 1);
        assert_eq!(
            results.white_wins + results.black_wins + results.draws + results.unfinished,
            results.games.len()
        );
    }

    #[test]
    fn test_short_games_finish() {
        let results = play_match(&args(2, 3), 42).unwrap();
        assert_eq!(results.games.len(), 2);
        for game in &results.games {
            assert_ne!(game.result, GameResult::Ongoing);
            assert_eq!(game.plies, 6);
        }
    }

    #[test]
    fn test_seeded_match_is_reproducible() {
        let a = play_match(&args(1, 2), 7).unwrap();
        let b = play_match(&args(1, 2), 7).unwrap();
        assert_eq!(a.games[0].moves, b.games[0].moves);
    }
}
