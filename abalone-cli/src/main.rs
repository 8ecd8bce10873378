//! Abalone CLI - Command-line interface
//!
//! Commands:
//! - moves: Generate legal moves for `.input` fixture files
//! - play: Play a single game (AI or human per color)
//! - match: Play AI-vs-AI games in parallel

mod match_cmd;
mod moves_cmd;
mod play_cmd;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "abalone")]
#[command(about = "Abalone engine with an alpha-beta AI")]
struct Cli {
    /// Random seed for reproducibility
    #[arg(long, global = true)]
    seed: Option<u64>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write .move and .board files for every .input file
    Moves(moves_cmd::MovesArgs),
    /// Play a single game
    Play(play_cmd::PlayArgs),
    /// Play AI-vs-AI games at a fixed depth
    Match(match_cmd::MatchArgs),
}

fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Moves(args) => moves_cmd::run(args),
        Commands::Play(args) => play_cmd::run(args, cli.seed),
        Commands::Match(args) => match_cmd::run(args, cli.seed),
    }
}
