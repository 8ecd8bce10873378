//! Moves command - legal move dumps for `.input` fixtures
//!
//! An `.input` file holds the side to move (`b` or `w`) and a board position,
//! separated by whitespace. For `name.input` the command writes `name.move`
//! (one move per line) and `name.board` (the position after each move, same
//! order) next to it.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::Args;

use abalone_core::{format_move, format_position, legal_moves, parse_position, Board, OrderedMove, Player};

const INPUT_EXTENSION: &str = "input";

#[derive(Args)]
pub struct MovesArgs {
    /// An .input file or a directory of them
    #[arg(value_name = "PATH")]
    pub path: PathBuf,
}

// ============================================================================
// LEVEL 1 - ORCHESTRATION
// ============================================================================

pub fn run(args: MovesArgs) -> Result<()> {
    let inputs = collect_inputs(&args.path)?;
    if inputs.is_empty() {
        bail!("No .input files found in {}", args.path.display());
    }

    for input in &inputs {
        let count = process_input(input)?;
        tracing::info!("{}: {} moves", input.display(), count);
    }
    Ok(())
}

// ============================================================================
// LEVEL 2 - PHASES
// ============================================================================

fn collect_inputs(path: &Path) -> Result<Vec<PathBuf>> {
    if path.is_file() {
        return Ok(vec![path.to_path_buf()]);
    }
    let mut inputs = Vec::new();
    let entries = fs::read_dir(path).with_context(|| format!("Failed to read directory {}", path.display()))?;
    for entry in entries {
        let entry_path = entry?.path();
        if entry_path.is_file() && is_input_file(&entry_path) {
            inputs.push(entry_path);
        }
    }
    inputs.sort();
    Ok(inputs)
}

/// Write the `.move` and `.board` files for one input, returning the move count
fn process_input(input: &Path) -> Result<usize> {
    let text = fs::read_to_string(input).with_context(|| format!("Failed to read {}", input.display()))?;
    let (player, board) = parse_input(&text).with_context(|| format!("Bad input file {}", input.display()))?;

    let moves = legal_moves(&board, player, player.opponent());
    fs::write(input.with_extension("move"), move_lines(&moves))
        .with_context(|| format!("Failed to write moves for {}", input.display()))?;
    fs::write(input.with_extension("board"), board_lines(&board, &moves))
        .with_context(|| format!("Failed to write boards for {}", input.display()))?;
    Ok(moves.len())
}

// ============================================================================
// LEVEL 3 - STEPS
// ============================================================================

fn parse_input(text: &str) -> Result<(Player, Board)> {
    let mut tokens = text.split_whitespace();
    let Some(side) = tokens.next() else {
        bail!("empty input");
    };
    let player = side
        .chars()
        .next()
        .and_then(Player::from_letter)
        .with_context(|| format!("unknown player '{}'", side))?;
    let board = parse_position(tokens.next().unwrap_or(""))?;
    Ok((player, board))
}

fn move_lines(moves: &[OrderedMove]) -> String {
    moves.iter().map(|m| format_move(&m.mv)).collect::<Vec<_>>().join("\n")
}

fn board_lines(board: &Board, moves: &[OrderedMove]) -> String {
    moves
        .iter()
        .map(|m| format_position(&board.with_move(&m.mv).0))
        .collect::<Vec<_>>()
        .join("\n")
}

// ============================================================================
// LEVEL 4 - UTILITIES
// ============================================================================

fn is_input_file(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map_or(false, |e| e.eq_ignore_ascii_case(INPUT_EXTENSION))
}

// ============================================================================
// TESTS
// ============================================================================
