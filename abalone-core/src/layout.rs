//! Starting layouts and the board-position text format
//!
//! The text format lists occupied cells as conformance coordinate plus color
//! letter, e.g. `C5b,D5b,I9w`: blacks first, then whites, each group running
//! from row A to row I.

use crate::board::{Coord, ROWS};
use crate::error::LayoutError;
use crate::game::{Board, Player};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

const E: Option<Player> = None;
const W: Option<Player> = Some(Player::White);
const B: Option<Player> = Some(Player::Black);

const STANDARD: [&[Option<Player>]; ROWS] = [
    &[W, W, W, W, W],
    &[W, W, W, W, W, W],
    &[E, E, W, W, W, E, E],
    &[E, E, E, E, E, E, E, E],
    &[E, E, E, E, E, E, E, E, E],
    &[E, E, E, E, E, E, E, E],
    &[E, E, B, B, B, E, E],
    &[B, B, B, B, B, B],
    &[B, B, B, B, B],
];

const GERMAN_DAISY: [&[Option<Player>]; ROWS] = [
    &[E, E, E, E, E],
    &[W, W, E, E, B, B],
    &[W, W, W, E, B, B, B],
    &[E, W, W, E, E, B, B, E],
    &[E, E, E, E, E, E, E, E, E],
    &[E, B, B, E, E, W, W, E],
    &[B, B, B, E, W, W, W],
    &[B, B, E, E, W, W],
    &[E, E, E, E, E],
];

const BELGIAN_DAISY: [&[Option<Player>]; ROWS] = [
    &[W, W, E, B, B],
    &[W, W, W, B, B, B],
    &[E, W, W, E, B, B, E],
    &[E, E, E, E, E, E, E, E],
    &[E, E, E, E, E, E, E, E, E],
    &[E, E, E, E, E, E, E, E],
    &[E, B, B, E, W, W, E],
    &[B, B, B, W, W, W],
    &[B, B, E, W, W],
];

/// Starting position
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Layout {
    #[default]
    Standard,
    GermanDaisy,
    BelgianDaisy,
}

impl Layout {
    pub fn board(self) -> Board {
        match self {
            Layout::Standard => Board::from_rows(&STANDARD),
            Layout::GermanDaisy => Board::from_rows(&GERMAN_DAISY),
            Layout::BelgianDaisy => Board::from_rows(&BELGIAN_DAISY),
        }
    }
}

impl FromStr for Layout {
    type Err = LayoutError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().replace(['-', '_', ' '], "").as_str() {
            "standard" => Ok(Layout::Standard),
            "germandaisy" | "german" => Ok(Layout::GermanDaisy),
            "belgiandaisy" | "belgian" => Ok(Layout::BelgianDaisy),
            _ => Err(LayoutError::UnknownLayout(s.to_string())),
        }
    }
}

impl fmt::Display for Layout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Layout::Standard => f.write_str("standard"),
            Layout::GermanDaisy => f.write_str("german-daisy"),
            Layout::BelgianDaisy => f.write_str("belgian-daisy"),
        }
    }
}

/// Parse `C5b,D5b,...` in any order; empty input is an empty board
pub fn parse_position(text: &str) -> Result<Board, LayoutError> {
    let mut board = Board::empty();
    for token in text.split(',').map(str::trim).filter(|t| !t.is_empty()) {
        let split = token
            .char_indices()
            .last()
            .map(|(i, _)| i)
            .ok_or_else(|| LayoutError::BadToken(token.to_string()))?;
        let (name, color) = token.split_at(split);
        let coord = Coord::from_name(name).ok_or_else(|| LayoutError::BadToken(token.to_string()))?;
        let player = color
            .chars()
            .next()
            .and_then(Player::from_letter)
            .ok_or_else(|| LayoutError::BadToken(token.to_string()))?;
        if board.get(coord).is_some() {
            return Err(LayoutError::DuplicateCell(coord.name()));
        }
        board.set(coord, Some(player));
    }
    Ok(board)
}

/// Canonical text for a board: blacks then whites, row A first
pub fn format_position(board: &Board) -> String {
    let mut tokens = Vec::new();
    for player in [Player::Black, Player::White] {
        for y in (0..ROWS as u8).rev() {
            let mut x = 0;
            while let Some(coord) = Coord::new(x, y) {
                if board.get(coord) == Some(player) {
                    tokens.push(format!("{}{}", coord, player.letter()));
                }
                x += 1;
            }
        }
    }
    tokens.join(",")
}
