//! Game and search configuration
//!
//! `GameConfig` is read from JSON; every field is optional.

use crate::ai::AlphaBetaAI;
use crate::error::SearchError;
use crate::eval::Heuristics;
use crate::game::{Game, Move, Player, Position};
use crate::layout::Layout;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Moves each player gets per game
pub const DEFAULT_MOVE_LIMIT: u32 = 40;

/// Per-turn thinking time
pub const DEFAULT_TIME_LIMIT_MS: u64 = 5_000;

pub const DEFAULT_DEPTH: u32 = 3;

/// Who plays a color
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Agent {
    #[default]
    Ai,
    Human,
}

/// Game setup
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub black_agent: Agent,
    pub white_agent: Agent,
    pub black_time_limit_ms: u64,
    pub white_time_limit_ms: u64,
    /// Moves per player
    pub move_limit: u32,
    pub layout: Layout,
    pub heuristics: Heuristics,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            black_agent: Agent::Human,
            white_agent: Agent::Ai,
            black_time_limit_ms: DEFAULT_TIME_LIMIT_MS,
            white_time_limit_ms: DEFAULT_TIME_LIMIT_MS,
            move_limit: DEFAULT_MOVE_LIMIT,
            layout: Layout::Standard,
            heuristics: Heuristics::default(),
        }
    }
}

impl GameConfig {
    /// Read a JSON config file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        serde_json::from_str(&text).with_context(|| format!("Failed to parse config {}", path.display()))
    }

    pub fn agent(&self, player: Player) -> Agent {
        match player {
            Player::Black => self.black_agent,
            Player::White => self.white_agent,
        }
    }

    pub fn time_limit(&self, player: Player) -> Duration {
        Duration::from_millis(match player {
            Player::Black => self.black_time_limit_ms,
            Player::White => self.white_time_limit_ms,
        })
    }

    pub fn new_game(&self) -> Game {
        Game::new(self.layout.board(), self.move_limit)
    }

    /// Time-budgeted search settings for one color
    pub fn ai_config(&self, player: Player) -> AiConfig {
        AiConfig {
            time_limit_ms: Some(self.time_limit(player).as_millis() as u64),
            heuristics: self.heuristics.clone(),
            ..AiConfig::default()
        }
    }
}

/// Search settings for an AI player
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AiConfig {
    /// Fixed depth, used when there is no time limit
    pub depth: u32,
    /// Turn budget; the search deepens until it runs out
    pub time_limit_ms: Option<u64>,
    pub heuristics: Heuristics,
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            depth: DEFAULT_DEPTH,
            time_limit_ms: None,
            heuristics: Heuristics::default(),
        }
    }
}

impl AiConfig {
    /// Create config for a fixed-depth search
    pub fn alpha_beta(depth: u32) -> Self {
        Self {
            depth,
            ..Default::default()
        }
    }

    pub fn with_heuristics(mut self, heuristics: Heuristics) -> Self {
        self.heuristics = heuristics;
        self
    }

    pub fn with_time_limit(mut self, time_limit_ms: u64) -> Self {
        self.time_limit_ms = Some(time_limit_ms);
        self
    }

    pub fn player(&self) -> AlphaBetaAI {
        AlphaBetaAI::new(self.depth, self.heuristics.clone())
    }

    /// Pick a move for the side to move, by depth or by clock
    pub fn choose_move(&self, position: &Position) -> Result<Move, SearchError> {
        let ai = self.player();
        match self.time_limit_ms {
            Some(ms) => ai.best_move_within(position, Duration::from_millis(ms)),
            None => ai.best_move(position),
        }
    }
}
