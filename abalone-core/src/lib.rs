//! Abalone Core - Game engine and AI
//!
//! This crate provides the core game logic for Abalone:
//! - Board geometry (61-cell hex grid, precomputed neighbor tables)
//! - Move model, legality and the turn-by-turn game
//! - Ordered legal move generation
//! - Position evaluation with tunable heuristics
//! - Iterative-deepening alpha-beta search with a transposition table

pub mod board;
pub mod game;
pub mod movegen;
pub mod eval;
pub mod zobrist;
pub mod ai;
pub mod notation;
pub mod layout;
pub mod config;
pub mod error;

// Re-exports for convenient access
pub use board::{Coord, Direction, Neighbor, Neighbors, ALL_COORDS, NUM_CELLS};
pub use game::{Board, Game, GameEvent, GameResult, Move, Player, Position, Push, SCORE_TO_WIN};
pub use movegen::{legal_moves, ordered_legal_moves, MoveType, OrderedMove};
pub use eval::{evaluate, Evaluator, Heuristics, DRAW_VALUE, WIN_VALUE};
pub use ai::{search_best_move, AlphaBetaAI, SearchHandle, SearchLimit, SearchState};
pub use notation::{format_move, parse_move};
pub use layout::{format_position, parse_position, Layout};
pub use config::{Agent, AiConfig, GameConfig};
pub use error::{GameError, LayoutError, NotationError, SearchError};
