//! Position evaluation

use crate::board::{distance_to_center, neighbors_of, Direction, BOARD_RADIUS};
use crate::game::{Board, Player, Position, SCORE_TO_WIN};
use crate::movegen::{legal_moves, OrderedMove};
use serde::{Deserialize, Serialize};

/// Win value (effectively infinite)
pub const WIN_VALUE: i32 = 1_000_000;

/// Both allotments used up with equal scores
pub const DRAW_VALUE: i32 = 0;

/// Aggression points per generated capture / push
const CAPTURE_AGGRESSION: i32 = 2;
const PUSH_AGGRESSION: i32 = 1;

/// Scores a position from the maximizing player's point of view
pub trait Evaluator: Send + Sync {
    fn evaluate(&self, position: &Position) -> i32;
}

/// Heuristic weights for position evaluation
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Heuristics {
    /// Per marble, per step closer to the center
    pub center_weight: i32,
    /// Per marble captured by the maximizer
    pub score_weight: i32,
    /// Per marble lost by the maximizer
    pub loss_weight: i32,
    /// Per same-color neighbor
    pub grouping_weight: i32,
    /// Per enemy marble caught between two of ours
    pub formation_break_weight: i32,
    /// Per aggression point in the maximizer's move set
    pub max_aggression_weight: i32,
    /// Per aggression point in the minimizer's move set
    pub min_aggression_weight: i32,
}

impl Default for Heuristics {
    fn default() -> Self {
        // Losses only matter once they decide the game, so they weigh
        // slightly less than gains
        Self {
            center_weight: 25,
            score_weight: 1000,
            loss_weight: 900,
            grouping_weight: 15,
            formation_break_weight: 30,
            max_aggression_weight: 100,
            min_aggression_weight: 50,
        }
    }
}

impl Heuristics {
    /// Center-heavy preset that ignores formation and our own aggression
    pub fn experimental() -> Self {
        Self {
            center_weight: 50,
            score_weight: 1000,
            loss_weight: 1000,
            grouping_weight: 20,
            formation_break_weight: 0,
            max_aggression_weight: 0,
            min_aggression_weight: 50,
        }
    }
}

impl Evaluator for Heuristics {
    fn evaluate(&self, position: &Position) -> i32 {
        evaluate(position, self)
    }
}

/// Terminal value, or `None` while the game is still open
pub fn win_loss(position: &Position) -> Option<i32> {
    if position.max_score >= SCORE_TO_WIN {
        return Some(WIN_VALUE);
    }
    if position.min_score >= SCORE_TO_WIN {
        return Some(-WIN_VALUE);
    }
    if position.moves_left == [0, 0] {
        return Some(match position.max_score.cmp(&position.min_score) {
            std::cmp::Ordering::Greater => WIN_VALUE,
            std::cmp::Ordering::Less => -WIN_VALUE,
            std::cmp::Ordering::Equal => DRAW_VALUE,
        });
    }
    None
}

/// Evaluate position from the maximizer's perspective
pub fn evaluate(position: &Position, heuristics: &Heuristics) -> i32 {
    if let Some(terminal) = win_loss(position) {
        return terminal;
    }

    let board = &position.board;
    let max = position.max_player;
    let min = position.min_player();

    let mut score = closeness_to_center(board, max) * heuristics.center_weight;
    score += position.max_score as i32 * heuristics.score_weight;
    score -= position.min_score as i32 * heuristics.loss_weight;
    score += (grouping(board, max) - grouping(board, min)) * heuristics.grouping_weight;
    score += (formation_break(board, max, min) - formation_break(board, min, max))
        * heuristics.formation_break_weight;

    if heuristics.max_aggression_weight != 0 {
        let max_moves = legal_moves(board, max, min);
        score += aggression_factor(&max_moves) * heuristics.max_aggression_weight;
    }
    if heuristics.min_aggression_weight != 0 {
        let min_moves = legal_moves(board, min, max);
        score -= aggression_factor(&min_moves) * heuristics.min_aggression_weight;
    }

    score
}

/// Evaluate with depth bonus for preferring faster wins
pub fn evaluate_with_depth<E: Evaluator + ?Sized>(position: &Position, evaluator: &E, depth: i32) -> i32 {
    match win_loss(position) {
        Some(v) if v > DRAW_VALUE => v + depth.max(0),
        Some(v) if v < DRAW_VALUE => v - depth.max(0),
        Some(v) => v,
        None => evaluator.evaluate(position),
    }
}

/// Reverse hex distance of each marble to the center, summed
pub fn closeness_to_center(board: &Board, player: Player) -> i32 {
    board
        .marbles(player)
        .map(|c| BOARD_RADIUS as i32 - distance_to_center(c) as i32)
        .sum()
}

/// Same-color neighbors of each marble (every pair counts from both ends)
pub fn grouping(board: &Board, player: Player) -> i32 {
    board
        .marbles(player)
        .map(|c| {
            neighbors_of(c)
                .iter()
                .filter(|n| board.get(n.coord) == Some(player))
                .count() as i32
        })
        .sum()
}

/// Enemy marbles sandwiched between two of `player`'s marbles, once per axis
pub fn formation_break(board: &Board, player: Player, opponent: Player) -> i32 {
    let axes = [Direction::NW, Direction::W, Direction::SW];
    board
        .marbles(opponent)
        .map(|c| {
            let neighbors = neighbors_of(c);
            axes.iter()
                .filter(|&&d| {
                    let owned = |dir| {
                        neighbors
                            .from_direction(dir)
                            .map_or(false, |n| board.get(n.coord) == Some(player))
                    };
                    owned(d) && owned(d.opposite())
                })
                .count() as i32
        })
        .sum()
}

/// Weighted count of pushing and capturing moves
pub fn aggression_factor(moves: &[OrderedMove]) -> i32 {
    moves
        .iter()
        .map(|m| {
            if m.move_type.is_capture() {
                CAPTURE_AGGRESSION
            } else if m.move_type.is_push() {
                PUSH_AGGRESSION
            } else {
                0
            }
        })
        .sum()
}
