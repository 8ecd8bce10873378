//! Legal move generation with ordering classes for the search

use crate::board::{Coord, Direction};
use crate::game::{Board, Move, Player, Push};
use serde::{Deserialize, Serialize};

/// Coarse move class. Declaration order is search order: captures and big
/// pushes first.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum MoveType {
    ThreePushTwoCapture,
    ThreePushOneCapture,
    TwoPushOneCapture,
    ThreePushTwo,
    ThreePushOne,
    TwoPushOne,
    ThreeInline,
    TwoInline,
    ThreeSidestep,
    TwoSidestep,
    One,
}

impl MoveType {
    pub fn inline(own: usize, theirs: usize, capture: bool) -> Self {
        match (own, theirs, capture) {
            (3, 2, true) => MoveType::ThreePushTwoCapture,
            (3, 2, false) => MoveType::ThreePushTwo,
            (3, 1, true) => MoveType::ThreePushOneCapture,
            (3, 1, false) => MoveType::ThreePushOne,
            (3, _, _) => MoveType::ThreeInline,
            (2, 1, true) => MoveType::TwoPushOneCapture,
            (2, 1, false) => MoveType::TwoPushOne,
            (2, _, _) => MoveType::TwoInline,
            _ => MoveType::One,
        }
    }

    pub fn sidestep(marbles: usize) -> Self {
        if marbles == 3 {
            MoveType::ThreeSidestep
        } else {
            MoveType::TwoSidestep
        }
    }

    pub fn is_capture(self) -> bool {
        matches!(
            self,
            MoveType::ThreePushTwoCapture | MoveType::ThreePushOneCapture | MoveType::TwoPushOneCapture
        )
    }

    /// Pushes an opponent marble without ejecting it
    pub fn is_push(self) -> bool {
        matches!(
            self,
            MoveType::ThreePushTwo | MoveType::ThreePushOne | MoveType::TwoPushOne
        )
    }
}

/// A legal move tagged with its ordering class
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct OrderedMove {
    pub mv: Move,
    pub move_type: MoveType,
}

impl OrderedMove {
    fn new(mv: Move, move_type: MoveType) -> Self {
        Self { mv, move_type }
    }
}

/// Every legal move for `mover`. Self-elimination is never generated.
pub fn legal_moves(board: &Board, mover: Player, opponent: Player) -> Vec<OrderedMove> {
    let mut moves = Vec::with_capacity(64);
    for from in board.marbles(mover) {
        for direction in Direction::ALL {
            collect_from_direction(board, mover, opponent, from, direction, &mut moves);
        }
    }
    moves
}

/// Legal moves sorted most promising first
pub fn ordered_legal_moves(board: &Board, mover: Player, opponent: Player) -> Vec<OrderedMove> {
    let mut moves = legal_moves(board, mover, opponent);
    moves.sort_by_key(|m| m.move_type);
    moves
}

/// Walk the line starting at `from`. Sidesteps are only anchored at `from`;
/// every marble gets scanned in all six directions, which covers the rest.
fn collect_from_direction(
    board: &Board,
    mover: Player,
    opponent: Player,
    from: Coord,
    direction: Direction,
    moves: &mut Vec<OrderedMove>,
) {
    let Some(to) = from.neighbor(direction) else {
        return;
    };

    let mut own = 1;
    let mut middle = from;
    let mut next = Some(to);
    while let Some(n) = next {
        if board.get(n.coord) != Some(mover) {
            break;
        }
        own += 1;
        match own {
            2 => {
                middle = n.coord;
                forward_sidesteps(board, direction, &[from, n.coord], moves);
            }
            3 => forward_sidesteps(board, direction, &[from, middle, n.coord], moves),
            _ => return,
        }
        next = n.next();
    }

    let mut theirs = 0;
    while let Some(n) = next {
        if board.get(n.coord) != Some(opponent) {
            break;
        }
        theirs += 1;
        if own <= theirs {
            return;
        }
        next = n.next();
    }

    let inline = Move::single(Push {
        from,
        to: Some(to),
    });
    match next {
        None if theirs > 0 => moves.push(OrderedMove::new(inline, MoveType::inline(own, theirs, true))),
        Some(n) if board.get(n.coord).is_none() => {
            moves.push(OrderedMove::new(inline, MoveType::inline(own, theirs, false)))
        }
        _ => {}
    }
}

fn forward_sidesteps(board: &Board, direction: Direction, coords: &[Coord], moves: &mut Vec<OrderedMove>) {
    for side in [direction.forward_left(), direction.forward_right()] {
        if let Some(mv) = maybe_sidestep(board, side, coords) {
            moves.push(mv);
        }
    }
}

fn maybe_sidestep(board: &Board, side: Direction, coords: &[Coord]) -> Option<OrderedMove> {
    let mut pushes = Vec::with_capacity(3);
    for &coord in coords {
        let target = coord.neighbor(side)?;
        if board.get(target.coord).is_some() {
            return None;
        }
        pushes.push(Push {
            from: coord,
            to: Some(target),
        });
    }
    Move::from_pushes(&pushes).map(|mv| OrderedMove::new(mv, MoveType::sidestep(coords.len())))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::is_legal;
    use crate::layout::{parse_position, Layout};
    use std::collections::HashSet;

    fn move_set(moves: &[OrderedMove]) -> HashSet<Move> {
        moves.iter().map(|m| m.mv).collect()
    }

    #[test]
    fn test_standard_layout_symmetry() {
        let board = Layout::Standard.board();
        let black = legal_moves(&board, Player::Black, Player::White);
        let white = legal_moves(&board, Player::White, Player::Black);
        assert!(!black.is_empty());
        assert_eq!(black.len(), white.len());
    }

    #[test]
    fn test_generated_moves_are_legal_and_unique() {
        for layout in [Layout::Standard, Layout::GermanDaisy, Layout::BelgianDaisy] {
            let board = layout.board();
            for mover in [Player::Black, Player::White] {
                let moves = legal_moves(&board, mover, mover.opponent());
                assert_eq!(move_set(&moves).len(), moves.len());
                for m in &moves {
                    assert!(is_legal(&board, mover, mover.opponent(), &m.mv), "{:?}", m);
                }
            }
        }
    }

    #[test]
    fn test_regeneration_is_idempotent() {
        let board = Layout::GermanDaisy.board();
        let first = legal_moves(&board, Player::Black, Player::White);
        let second = legal_moves(&board, Player::Black, Player::White);
        assert_eq!(move_set(&first), move_set(&second));
    }

    #[test]
    fn test_lone_marble_has_six_steps() {
        let board = parse_position("E5b").unwrap();
        let moves = legal_moves(&board, Player::Black, Player::White);
        assert_eq!(moves.len(), 6);
        assert!(moves.iter().all(|m| m.move_type == MoveType::One));
    }

    #[test]
    fn test_pair_moves() {
        // A pair in open space: 2 inline moves, 4 sidesteps, 12 single steps
        // minus the two steps blocked by the partner
        let board = parse_position("E5b,E6b").unwrap();
        let moves = legal_moves(&board, Player::Black, Player::White);
        let count = |t: MoveType| moves.iter().filter(|m| m.move_type == t).count();
        assert_eq!(count(MoveType::TwoInline), 2);
        assert_eq!(count(MoveType::TwoSidestep), 4);
        assert_eq!(count(MoveType::One), 10);
    }

    #[test]
    fn test_capture_classification() {
        let board = parse_position("E5b,F5b,G5b,H5w,I5w").unwrap();
        let moves = ordered_legal_moves(&board, Player::Black, Player::White);
        assert_eq!(moves[0].move_type, MoveType::ThreePushTwoCapture);
        assert!(moves[0].move_type.is_capture());

        let board = parse_position("E5b,F5b,G5w").unwrap();
        let moves = ordered_legal_moves(&board, Player::Black, Player::White);
        assert_eq!(moves[0].move_type, MoveType::TwoPushOne);
        assert!(moves[0].move_type.is_push());

        // Balanced columns produce no push
        let board = parse_position("E5b,F5w").unwrap();
        let moves = legal_moves(&board, Player::Black, Player::White);
        assert!(moves.iter().all(|m| m.move_type == MoveType::One));
        assert_eq!(moves.len(), 5);
    }

    #[test]
    fn test_move_type_order() {
        assert!(MoveType::ThreePushTwoCapture < MoveType::TwoPushOneCapture);
        assert!(MoveType::TwoPushOne < MoveType::ThreeInline);
        assert!(MoveType::TwoSidestep < MoveType::One);
        assert_eq!(MoveType::inline(1, 0, false), MoveType::One);
        assert_eq!(MoveType::inline(3, 0, false), MoveType::ThreeInline);
    }
}
