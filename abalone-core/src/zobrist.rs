//! Zobrist hashing and the per-search transposition table

use crate::board::{Coord, NUM_CELLS};
use crate::game::{Board, Player};
use rand::prelude::*;
use rand_chacha::ChaCha8Rng;
use rustc_hash::FxHashMap;
use std::sync::LazyLock;

const ZOBRIST_SEED: u64 = 0x5EED_AB41_0E00_0001;

struct ZobristKeys {
    cells: [[u64; 2]; NUM_CELLS],
    white_to_move: u64,
}

static KEYS: LazyLock<ZobristKeys> = LazyLock::new(|| {
    let mut rng = ChaCha8Rng::seed_from_u64(ZOBRIST_SEED);
    let mut cells = [[0u64; 2]; NUM_CELLS];
    for cell in cells.iter_mut() {
        cell[0] = rng.gen();
        cell[1] = rng.gen();
    }
    ZobristKeys {
        cells,
        white_to_move: rng.gen(),
    }
});

/// Key contribution of one cell; zero when empty
pub fn cell_key(coord: Coord, cell: Option<Player>) -> u64 {
    cell.map_or(0, |player| KEYS.cells[coord.index()][player.index()])
}

/// Toggled every ply
pub fn side_key() -> u64 {
    KEYS.white_to_move
}

/// Hash of the occupied cells combined with the side to move.
/// `Position` keeps the same key incrementally.
pub fn hash(board: &Board, to_move: Player) -> u64 {
    let keys = &*KEYS;
    let mut h = 0;
    for player in [Player::Black, Player::White] {
        for coord in board.marbles(player) {
            h ^= keys.cells[coord.index()][player.index()];
        }
    }
    if to_move == Player::White {
        h ^= keys.white_to_move;
    }
    h
}

/// How a stored value relates to the true value of the node
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Bound {
    Exact,
    /// Search failed high: true value >= stored
    Lower,
    /// Search failed low: true value <= stored
    Upper,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TtEntry {
    pub value: i32,
    /// Remaining depth the value was computed with
    pub depth: i32,
    pub bound: Bound,
}

/// Search-local cache keyed by `hash`. Values are relative to the side to move.
#[derive(Debug, Default)]
pub struct TranspositionTable {
    entries: FxHashMap<u64, TtEntry>,
}

impl TranspositionTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Usable value for a node searched to `depth` within `(alpha, beta)`
    pub fn probe(&self, key: u64, depth: i32, alpha: i32, beta: i32) -> Option<i32> {
        let entry = self.entries.get(&key)?;
        if entry.depth < depth {
            return None;
        }
        match entry.bound {
            Bound::Exact => Some(entry.value),
            Bound::Lower if entry.value >= beta => Some(entry.value),
            Bound::Upper if entry.value <= alpha => Some(entry.value),
            _ => None,
        }
    }

    /// Always replaces
    pub fn store(&mut self, key: u64, value: i32, depth: i32, bound: Bound) {
        self.entries.insert(key, TtEntry { value, depth, bound });
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::{Move, Push};
    use crate::layout::Layout;
    use crate::board::{Coord, Direction};

    #[test]
    fn test_hash_is_stable() {
        let board = Layout::Standard.board();
        assert_eq!(hash(&board, Player::Black), hash(&board, Player::Black));
        assert_ne!(hash(&board, Player::Black), hash(&board, Player::White));
        assert_ne!(hash(&board, Player::Black), hash(&Board::empty(), Player::Black));
        assert_eq!(hash(&Board::empty(), Player::Black), 0);
    }

    #[test]
    fn test_transposed_boards_share_a_hash() {
        let start = Layout::Standard.board();
        let a = Move::single(Push::new(Coord::from_name("C3").unwrap(), Direction::NE));
        let b = Move::single(Push::new(Coord::from_name("C5").unwrap(), Direction::NE));

        let (ab, _) = start.with_move(&a);
        let (ab, _) = ab.with_move(&b);
        let (ba, _) = start.with_move(&b);
        let (ba, _) = ba.with_move(&a);
        assert_eq!(ab, ba);
        assert_eq!(hash(&ab, Player::Black), hash(&ba, Player::Black));
        assert_ne!(hash(&ab, Player::Black), hash(&start, Player::Black));
    }

    #[test]
    fn test_probe_bounds() {
        let mut tt = TranspositionTable::new();
        assert!(tt.is_empty());
        tt.store(1, 50, 3, Bound::Exact);
        tt.store(2, 50, 3, Bound::Lower);
        tt.store(3, 50, 3, Bound::Upper);
        assert_eq!(tt.len(), 3);

        assert_eq!(tt.probe(1, 3, -100, 100), Some(50));
        assert_eq!(tt.probe(1, 4, -100, 100), None);
        assert_eq!(tt.probe(2, 2, -100, 40), Some(50));
        assert_eq!(tt.probe(2, 2, -100, 100), None);
        assert_eq!(tt.probe(3, 2, 60, 100), Some(50));
        assert_eq!(tt.probe(3, 2, 0, 100), None);
        assert_eq!(tt.probe(9, 0, -100, 100), None);

        tt.store(1, -20, 1, Bound::Upper);
        assert_eq!(tt.len(), 3);
        assert_eq!(tt.probe(1, 3, -100, 100), None);
        assert_eq!(tt.probe(1, 1, -10, 100), Some(-20));
    }

    #[test]
    fn test_cell_and_side_keys() {
        let e5 = Coord::from_name("E5").unwrap();
        let mut board = Board::empty();
        board.set(e5, Some(Player::White));
        assert_eq!(cell_key(e5, None), 0);
        assert_eq!(hash(&board, Player::Black), cell_key(e5, Some(Player::White)));
        assert_eq!(hash(&board, Player::White), hash(&board, Player::Black) ^ side_key());
    }
}
