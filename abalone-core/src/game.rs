//! Board state, move model and game sequencing

use crate::board::{
    are_neighbors, find_coord_between, on_edge, on_same_axis, Coord, Direction, Neighbor,
    ALL_COORDS, NUM_CELLS, ROWS, ROW_LENGTHS, ROW_OFFSETS,
};
use crate::error::GameError;
use crate::movegen::{legal_moves, OrderedMove};
use crate::notation;
use crate::zobrist;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::hash::{Hash, Hasher};

// ============================================================================
// CONSTANTS
// ============================================================================

/// Captures needed to win
pub const SCORE_TO_WIN: u32 = 6;

/// Opening moves are drawn from this many of the most promising candidates
const OPENING_CANDIDATES: usize = 10;

// ============================================================================
// CORE TYPES
// ============================================================================

/// Marble color
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Player {
    Black = 0,
    White = 1,
}

impl Player {
    pub fn opponent(self) -> Self {
        match self {
            Player::Black => Player::White,
            Player::White => Player::Black,
        }
    }

    pub fn index(self) -> usize {
        self as usize
    }

    /// Lowercase letter used by the board-position text format
    pub fn letter(self) -> char {
        match self {
            Player::Black => 'b',
            Player::White => 'w',
        }
    }

    pub fn from_letter(c: char) -> Option<Self> {
        match c.to_ascii_lowercase() {
            'b' => Some(Player::Black),
            'w' => Some(Player::White),
            _ => None,
        }
    }
}

impl fmt::Display for Player {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Player::Black => f.write_str("Black"),
            Player::White => f.write_str("White"),
        }
    }
}

/// Game result
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameResult {
    Ongoing,
    BlackWins,
    WhiteWins,
    Draw,
}

impl GameResult {
    fn win_for(player: Player) -> Self {
        match player {
            Player::Black => GameResult::BlackWins,
            Player::White => GameResult::WhiteWins,
        }
    }
}

// ============================================================================
// BOARD
// ============================================================================

/// 61 cells, each empty or holding one marble. Small enough to copy per node.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Board {
    cells: [Option<Player>; NUM_CELLS],
}

impl Default for Board {
    fn default() -> Self {
        Self::empty()
    }
}

impl Board {
    pub fn empty() -> Self {
        Self {
            cells: [None; NUM_CELLS],
        }
    }

    /// Build from jagged rows, top row first
    pub fn from_rows(rows: &[&[Option<Player>]; ROWS]) -> Self {
        let mut board = Board::empty();
        for (y, row) in rows.iter().enumerate() {
            debug_assert_eq!(row.len(), ROW_LENGTHS[y] as usize);
            let offset = ROW_OFFSETS[y] as usize;
            board.cells[offset..offset + row.len()].copy_from_slice(row);
        }
        board
    }

    pub fn get(&self, coord: Coord) -> Option<Player> {
        self.cells[coord.index()]
    }

    pub fn set(&mut self, coord: Coord, cell: Option<Player>) {
        self.cells[coord.index()] = cell;
    }

    /// Swap in `cell`, folding the change into `key`
    fn replace(&mut self, coord: Coord, cell: Option<Player>, key: &mut u64) -> Option<Player> {
        let old = std::mem::replace(&mut self.cells[coord.index()], cell);
        *key ^= zobrist::cell_key(coord, old) ^ zobrist::cell_key(coord, cell);
        old
    }

    /// Coordinates holding `player`'s marbles, in flat-index order
    pub fn marbles(&self, player: Player) -> impl Iterator<Item = Coord> + '_ {
        ALL_COORDS
            .iter()
            .copied()
            .filter(move |&c| self.get(c) == Some(player))
    }

    pub fn count(&self, player: Player) -> usize {
        self.cells.iter().filter(|&&c| c == Some(player)).count()
    }

    /// Apply a move that the caller has already validated.
    /// Returns the color of the marble pushed off the board, if any.
    pub fn apply_move(&mut self, mv: &Move) -> Option<Player> {
        let mut key = 0;
        self.apply_move_keyed(mv, &mut key)
    }

    /// `apply_move` that also updates a Zobrist `key` of this board
    pub fn apply_move_keyed(&mut self, mv: &Move, key: &mut u64) -> Option<Player> {
        debug_assert!(mv.pushes().iter().all(|p| self.get(p.from).is_some()), "empty source in {}", mv);
        mv.pushes()
            .iter()
            .fold(None, |pushed_off, push| self.push_piece(push, key).or(pushed_off))
    }

    /// Copy, then apply
    pub fn with_move(&self, mv: &Move) -> (Board, Option<Player>) {
        let mut next = *self;
        let pushed_off = next.apply_move(mv);
        (next, pushed_off)
    }

    /// Shift the column starting at `push.from` one cell forward
    fn push_piece(&mut self, push: &Push, key: &mut u64) -> Option<Player> {
        let mut carried = self.replace(push.from, None, key);
        let mut next = push.to;
        while let (Some(n), Some(piece)) = (next, carried) {
            carried = self.replace(n.coord, Some(piece), key);
            next = n.next();
        }
        // The walk stops at an empty cell (nothing carried) or at the edge
        carried
    }
}

impl fmt::Debug for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for y in 0..ROWS {
            let indent = 9 - ROW_LENGTHS[y] as usize;
            write!(f, "{}", " ".repeat(indent))?;
            for x in 0..ROW_LENGTHS[y] {
                let c = match self.cells[ROW_OFFSETS[y] as usize + x as usize] {
                    None => '.',
                    Some(Player::Black) => 'B',
                    Some(Player::White) => 'W',
                };
                write!(f, "{} ", c)?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

// ============================================================================
// MOVES
// ============================================================================

/// One marble relocating one cell; `to == None` means off the board
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Push {
    pub from: Coord,
    pub to: Option<Neighbor>,
}

impl Push {
    pub fn new(from: Coord, direction: Direction) -> Self {
        Self {
            from,
            to: from.neighbor(direction),
        }
    }

    pub fn off_board(from: Coord) -> Self {
        Self { from, to: None }
    }

    pub fn direction(&self) -> Option<Direction> {
        self.to.map(|n| n.direction)
    }
}

/// One turn: 1 to 3 pushes. Inline moves are a single push from the back of
/// the column; sidesteps carry one push per marble.
#[derive(Clone, Copy)]
pub struct Move {
    pushes: [Push; 3],
    len: u8,
}

impl Move {
    pub fn single(push: Push) -> Self {
        Self {
            pushes: [push; 3],
            len: 1,
        }
    }

    pub fn from_pushes(pushes: &[Push]) -> Option<Self> {
        let first = *pushes.first()?;
        if pushes.len() > 3 {
            return None;
        }
        let mut slots = [first; 3];
        slots[..pushes.len()].copy_from_slice(pushes);
        Some(Self {
            pushes: slots,
            len: pushes.len() as u8,
        })
    }

    pub fn pushes(&self) -> &[Push] {
        &self.pushes[..self.len as usize]
    }

    pub fn len(&self) -> usize {
        self.len as usize
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Direction shared by the pushes (`None` for self-elimination)
    pub fn direction(&self) -> Option<Direction> {
        self.pushes[0].direction()
    }
}

impl PartialEq for Move {
    fn eq(&self, other: &Self) -> bool {
        self.pushes() == other.pushes()
    }
}

impl Eq for Move {}

impl Hash for Move {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.pushes().hash(state);
    }
}

impl fmt::Debug for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Move({})", notation::format_move(self))
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&notation::format_move(self))
    }
}

// ============================================================================
// LEGALITY
// ============================================================================

/// Source holds the mover's marble and the destination is empty, or the
/// marble steps off from an edge cell
pub fn is_legal_one_step(board: &Board, mover: Player, push: &Push) -> bool {
    if board.get(push.from) != Some(mover) {
        return false;
    }
    match push.to {
        None => on_edge(push.from),
        Some(n) => board.get(n.coord).is_none(),
    }
}

/// Column push: own marbles must outnumber the opponent column, which must
/// end at an empty cell or the edge
pub fn is_legal_inline(board: &Board, mover: Player, opponent: Player, push: &Push) -> bool {
    if board.get(push.from) != Some(mover) {
        return false;
    }
    let Some(to) = push.to else {
        return false;
    };

    let mut own = 1;
    let mut next = Some(to);
    while let Some(n) = next {
        if board.get(n.coord) != Some(mover) {
            break;
        }
        own += 1;
        if own == 4 {
            return false;
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
            return false;
        }
        next = n.next();
    }

    match next {
        // Off the board: only legal when it ejects an opponent marble
        None => theirs > 0,
        Some(n) => board.get(n.coord).is_none(),
    }
}

/// Broadside move: parallel single steps of 1-3 adjacent, collinear marbles
pub fn is_legal_sidestep(board: &Board, mover: Player, mv: &Move) -> bool {
    let pushes = mv.pushes();
    if pushes.is_empty() || pushes.len() > 3 {
        return false;
    }
    if !pushes.iter().all(|p| is_legal_one_step(board, mover, p)) {
        return false;
    }
    if pushes.len() > 1 && pushes.iter().any(|p| p.to.is_none()) {
        return false;
    }
    let direction = pushes[0].direction();
    if pushes.iter().any(|p| p.direction() != direction) {
        return false;
    }

    match pushes {
        [_] => true,
        [a, b] => are_neighbors(a.from, b.from),
        [a, b, c] => {
            on_same_axis(a.from, b.from, c.from)
                && (find_coord_between(a.from, c.from) == Some(b.from)
                    || find_coord_between(a.from, b.from) == Some(c.from)
                    || find_coord_between(b.from, c.from) == Some(a.from))
        }
        _ => false,
    }
}

pub fn is_legal(board: &Board, mover: Player, opponent: Player, mv: &Move) -> bool {
    (mv.len() == 1 && is_legal_inline(board, mover, opponent, &mv.pushes()[0]))
        || is_legal_sidestep(board, mover, mv)
}

// ============================================================================
// SEARCH POSITION
// ============================================================================

/// Immutable search state: everything terminal detection and evaluation need
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Position {
    pub board: Board,
    pub max_player: Player,
    pub to_move: Player,
    /// Remaining move allotment, indexed by `Player::index`
    pub moves_left: [u32; 2],
    pub max_score: u32,
    pub min_score: u32,
    /// Zobrist key of `board` and `to_move`, kept current by `child`
    pub key: u64,
}

impl Position {
    /// Root position with the maximizer to move
    pub fn new(
        board: Board,
        max_player: Player,
        moves_left_black: u32,
        moves_left_white: u32,
        max_score: u32,
        min_score: u32,
    ) -> Self {
        Self {
            board,
            max_player,
            to_move: max_player,
            moves_left: [moves_left_black, moves_left_white],
            max_score,
            min_score,
            key: zobrist::hash(&board, max_player),
        }
    }

    pub fn min_player(&self) -> Player {
        self.max_player.opponent()
    }

    pub fn moves_left(&self, player: Player) -> u32 {
        self.moves_left[player.index()]
    }

    pub fn is_game_over(&self) -> bool {
        (self.moves_left[0] == 0 && self.moves_left[1] == 0)
            || self.max_score >= SCORE_TO_WIN
            || self.min_score >= SCORE_TO_WIN
    }

    /// Legal moves for the side to move
    pub fn legal_moves(&self) -> Vec<OrderedMove> {
        legal_moves(&self.board, self.to_move, self.to_move.opponent())
    }

    /// The position after the side to move plays `mv`
    pub fn child(&self, mv: &Move) -> Position {
        let mut next = *self;
        if let Some(color) = next.board.apply_move_keyed(mv, &mut next.key) {
            if color == next.max_player {
                next.min_score += 1;
            } else {
                next.max_score += 1;
            }
        }
        let mover = self.to_move.index();
        next.moves_left[mover] = next.moves_left[mover].saturating_sub(1);
        next.to_move = self.to_move.opponent();
        next.key ^= zobrist::side_key();
        next
    }
}

// ============================================================================
// GAME
// ============================================================================

/// Notifications produced by `Game::make_move`, in order
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GameEvent {
    MoveApplied {
        player: Player,
        mv: Move,
        pushed_off: Option<Player>,
    },
    ScoreChanged {
        black: u32,
        white: u32,
    },
    TurnEnded {
        next: Player,
        moves_left: u32,
    },
    GameOver {
        result: GameResult,
    },
}

#[derive(Clone, Debug)]
struct Snapshot {
    board: Board,
    current: Player,
    scores: [u32; 2],
    moves_left: [u32; 2],
    result: GameResult,
}

/// A game in progress: board, turn, scores, allotments and undo history
#[derive(Clone, Debug)]
pub struct Game {
    board: Board,
    current: Player,
    /// Marbles captured by each player
    scores: [u32; 2],
    moves_left: [u32; 2],
    result: GameResult,
    history: Vec<Snapshot>,
}

impl Game {
    /// Black moves first; each player gets `move_limit` moves
    pub fn new(board: Board, move_limit: u32) -> Self {
        Self {
            board,
            current: Player::Black,
            scores: [0, 0],
            moves_left: [move_limit, move_limit],
            result: GameResult::Ongoing,
            history: Vec::new(),
        }
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn current_player(&self) -> Player {
        self.current
    }

    pub fn score(&self, player: Player) -> u32 {
        self.scores[player.index()]
    }

    pub fn moves_left(&self, player: Player) -> u32 {
        self.moves_left[player.index()]
    }

    pub fn result(&self) -> GameResult {
        self.result
    }

    pub fn is_over(&self) -> bool {
        self.result != GameResult::Ongoing
    }

    /// Number of moves that can be undone
    pub fn plies(&self) -> usize {
        self.history.len()
    }

    pub fn legal_moves(&self) -> Vec<OrderedMove> {
        legal_moves(&self.board, self.current, self.current.opponent())
    }

    /// Search position from the point of view of the side to move
    pub fn position(&self) -> Position {
        let me = self.current;
        Position::new(
            self.board,
            me,
            self.moves_left[Player::Black.index()],
            self.moves_left[Player::White.index()],
            self.scores[me.index()],
            self.scores[me.opponent().index()],
        )
    }

    /// Validate and play a move for the side to move
    pub fn make_move(&mut self, mv: Move) -> Result<Vec<GameEvent>, GameError> {
        if self.is_over() {
            return Err(GameError::GameOver);
        }
        let mover = self.current;
        if !is_legal(&self.board, mover, mover.opponent(), &mv) {
            let first = mv.pushes()[0];
            return Err(GameError::IllegalMove {
                from: first.from,
                to: first.to.map(|n| n.coord),
                notation: notation::format_move(&mv),
            });
        }

        self.history.push(self.snapshot());

        let mut events = Vec::with_capacity(4);
        let pushed_off = self.board.apply_move(&mv);
        events.push(GameEvent::MoveApplied {
            player: mover,
            mv,
            pushed_off,
        });

        if let Some(color) = pushed_off {
            self.scores[color.opponent().index()] += 1;
            events.push(GameEvent::ScoreChanged {
                black: self.scores[Player::Black.index()],
                white: self.scores[Player::White.index()],
            });
        }

        let slot = &mut self.moves_left[mover.index()];
        *slot = slot.saturating_sub(1);
        self.current = mover.opponent();
        events.push(GameEvent::TurnEnded {
            next: self.current,
            moves_left: self.moves_left[self.current.index()],
        });

        self.result = self.compute_result();
        if self.is_over() {
            events.push(GameEvent::GameOver {
                result: self.result,
            });
        }

        Ok(events)
    }

    /// Parse notation and play it
    pub fn make_move_str(&mut self, text: &str) -> anyhow::Result<Vec<GameEvent>> {
        let mv = notation::parse_move(text)?;
        Ok(self.make_move(mv)?)
    }

    /// Restore the state before the last move
    pub fn undo(&mut self) -> Result<(), GameError> {
        let snapshot = self.history.pop().ok_or(GameError::NothingToUndo)?;
        self.board = snapshot.board;
        self.current = snapshot.current;
        self.scores = snapshot.scores;
        self.moves_left = snapshot.moves_left;
        self.result = snapshot.result;
        Ok(())
    }

    /// A random pick among the most promising opening moves
    pub fn random_opening_move<R: Rng>(&self, rng: &mut R) -> Option<Move> {
        let mut moves = self.legal_moves();
        if moves.is_empty() {
            return None;
        }
        moves.sort_by_key(|m| m.move_type);
        let pool = moves.len().min(OPENING_CANDIDATES);
        Some(moves[rng.gen_range(0..pool)].mv)
    }

    fn snapshot(&self) -> Snapshot {
        Snapshot {
            board: self.board,
            current: self.current,
            scores: self.scores,
            moves_left: self.moves_left,
            result: self.result,
        }
    }

    fn compute_result(&self) -> GameResult {
        for player in [Player::Black, Player::White] {
            if self.scores[player.index()] >= SCORE_TO_WIN {
                return GameResult::win_for(player);
            }
        }
        if self.moves_left == [0, 0] {
            let black = self.scores[Player::Black.index()];
            let white = self.scores[Player::White.index()];
            return match black.cmp(&white) {
                std::cmp::Ordering::Greater => GameResult::BlackWins,
                std::cmp::Ordering::Less => GameResult::WhiteWins,
                std::cmp::Ordering::Equal => GameResult::Draw,
            };
        }
        GameResult::Ongoing
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::{parse_position, Layout};

    fn c(name: &str) -> Coord {
        Coord::from_name(name).unwrap()
    }

    fn step(from: &str, direction: Direction) -> Move {
        Move::single(Push::new(c(from), direction))
    }

    #[test]
    fn test_single_step_from_standard() {
        let board = Layout::Standard.board();
        let mv = step("C3", Direction::NE);
        assert_eq!(mv.pushes()[0].to.unwrap().coord, c("D4"));
        assert!(is_legal(&board, Player::Black, Player::White, &mv));

        let (after, pushed_off) = board.with_move(&mv);
        assert_eq!(pushed_off, None);
        assert_eq!(after.get(c("C3")), None);
        assert_eq!(after.get(c("D4")), Some(Player::Black));
        assert_eq!(after.count(Player::Black), 14);
    }

    #[test]
    fn test_inline_push_counts() {
        // Three black push two white toward the top edge
        let board = parse_position("C5b,D5b,E5b,F5w,G5w").unwrap();
        let mv = step("C5", Direction::NW);
        assert!(is_legal_inline(&board, Player::Black, Player::White, &mv.pushes()[0]));

        // Two cannot push two
        let board = parse_position("D5b,E5b,F5w,G5w").unwrap();
        assert!(!is_legal_inline(&board, Player::Black, Player::White, &step("D5", Direction::NW).pushes()[0]));

        // Four in a row is not a move
        let board = parse_position("C5b,D5b,E5b,F5b").unwrap();
        assert!(!is_legal_inline(&board, Player::Black, Player::White, &step("C5", Direction::NW).pushes()[0]));

        // Blocked by a marble behind the opponent column
        let board = parse_position("C5b,D5b,E5b,F5w,G5b").unwrap();
        assert!(!is_legal_inline(&board, Player::Black, Player::White, &step("C5", Direction::NW).pushes()[0]));

        // Own column running into the edge without an opponent is illegal
        let board = parse_position("H5b,I5b").unwrap();
        assert!(!is_legal_inline(&board, Player::Black, Player::White, &step("H5", Direction::NW).pushes()[0]));
    }

    #[test]
    fn test_capture_removes_one_marble() {
        // Three black push two white off the top edge
        let board = parse_position("E5b,F5b,G5b,H5w,I5w").unwrap();
        let mv = step("E5", Direction::NW);
        assert!(is_legal(&board, Player::Black, Player::White, &mv));
        let whites_before = board.count(Player::White);
        let (after, pushed_off) = board.with_move(&mv);
        assert_eq!(pushed_off, Some(Player::White));
        assert_eq!(after.count(Player::White), whites_before - 1);
        assert_eq!(after.count(Player::Black), 3);
        assert_eq!(after.get(c("E5")), None);
        assert_eq!(after.get(c("H5")), Some(Player::Black));
        assert_eq!(after.get(c("I5")), Some(Player::White));
    }

    #[test]
    fn test_sidestep_legality() {
        let board = parse_position("C3b,C4b,C5b").unwrap();
        let two = Move::from_pushes(&[
            Push::new(c("C3"), Direction::NE),
            Push::new(c("C4"), Direction::NE),
        ])
        .unwrap();
        assert!(is_legal(&board, Player::Black, Player::White, &two));

        let three = Move::from_pushes(&[
            Push::new(c("C3"), Direction::NW),
            Push::new(c("C4"), Direction::NW),
            Push::new(c("C5"), Direction::NW),
        ])
        .unwrap();
        assert!(is_legal(&board, Player::Black, Player::White, &three));
        let (after, _) = board.with_move(&three);
        for name in ["D3", "D4", "D5"] {
            assert_eq!(after.get(c(name)), Some(Player::Black));
        }

        // Mixed directions
        let mixed = Move::from_pushes(&[
            Push::new(c("C3"), Direction::NW),
            Push::new(c("C4"), Direction::NE),
        ])
        .unwrap();
        assert!(!is_legal(&board, Player::Black, Player::White, &mixed));
    }

    #[test]
    fn test_sidestep_rejects_non_adjacent_sources() {
        let board = parse_position("C3b,C5b").unwrap();
        for direction in Direction::ALL {
            let mv = Move::from_pushes(&[
                Push::new(c("C3"), direction),
                Push::new(c("C5"), direction),
            ])
            .unwrap();
            assert!(!is_legal(&board, Player::Black, Player::White, &mv), "{:?}", direction);
        }
    }

    #[test]
    fn test_three_sidestep_requires_contiguous_line() {
        let board = parse_position("C3b,C4b,D5b").unwrap();
        let mv = Move::from_pushes(&[
            Push::new(c("C3"), Direction::SE),
            Push::new(c("C4"), Direction::SE),
            Push::new(c("D5"), Direction::SE),
        ])
        .unwrap();
        assert!(!is_legal(&board, Player::Black, Player::White, &mv));
    }

    #[test]
    fn test_self_elimination() {
        let board = parse_position("A1b,E5b").unwrap();
        let off = Move::single(Push::off_board(c("A1")));
        assert!(is_legal(&board, Player::Black, Player::White, &off));
        let (after, pushed_off) = board.with_move(&off);
        assert_eq!(pushed_off, Some(Player::Black));
        assert_eq!(after.count(Player::Black), 1);

        let not_edge = Move::single(Push::off_board(c("E5")));
        assert!(!is_legal(&board, Player::Black, Player::White, &not_edge));
    }

    #[test]
    fn test_position_child_scores() {
        let board = parse_position("E5b,F5b,G5b,H5w,I5w").unwrap();
        let pos = Position::new(board, Player::Black, 10, 10, 5, 0);
        let child = pos.child(&step("E5", Direction::NW));
        assert_eq!(child.max_score, 6);
        assert_eq!(child.to_move, Player::White);
        assert_eq!(child.moves_left(Player::Black), 9);
        assert!(child.is_game_over());
        assert!(!pos.is_game_over());
    }

    #[test]
    fn test_child_key_matches_full_hash() {
        let mut roots: Vec<Position> = [Layout::Standard, Layout::GermanDaisy, Layout::BelgianDaisy]
            .iter()
            .map(|layout| Position::new(layout.board(), Player::Black, 10, 10, 0, 0))
            .collect();
        // Inline pushes, a capture and a lone marble that can step off the edge
        let board = parse_position("E5b,F5b,G5b,H5w,I5w,A1w,A2w,B1w,A5b").unwrap();
        roots.push(Position::new(board, Player::Black, 10, 10, 0, 0));
        roots.push(Position::new(board, Player::White, 10, 10, 0, 0));

        for root in roots {
            assert_eq!(root.key, zobrist::hash(&root.board, root.to_move));
            for m in root.legal_moves() {
                let child = root.child(&m.mv);
                assert_eq!(child.key, zobrist::hash(&child.board, child.to_move), "{}", m.mv);
                for n in child.legal_moves() {
                    let grandchild = child.child(&n.mv);
                    assert_eq!(grandchild.key, zobrist::hash(&grandchild.board, grandchild.to_move));
                }
            }
        }

        let root = Position::new(board, Player::Black, 10, 10, 0, 0);
        let capture = root.child(&step("E5", Direction::NW));
        assert_eq!(capture.max_score, 1);
        assert_eq!(capture.key, zobrist::hash(&capture.board, Player::White));

        let off = root.child(&Move::single(Push::off_board(c("A5"))));
        assert_eq!(off.board.count(Player::Black), 3);
        assert_eq!(off.key, zobrist::hash(&off.board, Player::White));
    }

    #[test]
    fn test_game_flow_and_undo() {
        let mut game = Game::new(Layout::Standard.board(), 50);
        assert_eq!(game.current_player(), Player::Black);

        let events = game.make_move(step("C3", Direction::NE)).unwrap();
        assert!(matches!(events[0], GameEvent::MoveApplied { player: Player::Black, .. }));
        assert_eq!(
            events.last(),
            Some(&GameEvent::TurnEnded { next: Player::White, moves_left: 50 })
        );
        assert_eq!(game.moves_left(Player::Black), 49);

        let before = *game.board();
        let err = game.make_move(step("C3", Direction::NE)).unwrap_err();
        assert!(matches!(err, GameError::IllegalMove { .. }));
        assert_eq!(*game.board(), before);

        game.undo().unwrap();
        assert_eq!(*game.board(), Layout::Standard.board());
        assert_eq!(game.current_player(), Player::Black);
        assert!(matches!(game.undo(), Err(GameError::NothingToUndo)));
    }

    #[test]
    fn test_game_win_and_draw() {
        let board = parse_position("E5b,F5b,G5b,H5w,I5w,A1w").unwrap();
        let mut game = Game::new(board, 10);
        game.scores = [5, 0];
        let events = game.make_move(step("E5", Direction::NW)).unwrap();
        assert!(events.contains(&GameEvent::ScoreChanged { black: 6, white: 0 }));
        assert_eq!(game.result(), GameResult::BlackWins);
        assert!(matches!(game.make_move(step("F5", Direction::NE)), Err(GameError::GameOver)));

        let board = parse_position("E5b,A1w").unwrap();
        let mut game = Game::new(board, 1);
        game.make_move(step("E5", Direction::E)).unwrap();
        game.make_move(step("A1", Direction::E)).unwrap();
        assert_eq!(game.result(), GameResult::Draw);
    }

    #[test]
    fn test_random_opening_move_is_legal() {
        use rand::SeedableRng;
        let game = Game::new(Layout::BelgianDaisy.board(), 50);
        let mut rng = rand_chacha::ChaCha8Rng::seed_from_u64(7);
        for _ in 0..20 {
            let mv = game.random_opening_move(&mut rng).unwrap();
            assert!(is_legal(game.board(), Player::Black, Player::White, &mv));
        }
    }
}
