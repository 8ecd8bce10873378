//! Error types

use crate::board::Coord;

fn target_name(to: &Option<Coord>) -> String {
    to.map(|c| c.name()).unwrap_or_else(|| "EDGE".to_string())
}

/// Rejected game actions. The game is left untouched.
#[derive(Debug, thiserror::Error)]
pub enum GameError {
    #[error("illegal move {notation}: {from} cannot move to {}", target_name(.to))]
    IllegalMove {
        from: Coord,
        to: Option<Coord>,
        notation: String,
    },

    #[error("the game is over")]
    GameOver,

    #[error("no move to undo")]
    NothingToUndo,
}

/// Malformed move text
#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum NotationError {
    #[error("expected '<from> to <dest>', got '{0}'")]
    MissingSeparator(String),

    #[error("unknown coordinate '{0}'")]
    UnknownCoordinate(String),

    #[error("{to} is not adjacent to {from}")]
    NotAdjacent { from: Coord, to: Coord },

    #[error("{first} and {last} are not two apart on a straight line")]
    NotALine { first: Coord, last: Coord },

    #[error("{0} has no neighbor in the move direction")]
    NoRoom(Coord),

    #[error("only a single marble can move off the edge")]
    EdgeRange,
}

/// Malformed board-position text or layout name
#[derive(Debug, thiserror::Error)]
pub enum LayoutError {
    #[error("bad cell token '{0}'")]
    BadToken(String),

    #[error("cell {0} listed twice")]
    DuplicateCell(String),

    #[error("unknown layout '{0}'")]
    UnknownLayout(String),
}

/// Reasons a search cannot start
#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum SearchError {
    #[error("position is already decided")]
    GameOver,

    #[error("side to move has no legal moves")]
    NoLegalMoves,
}
