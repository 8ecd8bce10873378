//! Move text notation
//!
//! - `C3 to D4`: move the marble (or the column it leads) one step
//! - `C3-C5 to D3`: sidestep the range C3..C5; the destination is the first
//!   marble's, the rest follow in the same direction
//! - `A1 to EDGE`: push a marble off the board

use crate::board::{are_neighbors, find_coord_between, Coord};
use crate::error::NotationError;
use crate::game::{Move, Push};

const FROM_TO_SEPARATOR: &str = " TO ";
const RANGE_SEPARATOR: char = '-';
const EDGE: &str = "EDGE";

fn coord(text: &str) -> Result<Coord, NotationError> {
    Coord::from_name(text.trim()).ok_or_else(|| NotationError::UnknownCoordinate(text.trim().to_string()))
}

/// Parse notation into a move. Adjacency is checked, legality is not.
pub fn parse_move(input: &str) -> Result<Move, NotationError> {
    let normalized = input
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_ascii_uppercase();

    let (source, dest) = normalized
        .split_once(FROM_TO_SEPARATOR)
        .ok_or_else(|| NotationError::MissingSeparator(input.trim().to_string()))?;
    let dest = dest.trim();
    let to = if dest == EDGE { None } else { Some(coord(dest)?) };

    let range: Vec<&str> = source.split(RANGE_SEPARATOR).collect();
    match range.as_slice() {
        [single] => {
            let from = coord(single)?;
            let push = match to {
                None => Push::off_board(from),
                Some(to) => Push {
                    from,
                    to: Some(
                        from.neighbors()
                            .from_coord(to)
                            .ok_or(NotationError::NotAdjacent { from, to })?,
                    ),
                },
            };
            Ok(Move::single(push))
        }
        [first, last] => {
            let first = coord(first)?;
            let last = coord(last)?;
            let to = to.ok_or(NotationError::EdgeRange)?;
            let first_target = first
                .neighbors()
                .from_coord(to)
                .ok_or(NotationError::NotAdjacent { from: first, to })?;
            let direction = first_target.direction;
            let follow = |c: Coord| -> Result<Push, NotationError> {
                let target = c.neighbor(direction).ok_or(NotationError::NoRoom(c))?;
                Ok(Push {
                    from: c,
                    to: Some(target),
                })
            };

            let lead = Push {
                from: first,
                to: Some(first_target),
            };
            let pushes = if are_neighbors(first, last) {
                vec![lead, follow(last)?]
            } else {
                let between = find_coord_between(first, last).ok_or(NotationError::NotALine { first, last })?;
                vec![lead, follow(between)?, follow(last)?]
            };
            Move::from_pushes(&pushes).ok_or(NotationError::MissingSeparator(input.trim().to_string()))
        }
        _ => Err(NotationError::UnknownCoordinate(source.to_string())),
    }
}

/// Inverse of `parse_move` for moves laid out the way the generator and
/// parser produce them
pub fn format_move(mv: &Move) -> String {
    let pushes = mv.pushes();
    let first = pushes[0];
    let dest = match first.to {
        Some(n) => n.coord.name(),
        None => "EDGE".to_string(),
    };
    match pushes.last() {
        Some(last) if pushes.len() > 1 => format!("{}-{} to {}", first.from, last.from, dest),
        _ => format!("{} to {}", first.from, dest),
    }
}
