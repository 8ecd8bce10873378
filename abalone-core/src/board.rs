//! Hex board geometry over the jagged Abalone layout
//!
//! Cells are addressed by `(x, y)` = (column within row, row), rows numbered
//! from the top. The 9 rows have lengths 5,6,7,8,9,8,7,6,5, so a plain
//! `x ± 1` step changes meaning depending on which side of the equator a row
//! sits. All adjacency is therefore computed in axial hex coordinates
//! `(q, r)`, obtained through a row-dependent column shift.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::LazyLock;

/// Number of rows on the board
pub const ROWS: usize = 9;

/// Number of playable cells
pub const NUM_CELLS: usize = 61;

/// Index of the widest row
pub const EQUATOR: u8 = 4;

/// Board radius (distance from center to edge)
pub const BOARD_RADIUS: i8 = 4;

/// Length of each row, top to bottom
pub const ROW_LENGTHS: [u8; ROWS] = [5, 6, 7, 8, 9, 8, 7, 6, 5];

/// Flat index of the first cell of each row
pub const ROW_OFFSETS: [u8; ROWS] = [0, 5, 11, 18, 26, 35, 43, 50, 56];

/// The center cell (E5)
pub const CENTER: Coord = Coord { x: 4, y: EQUATOR };

// ============================================================================
// COORDINATES
// ============================================================================

/// A board cell. Only valid cells can be constructed outside this module.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Coord {
    x: u8,
    y: u8,
}

/// Every valid coordinate, in flat-index order
pub static ALL_COORDS: [Coord; NUM_CELLS] = build_coords();

const fn build_coords() -> [Coord; NUM_CELLS] {
    let mut coords = [Coord { x: 0, y: 0 }; NUM_CELLS];
    let mut y = 0;
    while y < ROWS {
        let mut x = 0;
        while x < ROW_LENGTHS[y] as usize {
            coords[ROW_OFFSETS[y] as usize + x] = Coord {
                x: x as u8,
                y: y as u8,
            };
            x += 1;
        }
        y += 1;
    }
    coords
}

/// First axial `q` of a row
fn row_q_min(r: i8) -> i8 {
    if r <= 0 {
        -BOARD_RADIUS - r
    } else {
        -BOARD_RADIUS
    }
}

impl Coord {
    /// Validated constructor
    pub fn new(x: u8, y: u8) -> Option<Self> {
        if (y as usize) < ROWS && x < ROW_LENGTHS[y as usize] {
            Some(Self { x, y })
        } else {
            None
        }
    }

    pub fn x(self) -> u8 {
        self.x
    }

    pub fn y(self) -> u8 {
        self.y
    }

    /// Position in the flat cell array
    pub fn index(self) -> usize {
        ROW_OFFSETS[self.y as usize] as usize + self.x as usize
    }

    pub fn from_index(index: usize) -> Option<Self> {
        ALL_COORDS.get(index).copied()
    }

    /// Axial coordinates `(q, r)` with the center at `(0, 0)`
    pub fn axial(self) -> (i8, i8) {
        let r = self.y as i8 - EQUATOR as i8;
        (self.x as i8 + row_q_min(r), r)
    }

    pub fn from_axial(q: i8, r: i8) -> Option<Self> {
        if r.abs() > BOARD_RADIUS || q.abs() > BOARD_RADIUS || (q + r).abs() > BOARD_RADIUS {
            return None;
        }
        let x = q - row_q_min(r);
        Coord::new(x as u8, (r + EQUATOR as i8) as u8)
    }

    pub fn neighbors(self) -> &'static Neighbors {
        neighbors_of(self)
    }

    /// The adjacent cell in `direction`, if it is on the board
    pub fn neighbor(self, direction: Direction) -> Option<Neighbor> {
        neighbors_of(self).from_direction(direction)
    }

    /// Conformance name, e.g. `E1` for the west end of the equator
    pub fn name(self) -> String {
        let (q, r) = self.axial();
        let letter = (b'A' + (EQUATOR as i8 - r) as u8) as char;
        format!("{}{}", letter, q + BOARD_RADIUS + 1)
    }

    /// Parse a conformance name (case-insensitive)
    pub fn from_name(name: &str) -> Option<Self> {
        let name = name.trim().to_ascii_uppercase();
        let mut chars = name.chars();
        let letter = chars.next()?;
        if !letter.is_ascii_uppercase() {
            return None;
        }
        let number: i8 = chars.as_str().parse().ok()?;
        let r = EQUATOR as i8 - (letter as u8 - b'A') as i8;
        let q = number.checked_sub(BOARD_RADIUS + 1)?;
        Coord::from_axial(q, r)
    }
}

impl fmt::Display for Coord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name())
    }
}

impl fmt::Debug for Coord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({},{})", self.name(), self.x, self.y)
    }
}

// ============================================================================
// DIRECTIONS
// ============================================================================

/// The six directions, counter-clockwise starting at north-west
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    NW = 0,
    W = 1,
    SW = 2,
    SE = 3,
    E = 4,
    NE = 5,
}

/// Axial deltas `(dq, dr)`, indexed by `Direction as usize`
const AXIAL_DELTAS: [(i8, i8); 6] = [
    (0, -1),  // NW
    (-1, 0),  // W
    (-1, 1),  // SW
    (0, 1),   // SE
    (1, 0),   // E
    (1, -1),  // NE
];

impl Direction {
    pub const ALL: [Direction; 6] = [
        Direction::NW,
        Direction::W,
        Direction::SW,
        Direction::SE,
        Direction::E,
        Direction::NE,
    ];

    pub fn from_index(index: usize) -> Self {
        Self::ALL[index % 6]
    }

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn opposite(self) -> Self {
        Self::from_index(self.index() + 3)
    }

    /// 60° counter-clockwise
    pub fn forward_left(self) -> Self {
        Self::from_index(self.index() + 1)
    }

    /// 60° clockwise
    pub fn forward_right(self) -> Self {
        Self::from_index(self.index() + 5)
    }

    pub fn axial_delta(self) -> (i8, i8) {
        AXIAL_DELTAS[self.index()]
    }
}

// ============================================================================
// NEIGHBORS
// ============================================================================

/// "The cell in `direction` from some origin"
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Neighbor {
    pub coord: Coord,
    pub direction: Direction,
}

impl Neighbor {
    /// Keep walking in the same direction
    pub fn next(self) -> Option<Neighbor> {
        self.coord.neighbor(self.direction)
    }
}

/// The six neighbor slots of a cell, `None` where the step leaves the board
#[derive(Clone, Debug)]
pub struct Neighbors {
    slots: [Option<Neighbor>; 6],
}

impl Neighbors {
    fn compute(center: Coord) -> Self {
        let (q, r) = center.axial();
        let mut slots = [None; 6];
        for direction in Direction::ALL {
            let (dq, dr) = direction.axial_delta();
            slots[direction.index()] = Coord::from_axial(q + dq, r + dr)
                .map(|coord| Neighbor { coord, direction });
        }
        Self { slots }
    }

    pub fn from_direction(&self, direction: Direction) -> Option<Neighbor> {
        self.slots[direction.index()]
    }

    pub fn from_coord(&self, coord: Coord) -> Option<Neighbor> {
        self.iter().find(|n| n.coord == coord)
    }

    /// On-board neighbors only
    pub fn iter(&self) -> impl Iterator<Item = Neighbor> + '_ {
        self.slots.iter().flatten().copied()
    }

    pub fn count(&self) -> usize {
        self.slots.iter().filter(|n| n.is_some()).count()
    }
}

static NEIGHBOR_TABLE: LazyLock<Vec<Neighbors>> =
    LazyLock::new(|| ALL_COORDS.iter().map(|&c| Neighbors::compute(c)).collect());

/// O(1) neighbor table lookup
pub fn neighbors_of(coord: Coord) -> &'static Neighbors {
    &NEIGHBOR_TABLE[coord.index()]
}

// ============================================================================
// GEOMETRY
// ============================================================================

/// Hex distance between two cells
pub fn distance(a: Coord, b: Coord) -> u8 {
    let (qa, ra) = a.axial();
    let (qb, rb) = b.axial();
    let dq = (qa - qb).abs();
    let dr = (ra - rb).abs();
    let ds = ((qa + ra) - (qb + rb)).abs();
    ((dq + dr + ds) / 2) as u8
}

pub fn distance_to_center(coord: Coord) -> u8 {
    distance(coord, CENTER)
}

pub fn are_neighbors(a: Coord, b: Coord) -> bool {
    distance(a, b) == 1
}

/// Midpoint of two cells exactly two apart on one row or diagonal
pub fn find_coord_between(a: Coord, b: Coord) -> Option<Coord> {
    let (qa, ra) = a.axial();
    let (qb, rb) = b.axial();
    let (dq, dr) = (qb - qa, rb - ra);
    let straight = dq == 0 || dr == 0 || dq + dr == 0;
    if !straight || distance(a, b) != 2 {
        return None;
    }
    Coord::from_axial(qa + dq / 2, ra + dr / 2)
}

/// True iff the three cells share a row or one of the two diagonals
pub fn on_same_axis(a: Coord, b: Coord, c: Coord) -> bool {
    let (qa, ra) = a.axial();
    let (qb, rb) = b.axial();
    let (qc, rc) = c.axial();
    (ra == rb && rb == rc)
        || (qa == qb && qb == qc)
        || (qa + ra == qb + rb && qb + rb == qc + rc)
}

pub fn on_edge(coord: Coord) -> bool {
    neighbors_of(coord).count() < 6
}

pub fn on_corner(coord: Coord) -> bool {
    neighbors_of(coord).count() < 4
}
