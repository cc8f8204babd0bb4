use std::collections::HashMap;

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, EnumString, Display, EnumIter,
)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum Direction {
    East,
    SouthEast,
    SouthWest,
    West,
    NorthWest,
    NorthEast,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct CubeCoord {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

impl CubeCoord {
    pub fn new(x: i32, y: i32, z: i32) -> Self {
        debug_assert!(x + y + z == 0, "cube coordinates must sum to zero");
        Self { x, y, z }
    }

    pub fn add(self, other: CubeCoord) -> Self {
        CubeCoord::new(self.x + other.x, self.y + other.y, self.z + other.z)
    }

    pub fn step(self, direction: Direction) -> Self {
        self.add(UNIT_VECTORS[&direction])
    }
}

impl Default for CubeCoord {
    fn default() -> Self {
        CubeCoord::new(0, 0, 0)
    }
}

pub static UNIT_VECTORS: Lazy<HashMap<Direction, CubeCoord>> = Lazy::new(|| {
    use Direction::*;
    HashMap::from([
        (NorthEast, CubeCoord::new(1, 0, -1)),
        (SouthWest, CubeCoord::new(-1, 0, 1)),
        (NorthWest, CubeCoord::new(0, 1, -1)),
        (SouthEast, CubeCoord::new(0, -1, 1)),
        (East, CubeCoord::new(1, -1, 0)),
        (West, CubeCoord::new(-1, 1, 0)),
    ])
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, EnumIter)]
pub enum Corner {
    North,
    NorthEast,
    SouthEast,
    South,
    SouthWest,
    NorthWest,
}

impl Corner {
    pub const ALL: [Corner; 6] = [
        Corner::North,
        Corner::NorthEast,
        Corner::SouthEast,
        Corner::South,
        Corner::SouthWest,
        Corner::NorthWest,
    ];

    pub const fn index(self) -> usize {
        match self {
            Corner::North => 0,
            Corner::NorthEast => 1,
            Corner::SouthEast => 2,
            Corner::South => 3,
            Corner::SouthWest => 4,
            Corner::NorthWest => 5,
        }
    }

    fn shared_with(self) -> (Direction, Direction) {
        match self {
            Corner::North => (Direction::NorthWest, Direction::NorthEast),
            Corner::NorthEast => (Direction::NorthEast, Direction::East),
            Corner::SouthEast => (Direction::East, Direction::SouthEast),
            Corner::South => (Direction::SouthEast, Direction::SouthWest),
            Corner::SouthWest => (Direction::SouthWest, Direction::West),
            Corner::NorthWest => (Direction::West, Direction::NorthWest),
        }
    }
}

/// Position-independent identity of a corner: the three hexes meeting there,
/// sorted. Two tiles agree on a corner iff they compute the same key.
pub type CornerKey = [CubeCoord; 3];

pub fn corner_key(hex: CubeCoord, corner: Corner) -> CornerKey {
    let (a, b) = corner.shared_with();
    let mut key = [hex, hex.step(a), hex.step(b)];
    key.sort();
    key
}

pub fn side_corners(direction: Direction) -> (Corner, Corner) {
    match direction {
        Direction::East => (Corner::NorthEast, Corner::SouthEast),
        Direction::SouthEast => (Corner::SouthEast, Corner::South),
        Direction::SouthWest => (Corner::South, Corner::SouthWest),
        Direction::West => (Corner::SouthWest, Corner::NorthWest),
        Direction::NorthWest => (Corner::NorthWest, Corner::North),
        Direction::NorthEast => (Corner::North, Corner::NorthEast),
    }
}
