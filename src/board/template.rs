use crate::coords::{CubeCoord, Direction};
use crate::types::Resource;

use super::PortKind;

/// Land hexes of the base map, centre first and then spiralling outwards.
/// Tile ids follow this order.
pub(super) fn land_topology() -> Vec<CubeCoord> {
    vec![
        CubeCoord::new(0, 0, 0),
        CubeCoord::new(1, -1, 0),
        CubeCoord::new(0, -1, 1),
        CubeCoord::new(-1, 0, 1),
        CubeCoord::new(-1, 1, 0),
        CubeCoord::new(0, 1, -1),
        CubeCoord::new(1, 0, -1),
        CubeCoord::new(2, -2, 0),
        CubeCoord::new(1, -2, 1),
        CubeCoord::new(0, -2, 2),
        CubeCoord::new(-1, -1, 2),
        CubeCoord::new(-2, 0, 2),
        CubeCoord::new(-2, 1, 1),
        CubeCoord::new(-2, 2, 0),
        CubeCoord::new(-1, 2, -1),
        CubeCoord::new(0, 2, -2),
        CubeCoord::new(1, 1, -2),
        CubeCoord::new(2, 0, -2),
        CubeCoord::new(2, -1, -1),
    ]
}

/// Coastal sides carrying a harbour: the land hex and the side facing the sea.
pub(super) fn port_sides() -> Vec<(CubeCoord, Direction)> {
    vec![
        (CubeCoord::new(2, -2, 0), Direction::East),
        (CubeCoord::new(1, -2, 1), Direction::SouthEast),
        (CubeCoord::new(-1, -1, 2), Direction::SouthEast),
        (CubeCoord::new(-2, 0, 2), Direction::SouthWest),
        (CubeCoord::new(-2, 1, 1), Direction::West),
        (CubeCoord::new(-1, 2, -1), Direction::West),
        (CubeCoord::new(0, 2, -2), Direction::NorthWest),
        (CubeCoord::new(1, 1, -2), Direction::NorthEast),
        (CubeCoord::new(2, -1, -1), Direction::NorthEast),
    ]
}

pub(super) fn tile_resources() -> Vec<Option<Resource>> {
    vec![
        None,
        Some(Resource::Wood),
        Some(Resource::Sheep),
        Some(Resource::Wheat),
        Some(Resource::Brick),
        Some(Resource::Ore),
        Some(Resource::Wood),
        Some(Resource::Wheat),
        Some(Resource::Sheep),
        Some(Resource::Brick),
        Some(Resource::Wood),
        Some(Resource::Ore),
        Some(Resource::Wheat),
        Some(Resource::Sheep),
        Some(Resource::Wood),
        Some(Resource::Brick),
        Some(Resource::Ore),
        Some(Resource::Wheat),
        Some(Resource::Sheep),
    ]
}

pub(super) fn numbers() -> Vec<u8> {
    vec![5, 2, 6, 3, 8, 10, 9, 12, 11, 4, 8, 10, 9, 4, 5, 6, 3, 11]
}

pub(super) fn port_kinds() -> Vec<PortKind> {
    vec![
        PortKind::Generic,
        PortKind::Specific(Resource::Sheep),
        PortKind::Generic,
        PortKind::Specific(Resource::Ore),
        PortKind::Specific(Resource::Wheat),
        PortKind::Generic,
        PortKind::Specific(Resource::Wood),
        PortKind::Specific(Resource::Brick),
        PortKind::Generic,
    ]
}
