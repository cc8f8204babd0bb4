use std::collections::HashMap;

use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use strum::IntoEnumIterator;

use crate::coords::{Corner, CornerKey, CubeCoord, Direction, corner_key, side_corners};
use crate::types::{BuildingKind, PlayerId, Resource};

mod template;

pub type TileId = u16;
pub type VertexId = u16;
pub type EdgeId = u16;

pub const STANDARD_TRADE_RATIO: u8 = 4;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tile {
    pub id: TileId,
    pub coord: CubeCoord,
    pub resource: Option<Resource>,
    pub number: Option<u8>,
    pub robber: bool,
    pub vertices: [VertexId; 6],
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Building {
    pub owner: PlayerId,
    pub kind: BuildingKind,
}

impl Building {
    pub fn yield_amount(&self) -> u8 {
        match self.kind {
            BuildingKind::Settlement => 1,
            BuildingKind::City => 2,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Vertex {
    pub id: VertexId,
    pub tiles: SmallVec<[TileId; 3]>,
    pub edges: SmallVec<[EdgeId; 3]>,
    pub neighbors: SmallVec<[VertexId; 3]>,
    pub building: Option<Building>,
    pub port: Option<PortKind>,
}

impl Vertex {
    fn new(id: VertexId) -> Self {
        Self {
            id,
            tiles: SmallVec::new(),
            edges: SmallVec::new(),
            neighbors: SmallVec::new(),
            building: None,
            port: None,
        }
    }

    pub fn owner(&self) -> Option<PlayerId> {
        self.building.map(|b| b.owner)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Edge {
    pub id: EdgeId,
    pub vertices: (VertexId, VertexId),
    pub road: Option<PlayerId>,
}

impl Edge {
    pub fn touches(&self, vertex: VertexId) -> bool {
        self.vertices.0 == vertex || self.vertices.1 == vertex
    }

    pub fn other_end(&self, vertex: VertexId) -> VertexId {
        if self.vertices.0 == vertex {
            self.vertices.1
        } else {
            self.vertices.0
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PortKind {
    Generic,
    Specific(Resource),
}

impl PortKind {
    pub fn ratio(self) -> u8 {
        match self {
            PortKind::Generic => 3,
            PortKind::Specific(_) => 2,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Port {
    pub kind: PortKind,
    pub vertices: [VertexId; 2],
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PlacementError {
    #[error("no tile with id {0}")]
    UnknownTile(TileId),
    #[error("no vertex with id {0}")]
    UnknownVertex(VertexId),
    #[error("no edge with id {0}")]
    UnknownEdge(EdgeId),
    #[error("vertex {0} already occupied")]
    VertexOccupied(VertexId),
    #[error("vertex {0} is adjacent to another building")]
    DistanceRule(VertexId),
    #[error("edge {0} already has a road")]
    EdgeOccupied(EdgeId),
    #[error("placement is not connected to the player's network")]
    NotConnected,
    #[error("vertex {0} does not hold one of the player's settlements")]
    NotOwnSettlement(VertexId),
    #[error("robber already on tile {0}")]
    RobberAlreadyThere(TileId),
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LayoutError {
    #[error("expected {expected} {what}, got {actual}")]
    WrongLength {
        what: &'static str,
        expected: usize,
        actual: usize,
    },
    #[error("number token {0} is not a valid roll for a tile")]
    InvalidNumber(u8),
    #[error("layout has no desert for the robber to start on")]
    NoDesert,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct LayoutOverrides<'a> {
    pub tile_resources: Option<&'a [Option<Resource>]>,
    pub numbers: Option<&'a [u8]>,
    pub port_kinds: Option<&'a [PortKind]>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Board {
    pub tiles: Vec<Tile>,
    pub vertices: Vec<Vertex>,
    pub edges: Vec<Edge>,
    pub ports: Vec<Port>,
    pub robber_tile: TileId,
}

impl Board {
    pub fn standard(rng: &mut impl rand::Rng) -> Self {
        let mut resources = template::tile_resources();
        let mut numbers = template::numbers();
        let mut ports = template::port_kinds();
        resources.shuffle(rng);
        numbers.shuffle(rng);
        ports.shuffle(rng);
        Self::assemble(&resources, &numbers, &ports)
    }

    pub fn beginner() -> Self {
        Self::assemble(
            &template::tile_resources(),
            &template::numbers(),
            &template::port_kinds(),
        )
    }

    pub fn with_layout(
        overrides: LayoutOverrides<'_>,
        rng: &mut impl rand::Rng,
    ) -> Result<Self, LayoutError> {
        let mut resources = overrides
            .tile_resources
            .map(|slice| slice.to_vec())
            .unwrap_or_else(template::tile_resources);
        if overrides.tile_resources.is_none() {
            resources.shuffle(rng);
        }
        let mut numbers = overrides
            .numbers
            .map(|slice| slice.to_vec())
            .unwrap_or_else(template::numbers);
        if overrides.numbers.is_none() {
            numbers.shuffle(rng);
        }
        let mut ports = overrides
            .port_kinds
            .map(|slice| slice.to_vec())
            .unwrap_or_else(template::port_kinds);
        if overrides.port_kinds.is_none() {
            ports.shuffle(rng);
        }

        let land = template::land_topology().len();
        check_len("tile resources", land, resources.len())?;
        let producing = resources.iter().filter(|r| r.is_some()).count();
        check_len("numbers", producing, numbers.len())?;
        check_len("ports", template::port_sides().len(), ports.len())?;
        if let Some(bad) = numbers.iter().find(|n| !(2..=12).contains(*n) || **n == 7) {
            return Err(LayoutError::InvalidNumber(*bad));
        }
        if resources.iter().all(Option::is_some) {
            return Err(LayoutError::NoDesert);
        }
        Ok(Self::assemble(&resources, &numbers, &ports))
    }

    fn assemble(resources: &[Option<Resource>], numbers: &[u8], port_kinds: &[PortKind]) -> Self {
        let coords = template::land_topology();
        let mut vertex_ids: HashMap<CornerKey, VertexId> = HashMap::new();
        let mut vertices: Vec<Vertex> = Vec::new();
        let mut tiles: Vec<Tile> = Vec::with_capacity(coords.len());
        let mut numbers = numbers.iter().copied();

        for (idx, (coord, resource)) in coords.iter().zip(resources.iter()).enumerate() {
            let tile_id = idx as TileId;
            let mut corners = [0; 6];
            for corner in Corner::ALL {
                let id = *vertex_ids
                    .entry(corner_key(*coord, corner))
                    .or_insert_with(|| {
                        let id = vertices.len() as VertexId;
                        vertices.push(Vertex::new(id));
                        id
                    });
                vertices[id as usize].tiles.push(tile_id);
                corners[corner.index()] = id;
            }
            let number = match resource {
                Some(_) => numbers.next(),
                None => None,
            };
            tiles.push(Tile {
                id: tile_id,
                coord: *coord,
                resource: *resource,
                number,
                robber: false,
                vertices: corners,
            });
        }

        let mut edge_ids: HashMap<(VertexId, VertexId), EdgeId> = HashMap::new();
        let mut edges: Vec<Edge> = Vec::new();
        for tile in &tiles {
            for direction in Direction::iter() {
                let (a_ref, b_ref) = side_corners(direction);
                let a = tile.vertices[a_ref.index()];
                let b = tile.vertices[b_ref.index()];
                let key = (a.min(b), a.max(b));
                if edge_ids.contains_key(&key) {
                    continue;
                }
                let id = edges.len() as EdgeId;
                edge_ids.insert(key, id);
                edges.push(Edge {
                    id,
                    vertices: key,
                    road: None,
                });
                vertices[a as usize].edges.push(id);
                vertices[a as usize].neighbors.push(b);
                vertices[b as usize].edges.push(id);
                vertices[b as usize].neighbors.push(a);
            }
        }

        let mut ports = Vec::new();
        for ((coord, direction), kind) in template::port_sides().into_iter().zip(port_kinds) {
            let Some(tile) = tiles.iter().find(|t| t.coord == coord) else {
                continue;
            };
            let (a_ref, b_ref) = side_corners(direction);
            let pair = [tile.vertices[a_ref.index()], tile.vertices[b_ref.index()]];
            for vertex in pair {
                vertices[vertex as usize].port = Some(*kind);
            }
            ports.push(Port {
                kind: *kind,
                vertices: pair,
            });
        }

        let robber_tile = tiles
            .iter()
            .find(|tile| tile.resource.is_none())
            .map(|tile| tile.id)
            .unwrap_or(0);
        if let Some(tile) = tiles.get_mut(robber_tile as usize) {
            tile.robber = true;
        }

        Self {
            tiles,
            vertices,
            edges,
            ports,
            robber_tile,
        }
    }

    pub fn tile(&self, id: TileId) -> Result<&Tile, PlacementError> {
        self.tiles
            .get(id as usize)
            .ok_or(PlacementError::UnknownTile(id))
    }

    pub fn vertex(&self, id: VertexId) -> Result<&Vertex, PlacementError> {
        self.vertices
            .get(id as usize)
            .ok_or(PlacementError::UnknownVertex(id))
    }

    pub fn edge(&self, id: EdgeId) -> Result<&Edge, PlacementError> {
        self.edges
            .get(id as usize)
            .ok_or(PlacementError::UnknownEdge(id))
    }

    pub fn tiles_of_vertex(&self, vertex: VertexId) -> &[TileId] {
        self.vertices
            .get(vertex as usize)
            .map(|v| v.tiles.as_slice())
            .unwrap_or(&[])
    }

    pub fn edges_of_vertex(&self, vertex: VertexId) -> &[EdgeId] {
        self.vertices
            .get(vertex as usize)
            .map(|v| v.edges.as_slice())
            .unwrap_or(&[])
    }

    pub fn check_settlement(
        &self,
        vertex: VertexId,
        player: PlayerId,
        require_road: bool,
    ) -> Result<(), PlacementError> {
        let v = self.vertex(vertex)?;
        if v.building.is_some() {
            return Err(PlacementError::VertexOccupied(vertex));
        }
        if v
            .neighbors
            .iter()
            .any(|n| self.vertices[*n as usize].building.is_some())
        {
            return Err(PlacementError::DistanceRule(vertex));
        }
        if require_road
            && !v
                .edges
                .iter()
                .any(|e| self.edges[*e as usize].road == Some(player))
        {
            return Err(PlacementError::NotConnected);
        }
        Ok(())
    }

    pub fn check_road(
        &self,
        edge: EdgeId,
        player: PlayerId,
        anchor: Option<VertexId>,
    ) -> Result<(), PlacementError> {
        let e = self.edge(edge)?;
        if e.road.is_some() {
            return Err(PlacementError::EdgeOccupied(edge));
        }
        let connected = match anchor {
            Some(anchor) => e.touches(anchor),
            None => [e.vertices.0, e.vertices.1].iter().any(|end| {
                let v = &self.vertices[*end as usize];
                v.owner() == Some(player)
                    || v
                        .edges
                        .iter()
                        .any(|other| self.edges[*other as usize].road == Some(player))
            }),
        };
        if !connected {
            return Err(PlacementError::NotConnected);
        }
        Ok(())
    }

    pub fn check_city(&self, vertex: VertexId, player: PlayerId) -> Result<(), PlacementError> {
        let v = self.vertex(vertex)?;
        match v.building {
            Some(Building {
                owner,
                kind: BuildingKind::Settlement,
            }) if owner == player => Ok(()),
            _ => Err(PlacementError::NotOwnSettlement(vertex)),
        }
    }

    pub fn check_robber_target(&self, tile: TileId) -> Result<(), PlacementError> {
        self.tile(tile)?;
        if tile == self.robber_tile {
            return Err(PlacementError::RobberAlreadyThere(tile));
        }
        Ok(())
    }

    pub fn place_settlement(&mut self, vertex: VertexId, player: PlayerId) {
        self.set_building(vertex, player, BuildingKind::Settlement);
    }

    pub fn place_city(&mut self, vertex: VertexId, player: PlayerId) {
        self.set_building(vertex, player, BuildingKind::City);
    }

    fn set_building(&mut self, vertex: VertexId, owner: PlayerId, kind: BuildingKind) {
        if let Some(v) = self.vertices.get_mut(vertex as usize) {
            v.building = Some(Building { owner, kind });
        }
    }

    pub fn place_road(&mut self, edge: EdgeId, player: PlayerId) {
        if let Some(e) = self.edges.get_mut(edge as usize) {
            e.road = Some(player);
        }
    }

    pub fn move_robber(&mut self, tile: TileId) {
        if let Some(old) = self.tiles.get_mut(self.robber_tile as usize) {
            old.robber = false;
        }
        if let Some(new) = self.tiles.get_mut(tile as usize) {
            new.robber = true;
            self.robber_tile = tile;
        }
    }

    pub fn players_on_tile(&self, tile: TileId, excluding: PlayerId) -> Vec<PlayerId> {
        let Ok(tile) = self.tile(tile) else {
            return Vec::new();
        };
        let mut players: Vec<PlayerId> = tile
            .vertices
            .iter()
            .filter_map(|v| self.vertices[*v as usize].owner())
            .filter(|owner| *owner != excluding)
            .collect();
        players.sort_unstable();
        players.dedup();
        players
    }

    pub fn producing_tiles(&self, number: u8) -> impl Iterator<Item = &Tile> + '_ {
        self.tiles
            .iter()
            .filter(move |tile| tile.number == Some(number) && !tile.robber)
    }

    pub fn buildings_on_tile<'a>(&'a self, tile: &'a Tile) -> impl Iterator<Item = Building> + 'a {
        tile.vertices
            .iter()
            .filter_map(|v| self.vertices[*v as usize].building)
    }

    pub fn ports_of(&self, player: PlayerId) -> Vec<PortKind> {
        let mut kinds: Vec<PortKind> = self
            .vertices
            .iter()
            .filter(|v| v.owner() == Some(player))
            .filter_map(|v| v.port)
            .collect();
        kinds.sort();
        kinds.dedup();
        kinds
    }

    pub fn trade_ratio(&self, player: PlayerId, resource: Resource) -> u8 {
        self.ports_of(player)
            .into_iter()
            .filter(|kind| match kind {
                PortKind::Generic => true,
                PortKind::Specific(r) => *r == resource,
            })
            .map(PortKind::ratio)
            .min()
            .unwrap_or(STANDARD_TRADE_RATIO)
    }
}

fn check_len(what: &'static str, expected: usize, actual: usize) -> Result<(), LayoutError> {
    if expected != actual {
        return Err(LayoutError::WrongLength {
            what,
            expected,
            actual,
        });
    }
    Ok(())
}
