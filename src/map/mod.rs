// src/map/mod.rs
pub mod grid;
pub mod rules;
pub mod spawns;
pub mod tile;

pub use grid::{Coord, Grid, GridError};
pub use rules::MapReport;
pub use spawns::{mirror_spawns, SpawnSet, TEAM_A, TEAM_B};
pub use tile::TileKind;

/// A generated (or hand-edited) arena: the tile grid plus the spawn sets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MapData {
    pub grid: Grid,
    pub spawns: SpawnSet,
}

impl MapData {
    pub fn new(grid: Grid, spawns: SpawnSet) -> Self {
        Self { grid, spawns }
    }
}
