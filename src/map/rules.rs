// src/map/rules.rs
//! Checks and repairs for grids that did not come straight out of the
//! generator, e.g. maps touched up by hand.

use super::{Coord, Grid, MapData, TileKind};
use crate::generation::connectivity::{convert_hidden_walls, flood_mask, FloorRegions};
use crate::utils::geometry::{disk_bounds, in_disk};
use log::info;
use std::fmt;

/// Turns every floor cell not 4-connected to `from` into breakable wall.
///
/// With `from == None` the first floor cell in row-major order is the root.
/// Returns the number of sealed cells.
pub fn seal_unreachable_floor(grid: &mut Grid, from: Option<Coord>) -> usize {
    let Some(root) = from.or_else(|| grid.coords().find(|c| grid.is(*c, TileKind::Floor))) else {
        return 0;
    };
    let reach = flood_mask(grid, root, TileKind::Floor);
    let sealed: Vec<Coord> = grid
        .coords()
        .filter(|c| grid.is(*c, TileKind::Floor))
        .filter(|c| grid.index_of(*c).map_or(false, |i| !reach[i]))
        .collect();
    for c in &sealed {
        grid.set(*c, TileKind::BreakableWall);
    }
    if !sealed.is_empty() {
        info!("sealed {} unreachable floor cells", sealed.len());
    }
    sealed.len()
}

/// Restores the hidden-wall and border rules. Returns the number of walls
/// reclassified as indestructible.
pub fn revalidate(grid: &mut Grid) -> usize {
    grid.force_border(TileKind::IndestructibleWall);
    convert_hidden_walls(grid)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MapReport {
    pub border_ok: bool,
    /// Breakable walls with no floor among their 8 neighbors.
    pub floating_rock: usize,
    pub floor_regions: usize,
    /// Non-floor grid cells inside a spawn protection disk.
    pub spawn_violations: Vec<Coord>,
}

impl MapReport {
    pub fn inspect(map: &MapData, spawn_radius: i32) -> Self {
        let grid = &map.grid;
        let border_ok = grid
            .coords()
            .filter(|c| grid.is_border(*c))
            .all(|c| grid.is(c, TileKind::IndestructibleWall));
        let floating_rock = grid
            .cells_of(TileKind::BreakableWall)
            .into_iter()
            .filter(|c| !grid.touches8(*c, TileKind::Floor))
            .count();

        let mut spawn_violations = Vec::new();
        for s in map.spawns.all() {
            let Some(bounds) = disk_bounds(s, spawn_radius).clipped(grid.width(), grid.height()) else {
                continue;
            };
            for c in bounds.cells() {
                if in_disk(c, s, spawn_radius) && !grid.is(c, TileKind::Floor) && !spawn_violations.contains(&c) {
                    spawn_violations.push(c);
                }
            }
        }

        MapReport {
            border_ok,
            floating_rock,
            floor_regions: FloorRegions::find(grid).len(),
            spawn_violations,
        }
    }

    pub fn is_valid(&self) -> bool {
        self.border_ok && self.floating_rock == 0 && self.floor_regions <= 1 && self.spawn_violations.is_empty()
    }
}

impl fmt::Display for MapReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "border intact:     {}", self.border_ok)?;
        writeln!(f, "floating rock:     {}", self.floating_rock)?;
        writeln!(f, "floor regions:     {}", self.floor_regions)?;
        write!(f, "spawn violations:  {}", self.spawn_violations.len())
    }
}
