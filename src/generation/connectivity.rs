// src/generation/connectivity.rs
//! Corridor routing and region merging.
//!
//! A* is used as a carving tool here rather than a pure geometric search:
//! walls are passable at a cost, so routes bend toward existing floor. The
//! Manhattan heuristic is not admissible once walls must be crossed; the
//! resulting bias toward cheap routes is kept on purpose since map shapes
//! depend on it.

use crate::map::{Coord, Grid, TileKind};
use crate::utils::geometry::{disk_bounds, in_disk};
use log::{debug, warn};
use rand::Rng;
use std::cmp::Reverse;
use std::collections::BinaryHeap;

pub const WALL_STEP_COST: u32 = 6;
pub const HAZARD_STEP_COST: u32 = 2;

/// Per-region sample caps used when searching for the closest cell pair.
pub const MAIN_REGION_SAMPLES: usize = 400;
pub const OTHER_REGION_SAMPLES: usize = 200;

/// Cost of stepping onto `tile`, or `None` if the search may never enter it.
fn step_cost(tile: TileKind) -> Option<u32> {
    match tile {
        TileKind::Floor => Some(0),
        TileKind::BreakableWall => Some(WALL_STEP_COST),
        TileKind::IndestructibleWall => None,
        TileKind::Water | TileKind::Hole | TileKind::Spike => Some(HAZARD_STEP_COST),
    }
}

/// Fills a disk of radius `radius` around `center` with floor. Indestructible
/// walls and off-grid cells are left alone.
pub fn carve_disk(grid: &mut Grid, center: Coord, radius: i32) {
    let Some(bounds) = disk_bounds(center, radius).clipped(grid.width(), grid.height()) else {
        return;
    };
    for c in bounds.cells() {
        if !in_disk(c, center, radius) {
            continue;
        }
        match grid.get(c) {
            Some(TileKind::IndestructibleWall) | None => {}
            Some(_) => {
                grid.set(c, TileKind::Floor);
            }
        }
    }
}

pub fn protect_spawns(grid: &mut Grid, spawns: &[Coord], radius: i32) {
    for s in spawns {
        carve_disk(grid, *s, radius);
    }
}

pub fn carve_path(grid: &mut Grid, path: &[Coord], radius: i32) {
    for c in path {
        carve_disk(grid, *c, radius);
    }
}

/// 4-connected A* from `start` to `goal`.
///
/// Ties on `cost + heuristic` are broken by discovery order. Returns `None`
/// when either end lies off-grid or the frontier runs dry.
pub fn find_path(grid: &Grid, start: Coord, goal: Coord) -> Option<Vec<Coord>> {
    let start_idx = grid.index_of(start)?;
    let goal_idx = grid.index_of(goal)?;

    let cells = grid.width() * grid.height();
    let mut g_score = vec![u32::MAX; cells];
    let mut came_from: Vec<Option<usize>> = vec![None; cells];
    let mut open = BinaryHeap::new();
    let mut seq: u64 = 0;

    g_score[start_idx] = 0;
    open.push(Reverse((0u32, seq, start_idx)));

    while let Some(Reverse((_, _, current))) = open.pop() {
        if current == goal_idx {
            let mut path = vec![grid.coord_of(current)];
            let mut cursor = current;
            while let Some(prev) = came_from[cursor] {
                path.push(grid.coord_of(prev));
                cursor = prev;
            }
            path.reverse();
            return Some(path);
        }

        let here = grid.coord_of(current);
        for next in grid.neighbors4(here) {
            let Some(cost) = grid.get(next).and_then(step_cost) else {
                continue;
            };
            let Some(next_idx) = grid.index_of(next) else {
                continue;
            };
            let tentative = g_score[current].saturating_add(cost);
            if tentative < g_score[next_idx] {
                came_from[next_idx] = Some(current);
                g_score[next_idx] = tentative;
                seq += 1;
                let f = tentative.saturating_add(next.manhattan(goal) as u32);
                open.push(Reverse((f, seq, next_idx)));
            }
        }
    }
    None
}

/// Greedy line walk toward `goal`, one axis per step. When both axes still
/// differ the axis is picked with a fair coin. Always reaches `goal`.
pub fn fallback_path<R: Rng + ?Sized>(start: Coord, goal: Coord, rng: &mut R) -> Vec<Coord> {
    let mut path = vec![start];
    let mut cur = start;
    while cur != goal {
        let dx = (goal.x - cur.x).signum();
        let dy = (goal.y - cur.y).signum();
        if dx != 0 && dy != 0 {
            if rng.random::<f64>() < 0.5 {
                cur.x += dx;
            } else {
                cur.y += dy;
            }
        } else if dx != 0 {
            cur.x += dx;
        } else {
            cur.y += dy;
        }
        path.push(cur);
    }
    path
}

fn route<R: Rng + ?Sized>(grid: &Grid, from: Coord, to: Coord, rng: &mut R) -> Vec<Coord> {
    find_path(grid, from, to).unwrap_or_else(|| {
        debug!("no A* route {:?} -> {:?}, walking a straight line", from, to);
        fallback_path(from, to, rng)
    })
}

/// Connects every spawn to the first one, then adds `extra_corridors` loops
/// between random floor cells.
pub fn connect_spawns<R: Rng + ?Sized>(
    grid: &mut Grid,
    spawns: &[Coord],
    rng: &mut R,
    corridor_radius: i32,
    protected_radius: i32,
    extra_corridors: u32,
    extra_radius: i32,
) {
    let Some(&root) = spawns.first() else {
        return;
    };
    protect_spawns(grid, spawns, protected_radius);

    for &target in &spawns[1..] {
        let path = route(grid, root, target, rng);
        carve_path(grid, &path, corridor_radius);
        carve_disk(grid, root, protected_radius);
        carve_disk(grid, target, protected_radius);
    }

    if extra_corridors == 0 {
        return;
    }
    let floors = grid.cells_of(TileKind::Floor);
    if floors.len() < 2 {
        return;
    }
    let mut carved = 0;
    for _ in 0..extra_corridors {
        let a = floors[rng.random_range(0..floors.len())];
        let b = floors[rng.random_range(0..floors.len())];
        if a == b {
            continue;
        }
        if let Some(path) = find_path(grid, a, b) {
            carve_path(grid, &path, extra_radius);
            carved += 1;
        }
    }
    debug!("carved {}/{} extra corridors", carved, extra_corridors);
}

/// Maximal 4-connected floor components, discovered in row-major order.
#[derive(Debug, Clone)]
pub struct FloorRegions {
    pub components: Vec<Vec<Coord>>,
    labels: Vec<Option<usize>>,
    width: usize,
    height: usize,
}

impl FloorRegions {
    pub fn find(grid: &Grid) -> Self {
        let mut labels: Vec<Option<usize>> = vec![None; grid.width() * grid.height()];
        let mut components = Vec::new();

        for start in grid.coords() {
            let Some(start_idx) = grid.index_of(start) else {
                continue;
            };
            if labels[start_idx].is_some() || !grid.is(start, TileKind::Floor) {
                continue;
            }
            let label = components.len();
            let mut component = Vec::new();
            let mut stack = vec![start];
            labels[start_idx] = Some(label);
            while let Some(c) = stack.pop() {
                component.push(c);
                for n in grid.neighbors4(c) {
                    let Some(i) = grid.index_of(n) else {
                        continue;
                    };
                    if labels[i].is_none() && grid.is(n, TileKind::Floor) {
                        labels[i] = Some(label);
                        stack.push(n);
                    }
                }
            }
            components.push(component);
        }

        Self {
            components,
            labels,
            width: grid.width(),
            height: grid.height(),
        }
    }

    pub fn len(&self) -> usize {
        self.components.len()
    }

    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    pub fn region_of(&self, c: Coord) -> Option<usize> {
        if c.x < 0 || c.y < 0 || c.x as usize >= self.width || c.y as usize >= self.height {
            return None;
        }
        self.labels[c.y as usize * self.width + c.x as usize]
    }

    /// Index of the largest component; the earliest wins ties.
    pub fn largest(&self) -> Option<usize> {
        let mut best: Option<usize> = None;
        for (i, comp) in self.components.iter().enumerate() {
            if best.map_or(true, |b| comp.len() > self.components[b].len()) {
                best = Some(i);
            }
        }
        best
    }
}

/// Every `len / cap`-th cell once a region outgrows `cap`.
fn sample(cells: &[Coord], cap: usize) -> Vec<Coord> {
    if cells.len() <= cap {
        return cells.to_vec();
    }
    let step = (cells.len() / cap).max(1);
    cells.iter().step_by(step).copied().collect()
}

/// Carves corridors until the floor forms a single 4-connected region.
///
/// Each round picks the main region (the first spawn's, else the largest),
/// finds the closest sampled cell pair between it and any other region, and
/// carves a route between them. Returns the number of corridors carved.
pub fn connect_all_regions<R: Rng + ?Sized>(
    grid: &mut Grid,
    spawns: &[Coord],
    rng: &mut R,
    corridor_radius: i32,
    protected_radius: i32,
) -> usize {
    protect_spawns(grid, spawns, protected_radius);

    let mut merges = 0;
    let mut previous = usize::MAX;
    loop {
        let regions = FloorRegions::find(grid);
        if regions.len() <= 1 {
            return merges;
        }
        if regions.len() >= previous {
            warn!(
                "region merge stalled at {} regions; leaving the rest disconnected",
                regions.len()
            );
            return merges;
        }
        previous = regions.len();

        let main_idx = spawns
            .first()
            .and_then(|s| regions.region_of(*s))
            .or_else(|| regions.largest())
            .unwrap_or(0);
        let main_samples = sample(&regions.components[main_idx], MAIN_REGION_SAMPLES);

        let mut best: Option<(Coord, Coord, i32)> = None;
        for (i, comp) in regions.components.iter().enumerate() {
            if i == main_idx {
                continue;
            }
            let other_samples = sample(comp, OTHER_REGION_SAMPLES);
            for &a in &main_samples {
                for &b in &other_samples {
                    let d = a.manhattan(b);
                    if best.map_or(true, |(_, _, bd)| d < bd) {
                        best = Some((a, b, d));
                    }
                }
            }
        }
        let Some((a, b, d)) = best else {
            return merges;
        };

        debug!(
            "merging region pair {:?} -> {:?} (distance {}, {} regions left)",
            a,
            b,
            d,
            regions.len()
        );
        let path = route(grid, a, b, rng);
        carve_path(grid, &path, corridor_radius);
        protect_spawns(grid, spawns, protected_radius);
        merges += 1;
    }
}

/// Reclassifies breakable walls with no floor among their 8 neighbors as
/// indestructible. Returns the number of converted cells.
pub fn convert_hidden_walls(grid: &mut Grid) -> usize {
    let hidden: Vec<Coord> = grid
        .coords()
        .filter(|c| grid.is(*c, TileKind::BreakableWall) && !grid.touches8(*c, TileKind::Floor))
        .collect();
    for c in &hidden {
        grid.set(*c, TileKind::IndestructibleWall);
    }
    hidden.len()
}

/// Cells 4-connected to `start` through tiles equal to `tile`, as a row-major mask.
pub fn flood_mask(grid: &Grid, start: Coord, tile: TileKind) -> Vec<bool> {
    let mut seen = vec![false; grid.width() * grid.height()];
    let Some(start_idx) = grid.index_of(start) else {
        return seen;
    };
    if !grid.is(start, tile) {
        return seen;
    }
    seen[start_idx] = true;
    let mut stack = vec![start];
    while let Some(c) = stack.pop() {
        for n in grid.neighbors4(c) {
            if let Some(i) = grid.index_of(n) {
                if !seen[i] && grid.is(n, tile) {
                    seen[i] = true;
                    stack.push(n);
                }
            }
        }
    }
    seen
}
