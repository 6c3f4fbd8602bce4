// src/generation/features.rs
use crate::map::{Coord, Grid, TileKind};
use crate::utils::geometry::in_any_disk;
use log::debug;
use rand::seq::SliceRandom;
use rand::Rng;

/// Floor cells outside every protection disk, row-major.
fn eligible_floor(grid: &Grid, protected_centers: &[Coord], protected_radius: i32) -> Vec<Coord> {
    grid.coords()
        .filter(|c| grid.is(*c, TileKind::Floor))
        .filter(|c| !in_any_disk(*c, protected_centers, protected_radius))
        .collect()
}

/// Converts `floor(candidates * percent)` shuffled candidates to `tile`.
fn place_percent<R: Rng + ?Sized>(
    grid: &mut Grid,
    rng: &mut R,
    mut candidates: Vec<Coord>,
    percent: f64,
    tile: TileKind,
) -> usize {
    if percent <= 0.0 || candidates.is_empty() {
        return 0;
    }
    let n = (candidates.len() as f64 * percent).floor() as usize;
    if n == 0 {
        return 0;
    }
    candidates.shuffle(rng);
    let mut placed = 0;
    for c in candidates.into_iter().take(n) {
        if grid.is(c, TileKind::Floor) {
            grid.set(c, tile);
            placed += 1;
        }
    }
    placed
}

/// Scatters water, then holes, then spikes over unprotected floor.
///
/// Candidates are recollected before each kind so a later kind never targets
/// a cell an earlier one already took. Returns the total number of hazards.
pub fn place_features<R: Rng + ?Sized>(
    grid: &mut Grid,
    rng: &mut R,
    water_percent: f64,
    holes_percent: f64,
    spikes_percent: f64,
    protected_radius: i32,
    protected_centers: &[Coord],
) -> usize {
    let mut total = 0;
    for (tile, percent) in [
        (TileKind::Water, water_percent),
        (TileKind::Hole, holes_percent),
        (TileKind::Spike, spikes_percent),
    ] {
        let candidates = eligible_floor(grid, protected_centers, protected_radius);
        let placed = place_percent(grid, rng, candidates, percent, tile);
        debug!("placed {} {} tiles", placed, tile.display_name());
        total += placed;
    }
    total
}
