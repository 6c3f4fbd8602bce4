// src/generation/cave.rs
//! Cellular-automaton cave carving.
//!
//! Noise is seeded cell by cell in row-major order, then smoothed `passes`
//! times. Each pass reads a full snapshot of the previous generation so the
//! rule never observes its own writes.

use crate::map::{Coord, Grid, TileKind};
use log::debug;
use rand::Rng;

/// Builds the base wall/floor layout. The outer ring is always indestructible.
pub fn generate<R: Rng + ?Sized>(
    width: usize,
    height: usize,
    rng: &mut R,
    initial_wall_prob: f64,
    passes: u32,
    birth_limit: usize,
    death_limit: usize,
) -> Grid {
    let mut grid = Grid::new(width, height, TileKind::Floor);
    for y in 0..height {
        for x in 0..width {
            if rng.random::<f64>() < initial_wall_prob {
                grid.set(Coord::new(x as i32, y as i32), TileKind::BreakableWall);
            }
        }
    }
    grid.force_border(TileKind::IndestructibleWall);

    for pass in 0..passes {
        grid = smooth(&grid, birth_limit, death_limit);
        grid.force_border(TileKind::IndestructibleWall);
        debug!(
            "CA pass {}/{}: {} floor cells",
            pass + 1,
            passes,
            grid.count(TileKind::Floor)
        );
    }
    grid
}

/// One automaton step over a snapshot.
///
/// A wall survives with at least `death_limit` solid neighbors; a floor cell
/// turns to wall with at least `birth_limit`. Off-grid neighbors count as solid.
fn smooth(prev: &Grid, birth_limit: usize, death_limit: usize) -> Grid {
    let mut next = prev.clone();
    for c in prev.coords() {
        let tile = match prev.get(c) {
            Some(TileKind::IndestructibleWall) | None => continue,
            Some(tile) => tile,
        };
        let walls = prev.solid_neighbors8(c);
        let becomes_wall = if tile == TileKind::BreakableWall {
            walls >= death_limit
        } else {
            walls >= birth_limit
        };
        next.set(
            c,
            if becomes_wall {
                TileKind::BreakableWall
            } else {
                TileKind::Floor
            },
        );
    }
    next
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn test_no_walls_no_passes_is_open_floor() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let grid = generate(10, 10, &mut rng, 0.0, 0, 5, 3);
        for c in grid.coords() {
            let expected = if grid.is_border(c) {
                TileKind::IndestructibleWall
            } else {
                TileKind::Floor
            };
            assert_eq!(grid.get(c), Some(expected));
        }
    }

    #[test]
    fn test_full_wall_probability_fills_interior() {
        let mut rng = ChaCha8Rng::seed_from_u64(2);
        let grid = generate(8, 6, &mut rng, 1.0, 3, 5, 3);
        assert_eq!(grid.count(TileKind::Floor), 0);
        assert_eq!(grid.count(TileKind::BreakableWall), 6 * 4);
    }

    #[test]
    fn test_border_survives_every_pass() {
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let grid = generate(30, 20, &mut rng, 0.45, 5, 5, 3);
        for c in grid.coords().filter(|c| grid.is_border(*c)) {
            assert_eq!(grid.get(c), Some(TileKind::IndestructibleWall));
        }
    }

    #[test]
    fn test_same_seed_same_cave() {
        let a = generate(40, 25, &mut ChaCha8Rng::seed_from_u64(99), 0.45, 5, 5, 3);
        let b = generate(40, 25, &mut ChaCha8Rng::seed_from_u64(99), 0.45, 5, 5, 3);
        assert_eq!(a, b);
    }

    #[test]
    fn test_smooth_reads_snapshot() {
        // A lone wall with no solid neighbors dies; the floor beside it must not
        // see the wall's new state within the same pass.
        let mut grid = Grid::new(5, 5, TileKind::Floor);
        grid.set(Coord::new(2, 2), TileKind::BreakableWall);
        let next = smooth(&grid, 1, 3);
        assert_eq!(next.get(Coord::new(2, 2)), Some(TileKind::Floor));
        // Birth limit 1: every floor touching the old wall is born.
        assert_eq!(next.get(Coord::new(1, 1)), Some(TileKind::BreakableWall));
    }

    #[test]
    fn test_degenerate_sizes() {
        let mut rng = ChaCha8Rng::seed_from_u64(4);
        assert_eq!(generate(0, 0, &mut rng, 0.5, 2, 5, 3).count(TileKind::Floor), 0);
        let tiny = generate(2, 2, &mut rng, 0.5, 2, 5, 3);
        assert_eq!(tiny.count(TileKind::IndestructibleWall), 4);
    }
}
