// src/prefab/placement.rs
use super::{expand_rotations, Category, Prefab};
use crate::map::{Coord, Grid};
use crate::utils::geometry::{in_any_disk, Rect};
use log::debug;
use rand::Rng;
use std::collections::BTreeMap;

/// Outcome of one placement pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PassReport {
    pub placed: usize,
    /// Reservation rectangles committed this pass, in placement order.
    pub reservations: Vec<Rect>,
}

/// Stamps `category` prefabs onto `grid` and returns how many were placed.
///
/// See [`apply_pass_detailed`].
pub fn apply_pass<R, F>(
    grid: &mut Grid,
    rng: &mut R,
    prefabs: &[Prefab],
    category: Category,
    protected_centers: &[Coord],
    protected_radius: i32,
    on_place: F,
) -> usize
where
    R: Rng + ?Sized,
    F: FnMut(&Grid, usize),
{
    apply_pass_detailed(grid, rng, prefabs, category, protected_centers, protected_radius, on_place).placed
}

/// Scans the grid in row-major order and stamps at most one prefab per anchor.
///
/// Prefabs are expanded into their rotations and bucketed by pattern size;
/// larger areas are tried first (ties by width, then height). A variant is a
/// candidate when its reservation fits the grid, avoids every protection
/// disk, and overlaps no earlier reservation, and its pattern matches. One
/// candidate is picked uniformly; a prefab with probability below 1 then
/// survives a second draw or is skipped. `on_place` sees the grid after each
/// stamp together with the running count.
pub fn apply_pass_detailed<R, F>(
    grid: &mut Grid,
    rng: &mut R,
    prefabs: &[Prefab],
    category: Category,
    protected_centers: &[Coord],
    protected_radius: i32,
    mut on_place: F,
) -> PassReport
where
    R: Rng + ?Sized,
    F: FnMut(&Grid, usize),
{
    let mut report = PassReport::default();
    let (w, h) = (grid.width(), grid.height());
    if w == 0 || h == 0 {
        return report;
    }

    let mut pools: BTreeMap<(usize, usize), Vec<Prefab>> = BTreeMap::new();
    for variant in expand_rotations(prefabs).into_iter().filter(|p| p.category == category) {
        pools.entry(variant.size).or_default().push(variant);
    }
    let mut sizes: Vec<(usize, usize)> = pools.keys().copied().collect();
    sizes.sort_by_key(|&(pw, ph)| std::cmp::Reverse((pw * ph, pw, ph)));

    let is_protected = |c: Coord| protected_radius > 0 && in_any_disk(c, protected_centers, protected_radius);

    for y in 0..h {
        for x in 0..w {
            let origin = Coord::new(x as i32, y as i32);
            for &(pw, ph) in &sizes {
                if x + pw > w || y + ph > h || is_protected(origin) {
                    continue;
                }

                let matches: Vec<&Prefab> = pools[&(pw, ph)]
                    .iter()
                    .filter(|p| {
                        let rect = Rect::reservation(origin, pw, ph, p.reserve.0, p.reserve.1);
                        rect.within(w, h)
                            && !rect.cells().any(|c| is_protected(c))
                            && !report.reservations.iter().any(|r| r.overlaps(&rect))
                            && p.matches_at(grid, origin)
                    })
                    .collect();
                if matches.is_empty() {
                    continue;
                }

                let chosen = matches[rng.random_range(0..matches.len())];
                if chosen.probability < 1.0 && rng.random::<f64>() > chosen.probability {
                    continue;
                }

                chosen.stamp(grid, origin);
                report
                    .reservations
                    .push(Rect::reservation(origin, pw, ph, chosen.reserve.0, chosen.reserve.1));
                report.placed += 1;
                debug!("placed {} prefab '{}' at {:?}", category, chosen.id, origin);
                on_place(grid, report.placed);
                break;
            }
        }
    }
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::map::TileKind;
    use crate::prefab::{MatchToken, Patch, PatchTile};
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn block(id: &str, size: (usize, usize), reserve: (usize, usize), token: MatchToken) -> Prefab {
        Prefab {
            id: id.to_string(),
            category: Category::Structure,
            size,
            reserve,
            probability: 1.0,
            before: vec![vec![token; size.0]; size.1],
            after: Vec::new(),
        }
    }

    #[test]
    fn test_single_any_prefab_places_once_on_five_by_five() {
        let mut grid = Grid::new(5, 5, TileKind::Floor);
        let prefab = block("any3", (3, 3), (3, 3), MatchToken::Any);
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let report = apply_pass_detailed(&mut grid, &mut rng, &[prefab], Category::Structure, &[], 0, |_, _| {});
        assert_eq!(report.placed, 1);
        assert_eq!(report.reservations, vec![Rect::new(0, 0, 2, 2)]);
    }

    #[test]
    fn test_reservations_never_overlap() {
        let mut grid = Grid::new(30, 20, TileKind::Floor);
        let prefabs = [
            block("big", (4, 3), (7, 6), MatchToken::Floor),
            block("small", (2, 2), (3, 3), MatchToken::Any),
        ];
        let mut rng = ChaCha8Rng::seed_from_u64(4);
        let report = apply_pass_detailed(&mut grid, &mut rng, &prefabs, Category::Structure, &[], 0, |_, _| {});
        assert!(report.placed > 1);
        for (i, a) in report.reservations.iter().enumerate() {
            for b in &report.reservations[i + 1..] {
                assert!(!a.overlaps(b), "{a:?} overlaps {b:?}");
            }
        }
    }

    #[test]
    fn test_larger_sizes_claim_space_first() {
        let mut grid = Grid::new(4, 4, TileKind::Floor);
        let prefabs = [
            block("small", (1, 1), (1, 1), MatchToken::Any),
            block("big", (4, 4), (4, 4), MatchToken::Any),
        ];
        let mut rng = ChaCha8Rng::seed_from_u64(2);
        let report = apply_pass_detailed(&mut grid, &mut rng, &prefabs, Category::Structure, &[], 0, |_, _| {});
        assert_eq!(report.placed, 1);
        assert_eq!(report.reservations, vec![Rect::new(0, 0, 3, 3)]);
    }

    #[test]
    fn test_protection_disk_blocks_reservations() {
        let mut grid = Grid::new(6, 6, TileKind::Floor);
        let prefab = block("dot", (1, 1), (1, 1), MatchToken::Any);
        let centers = [Coord::new(0, 0)];
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let report = apply_pass_detailed(&mut grid, &mut rng, &[prefab], Category::Structure, &centers, 2, |_, _| {});
        // Cells within radius 2 of the corner: (0,0),(1,0),(2,0),(0,1),(1,1),(0,2).
        assert_eq!(report.placed, 36 - 6);
        assert!(report.reservations.iter().all(|r| !in_any_disk(Coord::new(r.x1, r.y1), &centers, 2)));
    }

    #[test]
    fn test_category_filter_and_observer() {
        let mut grid = Grid::new(6, 6, TileKind::Floor);
        let mut feature = block("puddle", (3, 3), (3, 3), MatchToken::Floor);
        feature.category = Category::Feature;
        feature.after = vec![Patch { x: 1, y: 1, tile: PatchTile::Water }];
        let mut rng = ChaCha8Rng::seed_from_u64(5);

        let none = apply_pass(&mut grid, &mut rng, &[feature.clone()], Category::Structure, &[], 0, |_, _| {});
        assert_eq!(none, 0);

        let mut seen = Vec::new();
        let placed = apply_pass(&mut grid, &mut rng, &[feature], Category::Feature, &[], 0, |g, n| {
            seen.push((n, g.count(TileKind::Water)));
        });
        assert_eq!(placed, 4);
        assert_eq!(seen, vec![(1, 1), (2, 2), (3, 3), (4, 4)]);
    }

    #[test]
    fn test_zero_probability_never_places() {
        let mut grid = Grid::new(5, 5, TileKind::Floor);
        let mut prefab = block("never", (1, 1), (1, 1), MatchToken::Any);
        prefab.probability = 0.0;
        prefab.after = vec![Patch { x: 0, y: 0, tile: PatchTile::Hole }];
        let mut rng = ChaCha8Rng::seed_from_u64(6);
        assert_eq!(apply_pass(&mut grid, &mut rng, &[prefab], Category::Structure, &[], 0, |_, _| {}), 0);
        assert_eq!(grid.count(TileKind::Hole), 0);
    }

    #[test]
    fn test_pattern_must_match_tiles() {
        let mut grid = Grid::new(5, 5, TileKind::Floor);
        let prefab = block("walls", (2, 2), (2, 2), MatchToken::Solid);
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        assert_eq!(apply_pass(&mut grid, &mut rng, &[prefab], Category::Structure, &[], 0, |_, _| {}), 0);
    }
}
