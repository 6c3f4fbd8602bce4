// src/generation/pipeline.rs

use super::cave;
use super::connectivity::{connect_all_regions, connect_spawns, convert_hidden_walls, protect_spawns};
use super::features::place_features;
use super::params::GenerationParams;
use crate::map::{Grid, MapData, SpawnSet, TileKind};
use crate::prefab::{apply_pass, load_library, Category, LibrarySource, Prefab};
use log::{debug, info, warn};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::fmt;
use std::time::Instant;

/// Pipeline stages, in the order they run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    BaseTerrain,
    SpawnClearing,
    CorridorConnect,
    RegionMerge,
    Hazards,
    HiddenWallConversion,
    StructurePrefabs,
    FeaturePrefabs,
    Done,
}

impl Stage {
    pub fn label(self) -> &'static str {
        match self {
            Stage::BaseTerrain => "base",
            Stage::SpawnClearing => "spawns",
            Stage::CorridorConnect => "corridors",
            Stage::RegionMerge => "regions",
            Stage::Hazards => "hazards",
            Stage::HiddenWallConversion => "hidden-walls",
            Stage::StructurePrefabs => "prefab-structure",
            Stage::FeaturePrefabs => "prefab-feature",
            Stage::Done => "done",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Receives read-only snapshots as generation progresses.
///
/// Called synchronously once per stage, and once per placed prefab during the
/// prefab stages.
pub trait StageObserver {
    fn on_stage(&mut self, grid: &Grid, spawns: &SpawnSet, stage: Stage);
}

/// Ignores every snapshot.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopObserver;

impl StageObserver for NoopObserver {
    fn on_stage(&mut self, _grid: &Grid, _spawns: &SpawnSet, _stage: Stage) {}
}

impl<F> StageObserver for F
where
    F: FnMut(&Grid, &SpawnSet, Stage),
{
    fn on_stage(&mut self, grid: &Grid, spawns: &SpawnSet, stage: Stage) {
        self(grid, spawns, stage)
    }
}

/// Logs a one-line summary of every snapshot.
#[derive(Debug, Default)]
pub struct LoggingObserver {
    pub snapshots: usize,
}

impl StageObserver for LoggingObserver {
    fn on_stage(&mut self, grid: &Grid, _spawns: &SpawnSet, stage: Stage) {
        self.snapshots += 1;
        info!(
            "[{}] floor={} walls={} indestructible={} hazards={}",
            stage,
            grid.count(TileKind::Floor),
            grid.count(TileKind::BreakableWall),
            grid.count(TileKind::IndestructibleWall),
            grid.count(TileKind::Water) + grid.count(TileKind::Hole) + grid.count(TileKind::Spike),
        );
    }
}

#[derive(Default, Debug, Clone, PartialEq)]
pub struct GenerationStats {
    pub generation_time: f64,
    pub regions_merged: usize,
    pub hazards_placed: usize,
    pub hidden_walls_converted: usize,
    pub structures_placed: usize,
    pub features_placed: usize,
    pub floor_cells: usize,
}

/// Runs the whole pipeline for one (params, seed) pair.
///
/// Owns the only random stream of the run; every stage draws from it in a
/// fixed order, so the same params and seed always produce the same map.
pub struct MapGenerator {
    params: GenerationParams,
    seed: u64,
    rng: ChaCha8Rng,
    prefabs: Option<Vec<Prefab>>,
    stats: Option<GenerationStats>,
}

impl MapGenerator {
    pub fn new(params: &GenerationParams, seed: u64) -> Self {
        MapGenerator {
            params: params.sanitized(),
            seed,
            rng: ChaCha8Rng::seed_from_u64(seed),
            prefabs: None,
            stats: None,
        }
    }

    /// Uses `prefabs` instead of loading the library named by the params.
    pub fn with_prefabs(mut self, prefabs: Vec<Prefab>) -> Self {
        self.prefabs = Some(prefabs);
        self
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn params(&self) -> &GenerationParams {
        &self.params
    }

    /// Statistics of the last run, if any.
    pub fn stats(&self) -> Option<&GenerationStats> {
        self.stats.as_ref()
    }

    pub fn generate(&mut self) -> MapData {
        self.generate_with(&mut NoopObserver)
    }

    pub fn generate_with(&mut self, observer: &mut dyn StageObserver) -> MapData {
        let started = Instant::now();
        self.rng = ChaCha8Rng::seed_from_u64(self.seed);
        let library = if self.params.prefabs_enabled {
            self.library()
        } else {
            Vec::new()
        };

        let p = &self.params;
        let rng = &mut self.rng;
        let mut stats = GenerationStats::default();

        let spawns = p.spawn_set();
        let centers = spawns.all();
        let radius = p.spawn_clear_radius;
        info!(
            "generating {}x{} arena, seed {}, {} spawns",
            p.width,
            p.height,
            self.seed,
            centers.len()
        );

        let mut grid = cave::generate(
            p.width,
            p.height,
            rng,
            p.ca_initial_wall_prob,
            p.ca_passes as u32,
            p.ca_birth_limit as usize,
            p.ca_death_limit as usize,
        );
        observer.on_stage(&grid, &spawns, Stage::BaseTerrain);

        protect_spawns(&mut grid, &centers, radius);
        observer.on_stage(&grid, &spawns, Stage::SpawnClearing);

        if p.enforce_connected_floor {
            connect_spawns(
                &mut grid,
                &centers,
                rng,
                p.corridor_radius,
                radius,
                p.extra_corridors as u32,
                p.extra_corridor_radius,
            );
            observer.on_stage(&grid, &spawns, Stage::CorridorConnect);

            stats.regions_merged = connect_all_regions(&mut grid, &centers, rng, p.corridor_radius, radius);
            debug!("merged {} floor regions", stats.regions_merged);
            observer.on_stage(&grid, &spawns, Stage::RegionMerge);
        }

        stats.hazards_placed = place_features(
            &mut grid,
            rng,
            p.water_percent,
            p.holes_percent,
            p.spikes_percent,
            radius,
            &centers,
        );
        if p.enforce_connected_floor {
            // Hazards may cut floor off; corridors carved now run through them.
            let rejoined = connect_all_regions(&mut grid, &centers, rng, p.corridor_radius, radius);
            if rejoined > 0 {
                debug!("rejoined {} floor regions split by hazards", rejoined);
            }
            stats.regions_merged += rejoined;
            stats.hazards_placed = TileKind::ALL.iter().filter(|t| t.is_hazard()).map(|t| grid.count(*t)).sum();
        }
        observer.on_stage(&grid, &spawns, Stage::Hazards);

        stats.hidden_walls_converted = convert_hidden_walls(&mut grid);
        observer.on_stage(&grid, &spawns, Stage::HiddenWallConversion);

        if !library.is_empty() {
            stats.structures_placed = apply_pass(
                &mut grid,
                rng,
                &library,
                Category::Structure,
                &centers,
                radius,
                |g, _| observer.on_stage(g, &spawns, Stage::StructurePrefabs),
            );
            stats.features_placed = apply_pass(
                &mut grid,
                rng,
                &library,
                Category::Feature,
                &centers,
                radius,
                |g, _| observer.on_stage(g, &spawns, Stage::FeaturePrefabs),
            );
        }

        stats.floor_cells = grid.count(TileKind::Floor);
        stats.generation_time = started.elapsed().as_secs_f64();
        observer.on_stage(&grid, &spawns, Stage::Done);
        info!(
            "arena ready in {:.3}s: {} floor cells, {} structures, {} features",
            stats.generation_time, stats.floor_cells, stats.structures_placed, stats.features_placed
        );
        self.stats = Some(stats);

        MapData::new(grid, spawns)
    }

    /// The injected library, or the one the params name. Load failures are
    /// logged and yield an empty library.
    fn library(&self) -> Vec<Prefab> {
        if let Some(prefabs) = &self.prefabs {
            return prefabs.clone();
        }
        let Some(source) = LibrarySource::from_reference(&self.params.prefabs_json_path) else {
            return Vec::new();
        };
        match load_library(source) {
            Ok(prefabs) => prefabs,
            Err(e) => {
                warn!("prefab library unavailable, continuing without prefabs: {}", e);
                Vec::new()
            }
        }
    }
}

/// Generates one arena with no observer.
pub fn generate(params: &GenerationParams, seed: u64) -> MapData {
    MapGenerator::new(params, seed).generate()
}

pub fn generate_with_observer(params: &GenerationParams, seed: u64, observer: &mut dyn StageObserver) -> MapData {
    MapGenerator::new(params, seed).generate_with(observer)
}

/// The params' seed, or a fresh random one.
pub fn resolve_seed(params: &GenerationParams) -> u64 {
    params.seed.unwrap_or_else(rand::random)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generation::connectivity::{flood_mask, FloorRegions};
    use crate::map::Coord;
    use crate::utils::geometry::{disk_bounds, in_disk};

    fn calm(width: usize, height: usize) -> GenerationParams {
        GenerationParams {
            width,
            height,
            water_percent: 0.0,
            holes_percent: 0.0,
            spikes_percent: 0.0,
            ..GenerationParams::default()
        }
    }

    #[test]
    fn test_generation_is_deterministic() {
        let params = GenerationParams::default();
        let a = generate(&params, 1234);
        let b = generate(&params, 1234);
        assert_eq!(a, b);
        let c = generate(&params, 1235);
        assert_ne!(a.grid, c.grid);
    }

    #[test]
    fn test_border_is_indestructible() {
        for seed in 0..5 {
            let map = generate(&GenerationParams::default(), seed);
            let grid = &map.grid;
            for c in grid.coords().filter(|c| grid.is_border(*c)) {
                assert_eq!(grid.get(c), Some(TileKind::IndestructibleWall), "seed {seed} at {c:?}");
            }
        }
    }

    #[test]
    fn test_no_floating_rock() {
        for seed in 0..5 {
            let map = generate(&GenerationParams::default(), seed);
            for c in map.grid.cells_of(TileKind::BreakableWall) {
                assert!(map.grid.touches8(c, TileKind::Floor), "seed {seed} at {c:?}");
            }
        }
    }

    #[test]
    fn test_spawn_disks_are_floor() {
        let params = GenerationParams::default();
        for seed in 0..5 {
            let map = generate(&params, seed);
            for s in map.spawns.all() {
                for c in disk_bounds(s, params.spawn_clear_radius).cells() {
                    if in_disk(c, s, params.spawn_clear_radius) {
                        assert_eq!(map.grid.get(c), Some(TileKind::Floor), "seed {seed} at {c:?}");
                    }
                }
            }
        }
    }

    #[test]
    fn test_single_reachable_region() {
        for seed in 0..40 {
            let map = generate(&GenerationParams::default(), seed);
            let first = map.spawns.all()[0];
            let reach = flood_mask(&map.grid, first, TileKind::Floor);
            for c in map.grid.cells_of(TileKind::Floor) {
                assert!(reach[map.grid.index_of(c).unwrap()], "seed {seed}: {c:?} unreachable");
            }
            assert_eq!(FloorRegions::find(&map.grid).len(), 1);
        }
    }

    #[test]
    fn test_hazards_never_strand_floor() {
        let params = GenerationParams {
            water_percent: 0.2,
            holes_percent: 0.1,
            spikes_percent: 0.1,
            prefabs_enabled: false,
            ..GenerationParams::default()
        };
        for seed in 0..10 {
            let mut generator = MapGenerator::new(&params, seed);
            let map = generator.generate();
            assert_eq!(FloorRegions::find(&map.grid).len(), 1, "seed {seed}");
            let hazards = map.grid.count(TileKind::Water) + map.grid.count(TileKind::Hole) + map.grid.count(TileKind::Spike);
            assert_eq!(generator.stats().unwrap().hazards_placed, hazards);
            assert!(hazards > 0);
        }
    }

    #[test]
    fn test_repeated_runs_on_one_generator_match() {
        let mut generator = MapGenerator::new(&GenerationParams::default(), 99);
        let first = generator.generate();
        let second = generator.generate();
        assert_eq!(first, second);
        assert_eq!(first, generate(&GenerationParams::default(), 99));
    }

    #[test]
    fn test_off_grid_spawns_and_huge_radius_are_harmless() {
        let params = GenerationParams {
            team_a_spawns: vec![Coord::new(i32::MAX - 1, 2), Coord::new(-5, i32::MIN), Coord::new(3, 3)],
            spawn_clear_radius: 20_000,
            ..calm(10, 10)
        };
        let map = generate(&params, 11);
        assert_eq!(map.spawns.team(crate::map::TEAM_A), &[Coord::new(3, 3)]);
        assert_eq!(map.spawns.team(crate::map::TEAM_B), &[Coord::new(6, 3)]);
        // The protection disk swallows the whole grid.
        assert_eq!(map.grid.count(TileKind::Floor), 8 * 8);
    }

    #[test]
    fn test_open_room_without_walls() {
        let params = GenerationParams {
            ca_initial_wall_prob: 0.0,
            ca_passes: 0,
            team_a_spawns: Vec::new(),
            prefabs_enabled: false,
            ..calm(10, 10)
        };
        let map = generate(&params, 7);
        for c in map.grid.coords() {
            let expected = if map.grid.is_border(c) {
                TileKind::IndestructibleWall
            } else {
                TileKind::Floor
            };
            assert_eq!(map.grid.get(c), Some(expected));
        }
    }

    #[test]
    fn test_opposite_corner_spawns_are_connected() {
        let params = GenerationParams {
            team_a_spawns: vec![Coord::new(2, 2), Coord::new(9, 9)],
            mirror_spawns: false,
            spawn_clear_radius: 2,
            ..calm(12, 12)
        };
        for seed in 0..10 {
            let map = generate(&params, seed);
            let reach = flood_mask(&map.grid, Coord::new(2, 2), TileKind::Floor);
            assert!(reach[map.grid.index_of(Coord::new(9, 9)).unwrap()], "seed {seed}");
        }
    }

    #[test]
    fn test_observer_sees_stages_in_order() {
        let mut stages = Vec::new();
        let mut observer = |_: &Grid, _: &SpawnSet, stage: Stage| {
            if stages.last() != Some(&stage) {
                stages.push(stage);
            }
        };
        generate_with_observer(&calm(40, 24), 3, &mut observer);
        assert_eq!(&stages[..6], &[
            Stage::BaseTerrain,
            Stage::SpawnClearing,
            Stage::CorridorConnect,
            Stage::RegionMerge,
            Stage::Hazards,
            Stage::HiddenWallConversion,
        ]);
        assert_eq!(stages.last(), Some(&Stage::Done));
    }

    #[test]
    fn test_disabled_connectivity_skips_corridor_stages() {
        let params = GenerationParams {
            enforce_connected_floor: false,
            prefabs_enabled: false,
            ..calm(30, 20)
        };
        let mut observer = LoggingObserver::default();
        generate_with_observer(&params, 1, &mut observer);
        // base, spawns, hazards, hidden-walls, done
        assert_eq!(observer.snapshots, 5);
    }

    #[test]
    fn test_missing_library_is_not_fatal() {
        let broken = GenerationParams {
            prefabs_json_path: "/nonexistent/prefabs.json".to_string(),
            ..GenerationParams::default()
        };
        let off = GenerationParams {
            prefabs_enabled: false,
            ..GenerationParams::default()
        };
        assert_eq!(generate(&broken, 42), generate(&off, 42));
    }

    #[test]
    fn test_injected_library_is_used() {
        let library = crate::prefab::parse_library(
            r#"{"prefabs": [{"id": "mark", "category": "FEATURE", "size": [1, 1],
                "before": [["MT:FLOOR"]], "after": [{"x": 0, "y": 0, "tile": "SPIKE"}]}]}"#,
        )
        .unwrap();
        let mut generator = MapGenerator::new(&calm(30, 20), 5).with_prefabs(library);
        let map = generator.generate();
        let stats = generator.stats().unwrap();
        assert!(stats.features_placed > 0);
        assert_eq!(map.grid.count(TileKind::Spike), stats.features_placed);
        assert_eq!(stats.structures_placed, 0);
    }

    #[test]
    fn test_degenerate_sizes_do_not_panic() {
        for (w, h) in [(0, 0), (1, 1), (2, 3), (3, 3)] {
            let map = generate(&calm(w, h), 9);
            assert_eq!((map.grid.width(), map.grid.height()), (w, h));
        }
    }

    #[test]
    fn test_resolve_seed_prefers_params() {
        let params = GenerationParams {
            seed: Some(77),
            ..GenerationParams::default()
        };
        assert_eq!(resolve_seed(&params), 77);
    }
}
