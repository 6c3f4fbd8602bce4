// src/generation/params.rs
use crate::map::{Coord, SpawnSet};
use crate::utils::util::{clamp_unit, non_negative};
use log::warn;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Selects the prefab library compiled into the crate.
pub const BUILTIN_LIBRARY: &str = "builtin";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read params file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid params JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Everything one generation call depends on besides the seed stream itself.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationParams {
    pub width: usize,
    pub height: usize,

    /// `None` lets the caller pick a seed.
    pub seed: Option<u64>,

    /// Team B is mirrored from team A when `mirror_spawns` is set.
    pub team_a_spawns: Vec<Coord>,
    pub mirror_spawns: bool,

    pub spawn_clear_radius: i32,

    // Cellular automaton
    pub ca_initial_wall_prob: f64,
    pub ca_passes: i32,
    pub ca_birth_limit: i32,
    pub ca_death_limit: i32,

    // Connectivity carving
    pub enforce_connected_floor: bool,
    pub corridor_radius: i32,
    pub extra_corridors: i32,
    pub extra_corridor_radius: i32,

    // Hazards, as fractions of eligible floor
    pub water_percent: f64,
    pub holes_percent: f64,
    pub spikes_percent: f64,

    pub prefabs_enabled: bool,
    /// `"builtin"`, a filesystem path, or empty for no library.
    pub prefabs_json_path: String,
}

impl Default for GenerationParams {
    fn default() -> Self {
        Self {
            width: 60,
            height: 30,
            seed: None,
            team_a_spawns: vec![Coord::new(6, 11), Coord::new(6, 15), Coord::new(6, 19)],
            mirror_spawns: true,
            spawn_clear_radius: 3,
            ca_initial_wall_prob: 0.45,
            ca_passes: 5,
            ca_birth_limit: 5,
            ca_death_limit: 3,
            enforce_connected_floor: true,
            corridor_radius: 1,
            extra_corridors: 4,
            extra_corridor_radius: 2,
            water_percent: 0.01,
            holes_percent: 0.005,
            spikes_percent: 0.01,
            prefabs_enabled: true,
            prefabs_json_path: BUILTIN_LIBRARY.to_string(),
        }
    }
}

impl GenerationParams {
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&text)
    }

    pub fn from_json_str(text: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(text)?)
    }

    /// Copy with probabilities clamped to `[0, 1]`, negative radii, counts
    /// and passes raised to zero, and team-A spawns outside the grid dropped.
    pub fn sanitized(&self) -> Self {
        let (w, h) = (self.width, self.height);
        let team_a_spawns: Vec<Coord> = self
            .team_a_spawns
            .iter()
            .copied()
            .filter(|c| c.x >= 0 && c.y >= 0 && (c.x as usize) < w && (c.y as usize) < h)
            .collect();
        if team_a_spawns.len() != self.team_a_spawns.len() {
            warn!(
                "dropping {} spawns outside the {}x{} grid",
                self.team_a_spawns.len() - team_a_spawns.len(),
                w,
                h
            );
        }
        Self {
            team_a_spawns,
            spawn_clear_radius: non_negative(self.spawn_clear_radius),
            ca_initial_wall_prob: clamp_unit(self.ca_initial_wall_prob),
            ca_passes: non_negative(self.ca_passes),
            ca_birth_limit: non_negative(self.ca_birth_limit),
            ca_death_limit: non_negative(self.ca_death_limit),
            corridor_radius: non_negative(self.corridor_radius),
            extra_corridors: non_negative(self.extra_corridors),
            extra_corridor_radius: non_negative(self.extra_corridor_radius),
            water_percent: clamp_unit(self.water_percent),
            holes_percent: clamp_unit(self.holes_percent),
            spikes_percent: clamp_unit(self.spikes_percent),
            ..self.clone()
        }
    }

    pub fn spawn_set(&self) -> SpawnSet {
        SpawnSet::for_teams(&self.team_a_spawns, self.width, self.mirror_spawns)
    }
}
