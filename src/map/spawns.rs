// src/map/spawns.rs
use super::grid::Coord;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub const TEAM_A: &str = "team1";
pub const TEAM_B: &str = "team2";

/// Spawn coordinates per team. Each team's list keeps insertion order and holds no duplicates.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SpawnSet {
    teams: BTreeMap<String, Vec<Coord>>,
}

impl SpawnSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds the two-team set, mirroring team A onto team B when `mirror` is set.
    pub fn for_teams(team_a: &[Coord], width: usize, mirror: bool) -> Self {
        let mut spawns = SpawnSet::new();
        spawns.insert_team(TEAM_A);
        for c in team_a {
            spawns.add(TEAM_A, *c);
        }
        spawns.insert_team(TEAM_B);
        if mirror {
            for c in mirror_spawns(team_a, width) {
                spawns.add(TEAM_B, c);
            }
        }
        spawns
    }

    pub fn insert_team(&mut self, team: &str) {
        self.teams.entry(team.to_string()).or_default();
    }

    /// Appends `c` to `team`. Returns false if the team already had it.
    pub fn add(&mut self, team: &str, c: Coord) -> bool {
        let list = self.teams.entry(team.to_string()).or_default();
        if list.contains(&c) {
            return false;
        }
        list.push(c);
        true
    }

    pub fn team(&self, team: &str) -> &[Coord] {
        self.teams.get(team).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn teams(&self) -> impl Iterator<Item = (&str, &[Coord])> {
        self.teams.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }

    /// Every spawn, team A first, then team B, then any other team in name order.
    pub fn all(&self) -> Vec<Coord> {
        let mut out: Vec<Coord> = Vec::new();
        out.extend_from_slice(self.team(TEAM_A));
        out.extend_from_slice(self.team(TEAM_B));
        for (name, coords) in self.teams() {
            if name != TEAM_A && name != TEAM_B {
                out.extend_from_slice(coords);
            }
        }
        out
    }

    pub fn is_empty(&self) -> bool {
        self.teams.values().all(Vec::is_empty)
    }
}

/// Reflects coordinates across the vertical center line: x becomes width-1-x.
pub fn mirror_spawns(spawns: &[Coord], width: usize) -> Vec<Coord> {
    spawns
        .iter()
        .map(|c| {
            let last = i32::try_from(width).unwrap_or(i32::MAX).saturating_sub(1);
            Coord::new(last.saturating_sub(c.x), c.y)
        })
        .collect()
}
