// src/prefab/mod.rs
//! Hand-authored structural patterns stamped onto generated grids.
//!
//! A prefab pairs a `before` pattern of match tokens with an `after` list of
//! patches. Libraries are JSON documents (see [`library`]); every prefab is
//! expanded into its distinct 90° rotations before a placement pass.

pub mod library;
pub mod placement;
pub mod rotation;

pub use library::{load_library, parse_library, LibrarySource, PrefabError};
pub use placement::{apply_pass, apply_pass_detailed, PassReport};
pub use rotation::expand_rotations;

use crate::map::{Coord, Grid, TileKind};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Category {
    Structure,
    Feature,
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Category::Structure => f.write_str("STRUCTURE"),
            Category::Feature => f.write_str("FEATURE"),
        }
    }
}

/// A `before` pattern cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MatchToken {
    #[serde(rename = "ANY")]
    Any,
    #[serde(rename = "SOLID")]
    Solid,
    #[serde(rename = "MT:FLOOR")]
    Floor,
    #[serde(rename = "MT:WALL")]
    Wall,
    #[serde(rename = "MT:IW")]
    Indestructible,
}

impl MatchToken {
    pub fn matches(self, tile: TileKind) -> bool {
        match self {
            MatchToken::Any => true,
            MatchToken::Solid => tile.is_solid(),
            MatchToken::Floor => tile == TileKind::Floor,
            MatchToken::Wall => tile == TileKind::BreakableWall,
            MatchToken::Indestructible => tile == TileKind::IndestructibleWall,
        }
    }
}

/// Patch targets use the long tile names of the library format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PatchTile {
    Floor,
    WallBreakable,
    WallInbreakable,
    Spike,
    Water,
    Hole,
}

impl PatchTile {
    pub fn tile(self) -> TileKind {
        match self {
            PatchTile::Floor => TileKind::Floor,
            PatchTile::WallBreakable => TileKind::BreakableWall,
            PatchTile::WallInbreakable => TileKind::IndestructibleWall,
            PatchTile::Spike => TileKind::Spike,
            PatchTile::Water => TileKind::Water,
            PatchTile::Hole => TileKind::Hole,
        }
    }
}

/// Writes `tile` at an offset relative to the pattern origin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Patch {
    pub x: i32,
    pub y: i32,
    pub tile: PatchTile,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Prefab {
    pub id: String,
    pub category: Category,
    /// Pattern size as (width, height).
    pub size: (usize, usize),
    /// Exclusion zone size; never smaller than `size`.
    pub reserve: (usize, usize),
    pub probability: f64,
    /// `size.1` rows of `size.0` tokens.
    pub before: Vec<Vec<MatchToken>>,
    pub after: Vec<Patch>,
}

impl Prefab {
    /// True if every token matches the tile under it with the pattern at `origin`.
    pub fn matches_at(&self, grid: &Grid, origin: Coord) -> bool {
        self.before.iter().enumerate().all(|(dy, row)| {
            row.iter().enumerate().all(|(dx, token)| {
                grid.get(Coord::new(origin.x + dx as i32, origin.y + dy as i32))
                    .map_or(false, |tile| token.matches(tile))
            })
        })
    }

    /// Applies every patch relative to `origin`. Indestructible cells are only
    /// ever overwritten by indestructible patches; off-grid patches are dropped.
    pub fn stamp(&self, grid: &mut Grid, origin: Coord) {
        for patch in &self.after {
            let target = Coord::new(origin.x + patch.x, origin.y + patch.y);
            let tile = patch.tile.tile();
            match grid.get(target) {
                None => continue,
                Some(TileKind::IndestructibleWall) if tile != TileKind::IndestructibleWall => continue,
                Some(_) => {
                    grid.set(target, tile);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn probe(after: Vec<Patch>) -> Prefab {
        Prefab {
            id: "probe".to_string(),
            category: Category::Structure,
            size: (2, 1),
            reserve: (2, 1),
            probability: 1.0,
            before: vec![vec![MatchToken::Floor, MatchToken::Solid]],
            after,
        }
    }

    #[test]
    fn test_token_matching() {
        assert!(MatchToken::Any.matches(TileKind::Hole));
        assert!(MatchToken::Solid.matches(TileKind::BreakableWall));
        assert!(MatchToken::Solid.matches(TileKind::IndestructibleWall));
        assert!(!MatchToken::Solid.matches(TileKind::Water));
        assert!(MatchToken::Wall.matches(TileKind::BreakableWall));
        assert!(!MatchToken::Wall.matches(TileKind::IndestructibleWall));
        assert!(MatchToken::Indestructible.matches(TileKind::IndestructibleWall));
        assert!(!MatchToken::Floor.matches(TileKind::Spike));
    }

    #[test]
    fn test_tokens_parse_from_library_names() {
        let tokens: Vec<MatchToken> = serde_json::from_str(r#"["ANY","SOLID","MT:FLOOR","MT:WALL","MT:IW"]"#).unwrap();
        assert_eq!(tokens.len(), 5);
        assert!(serde_json::from_str::<MatchToken>(r#""MT:LAVA""#).is_err());
        let tile: PatchTile = serde_json::from_str(r#""WALL_INBREAKABLE""#).unwrap();
        assert_eq!(tile.tile(), TileKind::IndestructibleWall);
    }

    #[test]
    fn test_matches_at_checks_every_cell() {
        let mut grid = Grid::new(3, 1, TileKind::Floor);
        grid.set(Coord::new(1, 0), TileKind::BreakableWall);
        let prefab = probe(Vec::new());
        assert!(prefab.matches_at(&grid, Coord::new(0, 0)));
        assert!(!prefab.matches_at(&grid, Coord::new(1, 0)));
        // Pattern hanging off the grid never matches.
        assert!(!prefab.matches_at(&grid, Coord::new(2, 0)));
    }

    #[test]
    fn test_stamp_never_weakens_indestructible() {
        let mut grid = Grid::new(3, 1, TileKind::IndestructibleWall);
        grid.set(Coord::new(0, 0), TileKind::Floor);
        let prefab = probe(vec![
            Patch { x: 0, y: 0, tile: PatchTile::Water },
            Patch { x: 1, y: 0, tile: PatchTile::Floor },
            Patch { x: 2, y: 0, tile: PatchTile::WallInbreakable },
            Patch { x: 9, y: 0, tile: PatchTile::Floor },
        ]);
        prefab.stamp(&mut grid, Coord::new(0, 0));
        assert_eq!(grid.get(Coord::new(0, 0)), Some(TileKind::Water));
        assert_eq!(grid.get(Coord::new(1, 0)), Some(TileKind::IndestructibleWall));
        assert_eq!(grid.get(Coord::new(2, 0)), Some(TileKind::IndestructibleWall));
    }
}
