// src/map/tile.rs
use serde::{Deserialize, Serialize};
use std::fmt;

/// The six tile kinds an arena grid may contain.
///
/// Serialized with the two-letter codes used by map files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TileKind {
    #[serde(rename = "FL")]
    Floor,
    #[serde(rename = "WL")]
    BreakableWall,
    #[serde(rename = "IW")]
    IndestructibleWall,
    #[serde(rename = "WA")]
    Water,
    #[serde(rename = "HO")]
    Hole,
    #[serde(rename = "SP")]
    Spike,
}

impl TileKind {
    pub const ALL: [TileKind; 6] = [
        TileKind::IndestructibleWall,
        TileKind::BreakableWall,
        TileKind::Floor,
        TileKind::Water,
        TileKind::Hole,
        TileKind::Spike,
    ];

    /// Map file code for this tile.
    pub fn code(self) -> &'static str {
        match self {
            TileKind::Floor => "FL",
            TileKind::BreakableWall => "WL",
            TileKind::IndestructibleWall => "IW",
            TileKind::Water => "WA",
            TileKind::Hole => "HO",
            TileKind::Spike => "SP",
        }
    }

    pub fn from_code(code: &str) -> Option<TileKind> {
        TileKind::ALL.into_iter().find(|tile| tile.code() == code)
    }

    pub fn display_name(self) -> &'static str {
        match self {
            TileKind::Floor => "Floor",
            TileKind::BreakableWall => "Wall",
            TileKind::IndestructibleWall => "Indestructible Wall",
            TileKind::Water => "Water",
            TileKind::Hole => "Hole",
            TileKind::Spike => "Spikes",
        }
    }

    pub fn is_traversable(self) -> bool {
        matches!(self, TileKind::Floor)
    }

    /// Breakable or indestructible wall.
    pub fn is_solid(self) -> bool {
        matches!(self, TileKind::BreakableWall | TileKind::IndestructibleWall)
    }

    pub fn is_hazard(self) -> bool {
        matches!(self, TileKind::Water | TileKind::Hole | TileKind::Spike)
    }
}

impl fmt::Display for TileKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}
