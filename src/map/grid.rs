// src/map/grid.rs
use super::tile::TileKind;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// An integer cell position. Serialized as `[x, y]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "(i32, i32)", into = "(i32, i32)")]
pub struct Coord {
    pub x: i32,
    pub y: i32,
}

impl Coord {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Saturates at `i32::MAX` for coordinates far apart.
    pub fn manhattan(self, other: Coord) -> i32 {
        let dx = (self.x as i64 - other.x as i64).abs();
        let dy = (self.y as i64 - other.y as i64).abs();
        i32::try_from(dx + dy).unwrap_or(i32::MAX)
    }

    pub fn distance_sq(self, other: Coord) -> i64 {
        let dx = self.x as i64 - other.x as i64;
        let dy = self.y as i64 - other.y as i64;
        dx.saturating_mul(dx).saturating_add(dy.saturating_mul(dy))
    }

    /// Left, right, up, down.
    pub fn neighbors4(self) -> [Coord; 4] {
        let Coord { x, y } = self;
        let (l, r, u, d) = (x.saturating_sub(1), x.saturating_add(1), y.saturating_sub(1), y.saturating_add(1));
        [Coord::new(l, y), Coord::new(r, y), Coord::new(x, u), Coord::new(x, d)]
    }

    pub fn neighbors8(self) -> [Coord; 8] {
        let Coord { x, y } = self;
        let (l, r, u, d) = (x.saturating_sub(1), x.saturating_add(1), y.saturating_sub(1), y.saturating_add(1));
        [
            Coord::new(l, u),
            Coord::new(x, u),
            Coord::new(r, u),
            Coord::new(l, y),
            Coord::new(r, y),
            Coord::new(l, d),
            Coord::new(x, d),
            Coord::new(r, d),
        ]
    }
}

impl From<(i32, i32)> for Coord {
    fn from((x, y): (i32, i32)) -> Self {
        Coord::new(x, y)
    }
}

impl From<Coord> for (i32, i32) {
    fn from(c: Coord) -> Self {
        (c.x, c.y)
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum GridError {
    #[error("row {row} has {found} cells, expected {expected}")]
    Ragged {
        row: usize,
        expected: usize,
        found: usize,
    },
}

/// A rectangular, row-major matrix of tiles. Dimensions are fixed at creation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grid {
    width: usize,
    height: usize,
    cells: Vec<TileKind>,
}

impl Grid {
    pub fn new(width: usize, height: usize, fill: TileKind) -> Self {
        Self {
            width,
            height,
            cells: vec![fill; width * height],
        }
    }

    /// Builds a grid from rows, rejecting rows of unequal length.
    pub fn from_rows(rows: Vec<Vec<TileKind>>) -> Result<Self, GridError> {
        let height = rows.len();
        let width = rows.first().map_or(0, Vec::len);
        let mut cells = Vec::with_capacity(width * height);
        for (row, cols) in rows.into_iter().enumerate() {
            if cols.len() != width {
                return Err(GridError::Ragged {
                    row,
                    expected: width,
                    found: cols.len(),
                });
            }
            cells.extend(cols);
        }
        Ok(Self {
            width,
            height,
            cells,
        })
    }

    pub fn rows(&self) -> Vec<Vec<TileKind>> {
        if self.width == 0 {
            return vec![Vec::new(); self.height];
        }
        self.cells.chunks(self.width).map(<[TileKind]>::to_vec).collect()
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn in_bounds(&self, c: Coord) -> bool {
        c.x >= 0 && c.y >= 0 && (c.x as usize) < self.width && (c.y as usize) < self.height
    }

    /// Row-major index of `c`, if it lies inside the grid.
    pub fn index_of(&self, c: Coord) -> Option<usize> {
        if self.in_bounds(c) {
            Some(c.y as usize * self.width + c.x as usize)
        } else {
            None
        }
    }

    pub fn coord_of(&self, index: usize) -> Coord {
        Coord::new((index % self.width) as i32, (index / self.width) as i32)
    }

    pub fn get(&self, c: Coord) -> Option<TileKind> {
        self.index_of(c).map(|i| self.cells[i])
    }

    /// Writes `tile` at `c`. Returns false when `c` is out of bounds.
    pub fn set(&mut self, c: Coord, tile: TileKind) -> bool {
        match self.index_of(c) {
            Some(i) => {
                self.cells[i] = tile;
                true
            }
            None => false,
        }
    }

    pub fn is(&self, c: Coord, tile: TileKind) -> bool {
        self.get(c) == Some(tile)
    }

    /// All coordinates in row-major order.
    pub fn coords(&self) -> impl Iterator<Item = Coord> + '_ {
        (0..self.height).flat_map(move |y| (0..self.width).map(move |x| Coord::new(x as i32, y as i32)))
    }

    /// Row-major coordinates of every cell holding `tile`.
    pub fn cells_of(&self, tile: TileKind) -> Vec<Coord> {
        self.coords().filter(|c| self.is(*c, tile)).collect()
    }

    pub fn count(&self, tile: TileKind) -> usize {
        self.cells.iter().filter(|t| **t == tile).count()
    }

    pub fn is_border(&self, c: Coord) -> bool {
        self.in_bounds(c)
            && (c.x == 0 || c.y == 0 || c.x as usize == self.width - 1 || c.y as usize == self.height - 1)
    }

    /// Overwrites the outer ring with `tile`.
    pub fn force_border(&mut self, tile: TileKind) {
        if self.width == 0 || self.height == 0 {
            return;
        }
        let (w, h) = (self.width, self.height);
        for x in 0..w {
            self.cells[x] = tile;
            self.cells[(h - 1) * w + x] = tile;
        }
        for y in 0..h {
            self.cells[y * w] = tile;
            self.cells[y * w + w - 1] = tile;
        }
    }

    /// In-bounds 4-connected neighbors.
    pub fn neighbors4(&self, c: Coord) -> impl Iterator<Item = Coord> + '_ {
        c.neighbors4().into_iter().filter(move |n| self.in_bounds(*n))
    }

    /// In-bounds 8-connected neighbors.
    pub fn neighbors8(&self, c: Coord) -> impl Iterator<Item = Coord> + '_ {
        c.neighbors8().into_iter().filter(move |n| self.in_bounds(*n))
    }

    /// Number of solid tiles around `c`; positions outside the grid count as solid.
    pub fn solid_neighbors8(&self, c: Coord) -> usize {
        c.neighbors8()
            .into_iter()
            .filter(|n| self.get(*n).map_or(true, TileKind::is_solid))
            .count()
    }

    pub fn touches8(&self, c: Coord, tile: TileKind) -> bool {
        self.neighbors8(c).any(|n| self.is(n, tile))
    }

    /// Appends each row's reversal, doubling the width.
    pub fn mirrored_x(&self) -> Grid {
        let rows = self
            .rows()
            .into_iter()
            .map(|row| {
                let mut out = row.clone();
                out.extend(row.into_iter().rev());
                out
            })
            .collect();
        Self::from_rows(rows).unwrap_or_else(|_| self.clone())
    }

    /// Appends the rows in reverse order, doubling the height.
    pub fn mirrored_y(&self) -> Grid {
        let mut rows = self.rows();
        let flipped: Vec<_> = rows.iter().rev().cloned().collect();
        rows.extend(flipped);
        Grid {
            width: self.width,
            height: self.height * 2,
            cells: rows.into_iter().flatten().collect(),
        }
    }
}
