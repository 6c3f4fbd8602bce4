// src/utils/geometry.rs
use crate::map::Coord;

/// Inclusive, axis-aligned integer rectangle in grid space.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rect {
    pub x1: i32,
    pub y1: i32,
    pub x2: i32,
    pub y2: i32,
}

impl Rect {
    pub fn new(x1: i32, y1: i32, x2: i32, y2: i32) -> Self {
        Self { x1, y1, x2, y2 }
    }

    /// Rectangle of `size` cells anchored at `origin`.
    pub fn from_origin(origin: Coord, width: usize, height: usize) -> Self {
        Self::new(
            origin.x,
            origin.y,
            origin.x + width as i32 - 1,
            origin.y + height as i32 - 1,
        )
    }

    /// Grows a `width`×`height` pattern at `origin` into a `reserve_w`×`reserve_h`
    /// exclusion zone, padding each side by the floor-divided difference.
    pub fn reservation(origin: Coord, width: usize, height: usize, reserve_w: usize, reserve_h: usize) -> Self {
        let pad_x = (reserve_w.saturating_sub(width) / 2) as i32;
        let pad_y = (reserve_h.saturating_sub(height) / 2) as i32;
        let inner = Self::from_origin(origin, width, height);
        Self::new(
            inner.x1.saturating_sub(pad_x),
            inner.y1.saturating_sub(pad_y),
            inner.x2.saturating_add(pad_x),
            inner.y2.saturating_add(pad_y),
        )
    }

    pub fn overlaps(&self, other: &Rect) -> bool {
        !(self.x2 < other.x1 || other.x2 < self.x1 || self.y2 < other.y1 || other.y2 < self.y1)
    }

    pub fn within(&self, width: usize, height: usize) -> bool {
        let (w, h) = (width as i32, height as i32);
        self.x1 >= 0 && self.y1 >= 0 && self.x2 < w && self.y2 < h && self.x1 <= self.x2 && self.y1 <= self.y2
    }

    /// The part of the rectangle inside a `width`×`height` grid, if any.
    pub fn clipped(&self, width: usize, height: usize) -> Option<Rect> {
        let max_x = i32::try_from(width).unwrap_or(i32::MAX) - 1;
        let max_y = i32::try_from(height).unwrap_or(i32::MAX) - 1;
        let r = Rect::new(self.x1.max(0), self.y1.max(0), self.x2.min(max_x), self.y2.min(max_y));
        (r.x1 <= r.x2 && r.y1 <= r.y2).then_some(r)
    }

    pub fn cells(&self) -> impl Iterator<Item = Coord> {
        let (x1, x2) = (self.x1, self.x2);
        (self.y1..=self.y2).flat_map(move |y| (x1..=x2).map(move |x| Coord::new(x, y)))
    }
}

/// True if `c` lies inside the Euclidean disk of `radius` around `center`.
pub fn in_disk(c: Coord, center: Coord, radius: i32) -> bool {
    let r = radius as i64;
    c.distance_sq(center) <= r * r
}

pub fn in_any_disk(c: Coord, centers: &[Coord], radius: i32) -> bool {
    centers.iter().any(|center| in_disk(c, *center, radius))
}

/// Cells of the bounding square of a disk; callers filter with [`in_disk`].
pub fn disk_bounds(center: Coord, radius: i32) -> Rect {
    let r = radius.max(0);
    Rect::new(
        center.x.saturating_sub(r),
        center.y.saturating_sub(r),
        center.x.saturating_add(r),
        center.y.saturating_add(r),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reservation_pads_by_floor_division() {
        let r = Rect::reservation(Coord::new(5, 5), 3, 3, 6, 5);
        // (6 - 3) / 2 == 1 on x, (5 - 3) / 2 == 1 on y.
        assert_eq!(r, Rect::new(4, 4, 8, 8));
        let same = Rect::reservation(Coord::new(0, 0), 2, 2, 2, 2);
        assert_eq!(same, Rect::new(0, 0, 1, 1));
    }

    #[test]
    fn test_overlap_is_inclusive() {
        let a = Rect::new(0, 0, 2, 2);
        assert!(a.overlaps(&Rect::new(2, 2, 4, 4)));
        assert!(!a.overlaps(&Rect::new(3, 0, 4, 2)));
        assert!(!a.overlaps(&Rect::new(0, 3, 2, 4)));
    }

    #[test]
    fn test_within_bounds() {
        assert!(Rect::new(0, 0, 4, 4).within(5, 5));
        assert!(!Rect::new(-1, 0, 4, 4).within(5, 5));
        assert!(!Rect::new(0, 0, 5, 4).within(5, 5));
    }

    #[test]
    fn test_disk_membership() {
        let center = Coord::new(0, 0);
        assert!(in_disk(Coord::new(2, 0), center, 2));
        assert!(!in_disk(Coord::new(2, 1), center, 2));
        assert!(in_disk(center, center, 0));
        assert!(in_any_disk(Coord::new(9, 9), &[center, Coord::new(9, 8)], 1));
    }

    #[test]
    fn test_clipped_to_grid() {
        let disk = disk_bounds(Coord::new(1, 1), 20_000);
        assert_eq!(disk.clipped(10, 6), Some(Rect::new(0, 0, 9, 5)));
        assert_eq!(Rect::new(12, 0, 14, 2).clipped(10, 6), None);
        assert_eq!(Rect::new(0, 0, 3, 3).clipped(0, 0), None);
        let far = disk_bounds(Coord::new(i32::MAX - 1, 2), 5);
        assert_eq!(far.x2, i32::MAX);
        assert_eq!(far.clipped(10, 10), None);
    }

    #[test]
    fn test_rect_cells_row_major() {
        let cells: Vec<_> = Rect::new(1, 1, 2, 2).cells().collect();
        assert_eq!(
            cells,
            vec![Coord::new(1, 1), Coord::new(2, 1), Coord::new(1, 2), Coord::new(2, 2)]
        );
    }
}
