// src/prefab/rotation.rs
use super::{Patch, Prefab};

impl Prefab {
    /// The prefab turned 90° clockwise.
    ///
    /// Pattern cell `(x, y)` of a `w`×`h` prefab lands on `(h-1-y, x)` of the
    /// `h`×`w` result; patch offsets move the same way. Size and reserve swap.
    pub fn rotated_cw(&self) -> Prefab {
        let (w, h) = self.size;
        let before = (0..w)
            .map(|x| (0..h).map(|y| self.before[h - 1 - y][x]).collect())
            .collect();
        let after = self
            .after
            .iter()
            .map(|p| Patch {
                x: h as i32 - 1 - p.y,
                y: p.x,
                tile: p.tile,
            })
            .collect();
        Prefab {
            id: self.id.clone(),
            category: self.category,
            size: (h, w),
            reserve: (self.reserve.1, self.reserve.0),
            probability: self.probability,
            before,
            after,
        }
    }

    /// The 0°, 90°, 180° and 270° variants with structural duplicates removed.
    pub fn rotations(&self) -> Vec<Prefab> {
        let mut variants: Vec<Prefab> = Vec::with_capacity(4);
        let mut current = self.clone();
        for _ in 0..4 {
            let next = current.rotated_cw();
            if !variants.contains(&current) {
                variants.push(current);
            }
            current = next;
        }
        variants
    }
}

/// Every prefab followed by its distinct rotations, in library order.
pub fn expand_rotations(prefabs: &[Prefab]) -> Vec<Prefab> {
    prefabs.iter().flat_map(Prefab::rotations).collect()
}
