// src/utils/mod.rs
pub mod geometry;
pub mod util;

pub use geometry::{in_any_disk, in_disk, Rect};
