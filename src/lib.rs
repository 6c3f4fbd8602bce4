// src/lib.rs
//! Seeded generator for symmetric, fully connected 2D team-game arenas.
//!
//! [`generation::generate`] turns a [`generation::GenerationParams`] and a
//! seed into a [`map::MapData`]; the same pair always yields the same map.

pub mod document;
pub mod generation;
pub mod map;
pub mod prefab;
pub mod utils;
