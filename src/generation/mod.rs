// src/generation/mod.rs
//! The arena generation pipeline and the stages it is built from.
//!
//! Stages are free functions over a `&mut Grid` and a caller-owned random
//! stream; [`pipeline::MapGenerator`] runs them in order.

pub mod cave;
pub mod connectivity;
pub mod features;
pub mod params;
pub mod pipeline;

pub use params::{ConfigError, GenerationParams, BUILTIN_LIBRARY};
pub use pipeline::{
    generate, generate_with_observer, resolve_seed, GenerationStats, LoggingObserver, MapGenerator, NoopObserver,
    Stage, StageObserver,
};
