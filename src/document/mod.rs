// src/document/mod.rs
mod document;

pub use self::document::{list_maps, MapDocument, MapFileError};
