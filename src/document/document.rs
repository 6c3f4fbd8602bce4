// src/document/document.rs

use crate::generation::GenerationParams;
use crate::map::{Grid, GridError, MapData, SpawnSet, TileKind};
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

const EXTENSION: &str = "json";

#[derive(Debug, Error)]
pub enum MapFileError {
    #[error("map file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("invalid map JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Ragged(#[from] GridError),
    #[error("map declares {declared_w}x{declared_h} but its grid is {actual_w}x{actual_h}")]
    DimensionMismatch {
        declared_w: usize,
        declared_h: usize,
        actual_w: usize,
        actual_h: usize,
    },
}

/// The on-disk form of a map: grid rows of tile codes, spawns per team and
/// the parameters that produced it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapDocument {
    pub width: usize,
    pub height: usize,
    pub grid: Vec<Vec<TileKind>>,
    pub spawns: SpawnSet,
    #[serde(default)]
    pub generation_params: GenerationParams,
}

impl MapDocument {
    pub fn from_map(map: &MapData, params: &GenerationParams) -> Self {
        Self {
            width: map.grid.width(),
            height: map.grid.height(),
            grid: map.grid.rows(),
            spawns: map.spawns.clone(),
            generation_params: params.clone(),
        }
    }

    /// Rebuilds the grid, rejecting ragged rows and wrong declared sizes.
    pub fn into_map(self) -> Result<MapData, MapFileError> {
        let mut grid = Grid::from_rows(self.grid)?;
        // An empty row list carries no width of its own.
        if grid.height() == 0 && self.height == 0 {
            grid = Grid::new(self.width, 0, TileKind::Floor);
        }
        if grid.width() != self.width || grid.height() != self.height {
            return Err(MapFileError::DimensionMismatch {
                declared_w: self.width,
                declared_h: self.height,
                actual_w: grid.width(),
                actual_h: grid.height(),
            });
        }
        Ok(MapData::new(grid, self.spawns))
    }

    pub fn to_json_string(&self) -> Result<String, MapFileError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json_str(text: &str) -> Result<Self, MapFileError> {
        Ok(serde_json::from_str(text)?)
    }

    /// Writes the document, appending `.json` when the path has no extension
    /// and creating missing parent directories. Returns the final path.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<PathBuf, MapFileError> {
        let path = with_extension(path.as_ref());
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|source| MapFileError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        let text = self.to_json_string()?;
        fs::write(&path, text).map_err(|source| MapFileError::Io {
            path: path.clone(),
            source,
        })?;
        info!("saved {}x{} map to {}", self.width, self.height, path.display());
        Ok(path)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, MapFileError> {
        let path = with_extension(path.as_ref());
        let text = fs::read_to_string(&path).map_err(|source| MapFileError::Io {
            path: path.clone(),
            source,
        })?;
        let doc = Self::from_json_str(&text)?;
        debug!("loaded {}x{} map from {}", doc.width, doc.height, path.display());
        Ok(doc)
    }
}

fn with_extension(path: &Path) -> PathBuf {
    if path.extension().is_some() {
        path.to_path_buf()
    } else {
        path.with_extension(EXTENSION)
    }
}

/// File names in `dir`, sorted. A missing directory lists as empty.
pub fn list_maps(dir: impl AsRef<Path>) -> Result<Vec<String>, MapFileError> {
    let dir = dir.as_ref();
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(source) => {
            return Err(MapFileError::Io {
                path: dir.to_path_buf(),
                source,
            })
        }
    };
    let mut names = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|source| MapFileError::Io {
            path: dir.to_path_buf(),
            source,
        })?;
        if entry.path().is_file() {
            names.push(entry.file_name().to_string_lossy().into_owned());
        }
    }
    names.sort();
    Ok(names)
}
