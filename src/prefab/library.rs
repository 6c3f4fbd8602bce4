// src/prefab/library.rs
//! Prefab library loading and validation.
//!
//! ```json
//! { "prefabs": [
//!   { "id": "pillar", "category": "STRUCTURE",
//!     "size": [3, 3], "reserve": [5, 5], "probability": 0.5,
//!     "before": [["MT:FLOOR", "MT:FLOOR", "MT:FLOOR"], ...],
//!     "after": [{ "x": 1, "y": 1, "tile": "WALL_BREAKABLE" }] }
//! ] }
//! ```
//!
//! `reserve` defaults to `size` and `probability` to 1.0. Tokens, categories
//! and patch tiles are closed sets; anything else fails the load.

use super::{Category, MatchToken, Patch, Prefab};
use crate::utils::util::clamp_unit;
use include_dir::{include_dir, Dir};
use log::{debug, warn};
use serde::Deserialize;
use serde_json::Value;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

static ASSETS: Dir<'_> = include_dir!("$CARGO_MANIFEST_DIR/assets");

const BUILTIN_LIBRARY_FILE: &str = "prefabs/prefabs.json";

#[derive(Debug, Error)]
pub enum PrefabError {
    #[error("prefab library {path} could not be read: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("prefab library is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("prefab library must contain a top-level 'prefabs' list")]
    MissingList,
    #[error("prefab '{id}': {reason}")]
    Malformed { id: String, reason: String },
    #[error("prefab '{id}': size must be two positive integers no larger than i32::MAX")]
    InvalidSize { id: String },
    #[error("prefab '{id}': reserve must be two integers no larger than i32::MAX")]
    InvalidReserve { id: String },
    #[error("prefab '{id}': reserve {reserve:?} is smaller than size {size:?}")]
    ReserveTooSmall {
        id: String,
        size: (i64, i64),
        reserve: (i64, i64),
    },
    #[error("prefab '{id}': 'before' has {found} rows, expected {expected}")]
    BeforeHeight {
        id: String,
        expected: usize,
        found: usize,
    },
    #[error("prefab '{id}': 'before' row {row} has {found} tokens, expected {expected}")]
    BeforeWidth {
        id: String,
        row: usize,
        expected: usize,
        found: usize,
    },
}

/// Where a library comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LibrarySource<'a> {
    /// The library compiled into the crate.
    Builtin,
    Path(&'a Path),
    Json(&'a str),
}

impl<'a> LibrarySource<'a> {
    /// Interprets a params-file reference: `"builtin"`, a path, or empty for none.
    pub fn from_reference(reference: &'a str) -> Option<Self> {
        match reference.trim() {
            "" => None,
            crate::generation::params::BUILTIN_LIBRARY => Some(LibrarySource::Builtin),
            _ => Some(LibrarySource::Path(Path::new(reference))),
        }
    }
}

pub fn load_library(source: LibrarySource<'_>) -> Result<Vec<Prefab>, PrefabError> {
    match source {
        LibrarySource::Builtin => {
            let text = ASSETS
                .get_file(BUILTIN_LIBRARY_FILE)
                .and_then(|f| f.contents_utf8())
                .ok_or_else(|| PrefabError::Io {
                    path: PathBuf::from(BUILTIN_LIBRARY_FILE),
                    source: io::Error::new(io::ErrorKind::NotFound, "missing embedded asset"),
                })?;
            parse_library(text)
        }
        LibrarySource::Path(path) => {
            let text = fs::read_to_string(path).map_err(|source| PrefabError::Io {
                path: path.to_path_buf(),
                source,
            })?;
            parse_library(&text)
        }
        LibrarySource::Json(text) => parse_library(text),
    }
}

fn default_probability() -> f64 {
    1.0
}

/// Shape of one entry; `id` is read separately so errors can name it.
#[derive(Deserialize)]
struct RawPrefab {
    category: Category,
    size: Vec<i64>,
    reserve: Option<Vec<i64>>,
    #[serde(default = "default_probability")]
    probability: f64,
    before: Vec<Vec<MatchToken>>,
    #[serde(default)]
    after: Vec<Patch>,
}

pub fn parse_library(text: &str) -> Result<Vec<Prefab>, PrefabError> {
    let root: Value = serde_json::from_str(text)?;
    let items = root
        .get("prefabs")
        .and_then(Value::as_array)
        .ok_or(PrefabError::MissingList)?;

    let mut prefabs = Vec::with_capacity(items.len());
    for (index, item) in items.iter().enumerate() {
        if !item.is_object() {
            warn!("skipping prefab entry #{}: not an object", index);
            continue;
        }
        prefabs.push(parse_prefab(index, item)?);
    }
    debug!("loaded {} prefabs", prefabs.len());
    Ok(prefabs)
}

fn prefab_id(item: &Value) -> Option<String> {
    match item.get("id")? {
        Value::String(s) => Some(s.clone()),
        Value::Null => None,
        other => Some(other.to_string()),
    }
}

fn pair(values: &[i64]) -> Option<(i64, i64)> {
    match values {
        [a, b] => Some((*a, *b)),
        _ => None,
    }
}

fn parse_prefab(index: usize, item: &Value) -> Result<Prefab, PrefabError> {
    let id = prefab_id(item).ok_or_else(|| PrefabError::Malformed {
        id: format!("#{index}"),
        reason: "missing 'id'".to_string(),
    })?;
    let raw = RawPrefab::deserialize(item).map_err(|e| PrefabError::Malformed {
        id: id.clone(),
        reason: e.to_string(),
    })?;

    let in_range = |v: i64| v <= i64::from(i32::MAX);
    let (w, h) = pair(&raw.size)
        .filter(|(w, h)| *w > 0 && *h > 0 && in_range(*w) && in_range(*h))
        .ok_or_else(|| PrefabError::InvalidSize { id: id.clone() })?;
    let (rw, rh) = match raw.reserve.as_deref() {
        None => (w, h),
        Some(values) => pair(values)
            .filter(|(rw, rh)| in_range(*rw) && in_range(*rh))
            .ok_or_else(|| PrefabError::InvalidReserve { id: id.clone() })?,
    };
    if rw < w || rh < h {
        return Err(PrefabError::ReserveTooSmall {
            id,
            size: (w, h),
            reserve: (rw, rh),
        });
    }

    let (w, h) = (w as usize, h as usize);
    if raw.before.len() != h {
        return Err(PrefabError::BeforeHeight {
            id,
            expected: h,
            found: raw.before.len(),
        });
    }
    if let Some((row, cols)) = raw.before.iter().enumerate().find(|(_, r)| r.len() != w) {
        return Err(PrefabError::BeforeWidth {
            id,
            row,
            expected: w,
            found: cols.len(),
        });
    }

    Ok(Prefab {
        id,
        category: raw.category,
        size: (w, h),
        reserve: (rw as usize, rh as usize),
        probability: clamp_unit(raw.probability),
        before: raw.before,
        after: raw.after,
    })
}
