//! YAML persistence for index mappings
//!
//! The indices are small, human-editable YAML mappings. The contract is
//! deliberately narrow: a missing file loads as an empty mapping, every
//! other failure propagates typed. Saves go through a temp file and a
//! rename so a partially-written index is never visible to a later load.

use crate::error::Result;
use indexmap::IndexMap;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Load a mapping from a YAML file.
///
/// An absent file is an empty mapping, never an error - first runs and
/// hand-deleted indices both start from nothing. Unreadable or malformed
/// files propagate.
pub fn load<T>(path: &Path) -> Result<IndexMap<String, T>>
where
    T: DeserializeOwned,
{
    if !path.exists() {
        debug!("no index file at {:?}, starting empty", path);
        return Ok(IndexMap::new());
    }

    let text = fs::read_to_string(path)?;
    if text.trim().is_empty() {
        return Ok(IndexMap::new());
    }

    Ok(serde_yaml::from_str(&text)?)
}

/// Save a mapping to a YAML file, creating parent directories as needed.
///
/// Writes to a temp sibling and renames it over the target, so a crash
/// mid-write leaves the previous index intact.
pub fn save<T>(path: &Path, mapping: &IndexMap<String, T>) -> Result<()>
where
    T: Serialize,
{
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }

    let yaml = serde_yaml::to_string(mapping)?;

    let mut tmp_name = path.as_os_str().to_os_string();
    tmp_name.push(".tmp");
    let tmp = PathBuf::from(tmp_name);

    fs::write(&tmp, yaml)?;
    fs::rename(&tmp, path)?;

    debug!("wrote {} entries to {:?}", mapping.len(), path);
    Ok(())
}
