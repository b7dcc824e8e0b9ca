use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::problem::CarpInstance;

pub mod carp_reader;
pub mod solution_writer;

pub fn load_instance(path: impl Into<String> + Clone) -> Result<CarpInstance> {
    carp_reader::load_instance(path)
}

/// All `.dat` instance files of a directory, sorted by path so batch runs
/// process them in a stable order.
pub fn discover_instances(dir: impl AsRef<Path>) -> Result<Vec<PathBuf>> {
    let dir = dir.as_ref();
    let entries = std::fs::read_dir(dir)
        .with_context(|| format!("cannot list instance directory {}", dir.display()))?;

    let mut paths: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| path.extension().map_or(false, |ext| ext == "dat"))
        .collect();
    paths.sort();
    Ok(paths)
}
