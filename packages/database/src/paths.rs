//! Canonical file paths for the local data directory.
//!
//! All paths are relative to the project root's `data/` directory unless
//! overridden through the environment.

use std::path::{Path, PathBuf};

/// Environment variable overriding the cache file location.
pub const CACHE_PATH_ENV: &str = "PARKING_STATS_CACHE_PATH";

/// Returns the workspace root directory.
///
/// Resolved at compile time from `CARGO_MANIFEST_DIR`. Falls back to the
/// manifest directory itself if it is not nested two levels deep.
#[must_use]
pub fn project_root() -> PathBuf {
    let manifest_dir = Path::new(env!("CARGO_MANIFEST_DIR"));
    manifest_dir
        .ancestors()
        .nth(2)
        .unwrap_or(manifest_dir)
        .to_path_buf()
}

/// Returns the `data/` directory path.
#[must_use]
pub fn data_dir() -> PathBuf {
    project_root().join("data")
}

/// Returns the `data/cache/` directory.
#[must_use]
pub fn cache_dir() -> PathBuf {
    data_dir().join("cache")
}

/// Returns the default path of the cached parking areas.
#[must_use]
pub fn parking_cache_path() -> PathBuf {
    cache_dir().join("parking_areas.json")
}

/// Returns the cache path, honouring [`CACHE_PATH_ENV`] when set to a
/// non-empty value.
#[must_use]
pub fn parking_cache_path_from_env() -> PathBuf {
    std::env::var(CACHE_PATH_ENV)
        .ok()
        .filter(|path| !path.trim().is_empty())
        .map_or_else(parking_cache_path, PathBuf::from)
}

/// Ensures a directory exists, creating it if necessary.
///
/// # Errors
///
/// Returns an I/O error if the directory cannot be created.
pub fn ensure_dir(path: &Path) -> std::io::Result<()> {
    if !path.exists() {
        std::fs::create_dir_all(path)?;
    }
    Ok(())
}
