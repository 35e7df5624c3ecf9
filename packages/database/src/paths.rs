#![allow(clippy::module_name_repetitions)]
//! Canonical file paths for the `DuckDB` data directory.
//!
//! All paths live under the project root's `data/` directory unless
//! overridden with the `WFPS_DATA_DIR` environment variable.

use std::path::{Path, PathBuf};

/// Returns the workspace root directory.
///
/// Resolved at compile time from `CARGO_MANIFEST_DIR`.
///
/// # Panics
///
/// Panics if the project root cannot be resolved.
#[must_use]
pub fn project_root() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .ancestors()
        .nth(2)
        .expect("Failed to find project root from CARGO_MANIFEST_DIR")
        .to_path_buf()
}

/// Returns the `data/` directory path, honouring `WFPS_DATA_DIR`.
#[must_use]
pub fn data_dir() -> PathBuf {
    std::env::var("WFPS_DATA_DIR")
        .map_or_else(|_| project_root().join("data"), PathBuf::from)
}

/// Returns the `data/shared/` directory for shared databases.
#[must_use]
pub fn shared_dir() -> PathBuf {
    data_dir().join("shared")
}

/// Returns the path for the neighbourhood location cache `DuckDB` file.
#[must_use]
pub fn location_cache_db_path() -> PathBuf {
    shared_dir().join("location_cache.duckdb")
}

/// Returns the `data/generated/` directory for `GeoJSON` output artifacts.
#[must_use]
pub fn generated_dir() -> PathBuf {
    data_dir().join("generated")
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
