#![allow(clippy::module_name_repetitions)]
//! Canonical file paths for the reports database and photo directory.
//!
//! Defaults are relative to the project root's `data/` directory and can be
//! overridden with `ECOROAD_DB_PATH` and `ECOROAD_IMAGES_DIR`.

use std::path::{Path, PathBuf};

/// Environment variable overriding [`default_db_path`].
pub const DB_PATH_ENV: &str = "ECOROAD_DB_PATH";

/// Environment variable overriding [`default_images_dir`].
pub const IMAGES_DIR_ENV: &str = "ECOROAD_IMAGES_DIR";

/// Returns the workspace root directory.
///
/// Resolved at compile time from `CARGO_MANIFEST_DIR`; falls back to the
/// current directory if the manifest directory has no grandparent.
#[must_use]
pub fn project_root() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .ancestors()
        .nth(2)
        .map_or_else(|| PathBuf::from("."), Path::to_path_buf)
}

/// Returns the `data/` directory path.
#[must_use]
pub fn data_dir() -> PathBuf {
    project_root().join("data")
}

/// Returns the default `SQLite` database path.
#[must_use]
pub fn default_db_path() -> PathBuf {
    data_dir().join("user_database.db")
}

/// Returns the default photo directory.
#[must_use]
pub fn default_images_dir() -> PathBuf {
    data_dir().join("images")
}

/// Returns the database path, honoring [`DB_PATH_ENV`].
#[must_use]
pub fn db_path_from_env() -> PathBuf {
    env_path(DB_PATH_ENV).unwrap_or_else(default_db_path)
}

/// Returns the photo directory, honoring [`IMAGES_DIR_ENV`].
#[must_use]
pub fn images_dir_from_env() -> PathBuf {
    env_path(IMAGES_DIR_ENV).unwrap_or_else(default_images_dir)
}

fn env_path(name: &str) -> Option<PathBuf> {
    std::env::var(name)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .map(PathBuf::from)
}

/// Ensures a directory exists, creating it if necessary.
///
/// # Errors
///
/// Returns an I/O error if the directory cannot be created.
pub fn ensure_dir(path: &Path) -> std::io::Result<()> {
    if !path.as_os_str().is_empty() && !path.exists() {
        std::fs::create_dir_all(path)?;
    }
    Ok(())
}
