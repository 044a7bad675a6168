//! Canonical file paths for the data directory.
//!
//! Everything lives under one data directory: `$CRIME_DASH_DATA_DIR` when
//! set, otherwise `data/` in the project root.

use std::path::{Path, PathBuf};

/// Environment variable overriding the data directory.
pub const DATA_DIR_ENV: &str = "CRIME_DASH_DATA_DIR";

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

/// Returns the data directory.
#[must_use]
pub fn data_dir() -> PathBuf {
    std::env::var_os(DATA_DIR_ENV)
        .filter(|v| !v.is_empty())
        .map_or_else(|| project_root().join("data"), PathBuf::from)
}

/// Returns the `raw/` directory holding portal CSV exports.
#[must_use]
pub fn raw_dir() -> PathBuf {
    data_dir().join("raw")
}

/// Returns the `references/` directory holding boundary `GeoJSON` files.
#[must_use]
pub fn references_dir() -> PathBuf {
    data_dir().join("references")
}

/// Returns the `gold/` directory for normalized output.
#[must_use]
pub fn gold_dir() -> PathBuf {
    data_dir().join("gold")
}

/// Default raw incident CSV.
#[must_use]
pub fn default_raw_csv_path() -> PathBuf {
    raw_dir().join("crimes.csv")
}

/// Default gold table file.
#[must_use]
pub fn default_gold_table_path() -> PathBuf {
    gold_dir().join("incidents.csv")
}

/// Config file picked up when neither `--config` nor `CRIME_DASH_CONFIG`
/// is given.
#[must_use]
pub fn default_config_path() -> PathBuf {
    data_dir().join("crime_dash.toml")
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
