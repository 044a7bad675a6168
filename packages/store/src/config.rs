//! Pipeline configuration.
//!
//! ```toml
//! raw_csv = "raw/crimes.csv"
//! gold_table = "gold/incidents.csv"
//!
//! [references.ward]
//! path = "references/wards.geojson"
//! id_property = "ward"
//! ```
//!
//! Relative paths are resolved against the directory containing the config
//! file. Omitting `[references]` loads every layer from its default file in
//! the references directory; an empty `[references]` table loads none.

use std::{
    collections::BTreeMap,
    path::{Path, PathBuf},
    str::FromStr as _,
};

use crime_dash_geography::ReferenceSource;
use crime_dash_geography_models::GeoLayer;
use serde::{Deserialize, Serialize};

use crate::{StoreError, paths};

/// Environment variable naming the config file.
pub const CONFIG_ENV: &str = "CRIME_DASH_CONFIG";

/// On-disk shape of one `[references.<layer>]` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReferenceFileConfig {
    pub path: PathBuf,
    pub id_property: Option<String>,
    pub name_property: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigFile {
    raw_csv: Option<PathBuf>,
    gold_table: Option<PathBuf>,
    references: Option<BTreeMap<String, ReferenceFileConfig>>,
}

/// Resolved locations of everything the pipeline reads and writes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineConfig {
    pub raw_csv: PathBuf,
    pub gold_table: PathBuf,
    pub references: Vec<ReferenceSource>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        let dir = paths::references_dir();
        Self {
            raw_csv: paths::default_raw_csv_path(),
            gold_table: paths::default_gold_table_path(),
            references: GeoLayer::all()
                .iter()
                .map(|&layer| crime_dash_geography::default_source(layer, &dir))
                .collect(),
        }
    }
}

impl PipelineConfig {
    /// Loads the configuration.
    ///
    /// Lookup order: `explicit`, then `$CRIME_DASH_CONFIG`, then
    /// `<data dir>/crime_dash.toml`, then built-in defaults. An explicitly
    /// named file must exist.
    ///
    /// # Errors
    ///
    /// * [`StoreError::MissingFile`] if an explicitly named file is missing
    /// * [`StoreError::Io`] if the file cannot be read
    /// * [`StoreError::Config`] if the file is not valid
    pub fn load(explicit: Option<&Path>) -> Result<Self, StoreError> {
        let from_env = std::env::var_os(CONFIG_ENV)
            .filter(|v| !v.is_empty())
            .map(PathBuf::from);

        let path = match explicit.map(Path::to_path_buf).or(from_env) {
            Some(path) => {
                if !path.is_file() {
                    return Err(StoreError::MissingFile { path });
                }
                path
            }
            None => {
                let path = paths::default_config_path();
                if !path.is_file() {
                    log::debug!("No config file at {}, using defaults", path.display());
                    return Ok(Self::default());
                }
                path
            }
        };

        log::info!("Loading config from {}", path.display());
        let text = std::fs::read_to_string(&path)?;
        let base = path.parent().unwrap_or_else(|| Path::new("."));
        Self::from_toml_str(&text, base)
    }

    /// Parses a config document, resolving relative paths against `base`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Config`] on TOML errors, unknown keys or unknown
    /// layer names.
    pub fn from_toml_str(text: &str, base: &Path) -> Result<Self, StoreError> {
        let file: ConfigFile = toml::de::from_str(text).map_err(|e| StoreError::Config {
            message: e.to_string(),
        })?;

        let defaults = Self::default();
        let resolve = |p: PathBuf| if p.is_absolute() { p } else { base.join(p) };

        let references = match file.references {
            None => defaults.references,
            Some(tables) => tables
                .into_iter()
                .map(|(key, table)| {
                    let layer = GeoLayer::from_str(&key).map_err(|_| StoreError::Config {
                        message: format!(
                            "Unknown reference layer '{key}'. Expected one of: district, ward, community_area, beat"
                        ),
                    })?;
                    Ok(ReferenceSource {
                        layer,
                        path: resolve(table.path),
                        id_property: table
                            .id_property
                            .unwrap_or_else(|| layer.default_id_property().to_string()),
                        name_property: table
                            .name_property
                            .or_else(|| layer.default_name_property().map(str::to_string)),
                    })
                })
                .collect::<Result<Vec<_>, StoreError>>()?,
        };

        Ok(Self {
            raw_csv: file.raw_csv.map_or(defaults.raw_csv, resolve),
            gold_table: file.gold_table.map_or(defaults.gold_table, resolve),
            references,
        })
    }

    /// Points every configured layer at the same file name inside `dir`.
    #[must_use]
    pub fn with_references_dir(mut self, dir: &Path) -> Self {
        for source in &mut self.references {
            if let Some(name) = source.path.file_name() {
                source.path = dir.join(name);
            }
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_relative_paths_against_base() {
        let config = PipelineConfig::from_toml_str(
            r#"
            raw_csv = "raw/in.csv"
            gold_table = "/abs/gold.csv"

            [references.ward]
            path = "refs/wards.geojson"
            "#,
            Path::new("/etc/crime"),
        )
        .unwrap();

        assert_eq!(config.raw_csv, PathBuf::from("/etc/crime/raw/in.csv"));
        assert_eq!(config.gold_table, PathBuf::from("/abs/gold.csv"));
        assert_eq!(config.references.len(), 1);
        assert_eq!(config.references[0].layer, GeoLayer::Ward);
        assert_eq!(
            config.references[0].path,
            PathBuf::from("/etc/crime/refs/wards.geojson")
        );
        assert_eq!(config.references[0].id_property, "ward");
    }

    #[test]
    fn missing_references_table_loads_all_layers() {
        let config = PipelineConfig::from_toml_str("", Path::new("/tmp")).unwrap();
        assert_eq!(config.references.len(), GeoLayer::all().len());
    }

    #[test]
    fn empty_references_table_loads_none() {
        let config = PipelineConfig::from_toml_str("[references]", Path::new("/tmp")).unwrap();
        assert!(config.references.is_empty());
    }

    #[test]
    fn rejects_unknown_layer() {
        let err = PipelineConfig::from_toml_str(
            "[references.tract]\npath = \"tracts.geojson\"",
            Path::new("/tmp"),
        )
        .unwrap_err();
        assert!(matches!(err, StoreError::Config { .. }));
    }

    #[test]
    fn rejects_unknown_keys() {
        let err = PipelineConfig::from_toml_str("gold = \"x.csv\"", Path::new("/tmp")).unwrap_err();
        assert!(matches!(err, StoreError::Config { .. }));
    }

    #[test]
    fn missing_explicit_config_is_an_error() {
        let err =
            PipelineConfig::load(Some(Path::new("/nonexistent/crime_dash.toml"))).unwrap_err();
        assert!(matches!(err, StoreError::MissingFile { .. }));
    }
}
