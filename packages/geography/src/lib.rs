#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Geographic reference layers.
//!
//! Loads the static boundary files (police districts, wards, community
//! areas, beats) from `GeoJSON` once at startup. The ingest pipeline uses
//! them to check that an incident's geo codes exist; the server hands them
//! to the UI as map overlays. Nothing here mutates after load.

pub mod reference;

use std::path::PathBuf;

use thiserror::Error;

pub use reference::{
    ReferenceArea, ReferenceLayer, ReferenceSet, ReferenceSource, default_source,
};

/// Errors that can occur while loading reference layers.
#[derive(Debug, Error)]
pub enum GeoError {
    /// A configured reference file does not exist.
    #[error("Reference file not found: {}", path.display())]
    MissingFile {
        /// Path that was looked up.
        path: PathBuf,
    },

    /// Reading the file failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The file is not a usable `GeoJSON` feature collection.
    #[error("GeoJSON parse error: {message}")]
    Parse {
        /// Description of what went wrong.
        message: String,
    },
}
