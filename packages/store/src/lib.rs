#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Storage for the crime dashboard.
//!
//! The gold table is a plain CSV file written once per ingest run and read
//! once at server startup. This crate owns its on-disk format, the data
//! directory layout and the TOML pipeline configuration that points at the
//! raw input and reference files.

pub mod config;
pub mod gold;
pub mod paths;

use std::path::PathBuf;

pub use config::PipelineConfig;
pub use gold::{GoldTable, load_gold_table, read_gold_from, write_gold_table, write_gold_to};

/// Errors that can occur while reading or writing stored data.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// A required file does not exist.
    #[error("File not found: {}", path.display())]
    MissingFile {
        /// Path that was looked up.
        path: PathBuf,
    },

    /// Filesystem error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV encoding or decoding error.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// The configuration file is invalid.
    #[error("Config error: {message}")]
    Config {
        /// Description of what went wrong.
        message: String,
    },
}
