#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Ingestion progress and result types.

pub mod progress;

use std::collections::BTreeMap;

use crime_dash_geography_models::GeoLayer;
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// Why a raw row was dropped.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum MalformedReason {
    /// The CSV record itself could not be read (bad quoting, wrong field
    /// count, invalid UTF-8).
    Record,
    /// No incident id.
    MissingId,
    /// Incident id is not an integer.
    InvalidId,
    /// Timestamp is missing or matches no accepted format.
    InvalidTimestamp,
    /// Primary type is missing or blank.
    MissingPrimaryType,
}

/// Summary of one ingest run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IngestReport {
    /// Data rows read from the raw CSV (header excluded).
    pub rows_read: u64,
    /// Rows written to the gold table.
    pub rows_written: u64,
    /// Dropped rows per reason.
    pub malformed: BTreeMap<MalformedReason, u64>,
    /// Rows dropped because an earlier row had the same id.
    pub duplicates: u64,
    /// Geo codes set to null, per layer, because they were out of range or
    /// unknown to the loaded reference layer.
    pub nulled_geo_codes: BTreeMap<GeoLayer, u64>,
    /// Rows whose coordinates were set to null.
    pub nulled_coordinates: u64,
}

impl IngestReport {
    pub fn record_malformed(&mut self, reason: MalformedReason) {
        *self.malformed.entry(reason).or_default() += 1;
    }

    pub fn record_nulled_geo_code(&mut self, layer: GeoLayer) {
        *self.nulled_geo_codes.entry(layer).or_default() += 1;
    }

    /// Total dropped rows across all reasons.
    #[must_use]
    pub fn malformed_total(&self) -> u64 {
        self.malformed.values().sum()
    }

    #[must_use]
    pub fn malformed_count(&self, reason: MalformedReason) -> u64 {
        self.malformed.get(&reason).copied().unwrap_or(0)
    }

    #[must_use]
    pub fn nulled_geo_code_total(&self) -> u64 {
        self.nulled_geo_codes.values().sum()
    }
}
