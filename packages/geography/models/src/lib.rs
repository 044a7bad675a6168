#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Geographic reference layer types.
//!
//! Incidents carry four administrative codes (police district, ward,
//! community area and police beat). Each code belongs to a [`GeoLayer`],
//! which knows the code's valid range and the defaults used to read the
//! matching boundary `GeoJSON` file.

use std::ops::RangeInclusive;

use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// An administrative boundary layer.
///
/// Serialized in `snake_case` so it can be used directly as a TOML table key
/// and as a URL path segment.
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
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum GeoLayer {
    /// Police district
    District,
    /// City council ward
    Ward,
    /// Community area
    CommunityArea,
    /// Police beat
    Beat,
}

impl GeoLayer {
    /// Range of codes accepted for this layer before any reference lookup.
    #[must_use]
    pub const fn valid_range(self) -> RangeInclusive<i32> {
        match self {
            Self::District => 1..=99,
            Self::Ward => 1..=50,
            Self::CommunityArea => 1..=100,
            Self::Beat => 1..=9999,
        }
    }

    /// Whether `code` falls within [`Self::valid_range`].
    #[must_use]
    pub fn is_valid_code(self, code: i32) -> bool {
        self.valid_range().contains(&code)
    }

    /// File name of the layer's boundary `GeoJSON` inside the references
    /// directory.
    #[must_use]
    pub const fn default_file_name(self) -> &'static str {
        match self {
            Self::District => "districts.geojson",
            Self::Ward => "wards.geojson",
            Self::CommunityArea => "community_areas.geojson",
            Self::Beat => "beats.geojson",
        }
    }

    /// Feature property holding the layer code in the city portal exports.
    #[must_use]
    pub const fn default_id_property(self) -> &'static str {
        match self {
            Self::District => "dist_num",
            Self::Ward => "ward",
            Self::CommunityArea => "area_numbe",
            Self::Beat => "beat_num",
        }
    }

    /// Feature property holding a display name, when the exports have one.
    #[must_use]
    pub const fn default_name_property(self) -> Option<&'static str> {
        match self {
            Self::District => Some("dist_label"),
            Self::CommunityArea => Some("community"),
            Self::Ward | Self::Beat => None,
        }
    }

    /// Returns all variants of this enum.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[Self::District, Self::Ward, Self::CommunityArea, Self::Beat]
    }
}

/// A reference area without its geometry, as listed by the API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AreaSummary {
    /// Layer the area belongs to.
    pub layer: GeoLayer,
    /// Numeric code (e.g. ward 42).
    pub id: i32,
    /// Human-readable name, if the source file has one.
    pub name: Option<String>,
}
