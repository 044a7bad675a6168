#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! The normalized incident record (one row of the gold table) and the raw
//! CSV row it is built from.
//!
//! Only the coerced source columns are stored. Everything that can be
//! computed from them (severity, part of day, season, distance from
//! downtown) is exposed as a method on [`Incident`] instead of a column.

use chrono::{Datelike, NaiveDate, NaiveDateTime, Timelike, Weekday};
use crime_dash_crime_models::{CrimeCategory, CrimeSeverity, FbiCategory};
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// Latitude of the downtown reference point (State & Madison).
pub const DOWNTOWN_LATITUDE: f64 = 41.8781;
/// Longitude of the downtown reference point (State & Madison).
pub const DOWNTOWN_LONGITUDE: f64 = -87.6298;

const KM_PER_DEGREE_LATITUDE: f64 = 111.0;
const KM_PER_DEGREE_LONGITUDE: f64 = 85.0;

/// Coarse time-of-day bucket.
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
pub enum PartOfDay {
    /// 00:00-05:59
    Night,
    /// 06:00-11:59
    Morning,
    /// 12:00-17:59
    Afternoon,
    /// 18:00-23:59
    Evening,
}

impl PartOfDay {
    /// Buckets an hour of the day (0-23).
    #[must_use]
    pub const fn from_hour(hour: u32) -> Self {
        match hour {
            0..6 => Self::Night,
            6..12 => Self::Morning,
            12..18 => Self::Afternoon,
            _ => Self::Evening,
        }
    }

    /// Returns all variants of this enum.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[Self::Night, Self::Morning, Self::Afternoon, Self::Evening]
    }
}

/// Meteorological season.
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
pub enum Season {
    /// December-February
    Winter,
    /// March-May
    Spring,
    /// June-August
    Summer,
    /// September-November
    Fall,
}

impl Season {
    /// Maps a calendar month (1-12) to its season.
    #[must_use]
    pub const fn from_month(month: u32) -> Self {
        match month {
            3..=5 => Self::Spring,
            6..=8 => Self::Summer,
            9..=11 => Self::Fall,
            _ => Self::Winter,
        }
    }

    /// Returns all variants of this enum.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[Self::Winter, Self::Spring, Self::Summer, Self::Fall]
    }
}

/// A single normalized crime incident.
///
/// Rows in the gold table are unique by [`Incident::id`] and sorted by
/// `(id, occurred_at)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Incident {
    /// Source incident id.
    pub id: i64,
    /// Police case number with punctuation stripped.
    pub case_number: Option<String>,
    /// When the incident occurred (local time, no zone).
    pub occurred_at: NaiveDateTime,
    /// Upper-cased primary offense type (e.g. `"THEFT"`).
    pub primary_type: String,
    /// Secondary offense description.
    pub description: Option<String>,
    /// Type of location (e.g. `"STREET"`, `"RESIDENCE"`).
    pub location_description: Option<String>,
    /// FBI UCR offense code (e.g. `"04A"`).
    pub fbi_code: Option<String>,
    /// Whether an arrest was made.
    pub arrest: bool,
    /// Whether the incident was domestic.
    pub domestic: bool,
    /// Police district number.
    pub district: Option<i32>,
    /// City council ward.
    pub ward: Option<i32>,
    /// Community area number.
    pub community_area: Option<i32>,
    /// Police beat number.
    pub beat: Option<i32>,
    /// Latitude (WGS84).
    pub latitude: Option<f64>,
    /// Longitude (WGS84).
    pub longitude: Option<f64>,
    /// Dashboard category derived from the primary type and FBI code.
    pub category: CrimeCategory,
}

impl Incident {
    /// Calendar date the incident occurred on.
    #[must_use]
    pub fn date(&self) -> NaiveDate {
        self.occurred_at.date()
    }

    /// Hour of day (0-23).
    #[must_use]
    pub fn hour(&self) -> u32 {
        self.occurred_at.hour()
    }

    #[must_use]
    pub fn weekday(&self) -> Weekday {
        self.occurred_at.weekday()
    }

    /// FBI offense group for [`Self::fbi_code`], if the code is known.
    #[must_use]
    pub fn fbi_category(&self) -> Option<FbiCategory> {
        self.fbi_code.as_deref().and_then(FbiCategory::from_code)
    }

    /// Severity of the offense. `None` when the FBI code is missing or has
    /// no assigned severity.
    #[must_use]
    pub fn severity(&self) -> Option<CrimeSeverity> {
        self.fbi_category().and_then(FbiCategory::severity)
    }

    #[must_use]
    pub fn part_of_day(&self) -> PartOfDay {
        PartOfDay::from_hour(self.hour())
    }

    #[must_use]
    pub fn season(&self) -> Season {
        Season::from_month(self.occurred_at.month())
    }

    /// Saturday or Sunday.
    #[must_use]
    pub fn is_weekend(&self) -> bool {
        matches!(self.weekday(), Weekday::Sat | Weekday::Sun)
    }

    /// Between 06:00 and 18:59 inclusive.
    #[must_use]
    pub fn is_daytime(&self) -> bool {
        (6..=18).contains(&self.hour())
    }

    /// Both coordinates are present.
    #[must_use]
    pub const fn has_location(&self) -> bool {
        self.latitude.is_some() && self.longitude.is_some()
    }

    /// Returns `(latitude, longitude)` when both are present.
    #[must_use]
    pub const fn coordinates(&self) -> Option<(f64, f64)> {
        match (self.latitude, self.longitude) {
            (Some(lat), Some(lng)) => Some((lat, lng)),
            _ => None,
        }
    }

    /// Approximate planar distance to downtown in kilometres.
    #[must_use]
    pub fn distance_from_downtown_km(&self) -> Option<f64> {
        let (lat, lng) = self.coordinates()?;
        let dy = KM_PER_DEGREE_LATITUDE * (lat - DOWNTOWN_LATITUDE);
        let dx = KM_PER_DEGREE_LONGITUDE * (lng - DOWNTOWN_LONGITUDE);
        Some(dy.hypot(dx))
    }
}

/// One record of the raw portal CSV after header normalization.
///
/// Every column is optional text; coercion happens in the ingest pipeline
/// so that a bad value only drops or nulls the affected row or field.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RawIncidentRow {
    pub id: Option<String>,
    pub case_number: Option<String>,
    pub date: Option<String>,
    pub primary_type: Option<String>,
    pub description: Option<String>,
    pub location_description: Option<String>,
    pub arrest: Option<String>,
    pub domestic: Option<String>,
    pub beat: Option<String>,
    pub district: Option<String>,
    pub ward: Option<String>,
    pub community_area: Option<String>,
    pub fbi_code: Option<String>,
    pub latitude: Option<String>,
    pub longitude: Option<String>,
}
