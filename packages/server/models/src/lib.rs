#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! API request and response types for the crime dashboard server.
//!
//! These types are serialized to JSON for the REST API. They are separate
//! from the gold table and query types to allow independent evolution of
//! the API contract.

use crime_dash_analytics_models::{
    DailyCount, DateRange, GroupBy, GroupCount, MapPoint, RollingAveragePoint,
};
use crime_dash_crime_models::{CrimeCategory, CrimeSeverity, FbiCategory};
use crime_dash_geography_models::{AreaSummary, GeoLayer};
use crime_dash_incident_models::Incident;
use serde::{Deserialize, Serialize};

/// Page size used when `limit` is not given.
pub const DEFAULT_PAGE_LIMIT: usize = 100;

/// Largest accepted `limit`.
pub const MAX_PAGE_LIMIT: usize = 10_000;

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiHealth {
    /// Whether the server is healthy.
    pub healthy: bool,
    /// Server version.
    pub version: String,
    /// Number of rows in the loaded gold table.
    pub incidents: u64,
}

/// Filter query parameters shared by every data endpoint.
///
/// Values are kept as raw text so parse failures can be reported with a
/// useful message instead of a generic extractor error.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterParams {
    /// Comma-separated primary types (`THEFT,BATTERY`).
    pub primary_types: Option<String>,
    /// Comma-separated categories (`VIOLENT,PROPERTY`).
    pub categories: Option<String>,
    /// Start date, `YYYY-MM-DD` (inclusive).
    pub from: Option<String>,
    /// End date, `YYYY-MM-DD` (inclusive).
    pub to: Option<String>,
    pub arrest: Option<String>,
    pub domestic: Option<String>,
    /// Comma-separated district numbers.
    pub districts: Option<String>,
    pub wards: Option<String>,
    pub community_areas: Option<String>,
    pub beats: Option<String>,
}

/// Pagination parameters for the incidents endpoint.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageParams {
    /// Maximum number of results.
    pub limit: Option<usize>,
    /// Offset for pagination.
    pub offset: Option<usize>,
}

/// Query parameters for `GET /api/counts`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CountsParams {
    /// Dimension name, e.g. `primary_type` or `ward`.
    pub group_by: Option<String>,
    /// Keep only the largest `limit` groups.
    pub limit: Option<usize>,
}

/// Query parameters for `GET /api/rolling`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RollingParams {
    /// Trailing window length in calendar days.
    pub window_days: Option<String>,
}

/// Query parameters for `GET /api/report`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportParams {
    /// `R12` or `YTD`.
    #[serde(rename = "type")]
    pub report_type: Option<String>,
    /// `YYYY-MM-DD`. Defaults to the last day in the gold table.
    pub report_date: Option<String>,
}

/// A gold row with its derived classification fields.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiIncident {
    #[serde(flatten)]
    pub incident: Incident,
    pub fbi_category: Option<FbiCategory>,
    pub severity: Option<CrimeSeverity>,
    /// Severity numeric value (1-5).
    pub severity_value: Option<u8>,
}

impl From<&Incident> for ApiIncident {
    fn from(incident: &Incident) -> Self {
        let severity = incident.severity();
        Self {
            incident: incident.clone(),
            fbi_category: incident.fbi_category(),
            severity,
            severity_value: severity.map(CrimeSeverity::value),
        }
    }
}

/// One page of a larger result.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiPage<T> {
    /// Size of the full result.
    pub total: u64,
    pub limit: usize,
    pub offset: usize,
    pub items: Vec<T>,
}

/// An FBI offense group in the category listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiFbiCategory {
    pub name: FbiCategory,
    pub severity: Option<u8>,
    pub violent: bool,
    pub property: bool,
}

/// The crime taxonomy returned by `GET /api/categories`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiCategories {
    pub categories: Vec<CrimeCategory>,
    pub fbi_categories: Vec<ApiFbiCategory>,
    /// Every accepted `groupBy` value.
    pub dimensions: Vec<GroupBy>,
}

/// Response for `GET /api/counts`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiCounts {
    pub group_by: GroupBy,
    /// Size of the filtered subset (the sum of all groups).
    pub total: u64,
    pub counts: Vec<GroupCount>,
}

/// Response for `GET /api/daily`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiDaily {
    pub window: Option<DateRange>,
    pub days: Vec<DailyCount>,
}

/// Response for `GET /api/rolling`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiRolling {
    pub window_days: u32,
    pub points: Vec<RollingAveragePoint>,
}

/// Response for `GET /api/map`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiMap {
    /// Size of the filtered subset, located or not.
    pub total: u64,
    pub points: Vec<MapPoint>,
}

/// A loaded reference layer in `GET /api/references`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiReferenceLayer {
    pub layer: GeoLayer,
    /// `[min_x, min_y, max_x, max_y]` over all boundaries.
    pub bounds: Option<[f64; 4]>,
    pub areas: Vec<AreaSummary>,
}
