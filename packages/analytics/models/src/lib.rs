#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Query input and result types for the aggregation layer.
//!
//! A [`FilterSpec`] selects a subset of the gold table; the remaining types
//! describe the summaries computed over that subset. None of these are
//! stored. They are rebuilt for every request.

use std::collections::BTreeSet;

use chrono::{Datelike as _, Days, NaiveDate, NaiveDateTime};
use crime_dash_crime_models::CrimeCategory;
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// Label used for incidents whose group-by value is missing.
pub const UNKNOWN_GROUP: &str = "UNKNOWN";

/// An inclusive range of calendar days.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DateRange {
    /// First day (inclusive).
    pub start: NaiveDate,
    /// Last day (inclusive).
    pub end: NaiveDate,
}

impl DateRange {
    /// Creates a range, or `None` if `start` is after `end`.
    #[must_use]
    pub fn new(start: NaiveDate, end: NaiveDate) -> Option<Self> {
        (start <= end).then_some(Self { start, end })
    }

    /// Number of calendar days covered (always at least 1).
    #[must_use]
    pub fn days(&self) -> u64 {
        (self.end - self.start).num_days().unsigned_abs() + 1
    }

    #[must_use]
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }

    /// Every day in the range, in order.
    pub fn iter_days(&self) -> impl Iterator<Item = NaiveDate> + use<> {
        let end = self.end;
        self.start.iter_days().take_while(move |d| *d <= end)
    }

    /// The equally long range ending the day before `start`.
    #[must_use]
    pub fn preceding(&self) -> Option<Self> {
        let end = self.start.checked_sub_days(Days::new(1))?;
        let start = end.checked_sub_days(Days::new(self.days() - 1))?;
        Some(Self { start, end })
    }

    /// Extends the range `days` days into the past.
    #[must_use]
    pub fn extend_back(&self, days: u64) -> Self {
        Self {
            start: self
                .start
                .checked_sub_days(Days::new(days))
                .unwrap_or(NaiveDate::MIN),
            end: self.end,
        }
    }
}

impl std::fmt::Display for DateRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} to {}", self.start, self.end)
    }
}

/// Which incidents to include.
///
/// Every empty set and every `None` means "no constraint" on that field.
/// All present constraints must hold (AND); values within one set are
/// alternatives (OR).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FilterSpec {
    /// Upper-cased primary types (e.g. `"THEFT"`).
    pub primary_types: BTreeSet<String>,
    pub categories: BTreeSet<CrimeCategory>,
    /// Inclusive date window on the occurrence date.
    pub date_range: Option<DateRange>,
    pub arrest: Option<bool>,
    pub domestic: Option<bool>,
    pub districts: BTreeSet<i32>,
    pub wards: BTreeSet<i32>,
    pub community_areas: BTreeSet<i32>,
    pub beats: BTreeSet<i32>,
}

impl FilterSpec {
    /// Same constraints with the date window removed.
    #[must_use]
    pub fn without_dates(&self) -> Self {
        Self {
            date_range: None,
            ..self.clone()
        }
    }

    /// Same constraints with the date window replaced.
    #[must_use]
    pub fn with_date_range(&self, range: DateRange) -> Self {
        Self {
            date_range: Some(range),
            ..self.clone()
        }
    }
}

/// Dimension for group-by counts.
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
pub enum GroupBy {
    PrimaryType,
    Category,
    FbiCategory,
    Severity,
    District,
    Ward,
    CommunityArea,
    Beat,
    LocationDescription,
    Arrest,
    Domestic,
    /// Calendar day, `YYYY-MM-DD`
    Day,
    /// Calendar month, `YYYY-MM`
    Month,
    /// Hour of day, `00`-`23`
    Hour,
    /// `MONDAY`..`SUNDAY`
    DayOfWeek,
    PartOfDay,
    Season,
}

impl GroupBy {
    /// Returns all variants of this enum.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[
            Self::PrimaryType,
            Self::Category,
            Self::FbiCategory,
            Self::Severity,
            Self::District,
            Self::Ward,
            Self::CommunityArea,
            Self::Beat,
            Self::LocationDescription,
            Self::Arrest,
            Self::Domestic,
            Self::Day,
            Self::Month,
            Self::Hour,
            Self::DayOfWeek,
            Self::PartOfDay,
            Self::Season,
        ]
    }
}

/// Count of incidents sharing one group-by value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupCount {
    /// Group value, or [`UNKNOWN_GROUP`].
    pub key: String,
    pub count: u64,
}

/// Incidents on one calendar day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyCount {
    pub date: NaiveDate,
    pub count: u64,
}

/// One day of a rolling-average series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RollingAveragePoint {
    pub date: NaiveDate,
    /// Incidents on this day.
    pub count: u64,
    /// Mean daily count over the trailing window ending on this day.
    pub average: f64,
}

/// Current window compared to the equally long window before it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PeriodDelta {
    /// `None` when there was no window to compare (no date range and no
    /// matching incidents).
    pub current: Option<DateRange>,
    pub prior: Option<DateRange>,
    pub current_count: u64,
    pub prior_count: u64,
    /// `current_count - prior_count`.
    pub delta: i64,
    /// Percent change relative to the prior count; `None` when the prior
    /// count is zero.
    pub percent_change: Option<f64>,
}

impl PeriodDelta {
    /// Builds the delta from the two counts.
    #[must_use]
    pub fn from_counts(
        current: Option<DateRange>,
        prior: Option<DateRange>,
        current_count: u64,
        prior_count: u64,
    ) -> Self {
        let delta = i64::try_from(current_count).unwrap_or(i64::MAX)
            - i64::try_from(prior_count).unwrap_or(i64::MAX);
        Self {
            current,
            prior,
            current_count,
            prior_count,
            delta,
            percent_change: percent_change(current_count, prior_count),
        }
    }
}

/// `(current - prior) / prior * 100`, or `None` when `prior` is zero.
#[allow(clippy::cast_precision_loss)]
#[must_use]
pub fn percent_change(current: u64, prior: u64) -> Option<f64> {
    (prior != 0).then(|| (current as f64 - prior as f64) / prior as f64 * 100.0)
}

/// Headline numbers for a subset of incidents.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryStats {
    pub total_cases: u64,
    pub unique_crime_types: u64,
    pub total_arrests: u64,
    pub total_domestic_cases: u64,
    pub total_weekend_cases: u64,
    pub total_nighttime_cases: u64,
    pub total_daytime_cases: u64,
    pub total_violent_cases: u64,
    pub total_property_cases: u64,
    pub total_drug_cases: u64,
    pub total_weapon_cases: u64,
    pub total_public_order_cases: u64,
    /// Mean severity over incidents that have one.
    pub avg_severity: Option<f64>,
    /// Mean distance from downtown over incidents with coordinates.
    pub avg_distance_from_downtown_km: Option<f64>,
    pub unique_beats: u64,
    pub unique_wards: u64,
    pub unique_districts: u64,
    pub unique_community_areas: u64,
    /// Percent of cases with an arrest (0 when there are no cases).
    pub arrest_rate: f64,
    pub domestic_rate: f64,
    pub violent_rate: f64,
    pub property_rate: f64,
}

/// An incident with coordinates, trimmed down for map rendering.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MapPoint {
    pub id: i64,
    pub latitude: f64,
    pub longitude: f64,
    pub occurred_at: NaiveDateTime,
    pub primary_type: String,
    pub category: CrimeCategory,
    pub arrest: bool,
}

/// Dashboard report window.
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
#[strum(serialize_all = "SCREAMING_SNAKE_CASE", ascii_case_insensitive)]
pub enum ReportType {
    /// Rolling twelve months ending on the report date
    R12,
    /// January 1 through the report date
    Ytd,
}

/// A report window and the window it is compared against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportPeriod {
    pub report_type: ReportType,
    pub report_date: NaiveDate,
    pub current: DateRange,
    pub prior: DateRange,
}

impl ReportPeriod {
    /// Computes the windows for `report_type` on `report_date`.
    ///
    /// * `R12`: the 365 days before the report date through the report date;
    ///   prior is the 366-day window ending the day before that.
    /// * `YTD`: January 1 through the report date; prior runs from January 1
    ///   of the previous year through the end of the report month in the
    ///   previous year.
    #[must_use]
    pub fn new(report_type: ReportType, report_date: NaiveDate) -> Option<Self> {
        let (current, prior) = match report_type {
            ReportType::R12 => {
                let start = report_date.checked_sub_days(Days::new(365))?;
                let prior_end = start.checked_sub_days(Days::new(1))?;
                let prior_start = prior_end.checked_sub_days(Days::new(365))?;
                (
                    DateRange::new(start, report_date)?,
                    DateRange::new(prior_start, prior_end)?,
                )
            }
            ReportType::Ytd => {
                let year = report_date.year();
                let start = NaiveDate::from_ymd_opt(year, 1, 1)?;
                let prior_start = NaiveDate::from_ymd_opt(year - 1, 1, 1)?;
                let prior_end = if report_date.month() == 12 {
                    NaiveDate::from_ymd_opt(year - 1, 12, 31)?
                } else {
                    NaiveDate::from_ymd_opt(year - 1, report_date.month() + 1, 1)?
                        .checked_sub_days(Days::new(1))?
                };
                (
                    DateRange::new(start, report_date)?,
                    DateRange::new(prior_start, prior_end)?,
                )
            }
        };

        Some(Self {
            report_type,
            report_date,
            current,
            prior,
        })
    }
}

/// One metric in a current-vs-prior comparison.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricComparison {
    /// Metric name in `camelCase`, matching the [`SummaryStats`] field.
    pub metric: String,
    pub current: u64,
    pub prior: u64,
    pub delta: i64,
    pub percent_change: Option<f64>,
}

/// A report period's stats compared with its prior period.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportComparison {
    pub period: ReportPeriod,
    pub current: SummaryStats,
    pub prior: SummaryStats,
    /// Percent change in total cases; `None` when the prior period is empty.
    pub case_growth_pct: Option<f64>,
    /// Rate changes in percentage points (current rate minus prior rate).
    pub arrest_rate_change: f64,
    pub domestic_rate_change: f64,
    pub violent_rate_change: f64,
    pub property_rate_change: f64,
    /// Per-metric count comparison.
    pub metrics: Vec<MetricComparison>,
    /// Most frequent primary types in the current period.
    pub top_primary_types: Vec<GroupCount>,
}

/// Which summaries [`QueryResult`] should carry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct QueryRequest {
    pub filter: FilterSpec,
    /// Dimensions to count by.
    pub group_by: Vec<GroupBy>,
    /// Include the zero-filled daily series.
    pub daily: bool,
    /// Include a rolling average over this many days.
    pub rolling_window_days: Option<u32>,
    /// Include the prior-period delta.
    pub delta: bool,
    /// Include summary statistics.
    pub stats: bool,
}

/// Counts for one group-by dimension.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupedCounts {
    pub group_by: GroupBy,
    pub counts: Vec<GroupCount>,
}

/// Everything computed for one [`QueryRequest`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryResult {
    /// Number of incidents matching the filter.
    pub total: u64,
    /// Window the series and delta were computed over.
    pub window: Option<DateRange>,
    pub groups: Vec<GroupedCounts>,
    pub daily: Option<Vec<DailyCount>>,
    pub rolling: Option<Vec<RollingAveragePoint>>,
    pub delta: Option<PeriodDelta>,
    pub stats: Option<SummaryStats>,
}
