#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Query engine over the in-memory gold table.
//!
//! Every function here is a pure computation over a borrowed
//! [`GoldTable`](crime_dash_store::GoldTable) and a
//! [`FilterSpec`](crime_dash_analytics_models::FilterSpec). An empty result
//! is a normal answer, never an error.

pub mod aggregate;
pub mod filter;
pub mod params;
pub mod query;
pub mod report;
pub mod stats;

use thiserror::Error;

pub use aggregate::{
    daily_counts, daily_series, group_counts, map_points, period_delta, resolve_window,
    rolling_average, top_primary_types,
};
pub use filter::{filter_incidents, matches};
pub use query::run_query;
pub use report::compare_report;
pub use stats::summary_stats;

/// Errors that can occur while answering a query.
#[derive(Debug, Error)]
pub enum AnalyticsError {
    /// The caller asked for something that cannot be computed.
    #[error("Invalid filter: {message}")]
    InvalidFilter {
        /// Description of what went wrong.
        message: String,
    },
}

impl AnalyticsError {
    pub(crate) fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidFilter {
            message: message.into(),
        }
    }
}
