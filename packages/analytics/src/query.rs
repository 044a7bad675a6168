use crime_dash_analytics_models::{GroupedCounts, QueryRequest, QueryResult};
use crime_dash_store::GoldTable;

use crate::{AnalyticsError, aggregate, filter, stats};

/// Filters `table` once and computes every summary `request` asks for.
///
/// # Errors
///
/// Returns [`AnalyticsError::InvalidFilter`] if the filter's date range or
/// the rolling window is out of bounds.
pub fn run_query(table: &GoldTable, request: &QueryRequest) -> Result<QueryResult, AnalyticsError> {
    let filter = &request.filter;
    filter::validate(filter)?;

    let rows = filter::filter_incidents(table, filter);
    let window = aggregate::resolve_window(filter, &rows);

    let groups = request
        .group_by
        .iter()
        .map(|&group_by| GroupedCounts {
            group_by,
            counts: aggregate::group_counts(&rows, group_by),
        })
        .collect();

    let daily = request.daily.then(|| {
        window
            .map(|window| aggregate::daily_counts(&rows, &window))
            .unwrap_or_default()
    });

    let rolling = request
        .rolling_window_days
        .map(|days| aggregate::rolling_average(table, filter, days))
        .transpose()?;

    let delta = if request.delta {
        Some(aggregate::period_delta(table, filter)?)
    } else {
        None
    };

    Ok(QueryResult {
        total: rows.len() as u64,
        window,
        groups,
        daily,
        rolling,
        delta,
        stats: request.stats.then(|| stats::summary_stats(&rows)),
    })
}
