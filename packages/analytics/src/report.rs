//! R12/YTD dashboard reports.

use crime_dash_analytics_models::{
    FilterSpec, MetricComparison, ReportComparison, ReportPeriod, SummaryStats, percent_change,
};
use crime_dash_store::GoldTable;

use crate::{aggregate, filter, stats};

/// Number of primary types listed in a report.
pub const TOP_PRIMARY_TYPES: usize = 11;

fn metric(name: &str, current: u64, prior: u64) -> MetricComparison {
    MetricComparison {
        metric: name.to_string(),
        current,
        prior,
        delta: i64::try_from(current).unwrap_or(i64::MAX)
            - i64::try_from(prior).unwrap_or(i64::MAX),
        percent_change: percent_change(current, prior),
    }
}

fn metrics(current: &SummaryStats, prior: &SummaryStats) -> Vec<MetricComparison> {
    let pairs: [(&str, fn(&SummaryStats) -> u64); 10] = [
        ("totalCases", |s| s.total_cases),
        ("totalArrests", |s| s.total_arrests),
        ("totalDomesticCases", |s| s.total_domestic_cases),
        ("totalWeekendCases", |s| s.total_weekend_cases),
        ("totalNighttimeCases", |s| s.total_nighttime_cases),
        ("totalViolentCases", |s| s.total_violent_cases),
        ("totalPropertyCases", |s| s.total_property_cases),
        ("totalDrugCases", |s| s.total_drug_cases),
        ("totalWeaponCases", |s| s.total_weapon_cases),
        ("totalPublicOrderCases", |s| s.total_public_order_cases),
    ];
    pairs
        .iter()
        .map(|(name, get)| metric(name, get(current), get(prior)))
        .collect()
}

/// Compares `period.current` with `period.prior` under the non-date
/// constraints of `filter`. Any date range on `filter` is replaced by the
/// report windows.
#[must_use]
pub fn compare_report(
    table: &GoldTable,
    filter: &FilterSpec,
    period: &ReportPeriod,
) -> ReportComparison {
    let current_rows = filter::filter_incidents(table, &filter.with_date_range(period.current));
    let prior_rows = filter::filter_incidents(table, &filter.with_date_range(period.prior));

    log::debug!(
        "{} report for {}: {} current rows, {} prior rows",
        period.report_type,
        period.report_date,
        current_rows.len(),
        prior_rows.len()
    );

    let current = stats::summary_stats(&current_rows);
    let prior = stats::summary_stats(&prior_rows);

    ReportComparison {
        period: *period,
        case_growth_pct: percent_change(current.total_cases, prior.total_cases),
        arrest_rate_change: current.arrest_rate - prior.arrest_rate,
        domestic_rate_change: current.domestic_rate - prior.domestic_rate,
        violent_rate_change: current.violent_rate - prior.violent_rate,
        property_rate_change: current.property_rate - prior.property_rate,
        metrics: metrics(&current, &prior),
        top_primary_types: aggregate::top_primary_types(&current_rows, TOP_PRIMARY_TYPES),
        current,
        prior,
    }
}
