//! Group-by counts, calendar-day series and period comparisons.
//!
//! Series are bucketed by calendar day and zero-filled, so every day of a
//! window is present even when nothing happened on it.

use std::collections::{BTreeMap, HashMap};

use chrono::{NaiveDate, Weekday};
use crime_dash_analytics_models::{
    DailyCount, DateRange, FilterSpec, GroupBy, GroupCount, MapPoint, PeriodDelta,
    RollingAveragePoint, UNKNOWN_GROUP,
};
use crime_dash_incident_models::Incident;
use crime_dash_store::GoldTable;

use crate::{AnalyticsError, filter, params};

const fn weekday_name(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "MONDAY",
        Weekday::Tue => "TUESDAY",
        Weekday::Wed => "WEDNESDAY",
        Weekday::Thu => "THURSDAY",
        Weekday::Fri => "FRIDAY",
        Weekday::Sat => "SATURDAY",
        Weekday::Sun => "SUNDAY",
    }
}

/// The value of `dimension` for `incident`, or `None` when it is missing.
#[must_use]
pub fn group_key(incident: &Incident, dimension: GroupBy) -> Option<String> {
    match dimension {
        GroupBy::PrimaryType => Some(incident.primary_type.clone()),
        GroupBy::Category => Some(incident.category.to_string()),
        GroupBy::FbiCategory => incident.fbi_category().map(|c| c.to_string()),
        GroupBy::Severity => incident.severity().map(|s| s.to_string()),
        GroupBy::District => incident.district.map(|v| v.to_string()),
        GroupBy::Ward => incident.ward.map(|v| v.to_string()),
        GroupBy::CommunityArea => incident.community_area.map(|v| v.to_string()),
        GroupBy::Beat => incident.beat.map(|v| v.to_string()),
        GroupBy::LocationDescription => incident.location_description.clone(),
        GroupBy::Arrest => Some(incident.arrest.to_string()),
        GroupBy::Domestic => Some(incident.domestic.to_string()),
        GroupBy::Day => Some(incident.date().format("%Y-%m-%d").to_string()),
        GroupBy::Month => Some(incident.date().format("%Y-%m").to_string()),
        GroupBy::Hour => Some(format!("{:02}", incident.hour())),
        GroupBy::DayOfWeek => Some(weekday_name(incident.weekday()).to_string()),
        GroupBy::PartOfDay => Some(incident.part_of_day().to_string()),
        GroupBy::Season => Some(incident.season().to_string()),
    }
}

/// Counts `rows` per value of `dimension`, most frequent first (ties by key).
///
/// Missing values are counted under [`UNKNOWN_GROUP`], so the counts always
/// sum to `rows.len()`.
#[must_use]
pub fn group_counts(rows: &[&Incident], dimension: GroupBy) -> Vec<GroupCount> {
    let mut counts: HashMap<String, u64> = HashMap::new();
    for incident in rows {
        let key = group_key(incident, dimension).unwrap_or_else(|| UNKNOWN_GROUP.to_string());
        *counts.entry(key).or_default() += 1;
    }

    let mut counts: Vec<GroupCount> = counts
        .into_iter()
        .map(|(key, count)| GroupCount { key, count })
        .collect();
    counts.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.key.cmp(&b.key)));
    counts
}

/// The `n` most frequent primary types in `rows`.
#[must_use]
pub fn top_primary_types(rows: &[&Incident], n: usize) -> Vec<GroupCount> {
    let mut counts = group_counts(rows, GroupBy::PrimaryType);
    counts.truncate(n);
    counts
}

/// The window series and deltas are computed over: the filter's date range,
/// or else the span of dates in `rows`. `None` when neither exists.
#[must_use]
pub fn resolve_window(filter: &FilterSpec, rows: &[&Incident]) -> Option<DateRange> {
    if let Some(range) = filter.date_range {
        return Some(range);
    }
    let min = rows.iter().map(|i| i.date()).min()?;
    let max = rows.iter().map(|i| i.date()).max()?;
    DateRange::new(min, max)
}

/// One count per calendar day of `window`, zero-filled. Rows outside the
/// window are ignored.
#[must_use]
pub fn daily_counts(rows: &[&Incident], window: &DateRange) -> Vec<DailyCount> {
    let mut by_day: BTreeMap<NaiveDate, u64> = BTreeMap::new();
    for incident in rows {
        let date = incident.date();
        if window.contains(date) {
            *by_day.entry(date).or_default() += 1;
        }
    }

    window
        .iter_days()
        .map(|date| DailyCount {
            date,
            count: by_day.get(&date).copied().unwrap_or(0),
        })
        .collect()
}

/// The zero-filled daily series for `filter`.
///
/// # Errors
///
/// Returns [`AnalyticsError::InvalidFilter`] if the filter's date range is
/// inverted or too long.
pub fn daily_series(
    table: &GoldTable,
    filter: &FilterSpec,
) -> Result<Vec<DailyCount>, AnalyticsError> {
    filter::validate(filter)?;
    let rows = filter::filter_incidents(table, filter);
    Ok(resolve_window(filter, &rows)
        .map(|window| daily_counts(&rows, &window))
        .unwrap_or_default())
}

/// Trailing `window_days`-day mean of the daily count, one point per day of
/// the query window.
///
/// The first points of the series look back before the window start; those
/// days are read from `table` under the same non-date constraints. The
/// divisor is always `window_days`.
///
/// # Errors
///
/// Returns [`AnalyticsError::InvalidFilter`] if `window_days` is zero or
/// above [`params::MAX_WINDOW_DAYS`], or the filter's date range is invalid.
#[allow(clippy::cast_precision_loss)]
pub fn rolling_average(
    table: &GoldTable,
    filter: &FilterSpec,
    window_days: u32,
) -> Result<Vec<RollingAveragePoint>, AnalyticsError> {
    let window_days = params::check_window_days(window_days)?;
    filter::validate(filter)?;

    let rows = filter::filter_incidents(table, filter);
    let Some(window) = resolve_window(filter, &rows) else {
        return Ok(vec![]);
    };

    let lookback = window.extend_back(u64::from(window_days - 1));
    let lookback_rows = filter::filter_incidents(table, &filter.with_date_range(lookback));
    let daily = daily_counts(&lookback_rows, &lookback);

    log::debug!(
        "rolling_average: window={window} lookback={lookback} window_days={window_days}"
    );

    let size = window_days as usize;
    let divisor = f64::from(window_days);
    let mut sum = 0u64;
    let mut points = Vec::with_capacity(usize::try_from(window.days()).unwrap_or(0));

    for (i, day) in daily.iter().enumerate() {
        sum += day.count;
        if i >= size {
            sum -= daily[i - size].count;
        }
        if day.date >= window.start {
            points.push(RollingAveragePoint {
                date: day.date,
                count: day.count,
                average: sum as f64 / divisor,
            });
        }
    }

    Ok(points)
}

/// Count in the query window against the equally long window right before
/// it. With no window at all (no date range and no matching rows) both
/// counts are zero.
///
/// # Errors
///
/// Returns [`AnalyticsError::InvalidFilter`] if the filter's date range is
/// inverted or too long.
pub fn period_delta(table: &GoldTable, filter: &FilterSpec) -> Result<PeriodDelta, AnalyticsError> {
    filter::validate(filter)?;

    let rows = filter::filter_incidents(table, filter);
    let Some(current) = resolve_window(filter, &rows) else {
        return Ok(PeriodDelta::from_counts(None, None, 0, 0));
    };

    let prior = current.preceding();
    let prior_count = prior.map_or(0, |range| {
        filter::filter_incidents(table, &filter.with_date_range(range)).len()
    });

    Ok(PeriodDelta::from_counts(
        Some(current),
        prior,
        rows.len() as u64,
        prior_count as u64,
    ))
}

/// Incidents with coordinates, for map rendering. Rows without a location
/// are left out here but still count everywhere else.
#[must_use]
pub fn map_points(rows: &[&Incident]) -> Vec<MapPoint> {
    rows.iter()
        .filter_map(|incident| {
            let (latitude, longitude) = incident.coordinates()?;
            Some(MapPoint {
                id: incident.id,
                latitude,
                longitude,
                occurred_at: incident.occurred_at,
                primary_type: incident.primary_type.clone(),
                category: incident.category,
                arrest: incident.arrest,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::incident;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn range(start: NaiveDate, end: NaiveDate) -> FilterSpec {
        FilterSpec {
            date_range: DateRange::new(start, end),
            ..FilterSpec::default()
        }
    }

    fn january_table() -> GoldTable {
        let mut rows = vec![
            incident(1, "2023-01-02 09:00", "THEFT"),
            incident(2, "2023-01-02 23:30", "THEFT"),
            incident(3, "2023-01-10 12:00", "THEFT"),
            incident(4, "2023-01-20 18:45", "THEFT"),
            incident(5, "2023-01-31 07:15", "THEFT"),
            incident(6, "2023-01-15 14:00", "BATTERY"),
            incident(7, "2023-02-01 00:10", "THEFT"),
            incident(8, "2022-12-31 22:00", "THEFT"),
        ];
        rows[0].ward = Some(42);
        rows[5].ward = Some(3);
        GoldTable::new(rows)
    }

    #[test]
    fn january_theft_window() {
        let table = january_table();
        let filter = FilterSpec {
            primary_types: ["THEFT".to_string()].into(),
            ..range(date(2023, 1, 1), date(2023, 1, 31))
        };

        let rows = filter::filter_incidents(&table, &filter);
        assert_eq!(
            rows.iter().map(|i| i.id).collect::<Vec<_>>(),
            vec![1, 2, 3, 4, 5]
        );

        let by_day = group_counts(&rows, GroupBy::Day);
        assert_eq!(by_day.iter().map(|g| g.count).sum::<u64>(), 5);
        assert_eq!(
            by_day[0],
            GroupCount {
                key: "2023-01-02".to_string(),
                count: 2
            }
        );

        let daily = daily_series(&table, &filter).unwrap();
        assert_eq!(daily.len(), 31);
        assert_eq!(daily.iter().map(|d| d.count).sum::<u64>(), 5);
    }

    #[test]
    fn group_counts_sum_to_subset_size() {
        let table = january_table();
        let rows = filter::filter_incidents(&table, &FilterSpec::default());
        for &dimension in GroupBy::all() {
            let total: u64 = group_counts(&rows, dimension).iter().map(|g| g.count).sum();
            assert_eq!(total, rows.len() as u64, "{dimension}");
        }
    }

    #[test]
    fn missing_values_form_unknown_group() {
        let table = january_table();
        let rows = filter::filter_incidents(&table, &FilterSpec::default());
        let wards = group_counts(&rows, GroupBy::Ward);
        assert_eq!(wards[0].key, UNKNOWN_GROUP);
        assert_eq!(wards[0].count, 6);
        assert_eq!(wards[1].key, "3");
        assert_eq!(wards[2].key, "42");
    }

    #[test]
    fn time_bucket_keys() {
        let row = incident(1, "2023-01-02 09:00", "THEFT");
        assert_eq!(group_key(&row, GroupBy::Hour).as_deref(), Some("09"));
        assert_eq!(group_key(&row, GroupBy::Month).as_deref(), Some("2023-01"));
        assert_eq!(group_key(&row, GroupBy::DayOfWeek).as_deref(), Some("MONDAY"));
        assert_eq!(group_key(&row, GroupBy::Season).as_deref(), Some("WINTER"));
        assert_eq!(group_key(&row, GroupBy::Category).as_deref(), Some("PROPERTY"));
        assert_eq!(group_key(&row, GroupBy::Ward), None);
    }

    #[test]
    fn rolling_series_covers_every_window_day() {
        let table = january_table();
        let filter = range(date(2023, 1, 1), date(2023, 1, 10));

        let series = rolling_average(&table, &filter, 3).unwrap();
        assert_eq!(series.len(), 10);
        assert_eq!(series[0].date, date(2023, 1, 1));

        // Dec 30, Dec 31, Jan 1: the Dec 31 theft comes from the lookback.
        assert!((series[0].average - 1.0 / 3.0).abs() < 1e-9);
        // Dec 31, Jan 1, Jan 2.
        assert!((series[1].average - 1.0).abs() < 1e-9);
        assert_eq!(series[1].count, 2);
        // Jan 4..=Jan 6 is empty.
        assert!(series[5].average.abs() < 1e-9);
        assert_eq!(series[9].count, 1);
    }

    #[test]
    fn rolling_rejects_zero_window_and_handles_empty() {
        let table = january_table();
        assert!(matches!(
            rolling_average(&table, &FilterSpec::default(), 0),
            Err(AnalyticsError::InvalidFilter { .. })
        ));

        let nothing = FilterSpec {
            primary_types: ["ARSON".to_string()].into(),
            ..FilterSpec::default()
        };
        assert!(rolling_average(&table, &nothing, 7).unwrap().is_empty());
        assert!(daily_series(&table, &nothing).unwrap().is_empty());
    }

    #[test]
    fn huge_windows_are_rejected_up_front() {
        let table = GoldTable::new(vec![incident(1, "2023-01-02 09:00", "THEFT")]);
        let one_day = range(date(2023, 1, 2), date(2023, 1, 2));

        assert!(matches!(
            rolling_average(&table, &one_day, 1_000_000_000),
            Err(AnalyticsError::InvalidFilter { .. })
        ));
        assert_eq!(
            rolling_average(&table, &one_day, params::MAX_WINDOW_DAYS)
                .unwrap()
                .len(),
            1
        );

        let everything = range(date(1, 1, 1), date(9999, 12, 31));
        assert!(daily_series(&table, &everything).is_err());
        assert!(rolling_average(&table, &everything, 7).is_err());
        assert!(period_delta(&table, &everything).is_err());
    }

    #[test]
    fn delta_against_preceding_window() {
        let table = january_table();
        let filter = FilterSpec {
            primary_types: ["THEFT".to_string()].into(),
            ..range(date(2023, 1, 16), date(2023, 2, 1))
        };
        let delta = period_delta(&table, &filter).unwrap();
        assert_eq!(delta.prior.unwrap().start, date(2022, 12, 30));
        assert_eq!(delta.current_count, 3);
        assert_eq!(delta.prior_count, 4);
        assert_eq!(delta.delta, -1);
        assert!((delta.percent_change.unwrap() + 25.0).abs() < 1e-9);
    }

    #[test]
    fn delta_of_two_empty_windows_is_zero() {
        let table = january_table();
        let empty_window = range(date(2020, 6, 1), date(2020, 6, 30));
        let delta = period_delta(&table, &empty_window).unwrap();
        assert_eq!(delta.current_count, 0);
        assert_eq!(delta.prior_count, 0);
        assert_eq!(delta.delta, 0);
        assert_eq!(delta.percent_change, None);

        let delta = period_delta(&GoldTable::default(), &FilterSpec::default()).unwrap();
        assert_eq!(delta.delta, 0);
        assert_eq!(delta.current, None);
    }

    #[test]
    fn map_points_skip_rows_without_location() {
        let mut located = incident(1, "2023-01-02 09:00", "THEFT");
        located.latitude = Some(41.88);
        located.longitude = Some(-87.63);
        let unlocated = incident(2, "2023-01-02 10:00", "THEFT");
        let rows = vec![&located, &unlocated];

        let points = map_points(&rows);
        assert_eq!(points.len(), 1);
        assert_eq!(points[0].id, 1);
        assert_eq!(group_counts(&rows, GroupBy::PrimaryType)[0].count, 2);
    }

    #[test]
    fn top_types_are_truncated() {
        let table = january_table();
        let rows = filter::filter_incidents(&table, &FilterSpec::default());
        let top = top_primary_types(&rows, 1);
        assert_eq!(top.len(), 1);
        assert_eq!(top[0].key, "THEFT");
        assert_eq!(top[0].count, 7);
    }
}
