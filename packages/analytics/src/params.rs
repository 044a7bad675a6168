//! Parsing user-supplied filter text into typed values.
//!
//! The HTTP layer hands raw query-string values to these helpers so every
//! parse failure surfaces as [`AnalyticsError::InvalidFilter`].

use std::{collections::BTreeSet, str::FromStr};

use chrono::NaiveDate;
use crime_dash_analytics_models::{DateRange, GroupBy};
use crime_dash_crime_models::CrimeCategory;

use crate::AnalyticsError;

/// Longest accepted rolling-average window, about ten years.
pub const MAX_WINDOW_DAYS: u32 = 3660;

/// Longest accepted date range, about a century.
pub const MAX_RANGE_DAYS: u64 = 36_600;

/// Parses a `YYYY-MM-DD` date.
///
/// # Errors
///
/// Returns [`AnalyticsError::InvalidFilter`] if `s` is not a valid date.
pub fn parse_date(s: &str) -> Result<NaiveDate, AnalyticsError> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d").map_err(|e| {
        AnalyticsError::invalid(format!("Invalid date '{s}': {e}. Expected format: YYYY-MM-DD"))
    })
}

/// Builds a date range from optional bounds. A missing bound is taken from
/// `fallback` (usually the table's date span).
///
/// # Errors
///
/// Returns [`AnalyticsError::InvalidFilter`] if a date does not parse, the
/// start is after the end, or the range is longer than [`MAX_RANGE_DAYS`].
pub fn parse_date_range(
    from: Option<&str>,
    to: Option<&str>,
    fallback: Option<(NaiveDate, NaiveDate)>,
) -> Result<Option<DateRange>, AnalyticsError> {
    let from = from.filter(|s| !s.trim().is_empty()).map(parse_date).transpose()?;
    let to = to.filter(|s| !s.trim().is_empty()).map(parse_date).transpose()?;

    let (start, end) = match (from, to, fallback) {
        (None, None, _) => return Ok(None),
        (Some(start), Some(end), _) => (start, end),
        (Some(start), None, Some((_, hi))) => (start, hi.max(start)),
        (None, Some(end), Some((lo, _))) => (lo.min(end), end),
        (Some(day), None, None) | (None, Some(day), None) => (day, day),
    };

    let range = DateRange::new(start, end).ok_or_else(|| {
        AnalyticsError::invalid(format!("start date {start} is after end date {end}"))
    })?;
    check_range(&range)?;
    Ok(Some(range))
}

/// Rejects ranges that are inverted or longer than [`MAX_RANGE_DAYS`].
///
/// # Errors
///
/// Returns [`AnalyticsError::InvalidFilter`] naming the offending range.
pub fn check_range(range: &DateRange) -> Result<(), AnalyticsError> {
    if range.start > range.end {
        return Err(AnalyticsError::invalid(format!(
            "start date {} is after end date {}",
            range.start, range.end
        )));
    }
    if range.days() > MAX_RANGE_DAYS {
        return Err(AnalyticsError::invalid(format!(
            "Date range {range} spans {} days; at most {MAX_RANGE_DAYS} are allowed",
            range.days()
        )));
    }
    Ok(())
}

/// Splits a comma-separated list, dropping blanks.
fn split_list(s: &str) -> impl Iterator<Item = &str> {
    s.split(',').map(str::trim).filter(|v| !v.is_empty())
}

/// Parses a comma-separated list of geo codes.
///
/// # Errors
///
/// Returns [`AnalyticsError::InvalidFilter`] naming the first bad value.
pub fn parse_code_list(field: &str, s: &str) -> Result<BTreeSet<i32>, AnalyticsError> {
    split_list(s)
        .map(|v| {
            v.parse::<i32>().map_err(|_| {
                AnalyticsError::invalid(format!("Invalid {field} value '{v}': expected an integer"))
            })
        })
        .collect()
}

/// Parses a comma-separated list of primary types, upper-casing each.
#[must_use]
pub fn parse_primary_types(s: &str) -> BTreeSet<String> {
    split_list(s)
        .map(|v| v.split_whitespace().collect::<Vec<_>>().join(" ").to_uppercase())
        .collect()
}

fn parse_enum<T: FromStr>(kind: &str, v: &str, expected: &[&str]) -> Result<T, AnalyticsError> {
    T::from_str(v).map_err(|_| {
        AnalyticsError::invalid(format!(
            "Unknown {kind} '{v}'. Expected one of: {}",
            expected.join(", ")
        ))
    })
}

/// Parses a comma-separated list of categories (`VIOLENT,PROPERTY`).
///
/// # Errors
///
/// Returns [`AnalyticsError::InvalidFilter`] for an unknown category.
pub fn parse_categories(s: &str) -> Result<BTreeSet<CrimeCategory>, AnalyticsError> {
    let expected: Vec<&str> = CrimeCategory::all().iter().map(AsRef::as_ref).collect();
    split_list(s)
        .map(|v| parse_enum("category", &v.to_uppercase(), &expected))
        .collect()
}

/// Parses a group-by dimension name (`primary_type`, `ward`, ...).
///
/// # Errors
///
/// Returns [`AnalyticsError::InvalidFilter`] for an unknown dimension.
pub fn parse_group_by(s: &str) -> Result<GroupBy, AnalyticsError> {
    let expected: Vec<&str> = GroupBy::all().iter().map(AsRef::as_ref).collect();
    parse_enum("dimension", s.trim(), &expected)
}

/// Parses a `true`/`false` flag filter.
///
/// # Errors
///
/// Returns [`AnalyticsError::InvalidFilter`] for anything else.
pub fn parse_bool(field: &str, s: &str) -> Result<bool, AnalyticsError> {
    match s.trim().to_ascii_lowercase().as_str() {
        "true" | "1" => Ok(true),
        "false" | "0" => Ok(false),
        _ => Err(AnalyticsError::invalid(format!(
            "Invalid {field} value '{s}': expected true or false"
        ))),
    }
}

/// Validates a rolling-average window length.
///
/// # Errors
///
/// Returns [`AnalyticsError::InvalidFilter`] when `days` is zero or above
/// [`MAX_WINDOW_DAYS`].
pub fn check_window_days(days: u32) -> Result<u32, AnalyticsError> {
    if days == 0 {
        return Err(AnalyticsError::invalid("windowDays must be at least 1"));
    }
    if days > MAX_WINDOW_DAYS {
        return Err(AnalyticsError::invalid(format!(
            "windowDays must be at most {MAX_WINDOW_DAYS}, got {days}"
        )));
    }
    Ok(days)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn dates() {
        assert_eq!(parse_date("2023-01-31").unwrap(), date(2023, 1, 31));
        assert!(parse_date("01/31/2023").is_err());
        assert!(parse_date("2023-02-30").is_err());
    }

    #[test]
    fn date_range_bounds() {
        let span = Some((date(2022, 1, 1), date(2023, 12, 31)));

        assert_eq!(parse_date_range(None, None, span).unwrap(), None);

        let open_end = parse_date_range(Some("2023-06-01"), None, span)
            .unwrap()
            .unwrap();
        assert_eq!(open_end.end, date(2023, 12, 31));

        let open_start = parse_date_range(None, Some("2022-03-01"), span)
            .unwrap()
            .unwrap();
        assert_eq!(open_start.start, date(2022, 1, 1));

        let err = parse_date_range(Some("2023-02-01"), Some("2023-01-01"), span).unwrap_err();
        assert!(matches!(err, AnalyticsError::InvalidFilter { .. }));
    }

    #[test]
    fn overly_long_ranges_are_rejected() {
        let err = parse_date_range(Some("0001-01-01"), Some("9999-12-31"), None).unwrap_err();
        assert!(err.to_string().contains("36600"));

        // Open end filled from the table span still counts.
        let span = Some((date(2022, 1, 1), date(2023, 12, 31)));
        assert!(parse_date_range(Some("0001-01-01"), None, span).is_err());

        let century = DateRange::new(date(2000, 1, 1), date(2099, 12, 31)).unwrap();
        assert!(check_range(&century).is_ok());
    }

    #[test]
    fn lists() {
        assert_eq!(
            parse_code_list("ward", "1, 2,,42").unwrap(),
            [1, 2, 42].into()
        );
        assert!(parse_code_list("ward", "1,x").is_err());
        assert_eq!(
            parse_primary_types("theft, motor  vehicle theft"),
            ["THEFT".to_string(), "MOTOR VEHICLE THEFT".to_string()].into()
        );
        assert_eq!(
            parse_categories("violent,PUBLIC_ORDER").unwrap(),
            [CrimeCategory::Violent, CrimeCategory::PublicOrder].into()
        );
        assert!(parse_categories("scary").is_err());
    }

    #[test]
    fn group_by_and_flags() {
        assert_eq!(parse_group_by("ward").unwrap(), GroupBy::Ward);
        let err = parse_group_by("tract").unwrap_err();
        assert!(err.to_string().contains("primary_type"));
        assert!(parse_bool("arrest", "TRUE").unwrap());
        assert!(parse_bool("arrest", "maybe").is_err());
        assert!(check_window_days(0).is_err());
        assert_eq!(check_window_days(7).unwrap(), 7);
        assert_eq!(check_window_days(MAX_WINDOW_DAYS).unwrap(), MAX_WINDOW_DAYS);
        assert!(check_window_days(MAX_WINDOW_DAYS + 1).is_err());
        assert!(check_window_days(1_000_000_000).is_err());
    }
}
