//! Field coercion for raw portal CSV values.
//!
//! Every function takes the raw text (already trimmed or not) and returns
//! `None` when the value is missing or unusable. None of them fail.

use std::sync::LazyLock;

use chrono::{NaiveDate, NaiveDateTime};
use crime_dash_geography_models::GeoLayer;
use regex::Regex;

/// Timestamp formats accepted for the `date` column, tried in order.
const TIMESTAMP_FORMATS: &[&str] = &[
    "%m/%d/%Y %I:%M:%S %p",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S",
];

const TRUE_VALUES: &[&str] = &["true", "t", "1", "yes", "y"];

static NON_DIGITS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new("[^0-9]+").unwrap_or_else(|_| unreachable!()));

static NON_ALPHANUMERIC: LazyLock<Regex> =
    LazyLock::new(|| Regex::new("[^0-9A-Za-z]+").unwrap_or_else(|_| unreachable!()));

static WHITESPACE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new("[ \t\r\n]+").unwrap_or_else(|_| unreachable!()));

/// Trims `s` and maps blank strings to `None`.
#[must_use]
pub fn non_blank(s: Option<&str>) -> Option<&str> {
    s.map(str::trim).filter(|s| !s.is_empty())
}

/// Parses an incident timestamp.
///
/// Accepts the portal's `MM/DD/YYYY hh:mm:ss AM` export format, ISO 8601
/// with or without fractional seconds, `YYYY-MM-DD HH:MM:SS`, and a bare
/// `YYYY-MM-DD` (midnight).
#[must_use]
pub fn parse_timestamp(s: &str) -> Option<NaiveDateTime> {
    let s = s.trim();
    TIMESTAMP_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(s, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}

/// Coerces an arrest/domestic flag. Only `true`, `t`, `1`, `yes` and `y`
/// (any case) are true; anything else, including a missing value, is false.
#[must_use]
pub fn parse_flag(s: Option<&str>) -> bool {
    s.map(str::trim)
        .is_some_and(|v| TRUE_VALUES.iter().any(|t| v.eq_ignore_ascii_case(t)))
}

/// Parses an incident id. Whole-number floats such as `"12345.0"` are
/// accepted since some exports write ids that way.
#[allow(clippy::cast_possible_truncation)]
#[must_use]
pub fn parse_id(s: &str) -> Option<i64> {
    let s = s.trim();
    s.parse::<i64>().ok().or_else(|| {
        s.parse::<f64>()
            .ok()
            .filter(|f| f.is_finite() && f.fract() == 0.0 && f.abs() < 9.0e15)
            .map(|f| f as i64)
    })
}

/// Extracts the digits of a geo code (`"Ward 07"` -> `7`) and checks it
/// against the layer's valid range.
#[must_use]
pub fn parse_geo_code(layer: GeoLayer, s: &str) -> Option<i32> {
    let digits = NON_DIGITS.replace_all(s, "");
    if digits.is_empty() {
        return None;
    }
    digits
        .parse::<i32>()
        .ok()
        .filter(|&code| layer.is_valid_code(code))
}

/// Parses a coordinate pair. Returns `None` if either value is missing,
/// unparseable or out of range, or if the pair is exactly `(0, 0)`.
#[must_use]
pub fn parse_coordinates(lat: Option<&str>, lng: Option<&str>) -> Option<(f64, f64)> {
    let latitude = lat?.trim().parse::<f64>().ok()?;
    let longitude = lng?.trim().parse::<f64>().ok()?;
    if !(-90.0..=90.0).contains(&latitude) || !(-180.0..=180.0).contains(&longitude) {
        return None;
    }
    if latitude == 0.0 && longitude == 0.0 {
        return None;
    }
    Some((latitude, longitude))
}

/// Upper-cases an offense type and collapses inner whitespace.
#[must_use]
pub fn normalize_primary_type(s: &str) -> String {
    WHITESPACE.replace_all(s.trim(), " ").to_uppercase()
}

/// Strips everything but ASCII letters and digits (case numbers).
#[must_use]
pub fn alphanumeric_only(s: &str) -> String {
    NON_ALPHANUMERIC.replace_all(s, "").into_owned()
}

/// Normalizes a raw CSV header (`" Primary Type "` -> `primary_type`).
#[must_use]
pub fn normalize_header(s: &str) -> String {
    WHITESPACE
        .replace_all(s.trim(), "_")
        .to_lowercase()
        .trim_start_matches('\u{feff}')
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_portal_timestamp() {
        let dt = parse_timestamp("01/05/2023 10:30:00 PM").unwrap();
        assert_eq!(dt.to_string(), "2023-01-05 22:30:00");
    }

    #[test]
    fn parses_iso_timestamps() {
        assert_eq!(
            parse_timestamp("2023-01-05T10:30:00.000").unwrap().to_string(),
            "2023-01-05 10:30:00"
        );
        assert_eq!(
            parse_timestamp("2023-01-05T10:30:00").unwrap().to_string(),
            "2023-01-05 10:30:00"
        );
        assert_eq!(
            parse_timestamp(" 2023-01-05 10:30:00 ").unwrap().to_string(),
            "2023-01-05 10:30:00"
        );
        assert_eq!(
            parse_timestamp("2023-01-05").unwrap().to_string(),
            "2023-01-05 00:00:00"
        );
    }

    #[test]
    fn rejects_invalid_timestamp() {
        assert!(parse_timestamp("not-a-date").is_none());
        assert!(parse_timestamp("13/45/2023 10:30:00 AM").is_none());
        assert!(parse_timestamp("").is_none());
    }

    #[test]
    fn flags() {
        for v in ["true", "TRUE", "t", "1", "Yes", " y "] {
            assert!(parse_flag(Some(v)), "{v} should be true");
        }
        for v in ["false", "0", "no", "", "maybe"] {
            assert!(!parse_flag(Some(v)), "{v} should be false");
        }
        assert!(!parse_flag(None));
    }

    #[test]
    fn ids() {
        assert_eq!(parse_id("12345"), Some(12345));
        assert_eq!(parse_id(" 12345.0 "), Some(12345));
        assert_eq!(parse_id("12345.5"), None);
        assert_eq!(parse_id("abc"), None);
    }

    #[test]
    fn geo_codes() {
        assert_eq!(parse_geo_code(GeoLayer::Ward, "Ward 07"), Some(7));
        assert_eq!(parse_geo_code(GeoLayer::Ward, "51"), None);
        assert_eq!(parse_geo_code(GeoLayer::Ward, "0"), None);
        assert_eq!(parse_geo_code(GeoLayer::Beat, "0111"), Some(111));
        assert_eq!(parse_geo_code(GeoLayer::District, "N/A"), None);
        assert_eq!(parse_geo_code(GeoLayer::CommunityArea, "100"), Some(100));
    }

    #[test]
    fn coordinates() {
        let (lat, lng) = parse_coordinates(Some("41.8781"), Some("-87.6298")).unwrap();
        assert!((lat - 41.8781).abs() < f64::EPSILON);
        assert!((lng - -87.6298).abs() < f64::EPSILON);

        assert!(parse_coordinates(Some("0"), Some("0.0")).is_none());
        assert!(parse_coordinates(Some("91"), Some("-87.6")).is_none());
        assert!(parse_coordinates(Some("41.8"), Some("-181")).is_none());
        assert!(parse_coordinates(None, Some("-87.6")).is_none());
        assert!(parse_coordinates(Some("abc"), Some("-87.6")).is_none());
    }

    #[test]
    fn text_normalization() {
        assert_eq!(normalize_primary_type("  motor   vehicle theft "), "MOTOR VEHICLE THEFT");
        assert_eq!(alphanumeric_only("JF-100 001"), "JF100001");
        assert_eq!(normalize_header(" Primary Type "), "primary_type");
        assert_eq!(normalize_header("\u{feff}ID"), "id");
        assert_eq!(normalize_header("Community Area"), "community_area");
    }
}
