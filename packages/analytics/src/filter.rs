//! Applying a [`FilterSpec`] to the gold table.

use std::collections::BTreeSet;

use crime_dash_analytics_models::FilterSpec;
use crime_dash_incident_models::Incident;
use crime_dash_store::GoldTable;

use crate::{AnalyticsError, params};

fn in_set(set: &BTreeSet<i32>, value: Option<i32>) -> bool {
    set.is_empty() || value.is_some_and(|v| set.contains(&v))
}

/// Whether `incident` satisfies every constraint in `filter`.
///
/// An incident with a null geo code never matches a non-empty set for that
/// layer.
#[must_use]
pub fn matches(incident: &Incident, filter: &FilterSpec) -> bool {
    (filter.primary_types.is_empty() || filter.primary_types.contains(&incident.primary_type))
        && (filter.categories.is_empty() || filter.categories.contains(&incident.category))
        && filter
            .date_range
            .is_none_or(|range| range.contains(incident.date()))
        && filter.arrest.is_none_or(|a| a == incident.arrest)
        && filter.domestic.is_none_or(|d| d == incident.domestic)
        && in_set(&filter.districts, incident.district)
        && in_set(&filter.wards, incident.ward)
        && in_set(&filter.community_areas, incident.community_area)
        && in_set(&filter.beats, incident.beat)
}

/// Checks a filter that did not come through [`crate::params`].
///
/// # Errors
///
/// Returns [`AnalyticsError::InvalidFilter`] if the date range ends before
/// it starts or is longer than [`params::MAX_RANGE_DAYS`].
pub fn validate(filter: &FilterSpec) -> Result<(), AnalyticsError> {
    filter.date_range.as_ref().map_or(Ok(()), params::check_range)
}

/// The incidents matching `filter`, in table order.
#[must_use]
pub fn filter_incidents<'a>(table: &'a GoldTable, filter: &FilterSpec) -> Vec<&'a Incident> {
    table
        .incidents()
        .iter()
        .filter(|i| matches(i, filter))
        .collect()
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use crime_dash_analytics_models::DateRange;
    use crime_dash_crime_models::CrimeCategory;

    use super::*;
    use crate::test_support::incident;

    fn table() -> GoldTable {
        let mut a = incident(1, "2023-01-03 10:00", "THEFT");
        a.ward = Some(42);
        a.arrest = true;
        let mut b = incident(2, "2023-01-15 22:00", "BATTERY");
        b.ward = Some(3);
        let c = incident(3, "2023-02-01 08:00", "THEFT");
        GoldTable::new(vec![a, b, c])
    }

    fn ids(rows: &[&Incident]) -> Vec<i64> {
        rows.iter().map(|i| i.id).collect()
    }

    #[test]
    fn empty_filter_matches_everything() {
        let table = table();
        assert_eq!(
            ids(&filter_incidents(&table, &FilterSpec::default())),
            vec![1, 2, 3]
        );
    }

    #[test]
    fn constraints_are_anded() {
        let table = table();
        let filter = FilterSpec {
            primary_types: ["THEFT".to_string()].into(),
            date_range: DateRange::new(
                NaiveDate::from_ymd_opt(2023, 1, 1).unwrap(),
                NaiveDate::from_ymd_opt(2023, 1, 31).unwrap(),
            ),
            ..FilterSpec::default()
        };
        assert_eq!(ids(&filter_incidents(&table, &filter)), vec![1]);

        let filter = FilterSpec {
            categories: [CrimeCategory::Violent, CrimeCategory::Property].into(),
            arrest: Some(false),
            ..FilterSpec::default()
        };
        assert_eq!(ids(&filter_incidents(&table, &filter)), vec![2, 3]);
    }

    #[test]
    fn null_geo_never_matches_geo_constraint() {
        let table = table();
        let filter = FilterSpec {
            wards: [42, 3].into(),
            ..FilterSpec::default()
        };
        assert_eq!(ids(&filter_incidents(&table, &filter)), vec![1, 2]);
    }

    #[test]
    fn date_range_is_inclusive() {
        let table = table();
        let day = NaiveDate::from_ymd_opt(2023, 2, 1).unwrap();
        let filter = FilterSpec {
            date_range: DateRange::new(day, day),
            ..FilterSpec::default()
        };
        assert_eq!(ids(&filter_incidents(&table, &filter)), vec![3]);
    }

    #[test]
    fn rejects_inverted_or_unbounded_range() {
        let filter = FilterSpec {
            date_range: Some(DateRange {
                start: NaiveDate::from_ymd_opt(2023, 2, 1).unwrap(),
                end: NaiveDate::from_ymd_opt(2023, 1, 1).unwrap(),
            }),
            ..FilterSpec::default()
        };
        assert!(validate(&filter).is_err());
        assert!(validate(&FilterSpec::default()).is_ok());

        let filter = FilterSpec {
            date_range: DateRange::new(
                NaiveDate::from_ymd_opt(1, 1, 1).unwrap(),
                NaiveDate::from_ymd_opt(9999, 12, 31).unwrap(),
            ),
            ..FilterSpec::default()
        };
        assert!(validate(&filter).is_err());
    }
}
