use std::collections::HashSet;

use crime_dash_analytics_models::SummaryStats;
use crime_dash_crime_models::CrimeCategory;
use crime_dash_incident_models::Incident;

#[allow(clippy::cast_precision_loss)]
fn rate(part: u64, total: u64) -> f64 {
    if total == 0 {
        0.0
    } else {
        part as f64 / total as f64 * 100.0
    }
}

#[allow(clippy::cast_precision_loss)]
fn mean(values: impl Iterator<Item = f64>) -> Option<f64> {
    let (sum, n) = values.fold((0.0, 0u64), |(sum, n), v| (sum + v, n + 1));
    (n > 0).then(|| sum / n as f64)
}

fn distinct(values: impl Iterator<Item = Option<i32>>) -> u64 {
    values.flatten().collect::<HashSet<_>>().len() as u64
}

/// Headline numbers for `rows`. Category totals are mutually exclusive, and
/// every rate is a percentage of `total_cases` (zero when `rows` is empty).
#[must_use]
pub fn summary_stats(rows: &[&Incident]) -> SummaryStats {
    let total_cases = rows.len() as u64;
    let count = |pred: &dyn Fn(&Incident) -> bool| rows.iter().filter(|i| pred(i)).count() as u64;
    let in_category = |category: CrimeCategory| count(&|i| i.category == category);

    let total_arrests = count(&|i| i.arrest);
    let total_domestic_cases = count(&|i| i.domestic);
    let total_daytime_cases = count(&Incident::is_daytime);
    let total_violent_cases = in_category(CrimeCategory::Violent);
    let total_property_cases = in_category(CrimeCategory::Property);

    SummaryStats {
        total_cases,
        unique_crime_types: rows
            .iter()
            .map(|i| i.primary_type.as_str())
            .collect::<HashSet<_>>()
            .len() as u64,
        total_arrests,
        total_domestic_cases,
        total_weekend_cases: count(&Incident::is_weekend),
        total_nighttime_cases: total_cases - total_daytime_cases,
        total_daytime_cases,
        total_violent_cases,
        total_property_cases,
        total_drug_cases: in_category(CrimeCategory::Drug),
        total_weapon_cases: in_category(CrimeCategory::Weapons),
        total_public_order_cases: in_category(CrimeCategory::PublicOrder),
        avg_severity: mean(
            rows.iter()
                .filter_map(|i| i.severity())
                .map(|s| f64::from(s.value())),
        ),
        avg_distance_from_downtown_km: mean(
            rows.iter().filter_map(|i| i.distance_from_downtown_km()),
        ),
        unique_beats: distinct(rows.iter().map(|i| i.beat)),
        unique_wards: distinct(rows.iter().map(|i| i.ward)),
        unique_districts: distinct(rows.iter().map(|i| i.district)),
        unique_community_areas: distinct(rows.iter().map(|i| i.community_area)),
        arrest_rate: rate(total_arrests, total_cases),
        domestic_rate: rate(total_domestic_cases, total_cases),
        violent_rate: rate(total_violent_cases, total_cases),
        property_rate: rate(total_property_cases, total_cases),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::incident;

    #[test]
    fn empty_subset_is_all_zero() {
        let stats = summary_stats(&[]);
        assert_eq!(stats, SummaryStats::default());
    }

    #[test]
    fn counts_and_rates() {
        // 2023-01-07 is a Saturday.
        let mut theft = incident(1, "2023-01-07 23:00", "THEFT");
        theft.arrest = true;
        theft.ward = Some(42);
        theft.beat = Some(111);
        let mut robbery = incident(2, "2023-01-09 10:00", "ROBBERY");
        robbery.ward = Some(42);
        robbery.latitude = Some(41.8781);
        robbery.longitude = Some(-87.6298);
        let mut narcotics = incident(3, "2023-01-10 02:00", "NARCOTICS");
        narcotics.domestic = true;
        narcotics.ward = Some(7);
        let homicide = incident(4, "2023-01-11 12:00", "HOMICIDE");

        let rows = vec![&theft, &robbery, &narcotics, &homicide];
        let stats = summary_stats(&rows);

        assert_eq!(stats.total_cases, 4);
        assert_eq!(stats.unique_crime_types, 4);
        assert_eq!(stats.total_arrests, 1);
        assert_eq!(stats.total_domestic_cases, 1);
        assert_eq!(stats.total_weekend_cases, 1);
        assert_eq!(stats.total_daytime_cases, 2);
        assert_eq!(stats.total_nighttime_cases, 2);
        assert_eq!(stats.total_violent_cases, 2);
        assert_eq!(stats.total_property_cases, 1);
        assert_eq!(stats.total_drug_cases, 1);
        assert_eq!(stats.unique_wards, 2);
        assert_eq!(stats.unique_beats, 1);
        assert_eq!(stats.unique_districts, 0);
        assert!((stats.arrest_rate - 25.0).abs() < 1e-9);
        assert!((stats.violent_rate - 50.0).abs() < 1e-9);

        // Theft has no severity: (4 + 2 + 5) / 3.
        assert!((stats.avg_severity.unwrap() - 11.0 / 3.0).abs() < 1e-9);
        assert!(stats.avg_distance_from_downtown_km.unwrap().abs() < 1e-9);
    }
}
