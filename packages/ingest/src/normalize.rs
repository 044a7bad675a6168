//! Turns one raw CSV row into a gold [`Incident`].

use crime_dash_crime_models::CrimeCategory;
use crime_dash_geography::ReferenceSet;
use crime_dash_geography_models::GeoLayer;
use crime_dash_incident_models::{Incident, RawIncidentRow};
use crime_dash_ingest_models::{IngestReport, MalformedReason};

use crate::parsing::{
    alphanumeric_only, non_blank, normalize_primary_type, parse_coordinates, parse_flag,
    parse_geo_code, parse_id, parse_timestamp,
};

/// Normalizes a raw row.
///
/// Rows without a usable id, timestamp or primary type are rejected with
/// the reason. Bad geo codes and coordinates only null the field; those are
/// counted in `report`.
///
/// # Errors
///
/// Returns the [`MalformedReason`] when the row must be dropped.
pub fn normalize_row(
    raw: &RawIncidentRow,
    references: &ReferenceSet,
    report: &mut IngestReport,
) -> Result<Incident, MalformedReason> {
    let id = match non_blank(raw.id.as_deref()) {
        None => return Err(MalformedReason::MissingId),
        Some(s) => parse_id(s).ok_or(MalformedReason::InvalidId)?,
    };

    let occurred_at = non_blank(raw.date.as_deref())
        .and_then(parse_timestamp)
        .ok_or(MalformedReason::InvalidTimestamp)?;

    let primary_type = non_blank(raw.primary_type.as_deref())
        .map(normalize_primary_type)
        .ok_or(MalformedReason::MissingPrimaryType)?;

    let fbi_code = non_blank(raw.fbi_code.as_deref())
        .map(|s| alphanumeric_only(s).to_uppercase())
        .filter(|s| !s.is_empty());

    let category = CrimeCategory::classify(&primary_type, fbi_code.as_deref());

    let mut geo = |layer: GeoLayer, value: Option<&String>| -> Option<i32> {
        let text = non_blank(value.map(String::as_str))?;
        let code = parse_geo_code(layer, text).filter(|&c| references.contains(layer, c));
        if code.is_none() {
            report.record_nulled_geo_code(layer);
        }
        code
    };

    let district = geo(GeoLayer::District, raw.district.as_ref());
    let ward = geo(GeoLayer::Ward, raw.ward.as_ref());
    let community_area = geo(GeoLayer::CommunityArea, raw.community_area.as_ref());
    let beat = geo(GeoLayer::Beat, raw.beat.as_ref());

    let raw_lat = non_blank(raw.latitude.as_deref());
    let raw_lng = non_blank(raw.longitude.as_deref());
    let coordinates = parse_coordinates(raw_lat, raw_lng);
    if coordinates.is_none() && (raw_lat.is_some() || raw_lng.is_some()) {
        report.nulled_coordinates += 1;
    }

    Ok(Incident {
        id,
        case_number: non_blank(raw.case_number.as_deref())
            .map(alphanumeric_only)
            .filter(|s| !s.is_empty()),
        occurred_at,
        primary_type,
        description: non_blank(raw.description.as_deref()).map(str::to_string),
        location_description: non_blank(raw.location_description.as_deref())
            .map(str::to_string),
        fbi_code,
        arrest: parse_flag(raw.arrest.as_deref()),
        domestic: parse_flag(raw.domestic.as_deref()),
        district,
        ward,
        community_area,
        beat,
        latitude: coordinates.map(|(lat, _)| lat),
        longitude: coordinates.map(|(_, lng)| lng),
        category,
    })
}

#[cfg(test)]
mod tests {
    use crime_dash_geography::ReferenceLayer;

    use super::*;

    fn raw() -> RawIncidentRow {
        RawIncidentRow {
            id: Some("101".to_string()),
            case_number: Some("JF-100001".to_string()),
            date: Some("01/05/2023 10:30:00 AM".to_string()),
            primary_type: Some("theft".to_string()),
            description: Some("  $500 AND UNDER ".to_string()),
            location_description: Some(String::new()),
            arrest: Some("false".to_string()),
            domestic: Some("Y".to_string()),
            beat: Some("0111".to_string()),
            district: Some("001".to_string()),
            ward: Some("42".to_string()),
            community_area: Some("32".to_string()),
            fbi_code: Some("06".to_string()),
            latitude: Some("41.8835".to_string()),
            longitude: Some("-87.6271".to_string()),
        }
    }

    #[test]
    fn normalizes_complete_row() {
        let mut report = IngestReport::default();
        let incident = normalize_row(&raw(), &ReferenceSet::new(), &mut report).unwrap();

        assert_eq!(incident.id, 101);
        assert_eq!(incident.case_number.as_deref(), Some("JF100001"));
        assert_eq!(incident.primary_type, "THEFT");
        assert_eq!(incident.description.as_deref(), Some("$500 AND UNDER"));
        assert_eq!(incident.location_description, None);
        assert!(!incident.arrest);
        assert!(incident.domestic);
        assert_eq!(incident.beat, Some(111));
        assert_eq!(incident.district, Some(1));
        assert_eq!(incident.ward, Some(42));
        assert_eq!(incident.category, CrimeCategory::Property);
        assert!(incident.has_location());
        assert_eq!(report, IngestReport::default());
    }

    #[test]
    fn rejection_reasons() {
        let refs = ReferenceSet::new();
        let mut report = IngestReport::default();

        let mut row = raw();
        row.id = None;
        assert_eq!(
            normalize_row(&row, &refs, &mut report),
            Err(MalformedReason::MissingId)
        );

        let mut row = raw();
        row.id = Some("HX1".to_string());
        assert_eq!(
            normalize_row(&row, &refs, &mut report),
            Err(MalformedReason::InvalidId)
        );

        let mut row = raw();
        row.date = Some("yesterday".to_string());
        assert_eq!(
            normalize_row(&row, &refs, &mut report),
            Err(MalformedReason::InvalidTimestamp)
        );

        let mut row = raw();
        row.primary_type = Some("   ".to_string());
        assert_eq!(
            normalize_row(&row, &refs, &mut report),
            Err(MalformedReason::MissingPrimaryType)
        );
    }

    #[test]
    fn nulls_out_of_range_and_unknown_codes() {
        let mut refs = ReferenceSet::new();
        refs.insert(
            ReferenceLayer::from_geojson_str(
                GeoLayer::CommunityArea,
                r#"{"type":"FeatureCollection","features":[
                    {"type":"Feature","properties":{"area_numbe":"8"},"geometry":null}
                ]}"#,
                "area_numbe",
                None,
            )
            .unwrap(),
        );

        let mut row = raw();
        row.ward = Some("77".to_string());
        row.community_area = Some("32".to_string());
        row.latitude = Some("0".to_string());
        row.longitude = Some("0".to_string());

        let mut report = IngestReport::default();
        let incident = normalize_row(&row, &refs, &mut report).unwrap();

        assert_eq!(incident.ward, None);
        assert_eq!(incident.community_area, None);
        assert_eq!(incident.district, Some(1));
        assert!(!incident.has_location());
        assert_eq!(report.nulled_geo_codes.get(&GeoLayer::Ward), Some(&1));
        assert_eq!(
            report.nulled_geo_codes.get(&GeoLayer::CommunityArea),
            Some(&1)
        );
        assert_eq!(report.nulled_coordinates, 1);
    }

    #[test]
    fn missing_geo_values_are_not_counted_as_nulled() {
        let mut row = raw();
        row.ward = None;
        row.latitude = None;
        row.longitude = Some(String::new());

        let mut report = IngestReport::default();
        let incident = normalize_row(&row, &ReferenceSet::new(), &mut report).unwrap();
        assert_eq!(incident.ward, None);
        assert_eq!(report.nulled_geo_code_total(), 0);
        assert_eq!(report.nulled_coordinates, 0);
    }
}
