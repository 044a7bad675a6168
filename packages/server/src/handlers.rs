//! HTTP handler functions for the crime dashboard API.

use std::str::FromStr as _;

use actix_web::{HttpResponse, web};
use crime_dash_analytics::{AnalyticsError, params};
use crime_dash_analytics_models::{FilterSpec, GroupBy, ReportPeriod, ReportType};
use crime_dash_crime_models::{CrimeCategory, FbiCategory};
use crime_dash_geography_models::GeoLayer;
use crime_dash_server_models::{
    ApiCategories, ApiCounts, ApiDaily, ApiFbiCategory, ApiHealth, ApiIncident, ApiMap, ApiPage,
    ApiReferenceLayer, ApiRolling, CountsParams, DEFAULT_PAGE_LIMIT, FilterParams,
    MAX_PAGE_LIMIT, PageParams, ReportParams, RollingParams,
};
use crime_dash_store::GoldTable;

use crate::AppState;

fn error_response(e: &AnalyticsError) -> HttpResponse {
    log::debug!("Rejected request: {e}");
    let AnalyticsError::InvalidFilter { message } = e;
    HttpResponse::BadRequest().json(serde_json::json!({ "error": message }))
}

fn bad_request(message: &str) -> HttpResponse {
    HttpResponse::BadRequest().json(serde_json::json!({ "error": message }))
}

/// Builds a [`FilterSpec`] from query parameters. Open-ended date bounds are
/// closed with the gold table's date span.
fn build_filter(p: &FilterParams, table: &GoldTable) -> Result<FilterSpec, AnalyticsError> {
    let codes = |field: &str, value: Option<&String>| {
        value.map_or_else(|| Ok(Default::default()), |v| params::parse_code_list(field, v))
    };

    Ok(FilterSpec {
        primary_types: p
            .primary_types
            .as_deref()
            .map(params::parse_primary_types)
            .unwrap_or_default(),
        categories: p
            .categories
            .as_deref()
            .map(params::parse_categories)
            .transpose()?
            .unwrap_or_default(),
        date_range: params::parse_date_range(
            p.from.as_deref(),
            p.to.as_deref(),
            table.date_span(),
        )?,
        arrest: p
            .arrest
            .as_deref()
            .map(|v| params::parse_bool("arrest", v))
            .transpose()?,
        domestic: p
            .domestic
            .as_deref()
            .map(|v| params::parse_bool("domestic", v))
            .transpose()?,
        districts: codes("districts", p.districts.as_ref())?,
        wards: codes("wards", p.wards.as_ref())?,
        community_areas: codes("communityAreas", p.community_areas.as_ref())?,
        beats: codes("beats", p.beats.as_ref())?,
    })
}

/// `GET /api/health`
pub async fn health(state: web::Data<AppState>) -> HttpResponse {
    HttpResponse::Ok().json(ApiHealth {
        healthy: true,
        version: env!("CARGO_PKG_VERSION").to_string(),
        incidents: state.table.len() as u64,
    })
}

/// `GET /api/categories`
///
/// Returns the crime taxonomy and the accepted `groupBy` dimensions.
pub async fn categories() -> HttpResponse {
    HttpResponse::Ok().json(ApiCategories {
        categories: CrimeCategory::all().to_vec(),
        fbi_categories: FbiCategory::all()
            .iter()
            .map(|&name| ApiFbiCategory {
                name,
                severity: name.severity().map(|s| s.value()),
                violent: name.is_violent(),
                property: name.is_property(),
            })
            .collect(),
        dimensions: GroupBy::all().to_vec(),
    })
}

/// `GET /api/incidents`
///
/// The filtered subset in gold-table order, paged by `limit`/`offset`.
pub async fn incidents(
    state: web::Data<AppState>,
    filter: web::Query<FilterParams>,
    page: web::Query<PageParams>,
) -> HttpResponse {
    let filter = match build_filter(&filter, &state.table) {
        Ok(filter) => filter,
        Err(e) => return error_response(&e),
    };

    let limit = page.limit.unwrap_or(DEFAULT_PAGE_LIMIT).min(MAX_PAGE_LIMIT);
    let offset = page.offset.unwrap_or(0);

    let rows = crime_dash_analytics::filter_incidents(&state.table, &filter);
    let items: Vec<ApiIncident> = rows
        .iter()
        .skip(offset)
        .take(limit)
        .map(|&incident| ApiIncident::from(incident))
        .collect();

    HttpResponse::Ok().json(ApiPage {
        total: rows.len() as u64,
        limit,
        offset,
        items,
    })
}

/// `GET /api/map`
///
/// The filtered subset reduced to incidents with coordinates.
pub async fn map(state: web::Data<AppState>, filter: web::Query<FilterParams>) -> HttpResponse {
    let filter = match build_filter(&filter, &state.table) {
        Ok(filter) => filter,
        Err(e) => return error_response(&e),
    };

    let rows = crime_dash_analytics::filter_incidents(&state.table, &filter);
    HttpResponse::Ok().json(ApiMap {
        total: rows.len() as u64,
        points: crime_dash_analytics::map_points(&rows),
    })
}

/// `GET /api/counts?groupBy=...`
pub async fn counts(
    state: web::Data<AppState>,
    filter: web::Query<FilterParams>,
    query: web::Query<CountsParams>,
) -> HttpResponse {
    let Some(group_by) = query.group_by.as_deref() else {
        return bad_request("Missing required parameter 'groupBy'");
    };
    let group_by = match params::parse_group_by(group_by) {
        Ok(group_by) => group_by,
        Err(e) => return error_response(&e),
    };
    let filter = match build_filter(&filter, &state.table) {
        Ok(filter) => filter,
        Err(e) => return error_response(&e),
    };

    let rows = crime_dash_analytics::filter_incidents(&state.table, &filter);
    let mut counts = crime_dash_analytics::group_counts(&rows, group_by);
    if let Some(limit) = query.limit {
        counts.truncate(limit);
    }

    HttpResponse::Ok().json(ApiCounts {
        group_by,
        total: rows.len() as u64,
        counts,
    })
}

/// `GET /api/daily`
///
/// Zero-filled per-day counts over the filter window.
pub async fn daily(state: web::Data<AppState>, filter: web::Query<FilterParams>) -> HttpResponse {
    let filter = match build_filter(&filter, &state.table) {
        Ok(filter) => filter,
        Err(e) => return error_response(&e),
    };

    let rows = crime_dash_analytics::filter_incidents(&state.table, &filter);
    let window = crime_dash_analytics::resolve_window(&filter, &rows);
    let days = window
        .map(|window| crime_dash_analytics::daily_counts(&rows, &window))
        .unwrap_or_default();

    HttpResponse::Ok().json(ApiDaily { window, days })
}

/// `GET /api/rolling?windowDays=N`
pub async fn rolling(
    state: web::Data<AppState>,
    filter: web::Query<FilterParams>,
    query: web::Query<RollingParams>,
) -> HttpResponse {
    let Some(window_days) = query.window_days.as_deref() else {
        return bad_request("Missing required parameter 'windowDays'");
    };
    let Ok(window_days) = window_days.trim().parse::<u32>() else {
        return bad_request(&format!(
            "Invalid windowDays '{window_days}': expected a positive integer"
        ));
    };

    let result = build_filter(&filter, &state.table).and_then(|filter| {
        crime_dash_analytics::rolling_average(&state.table, &filter, window_days)
    });

    match result {
        Ok(points) => HttpResponse::Ok().json(ApiRolling {
            window_days,
            points,
        }),
        Err(e) => error_response(&e),
    }
}

/// `GET /api/delta`
///
/// The filter window compared with the equally long window before it.
pub async fn delta(state: web::Data<AppState>, filter: web::Query<FilterParams>) -> HttpResponse {
    let result = build_filter(&filter, &state.table)
        .and_then(|filter| crime_dash_analytics::period_delta(&state.table, &filter));

    match result {
        Ok(delta) => HttpResponse::Ok().json(delta),
        Err(e) => error_response(&e),
    }
}

/// `GET /api/stats`
pub async fn stats(state: web::Data<AppState>, filter: web::Query<FilterParams>) -> HttpResponse {
    let filter = match build_filter(&filter, &state.table) {
        Ok(filter) => filter,
        Err(e) => return error_response(&e),
    };

    let rows = crime_dash_analytics::filter_incidents(&state.table, &filter);
    HttpResponse::Ok().json(crime_dash_analytics::summary_stats(&rows))
}

/// `GET /api/report?type=R12|YTD&reportDate=YYYY-MM-DD`
///
/// Any `from`/`to` on the request is ignored; the report windows replace it.
pub async fn report(
    state: web::Data<AppState>,
    filter: web::Query<FilterParams>,
    query: web::Query<ReportParams>,
) -> HttpResponse {
    let report_type = match query.report_type.as_deref().map(ReportType::from_str) {
        Some(Ok(report_type)) => report_type,
        Some(Err(_)) | None => return bad_request("Parameter 'type' must be R12 or YTD"),
    };

    let report_date = match query.report_date.as_deref().map(params::parse_date) {
        Some(Ok(date)) => date,
        Some(Err(e)) => return error_response(&e),
        None => state
            .table
            .date_span()
            .map_or_else(|| chrono::Local::now().date_naive(), |(_, last)| last),
    };

    let Some(period) = ReportPeriod::new(report_type, report_date) else {
        return bad_request(&format!("Report date {report_date} is out of range"));
    };

    let filter = match build_filter(&filter, &state.table) {
        Ok(filter) => filter.without_dates(),
        Err(e) => return error_response(&e),
    };

    HttpResponse::Ok().json(crime_dash_analytics::compare_report(
        &state.table,
        &filter,
        &period,
    ))
}

/// `GET /api/references`
///
/// Lists the loaded reference layers and their areas.
pub async fn references(state: web::Data<AppState>) -> HttpResponse {
    let layers: Vec<ApiReferenceLayer> = state
        .references
        .layers()
        .map(|layer| ApiReferenceLayer {
            layer: layer.layer(),
            bounds: layer.bounds(),
            areas: layer.areas().map(|a| a.summary()).collect(),
        })
        .collect();

    HttpResponse::Ok().json(layers)
}

/// `GET /api/references/{layer}`
///
/// One reference layer as a GeoJSON `FeatureCollection`.
pub async fn reference_layer(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> HttpResponse {
    let name = path.into_inner();
    let Ok(layer) = GeoLayer::from_str(&name) else {
        return HttpResponse::NotFound().json(serde_json::json!({
            "error": format!("Unknown reference layer '{name}'")
        }));
    };

    match state.references.get(layer) {
        Some(reference) => HttpResponse::Ok().json(reference.to_feature_collection()),
        None => HttpResponse::NotFound().json(serde_json::json!({
            "error": format!("Reference layer '{layer}' is not loaded")
        })),
    }
}
