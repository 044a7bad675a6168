#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Actix-Web API server for the crime dashboard.
//!
//! The gold table and reference layers are loaded once at startup and
//! shared read-only between workers. Every request is answered by a pure
//! computation over that state.

mod handlers;

use std::sync::Arc;

use actix_cors::Cors;
use actix_web::{App, HttpServer, middleware, web};
use crime_dash_geography::{GeoError, ReferenceLayer, ReferenceSet};
use crime_dash_store::{GoldTable, PipelineConfig, StoreError};

/// Errors that prevent the server from starting.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Reference error: {0}")]
    Geo(#[from] GeoError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Shared application state.
pub struct AppState {
    /// The gold table, never mutated after load.
    pub table: Arc<GoldTable>,
    /// Reference layers for map overlays.
    pub references: Arc<ReferenceSet>,
}

impl AppState {
    #[must_use]
    pub fn new(table: GoldTable, references: ReferenceSet) -> Self {
        Self {
            table: Arc::new(table),
            references: Arc::new(references),
        }
    }

    /// Loads the gold table and reference layers named by `config`.
    ///
    /// Reference files that do not exist are skipped with a warning; the
    /// overlays are optional for serving.
    ///
    /// # Errors
    ///
    /// * [`ServerError::Store`] if the gold table is missing or unreadable
    /// * [`ServerError::Geo`] if a reference file exists but cannot be parsed
    pub fn load(config: &PipelineConfig) -> Result<Self, ServerError> {
        log::info!("Loading gold table from {}", config.gold_table.display());
        let table = crime_dash_store::load_gold_table(&config.gold_table)?;

        let mut references = ReferenceSet::new();
        for source in &config.references {
            match ReferenceLayer::load(source) {
                Ok(layer) => references.insert(layer),
                Err(GeoError::MissingFile { path }) => {
                    log::warn!(
                        "No {} reference file at {}; overlay disabled",
                        source.layer,
                        path.display()
                    );
                }
                Err(e) => return Err(e.into()),
            }
        }

        log::info!(
            "Loaded {} incidents and {} reference layers",
            table.len(),
            references.layers().count()
        );

        Ok(Self::new(table, references))
    }
}

/// Registers every `/api` route.
pub fn routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            .route("/health", web::get().to(handlers::health))
            .route("/categories", web::get().to(handlers::categories))
            .route("/incidents", web::get().to(handlers::incidents))
            .route("/map", web::get().to(handlers::map))
            .route("/counts", web::get().to(handlers::counts))
            .route("/daily", web::get().to(handlers::daily))
            .route("/rolling", web::get().to(handlers::rolling))
            .route("/delta", web::get().to(handlers::delta))
            .route("/stats", web::get().to(handlers::stats))
            .route("/report", web::get().to(handlers::report))
            .route("/references", web::get().to(handlers::references))
            .route(
                "/references/{layer}",
                web::get().to(handlers::reference_layer),
            ),
    );
}

/// Starts the crime dashboard API server.
///
/// Loads the pipeline configuration, the gold table and the reference
/// layers, then serves on `BIND_ADDR`:`PORT` (default `127.0.0.1:8080`).
/// The caller provides the async runtime (e.g. via `#[actix_web::main]`).
///
/// # Errors
///
/// Returns [`ServerError`] if the data cannot be loaded or the HTTP server
/// fails to bind.
#[allow(clippy::future_not_send)]
pub async fn run_server() -> Result<(), ServerError> {
    pretty_env_logger::init_custom_env("RUST_LOG");

    let config = PipelineConfig::load(None)?;
    let state = web::Data::new(AppState::load(&config)?);

    let bind_addr = std::env::var("BIND_ADDR").unwrap_or_else(|_| "127.0.0.1".to_string());
    let port: u16 = std::env::var("PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(8080);

    log::info!("Starting server on {bind_addr}:{port}");

    HttpServer::new(move || {
        let cors = Cors::permissive();

        App::new()
            .wrap(cors)
            .wrap(middleware::Logger::default())
            .app_data(state.clone())
            .configure(routes)
    })
    .bind((bind_addr, port))?
    .run()
    .await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use actix_web::{http::StatusCode, test};
    use chrono::NaiveDateTime;
    use crime_dash_crime_models::CrimeCategory;
    use crime_dash_geography_models::GeoLayer;
    use crime_dash_incident_models::Incident;
    use serde_json::Value;

    use super::*;

    fn incident(id: i64, occurred_at: &str, primary_type: &str, fbi_code: &str) -> Incident {
        Incident {
            id,
            case_number: Some(format!("JF{id}")),
            occurred_at: NaiveDateTime::parse_from_str(occurred_at, "%Y-%m-%d %H:%M").unwrap(),
            primary_type: primary_type.to_string(),
            description: None,
            location_description: Some("STREET".to_string()),
            fbi_code: Some(fbi_code.to_string()),
            arrest: false,
            domestic: false,
            district: None,
            ward: None,
            community_area: None,
            beat: None,
            latitude: None,
            longitude: None,
            category: CrimeCategory::classify(primary_type, Some(fbi_code)),
        }
    }

    fn state() -> web::Data<AppState> {
        let mut located = incident(1, "2023-01-02 09:00", "THEFT", "06");
        located.latitude = Some(41.88);
        located.longitude = Some(-87.63);
        located.ward = Some(42);
        located.arrest = true;

        let table = GoldTable::new(vec![
            located,
            incident(2, "2023-01-04 21:00", "THEFT", "06"),
            incident(3, "2023-01-04 22:00", "BATTERY", "04B"),
            incident(4, "2022-12-30 12:00", "THEFT", "06"),
        ]);

        let mut references = ReferenceSet::new();
        references.insert(
            ReferenceLayer::from_geojson_str(
                GeoLayer::Ward,
                r#"{"type":"FeatureCollection","features":[
                    {"type":"Feature","properties":{"ward":42},"geometry":{"type":"Polygon","coordinates":[[[-87.7,41.8],[-87.6,41.8],[-87.6,41.9],[-87.7,41.8]]]}}
                ]}"#,
                "ward",
                None,
            )
            .unwrap(),
        );

        web::Data::new(AppState::new(table, references))
    }

    async fn get(uri: &str) -> (StatusCode, Value) {
        let app = test::init_service(App::new().app_data(state()).configure(routes)).await;
        let resp = test::call_service(&app, test::TestRequest::get().uri(uri).to_request()).await;
        let status = resp.status();
        let body: Value = test::read_body_json(resp).await;
        (status, body)
    }

    #[actix_web::test]
    async fn health_reports_table_size() {
        let (status, body) = get("/api/health").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["healthy"], true);
        assert_eq!(body["incidents"], 4);
    }

    #[actix_web::test]
    async fn counts_sum_to_subset_size() {
        let (status, body) = get(
            "/api/counts?groupBy=day&primaryTypes=theft&from=2023-01-01&to=2023-01-31",
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["total"], 2);
        let counts = body["counts"].as_array().unwrap();
        let sum: u64 = counts.iter().map(|c| c["count"].as_u64().unwrap()).sum();
        assert_eq!(sum, 2);
    }

    #[actix_web::test]
    async fn geo_counts_include_unknown() {
        let (_, body) = get("/api/counts?groupBy=ward").await;
        assert_eq!(body["counts"][0]["key"], "UNKNOWN");
        assert_eq!(body["counts"][0]["count"], 3);
        assert_eq!(body["counts"][1]["key"], "42");
    }

    #[actix_web::test]
    async fn invalid_filters_are_bad_requests() {
        for uri in [
            "/api/counts?groupBy=tract",
            "/api/counts",
            "/api/daily?from=2023-02-01&to=2023-01-01",
            "/api/stats?from=01/01/2023",
            "/api/rolling?windowDays=0",
            "/api/rolling?windowDays=1000000000",
            "/api/daily?from=0001-01-01&to=9999-12-31",
            "/api/rolling",
            "/api/incidents?wards=x",
            "/api/report?type=weekly",
        ] {
            let (status, body) = get(uri).await;
            assert_eq!(status, StatusCode::BAD_REQUEST, "{uri}");
            assert!(body["error"].is_string(), "{uri}");
        }
    }

    #[actix_web::test]
    async fn daily_is_zero_filled() {
        let (_, body) = get("/api/daily?from=2023-01-01&to=2023-01-05").await;
        let days = body["days"].as_array().unwrap();
        assert_eq!(days.len(), 5);
        let counts: Vec<u64> = days.iter().map(|d| d["count"].as_u64().unwrap()).collect();
        assert_eq!(counts, vec![0, 1, 0, 2, 0]);
    }

    #[actix_web::test]
    async fn rolling_and_delta() {
        let (_, body) = get("/api/rolling?windowDays=3&from=2023-01-01&to=2023-01-05").await;
        assert_eq!(body["points"].as_array().unwrap().len(), 5);

        let (_, body) = get("/api/delta?from=2023-01-01&to=2023-01-05").await;
        assert_eq!(body["currentCount"], 3);
        assert_eq!(body["priorCount"], 1);
        assert_eq!(body["delta"], 2);

        let (_, body) = get("/api/delta?from=2020-01-01&to=2020-01-31").await;
        assert_eq!(body["delta"], 0);
    }

    #[actix_web::test]
    async fn map_excludes_unlocated_rows() {
        let (_, body) = get("/api/map").await;
        assert_eq!(body["total"], 4);
        assert_eq!(body["points"].as_array().unwrap().len(), 1);
        assert_eq!(body["points"][0]["id"], 1);
    }

    #[actix_web::test]
    async fn incidents_are_paged() {
        let (_, body) = get("/api/incidents?limit=2&offset=1").await;
        assert_eq!(body["total"], 4);
        let items = body["items"].as_array().unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0]["id"], 2);
        assert_eq!(items[0]["category"], "PROPERTY");
    }

    #[actix_web::test]
    async fn report_defaults_to_last_table_date() {
        let (status, body) = get("/api/report?type=ytd").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["period"]["reportDate"], "2023-01-04");
        assert_eq!(body["current"]["totalCases"], 3);
        assert_eq!(body["prior"]["totalCases"], 0);
    }

    #[actix_web::test]
    async fn stats_and_categories() {
        let (_, body) = get("/api/stats?arrest=true").await;
        assert_eq!(body["totalCases"], 1);
        assert_eq!(body["arrestRate"], 100.0);

        let (_, body) = get("/api/categories").await;
        assert_eq!(body["categories"].as_array().unwrap().len(), 6);
    }

    #[actix_web::test]
    async fn reference_layers() {
        let (status, body) = get("/api/references/ward").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["type"], "FeatureCollection");
        assert_eq!(body["features"].as_array().unwrap().len(), 1);

        let (status, _) = get("/api/references/beat").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        let (status, _) = get("/api/references/tract").await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (_, body) = get("/api/references").await;
        assert_eq!(body[0]["layer"], "ward");
        assert_eq!(body[0]["areas"][0]["id"], 42);
    }
}
