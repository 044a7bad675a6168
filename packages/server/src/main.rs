#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Actix-Web API server for the crime dashboard.
//!
//! Reads the gold table produced by `crime_dash_ingest` and serves the
//! filter and aggregation endpoints under `/api`.

#[actix_web::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    crime_dash_server::run_server().await?;
    Ok(())
}
