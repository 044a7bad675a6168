#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Raw incident CSV to gold table.
//!
//! [`normalize_reader`] does all the work in memory: header normalization,
//! per-row coercion, reference validation, sorting and de-duplication.
//! [`run`] wires it to the configured files. Bad rows never abort a run;
//! they are dropped and counted in the [`IngestReport`].

pub mod normalize;
pub mod parsing;

use std::io::Read;

use crime_dash_geography::{GeoError, ReferenceSet};
use crime_dash_incident_models::{Incident, RawIncidentRow};
use crime_dash_ingest_models::{IngestReport, MalformedReason, progress::ProgressCallback};
use crime_dash_store::{PipelineConfig, StoreError};

/// Columns every raw CSV must have (after header normalization).
pub const REQUIRED_COLUMNS: &[&str] = &["id", "date", "primary_type"];

/// Errors that abort an ingest run.
#[derive(Debug, thiserror::Error)]
pub enum IngestError {
    /// The raw CSV lacks a required column.
    #[error("Missing required column '{column}'")]
    MissingColumn {
        /// Normalized column name.
        column: String,
    },

    /// The raw CSV could not be read at all.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Reading config or writing the gold table failed.
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// A reference layer could not be loaded.
    #[error("Reference error: {0}")]
    Geo(#[from] GeoError),
}

/// Output of [`normalize_reader`].
#[derive(Debug, Clone, PartialEq)]
pub struct Normalized {
    /// Gold rows, sorted by `(id, occurred_at)` and unique by id.
    pub incidents: Vec<Incident>,
    pub report: IngestReport,
}

/// Normalizes a raw incident CSV.
///
/// # Errors
///
/// * [`IngestError::MissingColumn`] if a required column is absent
/// * [`IngestError::Csv`] if the header cannot be read or the underlying
///   reader fails
pub fn normalize_reader<R: Read>(
    reader: R,
    references: &ReferenceSet,
    progress: &dyn ProgressCallback,
) -> Result<Normalized, IngestError> {
    let mut csv = csv::ReaderBuilder::new().flexible(false).from_reader(reader);

    let headers: csv::StringRecord = csv
        .headers()?
        .iter()
        .map(parsing::normalize_header)
        .collect();

    for &column in REQUIRED_COLUMNS {
        if !headers.iter().any(|h| h == column) {
            return Err(IngestError::MissingColumn {
                column: column.to_string(),
            });
        }
    }

    let mut report = IngestReport::default();
    let mut incidents = Vec::new();

    progress.set_message("Normalizing incidents".to_string());

    for record in csv.records() {
        report.rows_read += 1;
        progress.inc(1);

        let record = match record {
            Ok(record) => record,
            Err(e) if e.is_io_error() => return Err(e.into()),
            Err(e) => {
                log::debug!("Skipping unreadable record: {e}");
                report.record_malformed(MalformedReason::Record);
                continue;
            }
        };

        let raw: RawIncidentRow = match record.deserialize(Some(&headers)) {
            Ok(raw) => raw,
            Err(e) => {
                log::debug!("Skipping undecodable record: {e}");
                report.record_malformed(MalformedReason::Record);
                continue;
            }
        };

        match normalize::normalize_row(&raw, references, &mut report) {
            Ok(incident) => incidents.push(incident),
            Err(reason) => {
                log::debug!(
                    "Dropping row {} ({reason})",
                    raw.id.as_deref().unwrap_or("<no id>")
                );
                report.record_malformed(reason);
            }
        }
    }

    // Stable sort, so rows equal on both keys keep input order.
    incidents.sort_by(|a, b| (a.id, a.occurred_at).cmp(&(b.id, b.occurred_at)));
    let before = incidents.len();
    incidents.dedup_by_key(|i| i.id);
    report.duplicates = (before - incidents.len()) as u64;
    report.rows_written = incidents.len() as u64;

    progress.finish(format!(
        "Normalized {} of {} rows",
        report.rows_written, report.rows_read
    ));

    Ok(Normalized { incidents, report })
}

/// Runs a full ingest: load references, normalize the raw CSV, write the
/// gold table.
///
/// # Errors
///
/// Returns [`IngestError`] if a reference file or the raw CSV is missing or
/// unreadable, a required column is absent, or the gold table cannot be
/// written.
pub fn run(
    config: &PipelineConfig,
    progress: &dyn ProgressCallback,
) -> Result<IngestReport, IngestError> {
    let references = ReferenceSet::load(&config.references)?;

    if !config.raw_csv.is_file() {
        return Err(StoreError::MissingFile {
            path: config.raw_csv.clone(),
        }
        .into());
    }

    let bytes = std::fs::read(&config.raw_csv).map_err(StoreError::from)?;
    log::info!(
        "Reading {} ({} bytes)",
        config.raw_csv.display(),
        bytes.len()
    );

    // Line count approximates the row count; quoted newlines only skew the bar.
    let lines = bytecount_newlines(&bytes);
    progress.set_total(lines.saturating_sub(1));

    let Normalized { incidents, report } =
        normalize_reader(bytes.as_slice(), &references, progress)?;

    crime_dash_store::write_gold_table(&config.gold_table, &incidents)?;

    log_report(&report);
    Ok(report)
}

fn bytecount_newlines(bytes: &[u8]) -> u64 {
    bytes.iter().filter(|&&b| b == b'\n').count() as u64
}

/// Logs the counters of a finished run.
pub fn log_report(report: &IngestReport) {
    log::info!(
        "Ingest complete: {} rows read, {} written, {} malformed, {} duplicates",
        report.rows_read,
        report.rows_written,
        report.malformed_total(),
        report.duplicates
    );
    for (reason, count) in &report.malformed {
        log::warn!("  dropped {count} rows: {reason}");
    }
    for (layer, count) in &report.nulled_geo_codes {
        log::warn!("  nulled {count} {layer} codes");
    }
    if report.nulled_coordinates > 0 {
        log::warn!("  nulled {} coordinate pairs", report.nulled_coordinates);
    }
}
