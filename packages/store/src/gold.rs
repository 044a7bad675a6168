//! The gold table: normalized incidents as a CSV file.
//!
//! Rows are written in the order given (the ingest pipeline sorts them by
//! `(id, occurred_at)`). The header row is always present, so an empty
//! table is still a valid file.

use std::{
    fs::File,
    io::{BufWriter, Read, Write},
    path::Path,
};

use chrono::NaiveDate;
use crime_dash_incident_models::Incident;

use crate::{StoreError, paths::ensure_dir};

/// Column order of the gold CSV. Matches the serialized field names of
/// [`Incident`].
pub const GOLD_COLUMNS: &[&str] = &[
    "id",
    "caseNumber",
    "occurredAt",
    "primaryType",
    "description",
    "locationDescription",
    "fbiCode",
    "arrest",
    "domestic",
    "district",
    "ward",
    "communityArea",
    "beat",
    "latitude",
    "longitude",
    "category",
];

/// The loaded gold table. Read-only once built.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GoldTable {
    incidents: Vec<Incident>,
}

impl GoldTable {
    #[must_use]
    pub const fn new(incidents: Vec<Incident>) -> Self {
        Self { incidents }
    }

    #[must_use]
    pub fn incidents(&self) -> &[Incident] {
        &self.incidents
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.incidents.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.incidents.is_empty()
    }

    /// Earliest and latest incident dates.
    #[must_use]
    pub fn date_span(&self) -> Option<(NaiveDate, NaiveDate)> {
        let mut dates = self.incidents.iter().map(Incident::date);
        let first = dates.next()?;
        Some(dates.fold((first, first), |(lo, hi), d| (lo.min(d), hi.max(d))))
    }
}

impl From<Vec<Incident>> for GoldTable {
    fn from(incidents: Vec<Incident>) -> Self {
        Self::new(incidents)
    }
}

/// Serializes `incidents` as gold CSV into `writer`.
///
/// # Errors
///
/// Returns [`StoreError::Csv`] or [`StoreError::Io`] if writing fails.
pub fn write_gold_to<W: Write>(writer: W, incidents: &[Incident]) -> Result<(), StoreError> {
    let mut csv = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(writer);

    csv.write_record(GOLD_COLUMNS)?;
    for incident in incidents {
        csv.serialize(incident)?;
    }
    csv.flush()?;
    Ok(())
}

/// Writes the gold table to `path`.
///
/// The data goes to a sibling temp file first and is renamed into place, so
/// readers never see a half-written table.
///
/// # Errors
///
/// Returns [`StoreError`] if the directory, temp file or rename fails.
pub fn write_gold_table(path: &Path, incidents: &[Incident]) -> Result<(), StoreError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        ensure_dir(parent)?;
    }

    let mut tmp_name = path.file_name().unwrap_or_default().to_os_string();
    tmp_name.push(".tmp");
    let tmp_path = path.with_file_name(tmp_name);

    {
        let mut writer = BufWriter::new(File::create(&tmp_path)?);
        write_gold_to(&mut writer, incidents)?;
        writer.flush()?;
    }

    std::fs::rename(&tmp_path, path)?;

    log::info!(
        "Wrote {} incidents to {}",
        incidents.len(),
        path.display()
    );

    Ok(())
}

/// Parses gold CSV from `reader`.
///
/// # Errors
///
/// Returns [`StoreError::Csv`] if a record does not match the gold schema.
pub fn read_gold_from<R: Read>(reader: R) -> Result<GoldTable, StoreError> {
    let mut csv = csv::Reader::from_reader(reader);
    let incidents = csv
        .deserialize::<Incident>()
        .collect::<Result<Vec<_>, _>>()?;
    Ok(GoldTable::new(incidents))
}

/// Loads the gold table from `path`.
///
/// # Errors
///
/// * [`StoreError::MissingFile`] if `path` does not exist
/// * [`StoreError::Csv`] if the file is not valid gold CSV
pub fn load_gold_table(path: &Path) -> Result<GoldTable, StoreError> {
    if !path.is_file() {
        return Err(StoreError::MissingFile {
            path: path.to_path_buf(),
        });
    }

    let table = read_gold_from(File::open(path)?)?;
    log::info!(
        "Loaded {} incidents from {}",
        table.len(),
        path.display()
    );
    Ok(table)
}
