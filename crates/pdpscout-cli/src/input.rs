//! Identifier input: a CSV file with an `EAN` column.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use thiserror::Error;

pub(crate) const IDENTIFIER_COLUMN: &str = "EAN";

#[derive(Debug, Error)]
pub enum InputError {
    #[error("failed to open {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("no 'EAN' column in header (found: {found})")]
    MissingColumn { found: String },

    #[error("input has a header but no data rows")]
    Empty,
}

/// Read the raw identifier cells of `path`, in file order.
pub(crate) fn read_identifiers_from_path(path: &Path) -> Result<Vec<String>, InputError> {
    let file = File::open(path).map_err(|source| InputError::Io {
        path: path.display().to_string(),
        source,
    })?;
    read_identifiers(file)
}

/// Read the `EAN` column (header match is trimmed and case-insensitive).
///
/// Cells are returned raw; blank cells are kept so output rows line up with
/// input rows. A sheet without data rows is rejected.
pub(crate) fn read_identifiers<R: Read>(reader: R) -> Result<Vec<String>, InputError> {
    let mut reader = csv::ReaderBuilder::new().flexible(true).from_reader(reader);
    let headers = reader.headers()?.clone();

    let column = headers
        .iter()
        .position(|h| h.trim().eq_ignore_ascii_case(IDENTIFIER_COLUMN))
        .ok_or_else(|| InputError::MissingColumn {
            found: headers.iter().collect::<Vec<_>>().join(", "),
        })?;

    let mut identifiers = Vec::new();
    for record in reader.records() {
        let record = record?;
        identifiers.push(record.get(column).unwrap_or_default().to_string());
    }
    if identifiers.is_empty() {
        return Err(InputError::Empty);
    }
    Ok(identifiers)
}
