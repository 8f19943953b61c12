//! CSV file loading.
//!
//! Each data file is read with a header check up front; individual rows
//! that fail to parse, or that carry non-finite values, are skipped and
//! counted rather than failing the file.

use std::path::Path;

use tracing::warn;

use super::record::HousingRecord;
use super::schema::required_columns;
use super::DataError;

/// The result of loading one data file.
#[derive(Debug, Clone)]
pub struct FileLoad {
    /// Rows that passed validation.
    pub records: Vec<HousingRecord>,
    /// Rows rejected for parse errors or non-finite values.
    pub skipped_rows: usize,
}

/// Load and validate a single CSV data file.
///
/// # Errors
///
/// Returns [`DataError`] when the file cannot be opened or its header is
/// missing a required column. Malformed rows are not errors: they are
/// skipped and counted in [`FileLoad::skipped_rows`].
pub fn load_csv_file(path: &Path) -> Result<FileLoad, DataError> {
    let mut reader = csv::Reader::from_path(path).map_err(|source| DataError::Csv {
        path: path.to_path_buf(),
        source,
    })?;

    let headers = reader
        .headers()
        .map_err(|source| DataError::Csv {
            path: path.to_path_buf(),
            source,
        })?
        .clone();

    for column in required_columns() {
        if !headers.iter().any(|h| h == column) {
            return Err(DataError::MissingColumn {
                path: path.to_path_buf(),
                column,
            });
        }
    }

    let mut records = Vec::new();
    let mut skipped_rows = 0usize;

    for (idx, row) in reader.deserialize::<HousingRecord>().enumerate() {
        match row {
            Ok(record) if record.is_finite() => records.push(record),
            Ok(_) => {
                warn!(path = %path.display(), row = idx + 1, "skipping row with non-finite value");
                skipped_rows += 1;
            }
            Err(err) => {
                warn!(path = %path.display(), row = idx + 1, error = %err, "skipping malformed row");
                skipped_rows += 1;
            }
        }
    }

    Ok(FileLoad {
        records,
        skipped_rows,
    })
}
