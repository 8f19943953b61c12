//! Tabular data handling: schema, CSV ingestion, and dataset containers.
//!
//! # Overview
//!
//! Input files are CSV with a fixed header ([`schema`]). Loading validates
//! the header up front and rejects individual bad rows without failing the
//! file ([`load_csv_file`]). Validated rows accumulate in a [`RowStore`]
//! keyed by source filename and flatten into a [`Dataset`] for training.

mod csv;
mod dataset;
mod record;
pub mod schema;

use std::path::PathBuf;

pub use csv::{load_csv_file, FileLoad};
pub use dataset::{Dataset, RowStore};
pub use record::HousingRecord;

/// Errors raised while reading or assembling tabular data.
#[derive(Debug, thiserror::Error)]
pub enum DataError {
    /// The file could not be read or parsed at the CSV level.
    #[error("failed to read {path}: {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: ::csv::Error,
    },

    /// The header is missing a required column.
    #[error("{path}: missing required column `{column}`")]
    MissingColumn { path: PathBuf, column: &'static str },

    /// Feature and target arrays disagree on sample count.
    #[error("sample count mismatch: {features} feature rows vs {targets} targets")]
    ShapeMismatch { features: usize, targets: usize },
}
