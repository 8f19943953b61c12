//! Dataset container and the cumulative row store.

use std::collections::BTreeMap;

use ndarray::{Array1, Array2, ArrayView1, ArrayView2};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use super::record::HousingRecord;
use super::schema::FEATURE_COUNT;
use super::DataError;

/// In-memory tabular dataset.
///
/// Features are stored sample-major (`[n_samples, n_features]`) with one
/// target per sample.
#[derive(Debug, Clone)]
pub struct Dataset {
    features: Array2<f64>,
    targets: Array1<f64>,
}

impl Dataset {
    /// Create a dataset from matching feature and target arrays.
    ///
    /// # Errors
    ///
    /// Returns [`DataError::ShapeMismatch`] when the sample counts differ.
    pub fn new(features: Array2<f64>, targets: Array1<f64>) -> Result<Self, DataError> {
        if features.nrows() != targets.len() {
            return Err(DataError::ShapeMismatch {
                features: features.nrows(),
                targets: targets.len(),
            });
        }
        Ok(Self { features, targets })
    }

    /// Build a dataset from validated records.
    pub fn from_records(records: &[HousingRecord]) -> Self {
        let n = records.len();
        let mut features = Array2::zeros((n, FEATURE_COUNT));
        let mut targets = Array1::zeros(n);
        for (i, record) in records.iter().enumerate() {
            for (j, value) in record.features().iter().enumerate() {
                features[[i, j]] = *value;
            }
            targets[i] = record.price;
        }
        Self { features, targets }
    }

    /// Number of samples.
    #[inline]
    pub fn n_samples(&self) -> usize {
        self.features.nrows()
    }

    /// Number of features.
    #[inline]
    pub fn n_features(&self) -> usize {
        self.features.ncols()
    }

    /// Feature matrix view, `[n_samples, n_features]`.
    pub fn features(&self) -> ArrayView2<'_, f64> {
        self.features.view()
    }

    /// Target vector view.
    pub fn targets(&self) -> ArrayView1<'_, f64> {
        self.targets.view()
    }

    /// Deterministic shuffled train/holdout split.
    ///
    /// Returns `(train, None)` when `valid_fraction` is non-positive or the
    /// split would leave either side empty. The same `seed` and data always
    /// produce the same split.
    pub fn split(&self, valid_fraction: f64, seed: u64) -> (Dataset, Option<Dataset>) {
        let n = self.n_samples();
        let n_valid = (n as f64 * valid_fraction).round() as usize;
        if valid_fraction <= 0.0 || n_valid == 0 || n_valid >= n {
            return (self.clone(), None);
        }

        let mut indices: Vec<usize> = (0..n).collect();
        indices.shuffle(&mut StdRng::seed_from_u64(seed));

        let (valid_idx, train_idx) = indices.split_at(n_valid);
        (self.take(train_idx), Some(self.take(valid_idx)))
    }

    fn take(&self, indices: &[usize]) -> Dataset {
        let mut features = Array2::zeros((indices.len(), self.n_features()));
        let mut targets = Array1::zeros(indices.len());
        for (row, &idx) in indices.iter().enumerate() {
            features.row_mut(row).assign(&self.features.row(idx));
            targets[row] = self.targets[idx];
        }
        Dataset { features, targets }
    }
}

/// Cumulative dataset rows, keyed by source filename.
///
/// Keying by filename makes re-ingestion idempotent: loading a file that is
/// already present replaces its rows instead of appending duplicates, which
/// is what repairs a run that crashed between the model save and the ledger
/// commit.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RowStore {
    files: BTreeMap<String, Vec<HousingRecord>>,
}

impl RowStore {
    /// Empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert (or replace) the rows contributed by one source file.
    pub fn insert_file(&mut self, name: impl Into<String>, rows: Vec<HousingRecord>) {
        self.files.insert(name.into(), rows);
    }

    /// Number of source files represented.
    pub fn n_files(&self) -> usize {
        self.files.len()
    }

    /// Total row count across all files.
    pub fn n_rows(&self) -> usize {
        self.files.values().map(Vec::len).sum()
    }

    /// Iterate files in filename order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[HousingRecord])> {
        self.files.iter().map(|(name, rows)| (name.as_str(), rows.as_slice()))
    }

    /// Flatten into a single dataset, in filename order.
    pub fn to_dataset(&self) -> Dataset {
        let records: Vec<HousingRecord> =
            self.files.values().flatten().copied().collect();
        Dataset::from_records(&records)
    }
}
