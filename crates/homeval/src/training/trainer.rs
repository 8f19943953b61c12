//! The incremental trainer.
//!
//! Each run walks the state machine
//! `SCAN -> (NO_NEW_DATA | LOAD_DELTA -> FIT -> EVALUATE -> PERSIST)`.
//! A run that finds no new files touches nothing; a run that fails leaves
//! the previous artifacts in place. The ledger is committed last, after
//! every artifact save has succeeded.

use std::path::PathBuf;

use tracing::{info, warn};

use crate::data::{load_csv_file, Dataset, HousingRecord};
use crate::ledger::{DirectoryListing, FsDirectory, Ledger, LedgerError};
use crate::model::{FitError, LinearModel, ModelMeta, StandardScaler};
use crate::persist::{ArtifactStore, PersistError};

use super::metrics::{evaluate, RegressionReport};

/// Errors that abort a training run.
#[derive(Debug, thiserror::Error)]
pub enum TrainError {
    #[error(transparent)]
    Persist(#[from] PersistError),

    #[error(transparent)]
    Ledger(#[from] LedgerError),

    #[error("model fit failed: {0}")]
    Fit(#[from] FitError),
}

/// Configuration for a training run.
#[derive(Debug, Clone)]
pub struct TrainConfig {
    /// Directory holding incoming CSV data files.
    pub data_dir: PathBuf,
    /// Directory holding the ledger and model artifacts.
    pub state_dir: PathBuf,
    /// Fraction of the cumulative dataset held out for evaluation.
    /// Non-positive disables the split and reports in-sample metrics.
    pub valid_fraction: f64,
    /// Seed for the deterministic holdout shuffle.
    pub seed: u64,
}

impl TrainConfig {
    pub fn new(data_dir: impl Into<PathBuf>, state_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            state_dir: state_dir.into(),
            valid_fraction: 0.2,
            seed: 42,
        }
    }
}

/// Summary of a run that fitted a model.
#[derive(Debug, Clone)]
pub struct TrainReport {
    /// New files that contributed rows this run, sorted.
    pub ingested_files: Vec<String>,
    /// New files that were rejected wholesale (unreadable, bad header, or
    /// no valid rows).
    pub skipped_files: usize,
    /// Individual rows rejected across the ingested files.
    pub skipped_rows: usize,
    /// Rows added by this run.
    pub n_rows_delta: usize,
    /// Rows in the cumulative dataset the model was fitted against.
    pub n_rows_total: usize,
    /// Evaluation metrics for the new model.
    pub metrics: RegressionReport,
    /// True when metrics come from a holdout split rather than in-sample.
    pub holdout: bool,
    /// Training pass counter carried in the model metadata.
    pub n_updates: u32,
}

/// The result of one training run.
#[derive(Debug, Clone)]
pub enum RunOutcome {
    /// Nothing new in the data directory; no state was modified (aside
    /// from ledgering files that were rejected wholesale, if any).
    NoNewData { skipped_files: usize },
    /// A model was fitted and persisted.
    Trained(TrainReport),
}

/// Batch trainer over a directory of immutable CSV drops.
#[derive(Debug, Clone)]
pub struct IncrementalTrainer {
    config: TrainConfig,
}

impl IncrementalTrainer {
    pub fn new(config: TrainConfig) -> Self {
        Self { config }
    }

    /// Run one pass against the configured data directory.
    pub fn run(&self) -> Result<RunOutcome, TrainError> {
        let listing = FsDirectory::new(&self.config.data_dir);
        self.run_with_listing(&listing)
    }

    /// Run one pass against an injected directory listing.
    pub fn run_with_listing(
        &self,
        listing: &dyn DirectoryListing,
    ) -> Result<RunOutcome, TrainError> {
        let store = ArtifactStore::open(&self.config.state_dir)?;
        let ledger_path = store.ledger_path();
        let mut ledger = Ledger::load(&ledger_path);

        // SCAN
        let delta = ledger.diff(&listing.list()?);
        if delta.is_empty() {
            info!(known = ledger.len(), "no new data files");
            return Ok(RunOutcome::NoNewData { skipped_files: 0 });
        }
        info!(n_files = delta.len(), "found new data files");

        // LOAD_DELTA
        let mut ingested_files = Vec::new();
        let mut loaded: Vec<(String, Vec<HousingRecord>)> = Vec::new();
        let mut skipped_files = 0usize;
        let mut skipped_rows = 0usize;
        for name in &delta {
            let path = self.config.data_dir.join(name);
            match load_csv_file(&path) {
                Ok(load) if !load.records.is_empty() => {
                    skipped_rows += load.skipped_rows;
                    ingested_files.push(name.clone());
                    loaded.push((name.clone(), load.records));
                }
                Ok(load) => {
                    warn!(file = %name, "no valid rows, skipping file");
                    skipped_rows += load.skipped_rows;
                    skipped_files += 1;
                }
                Err(err) => {
                    warn!(file = %name, error = %err, "failed to load file, skipping");
                    skipped_files += 1;
                }
            }
        }

        // Rejected files still advance the ledger: the inputs are immutable,
        // so retrying them on every future run would never succeed.
        if loaded.is_empty() {
            ledger.extend(delta.into_iter());
            ledger.commit(&ledger_path)?;
            info!(skipped_files, "delta contained no usable rows");
            return Ok(RunOutcome::NoNewData { skipped_files });
        }

        // FIT
        let prior = store.load_pair()?;
        let mut rows = store.load_rows()?;
        let n_rows_delta: usize = loaded.iter().map(|(_, r)| r.len()).sum();
        for (name, records) in loaded {
            rows.insert_file(name, records);
        }

        let cumulative = rows.to_dataset();
        let scaler = match &prior {
            Some((_, _, scaler)) => scaler.clone(),
            None => {
                // First pass: fit the scaler on the delta's feature columns.
                // It is never refitted afterwards.
                let delta_records: Vec<HousingRecord> = rows
                    .iter()
                    .filter(|&(name, _)| ingested_files.iter().any(|f| f.as_str() == name))
                    .flat_map(|(_, records)| records.iter().copied())
                    .collect();
                StandardScaler::fit(Dataset::from_records(&delta_records).features())?
            }
        };

        let (train, valid) = cumulative.split(self.config.valid_fraction, self.config.seed);
        let scaled_train = scaler.transform(train.features());
        let model = LinearModel::fit(scaled_train.view(), train.targets())?;

        // EVALUATE
        let (metrics, holdout) = match &valid {
            Some(valid) => (
                evaluate(&model, &scaler, valid.features(), valid.targets()),
                true,
            ),
            None => (
                evaluate(&model, &scaler, train.features(), train.targets()),
                false,
            ),
        };

        let n_rows_total = cumulative.n_samples();
        let meta = match &prior {
            Some((_, meta, _)) => meta.next_update(n_rows_total as u64),
            None => ModelMeta::for_housing(n_rows_total as u64),
        };

        info!(
            n_rows_delta,
            n_rows_total,
            n_updates = meta.n_updates,
            %metrics,
            "fitted model"
        );

        // PERSIST: every artifact atomically, the ledger strictly last.
        store.save_rows(&rows)?;
        store.save_scaler(&scaler)?;
        store.save_model(&model, &meta)?;
        ledger.extend(delta.into_iter());
        ledger.commit(&ledger_path)?;

        Ok(RunOutcome::Trained(TrainReport {
            ingested_files,
            skipped_files,
            skipped_rows,
            n_rows_delta,
            n_rows_total,
            metrics,
            holdout,
            n_updates: meta.n_updates,
        }))
    }
}
