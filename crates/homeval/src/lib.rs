//! homeval: incremental housing-price regression.
//!
//! Fits a linear model predicting real-estate prices from five area-level
//! features, retrains incrementally as new CSV files are dropped into a
//! data directory, and serves predictions over HTTP.
//!
//! # Key Types
//!
//! - [`IncrementalTrainer`] / [`TrainConfig`] - one training pass over the
//!   data directory: scan, load the delta, fit, evaluate, persist
//! - [`Ledger`] - which files have already been ingested
//! - [`LinearModel`] / [`StandardScaler`] - the fitted artifacts
//! - [`ArtifactStore`] - atomic artifact persistence
//! - [`serve::router`] - the prediction HTTP service
//!
//! # Pipeline
//!
//! Each run diffs the data directory against the ledger, parses only the
//! new files, merges their rows into the persisted cumulative dataset,
//! refits the model, and commits the ledger last. Running with no new
//! files is a no-op.

pub mod data;
pub mod ledger;
pub mod model;
pub mod persist;
pub mod serve;
pub mod testing;
pub mod training;

// High-level re-exports
pub use data::{Dataset, HousingRecord, RowStore};
pub use ledger::{DirectoryListing, FsDirectory, Ledger, StaticListing};
pub use model::{LinearModel, ModelMeta, StandardScaler};
pub use persist::ArtifactStore;
pub use training::{
    IncrementalTrainer, RegressionReport, RunOutcome, TrainConfig, TrainReport,
};
