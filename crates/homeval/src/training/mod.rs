//! Training: the incremental trainer and regression metrics.

mod metrics;
mod trainer;

pub use metrics::{
    evaluate, mean_absolute_error, mean_squared_error, r2_score, RegressionReport,
};
pub use trainer::{IncrementalTrainer, RunOutcome, TrainConfig, TrainError, TrainReport};
