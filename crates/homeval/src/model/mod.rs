//! Model types: the OLS linear model, the feature scaler, and metadata.

mod linear;
mod meta;
mod scaler;

pub use linear::LinearModel;
pub use meta::ModelMeta;
pub use scaler::StandardScaler;

/// Errors raised while fitting the model or scaler.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FitError {
    /// No samples to fit on.
    #[error("cannot fit on an empty dataset")]
    EmptyInput,

    /// Targets and features disagree on sample count.
    #[error("sample count mismatch: expected {expected}, got {got}")]
    ShapeMismatch { expected: usize, got: usize },

    /// The normal equations have no unique solution.
    #[error("normal equations are singular; features may be collinear or too few")]
    Singular,
}
