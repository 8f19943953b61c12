//! Regression metrics.
//!
//! All metrics accumulate in `f64` and are total functions over well-formed
//! numeric input: degenerate cases return `0.0` (empty input) or `NaN`
//! (undefined `r2`), never a panic.

use ndarray::{ArrayView1, ArrayView2};

use crate::model::{LinearModel, StandardScaler};

/// Mean squared error: `mean((pred - target)²)`.
///
/// Returns `0.0` for empty input.
pub fn mean_squared_error(predictions: ArrayView1<'_, f64>, targets: ArrayView1<'_, f64>) -> f64 {
    debug_assert_eq!(predictions.len(), targets.len());
    let n = predictions.len();
    if n == 0 {
        return 0.0;
    }
    predictions
        .iter()
        .zip(targets.iter())
        .map(|(p, t)| (p - t) * (p - t))
        .sum::<f64>()
        / n as f64
}

/// Mean absolute error: `mean(|pred - target|)`.
///
/// Returns `0.0` for empty input.
pub fn mean_absolute_error(predictions: ArrayView1<'_, f64>, targets: ArrayView1<'_, f64>) -> f64 {
    debug_assert_eq!(predictions.len(), targets.len());
    let n = predictions.len();
    if n == 0 {
        return 0.0;
    }
    predictions
        .iter()
        .zip(targets.iter())
        .map(|(p, t)| (p - t).abs())
        .sum::<f64>()
        / n as f64
}

/// Coefficient of determination: `1 - ss_res / ss_tot`.
///
/// Returns `NaN` when the targets are constant (`ss_tot == 0`), where the
/// score is undefined.
pub fn r2_score(predictions: ArrayView1<'_, f64>, targets: ArrayView1<'_, f64>) -> f64 {
    debug_assert_eq!(predictions.len(), targets.len());
    let n = targets.len();
    if n == 0 {
        return f64::NAN;
    }

    let mean = targets.iter().sum::<f64>() / n as f64;
    let ss_tot = targets.iter().map(|t| (t - mean) * (t - mean)).sum::<f64>();
    let ss_res = predictions
        .iter()
        .zip(targets.iter())
        .map(|(p, t)| (p - t) * (p - t))
        .sum::<f64>();

    if ss_tot == 0.0 {
        f64::NAN
    } else {
        1.0 - ss_res / ss_tot
    }
}

/// Computed regression metrics for one evaluation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RegressionReport {
    pub mse: f64,
    pub mae: f64,
    pub r2: f64,
}

impl std::fmt::Display for RegressionReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "mse: {:.6}, mae: {:.6}, r2: {:.6}",
            self.mse, self.mae, self.r2
        )
    }
}

/// Evaluate a model/scaler pair against raw (unscaled) holdout data.
pub fn evaluate(
    model: &LinearModel,
    scaler: &StandardScaler,
    features: ArrayView2<'_, f64>,
    targets: ArrayView1<'_, f64>,
) -> RegressionReport {
    let scaled = scaler.transform(features);
    let predictions = model.predict_batch(scaled.view());
    RegressionReport {
        mse: mean_squared_error(predictions.view(), targets),
        mae: mean_absolute_error(predictions.view(), targets),
        r2: r2_score(predictions.view(), targets),
    }
}
