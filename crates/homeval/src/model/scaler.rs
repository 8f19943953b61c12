//! Feature standardization.

use ndarray::{Array1, Array2, ArrayView2, Axis};

use super::FitError;

/// Per-feature standardization to zero mean and unit variance.
///
/// The scaler is fitted once, on the first batch of training data, and its
/// parameters are reused verbatim for every later transform. Refitting on
/// each increment would shift the feature space under a model trained on
/// the old statistics.
#[derive(Debug, Clone, PartialEq)]
pub struct StandardScaler {
    means: Array1<f64>,
    scales: Array1<f64>,
}

impl StandardScaler {
    /// Fit on a feature matrix, `[n_samples, n_features]`.
    ///
    /// Features with zero variance get a unit scale so that transforming
    /// them is the identity shift rather than a division by zero.
    ///
    /// # Errors
    ///
    /// Returns [`FitError::EmptyInput`] for a zero-row matrix.
    pub fn fit(features: ArrayView2<'_, f64>) -> Result<Self, FitError> {
        let n = features.nrows();
        if n == 0 {
            return Err(FitError::EmptyInput);
        }

        let means = features.mean_axis(Axis(0)).expect("n_samples > 0");
        let mut scales = Array1::zeros(features.ncols());
        for (j, column) in features.axis_iter(Axis(1)).enumerate() {
            let mean = means[j];
            let variance =
                column.iter().map(|v| (v - mean) * (v - mean)).sum::<f64>() / n as f64;
            let std = variance.sqrt();
            scales[j] = if std > f64::EPSILON { std } else { 1.0 };
        }

        Ok(Self { means, scales })
    }

    /// Rebuild from persisted parameters.
    pub fn from_parameters(means: Vec<f64>, scales: Vec<f64>) -> Self {
        debug_assert_eq!(means.len(), scales.len());
        Self {
            means: Array1::from_vec(means),
            scales: Array1::from_vec(scales),
        }
    }

    /// Number of features the scaler was fitted on.
    pub fn n_features(&self) -> usize {
        self.means.len()
    }

    /// Fitted per-feature means.
    pub fn means(&self) -> &[f64] {
        self.means.as_slice().expect("contiguous")
    }

    /// Fitted per-feature scales (standard deviations, or 1.0 for constant features).
    pub fn scales(&self) -> &[f64] {
        self.scales.as_slice().expect("contiguous")
    }

    /// Transform a feature matrix, `[n_samples, n_features]`.
    pub fn transform(&self, features: ArrayView2<'_, f64>) -> Array2<f64> {
        debug_assert_eq!(features.ncols(), self.n_features());
        let mut out = features.to_owned();
        for mut row in out.rows_mut() {
            for j in 0..row.len() {
                row[j] = (row[j] - self.means[j]) / self.scales[j];
            }
        }
        out
    }

    /// Transform a single feature row.
    pub fn transform_row(&self, row: &[f64]) -> Vec<f64> {
        debug_assert_eq!(row.len(), self.n_features());
        row.iter()
            .enumerate()
            .map(|(j, v)| (v - self.means[j]) / self.scales[j])
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ndarray::array;

    #[test]
    fn fit_centers_and_scales() {
        let features = array![[1.0, 10.0], [3.0, 30.0]];
        let scaler = StandardScaler::fit(features.view()).unwrap();

        assert_abs_diff_eq!(scaler.means()[0], 2.0, epsilon = 1e-12);
        assert_abs_diff_eq!(scaler.scales()[0], 1.0, epsilon = 1e-12);

        let scaled = scaler.transform(features.view());
        assert_abs_diff_eq!(scaled[[0, 0]], -1.0, epsilon = 1e-12);
        assert_abs_diff_eq!(scaled[[1, 0]], 1.0, epsilon = 1e-12);
        assert_abs_diff_eq!(scaled[[0, 1]], -1.0, epsilon = 1e-12);
    }

    #[test]
    fn constant_feature_gets_unit_scale() {
        let features = array![[5.0, 1.0], [5.0, 2.0], [5.0, 3.0]];
        let scaler = StandardScaler::fit(features.view()).unwrap();

        assert_eq!(scaler.scales()[0], 1.0);
        let scaled = scaler.transform(features.view());
        assert_abs_diff_eq!(scaled[[0, 0]], 0.0, epsilon = 1e-12);
        assert!(scaled.iter().all(|v| v.is_finite()));
    }

    #[test]
    fn transform_is_stable_across_calls() {
        let features = array![[1.0, 10.0], [3.0, 30.0], [2.0, 25.0]];
        let scaler = StandardScaler::fit(features.view()).unwrap();

        let row = [2.5, 17.0];
        let first = scaler.transform_row(&row);
        let second = scaler.transform_row(&row);
        assert_eq!(first, second);
    }

    #[test]
    fn roundtrips_through_parameters() {
        let features = array![[1.0, 10.0], [3.0, 30.0]];
        let scaler = StandardScaler::fit(features.view()).unwrap();

        let rebuilt = StandardScaler::from_parameters(
            scaler.means().to_vec(),
            scaler.scales().to_vec(),
        );
        assert_eq!(scaler, rebuilt);
    }

    #[test]
    fn empty_input_is_an_error() {
        let features = Array2::<f64>::zeros((0, 5));
        assert!(matches!(
            StandardScaler::fit(features.view()),
            Err(FitError::EmptyInput)
        ));
    }
}
