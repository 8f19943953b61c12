//! Ordinary least squares linear regression.

use ndarray::{Array1, ArrayView1, ArrayView2};

use super::FitError;

/// A fitted linear model: one weight per feature plus an intercept.
#[derive(Debug, Clone, PartialEq)]
pub struct LinearModel {
    weights: Array1<f64>,
    intercept: f64,
}

impl LinearModel {
    /// Build from explicit parameters (used when loading a persisted model).
    pub fn from_parameters(weights: Vec<f64>, intercept: f64) -> Self {
        Self {
            weights: Array1::from_vec(weights),
            intercept,
        }
    }

    /// Fit by ordinary least squares, minimizing the sum of squared
    /// residuals over `[n_samples, n_features]` features and their targets.
    ///
    /// Solves the normal equations with Gaussian elimination; the system is
    /// `(n_features + 1)²`, so direct elimination is plenty.
    ///
    /// # Errors
    ///
    /// - [`FitError::EmptyInput`] for a zero-row matrix.
    /// - [`FitError::ShapeMismatch`] when targets and features disagree.
    /// - [`FitError::Singular`] when the normal system has no unique
    ///   solution (collinear or too few samples).
    pub fn fit(
        features: ArrayView2<'_, f64>,
        targets: ArrayView1<'_, f64>,
    ) -> Result<Self, FitError> {
        let n_samples = features.nrows();
        let n_features = features.ncols();
        if n_samples == 0 {
            return Err(FitError::EmptyInput);
        }
        if targets.len() != n_samples {
            return Err(FitError::ShapeMismatch {
                expected: n_samples,
                got: targets.len(),
            });
        }

        // Normal equations over the design matrix [X | 1]: the Gram matrix
        // is (d+1)x(d+1) with the intercept as the final column.
        let d = n_features + 1;
        let mut gram = vec![0.0f64; d * d];
        let mut rhs = vec![0.0f64; d];

        for (row, &y) in features.rows().into_iter().zip(targets.iter()) {
            for j in 0..n_features {
                let xj = row[j];
                for k in j..n_features {
                    gram[j * d + k] += xj * row[k];
                }
                gram[j * d + n_features] += xj;
                rhs[j] += xj * y;
            }
            gram[n_features * d + n_features] += 1.0;
            rhs[n_features] += y;
        }

        // Mirror the upper triangle.
        for j in 0..d {
            for k in (j + 1)..d {
                gram[k * d + j] = gram[j * d + k];
            }
        }

        let solution = solve_symmetric(&mut gram, &mut rhs, d)?;
        let intercept = solution[n_features];
        let weights = Array1::from_iter(solution[..n_features].iter().copied());

        Ok(Self { weights, intercept })
    }

    /// Number of input features.
    pub fn n_features(&self) -> usize {
        self.weights.len()
    }

    /// Fitted weights, one per feature.
    pub fn weights(&self) -> &[f64] {
        self.weights.as_slice().expect("contiguous")
    }

    /// Fitted intercept.
    pub fn intercept(&self) -> f64 {
        self.intercept
    }

    /// Predict for a single (already scaled) feature row.
    pub fn predict_row(&self, features: &[f64]) -> f64 {
        debug_assert_eq!(features.len(), self.n_features());
        self.weights
            .iter()
            .zip(features.iter())
            .map(|(w, x)| w * x)
            .sum::<f64>()
            + self.intercept
    }

    /// Predict for a batch of (already scaled) feature rows.
    pub fn predict_batch(&self, features: ArrayView2<'_, f64>) -> Array1<f64> {
        debug_assert_eq!(features.ncols(), self.n_features());
        let mut out = Array1::zeros(features.nrows());
        for (i, row) in features.rows().into_iter().enumerate() {
            out[i] = self
                .weights
                .iter()
                .zip(row.iter())
                .map(|(w, x)| w * x)
                .sum::<f64>()
                + self.intercept;
        }
        out
    }
}

/// Solve `A x = b` in place for a small dense system by Gaussian
/// elimination with partial pivoting. `a` is row-major `n x n`.
fn solve_symmetric(a: &mut [f64], b: &mut [f64], n: usize) -> Result<Vec<f64>, FitError> {
    for col in 0..n {
        // Pivot on the largest remaining entry in this column.
        let mut pivot_row = col;
        let mut pivot_mag = a[col * n + col].abs();
        for row in (col + 1)..n {
            let mag = a[row * n + col].abs();
            if mag > pivot_mag {
                pivot_row = row;
                pivot_mag = mag;
            }
        }
        if pivot_mag < 1e-10 {
            return Err(FitError::Singular);
        }
        if pivot_row != col {
            for k in 0..n {
                a.swap(col * n + k, pivot_row * n + k);
            }
            b.swap(col, pivot_row);
        }

        let pivot = a[col * n + col];
        for row in (col + 1)..n {
            let factor = a[row * n + col] / pivot;
            if factor == 0.0 {
                continue;
            }
            for k in col..n {
                a[row * n + k] -= factor * a[col * n + k];
            }
            b[row] -= factor * b[col];
        }
    }

    let mut x = vec![0.0f64; n];
    for col in (0..n).rev() {
        let mut sum = b[col];
        for k in (col + 1)..n {
            sum -= a[col * n + k] * x[k];
        }
        x[col] = sum / a[col * n + col];
    }
    Ok(x)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ndarray::array;

    #[test]
    fn recovers_exact_line() {
        // y = 2*x + 1
        let features = array![[1.0], [2.0], [3.0], [4.0]];
        let targets = array![3.0, 5.0, 7.0, 9.0];

        let model = LinearModel::fit(features.view(), targets.view()).unwrap();
        assert_abs_diff_eq!(model.weights()[0], 2.0, epsilon = 1e-9);
        assert_abs_diff_eq!(model.intercept(), 1.0, epsilon = 1e-9);
        assert_abs_diff_eq!(model.predict_row(&[10.0]), 21.0, epsilon = 1e-9);
    }

    #[test]
    fn recovers_multifeature_plane() {
        // y = 0.5*x0 + 0.3*x1 + 0.1
        let features = array![
            [1.0, 1.0],
            [2.0, 1.0],
            [1.0, 2.0],
            [3.0, 4.0],
            [0.0, 2.0],
        ];
        let targets = features
            .rows()
            .into_iter()
            .map(|r| 0.5 * r[0] + 0.3 * r[1] + 0.1)
            .collect::<Array1<f64>>();

        let model = LinearModel::fit(features.view(), targets.view()).unwrap();
        assert_abs_diff_eq!(model.weights()[0], 0.5, epsilon = 1e-9);
        assert_abs_diff_eq!(model.weights()[1], 0.3, epsilon = 1e-9);
        assert_abs_diff_eq!(model.intercept(), 0.1, epsilon = 1e-9);
    }

    #[test]
    fn least_squares_beats_any_other_line() {
        // Noisy data: the OLS residual sum must not exceed a perturbed line's.
        let features = array![[0.0], [1.0], [2.0], [3.0]];
        let targets = array![0.1, 0.9, 2.2, 2.8];
        let model = LinearModel::fit(features.view(), targets.view()).unwrap();

        let rss = |w: f64, b: f64| -> f64 {
            features
                .rows()
                .into_iter()
                .zip(targets.iter())
                .map(|(r, &y)| (w * r[0] + b - y).powi(2))
                .sum()
        };

        let best = rss(model.weights()[0], model.intercept());
        assert!(best <= rss(model.weights()[0] + 0.05, model.intercept()) + 1e-12);
        assert!(best <= rss(model.weights()[0], model.intercept() - 0.05) + 1e-12);
    }

    #[test]
    fn collinear_features_are_singular() {
        // Second column is exactly twice the first.
        let features = array![[1.0, 2.0], [2.0, 4.0], [3.0, 6.0], [4.0, 8.0]];
        let targets = array![1.0, 2.0, 3.0, 4.0];
        assert!(matches!(
            LinearModel::fit(features.view(), targets.view()),
            Err(FitError::Singular)
        ));
    }

    #[test]
    fn empty_input_is_an_error() {
        let features = ndarray::Array2::<f64>::zeros((0, 2));
        let targets = Array1::<f64>::zeros(0);
        assert!(matches!(
            LinearModel::fit(features.view(), targets.view()),
            Err(FitError::EmptyInput)
        ));
    }

    #[test]
    fn predict_batch_matches_rows() {
        let model = LinearModel::from_parameters(vec![0.5, 0.3], 0.1);
        let batch = array![[1.0, 2.0], [0.0, 0.0]];
        let preds = model.predict_batch(batch.view());
        assert_abs_diff_eq!(preds[0], 1.2, epsilon = 1e-12);
        assert_abs_diff_eq!(preds[1], 0.1, epsilon = 1e-12);
    }
}
