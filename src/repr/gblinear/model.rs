//! Linear booster for a single output group.

use ndarray::{Array1, ArrayView1};

/// Linear model `margin = w · x + bias`.
///
/// XGBoost's gblinear stores `n_features + 1` weights per group with the bias
/// in the last slot; binary models have exactly one group.
#[derive(Debug, Clone)]
pub struct LinearModel {
    weights: Array1<f32>,
    bias: f32,
}

impl LinearModel {
    pub fn new(weights: Array1<f32>, bias: f32) -> Self {
        Self { weights, bias }
    }

    #[inline]
    pub fn n_features(&self) -> usize {
        self.weights.len()
    }

    #[inline]
    pub fn bias(&self) -> f32 {
        self.bias
    }

    /// Margin for one row. Missing (NaN) features contribute nothing, matching
    /// XGBoost's sparse handling.
    pub fn predict_margin(&self, row: ArrayView1<'_, f32>) -> f32 {
        self.weights
            .iter()
            .zip(row.iter())
            .filter(|(_, x)| !x.is_nan())
            .map(|(w, x)| w * x)
            .sum::<f32>()
            + self.bias
    }
}
