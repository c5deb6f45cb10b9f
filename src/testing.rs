//! Testing utilities for diabetes-screen.
//!
//! Assertion helpers and small stand-in classifiers, shared by unit tests and
//! the integration tests under `tests/`.
//!
//! ```ignore
//! use diabetes_screen::testing::{assert_vector_eq, ThresholdClassifier};
//! ```

use approx::AbsDiffEq;

use crate::error::InferenceError;
use crate::features::{Column, FeatureTable, FeatureVector, FEATURE_NAMES, N_FEATURES};
use crate::model::Classifier;

// =============================================================================
// Constants
// =============================================================================

/// Default tolerance for floating point comparisons of encoded values and
/// probabilities.
pub const DEFAULT_TOLERANCE: f32 = 1e-5;

// =============================================================================
// Floating Point Assertions
// =============================================================================

/// Assert that two f32 values are approximately equal.
///
/// ```
/// # use diabetes_screen::assert_approx_eq;
/// assert_approx_eq!(0.731_058_6f32, 0.731_06f32, 1e-5);
/// ```
#[macro_export]
macro_rules! assert_approx_eq {
    ($left:expr, $right:expr, $tolerance:expr) => {{
        let left_val: f32 = $left;
        let right_val: f32 = $right;
        let tol: f32 = $tolerance;
        let diff = (left_val - right_val).abs();
        if !(diff <= tol) {
            panic!(
                "assertion failed: `(left ≈ right)`\n  left: `{:?}`\n right: `{:?}`\n  diff: `{:?}` > tolerance `{:?}`",
                left_val, right_val, diff, tol
            );
        }
    }};
    ($left:expr, $right:expr, $tolerance:expr, $($arg:tt)+) => {{
        let left_val: f32 = $left;
        let right_val: f32 = $right;
        let tol: f32 = $tolerance;
        let diff = (left_val - right_val).abs();
        if !(diff <= tol) {
            panic!(
                "assertion failed: `(left ≈ right)` - {}\n  left: `{:?}`\n right: `{:?}`\n  diff: `{:?}` > tolerance `{:?}`",
                format_args!($($arg)+), left_val, right_val, diff, tol
            );
        }
    }};
}

/// Assert that two slices of f32 values are approximately equal element-wise.
pub fn assert_slice_approx_eq(actual: &[f32], expected: &[f32], tolerance: f32, context: &str) {
    assert_eq!(
        actual.len(),
        expected.len(),
        "{context}: length mismatch - got {}, expected {}",
        actual.len(),
        expected.len()
    );

    for (i, (a, e)) in actual.iter().zip(expected.iter()).enumerate() {
        assert!(
            a.abs_diff_eq(e, tolerance),
            "{context}[{i}]: {a} ≠ {e} (diff={}, tolerance={tolerance})",
            (a - e).abs()
        );
    }
}

/// Column-by-column listing of the values that differ, `-` for expected and
/// `+` for actual.
fn diff_vectors(actual: &FeatureVector, expected: &[f32; N_FEATURES], epsilon: f32) -> String {
    let mut out = String::new();
    for ((name, act), exp) in FEATURE_NAMES.iter().zip(actual.as_slice()).zip(expected) {
        if !act.abs_diff_eq(exp, epsilon) {
            out.push_str(&format!("{name:>20} - {exp:>10.4}  (expected)\n"));
            out.push_str(&format!("{:>20} + {act:>10.4}  (actual)\n", ""));
        }
    }
    out
}

/// Assert that an encoded vector matches `expected` in every column.
///
/// On failure, only the differing columns are shown, by name.
pub fn assert_vector_eq(actual: &FeatureVector, expected: &[f32; N_FEATURES], context: &str) {
    let diff = diff_vectors(actual, expected, DEFAULT_TOLERANCE);
    assert!(diff.is_empty(), "{context}: encoded vector differs\n{diff}");
}

// =============================================================================
// Stand-in classifiers
// =============================================================================

/// Predicts the same label for every row.
#[derive(Debug, Clone, Copy)]
pub struct ConstantClassifier(pub i64);

impl Classifier for ConstantClassifier {
    fn predict(&self, table: &FeatureTable) -> Result<Vec<i64>, InferenceError> {
        Ok(vec![self.0; table.n_rows()])
    }
}

/// Positive iff one column is at or above a threshold.
#[derive(Debug, Clone, Copy)]
pub struct ThresholdClassifier {
    pub column: Column,
    pub threshold: f32,
}

impl Classifier for ThresholdClassifier {
    fn predict(&self, table: &FeatureTable) -> Result<Vec<i64>, InferenceError> {
        let idx = self.column.index();
        Ok((0..table.n_rows())
            .map(|i| i64::from(table.row(i)[idx] >= self.threshold))
            .collect())
    }
}

/// Always fails with the given error.
#[derive(Debug, Clone)]
pub struct FailingClassifier(pub InferenceError);

impl Classifier for FailingClassifier {
    fn predict(&self, _: &FeatureTable) -> Result<Vec<i64>, InferenceError> {
        Err(self.0.clone())
    }
}
