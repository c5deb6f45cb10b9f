//! Batch evaluation of a classifier against labelled reference rows.

use std::ops::Add;

use rayon::prelude::*;
use serde::Serialize;

use crate::error::InferenceError;
use crate::features::{FeatureTable, FeatureVector};
use crate::model::Classifier;
use crate::screen::interpret;

use super::ReferenceError;

/// Rows per table handed to the model.
const BATCH_ROWS: usize = 256;

/// Confusion counts of a binary classifier.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Evaluation {
    pub true_positive: usize,
    pub true_negative: usize,
    pub false_positive: usize,
    pub false_negative: usize,
}

impl Evaluation {
    #[inline]
    pub fn total(&self) -> usize {
        self.true_positive + self.true_negative + self.false_positive + self.false_negative
    }

    /// Fraction of correct predictions; 0 when nothing was evaluated.
    pub fn accuracy(&self) -> f64 {
        ratio(self.true_positive + self.true_negative, self.total())
    }

    pub fn precision(&self) -> f64 {
        ratio(self.true_positive, self.true_positive + self.false_positive)
    }

    pub fn recall(&self) -> f64 {
        ratio(self.true_positive, self.true_positive + self.false_negative)
    }

    fn record(&mut self, truth: i64, prediction: i64) {
        match (truth != 0, interpret(prediction).is_positive()) {
            (true, true) => self.true_positive += 1,
            (false, false) => self.true_negative += 1,
            (false, true) => self.false_positive += 1,
            (true, false) => self.false_negative += 1,
        }
    }
}

impl Add for Evaluation {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self {
            true_positive: self.true_positive + rhs.true_positive,
            true_negative: self.true_negative + rhs.true_negative,
            false_positive: self.false_positive + rhs.false_positive,
            false_negative: self.false_negative + rhs.false_negative,
        }
    }
}

fn ratio(num: usize, den: usize) -> f64 {
    if den == 0 {
        0.0
    } else {
        num as f64 / den as f64
    }
}

/// Predict every row and compare with `labels`.
///
/// Rows are split into batches that are predicted in parallel; the model is
/// only read.
pub fn evaluate<M: Classifier + ?Sized>(
    model: &M,
    rows: &[FeatureVector],
    labels: &[i64],
) -> Result<Evaluation, ReferenceError> {
    if rows.len() != labels.len() {
        return Err(ReferenceError::LabelCount {
            rows: rows.len(),
            labels: labels.len(),
        });
    }

    rows.par_chunks(BATCH_ROWS)
        .zip(labels.par_chunks(BATCH_ROWS))
        .map(|(batch, truth)| -> Result<Evaluation, ReferenceError> {
            let predictions = model.predict(&FeatureTable::from_rows(batch))?;
            if predictions.len() != batch.len() {
                return Err(InferenceError::MalformedOutput {
                    expected: batch.len(),
                    got: predictions.len(),
                }
                .into());
            }
            let mut eval = Evaluation::default();
            for (&t, &p) in truth.iter().zip(&predictions) {
                eval.record(t, p);
            }
            Ok(eval)
        })
        .try_reduce(Evaluation::default, |a, b| Ok(a + b))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::Column;
    use approx::assert_relative_eq;

    struct GlucoseRule;

    impl Classifier for GlucoseRule {
        fn predict(&self, table: &FeatureTable) -> Result<Vec<i64>, InferenceError> {
            Ok((0..table.n_rows())
                .map(|i| i64::from(table.row(i)[Column::BloodGlucose.index()] >= 200.0))
                .collect())
        }
    }

    fn row(glucose: f32) -> FeatureVector {
        let values = [40.0, 0.0, 0.0, 25.0, 5.5, glucose, 0.0, 1.0, 0.0, 0.0, 0.0];
        FeatureVector::try_from(&values[..]).unwrap()
    }

    #[test]
    fn confusion_counts() {
        let rows: Vec<_> = (0..1000).map(|i| row(100.0 + (i % 4) as f32 * 50.0)).collect();
        // glucose cycles 100, 150, 200, 250; truth is positive from 150 up
        let labels: Vec<i64> = (0..1000).map(|i| i64::from(i % 4 != 0)).collect();

        let eval = evaluate(&GlucoseRule, &rows, &labels).unwrap();
        assert_eq!(eval.total(), 1000);
        assert_eq!(eval.true_positive, 500);
        assert_eq!(eval.true_negative, 250);
        assert_eq!(eval.false_negative, 250);
        assert_eq!(eval.false_positive, 0);
        assert_relative_eq!(eval.accuracy(), 0.75);
        assert_relative_eq!(eval.precision(), 1.0);
        assert_relative_eq!(eval.recall(), 500.0 / 750.0);
    }

    #[test]
    fn label_count_must_match() {
        let err = evaluate(&GlucoseRule, &[row(100.0)], &[]).unwrap_err();
        assert!(matches!(err, ReferenceError::LabelCount { rows: 1, labels: 0 }));
    }

    #[test]
    fn empty_input_evaluates_to_zero() {
        let eval = evaluate(&GlucoseRule, &[], &[]).unwrap();
        assert_eq!(eval.total(), 0);
        assert_eq!(eval.accuracy(), 0.0);
    }
}
