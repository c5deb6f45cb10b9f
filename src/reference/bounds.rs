//! Per-column value ranges of the reference population.

use std::fmt;

use ndarray::Axis;

use crate::features::{Column, FeatureTable, FeatureVector, N_FEATURES};

/// Closed interval `[min, max]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Range {
    pub min: f32,
    pub max: f32,
}

impl Range {
    pub const fn new(min: f32, max: f32) -> Self {
        Self { min, max }
    }

    #[inline]
    pub fn contains(&self, value: f32) -> bool {
        self.min <= value && value <= self.max
    }
}

impl fmt::Display for Range {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}]", self.min, self.max)
    }
}

/// A value that falls outside its column's reference range.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OutOfRange {
    pub column: Column,
    pub value: f32,
    pub range: Range,
}

impl fmt::Display for OutOfRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} = {} is outside the reference range {}",
            self.column.name(),
            self.value,
            self.range
        )
    }
}

/// Reference ranges for every encoded column.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureBounds {
    ranges: [Range; N_FEATURES],
}

impl FeatureBounds {
    /// Ranges used with the builtin sample: adult ages, plausible BMI, HbA1c
    /// and glucose, and `[0, 1]` for every indicator column.
    pub fn fixed() -> Self {
        let mut ranges = [Range::new(0.0, 1.0); N_FEATURES];
        ranges[Column::Age.index()] = Range::new(18.0, 100.0);
        ranges[Column::Bmi.index()] = Range::new(15.0, 50.0);
        ranges[Column::HbA1c.index()] = Range::new(3.5, 15.0);
        ranges[Column::BloodGlucose.index()] = Range::new(50.0, 300.0);
        Self { ranges }
    }

    /// Per-column min/max over `rows`. `None` when there are no rows.
    pub fn from_rows(rows: &[FeatureVector]) -> Option<Self> {
        if rows.is_empty() {
            return None;
        }
        let table = FeatureTable::from_rows(rows);
        let values = table.values();
        let mins = values.fold_axis(Axis(0), f32::INFINITY, |&acc, &v| acc.min(v));
        let maxs = values.fold_axis(Axis(0), f32::NEG_INFINITY, |&acc, &v| acc.max(v));

        let mut ranges = [Range::new(0.0, 0.0); N_FEATURES];
        for (range, (&min, &max)) in ranges.iter_mut().zip(mins.iter().zip(maxs.iter())) {
            *range = Range::new(min, max);
        }
        Some(Self { ranges })
    }

    #[inline]
    pub fn range(&self, column: Column) -> Range {
        self.ranges[column.index()]
    }

    /// `(column, range)` pairs in model order.
    pub fn iter(&self) -> impl Iterator<Item = (Column, Range)> + '_ {
        Column::ALL.into_iter().zip(self.ranges.iter().copied())
    }

    /// Columns of `vector` that fall outside their range.
    pub fn check(&self, vector: &FeatureVector) -> Vec<OutOfRange> {
        self.iter()
            .filter_map(|(column, range)| {
                let value = vector[column];
                (!range.contains(value)).then_some(OutOfRange {
                    column,
                    value,
                    range,
                })
            })
            .collect()
    }
}
