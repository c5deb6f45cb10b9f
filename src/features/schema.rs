//! Column layout of the encoded feature vector.
//!
//! The order here is the order the classifier was trained with. Any permutation
//! produces wrong predictions without raising an error, so the layout lives in
//! exactly one place and everything else indexes through [`Column`].

use std::ops::Index;

use ndarray::{Array2, ArrayView1, ArrayView2};
use serde::ser::{Serialize, SerializeMap, Serializer};

use crate::error::{Error, InferenceError};

/// Number of encoded features.
pub const N_FEATURES: usize = 11;

/// Column names of the encoded feature vector, in model order.
pub const FEATURE_NAMES: [&str; N_FEATURES] = [
    "age",
    "hypertension",
    "heart_disease",
    "bmi",
    "HbA1c_level",
    "blood_glucose_level",
    "gender_encoded",
    "smoking_No_Info",
    "smoking_current",
    "smoking_former",
    "smoking_never",
];

/// A column of the encoded feature vector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Column {
    Age = 0,
    Hypertension,
    HeartDisease,
    Bmi,
    HbA1c,
    BloodGlucose,
    GenderEncoded,
    SmokingNoInfo,
    SmokingCurrent,
    SmokingFormer,
    SmokingNever,
}

impl Column {
    /// All columns in model order.
    pub const ALL: [Column; N_FEATURES] = [
        Column::Age,
        Column::Hypertension,
        Column::HeartDisease,
        Column::Bmi,
        Column::HbA1c,
        Column::BloodGlucose,
        Column::GenderEncoded,
        Column::SmokingNoInfo,
        Column::SmokingCurrent,
        Column::SmokingFormer,
        Column::SmokingNever,
    ];

    /// The four one-hot smoking columns, in model order.
    pub const SMOKING: [Column; 4] = [
        Column::SmokingNoInfo,
        Column::SmokingCurrent,
        Column::SmokingFormer,
        Column::SmokingNever,
    ];

    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    #[inline]
    pub fn name(self) -> &'static str {
        FEATURE_NAMES[self.index()]
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.name() == name)
    }

    /// Returns true for columns restricted to `{0, 1}`.
    pub fn is_indicator(self) -> bool {
        !matches!(
            self,
            Column::Age | Column::Bmi | Column::HbA1c | Column::BloodGlucose
        )
    }
}

/// Encoded feature vector in model column order.
///
/// Produced by the encoder; the one-hot and indicator invariants hold for
/// every value of this type.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FeatureVector([f32; N_FEATURES]);

impl FeatureVector {
    /// Wrap values the encoder has already validated.
    pub(crate) fn from_encoded(values: [f32; N_FEATURES]) -> Self {
        Self(values)
    }

    #[inline]
    pub fn as_slice(&self) -> &[f32] {
        &self.0
    }

    #[inline]
    pub fn to_array(self) -> [f32; N_FEATURES] {
        self.0
    }

    #[inline]
    pub fn get(&self, column: Column) -> f32 {
        self.0[column.index()]
    }

    /// Iterate `(column name, value)` pairs in model order.
    pub fn named(&self) -> impl Iterator<Item = (&'static str, f32)> + '_ {
        FEATURE_NAMES.iter().copied().zip(self.0.iter().copied())
    }

    /// The smoking one-hot block.
    pub fn smoking(&self) -> [f32; 4] {
        Column::SMOKING.map(|c| self.get(c))
    }

    /// Single-row named table, the shape the model consumes.
    pub fn to_table(&self) -> FeatureTable {
        FeatureTable::from_rows(std::slice::from_ref(self))
    }
}

impl Index<Column> for FeatureVector {
    type Output = f32;

    fn index(&self, column: Column) -> &f32 {
        &self.0[column.index()]
    }
}

/// Serializes as a `{column name: value}` map in model order.
impl Serialize for FeatureVector {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(N_FEATURES))?;
        for (name, value) in self.named() {
            map.serialize_entry(name, &value)?;
        }
        map.end()
    }
}

impl TryFrom<&[f32]> for FeatureVector {
    type Error = Error;

    /// Validate an already-encoded row (e.g. one read back from a prepared
    /// dataset) against the layout invariants.
    fn try_from(values: &[f32]) -> Result<Self, Error> {
        let values: [f32; N_FEATURES] =
            values
                .try_into()
                .map_err(|_| Error::InvalidAttribute {
                    name: "feature_vector",
                    expected: "exactly 11 values",
                    found: values.len().to_string(),
                })?;

        for column in Column::ALL {
            let v = values[column.index()];
            if !v.is_finite() {
                return Err(Error::InvalidAttribute {
                    name: column.name(),
                    expected: "a finite number",
                    found: v.to_string(),
                });
            }
            if column.is_indicator() && v != 0.0 && v != 1.0 {
                return Err(Error::InvalidAttribute {
                    name: column.name(),
                    expected: "0 or 1",
                    found: v.to_string(),
                });
            }
        }

        let hot = Column::SMOKING
            .iter()
            .filter(|c| values[c.index()] == 1.0)
            .count();
        if hot != 1 {
            return Err(Error::InvalidAttribute {
                name: "smoking_history",
                expected: "exactly one active smoking column",
                found: format!("{hot} active"),
            });
        }

        Ok(Self(values))
    }
}

/// Row-major table of features with named columns.
///
/// This is the input type of [`Classifier`](crate::model::Classifier); column
/// names travel with the values so a model that knows its training names can
/// refuse a permuted layout.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureTable {
    columns: Vec<String>,
    values: Array2<f32>,
}

impl FeatureTable {
    /// Build a table from explicit column names and a `(n_rows, n_cols)` array.
    pub fn new(columns: Vec<String>, values: Array2<f32>) -> Result<Self, InferenceError> {
        if columns.len() != values.ncols() {
            return Err(InferenceError::ShapeMismatch {
                expected: columns.len(),
                got: values.ncols(),
            });
        }
        Ok(Self { columns, values })
    }

    /// Stack encoded vectors under the canonical column names.
    pub fn from_rows(rows: &[FeatureVector]) -> Self {
        let mut values = Array2::zeros((rows.len(), N_FEATURES));
        for (mut dst, row) in values.rows_mut().into_iter().zip(rows) {
            dst.assign(&ArrayView1::from(row.as_slice()));
        }
        Self {
            columns: FEATURE_NAMES.iter().map(|s| s.to_string()).collect(),
            values,
        }
    }

    #[inline]
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    #[inline]
    pub fn n_rows(&self) -> usize {
        self.values.nrows()
    }

    #[inline]
    pub fn n_cols(&self) -> usize {
        self.values.ncols()
    }

    #[inline]
    pub fn row(&self, idx: usize) -> ArrayView1<'_, f32> {
        self.values.row(idx)
    }

    #[inline]
    pub fn values(&self) -> ArrayView2<'_, f32> {
        self.values.view()
    }

    /// Require the columns to be exactly `expected`, in order.
    pub fn check_columns(&self, expected: &[String]) -> Result<(), InferenceError> {
        if expected.len() != self.columns.len() {
            return Err(InferenceError::ShapeMismatch {
                expected: expected.len(),
                got: self.columns.len(),
            });
        }
        let drift = expected
            .iter()
            .zip(&self.columns)
            .enumerate()
            .find(|(_, (expected, found))| expected != found);
        match drift {
            Some((position, (expected, found))) => Err(InferenceError::FeatureNamesMismatch {
                position,
                expected: expected.clone(),
                found: found.clone(),
            }),
            None => Ok(()),
        }
    }
}
