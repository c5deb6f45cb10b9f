//! Encode → predict → interpret.
//!
//! The model handle is injected once and reused; nothing here prints, logs or
//! retries. Every failure reaches the caller as a typed [`Error`].

use std::fmt;

use serde::Serialize;
use serde_json::Value;

use crate::error::{Error, InferenceError};
use crate::features::{FeatureVector, RawAttributes};
use crate::model::Classifier;

/// Run the model on one encoded vector and return its raw class label.
///
/// The vector is passed as a single-row named table. When the model reports
/// its training column names, they must match the table before the model is
/// called. An output with anything other than exactly one value is an
/// [`InferenceError::MalformedOutput`].
pub fn predict<M: Classifier + ?Sized>(model: &M, vector: &FeatureVector) -> Result<i64, Error> {
    let table = vector.to_table();
    if let Some(names) = model.feature_names() {
        table.check_columns(names)?;
    }
    let labels = model.predict(&table)?;
    match labels.as_slice() {
        [label] => Ok(*label),
        other => Err(InferenceError::MalformedOutput {
            expected: 1,
            got: other.len(),
        }
        .into()),
    }
}

/// Map a raw prediction to a diagnosis: 0 is negative, anything else positive.
pub fn interpret(prediction: i64) -> Diagnosis {
    if prediction == 0 {
        Diagnosis::Negative
    } else {
        Diagnosis::Positive
    }
}

/// Screening outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Diagnosis {
    Negative,
    Positive,
}

impl Diagnosis {
    #[inline]
    pub fn is_positive(self) -> bool {
        matches!(self, Self::Positive)
    }

    /// Human-readable label.
    pub fn message(self) -> &'static str {
        match self {
            Self::Negative => "No Diabetes Detected",
            Self::Positive => "Diabetes Risk Detected",
        }
    }
}

impl fmt::Display for Diagnosis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

/// Result of one screening request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Screening {
    pub features: FeatureVector,
    pub prediction: i64,
    pub diagnosis: Diagnosis,
}

/// Runs screening requests against an injected model.
#[derive(Debug, Clone)]
pub struct Screener<M> {
    model: M,
}

impl<M: Classifier> Screener<M> {
    pub fn new(model: M) -> Self {
        Self { model }
    }

    /// Screen a validated attribute set.
    pub fn screen(&self, attrs: &RawAttributes) -> Result<Screening, Error> {
        self.screen_vector(attrs.encode())
    }

    /// Screen an untyped JSON object (key order irrelevant).
    pub fn screen_json(&self, value: &Value) -> Result<Screening, Error> {
        self.screen(&RawAttributes::from_json(value)?)
    }

    /// Screen an already-encoded vector.
    pub fn screen_vector(&self, features: FeatureVector) -> Result<Screening, Error> {
        let prediction = predict(&self.model, &features)?;
        Ok(Screening {
            features,
            prediction,
            diagnosis: interpret(prediction),
        })
    }
}
