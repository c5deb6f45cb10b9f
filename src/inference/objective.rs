//! Binary objectives and their output transforms.
//!
//! The objective decides how a raw margin turns into the value the class
//! decision is made on.

use crate::error::LoadError;

/// Binary classification objective supported at inference time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinaryObjective {
    /// `binary:logistic` / `reg:logistic`: sigmoid of the margin.
    Logistic,
    /// `binary:logitraw`: the margin itself.
    LogitRaw,
    /// `binary:hinge`: 1 if the margin is positive, else 0.
    Hinge,
}

impl BinaryObjective {
    /// Map an XGBoost objective name.
    pub fn from_name(name: &str) -> Result<Self, LoadError> {
        match name {
            "binary:logistic" | "reg:logistic" => Ok(Self::Logistic),
            "binary:logitraw" => Ok(Self::LogitRaw),
            "binary:hinge" => Ok(Self::Hinge),
            other => Err(LoadError::UnsupportedObjective(other.to_string())),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Logistic => "binary:logistic",
            Self::LogitRaw => "binary:logitraw",
            Self::Hinge => "binary:hinge",
        }
    }

    /// Transform a margin into the model's output space.
    #[inline]
    pub fn transform(self, margin: f32) -> f32 {
        match self {
            Self::Logistic => sigmoid(margin),
            Self::LogitRaw => margin,
            Self::Hinge => {
                if margin > 0.0 {
                    1.0
                } else {
                    0.0
                }
            }
        }
    }

    /// Returns true if [`transform`](Self::transform) yields a probability.
    pub fn outputs_probability(self) -> bool {
        matches!(self, Self::Logistic)
    }
}

/// Class label from a transformed output.
///
/// Same rule as `XGBClassifier.predict` for single-output models: class 1 iff
/// the output is strictly greater than 0.5.
#[inline]
pub fn decide(output: f32) -> i64 {
    if output > 0.5 {
        1
    } else {
        0
    }
}

/// Numerically stable sigmoid.
/// Clamps input to [-500, 500] to prevent overflow.
#[inline]
pub fn sigmoid(x: f32) -> f32 {
    let clamped = x.clamp(-500.0, 500.0);
    if clamped >= 0.0 {
        1.0 / (1.0 + (-clamped).exp())
    } else {
        let e = clamped.exp();
        e / (1.0 + e)
    }
}
