//! Error types shared by the encoder, the model layer and the screening pipeline.

use std::path::PathBuf;

use crate::compat::xgboost::ConversionError;

/// Top-level error for a single screening request.
///
/// Every variant is surfaced to the caller as-is; nothing is retried and no
/// variant is ever replaced by a default value.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A required raw attribute was absent (or explicitly `null`).
    #[error("missing required attribute `{0}`")]
    MissingAttribute(&'static str),

    /// A raw attribute was present but had the wrong type or an impossible value.
    #[error("attribute `{name}` must be {expected}, got {found}")]
    InvalidAttribute {
        name: &'static str,
        expected: &'static str,
        found: String,
    },

    /// A categorical attribute was outside its recognized enumeration.
    #[error("unrecognized {attribute} value {value:?}")]
    InvalidCategory {
        attribute: &'static str,
        value: String,
    },

    /// The model artifact could not be loaded.
    #[error("model unavailable: {0}")]
    ModelUnavailable(#[from] LoadError),

    /// The model rejected the input or produced a malformed output.
    #[error("inference failed: {0}")]
    Inference(#[from] InferenceError),
}

impl Error {
    /// Returns true for errors about the shape of the raw input
    /// (missing attributes or attributes of the wrong type).
    pub fn is_schema_error(&self) -> bool {
        matches!(
            self,
            Self::MissingAttribute(_) | Self::InvalidAttribute { .. }
        )
    }
}

/// Failure to load a model artifact.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse XGBoost JSON model: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid tree structure: {0}")]
    Conversion(#[from] ConversionError),
    #[error("objective `{0}` is not a binary classification objective")]
    UnsupportedObjective(String),
    #[error("model has {num_class} classes, expected a binary classifier")]
    NotBinary { num_class: i64 },
    #[error("model lists {names} feature names but declares num_feature = {n_features}")]
    FeatureNamesLen { names: usize, n_features: usize },
    #[error("model splits on feature {index} but declares num_feature = {n_features}")]
    SplitOutOfRange { index: usize, n_features: usize },
}

/// Failure inside the model's inference call.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum InferenceError {
    #[error("expected {expected} feature columns, got {got}")]
    ShapeMismatch { expected: usize, got: usize },

    #[error("feature_names mismatch at column {position}: model expects `{expected}`, input has `{found}`")]
    FeatureNamesMismatch {
        position: usize,
        expected: String,
        found: String,
    },

    #[error("model returned {got} outputs for {expected} rows")]
    MalformedOutput { expected: usize, got: usize },

    /// Free-form failure reported by a non-XGBoost backend.
    #[error("{0}")]
    Backend(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
