//! Reference population: where out-of-range warnings and batch evaluation get
//! their data.
//!
//! Two sources exist:
//! - [`ReferenceSource::Builtin`]: three illustrative patients and fixed
//!   clinical ranges, no labels
//! - [`ReferenceSource::Dataset`]: a CSV in the public diabetes-prediction
//!   layout, encoded row by row with the same encoder as live requests
//!
//! Nothing here is on the screening failure path; it only feeds warnings and
//! the `evaluate` report.

mod bounds;
mod dataset;
mod evaluate;

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::InferenceError;
use crate::features::{FeatureVector, N_FEATURES};
use crate::model::Classifier;

pub use bounds::{FeatureBounds, OutOfRange, Range};
pub use dataset::{load_dataset, read_dataset, Dataset, DATASET_COLUMNS, LABEL_COLUMN};
pub use evaluate::{evaluate, Evaluation};

/// Errors raised while loading or evaluating reference data.
#[derive(Debug, thiserror::Error)]
pub enum ReferenceError {
    #[error("failed to open {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to read reference CSV: {0}")]
    Csv(#[from] csv::Error),
    #[error("reference CSV has no `{0}` column")]
    MissingColumn(&'static str),
    #[error("reference data has no usable rows ({skipped} rejected)")]
    Empty { skipped: usize },
    #[error("reference data carries no `diabetes` labels")]
    Unlabelled,
    #[error("{rows} rows but {labels} labels")]
    LabelCount { rows: usize, labels: usize },
    #[error(transparent)]
    Inference(#[from] InferenceError),
}

/// Where reference data comes from.
///
/// In TOML this is the `[reference]` table, tagged by `source`:
///
/// ```toml
/// [reference]
/// source = "dataset"
/// path = "diabetes_prediction_dataset.csv"
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "source", rename_all = "lowercase")]
pub enum ReferenceSource {
    #[default]
    Builtin,
    Dataset { path: PathBuf },
}

/// Loaded reference rows with their bounds.
#[derive(Debug, Clone)]
pub struct ReferenceData {
    rows: Vec<FeatureVector>,
    labels: Option<Vec<i64>>,
    skipped: usize,
    bounds: FeatureBounds,
}

/// Encoded sample patients shipped with the tool.
const BUILTIN_SAMPLE: [[f32; N_FEATURES]; 3] = [
    [25.0, 0.0, 0.0, 22.5, 5.2, 85.0, 1.0, 0.0, 0.0, 0.0, 1.0],
    [45.0, 1.0, 0.0, 28.3, 6.8, 140.0, 0.0, 0.0, 1.0, 0.0, 0.0],
    [65.0, 1.0, 1.0, 32.1, 7.5, 180.0, 1.0, 0.0, 0.0, 1.0, 0.0],
];

impl ReferenceData {
    pub fn load(source: &ReferenceSource) -> Result<Self, ReferenceError> {
        match source {
            ReferenceSource::Builtin => Ok(Self::builtin()),
            ReferenceSource::Dataset { path } => Self::from_dataset(load_dataset(path)?),
        }
    }

    /// The builtin sample with fixed clinical ranges.
    pub fn builtin() -> Self {
        debug!("using builtin reference sample");
        Self {
            rows: BUILTIN_SAMPLE
                .iter()
                .map(|values| FeatureVector::from_encoded(*values))
                .collect(),
            labels: None,
            skipped: 0,
            bounds: FeatureBounds::fixed(),
        }
    }

    /// Wrap a decoded dataset; bounds are its per-column min/max.
    pub fn from_dataset(dataset: Dataset) -> Result<Self, ReferenceError> {
        let Some(bounds) = FeatureBounds::from_rows(&dataset.rows) else {
            return Err(ReferenceError::Empty {
                skipped: dataset.skipped,
            });
        };
        Ok(Self {
            rows: dataset.rows,
            labels: dataset.labels,
            skipped: dataset.skipped,
            bounds,
        })
    }

    pub fn rows(&self) -> &[FeatureVector] {
        &self.rows
    }

    pub fn labels(&self) -> Option<&[i64]> {
        self.labels.as_deref()
    }

    /// Rows rejected while loading.
    pub fn skipped(&self) -> usize {
        self.skipped
    }

    pub fn bounds(&self) -> &FeatureBounds {
        &self.bounds
    }

    /// Evaluate `model` on the labelled rows.
    pub fn evaluate<M: Classifier + ?Sized>(&self, model: &M) -> Result<Evaluation, ReferenceError> {
        let labels = self.labels().ok_or(ReferenceError::Unlabelled)?;
        evaluate(model, &self.rows, labels)
    }
}
