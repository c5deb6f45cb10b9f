//! Trained classifiers.
//!
//! The screening pipeline only depends on the [`Classifier`] trait; the
//! concrete model shipped with the tool is an XGBoost binary classifier
//! ([`XgbClassifier`]) loaded from its JSON dump.
//!
//! ```ignore
//! use diabetes_screen::model::{load_model, Classifier};
//!
//! let model = load_model("diabetes_model_xgb.json")?;
//! let labels = model.predict(&vector.to_table())?;
//! ```

mod xgboost;

use std::path::Path;
use std::sync::Arc;

use crate::error::{Error, InferenceError};
use crate::features::FeatureTable;

pub use xgboost::XgbClassifier;

/// A trained binary classifier over a feature table.
///
/// Implementations are immutable after loading and may be shared across
/// threads; `predict` must not mutate observable state.
pub trait Classifier: Send + Sync {
    /// One class label per row of `table`.
    fn predict(&self, table: &FeatureTable) -> Result<Vec<i64>, InferenceError>;

    /// Column names the model was trained on, when it recorded them.
    fn feature_names(&self) -> Option<&[String]> {
        None
    }
}

impl<C: Classifier + ?Sized> Classifier for &C {
    fn predict(&self, table: &FeatureTable) -> Result<Vec<i64>, InferenceError> {
        (**self).predict(table)
    }

    fn feature_names(&self) -> Option<&[String]> {
        (**self).feature_names()
    }
}

impl<C: Classifier + ?Sized> Classifier for Box<C> {
    fn predict(&self, table: &FeatureTable) -> Result<Vec<i64>, InferenceError> {
        (**self).predict(table)
    }

    fn feature_names(&self) -> Option<&[String]> {
        (**self).feature_names()
    }
}

impl<C: Classifier + ?Sized> Classifier for Arc<C> {
    fn predict(&self, table: &FeatureTable) -> Result<Vec<i64>, InferenceError> {
        (**self).predict(table)
    }

    fn feature_names(&self) -> Option<&[String]> {
        (**self).feature_names()
    }
}

/// Load the XGBoost model at `path`.
///
/// Any failure (missing file, bad JSON, non-binary objective) is reported as
/// [`Error::ModelUnavailable`].
pub fn load_model(path: impl AsRef<Path>) -> Result<XgbClassifier, Error> {
    Ok(XgbClassifier::load(path)?)
}
