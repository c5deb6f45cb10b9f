//! Binary classifier backed by a converted XGBoost model.

use rayon::prelude::*;
use tracing::{debug, info};

use std::path::Path;

use crate::compat::xgboost::{Booster, XgbModel};
use crate::error::{InferenceError, LoadError};
use crate::features::FeatureTable;
use crate::inference::{decide, BinaryObjective};

use super::Classifier;

/// Row count from which predictions are spread over the rayon pool.
const PARALLEL_ROWS: usize = 64;

/// An XGBoost binary classifier, ready for inference.
///
/// Immutable after loading, so one instance can be shared between threads.
#[derive(Debug, Clone)]
pub struct XgbClassifier {
    booster: Booster,
    objective: BinaryObjective,
    n_features: usize,
    feature_names: Option<Vec<String>>,
}

impl XgbClassifier {
    /// Build a classifier from a parsed XGBoost model.
    ///
    /// Fails if the objective is not a binary one, if the model declares more
    /// than two classes, or if the trees are inconsistent with the declared
    /// feature count.
    pub fn from_model(model: &XgbModel) -> Result<Self, LoadError> {
        let learner = &model.learner;
        let objective = BinaryObjective::from_name(&learner.objective.name)?;

        let num_class = learner.learner_model_param.n_class;
        if num_class > 2 || learner.learner_model_param.num_target > 1 {
            return Err(LoadError::NotBinary { num_class });
        }

        let n_features = learner.learner_model_param.n_features.max(0) as usize;
        let feature_names = match learner.feature_names.len() {
            0 => None,
            n if n == n_features => Some(learner.feature_names.clone()),
            names => return Err(LoadError::FeatureNamesLen { names, n_features }),
        };

        let booster = model.to_booster()?;
        if let Booster::Tree(forest) = &booster {
            if let Some(index) = forest.max_split_index() {
                let index = index as usize;
                if index >= n_features {
                    return Err(LoadError::SplitOutOfRange { index, n_features });
                }
            }
        }

        Ok(Self {
            booster,
            objective,
            n_features,
            feature_names,
        })
    }

    /// Load and convert an XGBoost JSON model file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, LoadError> {
        let path = path.as_ref();
        let classifier = Self::from_model(&XgbModel::from_file(path)?)?;
        info!(
            path = %path.display(),
            objective = classifier.objective.name(),
            n_features = classifier.n_features,
            booster = classifier.booster_kind(),
            "loaded model"
        );
        Ok(classifier)
    }

    #[inline]
    pub fn n_features(&self) -> usize {
        self.n_features
    }

    /// Feature names stored in the model, if it was trained with any.
    pub fn feature_names(&self) -> Option<&[String]> {
        self.feature_names.as_deref()
    }

    #[inline]
    pub fn objective(&self) -> BinaryObjective {
        self.objective
    }

    fn booster_kind(&self) -> &'static str {
        match &self.booster {
            Booster::Tree(forest) if forest.tree_weights().is_some() => "dart",
            Booster::Tree(_) => "gbtree",
            Booster::Linear(_) => "gblinear",
        }
    }

    /// Reject tables whose width or column order differs from training.
    fn check_table(&self, table: &FeatureTable) -> Result<(), InferenceError> {
        if table.n_cols() != self.n_features {
            return Err(InferenceError::ShapeMismatch {
                expected: self.n_features,
                got: table.n_cols(),
            });
        }
        match &self.feature_names {
            Some(names) => table.check_columns(names),
            None => Ok(()),
        }
    }

    /// Raw margins, one per row.
    pub fn predict_margin(&self, table: &FeatureTable) -> Result<Vec<f32>, InferenceError> {
        self.check_table(table)?;
        let n_rows = table.n_rows();
        let margins = if n_rows >= PARALLEL_ROWS {
            (0..n_rows)
                .into_par_iter()
                .map(|i| self.booster.predict_margin(table.row(i)))
                .collect()
        } else {
            (0..n_rows)
                .map(|i| self.booster.predict_margin(table.row(i)))
                .collect()
        };
        debug!(rows = n_rows, "computed margins");
        Ok(margins)
    }

    /// Transformed outputs, one per row.
    ///
    /// For `binary:logistic` these are probabilities of the positive class.
    pub fn predict_proba(&self, table: &FeatureTable) -> Result<Vec<f32>, InferenceError> {
        let mut outputs = self.predict_margin(table)?;
        for value in &mut outputs {
            *value = self.objective.transform(*value);
        }
        Ok(outputs)
    }
}

impl Classifier for XgbClassifier {
    fn predict(&self, table: &FeatureTable) -> Result<Vec<i64>, InferenceError> {
        Ok(self
            .predict_proba(table)?
            .into_iter()
            .map(decide)
            .collect())
    }

    fn feature_names(&self) -> Option<&[String]> {
        XgbClassifier::feature_names(self)
    }
}
