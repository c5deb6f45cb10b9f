//! Serde view of an XGBoost JSON model dump.
//!
//! Only the parts needed to rebuild the booster are modelled; anything else in
//! the file (training parameters, node statistics, attributes) is ignored.

use std::path::Path;

use serde::de::Error as _;
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use serde_with::{serde_as, DisplayFromStr};
use tracing::debug;

use crate::error::LoadError;

/// Read `base_score` from whichever encoding the writing release used:
/// `0.5`, `"5E-1"`, `"[5E-1]"` or `[0.5]`.
fn base_score<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f32, D::Error> {
    fn scalar(value: &Value) -> Option<f32> {
        match value {
            Value::Number(n) => n.as_f64().map(|v| v as f32),
            Value::String(s) => {
                let s = s.trim();
                let inner = s
                    .strip_prefix('[')
                    .and_then(|s| s.strip_suffix(']'))
                    .unwrap_or(s);
                inner.trim().parse().ok()
            }
            Value::Array(items) => items.first().and_then(scalar),
            _ => None,
        }
    }

    let value = Value::deserialize(deserializer)?;
    scalar(&value).ok_or_else(|| D::Error::custom(format!("unreadable base_score {value}")))
}

fn one() -> i64 {
    1
}

// =============================================================================
// Trees
// =============================================================================

#[serde_as]
#[derive(Debug, Clone, Deserialize)]
pub struct TreeParam {
    #[serde_as(as = "DisplayFromStr")]
    pub num_nodes: i64,
}

/// One regression tree in structure-of-arrays form, indexed by node id.
#[derive(Debug, Clone, Deserialize)]
pub struct Tree {
    pub tree_param: TreeParam,
    /// `-1` marks a leaf.
    pub left_children: Vec<i32>,
    pub right_children: Vec<i32>,
    pub split_indices: Vec<i32>,
    /// Threshold on internal nodes, leaf value on leaves.
    pub split_conditions: Vec<f32>,
    pub default_left: Vec<i32>,
    /// `0` numeric, `1` categorical. Older dumps omit it.
    #[serde(default)]
    pub split_type: Vec<i32>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ModelTrees {
    pub trees: Vec<Tree>,
}

impl ModelTrees {
    pub fn num_trees(&self) -> usize {
        self.trees.len()
    }
}

// =============================================================================
// Boosters
// =============================================================================

#[derive(Debug, Clone, Deserialize)]
pub struct GbLinearModel {
    /// `num_feature` coefficients followed by the bias.
    pub weights: Vec<f32>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DartTrees {
    pub model: ModelTrees,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "name", rename_all = "lowercase")]
pub enum GradientBooster {
    Gbtree { model: ModelTrees },
    Gblinear { model: GbLinearModel },
    Dart { gbtree: DartTrees, weight_drop: Vec<f32> },
}

// =============================================================================
// Learner
// =============================================================================

#[derive(Debug, Clone, Deserialize)]
pub struct ObjectiveSpec {
    pub name: String,
}

#[serde_as]
#[derive(Debug, Clone, Deserialize)]
pub struct LearnerModelParam {
    /// Probability space for logistic objectives.
    #[serde(deserialize_with = "base_score")]
    pub base_score: f32,
    /// `0` for binary and regression models.
    #[serde(rename = "num_class")]
    #[serde_as(as = "DisplayFromStr")]
    pub n_class: i64,
    #[serde(rename = "num_feature")]
    #[serde_as(as = "DisplayFromStr")]
    pub n_features: i64,
    #[serde_as(as = "DisplayFromStr")]
    #[serde(default = "one")]
    pub num_target: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Learner {
    /// Column names the model was fitted on; empty when trained on a bare
    /// matrix.
    #[serde(default)]
    pub feature_names: Vec<String>,
    pub gradient_booster: GradientBooster,
    pub objective: ObjectiveSpec,
    pub learner_model_param: LearnerModelParam,
}

/// A parsed `save_model("*.json")` file.
#[derive(Debug, Clone, Deserialize)]
pub struct XgbModel {
    pub version: [u32; 3],
    pub learner: Learner,
}

impl XgbModel {
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, LoadError> {
        let path = path.as_ref();
        let file = std::fs::File::open(path).map_err(|source| LoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let model: Self = serde_json::from_reader(std::io::BufReader::new(file))?;
        debug!(
            path = %path.display(),
            version = ?model.version,
            objective = %model.learner.objective.name,
            "parsed XGBoost model"
        );
        Ok(model)
    }

    pub fn from_value(value: &Value) -> Result<Self, LoadError> {
        Ok(Self::deserialize(value)?)
    }

    pub fn is_dart(&self) -> bool {
        matches!(self.learner.gradient_booster, GradientBooster::Dart { .. })
    }

    pub fn is_linear(&self) -> bool {
        matches!(self.learner.gradient_booster, GradientBooster::Gblinear { .. })
    }
}
