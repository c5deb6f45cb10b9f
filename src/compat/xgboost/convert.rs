//! Conversion from XGBoost JSON types to native representations.

use ndarray::Array1;

use crate::repr::gbdt::{Forest, TreeBuilder, TreeValidationError};
use crate::repr::gblinear::LinearModel;

use super::json::{GradientBooster, ModelTrees, Tree as XgbTree, XgbModel};

/// A booster converted from XGBoost.
#[derive(Debug, Clone)]
pub enum Booster {
    /// Tree ensemble (`gbtree`, or `dart` with per-tree weights baked into the forest).
    Tree(Forest),
    /// Linear (`gblinear`) booster.
    Linear(LinearModel),
}

impl Booster {
    /// Margin for one row.
    pub fn predict_margin(&self, row: ndarray::ArrayView1<'_, f32>) -> f32 {
        match self {
            Booster::Tree(forest) => forest.predict_margin(row),
            Booster::Linear(linear) => linear.predict_margin(row),
        }
    }
}

/// Error type for XGBoost model conversion.
#[derive(Debug, thiserror::Error)]
pub enum ConversionError {
    #[error("tree {0} has no nodes")]
    EmptyTree(usize),
    #[error("tree {tree}: array `{field}` has {len} entries for {num_nodes} nodes")]
    ArrayLenMismatch {
        tree: usize,
        field: &'static str,
        len: usize,
        num_nodes: usize,
    },
    #[error(
        "invalid node index in tree {tree}: node {node} references child {child} but tree has {num_nodes} nodes"
    )]
    InvalidNodeIndex {
        tree: usize,
        node: usize,
        child: i32,
        num_nodes: usize,
    },
    #[error("tree {tree}: node {node} has negative split index {index}")]
    InvalidSplitIndex { tree: usize, node: usize, index: i32 },
    #[error("tree {tree}: node {node} uses a categorical split, which this model layout never produces")]
    CategoricalSplit { tree: usize, node: usize },
    #[error("tree {tree}: {source}")]
    InvalidTree {
        tree: usize,
        source: TreeValidationError,
    },
    #[error("model has {n_trees} trees but {n_weights} DART weights")]
    DartWeightsMismatch { n_trees: usize, n_weights: usize },
    #[error(
        "gblinear weights length {actual} doesn't match num_features + 1 = {expected}"
    )]
    InvalidLinearWeights { actual: usize, expected: usize },
}

/// Convert base_score from probability space to margin space based on objective.
///
/// XGBoost stores base_score in probability space in JSON, but the predictor
/// works on margins.
fn prob_to_margin(base_score: f32, objective: &str) -> f32 {
    match objective {
        // logit(p) = ln(p / (1 - p)), clamped to avoid infinity
        "binary:logistic" | "reg:logistic" => {
            let p = base_score.clamp(1e-7, 1.0 - 1e-7);
            (p / (1.0 - p)).ln()
        }
        _ => base_score,
    }
}

impl XgbModel {
    /// Convert to a native [`Booster`].
    pub fn to_booster(&self) -> Result<Booster, ConversionError> {
        let margin_base_score = prob_to_margin(
            self.learner.learner_model_param.base_score,
            &self.learner.objective.name,
        );

        match &self.learner.gradient_booster {
            GradientBooster::Gbtree { model } => {
                let forest = convert_forest(model, margin_base_score)?;
                Ok(Booster::Tree(forest))
            }
            GradientBooster::Dart {
                gbtree,
                weight_drop,
            } => {
                if weight_drop.len() != gbtree.model.num_trees() {
                    return Err(ConversionError::DartWeightsMismatch {
                        n_trees: gbtree.model.num_trees(),
                        n_weights: weight_drop.len(),
                    });
                }
                let forest = convert_forest(&gbtree.model, margin_base_score)?
                    .with_tree_weights(weight_drop.clone());
                Ok(Booster::Tree(forest))
            }
            GradientBooster::Gblinear { model } => {
                let linear = self.convert_linear_model(&model.weights, margin_base_score)?;
                Ok(Booster::Linear(linear))
            }
        }
    }

    /// Convert gblinear weights, baking the base score into the bias.
    fn convert_linear_model(
        &self,
        weights: &[f32],
        margin_base_score: f32,
    ) -> Result<LinearModel, ConversionError> {
        let num_features = self.learner.learner_model_param.n_features.max(0) as usize;
        let expected = num_features + 1;
        if weights.len() != expected {
            return Err(ConversionError::InvalidLinearWeights {
                actual: weights.len(),
                expected,
            });
        }

        let coefficients = Array1::from(weights[..num_features].to_vec());
        let bias = weights[num_features] + margin_base_score;
        Ok(LinearModel::new(coefficients, bias))
    }
}

fn convert_forest(model: &ModelTrees, base_score: f32) -> Result<Forest, ConversionError> {
    let mut forest = Forest::new().with_base_score(base_score);
    for (tree_idx, xgb_tree) in model.trees.iter().enumerate() {
        forest.push_tree(convert_tree(xgb_tree, tree_idx)?);
    }
    Ok(forest)
}

/// Convert a single XGBoost tree.
///
/// XGBoost marks leaves with `left_children == -1` and stores the leaf value
/// in `split_conditions`.
fn convert_tree(
    xgb_tree: &XgbTree,
    tree_idx: usize,
) -> Result<crate::repr::gbdt::Tree, ConversionError> {
    let num_nodes = xgb_tree.tree_param.num_nodes.max(0) as usize;
    if num_nodes == 0 {
        return Err(ConversionError::EmptyTree(tree_idx));
    }

    for (field, len) in [
        ("left_children", xgb_tree.left_children.len()),
        ("right_children", xgb_tree.right_children.len()),
        ("split_indices", xgb_tree.split_indices.len()),
        ("split_conditions", xgb_tree.split_conditions.len()),
        ("default_left", xgb_tree.default_left.len()),
    ] {
        if len != num_nodes {
            return Err(ConversionError::ArrayLenMismatch {
                tree: tree_idx,
                field,
                len,
                num_nodes,
            });
        }
    }

    let mut builder = TreeBuilder::with_nodes(num_nodes);

    for node_idx in 0..num_nodes {
        let left_child = xgb_tree.left_children[node_idx];
        let right_child = xgb_tree.right_children[node_idx];

        if left_child == -1 {
            builder.leaf(node_idx as u32, xgb_tree.split_conditions[node_idx]);
            continue;
        }

        for child in [left_child, right_child] {
            if child < 0 || child as usize >= num_nodes {
                return Err(ConversionError::InvalidNodeIndex {
                    tree: tree_idx,
                    node: node_idx,
                    child,
                    num_nodes,
                });
            }
        }

        // split_type: 0 = numeric, 1 = categorical
        if xgb_tree.split_type.get(node_idx).copied().unwrap_or(0) != 0 {
            return Err(ConversionError::CategoricalSplit {
                tree: tree_idx,
                node: node_idx,
            });
        }

        let feature_index = xgb_tree.split_indices[node_idx];
        if feature_index < 0 {
            return Err(ConversionError::InvalidSplitIndex {
                tree: tree_idx,
                node: node_idx,
                index: feature_index,
            });
        }

        builder.split(
            node_idx as u32,
            feature_index as u32,
            xgb_tree.split_conditions[node_idx],
            xgb_tree.default_left[node_idx] != 0,
            left_child as u32,
            right_child as u32,
        );
    }

    builder
        .build()
        .map_err(|source| ConversionError::InvalidTree {
            tree: tree_idx,
            source,
        })
}
