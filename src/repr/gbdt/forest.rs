//! Forest of decision trees with a single output group.

use ndarray::ArrayView1;

use super::tree::Tree;

/// Additive tree ensemble producing one margin per row.
///
/// Binary classifiers need a single output group, so unlike a multiclass
/// forest there are no per-tree group assignments. DART models carry one
/// weight per tree.
#[derive(Debug, Clone)]
pub struct Forest {
    trees: Vec<Tree>,
    tree_weights: Option<Box<[f32]>>,
    base_score: f32,
}

impl Forest {
    pub fn new() -> Self {
        Self {
            trees: Vec::new(),
            tree_weights: None,
            base_score: 0.0,
        }
    }

    /// Set the base score (in margin space).
    pub fn with_base_score(mut self, base_score: f32) -> Self {
        self.base_score = base_score;
        self
    }

    /// Attach DART per-tree weights.
    pub fn with_tree_weights(mut self, weights: Vec<f32>) -> Self {
        self.tree_weights = Some(weights.into_boxed_slice());
        self
    }

    pub fn push_tree(&mut self, tree: Tree) {
        self.trees.push(tree);
    }

    #[inline]
    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }

    #[inline]
    pub fn base_score(&self) -> f32 {
        self.base_score
    }

    #[inline]
    pub fn tree(&self, idx: usize) -> &Tree {
        &self.trees[idx]
    }

    pub fn tree_weights(&self) -> Option<&[f32]> {
        self.tree_weights.as_deref()
    }

    /// Largest feature index referenced by any tree.
    pub fn max_split_index(&self) -> Option<u32> {
        self.trees.iter().filter_map(Tree::max_split_index).max()
    }

    /// Raw margin for one row: base score plus the (weighted) sum of leaves.
    pub fn predict_margin(&self, row: ArrayView1<'_, f32>) -> f32 {
        let leaves = self.trees.iter().map(|t| t.predict_row(row));
        let sum: f32 = match &self.tree_weights {
            Some(weights) => leaves.zip(weights.iter()).map(|(v, w)| v * w).sum(),
            None => leaves.sum(),
        };
        self.base_score + sum
    }
}

impl Default for Forest {
    fn default() -> Self {
        Self::new()
    }
}
