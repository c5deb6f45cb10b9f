//! Structure-of-Arrays decision tree.

use ndarray::ArrayView1;

use super::NodeId;

/// Structural validation errors for [`Tree`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TreeValidationError {
    #[error("tree has no nodes")]
    EmptyTree,
    #[error("node {node} {side} child {child} is out of bounds ({n_nodes} nodes)")]
    ChildOutOfBounds {
        node: NodeId,
        side: &'static str,
        child: NodeId,
        n_nodes: usize,
    },
    #[error("node {node} references itself")]
    SelfLoop { node: NodeId },
    #[error("node {node} is reachable by more than one path")]
    DuplicateVisit { node: NodeId },
    #[error("node {node} is unreachable from the root")]
    UnreachableNode { node: NodeId },
}

/// Immutable tree with scalar leaves.
///
/// Stores nodes in flat arrays. Child indices are local to this tree
/// (0 = root). A numeric split sends a sample left iff `value < threshold`;
/// a missing (NaN) value follows the node's default direction.
#[derive(Debug, Clone)]
pub struct Tree {
    split_indices: Box<[u32]>,
    split_thresholds: Box<[f32]>,
    left_children: Box<[NodeId]>,
    right_children: Box<[NodeId]>,
    default_left: Box<[bool]>,
    is_leaf: Box<[bool]>,
    leaf_values: Box<[f32]>,
}

impl Tree {
    #[inline]
    pub fn n_nodes(&self) -> usize {
        self.is_leaf.len()
    }

    #[inline]
    pub fn is_leaf(&self, node: NodeId) -> bool {
        self.is_leaf[node as usize]
    }

    #[inline]
    pub fn split_index(&self, node: NodeId) -> u32 {
        self.split_indices[node as usize]
    }

    #[inline]
    pub fn split_threshold(&self, node: NodeId) -> f32 {
        self.split_thresholds[node as usize]
    }

    #[inline]
    pub fn left_child(&self, node: NodeId) -> NodeId {
        self.left_children[node as usize]
    }

    #[inline]
    pub fn right_child(&self, node: NodeId) -> NodeId {
        self.right_children[node as usize]
    }

    #[inline]
    pub fn default_left(&self, node: NodeId) -> bool {
        self.default_left[node as usize]
    }

    #[inline]
    pub fn leaf_value(&self, node: NodeId) -> f32 {
        self.leaf_values[node as usize]
    }

    /// Number of leaves.
    pub fn n_leaves(&self) -> usize {
        self.is_leaf.iter().filter(|&&l| l).count()
    }

    /// Largest feature index used by any split, if the tree has splits.
    pub fn max_split_index(&self) -> Option<u32> {
        (0..self.n_nodes() as NodeId)
            .filter(|&n| !self.is_leaf(n))
            .map(|n| self.split_index(n))
            .max()
    }

    /// Walk from the root to the leaf reached by `sample`.
    #[inline]
    pub fn traverse_to_leaf(&self, sample: ArrayView1<'_, f32>) -> NodeId {
        let mut node: NodeId = 0;
        while !self.is_leaf(node) {
            let fvalue = sample[self.split_index(node) as usize];
            node = if fvalue.is_nan() {
                if self.default_left(node) {
                    self.left_child(node)
                } else {
                    self.right_child(node)
                }
            } else if fvalue < self.split_threshold(node) {
                self.left_child(node)
            } else {
                self.right_child(node)
            };
        }
        node
    }

    /// Leaf value reached by `sample`.
    #[inline]
    pub fn predict_row(&self, sample: ArrayView1<'_, f32>) -> f32 {
        self.leaf_value(self.traverse_to_leaf(sample))
    }

    /// Check that every node is reachable from the root exactly once and that
    /// all child pointers are in range. A tree that passes cannot loop during
    /// traversal.
    pub fn validate(&self) -> Result<(), TreeValidationError> {
        let n_nodes = self.n_nodes();
        if n_nodes == 0 {
            return Err(TreeValidationError::EmptyTree);
        }

        let mut visited = vec![false; n_nodes];
        let mut stack: Vec<NodeId> = vec![0];
        while let Some(node) = stack.pop() {
            if visited[node as usize] {
                return Err(TreeValidationError::DuplicateVisit { node });
            }
            visited[node as usize] = true;
            if self.is_leaf(node) {
                continue;
            }
            for (side, child) in [
                ("left", self.left_child(node)),
                ("right", self.right_child(node)),
            ] {
                if child as usize >= n_nodes {
                    return Err(TreeValidationError::ChildOutOfBounds {
                        node,
                        side,
                        child,
                        n_nodes,
                    });
                }
                if child == node {
                    return Err(TreeValidationError::SelfLoop { node });
                }
                stack.push(child);
            }
        }

        if let Some(node) = visited.iter().position(|v| !v) {
            return Err(TreeValidationError::UnreachableNode {
                node: node as NodeId,
            });
        }
        Ok(())
    }
}

// ============================================================================
// TreeBuilder
// ============================================================================

/// Node-by-node tree construction, used by model conversion and tests.
///
/// Nodes start out as zero-valued leaves; callers overwrite them with
/// [`split`](Self::split) or [`leaf`](Self::leaf) in any order.
#[derive(Debug, Clone)]
pub struct TreeBuilder {
    split_indices: Vec<u32>,
    split_thresholds: Vec<f32>,
    left_children: Vec<NodeId>,
    right_children: Vec<NodeId>,
    default_left: Vec<bool>,
    is_leaf: Vec<bool>,
    leaf_values: Vec<f32>,
}

impl TreeBuilder {
    pub fn with_nodes(n_nodes: usize) -> Self {
        Self {
            split_indices: vec![0; n_nodes],
            split_thresholds: vec![0.0; n_nodes],
            left_children: vec![0; n_nodes],
            right_children: vec![0; n_nodes],
            default_left: vec![false; n_nodes],
            is_leaf: vec![true; n_nodes],
            leaf_values: vec![0.0; n_nodes],
        }
    }

    pub fn split(
        &mut self,
        node: NodeId,
        feature: u32,
        threshold: f32,
        default_left: bool,
        left: NodeId,
        right: NodeId,
    ) -> &mut Self {
        let i = node as usize;
        self.split_indices[i] = feature;
        self.split_thresholds[i] = threshold;
        self.default_left[i] = default_left;
        self.left_children[i] = left;
        self.right_children[i] = right;
        self.is_leaf[i] = false;
        self
    }

    pub fn leaf(&mut self, node: NodeId, value: f32) -> &mut Self {
        let i = node as usize;
        self.is_leaf[i] = true;
        self.leaf_values[i] = value;
        self
    }

    /// Freeze into an immutable tree after structural validation.
    pub fn build(self) -> Result<Tree, TreeValidationError> {
        let tree = Tree {
            split_indices: self.split_indices.into_boxed_slice(),
            split_thresholds: self.split_thresholds.into_boxed_slice(),
            left_children: self.left_children.into_boxed_slice(),
            right_children: self.right_children.into_boxed_slice(),
            default_left: self.default_left.into_boxed_slice(),
            is_leaf: self.is_leaf.into_boxed_slice(),
            leaf_values: self.leaf_values.into_boxed_slice(),
        };
        tree.validate()?;
        Ok(tree)
    }
}
