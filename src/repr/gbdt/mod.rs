//! Gradient-boosted decision tree representations.

/// Node identifier: an index into a tree's arrays.
pub type NodeId = u32;

pub mod forest;
pub mod tree;

pub use forest::Forest;
pub use tree::{Tree, TreeBuilder, TreeValidationError};
