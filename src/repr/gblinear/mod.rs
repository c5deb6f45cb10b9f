//! Linear booster representation.

mod model;

pub use model::LinearModel;
