//! Inference for converted models.
//!
//! - [`BinaryObjective`]: margin → output transform for binary objectives
//! - [`decide`]: output → class label
//!
//! Margins themselves come from [`Booster::predict_margin`](crate::compat::xgboost::Booster::predict_margin).

mod objective;

pub use objective::{decide, sigmoid, BinaryObjective};
