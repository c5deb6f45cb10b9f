//! Readers for models trained outside this crate.

pub mod xgboost;

pub use xgboost::{ConversionError, XgbModel};
