//! Feature encoding: raw patient attributes to the model's input vector.
//!
//! - [`RawAttributes`]: validated attribute set (typed, or parsed from JSON)
//! - [`Gender`] / [`SmokingHistory`]: categorical encoders with legacy
//!   spelling normalization
//! - [`FeatureVector`]: the 11 encoded values in model column order
//! - [`FeatureTable`]: named rows, the input type of a
//!   [`Classifier`](crate::model::Classifier)
//!
//! Encoding is pure and never logs.

mod attributes;
mod encode;
mod schema;

pub use attributes::{build_feature_vector, RawAttributes, ATTRIBUTE_NAMES};
pub use encode::{encode_gender, encode_smoking, Gender, SmokingHistory};
pub use schema::{Column, FeatureTable, FeatureVector, FEATURE_NAMES, N_FEATURES};

pub(crate) use attributes::flag_from_int;
