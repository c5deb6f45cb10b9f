//! XGBoost JSON dumps: parsing and conversion to [`crate::repr`] types.

mod convert;
mod json;

pub use convert::{Booster, ConversionError};
pub use json::*;
