//! diabetes-screen: patient feature encoding and binary diabetes screening.
//!
//! Raw patient attributes are validated and encoded into the fixed 11-column
//! layout the classifier was trained on, passed to an injected [`Classifier`]
//! and the resulting label is interpreted as a [`Diagnosis`]. The shipped
//! classifier is an XGBoost model loaded from its JSON dump and evaluated
//! natively.
//!
//! ```ignore
//! use diabetes_screen::{load_model, Screener};
//!
//! let screener = Screener::new(load_model("diabetes_model_xgb.json")?);
//! let screening = screener.screen_json(&serde_json::json!({
//!     "age": 45, "hypertension": 1, "heart_disease": 0, "bmi": 28.3,
//!     "HbA1c_level": 6.8, "blood_glucose_level": 140,
//!     "gender": "Female", "smoking_history": "current",
//! }))?;
//! println!("{}", screening.diagnosis);
//! ```

pub mod compat;
pub mod config;
pub mod error;
pub mod features;
pub mod inference;
pub mod logging;
pub mod model;
pub mod reference;
pub mod repr;
pub mod screen;
pub mod testing;

pub use error::{Error, InferenceError, LoadError, Result};
pub use features::{build_feature_vector, FeatureTable, FeatureVector, RawAttributes};
pub use model::{load_model, Classifier, XgbClassifier};
pub use screen::{interpret, predict, Diagnosis, Screener, Screening};
