//! Test case loading utilities for integration tests.
//!
//! Fixtures live under `tests/test-cases/xgboost/{booster}/{name}.*`:
//! `model.json` is the XGBoost dump, `input.json` holds raw patient
//! attributes and `expected.json` the hand-computed margins, probabilities
//! and labels. For assertion helpers, use `diabetes_screen::testing`.

#![allow(dead_code)]

use std::fs::File;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;

use diabetes_screen::compat::XgbModel;

#[allow(unused_imports)]
pub use diabetes_screen::assert_approx_eq;
#[allow(unused_imports)]
pub use diabetes_screen::testing::{assert_slice_approx_eq, assert_vector_eq, DEFAULT_TOLERANCE};

// =============================================================================
// Test Case Loading
// =============================================================================

/// Base directory for test cases.
pub fn test_cases_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/test-cases")
}

/// Directory for XGBoost test cases of one booster type.
pub fn xgboost_dir(booster: &str) -> PathBuf {
    test_cases_dir().join("xgboost").join(booster)
}

pub fn model_path(booster: &str, name: &str) -> PathBuf {
    xgboost_dir(booster).join(format!("{name}.model.json"))
}

/// Load a JSON file and deserialize it.
pub fn load_json<T: DeserializeOwned>(path: &Path) -> T {
    let file =
        File::open(path).unwrap_or_else(|e| panic!("Failed to open {}: {e}", path.display()));
    serde_json::from_reader(file)
        .unwrap_or_else(|e| panic!("Failed to parse {}: {e}", path.display()))
}

// =============================================================================
// Common Test Data Structures
// =============================================================================

/// Raw patients fed to a model.
#[derive(Debug, Deserialize)]
pub struct TestInput {
    pub patients: Vec<Value>,
}

/// Hand-computed outputs, one per patient.
#[derive(Debug, Deserialize)]
pub struct TestExpected {
    pub margins: Vec<f32>,
    pub probabilities: Vec<f32>,
    pub labels: Vec<i64>,
}

/// Load the model, inputs and expectations of one test case.
pub fn load_case(booster: &str, name: &str) -> (XgbModel, TestInput, TestExpected) {
    let dir = xgboost_dir(booster);
    let model = XgbModel::from_file(dir.join(format!("{name}.model.json")))
        .unwrap_or_else(|e| panic!("Failed to load model {booster}/{name}: {e}"));
    let input = load_json(&dir.join(format!("{name}.input.json")));
    let expected = load_json(&dir.join(format!("{name}.expected.json")));
    (model, input, expected)
}

/// Header of the public diabetes-prediction CSV.
pub const CSV_HEADER: &str =
    "gender,age,hypertension,heart_disease,smoking_history,bmi,HbA1c_level,blood_glucose_level,diabetes";
