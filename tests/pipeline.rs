//! End-to-end screening: raw attributes through a loaded model to a diagnosis.

mod common;

use std::sync::Arc;
use std::thread;

use serde_json::json;

use diabetes_screen::testing::{ConstantClassifier, FailingClassifier};
use diabetes_screen::{
    interpret, load_model, predict, Classifier, Diagnosis, Error, InferenceError, LoadError,
    RawAttributes, Screener,
};

use common::{load_case, model_path, test_cases_dir};

#[test]
fn screens_fixture_patients() {
    let model = load_model(model_path("gbtree", "diabetes_stumps")).unwrap();
    let (_, input, expected) = load_case("gbtree", "diabetes_stumps");
    let screener = Screener::new(model);

    for (patient, &label) in input.patients.iter().zip(&expected.labels) {
        let screening = screener.screen_json(patient).unwrap();
        assert_eq!(screening.prediction, label);
        assert_eq!(screening.diagnosis, interpret(label));
    }
}

#[test]
fn worked_example_is_positive_with_fixture_model() {
    let screener = Screener::new(load_model(model_path("gbtree", "diabetes_stumps")).unwrap());
    let screening = screener
        .screen_json(&json!({
            "age": 45, "hypertension": 1, "heart_disease": 0, "bmi": 28.3,
            "HbA1c_level": 6.8, "blood_glucose_level": 140,
            "gender": "Female", "smoking_history": "current"
        }))
        .unwrap();
    assert_eq!(screening.diagnosis, Diagnosis::Positive);
    assert_eq!(screening.diagnosis.to_string(), "Diabetes Risk Detected");
}

#[test]
fn prediction_is_idempotent_and_shareable() {
    let model = Arc::new(load_model(model_path("dart", "diabetes_dart")).unwrap());
    let (_, input, _) = load_case("dart", "diabetes_dart");
    let vectors: Vec<_> = input
        .patients
        .iter()
        .map(|p| RawAttributes::from_json(p).unwrap().encode())
        .collect();
    let baseline: Vec<i64> = vectors
        .iter()
        .map(|v| predict(model.as_ref(), v).unwrap())
        .collect();

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let model = Arc::clone(&model);
            let vectors = vectors.clone();
            thread::spawn(move || {
                vectors
                    .iter()
                    .map(|v| predict(&model, v).unwrap())
                    .collect::<Vec<i64>>()
            })
        })
        .collect();
    for handle in handles {
        assert_eq!(handle.join().unwrap(), baseline);
    }
}

#[test]
fn schema_errors_reach_the_caller() {
    let screener = Screener::new(ConstantClassifier(1));
    let err = screener
        .screen_json(&json!({
            "age": 45, "hypertension": 1, "heart_disease": 0,
            "HbA1c_level": 6.8, "blood_glucose_level": 140,
            "gender": "Female", "smoking_history": "current"
        }))
        .unwrap_err();
    assert!(matches!(err, Error::MissingAttribute("bmi")));

    let err = screener.screen_json(&json!([1, 2, 3])).unwrap_err();
    assert!(err.is_schema_error());
}

#[test]
fn model_failures_are_inference_errors() {
    let screener = Screener::new(FailingClassifier(InferenceError::Backend(
        "predict raised".into(),
    )));
    let attrs = RawAttributes::from_json(&json!({
        "age": 70, "hypertension": 0, "heart_disease": 0, "bmi": 24.0,
        "HbA1c_level": 5.0, "blood_glucose_level": 90,
        "gender": "Male", "smoking_history": "never"
    }))
    .unwrap();
    assert!(matches!(
        screener.screen(&attrs),
        Err(Error::Inference(InferenceError::Backend(_)))
    ));
}

#[test]
fn unavailable_model_is_a_typed_error() {
    let err = load_model(test_cases_dir().join("missing.model.json")).unwrap_err();
    assert!(matches!(err, Error::ModelUnavailable(LoadError::Io { .. })));
}

#[test]
fn non_binary_models_are_unavailable() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("multi.model.json");
    let mut raw: serde_json::Value = common::load_json(&model_path("gbtree", "diabetes_stumps"));
    raw["learner"]["objective"]["name"] = json!("multi:softprob");
    raw["learner"]["learner_model_param"]["num_class"] = json!("3");
    std::fs::write(&path, serde_json::to_string(&raw).unwrap()).unwrap();

    let err = load_model(&path).unwrap_err();
    assert!(matches!(
        err,
        Error::ModelUnavailable(LoadError::UnsupportedObjective(ref name)) if name == "multi:softprob"
    ));
}

#[test]
fn corrupt_model_file_is_a_parse_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("broken.model.json");
    std::fs::write(&path, "{\"version\": [2, 0, 3], \"learner\": ").unwrap();
    assert!(matches!(
        load_model(&path),
        Err(Error::ModelUnavailable(LoadError::Parse(_)))
    ));
}

#[test]
fn boxed_classifiers_are_classifiers() {
    let boxed: Box<dyn Classifier> = Box::new(ConstantClassifier(0));
    let screener = Screener::new(boxed);
    let attrs = json!({
        "age": 33, "hypertension": false, "heart_disease": false, "bmi": 21.0,
        "HbA1c_level": 5.1, "blood_glucose_level": 88,
        "gender": "Female", "smoking_history": "No Info"
    });
    let screening = screener.screen_json(&attrs).unwrap();
    assert_eq!(screening.diagnosis, Diagnosis::Negative);
    assert_eq!(screening.diagnosis.message(), "No Diabetes Detected");
}
