//! Feature encoding: categorical encoders and the 11-column layout.

mod common;

use rstest::rstest;
use serde_json::{json, Map, Value};

use diabetes_screen::features::{
    build_feature_vector, encode_gender, encode_smoking, Column, FeatureVector, Gender,
    RawAttributes, SmokingHistory, FEATURE_NAMES, N_FEATURES,
};
use diabetes_screen::Error;

use common::assert_vector_eq;

fn example_attrs() -> Value {
    json!({
        "age": 45,
        "hypertension": 1,
        "heart_disease": 0,
        "bmi": 28.3,
        "HbA1c_level": 6.8,
        "blood_glucose_level": 140,
        "gender": "Female",
        "smoking_history": "current"
    })
}

fn as_map(value: &Value) -> &Map<String, Value> {
    value.as_object().expect("object")
}

// =============================================================================
// Categorical encoders
// =============================================================================

#[rstest]
#[case("Male", 1.0)]
#[case("Female", 0.0)]
fn gender_is_bijective(#[case] value: &str, #[case] expected: f32) {
    assert_eq!(encode_gender(value).unwrap(), expected);
}

#[rstest]
#[case("Other")]
#[case("male")]
#[case("FEMALE")]
#[case("")]
fn unknown_gender_is_rejected(#[case] value: &str) {
    let err = encode_gender(value).unwrap_err();
    assert!(matches!(
        err,
        Error::InvalidCategory { attribute: "gender", value: ref found } if found == value
    ));
}

#[rstest]
#[case("No_Info", [1.0, 0.0, 0.0, 0.0])]
#[case("No Info", [1.0, 0.0, 0.0, 0.0])]
#[case("current", [0.0, 1.0, 0.0, 0.0])]
#[case("former", [0.0, 0.0, 1.0, 0.0])]
#[case("not current", [0.0, 0.0, 1.0, 0.0])]
#[case("ever", [0.0, 0.0, 1.0, 0.0])]
#[case("never", [0.0, 0.0, 0.0, 1.0])]
fn smoking_is_one_hot(#[case] value: &str, #[case] expected: [f32; 4]) {
    let encoded = encode_smoking(value).unwrap();
    assert_eq!(encoded, expected);
    assert_eq!(encoded.iter().sum::<f32>(), 1.0);
}

#[rstest]
#[case("sometimes")]
#[case("Never")]
#[case("no info")]
fn unknown_smoking_is_rejected_not_zeroed(#[case] value: &str) {
    assert!(matches!(
        encode_smoking(value),
        Err(Error::InvalidCategory { attribute: "smoking_history", .. })
    ));
}

// =============================================================================
// Vector layout
// =============================================================================

#[test]
fn worked_example_female_current_smoker() {
    let vector = build_feature_vector(as_map(&example_attrs())).unwrap();
    assert_vector_eq(
        &vector,
        &[45.0, 1.0, 0.0, 28.3, 6.8, 140.0, 0.0, 0.0, 1.0, 0.0, 0.0],
        "worked example",
    );
}

#[test]
fn worked_example_male_not_current() {
    let mut attrs = example_attrs();
    attrs["gender"] = json!("Male");
    attrs["smoking_history"] = json!("not current");

    let vector = build_feature_vector(as_map(&attrs)).unwrap();
    assert_eq!(vector[Column::GenderEncoded], 1.0);
    assert_eq!(vector.smoking(), [0.0, 0.0, 1.0, 0.0]);
}

#[test]
fn key_order_does_not_matter() {
    let forward = example_attrs();
    let mut reversed = Map::new();
    for (k, v) in as_map(&forward).iter().rev() {
        reversed.insert(k.clone(), v.clone());
    }

    let a = build_feature_vector(as_map(&forward)).unwrap();
    let b = build_feature_vector(&reversed).unwrap();
    assert_eq!(a, b);
    assert_eq!(a.as_slice().len(), N_FEATURES);
}

#[test]
fn column_names_are_fixed() {
    assert_eq!(
        FEATURE_NAMES,
        [
            "age",
            "hypertension",
            "heart_disease",
            "bmi",
            "HbA1c_level",
            "blood_glucose_level",
            "gender_encoded",
            "smoking_No_Info",
            "smoking_current",
            "smoking_former",
            "smoking_never",
        ]
    );
    for (i, column) in Column::ALL.iter().enumerate() {
        assert_eq!(column.index(), i);
        assert_eq!(Column::from_name(column.name()), Some(*column));
    }
}

#[test]
fn typed_and_untyped_inputs_agree() {
    let attrs = RawAttributes::from_json(&example_attrs()).unwrap();
    let untyped = build_feature_vector(as_map(&example_attrs())).unwrap();
    assert_eq!(attrs.encode(), untyped);
}

#[test]
fn named_view_serializes_in_model_order() {
    let vector = build_feature_vector(as_map(&example_attrs())).unwrap();
    let text = serde_json::to_string(&vector).unwrap();
    let positions: Vec<usize> = FEATURE_NAMES
        .iter()
        .map(|name| text.find(&format!("\"{name}\"")).expect("column present"))
        .collect();
    assert!(positions.windows(2).all(|w| w[0] < w[1]));
}

// =============================================================================
// Schema errors
// =============================================================================

#[test]
fn missing_bmi_is_reported_without_partial_vector() {
    let mut attrs = example_attrs();
    attrs.as_object_mut().unwrap().remove("bmi");

    let err = build_feature_vector(as_map(&attrs)).unwrap_err();
    assert!(matches!(err, Error::MissingAttribute("bmi")));
    assert!(err.is_schema_error());
}

#[test]
fn null_counts_as_missing() {
    let mut attrs = example_attrs();
    attrs["age"] = Value::Null;
    assert!(matches!(
        build_feature_vector(as_map(&attrs)),
        Err(Error::MissingAttribute("age"))
    ));
}

#[rstest]
#[case("age", json!("forty-five"))]
#[case("age", json!(-3))]
#[case("hypertension", json!(2))]
#[case("heart_disease", json!("yes"))]
#[case("bmi", json!("28.3"))]
#[case("bmi", json!(1e39))]
#[case("HbA1c_level", json!(-1e300))]
#[case("blood_glucose_level", json!(140.5))]
#[case("gender", json!(1))]
#[case("smoking_history", json!(["never"]))]
fn wrong_types_are_schema_errors(#[case] key: &str, #[case] value: Value) {
    let mut attrs = example_attrs();
    attrs[key] = value;

    let err = build_feature_vector(as_map(&attrs)).unwrap_err();
    assert!(
        matches!(err, Error::InvalidAttribute { .. }),
        "{key}: expected InvalidAttribute, got {err:?}"
    );
    assert!(err.is_schema_error());
}

#[test]
fn overflowing_bmi_never_reaches_the_vector() {
    let mut attrs = example_attrs();
    attrs["bmi"] = json!(1e39);
    let err = build_feature_vector(as_map(&attrs)).unwrap_err();
    assert!(matches!(err, Error::InvalidAttribute { name: "bmi", .. }), "{err:?}");
}

#[test]
fn typed_nan_and_negative_age_are_rejected() {
    let nan_bmi = RawAttributes::new(
        45.0,
        true,
        false,
        f32::NAN,
        6.8,
        140,
        Gender::Female,
        SmokingHistory::Current,
    );
    assert!(matches!(nan_bmi, Err(Error::InvalidAttribute { name: "bmi", .. })));

    let negative_age = RawAttributes::new(
        -5.0,
        true,
        false,
        28.3,
        6.8,
        140,
        Gender::Female,
        SmokingHistory::Current,
    );
    assert!(matches!(negative_age, Err(Error::InvalidAttribute { name: "age", .. })));
}

#[test]
fn typed_attributes_match_worked_example() {
    let attrs = RawAttributes::new(
        45.0,
        true,
        false,
        28.3,
        6.8,
        140,
        Gender::Female,
        SmokingHistory::Current,
    )
    .unwrap();
    assert_vector_eq(
        &attrs.encode(),
        &[45.0, 1.0, 0.0, 28.3, 6.8, 140.0, 0.0, 0.0, 1.0, 0.0, 0.0],
        "typed worked example",
    );
}

#[test]
fn boolean_flags_are_accepted() {
    let mut attrs = example_attrs();
    attrs["hypertension"] = json!(true);
    attrs["heart_disease"] = json!(false);
    let vector = build_feature_vector(as_map(&attrs)).unwrap();
    assert_eq!(vector[Column::Hypertension], 1.0);
    assert_eq!(vector[Column::HeartDisease], 0.0);
}

#[test]
fn other_gender_is_a_category_error_not_a_schema_error() {
    let mut attrs = example_attrs();
    attrs["gender"] = json!("Other");
    let err = build_feature_vector(as_map(&attrs)).unwrap_err();
    assert!(matches!(err, Error::InvalidCategory { attribute: "gender", .. }));
    assert!(!err.is_schema_error());
}

#[test]
fn encoded_rows_are_validated() {
    let two_smoking: [f32; 11] = [45.0, 1.0, 0.0, 28.3, 6.8, 140.0, 0.0, 1.0, 1.0, 0.0, 0.0];
    assert!(FeatureVector::try_from(&two_smoking[..]).is_err());
    assert!(FeatureVector::try_from(&two_smoking[..10]).is_err());
}
