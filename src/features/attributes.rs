//! Raw patient attributes and their conversion into a [`FeatureVector`].

use serde::Serialize;
use serde_json::{Map, Value};

use super::encode::{Gender, SmokingHistory};
use super::schema::{Column, FeatureVector, N_FEATURES};
use crate::error::Error;

/// Names of the raw attributes, in the order they are validated.
pub const ATTRIBUTE_NAMES: [&str; 8] = [
    "age",
    "hypertension",
    "heart_disease",
    "bmi",
    "HbA1c_level",
    "blood_glucose_level",
    "gender",
    "smoking_history",
];

/// Validated raw attribute set for one patient.
///
/// Fields are only reachable through [`RawAttributes::new`] or the JSON
/// parsers, so every instance encodes to a valid [`FeatureVector`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RawAttributes {
    /// Age in years. The reference dataset records infants with fractional ages.
    age: f32,
    hypertension: bool,
    heart_disease: bool,
    bmi: f32,
    #[serde(rename = "HbA1c_level")]
    hba1c_level: f32,
    blood_glucose_level: u32,
    gender: Gender,
    smoking_history: SmokingHistory,
}

impl RawAttributes {
    /// Build from typed values. Rejects a negative or non-finite age and a
    /// non-finite bmi or HbA1c.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        age: f32,
        hypertension: bool,
        heart_disease: bool,
        bmi: f32,
        hba1c_level: f32,
        blood_glucose_level: u32,
        gender: Gender,
        smoking_history: SmokingHistory,
    ) -> Result<Self, Error> {
        if !(age.is_finite() && age >= 0.0) {
            return Err(Error::InvalidAttribute {
                name: "age",
                expected: "a non-negative number",
                found: age.to_string(),
            });
        }
        for (name, v) in [("bmi", bmi), ("HbA1c_level", hba1c_level)] {
            if !v.is_finite() {
                return Err(Error::InvalidAttribute {
                    name,
                    expected: "a finite number",
                    found: v.to_string(),
                });
            }
        }
        Ok(Self {
            age,
            hypertension,
            heart_disease,
            bmi,
            hba1c_level,
            blood_glucose_level,
            gender,
            smoking_history,
        })
    }

    pub fn age(&self) -> f32 {
        self.age
    }

    pub fn hypertension(&self) -> bool {
        self.hypertension
    }

    pub fn heart_disease(&self) -> bool {
        self.heart_disease
    }

    pub fn bmi(&self) -> f32 {
        self.bmi
    }

    pub fn hba1c_level(&self) -> f32 {
        self.hba1c_level
    }

    pub fn blood_glucose_level(&self) -> u32 {
        self.blood_glucose_level
    }

    pub fn gender(&self) -> Gender {
        self.gender
    }

    pub fn smoking_history(&self) -> SmokingHistory {
        self.smoking_history
    }

    /// Parse an untyped attribute map, such as a decoded JSON payload.
    ///
    /// Key order is irrelevant. Unknown keys are ignored. `null` counts as
    /// missing.
    pub fn from_map(map: &Map<String, Value>) -> Result<Self, Error> {
        // Presence first, so a payload missing several keys always reports the
        // earliest one in attribute order.
        for name in ATTRIBUTE_NAMES {
            if map.get(name).map_or(true, Value::is_null) {
                return Err(Error::MissingAttribute(name));
            }
        }

        let field = |name: &'static str| &map[name];

        Self::new(
            non_negative("age", field("age"))?,
            flag("hypertension", field("hypertension"))?,
            flag("heart_disease", field("heart_disease"))?,
            finite("bmi", field("bmi"))?,
            finite("HbA1c_level", field("HbA1c_level"))?,
            whole("blood_glucose_level", field("blood_glucose_level"))?,
            text("gender", field("gender"))?.parse()?,
            text("smoking_history", field("smoking_history"))?.parse()?,
        )
    }

    /// Parse a JSON value that must be an object.
    pub fn from_json(value: &Value) -> Result<Self, Error> {
        match value {
            Value::Object(map) => Self::from_map(map),
            other => Err(Error::InvalidAttribute {
                name: "attributes",
                expected: "a JSON object",
                found: describe(other),
            }),
        }
    }

    /// Encode into the model column layout.
    pub fn encode(&self) -> FeatureVector {
        let mut values = [0.0f32; N_FEATURES];
        values[Column::Age.index()] = self.age;
        values[Column::Hypertension.index()] = indicator(self.hypertension);
        values[Column::HeartDisease.index()] = indicator(self.heart_disease);
        values[Column::Bmi.index()] = self.bmi;
        values[Column::HbA1c.index()] = self.hba1c_level;
        values[Column::BloodGlucose.index()] = self.blood_glucose_level as f32;
        values[Column::GenderEncoded.index()] = self.gender.encoded();

        let smoking = self.smoking_history.one_hot();
        for (column, v) in Column::SMOKING.iter().zip(smoking) {
            values[column.index()] = v;
        }

        FeatureVector::from_encoded(values)
    }
}

/// Build the encoded feature vector from an untyped attribute map.
///
/// Fails without producing a partial vector if any attribute is missing,
/// mistyped, or outside its category set.
pub fn build_feature_vector(attrs: &Map<String, Value>) -> Result<FeatureVector, Error> {
    RawAttributes::from_map(attrs).map(|a| a.encode())
}

#[inline]
fn indicator(flag: bool) -> f32 {
    if flag {
        1.0
    } else {
        0.0
    }
}

// =============================================================================
// Field validators
// =============================================================================

fn number(name: &'static str, value: &Value, expected: &'static str) -> Result<f64, Error> {
    // must stay finite once narrowed to f32
    value
        .as_f64()
        .filter(|v| (*v as f32).is_finite())
        .ok_or_else(|| Error::InvalidAttribute {
            name,
            expected,
            found: describe(value),
        })
}

fn finite(name: &'static str, value: &Value) -> Result<f32, Error> {
    number(name, value, "a finite number").map(|v| v as f32)
}

fn non_negative(name: &'static str, value: &Value) -> Result<f32, Error> {
    let expected = "a non-negative number";
    let v = number(name, value, expected)?;
    if v < 0.0 {
        return Err(Error::InvalidAttribute {
            name,
            expected,
            found: describe(value),
        });
    }
    Ok(v as f32)
}

fn whole(name: &'static str, value: &Value) -> Result<u32, Error> {
    let expected = "a non-negative integer";
    let v = number(name, value, expected)?;
    if v < 0.0 || v.fract() != 0.0 || v > u32::MAX as f64 {
        return Err(Error::InvalidAttribute {
            name,
            expected,
            found: describe(value),
        });
    }
    Ok(v as u32)
}

fn flag(name: &'static str, value: &Value) -> Result<bool, Error> {
    match value {
        Value::Bool(b) => Ok(*b),
        Value::Number(n) if n.as_f64() == Some(0.0) => Ok(false),
        Value::Number(n) if n.as_f64() == Some(1.0) => Ok(true),
        other => Err(Error::InvalidAttribute {
            name,
            expected: "0, 1, true or false",
            found: describe(other),
        }),
    }
}

fn text<'a>(name: &'static str, value: &'a Value) -> Result<&'a str, Error> {
    value.as_str().ok_or_else(|| Error::InvalidAttribute {
        name,
        expected: "a string",
        found: describe(value),
    })
}

/// Validate a 0/1 column read from a tabular source.
pub(crate) fn flag_from_int(name: &'static str, value: i64) -> Result<bool, Error> {
    flag(name, &Value::from(value))
}

fn describe(value: &Value) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::Bool(b) => format!("boolean {b}"),
        Value::Number(n) => format!("number {n}"),
        Value::String(s) => format!("string {s:?}"),
        Value::Array(_) => "an array".to_string(),
        Value::Object(_) => "an object".to_string(),
    }
}
