//! Categorical encoders for gender and smoking history.

use std::fmt;
use std::str::FromStr;

use serde_with::{DeserializeFromStr, SerializeDisplay};

use crate::error::Error;

/// Patient gender as recorded by the training data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, SerializeDisplay, DeserializeFromStr)]
pub enum Gender {
    Male,
    Female,
}

impl Gender {
    /// Value of the `gender_encoded` column.
    #[inline]
    pub fn encoded(self) -> f32 {
        match self {
            Gender::Male => 1.0,
            Gender::Female => 0.0,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Gender::Male => "Male",
            Gender::Female => "Female",
        }
    }
}

impl FromStr for Gender {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Error> {
        match s {
            "Male" => Ok(Gender::Male),
            "Female" => Ok(Gender::Female),
            other => Err(Error::InvalidCategory {
                attribute: "gender",
                value: other.to_string(),
            }),
        }
    }
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Canonical smoking history categories.
///
/// Declaration order is the one-hot column order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, SerializeDisplay, DeserializeFromStr)]
pub enum SmokingHistory {
    NoInfo,
    Current,
    Former,
    Never,
}

impl SmokingHistory {
    pub const ALL: [SmokingHistory; 4] = [
        SmokingHistory::NoInfo,
        SmokingHistory::Current,
        SmokingHistory::Former,
        SmokingHistory::Never,
    ];

    /// Map legacy dataset spellings onto their canonical category name.
    ///
    /// `"not current"` and `"ever"` collapse into `"former"`, `"No Info"`
    /// becomes `"No_Info"`. Anything else is returned unchanged.
    pub fn canonicalize(raw: &str) -> &str {
        match raw {
            "not current" | "ever" => "former",
            "No Info" => "No_Info",
            other => other,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SmokingHistory::NoInfo => "No_Info",
            SmokingHistory::Current => "current",
            SmokingHistory::Former => "former",
            SmokingHistory::Never => "never",
        }
    }

    /// Position of this category inside the one-hot block.
    #[inline]
    pub fn slot(self) -> usize {
        self as usize
    }

    /// One-hot block `[No_Info, current, former, never]`.
    pub fn one_hot(self) -> [f32; 4] {
        let mut out = [0.0; 4];
        out[self.slot()] = 1.0;
        out
    }
}

impl FromStr for SmokingHistory {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Error> {
        match Self::canonicalize(s) {
            "No_Info" => Ok(SmokingHistory::NoInfo),
            "current" => Ok(SmokingHistory::Current),
            "former" => Ok(SmokingHistory::Former),
            "never" => Ok(SmokingHistory::Never),
            _ => Err(Error::InvalidCategory {
                attribute: "smoking_history",
                value: s.to_string(),
            }),
        }
    }
}

impl fmt::Display for SmokingHistory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Encode a gender string: `"Male"` → 1, `"Female"` → 0.
pub fn encode_gender(value: &str) -> Result<f32, Error> {
    value.parse::<Gender>().map(Gender::encoded)
}

/// Normalize and one-hot encode a smoking history string.
pub fn encode_smoking(value: &str) -> Result<[f32; 4], Error> {
    value.parse::<SmokingHistory>().map(SmokingHistory::one_hot)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn gender_is_bijective_over_known_values() {
        assert_eq!(encode_gender("Male").unwrap(), 1.0);
        assert_eq!(encode_gender("Female").unwrap(), 0.0);
    }

    #[rstest]
    #[case("Other")]
    #[case("male")]
    #[case("")]
    #[case(" Male")]
    fn gender_rejects_everything_else(#[case] raw: &str) {
        match encode_gender(raw).unwrap_err() {
            Error::InvalidCategory { attribute, value } => {
                assert_eq!(attribute, "gender");
                assert_eq!(value, raw);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[rstest]
    #[case("No_Info", [1.0, 0.0, 0.0, 0.0])]
    #[case("No Info", [1.0, 0.0, 0.0, 0.0])]
    #[case("current", [0.0, 1.0, 0.0, 0.0])]
    #[case("former", [0.0, 0.0, 1.0, 0.0])]
    #[case("not current", [0.0, 0.0, 1.0, 0.0])]
    #[case("ever", [0.0, 0.0, 1.0, 0.0])]
    #[case("never", [0.0, 0.0, 0.0, 1.0])]
    fn smoking_normalizes_and_one_hot_encodes(#[case] raw: &str, #[case] expected: [f32; 4]) {
        let encoded = encode_smoking(raw).unwrap();
        assert_eq!(encoded, expected);
        assert_eq!(encoded.iter().filter(|&&v| v == 1.0).count(), 1);
    }

    #[rstest]
    #[case("sometimes")]
    #[case("Current")]
    #[case("no info")]
    fn smoking_rejects_unknown(#[case] raw: &str) {
        assert!(matches!(
            encode_smoking(raw),
            Err(Error::InvalidCategory { attribute: "smoking_history", .. })
        ));
    }

    #[test]
    fn smoking_display_round_trips() {
        for s in SmokingHistory::ALL {
            assert_eq!(s.to_string().parse::<SmokingHistory>().unwrap(), s);
        }
    }

    #[test]
    fn serde_uses_dataset_spelling() {
        let json = serde_json::to_string(&SmokingHistory::NoInfo).unwrap();
        assert_eq!(json, "\"No_Info\"");
        let parsed: SmokingHistory = serde_json::from_str("\"not current\"").unwrap();
        assert_eq!(parsed, SmokingHistory::Former);
        assert!(serde_json::from_str::<Gender>("\"Other\"").is_err());
    }
}
