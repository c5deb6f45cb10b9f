//! Labelled reference dataset in the public diabetes-prediction CSV layout.

use std::io;
use std::path::Path;

use serde::Deserialize;
use serde_json::{json, Map, Value};
use tracing::{debug, info, warn};

use crate::features::{build_feature_vector, flag_from_int, FeatureVector};

use super::ReferenceError;

/// Attribute columns every reference CSV must carry.
pub const DATASET_COLUMNS: [&str; 8] = [
    "gender",
    "age",
    "hypertension",
    "heart_disease",
    "smoking_history",
    "bmi",
    "HbA1c_level",
    "blood_glucose_level",
];

/// Optional ground-truth column.
pub const LABEL_COLUMN: &str = "diabetes";

/// One CSV row before validation. Empty cells deserialize to `None` and are
/// then reported as missing by the encoder.
#[derive(Debug, Deserialize)]
struct DatasetRecord {
    gender: Option<String>,
    age: Option<f64>,
    hypertension: Option<f64>,
    heart_disease: Option<f64>,
    smoking_history: Option<String>,
    bmi: Option<f64>,
    #[serde(rename = "HbA1c_level")]
    hba1c_level: Option<f64>,
    blood_glucose_level: Option<f64>,
    #[serde(default)]
    diabetes: Option<i64>,
}

impl DatasetRecord {
    fn attributes(&self) -> Map<String, Value> {
        let mut map = Map::new();
        map.insert("gender".into(), json!(self.gender));
        map.insert("age".into(), json!(self.age));
        map.insert("hypertension".into(), json!(self.hypertension));
        map.insert("heart_disease".into(), json!(self.heart_disease));
        map.insert("smoking_history".into(), json!(self.smoking_history));
        map.insert("bmi".into(), json!(self.bmi));
        map.insert("HbA1c_level".into(), json!(self.hba1c_level));
        map.insert("blood_glucose_level".into(), json!(self.blood_glucose_level));
        map
    }
}

/// Encoded rows of a reference CSV.
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    pub rows: Vec<FeatureVector>,
    /// Present when the file has a `diabetes` column; aligned with `rows`.
    pub labels: Option<Vec<i64>>,
    /// Rows the encoder (or the CSV decoder) rejected.
    pub skipped: usize,
}

/// Read and encode a reference CSV.
///
/// Every row goes through [`build_feature_vector`]; rows it rejects (for
/// example gender `Other`) are counted in [`Dataset::skipped`], never recoded.
pub fn read_dataset<R: io::Read>(reader: R) -> Result<Dataset, ReferenceError> {
    let mut reader = csv::Reader::from_reader(reader);

    let headers = reader.headers()?.clone();
    if let Some(missing) = DATASET_COLUMNS
        .into_iter()
        .find(|c| !headers.iter().any(|h| h == *c))
    {
        return Err(ReferenceError::MissingColumn(missing));
    }
    let labelled = headers.iter().any(|h| h == LABEL_COLUMN);

    let mut dataset = Dataset {
        labels: labelled.then(Vec::new),
        ..Dataset::default()
    };

    for (line, result) in reader.deserialize::<DatasetRecord>().enumerate() {
        // header is line 1
        let line = line + 2;
        let record = match result {
            Ok(record) => record,
            Err(err) => {
                debug!(line, error = %err, "skipping undecodable row");
                dataset.skipped += 1;
                continue;
            }
        };

        let vector = match build_feature_vector(&record.attributes()) {
            Ok(vector) => vector,
            Err(err) => {
                debug!(line, error = %err, "skipping rejected row");
                dataset.skipped += 1;
                continue;
            }
        };

        if let Some(labels) = dataset.labels.as_mut() {
            let label = record
                .diabetes
                .map(|v| flag_from_int(LABEL_COLUMN, v));
            match label {
                Some(Ok(positive)) => labels.push(i64::from(positive)),
                Some(Err(err)) => {
                    debug!(line, error = %err, "skipping row with invalid label");
                    dataset.skipped += 1;
                    continue;
                }
                None => {
                    debug!(line, "skipping row without label");
                    dataset.skipped += 1;
                    continue;
                }
            }
        }
        dataset.rows.push(vector);
    }

    Ok(dataset)
}

/// Open and read a reference CSV from disk.
pub fn load_dataset(path: impl AsRef<Path>) -> Result<Dataset, ReferenceError> {
    let path = path.as_ref();
    let file = std::fs::File::open(path).map_err(|source| ReferenceError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let dataset = read_dataset(io::BufReader::new(file))?;

    if dataset.skipped > 0 {
        warn!(
            path = %path.display(),
            skipped = dataset.skipped,
            "reference rows rejected by the encoder"
        );
    }
    info!(
        path = %path.display(),
        rows = dataset.rows.len(),
        labelled = dataset.labels.is_some(),
        "loaded reference dataset"
    );
    Ok(dataset)
}
