use std::io::{self, Read};
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use serde_json::{Map, Value};
use tracing::{info, warn};

use diabetes_screen::config::{Config, CONFIG_FILE_NAME};
use diabetes_screen::features::{FeatureVector, RawAttributes};
use diabetes_screen::inference::decide;
use diabetes_screen::logging;
use diabetes_screen::model::{load_model, XgbClassifier};
use diabetes_screen::reference::{Evaluation, ReferenceData, ReferenceSource};
use diabetes_screen::screen::{interpret, Screening};

#[derive(Parser)]
#[command(author, version, about = "Screen patient attributes for diabetes risk", long_about = None)]
struct Cli {
    /// Config file (defaults to ./diabetes-screen.toml when present)
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,
    /// XGBoost JSON model, overriding `model_path` from the config
    #[arg(long, global = true, value_name = "FILE")]
    model: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Screen one patient
    Predict {
        #[command(flatten)]
        patient: PatientArgs,
        /// Print a JSON report instead of the diagnosis line
        #[arg(long)]
        json: bool,
    },
    /// Print the encoded feature vector without loading a model
    Encode {
        #[command(flatten)]
        patient: PatientArgs,
        /// Print JSON
        #[arg(long)]
        json: bool,
    },
    /// Print per-column bounds of the reference data
    Bounds {
        /// Reference CSV, overriding `[reference]` from the config
        #[arg(long, value_name = "CSV")]
        dataset: Option<PathBuf>,
    },
    /// Batch-predict a labelled reference CSV and report accuracy
    Evaluate {
        /// Labelled reference CSV, overriding `[reference]` from the config
        #[arg(long, value_name = "CSV")]
        dataset: Option<PathBuf>,
        /// Print JSON
        #[arg(long)]
        json: bool,
    },
    /// Write the effective settings to a config file
    Init {
        /// Destination (defaults to ./diabetes-screen.toml)
        #[arg(value_name = "FILE")]
        path: Option<PathBuf>,
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

/// Patient attributes, from flags or a JSON document.
#[derive(Args)]
struct PatientArgs {
    /// JSON object with the raw attributes (`-` for stdin)
    #[arg(
        long,
        value_name = "FILE",
        conflicts_with_all = ["age", "hypertension", "heart_disease", "bmi", "hba1c", "glucose", "gender", "smoking"]
    )]
    input: Option<PathBuf>,
    /// Age in years
    #[arg(long)]
    age: Option<f64>,
    /// Hypertension (0 or 1)
    #[arg(long, value_parser = clap::value_parser!(u8).range(0..=1))]
    hypertension: Option<u8>,
    /// Heart disease (0 or 1)
    #[arg(long, value_parser = clap::value_parser!(u8).range(0..=1))]
    heart_disease: Option<u8>,
    /// Body mass index
    #[arg(long)]
    bmi: Option<f64>,
    /// HbA1c level (%)
    #[arg(long)]
    hba1c: Option<f64>,
    /// Blood glucose level (mg/dL)
    #[arg(long)]
    glucose: Option<u32>,
    /// Male or Female
    #[arg(long)]
    gender: Option<String>,
    /// No Info, never, former, current, not current or ever
    #[arg(long)]
    smoking: Option<String>,
}

impl PatientArgs {
    /// Collect the attributes; validation is left to [`RawAttributes`].
    fn to_json(&self) -> Result<Value> {
        if let Some(path) = &self.input {
            return read_json(path);
        }
        let mut map = Map::new();
        let mut put = |key: &str, value: Option<Value>| {
            if let Some(value) = value {
                map.insert(key.to_string(), value);
            }
        };
        put("age", self.age.map(Value::from));
        put("hypertension", self.hypertension.map(Value::from));
        put("heart_disease", self.heart_disease.map(Value::from));
        put("bmi", self.bmi.map(Value::from));
        put("HbA1c_level", self.hba1c.map(Value::from));
        put("blood_glucose_level", self.glucose.map(Value::from));
        put("gender", self.gender.clone().map(Value::from));
        put("smoking_history", self.smoking.clone().map(Value::from));
        Ok(Value::Object(map))
    }

    fn attributes(&self) -> Result<RawAttributes> {
        let value = self.to_json()?;
        Ok(RawAttributes::from_json(&value)?)
    }
}

fn read_json(path: &Path) -> Result<Value> {
    if path == Path::new("-") {
        let mut text = String::new();
        io::stdin()
            .read_to_string(&mut text)
            .context("failed to read attributes from stdin")?;
        return serde_json::from_str(&text).context("stdin is not valid JSON");
    }
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("{} is not valid JSON", path.display()))
}

#[derive(Serialize)]
struct PredictReport<'a> {
    attributes: &'a RawAttributes,
    #[serde(flatten)]
    screening: &'a Screening,
    /// Positive-class probability, for objectives that produce one.
    probability: Option<f32>,
    label: &'static str,
}

#[derive(Serialize)]
struct EvaluateReport {
    rows: usize,
    skipped: usize,
    #[serde(flatten)]
    counts: Evaluation,
    accuracy: f64,
    precision: f64,
    recall: f64,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = Config::discover(cli.config.as_deref())?;
    logging::init(&config.logging.filter)?;

    let model_path = cli.model.clone().unwrap_or_else(|| config.model_path.clone());

    match cli.command {
        Commands::Predict { patient, json } => {
            predict(&patient, &model_path, &config.reference, json)
        }
        Commands::Encode { patient, json } => encode(&patient, json),
        Commands::Bounds { dataset } => bounds(&reference_source(&config, dataset)),
        Commands::Evaluate { dataset, json } => {
            evaluate(&model_path, &reference_source(&config, dataset), json)
        }
        Commands::Init { path, force } => init(
            &config,
            &model_path,
            &path.unwrap_or_else(|| PathBuf::from(CONFIG_FILE_NAME)),
            force,
        ),
    }
}

fn reference_source(config: &Config, dataset: Option<PathBuf>) -> ReferenceSource {
    match dataset {
        Some(path) => ReferenceSource::Dataset { path },
        None => config.reference.clone(),
    }
}

fn load(model_path: &Path) -> Result<XgbClassifier> {
    load_model(model_path).with_context(|| format!("cannot use model {}", model_path.display()))
}

/// Range warnings never block a prediction.
fn warn_out_of_range(source: &ReferenceSource, vector: &FeatureVector) {
    match ReferenceData::load(source) {
        Ok(reference) => {
            for issue in reference.bounds().check(vector) {
                warn!("{issue}");
            }
        }
        Err(err) => warn!(error = %err, "reference data unavailable, skipping range check"),
    }
}

fn predict(
    patient: &PatientArgs,
    model_path: &Path,
    reference: &ReferenceSource,
    json: bool,
) -> Result<()> {
    let attributes = patient.attributes()?;
    let model = load(model_path)?;

    let (screening, probability) = screen_once(&model, &attributes)?;
    warn_out_of_range(reference, &screening.features);
    info!(
        prediction = screening.prediction,
        probability = ?probability,
        "screened patient"
    );

    if json {
        let report = PredictReport {
            attributes: &attributes,
            screening: &screening,
            probability,
            label: screening.diagnosis.message(),
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        match probability {
            Some(p) => println!("{} (p = {p:.3})", screening.diagnosis),
            None => println!("{}", screening.diagnosis),
        }
    }
    Ok(())
}

/// Screen with a single model pass; the label is thresholded from the same
/// output that is reported as the probability.
fn screen_once(
    model: &XgbClassifier,
    attributes: &RawAttributes,
) -> Result<(Screening, Option<f32>)> {
    let features = attributes.encode();
    let output = model
        .predict_proba(&features.to_table())?
        .first()
        .copied()
        .context("model returned no output")?;
    let prediction = decide(output);
    let screening = Screening {
        features,
        prediction,
        diagnosis: interpret(prediction),
    };
    let probability = model.objective().outputs_probability().then_some(output);
    Ok((screening, probability))
}

fn encode(patient: &PatientArgs, json: bool) -> Result<()> {
    let vector = patient.attributes()?.encode();
    if json {
        println!("{}", serde_json::to_string_pretty(&vector)?);
    } else {
        for (name, value) in vector.named() {
            println!("{name:<20} {value}");
        }
    }
    Ok(())
}

fn bounds(source: &ReferenceSource) -> Result<()> {
    let reference = ReferenceData::load(source).context("failed to load reference data")?;
    println!(
        "{} reference rows ({} rejected)",
        reference.rows().len(),
        reference.skipped()
    );
    println!("{:<20} {:>10} {:>10}", "column", "min", "max");
    for (column, range) in reference.bounds().iter() {
        println!("{:<20} {:>10} {:>10}", column.name(), range.min, range.max);
    }
    Ok(())
}

fn evaluate(model_path: &Path, source: &ReferenceSource, json: bool) -> Result<()> {
    if matches!(source, ReferenceSource::Builtin) {
        bail!("the builtin sample is unlabelled; pass --dataset or configure [reference] source = \"dataset\"");
    }
    let reference = ReferenceData::load(source).context("failed to load reference data")?;
    let model = load(model_path)?;
    let counts = reference.evaluate(&model)?;
    info!(rows = counts.total(), "evaluated reference data");

    let report = EvaluateReport {
        rows: counts.total(),
        skipped: reference.skipped(),
        counts,
        accuracy: counts.accuracy(),
        precision: counts.precision(),
        recall: counts.recall(),
    };
    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("rows: {}  (rejected: {})", report.rows, report.skipped);
        println!("accuracy:  {:.4}", report.accuracy);
        println!("precision: {:.4}", report.precision);
        println!("recall:    {:.4}", report.recall);
        println!(
            "confusion: tp={} tn={} fp={} fn={}",
            counts.true_positive, counts.true_negative, counts.false_positive, counts.false_negative
        );
    }
    Ok(())
}

fn init(config: &Config, model_path: &Path, path: &Path, force: bool) -> Result<()> {
    if path.exists() && !force {
        bail!("{} already exists; pass --force to overwrite", path.display());
    }
    let config = Config {
        model_path: model_path.to_path_buf(),
        ..config.clone()
    };
    config
        .save(path)
        .with_context(|| format!("failed to write {}", path.display()))?;
    println!("wrote {}", path.display());
    Ok(())
}
