//! Precomputed upstream outputs loaded from CSV.
//!
//! The approval classifier and the anomaly detector are trained and run outside this crate.
//! Their per-applicant outputs are exported to a CSV with the columns `farmer_id`,
//! `approval_probability`, `anomaly_score` and `is_anomaly`; any of the signal columns may be
//! blank for a given row.

use std::collections::HashMap;
use std::io::Read;
use std::path::Path;

use serde::{Deserialize, Deserializer};

use super::domain::{ApplicantRecord, FarmerId};
use super::fraud::AnomalySignal;
use super::models::{AnomalyDetector, ApprovalModel, ModelError, ModelStatus};

const BACKEND: &str = "signal_table";

#[derive(Debug)]
pub enum SignalImportError {
    Io(std::io::Error),
    Csv(csv::Error),
    Invalid { line: usize, message: String },
}

impl std::fmt::Display for SignalImportError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SignalImportError::Io(err) => write!(f, "failed to read signal table: {}", err),
            SignalImportError::Csv(err) => write!(f, "invalid signal CSV data: {}", err),
            SignalImportError::Invalid { line, message } => {
                write!(f, "invalid signal row at line {}: {}", line, message)
            }
        }
    }
}

impl std::error::Error for SignalImportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SignalImportError::Io(err) => Some(err),
            SignalImportError::Csv(err) => Some(err),
            SignalImportError::Invalid { .. } => None,
        }
    }
}

impl From<std::io::Error> for SignalImportError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<csv::Error> for SignalImportError {
    fn from(err: csv::Error) -> Self {
        Self::Csv(err)
    }
}

/// Lookup table answering both upstream seams from exported model outputs.
#[derive(Debug, Clone, Default)]
pub struct SignalTable {
    loaded: bool,
    source: Option<String>,
    probabilities: HashMap<FarmerId, f64>,
    anomalies: HashMap<FarmerId, AnomalySignal>,
}

impl SignalTable {
    /// Table standing in for models that were never trained or exported.
    pub fn unloaded() -> Self {
        Self::default()
    }

    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, SignalImportError> {
        let file = std::fs::File::open(path.as_ref())?;
        let mut table = Self::from_reader(file)?;
        table.source = Some(path.as_ref().display().to_string());
        Ok(table)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self, SignalImportError> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(reader);
        let mut table = Self {
            loaded: true,
            ..Self::default()
        };

        for (index, row) in csv_reader.deserialize::<SignalRow>().enumerate() {
            let row = row?;
            // header is line 1
            table.insert(index + 2, row)?;
        }

        Ok(table)
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    pub fn probability_for(&self, farmer_id: &FarmerId) -> Option<f64> {
        self.probabilities.get(farmer_id).copied()
    }

    pub fn anomaly_for(&self, farmer_id: &FarmerId) -> Option<AnomalySignal> {
        self.anomalies.get(farmer_id).copied()
    }

    fn insert(&mut self, line: usize, row: SignalRow) -> Result<(), SignalImportError> {
        let invalid = |message: String| SignalImportError::Invalid { line, message };

        let farmer_id = FarmerId(row.farmer_id);
        if farmer_id.0.is_empty() {
            return Err(invalid("farmer_id is empty".to_string()));
        }
        if self.probabilities.contains_key(&farmer_id) || self.anomalies.contains_key(&farmer_id) {
            return Err(invalid(format!("duplicate farmer_id {}", farmer_id)));
        }

        if let Some(probability) = row.approval_probability {
            if !(0.0..=1.0).contains(&probability) {
                return Err(invalid(format!(
                    "approval_probability {} is outside [0, 1]",
                    probability
                )));
            }
            self.probabilities.insert(farmer_id.clone(), probability);
        }

        match (row.anomaly_score, row.is_anomaly) {
            (Some(score), flag) => {
                let signal = AnomalySignal::new(score, flag.unwrap_or(false))
                    .map_err(|err| invalid(err.to_string()))?;
                self.anomalies.insert(farmer_id, signal);
            }
            (None, Some(_)) => {
                return Err(invalid("is_anomaly given without anomaly_score".to_string()));
            }
            (None, None) => {}
        }

        Ok(())
    }

    fn status_with(&self, signals: usize) -> ModelStatus {
        if self.loaded {
            ModelStatus::ready(BACKEND, self.source.clone(), signals)
        } else {
            ModelStatus::not_loaded(BACKEND)
        }
    }
}

impl ApprovalModel for SignalTable {
    fn approval_probability(&self, record: &ApplicantRecord) -> Result<f64, ModelError> {
        if !self.loaded {
            return Err(ModelError::NotLoaded);
        }
        self.probability_for(&record.farmer_id)
            .ok_or_else(|| ModelError::MissingSignal {
                farmer_id: record.farmer_id.clone(),
            })
    }

    fn status(&self) -> ModelStatus {
        self.status_with(self.probabilities.len())
    }
}

impl AnomalyDetector for SignalTable {
    fn detect(&self, record: &ApplicantRecord) -> Result<AnomalySignal, ModelError> {
        if !self.loaded {
            return Err(ModelError::NotLoaded);
        }
        self.anomaly_for(&record.farmer_id)
            .ok_or_else(|| ModelError::MissingSignal {
                farmer_id: record.farmer_id.clone(),
            })
    }

    fn status(&self) -> ModelStatus {
        self.status_with(self.anomalies.len())
    }
}

#[derive(Debug, Deserialize)]
struct SignalRow {
    farmer_id: String,
    #[serde(default)]
    approval_probability: Option<f64>,
    #[serde(default)]
    anomaly_score: Option<f64>,
    #[serde(default, deserialize_with = "flag_or_none")]
    is_anomaly: Option<bool>,
}

fn flag_or_none<'de, D>(deserializer: D) -> Result<Option<bool>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    match raw.as_deref().map(|value| value.trim().to_ascii_lowercase()) {
        None => Ok(None),
        Some(value) => match value.as_str() {
            "" => Ok(None),
            "true" | "1" | "yes" => Ok(Some(true)),
            "false" | "0" | "no" => Ok(Some(false)),
            other => Err(serde::de::Error::custom(format!(
                "expected a boolean flag, found `{}`",
                other
            ))),
        },
    }
}
