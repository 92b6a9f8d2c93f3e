use serde::Serialize;

use super::domain::{ApplicantRecord, FarmerId};
use super::fraud::AnomalySignal;

/// Upstream classifier producing the approval probability consumed by the blender.
pub trait ApprovalModel: Send + Sync {
    fn approval_probability(&self, record: &ApplicantRecord) -> Result<f64, ModelError>;
    fn status(&self) -> ModelStatus;
}

/// Upstream outlier detector producing the anomaly score and fraud verdict.
pub trait AnomalyDetector: Send + Sync {
    fn detect(&self, record: &ApplicantRecord) -> Result<AnomalySignal, ModelError>;
    fn status(&self) -> ModelStatus;
}

/// Failure reported by an upstream model adapter.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ModelError {
    #[error("model not loaded")]
    NotLoaded,
    #[error("no upstream signal for farmer {farmer_id}")]
    MissingSignal { farmer_id: FarmerId },
    #[error("model backend failed: {0}")]
    Backend(String),
}

/// Health snapshot of one upstream model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ModelStatus {
    pub status: &'static str,
    pub model_loaded: bool,
    pub backend: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    pub signals: usize,
}

impl ModelStatus {
    pub fn ready(backend: &'static str, source: Option<String>, signals: usize) -> Self {
        Self {
            status: "ready",
            model_loaded: true,
            backend,
            source,
            signals,
        }
    }

    pub fn not_loaded(backend: &'static str) -> Self {
        Self {
            status: "not_loaded",
            model_loaded: false,
            backend,
            source: None,
            signals: 0,
        }
    }
}
