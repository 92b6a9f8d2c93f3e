use std::sync::Arc;

use serde::Serialize;
use serde_json::{Map, Value};
use tracing::{debug, info};

use super::domain::{ApplicantRecord, InlineSignals, ScoringError};
use super::fraud::{AnomalyClassifier, AnomalyResult, AnomalySignal};
use super::models::{AnomalyDetector, ApprovalModel, ModelError, ModelStatus};
use super::report::{BatchAggregator, FraudSummary, RankedBatch};
use super::scoring::{Prediction, PriorityEngine, RuleScore, MAX_RULE_SCORE};

/// One applicant to prioritise, optionally with the approval probability already known.
#[derive(Debug, Clone, PartialEq)]
pub struct PredictionRequest {
    pub record: ApplicantRecord,
    pub grant_id: Option<String>,
    pub approval_probability: Option<f64>,
}

impl PredictionRequest {
    pub fn new(record: ApplicantRecord) -> Self {
        Self {
            record,
            grant_id: None,
            approval_probability: None,
        }
    }

    pub fn with_probability(mut self, approval_probability: f64) -> Self {
        self.approval_probability = Some(approval_probability);
        self
    }

    pub fn for_grant(mut self, grant_id: impl Into<String>) -> Self {
        self.grant_id = Some(grant_id.into());
        self
    }

    /// Flat applicant map that may carry an inline `approval_probability`.
    pub fn from_fields(fields: &Map<String, Value>) -> Result<Self, ScoringError> {
        let signals = InlineSignals::for_prediction(fields)?;
        Ok(Self {
            record: ApplicantRecord::from_fields(fields)?,
            grant_id: None,
            approval_probability: signals.approval_probability,
        })
    }
}

/// One application to screen, optionally with the detector output already known.
#[derive(Debug, Clone, PartialEq)]
pub struct FraudRequest {
    pub record: ApplicantRecord,
    pub signal: Option<AnomalySignal>,
}

impl FraudRequest {
    pub fn new(record: ApplicantRecord) -> Self {
        Self {
            record,
            signal: None,
        }
    }

    pub fn with_signal(mut self, signal: AnomalySignal) -> Self {
        self.signal = Some(signal);
        self
    }

    /// Flat application map that may carry inline `anomaly_score` and `is_anomaly`.
    pub fn from_fields(fields: &Map<String, Value>) -> Result<Self, ScoringError> {
        let signals = InlineSignals::for_screening(fields)?;
        let signal = match (signals.anomaly_score, signals.is_anomaly) {
            (Some(score), flag) => Some(AnomalySignal::new(score, flag.unwrap_or(false))?),
            (None, Some(_)) => {
                return Err(ScoringError::MalformedField {
                    field: "anomaly_score",
                    expected: "a number when is_anomaly is given",
                    raw: "null".to_string(),
                })
            }
            (None, None) => None,
        };

        Ok(Self {
            record: ApplicantRecord::from_fields(fields)?,
            signal,
        })
    }
}

/// Screened applications in submission order with their roll-up.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FraudBatch {
    pub results: Vec<AnomalyResult>,
    pub summary: FraudSummary,
}

impl FraudBatch {
    pub fn message(&self) -> String {
        format!(
            "Fraud detection completed. Found {} suspicious applications.",
            self.summary.fraud_detected
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ServiceStatus {
    pub approval_model: ModelStatus,
    pub anomaly_detector: ModelStatus,
    pub max_rule_score: f64,
}

/// Service composing the scoring engine, the classifier and the upstream model seams.
pub struct GrantPrioritizationService<M, D> {
    engine: PriorityEngine,
    classifier: AnomalyClassifier,
    aggregator: BatchAggregator,
    approval_model: Arc<M>,
    detector: Arc<D>,
}

impl<M, D> GrantPrioritizationService<M, D>
where
    M: ApprovalModel + 'static,
    D: AnomalyDetector + 'static,
{
    pub fn new(approval_model: Arc<M>, detector: Arc<D>) -> Self {
        Self {
            engine: PriorityEngine::new(),
            classifier: AnomalyClassifier,
            aggregator: BatchAggregator,
            approval_model,
            detector,
        }
    }

    pub fn rule_score(&self, record: &ApplicantRecord) -> RuleScore {
        self.engine.rule_score(record)
    }

    /// Score one applicant. An explicit probability wins over the approval model.
    pub fn predict(&self, request: PredictionRequest) -> Result<Prediction, GrantServiceError> {
        let approval_probability = match request.approval_probability {
            Some(probability) => probability,
            None => self.approval_model.approval_probability(&request.record)?,
        };

        let prediction = self.engine.predict(&request.record, approval_probability)?;
        debug!(
            farmer_id = %prediction.farmer_id(),
            grant_id = request.grant_id.as_deref().unwrap_or("-"),
            priority_score = prediction.result.priority_score,
            recommendation = prediction.recommendation(),
            "scored applicant"
        );

        Ok(prediction)
    }

    pub fn predict_batch(
        &self,
        requests: Vec<PredictionRequest>,
    ) -> Result<RankedBatch<Prediction>, GrantServiceError> {
        let grant_id = requests
            .first()
            .and_then(|request| request.grant_id.clone());

        let predictions = requests
            .into_iter()
            .map(|request| self.predict(request))
            .collect::<Result<Vec<_>, _>>()?;
        let batch = self.aggregator.aggregate(predictions)?;

        info!(
            grant_id = grant_id.as_deref().unwrap_or("-"),
            total = batch.summary.total_farmers,
            high = batch.summary.high_priority,
            medium = batch.summary.medium_priority,
            low = batch.summary.low_priority,
            avg_priority_score = batch.summary.avg_priority_score,
            "ranked grant applicants"
        );

        Ok(batch)
    }

    /// Screen one application. An explicit signal wins over the detector.
    pub fn assess(&self, request: FraudRequest) -> Result<AnomalyResult, GrantServiceError> {
        let signal = match request.signal {
            Some(signal) => signal,
            None => self.detector.detect(&request.record)?,
        };

        let result = self.classifier.assess(&request.record, signal);
        debug!(
            farmer_id = %result.farmer_id,
            anomaly_score = result.anomaly_score,
            risk_level = result.risk_level.label(),
            is_fraudulent = result.is_fraudulent,
            "screened application"
        );

        Ok(result)
    }

    pub fn detect_fraud(
        &self,
        requests: Vec<FraudRequest>,
    ) -> Result<FraudBatch, GrantServiceError> {
        let results = requests
            .into_iter()
            .map(|request| self.assess(request))
            .collect::<Result<Vec<_>, _>>()?;
        let summary = self.aggregator.aggregate_fraud(&results)?;

        info!(
            total = summary.total_applications,
            fraud_detected = summary.fraud_detected,
            high_risk = summary.risk_distribution.high,
            "screened grant applications"
        );

        Ok(FraudBatch { results, summary })
    }

    pub fn status(&self) -> ServiceStatus {
        ServiceStatus {
            approval_model: self.approval_model.status(),
            anomaly_detector: self.detector.status(),
            max_rule_score: MAX_RULE_SCORE,
        }
    }
}

/// Error raised by the grant prioritization service.
#[derive(Debug, thiserror::Error)]
pub enum GrantServiceError {
    #[error(transparent)]
    Scoring(#[from] ScoringError),
    #[error(transparent)]
    Upstream(#[from] ModelError),
}
