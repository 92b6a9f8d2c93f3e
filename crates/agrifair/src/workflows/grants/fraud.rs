//! Risk tiering of upstream anomaly scores and the risk-factor explanation pass.
//!
//! The anomaly detector is external; this module only interprets its two outputs. The tier
//! comes from the score, the fraud flag is the detector's own verdict, and the two are kept
//! apart: an applicant may sit in the medium tier without being flagged, or the reverse.

use serde::{Deserialize, Serialize};

use super::domain::{ApplicantRecord, FarmerId, ScoringError};

const HIGH_RISK_BELOW: f64 = -0.3;
const MEDIUM_RISK_BELOW: f64 = -0.1;

/// Ordered risk tier: `Low < Medium < High`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum RiskTier {
    #[serde(rename = "Low Risk")]
    Low,
    #[serde(rename = "Medium Risk")]
    Medium,
    #[serde(rename = "High Risk")]
    High,
}

impl RiskTier {
    /// Strict lower bounds: a score sitting exactly on a threshold takes the lower-risk tier.
    pub fn from_score(anomaly_score: f64) -> Self {
        if anomaly_score < HIGH_RISK_BELOW {
            RiskTier::High
        } else if anomaly_score < MEDIUM_RISK_BELOW {
            RiskTier::Medium
        } else {
            RiskTier::Low
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            RiskTier::Low => "Low Risk",
            RiskTier::Medium => "Medium Risk",
            RiskTier::High => "High Risk",
        }
    }

    pub const fn ordered() -> [RiskTier; 3] {
        [RiskTier::High, RiskTier::Medium, RiskTier::Low]
    }
}

/// Output of the external anomaly detector for one application.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AnomalySignal {
    anomaly_score: f64,
    is_anomaly: bool,
}

impl AnomalySignal {
    pub fn new(anomaly_score: f64, is_anomaly: bool) -> Result<Self, ScoringError> {
        if anomaly_score.is_nan() {
            return Err(ScoringError::NonFiniteSignal);
        }
        Ok(Self {
            anomaly_score,
            is_anomaly,
        })
    }

    pub fn anomaly_score(&self) -> f64 {
        self.anomaly_score
    }

    pub fn is_anomaly(&self) -> bool {
        self.is_anomaly
    }
}

/// Risk-tagged view of an application.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnomalyResult {
    pub farmer_id: FarmerId,
    pub farmer_name: String,
    pub monthly_income: f64,
    pub land_size_bigha: f64,
    pub previous_grants: u32,
    pub is_fraudulent: bool,
    pub anomaly_score: f64,
    pub risk_level: RiskTier,
    pub risk_factors: Vec<String>,
}

struct RiskRule {
    applies: fn(&ApplicantRecord, f64) -> bool,
    message: &'static str,
}

// income -> land -> grants -> anomaly
const RISK_RULES: &[RiskRule] = &[
    RiskRule {
        applies: |record, _| record.monthly_income > 30_000.0,
        message: "High income - may not need grant",
    },
    RiskRule {
        applies: |record, _| record.monthly_income < 8_000.0,
        message: "Very low income - needs verification",
    },
    RiskRule {
        applies: |record, _| record.land_size_bigha > 10.0,
        message: "Large land holding - may not need support",
    },
    RiskRule {
        applies: |record, _| record.land_size_bigha < 1.0,
        message: "Very small land - needs assessment",
    },
    RiskRule {
        applies: |record, _| record.previous_grants > 3,
        message: "Multiple previous grants - potential abuse",
    },
    RiskRule {
        applies: |record, _| record.previous_grants == 0,
        message: "No previous grants - first-time applicant",
    },
    RiskRule {
        applies: |_, score| RiskTier::from_score(score) == RiskTier::High,
        message: "High anomaly score - suspicious pattern",
    },
    RiskRule {
        applies: |_, score| RiskTier::from_score(score) == RiskTier::Medium,
        message: "Medium anomaly score - needs review",
    },
];

/// Maps detector output to a risk tier and explains the tier with record-level cues.
#[derive(Debug, Clone, Copy, Default)]
pub struct AnomalyClassifier;

impl AnomalyClassifier {
    pub fn tier_for(&self, anomaly_score: f64) -> RiskTier {
        RiskTier::from_score(anomaly_score)
    }

    pub fn classify(&self, signal: AnomalySignal) -> (RiskTier, bool) {
        (self.tier_for(signal.anomaly_score), signal.is_anomaly)
    }

    pub fn risk_factors(&self, record: &ApplicantRecord, anomaly_score: f64) -> Vec<String> {
        RISK_RULES
            .iter()
            .filter(|rule| (rule.applies)(record, anomaly_score))
            .map(|rule| rule.message.to_string())
            .collect()
    }

    pub fn assess(&self, record: &ApplicantRecord, signal: AnomalySignal) -> AnomalyResult {
        let (risk_level, is_fraudulent) = self.classify(signal);

        AnomalyResult {
            farmer_id: record.farmer_id.clone(),
            farmer_name: record.full_name.clone(),
            monthly_income: record.monthly_income,
            land_size_bigha: record.land_size_bigha,
            previous_grants: record.previous_grants,
            is_fraudulent,
            anomaly_score: signal.anomaly_score,
            risk_level,
            risk_factors: self.risk_factors(record, signal.anomaly_score),
        }
    }
}
