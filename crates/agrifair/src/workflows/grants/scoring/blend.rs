use serde::Serialize;

use super::super::domain::{round_to, ApplicantRecord, PredictedStatus, ScoringError};
use super::rules::RuleScore;
use super::PriorityResult;

const MODEL_WEIGHT: f64 = 4.0;
const MAX_PRIORITY: f64 = 10.0;
const DECISION_BOUNDARY: f64 = 0.5;

/// Economic and social allocations of the blended score.
///
/// Bucketed independently from the rule pass so the two rankings can drift apart and be
/// compared.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SubScores {
    pub income: f64,
    pub land: f64,
    pub grants: f64,
    pub social: f64,
}

impl SubScores {
    pub fn total(&self) -> f64 {
        self.income + self.land + self.grants + self.social
    }
}

/// Fuses the approval probability with re-bucketed applicant attributes on a 0–10 scale.
#[derive(Debug, Clone, Copy, Default)]
pub struct PriorityBlender;

impl PriorityBlender {
    pub fn sub_scores(&self, record: &ApplicantRecord) -> SubScores {
        let income = if record.monthly_income < 15_000.0 {
            3.0
        } else if record.monthly_income < 35_000.0 {
            1.5
        } else {
            0.6
        };

        let land = if record.land_size_bigha < 2.0 {
            1.5
        } else if record.land_size_bigha <= 4.0 {
            1.05
        } else {
            0.45
        };

        let grants = match record.previous_grants {
            0 => 1.0,
            1 => 0.5,
            _ => 0.2,
        };

        let social = if record.social_category.is_marginalized() {
            0.5
        } else {
            0.0
        };

        SubScores {
            income,
            land,
            grants,
            social,
        }
    }

    pub fn blend(
        &self,
        record: &ApplicantRecord,
        rule_score: &RuleScore,
        approval_probability: f64,
    ) -> Result<PriorityResult, ScoringError> {
        if !(0.0..=1.0).contains(&approval_probability) {
            return Err(ScoringError::ProbabilityOutOfRange {
                value: approval_probability,
            });
        }

        let raw = approval_probability * MODEL_WEIGHT + self.sub_scores(record).total();
        let predicted_status = if approval_probability > DECISION_BOUNDARY {
            PredictedStatus::Approved
        } else {
            PredictedStatus::Pending
        };

        Ok(PriorityResult {
            farmer_id: record.farmer_id.clone(),
            priority_score: round_to(raw.min(MAX_PRIORITY), 2),
            approval_probability: round_to(approval_probability, 4),
            confidence: round_to(confidence(approval_probability), 4),
            predicted_status,
            rule_score: rule_score.total(),
        })
    }
}

/// Distance of the probability from the decision boundary, scaled to `[0, 1]`.
pub fn confidence(approval_probability: f64) -> f64 {
    (approval_probability - DECISION_BOUNDARY).abs() * 2.0
}
