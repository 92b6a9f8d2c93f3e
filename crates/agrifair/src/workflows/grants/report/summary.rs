use super::super::domain::{round_to, ScoringError};
use super::super::fraud::AnomalyResult;
use super::super::scoring::{Prediction, PriorityResult};
use super::views::{FraudSummary, PrioritySummary, RankedBatch, RiskDistribution};

const HIGH_PRIORITY_FROM: f64 = 8.0;
const MEDIUM_PRIORITY_FROM: f64 = 5.0;

/// Anything carrying a blended priority and the probability behind it.
pub trait Prioritized {
    fn priority_score(&self) -> f64;
    fn approval_probability(&self) -> f64;
}

impl Prioritized for PriorityResult {
    fn priority_score(&self) -> f64 {
        self.priority_score
    }

    fn approval_probability(&self) -> f64 {
        self.approval_probability
    }
}

impl Prioritized for Prediction {
    fn priority_score(&self) -> f64 {
        self.result.priority_score
    }

    fn approval_probability(&self) -> f64 {
        self.result.approval_probability
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PriorityBucket {
    High,
    Medium,
    Low,
}

impl PriorityBucket {
    pub fn for_score(priority_score: f64) -> Self {
        if priority_score >= HIGH_PRIORITY_FROM {
            Self::High
        } else if priority_score >= MEDIUM_PRIORITY_FROM {
            Self::Medium
        } else {
            Self::Low
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::High => "High Priority",
            Self::Medium => "Medium Priority",
            Self::Low => "Low Priority",
        }
    }

    pub const fn ordered() -> [PriorityBucket; 3] {
        [Self::High, Self::Medium, Self::Low]
    }
}

/// Ranks batches and rolls them up. Every call recomputes from its input alone.
#[derive(Debug, Clone, Copy, Default)]
pub struct BatchAggregator;

impl BatchAggregator {
    pub fn aggregate<T: Prioritized>(
        &self,
        mut items: Vec<T>,
    ) -> Result<RankedBatch<T>, ScoringError> {
        if items.is_empty() {
            return Err(ScoringError::EmptyBatch);
        }

        // `sort_by` is stable, so equal scores keep their submission order.
        items.sort_by(|a, b| b.priority_score().total_cmp(&a.priority_score()));

        let summary = self.priority_summary(&items);
        Ok(RankedBatch {
            ranked: items,
            summary,
        })
    }

    pub fn aggregate_fraud(
        &self,
        results: &[AnomalyResult],
    ) -> Result<FraudSummary, ScoringError> {
        if results.is_empty() {
            return Err(ScoringError::EmptyBatch);
        }

        let mut risk_distribution = RiskDistribution::default();
        let mut fraud_detected = 0;
        let mut score_sum = 0.0;
        for result in results {
            risk_distribution.record(result.risk_level);
            if result.is_fraudulent {
                fraud_detected += 1;
            }
            score_sum += result.anomaly_score;
        }

        Ok(FraudSummary {
            total_applications: results.len(),
            fraud_detected,
            risk_distribution,
            average_anomaly_score: score_sum / results.len() as f64,
        })
    }

    fn priority_summary<T: Prioritized>(&self, items: &[T]) -> PrioritySummary {
        let (mut high, mut medium, mut low) = (0, 0, 0);
        let mut priority_sum = 0.0;
        let mut probability_sum = 0.0;

        for item in items {
            match PriorityBucket::for_score(item.priority_score()) {
                PriorityBucket::High => high += 1,
                PriorityBucket::Medium => medium += 1,
                PriorityBucket::Low => low += 1,
            }
            priority_sum += item.priority_score();
            probability_sum += item.approval_probability();
        }

        let total = items.len() as f64;
        PrioritySummary {
            total_farmers: items.len(),
            high_priority: high,
            medium_priority: medium,
            low_priority: low,
            avg_priority_score: round_to(priority_sum / total, 2),
            avg_approval_probability: round_to(probability_sum / total, 4),
        }
    }
}
