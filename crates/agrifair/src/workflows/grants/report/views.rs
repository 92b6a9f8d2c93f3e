use serde::Serialize;

use super::super::fraud::RiskTier;
use super::summary::PriorityBucket;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PrioritySummary {
    pub total_farmers: usize,
    pub high_priority: usize,
    pub medium_priority: usize,
    pub low_priority: usize,
    pub avg_priority_score: f64,
    pub avg_approval_probability: f64,
}

impl PrioritySummary {
    pub fn count(&self, bucket: PriorityBucket) -> usize {
        match bucket {
            PriorityBucket::High => self.high_priority,
            PriorityBucket::Medium => self.medium_priority,
            PriorityBucket::Low => self.low_priority,
        }
    }
}

/// Ranked applicants, highest priority first, with the batch summary.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedBatch<T> {
    pub ranked: Vec<T>,
    pub summary: PrioritySummary,
}

impl<T> RankedBatch<T> {
    pub fn top(&self, limit: usize) -> &[T] {
        &self.ranked[..limit.min(self.ranked.len())]
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RiskDistribution {
    #[serde(rename = "High Risk")]
    pub high: usize,
    #[serde(rename = "Medium Risk")]
    pub medium: usize,
    #[serde(rename = "Low Risk")]
    pub low: usize,
}

impl RiskDistribution {
    pub fn count(&self, tier: RiskTier) -> usize {
        match tier {
            RiskTier::High => self.high,
            RiskTier::Medium => self.medium,
            RiskTier::Low => self.low,
        }
    }

    pub(crate) fn record(&mut self, tier: RiskTier) {
        match tier {
            RiskTier::High => self.high += 1,
            RiskTier::Medium => self.medium += 1,
            RiskTier::Low => self.low += 1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FraudSummary {
    pub total_applications: usize,
    pub fraud_detected: usize,
    pub risk_distribution: RiskDistribution,
    pub average_anomaly_score: f64,
}
