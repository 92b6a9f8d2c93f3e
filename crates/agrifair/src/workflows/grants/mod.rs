//! Grant applicant prioritisation and fraud screening.
//!
//! Applicants are scored by a fixed rule table, blended with an externally supplied approval
//! probability into a 0-10 priority, explained with an ordered set of reasons, and ranked in
//! batches. A parallel path tiers externally supplied anomaly scores and lists the record-level
//! cues behind each tier. The upstream classifier and detector are reached only through the
//! [`ApprovalModel`] and [`AnomalyDetector`] seams.

pub mod domain;
pub mod fraud;
pub mod models;
pub mod report;
pub mod router;
pub mod scoring;
pub mod service;
pub mod signals;

#[cfg(test)]
mod tests;

pub use domain::{
    ApplicantRecord, CropYield, EducationLevel, FarmerId, InlineSignals, PredictedStatus,
    ScoringError, SocialCategory,
};
pub use fraud::{AnomalyClassifier, AnomalyResult, AnomalySignal, RiskTier};
pub use models::{AnomalyDetector, ApprovalModel, ModelError, ModelStatus};
pub use report::{
    BatchAggregator, FraudSummary, Prioritized, PriorityBucket, PrioritySummary, RankedBatch,
    RiskDistribution,
};
pub use router::grant_router;
pub use scoring::{
    confidence, Prediction, PriorityBlender, PriorityEngine, PriorityResult, Recommendation,
    RecommendationEngine, RecommendationTier, RuleComponent, RuleFactor, RuleScore, RuleScorer,
    SubScores, MAX_RULE_SCORE,
};
pub use service::{
    FraudBatch, FraudRequest, GrantPrioritizationService, GrantServiceError, PredictionRequest,
    ServiceStatus,
};
pub use signals::{SignalImportError, SignalTable};
