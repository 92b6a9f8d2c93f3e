mod blend;
mod policy;
mod rules;

pub use blend::{confidence, PriorityBlender, SubScores};
pub use policy::{Recommendation, RecommendationEngine, RecommendationTier};
pub use rules::{RuleComponent, RuleFactor, RuleScore, RuleScorer, MAX_RULE_SCORE};

use super::domain::{ApplicantRecord, FarmerId, PredictedStatus, ScoringError};
use serde::{Serialize, Serializer};

/// Stateless pipeline: rule pass, blend with the approval probability, then explain.
#[derive(Debug, Clone, Copy, Default)]
pub struct PriorityEngine {
    scorer: RuleScorer,
    blender: PriorityBlender,
    recommender: RecommendationEngine,
}

impl PriorityEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn rule_score(&self, record: &ApplicantRecord) -> RuleScore {
        self.scorer.score(record)
    }

    pub fn predict(
        &self,
        record: &ApplicantRecord,
        approval_probability: f64,
    ) -> Result<Prediction, ScoringError> {
        let rule_score = self.scorer.score(record);
        let result = self
            .blender
            .blend(record, &rule_score, approval_probability)?;
        let Recommendation { tier, reasoning } =
            self.recommender
                .recommend(result.priority_score, record, result.confidence);

        Ok(Prediction {
            result,
            tier,
            recommendation_detail: tier.headline(),
            reasoning,
        })
    }
}

/// Normalized priority for one applicant.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PriorityResult {
    pub farmer_id: FarmerId,
    pub priority_score: f64,
    pub approval_probability: f64,
    pub confidence: f64,
    pub predicted_status: PredictedStatus,
    pub rule_score: f64,
}

/// Per-applicant output: the priority result with its recommendation and reasons.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Prediction {
    #[serde(flatten)]
    pub result: PriorityResult,
    #[serde(rename = "recommendation", serialize_with = "serialize_tier_label")]
    pub tier: RecommendationTier,
    pub recommendation_detail: &'static str,
    pub reasoning: Vec<String>,
}

impl Prediction {
    pub fn farmer_id(&self) -> &FarmerId {
        &self.result.farmer_id
    }

    pub fn recommendation(&self) -> &'static str {
        self.tier.label()
    }
}

fn serialize_tier_label<S>(tier: &RecommendationTier, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(tier.label())
}
