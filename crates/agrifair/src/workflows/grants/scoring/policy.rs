use serde::{Deserialize, Serialize};

use super::super::domain::ApplicantRecord;

/// Categorical recommendation derived from the priority score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecommendationTier {
    NotRecommended,
    Consider,
    Recommended,
    HighlyRecommended,
}

impl RecommendationTier {
    pub fn for_score(priority_score: f64) -> Self {
        if priority_score >= 8.0 {
            Self::HighlyRecommended
        } else if priority_score >= 6.0 {
            Self::Recommended
        } else if priority_score >= 4.0 {
            Self::Consider
        } else {
            Self::NotRecommended
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::HighlyRecommended => "Highly Recommended",
            Self::Recommended => "Recommended",
            Self::Consider => "Consider",
            Self::NotRecommended => "Not Recommended",
        }
    }

    pub const fn headline(self) -> &'static str {
        match self {
            Self::HighlyRecommended => "Highly Recommended for Grant Approval",
            Self::Recommended => "Recommended for Grant Approval",
            Self::Consider => "Consider for Grant Approval",
            Self::NotRecommended => "Not Recommended for Grant Approval",
        }
    }

    const fn base_reason(self) -> &'static str {
        match self {
            Self::HighlyRecommended => "High priority score indicates strong need and eligibility",
            Self::Recommended => "Good priority score shows eligibility for support",
            Self::Consider => "Moderate priority score - review additional factors",
            Self::NotRecommended => "Low priority score - consider other applicants first",
        }
    }
}

/// Recommendation tier plus the ordered explanation trail.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Recommendation {
    pub tier: RecommendationTier,
    pub reasoning: Vec<String>,
}

impl Recommendation {
    pub fn label(&self) -> &'static str {
        self.tier.label()
    }
}

struct ReasoningRule {
    applies: fn(&ApplicantRecord, f64) -> bool,
    message: &'static str,
}

/// Evaluated top to bottom after the tier's base reason; order is part of the output contract.
const REASONING_RULES: &[ReasoningRule] = &[
    ReasoningRule {
        applies: |record, _| record.monthly_income < 15_000.0,
        message: "Low income level - high need for support",
    },
    ReasoningRule {
        applies: |record, _| record.monthly_income > 35_000.0,
        message: "Higher income level - lower priority",
    },
    ReasoningRule {
        applies: |record, _| record.land_size_bigha < 2.0,
        message: "Small landholding - high priority for support",
    },
    ReasoningRule {
        applies: |record, _| record.land_size_bigha > 4.0,
        message: "Large landholding - lower priority",
    },
    ReasoningRule {
        applies: |record, _| record.previous_grants == 0,
        message: "No previous grants - first-time applicant priority",
    },
    ReasoningRule {
        applies: |record, _| record.previous_grants > 1,
        message: "Multiple previous grants - lower priority",
    },
    ReasoningRule {
        applies: |record, _| record.social_category.is_marginalized(),
        message: "Marginalized social category - inclusive development priority",
    },
    ReasoningRule {
        applies: |record, _| record.has_disability,
        message: "Disability status - special consideration",
    },
    ReasoningRule {
        applies: |_, confidence| confidence > 0.8,
        message: "High confidence prediction",
    },
    ReasoningRule {
        applies: |_, confidence| confidence < 0.5,
        message: "Low confidence - manual review recommended",
    },
];

/// Explainability layer mapping a priority score to a recommendation and its reasons.
#[derive(Debug, Clone, Copy, Default)]
pub struct RecommendationEngine;

impl RecommendationEngine {
    pub fn recommend(
        &self,
        priority_score: f64,
        record: &ApplicantRecord,
        confidence: f64,
    ) -> Recommendation {
        let tier = RecommendationTier::for_score(priority_score);

        let mut reasoning = vec![tier.base_reason().to_string()];
        reasoning.extend(
            REASONING_RULES
                .iter()
                .filter(|rule| (rule.applies)(record, confidence))
                .map(|rule| rule.message.to_string()),
        );

        Recommendation { tier, reasoning }
    }
}
