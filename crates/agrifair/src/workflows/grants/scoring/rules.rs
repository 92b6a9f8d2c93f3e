use serde::{Deserialize, Serialize};

use super::super::domain::{ApplicantRecord, CropYield, PredictedStatus};

/// Fixed normalization constant for the rule pass; never derived from the table.
pub const MAX_RULE_SCORE: f64 = 60.0;

const REFERENCE_APPROVAL_THRESHOLD: f64 = 7.0;

/// Attributes inspected by the rule pass, in evaluation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleFactor {
    MonthlyIncome,
    LandSize,
    PriorGrants,
    CropYield,
    FamilySize,
    Age,
    FarmingExperience,
    CreditScore,
    MarketDistance,
    TechnologyUse,
    SocialCategory,
    Disability,
}

impl RuleFactor {
    pub const fn max_points(self) -> u8 {
        match self {
            RuleFactor::MonthlyIncome
            | RuleFactor::LandSize
            | RuleFactor::PriorGrants
            | RuleFactor::CropYield => 10,
            RuleFactor::FamilySize => 5,
            RuleFactor::Age
            | RuleFactor::FarmingExperience
            | RuleFactor::CreditScore
            | RuleFactor::MarketDistance => 3,
            RuleFactor::TechnologyUse => 2,
            RuleFactor::SocialCategory | RuleFactor::Disability => 1,
        }
    }
}

/// Points one factor contributed to the rule score.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RuleComponent {
    pub factor: RuleFactor,
    pub points: u8,
    pub max_points: u8,
}

/// Bounded additive score produced by [`RuleScorer`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RuleScore {
    total: f64,
    components: Vec<RuleComponent>,
}

impl RuleScore {
    pub fn total(&self) -> f64 {
        self.total
    }

    pub fn components(&self) -> &[RuleComponent] {
        &self.components
    }

    pub fn points_for(&self, factor: RuleFactor) -> Option<u8> {
        self.components
            .iter()
            .find(|component| component.factor == factor)
            .map(|component| component.points)
    }

    /// Projection of the total onto the 0–10 priority scale.
    pub fn normalized(&self) -> f64 {
        self.total / MAX_RULE_SCORE * 10.0
    }

    /// Label the rule pass alone would assign, for comparison with the model's call.
    pub fn reference_status(&self) -> PredictedStatus {
        if self.normalized() > REFERENCE_APPROVAL_THRESHOLD {
            PredictedStatus::Approved
        } else {
            PredictedStatus::Pending
        }
    }
}

/// Deterministic weighted bucket scoring of an applicant record.
#[derive(Debug, Clone, Copy, Default)]
pub struct RuleScorer;

impl RuleScorer {
    pub fn score(&self, record: &ApplicantRecord) -> RuleScore {
        let components = vec![
            component(RuleFactor::MonthlyIncome, income_points(record.monthly_income)),
            component(RuleFactor::LandSize, land_points(record.land_size_bigha)),
            component(RuleFactor::PriorGrants, grant_points(record.previous_grants)),
            component(RuleFactor::CropYield, crop_yield_points(record.crop_yield)),
            component(RuleFactor::FamilySize, family_points(record.family_size)),
            component(RuleFactor::Age, age_points(record.age)),
            component(
                RuleFactor::FarmingExperience,
                experience_points(record.farming_experience_years),
            ),
            component(RuleFactor::CreditScore, credit_points(record.credit_score)),
            component(
                RuleFactor::MarketDistance,
                distance_points(record.market_distance_km),
            ),
            component(
                RuleFactor::TechnologyUse,
                if record.uses_modern_technology { 0 } else { 2 },
            ),
            component(
                RuleFactor::SocialCategory,
                u8::from(record.social_category.is_marginalized()),
            ),
            component(RuleFactor::Disability, u8::from(record.has_disability)),
        ];

        let sum: u32 = components
            .iter()
            .map(|component| u32::from(component.points))
            .sum();

        RuleScore {
            total: f64::from(sum).min(MAX_RULE_SCORE),
            components,
        }
    }
}

fn component(factor: RuleFactor, points: u8) -> RuleComponent {
    RuleComponent {
        factor,
        points,
        max_points: factor.max_points(),
    }
}

fn income_points(monthly_income: f64) -> u8 {
    if monthly_income < 15_000.0 {
        10
    } else if monthly_income < 35_000.0 {
        5
    } else {
        2
    }
}

fn land_points(land_size: f64) -> u8 {
    if land_size < 2.0 {
        10
    } else if land_size <= 4.0 {
        7
    } else {
        3
    }
}

fn grant_points(previous_grants: u32) -> u8 {
    match previous_grants {
        0 => 10,
        1 => 5,
        _ => 2,
    }
}

fn crop_yield_points(crop_yield: CropYield) -> u8 {
    match crop_yield {
        CropYield::High => 10,
        CropYield::Average => 7,
        CropYield::Low => 4,
    }
}

fn family_points(family_size: u32) -> u8 {
    if family_size >= 6 {
        5
    } else if family_size >= 4 {
        3
    } else {
        1
    }
}

fn age_points(age: u32) -> u8 {
    if age > 60 {
        3
    } else if age < 30 {
        2
    } else {
        1
    }
}

fn experience_points(years: u32) -> u8 {
    if years < 5 {
        3
    } else if years > 20 {
        2
    } else {
        1
    }
}

fn credit_points(credit_score: u32) -> u8 {
    if credit_score < 500 {
        3
    } else if credit_score > 700 {
        1
    } else {
        2
    }
}

fn distance_points(distance_km: f64) -> u8 {
    if distance_km > 15.0 {
        3
    } else if distance_km > 5.0 {
        2
    } else {
        1
    }
}
