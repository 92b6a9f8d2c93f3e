use super::common::*;
use crate::workflows::grants::domain::{
    ApplicantRecord, CropYield, PredictedStatus, ScoringError, SocialCategory,
};
use crate::workflows::grants::scoring::{
    confidence, PriorityBlender, PriorityEngine, RecommendationEngine, RecommendationTier,
    RuleFactor, RuleScorer, MAX_RULE_SCORE,
};

#[test]
fn rule_scorer_totals_every_factor() {
    let score = RuleScorer.score(&smallholder());

    assert_eq!(score.total(), 48.0);
    assert_eq!(score.components().len(), 12);
    assert_eq!(score.points_for(RuleFactor::CropYield), Some(4));
    assert_eq!(score.points_for(RuleFactor::FamilySize), Some(5));
    assert_eq!(score.points_for(RuleFactor::Disability), Some(0));
    assert!(approx(score.normalized(), 8.0));
    assert_eq!(score.reference_status(), PredictedStatus::Approved);

    let wealthy = RuleScorer.score(&large_holder());
    assert_eq!(wealthy.total(), 22.0);
    assert_eq!(wealthy.reference_status(), PredictedStatus::Pending);
}

#[test]
fn rule_score_is_clamped_to_fixed_maximum() {
    let mut record = ApplicantRecord::new("F900");
    record.crop_yield = CropYield::High;
    record.family_size = 8;
    record.age = 66;
    record.farming_experience_years = 2;
    record.credit_score = 420;
    record.market_distance_km = 22.0;
    record.social_category = SocialCategory::Madhesi;
    record.has_disability = true;

    let score = RuleScorer.score(&record);
    let raw: u32 = score
        .components()
        .iter()
        .map(|component| u32::from(component.points))
        .sum();

    assert_eq!(raw, 61);
    assert_eq!(score.total(), MAX_RULE_SCORE);
    assert!(score
        .components()
        .iter()
        .all(|component| component.points <= component.max_points));

    let payload = serde_json::to_value(&score).expect("serialize");
    assert_eq!(payload["total"], MAX_RULE_SCORE);
    assert_eq!(payload["components"].as_array().map(Vec::len), Some(12));
}

#[test]
fn bucket_boundaries_fall_on_the_documented_side() {
    let mut record = smallholder();
    record.monthly_income = 15_000.0;
    record.land_size_bigha = 2.0;
    let score = RuleScorer.score(&record);

    assert_eq!(score.points_for(RuleFactor::MonthlyIncome), Some(5));
    assert_eq!(score.points_for(RuleFactor::LandSize), Some(7));

    record.land_size_bigha = 4.0;
    assert_eq!(
        RuleScorer.score(&record).points_for(RuleFactor::LandSize),
        Some(7)
    );
}

#[test]
fn higher_income_never_raises_priority() {
    let engine = PriorityEngine::new();
    let mut previous_rule = f64::MAX;
    let mut previous_priority = f64::MAX;

    for income in [0.0, 9_999.0, 14_999.0, 15_000.0, 34_999.0, 35_000.0, 80_000.0] {
        let mut record = smallholder();
        record.monthly_income = income;
        let prediction = engine.predict(&record, 0.6).expect("prediction");

        assert!(prediction.result.rule_score <= previous_rule);
        assert!(prediction.result.priority_score <= previous_priority);
        previous_rule = prediction.result.rule_score;
        previous_priority = prediction.result.priority_score;
    }
}

#[test]
fn scoring_is_deterministic() {
    let engine = PriorityEngine::new();
    let first = engine.predict(&smallholder(), 0.73).expect("first");
    let second = engine.predict(&smallholder(), 0.73).expect("second");
    assert_eq!(first, second);
}

#[test]
fn blend_combines_probability_with_sub_scores() {
    let record = smallholder();
    let blender = PriorityBlender;
    let subs = blender.sub_scores(&record);
    assert!(approx(subs.total(), 6.0));

    let result = blender
        .blend(&record, &RuleScorer.score(&record), 0.9)
        .expect("blend");

    assert!(approx(result.priority_score, 9.6));
    assert!(approx(result.confidence, 0.8));
    assert_eq!(result.predicted_status, PredictedStatus::Approved);
    assert_eq!(result.rule_score, 48.0);
}

#[test]
fn blended_priority_is_capped_at_ten() {
    let mut record = smallholder();
    record.social_category = SocialCategory::Janajati;
    let result = PriorityBlender
        .blend(&record, &RuleScorer.score(&record), 1.0)
        .expect("blend");

    assert_eq!(result.priority_score, 10.0);
    assert_eq!(result.confidence, 1.0);
}

#[test]
fn decision_boundary_is_exclusive() {
    let record = large_holder();
    let result = PriorityBlender
        .blend(&record, &RuleScorer.score(&record), 0.5)
        .expect("blend");

    assert_eq!(result.predicted_status, PredictedStatus::Pending);
    assert_eq!(result.confidence, 0.0);
    assert_eq!(confidence(0.5), 0.0);
    assert_eq!(confidence(1.0), 1.0);
    assert_eq!(confidence(0.0), 1.0);
}

#[test]
fn rejects_probability_outside_unit_interval() {
    let record = smallholder();
    let error = PriorityBlender
        .blend(&record, &RuleScorer.score(&record), 1.2)
        .expect_err("out of range");

    assert_eq!(error, ScoringError::ProbabilityOutOfRange { value: 1.2 });
    assert_eq!(error.field(), "approval_probability");
    assert!(PriorityBlender
        .blend(&record, &RuleScorer.score(&record), f64::NAN)
        .is_err());
}

#[test]
fn high_priority_is_highly_recommended() {
    let recommendation = RecommendationEngine.recommend(8.5, &large_holder(), 0.6);

    assert_eq!(recommendation.tier, RecommendationTier::HighlyRecommended);
    assert_eq!(recommendation.label(), "Highly Recommended");
    assert!(recommendation.reasoning[0].contains("High priority"));
}

#[test]
fn tier_thresholds_are_inclusive() {
    assert_eq!(
        RecommendationTier::for_score(8.0),
        RecommendationTier::HighlyRecommended
    );
    assert_eq!(
        RecommendationTier::for_score(6.0),
        RecommendationTier::Recommended
    );
    assert_eq!(RecommendationTier::for_score(4.0), RecommendationTier::Consider);
    assert_eq!(
        RecommendationTier::for_score(3.99),
        RecommendationTier::NotRecommended
    );
    assert!(RecommendationTier::Consider < RecommendationTier::Recommended);
}

#[test]
fn reasoning_follows_rule_order() {
    let mut record = smallholder();
    record.has_disability = true;
    let recommendation = RecommendationEngine.recommend(9.6, &record, 0.9);

    assert_eq!(
        recommendation.reasoning,
        vec![
            "High priority score indicates strong need and eligibility",
            "Low income level - high need for support",
            "Small landholding - high priority for support",
            "No previous grants - first-time applicant priority",
            "Marginalized social category - inclusive development priority",
            "Disability status - special consideration",
            "High confidence prediction",
        ]
    );
}

#[test]
fn low_confidence_requests_manual_review() {
    let recommendation = RecommendationEngine.recommend(2.05, &large_holder(), 0.3);

    assert_eq!(recommendation.tier, RecommendationTier::NotRecommended);
    assert_eq!(
        recommendation.reasoning,
        vec![
            "Low priority score - consider other applicants first",
            "Higher income level - lower priority",
            "Large landholding - lower priority",
            "Multiple previous grants - lower priority",
            "Low confidence - manual review recommended",
        ]
    );
}

#[test]
fn engine_attaches_recommendation_to_result() {
    let prediction = PriorityEngine::new()
        .predict(&large_holder(), 0.2)
        .expect("prediction");

    assert!(approx(prediction.result.priority_score, 2.05));
    assert_eq!(prediction.result.predicted_status, PredictedStatus::Pending);
    assert_eq!(prediction.recommendation(), "Not Recommended");
    assert_eq!(
        prediction.recommendation_detail,
        "Not Recommended for Grant Approval"
    );

    let payload = serde_json::to_value(&prediction).expect("serialize");
    assert_eq!(payload["farmer_id"], "F002");
    assert_eq!(payload["recommendation"], "Not Recommended");
    assert_eq!(payload["predicted_status"], "pending");
    assert_eq!(payload["rule_score"], 22.0);
}
