use crate::infra::{load_signal_table, read_applicant_rows};
use agrifair::error::AppError;
use agrifair::workflows::grants::{
    FraudBatch, FraudRequest, GrantPrioritizationService, GrantServiceError, Prediction,
    PredictionRequest, PriorityBucket, RankedBatch, RiskTier, SignalTable,
};
use chrono::Local;
use clap::Args;
use serde_json::{Map, Value};
use std::io::Read;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Args, Debug)]
pub(crate) struct RankArgs {
    /// CSV of flat applicant rows (one column per applicant field)
    #[arg(long)]
    pub(crate) applicants: PathBuf,
    /// Exported model outputs keyed by farmer_id
    #[arg(long)]
    pub(crate) signals: Option<PathBuf>,
    /// Only print the top N applicants
    #[arg(long)]
    pub(crate) limit: Option<usize>,
    /// Also screen the applications for fraud risk
    #[arg(long)]
    pub(crate) fraud: bool,
}

#[derive(Debug)]
pub(crate) struct RankOutcome {
    pub(crate) ranking: RankedBatch<Prediction>,
    pub(crate) fraud: Option<FraudBatch>,
}

pub(crate) fn run_rank(args: RankArgs) -> Result<(), AppError> {
    let RankArgs {
        applicants,
        signals,
        limit,
        fraud,
    } = args;

    let table = load_signal_table(signals.as_deref())?;
    let file = std::fs::File::open(&applicants)?;
    let outcome = rank_applicants(file, table, fraud)?;

    println!(
        "Grant applicant ranking ({})",
        Local::now().format("%Y-%m-%d %H:%M")
    );
    println!("Source: {}", applicants.display());
    render_outcome(&outcome, limit);
    Ok(())
}

pub(crate) fn rank_applicants<R: Read>(
    reader: R,
    table: SignalTable,
    screen_fraud: bool,
) -> Result<RankOutcome, AppError> {
    let rows = read_applicant_rows(reader)?;
    let table = Arc::new(table);
    let service = GrantPrioritizationService::new(table.clone(), table);

    let requests = rows
        .iter()
        .map(PredictionRequest::from_fields)
        .collect::<Result<Vec<_>, _>>()
        .map_err(GrantServiceError::from)?;
    let ranking = service.predict_batch(requests)?;

    let fraud = if screen_fraud {
        Some(service.detect_fraud(fraud_requests(&rows)?)?)
    } else {
        None
    };

    Ok(RankOutcome { ranking, fraud })
}

fn fraud_requests(rows: &[Map<String, Value>]) -> Result<Vec<FraudRequest>, GrantServiceError> {
    rows.iter()
        .map(|row| FraudRequest::from_fields(row).map_err(GrantServiceError::from))
        .collect()
}

fn render_outcome(outcome: &RankOutcome, limit: Option<usize>) {
    let ranking = &outcome.ranking;
    let shown = ranking.top(limit.unwrap_or(ranking.ranked.len()));

    println!("\nRanking");
    for (position, prediction) in shown.iter().enumerate() {
        println!(
            "{:>3}. {:<10} priority {:>5.2}  p(approve) {:.4}  {} [{}]",
            position + 1,
            prediction.farmer_id(),
            prediction.result.priority_score,
            prediction.result.approval_probability,
            prediction.recommendation(),
            prediction.result.predicted_status.label()
        );
        for reason in prediction.reasoning.iter().skip(1) {
            println!("       - {}", reason);
        }
    }
    if shown.len() < ranking.ranked.len() {
        println!(
            "     ... {} more not shown",
            ranking.ranked.len() - shown.len()
        );
    }

    let summary = &ranking.summary;
    println!("\nSummary");
    println!("Applicants: {}", summary.total_farmers);
    for bucket in PriorityBucket::ordered() {
        println!("{}: {}", bucket.label(), summary.count(bucket));
    }
    println!(
        "Average priority: {:.2}  average approval probability: {:.4}",
        summary.avg_priority_score, summary.avg_approval_probability
    );

    if let Some(fraud) = &outcome.fraud {
        println!("\nFraud screening");
        println!("{}", fraud.message());
        let distribution = &fraud.summary.risk_distribution;
        for tier in RiskTier::ordered() {
            println!("{}: {}", tier.label(), distribution.count(tier));
        }
        println!(
            "Average anomaly score: {:.4}",
            fraud.summary.average_anomaly_score
        );
        for result in fraud.results.iter().filter(|result| result.is_fraudulent) {
            println!(
                "- {} {} ({}): {}",
                result.farmer_id,
                result.farmer_name,
                result.risk_level.label(),
                result.risk_factors.join("; ")
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    const APPLICANTS: &str = "farmer_id,full_name,monthly_income,land_size_bigha,previous_grants,social_category,approval_probability\n\
F001,Sita Tamang,12000,1.5,0,dalit,\n\
F002,Ram Shrestha,50000,6,3,general,0.2\n\
F003,Hari Yadav,20000,3,1,madhesi,0.7\n";

    fn signal_table() -> SignalTable {
        SignalTable::from_reader(Cursor::new(
            "farmer_id,approval_probability,anomaly_score,is_anomaly\n\
F001,0.9,-0.35,true\n\
F002,,0.05,false\n\
F003,,-0.12,false\n",
        ))
        .expect("signals")
    }

    #[test]
    fn ranks_csv_rows_with_table_and_inline_probabilities() {
        let outcome =
            rank_applicants(Cursor::new(APPLICANTS), signal_table(), false).expect("ranking");

        let order: Vec<String> = outcome
            .ranking
            .ranked
            .iter()
            .map(|prediction| prediction.farmer_id().to_string())
            .collect();
        assert_eq!(order, vec!["F001", "F003", "F002"]);
        assert_eq!(outcome.ranking.summary.total_farmers, 3);
        assert!(outcome.fraud.is_none());
    }

    #[test]
    fn screens_fraud_when_requested() {
        let outcome =
            rank_applicants(Cursor::new(APPLICANTS), signal_table(), true).expect("ranking");

        let fraud = outcome.fraud.expect("fraud batch");
        assert_eq!(fraud.summary.total_applications, 3);
        assert_eq!(fraud.summary.fraud_detected, 1);
        assert_eq!(fraud.summary.risk_distribution.medium, 1);
    }

    #[test]
    fn rejects_rows_without_any_probability_source() {
        let error = rank_applicants(Cursor::new(APPLICANTS), SignalTable::unloaded(), false)
            .expect_err("no model for F001");

        assert!(matches!(error, AppError::Grants(_)));
    }
}
