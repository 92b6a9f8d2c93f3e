mod summary;
pub mod views;

pub use summary::{BatchAggregator, PriorityBucket, Prioritized};
pub use views::{FraudSummary, PrioritySummary, RankedBatch, RiskDistribution};
