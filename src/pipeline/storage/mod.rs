// Pipeline storage: count-only aggregation

pub mod aggregate;

pub use aggregate::{AggregateBucket, AggregateSnapshot, AggregationStore, TierReportRow};
