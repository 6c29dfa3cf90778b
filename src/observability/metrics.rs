//! Counters for collection runs.
//!
//! Recording goes through the `metrics` facade; nothing is exported unless the
//! embedding process installs a recorder.

use std::fmt;

/// Every metric name the collector emits
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MetricName {
    // Sources
    SourcesConnectSuccess,
    SourcesConnectError,
    SourcesFetchError,
    SourcesRowsFetched,

    // Normalize
    NormalizeRecordsAccepted,
    NormalizeRecordsDropped,

    // Aggregate
    AggregateRunsCompleted,
    AggregateRunDuration,
}

impl MetricName {
    pub fn as_str(&self) -> &'static str {
        match self {
            MetricName::SourcesConnectSuccess => "equiverse_sources_connect_success_total",
            MetricName::SourcesConnectError => "equiverse_sources_connect_error_total",
            MetricName::SourcesFetchError => "equiverse_sources_fetch_error_total",
            MetricName::SourcesRowsFetched => "equiverse_sources_rows_fetched_total",
            MetricName::NormalizeRecordsAccepted => "equiverse_normalize_records_accepted_total",
            MetricName::NormalizeRecordsDropped => "equiverse_normalize_records_dropped_total",
            MetricName::AggregateRunsCompleted => "equiverse_aggregate_runs_completed_total",
            MetricName::AggregateRunDuration => "equiverse_aggregate_run_duration_seconds",
        }
    }

    pub fn all_metrics() -> impl Iterator<Item = MetricName> {
        use MetricName::*;
        [
            SourcesConnectSuccess,
            SourcesConnectError,
            SourcesFetchError,
            SourcesRowsFetched,
            NormalizeRecordsAccepted,
            NormalizeRecordsDropped,
            AggregateRunsCompleted,
            AggregateRunDuration,
        ]
        .into_iter()
    }
}

impl fmt::Display for MetricName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

pub mod sources {
    use super::MetricName;

    pub fn connect_success(source_id: &str) {
        ::metrics::counter!(MetricName::SourcesConnectSuccess.as_str(), "source" => source_id.to_string())
            .increment(1);
    }

    pub fn connect_error(source_id: &str) {
        ::metrics::counter!(MetricName::SourcesConnectError.as_str(), "source" => source_id.to_string())
            .increment(1);
    }

    pub fn fetch_error(source_id: &str) {
        ::metrics::counter!(MetricName::SourcesFetchError.as_str(), "source" => source_id.to_string())
            .increment(1);
    }

    pub fn rows_fetched(source_id: &str, rows: usize) {
        ::metrics::counter!(MetricName::SourcesRowsFetched.as_str(), "source" => source_id.to_string())
            .increment(rows as u64);
    }
}

pub mod normalize {
    use super::MetricName;

    pub fn records_accepted(count: usize) {
        ::metrics::counter!(MetricName::NormalizeRecordsAccepted.as_str()).increment(count as u64);
    }

    pub fn records_dropped(count: usize) {
        ::metrics::counter!(MetricName::NormalizeRecordsDropped.as_str()).increment(count as u64);
    }
}

pub mod aggregate {
    use super::MetricName;

    pub fn run_completed(duration_secs: f64) {
        ::metrics::counter!(MetricName::AggregateRunsCompleted.as_str()).increment(1);
        ::metrics::histogram!(MetricName::AggregateRunDuration.as_str()).record(duration_secs);
    }
}
