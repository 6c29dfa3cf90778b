// Observability: metrics recorded during collection runs

pub mod metrics;

pub use metrics::MetricName;
