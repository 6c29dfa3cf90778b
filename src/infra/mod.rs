// File formats and report persistence

pub mod csv_format;
pub mod report_output;

pub use report_output::{save_report, AggregateReport, SavedReport};
