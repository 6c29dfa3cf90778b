use std::env;
use std::fs;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::constants::{DEFAULT_LOG_FILTER, LOG_DIR, LOG_FILE_NAME, LOG_FILTER_ENV};

/// Picks the filter directives: `EQUIVERSE_LOG`, then `RUST_LOG`, then the
/// crate default. Blank values are skipped.
pub fn filter_directives(collector_env: Option<String>, rust_log: Option<String>) -> String {
    [collector_env, rust_log]
        .into_iter()
        .flatten()
        .map(|value| value.trim().to_string())
        .find(|value| !value.is_empty())
        .unwrap_or_else(|| DEFAULT_LOG_FILTER.to_string())
}

fn log_filter() -> EnvFilter {
    let directives = filter_directives(env::var(LOG_FILTER_ENV).ok(), env::var("RUST_LOG").ok());
    EnvFilter::try_new(&directives).unwrap_or_else(|e| {
        eprintln!("Ignoring bad log filter '{}': {}", directives, e);
        EnvFilter::new(DEFAULT_LOG_FILTER)
    })
}

/// Sets up console logging on stderr plus a daily JSON log under `logs/`.
///
/// If the log directory cannot be used the collector keeps running with
/// console output only. Hold the returned guard until exit so buffered file
/// lines get flushed.
pub fn init_logging() -> Option<WorkerGuard> {
    let file_appender = fs::create_dir_all(LOG_DIR)
        .map_err(|e| e.to_string())
        .and_then(|_| {
            RollingFileAppender::builder()
                .rotation(Rotation::DAILY)
                .filename_prefix(LOG_FILE_NAME)
                .build(LOG_DIR)
                .map_err(|e| e.to_string())
        });

    let (file_layer, guard) = match file_appender {
        Ok(appender) => {
            let (writer, guard) = tracing_appender::non_blocking(appender);
            (Some(fmt::layer().json().with_writer(writer)), Some(guard))
        }
        Err(e) => {
            eprintln!("File logging disabled, {} is unusable: {}", LOG_DIR, e);
            (None, None)
        }
    };

    let console_layer = fmt::layer().with_writer(std::io::stderr);

    if tracing_subscriber::registry()
        .with(log_filter())
        .with(file_layer)
        .with(console_layer)
        .try_init()
        .is_err()
    {
        eprintln!("A tracing subscriber was already installed");
    }

    guard
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collector_variable_wins_over_rust_log() {
        assert_eq!(
            filter_directives(Some("equiverse_collector=debug".into()), Some("warn".into())),
            "equiverse_collector=debug"
        );
    }

    #[test]
    fn rust_log_is_used_when_collector_variable_is_blank() {
        assert_eq!(filter_directives(Some("  ".into()), Some("warn".into())), "warn");
        assert_eq!(filter_directives(None, Some("trace".into())), "trace");
    }

    #[test]
    fn falls_back_to_crate_default() {
        assert_eq!(filter_directives(None, None), DEFAULT_LOG_FILTER);
        assert_eq!(filter_directives(Some(String::new()), Some(String::new())), DEFAULT_LOG_FILTER);
        assert!(EnvFilter::try_new(DEFAULT_LOG_FILTER).is_ok());
    }
}
