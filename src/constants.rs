/// Source kind constants to keep config files and the adapter factory in step

// Source kinds (used in collector.toml)
pub const TABULAR_FILE_SOURCE: &str = "tabular_file";
pub const PROFILE_LIST_SOURCE: &str = "profile_list";

/// Get all source kinds the factory can build
pub fn get_supported_source_kinds() -> Vec<&'static str> {
    vec![TABULAR_FILE_SOURCE, PROFILE_LIST_SOURCE]
}

// Environment and default paths
pub const CONFIG_PATH_ENV: &str = "EQUIVERSE_CONFIG";
pub const DEFAULT_CONFIG_PATH: &str = "collector.toml";
pub const DEFAULT_OUTPUT_DIR: &str = "data/reports";
pub const DEFAULT_REPORT_LABEL: &str = "collection";

// Logging
pub const LOG_DIR: &str = "logs";
pub const LOG_FILE_NAME: &str = "collector.log";
pub const LOG_FILTER_ENV: &str = "EQUIVERSE_LOG";
pub const DEFAULT_LOG_FILTER: &str = "equiverse_collector=info";

// Profile names that carry no usable first name
pub const PLACEHOLDER_PROFILE_NAMES: &[&str] = &["linkedin member"];
pub const MIN_PROFILE_NAME_LEN: usize = 2;
