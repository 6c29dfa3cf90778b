use crate::apis::profile_list::ProfileListAdapter;
use crate::apis::tabular_file::TabularFileAdapter;
use crate::config::SourceConfig;
use crate::constants::{get_supported_source_kinds, PROFILE_LIST_SOURCE, TABULAR_FILE_SOURCE};
use crate::error::{CollectorError, Result};
use crate::pipeline::processing::normalize::NormalizerConfig;
use crate::types::SourceAdapter;

/// Build the adapter a `[[sources]]` entry describes
pub fn create_adapter(source: &SourceConfig) -> Result<Box<dyn SourceAdapter>> {
    let source_id = source.source_id();
    match source.kind.as_str() {
        TABULAR_FILE_SOURCE => {
            let mut config = NormalizerConfig {
                field_mapping: source.field_mapping.clone().unwrap_or_default(),
                gender_values: source.gender_values.clone(),
                ..NormalizerConfig::default()
            };
            if let Some(active_values) = &source.active_values {
                config.active_values = active_values.clone();
            }
            let adapter = TabularFileAdapter::new(source_id, source.path.clone(), config);
            Ok(match source.field_mapping {
                Some(_) => Box::new(adapter),
                None => Box::new(adapter.with_detected_mapping()),
            })
        }
        PROFILE_LIST_SOURCE => Ok(Box::new(ProfileListAdapter::new(
            source_id,
            source.path.clone(),
        ))),
        other => Err(CollectorError::Config(format!(
            "Unknown source kind '{}'. Supported kinds: {}",
            other,
            get_supported_source_kinds().join(", ")
        ))),
    }
}
