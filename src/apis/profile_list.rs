use serde::Deserialize;
use std::path::PathBuf;
use tracing::{debug, info, instrument, warn};

use crate::constants::{MIN_PROFILE_NAME_LEN, PLACEHOLDER_PROFILE_NAMES};
use crate::error::{CollectorError, Result};
use crate::pipeline::processing::normalize::{FieldMapping, NormalizerConfig};
use crate::types::{RawRecord, SourceAdapter};

const NAME_COLUMN: &str = "name";
const TITLE_COLUMN: &str = "title";

/// One public profile card: display name and headline.
#[derive(Debug, Clone, Deserialize)]
pub struct ScrapedProfile {
    #[serde(default)]
    pub name: String,
    #[serde(default, alias = "headline")]
    pub title: String,
}

impl ScrapedProfile {
    /// Cards with hidden or truncated names give nothing to estimate from.
    pub fn has_usable_name(&self) -> bool {
        let name = self.name.trim();
        if name.chars().count() < MIN_PROFILE_NAME_LEN {
            return false;
        }
        let lower = name.to_lowercase();
        !PLACEHOLDER_PROFILE_NAMES.contains(&lower.as_str())
    }
}

/// Reads a JSON array of scraped `{name, title}` profile cards. Gender is
/// always estimated from the first name.
pub struct ProfileListAdapter {
    source_id: String,
    path: PathBuf,
    config: NormalizerConfig,
}

impl ProfileListAdapter {
    pub fn new(source_id: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            source_id: source_id.into(),
            path: path.into(),
            config: NormalizerConfig::with_mapping(Self::field_mapping()),
        }
    }

    pub fn field_mapping() -> FieldMapping {
        FieldMapping {
            name: Some(NAME_COLUMN.to_string()),
            title: Some(TITLE_COLUMN.to_string()),
            ..FieldMapping::default()
        }
    }
}

#[async_trait::async_trait]
impl SourceAdapter for ProfileListAdapter {
    fn source_id(&self) -> &str {
        &self.source_id
    }

    fn normalizer_config(&self) -> &NormalizerConfig {
        &self.config
    }

    #[instrument(skip(self), fields(source_id = %self.source_id))]
    async fn connect(&mut self) -> bool {
        match tokio::fs::metadata(&self.path).await {
            Ok(meta) if meta.is_file() => {
                info!("Connected to profile list {}", self.path.display());
                true
            }
            Ok(_) => {
                warn!("Not a regular file: {}", self.path.display());
                false
            }
            Err(e) => {
                warn!("Cannot open {}: {}", self.path.display(), e);
                false
            }
        }
    }

    async fn fetch_raw_records(&self) -> Result<Vec<RawRecord>> {
        let text = tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|e| CollectorError::source(&self.source_id, e.to_string()))?;
        let profiles = parse_profiles(&text)
            .map_err(|e| CollectorError::source(&self.source_id, e.to_string()))?;
        Ok(profiles_to_records(profiles))
    }
}

pub fn parse_profiles(text: &str) -> Result<Vec<ScrapedProfile>> {
    Ok(serde_json::from_str(text)?)
}

pub fn profiles_to_records(profiles: Vec<ScrapedProfile>) -> Vec<RawRecord> {
    let total = profiles.len();
    let records: Vec<RawRecord> = profiles
        .into_iter()
        .filter(ScrapedProfile::has_usable_name)
        .map(|profile| {
            RawRecord::from([
                (NAME_COLUMN.to_string(), profile.name),
                (TITLE_COLUMN.to_string(), profile.title),
            ])
        })
        .collect();
    debug!("Kept {} of {} profile cards", records.len(), total);
    records
}
