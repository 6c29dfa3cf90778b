use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::classify::GenderTokens;
use crate::constants::{
    get_supported_source_kinds, CONFIG_PATH_ENV, DEFAULT_CONFIG_PATH, DEFAULT_OUTPUT_DIR,
    DEFAULT_REPORT_LABEL,
};
use crate::error::{CollectorError, Result};
use crate::pipeline::processing::normalize::FieldMapping;

#[derive(Debug, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub collection: CollectionConfig,
    #[serde(default)]
    pub sources: Vec<SourceConfig>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CollectionConfig {
    /// Organization or run label used in report names
    #[serde(default = "default_label")]
    pub label: String,
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
    /// JSON rule book; built-in tables when absent
    #[serde(default)]
    pub rules_path: Option<PathBuf>,
}

impl Default for CollectionConfig {
    fn default() -> Self {
        Self {
            label: default_label(),
            output_dir: default_output_dir(),
            rules_path: None,
        }
    }
}

fn default_label() -> String {
    DEFAULT_REPORT_LABEL.to_string()
}

fn default_output_dir() -> PathBuf {
    PathBuf::from(DEFAULT_OUTPUT_DIR)
}

#[derive(Debug, Clone, Deserialize)]
pub struct SourceConfig {
    /// Defaults to the file stem of `path`
    #[serde(default)]
    pub id: Option<String>,
    pub kind: String,
    pub path: PathBuf,
    /// Detected from the header row when omitted
    #[serde(default)]
    pub field_mapping: Option<FieldMapping>,
    #[serde(default)]
    pub active_values: Option<Vec<String>>,
    #[serde(default)]
    pub gender_values: Option<GenderTokens>,
}

impl SourceConfig {
    pub fn source_id(&self) -> String {
        self.id.clone().unwrap_or_else(|| {
            self.path
                .file_stem()
                .map(|stem| stem.to_string_lossy().into_owned())
                .unwrap_or_else(|| self.kind.clone())
        })
    }
}

impl Config {
    /// Loads from `$EQUIVERSE_CONFIG`, falling back to `collector.toml`
    pub fn load() -> Result<Self> {
        let config_path =
            std::env::var(CONFIG_PATH_ENV).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
        Self::load_from(config_path)
    }

    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self> {
        let config_path = path.as_ref();
        let config_content = fs::read_to_string(config_path).map_err(|e| {
            CollectorError::Config(format!(
                "Failed to read config file '{}': {}",
                config_path.display(),
                e
            ))
        })?;

        let config: Config = toml::from_str(&config_content)?;
        config.validate()?;
        info!(
            "Loaded config from {} with {} source(s)",
            config_path.display(),
            config.sources.len()
        );
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        let supported = get_supported_source_kinds();
        for source in &self.sources {
            if !supported.contains(&source.kind.as_str()) {
                return Err(CollectorError::Config(format!(
                    "Unknown source kind '{}'. Supported kinds: {}",
                    source.kind,
                    supported.join(", ")
                )));
            }
        }
        if self.collection.label.trim().is_empty() {
            return Err(CollectorError::Config("collection label is empty".to_string()));
        }
        Ok(())
    }
}
