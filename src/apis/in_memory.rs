use crate::error::Result;
use crate::pipeline::processing::normalize::NormalizerConfig;
use crate::types::{RawRecord, SourceAdapter};

/// Rows handed in directly, for demos and tests
pub struct InMemoryAdapter {
    source_id: String,
    config: NormalizerConfig,
    rows: Vec<RawRecord>,
}

impl InMemoryAdapter {
    pub fn new(source_id: &str, config: NormalizerConfig, rows: Vec<RawRecord>) -> Self {
        Self {
            source_id: source_id.to_string(),
            config,
            rows,
        }
    }
}

#[async_trait::async_trait]
impl SourceAdapter for InMemoryAdapter {
    fn source_id(&self) -> &str {
        &self.source_id
    }

    fn normalizer_config(&self) -> &NormalizerConfig {
        &self.config
    }

    async fn connect(&mut self) -> bool {
        true
    }

    async fn fetch_raw_records(&self) -> Result<Vec<RawRecord>> {
        Ok(self.rows.clone())
    }
}
