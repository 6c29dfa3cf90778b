use std::collections::BTreeMap;

use crate::domain::GenderMethod;
use crate::error::Result;
use crate::pipeline::processing::normalize::NormalizerConfig;

/// One raw row as produced by a source: column name to raw text value.
pub type RawRecord = BTreeMap<String, String>;

/// Core trait that all workforce data sources must implement
#[async_trait::async_trait]
pub trait SourceAdapter: Send + Sync {
    /// Unique identifier for this source within a collection run
    fn source_id(&self) -> &str;

    /// Field mapping, active-status values and gender spellings for this source
    fn normalizer_config(&self) -> &NormalizerConfig;

    /// How this source's gender values are derived, if it carries any
    fn gender_method(&self) -> Option<GenderMethod> {
        self.normalizer_config().field_mapping.gender_method()
    }

    /// Open the source. A `false` return skips it for this run.
    async fn connect(&mut self) -> bool;

    /// Fetch every raw row from the source
    async fn fetch_raw_records(&self) -> Result<Vec<RawRecord>>;
}
