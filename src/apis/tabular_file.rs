use serde_json::Value;
use std::path::{Path, PathBuf};
use tracing::{debug, info, instrument, warn};

use crate::error::{CollectorError, Result};
use crate::infra::csv_format;
use crate::pipeline::processing::normalize::{FieldMapping, NormalizerConfig};
use crate::types::{RawRecord, SourceAdapter};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileFormat {
    Csv,
    Json,
    JsonLines,
}

impl FileFormat {
    pub fn from_path(path: &Path) -> Option<Self> {
        let extension = path.extension()?.to_str()?.to_lowercase();
        match extension.as_str() {
            "csv" => Some(FileFormat::Csv),
            "json" => Some(FileFormat::Json),
            "jsonl" | "ndjson" => Some(FileFormat::JsonLines),
            _ => None,
        }
    }
}

/// Reads an HR export from a CSV, JSON array or JSON Lines file.
pub struct TabularFileAdapter {
    source_id: String,
    path: PathBuf,
    config: NormalizerConfig,
    detect_mapping: bool,
    format: Option<FileFormat>,
}

impl TabularFileAdapter {
    pub fn new(source_id: impl Into<String>, path: impl Into<PathBuf>, config: NormalizerConfig) -> Self {
        Self {
            source_id: source_id.into(),
            path: path.into(),
            config,
            detect_mapping: false,
            format: None,
        }
    }

    /// Fills the field mapping from the file's columns on `connect`.
    pub fn with_detected_mapping(mut self) -> Self {
        self.detect_mapping = true;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn read_rows(&self, format: FileFormat) -> Result<Vec<RawRecord>> {
        let text = tokio::fs::read_to_string(&self.path).await?;
        match format {
            FileFormat::Csv => rows_from_csv(&text),
            FileFormat::Json => rows_from_json(&text),
            FileFormat::JsonLines => rows_from_json_lines(&text),
        }
    }
}

#[async_trait::async_trait]
impl SourceAdapter for TabularFileAdapter {
    fn source_id(&self) -> &str {
        &self.source_id
    }

    fn normalizer_config(&self) -> &NormalizerConfig {
        &self.config
    }

    #[instrument(skip(self), fields(source_id = %self.source_id))]
    async fn connect(&mut self) -> bool {
        let Some(format) = FileFormat::from_path(&self.path) else {
            warn!("Unsupported file type: {}", self.path.display());
            return false;
        };

        match tokio::fs::metadata(&self.path).await {
            Ok(meta) if meta.is_file() => {}
            Ok(_) => {
                warn!("Not a regular file: {}", self.path.display());
                return false;
            }
            Err(e) => {
                warn!("Cannot open {}: {}", self.path.display(), e);
                return false;
            }
        }

        if self.detect_mapping {
            let rows = match self.read_rows(format).await {
                Ok(rows) => rows,
                Err(e) => {
                    warn!("Cannot read {}: {}", self.path.display(), e);
                    return false;
                }
            };
            let columns = rows.first().map(|row| row.keys().cloned().collect::<Vec<_>>());
            self.config.field_mapping = FieldMapping::auto_detect(columns.unwrap_or_default());
            debug!("Detected field mapping: {:?}", self.config.field_mapping);
        }

        self.format = Some(format);
        info!("Connected to {}", self.path.display());
        true
    }

    async fn fetch_raw_records(&self) -> Result<Vec<RawRecord>> {
        let format = self
            .format
            .ok_or_else(|| CollectorError::source(&self.source_id, "fetch called before connect"))?;
        self.read_rows(format)
            .await
            .map_err(|e| CollectorError::source(&self.source_id, e.to_string()))
    }
}

/// Header row names the columns. Short rows leave trailing columns unset.
pub fn rows_from_csv(text: &str) -> Result<Vec<RawRecord>> {
    // Spreadsheet exports often lead with a UTF-8 byte order mark
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);
    let mut rows = csv_format::parse(text)?.into_iter();
    let header: Vec<String> = match rows.next() {
        Some(header) => header.into_iter().map(|h| h.trim().to_string()).collect(),
        None => return Ok(Vec::new()),
    };

    Ok(rows
        .map(|fields| {
            header
                .iter()
                .cloned()
                .zip(fields)
                .filter(|(column, _)| !column.is_empty())
                .collect()
        })
        .collect())
}

pub fn rows_from_json(text: &str) -> Result<Vec<RawRecord>> {
    match serde_json::from_str::<Value>(text)? {
        Value::Array(items) => items.into_iter().map(record_from_value).collect(),
        other => Err(CollectorError::Parse(format!(
            "expected a JSON array of objects, found {}",
            json_kind(&other)
        ))),
    }
}

pub fn rows_from_json_lines(text: &str) -> Result<Vec<RawRecord>> {
    text.lines()
        .filter(|line| !line.trim().is_empty())
        .map(|line| record_from_value(serde_json::from_str(line)?))
        .collect()
}

fn record_from_value(value: Value) -> Result<RawRecord> {
    match value {
        Value::Object(map) => Ok(map
            .into_iter()
            .filter_map(|(key, value)| scalar_to_string(value).map(|text| (key, text)))
            .collect()),
        other => Err(CollectorError::Parse(format!(
            "expected a JSON object per row, found {}",
            json_kind(&other)
        ))),
    }
}

/// Nested arrays and objects carry nothing the normalizer reads.
fn scalar_to_string(value: Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Null => Some(String::new()),
        Value::Array(_) | Value::Object(_) => None,
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::{Builder, NamedTempFile};

    fn temp_file(suffix: &str, body: &str) -> NamedTempFile {
        let mut file = Builder::new().suffix(suffix).tempfile().unwrap();
        file.write_all(body.as_bytes()).unwrap();
        file
    }

    #[test]
    fn csv_rows_are_keyed_by_header() {
        let rows = rows_from_csv("Gender,Designation\nF,\"Manager, Ops\"\nM\n").unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0]["Designation"], "Manager, Ops");
        assert_eq!(rows[1].get("Designation"), None);
    }

    #[test]
    fn csv_byte_order_mark_is_ignored() {
        let rows = rows_from_csv("\u{feff}Gender,Designation\nF,CEO\n").unwrap();
        assert_eq!(rows[0]["Gender"], "F");
        assert_eq!(
            FieldMapping::auto_detect(rows[0].keys()).gender.as_deref(),
            Some("Gender")
        );
    }

    #[test]
    fn json_scalars_become_strings() {
        let rows = rows_from_json(
            r#"[{"gender": "F", "years": 3.5, "active": true, "grade": null, "tags": ["x"]}]"#,
        )
        .unwrap();
        assert_eq!(rows[0]["years"], "3.5");
        assert_eq!(rows[0]["active"], "true");
        assert_eq!(rows[0]["grade"], "");
        assert!(!rows[0].contains_key("tags"));
    }

    #[test]
    fn json_must_be_an_array_of_objects() {
        assert!(rows_from_json(r#"{"gender": "F"}"#).is_err());
        assert!(rows_from_json("[1, 2]").is_err());
    }

    #[test]
    fn json_lines_skip_blank_lines() {
        let rows = rows_from_json_lines("{\"title\": \"CEO\"}\n\n{\"title\": \"CTO\"}\n").unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1]["title"], "CTO");
    }

    #[test]
    fn format_follows_extension() {
        assert_eq!(FileFormat::from_path(Path::new("a/b.CSV")), Some(FileFormat::Csv));
        assert_eq!(FileFormat::from_path(Path::new("b.ndjson")), Some(FileFormat::JsonLines));
        assert_eq!(FileFormat::from_path(Path::new("b.xlsx")), None);
        assert_eq!(FileFormat::from_path(Path::new("noext")), None);
    }

    #[tokio::test]
    async fn connect_fails_for_missing_or_unsupported_files() {
        let mut missing =
            TabularFileAdapter::new("missing", "/no/such/export.csv", NormalizerConfig::default());
        assert!(!missing.connect().await);

        let sheet = temp_file(".xlsx", "binary");
        let mut unsupported =
            TabularFileAdapter::new("sheet", sheet.path(), NormalizerConfig::default());
        assert!(!unsupported.connect().await);
    }

    #[tokio::test]
    async fn fetch_before_connect_is_an_error() {
        let file = temp_file(".csv", "title\nCEO\n");
        let adapter = TabularFileAdapter::new("hr", file.path(), NormalizerConfig::default());
        assert!(adapter.fetch_raw_records().await.is_err());
    }

    #[tokio::test]
    async fn detected_mapping_reads_header_names() {
        let file = temp_file(".csv", "Emp Gender,Job Title,Grade\nF,Analyst,L1\n");
        let mut adapter =
            TabularFileAdapter::new("hr", file.path(), NormalizerConfig::default()).with_detected_mapping();
        assert!(adapter.connect().await);

        let mapping = &adapter.normalizer_config().field_mapping;
        assert_eq!(mapping.gender.as_deref(), Some("Emp Gender"));
        assert_eq!(mapping.title.as_deref(), Some("Job Title"));
        assert_eq!(mapping.grade.as_deref(), Some("Grade"));

        let rows = adapter.fetch_raw_records().await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0]["Job Title"], "Analyst");
    }
}
