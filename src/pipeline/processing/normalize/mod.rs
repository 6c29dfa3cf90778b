use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::debug;

use crate::classify::{Classifiers, GenderClassifier, GenderTokens};
use crate::domain::{Gender, GenderMethod, StandardRecord};
use crate::types::RawRecord;

/// Which raw column feeds each logical field. Unmapped fields are `None`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldMapping {
    #[serde(default)]
    pub gender: Option<String>,
    /// Display name; only read to estimate gender when `gender` is unmapped.
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub grade: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub department: Option<String>,
    #[serde(default)]
    pub tenure: Option<String>,
}

impl FieldMapping {
    /// A mapping where every logical field reads the column of the same name.
    pub fn identity() -> Self {
        Self {
            gender: Some("gender".to_string()),
            name: None,
            title: Some("title".to_string()),
            grade: Some("grade".to_string()),
            status: Some("status".to_string()),
            department: Some("department".to_string()),
            tenure: Some("tenure".to_string()),
        }
    }

    /// Exact tokens win over name estimation when both columns are mapped.
    pub fn gender_method(&self) -> Option<GenderMethod> {
        if self.gender.is_some() {
            Some(GenderMethod::Declared)
        } else if self.name.is_some() {
            Some(GenderMethod::Estimated)
        } else {
            None
        }
    }

    /// Suggests a mapping from header names. When several columns match the
    /// same field the last one wins.
    pub fn auto_detect<I, S>(columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        const GENDER: &[&str] = &["gender", "sex", "m/f", "male/female"];
        const TITLE: &[&str] = &["title", "designation", "position", "job", "role"];
        const GRADE: &[&str] = &["grade", "level", "band"];
        const STATUS: &[&str] = &["status", "active", "employment"];
        const DEPARTMENT: &[&str] = &["department", "dept", "function", "division"];
        const TENURE: &[&str] = &["tenure", "experience", "years", "service"];
        const NAME: &[&str] = &["name"];

        let mut mapping = FieldMapping::default();
        for column in columns {
            let column = column.as_ref();
            let lower = column.to_lowercase();
            let hit = |patterns: &[&str]| patterns.iter().any(|p| lower.contains(p));

            if hit(GENDER) {
                mapping.gender = Some(column.to_string());
            }
            if hit(TITLE) {
                mapping.title = Some(column.to_string());
            }
            if hit(GRADE) {
                mapping.grade = Some(column.to_string());
            }
            if hit(STATUS) {
                mapping.status = Some(column.to_string());
            }
            if hit(DEPARTMENT) {
                mapping.department = Some(column.to_string());
            }
            if hit(TENURE) {
                mapping.tenure = Some(column.to_string());
            }
            if hit(NAME) {
                mapping.name = Some(column.to_string());
            }
        }
        mapping
    }
}

pub const DEFAULT_ACTIVE_VALUES: &[&str] = &["Active", "ACTIVE", "1", "Y", "Yes", "TRUE", "Current"];

/// Per-source normalization settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizerConfig {
    #[serde(default)]
    pub field_mapping: FieldMapping,
    /// Status values meaning "currently employed", compared case-insensitively
    #[serde(default = "default_active_values")]
    pub active_values: Vec<String>,
    /// Source-specific gender spellings; the rule book's tokens otherwise
    #[serde(default)]
    pub gender_values: Option<GenderTokens>,
}

fn default_active_values() -> Vec<String> {
    DEFAULT_ACTIVE_VALUES.iter().map(|s| s.to_string()).collect()
}

impl Default for NormalizerConfig {
    fn default() -> Self {
        Self {
            field_mapping: FieldMapping::default(),
            active_values: default_active_values(),
            gender_values: None,
        }
    }
}

impl NormalizerConfig {
    pub fn with_mapping(field_mapping: FieldMapping) -> Self {
        Self {
            field_mapping,
            ..Self::default()
        }
    }
}

/// Turns one raw row into at most one anonymous [`StandardRecord`].
///
/// Pure: holds only read-only tables, so one instance can serve many tasks.
pub struct RecordNormalizer {
    classifiers: Classifiers,
    mapping: FieldMapping,
    active_values: HashSet<String>,
}

impl RecordNormalizer {
    pub fn new(classifiers: Classifiers, config: NormalizerConfig) -> Self {
        let classifiers = match &config.gender_values {
            Some(tokens) => Classifiers {
                tier: classifiers.tier.clone(),
                gender: Arc::new(GenderClassifier::new(
                    tokens,
                    classifiers.gender.lexicon().clone(),
                )),
            },
            None => classifiers,
        };

        let active_values = config
            .active_values
            .iter()
            .map(|v| v.trim().to_uppercase())
            .collect();

        Self {
            classifiers,
            mapping: config.field_mapping,
            active_values,
        }
    }

    pub fn mapping(&self) -> &FieldMapping {
        &self.mapping
    }

    /// `None` when neither title nor grade can be placed in a tier. Missing
    /// columns read as empty strings, so malformed rows take the same path.
    pub fn normalize(&self, raw: &RawRecord) -> Option<StandardRecord> {
        let title = read_field(raw, &self.mapping.title);
        let grade = read_field(raw, &self.mapping.grade);
        let tier = match self.classifiers.tier.classify_tier(title, grade) {
            Some(tier) => tier,
            None => {
                debug!("Dropping row with unclassifiable title/grade");
                return None;
            }
        };

        let gender = match self.mapping.gender_method() {
            Some(GenderMethod::Declared) => self
                .classifiers
                .gender
                .normalize(read_field(raw, &self.mapping.gender)),
            Some(GenderMethod::Estimated) => self
                .classifiers
                .gender
                .estimate_from_full_name(read_field(raw, &self.mapping.name)),
            None => Gender::Unknown,
        };

        let is_active = if self.mapping.status.is_some() {
            let status = read_field(raw, &self.mapping.status).trim().to_uppercase();
            self.active_values.contains(&status)
        } else {
            true
        };

        let department = non_empty(read_field(raw, &self.mapping.department));
        let tenure = tenure_band(read_field(raw, &self.mapping.tenure));

        Some(StandardRecord::new(gender, tier, is_active, tenure, department))
    }
}

/// Free-function form of [`RecordNormalizer::normalize`] for one-off rows.
pub fn normalize_record(
    raw: &RawRecord,
    field_mapping: &FieldMapping,
    active_values: &[String],
    classifiers: &Classifiers,
) -> Option<StandardRecord> {
    let config = NormalizerConfig {
        field_mapping: field_mapping.clone(),
        active_values: active_values.to_vec(),
        gender_values: None,
    };
    RecordNormalizer::new(classifiers.clone(), config).normalize(raw)
}

/// Buckets a numeric years-of-service value; other text is kept as given.
pub fn tenure_band(raw: &str) -> Option<String> {
    let value = raw.trim();
    if value.is_empty() {
        return None;
    }
    match value.parse::<f64>() {
        Ok(years) if years.is_finite() && years >= 0.0 => {
            let band = if years < 2.0 {
                "0-2y"
            } else if years < 5.0 {
                "2-5y"
            } else if years < 10.0 {
                "5-10y"
            } else {
                "10+y"
            };
            Some(band.to_string())
        }
        Ok(_) => None,
        Err(_) => Some(value.to_string()),
    }
}

fn read_field<'a>(raw: &'a RawRecord, column: &Option<String>) -> &'a str {
    column
        .as_deref()
        .and_then(|c| raw.get(c))
        .map(String::as_str)
        .unwrap_or("")
}

fn non_empty(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}
