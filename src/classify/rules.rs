use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::sync::Arc;
use tracing::info;

use super::gender::{GenderClassifier, GenderLexicon, GenderTokens};
use super::tier::{TierClassifier, TierRuleTable};
use crate::error::{CollectorError, Result};

/// Complete classification taxonomy, loadable from a JSON file.
///
/// Sections missing from the file fall back to the built-in defaults, so a
/// file holding only `{"tiers": [...]}` swaps the tier table and keeps the
/// stock gender lexicon.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RuleBook {
    #[serde(default)]
    pub tiers: TierRuleTable,
    #[serde(default)]
    pub gender_tokens: GenderTokens,
    #[serde(default)]
    pub lexicon: GenderLexicon,
}

impl RuleBook {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            CollectorError::Config(format!("Failed to read rule file '{}': {}", path.display(), e))
        })?;
        let book: RuleBook = serde_json::from_str(&content)?;
        info!(
            path = %path.display(),
            tiers = book.tiers.rules().len(),
            names = book.lexicon.names.len(),
            "Loaded classification rules"
        );
        Ok(book)
    }

    /// Freezes the tables into shareable classifiers.
    pub fn into_classifiers(self) -> Classifiers {
        let tiers = TierClassifier::new(Arc::new(self.tiers));
        let gender = GenderClassifier::new(&self.gender_tokens, Arc::new(self.lexicon));
        Classifiers {
            tier: Arc::new(tiers),
            gender: Arc::new(gender),
        }
    }
}

/// Read-only classifiers shared by every normalizer in a run.
#[derive(Clone)]
pub struct Classifiers {
    pub tier: Arc<TierClassifier>,
    pub gender: Arc<GenderClassifier>,
}

impl Default for Classifiers {
    fn default() -> Self {
        RuleBook::default().into_classifiers()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Gender;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn partial_rule_file_keeps_default_sections() {
        let mut file = NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"tiers": [{{"tier": 1, "keywords": ["trustee"]}}]}}"#
        )
        .unwrap();

        let classifiers = RuleBook::load(file.path()).unwrap().into_classifiers();
        assert_eq!(classifiers.tier.classify("Trustee", ""), 1);
        assert_eq!(classifiers.tier.classify("CEO", ""), 0);
        assert_eq!(classifiers.gender.estimate("Priya"), Gender::Female);
        assert_eq!(classifiers.gender.normalize("F"), Gender::Female);
    }

    #[test]
    fn invalid_tier_table_is_a_load_error() {
        let mut file = NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"tiers": [{{"tier": 2}}, {{"tier": 2}}]}}"#
        )
        .unwrap();
        assert!(RuleBook::load(file.path()).is_err());
    }

    #[test]
    fn missing_rule_file_is_a_config_error() {
        let err = RuleBook::load("/definitely/not/here.json").unwrap_err();
        assert!(matches!(err, CollectorError::Config(_)));
    }

    #[test]
    fn default_book_round_trips_through_json() {
        let book = RuleBook::default();
        let json = serde_json::to_string(&book).unwrap();
        let back: RuleBook = serde_json::from_str(&json).unwrap();
        assert_eq!(back, book);
    }
}
