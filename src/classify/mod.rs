//! Deterministic classification of titles, grades and gender markers.
//!
//! All tables are plain data built once per run and shared read-only, so
//! the classifiers can be called from any number of tasks without locking.

pub mod gender;
pub mod rules;
pub mod tier;

use once_cell::sync::Lazy;

use crate::domain::Gender;

pub use gender::{GenderClassifier, GenderLexicon, GenderTokens, SuffixRule};
pub use rules::{Classifiers, RuleBook};
pub use tier::{MatchReason, TierClassifier, TierMatch, TierRule, TierRuleTable};

static BUILT_IN: Lazy<Classifiers> = Lazy::new(Classifiers::default);

/// Classifiers over the built-in tables, built on first use.
pub fn built_in() -> &'static Classifiers {
    &BUILT_IN
}

/// Tier number 0..=6 for a title and grade under the built-in table.
pub fn classify_tier(title: &str, grade: &str) -> u8 {
    BUILT_IN.tier.classify(title, grade)
}

pub fn classify_gender_token(raw_value: &str) -> Gender {
    BUILT_IN.gender.normalize(raw_value)
}

pub fn estimate_gender_from_name(name: &str) -> Gender {
    BUILT_IN.gender.estimate_from_full_name(name)
}
