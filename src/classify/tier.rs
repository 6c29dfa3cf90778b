use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::trace;

use crate::domain::Tier;
use crate::error::{CollectorError, Result};

/// Keywords and grade codes that place a title in one tier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TierRule {
    pub tier: Tier,
    /// Whole-word phrases matched against the padded, lower-cased title.
    #[serde(default)]
    pub keywords: Vec<String>,
    /// Exact HR grade codes, compared case-insensitively.
    #[serde(default)]
    pub grades: Vec<String>,
}

impl TierRule {
    pub fn new(tier: Tier, keywords: &[&str], grades: &[&str]) -> Self {
        Self {
            tier,
            keywords: keywords.iter().map(|k| k.to_string()).collect(),
            grades: grades.iter().map(|g| g.to_string()).collect(),
        }
    }
}

/// Ordered rule table, at most one rule per tier, most senior tier first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<TierRule>", into = "Vec<TierRule>")]
pub struct TierRuleTable {
    rules: Vec<TierRule>,
}

impl TierRuleTable {
    pub fn new(mut rules: Vec<TierRule>) -> Result<Self> {
        let mut seen = HashSet::new();
        for rule in &rules {
            if !seen.insert(rule.tier) {
                return Err(CollectorError::Config(format!(
                    "tier {} appears more than once in the rule table",
                    rule.tier.number()
                )));
            }
            if rule.keywords.iter().any(|k| k.trim().is_empty()) {
                return Err(CollectorError::Config(format!(
                    "tier {} has a blank keyword",
                    rule.tier.number()
                )));
            }
        }
        // Stable sort keeps the configured keyword order inside each rule
        rules.sort_by_key(|r| r.tier);
        Ok(Self { rules })
    }

    pub fn rules(&self) -> &[TierRule] {
        &self.rules
    }

    pub fn rule_for(&self, tier: Tier) -> Option<&TierRule> {
        self.rules.iter().find(|r| r.tier == tier)
    }
}

impl TryFrom<Vec<TierRule>> for TierRuleTable {
    type Error = CollectorError;

    fn try_from(rules: Vec<TierRule>) -> Result<Self> {
        TierRuleTable::new(rules)
    }
}

impl From<TierRuleTable> for Vec<TierRule> {
    fn from(table: TierRuleTable) -> Self {
        table.rules
    }
}

impl Default for TierRuleTable {
    fn default() -> Self {
        Self {
            rules: vec![
                TierRule::new(
                    Tier::Board,
                    &[
                        "independent director",
                        "non-executive director",
                        "board member",
                        "board of director",
                        "board of directors",
                        "chairman",
                        "chairperson",
                        "chairwoman",
                    ],
                    &[],
                ),
                TierRule::new(
                    Tier::CSuite,
                    &[
                        "chief executive",
                        "chief financial",
                        "chief technology",
                        "chief operating",
                        "chief marketing",
                        "chief information",
                        "chief human",
                        "chief people",
                        "chief product",
                        "chief revenue",
                        "ceo",
                        "cfo",
                        "cto",
                        "coo",
                        "cmo",
                        "cio",
                        "chro",
                        "cpo",
                        "managing director",
                        "founder",
                        "co-founder",
                    ],
                    &["E1", "E2", "L10", "L9"],
                ),
                TierRule::new(
                    Tier::SeniorManagement,
                    &[
                        "executive vice president",
                        "senior vice president",
                        "vice president",
                        "evp",
                        "svp",
                        "vp",
                        "avp",
                        "general manager",
                        "global head",
                        "country head",
                        "regional head",
                        "business head",
                        "head of",
                        "partner",
                    ],
                    &["E3", "E4", "L8", "L7", "M5", "M4"],
                ),
                TierRule::new(
                    Tier::MiddleManagement,
                    &[
                        "senior director",
                        "associate director",
                        "director",
                        "senior manager",
                        "program manager",
                        "project manager",
                        "product manager",
                        "delivery manager",
                        "engagement manager",
                        "engineering manager",
                        "manager",
                    ],
                    &["M3", "M2", "L6", "L5"],
                ),
                TierRule::new(
                    Tier::JuniorManagement,
                    &[
                        "team lead",
                        "tech lead",
                        "lead engineer",
                        "lead developer",
                        "lead analyst",
                        "supervisor",
                        "senior consultant",
                        "senior analyst",
                        "senior engineer",
                        "senior developer",
                        "senior associate",
                        "senior specialist",
                        "principal",
                        "lead",
                        "staff engineer",
                        "staff developer",
                        "senior",
                    ],
                    &["M1", "L4", "L3", "A4", "A3"],
                ),
                TierRule::new(
                    Tier::EntryLevel,
                    &[
                        "analyst",
                        "associate",
                        "consultant",
                        "engineer",
                        "developer",
                        "executive",
                        "trainee",
                        "intern",
                        "fresher",
                        "graduate",
                        "specialist",
                    ],
                    &["A2", "A1", "L2", "L1", "T1", "T2"],
                ),
            ],
        }
    }
}

/// What decided a classification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MatchReason {
    Keyword(String),
    Grade(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TierMatch {
    pub tier: Tier,
    pub reason: MatchReason,
}

struct CompiledRule {
    tier: Tier,
    /// (configured keyword, normalized and space-padded form)
    keywords: Vec<(String, String)>,
    grades: Vec<String>,
}

/// Maps a free-text job title and optional grade code to a [`Tier`].
///
/// Tiers are tried in ascending order and the first tier whose keywords or
/// grades match wins, so "Senior Director" lands in middle management through
/// "director" even though the junior tier also lists "senior". Inside one tier
/// the first keyword in configured order is reported; which keyword matched
/// never changes the resulting tier.
pub struct TierClassifier {
    table: Arc<TierRuleTable>,
    compiled: Vec<CompiledRule>,
    separators: Regex,
}

impl TierClassifier {
    pub fn new(table: Arc<TierRuleTable>) -> Self {
        let separators =
            Regex::new(r"[\s,/|()\[\];:]+").expect("separator pattern is a valid regex");

        let compiled = table
            .rules()
            .iter()
            .map(|rule| CompiledRule {
                tier: rule.tier,
                keywords: rule
                    .keywords
                    .iter()
                    .map(|k| (k.clone(), pad(&collapse(&separators, k))))
                    .collect(),
                grades: rule
                    .grades
                    .iter()
                    .map(|g| g.trim().to_uppercase())
                    .filter(|g| !g.is_empty())
                    .collect(),
            })
            .collect();

        Self {
            table,
            compiled,
            separators,
        }
    }

    pub fn table(&self) -> &TierRuleTable {
        &self.table
    }

    /// Tier number 1..=6, or 0 when neither title nor grade is recognized.
    pub fn classify(&self, title: &str, grade: &str) -> u8 {
        self.classify_tier(title, grade)
            .map(|t| t.number())
            .unwrap_or(0)
    }

    pub fn classify_tier(&self, title: &str, grade: &str) -> Option<Tier> {
        self.explain(title, grade).map(|m| m.tier)
    }

    /// Like [`classify_tier`](Self::classify_tier) but also reports which
    /// keyword or grade code decided the tier.
    pub fn explain(&self, title: &str, grade: &str) -> Option<TierMatch> {
        let padded_title = pad(&collapse(&self.separators, title));
        let grade = grade.trim().to_uppercase();

        for rule in &self.compiled {
            if let Some((keyword, _)) = rule
                .keywords
                .iter()
                .find(|(_, padded)| padded_title.contains(padded.as_str()))
            {
                trace!(tier = rule.tier.number(), keyword = %keyword, "title keyword matched");
                return Some(TierMatch {
                    tier: rule.tier,
                    reason: MatchReason::Keyword(keyword.clone()),
                });
            }

            if !grade.is_empty() && rule.grades.iter().any(|g| *g == grade) {
                trace!(tier = rule.tier.number(), grade = %grade, "grade code matched");
                return Some(TierMatch {
                    tier: rule.tier,
                    reason: MatchReason::Grade(grade),
                });
            }
        }

        None
    }
}

impl Default for TierClassifier {
    fn default() -> Self {
        Self::new(Arc::new(TierRuleTable::default()))
    }
}

fn collapse(separators: &Regex, text: &str) -> String {
    separators
        .replace_all(&text.to_lowercase(), " ")
        .trim()
        .to_string()
}

fn pad(text: &str) -> String {
    format!(" {} ", text)
}
