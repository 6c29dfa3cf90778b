use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use crate::domain::Gender;

/// Accepted spellings of an explicit gender column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenderTokens {
    #[serde(default)]
    pub male: Vec<String>,
    #[serde(default)]
    pub female: Vec<String>,
}

impl Default for GenderTokens {
    fn default() -> Self {
        Self {
            male: ["M", "MALE", "1", "MAN", "HE"].iter().map(|s| s.to_string()).collect(),
            female: ["F", "FEMALE", "2", "WOMAN", "SHE"].iter().map(|s| s.to_string()).collect(),
        }
    }
}

/// A name ending that hints at a gender once the name is longer than `min_len`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SuffixRule {
    pub suffix: String,
    pub gender: Gender,
    #[serde(default)]
    pub min_len: usize,
}

impl SuffixRule {
    fn new(suffix: &str, gender: Gender, min_len: usize) -> Self {
        Self {
            suffix: suffix.to_string(),
            gender,
            min_len,
        }
    }
}

/// First-name table plus ordered suffix fallbacks for name-based estimation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenderLexicon {
    #[serde(default)]
    pub names: HashMap<String, Gender>,
    #[serde(default)]
    pub suffixes: Vec<SuffixRule>,
}

const FEMALE_NAMES: &[&str] = &[
    "priya", "neha", "pooja", "anjali", "divya", "swati", "kavita", "sunita", "meera", "anita",
    "deepika", "shreya", "nisha", "rekha", "geeta", "shalini", "preeti", "manisha", "rashmi",
    "smita", "archana", "shweta", "pallavi", "jyoti", "ritu", "aarti", "sneha", "bhavna",
    "garima", "kriti", "aditi", "aishwarya", "ananya", "diya", "isha", "kiara", "mira",
    "nandini", "riya", "saanvi", "tanvi", "vedika", "zara", "anika", "avni",
];

const MALE_NAMES: &[&str] = &[
    "rahul", "amit", "raj", "suresh", "rajesh", "vijay", "ajay", "sanjay", "deepak", "manoj",
    "arun", "kumar", "ravi", "sandeep", "vikram", "ashok", "ramesh", "mukesh", "dinesh",
    "naresh", "rohit", "nikhil", "varun", "karan", "arjun", "aarav", "advait", "arnav", "dev",
    "harsh", "ishaan", "kabir", "krishna", "mohit", "pranav", "reyansh", "siddharth", "veer",
    "yash", "aditya", "akash", "ankit", "gaurav", "himanshu", "manish",
];

impl Default for GenderLexicon {
    fn default() -> Self {
        let names = FEMALE_NAMES
            .iter()
            .map(|n| (n.to_string(), Gender::Female))
            .chain(MALE_NAMES.iter().map(|n| (n.to_string(), Gender::Male)))
            .collect();

        let female = ["a", "i", "ee", "ti", "ni", "ya", "ka", "na", "ri"]
            .iter()
            .map(|s| SuffixRule::new(s, Gender::Female, 3));
        let male = ["sh", "raj", "deep", "kumar", "esh", "an", "av"]
            .iter()
            .map(|s| SuffixRule::new(s, Gender::Male, 0));

        Self {
            names,
            suffixes: female.chain(male).collect(),
        }
    }
}

/// Gender classification in two modes.
///
/// [`normalize`](Self::normalize) reads an explicit gender field and is exact.
/// [`estimate`](Self::estimate) guesses from a first name and is only ever an
/// estimate: the lexicon covers a narrow population and the suffix fallback
/// tries every female ending before any male ending, so a name that fits
/// endings of both kinds is reported Female. That bias is known and kept so
/// results stay comparable with earlier collections; treat estimated counts
/// accordingly.
pub struct GenderClassifier {
    male_tokens: HashSet<String>,
    female_tokens: HashSet<String>,
    names: HashMap<String, Gender>,
    female_suffixes: Vec<SuffixRule>,
    male_suffixes: Vec<SuffixRule>,
    lexicon: Arc<GenderLexicon>,
}

impl GenderClassifier {
    pub fn new(tokens: &GenderTokens, lexicon: Arc<GenderLexicon>) -> Self {
        let upper = |values: &[String]| -> HashSet<String> {
            values
                .iter()
                .map(|v| v.trim().to_uppercase())
                .filter(|v| !v.is_empty())
                .collect()
        };

        // Unknown lexicon entries carry no signal; treat them as absent
        let names = lexicon
            .names
            .iter()
            .filter(|(_, g)| **g != Gender::Unknown)
            .map(|(n, g)| (n.trim().to_lowercase(), *g))
            .collect();

        let normalized_suffixes = lexicon.suffixes.iter().map(|r| SuffixRule {
            suffix: r.suffix.trim().to_lowercase(),
            ..r.clone()
        });
        let (female_suffixes, rest): (Vec<_>, Vec<_>) =
            normalized_suffixes.partition(|r| r.gender == Gender::Female);
        let male_suffixes = rest.into_iter().filter(|r| r.gender == Gender::Male).collect();

        Self {
            male_tokens: upper(&tokens.male),
            female_tokens: upper(&tokens.female),
            names,
            female_suffixes,
            male_suffixes,
            lexicon,
        }
    }

    pub fn lexicon(&self) -> &Arc<GenderLexicon> {
        &self.lexicon
    }

    /// Exact-token mode. Total: anything not in either token list is Unknown.
    pub fn normalize(&self, raw_value: &str) -> Gender {
        let value = raw_value.trim().to_uppercase();
        if value.is_empty() {
            return Gender::Unknown;
        }
        if self.male_tokens.contains(&value) {
            Gender::Male
        } else if self.female_tokens.contains(&value) {
            Gender::Female
        } else {
            Gender::Unknown
        }
    }

    /// Name-inference mode: lexicon lookup, then female suffixes, then male
    /// suffixes. Returns an estimate, never ground truth.
    pub fn estimate(&self, first_name: &str) -> Gender {
        let name = first_name.trim().to_lowercase();
        if name.is_empty() {
            return Gender::Unknown;
        }

        if let Some(gender) = self.names.get(&name) {
            return *gender;
        }

        let len = name.chars().count();
        self.female_suffixes
            .iter()
            .chain(self.male_suffixes.iter())
            .find(|rule| !rule.suffix.is_empty() && len > rule.min_len && name.ends_with(&rule.suffix))
            .map(|rule| rule.gender)
            .unwrap_or(Gender::Unknown)
    }

    /// Estimates from the first whitespace-separated token of a display name.
    pub fn estimate_from_full_name(&self, full_name: &str) -> Gender {
        full_name
            .split_whitespace()
            .next()
            .map(|first| self.estimate(first))
            .unwrap_or(Gender::Unknown)
    }
}

impl Default for GenderClassifier {
    fn default() -> Self {
        Self::new(&GenderTokens::default(), Arc::new(GenderLexicon::default()))
    }
}
