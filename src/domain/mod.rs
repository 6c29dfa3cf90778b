//! Anonymous record shapes shared across layers.
//!
//! Nothing in this module can hold a name, an employee id or a free-text
//! title. A [`StandardRecord`] is the only unit that leaves normalization, and
//! it carries exactly the five categorical fields below.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Gender category after normalization or estimation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
    /// Other, non-binary, undisclosed or not inferable.
    Unknown,
}

impl Gender {
    pub fn symbol(&self) -> &'static str {
        match self {
            Gender::Male => "M",
            Gender::Female => "F",
            Gender::Unknown => "U",
        }
    }
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Gender::Male => "Male",
            Gender::Female => "Female",
            Gender::Unknown => "Unknown",
        };
        f.write_str(label)
    }
}

/// Seniority band, 1 (Board) most senior to 6 (Entry) least senior.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum Tier {
    Board = 1,
    CSuite = 2,
    SeniorManagement = 3,
    MiddleManagement = 4,
    JuniorManagement = 5,
    EntryLevel = 6,
}

impl Tier {
    /// All tiers, most senior first.
    pub const ALL: [Tier; 6] = [
        Tier::Board,
        Tier::CSuite,
        Tier::SeniorManagement,
        Tier::MiddleManagement,
        Tier::JuniorManagement,
        Tier::EntryLevel,
    ];

    pub fn number(&self) -> u8 {
        *self as u8
    }

    /// `None` for 0 (unclassifiable) and anything above 6.
    pub fn from_number(number: u8) -> Option<Tier> {
        match number {
            1 => Some(Tier::Board),
            2 => Some(Tier::CSuite),
            3 => Some(Tier::SeniorManagement),
            4 => Some(Tier::MiddleManagement),
            5 => Some(Tier::JuniorManagement),
            6 => Some(Tier::EntryLevel),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Tier::Board => "Board",
            Tier::CSuite => "C-Suite",
            Tier::SeniorManagement => "Senior Management",
            Tier::MiddleManagement => "Middle Management",
            Tier::JuniorManagement => "Junior Management",
            Tier::EntryLevel => "Entry Level",
        }
    }

    pub fn short_name(&self) -> &'static str {
        match self {
            Tier::Board => "Board",
            Tier::CSuite => "C-Suite",
            Tier::SeniorManagement => "Senior",
            Tier::MiddleManagement => "Middle",
            Tier::JuniorManagement => "Junior",
            Tier::EntryLevel => "Entry",
        }
    }

    pub(crate) fn index(&self) -> usize {
        (self.number() - 1) as usize
    }
}

impl TryFrom<u8> for Tier {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Tier::from_number(value).ok_or_else(|| format!("tier must be between 1 and 6, got {}", value))
    }
}

impl From<Tier> for u8 {
    fn from(tier: Tier) -> u8 {
        tier.number()
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Tier {} ({})", self.number(), self.short_name())
    }
}

/// How a source arrives at a gender value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GenderMethod {
    /// Exact token from a gender column.
    Declared,
    /// Estimated from a first name; a statistical guess, not ground truth.
    Estimated,
}

/// Anonymized, schema-fixed record produced by normalization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StandardRecord {
    gender: Gender,
    tier: Tier,
    is_active: bool,
    tenure_band: Option<String>,
    department_type: Option<String>,
}

impl StandardRecord {
    pub fn new(
        gender: Gender,
        tier: Tier,
        is_active: bool,
        tenure_band: Option<String>,
        department_type: Option<String>,
    ) -> Self {
        Self {
            gender,
            tier,
            is_active,
            tenure_band,
            department_type,
        }
    }

    pub fn gender(&self) -> Gender {
        self.gender
    }

    pub fn tier(&self) -> Tier {
        self.tier
    }

    pub fn is_active(&self) -> bool {
        self.is_active
    }

    pub fn tenure_band(&self) -> Option<&str> {
        self.tenure_band.as_deref()
    }

    pub fn department_type(&self) -> Option<&str> {
        self.department_type.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tier_numbers_are_ordinal() {
        for (i, tier) in Tier::ALL.iter().enumerate() {
            assert_eq!(tier.number() as usize, i + 1);
            assert_eq!(Tier::from_number(tier.number()), Some(*tier));
        }
        assert_eq!(Tier::from_number(0), None);
        assert_eq!(Tier::from_number(7), None);
    }

    #[test]
    fn tier_serializes_as_number() {
        let json = serde_json::to_string(&Tier::MiddleManagement).unwrap();
        assert_eq!(json, "4");
        let back: Tier = serde_json::from_str("2").unwrap();
        assert_eq!(back, Tier::CSuite);
        assert!(serde_json::from_str::<Tier>("0").is_err());
    }

    #[test]
    fn standard_record_has_only_categorical_fields() {
        let record = StandardRecord::new(
            Gender::Female,
            Tier::EntryLevel,
            true,
            Some("0-2y".to_string()),
            None,
        );
        let value = serde_json::to_value(&record).unwrap();
        let keys: Vec<&String> = value.as_object().unwrap().keys().collect();
        assert_eq!(
            keys,
            vec!["department_type", "gender", "is_active", "tenure_band", "tier"]
        );
    }
}
