//! The investment profile and its closed answer vocabulary.
//!
//! Extraction output is only accepted when every categorical field is one of
//! the values below; anything else is rejected rather than guessed at.

use serde::{Deserialize, Serialize};

use crate::errors::DomainError;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Horizon {
    ShortTerm,
    MediumTerm,
    LongTerm,
}

impl Horizon {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ShortTerm => "short_term",
            Self::MediumTerm => "medium_term",
            Self::LongTerm => "long_term",
        }
    }
}

impl std::fmt::Display for Horizon {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Horizon {
    type Err = DomainError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "short_term" => Ok(Self::ShortTerm),
            "medium_term" => Ok(Self::MediumTerm),
            "long_term" => Ok(Self::LongTerm),
            other => Err(DomainError::OutOfVocabulary {
                field: "horizon",
                value: other.to_string(),
            }),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskTolerance {
    NoRisk,
    MediumRisk,
    HighRisk,
}

impl RiskTolerance {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NoRisk => "no_risk",
            Self::MediumRisk => "medium_risk",
            Self::HighRisk => "high_risk",
        }
    }
}

impl std::fmt::Display for RiskTolerance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for RiskTolerance {
    type Err = DomainError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "no_risk" => Ok(Self::NoRisk),
            "medium_risk" => Ok(Self::MediumRisk),
            "high_risk" => Ok(Self::HighRisk),
            other => {
                Err(DomainError::OutOfVocabulary { field: "risk", value: other.to_string() })
            }
        }
    }
}

/// Binary yes/no preference, used for both cost acceptance and
/// sustainability.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Preference {
    Yes,
    No,
}

impl Preference {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Yes => "yes",
            Self::No => "no",
        }
    }
}

impl std::fmt::Display for Preference {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Preference {
    type Err = DomainError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "yes" => Ok(Self::Yes),
            "no" => Ok(Self::No),
            other => Err(DomainError::OutOfVocabulary {
                field: "preference",
                value: other.to_string(),
            }),
        }
    }
}

/// The structured result of profile extraction.
///
/// `amount` defaults to zero when the customer named no figure, which makes
/// only zero-minimum products eligible. `cost_acceptance` is optional: when
/// the customer expressed no stance, cost does not constrain matching.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct InvestmentProfile {
    #[serde(default)]
    pub amount: u64,
    pub horizon: Horizon,
    pub risk: RiskTolerance,
    #[serde(default)]
    pub cost_acceptance: Option<Preference>,
    pub sustainability: Preference,
}
