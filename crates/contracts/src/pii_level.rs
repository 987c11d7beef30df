//! PiiLevel - sensitivity taxonomy
//!
//! The ordering is an explicit rank table. Reordering the variants below
//! must never change how levels compare.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use crate::ContractError;

/// Sensitivity classification of a piece of tracked data.
///
/// Ranked from "not personal" to "directly identifying":
/// `None < NotSensitive < PersonalData < Network < Diagnostic < VerySensitive`.
///
/// The rank is only used to derive the aggregate level of an event. Filtering
/// never infers that a backend handling a higher level also handles a lower
/// one; see [`crate::LevelPolicy`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PiiLevel {
    /// Data that is not classified as PII
    #[default]
    None,
    /// Not sensitive on its own, such as an age range
    NotSensitive,
    /// Not PII but can be tied to a user, such as GPS coordinates or habits
    PersonalData,
    /// Network request metadata without bodies, such as a request url
    Network,
    /// Diagnostic data without PII or personal data
    Diagnostic,
    /// Directly identifying, such as an SSN or email address
    VerySensitive,
}

impl PiiLevel {
    /// Every level, in rank order.
    pub const ALL: [PiiLevel; 6] = [
        PiiLevel::None,
        PiiLevel::NotSensitive,
        PiiLevel::PersonalData,
        PiiLevel::Network,
        PiiLevel::Diagnostic,
        PiiLevel::VerySensitive,
    ];

    /// Position of this level in the total order.
    #[inline]
    pub const fn rank(self) -> u8 {
        match self {
            PiiLevel::None => 0,
            PiiLevel::NotSensitive => 1,
            PiiLevel::PersonalData => 2,
            PiiLevel::Network => 3,
            PiiLevel::Diagnostic => 4,
            PiiLevel::VerySensitive => 5,
        }
    }

    /// Configuration / wire name.
    pub const fn as_str(self) -> &'static str {
        match self {
            PiiLevel::None => "none",
            PiiLevel::NotSensitive => "not_sensitive",
            PiiLevel::PersonalData => "personal_data",
            PiiLevel::Network => "network",
            PiiLevel::Diagnostic => "diagnostic",
            PiiLevel::VerySensitive => "very_sensitive",
        }
    }
}

impl PartialOrd for PiiLevel {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for PiiLevel {
    fn cmp(&self, other: &Self) -> Ordering {
        self.rank().cmp(&other.rank())
    }
}

impl fmt::Display for PiiLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PiiLevel {
    type Err = ContractError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace('-', "_");
        PiiLevel::ALL
            .into_iter()
            .find(|level| level.as_str() == normalized)
            .ok_or_else(|| {
                ContractError::invalid_argument("level", format!("unknown PII level '{s}'"))
            })
    }
}
