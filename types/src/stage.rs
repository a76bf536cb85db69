//! The election stage.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::TypesError;

/// The three phases of an election, totally ordered.
///
/// Encoded on the wire and in storage as its index (0, 1, 2).
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(try_from = "u8", into = "u8")]
pub enum Stage {
    /// Voters are registered and candidates are added.
    #[default]
    Registration,
    /// Registered voters cast their single vote.
    Voting,
    /// Read-only. The winner can be resolved.
    Ended,
}

impl Stage {
    pub const ALL: [Stage; 3] = [Stage::Registration, Stage::Voting, Stage::Ended];

    pub fn index(self) -> u8 {
        match self {
            Self::Registration => 0,
            Self::Voting => 1,
            Self::Ended => 2,
        }
    }

    pub fn from_index(index: u8) -> Option<Self> {
        Self::ALL.get(index as usize).copied()
    }

    /// The stage that directly follows this one, `None` for [`Stage::Ended`].
    pub fn next(self) -> Option<Self> {
        Self::from_index(self.index() + 1)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Registration => "registration",
            Self::Voting => "voting",
            Self::Ended => "ended",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<Stage> for u8 {
    fn from(stage: Stage) -> Self {
        stage.index()
    }
}

impl TryFrom<u8> for Stage {
    type Error = TypesError;

    fn try_from(index: u8) -> Result<Self, Self::Error> {
        Self::from_index(index).ok_or_else(|| TypesError::UnknownStage(index.to_string()))
    }
}

/// Accepts either the index (`"1"`) or the case-insensitive name (`"Voting"`).
impl FromStr for Stage {
    type Err = TypesError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if let Ok(index) = trimmed.parse::<u8>() {
            return Self::try_from(index);
        }
        Self::ALL
            .into_iter()
            .find(|stage| stage.as_str().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| TypesError::UnknownStage(trimmed.to_string()))
    }
}
