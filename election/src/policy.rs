//! Tunable election rules.

use serde::{Deserialize, Serialize};

/// Which stages accept voter registration and new candidates.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RegistrationGate {
    /// Only while the election is in `Registration`.
    #[default]
    Registration,
    /// In any stage, including `Voting` and `Ended`.
    Open,
}

/// Rules fixed when the election is created.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElectionPolicy {
    #[serde(default)]
    pub registration_gate: RegistrationGate,
}

impl ElectionPolicy {
    /// Registration and candidate addition allowed regardless of stage.
    pub fn open() -> Self {
        Self {
            registration_gate: RegistrationGate::Open,
        }
    }
}
