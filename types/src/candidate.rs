//! Candidates and their identifiers.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Sequential candidate index, assigned from 0 in insertion order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CandidateId(u32);

impl CandidateId {
    pub const fn new(index: u32) -> Self {
        Self(index)
    }

    pub fn index(self) -> u32 {
        self.0
    }

    /// Position in the candidate sequence.
    pub fn as_usize(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for CandidateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for CandidateId {
    fn from(index: u32) -> Self {
        Self(index)
    }
}

/// A candidate on the ballot.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Candidate {
    pub id: CandidateId,
    pub name: String,
    pub vote_count: u64,
}

impl Candidate {
    /// A fresh candidate with no votes.
    pub fn new(id: CandidateId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            vote_count: 0,
        }
    }
}
