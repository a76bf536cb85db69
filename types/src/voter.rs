//! Per-participant voting record.

use serde::{Deserialize, Serialize};

use crate::CandidateId;

/// Registration and voting status of one participant.
///
/// The default value is what an unknown participant looks like: not
/// registered, not voted.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Voter {
    pub is_registered: bool,
    pub has_voted: bool,
    pub voted_candidate_id: Option<CandidateId>,
}

impl Voter {
    /// Whether this participant may cast a ballot right now.
    pub fn can_vote(&self) -> bool {
        self.is_registered && !self.has_voted
    }
}
