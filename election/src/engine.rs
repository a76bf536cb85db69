//! Core election engine: the state machine behind every election operation.
//!
//! Every mutating method checks all of its preconditions before touching any
//! state, so a rejected call leaves the election exactly as it was.

use std::collections::HashMap;

use ballot_types::{Address, Candidate, CandidateId, Stage, Voter};
use serde::{Deserialize, Serialize};

use crate::error::ElectionError;
use crate::policy::{ElectionPolicy, RegistrationGate};

/// A single election: one authority, one ballot, one stage.
#[derive(Clone, Debug)]
pub struct Election {
    authority: Address,
    stage: Stage,
    candidates: Vec<Candidate>,
    voters: HashMap<Address, Voter>,
    policy: ElectionPolicy,
}

/// Snapshot of the public state of an election.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElectionSummary {
    pub authority: Address,
    pub stage: Stage,
    pub candidates: Vec<Candidate>,
    pub registered_voters: usize,
    pub votes_cast: u64,
}

impl Election {
    /// Create an election in the `Registration` stage, owned by `authority`.
    pub fn new(authority: Address, policy: ElectionPolicy) -> Self {
        Self {
            authority,
            stage: Stage::Registration,
            candidates: Vec::new(),
            voters: HashMap::new(),
            policy,
        }
    }

    /// Rebuild an election from persisted parts.
    ///
    /// Candidates must be supplied in id order with ids `0..n`.
    pub(crate) fn from_parts(
        authority: Address,
        stage: Stage,
        policy: ElectionPolicy,
        candidates: Vec<Candidate>,
        voters: HashMap<Address, Voter>,
    ) -> Self {
        Self {
            authority,
            stage,
            candidates,
            voters,
            policy,
        }
    }

    // ── Authority operations ────────────────────────────────────────────

    /// Mark `target` as registered to vote.
    pub fn register_voter(
        &mut self,
        caller: &Address,
        target: &Address,
    ) -> Result<(), ElectionError> {
        self.ensure_authority(caller)?;
        self.ensure_registration_open()?;
        if self.voter(target).is_registered {
            return Err(ElectionError::AlreadyRegistered(target.clone()));
        }
        self.voters.entry(target.clone()).or_default().is_registered = true;
        Ok(())
    }

    /// Append a candidate to the ballot, returning its id.
    pub fn add_candidate(
        &mut self,
        caller: &Address,
        name: &str,
    ) -> Result<CandidateId, ElectionError> {
        self.ensure_authority(caller)?;
        self.ensure_registration_open()?;
        let name = name.trim();
        if name.is_empty() {
            return Err(ElectionError::EmptyCandidateName);
        }
        let id = next_candidate_id(self.candidates.len())?;
        self.candidates.push(Candidate::new(id, name));
        Ok(id)
    }

    /// Move the election to `new_stage`, which must directly follow the
    /// current stage.
    pub fn change_stage(&mut self, caller: &Address, new_stage: Stage) -> Result<(), ElectionError> {
        self.ensure_authority(caller)?;
        if self.stage.next() != Some(new_stage) {
            return Err(ElectionError::InvalidTransition {
                from: self.stage,
                to: new_stage,
            });
        }
        self.stage = new_stage;
        Ok(())
    }

    // ── Participant operations ──────────────────────────────────────────

    /// Cast `caller`'s single vote for `candidate_id`.
    pub fn vote(&mut self, caller: &Address, candidate_id: CandidateId) -> Result<(), ElectionError> {
        self.ensure_stage(Stage::Voting)?;
        let voter = self.voter(caller);
        if !voter.is_registered {
            return Err(ElectionError::NotRegistered(caller.clone()));
        }
        if voter.has_voted {
            return Err(ElectionError::AlreadyVoted(caller.clone()));
        }
        let candidate = self
            .candidates
            .get_mut(candidate_id.as_usize())
            .ok_or(ElectionError::InvalidCandidate(candidate_id))?;

        candidate.vote_count += 1;
        let record = self.voters.entry(caller.clone()).or_default();
        record.has_voted = true;
        record.voted_candidate_id = Some(candidate_id);
        Ok(())
    }

    // ── Queries ─────────────────────────────────────────────────────────

    pub fn authority(&self) -> &Address {
        &self.authority
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    pub fn policy(&self) -> ElectionPolicy {
        self.policy
    }

    /// The voter record for `address`; unknown addresses read as the default.
    pub fn voter(&self, address: &Address) -> Voter {
        self.voters.get(address).copied().unwrap_or_default()
    }

    pub fn candidates_count(&self) -> usize {
        self.candidates.len()
    }

    pub fn candidate(&self, id: CandidateId) -> Result<&Candidate, ElectionError> {
        self.candidates
            .get(id.as_usize())
            .ok_or(ElectionError::InvalidCandidate(id))
    }

    /// All candidates with their current vote counts, in id order.
    pub fn tally(&self) -> &[Candidate] {
        &self.candidates
    }

    /// Iterate over every known voter record.
    pub fn voters(&self) -> impl Iterator<Item = (&Address, &Voter)> {
        self.voters.iter()
    }

    pub fn registered_voter_count(&self) -> usize {
        self.voters.values().filter(|v| v.is_registered).count()
    }

    pub fn votes_cast(&self) -> u64 {
        self.candidates.iter().map(|c| c.vote_count).sum()
    }

    /// The plurality winner once voting has ended.
    ///
    /// Scans in id order and only replaces the leader on a strictly greater
    /// count, so ties resolve to the lowest id.
    pub fn winner(&self) -> Result<&Candidate, ElectionError> {
        if self.stage != Stage::Ended {
            return Err(ElectionError::VotingNotEnded);
        }
        let mut candidates = self.candidates.iter();
        let mut leader = candidates.next().ok_or(ElectionError::NoCandidates)?;
        for candidate in candidates {
            if candidate.vote_count > leader.vote_count {
                leader = candidate;
            }
        }
        Ok(leader)
    }

    pub fn summary(&self) -> ElectionSummary {
        ElectionSummary {
            authority: self.authority.clone(),
            stage: self.stage,
            candidates: self.candidates.clone(),
            registered_voters: self.registered_voter_count(),
            votes_cast: self.votes_cast(),
        }
    }

    // ── Guards ──────────────────────────────────────────────────────────

    fn ensure_authority(&self, caller: &Address) -> Result<(), ElectionError> {
        if caller != &self.authority {
            return Err(ElectionError::Unauthorized(caller.clone()));
        }
        Ok(())
    }

    fn ensure_stage(&self, expected: Stage) -> Result<(), ElectionError> {
        if self.stage != expected {
            return Err(ElectionError::WrongStage {
                expected,
                actual: self.stage,
            });
        }
        Ok(())
    }

    fn ensure_registration_open(&self) -> Result<(), ElectionError> {
        match self.policy.registration_gate {
            RegistrationGate::Registration => self.ensure_stage(Stage::Registration),
            RegistrationGate::Open => Ok(()),
        }
    }
}

/// Id for the candidate appended after `count` existing ones.
fn next_candidate_id(count: usize) -> Result<CandidateId, ElectionError> {
    u32::try_from(count)
        .map(CandidateId::new)
        .map_err(|_| ElectionError::TooManyCandidates)
}
