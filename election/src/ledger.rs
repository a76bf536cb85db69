//! Election ledger: the serialization point for one election.
//!
//! All operations go through a single lock, so concurrent callers are
//! totally ordered and the first to commit wins. A mutating operation runs
//! against a working copy of the election; the touched records are written
//! to the store as one batch and the copy only replaces the live state once
//! that commit succeeds. A rejected operation or a failed commit therefore
//! leaves both memory and store untouched.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use ballot_store::{ElectionStore, StoreError, WriteBatch};
use ballot_types::{Address, Candidate, CandidateId, Stage, Voter};
use tracing::{debug, info, warn};

use crate::engine::{Election, ElectionSummary};
use crate::error::ElectionError;
use crate::policy::ElectionPolicy;
use crate::record::{decode, encode, ElectionMeta};

pub struct ElectionLedger {
    election: Mutex<Election>,
    store: Arc<dyn ElectionStore>,
}

impl ElectionLedger {
    /// Create a new election in an empty store.
    pub fn create(
        store: Arc<dyn ElectionStore>,
        authority: Address,
        policy: ElectionPolicy,
    ) -> Result<Self, ElectionError> {
        if store.get_meta()?.is_some() {
            return Err(ElectionError::AlreadyInitialized);
        }
        let election = Election::new(authority, policy);
        let mut batch = WriteBatch::new();
        batch.put_meta(&encode(&meta_of(&election))?);
        store.commit(batch)?;
        info!(
            authority = %election.authority(),
            policy = ?policy.registration_gate,
            "election created"
        );
        Ok(Self {
            election: Mutex::new(election),
            store,
        })
    }

    /// Load the election held by `store`.
    pub fn open(store: Arc<dyn ElectionStore>) -> Result<Self, ElectionError> {
        let meta_bytes = store.get_meta()?.ok_or(ElectionError::NotInitialized)?;
        let meta: ElectionMeta = decode("meta", &meta_bytes)?;

        let mut candidates = Vec::new();
        for (index, bytes) in store.get_candidates()?.iter().enumerate() {
            let candidate: Candidate = decode("candidate", bytes)?;
            if candidate.id.as_usize() != index {
                return Err(StoreError::Corruption(format!(
                    "candidate at position {index} has id {}",
                    candidate.id
                ))
                .into());
            }
            candidates.push(candidate);
        }

        let mut voters = HashMap::new();
        for (address, bytes) in store.iter_voters()? {
            let voter: Voter = decode("voter", &bytes)?;
            voters.insert(address, voter);
        }

        let election =
            Election::from_parts(meta.authority, meta.stage, meta.policy, candidates, voters);
        info!(
            authority = %election.authority(),
            stage = %election.stage(),
            candidates = election.candidates_count(),
            voters = election.registered_voter_count(),
            "election loaded from store"
        );
        Ok(Self {
            election: Mutex::new(election),
            store,
        })
    }

    /// Open the stored election, or create one if the store is empty.
    ///
    /// An existing election keeps its own authority and policy.
    pub fn open_or_create(
        store: Arc<dyn ElectionStore>,
        authority: Address,
        policy: ElectionPolicy,
    ) -> Result<Self, ElectionError> {
        if store.get_meta()?.is_none() {
            return Self::create(store, authority, policy);
        }
        let ledger = Self::open(store)?;
        let existing = ledger.authority();
        if existing != authority {
            warn!(
                configured = %authority,
                stored = %existing,
                "stored election has a different authority; keeping the stored one"
            );
        }
        Ok(ledger)
    }

    // ── Mutations ───────────────────────────────────────────────────────

    pub fn register_voter(&self, caller: &Address, target: &Address) -> Result<(), ElectionError> {
        self.apply("register_voter", |election, batch| {
            election.register_voter(caller, target)?;
            batch.put_voter(target, &encode(&election.voter(target))?);
            Ok(())
        })?;
        debug!(voter = %target, "voter registered");
        Ok(())
    }

    pub fn add_candidate(&self, caller: &Address, name: &str) -> Result<CandidateId, ElectionError> {
        let id = self.apply("add_candidate", |election, batch| {
            let id = election.add_candidate(caller, name)?;
            batch.put_candidate(id, &encode(election.candidate(id)?)?);
            Ok(id)
        })?;
        debug!(candidate = %id, name = name.trim(), "candidate added");
        Ok(id)
    }

    pub fn change_stage(&self, caller: &Address, new_stage: Stage) -> Result<(), ElectionError> {
        self.apply("change_stage", |election, batch| {
            election.change_stage(caller, new_stage)?;
            batch.put_meta(&encode(&meta_of(election))?);
            Ok(())
        })?;
        info!(stage = %new_stage, "election stage changed");
        Ok(())
    }

    pub fn vote(&self, caller: &Address, candidate_id: CandidateId) -> Result<(), ElectionError> {
        self.apply("vote", |election, batch| {
            election.vote(caller, candidate_id)?;
            batch.put_candidate(candidate_id, &encode(election.candidate(candidate_id)?)?);
            batch.put_voter(caller, &encode(&election.voter(caller))?);
            Ok(())
        })?;
        debug!(voter = %caller, candidate = %candidate_id, "vote recorded");
        Ok(())
    }

    // ── Queries ─────────────────────────────────────────────────────────

    pub fn authority(&self) -> Address {
        self.lock().authority().clone()
    }

    pub fn stage(&self) -> Stage {
        self.lock().stage()
    }

    pub fn voter(&self, address: &Address) -> Voter {
        self.lock().voter(address)
    }

    pub fn candidates_count(&self) -> usize {
        self.lock().candidates_count()
    }

    pub fn candidate(&self, id: CandidateId) -> Result<Candidate, ElectionError> {
        self.lock().candidate(id).cloned()
    }

    pub fn tally(&self) -> Vec<Candidate> {
        self.lock().tally().to_vec()
    }

    pub fn winner(&self) -> Result<Candidate, ElectionError> {
        self.lock().winner().cloned()
    }

    pub fn summary(&self) -> ElectionSummary {
        self.lock().summary()
    }

    // ── Internals ───────────────────────────────────────────────────────

    /// Run `op` on a working copy and commit the batch it builds.
    fn apply<T>(
        &self,
        name: &'static str,
        op: impl FnOnce(&mut Election, &mut WriteBatch) -> Result<T, ElectionError>,
    ) -> Result<T, ElectionError> {
        let mut live = self.lock();
        let mut working = live.clone();
        let mut batch = WriteBatch::new();

        let out = op(&mut working, &mut batch).inspect_err(|e| {
            debug!(op = name, error = %e, "operation rejected");
        })?;

        self.store.commit(batch).inspect_err(|e| {
            warn!(op = name, error = %e, "store commit failed; operation rolled back");
        })?;

        *live = working;
        Ok(out)
    }

    // Every mutation swaps in a fully-built copy, so a poisoned lock still
    // guards a consistent election.
    fn lock(&self) -> MutexGuard<'_, Election> {
        self.election.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

fn meta_of(election: &Election) -> ElectionMeta {
    ElectionMeta {
        authority: election.authority().clone(),
        stage: election.stage(),
        policy: election.policy(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ballot_nullables::NullElectionStore;

    fn addr(name: &str) -> Address {
        Address::new(name).unwrap()
    }

    fn admin() -> Address {
        addr("admin")
    }

    fn fresh() -> (Arc<NullElectionStore>, ElectionLedger) {
        let store = Arc::new(NullElectionStore::new());
        let ledger =
            ElectionLedger::create(store.clone(), admin(), ElectionPolicy::default()).unwrap();
        (store, ledger)
    }

    #[test]
    fn create_writes_meta() {
        let (store, ledger) = fresh();
        assert!(store.get_meta().unwrap().is_some());
        assert_eq!(ledger.authority(), admin());
        assert_eq!(ledger.stage(), Stage::Registration);
    }

    #[test]
    fn create_twice_fails() {
        let (store, _ledger) = fresh();
        let err = ElectionLedger::create(store, addr("other"), ElectionPolicy::default())
            .err()
            .unwrap();
        assert_eq!(err, ElectionError::AlreadyInitialized);
    }

    #[test]
    fn open_empty_store_fails() {
        let store = Arc::new(NullElectionStore::new());
        let err = ElectionLedger::open(store).err().unwrap();
        assert_eq!(err, ElectionError::NotInitialized);
    }

    #[test]
    fn reopen_restores_full_state() {
        let (store, ledger) = fresh();
        ledger.add_candidate(&admin(), "A").unwrap();
        ledger.add_candidate(&admin(), "B").unwrap();
        ledger.register_voter(&admin(), &addr("v1")).unwrap();
        ledger.register_voter(&admin(), &addr("v2")).unwrap();
        ledger.change_stage(&admin(), Stage::Voting).unwrap();
        ledger.vote(&addr("v1"), CandidateId::new(1)).unwrap();

        let reopened = ElectionLedger::open(store).unwrap();
        assert_eq!(reopened.summary(), ledger.summary());
        assert_eq!(reopened.voter(&addr("v1")), ledger.voter(&addr("v1")));
        assert!(reopened.voter(&addr("v2")).can_vote());
        assert_eq!(
            reopened.vote(&addr("v1"), CandidateId::new(0)).unwrap_err(),
            ElectionError::AlreadyVoted(addr("v1"))
        );
    }

    #[test]
    fn open_or_create_keeps_stored_authority() {
        let (store, ledger) = fresh();
        ledger.add_candidate(&admin(), "A").unwrap();
        let reopened =
            ElectionLedger::open_or_create(store, addr("intruder"), ElectionPolicy::open())
                .unwrap();
        assert_eq!(reopened.authority(), admin());
        assert_eq!(reopened.candidates_count(), 1);
    }

    #[test]
    fn rejected_operation_writes_nothing() {
        let (store, ledger) = fresh();
        let commits = store.commit_count();
        assert!(ledger.add_candidate(&addr("v1"), "A").is_err());
        assert!(ledger.change_stage(&admin(), Stage::Ended).is_err());
        assert_eq!(store.commit_count(), commits);
    }

    #[test]
    fn failed_commit_rolls_back_vote() {
        let (store, ledger) = fresh();
        ledger.add_candidate(&admin(), "A").unwrap();
        ledger.register_voter(&admin(), &addr("v1")).unwrap();
        ledger.change_stage(&admin(), Stage::Voting).unwrap();

        store.fail_next_commit();
        let err = ledger.vote(&addr("v1"), CandidateId::new(0)).unwrap_err();
        assert!(matches!(err, ElectionError::Store(StoreError::Backend(_))));
        assert_eq!(ledger.candidate(CandidateId::new(0)).unwrap().vote_count, 0);
        assert!(!ledger.voter(&addr("v1")).has_voted);

        // The voter can still vote once the store recovers.
        ledger.vote(&addr("v1"), CandidateId::new(0)).unwrap();
        let reopened = ElectionLedger::open(store).unwrap();
        assert_eq!(reopened.candidate(CandidateId::new(0)).unwrap().vote_count, 1);
    }

    #[test]
    fn failed_commit_rolls_back_stage_change() {
        let (store, ledger) = fresh();
        store.fail_next_commit();
        assert!(ledger.change_stage(&admin(), Stage::Voting).is_err());
        assert_eq!(ledger.stage(), Stage::Registration);
        assert_eq!(
            ElectionLedger::open(store).unwrap().stage(),
            Stage::Registration
        );
    }

    #[test]
    fn concurrent_votes_are_all_counted() {
        let (_store, ledger) = fresh();
        ledger.add_candidate(&admin(), "A").unwrap();
        ledger.add_candidate(&admin(), "B").unwrap();
        let voters: Vec<Address> = (0..32).map(|i| addr(&format!("v{i}"))).collect();
        for v in &voters {
            ledger.register_voter(&admin(), v).unwrap();
        }
        ledger.change_stage(&admin(), Stage::Voting).unwrap();

        let ledger = Arc::new(ledger);
        let handles: Vec<_> = voters
            .into_iter()
            .enumerate()
            .map(|(i, v)| {
                let ledger = ledger.clone();
                std::thread::spawn(move || {
                    let choice = CandidateId::new((i % 2) as u32);
                    // Each voter tries twice; exactly one attempt may succeed.
                    let first = ledger.vote(&v, choice).is_ok();
                    let second = ledger.vote(&v, choice).is_ok();
                    assert!(!second);
                    first
                })
            })
            .collect();
        let successes = handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .filter(|ok| *ok)
            .count();

        assert_eq!(successes, 32);
        assert_eq!(ledger.summary().votes_cast, 32);
    }
}
