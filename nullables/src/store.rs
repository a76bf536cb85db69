//! Nullable store: thread-safe in-memory election storage.

use ballot_store::{ElectionStore, StoreError, WriteBatch, WriteOp};
use ballot_types::{Address, CandidateId};
use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

#[derive(Default)]
struct Tables {
    meta: Option<Vec<u8>>,
    candidates: BTreeMap<CandidateId, Vec<u8>>,
    voters: HashMap<Address, Vec<u8>>,
}

/// An in-memory election store.
///
/// All tables sit behind one lock so a batch is applied atomically.
/// Thread-safe for use with tokio's multi-threaded runtime.
#[derive(Default)]
pub struct NullElectionStore {
    tables: Mutex<Tables>,
    fail_next: AtomicBool,
    commits: AtomicU64,
}

impl NullElectionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the next `commit` fail with a backend error without applying
    /// anything.
    pub fn fail_next_commit(&self) {
        self.fail_next.store(true, Ordering::SeqCst);
    }

    /// Number of successful commits so far.
    pub fn commit_count(&self) -> u64 {
        self.commits.load(Ordering::SeqCst)
    }

    pub fn voter_count(&self) -> usize {
        self.tables().voters.len()
    }

    fn tables(&self) -> MutexGuard<'_, Tables> {
        self.tables.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl ElectionStore for NullElectionStore {
    fn get_meta(&self) -> Result<Option<Vec<u8>>, StoreError> {
        Ok(self.tables().meta.clone())
    }

    fn get_candidates(&self) -> Result<Vec<Vec<u8>>, StoreError> {
        Ok(self.tables().candidates.values().cloned().collect())
    }

    fn iter_voters(&self) -> Result<Vec<(Address, Vec<u8>)>, StoreError> {
        Ok(self
            .tables()
            .voters
            .iter()
            .map(|(a, v)| (a.clone(), v.clone()))
            .collect())
    }

    fn commit(&self, batch: WriteBatch) -> Result<(), StoreError> {
        let mut tables = self.tables();
        if self.fail_next.swap(false, Ordering::SeqCst) {
            return Err(StoreError::Backend("injected commit failure".into()));
        }
        for op in batch.into_ops() {
            match op {
                WriteOp::PutMeta(bytes) => tables.meta = Some(bytes),
                WriteOp::PutCandidate(id, bytes) => {
                    tables.candidates.insert(id, bytes);
                }
                WriteOp::PutVoter(address, bytes) => {
                    tables.voters.insert(address, bytes);
                }
            }
        }
        self.commits.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
