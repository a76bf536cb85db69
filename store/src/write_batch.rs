//! Write batching: groups the record updates of one election operation so
//! a backend can apply them as a single atomic write.
//!
//! ```ignore
//! let mut batch = WriteBatch::new();
//! batch.put_candidate(id, &candidate_bytes);
//! batch.put_voter(&voter, &voter_bytes);
//! store.commit(batch)?;
//! ```

use ballot_types::{Address, CandidateId};

/// A single pending write.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum WriteOp {
    PutMeta(Vec<u8>),
    PutCandidate(CandidateId, Vec<u8>),
    PutVoter(Address, Vec<u8>),
}

/// An ordered set of writes applied together by [`crate::ElectionStore::commit`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct WriteBatch {
    ops: Vec<WriteOp>,
}

impl WriteBatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn put_meta(&mut self, bytes: &[u8]) {
        self.ops.push(WriteOp::PutMeta(bytes.to_vec()));
    }

    pub fn put_candidate(&mut self, id: CandidateId, bytes: &[u8]) {
        self.ops.push(WriteOp::PutCandidate(id, bytes.to_vec()));
    }

    pub fn put_voter(&mut self, address: &Address, bytes: &[u8]) {
        self.ops.push(WriteOp::PutVoter(address.clone(), bytes.to_vec()));
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    pub fn len(&self) -> usize {
        self.ops.len()
    }

    pub fn into_ops(self) -> Vec<WriteOp> {
        self.ops
    }
}
