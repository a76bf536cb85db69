//! Election storage trait.

use crate::{StoreError, WriteBatch};
use ballot_types::Address;

/// Durable key-value layout for a single election.
///
/// Three tables: one meta record (authority, stage, policy), the candidate
/// sequence keyed by index, and the voter map keyed by address. Values are
/// opaque encoded bytes.
pub trait ElectionStore: Send + Sync {
    /// Get the meta record, `None` if no election has been created.
    fn get_meta(&self) -> Result<Option<Vec<u8>>, StoreError>;

    /// Get all candidate records in ascending id order.
    fn get_candidates(&self) -> Result<Vec<Vec<u8>>, StoreError>;

    /// List every stored voter record.
    fn iter_voters(&self) -> Result<Vec<(Address, Vec<u8>)>, StoreError>;

    /// Apply every operation in the batch, or none of them.
    fn commit(&self, batch: WriteBatch) -> Result<(), StoreError>;
}
