//! Persisted record encoding.
//!
//! Records are bincode-encoded. Decoding failures on data read back from a
//! store are reported as corruption, encoding failures as serialization
//! errors.

use ballot_store::StoreError;
use ballot_types::{Address, Stage};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::policy::ElectionPolicy;

/// The single meta record of an election.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElectionMeta {
    pub authority: Address,
    pub stage: Stage,
    pub policy: ElectionPolicy,
}

pub(crate) fn encode<T: Serialize>(value: &T) -> Result<Vec<u8>, StoreError> {
    bincode::serialize(value).map_err(|e| StoreError::Serialization(e.to_string()))
}

pub(crate) fn decode<T: DeserializeOwned>(what: &str, bytes: &[u8]) -> Result<T, StoreError> {
    bincode::deserialize(bytes).map_err(|e| StoreError::Corruption(format!("{what}: {e}")))
}
