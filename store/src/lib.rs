//! Abstract storage traits for the election ledger.
//!
//! Every storage backend (in-memory for testing, or a durable key-value
//! store) implements these traits. The rest of the workspace depends only
//! on the traits.

pub mod election;
pub mod error;
pub mod write_batch;

pub use election::ElectionStore;
pub use error::StoreError;
pub use write_batch::{WriteBatch, WriteOp};
