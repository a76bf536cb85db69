//! Election engine for the ballot workspace.
//!
//! Three-stage process: Registration → Voting → Ended.
//! A single authority registers voters, adds candidates and advances the
//! stage. Each registered voter casts exactly one vote. Once the election has
//! ended the candidate with the most votes wins, ties going to the lowest id.
//!
//! [`Election`] is the pure state machine. [`ElectionLedger`] serializes
//! operations on one election and persists every committed change to an
//! [`ballot_store::ElectionStore`].

pub mod engine;
pub mod error;
pub mod ledger;
pub mod policy;
pub mod record;

pub use engine::{Election, ElectionSummary};
pub use error::ElectionError;
pub use ledger::ElectionLedger;
pub use policy::{ElectionPolicy, RegistrationGate};
pub use record::ElectionMeta;
