//! Fundamental types for the ballot workspace.
//!
//! This crate defines the core types shared across every other crate in the workspace:
//! participant addresses, the election stage enum, candidates and voter records.

pub mod address;
pub mod candidate;
pub mod error;
pub mod stage;
pub mod voter;

pub use address::Address;
pub use candidate::{Candidate, CandidateId};
pub use error::TypesError;
pub use stage::Stage;
pub use voter::Voter;
