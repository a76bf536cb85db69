//! HTTP/JSON RPC server for the election ledger.
//!
//! Provides endpoints for:
//! - Election summary, stage and tally
//! - Candidate and voter lookups
//! - Winner resolution
//! - The authority operations (register voter, add candidate, change stage)
//! - Casting a vote
//!
//! The caller identity is taken from the `X-Caller` request header.

pub mod error;
pub mod handlers;
pub mod server;

pub use error::RpcError;
pub use server::{router, RpcServer};
