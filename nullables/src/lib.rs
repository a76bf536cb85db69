//! Nullable infrastructure for deterministic testing.
//!
//! External dependencies are abstracted behind traits. This crate provides
//! test-friendly implementations that:
//! - Keep everything in memory and never touch the filesystem
//! - Can be controlled programmatically (e.g. forced commit failures)
//!
//! The daemon also uses [`NullElectionStore`] as its in-memory ledger backend.

pub mod store;

pub use store::NullElectionStore;
