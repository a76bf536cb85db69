//! Parse errors for the fundamental types.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TypesError {
    #[error("invalid address: {0}")]
    InvalidAddress(String),

    #[error("unknown stage: {0}")]
    UnknownStage(String),
}
