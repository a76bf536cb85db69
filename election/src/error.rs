use ballot_store::StoreError;
use ballot_types::{Address, CandidateId, Stage};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ElectionError {
    #[error("{0} is not the election authority")]
    Unauthorized(Address),

    #[error("voter {0} is already registered")]
    AlreadyRegistered(Address),

    #[error("voter {0} is not registered")]
    NotRegistered(Address),

    #[error("voter {0} has already voted")]
    AlreadyVoted(Address),

    #[error("action requires stage {expected}, election is in {actual}")]
    WrongStage { expected: Stage, actual: Stage },

    #[error("cannot move from stage {from} to {to}")]
    InvalidTransition { from: Stage, to: Stage },

    #[error("candidate {0} does not exist")]
    InvalidCandidate(CandidateId),

    #[error("candidate name must not be empty")]
    EmptyCandidateName,

    #[error("candidate limit of {} reached", u32::MAX)]
    TooManyCandidates,

    #[error("voting has not ended")]
    VotingNotEnded,

    #[error("no candidates to resolve a winner from")]
    NoCandidates,

    #[error("store already holds an election")]
    AlreadyInitialized,

    #[error("store holds no election")]
    NotInitialized,

    #[error("store error: {0}")]
    Store(#[from] StoreError),
}

impl ElectionError {
    /// Stable machine-readable name of the error kind.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Unauthorized(_) => "Unauthorized",
            Self::AlreadyRegistered(_) => "AlreadyRegistered",
            Self::NotRegistered(_) => "NotRegistered",
            Self::AlreadyVoted(_) => "AlreadyVoted",
            Self::WrongStage { .. } => "WrongStage",
            Self::InvalidTransition { .. } => "InvalidTransition",
            Self::InvalidCandidate(_) => "InvalidCandidate",
            Self::EmptyCandidateName => "EmptyCandidateName",
            Self::TooManyCandidates => "TooManyCandidates",
            Self::VotingNotEnded => "VotingNotEnded",
            Self::NoCandidates => "NoCandidates",
            Self::AlreadyInitialized => "AlreadyInitialized",
            Self::NotInitialized => "NotInitialized",
            Self::Store(_) => "Store",
        }
    }
}
