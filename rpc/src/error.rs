//! RPC error types.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use ballot_election::ElectionError;
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RpcError {
    #[error(transparent)]
    Election(#[from] ElectionError),

    #[error("missing X-Caller header")]
    MissingCaller,

    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("server error: {0}")]
    Server(String),
}

/// JSON body returned with every error response.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: &'static str,
    pub message: String,
}

impl RpcError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Election(e) => match e {
                ElectionError::Unauthorized(_) | ElectionError::NotRegistered(_) => {
                    StatusCode::FORBIDDEN
                }
                ElectionError::InvalidCandidate(_) => StatusCode::NOT_FOUND,
                ElectionError::EmptyCandidateName => StatusCode::BAD_REQUEST,
                ElectionError::AlreadyRegistered(_)
                | ElectionError::AlreadyVoted(_)
                | ElectionError::WrongStage { .. }
                | ElectionError::InvalidTransition { .. }
                | ElectionError::VotingNotEnded
                | ElectionError::NoCandidates
                | ElectionError::TooManyCandidates
                | ElectionError::AlreadyInitialized => StatusCode::CONFLICT,
                ElectionError::NotInitialized | ElectionError::Store(_) => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            },
            Self::MissingCaller | Self::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            Self::Server(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::Election(e) => e.kind(),
            Self::MissingCaller => "MissingCaller",
            Self::InvalidRequest(_) => "InvalidRequest",
            Self::Server(_) => "Server",
        }
    }
}

impl IntoResponse for RpcError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, "rpc request failed");
        }
        let body = ErrorBody {
            error: self.kind(),
            message: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ballot_store::StoreError;
    use ballot_types::{Address, CandidateId, Stage};

    #[test]
    fn election_errors_map_to_statuses() {
        let who = Address::new("v1").unwrap();
        let cases = [
            (ElectionError::Unauthorized(who.clone()), StatusCode::FORBIDDEN),
            (ElectionError::NotRegistered(who.clone()), StatusCode::FORBIDDEN),
            (
                ElectionError::InvalidCandidate(CandidateId::new(3)),
                StatusCode::NOT_FOUND,
            ),
            (ElectionError::AlreadyVoted(who), StatusCode::CONFLICT),
            (
                ElectionError::WrongStage {
                    expected: Stage::Voting,
                    actual: Stage::Ended,
                },
                StatusCode::CONFLICT,
            ),
            (ElectionError::VotingNotEnded, StatusCode::CONFLICT),
            (ElectionError::TooManyCandidates, StatusCode::CONFLICT),
            (
                ElectionError::Store(StoreError::Backend("down".into())),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];
        for (err, status) in cases {
            assert_eq!(RpcError::from(err).status(), status);
        }
    }

    #[test]
    fn kind_passes_through_election_kind() {
        let err = RpcError::from(ElectionError::NoCandidates);
        assert_eq!(err.kind(), "NoCandidates");
        assert_eq!(RpcError::MissingCaller.kind(), "MissingCaller");
    }
}
