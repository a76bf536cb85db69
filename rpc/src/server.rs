//! Axum-based RPC server.

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;
use ballot_election::ElectionLedger;
use tracing::info;

use crate::error::RpcError;
use crate::handlers;

/// Build the router serving every election endpoint.
pub fn router(ledger: Arc<ElectionLedger>) -> Router {
    Router::new()
        .route("/election", get(handlers::election))
        .route("/stage", get(handlers::stage).post(handlers::change_stage))
        .route(
            "/candidates",
            get(handlers::candidates).post(handlers::add_candidate),
        )
        .route("/candidates/:id", get(handlers::candidate))
        .route("/voters", post(handlers::register_voter))
        .route("/voters/:address", get(handlers::voter))
        .route("/votes", post(handlers::vote))
        .route("/winner", get(handlers::winner))
        .with_state(ledger)
}

pub struct RpcServer {
    pub addr: SocketAddr,
    ledger: Arc<ElectionLedger>,
}

impl RpcServer {
    pub fn new(addr: SocketAddr, ledger: Arc<ElectionLedger>) -> Self {
        Self { addr, ledger }
    }

    /// Serve until `shutdown` resolves.
    pub async fn start<F>(&self, shutdown: F) -> Result<(), RpcError>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let app = router(self.ledger.clone());
        let listener = tokio::net::TcpListener::bind(self.addr)
            .await
            .map_err(|e| RpcError::Server(format!("bind {}: {e}", self.addr)))?;
        info!("RPC server listening on {}", self.addr);
        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown)
            .await
            .map_err(|e| RpcError::Server(e.to_string()))?;
        info!("RPC server stopped");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handlers::{
        AddCandidateResponse, CandidatesResponse, ElectionResponse, StageResponse, VoterResponse,
    };
    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use ballot_election::ElectionPolicy;
    use ballot_nullables::NullElectionStore;
    use ballot_types::{Address, Candidate, CandidateId, Stage};
    use serde::de::DeserializeOwned;
    use serde_json::{json, Value};
    use tower::ServiceExt;

    const ADMIN: &str = "admin";

    fn app() -> Router {
        let store = Arc::new(NullElectionStore::new());
        let ledger = ElectionLedger::create(
            store,
            Address::new(ADMIN).unwrap(),
            ElectionPolicy::default(),
        )
        .unwrap();
        router(Arc::new(ledger))
    }

    async fn send(app: &Router, req: Request<Body>) -> (StatusCode, Vec<u8>) {
        let resp = app.clone().oneshot(req).await.unwrap();
        let status = resp.status();
        let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        (status, bytes.to_vec())
    }

    async fn get_json<T: DeserializeOwned>(app: &Router, uri: &str) -> (StatusCode, T) {
        let req = Request::get(uri).body(Body::empty()).unwrap();
        let (status, body) = send(app, req).await;
        (status, serde_json::from_slice(&body).unwrap())
    }

    async fn post(app: &Router, uri: &str, caller: Option<&str>, body: Value) -> (StatusCode, Value) {
        let mut builder = Request::post(uri).header("content-type", "application/json");
        if let Some(caller) = caller {
            builder = builder.header("x-caller", caller);
        }
        let req = builder.body(Body::from(body.to_string())).unwrap();
        let (status, body) = send(app, req).await;
        (status, serde_json::from_slice(&body).unwrap())
    }

    #[tokio::test]
    async fn full_election_over_http() {
        let app = app();

        let (status, body) = post(&app, "/candidates", Some(ADMIN), json!({"name": "A"})).await;
        assert_eq!(status, StatusCode::CREATED);
        let added: AddCandidateResponse = serde_json::from_value(body).unwrap();
        assert_eq!(added.id, CandidateId::new(0));
        post(&app, "/candidates", Some(ADMIN), json!({"name": "B"})).await;

        for v in ["v1", "v2", "v3"] {
            let (status, _) = post(&app, "/voters", Some(ADMIN), json!({"voter": v})).await;
            assert_eq!(status, StatusCode::CREATED);
        }

        let (status, body) = post(&app, "/stage", Some(ADMIN), json!({"stage": 1})).await;
        assert_eq!(status, StatusCode::OK);
        let stage: StageResponse = serde_json::from_value(body).unwrap();
        assert_eq!(stage.stage, Stage::Voting);

        for (v, c) in [("v1", 0), ("v2", 1), ("v3", 0)] {
            let (status, body) = post(&app, "/votes", Some(v), json!({"candidate_id": c})).await;
            assert_eq!(status, StatusCode::OK);
            let voter: VoterResponse = serde_json::from_value(body).unwrap();
            assert!(voter.has_voted);
            assert_eq!(voter.voted_candidate_id, Some(CandidateId::new(c)));
        }

        let (_, tally): (_, CandidatesResponse) = get_json(&app, "/candidates").await;
        let counts: Vec<u64> = tally.candidates.iter().map(|c| c.vote_count).collect();
        assert_eq!(counts, vec![2, 1]);

        let (status, body) = post(&app, "/stage", Some(ADMIN), json!({"stage": "Ended"})).await;
        assert_eq!(status, StatusCode::OK, "{body}");

        let (status, winner): (_, Candidate) = get_json(&app, "/winner").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(winner.name, "A");

        let (_, summary): (_, ElectionResponse) = get_json(&app, "/election").await;
        assert_eq!(summary.authority, ADMIN);
        assert_eq!(summary.stage_name, "ended");
        assert_eq!(summary.registered_voters, 3);
        assert_eq!(summary.votes_cast, 3);
    }

    #[tokio::test]
    async fn non_authority_is_forbidden() {
        let app = app();
        let (status, body) = post(&app, "/voters", Some("v1"), json!({"voter": "v2"})).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body["error"], "Unauthorized");

        let (_, voter): (_, VoterResponse) = get_json(&app, "/voters/v2").await;
        assert!(!voter.is_registered);
    }

    #[tokio::test]
    async fn missing_caller_is_bad_request() {
        let app = app();
        let (status, body) = post(&app, "/candidates", None, json!({"name": "A"})).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "MissingCaller");
    }

    #[tokio::test]
    async fn malformed_body_is_bad_request() {
        let app = app();
        let (status, body) = post(&app, "/stage", Some(ADMIN), json!({"stage": 9})).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "InvalidRequest");

        let (status, _) = post(&app, "/voters", Some(ADMIN), json!({"voter": ""})).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn stage_accepts_name_or_index() {
        let app = app();
        let (status, body) = post(&app, "/stage", Some(ADMIN), json!({"stage": "voting"})).await;
        assert_eq!(status, StatusCode::OK, "{body}");
        let stage: StageResponse = serde_json::from_value(body).unwrap();
        assert_eq!(stage.stage, Stage::Voting);
        assert_eq!(stage.name, "voting");

        let (status, body) = post(&app, "/stage", Some(ADMIN), json!({"stage": "closed"})).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "InvalidRequest");

        let (status, body) = post(&app, "/stage", Some(ADMIN), json!({"stage": true})).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "InvalidRequest");

        let (_, stage): (_, StageResponse) = get_json(&app, "/stage").await;
        assert_eq!(stage.stage, Stage::Voting);
    }

    #[tokio::test]
    async fn vote_before_voting_conflicts() {
        let app = app();
        post(&app, "/candidates", Some(ADMIN), json!({"name": "A"})).await;
        post(&app, "/voters", Some(ADMIN), json!({"voter": "v1"})).await;
        let (status, body) = post(&app, "/votes", Some("v1"), json!({"candidate_id": 0})).await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["error"], "WrongStage");
    }

    #[tokio::test]
    async fn unknown_candidate_is_not_found() {
        let app = app();
        let (status, body): (_, Value) = get_json(&app, "/candidates/4").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "InvalidCandidate");
    }

    #[tokio::test]
    async fn winner_before_end_conflicts() {
        let app = app();
        let (status, body): (_, Value) = get_json(&app, "/winner").await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["error"], "VotingNotEnded");
    }

    #[tokio::test]
    async fn skipping_stage_conflicts() {
        let app = app();
        let (status, body) = post(&app, "/stage", Some(ADMIN), json!({"stage": 2})).await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["error"], "InvalidTransition");

        let (_, stage): (_, StageResponse) = get_json(&app, "/stage").await;
        assert_eq!(stage.stage, Stage::Registration);
    }
}
