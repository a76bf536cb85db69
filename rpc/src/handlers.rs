//! RPC request handlers.

use std::sync::Arc;

use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::Json;
use ballot_election::ElectionLedger;
use ballot_types::{Address, Candidate, CandidateId, Stage};
use serde::{Deserialize, Serialize};

use crate::error::RpcError;

/// Header carrying the identity of the caller.
pub const CALLER_HEADER: &str = "x-caller";

pub type AppState = Arc<ElectionLedger>;

type RpcResult<T> = Result<Json<T>, RpcError>;

// ── Election ─────────────────────────────────────────────────────────────

#[derive(Debug, Serialize, Deserialize)]
pub struct ElectionResponse {
    pub authority: String,
    pub stage: Stage,
    pub stage_name: String,
    pub candidates_count: usize,
    pub registered_voters: usize,
    pub votes_cast: u64,
}

pub async fn election(State(ledger): State<AppState>) -> Json<ElectionResponse> {
    let summary = ledger.summary();
    Json(ElectionResponse {
        authority: summary.authority.to_string(),
        stage: summary.stage,
        stage_name: summary.stage.to_string(),
        candidates_count: summary.candidates.len(),
        registered_voters: summary.registered_voters,
        votes_cast: summary.votes_cast,
    })
}

// ── Stage ────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize, Deserialize)]
pub struct StageResponse {
    pub stage: Stage,
    pub name: String,
}

impl From<Stage> for StageResponse {
    fn from(stage: Stage) -> Self {
        Self {
            stage,
            name: stage.to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ChangeStageRequest {
    pub stage: StageArg,
}

/// A stage given either by index (`1`) or by name (`"voting"`).
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum StageArg {
    Index(u8),
    Name(String),
}

impl TryFrom<StageArg> for Stage {
    type Error = RpcError;

    fn try_from(arg: StageArg) -> Result<Self, Self::Error> {
        let parsed = match arg {
            StageArg::Index(index) => Stage::try_from(index),
            StageArg::Name(name) => name.parse(),
        };
        parsed.map_err(|e| RpcError::InvalidRequest(e.to_string()))
    }
}

pub async fn stage(State(ledger): State<AppState>) -> Json<StageResponse> {
    Json(ledger.stage().into())
}

pub async fn change_stage(
    State(ledger): State<AppState>,
    headers: HeaderMap,
    payload: Result<Json<ChangeStageRequest>, JsonRejection>,
) -> RpcResult<StageResponse> {
    let caller = caller(&headers)?;
    let Json(req) = payload.map_err(|e| RpcError::InvalidRequest(e.body_text()))?;
    let stage = Stage::try_from(req.stage)?;
    ledger.change_stage(&caller, stage)?;
    Ok(Json(stage.into()))
}

// ── Candidates ───────────────────────────────────────────────────────────

#[derive(Debug, Serialize, Deserialize)]
pub struct CandidatesResponse {
    pub candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
pub struct AddCandidateRequest {
    pub name: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AddCandidateResponse {
    pub id: CandidateId,
}

pub async fn candidates(State(ledger): State<AppState>) -> Json<CandidatesResponse> {
    Json(CandidatesResponse {
        candidates: ledger.tally(),
    })
}

pub async fn candidate(
    State(ledger): State<AppState>,
    id: Result<Path<u32>, PathRejection>,
) -> RpcResult<Candidate> {
    let Path(id) = id.map_err(|e| RpcError::InvalidRequest(e.body_text()))?;
    Ok(Json(ledger.candidate(CandidateId::new(id))?))
}

pub async fn add_candidate(
    State(ledger): State<AppState>,
    headers: HeaderMap,
    payload: Result<Json<AddCandidateRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<AddCandidateResponse>), RpcError> {
    let caller = caller(&headers)?;
    let Json(req) = payload.map_err(|e| RpcError::InvalidRequest(e.body_text()))?;
    let id = ledger.add_candidate(&caller, &req.name)?;
    Ok((StatusCode::CREATED, Json(AddCandidateResponse { id })))
}

// ── Voters ───────────────────────────────────────────────────────────────

#[derive(Debug, Serialize, Deserialize)]
pub struct VoterResponse {
    pub address: Address,
    pub is_registered: bool,
    pub has_voted: bool,
    pub voted_candidate_id: Option<CandidateId>,
}

#[derive(Debug, Deserialize)]
pub struct RegisterVoterRequest {
    pub voter: Address,
}

pub async fn voter(
    State(ledger): State<AppState>,
    address: Result<Path<String>, PathRejection>,
) -> RpcResult<VoterResponse> {
    let Path(raw) = address.map_err(|e| RpcError::InvalidRequest(e.body_text()))?;
    let address = Address::new(raw).map_err(|e| RpcError::InvalidRequest(e.to_string()))?;
    Ok(Json(voter_response(&ledger, address)))
}

pub async fn register_voter(
    State(ledger): State<AppState>,
    headers: HeaderMap,
    payload: Result<Json<RegisterVoterRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<VoterResponse>), RpcError> {
    let caller = caller(&headers)?;
    let Json(req) = payload.map_err(|e| RpcError::InvalidRequest(e.body_text()))?;
    ledger.register_voter(&caller, &req.voter)?;
    Ok((StatusCode::CREATED, Json(voter_response(&ledger, req.voter))))
}

// ── Votes ────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct VoteRequest {
    pub candidate_id: CandidateId,
}

pub async fn vote(
    State(ledger): State<AppState>,
    headers: HeaderMap,
    payload: Result<Json<VoteRequest>, JsonRejection>,
) -> RpcResult<VoterResponse> {
    let caller = caller(&headers)?;
    let Json(req) = payload.map_err(|e| RpcError::InvalidRequest(e.body_text()))?;
    ledger.vote(&caller, req.candidate_id)?;
    Ok(Json(voter_response(&ledger, caller)))
}

// ── Winner ───────────────────────────────────────────────────────────────

pub async fn winner(State(ledger): State<AppState>) -> RpcResult<Candidate> {
    Ok(Json(ledger.winner()?))
}

// ── Helpers ──────────────────────────────────────────────────────────────

fn caller(headers: &HeaderMap) -> Result<Address, RpcError> {
    let raw = headers
        .get(CALLER_HEADER)
        .ok_or(RpcError::MissingCaller)?
        .to_str()
        .map_err(|_| RpcError::InvalidRequest("X-Caller header is not valid text".into()))?;
    Address::new(raw).map_err(|e| RpcError::InvalidRequest(e.to_string()))
}

fn voter_response(ledger: &ElectionLedger, address: Address) -> VoterResponse {
    let voter = ledger.voter(&address);
    VoterResponse {
        address,
        is_registered: voter.is_registered,
        has_voted: voter.has_voted,
        voted_candidate_id: voter.voted_candidate_id,
    }
}
