use axum::{Extension, Json, extract::State, http::HeaderMap};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use super::auth::{VoterId, request_meta};
use super::{ApiError, ApiResponse, AppState, ResultsDto};
use crate::services::CastOutcome;

#[derive(Deserialize)]
pub struct CastVoteRequest {
    pub party_id: i32,
}

#[derive(Serialize)]
pub struct CastVoteResponse {
    pub cast_at: DateTime<Utc>,
}

#[derive(Serialize)]
pub struct VoteStatusResponse {
    pub has_voted: bool,
}

/// POST /api/vote (voter session)
pub async fn cast_vote(
    State(state): State<Arc<AppState>>,
    Extension(voter): Extension<VoterId>,
    headers: HeaderMap,
    Json(payload): Json<CastVoteRequest>,
) -> Result<Json<ApiResponse<CastVoteResponse>>, ApiError> {
    let meta = request_meta(&headers);

    match state
        .shared
        .votes
        .cast(voter.0, payload.party_id, &meta)
        .await?
    {
        CastOutcome::Accepted { cast_at } => {
            Ok(Json(ApiResponse::success(CastVoteResponse { cast_at })))
        }
        CastOutcome::AlreadyVoted => Err(ApiError::Conflict(
            "This voter has already cast a ballot".to_string(),
        )),
        CastOutcome::WindowClosed => Err(ApiError::Conflict(
            "The election is not currently open".to_string(),
        )),
    }
}

/// GET /api/vote/status (voter session)
pub async fn vote_status(
    State(state): State<Arc<AppState>>,
    Extension(voter): Extension<VoterId>,
) -> Result<Json<ApiResponse<VoteStatusResponse>>, ApiError> {
    let has_voted = state.shared.votes.has_voted(voter.0).await?;
    Ok(Json(ApiResponse::success(VoteStatusResponse { has_voted })))
}

/// GET /api/results (admin session)
pub async fn get_results(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<ResultsDto>>, ApiError> {
    let summary = state.shared.votes.results().await?;
    let status = state.shared.elections.status(Utc::now()).await?;
    let active_parties = state
        .shared
        .store
        .count_active_parties()
        .await
        .map_err(ApiError::from)?;

    Ok(Json(ApiResponse::success(ResultsDto {
        total_votes: summary.total_votes,
        registered_voters: summary.registered_voters,
        active_parties,
        election_start_date: status.election_start_date,
        election_end_date: status.election_end_date,
        tally: summary.tally,
    })))
}
