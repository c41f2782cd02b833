use axum::{Extension, Json, extract::State, http::HeaderMap};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::sync::Arc;

use super::auth::request_meta;
use super::{ApiError, ApiResponse, AppState};
use crate::policy::AdminIdentity;
use crate::services::election::ElectionStatus;

#[derive(Deserialize)]
pub struct WindowRequest {
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
}

#[derive(Deserialize)]
pub struct RegistrationFlagRequest {
    pub open: bool,
}

/// GET /api/election/status (public)
pub async fn get_status(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<ElectionStatus>>, ApiError> {
    let status = state.shared.elections.status(Utc::now()).await?;
    Ok(Json(ApiResponse::success(status)))
}

/// PUT /api/election/period (admin session)
pub async fn set_election_period(
    State(state): State<Arc<AppState>>,
    Extension(identity): Extension<AdminIdentity>,
    headers: HeaderMap,
    Json(payload): Json<WindowRequest>,
) -> Result<Json<ApiResponse<ElectionStatus>>, ApiError> {
    let meta = request_meta(&headers);
    let status = state
        .shared
        .elections
        .set_election_period(&identity, payload.start_date, payload.end_date, &meta)
        .await?;
    Ok(Json(ApiResponse::success(status)))
}

/// DELETE /api/election/period (admin session)
pub async fn clear_election_period(
    State(state): State<Arc<AppState>>,
    Extension(identity): Extension<AdminIdentity>,
    headers: HeaderMap,
) -> Result<Json<ApiResponse<ElectionStatus>>, ApiError> {
    let meta = request_meta(&headers);
    let status = state
        .shared
        .elections
        .clear_election_period(&identity, &meta)
        .await?;
    Ok(Json(ApiResponse::success(status)))
}

/// PUT /api/registration/period (admin session)
pub async fn set_registration_period(
    State(state): State<Arc<AppState>>,
    Extension(identity): Extension<AdminIdentity>,
    headers: HeaderMap,
    Json(payload): Json<WindowRequest>,
) -> Result<Json<ApiResponse<ElectionStatus>>, ApiError> {
    let meta = request_meta(&headers);
    let status = state
        .shared
        .elections
        .set_registration_period(&identity, payload.start_date, payload.end_date, &meta)
        .await?;
    Ok(Json(ApiResponse::success(status)))
}

/// DELETE /api/registration/period (admin session)
pub async fn clear_registration_period(
    State(state): State<Arc<AppState>>,
    Extension(identity): Extension<AdminIdentity>,
    headers: HeaderMap,
) -> Result<Json<ApiResponse<ElectionStatus>>, ApiError> {
    let meta = request_meta(&headers);
    let status = state
        .shared
        .elections
        .clear_registration_period(&identity, &meta)
        .await?;
    Ok(Json(ApiResponse::success(status)))
}

/// PUT /api/registration/flag (admin session)
pub async fn set_registration_flag(
    State(state): State<Arc<AppState>>,
    Extension(identity): Extension<AdminIdentity>,
    headers: HeaderMap,
    Json(payload): Json<RegistrationFlagRequest>,
) -> Result<Json<ApiResponse<ElectionStatus>>, ApiError> {
    let meta = request_meta(&headers);
    let status = state
        .shared
        .elections
        .set_registration_flag(&identity, payload.open, &meta)
        .await?;
    Ok(Json(ApiResponse::success(status)))
}
