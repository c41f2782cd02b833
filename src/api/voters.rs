use axum::{Extension, Json, extract::State, http::HeaderMap};
use serde::Deserialize;
use std::sync::Arc;

use super::auth::request_meta;
use super::{ApiError, ApiResponse, AppState, VoterDto};
use crate::db::NewVoter;
use crate::policy::AdminIdentity;

#[derive(Deserialize)]
pub struct RegisterVoterRequest {
    pub full_name: String,
    pub age: i32,
    pub sex: String,
    pub region: String,
    pub zone: String,
    pub woreda: String,
    pub kebele: String,
    pub fin: String,
    #[serde(default)]
    pub phone: Option<String>,
}

/// POST /api/voters (admin session)
pub async fn register_voter(
    State(state): State<Arc<AppState>>,
    Extension(identity): Extension<AdminIdentity>,
    headers: HeaderMap,
    Json(payload): Json<RegisterVoterRequest>,
) -> Result<Json<ApiResponse<VoterDto>>, ApiError> {
    let meta = request_meta(&headers);

    let input = NewVoter {
        full_name: payload.full_name,
        age: payload.age,
        sex: payload.sex,
        region: payload.region,
        zone: payload.zone,
        woreda: payload.woreda,
        kebele: payload.kebele,
        fin: payload.fin,
        phone: payload.phone.filter(|p| !p.trim().is_empty()),
        created_by: identity.id,
    };

    let voter = state
        .shared
        .registration
        .register_voter(&identity, input, &meta)
        .await?;

    Ok(Json(ApiResponse::success(VoterDto::from(voter))))
}
