use axum::{
    Extension, Json,
    extract::{Path, State},
    http::HeaderMap,
};
use serde::Deserialize;
use std::sync::Arc;

use super::auth::request_meta;
use super::{ApiError, ApiResponse, AppState, MessageResponse};
use crate::db::PartyInput;
use crate::entities::parties;
use crate::policy::AdminIdentity;

#[derive(Deserialize)]
pub struct PartyRequest {
    pub name_english: String,
    pub name_amharic: String,
    #[serde(default)]
    pub leader_name_english: Option<String>,
    #[serde(default)]
    pub leader_name_amharic: Option<String>,
    #[serde(default)]
    pub ideology: Option<String>,
    #[serde(default)]
    pub description_english: Option<String>,
    #[serde(default)]
    pub description_amharic: Option<String>,
    #[serde(default)]
    pub logo_url: Option<String>,
    #[serde(default)]
    pub leader_image_url: Option<String>,
}

impl From<PartyRequest> for PartyInput {
    fn from(req: PartyRequest) -> Self {
        Self {
            name_english: req.name_english,
            name_amharic: req.name_amharic,
            leader_name_english: req.leader_name_english,
            leader_name_amharic: req.leader_name_amharic,
            ideology: req.ideology,
            description_english: req.description_english,
            description_amharic: req.description_amharic,
            logo_url: req.logo_url,
            leader_image_url: req.leader_image_url,
        }
    }
}

#[derive(Deserialize)]
pub struct VisibilityRequest {
    pub visible: bool,
}

/// GET /api/parties (public; active parties only)
pub async fn list_parties(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<Vec<parties::Model>>>, ApiError> {
    let parties = state.shared.parties.list_public().await?;
    Ok(Json(ApiResponse::success(parties)))
}

/// GET /api/parties/all (admin session)
pub async fn list_all_parties(
    State(state): State<Arc<AppState>>,
    Extension(identity): Extension<AdminIdentity>,
) -> Result<Json<ApiResponse<Vec<parties::Model>>>, ApiError> {
    let parties = state.shared.parties.list_all(&identity).await?;
    Ok(Json(ApiResponse::success(parties)))
}

/// POST /api/parties (admin session)
pub async fn create_party(
    State(state): State<Arc<AppState>>,
    Extension(identity): Extension<AdminIdentity>,
    headers: HeaderMap,
    Json(payload): Json<PartyRequest>,
) -> Result<Json<ApiResponse<parties::Model>>, ApiError> {
    let meta = request_meta(&headers);
    let party = state
        .shared
        .parties
        .create(&identity, payload.into(), &meta)
        .await?;
    Ok(Json(ApiResponse::success(party)))
}

/// PUT /api/parties/{id} (admin session)
pub async fn update_party(
    State(state): State<Arc<AppState>>,
    Extension(identity): Extension<AdminIdentity>,
    Path(id): Path<i32>,
    headers: HeaderMap,
    Json(payload): Json<PartyRequest>,
) -> Result<Json<ApiResponse<parties::Model>>, ApiError> {
    let meta = request_meta(&headers);
    let party = state
        .shared
        .parties
        .update(&identity, id, payload.into(), &meta)
        .await?;
    Ok(Json(ApiResponse::success(party)))
}

/// PUT /api/parties/{id}/visibility (admin session)
pub async fn set_party_visibility(
    State(state): State<Arc<AppState>>,
    Extension(identity): Extension<AdminIdentity>,
    Path(id): Path<i32>,
    headers: HeaderMap,
    Json(payload): Json<VisibilityRequest>,
) -> Result<Json<ApiResponse<MessageResponse>>, ApiError> {
    let meta = request_meta(&headers);
    state
        .shared
        .parties
        .set_visibility(&identity, id, payload.visible, &meta)
        .await?;
    Ok(Json(ApiResponse::success(MessageResponse::new(
        "Party visibility updated",
    ))))
}

/// DELETE /api/parties/{id} (admin session)
pub async fn delete_party(
    State(state): State<Arc<AppState>>,
    Extension(identity): Extension<AdminIdentity>,
    Path(id): Path<i32>,
    headers: HeaderMap,
) -> Result<Json<ApiResponse<MessageResponse>>, ApiError> {
    let meta = request_meta(&headers);
    state.shared.parties.delete(&identity, id, &meta).await?;
    Ok(Json(ApiResponse::success(MessageResponse::new(
        "Party deleted",
    ))))
}
