use axum::{
    Extension, Json,
    extract::{Path, State},
    http::HeaderMap,
};
use serde::Deserialize;
use std::sync::Arc;

use super::auth::request_meta;
use super::{AdminDto, ApiError, ApiResponse, AppState, MessageResponse};
use crate::policy::{AdminIdentity, Role};

#[derive(Deserialize)]
pub struct CreateAdminRequest {
    pub username: String,
    pub password: String,
    pub role: String,
}

/// GET /api/admins (admin session)
pub async fn list_admins(
    State(state): State<Arc<AppState>>,
    Extension(identity): Extension<AdminIdentity>,
) -> Result<Json<ApiResponse<Vec<AdminDto>>>, ApiError> {
    let admins = state.shared.admins.list(&identity).await?;
    Ok(Json(ApiResponse::success(
        admins.into_iter().map(AdminDto::from).collect(),
    )))
}

/// POST /api/admins (admin session)
pub async fn create_admin(
    State(state): State<Arc<AppState>>,
    Extension(identity): Extension<AdminIdentity>,
    headers: HeaderMap,
    Json(payload): Json<CreateAdminRequest>,
) -> Result<Json<ApiResponse<AdminDto>>, ApiError> {
    let role = Role::parse(&payload.role)
        .ok_or_else(|| ApiError::validation("Role must be 'admin' or 'super_admin'"))?;

    let meta = request_meta(&headers);
    let admin = state
        .shared
        .admins
        .create(&identity, &payload.username, &payload.password, role, &meta)
        .await?;

    Ok(Json(ApiResponse::success(AdminDto::from(admin))))
}

/// DELETE /api/admins/{id} (admin session)
pub async fn delete_admin(
    State(state): State<Arc<AppState>>,
    Extension(identity): Extension<AdminIdentity>,
    Path(id): Path<i32>,
    headers: HeaderMap,
) -> Result<Json<ApiResponse<MessageResponse>>, ApiError> {
    let meta = request_meta(&headers);
    state.shared.admins.delete(&identity, id, &meta).await?;
    Ok(Json(ApiResponse::success(MessageResponse::new(
        "Admin deleted",
    ))))
}
