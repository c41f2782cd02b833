use axum::{Extension, Json, extract::State, http::HeaderMap};
use serde::Deserialize;
use std::sync::Arc;

use super::auth::request_meta;
use super::{ApiError, ApiResponse, AppState, MessageResponse, SystemStatus};
use crate::policy::AdminIdentity;

#[derive(Deserialize)]
pub struct ResetRequest {
    pub confirm_code: String,
}

/// GET /api/system/status (admin session)
pub async fn get_status(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<SystemStatus>>, ApiError> {
    let store = &state.shared.store;
    let database_ok = store.ping().await.is_ok();

    Ok(Json(ApiResponse::success(SystemStatus {
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime: state.start_time.elapsed().as_secs(),
        database_ok,
        registered_voters: store.count_active_voters().await?,
        active_parties: store.count_active_parties().await?,
        total_votes: store.total_votes().await?,
    })))
}

/// POST /api/system/reset (admin session)
pub async fn reset_system(
    State(state): State<Arc<AppState>>,
    Extension(identity): Extension<AdminIdentity>,
    headers: HeaderMap,
    Json(payload): Json<ResetRequest>,
) -> Result<Json<ApiResponse<MessageResponse>>, ApiError> {
    let meta = request_meta(&headers);
    state
        .shared
        .elections
        .reset_system(&identity, &payload.confirm_code, &meta)
        .await?;

    // The throttle parameters were just reseeded; drop the cached copy.
    state
        .shared
        .config_cache
        .refresh()
        .await
        .map_err(ApiError::from)?;

    Ok(Json(ApiResponse::success(MessageResponse::new(
        "System reset complete",
    ))))
}
