use axum::{
    Json,
    extract::{Request, State},
    http::{HeaderMap, StatusCode},
    middleware::Next,
    response::IntoResponse,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_sessions::Session;

use super::{ApiError, ApiResponse, AppState, MessageResponse};
use crate::policy::AdminIdentity;
use crate::services::RequestMeta;

pub const SESSION_ADMIN: &str = "admin";
pub const SESSION_VOTER_ID: &str = "voter_id";

/// Voter principal as injected by the middleware.
#[derive(Debug, Clone, Copy)]
pub struct VoterId(pub i32);

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Deserialize)]
pub struct AdminLoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Serialize)]
pub struct AdminLoginResponse {
    pub id: i32,
    pub username: String,
    pub role: String,
    pub is_bootstrap: bool,
}

#[derive(Deserialize)]
pub struct VoterLoginRequest {
    pub fin: String,
    pub password: String,
}

#[derive(Serialize)]
pub struct VoterLoginResponse {
    pub voter_id: i32,
    pub must_change_password: bool,
    pub has_voted: bool,
}

#[derive(Deserialize)]
pub struct ChangePasswordRequest {
    pub current_password: String,
    pub new_password: String,
}

// ============================================================================
// Middleware
// ============================================================================

pub async fn admin_auth_middleware(
    session: Session,
    mut request: Request,
    next: Next,
) -> Result<impl IntoResponse, ApiError> {
    if let Ok(Some(identity)) = session.get::<AdminIdentity>(SESSION_ADMIN).await {
        tracing::Span::current().record("user_id", identity.id);
        request.extensions_mut().insert(identity);
        return Ok(next.run(request).await);
    }

    Ok((StatusCode::UNAUTHORIZED, "Unauthorized").into_response())
}

pub async fn voter_auth_middleware(
    session: Session,
    mut request: Request,
    next: Next,
) -> Result<impl IntoResponse, ApiError> {
    if let Ok(Some(voter_id)) = session.get::<i32>(SESSION_VOTER_ID).await {
        tracing::Span::current().record("user_id", voter_id);
        request.extensions_mut().insert(VoterId(voter_id));
        return Ok(next.run(request).await);
    }

    Ok((StatusCode::UNAUTHORIZED, "Unauthorized").into_response())
}

/// Attribution passed down to the audit trail.
pub fn request_meta(headers: &HeaderMap) -> RequestMeta {
    let ip_address = headers
        .get("x-forwarded-for")
        .and_then(|h| h.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(|v| v.trim().to_string());

    let user_agent = headers
        .get("user-agent")
        .and_then(|h| h.to_str().ok())
        .map(ToString::to_string);

    RequestMeta {
        ip_address,
        user_agent,
    }
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /api/admin/login
pub async fn admin_login(
    State(state): State<Arc<AppState>>,
    session: Session,
    headers: HeaderMap,
    Json(payload): Json<AdminLoginRequest>,
) -> Result<Json<ApiResponse<AdminLoginResponse>>, ApiError> {
    if payload.username.is_empty() || payload.password.is_empty() {
        return Err(ApiError::validation("Username and password are required"));
    }

    let meta = request_meta(&headers);
    let admin = state
        .shared
        .auth
        .admin_login(&payload.username, &payload.password, &meta)
        .await?;

    session
        .insert(SESSION_ADMIN, admin.identity())
        .await
        .map_err(|e| ApiError::internal(format!("Failed to create session: {e}")))?;

    Ok(Json(ApiResponse::success(AdminLoginResponse {
        id: admin.id,
        username: admin.username,
        role: admin.role.as_str().to_string(),
        is_bootstrap: admin.is_bootstrap,
    })))
}

/// POST /api/voter/login
pub async fn voter_login(
    State(state): State<Arc<AppState>>,
    session: Session,
    headers: HeaderMap,
    Json(payload): Json<VoterLoginRequest>,
) -> Result<Json<ApiResponse<VoterLoginResponse>>, ApiError> {
    if payload.fin.is_empty() || payload.password.is_empty() {
        return Err(ApiError::validation("FIN and password are required"));
    }

    let meta = request_meta(&headers);
    let login = state
        .shared
        .auth
        .voter_login(&payload.fin, &payload.password, &meta)
        .await?;

    session
        .insert(SESSION_VOTER_ID, login.voter_id)
        .await
        .map_err(|e| ApiError::internal(format!("Failed to create session: {e}")))?;

    let has_voted = state.shared.votes.has_voted(login.voter_id).await?;

    Ok(Json(ApiResponse::success(VoterLoginResponse {
        voter_id: login.voter_id,
        must_change_password: login.must_change_password,
        has_voted,
    })))
}

/// POST /api/voter/password (voter session)
pub async fn change_voter_password(
    State(state): State<Arc<AppState>>,
    axum::Extension(voter): axum::Extension<VoterId>,
    headers: HeaderMap,
    Json(payload): Json<ChangePasswordRequest>,
) -> Result<Json<ApiResponse<MessageResponse>>, ApiError> {
    let meta = request_meta(&headers);
    state
        .shared
        .auth
        .change_voter_password(
            voter.0,
            &payload.current_password,
            &payload.new_password,
            &meta,
        )
        .await?;

    Ok(Json(ApiResponse::success(MessageResponse::new(
        "Password updated successfully",
    ))))
}

/// POST /api/logout
pub async fn logout(session: Session) -> impl IntoResponse {
    let _ = session.flush().await;
    (StatusCode::OK, "Logged out")
}
