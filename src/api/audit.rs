use axum::{
    Extension, Json,
    extract::{Query, State},
};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::sync::Arc;

use super::{ApiError, ApiResponse, AppState};
use crate::db::AuditFilter;
use crate::entities::audit_log;
use crate::policy::AdminIdentity;

#[derive(Deserialize, Default)]
pub struct AuditQuery {
    pub admin_id: Option<i32>,
    pub action: Option<String>,
    pub target: Option<String>,
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
}

/// GET /api/audit (admin session)
pub async fn query_audit(
    State(state): State<Arc<AppState>>,
    Extension(identity): Extension<AdminIdentity>,
    Query(query): Query<AuditQuery>,
) -> Result<Json<ApiResponse<Vec<audit_log::Model>>>, ApiError> {
    let filter = AuditFilter {
        admin_id: query.admin_id,
        action: query.action,
        target: query.target,
        from: query.from,
        to: query.to,
    };

    let entries = state.shared.audit.view(&identity, filter).await?;
    Ok(Json(ApiResponse::success(entries)))
}
