//! Fire-and-forget audit recording.
//!
//! Audit writes must never fail the operation they describe, so every sink
//! method logs the failure and returns. The mutation has already happened by
//! the time the sink runs.

use serde_json::Value;
use thiserror::Error;
use tracing::warn;

use crate::db::{AuditFilter, Store};
use crate::entities::audit_log;
use crate::policy::{AccessDenied, AdminIdentity, Capability, authorize};

#[derive(Debug, Error)]
pub enum AuditError {
    #[error(transparent)]
    AccessDenied(#[from] AccessDenied),

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

/// Request-scoped attribution captured by the handlers.
#[derive(Debug, Clone, Default)]
pub struct RequestMeta {
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
}

#[derive(Clone)]
pub struct AuditSink {
    store: Store,
}

impl AuditSink {
    #[must_use]
    pub const fn new(store: Store) -> Self {
        Self { store }
    }

    pub async fn admin_action(
        &self,
        admin_id: i32,
        action: &str,
        target: Option<&str>,
        details: Option<Value>,
        meta: &RequestMeta,
    ) {
        let details = details.map(|v| v.to_string());
        if let Err(err) = self
            .store
            .record_admin_action(
                admin_id,
                action,
                target,
                details,
                meta.ip_address.clone(),
                meta.user_agent.clone(),
            )
            .await
        {
            warn!(admin_id, action, "Failed to record audit entry: {err:#}");
        }
    }

    /// The audit viewer; the only read path, and the only gated one.
    pub async fn view(
        &self,
        identity: &AdminIdentity,
        filter: AuditFilter,
    ) -> Result<Vec<audit_log::Model>, AuditError> {
        authorize(identity, Capability::ViewAuditLog)?;
        Ok(self.store.query_audit(filter).await?)
    }

    pub async fn voter_activity(
        &self,
        voter_id: i32,
        action: &str,
        details: Option<Value>,
        meta: &RequestMeta,
    ) {
        let details = details.map(|v| v.to_string());
        if let Err(err) = self
            .store
            .record_voter_activity(
                voter_id,
                action,
                details,
                meta.ip_address.clone(),
                meta.user_agent.clone(),
            )
            .await
        {
            warn!(voter_id, action, "Failed to record activity entry: {err:#}");
        }
    }
}
