//! Election and registration window management, the public status view, and
//! the full system reset.

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::json;
use thiserror::Error;
use tracing::warn;

use crate::db::Store;
use crate::policy::window::{self, WindowError};
use crate::policy::{AccessDenied, AdminIdentity, Capability, authorize};
use crate::services::audit::{AuditSink, RequestMeta};

/// Typed confirmation required by the reset endpoint.
pub const RESET_CONFIRM_CODE: &str = "RESET_ALL_DATA";

#[derive(Debug, Error)]
pub enum ElectionError {
    #[error(transparent)]
    AccessDenied(#[from] AccessDenied),

    #[error(transparent)]
    InvalidWindow(#[from] WindowError),

    #[error("Confirmation code mismatch")]
    BadConfirmation,

    #[error("Operation refused while the election is open")]
    ElectionInProgress,

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

/// Snapshot served to every client, authenticated or not.
#[derive(Debug, Clone, Serialize)]
pub struct ElectionStatus {
    pub election_open: bool,
    pub registration_open: bool,
    pub registration_flag: bool,
    pub election_start_date: Option<DateTime<Utc>>,
    pub election_end_date: Option<DateTime<Utc>>,
    pub registration_start_date: Option<DateTime<Utc>>,
    pub registration_end_date: Option<DateTime<Utc>>,
}

#[derive(Clone)]
pub struct ElectionService {
    store: Store,
    audit: AuditSink,
}

impl ElectionService {
    #[must_use]
    pub const fn new(store: Store, audit: AuditSink) -> Self {
        Self { store, audit }
    }

    pub async fn status(&self, now: DateTime<Utc>) -> Result<ElectionStatus, ElectionError> {
        let settings = self.store.election_settings().await?;

        let election_open = window::election_open(
            now,
            settings.election_start_date,
            settings.election_end_date,
        );

        // Registration never coexists with a live election, whatever the flag
        // or the scheduled window say.
        let registration_open = !election_open
            && window::registration_open(
                now,
                settings.registration_open,
                settings.registration_start_date,
                settings.registration_end_date,
            );

        Ok(ElectionStatus {
            election_open,
            registration_open,
            registration_flag: settings.registration_open,
            election_start_date: settings.election_start_date,
            election_end_date: settings.election_end_date,
            registration_start_date: settings.registration_start_date,
            registration_end_date: settings.registration_end_date,
        })
    }

    pub async fn election_is_open(&self, now: DateTime<Utc>) -> Result<bool, ElectionError> {
        let settings = self.store.election_settings().await?;
        Ok(window::election_open(
            now,
            settings.election_start_date,
            settings.election_end_date,
        ))
    }

    pub async fn set_election_period(
        &self,
        identity: &AdminIdentity,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        meta: &RequestMeta,
    ) -> Result<ElectionStatus, ElectionError> {
        authorize(identity, Capability::ManageElectionWindow)?;
        window::validate_window(start, end)?;

        self.store.set_election_period(start, end).await?;
        self.audit
            .admin_action(
                identity.id,
                "set_election_period",
                None,
                Some(json!({ "start": start, "end": end })),
                meta,
            )
            .await;

        self.status(Utc::now()).await
    }

    pub async fn clear_election_period(
        &self,
        identity: &AdminIdentity,
        meta: &RequestMeta,
    ) -> Result<ElectionStatus, ElectionError> {
        authorize(identity, Capability::ManageElectionWindow)?;

        self.store.clear_election_period().await?;
        self.audit
            .admin_action(identity.id, "clear_election_period", None, None, meta)
            .await;

        self.status(Utc::now()).await
    }

    pub async fn set_registration_period(
        &self,
        identity: &AdminIdentity,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        meta: &RequestMeta,
    ) -> Result<ElectionStatus, ElectionError> {
        authorize(identity, Capability::ManageRegistrationWindow)?;
        window::validate_window(start, end)?;

        self.store.set_registration_period(start, end).await?;
        self.audit
            .admin_action(
                identity.id,
                "set_registration_period",
                None,
                Some(json!({ "start": start, "end": end })),
                meta,
            )
            .await;

        self.status(Utc::now()).await
    }

    pub async fn clear_registration_period(
        &self,
        identity: &AdminIdentity,
        meta: &RequestMeta,
    ) -> Result<ElectionStatus, ElectionError> {
        authorize(identity, Capability::ManageRegistrationWindow)?;

        self.store.clear_registration_period().await?;
        self.audit
            .admin_action(identity.id, "clear_registration_period", None, None, meta)
            .await;

        self.status(Utc::now()).await
    }

    pub async fn set_registration_flag(
        &self,
        identity: &AdminIdentity,
        open: bool,
        meta: &RequestMeta,
    ) -> Result<ElectionStatus, ElectionError> {
        authorize(identity, Capability::ManageRegistrationWindow)?;

        self.store.set_registration_flag(open).await?;
        self.audit
            .admin_action(
                identity.id,
                "set_registration_flag",
                None,
                Some(json!({ "open": open })),
                meta,
            )
            .await;

        self.status(Utc::now()).await
    }

    /// Wipes every table except the bootstrap admin. Refused while the
    /// election window is open.
    pub async fn reset_system(
        &self,
        identity: &AdminIdentity,
        confirm_code: &str,
        meta: &RequestMeta,
    ) -> Result<(), ElectionError> {
        authorize(identity, Capability::ResetSystem)?;

        if confirm_code != RESET_CONFIRM_CODE {
            return Err(ElectionError::BadConfirmation);
        }
        if self.election_is_open(Utc::now()).await? {
            return Err(ElectionError::ElectionInProgress);
        }

        warn!(admin_id = identity.id, "Full system reset requested");
        self.store.reset_system().await?;

        // The reset truncates the audit log itself, so this entry is the
        // first row of the new epoch.
        self.audit
            .admin_action(identity.id, "system_reset", None, None, meta)
            .await;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use crate::policy::Role;

    fn bootstrap() -> AdminIdentity {
        AdminIdentity {
            id: 1,
            role: Role::SuperAdmin,
            is_bootstrap: true,
        }
    }

    fn plain_admin() -> AdminIdentity {
        AdminIdentity {
            id: 2,
            role: Role::Admin,
            is_bootstrap: false,
        }
    }

    async fn service() -> ElectionService {
        let store = Store::new("sqlite::memory:").await.unwrap();
        let audit = AuditSink::new(store.clone());
        ElectionService::new(store, audit)
    }

    #[tokio::test]
    async fn test_election_window_controls_status() {
        let svc = service().await;
        let meta = RequestMeta::default();
        let now = Utc::now();

        let status = svc.status(now).await.unwrap();
        assert!(!status.election_open);

        svc.set_election_period(
            &bootstrap(),
            now - Duration::hours(1),
            now + Duration::hours(1),
            &meta,
        )
        .await
        .unwrap();
        assert!(svc.status(now).await.unwrap().election_open);

        svc.clear_election_period(&bootstrap(), &meta).await.unwrap();
        assert!(!svc.status(now).await.unwrap().election_open);
    }

    #[tokio::test]
    async fn test_registration_suppressed_during_election() {
        let svc = service().await;
        let meta = RequestMeta::default();
        let now = Utc::now();

        svc.set_registration_flag(&bootstrap(), true, &meta)
            .await
            .unwrap();
        assert!(svc.status(now).await.unwrap().registration_open);

        svc.set_election_period(
            &bootstrap(),
            now - Duration::hours(1),
            now + Duration::hours(1),
            &meta,
        )
        .await
        .unwrap();

        let status = svc.status(now).await.unwrap();
        assert!(status.election_open);
        assert!(!status.registration_open);
        assert!(status.registration_flag);
    }

    #[tokio::test]
    async fn test_window_ops_require_bootstrap() {
        let svc = service().await;
        let meta = RequestMeta::default();
        let now = Utc::now();

        let err = svc
            .set_election_period(&plain_admin(), now, now + Duration::hours(1), &meta)
            .await
            .unwrap_err();
        assert!(matches!(err, ElectionError::AccessDenied(_)));
    }

    #[tokio::test]
    async fn test_inverted_window_rejected() {
        let svc = service().await;
        let meta = RequestMeta::default();
        let now = Utc::now();

        let err = svc
            .set_election_period(&bootstrap(), now + Duration::hours(1), now, &meta)
            .await
            .unwrap_err();
        assert!(matches!(err, ElectionError::InvalidWindow(_)));
    }

    #[tokio::test]
    async fn test_reset_requires_confirmation_and_closed_election() {
        let svc = service().await;
        let meta = RequestMeta::default();
        let now = Utc::now();

        let err = svc
            .reset_system(&bootstrap(), "nope", &meta)
            .await
            .unwrap_err();
        assert!(matches!(err, ElectionError::BadConfirmation));

        svc.set_election_period(
            &bootstrap(),
            now - Duration::hours(1),
            now + Duration::hours(1),
            &meta,
        )
        .await
        .unwrap();

        let err = svc
            .reset_system(&bootstrap(), RESET_CONFIRM_CODE, &meta)
            .await
            .unwrap_err();
        assert!(matches!(err, ElectionError::ElectionInProgress));

        svc.clear_election_period(&bootstrap(), &meta).await.unwrap();
        svc.reset_system(&bootstrap(), RESET_CONFIRM_CODE, &meta)
            .await
            .unwrap();

        // Reset leaves registration forced open.
        assert!(svc.status(Utc::now()).await.unwrap().registration_flag);
    }
}
