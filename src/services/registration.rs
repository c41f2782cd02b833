//! Admin-mediated voter registration.
//!
//! Registration admissibility is re-checked on every call: the explicit flag
//! or a scheduled window can admit it, but a live election always refuses it,
//! whatever those say.

use chrono::Utc;
use serde_json::json;
use thiserror::Error;

use crate::config::SecurityConfig;
use crate::db::{NewVoter, Store};
use crate::entities::voters;
use crate::policy::window;
use crate::policy::{AccessDenied, AdminIdentity, Capability, authorize, is_valid_fin};
use crate::services::audit::{AuditSink, RequestMeta};

pub const MIN_VOTER_AGE: i32 = 18;

#[derive(Debug, Error)]
pub enum RegistrationError {
    #[error(transparent)]
    AccessDenied(#[from] AccessDenied),

    #[error("Registration is disabled while the election is open")]
    ElectionInProgress,

    #[error("Registration is currently closed")]
    RegistrationClosed,

    #[error("FIN must match the format 0000-0000-0000")]
    InvalidFin,

    #[error("A voter with this FIN is already registered")]
    DuplicateFin,

    #[error("A voter with this phone number is already registered")]
    DuplicatePhone,

    #[error("{0}")]
    InvalidField(&'static str),

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

#[derive(Clone)]
pub struct RegistrationService {
    store: Store,
    audit: AuditSink,
    security: SecurityConfig,
}

impl RegistrationService {
    #[must_use]
    pub const fn new(store: Store, audit: AuditSink, security: SecurityConfig) -> Self {
        Self {
            store,
            audit,
            security,
        }
    }

    pub async fn register_voter(
        &self,
        identity: &AdminIdentity,
        mut input: NewVoter,
        meta: &RequestMeta,
    ) -> Result<voters::Model, RegistrationError> {
        authorize(identity, Capability::RegisterVoter)?;

        let now = Utc::now();
        let settings = self.store.election_settings().await?;
        if window::election_open(now, settings.election_start_date, settings.election_end_date) {
            return Err(RegistrationError::ElectionInProgress);
        }
        if !window::registration_open(
            now,
            settings.registration_open,
            settings.registration_start_date,
            settings.registration_end_date,
        ) {
            return Err(RegistrationError::RegistrationClosed);
        }

        input.fin = input.fin.trim().to_string();
        input.full_name = input.full_name.trim().to_string();
        Self::validate(&input)?;

        if self.store.voter_fin_exists(&input.fin).await? {
            return Err(RegistrationError::DuplicateFin);
        }
        if let Some(phone) = &input.phone
            && self.store.voter_phone_exists(phone).await?
        {
            return Err(RegistrationError::DuplicatePhone);
        }

        input.created_by = identity.id;
        let voter = self
            .store
            .create_voter(
                input,
                &self.security.default_voter_password,
                &self.security,
            )
            .await?;

        self.audit
            .admin_action(
                identity.id,
                "register_voter",
                Some(&voter.fin),
                Some(json!({ "voter_id": voter.id })),
                meta,
            )
            .await;

        Ok(voter)
    }

    fn validate(input: &NewVoter) -> Result<(), RegistrationError> {
        if !is_valid_fin(&input.fin) {
            return Err(RegistrationError::InvalidFin);
        }
        if input.full_name.is_empty() {
            return Err(RegistrationError::InvalidField("Full name is required"));
        }
        if input.age < MIN_VOTER_AGE {
            return Err(RegistrationError::InvalidField(
                "Voter must be at least 18 years old",
            ));
        }
        if input.region.trim().is_empty()
            || input.zone.trim().is_empty()
            || input.woreda.trim().is_empty()
            || input.kebele.trim().is_empty()
        {
            return Err(RegistrationError::InvalidField(
                "Full address (region, zone, woreda, kebele) is required",
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use crate::policy::Role;

    fn registrar() -> AdminIdentity {
        AdminIdentity {
            id: 2,
            role: Role::Admin,
            is_bootstrap: false,
        }
    }

    fn input(fin: &str) -> NewVoter {
        NewVoter {
            full_name: "Alem Kebede".to_string(),
            age: 34,
            sex: "F".to_string(),
            region: "Amhara".to_string(),
            zone: "North Gondar".to_string(),
            woreda: "Gondar Zuria".to_string(),
            kebele: "02".to_string(),
            fin: fin.to_string(),
            phone: Some("0911000000".to_string()),
            created_by: 0,
        }
    }

    async fn service() -> (Store, RegistrationService) {
        let store = Store::new("sqlite::memory:").await.unwrap();
        let audit = AuditSink::new(store.clone());
        let svc = RegistrationService::new(store.clone(), audit, SecurityConfig::default());
        store.set_registration_flag(true).await.unwrap();
        (store, svc)
    }

    #[tokio::test]
    async fn test_register_and_duplicate_fin() {
        let (_store, svc) = service().await;
        let meta = RequestMeta::default();

        let voter = svc
            .register_voter(&registrar(), input("1234-5678-9012"), &meta)
            .await
            .unwrap();
        assert!(!voter.has_changed_password);
        assert_eq!(voter.created_by, 2);

        let mut second = input("1234-5678-9012");
        second.phone = None;
        let err = svc
            .register_voter(&registrar(), second, &meta)
            .await
            .unwrap_err();
        assert!(matches!(err, RegistrationError::DuplicateFin));
    }

    #[tokio::test]
    async fn test_duplicate_phone_rejected() {
        let (_store, svc) = service().await;
        let meta = RequestMeta::default();

        svc.register_voter(&registrar(), input("1234-5678-9012"), &meta)
            .await
            .unwrap();
        let err = svc
            .register_voter(&registrar(), input("9999-8888-7777"), &meta)
            .await
            .unwrap_err();
        assert!(matches!(err, RegistrationError::DuplicatePhone));
    }

    #[tokio::test]
    async fn test_field_validation() {
        let (_store, svc) = service().await;
        let meta = RequestMeta::default();

        let err = svc
            .register_voter(&registrar(), input("123456789012"), &meta)
            .await
            .unwrap_err();
        assert!(matches!(err, RegistrationError::InvalidFin));

        let mut minor = input("1234-5678-9012");
        minor.age = 17;
        let err = svc
            .register_voter(&registrar(), minor, &meta)
            .await
            .unwrap_err();
        assert!(matches!(err, RegistrationError::InvalidField(_)));
    }

    #[tokio::test]
    async fn test_election_disables_registration_even_with_flag() {
        let (store, svc) = service().await;
        let meta = RequestMeta::default();
        let now = Utc::now();

        store
            .set_election_period(now - Duration::hours(1), now + Duration::hours(1))
            .await
            .unwrap();

        let err = svc
            .register_voter(&registrar(), input("1234-5678-9012"), &meta)
            .await
            .unwrap_err();
        assert!(matches!(err, RegistrationError::ElectionInProgress));
    }

    #[tokio::test]
    async fn test_closed_registration_refused() {
        let (store, svc) = service().await;
        let meta = RequestMeta::default();
        store.set_registration_flag(false).await.unwrap();

        let err = svc
            .register_voter(&registrar(), input("1234-5678-9012"), &meta)
            .await
            .unwrap_err();
        assert!(matches!(err, RegistrationError::RegistrationClosed));
    }
}
