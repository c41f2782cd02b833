//! Login and credential flows for both principals.
//!
//! Voter logins run through the throttle: an active lock is checked before
//! the password hash is ever consulted, and the resulting state transition is
//! persisted in the same call.

use std::sync::Arc;

use chrono::Utc;
use serde_json::json;
use thiserror::Error;
use tracing::info;

use crate::config::SecurityConfig;
use crate::db::{Admin, Store};
use crate::policy::throttle;
use crate::policy::{LoginOutcome, is_valid_fin};
use crate::services::audit::{AuditSink, RequestMeta};
use crate::services::system_config::SystemConfigCache;

pub const MIN_PASSWORD_LEN: usize = 8;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Account locked. Try again in {remaining_minutes} minute(s)")]
    Locked { remaining_minutes: i64 },

    #[error("{0}")]
    PasswordPolicy(&'static str),

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

/// Result of a successful voter login.
#[derive(Debug, Clone, Copy)]
pub struct VoterLogin {
    pub voter_id: i32,
    pub must_change_password: bool,
}

#[derive(Clone)]
pub struct AuthService {
    store: Store,
    cache: Arc<SystemConfigCache>,
    audit: AuditSink,
    security: SecurityConfig,
}

impl AuthService {
    #[must_use]
    pub fn new(
        store: Store,
        cache: Arc<SystemConfigCache>,
        audit: AuditSink,
        security: SecurityConfig,
    ) -> Self {
        Self {
            store,
            cache,
            audit,
            security,
        }
    }

    pub async fn admin_login(
        &self,
        username: &str,
        password: &str,
        meta: &RequestMeta,
    ) -> Result<Admin, AuthError> {
        let Some(admin) = self.store.verify_admin_credentials(username, password).await? else {
            info!(username, "Admin login rejected");
            return Err(AuthError::InvalidCredentials);
        };

        self.audit
            .admin_action(admin.id, "admin_login_success", None, None, meta)
            .await;

        Ok(admin)
    }

    pub async fn voter_login(
        &self,
        fin: &str,
        password: &str,
        meta: &RequestMeta,
    ) -> Result<VoterLogin, AuthError> {
        if !is_valid_fin(fin) {
            return Err(AuthError::InvalidCredentials);
        }

        let Some(voter) = self.store.get_voter_by_fin(fin).await? else {
            return Err(AuthError::InvalidCredentials);
        };
        if !voter.is_active {
            return Err(AuthError::InvalidCredentials);
        }

        let now = Utc::now();
        let policy = self.cache.throttle_policy().await;

        // A live lock means the hash is never consulted.
        let lock_active = voter.locked_until.is_some_and(|until| until > now);
        let secret_ok = if lock_active {
            false
        } else {
            self.store.verify_voter_password(&voter, password).await?
        };

        let attempts = u32::try_from(voter.login_attempts).unwrap_or(0);
        let outcome = throttle::evaluate(now, voter.locked_until, attempts, secret_ok, policy);

        self.store
            .apply_login_transition(voter.id, outcome.transition())
            .await?;

        match outcome {
            LoginOutcome::Success => {
                self.audit
                    .voter_activity(voter.id, "login", None, meta)
                    .await;

                Ok(VoterLogin {
                    voter_id: voter.id,
                    must_change_password: !voter.has_changed_password,
                })
            }
            LoginOutcome::Locked {
                remaining_minutes,
                newly_locked,
                ..
            } => {
                if newly_locked {
                    self.audit
                        .voter_activity(
                            voter.id,
                            "locked_out",
                            Some(json!({ "lock_minutes": policy.lock_minutes })),
                            meta,
                        )
                        .await;
                }
                Err(AuthError::Locked { remaining_minutes })
            }
            LoginOutcome::Rejected { .. } => Err(AuthError::InvalidCredentials),
        }
    }

    pub async fn change_voter_password(
        &self,
        voter_id: i32,
        current_password: &str,
        new_password: &str,
        meta: &RequestMeta,
    ) -> Result<(), AuthError> {
        let voter = self
            .store
            .get_voter(voter_id)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        if !self
            .store
            .verify_voter_password(&voter, current_password)
            .await?
        {
            return Err(AuthError::InvalidCredentials);
        }

        if new_password.len() < MIN_PASSWORD_LEN {
            return Err(AuthError::PasswordPolicy(
                "Password must be at least 8 characters",
            ));
        }
        if new_password == self.security.default_voter_password {
            return Err(AuthError::PasswordPolicy(
                "New password must differ from the provisioned default",
            ));
        }

        self.store
            .update_voter_password(voter_id, new_password, &self.security)
            .await?;

        self.audit
            .voter_activity(voter_id, "change_password", None, meta)
            .await;

        Ok(())
    }
}
