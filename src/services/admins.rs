//! Administrator account management.

use serde_json::json;
use thiserror::Error;

use crate::config::SecurityConfig;
use crate::db::{Admin, Store};
use crate::policy::{AccessDenied, AdminIdentity, Capability, Role, authorize};
use crate::services::audit::{AuditSink, RequestMeta};
use crate::services::auth::MIN_PASSWORD_LEN;

#[derive(Debug, Error)]
pub enum AdminError {
    #[error(transparent)]
    AccessDenied(#[from] AccessDenied),

    #[error("Username already taken")]
    DuplicateUsername,

    #[error("Admin not found")]
    NotFound,

    #[error("Admins cannot delete their own account")]
    SelfDeletion,

    #[error("The bootstrap admin cannot be deleted")]
    BootstrapImmutable,

    #[error("{0}")]
    InvalidField(&'static str),

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

#[derive(Clone)]
pub struct AdminService {
    store: Store,
    audit: AuditSink,
    security: SecurityConfig,
}

impl AdminService {
    #[must_use]
    pub const fn new(store: Store, audit: AuditSink, security: SecurityConfig) -> Self {
        Self {
            store,
            audit,
            security,
        }
    }

    pub async fn list(&self, identity: &AdminIdentity) -> Result<Vec<Admin>, AdminError> {
        authorize(identity, Capability::ManageAdmins)?;
        Ok(self.store.list_admins().await?)
    }

    pub async fn create(
        &self,
        identity: &AdminIdentity,
        username: &str,
        password: &str,
        role: Role,
        meta: &RequestMeta,
    ) -> Result<Admin, AdminError> {
        authorize(identity, Capability::ManageAdmins)?;

        let username = username.trim();
        if username.is_empty() {
            return Err(AdminError::InvalidField("Username is required"));
        }
        if password.len() < MIN_PASSWORD_LEN {
            return Err(AdminError::InvalidField(
                "Password must be at least 8 characters",
            ));
        }
        if self.store.admin_username_exists(username).await? {
            return Err(AdminError::DuplicateUsername);
        }

        let admin = self
            .store
            .create_admin(username, password, role, identity.id, &self.security)
            .await?;

        self.audit
            .admin_action(
                identity.id,
                "create_admin",
                Some(username),
                Some(json!({ "role": role.as_str() })),
                meta,
            )
            .await;

        Ok(admin)
    }

    pub async fn delete(
        &self,
        identity: &AdminIdentity,
        target_id: i32,
        meta: &RequestMeta,
    ) -> Result<(), AdminError> {
        authorize(identity, Capability::ManageAdmins)?;

        if target_id == identity.id {
            return Err(AdminError::SelfDeletion);
        }

        let target = self
            .store
            .get_admin(target_id)
            .await?
            .ok_or(AdminError::NotFound)?;
        if target.is_bootstrap {
            return Err(AdminError::BootstrapImmutable);
        }

        if !self.store.delete_admin(target_id).await? {
            return Err(AdminError::NotFound);
        }

        self.audit
            .admin_action(
                identity.id,
                "delete_admin",
                Some(&target.username),
                None,
                meta,
            )
            .await;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn super_admin(id: i32) -> AdminIdentity {
        AdminIdentity {
            id,
            role: Role::SuperAdmin,
            is_bootstrap: false,
        }
    }

    async fn service() -> (Store, AdminService) {
        let store = Store::new("sqlite::memory:").await.unwrap();
        let audit = AuditSink::new(store.clone());
        let svc = AdminService::new(store.clone(), audit, SecurityConfig::default());
        (store, svc)
    }

    #[tokio::test]
    async fn test_create_list_delete() {
        let (_store, svc) = service().await;
        let meta = RequestMeta::default();
        let actor = super_admin(1);

        let created = svc
            .create(&actor, "registrar1", "s3cure-pass", Role::Admin, &meta)
            .await
            .unwrap();
        assert_eq!(created.role, Role::Admin);
        assert!(!created.is_bootstrap);

        let err = svc
            .create(&actor, "registrar1", "s3cure-pass", Role::Admin, &meta)
            .await
            .unwrap_err();
        assert!(matches!(err, AdminError::DuplicateUsername));

        // Seeded bootstrap admin plus the new one.
        assert_eq!(svc.list(&actor).await.unwrap().len(), 2);

        svc.delete(&actor, created.id, &meta).await.unwrap();
        assert_eq!(svc.list(&actor).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_plain_admin_cannot_manage_admins() {
        let (_store, svc) = service().await;
        let meta = RequestMeta::default();
        let actor = AdminIdentity {
            id: 5,
            role: Role::Admin,
            is_bootstrap: false,
        };

        let err = svc
            .create(&actor, "x", "password123", Role::Admin, &meta)
            .await
            .unwrap_err();
        assert!(matches!(err, AdminError::AccessDenied(_)));
    }

    #[tokio::test]
    async fn test_bootstrap_and_self_are_protected() {
        let (store, svc) = service().await;
        let meta = RequestMeta::default();
        let actor = super_admin(99);

        let err = svc.delete(&actor, 99, &meta).await.unwrap_err();
        assert!(matches!(err, AdminError::SelfDeletion));

        let bootstrap = store.get_admin_by_username("admin").await.unwrap().unwrap();
        let err = svc.delete(&actor, bootstrap.id, &meta).await.unwrap_err();
        assert!(matches!(err, AdminError::BootstrapImmutable));

        // Even the bootstrap admin cannot delete their own account; the
        // self-deletion rule wins over anything role-specific.
        let bootstrap_actor = AdminIdentity {
            id: bootstrap.id,
            role: bootstrap.role,
            is_bootstrap: true,
        };
        let err = svc
            .delete(&bootstrap_actor, bootstrap.id, &meta)
            .await
            .unwrap_err();
        assert!(matches!(err, AdminError::SelfDeletion));
    }
}
