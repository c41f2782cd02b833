//! Party catalogue management.
//!
//! Voters only ever see active parties; the full catalogue (including hidden
//! entries) is an admin view. Visibility toggling is a lighter capability
//! than structural changes, so the two are gated separately.

use serde_json::json;
use thiserror::Error;

use crate::db::{PartyInput, Store};
use crate::entities::parties;
use crate::policy::{AccessDenied, AdminIdentity, Capability, authorize};
use crate::services::audit::{AuditSink, RequestMeta};

#[derive(Debug, Error)]
pub enum PartyError {
    #[error(transparent)]
    AccessDenied(#[from] AccessDenied),

    #[error("Party not found")]
    NotFound,

    #[error("{0}")]
    InvalidField(&'static str),

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

#[derive(Clone)]
pub struct PartyService {
    store: Store,
    audit: AuditSink,
}

impl PartyService {
    #[must_use]
    pub const fn new(store: Store, audit: AuditSink) -> Self {
        Self { store, audit }
    }

    /// Active parties only; this is the ballot the voter sees.
    pub async fn list_public(&self) -> Result<Vec<parties::Model>, PartyError> {
        Ok(self.store.list_active_parties().await?)
    }

    pub async fn list_all(
        &self,
        identity: &AdminIdentity,
    ) -> Result<Vec<parties::Model>, PartyError> {
        authorize(identity, Capability::SetPartyVisibility)?;
        Ok(self.store.list_all_parties().await?)
    }

    pub async fn create(
        &self,
        identity: &AdminIdentity,
        input: PartyInput,
        meta: &RequestMeta,
    ) -> Result<parties::Model, PartyError> {
        authorize(identity, Capability::ManageParties)?;
        Self::validate(&input)?;

        let party = self.store.create_party(input, identity.id).await?;

        self.audit
            .admin_action(
                identity.id,
                "create_party",
                Some(&party.name_english),
                Some(json!({ "party_id": party.id })),
                meta,
            )
            .await;

        Ok(party)
    }

    pub async fn update(
        &self,
        identity: &AdminIdentity,
        id: i32,
        input: PartyInput,
        meta: &RequestMeta,
    ) -> Result<parties::Model, PartyError> {
        authorize(identity, Capability::ManageParties)?;
        Self::validate(&input)?;

        let party = self
            .store
            .update_party(id, input)
            .await?
            .ok_or(PartyError::NotFound)?;

        self.audit
            .admin_action(
                identity.id,
                "update_party",
                Some(&party.name_english),
                Some(json!({ "party_id": party.id })),
                meta,
            )
            .await;

        Ok(party)
    }

    pub async fn set_visibility(
        &self,
        identity: &AdminIdentity,
        id: i32,
        visible: bool,
        meta: &RequestMeta,
    ) -> Result<(), PartyError> {
        authorize(identity, Capability::SetPartyVisibility)?;

        if !self.store.set_party_active(id, visible).await? {
            return Err(PartyError::NotFound);
        }

        self.audit
            .admin_action(
                identity.id,
                "set_party_visibility",
                None,
                Some(json!({ "party_id": id, "visible": visible })),
                meta,
            )
            .await;

        Ok(())
    }

    pub async fn delete(
        &self,
        identity: &AdminIdentity,
        id: i32,
        meta: &RequestMeta,
    ) -> Result<(), PartyError> {
        authorize(identity, Capability::ManageParties)?;

        if !self.store.delete_party(id).await? {
            return Err(PartyError::NotFound);
        }

        self.audit
            .admin_action(
                identity.id,
                "delete_party",
                None,
                Some(json!({ "party_id": id })),
                meta,
            )
            .await;

        Ok(())
    }

    fn validate(input: &PartyInput) -> Result<(), PartyError> {
        if input.name_english.trim().is_empty() || input.name_amharic.trim().is_empty() {
            return Err(PartyError::InvalidField(
                "Party name is required in both languages",
            ));
        }
        Ok(())
    }
}
