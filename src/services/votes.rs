//! Ballot casting and results.
//!
//! The single-vote guarantee does not live here: the database enforces it
//! with a unique index on the voter column, and this layer only translates
//! the conflict into a stable outcome.

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::json;
use thiserror::Error;

use crate::db::{BallotInsert, Store, TallyRow};
use crate::policy::window;
use crate::services::audit::{AuditSink, RequestMeta};

#[derive(Debug, Error)]
pub enum VoteError {
    #[error("Unknown or inactive party")]
    UnknownParty,

    #[error("The provisioned default password must be changed before voting")]
    PasswordNotChanged,

    #[error("Unknown voter")]
    UnknownVoter,

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

/// What happened to a cast attempt; all three are ordinary outcomes, not
/// transport failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CastOutcome {
    Accepted { cast_at: DateTime<Utc> },
    AlreadyVoted,
    WindowClosed,
}

#[derive(Debug, Clone, Serialize)]
pub struct ResultsSummary {
    pub total_votes: u64,
    pub registered_voters: u64,
    pub tally: Vec<TallyRow>,
}

#[derive(Clone)]
pub struct VoteService {
    store: Store,
    audit: AuditSink,
}

impl VoteService {
    #[must_use]
    pub const fn new(store: Store, audit: AuditSink) -> Self {
        Self { store, audit }
    }

    pub async fn cast(
        &self,
        voter_id: i32,
        party_id: i32,
        meta: &RequestMeta,
    ) -> Result<CastOutcome, VoteError> {
        let now = Utc::now();

        let settings = self.store.election_settings().await?;
        if !window::election_open(now, settings.election_start_date, settings.election_end_date) {
            return Ok(CastOutcome::WindowClosed);
        }

        // Provisioned accounts must rotate the default secret before the
        // ballot is reachable.
        let voter = self
            .store
            .get_voter(voter_id)
            .await?
            .ok_or(VoteError::UnknownVoter)?;
        if !voter.has_changed_password {
            return Err(VoteError::PasswordNotChanged);
        }

        if !self.store.party_is_active(party_id).await? {
            return Err(VoteError::UnknownParty);
        }

        match self.store.cast_ballot(voter_id, party_id, now).await? {
            BallotInsert::Inserted => {
                self.audit
                    .voter_activity(
                        voter_id,
                        "vote_cast",
                        Some(json!({ "party_id": party_id })),
                        meta,
                    )
                    .await;
                Ok(CastOutcome::Accepted { cast_at: now })
            }
            BallotInsert::Duplicate => Ok(CastOutcome::AlreadyVoted),
        }
    }

    pub async fn has_voted(&self, voter_id: i32) -> Result<bool, VoteError> {
        Ok(self.store.has_voted(voter_id).await?)
    }

    pub async fn results(&self) -> Result<ResultsSummary, VoteError> {
        Ok(ResultsSummary {
            total_votes: self.store.total_votes().await?,
            registered_voters: self.store.count_active_voters().await?,
            tally: self.store.tally().await?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    use crate::config::SecurityConfig;
    use crate::db::{NewVoter, PartyInput};

    async fn setup() -> (Store, VoteService, i32, i32) {
        let store = Store::new("sqlite::memory:").await.unwrap();
        let audit = AuditSink::new(store.clone());
        let svc = VoteService::new(store.clone(), audit);

        let party = store
            .create_party(
                PartyInput {
                    name_english: "Unity Party".to_string(),
                    name_amharic: "አንድነት ፓርቲ".to_string(),
                    leader_name_english: Some("A. Leader".to_string()),
                    leader_name_amharic: None,
                    ideology: None,
                    description_english: None,
                    description_amharic: None,
                    logo_url: None,
                    leader_image_url: None,
                },
                1,
            )
            .await
            .unwrap();

        let voter = store
            .create_voter(
                NewVoter {
                    full_name: "Test Voter".to_string(),
                    age: 25,
                    sex: "M".to_string(),
                    region: "Oromia".to_string(),
                    zone: "East Shewa".to_string(),
                    woreda: "Adama".to_string(),
                    kebele: "05".to_string(),
                    fin: "1111-2222-3333".to_string(),
                    phone: None,
                    created_by: 1,
                },
                "default123",
                &SecurityConfig::default(),
            )
            .await
            .unwrap();

        store
            .update_voter_password(voter.id, "rotated-pass", &SecurityConfig::default())
            .await
            .unwrap();

        (store, svc, voter.id, party.id)
    }

    async fn open_election(store: &Store) {
        let now = Utc::now();
        store
            .set_election_period(now - Duration::hours(1), now + Duration::hours(1))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_cast_refused_outside_window() {
        let (_store, svc, voter_id, party_id) = setup().await;
        let meta = RequestMeta::default();

        let outcome = svc.cast(voter_id, party_id, &meta).await.unwrap();
        assert_eq!(outcome, CastOutcome::WindowClosed);
    }

    #[tokio::test]
    async fn test_second_cast_reports_already_voted() {
        let (store, svc, voter_id, party_id) = setup().await;
        let meta = RequestMeta::default();
        open_election(&store).await;

        assert!(matches!(
            svc.cast(voter_id, party_id, &meta).await.unwrap(),
            CastOutcome::Accepted { .. }
        ));
        assert_eq!(
            svc.cast(voter_id, party_id, &meta).await.unwrap(),
            CastOutcome::AlreadyVoted
        );
        assert!(svc.has_voted(voter_id).await.unwrap());

        let summary = svc.results().await.unwrap();
        assert_eq!(summary.total_votes, 1);
        assert_eq!(summary.tally[0].votes, 1);
    }

    #[tokio::test]
    async fn test_default_secret_blocks_voting() {
        let (store, svc, _voter_id, party_id) = setup().await;
        let meta = RequestMeta::default();
        open_election(&store).await;

        let fresh = store
            .create_voter(
                NewVoter {
                    full_name: "Second Voter".to_string(),
                    age: 40,
                    sex: "F".to_string(),
                    region: "Sidama".to_string(),
                    zone: "Central".to_string(),
                    woreda: "Hawassa".to_string(),
                    kebele: "01".to_string(),
                    fin: "4444-5555-6666".to_string(),
                    phone: None,
                    created_by: 1,
                },
                "default123",
                &SecurityConfig::default(),
            )
            .await
            .unwrap();

        let err = svc.cast(fresh.id, party_id, &meta).await.unwrap_err();
        assert!(matches!(err, VoteError::PasswordNotChanged));
    }

    #[tokio::test]
    async fn test_inactive_party_rejected() {
        let (store, svc, voter_id, party_id) = setup().await;
        let meta = RequestMeta::default();
        open_election(&store).await;

        store.set_party_active(party_id, false).await.unwrap();
        let err = svc.cast(voter_id, party_id, &meta).await.unwrap_err();
        assert!(matches!(err, VoteError::UnknownParty));
    }
}
