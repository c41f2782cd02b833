use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use sea_orm::sea_query::OnConflict;
use sea_orm::{
    ColumnTrait, DatabaseConnection, DbErr, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect, Set,
};

use crate::entities::{parties, votes};

/// Result of the conditional ballot insert.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BallotInsert {
    Inserted,
    /// A row for this voter already existed (pre-check or unique violation).
    Duplicate,
}

/// Per-party tally row.
#[derive(Debug, Clone, serde::Serialize)]
pub struct TallyRow {
    pub party_id: i32,
    pub party_name: String,
    pub votes: i64,
}

pub struct VoteRepository {
    conn: DatabaseConnection,
}

impl VoteRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn has_voted(&self, voter_id: i32) -> Result<bool> {
        let count = votes::Entity::find()
            .filter(votes::Column::VoterId.eq(voter_id))
            .count(&self.conn)
            .await
            .context("Failed to query existing ballot")?;

        Ok(count > 0)
    }

    /// Insert the ballot with ON CONFLICT DO NOTHING on `voter_id`.
    ///
    /// The unique index makes this a single atomic conditional write, so two
    /// concurrent casts for the same voter cannot both land; the loser sees
    /// `Duplicate` instead of a second row.
    pub async fn cast(
        &self,
        voter_id: i32,
        party_id: i32,
        now: DateTime<Utc>,
    ) -> Result<BallotInsert> {
        if self.has_voted(voter_id).await? {
            return Ok(BallotInsert::Duplicate);
        }

        let ballot = votes::ActiveModel {
            voter_id: Set(voter_id),
            party_id: Set(party_id),
            cast_at: Set(now),
            ..Default::default()
        };

        let result = votes::Entity::insert(ballot)
            .on_conflict(
                OnConflict::column(votes::Column::VoterId)
                    .do_nothing()
                    .to_owned(),
            )
            .exec(&self.conn)
            .await;

        match result {
            Ok(_) => Ok(BallotInsert::Inserted),
            Err(DbErr::RecordNotInserted) => Ok(BallotInsert::Duplicate),
            Err(err) => Err(err).context("Failed to insert ballot"),
        }
    }

    /// Votes per party, joined with party names, ordered by count.
    pub async fn tally(&self) -> Result<Vec<TallyRow>> {
        let rows: Vec<(i32, i64)> = votes::Entity::find()
            .select_only()
            .column(votes::Column::PartyId)
            .column_as(votes::Column::Id.count(), "votes")
            .group_by(votes::Column::PartyId)
            .into_tuple()
            .all(&self.conn)
            .await
            .context("Failed to tally votes")?;

        let party_names: Vec<(i32, String)> = parties::Entity::find()
            .select_only()
            .column(parties::Column::Id)
            .column(parties::Column::NameEnglish)
            .order_by_asc(parties::Column::NameEnglish)
            .into_tuple()
            .all(&self.conn)
            .await
            .context("Failed to load party names for tally")?;

        let mut tally: Vec<TallyRow> = party_names
            .into_iter()
            .map(|(party_id, party_name)| TallyRow {
                party_id,
                party_name,
                votes: rows
                    .iter()
                    .find(|(id, _)| *id == party_id)
                    .map_or(0, |(_, count)| *count),
            })
            .collect();

        tally.sort_by(|a, b| b.votes.cmp(&a.votes));
        Ok(tally)
    }

    pub async fn total(&self) -> Result<u64> {
        votes::Entity::find()
            .count(&self.conn)
            .await
            .context("Failed to count ballots")
    }
}
