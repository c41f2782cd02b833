use anyhow::{Context, Result};
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set,
};

use crate::entities::parties;

/// Party fields as supplied by the admin UI.
#[derive(Debug, Clone)]
pub struct PartyInput {
    pub name_english: String,
    pub name_amharic: String,
    pub leader_name_english: Option<String>,
    pub leader_name_amharic: Option<String>,
    pub ideology: Option<String>,
    pub description_english: Option<String>,
    pub description_amharic: Option<String>,
    pub logo_url: Option<String>,
    pub leader_image_url: Option<String>,
}

pub struct PartyRepository {
    conn: DatabaseConnection,
}

impl PartyRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn get(&self, id: i32) -> Result<Option<parties::Model>> {
        parties::Entity::find_by_id(id)
            .one(&self.conn)
            .await
            .context("Failed to query party")
    }

    pub async fn list_active(&self) -> Result<Vec<parties::Model>> {
        parties::Entity::find()
            .filter(parties::Column::IsActive.eq(true))
            .order_by_asc(parties::Column::NameEnglish)
            .all(&self.conn)
            .await
            .context("Failed to list active parties")
    }

    pub async fn list_all(&self) -> Result<Vec<parties::Model>> {
        parties::Entity::find()
            .order_by_desc(parties::Column::CreatedAt)
            .all(&self.conn)
            .await
            .context("Failed to list parties")
    }

    pub async fn is_active(&self, id: i32) -> Result<bool> {
        let count = parties::Entity::find()
            .filter(parties::Column::Id.eq(id))
            .filter(parties::Column::IsActive.eq(true))
            .count(&self.conn)
            .await
            .context("Failed to check party visibility")?;

        Ok(count > 0)
    }

    pub async fn count_active(&self) -> Result<u64> {
        parties::Entity::find()
            .filter(parties::Column::IsActive.eq(true))
            .count(&self.conn)
            .await
            .context("Failed to count active parties")
    }

    pub async fn create(&self, input: PartyInput, created_by: i32) -> Result<parties::Model> {
        let now = Utc::now();
        let model = parties::ActiveModel {
            name_english: Set(input.name_english),
            name_amharic: Set(input.name_amharic),
            leader_name_english: Set(input.leader_name_english),
            leader_name_amharic: Set(input.leader_name_amharic),
            ideology: Set(input.ideology),
            description_english: Set(input.description_english),
            description_amharic: Set(input.description_amharic),
            logo_url: Set(input.logo_url),
            leader_image_url: Set(input.leader_image_url),
            is_active: Set(true),
            created_by: Set(created_by),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };

        model
            .insert(&self.conn)
            .await
            .context("Failed to insert party")
    }

    pub async fn update(&self, id: i32, input: PartyInput) -> Result<Option<parties::Model>> {
        let Some(party) = self.get(id).await? else {
            return Ok(None);
        };

        let mut active: parties::ActiveModel = party.into();
        active.name_english = Set(input.name_english);
        active.name_amharic = Set(input.name_amharic);
        active.leader_name_english = Set(input.leader_name_english);
        active.leader_name_amharic = Set(input.leader_name_amharic);
        active.ideology = Set(input.ideology);
        active.description_english = Set(input.description_english);
        active.description_amharic = Set(input.description_amharic);
        active.logo_url = Set(input.logo_url);
        active.leader_image_url = Set(input.leader_image_url);
        active.updated_at = Set(Utc::now());

        let updated = active
            .update(&self.conn)
            .await
            .context("Failed to update party")?;

        Ok(Some(updated))
    }

    pub async fn set_active(&self, id: i32, is_active: bool) -> Result<bool> {
        let Some(party) = self.get(id).await? else {
            return Ok(false);
        };

        let mut active: parties::ActiveModel = party.into();
        active.is_active = Set(is_active);
        active.updated_at = Set(Utc::now());
        active
            .update(&self.conn)
            .await
            .context("Failed to update party visibility")?;

        Ok(true)
    }

    pub async fn delete(&self, id: i32) -> Result<bool> {
        let result = parties::Entity::delete_by_id(id)
            .exec(&self.conn)
            .await
            .context("Failed to delete party")?;

        Ok(result.rows_affected > 0)
    }
}
