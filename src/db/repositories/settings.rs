use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use sea_orm::{ActiveModelTrait, DatabaseConnection, EntityTrait, Set};

use crate::entities::election_settings;

/// The settings singleton lives at this id, seeded by the initial migration.
const SETTINGS_ID: i32 = 1;

pub struct SettingsRepository {
    conn: DatabaseConnection,
}

impl SettingsRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn get(&self) -> Result<election_settings::Model> {
        election_settings::Entity::find_by_id(SETTINGS_ID)
            .one(&self.conn)
            .await
            .context("Failed to query election settings")?
            .ok_or_else(|| anyhow::anyhow!("Election settings row is missing"))
    }

    pub async fn set_election_period(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<election_settings::Model> {
        let mut active: election_settings::ActiveModel = self.get().await?.into();
        active.election_start_date = Set(Some(start));
        active.election_end_date = Set(Some(end));
        active
            .update(&self.conn)
            .await
            .context("Failed to set election period")
    }

    /// Null dates mean closed; there is no separate boolean for elections.
    pub async fn clear_election_period(&self) -> Result<election_settings::Model> {
        let mut active: election_settings::ActiveModel = self.get().await?.into();
        active.election_start_date = Set(None);
        active.election_end_date = Set(None);
        active
            .update(&self.conn)
            .await
            .context("Failed to clear election period")
    }

    pub async fn set_registration_period(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<election_settings::Model> {
        let mut active: election_settings::ActiveModel = self.get().await?.into();
        active.registration_start_date = Set(Some(start));
        active.registration_end_date = Set(Some(end));
        active
            .update(&self.conn)
            .await
            .context("Failed to set registration period")
    }

    /// Clears the scheduled dates only; the explicit flag is untouched.
    pub async fn clear_registration_period(&self) -> Result<election_settings::Model> {
        let mut active: election_settings::ActiveModel = self.get().await?.into();
        active.registration_start_date = Set(None);
        active.registration_end_date = Set(None);
        active
            .update(&self.conn)
            .await
            .context("Failed to clear registration period")
    }

    pub async fn set_registration_flag(&self, open: bool) -> Result<election_settings::Model> {
        let mut active: election_settings::ActiveModel = self.get().await?.into();
        active.registration_open = Set(open);
        active
            .update(&self.conn)
            .await
            .context("Failed to set registration flag")
    }
}
