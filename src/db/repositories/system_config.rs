use anyhow::{Context, Result};
use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set};
use std::collections::HashMap;

use crate::entities::system_config;

pub struct SystemConfigRepository {
    conn: DatabaseConnection,
}

impl SystemConfigRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn load_all(&self) -> Result<HashMap<String, String>> {
        let rows = system_config::Entity::find()
            .all(&self.conn)
            .await
            .context("Failed to load system config")?;

        Ok(rows
            .into_iter()
            .map(|row| (row.config_key, row.config_value))
            .collect())
    }

    pub async fn set(&self, key: &str, value: &str) -> Result<()> {
        let existing = system_config::Entity::find()
            .filter(system_config::Column::ConfigKey.eq(key))
            .one(&self.conn)
            .await
            .context("Failed to query system config key")?;

        if let Some(row) = existing {
            let mut active: system_config::ActiveModel = row.into();
            active.config_value = Set(value.to_string());
            active.update(&self.conn).await?;
        } else {
            let active = system_config::ActiveModel {
                config_key: Set(key.to_string()),
                config_value: Set(value.to_string()),
                ..Default::default()
            };
            active.insert(&self.conn).await?;
        }

        Ok(())
    }
}
