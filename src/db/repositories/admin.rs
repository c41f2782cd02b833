use anyhow::{Context, Result};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
};

use super::{hash_password_blocking, verify_password_blocking};
use crate::config::SecurityConfig;
use crate::entities::admins;
use crate::policy::{AdminIdentity, Role};

/// Admin row without the password hash.
#[derive(Debug, Clone)]
pub struct Admin {
    pub id: i32,
    pub username: String,
    pub role: Role,
    pub is_bootstrap: bool,
    pub is_active: bool,
    pub created_by: Option<i32>,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

impl Admin {
    #[must_use]
    pub const fn identity(&self) -> AdminIdentity {
        AdminIdentity {
            id: self.id,
            role: self.role,
            is_bootstrap: self.is_bootstrap,
        }
    }
}

impl TryFrom<admins::Model> for Admin {
    type Error = anyhow::Error;

    fn try_from(model: admins::Model) -> Result<Self> {
        let role = Role::parse(&model.role)
            .ok_or_else(|| anyhow::anyhow!("Unknown admin role: {}", model.role))?;
        Ok(Self {
            id: model.id,
            username: model.username,
            role,
            is_bootstrap: model.is_bootstrap,
            is_active: model.is_active,
            created_by: model.created_by,
            created_at: model.created_at,
        })
    }
}

pub struct AdminRepository {
    conn: DatabaseConnection,
}

impl AdminRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn get_by_username(&self, username: &str) -> Result<Option<Admin>> {
        let admin = admins::Entity::find()
            .filter(admins::Column::Username.eq(username))
            .one(&self.conn)
            .await
            .context("Failed to query admin by username")?;

        admin.map(Admin::try_from).transpose()
    }

    pub async fn get_by_id(&self, id: i32) -> Result<Option<Admin>> {
        let admin = admins::Entity::find_by_id(id)
            .one(&self.conn)
            .await
            .context("Failed to query admin by id")?;

        admin.map(Admin::try_from).transpose()
    }

    pub async fn list(&self) -> Result<Vec<Admin>> {
        let rows = admins::Entity::find()
            .order_by_desc(admins::Column::CreatedAt)
            .all(&self.conn)
            .await
            .context("Failed to list admins")?;

        rows.into_iter().map(Admin::try_from).collect()
    }

    /// Verify credentials; returns the admin only on an active account with a
    /// matching password.
    pub async fn verify_credentials(&self, username: &str, password: &str) -> Result<Option<Admin>> {
        let admin = admins::Entity::find()
            .filter(admins::Column::Username.eq(username))
            .one(&self.conn)
            .await
            .context("Failed to query admin for credential check")?;

        let Some(admin) = admin else {
            return Ok(None);
        };

        if !admin.is_active {
            return Ok(None);
        }

        if verify_password_blocking(password, &admin.password_hash).await? {
            Ok(Some(Admin::try_from(admin)?))
        } else {
            Ok(None)
        }
    }

    pub async fn username_exists(&self, username: &str) -> Result<bool> {
        Ok(self.get_by_username(username).await?.is_some())
    }

    pub async fn create(
        &self,
        username: &str,
        password: &str,
        role: Role,
        created_by: i32,
        security: &SecurityConfig,
    ) -> Result<Admin> {
        let password_hash = hash_password_blocking(password, Some(security)).await?;

        let model = admins::ActiveModel {
            username: Set(username.to_string()),
            password_hash: Set(password_hash),
            role: Set(role.as_str().to_string()),
            is_bootstrap: Set(false),
            is_active: Set(true),
            created_by: Set(Some(created_by)),
            created_at: Set(chrono::Utc::now()),
            ..Default::default()
        };

        let inserted = model
            .insert(&self.conn)
            .await
            .context("Failed to insert admin")?;

        Admin::try_from(inserted)
    }

    pub async fn delete(&self, id: i32) -> Result<bool> {
        let result = admins::Entity::delete_by_id(id)
            .exec(&self.conn)
            .await
            .context("Failed to delete admin")?;

        Ok(result.rows_affected > 0)
    }

    pub async fn set_password(
        &self,
        username: &str,
        new_password: &str,
        security: &SecurityConfig,
    ) -> Result<()> {
        let admin = admins::Entity::find()
            .filter(admins::Column::Username.eq(username))
            .one(&self.conn)
            .await
            .context("Failed to query admin for password update")?
            .ok_or_else(|| anyhow::anyhow!("Admin not found: {username}"))?;

        let password_hash = hash_password_blocking(new_password, Some(security)).await?;

        let mut active: admins::ActiveModel = admin.into();
        active.password_hash = Set(password_hash);
        active.update(&self.conn).await?;

        Ok(())
    }
}
