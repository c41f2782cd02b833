use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    Set,
};

use super::{hash_password_blocking, verify_password_blocking};
use crate::config::SecurityConfig;
use crate::entities::voters;
use crate::policy::throttle::Transition;

/// Registration input, validated by the service layer before it gets here.
#[derive(Debug, Clone)]
pub struct NewVoter {
    pub full_name: String,
    pub age: i32,
    pub sex: String,
    pub region: String,
    pub zone: String,
    pub woreda: String,
    pub kebele: String,
    pub fin: String,
    pub phone: Option<String>,
    pub created_by: i32,
}

pub struct VoterRepository {
    conn: DatabaseConnection,
}

impl VoterRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn get_by_fin(&self, fin: &str) -> Result<Option<voters::Model>> {
        voters::Entity::find()
            .filter(voters::Column::Fin.eq(fin))
            .one(&self.conn)
            .await
            .context("Failed to query voter by FIN")
    }

    pub async fn get_by_id(&self, id: i32) -> Result<Option<voters::Model>> {
        voters::Entity::find_by_id(id)
            .one(&self.conn)
            .await
            .context("Failed to query voter by id")
    }

    pub async fn fin_exists(&self, fin: &str) -> Result<bool> {
        Ok(self.get_by_fin(fin).await?.is_some())
    }

    pub async fn phone_exists(&self, phone: &str) -> Result<bool> {
        let count = voters::Entity::find()
            .filter(voters::Column::Phone.eq(phone))
            .count(&self.conn)
            .await
            .context("Failed to query voter by phone")?;

        Ok(count > 0)
    }

    /// Provision a voter with the hashed default secret.
    pub async fn create(
        &self,
        input: NewVoter,
        default_password: &str,
        security: &SecurityConfig,
    ) -> Result<voters::Model> {
        let password_hash = hash_password_blocking(default_password, Some(security)).await?;

        let model = voters::ActiveModel {
            full_name: Set(input.full_name),
            age: Set(input.age),
            sex: Set(input.sex),
            region: Set(input.region),
            zone: Set(input.zone),
            woreda: Set(input.woreda),
            kebele: Set(input.kebele),
            fin: Set(input.fin),
            phone: Set(input.phone),
            password_hash: Set(password_hash),
            has_changed_password: Set(false),
            login_attempts: Set(0),
            locked_until: Set(None),
            is_active: Set(true),
            created_by: Set(input.created_by),
            created_at: Set(Utc::now()),
            ..Default::default()
        };

        model
            .insert(&self.conn)
            .await
            .context("Failed to insert voter")
    }

    pub async fn verify_password(&self, voter: &voters::Model, password: &str) -> Result<bool> {
        verify_password_blocking(password, &voter.password_hash).await
    }

    /// Persist the throttle state change decided by the policy layer.
    ///
    /// Written as a single UPDATE so concurrent failed attempts each count:
    /// the increment happens database-side instead of rewriting a counter
    /// value computed from an earlier read.
    pub async fn apply_login_transition(&self, voter_id: i32, transition: Transition) -> Result<()> {
        let update = voters::Entity::update_many().filter(voters::Column::Id.eq(voter_id));

        let update = match transition {
            Transition::Reset => update
                .col_expr(voters::Column::LoginAttempts, Expr::value(0))
                .col_expr(
                    voters::Column::LockedUntil,
                    Expr::value(Option::<DateTime<Utc>>::None),
                ),
            Transition::IncrementAttempts => update.col_expr(
                voters::Column::LoginAttempts,
                Expr::col(voters::Column::LoginAttempts).add(1),
            ),
            Transition::Lock(unlock_at) => update
                .col_expr(voters::Column::LoginAttempts, Expr::value(0))
                .col_expr(voters::Column::LockedUntil, Expr::value(unlock_at)),
            Transition::None => return Ok(()),
        };

        update
            .exec(&self.conn)
            .await
            .context("Failed to persist login throttle state")?;

        Ok(())
    }

    pub async fn update_password(
        &self,
        voter_id: i32,
        new_password: &str,
        security: &SecurityConfig,
    ) -> Result<()> {
        let voter = voters::Entity::find_by_id(voter_id)
            .one(&self.conn)
            .await
            .context("Failed to query voter for password update")?
            .ok_or_else(|| anyhow::anyhow!("Voter not found: {voter_id}"))?;

        let password_hash = hash_password_blocking(new_password, Some(security)).await?;

        let mut active: voters::ActiveModel = voter.into();
        active.password_hash = Set(password_hash);
        active.has_changed_password = Set(true);
        active.update(&self.conn).await?;

        Ok(())
    }

    pub async fn count_active(&self) -> Result<u64> {
        voters::Entity::find()
            .filter(voters::Column::IsActive.eq(true))
            .count(&self.conn)
            .await
            .context("Failed to count active voters")
    }
}
