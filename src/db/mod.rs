use anyhow::Result;
use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectOptions, ConnectionTrait, Database, DatabaseConnection,
    EntityTrait, QueryFilter, Set, Statement, TransactionTrait,
};
use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;
use tracing::info;

use crate::config::SecurityConfig;
use crate::entities::{admins, audit_log, election_settings, parties, system_config, voters, votes};
use crate::policy::Role;
use crate::policy::throttle::Transition;

pub mod migrator;
pub mod repositories;

pub use repositories::admin::Admin;
pub use repositories::audit::AuditFilter;
pub use repositories::party::PartyInput;
pub use repositories::vote::{BallotInsert, TallyRow};
pub use repositories::voter::NewVoter;

/// Keys reseeded on install and on full system reset.
pub const DEFAULT_SYSTEM_CONFIG: &[(&str, &str, &str)] = &[
    ("system_name", "Balota", "Name of the voting system"),
    ("version", "1.0.0", "Current system version"),
    (
        "max_login_attempts",
        "5",
        "Maximum failed login attempts before account lock",
    ),
    (
        "lock_duration_minutes",
        "30",
        "Account lock duration in minutes",
    ),
];

#[derive(Clone)]
pub struct Store {
    pub conn: DatabaseConnection,
}

impl Store {
    pub async fn new(db_url: &str) -> Result<Self> {
        Self::with_pool_options(db_url, 5, 1).await
    }

    pub async fn with_pool_options(
        db_url: &str,
        max_connections: u32,
        min_connections: u32,
    ) -> Result<Self> {
        use sea_orm_migration::MigratorTrait;

        let in_memory = db_url.contains(":memory:");
        if !in_memory {
            let path_str = db_url.trim_start_matches("sqlite:");
            if let Some(parent) = Path::new(path_str).parent() {
                tokio::fs::create_dir_all(parent).await.ok();
            }
            if !Path::new(path_str).exists() {
                std::fs::File::create(path_str)?;
            }
        }

        // An in-memory sqlite db exists per connection; pooling would hand
        // out empty databases.
        let (max_connections, min_connections) = if in_memory {
            (1, 1)
        } else {
            (max_connections, min_connections)
        };

        let mut opt = ConnectOptions::new(db_url.to_string());
        opt.max_connections(max_connections)
            .min_connections(min_connections)
            .connect_timeout(Duration::from_secs(10))
            .acquire_timeout(Duration::from_secs(10))
            .idle_timeout(Duration::from_secs(300))
            .max_lifetime(Duration::from_secs(600))
            .sqlx_logging(false);

        let conn = Database::connect(opt).await?;

        migrator::Migrator::up(&conn, None).await?;

        info!(
            "Database connected & migrations applied (pool: {}-{})",
            min_connections, max_connections
        );

        Ok(Self { conn })
    }

    pub async fn ping(&self) -> Result<()> {
        let backend = self.conn.get_database_backend();
        self.conn
            .query_one(Statement::from_string(backend, "SELECT 1".to_string()))
            .await?;
        Ok(())
    }

    fn admin_repo(&self) -> repositories::admin::AdminRepository {
        repositories::admin::AdminRepository::new(self.conn.clone())
    }

    fn voter_repo(&self) -> repositories::voter::VoterRepository {
        repositories::voter::VoterRepository::new(self.conn.clone())
    }

    fn vote_repo(&self) -> repositories::vote::VoteRepository {
        repositories::vote::VoteRepository::new(self.conn.clone())
    }

    fn party_repo(&self) -> repositories::party::PartyRepository {
        repositories::party::PartyRepository::new(self.conn.clone())
    }

    fn settings_repo(&self) -> repositories::settings::SettingsRepository {
        repositories::settings::SettingsRepository::new(self.conn.clone())
    }

    fn system_config_repo(&self) -> repositories::system_config::SystemConfigRepository {
        repositories::system_config::SystemConfigRepository::new(self.conn.clone())
    }

    fn audit_repo(&self) -> repositories::audit::AuditRepository {
        repositories::audit::AuditRepository::new(self.conn.clone())
    }

    // --- admins ---

    pub async fn verify_admin_credentials(
        &self,
        username: &str,
        password: &str,
    ) -> Result<Option<Admin>> {
        self.admin_repo().verify_credentials(username, password).await
    }

    pub async fn get_admin_by_username(&self, username: &str) -> Result<Option<Admin>> {
        self.admin_repo().get_by_username(username).await
    }

    pub async fn get_admin(&self, id: i32) -> Result<Option<Admin>> {
        self.admin_repo().get_by_id(id).await
    }

    pub async fn list_admins(&self) -> Result<Vec<Admin>> {
        self.admin_repo().list().await
    }

    pub async fn admin_username_exists(&self, username: &str) -> Result<bool> {
        self.admin_repo().username_exists(username).await
    }

    pub async fn create_admin(
        &self,
        username: &str,
        password: &str,
        role: Role,
        created_by: i32,
        security: &SecurityConfig,
    ) -> Result<Admin> {
        self.admin_repo()
            .create(username, password, role, created_by, security)
            .await
    }

    pub async fn delete_admin(&self, id: i32) -> Result<bool> {
        self.admin_repo().delete(id).await
    }

    pub async fn set_admin_password(
        &self,
        username: &str,
        new_password: &str,
        security: &SecurityConfig,
    ) -> Result<()> {
        self.admin_repo()
            .set_password(username, new_password, security)
            .await
    }

    // --- voters ---

    pub async fn get_voter_by_fin(&self, fin: &str) -> Result<Option<voters::Model>> {
        self.voter_repo().get_by_fin(fin).await
    }

    pub async fn get_voter(&self, id: i32) -> Result<Option<voters::Model>> {
        self.voter_repo().get_by_id(id).await
    }

    pub async fn voter_fin_exists(&self, fin: &str) -> Result<bool> {
        self.voter_repo().fin_exists(fin).await
    }

    pub async fn voter_phone_exists(&self, phone: &str) -> Result<bool> {
        self.voter_repo().phone_exists(phone).await
    }

    pub async fn create_voter(
        &self,
        input: NewVoter,
        default_password: &str,
        security: &SecurityConfig,
    ) -> Result<voters::Model> {
        self.voter_repo()
            .create(input, default_password, security)
            .await
    }

    pub async fn verify_voter_password(
        &self,
        voter: &voters::Model,
        password: &str,
    ) -> Result<bool> {
        self.voter_repo().verify_password(voter, password).await
    }

    pub async fn apply_login_transition(&self, voter_id: i32, transition: Transition) -> Result<()> {
        self.voter_repo()
            .apply_login_transition(voter_id, transition)
            .await
    }

    pub async fn update_voter_password(
        &self,
        voter_id: i32,
        new_password: &str,
        security: &SecurityConfig,
    ) -> Result<()> {
        self.voter_repo()
            .update_password(voter_id, new_password, security)
            .await
    }

    pub async fn count_active_voters(&self) -> Result<u64> {
        self.voter_repo().count_active().await
    }

    // --- votes ---

    pub async fn has_voted(&self, voter_id: i32) -> Result<bool> {
        self.vote_repo().has_voted(voter_id).await
    }

    pub async fn cast_ballot(
        &self,
        voter_id: i32,
        party_id: i32,
        now: DateTime<Utc>,
    ) -> Result<BallotInsert> {
        self.vote_repo().cast(voter_id, party_id, now).await
    }

    pub async fn tally(&self) -> Result<Vec<TallyRow>> {
        self.vote_repo().tally().await
    }

    pub async fn total_votes(&self) -> Result<u64> {
        self.vote_repo().total().await
    }

    // --- parties ---

    pub async fn get_party(&self, id: i32) -> Result<Option<parties::Model>> {
        self.party_repo().get(id).await
    }

    pub async fn list_active_parties(&self) -> Result<Vec<parties::Model>> {
        self.party_repo().list_active().await
    }

    pub async fn list_all_parties(&self) -> Result<Vec<parties::Model>> {
        self.party_repo().list_all().await
    }

    pub async fn party_is_active(&self, id: i32) -> Result<bool> {
        self.party_repo().is_active(id).await
    }

    pub async fn count_active_parties(&self) -> Result<u64> {
        self.party_repo().count_active().await
    }

    pub async fn create_party(&self, input: PartyInput, created_by: i32) -> Result<parties::Model> {
        self.party_repo().create(input, created_by).await
    }

    pub async fn update_party(&self, id: i32, input: PartyInput) -> Result<Option<parties::Model>> {
        self.party_repo().update(id, input).await
    }

    pub async fn set_party_active(&self, id: i32, is_active: bool) -> Result<bool> {
        self.party_repo().set_active(id, is_active).await
    }

    pub async fn delete_party(&self, id: i32) -> Result<bool> {
        self.party_repo().delete(id).await
    }

    // --- settings ---

    pub async fn election_settings(&self) -> Result<election_settings::Model> {
        self.settings_repo().get().await
    }

    pub async fn set_election_period(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<election_settings::Model> {
        self.settings_repo().set_election_period(start, end).await
    }

    pub async fn clear_election_period(&self) -> Result<election_settings::Model> {
        self.settings_repo().clear_election_period().await
    }

    pub async fn set_registration_period(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<election_settings::Model> {
        self.settings_repo().set_registration_period(start, end).await
    }

    pub async fn clear_registration_period(&self) -> Result<election_settings::Model> {
        self.settings_repo().clear_registration_period().await
    }

    pub async fn set_registration_flag(&self, open: bool) -> Result<election_settings::Model> {
        self.settings_repo().set_registration_flag(open).await
    }

    // --- system config ---

    pub async fn load_system_config(&self) -> Result<HashMap<String, String>> {
        self.system_config_repo().load_all().await
    }

    pub async fn set_system_config(&self, key: &str, value: &str) -> Result<()> {
        self.system_config_repo().set(key, value).await
    }

    // --- audit ---

    pub async fn record_admin_action(
        &self,
        admin_id: i32,
        action: &str,
        target: Option<&str>,
        details: Option<String>,
        ip_address: Option<String>,
        user_agent: Option<String>,
    ) -> Result<()> {
        self.audit_repo()
            .record_admin_action(admin_id, action, target, details, ip_address, user_agent)
            .await
    }

    pub async fn record_voter_activity(
        &self,
        voter_id: i32,
        action: &str,
        details: Option<String>,
        ip_address: Option<String>,
        user_agent: Option<String>,
    ) -> Result<()> {
        self.audit_repo()
            .record_voter_activity(voter_id, action, details, ip_address, user_agent)
            .await
    }

    pub async fn query_audit(&self, filter: AuditFilter) -> Result<Vec<audit_log::Model>> {
        self.audit_repo().query(filter).await
    }

    /// Irreversible full reset, in one transaction: every table is cleared
    /// except the bootstrap admin row, then the settings singleton and the
    /// default config keys are reseeded. Any failure rolls the whole thing
    /// back.
    pub async fn reset_system(&self) -> Result<()> {
        self.conn
            .transaction::<_, (), sea_orm::DbErr>(|txn| {
                Box::pin(async move {
                    votes::Entity::delete_many().exec(txn).await?;
                    crate::entities::activity_log::Entity::delete_many()
                        .exec(txn)
                        .await?;
                    voters::Entity::delete_many().exec(txn).await?;
                    parties::Entity::delete_many().exec(txn).await?;
                    audit_log::Entity::delete_many().exec(txn).await?;
                    admins::Entity::delete_many()
                        .filter(admins::Column::IsBootstrap.eq(false))
                        .exec(txn)
                        .await?;

                    let settings = election_settings::Entity::find_by_id(1)
                        .one(txn)
                        .await?
                        .ok_or_else(|| {
                            sea_orm::DbErr::Custom("Election settings row is missing".to_string())
                        })?;
                    let mut active: election_settings::ActiveModel = settings.into();
                    active.registration_open = Set(true);
                    active.registration_start_date = Set(None);
                    active.registration_end_date = Set(None);
                    active.election_start_date = Set(None);
                    active.election_end_date = Set(None);
                    active.update(txn).await?;

                    system_config::Entity::delete_many().exec(txn).await?;
                    for (key, value, description) in DEFAULT_SYSTEM_CONFIG {
                        let row = system_config::ActiveModel {
                            config_key: Set((*key).to_string()),
                            config_value: Set((*value).to_string()),
                            description: Set(Some((*description).to_string())),
                            ..Default::default()
                        };
                        row.insert(txn).await?;
                    }

                    Ok(())
                })
            })
            .await
            .map_err(|e| anyhow::anyhow!("System reset failed: {e}"))?;

        Ok(())
    }
}
