use std::sync::Arc;
use std::time::Duration;

use tokio::sync::RwLock;

use crate::config::Config;
use crate::db::Store;
use crate::services::{
    AdminService, AuditSink, AuthService, ElectionService, PartyService, RegistrationService,
    SystemConfigCache, VoteService,
};

/// Everything the handlers share: the store, the config, and one instance of
/// each domain service wired over them.
#[derive(Clone)]
pub struct SharedState {
    pub config: Arc<RwLock<Config>>,

    pub store: Store,

    pub config_cache: Arc<SystemConfigCache>,

    pub audit: AuditSink,

    pub auth: AuthService,

    pub elections: ElectionService,

    pub votes: VoteService,

    pub registration: RegistrationService,

    pub admins: AdminService,

    pub parties: PartyService,
}

impl SharedState {
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        let store = Store::with_pool_options(
            &config.general.database_path,
            config.general.max_db_connections,
            config.general.min_db_connections,
        )
        .await?;

        Self::with_store(config, store)
    }

    /// Wire the services over an existing store; tests use this with an
    /// in-memory database.
    pub fn with_store(config: Config, store: Store) -> anyhow::Result<Self> {
        let security = config.security.clone();

        let config_cache = Arc::new(SystemConfigCache::new(
            store.clone(),
            Duration::from_secs(security.config_cache_ttl_seconds),
        ));
        let audit = AuditSink::new(store.clone());

        let auth = AuthService::new(
            store.clone(),
            config_cache.clone(),
            audit.clone(),
            security.clone(),
        );
        let elections = ElectionService::new(store.clone(), audit.clone());
        let votes = VoteService::new(store.clone(), audit.clone());
        let registration =
            RegistrationService::new(store.clone(), audit.clone(), security.clone());
        let admins = AdminService::new(store.clone(), audit.clone(), security);
        let parties = PartyService::new(store.clone(), audit.clone());

        Ok(Self {
            config: Arc::new(RwLock::new(config)),
            store,
            config_cache,
            audit,
            auth,
            elections,
            votes,
            registration,
            admins,
            parties,
        })
    }

    pub async fn config(&self) -> Config {
        self.config.read().await.clone()
    }
}
