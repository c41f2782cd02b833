//! TTL-cached view of the `system_config` table.
//!
//! The cache is process-local and deliberately lock-light: reads inside the
//! TTL may be stale, which is an accepted tolerance, and concurrent refreshes
//! all converge on the same final contents (each replaces the whole map).

use std::collections::HashMap;
use std::time::{Duration, Instant};

use anyhow::Result;
use tokio::sync::RwLock;
use tracing::warn;

use crate::db::Store;
use crate::policy::ThrottlePolicy;

struct CacheInner {
    values: HashMap<String, String>,
    loaded_at: Option<Instant>,
}

pub struct SystemConfigCache {
    store: Store,
    ttl: Duration,
    inner: RwLock<CacheInner>,
}

impl SystemConfigCache {
    #[must_use]
    pub fn new(store: Store, ttl: Duration) -> Self {
        Self {
            store,
            ttl,
            inner: RwLock::new(CacheInner {
                values: HashMap::new(),
                loaded_at: None,
            }),
        }
    }

    /// Reload the whole table. Idempotent; safe to trigger concurrently.
    pub async fn refresh(&self) -> Result<()> {
        let values = self.store.load_system_config().await?;
        let mut inner = self.inner.write().await;
        inner.values = values;
        inner.loaded_at = Some(Instant::now());
        Ok(())
    }

    pub async fn get(&self, key: &str) -> Option<String> {
        if self.is_stale().await
            && let Err(err) = self.refresh().await
        {
            // Serve whatever is cached; a failed refresh must not take the
            // login path down.
            warn!("Failed to refresh system config cache: {err:#}");
        }

        self.inner.read().await.values.get(key).cloned()
    }

    async fn is_stale(&self) -> bool {
        let inner = self.inner.read().await;
        inner
            .loaded_at
            .is_none_or(|loaded_at| loaded_at.elapsed() > self.ttl)
    }

    async fn get_parsed<T: std::str::FromStr>(&self, key: &str, default: T) -> T {
        self.get(key)
            .await
            .and_then(|raw| raw.parse().ok())
            .unwrap_or(default)
    }

    /// Throttle parameters for voter logins, with the documented defaults
    /// when the keys are absent or unparseable.
    pub async fn throttle_policy(&self) -> ThrottlePolicy {
        ThrottlePolicy {
            max_attempts: self.get_parsed("max_login_attempts", 5).await,
            lock_minutes: self.get_parsed("lock_duration_minutes", 30).await,
        }
    }
}
