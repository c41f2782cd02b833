//! Per-aggregate repositories over the shared `DatabaseConnection`.

pub mod admin;
pub mod audit;
pub mod party;
pub mod settings;
pub mod system_config;
pub mod vote;
pub mod voter;

use anyhow::Result;
use argon2::{
    Algorithm, Argon2, Params, Version,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use tokio::task;

use crate::config::SecurityConfig;

/// Hash a password using Argon2id with optional custom params.
/// If config is None, uses default params.
pub fn hash_password(password: &str, config: Option<&SecurityConfig>) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);

    let argon2 = if let Some(cfg) = config {
        let params = Params::new(
            cfg.argon2_memory_cost_kib,
            cfg.argon2_time_cost,
            cfg.argon2_parallelism,
            None,
        )
        .map_err(|e| anyhow::anyhow!("Invalid Argon2 params: {e}"))?;
        Argon2::new(Algorithm::Argon2id, Version::V0x13, params)
    } else {
        Argon2::default()
    };

    let hash = argon2
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| anyhow::anyhow!("Failed to hash password: {e}"))?;

    Ok(hash.to_string())
}

/// Hash on a blocking task; Argon2 is CPU-intensive and would stall the
/// async runtime if run inline.
pub async fn hash_password_blocking(
    password: &str,
    config: Option<&SecurityConfig>,
) -> Result<String> {
    let password = password.to_string();
    let config = config.cloned();
    task::spawn_blocking(move || hash_password(&password, config.as_ref()))
        .await
        .map_err(|e| anyhow::anyhow!("Password hashing task panicked: {e}"))?
}

/// Verify a password against a stored hash on a blocking task.
pub async fn verify_password_blocking(password: &str, password_hash: &str) -> Result<bool> {
    let password = password.to_string();
    let password_hash = password_hash.to_string();

    task::spawn_blocking(move || {
        let parsed_hash = PasswordHash::new(&password_hash)
            .map_err(|e| anyhow::anyhow!("Invalid password hash format: {e}"))?;

        let argon2 = Argon2::default();
        Ok::<bool, anyhow::Error>(
            argon2
                .verify_password(password.as_bytes(), &parsed_hash)
                .is_ok(),
        )
    })
    .await
    .map_err(|e| anyhow::anyhow!("Password verification task panicked: {e}"))?
}
