//! Configuration module for coindrop-server.
//!
//! Handles loading configuration from the TOML file, CLI arguments, and
//! environment variables. Also handles admin secret hashing: a plaintext
//! secret is argon2-hashed on first load and the file rewritten, so the
//! plaintext never stays on disk.

pub mod file;

use crate::config::file::FileConfig;
use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use std::net::SocketAddr;
use std::path::Path;
use thiserror::Error;

/// Errors that can occur during configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("password hashing error: {0}")]
    Hash(String),

    #[error("DATABASE_URL environment variable not set")]
    MissingDatabaseUrl,
}

/// Validated configuration the server runs with. Reloadable via SIGHUP.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub listen: SocketAddr,
    pub admin_secret_hash: String,
}

/// Configuration loader that handles the complete loading process.
pub struct ConfigLoader {
    config_path: std::path::PathBuf,
    listen_override: Option<SocketAddr>,
}

impl ConfigLoader {
    pub fn new(config_path: impl AsRef<Path>, listen_override: Option<SocketAddr>) -> Self {
        Self {
            config_path: config_path.as_ref().to_path_buf(),
            listen_override,
        }
    }

    /// Load and process the configuration.
    ///
    /// Hashes a plaintext admin secret and rewrites the file before
    /// returning, so the runtime only ever sees the hash.
    pub fn load(&self) -> Result<RuntimeConfig, ConfigError> {
        let raw = std::fs::read_to_string(&self.config_path)?;
        let mut config: FileConfig = toml::from_str(&raw)?;

        if !config.is_admin_secret_hashed() {
            config.admin.secret = hash_admin_secret(&config.admin.secret)?;
            let serialized = toml::to_string_pretty(&config)?;
            std::fs::write(&self.config_path, serialized)?;
            tracing::info!("Hashed plaintext admin secret and rewrote config file");
        }

        Ok(RuntimeConfig {
            listen: self.listen_override.unwrap_or(config.server.listen),
            admin_secret_hash: config.admin.secret,
        })
    }

    /// Reload after SIGHUP. Same processing as the initial load.
    pub fn reload(&self) -> Result<RuntimeConfig, ConfigError> {
        self.load()
    }
}

/// Get the database URL from the environment.
pub fn get_database_url() -> Result<String, ConfigError> {
    std::env::var("DATABASE_URL").map_err(|_| ConfigError::MissingDatabaseUrl)
}

fn hash_admin_secret(secret: &str) -> Result<String, ConfigError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(secret.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| ConfigError::Hash(e.to_string()))
}

/// Verify a presented admin secret against the stored argon2 hash.
pub fn verify_admin_secret(candidate: &str, stored_hash: &str) -> bool {
    PasswordHash::new(stored_hash)
        .map(|parsed| {
            Argon2::default()
                .verify_password(candidate.as_bytes(), &parsed)
                .is_ok()
        })
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_and_verify_roundtrip() {
        let hash = hash_admin_secret("hunter2").unwrap();
        assert!(hash.starts_with("$argon2"));
        assert!(verify_admin_secret("hunter2", &hash));
        assert!(!verify_admin_secret("hunter3", &hash));
    }

    #[test]
    fn test_verify_rejects_garbage_hash() {
        assert!(!verify_admin_secret("hunter2", "not-a-hash"));
    }
}
