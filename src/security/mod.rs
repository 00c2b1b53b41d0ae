//! Security module for password hashing

mod hashing;

use crate::config::AppConfig;
use crate::db::sqlite::SqliteDb;
use crate::error::{AppError, Result};
use base64::Engine;

pub use hashing::{CredentialHasher, PEPPER_LEN};

/// Settings key holding the generated pepper
const PEPPER_SETTING: &str = "password_pepper";

/// Security manager shared by the member services
pub struct SecurityManager {
    hasher: CredentialHasher,
}

impl SecurityManager {
    /// Use the configured pepper, or the one generated on first run and kept
    /// in the database
    pub fn new(config: &AppConfig, sqlite: &SqliteDb) -> Result<Self> {
        let configured = config.pepper_bytes()?;
        let pepper = if configured.is_empty() {
            stored_pepper(sqlite)?
        } else {
            configured
        };

        Ok(Self {
            hasher: CredentialHasher::new(&pepper)?,
        })
    }

    /// Create a security manager for testing
    #[cfg(test)]
    pub fn new_for_testing() -> Self {
        Self {
            hasher: CredentialHasher::new(&CredentialHasher::generate_pepper()).unwrap(),
        }
    }

    /// Hash a password
    pub fn hash_password(&self, password: &str) -> Result<String> {
        self.hasher.hash(password)
    }

    /// Verify a password against a hash
    pub fn verify_password(&self, password: &str, hash: &str) -> Result<bool> {
        self.hasher.verify(password, hash)
    }
}

fn stored_pepper(sqlite: &SqliteDb) -> Result<Vec<u8>> {
    let engine = base64::engine::general_purpose::STANDARD;
    let candidate = engine.encode(CredentialHasher::generate_pepper());

    let stored = sqlite.init_setting(PEPPER_SETTING, &candidate)?;
    if stored == candidate {
        tracing::info!("Generated password pepper for this database");
    }

    engine
        .decode(stored)
        .map_err(|e| AppError::Config(format!("Stored password pepper is not valid base64: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_generated_pepper_survives_restart() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("onboarding.db");
        let config = AppConfig::default();

        let hash = {
            let db = SqliteDb::new(&path).unwrap();
            let security = SecurityManager::new(&config, &db).unwrap();
            assert!(db.get_setting(PEPPER_SETTING).unwrap().is_some());
            security.hash_password("password123").unwrap()
        };

        let db = SqliteDb::new(&path).unwrap();
        let security = SecurityManager::new(&config, &db).unwrap();
        assert!(security.verify_password("password123", &hash).unwrap());
    }

    #[test]
    fn test_configured_pepper_takes_precedence() {
        let db = SqliteDb::open_in_memory().unwrap();
        let config = AppConfig {
            password_pepper: Some("c2VjcmV0".to_string()),
            ..AppConfig::default()
        };

        let security = SecurityManager::new(&config, &db).unwrap();
        let hash = security.hash_password("password123").unwrap();

        assert!(db.get_setting(PEPPER_SETTING).unwrap().is_none());
        assert!(CredentialHasher::new(b"secret")
            .unwrap()
            .verify("password123", &hash)
            .unwrap());
    }
}
