//! Application state management

use crate::config::AppConfig;
use crate::db::sqlite::SqliteDb;
use crate::error::Result;
use crate::onboarding::{ProgressEngine, ProgressHub};
use crate::security::SecurityManager;
use std::sync::Arc;

/// Application state shared by services and HTTP handlers
pub struct AppState {
    pub config: AppConfig,

    /// SQLite database backing all onboarding stores
    pub sqlite: Arc<SqliteDb>,

    /// Password hashing
    pub security: Arc<SecurityManager>,

    /// Progress derivation and change notification
    pub progress: Arc<ProgressHub>,
}

impl AppState {
    /// Open the configured database and wire up services
    pub fn new(config: AppConfig) -> Result<Self> {
        if let Some(parent) = config.database_path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        tracing::info!("Database: {:?}", config.database_path);
        let sqlite = Arc::new(SqliteDb::new(&config.database_path)?);

        Self::with_database(config, sqlite)
    }

    /// Wire up services over an existing database
    pub fn with_database(config: AppConfig, sqlite: Arc<SqliteDb>) -> Result<Self> {
        let security = Arc::new(SecurityManager::new(&config, &sqlite)?);
        let progress = Arc::new(ProgressHub::new(ProgressEngine::from_store(sqlite.clone())));

        Ok(Self {
            config,
            sqlite,
            security,
            progress,
        })
    }

    /// In-memory state for tests
    #[cfg(test)]
    pub fn for_testing() -> Self {
        let sqlite = Arc::new(SqliteDb::open_in_memory().unwrap());
        let progress = Arc::new(ProgressHub::new(ProgressEngine::from_store(sqlite.clone())));

        Self {
            config: AppConfig::default(),
            sqlite,
            security: Arc::new(SecurityManager::new_for_testing()),
            progress,
        }
    }
}
