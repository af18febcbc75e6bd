//! Store configuration
//!
//! Explicit configuration value passed to [`crate::Database::open`]. There is
//! no process-wide default database path.

use crate::error::{PersistenceError, PersistenceResult};
use serde::{Deserialize, Serialize};
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Default lock wait before a write is rejected.
pub const DEFAULT_BUSY_TIMEOUT_MS: u64 = 3_000;

/// Default pool size.
pub const DEFAULT_MAX_CONNECTIONS: u32 = 5;

fn default_busy_timeout_ms() -> u64 {
    DEFAULT_BUSY_TIMEOUT_MS
}

fn default_max_connections() -> u32 {
    DEFAULT_MAX_CONNECTIONS
}

fn default_create_if_missing() -> bool {
    true
}

/// Where the store lives and how connections behave.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreConfig {
    /// SQLite database file
    pub database_path: PathBuf,
    /// Lock wait in milliseconds
    #[serde(default = "default_busy_timeout_ms")]
    pub busy_timeout_ms: u64,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    #[serde(default = "default_create_if_missing")]
    pub create_if_missing: bool,
}

impl StoreConfig {
    pub fn new(database_path: impl Into<PathBuf>) -> Self {
        Self {
            database_path: database_path.into(),
            busy_timeout_ms: DEFAULT_BUSY_TIMEOUT_MS,
            max_connections: DEFAULT_MAX_CONNECTIONS,
            create_if_missing: true,
        }
    }

    pub fn with_busy_timeout(mut self, timeout: Duration) -> Self {
        self.busy_timeout_ms = timeout.as_millis() as u64;
        self
    }

    pub fn with_max_connections(mut self, max_connections: u32) -> Self {
        self.max_connections = max_connections;
        self
    }

    pub fn with_create_if_missing(mut self, create_if_missing: bool) -> Self {
        self.create_if_missing = create_if_missing;
        self
    }

    /// Parse a TOML document such as:
    ///
    /// ```toml
    /// database_path = "data/sharebook.db"
    /// busy_timeout_ms = 3000
    /// ```
    pub fn from_toml_str(s: &str) -> PersistenceResult<Self> {
        let config: Self =
            toml::from_str(s).map_err(|e| PersistenceError::Configuration(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a TOML file
    pub fn load<P: AsRef<Path>>(path: P) -> PersistenceResult<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    pub fn validate(&self) -> PersistenceResult<()> {
        if self.database_path.as_os_str().is_empty() {
            return Err(PersistenceError::Configuration(
                "database_path must not be empty".to_string(),
            ));
        }
        if self.max_connections == 0 {
            return Err(PersistenceError::Configuration(
                "max_connections must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    pub fn busy_timeout(&self) -> Duration {
        Duration::from_millis(self.busy_timeout_ms)
    }

    /// Per-connection settings: FK enforcement, WAL, NORMAL sync, bounded lock wait.
    pub fn connect_options(&self) -> SqliteConnectOptions {
        SqliteConnectOptions::new()
            .filename(&self.database_path)
            .create_if_missing(self.create_if_missing)
            .foreign_keys(true)
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal)
            .busy_timeout(self.busy_timeout())
    }

    pub fn pool_options(&self) -> SqlitePoolOptions {
        SqlitePoolOptions::new()
            .max_connections(self.max_connections)
            .acquire_timeout(self.busy_timeout())
    }
}
