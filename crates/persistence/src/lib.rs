//! # Sharebook Persistence
//!
//! Persistence layer cho Sharebook - SQLite với foreign keys, WAL và
//! busy timeout cố định.
//!
//! ## Architecture
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────┐
//! │                        Database                            │
//! │  ┌─────────────┐    ┌──────────────┐    ┌───────────────┐  │
//! │  │ StoreConfig │───▶│  SqlitePool  │───▶│     Repos     │  │
//! │  │  (explicit) │    │ (FK/WAL/busy)│    │ (1 statement) │  │
//! │  └─────────────┘    └──────────────┘    └───────────────┘  │
//! └────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use sharebook_persistence::{Database, StoreConfig, UserRepo};
//!
//! let (db, report) = Database::init(StoreConfig::new("data/sharebook.db")).await?;
//! println!("created tables: {:?}", report.created);
//!
//! let user = UserRepo::get_by_id(db.pool(), &user_id).await?;
//! ```

pub mod config;
pub mod error;
pub mod sqlite;

pub use config::StoreConfig;
pub use error::{PersistenceError, PersistenceResult};
pub use sqlite::{
    create_pool, init_schema, LedgerParticipantRepo, LedgerRepo, SchemaReport,
    TransactionParticipantRepo, TransactionRepo, UserRepo,
};

use sqlx::SqlitePool;

/// Database facade - config plus the pool every operation runs against
pub struct Database {
    pool: SqlitePool,
    config: StoreConfig,
}

impl Database {
    /// Open a connection pool, creating the parent directory when needed.
    pub async fn open(config: StoreConfig) -> PersistenceResult<Self> {
        if config.create_if_missing {
            if let Some(parent) = config.database_path.parent() {
                if !parent.as_os_str().is_empty() {
                    std::fs::create_dir_all(parent)?;
                }
            }
        }

        let pool = create_pool(&config).await?;
        Ok(Self { pool, config })
    }

    /// Open and make sure every relation and index exists.
    pub async fn init(config: StoreConfig) -> PersistenceResult<(Self, SchemaReport)> {
        let db = Self::open(config).await?;
        let report = db.init_schema().await?;
        Ok((db, report))
    }

    /// Idempotent structure creation. Safe to call repeatedly.
    pub async fn init_schema(&self) -> PersistenceResult<SchemaReport> {
        let db_path = std::fs::canonicalize(&self.config.database_path)
            .unwrap_or_else(|_| self.config.database_path.clone());
        init_schema(&self.pool, &db_path.display().to_string()).await
    }

    /// Get SQLite connection pool
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    pub async fn close(&self) {
        self.pool.close().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_open_creates_parent_directory() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("data").join("app.db");

        let (db, report) = Database::init(StoreConfig::new(&path)).await.unwrap();

        assert!(path.exists());
        assert_eq!(report.created.len(), 5);
        assert!(report.db_path.ends_with("app.db"));
        db.close().await;
    }

    #[tokio::test]
    async fn test_reopen_reports_existing_tables() {
        let dir = tempfile::tempdir().unwrap();
        let config = StoreConfig::new(dir.path().join("app.db"));

        let (db, _) = Database::init(config.clone()).await.unwrap();
        db.close().await;

        let (db, report) = Database::init(config).await.unwrap();
        assert!(report.created.is_empty());
        assert_eq!(report.existed.len(), 5);
        assert_eq!(report.indexes_declared, 5);
        db.close().await;
    }

    #[tokio::test]
    async fn test_open_without_create_fails_for_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.db");
        let config = StoreConfig::new(&path).with_create_if_missing(false);

        assert!(Database::open(config).await.is_err());
        assert!(!path.exists());
    }
}
