//! Service context
//!
//! Holds the pool every business operation runs against. No caching and no
//! shared mutable state: each call re-reads from the store.

use sharebook_persistence::Database;
use sqlx::{Sqlite, SqlitePool, Transaction};

/// Context for business operations - contains database access
#[derive(Clone)]
pub struct ServiceContext {
    pool: SqlitePool,
}

impl ServiceContext {
    /// Create new service context from database
    pub fn new(db: &Database) -> Self {
        Self {
            pool: db.pool().clone(),
        }
    }

    /// Create from a pool directly
    pub fn from_pool(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Get database pool
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Start a transaction that holds the write lock from its first statement.
    ///
    /// A deferred transaction that reads before writing cannot wait for the
    /// lock on upgrade; `BEGIN IMMEDIATE` waits up to the busy timeout instead.
    pub async fn begin_write(&self) -> Result<Transaction<'static, Sqlite>, sqlx::Error> {
        self.pool.begin_with("BEGIN IMMEDIATE").await
    }
}
