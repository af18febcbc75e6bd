//! # Persistence Errors
//!
//! Error types cho persistence layer. Lỗi của sqlx được phân loại ngay tại
//! ranh giới storage thành NotFound / IntegrityViolation / ContentionTimeout.

use sharebook_core::CoreError;
use thiserror::Error;

// SQLite primary result codes (low byte of the extended code).
const SQLITE_BUSY: i32 = 5;
const SQLITE_LOCKED: i32 = 6;
const SQLITE_CONSTRAINT: i32 = 19;

/// Persistence layer errors
#[derive(Debug, Error)]
pub enum PersistenceError {
    // === Taxonomy surfaced to callers ===
    #[error("Record not found: {entity} with id {id}")]
    NotFound { entity: String, id: String },

    #[error("Integrity violation: {0}")]
    IntegrityViolation(String),

    #[error("Contention timeout: {0}")]
    ContentionTimeout(String),

    // === Database errors ===
    #[error("Database error: {0}")]
    Storage(sqlx::Error),

    // === Conversion errors ===
    #[error("Invalid stored value: {0}")]
    Corrupt(#[from] CoreError),

    // === Configuration errors ===
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias cho PersistenceError
pub type PersistenceResult<T> = Result<T, PersistenceError>;

impl PersistenceError {
    /// Tạo NotFound error
    pub fn not_found(entity: &str, id: impl ToString) -> Self {
        Self::NotFound {
            entity: entity.to_string(),
            id: id.to_string(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    pub fn is_integrity_violation(&self) -> bool {
        matches!(self, Self::IntegrityViolation(_))
    }

    pub fn is_contention_timeout(&self) -> bool {
        matches!(self, Self::ContentionTimeout(_))
    }

    fn classify(err: &sqlx::Error) -> Option<Self> {
        match err {
            sqlx::Error::Database(db) => {
                let message = db.message().to_string();
                let primary = db
                    .code()
                    .and_then(|code| code.parse::<i32>().ok())
                    .map(|code| code & 0xFF);

                match primary {
                    Some(SQLITE_CONSTRAINT) => return Some(Self::IntegrityViolation(message)),
                    Some(SQLITE_BUSY) | Some(SQLITE_LOCKED) => {
                        return Some(Self::ContentionTimeout(message))
                    }
                    _ => {}
                }

                match db.kind() {
                    sqlx::error::ErrorKind::UniqueViolation
                    | sqlx::error::ErrorKind::ForeignKeyViolation
                    | sqlx::error::ErrorKind::NotNullViolation
                    | sqlx::error::ErrorKind::CheckViolation => {
                        Some(Self::IntegrityViolation(message))
                    }
                    _ => None,
                }
            }
            sqlx::Error::PoolTimedOut => Some(Self::ContentionTimeout(
                "timed out waiting for a database connection".to_string(),
            )),
            _ => None,
        }
    }
}

impl From<sqlx::Error> for PersistenceError {
    fn from(err: sqlx::Error) -> Self {
        Self::classify(&err).unwrap_or(Self::Storage(err))
    }
}
