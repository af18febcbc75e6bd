//! Business layer errors
//!
//! Wraps persistence and core errors and exposes the three recoverable
//! conditions callers branch on: NotFound, IntegrityViolation, ContentionTimeout.

use sharebook_core::CoreError;
use sharebook_persistence::PersistenceError;
use thiserror::Error;

/// Business operation errors
#[derive(Debug, Error)]
pub enum BusinessError {
    #[error(transparent)]
    Persistence(#[from] PersistenceError),

    #[error(transparent)]
    Core(#[from] CoreError),
}

/// Result type alias for business operations
pub type BusinessResult<T> = Result<T, BusinessError>;

/// Coarse classification of a [`BusinessError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    NotFound,
    IntegrityViolation,
    ContentionTimeout,
    Other,
}

impl BusinessError {
    pub fn not_found(entity: &str, id: impl ToString) -> Self {
        Self::Persistence(PersistenceError::not_found(entity, id))
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Persistence(PersistenceError::NotFound { .. }) => ErrorKind::NotFound,
            Self::Persistence(PersistenceError::IntegrityViolation(_)) => {
                ErrorKind::IntegrityViolation
            }
            Self::Persistence(PersistenceError::ContentionTimeout(_)) => {
                ErrorKind::ContentionTimeout
            }
            _ => ErrorKind::Other,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.kind() == ErrorKind::NotFound
    }

    pub fn is_integrity_violation(&self) -> bool {
        self.kind() == ErrorKind::IntegrityViolation
    }

    pub fn is_contention_timeout(&self) -> bool {
        self.kind() == ErrorKind::ContentionTimeout
    }
}

impl From<sqlx::Error> for BusinessError {
    fn from(err: sqlx::Error) -> Self {
        Self::Persistence(err.into())
    }
}
