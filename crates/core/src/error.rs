//! # Error Module
//!
//! Domain errors cho Sharebook core, sử dụng thiserror.

use thiserror::Error;

/// Core domain errors.
///
/// Raised when text coming from storage or from a caller cannot be turned into
/// a domain value. Nothing here touches infrastructure.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CoreError {
    #[error("Invalid ID format: {0}")]
    InvalidId(String),

    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    #[error("Invalid timestamp: {0}")]
    InvalidTimestamp(String),
}

/// Result type alias với CoreError
pub type CoreResult<T> = Result<T, CoreError>;
