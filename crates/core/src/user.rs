//! # User Module
//!
//! Người dùng đã đăng ký. Credential luôn là hash do caller cung cấp;
//! core không bao giờ hash hay kiểm tra độ mạnh.

use crate::id::UserId;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A registered user.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    /// Display name. Not unique.
    pub name: String,
    /// Opaque credential hash supplied at registration
    #[serde(skip_serializing)]
    pub credential_hash: String,
}

impl User {
    pub fn new(id: UserId, name: &str, credential_hash: &str) -> Self {
        Self {
            id,
            name: name.to_string(),
            credential_hash: credential_hash.to_string(),
        }
    }
}

// Credential hash stays out of logs.
impl fmt::Debug for User {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("User")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("credential_hash", &"<redacted>")
            .finish()
    }
}

impl fmt::Display for User {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.id)
    }
}
