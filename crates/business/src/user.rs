//! User operations - register, authenticate
//!
//! Credentials arrive already hashed. Authentication compares the stored hash
//! with the supplied one; a wrong name and a wrong hash look the same.

use crate::error::BusinessResult;
use crate::services::ServiceContext;
use sharebook_core::{User, UserId};
use sharebook_persistence::UserRepo;
use subtle::ConstantTimeEq;

/// Exact equality, evaluated in constant time for equal-length inputs
fn credentials_match(stored: &str, supplied: &str) -> bool {
    stored.as_bytes().ct_eq(supplied.as_bytes()).into()
}

/// User Service - handles registration and login
pub struct UserService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> UserService<'a> {
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Register a user. Display names need not be unique.
    pub async fn register(&self, name: &str, credential_hash: &str) -> BusinessResult<UserId> {
        let user = User::new(UserId::generate(), name, credential_hash);
        UserRepo::insert(self.ctx.pool(), &user).await?;

        tracing::info!(user_id = %user.id, "user registered");
        Ok(user.id)
    }

    /// Returns the first user with `name` whose stored hash equals `credential_hash`.
    ///
    /// `Ok(None)` covers both an unknown name and a mismatched hash.
    pub async fn authenticate(
        &self,
        name: &str,
        credential_hash: &str,
    ) -> BusinessResult<Option<UserId>> {
        let Some(user) = UserRepo::find_first_by_name(self.ctx.pool(), name).await? else {
            tracing::debug!(user_name = name, "authentication failed");
            return Ok(None);
        };

        if credentials_match(&user.credential_hash, credential_hash) {
            Ok(Some(user.id))
        } else {
            tracing::debug!(user_name = name, "authentication failed");
            Ok(None)
        }
    }

    /// Lấy user theo ID
    pub async fn get(&self, id: &UserId) -> BusinessResult<User> {
        Ok(UserRepo::get_by_id(self.ctx.pool(), id).await?)
    }

    /// Delete a user. Refused while they created a ledger or paid a transaction.
    pub async fn delete(&self, id: &UserId) -> BusinessResult<()> {
        UserRepo::delete(self.ctx.pool(), id).await?;
        tracing::info!(user_id = %id, "user deleted");
        Ok(())
    }
}
