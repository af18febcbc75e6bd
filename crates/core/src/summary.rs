//! Read-side views reconstructed from storage.

use crate::id::{LedgerId, UserId};
use serde::{Deserialize, Serialize};

/// Summary of one ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerSummary {
    pub ledger_id: LedgerId,
    pub ledger_name: String,
    /// Explicit participants plus the creator, sorted and distinct
    pub involved_user: Vec<UserId>,
    /// Creation month as `MM-YY`, empty when the stored time is unreadable
    pub created_date: String,
}

impl LedgerSummary {
    pub fn involves(&self, user: &UserId) -> bool {
        self.involved_user.binary_search(user).is_ok()
    }
}

/// Summary of one user and every ledger they created or joined.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserSummary {
    pub user_name: String,
    /// Ordered by ledger id
    pub ledgers: Vec<LedgerSummary>,
}
