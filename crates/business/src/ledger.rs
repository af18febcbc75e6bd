//! Ledger operations - create, link participants, delete

use crate::error::BusinessResult;
use crate::services::ServiceContext;
use chrono::Utc;
use sharebook_core::ledger::{default_ledger_name, format_create_time, requested_name};
use sharebook_core::{Ledger, LedgerId, UserId};
use sharebook_persistence::{LedgerParticipantRepo, LedgerRepo, UserRepo};

/// Ledger Service - handles ledger lifecycle and membership
pub struct LedgerService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> LedgerService<'a> {
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Create a ledger owned by `creator_id`.
    ///
    /// A missing or blank `name` becomes "<creator name> 的账本 <UTC date>".
    /// The creator lookup and the insert commit together.
    pub async fn create(&self, creator_id: &UserId, name: Option<&str>) -> BusinessResult<LedgerId> {
        let now = Utc::now();
        let mut tx = self.ctx.begin_write().await?;

        let creator = UserRepo::get_by_id(&mut *tx, creator_id).await?;
        let name = match requested_name(name) {
            Some(name) => name.to_string(),
            None => default_ledger_name(&creator.name, now.date_naive()),
        };

        let ledger = Ledger {
            id: LedgerId::generate(),
            creator_id: *creator_id,
            name,
            create_time: format_create_time(now),
        };
        LedgerRepo::insert(&mut *tx, &ledger).await?;
        tx.commit().await?;

        tracing::info!(ledger_id = %ledger.id, creator_id = %creator_id, "ledger created");
        Ok(ledger.id)
    }

    /// Add `user_id` as an explicit participant.
    ///
    /// Linking twice, or linking an unknown user or ledger, is an IntegrityViolation.
    pub async fn link_user(&self, ledger_id: &LedgerId, user_id: &UserId) -> BusinessResult<()> {
        LedgerParticipantRepo::insert(self.ctx.pool(), ledger_id, user_id).await?;

        tracing::info!(ledger_id = %ledger_id, user_id = %user_id, "user linked to ledger");
        Ok(())
    }

    /// Lấy ledger theo ID
    pub async fn get(&self, id: &LedgerId) -> BusinessResult<Ledger> {
        Ok(LedgerRepo::get_by_id(self.ctx.pool(), id).await?)
    }

    /// Delete a ledger together with its links, transactions and their links.
    pub async fn delete(&self, id: &LedgerId) -> BusinessResult<()> {
        LedgerRepo::delete(self.ctx.pool(), id).await?;
        tracing::info!(ledger_id = %id, "ledger deleted");
        Ok(())
    }
}
