//! Read-side reconstruction - expense totals, ledger and user summaries
//!
//! Pure queries. A user summary is composed from two independent queries:
//! the ledger ids a user touches, then one ledger summary per id. No
//! pagination is applied, so the cost grows with the user's ledger count.

use crate::error::BusinessResult;
use crate::services::ServiceContext;
use rust_decimal::Decimal;
use sharebook_core::transaction::{parse_amount, total};
use sharebook_core::{creation_month, LedgerId, LedgerSummary, UserId, UserSummary};
use sharebook_persistence::{LedgerParticipantRepo, LedgerRepo, TransactionRepo, UserRepo};
use std::collections::BTreeSet;

/// Summary Service - aggregation and summaries
pub struct SummaryService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> SummaryService<'a> {
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Sum of every transaction amount in the ledger.
    ///
    /// Missing amounts count as zero; an empty or unknown ledger yields zero.
    /// A sum outside the `Decimal` range is an error, not a panic.
    pub async fn compute_expense(&self, ledger_id: &LedgerId) -> BusinessResult<Decimal> {
        let raw = TransactionRepo::amounts_by_ledger(self.ctx.pool(), ledger_id).await?;
        let amounts = raw
            .iter()
            .map(|text| text.as_deref().map(parse_amount).transpose())
            .collect::<Result<Vec<_>, _>>()?;

        Ok(total(amounts)?)
    }

    /// Name, participants (explicit links plus creator) and creation month.
    pub async fn ledger_summary(&self, ledger_id: &LedgerId) -> BusinessResult<LedgerSummary> {
        let mut tx = self.ctx.pool().begin().await?;

        let ledger = LedgerRepo::get_by_id(&mut *tx, ledger_id).await?;
        let mut involved: BTreeSet<UserId> = LedgerParticipantRepo::user_ids(&mut *tx, ledger_id)
            .await?
            .into_iter()
            .collect();
        involved.insert(ledger.creator_id);

        tx.commit().await?;

        Ok(LedgerSummary {
            ledger_id: ledger.id,
            created_date: creation_month(&ledger.create_time),
            ledger_name: ledger.name,
            involved_user: involved.into_iter().collect(),
        })
    }

    /// Ledgers a user created or is linked to, ordered by id.
    pub async fn ledger_ids_for_user(&self, user_id: &UserId) -> BusinessResult<Vec<LedgerId>> {
        let mut ids: BTreeSet<LedgerId> = LedgerRepo::ids_by_creator(self.ctx.pool(), user_id)
            .await?
            .into_iter()
            .collect();
        ids.extend(LedgerParticipantRepo::ledger_ids(self.ctx.pool(), user_id).await?);

        Ok(ids.into_iter().collect())
    }

    /// Display name plus a summary of every ledger the user created or joined.
    ///
    /// A ledger that disappears between the two queries is skipped.
    pub async fn user_summary(&self, user_id: &UserId) -> BusinessResult<UserSummary> {
        let user = UserRepo::get_by_id(self.ctx.pool(), user_id).await?;
        let ledger_ids = self.ledger_ids_for_user(user_id).await?;

        let mut ledgers = Vec::with_capacity(ledger_ids.len());
        for ledger_id in &ledger_ids {
            match self.ledger_summary(ledger_id).await {
                Ok(summary) => ledgers.push(summary),
                Err(err) if err.is_not_found() => {
                    tracing::warn!(user_id = %user_id, ledger_id = %ledger_id, "ledger vanished, skipped");
                }
                Err(err) => return Err(err),
            }
        }

        tracing::debug!(user_id = %user_id, ledgers = ledgers.len(), "user summary built");
        Ok(UserSummary {
            user_name: user.name,
            ledgers,
        })
    }
}
