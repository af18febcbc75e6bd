//! Transaction operations - record, link participants, list

use crate::error::{BusinessError, BusinessResult};
use crate::services::ServiceContext;
use rust_decimal::Decimal;
use sharebook_core::{LedgerId, PaymentTime, Transaction, TransactionId, UserId};
use sharebook_persistence::{LedgerRepo, TransactionParticipantRepo, TransactionRepo};

/// Transaction Service - records payments inside a ledger
pub struct TransactionService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> TransactionService<'a> {
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Record a payment and link the payer as a participant, atomically.
    ///
    /// An unknown ledger is NotFound. An unknown payer is rejected by the
    /// payer foreign key (IntegrityViolation). Without `payment_time` today's
    /// UTC date is stored.
    pub async fn record(
        &self,
        ledger_id: &LedgerId,
        payer_id: &UserId,
        amount: Decimal,
        description: Option<&str>,
        payment_time: Option<PaymentTime>,
    ) -> BusinessResult<TransactionId> {
        let payment_time = payment_time.unwrap_or_else(PaymentTime::today);
        let record = Transaction {
            id: TransactionId::generate(),
            ledger_id: *ledger_id,
            payer_id: *payer_id,
            amount,
            description: description.map(str::to_string),
            payment_time: payment_time.to_stored(),
        };

        let mut tx = self.ctx.begin_write().await?;

        if !LedgerRepo::exists(&mut *tx, ledger_id).await? {
            return Err(BusinessError::not_found("Ledger", ledger_id));
        }
        TransactionRepo::insert(&mut *tx, &record).await?;
        TransactionParticipantRepo::insert(&mut *tx, &record.id, payer_id).await?;

        tx.commit().await?;

        tracing::info!(
            transaction_id = %record.id,
            ledger_id = %ledger_id,
            payer_id = %payer_id,
            amount = %amount,
            "transaction recorded"
        );
        Ok(record.id)
    }

    /// Add `user_id` as a participant of a transaction.
    pub async fn link_user(&self, transaction_id: &TransactionId, user_id: &UserId) -> BusinessResult<()> {
        TransactionParticipantRepo::insert(self.ctx.pool(), transaction_id, user_id).await?;

        tracing::info!(transaction_id = %transaction_id, user_id = %user_id, "user linked to transaction");
        Ok(())
    }

    /// Lấy transaction theo ID
    pub async fn get(&self, id: &TransactionId) -> BusinessResult<Transaction> {
        Ok(TransactionRepo::get_by_id(self.ctx.pool(), id).await?)
    }

    /// Transactions of a ledger, oldest first
    pub async fn list_for_ledger(&self, ledger_id: &LedgerId) -> BusinessResult<Vec<Transaction>> {
        if !LedgerRepo::exists(self.ctx.pool(), ledger_id).await? {
            return Err(BusinessError::not_found("Ledger", ledger_id));
        }
        Ok(TransactionRepo::list_by_ledger(self.ctx.pool(), ledger_id).await?)
    }

    /// Participant ids of a transaction, sorted
    pub async fn participants(&self, id: &TransactionId) -> BusinessResult<Vec<UserId>> {
        let record = TransactionRepo::get_by_id(self.ctx.pool(), id).await?;
        Ok(TransactionParticipantRepo::user_ids(self.ctx.pool(), &record.id).await?)
    }
}
