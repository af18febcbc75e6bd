//! # Sharebook Core
//!
//! Domain types for shared-ledger bookkeeping: time-ordered identifiers,
//! users, ledgers, transactions and the summaries rebuilt from them.
//! Không có I/O ở đây; persistence và business nằm ở các crate khác.

pub mod error;
pub mod id;
pub mod ledger;
pub mod summary;
pub mod transaction;
pub mod user;

pub use error::{CoreError, CoreResult};
pub use id::{LedgerId, TransactionId, UserId};
pub use ledger::{creation_month, default_ledger_name, Ledger};
pub use summary::{LedgerSummary, UserSummary};
pub use transaction::{PaymentTime, Transaction};
pub use user::User;
