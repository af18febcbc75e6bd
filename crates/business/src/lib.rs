//! # Sharebook Business
//!
//! Write and read operations over the shared-ledger store.
//!
//! ```rust,ignore
//! let ctx = ServiceContext::new(&db);
//! let alice = UserService::new(&ctx).register("Alice", "hash").await?;
//! let book = LedgerService::new(&ctx).create(&alice, None).await?;
//! TransactionService::new(&ctx).record(&book, &alice, dec!(12.50), Some("lunch"), None).await?;
//! let total = SummaryService::new(&ctx).compute_expense(&book).await?;
//! ```

pub mod error;
pub mod ledger;
pub mod services;
pub mod summary;
pub mod transaction;
pub mod user;

pub use error::{BusinessError, BusinessResult, ErrorKind};
pub use ledger::LedgerService;
pub use services::ServiceContext;
pub use summary::SummaryService;
pub use transaction::TransactionService;
pub use user::UserService;
