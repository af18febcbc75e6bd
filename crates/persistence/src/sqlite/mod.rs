//! SQLite persistence module
//!
//! Repository pattern cho SQLite database access.

pub mod repos;
pub mod schema;

pub use repos::{
    create_pool, init_schema, LedgerParticipantRepo, LedgerRepo, TransactionParticipantRepo,
    TransactionRepo, UserRepo,
};
pub use schema::{LedgerRow, SchemaReport, TransactionRow, UserRow};
