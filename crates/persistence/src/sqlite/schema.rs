//! Database schema definitions
//!
//! DDL cho năm bảng, index set, và row types cho sqlx mapping.
//!
//! | Relation            | On parent delete                         |
//! |---------------------|------------------------------------------|
//! | `ledgers`           | creator: RESTRICT                        |
//! | `user_ledgers`      | user: CASCADE, ledger: CASCADE           |
//! | `transactions`      | ledger: CASCADE, payer: RESTRICT         |
//! | `user_transactions` | user: CASCADE, transaction: CASCADE      |

use serde::{Deserialize, Serialize};
use sharebook_core::transaction::parse_amount;
use sharebook_core::{CoreError, Ledger, Transaction, User};

pub const USERS: &str = "users";
pub const LEDGERS: &str = "ledgers";
pub const USER_LEDGERS: &str = "user_ledgers";
pub const TRANSACTIONS: &str = "transactions";
pub const USER_TRANSACTIONS: &str = "user_transactions";

/// Tables in dependency order, with their DDL.
pub const TABLES: [(&str, &str); 5] = [
    (
        USERS,
        r#"
        CREATE TABLE IF NOT EXISTS users (
            user_id         TEXT PRIMARY KEY,
            user_name       TEXT NOT NULL,
            hashed_password TEXT NOT NULL
        )
        "#,
    ),
    (
        LEDGERS,
        r#"
        CREATE TABLE IF NOT EXISTS ledgers (
            ledger_id   TEXT PRIMARY KEY,
            creator_id  TEXT NOT NULL,
            ledger_name TEXT NOT NULL,
            create_time TEXT NOT NULL,
            FOREIGN KEY (creator_id) REFERENCES users(user_id)
                ON DELETE RESTRICT ON UPDATE CASCADE
        )
        "#,
    ),
    (
        USER_LEDGERS,
        r#"
        CREATE TABLE IF NOT EXISTS user_ledgers (
            user_id   TEXT NOT NULL,
            ledger_id TEXT NOT NULL,
            PRIMARY KEY (user_id, ledger_id),
            FOREIGN KEY (user_id) REFERENCES users(user_id)
                ON DELETE CASCADE ON UPDATE CASCADE,
            FOREIGN KEY (ledger_id) REFERENCES ledgers(ledger_id)
                ON DELETE CASCADE ON UPDATE CASCADE
        )
        "#,
    ),
    (
        TRANSACTIONS,
        r#"
        CREATE TABLE IF NOT EXISTS transactions (
            transaction_id TEXT PRIMARY KEY,
            ledger_id      TEXT NOT NULL,
            payer_id       TEXT NOT NULL,
            price          NUMERIC(12,2) NOT NULL,
            description    TEXT,
            payment_time   TEXT NOT NULL,
            FOREIGN KEY (ledger_id) REFERENCES ledgers(ledger_id)
                ON DELETE CASCADE ON UPDATE CASCADE,
            FOREIGN KEY (payer_id) REFERENCES users(user_id)
                ON DELETE RESTRICT ON UPDATE CASCADE
        )
        "#,
    ),
    (
        USER_TRANSACTIONS,
        r#"
        CREATE TABLE IF NOT EXISTS user_transactions (
            user_id        TEXT NOT NULL,
            transaction_id TEXT NOT NULL,
            PRIMARY KEY (user_id, transaction_id),
            FOREIGN KEY (user_id) REFERENCES users(user_id)
                ON DELETE CASCADE ON UPDATE CASCADE,
            FOREIGN KEY (transaction_id) REFERENCES transactions(transaction_id)
                ON DELETE CASCADE ON UPDATE CASCADE
        )
        "#,
    ),
];

/// Lookup indexes backing the read queries.
pub const INDEXES: [&str; 5] = [
    "CREATE INDEX IF NOT EXISTS idx_ledgers_creator ON ledgers(creator_id)",
    "CREATE INDEX IF NOT EXISTS idx_tx_ledger ON transactions(ledger_id)",
    "CREATE INDEX IF NOT EXISTS idx_tx_payer ON transactions(payer_id)",
    "CREATE INDEX IF NOT EXISTS idx_ul_ledger ON user_ledgers(ledger_id)",
    "CREATE INDEX IF NOT EXISTS idx_ut_tx ON user_transactions(transaction_id)",
];

/// Outcome of structure initialisation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaReport {
    pub db_path: String,
    /// Known tables that were already present, sorted
    pub existed: Vec<String>,
    /// Tables created by this call, in dependency order
    pub created: Vec<String>,
    /// Index statements issued (all are `IF NOT EXISTS`)
    pub indexes_declared: usize,
}

/// Row type cho bảng `users`
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct UserRow {
    pub user_id: String,
    pub user_name: String,
    pub hashed_password: String,
}

/// Row type cho bảng `ledgers`
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct LedgerRow {
    pub ledger_id: String,
    pub creator_id: String,
    pub ledger_name: String,
    pub create_time: String,
}

/// Row type cho bảng `transactions`
///
/// `price` is read through `CAST(price AS TEXT)` so the numeric column comes
/// back as decimal text.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct TransactionRow {
    pub transaction_id: String,
    pub ledger_id: String,
    pub payer_id: String,
    pub price: Option<String>,
    pub description: Option<String>,
    pub payment_time: String,
}

// === Conversion implementations ===

impl TryFrom<UserRow> for User {
    type Error = CoreError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        Ok(User {
            id: row.user_id.parse()?,
            name: row.user_name,
            credential_hash: row.hashed_password,
        })
    }
}

impl TryFrom<LedgerRow> for Ledger {
    type Error = CoreError;

    fn try_from(row: LedgerRow) -> Result<Self, Self::Error> {
        Ok(Ledger {
            id: row.ledger_id.parse()?,
            creator_id: row.creator_id.parse()?,
            name: row.ledger_name,
            create_time: row.create_time,
        })
    }
}

impl TryFrom<TransactionRow> for Transaction {
    type Error = CoreError;

    fn try_from(row: TransactionRow) -> Result<Self, Self::Error> {
        let amount = match row.price.as_deref() {
            Some(text) => parse_amount(text)?,
            None => rust_decimal::Decimal::ZERO,
        };
        Ok(Transaction {
            id: row.transaction_id.parse()?,
            ledger_id: row.ledger_id.parse()?,
            payer_id: row.payer_id.parse()?,
            amount,
            description: row.description,
            payment_time: row.payment_time,
        })
    }
}
