//! Repository implementations cho SQLite
//!
//! Mỗi hàm chạy đúng một statement. Executor là generic để cùng một hàm
//! dùng được với `&SqlitePool` hoặc `&mut *tx` bên trong một transaction.

use crate::config::StoreConfig;
use crate::error::{PersistenceError, PersistenceResult};
use crate::sqlite::schema::*;
use sharebook_core::{CoreError, Ledger, LedgerId, Transaction, TransactionId, User, UserId};
use sqlx::{Executor, Sqlite, SqlitePool};
use std::collections::HashSet;
use std::str::FromStr;

fn parse_ids<T>(raw: Vec<String>) -> PersistenceResult<Vec<T>>
where
    T: FromStr<Err = CoreError>,
{
    raw.iter()
        .map(|s| s.parse::<T>().map_err(PersistenceError::from))
        .collect()
}

// ============================================================================
// User Repository
// ============================================================================

/// Repository cho users table
pub struct UserRepo;

impl UserRepo {
    /// Thêm user mới
    pub async fn insert<'e, E>(executor: E, user: &User) -> PersistenceResult<()>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        sqlx::query("INSERT INTO users (user_id, user_name, hashed_password) VALUES (?, ?, ?)")
            .bind(user.id.to_string())
            .bind(&user.name)
            .bind(&user.credential_hash)
            .execute(executor)
            .await?;
        Ok(())
    }

    /// Lấy user theo ID, `None` nếu không có
    pub async fn find_by_id<'e, E>(executor: E, id: &UserId) -> PersistenceResult<Option<User>>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let row = sqlx::query_as::<_, UserRow>(
            "SELECT user_id, user_name, hashed_password FROM users WHERE user_id = ?",
        )
        .bind(id.to_string())
        .fetch_optional(executor)
        .await?;

        Ok(row.map(User::try_from).transpose()?)
    }

    /// Lấy user theo ID
    pub async fn get_by_id<'e, E>(executor: E, id: &UserId) -> PersistenceResult<User>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        Self::find_by_id(executor, id)
            .await?
            .ok_or_else(|| PersistenceError::not_found("User", id))
    }

    /// First registered user with this display name
    pub async fn find_first_by_name<'e, E>(
        executor: E,
        name: &str,
    ) -> PersistenceResult<Option<User>>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let row = sqlx::query_as::<_, UserRow>(
            "SELECT user_id, user_name, hashed_password FROM users WHERE user_name = ? ORDER BY rowid LIMIT 1",
        )
        .bind(name)
        .fetch_optional(executor)
        .await?;

        Ok(row.map(User::try_from).transpose()?)
    }

    /// Xóa user. Fails with IntegrityViolation while they created a ledger or paid a transaction.
    pub async fn delete<'e, E>(executor: E, id: &UserId) -> PersistenceResult<()>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let result = sqlx::query("DELETE FROM users WHERE user_id = ?")
            .bind(id.to_string())
            .execute(executor)
            .await?;

        if result.rows_affected() == 0 {
            return Err(PersistenceError::not_found("User", id));
        }
        Ok(())
    }
}

// ============================================================================
// Ledger Repository
// ============================================================================

/// Repository cho ledgers table
pub struct LedgerRepo;

impl LedgerRepo {
    /// Thêm ledger mới
    pub async fn insert<'e, E>(executor: E, ledger: &Ledger) -> PersistenceResult<()>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        sqlx::query(
            "INSERT INTO ledgers (ledger_id, creator_id, ledger_name, create_time) VALUES (?, ?, ?, ?)",
        )
        .bind(ledger.id.to_string())
        .bind(ledger.creator_id.to_string())
        .bind(&ledger.name)
        .bind(&ledger.create_time)
        .execute(executor)
        .await?;
        Ok(())
    }

    pub async fn find_by_id<'e, E>(executor: E, id: &LedgerId) -> PersistenceResult<Option<Ledger>>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let row = sqlx::query_as::<_, LedgerRow>(
            "SELECT ledger_id, creator_id, ledger_name, create_time FROM ledgers WHERE ledger_id = ?",
        )
        .bind(id.to_string())
        .fetch_optional(executor)
        .await?;

        Ok(row.map(Ledger::try_from).transpose()?)
    }

    /// Lấy ledger theo ID
    pub async fn get_by_id<'e, E>(executor: E, id: &LedgerId) -> PersistenceResult<Ledger>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        Self::find_by_id(executor, id)
            .await?
            .ok_or_else(|| PersistenceError::not_found("Ledger", id))
    }

    pub async fn exists<'e, E>(executor: E, id: &LedgerId) -> PersistenceResult<bool>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let row: Option<(i64,)> = sqlx::query_as("SELECT 1 FROM ledgers WHERE ledger_id = ? LIMIT 1")
            .bind(id.to_string())
            .fetch_optional(executor)
            .await?;
        Ok(row.is_some())
    }

    /// Ledgers created by a user, ordered by id
    pub async fn ids_by_creator<'e, E>(executor: E, creator: &UserId) -> PersistenceResult<Vec<LedgerId>>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let raw = sqlx::query_scalar::<_, String>(
            "SELECT ledger_id FROM ledgers WHERE creator_id = ? ORDER BY ledger_id",
        )
        .bind(creator.to_string())
        .fetch_all(executor)
        .await?;
        parse_ids(raw)
    }

    /// Xóa ledger; participant links, transactions and their links cascade.
    pub async fn delete<'e, E>(executor: E, id: &LedgerId) -> PersistenceResult<()>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let result = sqlx::query("DELETE FROM ledgers WHERE ledger_id = ?")
            .bind(id.to_string())
            .execute(executor)
            .await?;

        if result.rows_affected() == 0 {
            return Err(PersistenceError::not_found("Ledger", id));
        }
        Ok(())
    }
}

// ============================================================================
// Ledger Participant Repository
// ============================================================================

/// Repository cho user_ledgers table
pub struct LedgerParticipantRepo;

impl LedgerParticipantRepo {
    /// Duplicate pairs and unknown ids fail with IntegrityViolation.
    pub async fn insert<'e, E>(executor: E, ledger: &LedgerId, user: &UserId) -> PersistenceResult<()>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        sqlx::query("INSERT INTO user_ledgers (user_id, ledger_id) VALUES (?, ?)")
            .bind(user.to_string())
            .bind(ledger.to_string())
            .execute(executor)
            .await?;
        Ok(())
    }

    pub async fn user_ids<'e, E>(executor: E, ledger: &LedgerId) -> PersistenceResult<Vec<UserId>>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let raw = sqlx::query_scalar::<_, String>(
            "SELECT user_id FROM user_ledgers WHERE ledger_id = ? ORDER BY user_id",
        )
        .bind(ledger.to_string())
        .fetch_all(executor)
        .await?;
        parse_ids(raw)
    }

    pub async fn ledger_ids<'e, E>(executor: E, user: &UserId) -> PersistenceResult<Vec<LedgerId>>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let raw = sqlx::query_scalar::<_, String>(
            "SELECT ledger_id FROM user_ledgers WHERE user_id = ? ORDER BY ledger_id",
        )
        .bind(user.to_string())
        .fetch_all(executor)
        .await?;
        parse_ids(raw)
    }
}

// ============================================================================
// Transaction Repository
// ============================================================================

const TRANSACTION_COLUMNS: &str = "transaction_id, ledger_id, payer_id, CAST(price AS TEXT) AS price, description, payment_time";

/// Repository cho transactions table
pub struct TransactionRepo;

impl TransactionRepo {
    /// Thêm transaction mới. Unknown payer or ledger fails with IntegrityViolation.
    pub async fn insert<'e, E>(executor: E, tx: &Transaction) -> PersistenceResult<()>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        sqlx::query(
            r#"
            INSERT INTO transactions (transaction_id, ledger_id, payer_id, price, description, payment_time)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(tx.id.to_string())
        .bind(tx.ledger_id.to_string())
        .bind(tx.payer_id.to_string())
        .bind(tx.amount.to_string())
        .bind(&tx.description)
        .bind(&tx.payment_time)
        .execute(executor)
        .await?;
        Ok(())
    }

    /// Lấy transaction theo ID
    pub async fn get_by_id<'e, E>(executor: E, id: &TransactionId) -> PersistenceResult<Transaction>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let sql = format!("SELECT {} FROM transactions WHERE transaction_id = ?", TRANSACTION_COLUMNS);
        let row = sqlx::query_as::<_, TransactionRow>(&sql)
            .bind(id.to_string())
            .fetch_optional(executor)
            .await?
            .ok_or_else(|| PersistenceError::not_found("Transaction", id))?;

        Ok(Transaction::try_from(row)?)
    }

    /// Lấy transactions theo ledger, ordered by id
    pub async fn list_by_ledger<'e, E>(executor: E, ledger: &LedgerId) -> PersistenceResult<Vec<Transaction>>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let sql = format!(
            "SELECT {} FROM transactions WHERE ledger_id = ? ORDER BY transaction_id",
            TRANSACTION_COLUMNS
        );
        let rows = sqlx::query_as::<_, TransactionRow>(&sql)
            .bind(ledger.to_string())
            .fetch_all(executor)
            .await?;

        rows.into_iter()
            .map(|row| Transaction::try_from(row).map_err(PersistenceError::from))
            .collect()
    }

    /// Raw amounts of a ledger's transactions as decimal text
    pub async fn amounts_by_ledger<'e, E>(executor: E, ledger: &LedgerId) -> PersistenceResult<Vec<Option<String>>>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let amounts = sqlx::query_scalar::<_, Option<String>>(
            "SELECT CAST(price AS TEXT) FROM transactions WHERE ledger_id = ?",
        )
        .bind(ledger.to_string())
        .fetch_all(executor)
        .await?;
        Ok(amounts)
    }

    /// Đếm transactions. Only tests use it, to observe cascades.
    pub async fn count<'e, E>(executor: E) -> PersistenceResult<i64>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let row: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM transactions")
            .fetch_one(executor)
            .await?;
        Ok(row.0)
    }
}

// ============================================================================
// Transaction Participant Repository
// ============================================================================

/// Repository cho user_transactions table
pub struct TransactionParticipantRepo;

impl TransactionParticipantRepo {
    pub async fn insert<'e, E>(executor: E, tx: &TransactionId, user: &UserId) -> PersistenceResult<()>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        sqlx::query("INSERT INTO user_transactions (user_id, transaction_id) VALUES (?, ?)")
            .bind(user.to_string())
            .bind(tx.to_string())
            .execute(executor)
            .await?;
        Ok(())
    }

    pub async fn user_ids<'e, E>(executor: E, tx: &TransactionId) -> PersistenceResult<Vec<UserId>>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let raw = sqlx::query_scalar::<_, String>(
            "SELECT user_id FROM user_transactions WHERE transaction_id = ? ORDER BY user_id",
        )
        .bind(tx.to_string())
        .fetch_all(executor)
        .await?;
        parse_ids(raw)
    }

    /// Đếm tất cả links. Only tests use it, to observe cascades and rollbacks.
    pub async fn count<'e, E>(executor: E) -> PersistenceResult<i64>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let row: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM user_transactions")
            .fetch_one(executor)
            .await?;
        Ok(row.0)
    }
}

// ============================================================================
// Database initialization
// ============================================================================

/// Khởi tạo connection pool từ config
pub async fn create_pool(config: &StoreConfig) -> PersistenceResult<SqlitePool> {
    config.validate()?;
    let pool = config
        .pool_options()
        .connect_with(config.connect_options())
        .await?;
    Ok(pool)
}

/// Create missing tables and declare every index.
///
/// Existing tables are never dropped or altered. Runs in one transaction.
pub async fn init_schema(pool: &SqlitePool, db_path: &str) -> PersistenceResult<SchemaReport> {
    let mut tx = pool.begin().await?;

    let present: HashSet<String> =
        sqlx::query_scalar::<_, String>("SELECT name FROM sqlite_master WHERE type = 'table'")
            .fetch_all(&mut *tx)
            .await?
            .into_iter()
            .collect();

    let mut existed = Vec::new();
    let mut created = Vec::new();
    for (name, ddl) in TABLES.iter() {
        if present.contains(*name) {
            existed.push(name.to_string());
        } else {
            sqlx::query(ddl).execute(&mut *tx).await?;
            created.push(name.to_string());
        }
    }
    existed.sort();

    let mut indexes_declared = 0;
    for stmt in INDEXES.iter() {
        sqlx::query(stmt).execute(&mut *tx).await?;
        indexes_declared += 1;
    }

    tx.commit().await?;

    Ok(SchemaReport {
        db_path: db_path.to_string(),
        existed,
        created,
        indexes_declared,
    })
}
