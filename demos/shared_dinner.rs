//! # Example: Shared Dinner
//!
//! Alice and Bob share a ledger:
//! 1. Both register
//! 2. Alice opens a ledger without a name
//! 3. Alice pays for lunch, Bob joins, Bob pays for dinner
//! 4. Summaries are printed as JSON
//!
//! Run with: `cargo run -p sharebook-demos --example shared_dinner [config.toml]`

use anyhow::Context;
use rust_decimal_macros::dec;
use sharebook_business::{
    LedgerService, ServiceContext, SummaryService, TransactionService, UserService,
};
use sharebook_persistence::{Database, StoreConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    // Keeps the temp dir alive until the end of main
    let (config, _scratch) = match std::env::args().nth(1) {
        Some(path) => (
            StoreConfig::load(&path).with_context(|| format!("loading {}", path))?,
            None,
        ),
        None => {
            let dir = tempfile::TempDir::new()?;
            (StoreConfig::new(dir.path().join("sharebook.db")), Some(dir))
        }
    };

    let (db, report) = Database::init(config).await?;
    println!(
        "📒 Database {} (tables existing: {}, created: {})",
        report.db_path,
        report.existed.len(),
        report.created.len()
    );

    let ctx = ServiceContext::new(&db);
    let users = UserService::new(&ctx);
    let ledgers = LedgerService::new(&ctx);
    let transactions = TransactionService::new(&ctx);
    let summaries = SummaryService::new(&ctx);

    // =========================================================================
    // Members
    // =========================================================================
    let alice = users.register("Alice", "5e884898da28047151d0e56f8dc629").await?;
    let bob = users.register("Bob", "a665a45920422f9d417e4867efdc4f").await?;

    let logged_in = users
        .authenticate("Alice", "5e884898da28047151d0e56f8dc629")
        .await?
        .context("Alice should be able to log in")?;
    println!("👤 Alice logged in as {}", logged_in);

    // =========================================================================
    // Ledger and payments
    // =========================================================================
    let book = ledgers.create(&alice, None).await?;
    let lunch = transactions
        .record(&book, &alice, dec!(12.50), Some("lunch"), None)
        .await?;
    println!("💸 Expense after lunch: {}", summaries.compute_expense(&book).await?);

    ledgers.link_user(&book, &bob).await?;
    transactions.link_user(&lunch, &bob).await?;
    transactions
        .record(&book, &bob, dec!(48.30), Some("dinner"), None)
        .await?;
    println!("💸 Expense after dinner: {}", summaries.compute_expense(&book).await?);

    // =========================================================================
    // Summaries
    // =========================================================================
    let ledger_summary = summaries.ledger_summary(&book).await?;
    println!("\n📊 Ledger summary:\n{}", serde_json::to_string_pretty(&ledger_summary)?);

    let user_summary = summaries.user_summary(&bob).await?;
    println!("\n📊 Bob's summary:\n{}", serde_json::to_string_pretty(&user_summary)?);

    db.close().await;
    tracing::info!("shared dinner demo finished");
    Ok(())
}
