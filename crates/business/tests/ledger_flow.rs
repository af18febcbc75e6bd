//! Integration tests for Sharebook
//!
//! These tests run the business services against a real SQLite file and
//! check the write-side invariants through the read-side queries.

use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use sharebook_business::{
    ErrorKind, LedgerService, ServiceContext, SummaryService, TransactionService, UserService,
};
use sharebook_core::{LedgerId, PaymentTime, UserId};
use sharebook_persistence::{Database, LedgerRepo, StoreConfig};
use sqlx::{Connection, SqliteConnection};
use tempfile::TempDir;

async fn setup() -> (TempDir, Database, ServiceContext) {
    let temp_dir = TempDir::new().unwrap();
    let config = StoreConfig::new(temp_dir.path().join("sharebook.db"));
    let (db, _report) = Database::init(config).await.unwrap();
    let ctx = ServiceContext::new(&db);
    (temp_dir, db, ctx)
}

/// Test: register → ledger → transaction → expense → participants
#[tokio::test]
async fn test_full_workflow() {
    let (_dir, _db, ctx) = setup().await;
    let users = UserService::new(&ctx);
    let ledgers = LedgerService::new(&ctx);
    let transactions = TransactionService::new(&ctx);
    let summaries = SummaryService::new(&ctx);

    // 1. Register Alice and Bob
    let alice = users.register("Alice", "hash-a").await.unwrap();
    let bob = users.register("Bob", "hash-b").await.unwrap();

    // 2. Alice creates an unnamed ledger
    let book = ledgers.create(&alice, None).await.unwrap();
    let today = Utc::now().date_naive().format("%Y-%m-%d").to_string();
    let summary = summaries.ledger_summary(&book).await.unwrap();
    assert_eq!(summary.ledger_name, format!("Alice 的账本 {}", today));

    // 3. Lunch paid by Alice
    transactions
        .record(&book, &alice, dec!(12.50), Some("lunch"), None)
        .await
        .unwrap();
    assert_eq!(summaries.compute_expense(&book).await.unwrap(), dec!(12.50));

    // 4. Only the creator is involved so far
    let summary = summaries.ledger_summary(&book).await.unwrap();
    assert_eq!(summary.involved_user, vec![alice]);

    // 5. Link Bob
    ledgers.link_user(&book, &bob).await.unwrap();
    let summary = summaries.ledger_summary(&book).await.unwrap();
    let mut expected = vec![alice, bob];
    expected.sort();
    assert_eq!(summary.involved_user, expected);
}

#[tokio::test]
async fn test_expense_is_sum_of_amounts() {
    let (_dir, _db, ctx) = setup().await;
    let alice = UserService::new(&ctx).register("Alice", "h").await.unwrap();
    let book = LedgerService::new(&ctx).create(&alice, Some("Trip")).await.unwrap();
    let summaries = SummaryService::new(&ctx);
    let transactions = TransactionService::new(&ctx);

    assert_eq!(summaries.compute_expense(&book).await.unwrap(), Decimal::ZERO);

    let amounts = [dec!(10.00), dec!(0.10), dec!(0.20), dec!(-5.25), dec!(1234.56)];
    for amount in amounts {
        transactions.record(&book, &alice, amount, None, None).await.unwrap();
    }

    let expected: Decimal = amounts.iter().sum();
    assert_eq!(summaries.compute_expense(&book).await.unwrap(), expected);
}

#[tokio::test]
async fn test_expense_of_unknown_ledger_is_zero() {
    let (_dir, _db, ctx) = setup().await;
    let total = SummaryService::new(&ctx)
        .compute_expense(&LedgerId::generate())
        .await
        .unwrap();
    assert_eq!(total, Decimal::ZERO);
}

#[tokio::test]
async fn test_payer_is_linked_to_transaction() {
    let (_dir, _db, ctx) = setup().await;
    let users = UserService::new(&ctx);
    let alice = users.register("Alice", "h").await.unwrap();
    let bob = users.register("Bob", "h").await.unwrap();
    let book = LedgerService::new(&ctx).create(&alice, None).await.unwrap();
    let transactions = TransactionService::new(&ctx);

    let tx = transactions.record(&book, &bob, dec!(8), None, None).await.unwrap();
    assert_eq!(transactions.participants(&tx).await.unwrap(), vec![bob]);

    // Explicit extra participant
    transactions.link_user(&tx, &alice).await.unwrap();
    let mut expected = vec![alice, bob];
    expected.sort();
    assert_eq!(transactions.participants(&tx).await.unwrap(), expected);

    // Payer link already exists
    let err = transactions.link_user(&tx, &bob).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::IntegrityViolation);
}

#[tokio::test]
async fn test_payment_time_defaults_and_overrides() {
    let (_dir, _db, ctx) = setup().await;
    let alice = UserService::new(&ctx).register("Alice", "h").await.unwrap();
    let book = LedgerService::new(&ctx).create(&alice, None).await.unwrap();
    let transactions = TransactionService::new(&ctx);

    let default_tx = transactions.record(&book, &alice, dec!(1), None, None).await.unwrap();
    let stored = transactions.get(&default_tx).await.unwrap();
    assert_eq!(stored.payment_time, Utc::now().date_naive().format("%Y-%m-%d").to_string());
    assert_eq!(stored.description, None);

    let when = NaiveDate::from_ymd_opt(2025, 9, 1)
        .unwrap()
        .and_hms_opt(19, 45, 0)
        .unwrap();
    let dinner = transactions
        .record(&book, &alice, dec!(42.00), Some("dinner"), Some(PaymentTime::DateTime(when)))
        .await
        .unwrap();
    let stored = transactions.get(&dinner).await.unwrap();
    assert_eq!(stored.payment_time, "2025-09-01 19:45:00");
    assert_eq!(stored.description.as_deref(), Some("dinner"));
    assert_eq!(stored.amount, dec!(42));

    let listed = transactions.list_for_ledger(&book).await.unwrap();
    assert_eq!(listed.len(), 2);
    assert!(listed.iter().any(|t| t.id == default_tx));
    assert!(listed.iter().any(|t| t.id == dinner));
}

#[tokio::test]
async fn test_record_transaction_failures_leave_nothing_behind() {
    let (_dir, db, ctx) = setup().await;
    let alice = UserService::new(&ctx).register("Alice", "h").await.unwrap();
    let book = LedgerService::new(&ctx).create(&alice, None).await.unwrap();
    let transactions = TransactionService::new(&ctx);

    let err = transactions
        .record(&LedgerId::generate(), &alice, dec!(5), None, None)
        .await
        .unwrap_err();
    assert!(err.is_not_found());

    let err = transactions
        .record(&book, &UserId::generate(), dec!(5), None, None)
        .await
        .unwrap_err();
    assert!(err.is_integrity_violation());

    assert!(transactions.list_for_ledger(&book).await.unwrap().is_empty());
    assert_eq!(
        sharebook_persistence::TransactionParticipantRepo::count(db.pool()).await.unwrap(),
        0
    );
}

#[tokio::test]
async fn test_create_ledger_names() {
    let (_dir, _db, ctx) = setup().await;
    let alice = UserService::new(&ctx).register("Alice", "h").await.unwrap();
    let ledgers = LedgerService::new(&ctx);
    let today = Utc::now().date_naive().format("%Y-%m-%d").to_string();

    let named = ledgers.create(&alice, Some("Ski trip")).await.unwrap();
    assert_eq!(ledgers.get(&named).await.unwrap().name, "Ski trip");

    let blank = ledgers.create(&alice, Some("   ")).await.unwrap();
    let name = ledgers.get(&blank).await.unwrap().name;
    assert!(name.contains("Alice"));
    assert!(name.contains(&today));

    let ledger = ledgers.get(&named).await.unwrap();
    assert_eq!(ledger.create_time.len(), "YYYY-MM-DD HH:MM:SS".len());
    assert!(ledger.create_time.starts_with(&today));
}

#[tokio::test]
async fn test_create_ledger_for_unknown_creator_is_not_found() {
    let (_dir, db, ctx) = setup().await;
    let ghost = UserId::generate();

    let err = LedgerService::new(&ctx).create(&ghost, None).await.unwrap_err();
    assert!(err.is_not_found());
    assert!(LedgerRepo::ids_by_creator(db.pool(), &ghost).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_link_user_to_ledger_failures() {
    let (_dir, _db, ctx) = setup().await;
    let users = UserService::new(&ctx);
    let alice = users.register("Alice", "h").await.unwrap();
    let bob = users.register("Bob", "h").await.unwrap();
    let ledgers = LedgerService::new(&ctx);
    let book = ledgers.create(&alice, None).await.unwrap();

    ledgers.link_user(&book, &bob).await.unwrap();
    let err = ledgers.link_user(&book, &bob).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::IntegrityViolation);

    let err = ledgers.link_user(&book, &UserId::generate()).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::IntegrityViolation);

    let err = ledgers.link_user(&LedgerId::generate(), &bob).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::IntegrityViolation);
}

#[tokio::test]
async fn test_creator_linked_explicitly_is_not_duplicated() {
    let (_dir, _db, ctx) = setup().await;
    let alice = UserService::new(&ctx).register("Alice", "h").await.unwrap();
    let ledgers = LedgerService::new(&ctx);
    let book = ledgers.create(&alice, None).await.unwrap();
    ledgers.link_user(&book, &alice).await.unwrap();

    let summary = SummaryService::new(&ctx).ledger_summary(&book).await.unwrap();
    assert_eq!(summary.involved_user, vec![alice]);

    let user = SummaryService::new(&ctx).user_summary(&alice).await.unwrap();
    assert_eq!(user.ledgers.len(), 1);
}

#[tokio::test]
async fn test_authenticate() {
    let (_dir, _db, ctx) = setup().await;
    let users = UserService::new(&ctx);
    let alice = users.register("Alice", "hash-a").await.unwrap();
    let _other_alice = users.register("Alice", "hash-other").await.unwrap();

    assert_eq!(users.authenticate("Alice", "hash-a").await.unwrap(), Some(alice));
    // Only the first "Alice" is considered
    assert_eq!(users.authenticate("Alice", "hash-other").await.unwrap(), None);
    assert_eq!(users.authenticate("Alice", "wrong").await.unwrap(), None);
    assert_eq!(users.authenticate("Nobody", "hash-a").await.unwrap(), None);
}

#[tokio::test]
async fn test_ledger_summary_not_found() {
    let (_dir, _db, ctx) = setup().await;
    let err = SummaryService::new(&ctx)
        .ledger_summary(&LedgerId::generate())
        .await
        .unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
async fn test_ledger_summary_month_degrades_gracefully() {
    let (_dir, db, ctx) = setup().await;
    let alice = UserService::new(&ctx).register("Alice", "h").await.unwrap();
    let book = LedgerService::new(&ctx).create(&alice, Some("Odd")).await.unwrap();

    sqlx::query("UPDATE ledgers SET create_time = 'sometime' WHERE ledger_id = ?")
        .bind(book.to_string())
        .execute(db.pool())
        .await
        .unwrap();

    let summary = SummaryService::new(&ctx).ledger_summary(&book).await.unwrap();
    assert_eq!(summary.created_date, "");
    assert_eq!(summary.ledger_name, "Odd");
}

#[tokio::test]
async fn test_ledger_summary_created_date() {
    let (_dir, _db, ctx) = setup().await;
    let alice = UserService::new(&ctx).register("Alice", "h").await.unwrap();
    let book = LedgerService::new(&ctx).create(&alice, None).await.unwrap();

    let summary = SummaryService::new(&ctx).ledger_summary(&book).await.unwrap();
    assert_eq!(summary.created_date, Utc::now().format("%m-%y").to_string());
}

#[tokio::test]
async fn test_user_summary() {
    let (_dir, _db, ctx) = setup().await;
    let users = UserService::new(&ctx);
    let ledgers = LedgerService::new(&ctx);
    let summaries = SummaryService::new(&ctx);

    let alice = users.register("Alice", "h").await.unwrap();
    let bob = users.register("Bob", "h").await.unwrap();
    let carol = users.register("Carol", "h").await.unwrap();

    let trip = ledgers.create(&alice, Some("Trip")).await.unwrap();
    let rent = ledgers.create(&bob, Some("Rent")).await.unwrap();
    let _other = ledgers.create(&bob, Some("Private")).await.unwrap();
    ledgers.link_user(&rent, &alice).await.unwrap();

    let summary = summaries.user_summary(&alice).await.unwrap();
    assert_eq!(summary.user_name, "Alice");
    let ids: Vec<LedgerId> = summary.ledgers.iter().map(|l| l.ledger_id).collect();
    let mut expected = vec![trip, rent];
    expected.sort();
    assert_eq!(ids, expected);
    assert!(summary.ledgers.iter().all(|l| l.involves(&alice)));

    let empty = summaries.user_summary(&carol).await.unwrap();
    assert_eq!(empty.user_name, "Carol");
    assert!(empty.ledgers.is_empty());

    let err = summaries.user_summary(&UserId::generate()).await.unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
async fn test_delete_ledger_removes_it_from_summaries() {
    let (_dir, _db, ctx) = setup().await;
    let users = UserService::new(&ctx);
    let ledgers = LedgerService::new(&ctx);
    let alice = users.register("Alice", "h").await.unwrap();
    let bob = users.register("Bob", "h").await.unwrap();
    let book = ledgers.create(&alice, None).await.unwrap();
    ledgers.link_user(&book, &bob).await.unwrap();
    TransactionService::new(&ctx)
        .record(&book, &bob, dec!(3), None, None)
        .await
        .unwrap();

    // Creator and payer cannot leave while the ledger exists
    assert!(users.delete(&alice).await.unwrap_err().is_integrity_violation());
    assert!(users.delete(&bob).await.unwrap_err().is_integrity_violation());

    ledgers.delete(&book).await.unwrap();

    let summaries = SummaryService::new(&ctx);
    assert!(summaries.user_summary(&bob).await.unwrap().ledgers.is_empty());
    assert_eq!(summaries.compute_expense(&book).await.unwrap(), Decimal::ZERO);
    users.delete(&bob).await.unwrap();
    assert!(users.get(&bob).await.unwrap_err().is_not_found());
}

#[tokio::test]
async fn test_expense_overflow_is_an_error() {
    let (_dir, _db, ctx) = setup().await;
    let alice = UserService::new(&ctx).register("Alice", "h").await.unwrap();
    let book = LedgerService::new(&ctx).create(&alice, None).await.unwrap();
    let transactions = TransactionService::new(&ctx);

    transactions.record(&book, &alice, Decimal::MAX, None, None).await.unwrap();
    transactions.record(&book, &alice, Decimal::MAX, None, None).await.unwrap();

    let err = SummaryService::new(&ctx).compute_expense(&book).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Other);
}

#[tokio::test]
async fn test_user_summary_skips_dangling_ledger_link() {
    let (_dir, db, ctx) = setup().await;
    let alice = UserService::new(&ctx).register("Alice", "h").await.unwrap();
    let book = LedgerService::new(&ctx).create(&alice, Some("Real")).await.unwrap();

    // Link row whose ledger never existed; only possible with FK checks off
    let mut raw = SqliteConnection::connect_with(&db.config().connect_options().foreign_keys(false))
        .await
        .unwrap();
    sqlx::query("INSERT INTO user_ledgers (user_id, ledger_id) VALUES (?, ?)")
        .bind(alice.to_string())
        .bind(LedgerId::generate().to_string())
        .execute(&mut raw)
        .await
        .unwrap();
    raw.close().await.unwrap();

    let summaries = SummaryService::new(&ctx);
    assert_eq!(summaries.ledger_ids_for_user(&alice).await.unwrap().len(), 2);

    let summary = summaries.user_summary(&alice).await.unwrap();
    assert_eq!(summary.user_name, "Alice");
    assert_eq!(summary.ledgers.len(), 1);
    assert_eq!(summary.ledgers[0].ledger_id, book);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_writes_wait_for_the_lock() {
    let (_dir, _db, ctx) = setup().await;
    let alice = UserService::new(&ctx).register("Alice", "h").await.unwrap();
    let book = LedgerService::new(&ctx).create(&alice, None).await.unwrap();

    let mut handles = Vec::new();
    for i in 0..40 {
        let ctx = ctx.clone();
        handles.push(tokio::spawn(async move {
            if i % 2 == 0 {
                TransactionService::new(&ctx)
                    .record(&book, &alice, dec!(1.25), None, None)
                    .await
                    .map(|_| ())
            } else {
                LedgerService::new(&ctx).create(&alice, None).await.map(|_| ())
            }
        }));
    }

    let mut failures = Vec::new();
    for handle in handles {
        if let Err(err) = handle.await.unwrap() {
            failures.push(err.to_string());
        }
    }
    assert!(failures.is_empty(), "{:?}", failures);

    let summaries = SummaryService::new(&ctx);
    assert_eq!(summaries.compute_expense(&book).await.unwrap(), dec!(25.00));
    assert_eq!(summaries.user_summary(&alice).await.unwrap().ledgers.len(), 21);
}
