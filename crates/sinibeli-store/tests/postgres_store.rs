//! PostgreSQL store tests against a live database.
//!
//! These tests need a disposable database in `DATABASE_URL`. Each test owns
//! an id range and clears it before running, so they can run in parallel.
//!
//! Run with: `DATABASE_URL=postgres://... cargo test -p sinibeli-store --test postgres_store -- --ignored`

use chrono::{DateTime, TimeZone, Utc};
use rust_decimal::Decimal;

use sinibeli_core::{
    ActivityFilter, Company, Customer, DomainError, Entity, PageRequest, PaymentStatus, Product,
    SummaryFilter, Transaction, TransactionType,
};
use sinibeli_store::{
    CompanyRepository, CustomerRepository, PgStore, ProductRepository, StoreError,
    TransactionRepository,
};

// ============================================================================
// Fixtures
// ============================================================================

/// Width of the id range each test owns.
const RANGE: i64 = 1_000;

async fn store(base: i64) -> PgStore {
    let url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");
    let store = PgStore::connect(&url, 5).await.expect("Failed to connect");
    store.migrate().await.expect("Failed to migrate");

    for table in ["transaction", "customer", "company", "product"] {
        sqlx::query(&format!("DELETE FROM {table} WHERE id >= $1 AND id < $2"))
            .bind(base)
            .bind(base + RANGE)
            .execute(store.pool())
            .await
            .expect("Failed to clear test rows");
    }
    store
}

fn at(day: u32, hour: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 5, day, hour, 0, 0).unwrap()
}

fn dec(s: &str) -> Decimal {
    s.parse().unwrap()
}

async fn seed(store: &PgStore, company_id: i64, customers: &[i64], product_id: i64) {
    store
        .create_company(&Company {
            id: company_id,
            name: format!("Company {company_id}"),
            company_type: "retail".into(),
            address: "Jl. Merdeka 1".into(),
            city: "Bandung".into(),
        })
        .await
        .unwrap();
    for &id in customers {
        store
            .create_customer(&Customer {
                id,
                first_name: format!("First{id}"),
                last_name: format!("Last{id}"),
                birth_date: None,
                email: None,
                phone_number: None,
                address: None,
                gender: None,
                company_id,
                photo: None,
            })
            .await
            .unwrap();
    }
    store
        .create_product(&Product {
            id: product_id,
            product_name: format!("Product {product_id}"),
            service_fee: dec("2.50"),
            service_fee_percentage: false,
        })
        .await
        .unwrap();
}

fn purchase(id: i64, customer_id: i64, product_id: i64, amount: &str, when: DateTime<Utc>) -> Transaction {
    Transaction {
        id,
        customer_id,
        transaction_type: TransactionType::Purchase,
        amount: dec(amount),
        transaction_datetime: when,
        tax_amount: Decimal::ZERO,
        tax_type: None,
        payment_status: PaymentStatus::Completed,
        product_id,
    }
}

fn refund(id: i64, customer_id: i64, product_id: i64, amount: &str, when: DateTime<Utc>) -> Transaction {
    Transaction {
        transaction_type: TransactionType::Refund,
        ..purchase(id, customer_id, product_id, amount, when)
    }
}

fn rejection(err: StoreError) -> DomainError {
    match err {
        StoreError::Rejected(e) => e,
        other => panic!("expected a rejection, got {other:?}"),
    }
}

// ============================================================================
// Admission
// ============================================================================

#[tokio::test]
#[ignore = "requires PostgreSQL (DATABASE_URL)"]
async fn admission_checks_run_in_order() {
    let base = 910_000;
    let store = store(base).await;
    let (company, customer, product) = (base + 1, base + 5, base + 9);
    seed(&store, company, &[customer], product).await;

    let stored = store
        .create_transaction(&purchase(base + 1, customer, product, "20", at(1, 9)))
        .await
        .unwrap();
    assert_eq!(stored.amount.to_string(), "20.00");
    assert_eq!(stored.tax_amount.to_string(), "0.00");

    let err = store
        .create_transaction(&purchase(base + 1, base + 6, base + 10, "1.00", at(1, 9)))
        .await
        .unwrap_err();
    assert_eq!(rejection(err), DomainError::NotFound(Entity::Customer));

    let err = store
        .create_transaction(&purchase(base + 1, customer, base + 10, "1.00", at(1, 9)))
        .await
        .unwrap_err();
    assert_eq!(rejection(err), DomainError::NotFound(Entity::Product));

    let err = store
        .create_transaction(&purchase(base + 1, customer, product, "20.00", at(1, 9)))
        .await
        .unwrap_err();
    assert_eq!(rejection(err), DomainError::DuplicateTransactionId);

    assert_eq!(store.get_transaction(base + 1).await.unwrap(), Some(stored));
}

#[tokio::test]
#[ignore = "requires PostgreSQL (DATABASE_URL)"]
async fn refunds_see_only_their_pair() {
    let base = 911_000;
    let store = store(base).await;
    let (customer, product, other_product) = (base + 5, base + 9, base + 10);
    seed(&store, base + 1, &[customer], product).await;
    store
        .create_product(&Product {
            id: other_product,
            product_name: "Other".into(),
            service_fee: Decimal::ZERO,
            service_fee_percentage: false,
        })
        .await
        .unwrap();

    store
        .create_transaction(&purchase(base + 1, customer, other_product, "100.00", at(1, 9)))
        .await
        .unwrap();
    let err = store
        .create_transaction(&refund(base + 2, customer, product, "10.00", at(2, 9)))
        .await
        .unwrap_err();
    assert_eq!(rejection(err), DomainError::InsufficientPurchaseHistory);

    store
        .create_transaction(&purchase(base + 3, customer, product, "50.00", at(3, 9)))
        .await
        .unwrap();
    let err = store
        .create_transaction(&refund(base + 4, customer, product, "50.01", at(4, 9)))
        .await
        .unwrap_err();
    assert_eq!(rejection(err), DomainError::RefundExceedsAvailable);
    store
        .create_transaction(&refund(base + 4, customer, product, "50.00", at(4, 9)))
        .await
        .unwrap();
}

#[tokio::test]
#[ignore = "requires PostgreSQL (DATABASE_URL)"]
async fn concurrent_refunds_cannot_overdraw() {
    let base = 912_000;
    let store = store(base).await;
    let (customer, product) = (base + 5, base + 9);
    seed(&store, base + 1, &[customer], product).await;
    store
        .create_transaction(&purchase(base + 1, customer, product, "100.00", at(1, 9)))
        .await
        .unwrap();

    let first = refund(base + 2, customer, product, "100.00", at(2, 9));
    let second = refund(base + 3, customer, product, "100.00", at(2, 10));
    let (a, b) = tokio::join!(
        store.create_transaction(&first),
        store.create_transaction(&second)
    );

    assert_eq!(usize::from(a.is_ok()) + usize::from(b.is_ok()), 1);
    let refunded: Decimal = store
        .list_transactions()
        .await
        .unwrap()
        .iter()
        .filter(|t| t.customer_id == customer && t.transaction_type == TransactionType::Refund)
        .map(|t| t.amount)
        .sum();
    assert_eq!(refunded, dec("100.00"));
}

// ============================================================================
// Reports
// ============================================================================

#[tokio::test]
#[ignore = "requires PostgreSQL (DATABASE_URL)"]
async fn summary_breaks_timestamp_ties_by_id() {
    let base = 913_000;
    let store = store(base).await;
    let (company, customer, product) = (base + 1, base + 5, base + 9);
    seed(&store, company, &[customer], product).await;

    for (id, when) in [
        (base + 3, at(1, 9)),
        (base + 2, at(1, 9)),
        (base + 4, at(5, 9)),
        (base + 6, at(5, 9)),
        (base + 5, at(3, 9)),
    ] {
        store
            .create_transaction(&purchase(id, customer, product, "10.00", when))
            .await
            .unwrap();
    }

    let (rows, total) = store
        .transaction_summary_filtered(&SummaryFilter {
            company_id: Some(company),
            ..SummaryFilter::default()
        })
        .await
        .unwrap();

    assert_eq!(total, 1);
    let row = &rows[0];
    assert_eq!(row.count, 5);
    assert_eq!(row.amount, dec("50.00"));
    assert_eq!(row.first_trx_on, at(1, 9));
    assert_eq!(row.id_first_trx, base + 2);
    assert_eq!(row.last_trx_on, at(5, 9));
    assert_eq!(row.id_last_trx, base + 6);
}

#[tokio::test]
#[ignore = "requires PostgreSQL (DATABASE_URL)"]
async fn activity_counts_filtered_groups_and_keeps_row_numbers() {
    let base = 914_000;
    let store = store(base).await;
    let company = base + 1;
    let (busy, quiet, steady, product) = (base + 5, base + 6, base + 7, base + 9);
    seed(&store, company, &[busy, quiet, steady], product).await;

    let mut id = base;
    for (customer, times) in [(busy, 3), (quiet, 1), (steady, 2)] {
        for hour in 0..times {
            id += 1;
            store
                .create_transaction(&purchase(id, customer, product, "10.00", at(1, 8 + hour)))
                .await
                .unwrap();
        }
    }

    let filter = ActivityFilter {
        company_id: Some(company),
        min_trx_count: Some(2),
        page: PageRequest::new(Some(2), Some(1)),
    };
    let (rows, total) = store.customer_activity(&filter).await.unwrap();

    assert_eq!(total, 2);
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].customer_id, steady);
    assert_eq!(rows[0].row_number, 2);
    assert_eq!(rows[0].count_trx, 2);
    assert_eq!(rows[0].full_name, format!("First{steady} Last{steady}"));

    let far = ActivityFilter {
        page: PageRequest::new(Some(i64::MAX), Some(100)),
        ..filter
    };
    let (rows, total) = store.customer_activity(&far).await.unwrap();
    assert!(rows.is_empty());
    assert_eq!(total, 2);

    let (rows, total) = store
        .transaction_summary_filtered(&SummaryFilter {
            company_id: Some(company),
            page: PageRequest::new(Some(i64::MAX), Some(100)),
            ..SummaryFilter::default()
        })
        .await
        .unwrap();
    assert!(rows.is_empty());
    assert_eq!(total, 1);
}
