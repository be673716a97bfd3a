//! Client tests against a mock server.

use chrono::{NaiveDate, TimeZone, Utc};
use rust_decimal::Decimal;
use serde_json::json;
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use sinibeli_client::{ActivityQuery, ClientError, CreateTransaction, SinibeliClient, SummaryQuery};
use sinibeli_core::{TaxType, TransactionType};

fn transaction_json() -> serde_json::Value {
    json!({
        "id": 1,
        "customer_id": 5,
        "transaction_type": "purchase",
        "amount": "100.00",
        "tax_amount": "10.00",
        "tax_type": "VAT",
        "payment_status": "completed",
        "product_id": 9,
        "transaction_datetime": "2024-01-05T08:00:00Z",
    })
}

#[tokio::test]
async fn health_is_unprefixed() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/health"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "ok",
            "service": "sinibeli",
            "version": "0.1.0",
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = SinibeliClient::new(server.uri()).unwrap();
    let health = client.health().await.unwrap();

    assert_eq!(health.status, "ok");
    assert_eq!(health.service, "sinibeli");
}

#[tokio::test]
async fn create_transaction_sends_strings_and_token() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/transactions"))
        .and(header("authorization", "Bearer secret-token"))
        .and(body_json(json!({
            "id": 1,
            "customer_id": 5,
            "transaction_type": "purchase",
            "amount": "100.00",
            "tax_amount": "10.00",
            "tax_type": "VAT",
            "payment_status": "completed",
            "product_id": 9,
            "transaction_datetime": "2024-01-05T08:00:00Z",
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(transaction_json()))
        .expect(1)
        .mount(&server)
        .await;

    let client = SinibeliClient::new(server.uri())
        .unwrap()
        .with_token("secret-token");
    let request = CreateTransaction::purchase(1, 5, 9, Decimal::new(10000, 2))
        .with_tax(TaxType::Vat, Decimal::new(1000, 2))
        .at(Utc.with_ymd_and_hms(2024, 1, 5, 8, 0, 0).unwrap());

    let trx = client.create_transaction(&request).await.unwrap();

    assert_eq!(trx.id, 1);
    assert_eq!(trx.transaction_type, TransactionType::Purchase);
    assert_eq!(trx.amount, Decimal::new(10000, 2));
    assert_eq!(trx.tax_type, Some(TaxType::Vat));
}

#[tokio::test]
async fn rule_failure_becomes_api_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/transactions"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "error": "refund amount exceeds original purchase amount",
        })))
        .mount(&server)
        .await;

    let client = SinibeliClient::new(server.uri()).unwrap();
    let err = client
        .create_transaction(&CreateTransaction::refund(2, 5, 9, Decimal::from(500)))
        .await
        .unwrap_err();

    match err {
        ClientError::Api {
            status, message, ..
        } => {
            assert_eq!(status, 400);
            assert_eq!(message, "refund amount exceeds original purchase amount");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn missing_transaction_is_not_found() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/transactions/42"))
        .respond_with(
            ResponseTemplate::new(404).set_body_json(json!({ "error": "transaction not found" })),
        )
        .mount(&server)
        .await;

    let client = SinibeliClient::new(server.uri()).unwrap();
    let err = client.get_transaction(42).await.unwrap_err();

    assert!(matches!(err, ClientError::NotFound(ref m) if m == "transaction not found"));
    assert_eq!(err.status(), Some(404));
}

#[tokio::test]
async fn non_json_error_keeps_status() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/transactions"))
        .respond_with(ResponseTemplate::new(503).set_body_string("upstream down"))
        .mount(&server)
        .await;

    let client = SinibeliClient::new(server.uri()).unwrap();
    let err = client.list_transactions().await.unwrap_err();

    assert_eq!(err.status(), Some(503));
}

#[tokio::test]
async fn summary_sends_only_set_filters() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/transactions/summary"))
        .and(query_param("company_id", "1"))
        .and(query_param("start_date", "2024-01-01"))
        .and(query_param("min_amount", "5.50"))
        .and(query_param("page_size", "10"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [{
                "id": 1,
                "company_name": "Company 1",
                "product_id": 9,
                "product_name": "Product 9",
                "amount": "60.00",
                "count": 3,
                "tax_value": "6.00",
                "service_fee_percentage": false,
                "service_fee": "2.50",
                "last_trx_on": "2024-01-05T08:00:00Z",
                "id_last_trx": 3,
                "first_trx_on": "2024-01-01T08:00:00Z",
                "id_first_trx": 1,
            }],
            "pagination": { "page": 1, "page_size": 10, "total_items": 1, "total_pages": 1 },
            "applied_filters": { "company_id": 1 },
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = SinibeliClient::new(server.uri()).unwrap();
    let report = client
        .transaction_summary(&SummaryQuery {
            company_id: Some(1),
            start_date: NaiveDate::from_ymd_opt(2024, 1, 1),
            min_amount: Some(Decimal::new(550, 2)),
            page_size: Some(10),
            ..SummaryQuery::default()
        })
        .await
        .unwrap();

    assert_eq!(report.data.len(), 1);
    assert_eq!(report.data[0].count, 3);
    assert_eq!(report.data[0].amount, Decimal::new(6000, 2));
    assert_eq!(report.pagination.total_pages, 1);
    assert_eq!(report.applied_filters["company_id"], 1);
}

#[tokio::test]
async fn activity_report() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/transactions/reports"))
        .and(query_param("min_trx", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [{
                "row_number": 11,
                "company_id": 1,
                "company_name": "Company 1",
                "customer_id": 3,
                "full_name": "Customer 3",
                "count_trx": 4,
            }],
            "pagination": { "page": 2, "page_size": 10, "total_items": 11, "total_pages": 2 },
            "applied_filters": { "min_trx": 2 },
        })))
        .mount(&server)
        .await;

    let client = SinibeliClient::new(server.uri()).unwrap();
    let report = client
        .customer_activity(&ActivityQuery {
            min_trx: Some(2),
            page: Some(2),
            ..ActivityQuery::default()
        })
        .await
        .unwrap();

    assert_eq!(report.data[0].row_number, 11);
    assert_eq!(report.data[0].full_name, "Customer 3");
}

#[tokio::test]
async fn products() {
    let server = MockServer::start().await;
    let product = json!({
        "id": 9,
        "product_name": "Product 9",
        "service_fee": "2.50",
        "service_fee_percentage": false,
    });
    Mock::given(method("GET"))
        .and(path("/api/v1/products/9"))
        .respond_with(ResponseTemplate::new(200).set_body_json(product.clone()))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v1/products"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([product])))
        .mount(&server)
        .await;

    let client = SinibeliClient::new(server.uri()).unwrap();

    let one = client.get_product(9).await.unwrap();
    assert_eq!(one.service_fee, Decimal::new(250, 2));

    let all = client.list_products().await.unwrap();
    assert_eq!(all.len(), 1);
    assert_eq!(all[0].product_name, "Product 9");
}
