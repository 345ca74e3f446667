//! Integration tests for the authenticated request pipeline
//!
//! **Coverage:**
//! - Token reuse across calls and single-flight refresh under concurrency
//! - 401 handling: one invalidate-and-replay, then surface the error
//! - Timeouts (headers or body) are reported with the configured duration
//!   and never replayed
//! - GET response caching and invalidation by writes, including reads that
//!   overlap a write
//! - Ship-and-invoice rejections folded into an outcome
//! - Tool facade end to end over HTTP
//!
//! **Infrastructure:**
//! - WireMock HTTP server playing both the token authority and the API

#![allow(dead_code)]

#[path = "support.rs"]
mod support;

use std::sync::Arc;
use std::time::Duration;

use erpbridge_core::{
    ErpClient, ErpToolService, GetCustomersArgs, GetSalesOrderLinesArgs, ShipAndInvoiceOrderArgs,
};
use erpbridge_domain::{ErpError, ListQuery};
use erpbridge_infra::CredentialProvider;
use serde_json::{json, Value};
use support::{
    api_client, credential_manager, customer_json, mount_token, mount_token_sequence, test_config,
    COMPANY_PATH, ORDER_ID, TOKEN_PATH,
};
use wiremock::matchers::{header, header_exists, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn collection(values: Vec<Value>) -> Value {
    json!({ "@odata.context": "https://api.example.com/$metadata#customers", "value": values })
}

// ============================================================================
// Credential lifecycle through the pipeline
// ============================================================================

#[tokio::test]
async fn test_token_reused_across_calls() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(TOKEN_PATH))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(support::token_body("token-1", 3600)),
        )
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(format!("{COMPANY_PATH}/customers")))
        .and(header("authorization", "Bearer token-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(collection(vec![])))
        .expect(3)
        .mount(&server)
        .await;

    let config = test_config(&server);
    let manager = credential_manager(&config);
    let client = api_client(config, &manager);

    for _ in 0..3 {
        client.list_customers(&ListQuery::new()).await.expect("list should succeed");
    }

    assert_eq!(manager.exchange_count(), 1);
}

#[tokio::test]
async fn test_unauthorized_refreshes_and_replays_once() {
    let server = MockServer::start().await;
    mount_token_sequence(&server, &["stale-token", "fresh-token"]).await;

    Mock::given(method("GET"))
        .and(path(format!("{COMPANY_PATH}/customers")))
        .and(header("authorization", "Bearer stale-token"))
        .respond_with(ResponseTemplate::new(401).set_body_string("token expired"))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(format!("{COMPANY_PATH}/customers")))
        .and(header("authorization", "Bearer fresh-token"))
        .and(header("x-retry-attempt", "1"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(collection(vec![customer_json("10000")])),
        )
        .expect(1)
        .mount(&server)
        .await;

    let config = test_config(&server);
    let manager = credential_manager(&config);
    let client = api_client(config, &manager);

    let customers = client.list_customers(&ListQuery::new()).await.expect("replay should succeed");

    assert_eq!(customers.len(), 1);
    assert_eq!(customers[0].number, "10000");
    assert_eq!(manager.exchange_count(), 2);

    let snapshot = client.metrics_snapshot();
    assert_eq!(snapshot.total_requests, 2);
    assert_eq!(snapshot.error_count, 1);
    assert_eq!(snapshot.in_flight, 0);
}

#[tokio::test]
async fn test_second_unauthorized_is_surfaced() {
    let server = MockServer::start().await;
    mount_token(&server, "token").await;
    Mock::given(method("GET"))
        .and(path(format!("{COMPANY_PATH}/items")))
        .respond_with(ResponseTemplate::new(401).set_body_string("denied"))
        .expect(2)
        .mount(&server)
        .await;

    let config = test_config(&server);
    let manager = credential_manager(&config);
    let client = api_client(config, &manager);

    let err = client.list_items(&ListQuery::new()).await.unwrap_err();

    assert_eq!(err, ErpError::Api { status: 401, body: "denied".into() });
    assert_eq!(client.metrics_snapshot().error_count, 2);
    assert_eq!(client.in_flight(), 0);
}

#[tokio::test]
async fn test_token_endpoint_rejection_is_authentication_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(TOKEN_PATH))
        .respond_with(ResponseTemplate::new(400).set_body_string("invalid_client"))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(collection(vec![])))
        .expect(0)
        .mount(&server)
        .await;

    let config = test_config(&server);
    let manager = credential_manager(&config);
    let client = api_client(config, &manager);

    let err = client.list_customers(&ListQuery::new()).await.unwrap_err();
    assert!(matches!(
        err,
        ErpError::Authentication { status: Some(400), ref body } if body == "invalid_client"
    ));

    let snapshot = client.metrics_snapshot();
    assert_eq!(snapshot.total_requests, 1);
    assert_eq!(snapshot.error_count, 1);
    assert_eq!(snapshot.in_flight, 0);
}

#[tokio::test]
async fn test_concurrent_calls_share_one_exchange() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(TOKEN_PATH))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(support::token_body("shared", 3600))
                .set_delay(Duration::from_millis(100)),
        )
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(format!("{COMPANY_PATH}/salesOrders")))
        .and(header("authorization", "Bearer shared"))
        .respond_with(ResponseTemplate::new(200).set_body_json(collection(vec![])))
        .expect(8)
        .mount(&server)
        .await;

    let config = test_config(&server);
    let manager = credential_manager(&config);
    let client = Arc::new(api_client(config, &manager));

    let calls = (0..8).map(|_| {
        let client = Arc::clone(&client);
        async move { client.list_sales_orders(&ListQuery::new()).await }
    });
    let results = futures::future::join_all(calls).await;

    assert!(results.iter().all(Result::is_ok));
    assert_eq!(manager.exchange_count(), 1);
    assert_eq!(client.in_flight(), 0);
}

// ============================================================================
// Transport behaviour
// ============================================================================

#[tokio::test]
async fn test_timeout_is_not_replayed() {
    let server = MockServer::start().await;
    mount_token(&server, "token").await;
    Mock::given(method("GET"))
        .and(path(format!("{COMPANY_PATH}/customers")))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(collection(vec![]))
                .set_delay(Duration::from_secs(2)),
        )
        .expect(1)
        .mount(&server)
        .await;

    let mut config = test_config(&server);
    config.client.request_timeout_ms = 200;
    let manager = credential_manager(&config);
    let client = api_client(config, &manager);

    let err = client.list_customers(&ListQuery::new()).await.unwrap_err();

    assert_eq!(err, ErpError::Timeout(Duration::from_millis(200)));
    let snapshot = client.metrics_snapshot();
    assert_eq!(snapshot.total_requests, 1);
    assert_eq!(snapshot.error_count, 1);
    assert_eq!(client.in_flight(), 0);
}

#[tokio::test]
async fn test_stalled_body_times_out() {
    let token_server = MockServer::start().await;
    mount_token(&token_server, "token").await;

    let mut config = test_config(&token_server);
    config.erp.base_url = support::stalled_body_server().await;
    config.client.request_timeout_ms = 200;
    let manager = credential_manager(&config);
    let client = api_client(config, &manager);

    let outcome =
        tokio::time::timeout(Duration::from_secs(3), client.list_customers(&ListQuery::new()))
            .await
            .expect("a stalled body must not hold the call open");

    assert_eq!(outcome.unwrap_err(), ErpError::Timeout(Duration::from_millis(200)));
    let snapshot = client.metrics_snapshot();
    assert_eq!(snapshot.total_requests, 1);
    assert_eq!(snapshot.error_count, 1);
    assert_eq!(client.in_flight(), 0);
}

#[tokio::test]
async fn test_correlation_id_is_stable_across_replay() {
    let server = MockServer::start().await;
    mount_token_sequence(&server, &["first", "second"]).await;
    Mock::given(method("GET"))
        .and(header("authorization", "Bearer first"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(header("authorization", "Bearer second"))
        .and(header_exists("x-correlation-id"))
        .respond_with(ResponseTemplate::new(200).set_body_json(collection(vec![])))
        .mount(&server)
        .await;

    let config = test_config(&server);
    let manager = credential_manager(&config);
    let client = api_client(config, &manager);

    client.list_items(&ListQuery::new()).await.expect("replay should succeed");

    let requests = server.received_requests().await.expect("recording enabled");
    let ids: Vec<String> = requests
        .iter()
        .filter(|r| r.url.path().ends_with("/items"))
        .map(|r| {
            r.headers
                .get("x-correlation-id")
                .and_then(|v| v.to_str().ok())
                .map(str::to_string)
                .expect("correlation header")
        })
        .collect();

    assert_eq!(ids.len(), 2);
    assert_eq!(ids[0], ids[1]);
    assert!(uuid::Uuid::parse_str(&ids[0]).is_ok());
}

// ============================================================================
// Response cache
// ============================================================================

#[tokio::test]
async fn test_cached_get_skips_network() {
    let server = MockServer::start().await;
    mount_token(&server, "token").await;
    Mock::given(method("GET"))
        .and(path(format!("{COMPANY_PATH}/customers")))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(collection(vec![customer_json("20000")])),
        )
        .expect(1)
        .mount(&server)
        .await;

    let mut config = test_config(&server);
    config.client.cache_ttl_seconds = 60;
    let manager = credential_manager(&config);
    let client = api_client(config, &manager);

    let first = client.list_customers(&ListQuery::new()).await.unwrap();
    let second = client.list_customers(&ListQuery::new()).await.unwrap();

    assert_eq!(first, second);
    let stats = client.cache_stats();
    assert_eq!(stats.size, 1);
    assert_eq!(stats.hits, 1);
    assert_eq!(client.metrics_snapshot().total_requests, 1);
}

#[tokio::test]
async fn test_successful_write_clears_cache() {
    let server = MockServer::start().await;
    mount_token(&server, "token").await;
    Mock::given(method("GET"))
        .and(path(format!("{COMPANY_PATH}/salesOrders")))
        .respond_with(ResponseTemplate::new(200).set_body_json(collection(vec![])))
        .expect(2)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(format!("{COMPANY_PATH}/salesOrders")))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "id": ORDER_ID,
            "number": "S-ORD101001",
            "customerNumber": "10000",
            "status": "Draft"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let mut config = test_config(&server);
    config.client.cache_ttl_seconds = 60;
    let manager = credential_manager(&config);
    let client = api_client(config, &manager);

    client.list_sales_orders(&ListQuery::new()).await.unwrap();
    let order = client.create_sales_order("10000").await.unwrap();
    assert_eq!(order.number, "S-ORD101001");
    assert_eq!(client.cache_stats().size, 0);

    client.list_sales_orders(&ListQuery::new()).await.unwrap();
}

#[tokio::test]
async fn test_read_overlapping_write_is_not_cached() {
    let server = MockServer::start().await;
    mount_token(&server, "token").await;
    Mock::given(method("GET"))
        .and(path(format!("{COMPANY_PATH}/salesOrders")))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(collection(vec![]))
                .set_delay(Duration::from_millis(400)),
        )
        .expect(2)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(format!("{COMPANY_PATH}/salesOrders")))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "id": ORDER_ID,
            "number": "S-ORD101002",
            "customerNumber": "10000"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let mut config = test_config(&server);
    config.client.cache_ttl_seconds = 60;
    let manager = credential_manager(&config);
    let client = api_client(config, &manager);
    // Exchange up front so both calls below start immediately.
    manager.ensure_valid().await.unwrap();

    let read_query = ListQuery::new();
    let read = client.list_sales_orders(&read_query);
    let write = async {
        tokio::time::sleep(Duration::from_millis(100)).await;
        client.create_sales_order("10000").await
    };
    let (read, write) = tokio::join!(read, write);
    read.expect("read should succeed");
    write.expect("write should succeed");

    assert_eq!(client.cache_stats().size, 0);

    client.list_sales_orders(&ListQuery::new()).await.unwrap();
    assert_eq!(client.cache_stats().hits, 0);
}

// ============================================================================
// Resource operations
// ============================================================================

#[tokio::test]
async fn test_ship_and_invoice_rejection_becomes_outcome() {
    let server = MockServer::start().await;
    mount_token(&server, "token").await;
    Mock::given(method("POST"))
        .and(path(format!("{COMPANY_PATH}/salesOrders({ORDER_ID})/Microsoft.NAV.shipAndInvoice")))
        .respond_with(ResponseTemplate::new(400).set_body_string("Order has no lines"))
        .expect(1)
        .mount(&server)
        .await;

    let config = test_config(&server);
    let manager = credential_manager(&config);
    let client = api_client(config, &manager);

    let outcome = client.ship_and_invoice_order(ORDER_ID).await.expect("rejection is an outcome");

    assert!(!outcome.success);
    assert_eq!(outcome.message, "Error 400: Order has no lines");
    assert!(outcome.data.is_none());
}

#[tokio::test]
async fn test_ship_and_invoice_success_with_empty_body() {
    let server = MockServer::start().await;
    mount_token(&server, "token").await;
    Mock::given(method("POST"))
        .and(path(format!("{COMPANY_PATH}/salesOrders({ORDER_ID})/Microsoft.NAV.shipAndInvoice")))
        .respond_with(ResponseTemplate::new(204))
        .mount(&server)
        .await;

    let config = test_config(&server);
    let manager = credential_manager(&config);
    let client = api_client(config, &manager);

    let outcome = client.ship_and_invoice_order(ORDER_ID).await.unwrap();

    assert!(outcome.success);
    assert_eq!(outcome.message, format!("Sales order {ORDER_ID} shipped and invoiced successfully"));
}

#[tokio::test]
async fn test_create_sales_order_line_posts_item_body() {
    let server = MockServer::start().await;
    mount_token(&server, "token").await;
    Mock::given(method("POST"))
        .and(path(format!("{COMPANY_PATH}/salesOrders({ORDER_ID})/salesOrderLines")))
        .and(wiremock::matchers::body_json(json!({
            "lineType": "Item",
            "lineObjectNumber": "1896-S",
            "quantity": 3.0
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "id": "line-1",
            "documentId": ORDER_ID,
            "sequence": 10000,
            "lineType": "Item",
            "lineObjectNumber": "1896-S",
            "quantity": 3.0
        })))
        .expect(1)
        .mount(&server)
        .await;

    let config = test_config(&server);
    let manager = credential_manager(&config);
    let client = api_client(config, &manager);

    let line = client.create_sales_order_line(ORDER_ID, "1896-S", 3.0).await.unwrap();
    assert_eq!(line.id, "line-1");
}

#[tokio::test]
async fn test_invalid_arguments_never_reach_network() {
    let server = MockServer::start().await;
    mount_token(&server, "token").await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(collection(vec![])))
        .expect(0)
        .mount(&server)
        .await;

    let config = test_config(&server);
    let manager = credential_manager(&config);
    let client = api_client(config, &manager);

    let err = client.list_sales_order_lines("not-a-guid").await.unwrap_err();
    assert!(matches!(err, ErpError::Validation(_)));

    let err = client.list_customers(&ListQuery::new().with_limit(101)).await.unwrap_err();
    assert!(matches!(err, ErpError::Validation(_)));
}

// ============================================================================
// Tool facade over HTTP
// ============================================================================

#[tokio::test]
async fn test_tool_service_end_to_end() {
    let server = MockServer::start().await;
    mount_token(&server, "token").await;
    Mock::given(method("GET"))
        .and(path(format!("{COMPANY_PATH}/customers")))
        .and(query_param("$top", "100"))
        .and(query_param("$filter", "number eq 'O''Brien'"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(collection(vec![customer_json("O'Brien")])),
        )
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(format!("{COMPANY_PATH}/salesOrders({ORDER_ID})/salesOrderLines")))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(format!("{COMPANY_PATH}/salesOrders({ORDER_ID})/Microsoft.NAV.shipAndInvoice")))
        .respond_with(ResponseTemplate::new(409).set_body_string("already posted"))
        .mount(&server)
        .await;

    let config = test_config(&server);
    let manager = credential_manager(&config);
    let service = ErpToolService::new(Arc::new(api_client(config, &manager)));

    let customers = service
        .get_customers(GetCustomersArgs { no: Some("O'Brien".into()), limit: None })
        .await
        .into_success()
        .expect("customers");
    assert_eq!(customers.len(), 1);

    let lines =
        service.get_sales_order_lines(GetSalesOrderLinesArgs { order_id: ORDER_ID.into() }).await;
    assert_eq!(lines.error(), Some("Error 500: boom"));
    assert_eq!(serde_json::to_value(&lines).unwrap(), json!({ "error": "Error 500: boom" }));

    let outcome =
        service.ship_and_invoice_order(ShipAndInvoiceOrderArgs { order_id: ORDER_ID.into() }).await;
    assert!(!outcome.success);
    assert_eq!(outcome.message, "Error 409: already posted");

    let outcome = service
        .ship_and_invoice_order(ShipAndInvoiceOrderArgs { order_id: "S-ORD1".into() })
        .await;
    assert!(!outcome.success);
    assert!(outcome.message.starts_with("Validation error"));
}
