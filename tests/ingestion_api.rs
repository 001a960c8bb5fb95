//! End-to-end behaviour of `POST /api/v1/transactions` through the full
//! router and middleware stack.

use std::sync::Arc;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::response::Response;
use axum::Router;
use serde_json::{json, Value};
use tower::ServiceExt;

use txn_ingest::{
    create_api_router, ApiState, InMemoryTransactionStore, StorageFailure, Transaction,
    TransactionService, TransactionStore,
};

const ROUTE: &str = "/api/v1/transactions";

struct BrokenStore;

#[async_trait]
impl TransactionStore for BrokenStore {
    async fn store(&self, _transaction: Transaction) -> Result<(), StorageFailure> {
        Err(StorageFailure::Unavailable(
            "connection to db-primary.internal:5432 refused".into(),
        ))
    }
}

fn app_with(store: Arc<dyn TransactionStore>) -> Router {
    let service = Arc::new(TransactionService::new(store));
    create_api_router(ApiState::new(service, 1024))
}

fn post(content_type: Option<&str>, body: impl Into<Body>) -> Request<Body> {
    let mut builder = Request::builder().method("POST").uri(ROUTE);
    if let Some(ct) = content_type {
        builder = builder.header("content-type", ct);
    }
    builder.body(body.into()).unwrap()
}

async fn body_bytes(resp: Response) -> Vec<u8> {
    axum::body::to_bytes(resp.into_body(), usize::MAX)
        .await
        .unwrap()
        .to_vec()
}

async fn body_json(resp: Response) -> Value {
    serde_json::from_slice(&body_bytes(resp).await).unwrap()
}

#[tokio::test]
async fn valid_transaction_is_stored_with_empty_body() {
    let store = Arc::new(InMemoryTransactionStore::new());
    let app = app_with(store.clone());

    let resp = app
        .oneshot(post(Some("application/json"), r#"{"item":"bike","cost":5.0}"#))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::CREATED);
    assert!(body_bytes(resp).await.is_empty());

    let stored = store.list();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].transaction.item(), "bike");
    assert_eq!(stored[0].transaction.cost(), 5.0);
}

#[tokio::test]
async fn text_plain_is_unsupported_media_type() {
    let store = Arc::new(InMemoryTransactionStore::new());
    let resp = app_with(store.clone())
        .oneshot(post(Some("text/plain"), r#"{"item":"bike","cost":5.0}"#))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::UNSUPPORTED_MEDIA_TYPE);
    let json = body_json(resp).await;
    assert_eq!(json["kind"], "unsupported_media_type");
    assert_eq!(json["errors"][0]["field"], "content-type");
    assert!(store.is_empty());
}

#[tokio::test]
async fn missing_content_type_is_unsupported_media_type() {
    let resp = app_with(Arc::new(InMemoryTransactionStore::new()))
        .oneshot(post(None, r#"{"item":"bike","cost":5.0}"#))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::UNSUPPORTED_MEDIA_TYPE);
}

#[tokio::test]
async fn broken_json_is_malformed_payload() {
    let resp = app_with(Arc::new(InMemoryTransactionStore::new()))
        .oneshot(post(Some("application/json"), "bad json {"))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let json = body_json(resp).await;
    assert_eq!(json["kind"], "malformed_payload");
    assert_eq!(json["errors"][0]["field"], "body");
}

#[tokio::test]
async fn missing_item_is_reported() {
    let resp = app_with(Arc::new(InMemoryTransactionStore::new()))
        .oneshot(post(Some("application/json"), r#"{"cost":5.0}"#))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        body_json(resp).await,
        json!({
            "kind": "field_invalid",
            "errors": [{"field": "item", "reason": "is required"}]
        })
    );
}

#[tokio::test]
async fn both_fields_invalid_are_reported_together() {
    let store = Arc::new(InMemoryTransactionStore::new());
    let resp = app_with(store.clone())
        .oneshot(post(Some("application/json"), r#"{"item":"","cost":-1}"#))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let json = body_json(resp).await;
    let fields: Vec<&str> = json["errors"]
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["field"].as_str().unwrap())
        .collect();
    assert_eq!(fields, ["item", "cost"]);
    assert!(store.is_empty());
}

#[tokio::test]
async fn storage_failure_does_not_echo_detail() {
    let resp = app_with(Arc::new(BrokenStore))
        .oneshot(post(Some("application/json"), r#"{"item":"bike","cost":5.0}"#))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let text = String::from_utf8(body_bytes(resp).await).unwrap();
    let json: Value = serde_json::from_str(&text).unwrap();
    assert_eq!(json, json!({"message": "storage is unavailable"}));
    assert!(!text.contains("db-primary"));
}

#[tokio::test]
async fn full_store_answers_storage_failure() {
    let store = Arc::new(InMemoryTransactionStore::with_capacity(1));
    let app = app_with(store.clone());
    let body = r#"{"item":"bike","cost":5.0}"#;

    let first = app
        .clone()
        .oneshot(post(Some("application/json"), body))
        .await
        .unwrap();
    assert_eq!(first.status(), StatusCode::CREATED);

    let second = app
        .oneshot(post(Some("application/json"), body))
        .await
        .unwrap();
    assert_eq!(second.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(store.len(), 1);
}

#[tokio::test]
async fn oversize_body_is_payload_too_large() {
    let body = format!(r#"{{"item":"{}","cost":1}}"#, "x".repeat(2048));
    let resp = app_with(Arc::new(InMemoryTransactionStore::new()))
        .oneshot(post(Some("application/json"), body))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(body_json(resp).await, json!({"message": "payload too large"}));
}

#[tokio::test]
async fn vendor_json_with_charset_is_accepted() {
    let resp = app_with(Arc::new(InMemoryTransactionStore::new()))
        .oneshot(post(
            Some("application/vnd.shop+json; charset=utf-8"),
            r#"{"item":"bike","cost":0}"#,
        ))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::CREATED);
}

#[tokio::test]
async fn responses_carry_caller_request_id() {
    let mut req = post(Some("application/json"), r#"{"item":"bike","cost":5.0}"#);
    req.headers_mut()
        .insert("x-request-id", "req-123".parse().unwrap());

    let resp = app_with(Arc::new(InMemoryTransactionStore::new()))
        .oneshot(req)
        .await
        .unwrap();

    assert_eq!(resp.headers()["x-request-id"], "req-123");
}

#[tokio::test]
async fn structured_suffix_without_prefix_is_rejected() {
    let store = Arc::new(InMemoryTransactionStore::new());
    let resp = app_with(store.clone())
        .oneshot(post(Some("application/+json"), r#"{"item":"bike","cost":5.0}"#))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::UNSUPPORTED_MEDIA_TYPE);
    assert!(store.is_empty());
}
