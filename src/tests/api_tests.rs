use super::support::memory_store;
use crate::{
    api::{create_router, route::{TARGET_ADDED, TARGET_REMOVED}},
    cache,
    config::Config,
    db::{target, CheckpointStore, TransactionStore},
    models::IndexedTransaction,
    state::AppState,
};
use axum::{
    body::{to_bytes, Body},
    http::{Method, Request, StatusCode},
    Router,
};
use serde_json::Value;
use std::sync::Arc;
use tower::ServiceExt;

const WATCHED: &str = "0x00000000000000000000000000000000000000ab";

async fn setup() -> (Router, sqlx::SqlitePool) {
    let store = memory_store().await;
    let db_pool = store.pool().clone();

    let state = Arc::new(AppState {
        cache: cache::init_cache(&Config::default()),
        db_pool: db_pool.clone(),
    });

    (create_router(state), db_pool)
}

async fn send_text(app: &Router, method: Method, uri: &str) -> (StatusCode, String) {
    let response = app
        .clone()
        .oneshot(Request::builder().method(method).uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();

    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, String::from_utf8(bytes.to_vec()).unwrap())
}

async fn send(app: &Router, method: Method, uri: &str) -> (StatusCode, Option<String>, Value) {
    let response = app
        .clone()
        .oneshot(Request::builder().method(method).uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();

    let status = response.status();
    let total = response
        .headers()
        .get("X-Total-Count")
        .map(|v| v.to_str().unwrap().to_string());
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);

    (status, total, body)
}

fn indexed(hash: &str, block_number: u64) -> IndexedTransaction {
    IndexedTransaction {
        chain_id: "1".to_string(),
        hash: hash.to_string(),
        block_number,
        block_hash: format!("0xblock{}", block_number),
        from: "0xf1".to_string(),
        to: WATCHED.to_string(),
        input: "0xa9059cbb".to_string(),
        value: "0".to_string(),
        timestamp: "2024-01-01 00:00:00".to_string(),
    }
}

#[tokio::test]
async fn add_and_remove_target() {
    let (app, pool) = setup().await;
    let uri = format!(
        "/targets?chain_id=1&address={}&method_signature=0xA9059CBB&action=add",
        WATCHED
    );

    let (status, text) = send_text(&app, Method::POST, &uri).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(text, TARGET_ADDED);
    assert!(text.contains("next start"));

    let targets = target::get_targets(&pool, "1").await.unwrap();
    assert_eq!(targets.len(), 1);
    assert_eq!(targets[0].method_signature, "0xa9059cbb");

    let remove = uri.replace("action=add", "action=remove");
    let (status, text) = send_text(&app, Method::POST, &remove).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(text, TARGET_REMOVED);

    let (status, _, _) = send(&app, Method::POST, &remove).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn invalid_target_requests_are_rejected() {
    let (app, _) = setup().await;

    let (status, _, body) = send(
        &app,
        Method::POST,
        "/targets?chain_id=1&address=0xnothex&method_signature=0x1234&action=add",
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Invalid EVM address format");

    let uri = format!("/targets?chain_id=1&address={}&method_signature=0x123&action=add", WATCHED);
    let (status, _, _) = send(&app, Method::POST, &uri).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let uri = format!("/targets?chain_id=1&address={}&method_signature=0x1234&action=watch", WATCHED);
    let (status, _, _) = send(&app, Method::POST, &uri).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let uri = format!("/targets?chain_id=mainnet&address={}&method_signature=0x1234&action=add", WATCHED);
    let (status, _, _) = send(&app, Method::POST, &uri).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn transactions_are_paged_with_total_count() {
    let (app, pool) = setup().await;
    let store = crate::db::SqliteStore::new(pool);
    store
        .upsert_transactions(&[indexed("0xaa", 10), indexed("0xbb", 11), indexed("0xcc", 12)])
        .await
        .unwrap();

    let uri = format!("/transactions?chain_id=1&address={}&offset=1&limit=1", WATCHED);
    let (status, total, body) = send(&app, Method::GET, &uri).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(total.as_deref(), Some("3"));
    assert_eq!(body["meta"]["total"], 3);
    assert_eq!(body["meta"]["offset"], 1);
    assert_eq!(body["data"].as_array().unwrap().len(), 1);
    assert_eq!(body["data"][0]["hash"], "0xbb");
    assert_eq!(body["data"][0]["block_number"], 11);
}

#[tokio::test]
async fn transactions_query_validates_parameters() {
    let (app, _) = setup().await;

    let (status, _, _) = send(&app, Method::GET, "/transactions?chain_id=1&limit=0").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _, _) = send(&app, Method::GET, "/transactions?chain_id=1&offset=-1").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _, _) = send(&app, Method::GET, "/transactions?chain_id=1&address=0x12").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, total, body) = send(&app, Method::GET, "/transactions?chain_id=1").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(total.as_deref(), Some("0"));
    assert!(body["data"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn checkpoints_report_progress() {
    let (app, pool) = setup().await;
    let store = crate::db::SqliteStore::new(pool);
    store.upsert_checkpoint("1", 102, "0xblock102").await.unwrap();

    let (status, _, body) = send(&app, Method::GET, "/checkpoints").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"][0]["chain_id"], "1");
    assert_eq!(body["data"][0]["block_number"], 102);
}
