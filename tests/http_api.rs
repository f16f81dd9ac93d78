//! HTTP surface checks: routing, envelopes, status codes, and the
//! idempotency flag as seen by callers.

mod common;

use std::net::SocketAddr;

use axum::body::{to_bytes, Body};
use axum::extract::connect_info::ConnectInfo;
use axum::http::{Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tower::ServiceExt;

use paygate_core::web::build_router;

use common::{harness, TestHarness};

fn request(method: &str, uri: &str, body: Option<Value>, peer: &str) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(value) => {
            builder = builder.header("content-type", "application/json");
            Body::from(value.to_string())
        }
        None => Body::empty(),
    };
    let mut request = builder.body(body).unwrap();
    let addr: SocketAddr = peer.parse().unwrap();
    request.extensions_mut().insert(ConnectInfo(addr));
    request
}

async fn send(app: &Router, req: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(req).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::String(
            String::from_utf8_lossy(&bytes).to_string(),
        ))
    };
    (status, body)
}

fn app(h: &TestHarness) -> Router {
    build_router(h.core.clone())
}

#[tokio::test]
async fn task_lifecycle_over_http() {
    let h = harness();
    let app = app(&h);

    let (status, created) = send(
        &app,
        request(
            "POST",
            "/api/tasks",
            Some(json!({"input": "summarize the report"})),
            "127.0.0.1:4000",
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let task_id = created["task_id"].as_str().unwrap().to_string();

    let (status, fetched) = send(
        &app,
        request("GET", &format!("/api/tasks/{task_id}"), None, "127.0.0.1:4000"),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched["status"], "awaiting_payment");

    let settle = |key: &str| {
        json!({
            "task_id": task_id,
            "amount": 100,
            "payment_id": "pay-1",
            "idempotency_key": key,
        })
    };
    let (status, first) = send(
        &app,
        request("POST", "/api/payments/settlement", Some(settle("key-1")), "127.0.0.1:4000"),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(first["ok"], true);
    assert_eq!(first["idempotent_replay"], false);

    let (status, replay) = send(
        &app,
        request("POST", "/api/payments/settlement", Some(settle("key-1")), "127.0.0.1:4000"),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(replay["idempotent_replay"], true);
    assert_eq!(replay["status"], first["status"]);
}

#[tokio::test]
async fn unknown_task_returns_the_error_envelope() {
    let h = harness();
    let (status, body) = send(
        &app(&h),
        request("GET", "/api/tasks/not-a-uuid", None, "127.0.0.1:4000"),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["code"], "TASK_NOT_FOUND");
}

#[tokio::test]
async fn amount_mismatch_conflict_carries_its_code() {
    let h = harness();
    let app = app(&h);
    let (_, created) = send(
        &app,
        request("POST", "/api/tasks", Some(json!({"input": "x"})), "127.0.0.1:4000"),
    )
    .await;
    let (status, body) = send(
        &app,
        request(
            "POST",
            "/api/payments/settlement",
            Some(json!({
                "task_id": created["task_id"],
                "amount": 1,
                "payment_id": "pay-1",
                "idempotency_key": "key-1",
            })),
            "127.0.0.1:4000",
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"]["code"], "AMOUNT_MISMATCH");
}

#[tokio::test]
async fn oracle_without_token_gets_402_with_challenge() {
    let h = harness();
    let response = app(&h)
        .oneshot(request(
            "POST",
            "/api/oracle/ask",
            Some(json!({"question": "will it ship?"})),
            "127.0.0.1:4000",
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::PAYMENT_REQUIRED);
    let header = response
        .headers()
        .get("x-cashu")
        .and_then(|v| v.to_str().ok())
        .unwrap()
        .to_string();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["error"]["code"], "PAYMENT_REQUIRED");
    assert_eq!(body["payment"]["price"], 42);
    let encoded = body["payment"]["payment_request"].as_str().unwrap();
    assert!(encoded.starts_with("creqA"));
    // the header carries the same encoded request as the body
    assert_eq!(header, encoded);
}

#[tokio::test]
async fn recent_feed_pages_by_sequence() {
    let h = harness();
    let app = app(&h);
    for i in 0..5 {
        let (status, _) = send(
            &app,
            request(
                "POST",
                "/api/oracle/ask",
                Some(json!({"question": format!("question {i}"), "token": "cashuA..."})),
                "127.0.0.1:4000",
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
    }

    let (_, page) = send(
        &app,
        request("GET", "/api/oracle/recent?limit=2", None, "127.0.0.1:4000"),
    )
    .await;
    let entries = page["entries"].as_array().unwrap();
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0]["seq"], 5);
    assert_eq!(entries[1]["seq"], 4);
    assert_eq!(page["next_before_seq"], 4);

    let (_, page) = send(
        &app,
        request(
            "GET",
            "/api/oracle/recent?limit=2&before_seq=4",
            None,
            "127.0.0.1:4000",
        ),
    )
    .await;
    let entries = page["entries"].as_array().unwrap();
    assert_eq!(entries[0]["seq"], 3);
    assert_eq!(entries[1]["seq"], 2);
    assert_eq!(page["next_before_seq"], 2);

    // the final page carries no cursor
    let (_, page) = send(
        &app,
        request(
            "GET",
            "/api/oracle/recent?limit=2&before_seq=2",
            None,
            "127.0.0.1:4000",
        ),
    )
    .await;
    let entries = page["entries"].as_array().unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0]["seq"], 1);
    assert!(page["next_before_seq"].is_null());

    // a page that exactly drains the ring carries no cursor either
    let (_, page) = send(
        &app,
        request("GET", "/api/oracle/recent?limit=5", None, "127.0.0.1:4000"),
    )
    .await;
    assert_eq!(page["entries"].as_array().unwrap().len(), 5);
    assert!(page["next_before_seq"].is_null());

    let (_, stats) = send(
        &app,
        request("GET", "/api/oracle/stats", None, "127.0.0.1:4000"),
    )
    .await;
    assert_eq!(stats["paid_count"], 5);
    assert_eq!(stats["recent_count"], 5);
}

#[tokio::test]
async fn metrics_are_loopback_only_without_a_token() {
    let h = harness();
    let app = app(&h);

    let (status, body) = send(&app, request("GET", "/metrics", None, "127.0.0.1:4000")).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.as_str().unwrap().contains("tasks_created_total 0"));

    let (status, _) = send(&app, request("GET", "/metrics", None, "10.0.0.8:4000")).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn health_reports_ok() {
    let h = harness();
    let (status, body) = send(&app(&h), request("GET", "/health", None, "127.0.0.1:4000")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["ok"], true);
}
