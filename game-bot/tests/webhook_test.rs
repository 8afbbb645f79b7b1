//! HTTP surface tests: webhook endpoint and admin API, driven through `tower::ServiceExt::oneshot`.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tower::ServiceExt;

mod common;

use common::{memory_db, MockBot};
use game_bot::broadcast;
use game_bot::build_router;
use game_bot::config::{AdminConfig, BaseConfig, BotConfig, BroadcastConfig, WebhookConfig};
use game_bot::webhook::{update_queue, SECRET_HEADER};
use storage::{Database, UserRecord};
use teloxide::types::Update;

const PATH: &str = "/tg/updates";
const SECRET: &str = "test-secret_123";
const ADMIN_TOKEN: &str = "admin-token";

fn test_config(queue_capacity: usize, api_token: Option<&str>) -> BotConfig {
    BotConfig {
        base: BaseConfig {
            bot_token: "test_token".to_string(),
            telegram_api_url: None,
            log_file: "logs/test.log".to_string(),
            database_url: "sqlite::memory:".to_string(),
        },
        webhook: WebhookConfig {
            public_url: None,
            listen_addr: "127.0.0.1:0".parse().unwrap(),
            path: PATH.to_string(),
            secret: SECRET.to_string(),
            queue_capacity,
            max_in_flight: 4,
        },
        admin: AdminConfig {
            admin_ids: vec![],
            api_token: api_token.map(str::to_string),
        },
        broadcast: BroadcastConfig::default(),
    }
}

async fn app(
    queue_capacity: usize,
    api_token: Option<&str>,
) -> (Router, mpsc::Receiver<Update>, Database) {
    let config = test_config(queue_capacity, api_token);
    let db = memory_db().await;
    let (tx, rx) = update_queue(config.webhook.queue_capacity);
    let (handle, _worker) = broadcast::channel(
        &db,
        Arc::new(MockBot::new()),
        config.broadcast.clone(),
        CancellationToken::new(),
    );
    (build_router(&config, db.clone(), tx, handle), rx, db)
}

fn update_json(update_id: i64) -> String {
    json!({
        "update_id": update_id,
        "message": {
            "message_id": 1,
            "date": 1_700_000_000,
            "chat": {"id": 42, "type": "private", "first_name": "Player"},
            "from": {"id": 42, "is_bot": false, "first_name": "Player"},
            "text": "/start"
        }
    })
    .to_string()
}

fn webhook_request(secret: Option<&str>, body: String) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri(PATH)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(secret) = secret {
        builder = builder.header(SECRET_HEADER, secret);
    }
    builder.body(Body::from(body)).unwrap()
}

fn admin_request(method: &str, uri: &str, token: Option<&str>, body: Option<Value>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    match body {
        Some(json) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

/// **Test: GET /health answers 200.**
#[tokio::test]
async fn test_health() {
    let (app, _rx, _db) = app(4, None).await;

    let response = app
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["status"], "ok");
}

/// **Test: a valid update with the right secret is enqueued and answered with `{}`.**
#[tokio::test]
async fn test_valid_update_is_enqueued() {
    let (app, mut rx, _db) = app(4, None).await;

    let response = app
        .oneshot(webhook_request(Some(SECRET), update_json(7)))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await, json!({}));
    let update = rx.try_recv().expect("update enqueued");
    assert!(matches!(update.kind, teloxide::types::UpdateKind::Message(_)));
}

/// **Test: missing or wrong secret token → 401 and nothing is enqueued.**
///
/// **Setup:** Webhook secret `test-secret_123`.
/// **Action:** No header; a short guess; a guess of equal length differing in the last byte;
/// the secret plus a suffix.
/// **Expected:** All four → 401; the queue stays empty.
#[tokio::test]
async fn test_wrong_secret_rejected() {
    let (app, mut rx, _db) = app(4, None).await;

    let missing = app
        .clone()
        .oneshot(webhook_request(None, update_json(1)))
        .await
        .unwrap();
    assert_eq!(missing.status(), StatusCode::UNAUTHORIZED);

    for (i, guess) in ["nope", "test-secret_124", "test-secret_1234"].into_iter().enumerate() {
        let wrong = app
            .clone()
            .oneshot(webhook_request(Some(guess), update_json(2 + i as i64)))
            .await
            .unwrap();
        assert_eq!(wrong.status(), StatusCode::UNAUTHORIZED, "guess {guess}");
    }
    assert!(rx.try_recv().is_err());
}

/// **Test: a body that is not an update → 400.**
#[tokio::test]
async fn test_malformed_body_rejected() {
    let (app, mut rx, _db) = app(4, None).await;

    let response = app
        .oneshot(webhook_request(Some(SECRET), "{not json".to_string()))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(rx.try_recv().is_err());
}

/// **Test: a full queue answers 503 so Telegram retries later.**
#[tokio::test]
async fn test_full_queue_returns_503() {
    let (app, _rx, _db) = app(1, None).await;

    let first = app
        .clone()
        .oneshot(webhook_request(Some(SECRET), update_json(1)))
        .await
        .unwrap();
    let second = app
        .oneshot(webhook_request(Some(SECRET), update_json(2)))
        .await
        .unwrap();

    assert_eq!(first.status(), StatusCode::OK);
    assert_eq!(second.status(), StatusCode::SERVICE_UNAVAILABLE);
}

/// **Test: a closed queue (dispatcher gone) answers 503.**
#[tokio::test]
async fn test_closed_queue_returns_503() {
    let (app, rx, _db) = app(4, None).await;
    drop(rx);

    let response = app
        .oneshot(webhook_request(Some(SECRET), update_json(1)))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
}

/// **Test: without ADMIN_API_TOKEN the admin routes do not exist.**
#[tokio::test]
async fn test_admin_api_disabled_without_token() {
    let (app, _rx, _db) = app(4, None).await;

    let response = app
        .oneshot(admin_request("GET", "/admin/stats", Some(ADMIN_TOKEN), None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

/// **Test: admin routes require the bearer token.**
#[tokio::test]
async fn test_admin_api_requires_token() {
    let (app, _rx, _db) = app(4, Some(ADMIN_TOKEN)).await;

    let missing = app
        .clone()
        .oneshot(admin_request("GET", "/admin/stats", None, None))
        .await
        .unwrap();
    assert_eq!(missing.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(body_json(missing).await, json!({ "error": "unauthorized" }));

    let same_length: String = ADMIN_TOKEN.chars().rev().collect();
    for guess in ["guess".to_string(), same_length, format!("{ADMIN_TOKEN}x")] {
        let wrong = app
            .clone()
            .oneshot(admin_request("GET", "/admin/stats", Some(&guess), None))
            .await
            .unwrap();
        assert_eq!(wrong.status(), StatusCode::UNAUTHORIZED, "guess {guess}");
    }
}

/// **Test: GET /admin/stats returns BotStats JSON.**
#[tokio::test]
async fn test_admin_stats() {
    let (app, _rx, db) = app(4, Some(ADMIN_TOKEN)).await;
    db.users()
        .upsert(&UserRecord::new(1, None, None, None))
        .await
        .unwrap();

    let response = app
        .oneshot(admin_request("GET", "/admin/stats", Some(ADMIN_TOKEN), None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let stats = body_json(response).await;
    assert_eq!(stats["total_users"], 1);
    assert_eq!(stats["active_users"], 1);
    assert_eq!(stats["payments"], 0);
}

/// **Test: create, list and cancel broadcasts over HTTP.**
///
/// **Expected:** empty text → 400; valid text → 201 with a pending job; list shows it;
/// cancel → cancelled=true; unknown id → 404.
#[tokio::test]
async fn test_admin_broadcast_routes() {
    let (app, _rx, db) = app(4, Some(ADMIN_TOKEN)).await;

    let empty = app
        .clone()
        .oneshot(admin_request(
            "POST",
            "/admin/broadcasts",
            Some(ADMIN_TOKEN),
            Some(json!({ "text": "  " })),
        ))
        .await
        .unwrap();
    assert_eq!(empty.status(), StatusCode::BAD_REQUEST);

    let created = app
        .clone()
        .oneshot(admin_request(
            "POST",
            "/admin/broadcasts",
            Some(ADMIN_TOKEN),
            Some(json!({ "text": "Server restart in 5 minutes" })),
        ))
        .await
        .unwrap();
    assert_eq!(created.status(), StatusCode::CREATED);
    let job = body_json(created).await;
    assert_eq!(job["status"], "pending");
    let id = job["id"].as_i64().unwrap();

    let listed = app
        .clone()
        .oneshot(admin_request("GET", "/admin/broadcasts", Some(ADMIN_TOKEN), None))
        .await
        .unwrap();
    assert_eq!(listed.status(), StatusCode::OK);
    let list = body_json(listed).await;
    assert_eq!(list["broadcasts"][0]["id"], id);

    let cancelled = app
        .clone()
        .oneshot(admin_request(
            "POST",
            &format!("/admin/broadcasts/{}/cancel", id),
            Some(ADMIN_TOKEN),
            None,
        ))
        .await
        .unwrap();
    assert_eq!(cancelled.status(), StatusCode::OK);
    assert_eq!(body_json(cancelled).await, json!({ "id": id, "cancelled": true }));
    assert!(db.broadcasts().get(id).await.unwrap().unwrap().status.is_terminal());

    let unknown = app
        .oneshot(admin_request(
            "POST",
            "/admin/broadcasts/999/cancel",
            Some(ADMIN_TOKEN),
            None,
        ))
        .await
        .unwrap();
    assert_eq!(unknown.status(), StatusCode::NOT_FOUND);
}
