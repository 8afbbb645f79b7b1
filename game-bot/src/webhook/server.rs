//! HTTP side: secret check, JSON parse, enqueue.

use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::json;
use teloxide::types::Update;
use tokio::sync::mpsc::{self, error::TrySendError};
use tracing::{debug, warn};

use crate::core::secrets_match;

/// Header Telegram sets to the `secret_token` given in setWebhook.
pub const SECRET_HEADER: &str = "x-telegram-bot-api-secret-token";

#[derive(Clone)]
pub struct WebhookState {
    secret: Arc<str>,
    queue: mpsc::Sender<Update>,
}

impl WebhookState {
    pub fn new(secret: impl Into<String>, queue: mpsc::Sender<Update>) -> Self {
        Self {
            secret: Arc::from(secret.into()),
            queue,
        }
    }
}

/// `POST {path}` for updates and `GET /health`.
pub fn router(path: &str, state: WebhookState) -> Router {
    Router::new()
        .route(path, post(receive_update))
        .route("/health", get(health))
        .with_state(state)
}

async fn health() -> impl IntoResponse {
    Json(json!({ "status": "ok" }))
}

async fn receive_update(
    State(state): State<WebhookState>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let provided = headers.get(SECRET_HEADER).and_then(|v| v.to_str().ok());
    if !provided.is_some_and(|p| secrets_match(p, &state.secret)) {
        warn!(has_header = provided.is_some(), "Webhook call with wrong secret token");
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "error": "unauthorized" })),
        )
            .into_response();
    }

    let update: Update = match serde_json::from_slice(&body) {
        Ok(update) => update,
        Err(e) => {
            warn!(error = %e, body_len = body.len(), "Webhook body is not a valid update");
            return (
                StatusCode::BAD_REQUEST,
                Json(json!({ "error": "invalid update" })),
            )
                .into_response();
        }
    };
    let update_id = update.id;

    match state.queue.try_send(update) {
        Ok(()) => {
            debug!(update_id = ?update_id, "step: update enqueued");
            (StatusCode::OK, Json(json!({}))).into_response()
        }
        Err(TrySendError::Full(_)) => {
            warn!(update_id = ?update_id, "Update queue full, asking Telegram to retry");
            StatusCode::SERVICE_UNAVAILABLE.into_response()
        }
        Err(TrySendError::Closed(_)) => {
            warn!(update_id = ?update_id, "Update queue closed, shutting down");
            StatusCode::SERVICE_UNAVAILABLE.into_response()
        }
    }
}
