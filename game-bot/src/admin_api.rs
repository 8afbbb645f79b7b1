//! Optional HTTP admin API, mounted only when `ADMIN_API_TOKEN` is set.
//!
//! - `GET  /admin/stats`
//! - `GET  /admin/broadcasts`
//! - `POST /admin/broadcasts` with `{ "text": "..." }`
//! - `POST /admin/broadcasts/{id}/cancel`
//!
//! Every route requires `Authorization: Bearer <token>`.

use std::sync::Arc;

use axum::{
    extract::{Path, Request, State},
    http::{header, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use storage::{BotStats, BroadcastRecord, Database};
use thiserror::Error;
use tracing::{error, info, warn};

use crate::broadcast::BroadcastHandle;
use crate::core::{secrets_match, DbotError, HandlerError};

const LIST_LIMIT: i64 = 50;

/// Admin API error type.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("unauthorized")]
    Unauthorized,

    #[error("{0} not found")]
    NotFound(String),

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<DbotError> for ApiError {
    fn from(e: DbotError) -> Self {
        match e {
            DbotError::Handler(HandlerError::InvalidCommand(msg)) => ApiError::Validation(msg),
            other => ApiError::Internal(other.to_string()),
        }
    }
}

impl From<storage::StorageError> for ApiError {
    fn from(e: storage::StorageError) -> Self {
        ApiError::Internal(e.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            Self::Unauthorized => (StatusCode::UNAUTHORIZED, json!({ "error": "unauthorized" })),
            Self::NotFound(what) => (
                StatusCode::NOT_FOUND,
                json!({ "error": "not_found", "message": format!("{} not found", what) }),
            ),
            Self::Validation(msg) => (
                StatusCode::BAD_REQUEST,
                json!({ "error": "validation", "message": msg }),
            ),
            Self::Internal(msg) => {
                error!(error = %msg, "Admin API internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({ "error": "internal", "message": "Internal error" }),
                )
            }
        };
        (status, Json(body)).into_response()
    }
}

#[derive(Clone)]
pub struct AdminApiState {
    pub token: Arc<str>,
    pub db: Database,
    pub broadcasts: BroadcastHandle,
}

#[derive(Debug, Deserialize)]
pub struct CreateBroadcastRequest {
    pub text: String,
}

#[derive(Debug, Serialize)]
pub struct BroadcastListResponse {
    pub broadcasts: Vec<BroadcastRecord>,
}

#[derive(Debug, Serialize)]
pub struct CancelResponse {
    pub id: i64,
    pub cancelled: bool,
}

pub fn router(state: AdminApiState) -> Router {
    Router::new()
        .route("/admin/stats", get(get_stats))
        .route("/admin/broadcasts", get(list_broadcasts).post(create_broadcast))
        .route("/admin/broadcasts/{id}/cancel", post(cancel_broadcast))
        .layer(middleware::from_fn_with_state(state.clone(), require_token))
        .with_state(state)
}

async fn require_token(
    State(state): State<AdminApiState>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let presented = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "));
    if !presented.is_some_and(|p| secrets_match(p, &state.token)) {
        warn!(path = %request.uri().path(), "Admin API call without valid token");
        return Err(ApiError::Unauthorized);
    }
    Ok(next.run(request).await)
}

async fn get_stats(State(state): State<AdminApiState>) -> Result<Json<BotStats>, ApiError> {
    Ok(Json(state.db.stats().await?))
}

async fn list_broadcasts(
    State(state): State<AdminApiState>,
) -> Result<Json<BroadcastListResponse>, ApiError> {
    let broadcasts = state.broadcasts.recent(LIST_LIMIT).await?;
    Ok(Json(BroadcastListResponse { broadcasts }))
}

async fn create_broadcast(
    State(state): State<AdminApiState>,
    Json(body): Json<CreateBroadcastRequest>,
) -> Result<(StatusCode, Json<BroadcastRecord>), ApiError> {
    if body.text.trim().is_empty() {
        return Err(ApiError::Validation("text must not be empty".to_string()));
    }
    // created_by 0: submitted over HTTP rather than by a Telegram admin.
    let record = state.broadcasts.submit(&body.text, 0).await?;
    info!(broadcast_id = record.id, "Broadcast created via admin API");
    Ok((StatusCode::CREATED, Json(record)))
}

async fn cancel_broadcast(
    State(state): State<AdminApiState>,
    Path(id): Path<i64>,
) -> Result<Json<CancelResponse>, ApiError> {
    if state.broadcasts.get(id).await?.is_none() {
        return Err(ApiError::NotFound(format!("Broadcast {}", id)));
    }
    let cancelled = state.broadcasts.cancel(id).await?;
    Ok(Json(CancelResponse { id, cancelled }))
}
