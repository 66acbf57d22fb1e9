//! Manual triggers for the scheduled jobs plus season seeding, so an
//! operator can run any pass on demand. All of them sit behind a
//! shared-secret header.

use std::sync::Arc;

use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use tracing::error;

use crate::error::Error;
use crate::jobs;
use crate::seed::{self, SeedRequest};
use crate::sync;
use crate::AppState;

const ADMIN_TOKEN_HEADER: &str = "x-admin-token";

fn authorize(state: &AppState, headers: &HeaderMap) -> Result<(), Response> {
    let presented = headers
        .get(ADMIN_TOKEN_HEADER)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();

    if presented == state.config.server.admin_token {
        Ok(())
    } else {
        Err((
            StatusCode::UNAUTHORIZED,
            Json(json!({ "error": "missing or invalid admin token" })),
        )
            .into_response())
    }
}

fn internal_error(e: &Error) -> Response {
    error!(error = %e, "admin trigger failed");
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({ "error": "internal error" })),
    )
        .into_response()
}

/// POST /api/admin/sync: run one score reconciliation pass now.
pub async fn trigger_sync(State(state): State<Arc<AppState>>, headers: HeaderMap) -> Response {
    if let Err(response) = authorize(&state, &headers) {
        return response;
    }

    match sync::run_score_sync(&state.db, state.feed.as_ref()).await {
        Ok(summary) => (StatusCode::OK, Json(summary)).into_response(),
        Err(e) => internal_error(&e),
    }
}

/// POST /api/admin/report: run one round completion pass now.
pub async fn trigger_report(State(state): State<Arc<AppState>>, headers: HeaderMap) -> Response {
    if let Err(response) = authorize(&state, &headers) {
        return response;
    }

    match sync::run_completion_pass(&state.db, state.notifier.as_ref()).await {
        Ok(()) => (StatusCode::OK, Json(json!({ "status": "ok" }))).into_response(),
        Err(e) => internal_error(&e),
    }
}

/// POST /api/admin/remind: send pick reminders now.
pub async fn trigger_remind(State(state): State<Arc<AppState>>, headers: HeaderMap) -> Response {
    if let Err(response) = authorize(&state, &headers) {
        return response;
    }

    match jobs::send_pick_reminders(&state.db, state.notifier.as_ref()).await {
        Ok(sent) => (StatusCode::OK, Json(json!({ "sent": sent }))).into_response(),
        Err(e) => internal_error(&e),
    }
}

/// POST /api/admin/seed: destructive season (re)initialization.
pub async fn trigger_seed(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(request): Json<SeedRequest>,
) -> Response {
    if let Err(response) = authorize(&state, &headers) {
        return response;
    }

    match seed::reseed_season(&state.db, state.feed.as_ref(), &request).await {
        Ok(summary) => (StatusCode::OK, Json(summary)).into_response(),
        Err(Error::InvalidRequest(reason)) => (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(json!({ "error": reason })),
        )
            .into_response(),
        Err(e) => internal_error(&e),
    }
}
