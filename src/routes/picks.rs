use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use tracing::error;

use crate::db::queries;
use crate::error::Error;
use crate::picks::{self, PickRequest};
use crate::AppState;

/// POST /api/picks: the pick assignment guard boundary.
///
/// Returns a confirmation with the chosen team's label, or a `locked`
/// rejection carrying the participant's frozen existing selection.
pub async fn submit_pick(
    State(state): State<Arc<AppState>>,
    Json(request): Json<PickRequest>,
) -> Response {
    match picks::submit_pick(&state.db, &request).await {
        Ok(response) => (StatusCode::OK, Json(response)).into_response(),
        Err(Error::PickRejected(reason)) => (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(json!({ "error": reason })),
        )
            .into_response(),
        Err(e) => {
            error!(error = %e, "pick submission failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": "internal error" })),
            )
                .into_response()
        }
    }
}

/// GET /api/groups/{group_id}/teams: teams still pickable for the group's
/// current round (their game has not kicked off).
pub async fn list_selectable_teams(
    State(state): State<Arc<AppState>>,
    Path(group_id): Path<String>,
) -> Response {
    match queries::selectable_teams(&state.db, &group_id).await {
        Ok(teams) => (StatusCode::OK, Json(teams)).into_response(),
        Err(e) => {
            error!(group = %group_id, error = %e, "selectable team query failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": "internal error" })),
            )
                .into_response()
        }
    }
}
