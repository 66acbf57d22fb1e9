pub mod admin;
pub mod health;
pub mod picks;

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};

use crate::AppState;

pub fn create_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/health", get(health::health_check))
        .nest("/api", api_routes())
}

fn api_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/picks", post(picks::submit_pick))
        .route("/groups/{group_id}/teams", get(picks::list_selectable_teams))
        .route("/admin/sync", post(admin::trigger_sync))
        .route("/admin/report", post(admin::trigger_report))
        .route("/admin/remind", post(admin::trigger_remind))
        .route("/admin/seed", post(admin::trigger_seed))
}
