mod config;
mod db;
mod error;
mod feed;
mod jobs;
mod models;
mod notify;
mod picks;
mod render;
mod routes;
mod seed;
mod standings;
mod sync;

use std::sync::Arc;

use anyhow::Result;
use config::Config;
use feed::{EspnFeed, ResultsFeed};
use notify::{ChatNotifier, Notifier};
use sqlx::PgPool;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Application state shared across all handlers and background jobs. The
/// store pool, feed and notifier handles live here and are passed
/// explicitly; no component keeps an ambient global.
pub struct AppState {
    pub config: Config,
    pub db: PgPool,
    pub feed: Arc<dyn ResultsFeed>,
    pub notifier: Arc<dyn Notifier>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "loser_pool_backend=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting loser pick'em backend...");

    // Load configuration
    let config = Config::from_env()?;
    tracing::info!("Configuration loaded");

    // Connect to database
    let db = db::create_pool(config.database_url(), config.database.max_connections).await?;
    tracing::info!("Connected to database");

    // Run migrations
    sqlx::migrate!("./migrations").run(&db).await?;
    tracing::info!("Database migrations completed");

    let feed: Arc<dyn ResultsFeed> = Arc::new(EspnFeed::new(&config.feed)?);
    let notifier: Arc<dyn Notifier> = Arc::new(ChatNotifier::new(&config.notifier)?);

    // Create application state
    let state = Arc::new(AppState {
        config: config.clone(),
        db,
        feed,
        notifier,
    });

    // Spawn the periodic score sync, round completion and reminder jobs
    jobs::spawn_scheduled_jobs(state.clone());

    // Build router
    let app = routes::create_routes()
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    // Start server
    let addr = config.server_addr();
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("Server listening on {}", addr);
    tracing::info!("Health check: http://{}/health", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
