//! Background jobs: score sync, round completion and pick reminders run as
//! independent periodic tasks, each re-deriving everything it needs from
//! the store so a process restart loses nothing.

use std::sync::Arc;
use std::time::Duration;

use sqlx::PgPool;
use tracing::{error, info, warn};

use crate::db::queries;
use crate::error::Result;
use crate::notify::Notifier;
use crate::sync;
use crate::AppState;

const REMINDER_TEXT: &str =
    "Reminder that you have not yet chosen your team for this week's loser pick'em.";

pub fn spawn_scheduled_jobs(state: Arc<AppState>) {
    tokio::spawn(score_sync_loop(state.clone()));
    tokio::spawn(completion_loop(state.clone()));
    tokio::spawn(reminder_loop(state));
}

async fn score_sync_loop(state: Arc<AppState>) {
    let mut interval =
        tokio::time::interval(Duration::from_secs(state.config.jobs.score_sync_interval_secs));

    loop {
        interval.tick().await;
        if let Err(e) = sync::run_score_sync(&state.db, state.feed.as_ref()).await {
            error!(error = %e, "score sync pass failed");
        }
    }
}

async fn completion_loop(state: Arc<AppState>) {
    let mut interval =
        tokio::time::interval(Duration::from_secs(state.config.jobs.completion_interval_secs));

    loop {
        interval.tick().await;
        if let Err(e) = sync::run_completion_pass(&state.db, state.notifier.as_ref()).await {
            error!(error = %e, "round completion pass failed");
        }
    }
}

async fn reminder_loop(state: Arc<AppState>) {
    let mut interval =
        tokio::time::interval(Duration::from_secs(state.config.jobs.reminder_interval_secs));

    loop {
        interval.tick().await;
        match send_pick_reminders(&state.db, state.notifier.as_ref()).await {
            Ok(sent) if sent > 0 => info!(sent, "pick reminders delivered"),
            Ok(_) => {}
            Err(e) => error!(error = %e, "reminder pass failed"),
        }
    }
}

/// Remind every participant who has not picked for their group's current
/// round. Delivery failures are per-participant: logged and skipped.
pub async fn send_pick_reminders(pool: &PgPool, notifier: &dyn Notifier) -> Result<usize> {
    let targets = queries::participants_missing_pick(pool).await?;

    let mut sent = 0;
    for target in &targets {
        match notifier.send_reminder(&target.external_id, REMINDER_TEXT).await {
            Ok(()) => sent += 1,
            Err(e) => warn!(
                group = %target.group_id,
                participant = %target.display_name,
                error = %e,
                "reminder delivery failed"
            ),
        }
    }

    Ok(sent)
}
