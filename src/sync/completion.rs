//! Round completion controller.
//!
//! Per (group, round) state machine: Open → Resolved → Reported, with the
//! group's round counter as the single source of truth for "current". The
//! counter is advanced with a compare-and-advance update, so re-running
//! the pass after a successful advance examines the new round and can
//! never re-report the old one.

use sqlx::PgPool;
use tracing::{debug, info, warn};

use crate::db::queries;
use crate::error::{Error, Result};
use crate::models::RoundProgress;
use crate::notify::Notifier;
use crate::render;
use crate::standings;

/// Where a group's current round sits in the completion state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum RoundState {
    /// No picks at all: cannot be judged resolved, needs intervention.
    Stalled,
    /// At least one pick's game is unresolved.
    Open,
    /// Every pick has an outcome; ready to report and advance.
    Resolved,
}

pub(crate) fn classify(progress: &RoundProgress) -> RoundState {
    if progress.total_picks == 0 {
        RoundState::Stalled
    } else if progress.unresolved_picks > 0 {
        RoundState::Open
    } else {
        RoundState::Resolved
    }
}

/// Win rule for the loser pick'em: the picked team must LOSE its game. A
/// strictly lower score is a win for the participant; a tie is a loss.
/// Pure in (chosen team, score pair), so re-deriving is always stable.
pub(crate) fn derive_outcome(
    picked_team_id: i32,
    team1_id: i32,
    team1_score: i32,
    team2_score: i32,
) -> bool {
    if picked_team_id == team1_id {
        team1_score < team2_score
    } else {
        team2_score < team1_score
    }
}

pub async fn run_completion_pass(pool: &PgPool, notifier: &dyn Notifier) -> Result<()> {
    // Derive outcomes for freshly scored games first, so the per-group
    // counts below see the latest results.
    let resolvable = queries::resolvable_picks(pool).await?;
    for pick in &resolvable {
        let won = derive_outcome(pick.team_id, pick.team1_id, pick.team1_score, pick.team2_score);
        queries::set_pick_outcome(pool, pick.participant_id, pick.round, won).await?;
    }
    if !resolvable.is_empty() {
        info!(count = resolvable.len(), "derived pick outcomes");
    }

    for progress in queries::round_progress(pool).await? {
        let group = progress.group_id.clone();
        let round = progress.current_round;

        match complete_group_round(pool, notifier, progress).await {
            Ok(()) => {}
            Err(e @ Error::RoundStalled { .. }) => warn!(error = %e, "round stalled"),
            Err(e) => warn!(
                group = %group,
                round,
                error = %e,
                "round completion failed, will retry next pass"
            ),
        }
    }

    Ok(())
}

async fn complete_group_round(
    pool: &PgPool,
    notifier: &dyn Notifier,
    progress: RoundProgress,
) -> Result<()> {
    match classify(&progress) {
        RoundState::Stalled => {
            return Err(Error::RoundStalled {
                group: progress.group_id,
                round: progress.current_round,
            });
        }
        RoundState::Open => {
            debug!(
                group = %progress.group_id,
                round = progress.current_round,
                unresolved = progress.unresolved_picks,
                "round still open"
            );
            return Ok(());
        }
        RoundState::Resolved => {}
    }

    // Resolved → Reported: aggregate, render, deliver, then advance. Any
    // failure before the advance leaves the round Resolved-but-not-Reported
    // and the next pass retries the whole transition.
    let history = queries::pick_history(pool, &progress.group_id).await?;
    let standings = standings::aggregate(progress.current_round, &history);
    let png = render::render_standings(&standings)?;

    let caption = format!("Results for week {} are in!", progress.current_round);
    let filename = format!(
        "{}-week-{}.png",
        progress.group_id, progress.current_round
    );
    notifier
        .post_report(&progress.report_channel_id, &caption, &png, &filename)
        .await?;

    if queries::advance_round(pool, &progress.group_id, progress.current_round).await? {
        info!(
            group = %progress.group_id,
            round = progress.current_round,
            "round reported, group advanced"
        );
    } else {
        // Someone advanced between our read and the update; the report for
        // this round was still delivered exactly once by whoever won.
        warn!(
            group = %progress.group_id,
            round = progress.current_round,
            "round counter already advanced by a concurrent pass"
        );
    }

    Ok(())
}
