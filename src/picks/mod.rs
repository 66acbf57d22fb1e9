//! Pick assignment guard.
//!
//! Submit-or-replace of a participant's pick for the active round. The
//! kickoff lock is the one rule everything here defends: once the game a
//! pick points at has kicked off, the pick is frozen, and the caller gets
//! the frozen selection back as a structured result rather than a fault.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use tracing::info;

use crate::db::queries;
use crate::error::{Error, Result};

#[derive(Debug, Clone, Deserialize)]
pub struct PickRequest {
    pub group_id: String,
    pub participant_external_id: String,
    pub round: i32,
    pub team_id: i32,
}

#[derive(Debug, Clone, Serialize)]
pub struct TeamLabel {
    pub team_id: i32,
    pub name: String,
    pub short_code: String,
}

/// Outcome of a submit-or-replace call. `Locked` is a rejection, not an
/// error: the existing selection is surfaced read-only.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum PickResponse {
    Confirmed { team: TeamLabel },
    Locked { current: TeamLabel },
}

/// A pick may change only while its game's kickoff is strictly in the
/// future, regardless of whether the outcome has been derived yet.
fn replaceable(kickoff: DateTime<Utc>, now: DateTime<Utc>) -> bool {
    kickoff > now
}

pub async fn submit_pick(pool: &PgPool, request: &PickRequest) -> Result<PickResponse> {
    let config = queries::group_config(pool, &request.group_id)
        .await?
        .ok_or_else(|| Error::PickRejected(format!("unknown group {}", request.group_id)))?;

    if request.round != config.current_round {
        return Err(Error::PickRejected(format!(
            "round {} is not the group's current round {}",
            request.round, config.current_round
        )));
    }

    let participant =
        queries::participant_by_external(pool, &request.group_id, &request.participant_external_id)
            .await?
            .ok_or_else(|| {
                Error::PickRejected("participant is not registered in this group".to_string())
            })?;

    // Lock check and upsert share one transaction so a duplicate submission
    // or a racing pass serializes behind the row lock.
    let mut tx = pool.begin().await?;
    let now = Utc::now();

    if let Some(existing) = queries::current_pick_for_update(
        &mut tx,
        participant.participant_id,
        request.round,
        config.season,
    )
    .await?
    {
        if !replaceable(existing.kickoff, now) {
            return Ok(PickResponse::Locked {
                current: TeamLabel {
                    team_id: existing.team_id,
                    name: existing.team_name,
                    short_code: existing.short_code,
                },
            });
        }
    }

    let game = queries::game_for_team(&mut tx, request.team_id, config.season, request.round)
        .await?
        .ok_or_else(|| {
            Error::PickRejected("chosen team has no game in this round".to_string())
        })?;

    if !replaceable(game.kickoff, now) {
        return Err(Error::PickRejected(
            "chosen team's game has already kicked off".to_string(),
        ));
    }

    let team = queries::team_label(&mut tx, request.team_id)
        .await?
        .ok_or_else(|| Error::PickRejected(format!("unknown team {}", request.team_id)))?;

    queries::upsert_pick(&mut tx, participant.participant_id, request.round, request.team_id)
        .await?;
    tx.commit().await?;

    info!(
        group = %request.group_id,
        participant = %participant.display_name,
        round = request.round,
        team = %team.short_code,
        "pick recorded"
    );

    Ok(PickResponse::Confirmed {
        team: TeamLabel {
            team_id: team.team_id,
            name: team.name,
            short_code: team.short_code,
        },
    })
}
