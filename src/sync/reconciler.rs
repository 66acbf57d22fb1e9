//! Score reconciliation.
//!
//! One feed call per pending (season, round) pair, never per game. Each
//! completed fixture is matched to a persisted game by short code,
//! order-independent, and scores land in their slot only while that slot
//! is NULL, so the whole pass can be re-run any number of times without
//! double writes. A round whose feed call fails is logged and skipped;
//! the rest of the pass continues.

use futures::future::join_all;
use serde::Serialize;
use sqlx::PgPool;
use tracing::{debug, info, warn};

use crate::db::queries;
use crate::error::{Error, Result};
use crate::feed::{Fixture, ResultsFeed};
use crate::models::{RoundKey, TeamSlot, UnscoredGame};

#[derive(Debug, Default, Clone, Serialize)]
pub struct ReconcileSummary {
    pub rounds: usize,
    pub scores_written: usize,
    pub unmatched_fixtures: usize,
}

pub async fn run_score_sync(
    pool: &PgPool,
    feed: &dyn ResultsFeed,
) -> Result<ReconcileSummary> {
    let rounds = queries::pending_rounds(pool).await?;
    if rounds.is_empty() {
        debug!("no pending rounds, nothing to reconcile");
        return Ok(ReconcileSummary::default());
    }

    // Reconciliation is idempotent and commutative across rounds, so the
    // feed calls can run concurrently; writes are applied sequentially.
    let fetches = rounds.iter().map(|key| feed.fetch_round(key.season, key.round));
    let fetched = join_all(fetches).await;

    let mut summary = ReconcileSummary {
        rounds: rounds.len(),
        ..ReconcileSummary::default()
    };

    for (key, result) in rounds.iter().zip(fetched) {
        match result {
            Err(e) => {
                warn!(
                    season = key.season,
                    round = key.round,
                    error = %e,
                    "results feed unavailable, round will be retried next pass"
                );
            }
            Ok(fixtures) => match apply_round(pool, *key, &fixtures).await {
                Ok((written, unmatched)) => {
                    summary.scores_written += written;
                    summary.unmatched_fixtures += unmatched;
                }
                Err(e) => {
                    warn!(
                        season = key.season,
                        round = key.round,
                        error = %e,
                        "reconciliation failed for round"
                    );
                }
            },
        }
    }

    info!(
        rounds = summary.rounds,
        scores_written = summary.scores_written,
        unmatched = summary.unmatched_fixtures,
        "score sync pass finished"
    );

    Ok(summary)
}

async fn apply_round(
    pool: &PgPool,
    key: RoundKey,
    fixtures: &[Fixture],
) -> Result<(usize, usize)> {
    let games = queries::unscored_games(pool, key.season, key.round).await?;

    let mut written = 0;
    let mut unmatched = 0;

    for fixture in fixtures {
        if !fixture.completed {
            debug!(
                home = %fixture.home.short_code,
                away = %fixture.away.short_code,
                "fixture not yet completed"
            );
            continue;
        }

        match match_fixture(&games, fixture) {
            None => {
                unmatched += 1;
                let err = Error::NoMatch {
                    round: key.round,
                    side_a: fixture.home.short_code.clone(),
                    side_b: fixture.away.short_code.clone(),
                };
                warn!(error = %err, "skipping fixture");
            }
            Some(matched) => {
                for (slot, score) in matched.writes {
                    if queries::fill_score_slot(pool, matched.game_id, slot, score).await? {
                        written += 1;
                    }
                }
            }
        }
    }

    Ok((written, unmatched))
}

pub(crate) struct FixtureMatch {
    pub game_id: i32,
    /// Slot/score pairs that still need writing; slots already populated
    /// are left untouched.
    pub writes: Vec<(TeamSlot, i32)>,
}

/// Match a completed fixture onto a scheduled game by comparing both sides'
/// short codes against the game's two team slots, order-independent.
pub(crate) fn match_fixture(games: &[UnscoredGame], fixture: &Fixture) -> Option<FixtureMatch> {
    let home = fixture.home.short_code.as_str();
    let away = fixture.away.short_code.as_str();

    let game = games.iter().find(|g| {
        (g.team1_code == home && g.team2_code == away)
            || (g.team1_code == away && g.team2_code == home)
    })?;

    let mut writes = Vec::new();
    for side in [&fixture.home, &fixture.away] {
        let slot = if game.team1_code == side.short_code {
            TeamSlot::One
        } else {
            TeamSlot::Two
        };
        let existing = match slot {
            TeamSlot::One => game.team1_score,
            TeamSlot::Two => game.team2_score,
        };
        if existing.is_none() {
            if let Some(score) = side.score {
                writes.push((slot, score));
            }
        }
    }

    Some(FixtureMatch {
        game_id: game.game_id,
        writes,
    })
}
