//! Season (re)initialization.
//!
//! Destructive by design: wipes the pick ledger and schedule, resets the
//! group to round 1, then pulls the provider schedule for every round and
//! inserts the games. Teams are upserted by short code and survive across
//! seasons. All schedule rounds are fetched before anything is deleted, so
//! a feed failure aborts the reseed without leaving a half-seeded season.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use tracing::info;

use crate::db::queries;
use crate::error::{Error, Result};
use crate::feed::{Fixture, ResultsFeed};

#[derive(Debug, Clone, Deserialize)]
pub struct SeedRequest {
    pub group_id: String,
    pub season: i32,
    pub rounds: i32,
    pub report_channel_id: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct SeedSummary {
    pub season: i32,
    pub rounds: i32,
    pub games: usize,
    pub teams: usize,
}

pub async fn reseed_season(
    pool: &PgPool,
    feed: &dyn ResultsFeed,
    request: &SeedRequest,
) -> Result<SeedSummary> {
    if request.rounds < 1 {
        return Err(Error::InvalidRequest(format!(
            "cannot seed a season with {} rounds",
            request.rounds
        )));
    }

    let mut schedule: Vec<Vec<Fixture>> = Vec::with_capacity(request.rounds as usize);
    for round in 1..=request.rounds {
        let fixtures = feed.fetch_round(request.season, round).await?;
        info!(season = request.season, round, fixtures = fixtures.len(), "fetched schedule");
        schedule.push(fixtures);
    }

    let mut tx = pool.begin().await?;
    queries::purge_schedule(&mut tx).await?;
    queries::reset_group(&mut tx, &request.group_id, request.season, &request.report_channel_id)
        .await?;

    let mut known_teams: HashMap<String, i32> = HashMap::new();
    let mut games = 0;

    for (idx, fixtures) in schedule.iter().enumerate() {
        let round = idx as i32 + 1;

        for fixture in fixtures {
            let kickoff = fixture.kickoff.ok_or_else(|| Error::FeedDecode {
                season: request.season,
                round,
                detail: format!(
                    "fixture {} vs {} is missing a kickoff time",
                    fixture.home.short_code, fixture.away.short_code
                ),
            })?;

            let mut team_ids = [0_i32; 2];
            for (slot, side) in [&fixture.home, &fixture.away].into_iter().enumerate() {
                let id = match known_teams.get(&side.short_code) {
                    Some(id) => *id,
                    None => {
                        let team = queries::ensure_team(&mut tx, &side.name, &side.short_code)
                            .await?;
                        known_teams.insert(side.short_code.clone(), team.team_id);
                        team.team_id
                    }
                };
                team_ids[slot] = id;
            }

            queries::insert_game(&mut tx, request.season, round, team_ids[0], team_ids[1], kickoff)
                .await?;
            games += 1;
        }
    }

    tx.commit().await?;

    info!(
        group = %request.group_id,
        season = request.season,
        rounds = request.rounds,
        games,
        "schedule reseeded"
    );

    Ok(SeedSummary {
        season: request.season,
        rounds: request.rounds,
        games,
        teams: known_teams.len(),
    })
}
