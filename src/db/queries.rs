use chrono::{DateTime, Utc};
use sqlx::{PgConnection, PgPool, Result};

use crate::models::{
    CurrentPick, Game, GroupConfig, Participant, Pick, PickHistoryRow, ReminderTarget,
    ResolvablePick, RoundKey, RoundProgress, SelectableTeam, Team, TeamSlot, UnscoredGame,
};

// =============================================================================
// Schedule / reconciliation queries
// =============================================================================

/// Every (season, round) pair that is current for at least one group and
/// still has a game missing a score. Drives one feed call per pair.
pub async fn pending_rounds(pool: &PgPool) -> Result<Vec<RoundKey>> {
    sqlx::query_as::<_, RoundKey>(
        r#"
        SELECT DISTINCT g.season, g.round
        FROM games g
        JOIN group_config c ON c.season = g.season AND c.current_round = g.round
        WHERE g.team1_score IS NULL OR g.team2_score IS NULL
        "#,
    )
    .fetch_all(pool)
    .await
}

pub async fn unscored_games(pool: &PgPool, season: i32, round: i32) -> Result<Vec<UnscoredGame>> {
    sqlx::query_as::<_, UnscoredGame>(
        r#"
        SELECT g.game_id,
               t1.short_code AS team1_code,
               t2.short_code AS team2_code,
               g.team1_score,
               g.team2_score
        FROM games g
        JOIN teams t1 ON t1.team_id = g.team1_id
        JOIN teams t2 ON t2.team_id = g.team2_id
        WHERE g.season = $1
          AND g.round = $2
          AND (g.team1_score IS NULL OR g.team2_score IS NULL)
        "#,
    )
    .bind(season)
    .bind(round)
    .fetch_all(pool)
    .await
}

/// Write-once score fill: the slot is only written while it is NULL, so a
/// re-run of the same pass never overwrites an observed score. Returns
/// whether a row was actually written.
pub async fn fill_score_slot(
    pool: &PgPool,
    game_id: i32,
    slot: TeamSlot,
    score: i32,
) -> Result<bool> {
    let sql = match slot {
        TeamSlot::One => {
            "UPDATE games SET team1_score = $2 WHERE game_id = $1 AND team1_score IS NULL"
        }
        TeamSlot::Two => {
            "UPDATE games SET team2_score = $2 WHERE game_id = $1 AND team2_score IS NULL"
        }
    };

    let result = sqlx::query(sql).bind(game_id).bind(score).execute(pool).await?;
    Ok(result.rows_affected() > 0)
}

// =============================================================================
// Outcome derivation / round completion queries
// =============================================================================

/// Picks whose game has both scores populated but whose outcome is still
/// NULL. The controller derives `won` for each and writes it back.
pub async fn resolvable_picks(pool: &PgPool) -> Result<Vec<ResolvablePick>> {
    sqlx::query_as::<_, ResolvablePick>(
        r#"
        SELECT p.participant_id, p.round, p.team_id,
               g.team1_id, g.team1_score, g.team2_score
        FROM picks p
        JOIN games g ON g.round = p.round
                    AND (g.team1_id = p.team_id OR g.team2_id = p.team_id)
        WHERE p.won IS NULL
          AND g.team1_score IS NOT NULL
          AND g.team2_score IS NOT NULL
        "#,
    )
    .fetch_all(pool)
    .await
}

pub async fn set_pick_outcome(
    pool: &PgPool,
    participant_id: i32,
    round: i32,
    won: bool,
) -> Result<bool> {
    let result = sqlx::query(
        "UPDATE picks SET won = $3 WHERE participant_id = $1 AND round = $2 AND won IS NULL",
    )
    .bind(participant_id)
    .bind(round)
    .bind(won)
    .execute(pool)
    .await?;

    Ok(result.rows_affected() > 0)
}

/// Per-group resolution counts for the current round. Participants without
/// a pick contribute to neither count (the LEFT JOIN row is NULL, and COUNT
/// only counts non-NULL pick rows).
pub async fn round_progress(pool: &PgPool) -> Result<Vec<RoundProgress>> {
    sqlx::query_as::<_, RoundProgress>(
        r#"
        SELECT c.group_id, c.season, c.current_round, c.report_channel_id,
               COUNT(pk.participant_id) FILTER (WHERE pk.won IS NULL) AS unresolved_picks,
               COUNT(pk.participant_id) AS total_picks
        FROM group_config c
        JOIN participants p ON p.group_id = c.group_id
        LEFT JOIN picks pk ON pk.participant_id = p.participant_id
                          AND pk.round = c.current_round
        GROUP BY c.group_id, c.season, c.current_round, c.report_channel_id
        "#,
    )
    .fetch_all(pool)
    .await
}

/// Advance a group's round counter by exactly one, but only if it still
/// points at the round the caller reported on. Zero rows affected means a
/// concurrent pass already advanced it.
pub async fn advance_round(pool: &PgPool, group_id: &str, from_round: i32) -> Result<bool> {
    let result = sqlx::query(
        r#"
        UPDATE group_config
        SET current_round = current_round + 1, updated_at = NOW()
        WHERE group_id = $1 AND current_round = $2
        "#,
    )
    .bind(group_id)
    .bind(from_round)
    .execute(pool)
    .await?;

    Ok(result.rows_affected() > 0)
}

// =============================================================================
// Standings queries
// =============================================================================

/// Full pick history for a group, one row per (participant, pick), with
/// participants who never picked still present (NULL pick columns).
pub async fn pick_history(pool: &PgPool, group_id: &str) -> Result<Vec<PickHistoryRow>> {
    sqlx::query_as::<_, PickHistoryRow>(
        r#"
        SELECT p.participant_id, p.display_name, pk.round, t.short_code, pk.won
        FROM participants p
        LEFT JOIN picks pk ON pk.participant_id = p.participant_id
        LEFT JOIN teams t ON t.team_id = pk.team_id
        WHERE p.group_id = $1
        ORDER BY p.participant_id, pk.round
        "#,
    )
    .bind(group_id)
    .fetch_all(pool)
    .await
}

// =============================================================================
// Group / participant queries
// =============================================================================

pub async fn group_config(pool: &PgPool, group_id: &str) -> Result<Option<GroupConfig>> {
    sqlx::query_as::<_, GroupConfig>("SELECT * FROM group_config WHERE group_id = $1")
        .bind(group_id)
        .fetch_optional(pool)
        .await
}

pub async fn participant_by_external(
    pool: &PgPool,
    group_id: &str,
    external_id: &str,
) -> Result<Option<Participant>> {
    sqlx::query_as::<_, Participant>(
        "SELECT * FROM participants WHERE group_id = $1 AND external_id = $2",
    )
    .bind(group_id)
    .bind(external_id)
    .fetch_optional(pool)
    .await
}

/// Participants with no pick for their group's current round, for the
/// reminder job.
pub async fn participants_missing_pick(pool: &PgPool) -> Result<Vec<ReminderTarget>> {
    sqlx::query_as::<_, ReminderTarget>(
        r#"
        SELECT p.external_id, p.display_name, p.group_id
        FROM participants p
        JOIN group_config c ON c.group_id = p.group_id
        LEFT JOIN picks pk ON pk.participant_id = p.participant_id
                          AND pk.round = c.current_round
        WHERE pk.participant_id IS NULL
        ORDER BY p.group_id, p.display_name
        "#,
    )
    .fetch_all(pool)
    .await
}

// =============================================================================
// Pick assignment queries (run inside the guard's transaction)
// =============================================================================

/// The participant's existing pick for a round, with the associated game's
/// kickoff. Locks the pick row so a racing submission serializes behind us.
pub async fn current_pick_for_update(
    conn: &mut PgConnection,
    participant_id: i32,
    round: i32,
    season: i32,
) -> Result<Option<CurrentPick>> {
    sqlx::query_as::<_, CurrentPick>(
        r#"
        SELECT p.team_id, t.name AS team_name, t.short_code, g.kickoff
        FROM picks p
        JOIN teams t ON t.team_id = p.team_id
        JOIN games g ON (g.team1_id = p.team_id OR g.team2_id = p.team_id)
                    AND g.round = p.round
                    AND g.season = $3
        WHERE p.participant_id = $1 AND p.round = $2
        FOR UPDATE OF p
        "#,
    )
    .bind(participant_id)
    .bind(round)
    .bind(season)
    .fetch_optional(conn)
    .await
}

/// The chosen team's game in the target round, if any.
pub async fn game_for_team(
    conn: &mut PgConnection,
    team_id: i32,
    season: i32,
    round: i32,
) -> Result<Option<Game>> {
    sqlx::query_as::<_, Game>(
        r#"
        SELECT *
        FROM games
        WHERE season = $1 AND round = $2 AND (team1_id = $3 OR team2_id = $3)
        "#,
    )
    .bind(season)
    .bind(round)
    .bind(team_id)
    .fetch_optional(conn)
    .await
}

pub async fn team_label(conn: &mut PgConnection, team_id: i32) -> Result<Option<Team>> {
    sqlx::query_as::<_, Team>("SELECT * FROM teams WHERE team_id = $1")
        .bind(team_id)
        .fetch_optional(conn)
        .await
}

/// The second idempotent write primitive: exactly one pick row per
/// (participant, round), replacement resets the derived outcome.
pub async fn upsert_pick(
    conn: &mut PgConnection,
    participant_id: i32,
    round: i32,
    team_id: i32,
) -> Result<Pick> {
    sqlx::query_as::<_, Pick>(
        r#"
        INSERT INTO picks (participant_id, round, team_id, won, picked_at)
        VALUES ($1, $2, $3, NULL, NOW())
        ON CONFLICT (participant_id, round)
        DO UPDATE SET team_id = $3, won = NULL, picked_at = NOW()
        RETURNING *
        "#,
    )
    .bind(participant_id)
    .bind(round)
    .bind(team_id)
    .fetch_one(conn)
    .await
}

/// Teams with an unstarted game in the group's current round, for the
/// selection UI behind the pick boundary.
pub async fn selectable_teams(pool: &PgPool, group_id: &str) -> Result<Vec<SelectableTeam>> {
    sqlx::query_as::<_, SelectableTeam>(
        r#"
        SELECT DISTINCT t.team_id, t.name, t.short_code, g.kickoff
        FROM group_config c
        JOIN games g ON g.season = c.season AND g.round = c.current_round
        JOIN teams t ON t.team_id = g.team1_id OR t.team_id = g.team2_id
        WHERE c.group_id = $1 AND g.kickoff > NOW()
        ORDER BY t.short_code ASC
        "#,
    )
    .bind(group_id)
    .fetch_all(pool)
    .await
}

// =============================================================================
// Season seeding queries
// =============================================================================

/// Destructive: drops the whole pick ledger and schedule ahead of a reseed.
/// Teams are reference data and survive across seasons.
pub async fn purge_schedule(conn: &mut PgConnection) -> Result<()> {
    sqlx::query("DELETE FROM picks").execute(&mut *conn).await?;
    sqlx::query("DELETE FROM games").execute(&mut *conn).await?;
    Ok(())
}

pub async fn reset_group(
    conn: &mut PgConnection,
    group_id: &str,
    season: i32,
    report_channel_id: &str,
) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO group_config (group_id, season, current_round, report_channel_id, updated_at)
        VALUES ($1, $2, 1, $3, NOW())
        ON CONFLICT (group_id)
        DO UPDATE SET season = $2, current_round = 1, report_channel_id = $3, updated_at = NOW()
        "#,
    )
    .bind(group_id)
    .bind(season)
    .bind(report_channel_id)
    .execute(conn)
    .await?;

    Ok(())
}

pub async fn ensure_team(conn: &mut PgConnection, name: &str, short_code: &str) -> Result<Team> {
    sqlx::query_as::<_, Team>(
        r#"
        INSERT INTO teams (name, short_code)
        VALUES ($1, $2)
        ON CONFLICT (short_code) DO UPDATE SET name = EXCLUDED.name
        RETURNING *
        "#,
    )
    .bind(name)
    .bind(short_code)
    .fetch_one(conn)
    .await
}

pub async fn insert_game(
    conn: &mut PgConnection,
    season: i32,
    round: i32,
    team1_id: i32,
    team2_id: i32,
    kickoff: DateTime<Utc>,
) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO games (season, round, team1_id, team2_id, kickoff)
        VALUES ($1, $2, $3, $4, $5)
        "#,
    )
    .bind(season)
    .bind(round)
    .bind(team1_id)
    .bind(team2_id)
    .bind(kickoff)
    .execute(conn)
    .await?;

    Ok(())
}
