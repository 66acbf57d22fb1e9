use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Per-group state. `current_round` is the single source of truth for which
/// round a group is playing; only the round completion controller advances
/// it, by exactly one.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct GroupConfig {
    pub group_id: String,
    pub season: i32,
    pub current_round: i32,
    pub report_channel_id: String,
    pub updated_at: DateTime<Utc>,
}

/// Pick resolution counts for a group's current round, the controller's
/// whole decision input: zero total picks stalls the round, zero unresolved
/// with a non-zero total resolves it.
#[derive(Debug, Clone, FromRow)]
pub struct RoundProgress {
    pub group_id: String,
    pub season: i32,
    pub current_round: i32,
    pub report_channel_id: String,
    pub unresolved_picks: i64,
    pub total_picks: i64,
}

/// A team a participant could still pick for the group's current round
/// (its game has not kicked off).
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct SelectableTeam {
    pub team_id: i32,
    pub name: String,
    pub short_code: String,
    pub kickoff: DateTime<Utc>,
}
