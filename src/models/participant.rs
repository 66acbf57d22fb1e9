use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Participant {
    pub participant_id: i32,
    pub group_id: String,
    pub external_id: String,
    pub display_name: String,
    pub created_at: DateTime<Utc>,
}

/// One row of the pick ledger. `won` is NULL until the picked team's game
/// has both scores and the outcome has been derived; win means the picked
/// team lost its game.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Pick {
    pub participant_id: i32,
    pub round: i32,
    pub team_id: i32,
    pub won: Option<bool>,
    pub picked_at: DateTime<Utc>,
}

/// A pick whose game has both scores but whose outcome has not been
/// derived yet. Input to the outcome derivation step.
#[derive(Debug, Clone, FromRow)]
pub struct ResolvablePick {
    pub participant_id: i32,
    pub round: i32,
    pub team_id: i32,
    pub team1_id: i32,
    pub team1_score: i32,
    pub team2_score: i32,
}

/// Flattened pick history row for standings aggregation. Participants with
/// no picks at all still appear, with the nullable columns NULL.
#[derive(Debug, Clone, FromRow)]
pub struct PickHistoryRow {
    pub participant_id: i32,
    pub display_name: String,
    pub round: Option<i32>,
    pub short_code: Option<String>,
    pub won: Option<bool>,
}

/// The guard's view of a participant's existing pick for a round, with the
/// associated game's kickoff for the lock check.
#[derive(Debug, Clone, FromRow)]
pub struct CurrentPick {
    pub team_id: i32,
    pub team_name: String,
    pub short_code: String,
    pub kickoff: DateTime<Utc>,
}

/// A participant who has not yet picked for their group's current round.
#[derive(Debug, Clone, FromRow)]
pub struct ReminderTarget {
    pub external_id: String,
    pub display_name: String,
    pub group_id: String,
}
