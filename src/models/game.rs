use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// One scheduled fixture. The two score slots start NULL and are each
/// written at most once by the score reconciler; a game with both slots
/// populated is immutable.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Game {
    pub game_id: i32,
    pub season: i32,
    pub round: i32,
    pub team1_id: i32,
    pub team2_id: i32,
    pub kickoff: DateTime<Utc>,
    pub team1_score: Option<i32>,
    pub team2_score: Option<i32>,
    pub created_at: DateTime<Utc>,
}

/// Which of a game's two team slots a fixture side matched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TeamSlot {
    One,
    Two,
}

/// Reconciler view of a game still missing at least one score, with both
/// slots' short codes joined in for fixture matching.
#[derive(Debug, Clone, FromRow)]
pub struct UnscoredGame {
    pub game_id: i32,
    pub team1_code: String,
    pub team2_code: String,
    pub team1_score: Option<i32>,
    pub team2_score: Option<i32>,
}

/// Distinct (season, round) pair that some group is currently playing and
/// that still has unscored games.
#[derive(Debug, Clone, Copy, PartialEq, Eq, FromRow)]
pub struct RoundKey {
    pub season: i32,
    pub round: i32,
}
