use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Reference entity, seeded once per season and never mutated afterward.
/// `short_code` is the provider abbreviation ("KC", "DET", ...) and is the
/// join key between feed fixtures and the persisted schedule.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Team {
    pub team_id: i32,
    pub name: String,
    pub short_code: String,
    pub created_at: DateTime<Utc>,
}
