//! Results feed client for the external schedule/score provider.
//!
//! One request per (season, round); the provider returns the round's
//! fixtures grouped by calendar date. Scores arrive as strings and are
//! parsed to integers; anything malformed is skipped at the parse layer so
//! a single bad fixture never poisons a round.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDateTime, Utc};
use serde::Deserialize;
use tracing::debug;

use crate::config::FeedConfig;
use crate::error::{Error, Result};

// =============================================================================
// Domain types
// =============================================================================

/// One fixture as reported by the provider for a given round.
#[derive(Debug, Clone, PartialEq)]
pub struct Fixture {
    pub completed: bool,
    pub kickoff: Option<DateTime<Utc>>,
    pub home: FixtureSide,
    pub away: FixtureSide,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FixtureSide {
    pub short_code: String,
    pub name: String,
    pub score: Option<i32>,
}

/// Seam between the jobs and the provider. The production implementation
/// talks HTTP; tests substitute canned fixtures.
#[async_trait]
pub trait ResultsFeed: Send + Sync {
    async fn fetch_round(&self, season: i32, round: i32) -> Result<Vec<Fixture>>;
}

// =============================================================================
// Provider wire format
// =============================================================================

#[derive(Debug, Default, Deserialize)]
struct SchedulePayload {
    #[serde(default)]
    content: ScheduleContent,
}

#[derive(Debug, Default, Deserialize)]
struct ScheduleContent {
    #[serde(default)]
    schedule: HashMap<String, ScheduleDate>,
}

#[derive(Debug, Default, Deserialize)]
struct ScheduleDate {
    #[serde(default)]
    games: Vec<ScheduleGame>,
}

#[derive(Debug, Default, Deserialize)]
struct ScheduleGame {
    #[serde(default)]
    competitions: Vec<Competition>,
}

#[derive(Debug, Default, Deserialize)]
struct Competition {
    #[serde(default)]
    date: Option<String>,
    #[serde(default)]
    status: Option<Status>,
    #[serde(default)]
    competitors: Vec<Competitor>,
}

#[derive(Debug, Default, Deserialize)]
struct Status {
    #[serde(rename = "type", default)]
    status_type: Option<StatusType>,
}

#[derive(Debug, Default, Deserialize)]
struct StatusType {
    #[serde(default)]
    completed: bool,
}

#[derive(Debug, Default, Deserialize)]
struct Competitor {
    #[serde(default)]
    score: Option<String>,
    #[serde(default)]
    team: Option<TeamInfo>,
}

#[derive(Debug, Default, Deserialize)]
struct TeamInfo {
    #[serde(default)]
    abbreviation: Option<String>,
    #[serde(rename = "displayName", default)]
    display_name: Option<String>,
}

// =============================================================================
// HTTP implementation
// =============================================================================

pub struct EspnFeed {
    client: reqwest::Client,
    base_url: String,
}

impl EspnFeed {
    pub fn new(config: &FeedConfig) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.clone(),
        })
    }
}

#[async_trait]
impl ResultsFeed for EspnFeed {
    async fn fetch_round(&self, season: i32, round: i32) -> Result<Vec<Fixture>> {
        let response = self
            .client
            .get(&self.base_url)
            .query(&[
                ("xhr", "1".to_string()),
                ("year", season.to_string()),
                ("week", round.to_string()),
            ])
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|source| Error::FeedTransient { season, round, source })?;

        let payload: SchedulePayload = response.json().await.map_err(|e| {
            if e.is_decode() {
                Error::FeedDecode {
                    season,
                    round,
                    detail: e.to_string(),
                }
            } else {
                Error::FeedTransient { season, round, source: e }
            }
        })?;

        Ok(parse_payload(payload))
    }
}

// =============================================================================
// Wire format -> domain conversion
// =============================================================================

fn parse_payload(payload: SchedulePayload) -> Vec<Fixture> {
    let mut fixtures = Vec::new();

    for date in payload.content.schedule.into_values() {
        for game in date.games {
            let Some(competition) = game.competitions.into_iter().next() else {
                continue;
            };

            match parse_competition(competition) {
                Some(fixture) => fixtures.push(fixture),
                None => debug!("could not parse schedule details, skipping fixture"),
            }
        }
    }

    fixtures
}

fn parse_competition(competition: Competition) -> Option<Fixture> {
    let completed = competition
        .status
        .and_then(|s| s.status_type)
        .map(|t| t.completed)
        .unwrap_or(false);

    let kickoff = competition.date.as_deref().and_then(parse_kickoff);

    let mut sides = competition.competitors.into_iter();
    let home = parse_side(sides.next()?)?;
    let away = parse_side(sides.next()?)?;

    Some(Fixture {
        completed,
        kickoff,
        home,
        away,
    })
}

fn parse_side(competitor: Competitor) -> Option<FixtureSide> {
    let team = competitor.team?;
    let short_code = team.abbreviation?;
    let name = team.display_name.unwrap_or_else(|| short_code.clone());
    let score = competitor.score.and_then(|s| s.parse().ok());

    Some(FixtureSide {
        short_code,
        name,
        score,
    })
}

/// The provider emits RFC 3339 timestamps, sometimes without seconds
/// ("2025-09-05T00:20Z").
fn parse_kickoff(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }

    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%MZ")
        .ok()
        .map(|naive| naive.and_utc())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn payload_from(value: serde_json::Value) -> SchedulePayload {
        serde_json::from_value(value).expect("payload should deserialize")
    }

    #[test]
    fn test_parse_completed_fixture_with_string_scores() {
        let payload = payload_from(json!({
            "content": {
                "schedule": {
                    "20250905": {
                        "games": [{
                            "competitions": [{
                                "date": "2025-09-05T00:20Z",
                                "status": { "type": { "completed": true } },
                                "competitors": [
                                    { "score": "27", "team": { "abbreviation": "KC", "displayName": "Kansas City Chiefs" } },
                                    { "score": "20", "team": { "abbreviation": "BAL", "displayName": "Baltimore Ravens" } }
                                ]
                            }]
                        }]
                    }
                }
            }
        }));

        let fixtures = parse_payload(payload);
        assert_eq!(fixtures.len(), 1);

        let fixture = &fixtures[0];
        assert!(fixture.completed);
        assert!(fixture.kickoff.is_some());
        assert_eq!(fixture.home.short_code, "KC");
        assert_eq!(fixture.home.score, Some(27));
        assert_eq!(fixture.away.short_code, "BAL");
        assert_eq!(fixture.away.score, Some(20));
    }

    #[test]
    fn test_incomplete_fixture_has_no_completed_flag() {
        let payload = payload_from(json!({
            "content": {
                "schedule": {
                    "20251207": {
                        "games": [{
                            "competitions": [{
                                "status": { "type": { "completed": false } },
                                "competitors": [
                                    { "team": { "abbreviation": "DET" } },
                                    { "team": { "abbreviation": "GB" } }
                                ]
                            }]
                        }]
                    }
                }
            }
        }));

        let fixtures = parse_payload(payload);
        assert_eq!(fixtures.len(), 1);
        assert!(!fixtures[0].completed);
        assert_eq!(fixtures[0].home.score, None);
        // Display name falls back to the abbreviation when absent
        assert_eq!(fixtures[0].home.name, "DET");
    }

    #[test]
    fn test_fixture_missing_team_info_is_skipped() {
        let payload = payload_from(json!({
            "content": {
                "schedule": {
                    "20251207": {
                        "games": [
                            { "competitions": [{ "competitors": [ { "score": "3" }, { "team": { "abbreviation": "GB" } } ] }] },
                            { "competitions": [] }
                        ]
                    }
                }
            }
        }));

        assert!(parse_payload(payload).is_empty());
    }

    #[test]
    fn test_missing_status_defaults_to_not_completed() {
        let payload = payload_from(json!({
            "content": {
                "schedule": {
                    "20251207": {
                        "games": [{
                            "competitions": [{
                                "competitors": [
                                    { "team": { "abbreviation": "NYJ" } },
                                    { "team": { "abbreviation": "NE" } }
                                ]
                            }]
                        }]
                    }
                }
            }
        }));

        let fixtures = parse_payload(payload);
        assert_eq!(fixtures.len(), 1);
        assert!(!fixtures[0].completed);
    }

    #[test]
    fn test_parse_kickoff_formats() {
        assert!(parse_kickoff("2025-09-05T00:20Z").is_some());
        assert!(parse_kickoff("2025-09-05T00:20:00Z").is_some());
        assert!(parse_kickoff("2025-09-05T00:20:00+00:00").is_some());
        assert!(parse_kickoff("not a date").is_none());

        let minute_only = parse_kickoff("2025-09-05T00:20Z").unwrap();
        let with_seconds = parse_kickoff("2025-09-05T00:20:00Z").unwrap();
        assert_eq!(minute_only, with_seconds);
    }

    #[test]
    fn test_unparsable_score_becomes_none() {
        let competitor = Competitor {
            score: Some("TBD".to_string()),
            team: Some(TeamInfo {
                abbreviation: Some("SF".to_string()),
                display_name: Some("San Francisco 49ers".to_string()),
            }),
        };

        let side = parse_side(competitor).unwrap();
        assert_eq!(side.score, None);
    }
}
