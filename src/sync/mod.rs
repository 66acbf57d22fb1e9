//! The two periodic passes that keep the persisted schedule in step with
//! the outside world: score reconciliation against the results feed, and
//! round completion / reporting.

pub mod completion;
pub mod reconciler;

pub use completion::run_completion_pass;
pub use reconciler::run_score_sync;

#[cfg(test)]
mod tests {
    use async_trait::async_trait;

    use super::completion::derive_outcome;
    use super::reconciler::match_fixture;
    use crate::error::Result;
    use crate::feed::{Fixture, FixtureSide, ResultsFeed};
    use crate::models::{PickHistoryRow, TeamSlot, UnscoredGame};
    use crate::render;
    use crate::standings;

    /// Feed double returning canned fixtures, standing in for the provider
    /// behind the `ResultsFeed` seam.
    struct CannedFeed {
        fixtures: Vec<Fixture>,
    }

    #[async_trait]
    impl ResultsFeed for CannedFeed {
        async fn fetch_round(&self, _season: i32, _round: i32) -> Result<Vec<Fixture>> {
            Ok(self.fixtures.clone())
        }
    }

    fn side(code: &str, score: i32) -> FixtureSide {
        FixtureSide {
            short_code: code.to_string(),
            name: code.to_string(),
            score: Some(score),
        }
    }

    /// The whole pipeline minus the store: feed -> fixture match -> outcome
    /// derivation -> standings -> rendered artifact, on the two-participant
    /// scenario (round 1: A 10, B 20; X picked A, Y picked B).
    #[test]
    fn test_feed_to_artifact_round_trip() {
        let feed = CannedFeed {
            fixtures: vec![Fixture {
                completed: true,
                kickoff: None,
                home: side("A", 10),
                away: side("B", 20),
            }],
        };

        let fixtures = tokio_test::block_on(feed.fetch_round(2025, 1)).unwrap();

        let mut game = UnscoredGame {
            game_id: 1,
            team1_code: "A".to_string(),
            team2_code: "B".to_string(),
            team1_score: None,
            team2_score: None,
        };

        let matched = match_fixture(std::slice::from_ref(&game), &fixtures[0]).unwrap();
        for (slot, score) in matched.writes {
            match slot {
                TeamSlot::One => game.team1_score = Some(score),
                TeamSlot::Two => game.team2_score = Some(score),
            }
        }
        assert_eq!(game.team1_score, Some(10));
        assert_eq!(game.team2_score, Some(20));

        // Team ids: A = 1 (slot one), B = 2. X picked the loser, A.
        let team1_id = 1;
        let x_won = derive_outcome(1, team1_id, 10, 20);
        let y_won = derive_outcome(2, team1_id, 10, 20);
        assert!(x_won);
        assert!(!y_won);

        let history = vec![
            PickHistoryRow {
                participant_id: 1,
                display_name: "X".to_string(),
                round: Some(1),
                short_code: Some("A".to_string()),
                won: Some(x_won),
            },
            PickHistoryRow {
                participant_id: 2,
                display_name: "Y".to_string(),
                round: Some(1),
                short_code: Some("B".to_string()),
                won: Some(y_won),
            },
        ];

        let standings = standings::aggregate(1, &history);
        assert_eq!(standings.rows[0].display_name, "X");
        assert_eq!(standings.rows[0].record(), "1-0");
        assert_eq!(standings.rows[1].display_name, "Y");
        assert_eq!(standings.rows[1].record(), "0-1");

        let png = render::render_standings(&standings).unwrap();
        assert!(!png.is_empty());
    }

    /// Fixtures for teams that are not in the schedule never match, so a
    /// stray provider entry cannot write scores anywhere.
    #[test]
    fn test_unknown_fixture_leaves_schedule_untouched() {
        let games = vec![UnscoredGame {
            game_id: 1,
            team1_code: "A".to_string(),
            team2_code: "B".to_string(),
            team1_score: None,
            team2_score: None,
        }];

        let stray = Fixture {
            completed: true,
            kickoff: None,
            home: side("C", 3),
            away: side("D", 6),
        };

        assert!(match_fixture(&games, &stray).is_none());
        assert_eq!(games[0].team1_score, None);
        assert_eq!(games[0].team2_score, None);
    }
}
