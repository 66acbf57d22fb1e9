//! Standings aggregation over the pick ledger.
//!
//! Everything here is pure: the store rows go in, an ordered standings
//! table comes out, and re-running on the same input always yields the
//! same order.

use crate::models::PickHistoryRow;

/// One grid cell: the short code the participant picked that round and the
/// outcome tristate (None while unresolved).
#[derive(Debug, Clone, PartialEq)]
pub struct PickCell {
    pub short_code: String,
    pub won: Option<bool>,
}

#[derive(Debug, Clone)]
pub struct StandingRow {
    pub participant_id: i32,
    pub display_name: String,
    pub wins: u32,
    pub losses: u32,
    /// Index r holds the pick for round r+1; None renders blank, which is
    /// distinct from both win and loss.
    pub cells: Vec<Option<PickCell>>,
}

impl StandingRow {
    pub fn record(&self) -> String {
        format!("{}-{}", self.wins, self.losses)
    }
}

#[derive(Debug, Clone)]
pub struct Standings {
    pub round: i32,
    pub rows: Vec<StandingRow>,
}

/// Aggregate a group's full pick history through `current_round`.
///
/// Only picks with a resolved outcome count toward the record; rounds with
/// no pick or an unresolved game leave the cell blank and touch neither
/// tally. Order: wins descending, losses ascending, then display name
/// ascending (case-sensitive) as the final tie-break.
pub fn aggregate(current_round: i32, history: &[PickHistoryRow]) -> Standings {
    let round_count = current_round.max(0) as usize;
    let mut rows: Vec<StandingRow> = Vec::new();

    for record in history {
        let idx = match rows
            .iter()
            .position(|r| r.participant_id == record.participant_id)
        {
            Some(idx) => idx,
            None => {
                rows.push(StandingRow {
                    participant_id: record.participant_id,
                    display_name: record.display_name.clone(),
                    wins: 0,
                    losses: 0,
                    cells: vec![None; round_count],
                });
                rows.len() - 1
            }
        };
        let row = &mut rows[idx];

        let (Some(round), Some(short_code)) = (record.round, record.short_code.as_ref()) else {
            // Participant with no picks at all: present, blank row, 0-0.
            continue;
        };

        match record.won {
            Some(true) => row.wins += 1,
            Some(false) => row.losses += 1,
            None => {}
        }

        if round >= 1 && round <= current_round {
            row.cells[(round - 1) as usize] = Some(PickCell {
                short_code: short_code.clone(),
                won: record.won,
            });
        }
    }

    rows.sort_by(|a, b| {
        b.wins
            .cmp(&a.wins)
            .then(a.losses.cmp(&b.losses))
            .then(a.display_name.cmp(&b.display_name))
    });

    Standings {
        round: current_round,
        rows,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(
        participant_id: i32,
        name: &str,
        round: Option<i32>,
        code: Option<&str>,
        won: Option<bool>,
    ) -> PickHistoryRow {
        PickHistoryRow {
            participant_id,
            display_name: name.to_string(),
            round,
            short_code: code.map(str::to_string),
            won,
        }
    }

    #[test]
    fn test_resolved_picks_accumulate_record() {
        let history = vec![
            row(1, "Alice", Some(1), Some("KC"), Some(true)),
            row(1, "Alice", Some(2), Some("DET"), Some(false)),
            row(1, "Alice", Some(3), Some("NYJ"), Some(true)),
        ];

        let standings = aggregate(3, &history);
        assert_eq!(standings.rows.len(), 1);
        assert_eq!(standings.rows[0].wins, 2);
        assert_eq!(standings.rows[0].losses, 1);
        assert_eq!(standings.rows[0].record(), "2-1");
    }

    #[test]
    fn test_unresolved_and_missing_rounds_count_for_neither() {
        let history = vec![
            row(1, "Alice", Some(1), Some("KC"), Some(true)),
            // Round 2: no pick at all. Round 3: game not resolved yet.
            row(1, "Alice", Some(3), Some("NYJ"), None),
        ];

        let standings = aggregate(3, &history);
        let alice = &standings.rows[0];
        assert_eq!((alice.wins, alice.losses), (1, 0));
        assert_eq!(alice.cells[0], Some(PickCell { short_code: "KC".into(), won: Some(true) }));
        assert_eq!(alice.cells[1], None);
        assert_eq!(
            alice.cells[2],
            Some(PickCell { short_code: "NYJ".into(), won: None })
        );
    }

    #[test]
    fn test_participant_with_no_picks_appears_blank() {
        let history = vec![
            row(1, "Alice", Some(1), Some("KC"), Some(true)),
            row(2, "Bob", None, None, None),
        ];

        let standings = aggregate(1, &history);
        assert_eq!(standings.rows.len(), 2);

        let bob = standings.rows.iter().find(|r| r.display_name == "Bob").unwrap();
        assert_eq!((bob.wins, bob.losses), (0, 0));
        assert_eq!(bob.cells, vec![None]);
    }

    #[test]
    fn test_ordering_wins_desc_losses_asc_name_asc() {
        let history = vec![
            row(1, "Cara", Some(1), Some("A"), Some(true)),
            row(2, "Abel", Some(1), Some("B"), Some(false)),
            row(3, "Bea", Some(1), Some("C"), Some(true)),
            row(3, "Bea", Some(2), Some("D"), Some(false)),
            row(1, "Cara", Some(2), Some("E"), None),
        ];

        let standings = aggregate(2, &history);
        let names: Vec<&str> = standings.rows.iter().map(|r| r.display_name.as_str()).collect();
        // Cara 1-0 beats Bea 1-1 (fewer losses); Abel 0-1 last.
        assert_eq!(names, vec!["Cara", "Bea", "Abel"]);
    }

    #[test]
    fn test_name_tie_break_is_case_sensitive_and_permutation_invariant() {
        let base = vec![
            row(1, "bob", Some(1), Some("A"), Some(true)),
            row(2, "Alice", Some(1), Some("B"), Some(true)),
            row(3, "Bob", Some(1), Some("C"), Some(true)),
        ];

        let mut permuted = base.clone();
        permuted.reverse();

        let a = aggregate(1, &base);
        let b = aggregate(1, &permuted);

        let order =
            |s: &Standings| s.rows.iter().map(|r| r.display_name.clone()).collect::<Vec<_>>();
        // Uppercase sorts before lowercase in a lexical byte-wise compare.
        assert_eq!(order(&a), vec!["Alice", "Bob", "bob"]);
        assert_eq!(order(&a), order(&b));
    }

    #[test]
    fn test_two_participant_end_to_end_round() {
        // Round 1: A=10 vs B=20. X picked A (the loser, so a win for X),
        // Y picked B.
        let history = vec![
            row(1, "X", Some(1), Some("A"), Some(true)),
            row(2, "Y", Some(1), Some("B"), Some(false)),
        ];

        let standings = aggregate(1, &history);
        assert_eq!(standings.rows[0].display_name, "X");
        assert_eq!(standings.rows[0].record(), "1-0");
        assert_eq!(standings.rows[1].display_name, "Y");
        assert_eq!(standings.rows[1].record(), "0-1");
    }
}
