use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Crate-wide error taxonomy. Job loops catch per-unit errors (one round,
/// one group, one reminder) and continue; nothing here aborts a whole pass.
#[derive(Debug, Error)]
pub enum Error {
    #[error("store query failed: {0}")]
    Store(#[from] sqlx::Error),

    /// Network/timeout talking to the results provider. The affected round
    /// is retried on the next scheduled pass, never mid-pass.
    #[error("results feed unavailable for season {season} round {round}: {source}")]
    FeedTransient {
        season: i32,
        round: i32,
        #[source]
        source: reqwest::Error,
    },

    #[error("results feed returned a malformed payload for season {season} round {round}: {detail}")]
    FeedDecode {
        season: i32,
        round: i32,
        detail: String,
    },

    /// A completed feed fixture with no counterpart in the persisted
    /// schedule. Logged and skipped; never fatal to the pass.
    #[error("fixture {side_a} vs {side_b} has no matching scheduled game in round {round}")]
    NoMatch {
        round: i32,
        side_a: String,
        side_b: String,
    },

    /// A round with zero picks cannot be judged resolved. Left Open until
    /// someone intervenes.
    #[error("round {round} for group {group} has no picks and cannot be resolved")]
    RoundStalled { group: String, round: i32 },

    #[error("standings render failed: {0}")]
    Render(String),

    #[error("notifier delivery failed: {0}")]
    Notify(String),

    /// Pick precondition failure (wrong round, unknown participant, team
    /// without an unstarted game). The kickoff lock is NOT this variant;
    /// it is the `PickResponse::Locked` structured result.
    #[error("pick rejected: {0}")]
    PickRejected(String),

    #[error("invalid request: {0}")]
    InvalidRequest(String),
}
