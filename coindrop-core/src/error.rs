//! Error taxonomy shared by all core operations.

use thiserror::Error;

/// Errors returned by lifecycle, allocation, winner and scheduler operations.
///
/// None of these are fatal to the process; callers decide whether to retry.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Malformed or out-of-range input, surfaced verbatim to the caller.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// The operation is not valid in the event's current state. The message
    /// names the conflicting state ("already started, use stop instead").
    #[error("{0}")]
    StateConflict(String),

    /// The referenced entity does not exist.
    #[error("{0} not found")]
    NotFound(&'static str),

    /// A store transaction failed. The transition is guaranteed not to have
    /// partially applied.
    #[error("storage failure: {0}")]
    Persistence(#[from] sqlx::Error),
}

impl CoreError {
    /// Whether this error is the benign outcome of losing a race against a
    /// concurrent mutation of the same event. The scheduler treats these as
    /// no-ops rather than failures.
    pub fn is_benign_race(&self) -> bool {
        matches!(self, CoreError::StateConflict(_) | CoreError::NotFound(_))
    }
}

/// Maps a unique violation on the single-current-event index to the same
/// `StateConflict` the in-transaction check produces, so a race loser sees a
/// clean conflict instead of an opaque storage failure.
pub fn conflict_on_unique(err: sqlx::Error, conflict: &str) -> CoreError {
    let is_unique = err
        .as_database_error()
        .is_some_and(|db| db.is_unique_violation());
    if is_unique {
        CoreError::StateConflict(conflict.to_string())
    } else {
        CoreError::Persistence(err)
    }
}
