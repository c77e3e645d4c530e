//! Domain errors for the shiftwatch tracking core.
//!
//! Every variant is a client-input or state-conflict error raised before any
//! write of the failing operation; store failures are surfaced separately.

use thiserror::Error;
use uuid::Uuid;

/// Domain-level errors that can occur in the shiftwatch system.
#[derive(Debug, Error)]
pub enum DomainError {
    /// Starting the activity that is already open on the supervision.
    #[error("Activity is already activated")]
    ActivityAlreadyActivated,

    /// Finishing a failure when none is open or on record for the supervision.
    #[error("No failure has been started")]
    FailureNotStarted,

    /// Starting a failure while the current record already carries an
    /// unresolved one.
    #[error("A failure is already in progress")]
    FailureAlreadyStarted,

    /// No open activity record exists for the supervision and activity pair.
    #[error("No active record for activity {activity_id} in supervision {supervision_id}")]
    ActivityFailure {
        supervision_id: Uuid,
        activity_id: Uuid,
    },

    /// Creating a supervision while the actor's previous one is still open.
    #[error("Previous supervision is not finished")]
    SupervisionNotFinished,

    #[error("Supervision not found: {0}")]
    SupervisionNotFound(Uuid),

    #[error("Activity statistics not found: {0}")]
    StatisticsNotFound(Uuid),

    #[error("Failure not found: {0}")]
    FailureNotFound(Uuid),

    /// A comment must carry text or at least one file.
    #[error("Comment has neither text nor files")]
    EmptyComment,

    #[error("Database error: {0}")]
    Database(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

pub type DomainResult<T> = Result<T, DomainError>;

impl From<sqlx::Error> for DomainError {
    fn from(err: sqlx::Error) -> Self {
        DomainError::Database(err.to_string())
    }
}

impl From<serde_json::Error> for DomainError {
    fn from(err: serde_json::Error) -> Self {
        DomainError::Serialization(err.to_string())
    }
}
