//! Activity statistics domain model.
//!
//! One timed execution of a catalog activity within a supervision. Records
//! are ordered by an explicit per-supervision `sequence`; within a
//! supervision at most one record may be open at any time.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::verify::Verifiable;

/// One timed execution record of a catalog activity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivityStatistics {
    /// Unique record identifier
    pub id: Uuid,

    /// Owning supervision
    pub supervision_id: Uuid,

    /// Reference into the external activity catalog
    pub activity_id: Uuid,

    /// Monotonic position within the supervision, assigned at insert
    pub sequence: i64,

    pub start_date: DateTime<Utc>,

    /// `None` while the activity is running
    pub end_date: Option<DateTime<Utc>>,

    /// Non-owning reference to a failure window; the same failure may be
    /// shared by several records when downtime spans activity switches
    pub failure_id: Option<Uuid>,

    pub verified: bool,
    pub verification_date: Option<DateTime<Utc>>,

    pub created_by: Option<Uuid>,
    pub updated_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ActivityStatistics {
    /// Creates a new open record at position `sequence`.
    pub fn new(
        supervision_id: Uuid,
        activity_id: Uuid,
        sequence: i64,
        start_date: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            supervision_id,
            activity_id,
            sequence,
            start_date,
            end_date: None,
            failure_id: None,
            verified: false,
            verification_date: None,
            created_by: None,
            updated_by: None,
            created_at: start_date,
            updated_at: start_date,
        }
    }

    /// Attaches a failure reference at construction time (carry-forward).
    pub fn with_failure(mut self, failure_id: Uuid) -> Self {
        self.failure_id = Some(failure_id);
        self
    }

    /// Stamps the acting user on the record.
    pub fn with_actor(mut self, actor: Uuid) -> Self {
        self.created_by = Some(actor);
        self.updated_by = Some(actor);
        self
    }

    pub fn is_open(&self) -> bool {
        self.end_date.is_none()
    }

    /// Elapsed time between start and end, if the record is closed.
    pub fn duration(&self) -> Option<chrono::Duration> {
        self.end_date.map(|end| end - self.start_date)
    }
}

impl Verifiable for ActivityStatistics {
    fn apply_verification(&mut self, verified: bool, at: DateTime<Utc>) {
        self.verified = verified;
        self.verification_date = Some(at);
    }
}
