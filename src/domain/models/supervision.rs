//! Supervision domain model.
//!
//! A supervision is one continuous observation session by a supervisor over a
//! worker, scoped to an organization. Activity records hang off it; failures
//! recorded during the session flip its validity.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::verify::Verifiable;

/// One supervisor-observation session over a worker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Supervision {
    /// Unique supervision identifier
    pub id: Uuid,

    /// Worker being observed
    pub worker_id: Uuid,

    /// Organization the session is scoped to
    pub organization_id: Uuid,

    /// Supervisor running the session
    pub supervisor_id: Uuid,

    /// Session start
    pub start_date: DateTime<Utc>,

    /// Session end; `None` while the session is ongoing
    pub end_date: Option<DateTime<Utc>>,

    /// False once any failure has been recorded during the session
    pub validity: bool,

    /// Review/approval flag
    pub verified: bool,

    /// Timestamp of the last verification transition, in either direction
    pub verification_date: Option<DateTime<Utc>>,

    /// Actor that created the record
    pub created_by: Option<Uuid>,

    /// Actor of the last mutation
    pub updated_by: Option<Uuid>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Supervision {
    /// Creates a new ongoing supervision started at `start_date`.
    pub fn new(
        worker_id: Uuid,
        organization_id: Uuid,
        supervisor_id: Uuid,
        start_date: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            worker_id,
            organization_id,
            supervisor_id,
            start_date,
            end_date: None,
            validity: true,
            verified: false,
            verification_date: None,
            created_by: Some(supervisor_id),
            updated_by: Some(supervisor_id),
            created_at: start_date,
            updated_at: start_date,
        }
    }

    /// Returns true once the session has been closed.
    pub fn is_finished(&self) -> bool {
        self.end_date.is_some()
    }

    /// Elapsed time between start and end, if the session is closed.
    pub fn duration(&self) -> Option<chrono::Duration> {
        self.end_date.map(|end| end - self.start_date)
    }
}

impl Verifiable for Supervision {
    fn apply_verification(&mut self, verified: bool, at: DateTime<Utc>) {
        self.verified = verified;
        self.verification_date = Some(at);
    }
}
