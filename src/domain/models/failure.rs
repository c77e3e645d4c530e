//! Failure domain model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A downtime/incident window, possibly spanning several activity records.
///
/// `start_date` never moves after creation; `end_date` transitions from
/// `None` to a value exactly once.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Failure {
    pub id: Uuid,
    pub start_date: DateTime<Utc>,
    pub end_date: Option<DateTime<Utc>>,
}

impl Failure {
    pub fn new(start_date: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            start_date,
            end_date: None,
        }
    }

    pub fn is_finished(&self) -> bool {
        self.end_date.is_some()
    }

    /// Window length once closed; open windows have no fixed duration.
    pub fn duration(&self) -> Option<chrono::Duration> {
        self.end_date.map(|end| end - self.start_date)
    }
}
