/// Supervision repository port (trait) for dependency injection.
///
/// Services depend on this trait, not on the SQLite implementation.
use crate::domain::errors::DomainResult;
use crate::domain::models::Supervision;
use async_trait::async_trait;
use chrono::{DateTime, Days, NaiveDate, NaiveTime, Utc};
use uuid::Uuid;

/// Listing filter.
///
/// Date bounds reproduce the journal's reporting semantics: when the bounds
/// collapse to a single day (or only one bound is given), every session
/// active on that day matches, including ongoing ones; a true range matches
/// sessions that started inside it and ended inside it or are still ongoing.
#[derive(Debug, Clone, Default)]
pub struct SupervisionFilter {
    pub supervisor_id: Option<Uuid>,
    pub worker_id: Option<Uuid>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

impl SupervisionFilter {
    pub fn matches(&self, supervision: &Supervision) -> bool {
        if let Some(supervisor_id) = self.supervisor_id {
            if supervision.supervisor_id != supervisor_id {
                return false;
            }
        }
        if let Some(worker_id) = self.worker_id {
            if supervision.worker_id != worker_id {
                return false;
            }
        }

        let (start, end) = match (self.start_date, self.end_date) {
            (None, None) => return true,
            (Some(day), None) | (None, Some(day)) => (day, day),
            (Some(start), Some(end)) => (start, end),
        };

        if start == end {
            // Active-on-day overlap: started by the end of the day and not
            // finished before it began.
            supervision.start_date < day_after(start)
                && supervision
                    .end_date
                    .map_or(true, |finished| finished >= day_start(start))
        } else {
            // Containment: started inside the range, ended inside it or
            // still ongoing.
            supervision.start_date >= day_start(start)
                && supervision
                    .end_date
                    .map_or(true, |finished| finished < day_after(end))
        }
    }
}

fn day_start(day: NaiveDate) -> DateTime<Utc> {
    day.and_time(NaiveTime::MIN).and_utc()
}

fn day_after(day: NaiveDate) -> DateTime<Utc> {
    day_start(day.checked_add_days(Days::new(1)).unwrap_or(day))
}

/// Repository trait for supervision persistence.
#[async_trait]
pub trait SupervisionRepository: Send + Sync {
    async fn create(&self, supervision: &Supervision) -> DomainResult<()>;

    async fn get(&self, id: Uuid) -> DomainResult<Option<Supervision>>;

    /// The supervisor's ongoing session, if any. At most one exists.
    async fn find_open_for_supervisor(
        &self,
        supervisor_id: Uuid,
    ) -> DomainResult<Option<Supervision>>;

    /// Closes the session at `end_date`.
    ///
    /// # Errors
    /// Returns `SupervisionNotFound` if no such row exists.
    async fn set_end_date(&self, id: Uuid, end_date: DateTime<Utc>) -> DomainResult<()>;

    /// Flips the validity flag (false once a failure has been recorded).
    async fn set_validity(&self, id: Uuid, validity: bool, at: DateTime<Utc>) -> DomainResult<()>;

    /// Persists the verification flag and its transition timestamp.
    async fn set_verification(
        &self,
        id: Uuid,
        verified: bool,
        verification_date: Option<DateTime<Utc>>,
    ) -> DomainResult<()>;

    async fn list(&self, filter: SupervisionFilter) -> DomainResult<Vec<Supervision>>;

    /// Bulk admin cleanup: deletes every unverified session, cascading to
    /// its activity records. Returns the number of sessions removed.
    async fn delete_unverified(&self) -> DomainResult<u64>;
}
