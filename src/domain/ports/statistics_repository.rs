/// Activity statistics repository port.
///
/// Besides plain CRUD this port carries the two operations the lifecycle
/// engine needs to be indivisible: the activity transition (close the
/// previous open record and insert the next one) and the failure backfill
/// over a sequence range.
use crate::domain::errors::DomainResult;
use crate::domain::models::ActivityStatistics;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Closing half of an activity transition.
#[derive(Debug, Clone, Copy)]
pub struct ActivityClose {
    pub id: Uuid,
    pub end_date: DateTime<Utc>,
}

#[async_trait]
pub trait ActivityStatisticsRepository: Send + Sync {
    async fn get(&self, id: Uuid) -> DomainResult<Option<ActivityStatistics>>;

    /// The supervision's open record, if any. At most one exists.
    async fn find_open(&self, supervision_id: Uuid) -> DomainResult<Option<ActivityStatistics>>;

    /// The open record for a specific activity of the supervision.
    async fn find_open_for_activity(
        &self,
        supervision_id: Uuid,
        activity_id: Uuid,
    ) -> DomainResult<Option<ActivityStatistics>>;

    /// The most recent record of the supervision strictly before `sequence`
    /// that carries a failure reference (the failure of record for backfill).
    async fn last_with_failure_before(
        &self,
        supervision_id: Uuid,
        sequence: i64,
    ) -> DomainResult<Option<ActivityStatistics>>;

    /// Atomically closes `previous` (when given) and inserts `record`,
    /// assigning it the next free sequence of its supervision. Both writes
    /// commit together or not at all. Returns the stored record.
    async fn start_transition(
        &self,
        previous: Option<ActivityClose>,
        record: ActivityStatistics,
    ) -> DomainResult<ActivityStatistics>;

    /// Stamps `end_date`; repeated calls re-stamp it.
    async fn set_end_date(&self, id: Uuid, end_date: DateTime<Utc>) -> DomainResult<()>;

    /// Links the record to a failure window.
    async fn set_failure(&self, id: Uuid, failure_id: Uuid, at: DateTime<Utc>) -> DomainResult<()>;

    /// Backfill: stamps `failure_id` onto every record of the supervision
    /// with `after_sequence < sequence < before_sequence`, in one statement.
    /// Returns the number of records stamped.
    async fn assign_failure_range(
        &self,
        supervision_id: Uuid,
        after_sequence: i64,
        before_sequence: i64,
        failure_id: Uuid,
    ) -> DomainResult<u64>;

    async fn set_verification(
        &self,
        id: Uuid,
        verified: bool,
        verification_date: Option<DateTime<Utc>>,
    ) -> DomainResult<()>;

    /// All records of a supervision ordered by sequence.
    async fn list_for_supervision(
        &self,
        supervision_id: Uuid,
    ) -> DomainResult<Vec<ActivityStatistics>>;
}
