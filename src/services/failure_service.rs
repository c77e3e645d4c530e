/// Failure tracking service.
///
/// Opens and closes downtime windows against the currently-open activity
/// record of a supervision. A window that is still open when activities
/// switch rides along on the new record (see the activity service); closing
/// a window whose reference was never propagated backfills it over every
/// record between the last one that carries it and the current one.
use std::sync::Arc;

use tracing::instrument;
use uuid::Uuid;

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::{ActivityStatistics, Failure};
use crate::domain::ports::{
    ActivityStatisticsRepository, Clock, FailureRepository, SupervisionRepository,
};

pub struct FailureService {
    supervisions: Arc<dyn SupervisionRepository>,
    statistics: Arc<dyn ActivityStatisticsRepository>,
    failures: Arc<dyn FailureRepository>,
    clock: Arc<dyn Clock>,
}

impl FailureService {
    pub fn new(
        supervisions: Arc<dyn SupervisionRepository>,
        statistics: Arc<dyn ActivityStatisticsRepository>,
        failures: Arc<dyn FailureRepository>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            supervisions,
            statistics,
            failures,
            clock,
        }
    }

    /// Opens a failure window on the open record of the supervision and
    /// activity pair, and flags the supervision invalid.
    ///
    /// Rejected with `FailureAlreadyStarted` when the record already carries
    /// an unresolved window; the open one must be finished first, so no
    /// window is ever silently orphaned.
    #[instrument(skip(self), err)]
    pub async fn start_failure(
        &self,
        supervision_id: Uuid,
        activity_id: Uuid,
    ) -> DomainResult<Failure> {
        let record = self.current_record(supervision_id, activity_id).await?;

        if let Some(failure_id) = record.failure_id {
            let failure = self
                .failures
                .get(failure_id)
                .await?
                .ok_or(DomainError::FailureNotFound(failure_id))?;
            if !failure.is_finished() {
                return Err(DomainError::FailureAlreadyStarted);
            }
        }

        let now = self.clock.now();
        let failure = Failure::new(now);
        self.failures.create(&failure).await?;
        self.statistics.set_failure(record.id, failure.id, now).await?;
        self.supervisions
            .set_validity(record.supervision_id, false, now)
            .await?;

        Ok(failure)
    }

    /// Closes the failure window reachable from the open record of the
    /// supervision and activity pair.
    #[instrument(skip(self), err)]
    pub async fn finish_failure(
        &self,
        supervision_id: Uuid,
        activity_id: Uuid,
    ) -> DomainResult<Failure> {
        let record = self.current_record(supervision_id, activity_id).await?;
        self.finish_failure_for_record(&record).await
    }

    /// Closes the window referenced by `record`, or the most recent prior
    /// window of its supervision when the reference was never propagated.
    ///
    /// In the latter case every record strictly between the one that carries
    /// the window and `record` is retroactively stamped as failed before the
    /// window closes; the close itself is the last write, so an interrupted
    /// call leaves a still-open, retryable window.
    pub(crate) async fn finish_failure_for_record(
        &self,
        record: &ActivityStatistics,
    ) -> DomainResult<Failure> {
        let now = self.clock.now();

        if let Some(failure_id) = record.failure_id {
            let mut failure = self
                .failures
                .get(failure_id)
                .await?
                .ok_or(DomainError::FailureNotFound(failure_id))?;
            if failure.is_finished() {
                return Err(DomainError::FailureNotStarted);
            }

            self.failures.set_end_date(failure_id, now).await?;
            failure.end_date = Some(now);
            return Ok(failure);
        }

        // The window began on an earlier record and never reached this one.
        let carrier = self
            .statistics
            .last_with_failure_before(record.supervision_id, record.sequence)
            .await?
            .ok_or(DomainError::FailureNotStarted)?;
        let failure_id = carrier.failure_id.ok_or(DomainError::FailureNotStarted)?;

        let mut failure = self
            .failures
            .get(failure_id)
            .await?
            .ok_or(DomainError::FailureNotFound(failure_id))?;
        if failure.is_finished() {
            return Err(DomainError::FailureNotStarted);
        }

        self.statistics
            .assign_failure_range(
                record.supervision_id,
                carrier.sequence,
                record.sequence,
                failure_id,
            )
            .await?;
        self.failures.set_end_date(failure_id, now).await?;
        failure.end_date = Some(now);
        Ok(failure)
    }

    async fn current_record(
        &self,
        supervision_id: Uuid,
        activity_id: Uuid,
    ) -> DomainResult<ActivityStatistics> {
        self.statistics
            .find_open_for_activity(supervision_id, activity_id)
            .await?
            .ok_or(DomainError::ActivityFailure {
                supervision_id,
                activity_id,
            })
    }
}
