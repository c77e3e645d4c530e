/// Activity lifecycle service.
///
/// Starting an activity is the only way a record transitions out of the
/// open state besides an explicit finish: the previous open record of the
/// supervision is closed in the same store transaction that inserts the new
/// one, and an unresolved failure on the closing record is carried forward
/// onto the new one.
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::instrument;
use uuid::Uuid;

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::{ActivityStatistics, Verifiable};
use crate::domain::ports::{
    ActivityClose, ActivityStatisticsRepository, Clock, FailureRepository, SupervisionRepository,
};

pub struct ActivityService {
    supervisions: Arc<dyn SupervisionRepository>,
    statistics: Arc<dyn ActivityStatisticsRepository>,
    failures: Arc<dyn FailureRepository>,
    clock: Arc<dyn Clock>,
}

impl ActivityService {
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

    /// Starts `activity_id` on the supervision.
    ///
    /// Rules:
    /// - restarting the activity that is already open fails with
    ///   `ActivityAlreadyActivated` and changes nothing;
    /// - an unresolved failure on the previous open record is carried
    ///   forward onto the new record;
    /// - the previous open record is closed at the current instant, in the
    ///   same transaction that inserts the new one;
    /// - starting with no previous open record is the first activity of the
    ///   session, not an error.
    #[instrument(skip(self), err)]
    pub async fn start_activity(
        &self,
        supervision_id: Uuid,
        activity_id: Uuid,
        actor: Uuid,
        start_date: Option<DateTime<Utc>>,
    ) -> DomainResult<ActivityStatistics> {
        self.supervisions
            .get(supervision_id)
            .await?
            .ok_or(DomainError::SupervisionNotFound(supervision_id))?;

        let previous = self.statistics.find_open(supervision_id).await?;
        let now = self.clock.now();

        let mut record = ActivityStatistics::new(
            supervision_id,
            activity_id,
            0,
            start_date.unwrap_or(now),
        )
        .with_actor(actor);

        let close = match previous {
            Some(ref open) => {
                if open.activity_id == activity_id {
                    return Err(DomainError::ActivityAlreadyActivated);
                }

                if let Some(failure_id) = open.failure_id {
                    let failure = self
                        .failures
                        .get(failure_id)
                        .await?
                        .ok_or(DomainError::FailureNotFound(failure_id))?;
                    if !failure.is_finished() {
                        record = record.with_failure(failure_id);
                    }
                }

                Some(ActivityClose {
                    id: open.id,
                    end_date: now,
                })
            }
            None => None,
        };

        self.statistics.start_transition(close, record).await
    }

    /// Stamps `end_date` on the record; repeated calls re-stamp it.
    #[instrument(skip(self), err)]
    pub async fn finish_activity(&self, id: Uuid) -> DomainResult<()> {
        self.statistics
            .get(id)
            .await?
            .ok_or(DomainError::StatisticsNotFound(id))?;
        self.statistics.set_end_date(id, self.clock.now()).await
    }

    #[instrument(skip(self), err)]
    pub async fn get(&self, id: Uuid) -> DomainResult<ActivityStatistics> {
        self.statistics
            .get(id)
            .await?
            .ok_or(DomainError::StatisticsNotFound(id))
    }

    /// All records of a supervision in execution order.
    #[instrument(skip(self), err)]
    pub async fn list(&self, supervision_id: Uuid) -> DomainResult<Vec<ActivityStatistics>> {
        self.supervisions
            .get(supervision_id)
            .await?
            .ok_or(DomainError::SupervisionNotFound(supervision_id))?;
        self.statistics.list_for_supervision(supervision_id).await
    }

    #[instrument(skip(self), err)]
    pub async fn verify(&self, id: Uuid) -> DomainResult<ActivityStatistics> {
        self.change_verification(id, true).await
    }

    #[instrument(skip(self), err)]
    pub async fn clear_verification(&self, id: Uuid) -> DomainResult<ActivityStatistics> {
        self.change_verification(id, false).await
    }

    async fn change_verification(
        &self,
        id: Uuid,
        verified: bool,
    ) -> DomainResult<ActivityStatistics> {
        let mut record = self
            .statistics
            .get(id)
            .await?
            .ok_or(DomainError::StatisticsNotFound(id))?;
        record.apply_verification(verified, self.clock.now());
        self.statistics
            .set_verification(record.id, record.verified, record.verification_date)
            .await?;
        Ok(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::{
        InMemoryFailureRepository, InMemoryStatisticsRepository, InMemorySupervisionRepository,
    };
    use crate::domain::models::{Failure, Supervision};
    use crate::domain::ports::FixedClock;
    use chrono::TimeZone;

    struct Fixture {
        supervisions: Arc<InMemorySupervisionRepository>,
        statistics: Arc<InMemoryStatisticsRepository>,
        failures: Arc<InMemoryFailureRepository>,
        clock: Arc<FixedClock>,
        service: ActivityService,
    }

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 15, 8, 0, 0).unwrap()
    }

    fn fixture() -> Fixture {
        let supervisions = Arc::new(InMemorySupervisionRepository::new());
        let statistics = Arc::new(InMemoryStatisticsRepository::new());
        let failures = Arc::new(InMemoryFailureRepository::new());
        let clock = Arc::new(FixedClock::new(t0()));
        let service = ActivityService::new(
            supervisions.clone(),
            statistics.clone(),
            failures.clone(),
            clock.clone(),
        );
        Fixture {
            supervisions,
            statistics,
            failures,
            clock,
            service,
        }
    }

    async fn seed_supervision(fx: &Fixture) -> Supervision {
        let supervision =
            Supervision::new(Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4(), t0());
        fx.supervisions.create(&supervision).await.unwrap();
        supervision
    }

    #[tokio::test]
    async fn test_first_activity_of_session() {
        let fx = fixture();
        let supervision = seed_supervision(&fx).await;

        let record = fx
            .service
            .start_activity(supervision.id, Uuid::new_v4(), supervision.supervisor_id, None)
            .await
            .unwrap();

        assert!(record.is_open());
        assert_eq!(record.sequence, 1);
        assert_eq!(record.start_date, t0());
        assert!(record.failure_id.is_none());
    }

    #[tokio::test]
    async fn test_starting_next_activity_closes_previous() {
        let fx = fixture();
        let supervision = seed_supervision(&fx).await;
        let actor = supervision.supervisor_id;

        let first = fx
            .service
            .start_activity(supervision.id, Uuid::new_v4(), actor, None)
            .await
            .unwrap();

        fx.clock.advance(chrono::Duration::minutes(30));
        let second = fx
            .service
            .start_activity(supervision.id, Uuid::new_v4(), actor, None)
            .await
            .unwrap();

        let closed = fx.statistics.get(first.id).await.unwrap().unwrap();
        assert_eq!(closed.end_date, Some(fx.clock.now()));
        assert_eq!(second.sequence, 2);
        assert!(second.is_open());
    }

    #[tokio::test]
    async fn test_restarting_open_activity_is_rejected() {
        let fx = fixture();
        let supervision = seed_supervision(&fx).await;
        let activity = Uuid::new_v4();
        let actor = supervision.supervisor_id;

        let first = fx
            .service
            .start_activity(supervision.id, activity, actor, None)
            .await
            .unwrap();

        let result = fx
            .service
            .start_activity(supervision.id, activity, actor, None)
            .await;
        assert!(matches!(result, Err(DomainError::ActivityAlreadyActivated)));

        // Nothing changed.
        let unchanged = fx.statistics.get(first.id).await.unwrap().unwrap();
        assert!(unchanged.is_open());
        assert_eq!(fx.statistics.list_for_supervision(supervision.id).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_unresolved_failure_is_carried_forward() {
        let fx = fixture();
        let supervision = seed_supervision(&fx).await;
        let actor = supervision.supervisor_id;

        let first = fx
            .service
            .start_activity(supervision.id, Uuid::new_v4(), actor, None)
            .await
            .unwrap();

        let failure = Failure::new(fx.clock.now());
        fx.failures.create(&failure).await.unwrap();
        fx.statistics
            .set_failure(first.id, failure.id, fx.clock.now())
            .await
            .unwrap();

        fx.clock.advance(chrono::Duration::minutes(10));
        let second = fx
            .service
            .start_activity(supervision.id, Uuid::new_v4(), actor, None)
            .await
            .unwrap();

        assert_eq!(second.failure_id, Some(failure.id));
        let stored = fx.failures.get(failure.id).await.unwrap().unwrap();
        assert!(!stored.is_finished());
    }

    #[tokio::test]
    async fn test_resolved_failure_is_not_carried_forward() {
        let fx = fixture();
        let supervision = seed_supervision(&fx).await;
        let actor = supervision.supervisor_id;

        let first = fx
            .service
            .start_activity(supervision.id, Uuid::new_v4(), actor, None)
            .await
            .unwrap();

        let failure = Failure::new(fx.clock.now());
        fx.failures.create(&failure).await.unwrap();
        fx.statistics
            .set_failure(first.id, failure.id, fx.clock.now())
            .await
            .unwrap();
        fx.failures
            .set_end_date(failure.id, fx.clock.now())
            .await
            .unwrap();

        let second = fx
            .service
            .start_activity(supervision.id, Uuid::new_v4(), actor, None)
            .await
            .unwrap();

        assert!(second.failure_id.is_none());
    }

    #[tokio::test]
    async fn test_finish_activity_restamps_end_date() {
        let fx = fixture();
        let supervision = seed_supervision(&fx).await;

        let record = fx
            .service
            .start_activity(supervision.id, Uuid::new_v4(), supervision.supervisor_id, None)
            .await
            .unwrap();

        fx.clock.advance(chrono::Duration::minutes(5));
        fx.service.finish_activity(record.id).await.unwrap();
        let first_end = fx.statistics.get(record.id).await.unwrap().unwrap().end_date;

        fx.clock.advance(chrono::Duration::minutes(5));
        fx.service.finish_activity(record.id).await.unwrap();
        let second_end = fx.statistics.get(record.id).await.unwrap().unwrap().end_date;

        assert!(first_end.unwrap() < second_end.unwrap());
    }

    #[tokio::test]
    async fn test_start_activity_unknown_supervision() {
        let fx = fixture();
        let result = fx
            .service
            .start_activity(Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4(), None)
            .await;
        assert!(matches!(result, Err(DomainError::SupervisionNotFound(_))));
    }

    #[tokio::test]
    async fn test_verify_then_clear_restamps_date() {
        let fx = fixture();
        let supervision = seed_supervision(&fx).await;
        let record = fx
            .service
            .start_activity(supervision.id, Uuid::new_v4(), supervision.supervisor_id, None)
            .await
            .unwrap();

        let verified = fx.service.verify(record.id).await.unwrap();
        assert!(verified.verified);
        let first_stamp = verified.verification_date.unwrap();

        fx.clock.advance(chrono::Duration::minutes(1));
        let cleared = fx.service.clear_verification(record.id).await.unwrap();
        assert!(!cleared.verified);
        assert!(cleared.verification_date.unwrap() > first_stamp);
    }
}
