/// Supervision lifecycle service.
///
/// Owns session creation (guarded so a supervisor never has two ongoing
/// sessions), the cascading finish, verification, and the admin cleanup of
/// unverified sessions.
use std::sync::Arc;

use tracing::{info, instrument};
use uuid::Uuid;

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::{Supervision, Verifiable};
use crate::domain::ports::{
    ActivityStatisticsRepository, Clock, FailureRepository, SupervisionFilter,
    SupervisionRepository,
};
use crate::services::FailureService;

pub struct SupervisionService {
    supervisions: Arc<dyn SupervisionRepository>,
    statistics: Arc<dyn ActivityStatisticsRepository>,
    failures: Arc<dyn FailureRepository>,
    failure_service: FailureService,
    clock: Arc<dyn Clock>,
}

impl SupervisionService {
    pub fn new(
        supervisions: Arc<dyn SupervisionRepository>,
        statistics: Arc<dyn ActivityStatisticsRepository>,
        failures: Arc<dyn FailureRepository>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let failure_service = FailureService::new(
            supervisions.clone(),
            statistics.clone(),
            failures.clone(),
            clock.clone(),
        );
        Self {
            supervisions,
            statistics,
            failures,
            failure_service,
            clock,
        }
    }

    /// Opens a new session for `supervisor` over `worker`.
    ///
    /// # Errors
    /// `SupervisionNotFinished` when the supervisor's previous session is
    /// still open; no row is created in that case.
    #[instrument(skip(self), err)]
    pub async fn create(
        &self,
        worker_id: Uuid,
        organization_id: Uuid,
        supervisor_id: Uuid,
    ) -> DomainResult<Supervision> {
        if self
            .supervisions
            .find_open_for_supervisor(supervisor_id)
            .await?
            .is_some()
        {
            return Err(DomainError::SupervisionNotFinished);
        }

        let supervision =
            Supervision::new(worker_id, organization_id, supervisor_id, self.clock.now());
        self.supervisions.create(&supervision).await?;
        Ok(supervision)
    }

    #[instrument(skip(self), err)]
    pub async fn get(&self, id: Uuid) -> DomainResult<Supervision> {
        self.supervisions
            .get(id)
            .await?
            .ok_or(DomainError::SupervisionNotFound(id))
    }

    #[instrument(skip(self), err)]
    pub async fn list(&self, filter: SupervisionFilter) -> DomainResult<Vec<Supervision>> {
        self.supervisions.list(filter).await
    }

    /// Closes the session, cascading to whatever is still open underneath:
    /// the open activity record is finished first, and an unresolved failure
    /// it carries is finished too. Safe to call with nothing open.
    #[instrument(skip(self), err)]
    pub async fn finish(&self, id: Uuid) -> DomainResult<Supervision> {
        let mut supervision = self.get(id).await?;
        let now = self.clock.now();

        if let Some(open) = self.statistics.find_open(id).await? {
            self.statistics.set_end_date(open.id, now).await?;

            if let Some(failure_id) = open.failure_id {
                let failure = self
                    .failures
                    .get(failure_id)
                    .await?
                    .ok_or(DomainError::FailureNotFound(failure_id))?;
                if !failure.is_finished() {
                    self.failure_service.finish_failure_for_record(&open).await?;
                }
            }
        }

        self.supervisions.set_end_date(id, now).await?;
        supervision.end_date = Some(now);
        supervision.updated_at = now;
        Ok(supervision)
    }

    /// Bulk admin cleanup: removes every unverified session together with
    /// its activity records. Not part of the lifecycle state machine.
    #[instrument(skip(self))]
    pub async fn delete_unverified(&self) -> DomainResult<u64> {
        let deleted = self.supervisions.delete_unverified().await?;
        info!(deleted, "removed unverified supervisions");
        Ok(deleted)
    }

    #[instrument(skip(self), err)]
    pub async fn verify(&self, id: Uuid) -> DomainResult<Supervision> {
        self.change_verification(id, true).await
    }

    #[instrument(skip(self), err)]
    pub async fn clear_verification(&self, id: Uuid) -> DomainResult<Supervision> {
        self.change_verification(id, false).await
    }

    async fn change_verification(&self, id: Uuid, verified: bool) -> DomainResult<Supervision> {
        let mut supervision = self.get(id).await?;
        supervision.apply_verification(verified, self.clock.now());
        self.supervisions
            .set_verification(supervision.id, supervision.verified, supervision.verification_date)
            .await?;
        Ok(supervision)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::{
        InMemoryFailureRepository, InMemoryStatisticsRepository, InMemorySupervisionRepository,
    };
    use crate::domain::ports::FixedClock;
    use crate::services::ActivityService;
    use chrono::{DateTime, TimeZone, Utc};

    struct Fixture {
        supervisions: Arc<InMemorySupervisionRepository>,
        statistics: Arc<InMemoryStatisticsRepository>,
        failures: Arc<InMemoryFailureRepository>,
        clock: Arc<FixedClock>,
        service: SupervisionService,
        activities: ActivityService,
        failure_service: FailureService,
    }

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 15, 8, 0, 0).unwrap()
    }

    fn fixture() -> Fixture {
        let supervisions = Arc::new(InMemorySupervisionRepository::new());
        let statistics = Arc::new(InMemoryStatisticsRepository::new());
        let failures = Arc::new(InMemoryFailureRepository::new());
        let clock = Arc::new(FixedClock::new(t0()));
        let service = SupervisionService::new(
            supervisions.clone(),
            statistics.clone(),
            failures.clone(),
            clock.clone(),
        );
        let activities = ActivityService::new(
            supervisions.clone(),
            statistics.clone(),
            failures.clone(),
            clock.clone(),
        );
        let failure_service = FailureService::new(
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
            activities,
            failure_service,
        }
    }

    #[tokio::test]
    async fn test_create_supervision() {
        let fx = fixture();
        let supervisor = Uuid::new_v4();

        let supervision = fx
            .service
            .create(Uuid::new_v4(), Uuid::new_v4(), supervisor)
            .await
            .unwrap();

        assert_eq!(supervision.start_date, t0());
        assert!(!supervision.is_finished());
        assert!(supervision.validity);
    }

    #[tokio::test]
    async fn test_create_rejected_while_previous_session_open() {
        let fx = fixture();
        let supervisor = Uuid::new_v4();

        fx.service
            .create(Uuid::new_v4(), Uuid::new_v4(), supervisor)
            .await
            .unwrap();

        let result = fx
            .service
            .create(Uuid::new_v4(), Uuid::new_v4(), supervisor)
            .await;
        assert!(matches!(result, Err(DomainError::SupervisionNotFinished)));

        // No second row was created.
        let open = fx
            .supervisions
            .find_open_for_supervisor(supervisor)
            .await
            .unwrap();
        assert!(open.is_some());
        assert_eq!(fx.supervisions.list(SupervisionFilter::default()).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_create_allowed_after_previous_finished() {
        let fx = fixture();
        let supervisor = Uuid::new_v4();

        let first = fx
            .service
            .create(Uuid::new_v4(), Uuid::new_v4(), supervisor)
            .await
            .unwrap();
        fx.service.finish(first.id).await.unwrap();

        let second = fx
            .service
            .create(Uuid::new_v4(), Uuid::new_v4(), supervisor)
            .await;
        assert!(second.is_ok());
    }

    #[tokio::test]
    async fn test_finish_closes_open_activity_and_session() {
        let fx = fixture();
        let supervision = fx
            .service
            .create(Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4())
            .await
            .unwrap();

        let record = fx
            .activities
            .start_activity(supervision.id, Uuid::new_v4(), supervision.supervisor_id, None)
            .await
            .unwrap();

        fx.clock.advance(chrono::Duration::hours(1));
        let finished = fx.service.finish(supervision.id).await.unwrap();

        assert_eq!(finished.end_date, Some(fx.clock.now()));
        let closed = fx.statistics.get(record.id).await.unwrap().unwrap();
        assert_eq!(closed.end_date, Some(fx.clock.now()));
    }

    #[tokio::test]
    async fn test_finish_closes_unresolved_failure() {
        let fx = fixture();
        let supervision = fx
            .service
            .create(Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4())
            .await
            .unwrap();
        let activity = Uuid::new_v4();

        fx.activities
            .start_activity(supervision.id, activity, supervision.supervisor_id, None)
            .await
            .unwrap();
        let failure = fx
            .failure_service
            .start_failure(supervision.id, activity)
            .await
            .unwrap();

        fx.clock.advance(chrono::Duration::minutes(30));
        fx.service.finish(supervision.id).await.unwrap();

        let closed = fx.failures.get(failure.id).await.unwrap().unwrap();
        assert_eq!(closed.end_date, Some(fx.clock.now()));
    }

    #[tokio::test]
    async fn test_finish_with_no_open_activity_closes_session_only() {
        let fx = fixture();
        let supervision = fx
            .service
            .create(Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4())
            .await
            .unwrap();

        let finished = fx.service.finish(supervision.id).await.unwrap();
        assert!(finished.is_finished());
    }

    #[tokio::test]
    async fn test_finish_unknown_supervision() {
        let fx = fixture();
        let result = fx.service.finish(Uuid::new_v4()).await;
        assert!(matches!(result, Err(DomainError::SupervisionNotFound(_))));
    }

    #[tokio::test]
    async fn test_verification_restamps_in_both_directions() {
        let fx = fixture();
        let supervision = fx
            .service
            .create(Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4())
            .await
            .unwrap();

        let verified = fx.service.verify(supervision.id).await.unwrap();
        assert!(verified.verified);
        let first_stamp = verified.verification_date.unwrap();

        fx.clock.advance(chrono::Duration::minutes(2));
        let again = fx.service.verify(supervision.id).await.unwrap();
        assert!(again.verified);
        assert!(again.verification_date.unwrap() > first_stamp);

        fx.clock.advance(chrono::Duration::minutes(2));
        let cleared = fx.service.clear_verification(supervision.id).await.unwrap();
        assert!(!cleared.verified);
        assert_eq!(cleared.verification_date, Some(fx.clock.now()));
    }

    #[tokio::test]
    async fn test_delete_unverified_keeps_verified_sessions() {
        let fx = fixture();
        let supervisor_a = Uuid::new_v4();
        let supervisor_b = Uuid::new_v4();

        let kept = fx
            .service
            .create(Uuid::new_v4(), Uuid::new_v4(), supervisor_a)
            .await
            .unwrap();
        fx.service.verify(kept.id).await.unwrap();

        fx.service
            .create(Uuid::new_v4(), Uuid::new_v4(), supervisor_b)
            .await
            .unwrap();

        let deleted = fx.service.delete_unverified().await.unwrap();
        assert_eq!(deleted, 1);
        assert!(fx.service.get(kept.id).await.is_ok());
    }

    // Scenario: start two activities back to back, then finish the session.
    #[tokio::test]
    async fn test_full_session_timeline() {
        let fx = fixture();
        let supervision = fx
            .service
            .create(Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4())
            .await
            .unwrap();
        let actor = supervision.supervisor_id;

        let r1 = fx
            .activities
            .start_activity(supervision.id, Uuid::new_v4(), actor, None)
            .await
            .unwrap();
        assert_eq!(r1.start_date, t0());

        fx.clock.advance(chrono::Duration::minutes(40));
        let t1 = fx.clock.now();
        let r2 = fx
            .activities
            .start_activity(supervision.id, Uuid::new_v4(), actor, None)
            .await
            .unwrap();

        let r1_closed = fx.statistics.get(r1.id).await.unwrap().unwrap();
        assert_eq!(r1_closed.end_date, Some(t1));
        assert_eq!(r2.start_date, t1);

        fx.clock.advance(chrono::Duration::minutes(40));
        let t2 = fx.clock.now();
        let finished = fx.service.finish(supervision.id).await.unwrap();

        let r2_closed = fx.statistics.get(r2.id).await.unwrap().unwrap();
        assert_eq!(r2_closed.end_date, Some(t2));
        assert_eq!(finished.end_date, Some(t2));
    }
}
