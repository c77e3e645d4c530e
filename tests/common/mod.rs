//! Common test utilities for integration tests
//!
//! Wires the services to a fresh in-memory SQLite store with a pinned clock.

#![allow(dead_code)]

use std::sync::Arc;

use chrono::{DateTime, TimeZone, Utc};
use uuid::Uuid;

use shiftwatch::adapters::sqlite::{
    all_embedded_migrations, create_test_pool, Migrator, SqliteCommentRepository,
    SqliteFailureRepository, SqliteStatisticsRepository, SqliteSupervisionRepository,
};
use shiftwatch::domain::ports::FixedClock;
use shiftwatch::services::{ActivityService, CommentService, FailureService, SupervisionService};

pub struct TestContext {
    pub supervision_repo: Arc<SqliteSupervisionRepository>,
    pub statistics_repo: Arc<SqliteStatisticsRepository>,
    pub failure_repo: Arc<SqliteFailureRepository>,
    pub comment_repo: Arc<SqliteCommentRepository>,
    pub clock: Arc<FixedClock>,
    pub supervisions: SupervisionService,
    pub activities: ActivityService,
    pub failures: FailureService,
    pub comments: CommentService,
}

/// Pinned test epoch: 2024-01-15 08:00 UTC.
pub fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 15, 8, 0, 0).unwrap()
}

pub async fn setup() -> TestContext {
    let pool = create_test_pool().await.expect("failed to create test pool");
    Migrator::new(pool.clone())
        .run_embedded_migrations(all_embedded_migrations())
        .await
        .expect("failed to run migrations");

    let supervision_repo = Arc::new(SqliteSupervisionRepository::new(pool.clone()));
    let statistics_repo = Arc::new(SqliteStatisticsRepository::new(pool.clone()));
    let failure_repo = Arc::new(SqliteFailureRepository::new(pool.clone()));
    let comment_repo = Arc::new(SqliteCommentRepository::new(pool));
    let clock = Arc::new(FixedClock::new(t0()));

    let supervisions = SupervisionService::new(
        supervision_repo.clone(),
        statistics_repo.clone(),
        failure_repo.clone(),
        clock.clone(),
    );
    let activities = ActivityService::new(
        supervision_repo.clone(),
        statistics_repo.clone(),
        failure_repo.clone(),
        clock.clone(),
    );
    let failures = FailureService::new(
        supervision_repo.clone(),
        statistics_repo.clone(),
        failure_repo.clone(),
        clock.clone(),
    );
    let comments = CommentService::new(statistics_repo.clone(), comment_repo.clone(), clock.clone());

    TestContext {
        supervision_repo,
        statistics_repo,
        failure_repo,
        comment_repo,
        clock,
        supervisions,
        activities,
        failures,
        comments,
    }
}

impl TestContext {
    /// Creates a fresh supervision for a new supervisor.
    pub async fn new_supervision(&self) -> shiftwatch::Supervision {
        self.supervisions
            .create(Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4())
            .await
            .expect("failed to create supervision")
    }
}
