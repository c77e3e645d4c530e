//! Shared command context: configuration, database, services.

use std::sync::Arc;

use anyhow::{Context as _, Result};

use crate::adapters::sqlite::{
    init_database, SqliteCommentRepository, SqliteFailureRepository, SqliteStatisticsRepository,
    SqliteSupervisionRepository,
};
use crate::domain::models::Config;
use crate::domain::ports::SystemClock;
use crate::infrastructure::config::ConfigLoader;
use crate::services::{ActivityService, CommentService, FailureService, SupervisionService};

/// Services wired to the configured SQLite store and the system clock.
pub struct ServiceContext {
    pub supervisions: SupervisionService,
    pub activities: ActivityService,
    pub failures: FailureService,
    pub comments: CommentService,
}

impl ServiceContext {
    /// Loads configuration, opens the database, and wires the services.
    pub async fn init() -> Result<Self> {
        let config = ConfigLoader::load().context("failed to load configuration")?;
        Self::with_config(&config).await
    }

    pub async fn with_config(config: &Config) -> Result<Self> {
        let pool = init_database(&config.database)
            .await
            .context("failed to open database")?;

        let supervisions = Arc::new(SqliteSupervisionRepository::new(pool.clone()));
        let statistics = Arc::new(SqliteStatisticsRepository::new(pool.clone()));
        let failures = Arc::new(SqliteFailureRepository::new(pool.clone()));
        let comments = Arc::new(SqliteCommentRepository::new(pool));
        let clock = Arc::new(SystemClock);

        Ok(Self {
            supervisions: SupervisionService::new(
                supervisions.clone(),
                statistics.clone(),
                failures.clone(),
                clock.clone(),
            ),
            activities: ActivityService::new(
                supervisions.clone(),
                statistics.clone(),
                failures.clone(),
                clock.clone(),
            ),
            failures: FailureService::new(supervisions, statistics.clone(), failures, clock.clone()),
            comments: CommentService::new(statistics, comments, clock),
        })
    }
}
