//! SQLite adapters implementing the domain ports.

pub mod comment_repository;
pub mod connection;
pub mod failure_repository;
pub mod migrations;
pub mod statistics_repository;
pub mod supervision_repository;

pub use comment_repository::SqliteCommentRepository;
pub use connection::{create_pool, create_test_pool, verify_connection, ConnectionError, PoolConfig};
pub use failure_repository::SqliteFailureRepository;
pub use migrations::{all_embedded_migrations, initial_schema_migration, Migration, MigrationError, Migrator};
pub use statistics_repository::SqliteStatisticsRepository;
pub use supervision_repository::SqliteSupervisionRepository;

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::DatabaseConfig;

/// Opens the configured database and brings its schema up to date.
pub async fn init_database(config: &DatabaseConfig) -> DomainResult<SqlitePool> {
    let url = format!("sqlite:{}", config.path);
    let pool = create_pool(
        &url,
        Some(PoolConfig {
            max_connections: config.max_connections,
            ..PoolConfig::default()
        }),
    )
    .await
    .map_err(|e| DomainError::Database(e.to_string()))?;

    Migrator::new(pool.clone())
        .run_embedded_migrations(all_embedded_migrations())
        .await
        .map_err(|e| DomainError::Database(e.to_string()))?;

    Ok(pool)
}

pub(crate) fn parse_uuid(value: &str) -> Result<Uuid, DomainError> {
    Uuid::parse_str(value).map_err(|e| DomainError::Serialization(e.to_string()))
}

pub(crate) fn parse_optional_uuid(value: Option<&str>) -> Result<Option<Uuid>, DomainError> {
    value.map(parse_uuid).transpose()
}

pub(crate) fn parse_datetime(value: &str) -> Result<DateTime<Utc>, DomainError> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| DomainError::Serialization(e.to_string()))
}

pub(crate) fn parse_optional_datetime(
    value: Option<&str>,
) -> Result<Option<DateTime<Utc>>, DomainError> {
    value.map(parse_datetime).transpose()
}
