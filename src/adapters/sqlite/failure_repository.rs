//! SQLite implementation of the FailureRepository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use uuid::Uuid;

use super::{parse_datetime, parse_optional_datetime, parse_uuid};
use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::Failure;
use crate::domain::ports::FailureRepository;

#[derive(Clone)]
pub struct SqliteFailureRepository {
    pool: SqlitePool,
}

impl SqliteFailureRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl FailureRepository for SqliteFailureRepository {
    async fn create(&self, failure: &Failure) -> DomainResult<()> {
        sqlx::query("INSERT INTO failures (id, start_date, end_date) VALUES (?, ?, ?)")
            .bind(failure.id.to_string())
            .bind(failure.start_date.to_rfc3339())
            .bind(failure.end_date.map(|d| d.to_rfc3339()))
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn get(&self, id: Uuid) -> DomainResult<Option<Failure>> {
        let row: Option<FailureRow> =
            sqlx::query_as("SELECT id, start_date, end_date FROM failures WHERE id = ?")
                .bind(id.to_string())
                .fetch_optional(&self.pool)
                .await?;

        row.map(TryInto::try_into).transpose()
    }

    async fn set_end_date(&self, id: Uuid, end_date: DateTime<Utc>) -> DomainResult<()> {
        // Only still-open windows may close; start_date is immutable and
        // end_date transitions exactly once.
        let result =
            sqlx::query("UPDATE failures SET end_date = ? WHERE id = ? AND end_date IS NULL")
                .bind(end_date.to_rfc3339())
                .bind(id.to_string())
                .execute(&self.pool)
                .await?;

        if result.rows_affected() == 0 {
            return Err(DomainError::FailureNotFound(id));
        }
        Ok(())
    }
}

#[derive(sqlx::FromRow)]
struct FailureRow {
    id: String,
    start_date: String,
    end_date: Option<String>,
}

impl TryFrom<FailureRow> for Failure {
    type Error = DomainError;

    fn try_from(row: FailureRow) -> Result<Self, Self::Error> {
        Ok(Failure {
            id: parse_uuid(&row.id)?,
            start_date: parse_datetime(&row.start_date)?,
            end_date: parse_optional_datetime(row.end_date.as_deref())?,
        })
    }
}
