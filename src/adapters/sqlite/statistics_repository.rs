//! SQLite implementation of the ActivityStatisticsRepository.
//!
//! The activity transition runs in one transaction: the previous record is
//! closed, the next sequence number read, and the new record inserted, so a
//! concurrent request can never observe two open records. The partial
//! unique index on open records is the last line of defense.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use uuid::Uuid;

use super::{parse_datetime, parse_optional_datetime, parse_optional_uuid, parse_uuid};
use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::ActivityStatistics;
use crate::domain::ports::{ActivityClose, ActivityStatisticsRepository};

const COLUMNS: &str = "id, supervision_id, activity_id, sequence, start_date, end_date, \
     failure_id, verified, verification_date, created_by, updated_by, created_at, updated_at";

#[derive(Clone)]
pub struct SqliteStatisticsRepository {
    pool: SqlitePool,
}

impl SqliteStatisticsRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ActivityStatisticsRepository for SqliteStatisticsRepository {
    async fn get(&self, id: Uuid) -> DomainResult<Option<ActivityStatistics>> {
        let row: Option<StatisticsRow> = sqlx::query_as(&format!(
            "SELECT {COLUMNS} FROM activity_statistics WHERE id = ?"
        ))
        .bind(id.to_string())
        .fetch_optional(&self.pool)
        .await?;

        row.map(TryInto::try_into).transpose()
    }

    async fn find_open(&self, supervision_id: Uuid) -> DomainResult<Option<ActivityStatistics>> {
        let row: Option<StatisticsRow> = sqlx::query_as(&format!(
            "SELECT {COLUMNS} FROM activity_statistics \
             WHERE supervision_id = ? AND end_date IS NULL \
             ORDER BY sequence DESC LIMIT 1"
        ))
        .bind(supervision_id.to_string())
        .fetch_optional(&self.pool)
        .await?;

        row.map(TryInto::try_into).transpose()
    }

    async fn find_open_for_activity(
        &self,
        supervision_id: Uuid,
        activity_id: Uuid,
    ) -> DomainResult<Option<ActivityStatistics>> {
        let row: Option<StatisticsRow> = sqlx::query_as(&format!(
            "SELECT {COLUMNS} FROM activity_statistics \
             WHERE supervision_id = ? AND activity_id = ? AND end_date IS NULL \
             ORDER BY sequence DESC LIMIT 1"
        ))
        .bind(supervision_id.to_string())
        .bind(activity_id.to_string())
        .fetch_optional(&self.pool)
        .await?;

        row.map(TryInto::try_into).transpose()
    }

    async fn last_with_failure_before(
        &self,
        supervision_id: Uuid,
        sequence: i64,
    ) -> DomainResult<Option<ActivityStatistics>> {
        let row: Option<StatisticsRow> = sqlx::query_as(&format!(
            "SELECT {COLUMNS} FROM activity_statistics \
             WHERE supervision_id = ? AND sequence < ? AND failure_id IS NOT NULL \
             ORDER BY sequence DESC LIMIT 1"
        ))
        .bind(supervision_id.to_string())
        .bind(sequence)
        .fetch_optional(&self.pool)
        .await?;

        row.map(TryInto::try_into).transpose()
    }

    async fn start_transition(
        &self,
        previous: Option<ActivityClose>,
        mut record: ActivityStatistics,
    ) -> DomainResult<ActivityStatistics> {
        let mut tx = self.pool.begin().await?;

        if let Some(close) = previous {
            let result = sqlx::query(
                "UPDATE activity_statistics SET end_date = ?, updated_at = ? WHERE id = ?",
            )
            .bind(close.end_date.to_rfc3339())
            .bind(close.end_date.to_rfc3339())
            .bind(close.id.to_string())
            .execute(&mut *tx)
            .await?;

            if result.rows_affected() == 0 {
                return Err(DomainError::StatisticsNotFound(close.id));
            }
        }

        let (next_sequence,): (i64,) = sqlx::query_as(
            "SELECT COALESCE(MAX(sequence), 0) + 1 FROM activity_statistics WHERE supervision_id = ?",
        )
        .bind(record.supervision_id.to_string())
        .fetch_one(&mut *tx)
        .await?;
        record.sequence = next_sequence;

        sqlx::query(
            "INSERT INTO activity_statistics (id, supervision_id, activity_id, sequence, \
             start_date, end_date, failure_id, verified, verification_date, created_by, \
             updated_by, created_at, updated_at) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(record.id.to_string())
        .bind(record.supervision_id.to_string())
        .bind(record.activity_id.to_string())
        .bind(record.sequence)
        .bind(record.start_date.to_rfc3339())
        .bind(record.end_date.map(|d| d.to_rfc3339()))
        .bind(record.failure_id.map(|id| id.to_string()))
        .bind(record.verified)
        .bind(record.verification_date.map(|d| d.to_rfc3339()))
        .bind(record.created_by.map(|id| id.to_string()))
        .bind(record.updated_by.map(|id| id.to_string()))
        .bind(record.created_at.to_rfc3339())
        .bind(record.updated_at.to_rfc3339())
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(record)
    }

    async fn set_end_date(&self, id: Uuid, end_date: DateTime<Utc>) -> DomainResult<()> {
        let result = sqlx::query(
            "UPDATE activity_statistics SET end_date = ?, updated_at = ? WHERE id = ?",
        )
        .bind(end_date.to_rfc3339())
        .bind(end_date.to_rfc3339())
        .bind(id.to_string())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DomainError::StatisticsNotFound(id));
        }
        Ok(())
    }

    async fn set_failure(&self, id: Uuid, failure_id: Uuid, at: DateTime<Utc>) -> DomainResult<()> {
        let result = sqlx::query(
            "UPDATE activity_statistics SET failure_id = ?, updated_at = ? WHERE id = ?",
        )
        .bind(failure_id.to_string())
        .bind(at.to_rfc3339())
        .bind(id.to_string())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DomainError::StatisticsNotFound(id));
        }
        Ok(())
    }

    async fn assign_failure_range(
        &self,
        supervision_id: Uuid,
        after_sequence: i64,
        before_sequence: i64,
        failure_id: Uuid,
    ) -> DomainResult<u64> {
        let result = sqlx::query(
            "UPDATE activity_statistics SET failure_id = ? \
             WHERE supervision_id = ? AND sequence > ? AND sequence < ?",
        )
        .bind(failure_id.to_string())
        .bind(supervision_id.to_string())
        .bind(after_sequence)
        .bind(before_sequence)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }

    async fn set_verification(
        &self,
        id: Uuid,
        verified: bool,
        verification_date: Option<DateTime<Utc>>,
    ) -> DomainResult<()> {
        let result = sqlx::query(
            "UPDATE activity_statistics SET verified = ?, verification_date = ? WHERE id = ?",
        )
        .bind(verified)
        .bind(verification_date.map(|d| d.to_rfc3339()))
        .bind(id.to_string())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DomainError::StatisticsNotFound(id));
        }
        Ok(())
    }

    async fn list_for_supervision(
        &self,
        supervision_id: Uuid,
    ) -> DomainResult<Vec<ActivityStatistics>> {
        let rows: Vec<StatisticsRow> = sqlx::query_as(&format!(
            "SELECT {COLUMNS} FROM activity_statistics \
             WHERE supervision_id = ? ORDER BY sequence"
        ))
        .bind(supervision_id.to_string())
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(TryInto::try_into).collect()
    }
}

#[derive(sqlx::FromRow)]
struct StatisticsRow {
    id: String,
    supervision_id: String,
    activity_id: String,
    sequence: i64,
    start_date: String,
    end_date: Option<String>,
    failure_id: Option<String>,
    verified: bool,
    verification_date: Option<String>,
    created_by: Option<String>,
    updated_by: Option<String>,
    created_at: String,
    updated_at: String,
}

impl TryFrom<StatisticsRow> for ActivityStatistics {
    type Error = DomainError;

    fn try_from(row: StatisticsRow) -> Result<Self, Self::Error> {
        Ok(ActivityStatistics {
            id: parse_uuid(&row.id)?,
            supervision_id: parse_uuid(&row.supervision_id)?,
            activity_id: parse_uuid(&row.activity_id)?,
            sequence: row.sequence,
            start_date: parse_datetime(&row.start_date)?,
            end_date: parse_optional_datetime(row.end_date.as_deref())?,
            failure_id: parse_optional_uuid(row.failure_id.as_deref())?,
            verified: row.verified,
            verification_date: parse_optional_datetime(row.verification_date.as_deref())?,
            created_by: parse_optional_uuid(row.created_by.as_deref())?,
            updated_by: parse_optional_uuid(row.updated_by.as_deref())?,
            created_at: parse_datetime(&row.created_at)?,
            updated_at: parse_datetime(&row.updated_at)?,
        })
    }
}
