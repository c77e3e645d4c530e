//! SQLite implementation of the SupervisionRepository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use uuid::Uuid;

use super::{parse_datetime, parse_optional_datetime, parse_optional_uuid, parse_uuid};
use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::Supervision;
use crate::domain::ports::{SupervisionFilter, SupervisionRepository};

const COLUMNS: &str = "id, worker_id, organization_id, supervisor_id, start_date, end_date, \
     validity, verified, verification_date, created_by, updated_by, created_at, updated_at";

#[derive(Clone)]
pub struct SqliteSupervisionRepository {
    pool: SqlitePool,
}

impl SqliteSupervisionRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SupervisionRepository for SqliteSupervisionRepository {
    async fn create(&self, supervision: &Supervision) -> DomainResult<()> {
        sqlx::query(
            "INSERT INTO supervisions (id, worker_id, organization_id, supervisor_id, start_date, \
             end_date, validity, verified, verification_date, created_by, updated_by, created_at, updated_at) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(supervision.id.to_string())
        .bind(supervision.worker_id.to_string())
        .bind(supervision.organization_id.to_string())
        .bind(supervision.supervisor_id.to_string())
        .bind(supervision.start_date.to_rfc3339())
        .bind(supervision.end_date.map(|d| d.to_rfc3339()))
        .bind(supervision.validity)
        .bind(supervision.verified)
        .bind(supervision.verification_date.map(|d| d.to_rfc3339()))
        .bind(supervision.created_by.map(|id| id.to_string()))
        .bind(supervision.updated_by.map(|id| id.to_string()))
        .bind(supervision.created_at.to_rfc3339())
        .bind(supervision.updated_at.to_rfc3339())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn get(&self, id: Uuid) -> DomainResult<Option<Supervision>> {
        let row: Option<SupervisionRow> =
            sqlx::query_as(&format!("SELECT {COLUMNS} FROM supervisions WHERE id = ?"))
                .bind(id.to_string())
                .fetch_optional(&self.pool)
                .await?;

        row.map(TryInto::try_into).transpose()
    }

    async fn find_open_for_supervisor(
        &self,
        supervisor_id: Uuid,
    ) -> DomainResult<Option<Supervision>> {
        let row: Option<SupervisionRow> = sqlx::query_as(&format!(
            "SELECT {COLUMNS} FROM supervisions \
             WHERE supervisor_id = ? AND end_date IS NULL \
             ORDER BY start_date DESC LIMIT 1"
        ))
        .bind(supervisor_id.to_string())
        .fetch_optional(&self.pool)
        .await?;

        row.map(TryInto::try_into).transpose()
    }

    async fn set_end_date(&self, id: Uuid, end_date: DateTime<Utc>) -> DomainResult<()> {
        let result = sqlx::query(
            "UPDATE supervisions SET end_date = ?, updated_at = ? WHERE id = ?",
        )
        .bind(end_date.to_rfc3339())
        .bind(end_date.to_rfc3339())
        .bind(id.to_string())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DomainError::SupervisionNotFound(id));
        }
        Ok(())
    }

    async fn set_validity(&self, id: Uuid, validity: bool, at: DateTime<Utc>) -> DomainResult<()> {
        let result = sqlx::query(
            "UPDATE supervisions SET validity = ?, updated_at = ? WHERE id = ?",
        )
        .bind(validity)
        .bind(at.to_rfc3339())
        .bind(id.to_string())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DomainError::SupervisionNotFound(id));
        }
        Ok(())
    }

    async fn set_verification(
        &self,
        id: Uuid,
        verified: bool,
        verification_date: Option<DateTime<Utc>>,
    ) -> DomainResult<()> {
        let result = sqlx::query(
            "UPDATE supervisions SET verified = ?, verification_date = ? WHERE id = ?",
        )
        .bind(verified)
        .bind(verification_date.map(|d| d.to_rfc3339()))
        .bind(id.to_string())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DomainError::SupervisionNotFound(id));
        }
        Ok(())
    }

    async fn list(&self, filter: SupervisionFilter) -> DomainResult<Vec<Supervision>> {
        // SQL narrows by actor columns; the date-overlap semantics live in
        // SupervisionFilter::matches so the memory adapter and this one
        // cannot drift apart.
        let mut query =
            format!("SELECT {COLUMNS} FROM supervisions WHERE 1=1");
        let mut bindings: Vec<String> = Vec::new();

        if let Some(supervisor_id) = filter.supervisor_id {
            query.push_str(" AND supervisor_id = ?");
            bindings.push(supervisor_id.to_string());
        }
        if let Some(worker_id) = filter.worker_id {
            query.push_str(" AND worker_id = ?");
            bindings.push(worker_id.to_string());
        }
        query.push_str(" ORDER BY start_date");

        let mut q = sqlx::query_as::<_, SupervisionRow>(&query);
        for binding in &bindings {
            q = q.bind(binding);
        }

        let rows: Vec<SupervisionRow> = q.fetch_all(&self.pool).await?;
        let supervisions: Vec<Supervision> = rows
            .into_iter()
            .map(TryInto::try_into)
            .collect::<Result<_, _>>()?;

        Ok(supervisions
            .into_iter()
            .filter(|s| filter.matches(s))
            .collect())
    }

    async fn delete_unverified(&self) -> DomainResult<u64> {
        let result = sqlx::query("DELETE FROM supervisions WHERE verified = 0")
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }
}

#[derive(sqlx::FromRow)]
struct SupervisionRow {
    id: String,
    worker_id: String,
    organization_id: String,
    supervisor_id: String,
    start_date: String,
    end_date: Option<String>,
    validity: bool,
    verified: bool,
    verification_date: Option<String>,
    created_by: Option<String>,
    updated_by: Option<String>,
    created_at: String,
    updated_at: String,
}

impl TryFrom<SupervisionRow> for Supervision {
    type Error = DomainError;

    fn try_from(row: SupervisionRow) -> Result<Self, Self::Error> {
        Ok(Supervision {
            id: parse_uuid(&row.id)?,
            worker_id: parse_uuid(&row.worker_id)?,
            organization_id: parse_uuid(&row.organization_id)?,
            supervisor_id: parse_uuid(&row.supervisor_id)?,
            start_date: parse_datetime(&row.start_date)?,
            end_date: parse_optional_datetime(row.end_date.as_deref())?,
            validity: row.validity,
            verified: row.verified,
            verification_date: parse_optional_datetime(row.verification_date.as_deref())?,
            created_by: parse_optional_uuid(row.created_by.as_deref())?,
            updated_by: parse_optional_uuid(row.updated_by.as_deref())?,
            created_at: parse_datetime(&row.created_at)?,
            updated_at: parse_datetime(&row.updated_at)?,
        })
    }
}
