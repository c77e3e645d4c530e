//! SQLite implementation of the CommentRepository.

use async_trait::async_trait;
use sqlx::SqlitePool;
use uuid::Uuid;

use super::{parse_datetime, parse_optional_uuid, parse_uuid};
use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::{Comment, CommentFile};
use crate::domain::ports::CommentRepository;

const COLUMNS: &str = "id, activity_statistics_id, text, latitude, longitude, \
     created_by, updated_by, created_at, updated_at";

#[derive(Clone)]
pub struct SqliteCommentRepository {
    pool: SqlitePool,
}

impl SqliteCommentRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CommentRepository for SqliteCommentRepository {
    async fn create(&self, comment: &Comment, files: &[CommentFile]) -> DomainResult<()> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            "INSERT INTO comments (id, activity_statistics_id, text, latitude, longitude, \
             created_by, updated_by, created_at, updated_at) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(comment.id.to_string())
        .bind(comment.activity_statistics_id.to_string())
        .bind(&comment.text)
        .bind(comment.latitude)
        .bind(comment.longitude)
        .bind(comment.created_by.map(|id| id.to_string()))
        .bind(comment.updated_by.map(|id| id.to_string()))
        .bind(comment.created_at.to_rfc3339())
        .bind(comment.updated_at.to_rfc3339())
        .execute(&mut *tx)
        .await?;

        for file in files {
            sqlx::query("INSERT INTO comment_files (id, comment_id, path) VALUES (?, ?, ?)")
                .bind(file.id.to_string())
                .bind(file.comment_id.to_string())
                .bind(&file.path)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;
        Ok(())
    }

    async fn get(&self, id: Uuid) -> DomainResult<Option<Comment>> {
        let row: Option<CommentRow> =
            sqlx::query_as(&format!("SELECT {COLUMNS} FROM comments WHERE id = ?"))
                .bind(id.to_string())
                .fetch_optional(&self.pool)
                .await?;

        row.map(TryInto::try_into).transpose()
    }

    async fn list_for_statistics(
        &self,
        activity_statistics_id: Uuid,
    ) -> DomainResult<Vec<Comment>> {
        let rows: Vec<CommentRow> = sqlx::query_as(&format!(
            "SELECT {COLUMNS} FROM comments \
             WHERE activity_statistics_id = ? ORDER BY created_at"
        ))
        .bind(activity_statistics_id.to_string())
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(TryInto::try_into).collect()
    }

    async fn files_for_comment(&self, comment_id: Uuid) -> DomainResult<Vec<CommentFile>> {
        let rows: Vec<(String, String, String)> =
            sqlx::query_as("SELECT id, comment_id, path FROM comment_files WHERE comment_id = ?")
                .bind(comment_id.to_string())
                .fetch_all(&self.pool)
                .await?;

        rows.into_iter()
            .map(|(id, comment_id, path)| {
                Ok(CommentFile {
                    id: parse_uuid(&id)?,
                    comment_id: parse_uuid(&comment_id)?,
                    path,
                })
            })
            .collect()
    }
}

#[derive(sqlx::FromRow)]
struct CommentRow {
    id: String,
    activity_statistics_id: String,
    text: Option<String>,
    latitude: Option<f64>,
    longitude: Option<f64>,
    created_by: Option<String>,
    updated_by: Option<String>,
    created_at: String,
    updated_at: String,
}

impl TryFrom<CommentRow> for Comment {
    type Error = DomainError;

    fn try_from(row: CommentRow) -> Result<Self, Self::Error> {
        Ok(Comment {
            id: parse_uuid(&row.id)?,
            activity_statistics_id: parse_uuid(&row.activity_statistics_id)?,
            text: row.text,
            latitude: row.latitude,
            longitude: row.longitude,
            created_by: parse_optional_uuid(row.created_by.as_deref())?,
            updated_by: parse_optional_uuid(row.updated_by.as_deref())?,
            created_at: parse_datetime(&row.created_at)?,
            updated_at: parse_datetime(&row.updated_at)?,
        })
    }
}
