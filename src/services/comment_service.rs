/// Comment service. Plain CRUD over annotations, outside the lifecycle
/// state machine.
use std::sync::Arc;

use tracing::instrument;
use uuid::Uuid;

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::{Comment, CommentFile};
use crate::domain::ports::{ActivityStatisticsRepository, Clock, CommentRepository};

pub struct CommentService {
    statistics: Arc<dyn ActivityStatisticsRepository>,
    comments: Arc<dyn CommentRepository>,
    clock: Arc<dyn Clock>,
}

impl CommentService {
    pub fn new(
        statistics: Arc<dyn ActivityStatisticsRepository>,
        comments: Arc<dyn CommentRepository>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            statistics,
            comments,
            clock,
        }
    }

    /// Attaches a comment to an activity record.
    ///
    /// # Errors
    /// `EmptyComment` when neither text nor files are given;
    /// `StatisticsNotFound` when the record does not exist.
    #[instrument(skip(self, text, files), err)]
    pub async fn create(
        &self,
        activity_statistics_id: Uuid,
        actor: Uuid,
        text: Option<String>,
        coordinates: Option<(f64, f64)>,
        files: Vec<String>,
    ) -> DomainResult<Comment> {
        if text.is_none() && files.is_empty() {
            return Err(DomainError::EmptyComment);
        }

        self.statistics
            .get(activity_statistics_id)
            .await?
            .ok_or(DomainError::StatisticsNotFound(activity_statistics_id))?;

        let mut comment = Comment::new(activity_statistics_id, actor, self.clock.now());
        if let Some(text) = text {
            comment = comment.with_text(text);
        }
        if let Some((latitude, longitude)) = coordinates {
            comment = comment.with_coordinates(latitude, longitude);
        }

        let attachments: Vec<CommentFile> = files
            .into_iter()
            .map(|path| CommentFile {
                id: Uuid::new_v4(),
                comment_id: comment.id,
                path,
            })
            .collect();

        self.comments.create(&comment, &attachments).await?;
        Ok(comment)
    }

    #[instrument(skip(self), err)]
    pub async fn list_for_statistics(
        &self,
        activity_statistics_id: Uuid,
    ) -> DomainResult<Vec<Comment>> {
        self.comments
            .list_for_statistics(activity_statistics_id)
            .await
    }
}
