/// Comment repository port.
use crate::domain::errors::DomainResult;
use crate::domain::models::{Comment, CommentFile};
use async_trait::async_trait;
use uuid::Uuid;

#[async_trait]
pub trait CommentRepository: Send + Sync {
    /// Inserts the comment and its attachments in one transaction.
    async fn create(&self, comment: &Comment, files: &[CommentFile]) -> DomainResult<()>;

    async fn get(&self, id: Uuid) -> DomainResult<Option<Comment>>;

    async fn list_for_statistics(
        &self,
        activity_statistics_id: Uuid,
    ) -> DomainResult<Vec<Comment>>;

    async fn files_for_comment(&self, comment_id: Uuid) -> DomainResult<Vec<CommentFile>>;
}
