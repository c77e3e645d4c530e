/// Failure repository port.
use crate::domain::errors::DomainResult;
use crate::domain::models::Failure;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

#[async_trait]
pub trait FailureRepository: Send + Sync {
    async fn create(&self, failure: &Failure) -> DomainResult<()>;

    async fn get(&self, id: Uuid) -> DomainResult<Option<Failure>>;

    /// Closes the window. Only still-open rows are updated; closing a row
    /// that is already closed reports `FailureNotFound`.
    async fn set_end_date(&self, id: Uuid, end_date: DateTime<Utc>) -> DomainResult<()>;
}
