//! In-memory repository implementations.
//!
//! Back the service unit tests and any embedding of the lifecycle engine
//! that does not need durable storage. Same contracts as the SQLite
//! adapters, state held in mutex-guarded maps.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};
use uuid::Uuid;

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::{ActivityStatistics, Comment, CommentFile, Failure, Supervision};
use crate::domain::ports::{
    ActivityClose, ActivityStatisticsRepository, CommentRepository, FailureRepository,
    SupervisionFilter, SupervisionRepository,
};

fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

#[derive(Debug, Default)]
pub struct InMemorySupervisionRepository {
    rows: Mutex<HashMap<Uuid, Supervision>>,
}

impl InMemorySupervisionRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SupervisionRepository for InMemorySupervisionRepository {
    async fn create(&self, supervision: &Supervision) -> DomainResult<()> {
        lock(&self.rows).insert(supervision.id, supervision.clone());
        Ok(())
    }

    async fn get(&self, id: Uuid) -> DomainResult<Option<Supervision>> {
        Ok(lock(&self.rows).get(&id).cloned())
    }

    async fn find_open_for_supervisor(
        &self,
        supervisor_id: Uuid,
    ) -> DomainResult<Option<Supervision>> {
        Ok(lock(&self.rows)
            .values()
            .find(|s| s.supervisor_id == supervisor_id && s.end_date.is_none())
            .cloned())
    }

    async fn set_end_date(&self, id: Uuid, end_date: DateTime<Utc>) -> DomainResult<()> {
        let mut rows = lock(&self.rows);
        let supervision = rows
            .get_mut(&id)
            .ok_or(DomainError::SupervisionNotFound(id))?;
        supervision.end_date = Some(end_date);
        supervision.updated_at = end_date;
        Ok(())
    }

    async fn set_validity(&self, id: Uuid, validity: bool, at: DateTime<Utc>) -> DomainResult<()> {
        let mut rows = lock(&self.rows);
        let supervision = rows
            .get_mut(&id)
            .ok_or(DomainError::SupervisionNotFound(id))?;
        supervision.validity = validity;
        supervision.updated_at = at;
        Ok(())
    }

    async fn set_verification(
        &self,
        id: Uuid,
        verified: bool,
        verification_date: Option<DateTime<Utc>>,
    ) -> DomainResult<()> {
        let mut rows = lock(&self.rows);
        let supervision = rows
            .get_mut(&id)
            .ok_or(DomainError::SupervisionNotFound(id))?;
        supervision.verified = verified;
        supervision.verification_date = verification_date;
        Ok(())
    }

    async fn list(&self, filter: SupervisionFilter) -> DomainResult<Vec<Supervision>> {
        let mut results: Vec<Supervision> = lock(&self.rows)
            .values()
            .filter(|s| filter.matches(s))
            .cloned()
            .collect();
        results.sort_by_key(|s| s.start_date);
        Ok(results)
    }

    async fn delete_unverified(&self) -> DomainResult<u64> {
        let mut rows = lock(&self.rows);
        let before = rows.len();
        rows.retain(|_, s| s.verified);
        Ok((before - rows.len()) as u64)
    }
}

#[derive(Debug, Default)]
pub struct InMemoryStatisticsRepository {
    rows: Mutex<HashMap<Uuid, ActivityStatistics>>,
}

impl InMemoryStatisticsRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ActivityStatisticsRepository for InMemoryStatisticsRepository {
    async fn get(&self, id: Uuid) -> DomainResult<Option<ActivityStatistics>> {
        Ok(lock(&self.rows).get(&id).cloned())
    }

    async fn find_open(&self, supervision_id: Uuid) -> DomainResult<Option<ActivityStatistics>> {
        Ok(lock(&self.rows)
            .values()
            .find(|r| r.supervision_id == supervision_id && r.end_date.is_none())
            .cloned())
    }

    async fn find_open_for_activity(
        &self,
        supervision_id: Uuid,
        activity_id: Uuid,
    ) -> DomainResult<Option<ActivityStatistics>> {
        Ok(lock(&self.rows)
            .values()
            .find(|r| {
                r.supervision_id == supervision_id
                    && r.activity_id == activity_id
                    && r.end_date.is_none()
            })
            .cloned())
    }

    async fn last_with_failure_before(
        &self,
        supervision_id: Uuid,
        sequence: i64,
    ) -> DomainResult<Option<ActivityStatistics>> {
        Ok(lock(&self.rows)
            .values()
            .filter(|r| {
                r.supervision_id == supervision_id
                    && r.sequence < sequence
                    && r.failure_id.is_some()
            })
            .max_by_key(|r| r.sequence)
            .cloned())
    }

    async fn start_transition(
        &self,
        previous: Option<ActivityClose>,
        mut record: ActivityStatistics,
    ) -> DomainResult<ActivityStatistics> {
        let mut rows = lock(&self.rows);

        if let Some(close) = previous {
            let prev = rows
                .get_mut(&close.id)
                .ok_or(DomainError::StatisticsNotFound(close.id))?;
            prev.end_date = Some(close.end_date);
            prev.updated_at = close.end_date;
        }

        let next_sequence = rows
            .values()
            .filter(|r| r.supervision_id == record.supervision_id)
            .map(|r| r.sequence)
            .max()
            .unwrap_or(0)
            + 1;
        record.sequence = next_sequence;
        rows.insert(record.id, record.clone());
        Ok(record)
    }

    async fn set_end_date(&self, id: Uuid, end_date: DateTime<Utc>) -> DomainResult<()> {
        let mut rows = lock(&self.rows);
        let record = rows.get_mut(&id).ok_or(DomainError::StatisticsNotFound(id))?;
        record.end_date = Some(end_date);
        record.updated_at = end_date;
        Ok(())
    }

    async fn set_failure(&self, id: Uuid, failure_id: Uuid, at: DateTime<Utc>) -> DomainResult<()> {
        let mut rows = lock(&self.rows);
        let record = rows.get_mut(&id).ok_or(DomainError::StatisticsNotFound(id))?;
        record.failure_id = Some(failure_id);
        record.updated_at = at;
        Ok(())
    }

    async fn assign_failure_range(
        &self,
        supervision_id: Uuid,
        after_sequence: i64,
        before_sequence: i64,
        failure_id: Uuid,
    ) -> DomainResult<u64> {
        let mut rows = lock(&self.rows);
        let mut stamped = 0;
        for record in rows.values_mut() {
            if record.supervision_id == supervision_id
                && record.sequence > after_sequence
                && record.sequence < before_sequence
            {
                record.failure_id = Some(failure_id);
                stamped += 1;
            }
        }
        Ok(stamped)
    }

    async fn set_verification(
        &self,
        id: Uuid,
        verified: bool,
        verification_date: Option<DateTime<Utc>>,
    ) -> DomainResult<()> {
        let mut rows = lock(&self.rows);
        let record = rows.get_mut(&id).ok_or(DomainError::StatisticsNotFound(id))?;
        record.verified = verified;
        record.verification_date = verification_date;
        Ok(())
    }

    async fn list_for_supervision(
        &self,
        supervision_id: Uuid,
    ) -> DomainResult<Vec<ActivityStatistics>> {
        let mut results: Vec<ActivityStatistics> = lock(&self.rows)
            .values()
            .filter(|r| r.supervision_id == supervision_id)
            .cloned()
            .collect();
        results.sort_by_key(|r| r.sequence);
        Ok(results)
    }
}

#[derive(Debug, Default)]
pub struct InMemoryFailureRepository {
    rows: Mutex<HashMap<Uuid, Failure>>,
}

impl InMemoryFailureRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl FailureRepository for InMemoryFailureRepository {
    async fn create(&self, failure: &Failure) -> DomainResult<()> {
        lock(&self.rows).insert(failure.id, failure.clone());
        Ok(())
    }

    async fn get(&self, id: Uuid) -> DomainResult<Option<Failure>> {
        Ok(lock(&self.rows).get(&id).cloned())
    }

    async fn set_end_date(&self, id: Uuid, end_date: DateTime<Utc>) -> DomainResult<()> {
        let mut rows = lock(&self.rows);
        match rows.get_mut(&id) {
            Some(failure) if failure.end_date.is_none() => {
                failure.end_date = Some(end_date);
                Ok(())
            }
            _ => Err(DomainError::FailureNotFound(id)),
        }
    }
}

#[derive(Debug, Default)]
pub struct InMemoryCommentRepository {
    comments: Mutex<HashMap<Uuid, Comment>>,
    files: Mutex<HashMap<Uuid, CommentFile>>,
}

impl InMemoryCommentRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CommentRepository for InMemoryCommentRepository {
    async fn create(&self, comment: &Comment, files: &[CommentFile]) -> DomainResult<()> {
        lock(&self.comments).insert(comment.id, comment.clone());
        let mut stored = lock(&self.files);
        for file in files {
            stored.insert(file.id, file.clone());
        }
        Ok(())
    }

    async fn get(&self, id: Uuid) -> DomainResult<Option<Comment>> {
        Ok(lock(&self.comments).get(&id).cloned())
    }

    async fn list_for_statistics(
        &self,
        activity_statistics_id: Uuid,
    ) -> DomainResult<Vec<Comment>> {
        let mut results: Vec<Comment> = lock(&self.comments)
            .values()
            .filter(|c| c.activity_statistics_id == activity_statistics_id)
            .cloned()
            .collect();
        results.sort_by_key(|c| c.created_at);
        Ok(results)
    }

    async fn files_for_comment(&self, comment_id: Uuid) -> DomainResult<Vec<CommentFile>> {
        Ok(lock(&self.files)
            .values()
            .filter(|f| f.comment_id == comment_id)
            .cloned()
            .collect())
    }
}
