use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;

use quiz_core::model::{AttemptId, AttemptRecord, CompletedAttempt, NewAttempt, sort_newest_first};
use storage::repository::{AttemptRepository, InMemoryRepository};

use crate::error::HistoryError;

/// Presentation-agnostic list item for a stored attempt.
///
/// No pre-formatted strings; the shell formats timestamps however it likes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AttemptListItem {
    pub id: AttemptId,
    pub score: u32,
    pub total_questions: u32,
    pub completed_at: DateTime<Utc>,
}

impl AttemptListItem {
    #[must_use]
    pub fn from_record(record: &AttemptRecord) -> Self {
        Self {
            id: record.id(),
            score: record.score(),
            total_questions: record.total_questions(),
            completed_at: record.timestamp(),
        }
    }
}

/// Facade over the attempt store used by the quiz runner and shells.
#[derive(Clone)]
pub struct HistoryService {
    attempts: Arc<dyn AttemptRepository>,
}

impl HistoryService {
    #[must_use]
    pub fn new(attempts: Arc<dyn AttemptRepository>) -> Self {
        Self { attempts }
    }

    #[must_use]
    pub fn in_memory() -> Self {
        Self::new(Arc::new(InMemoryRepository::new()))
    }

    /// Persist a finished attempt.
    ///
    /// # Errors
    ///
    /// Returns `HistoryError::Attempt` for inconsistent counts and
    /// `HistoryError::Storage` when the store rejects the write.
    pub async fn record(&self, completed: &CompletedAttempt) -> Result<AttemptRecord, HistoryError> {
        let attempt = NewAttempt::from_completed(completed)?;
        Ok(self.attempts.append_attempt(&attempt).await?)
    }

    /// All stored attempts, newest first.
    ///
    /// # Errors
    ///
    /// Returns `HistoryError::Storage` on repository failures.
    pub async fn list_sorted(&self) -> Result<Vec<AttemptListItem>, HistoryError> {
        let mut records = self.attempts.list_attempts().await?;
        sort_newest_first(&mut records);
        Ok(records.iter().map(AttemptListItem::from_record).collect())
    }
}
