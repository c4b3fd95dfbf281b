use async_trait::async_trait;
use quiz_core::model::{AttemptId, AttemptRecord, NewAttempt};
use std::sync::{Arc, Mutex};
use thiserror::Error;

/// Errors surfaced by storage adapters.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("connection error: {0}")]
    Connection(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Append-only store of completed quiz attempts.
#[async_trait]
pub trait AttemptRepository: Send + Sync {
    /// Persist a new attempt and return it with its assigned id.
    ///
    /// Ids are unique and strictly increasing. Existing records are never
    /// overwritten or reordered.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the attempt cannot be stored.
    async fn append_attempt(&self, attempt: &NewAttempt) -> Result<AttemptRecord, StorageError>;

    /// Return every stored attempt. Order is unspecified.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the store cannot be read or a row is corrupt.
    async fn list_attempts(&self) -> Result<Vec<AttemptRecord>, StorageError>;
}

#[derive(Default)]
struct InMemoryState {
    last_id: i64,
    attempts: Vec<AttemptRecord>,
}

/// Simple in-memory repository implementation for testing and prototyping.
#[derive(Clone, Default)]
pub struct InMemoryRepository {
    state: Arc<Mutex<InMemoryState>>,
}

impl InMemoryRepository {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl AttemptRepository for InMemoryRepository {
    async fn append_attempt(&self, attempt: &NewAttempt) -> Result<AttemptRecord, StorageError> {
        let mut guard = self
            .state
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        guard.last_id += 1;
        let record = attempt.assign_id(AttemptId::new(guard.last_id));
        guard.attempts.push(record);
        Ok(record)
    }

    async fn list_attempts(&self) -> Result<Vec<AttemptRecord>, StorageError> {
        let guard = self
            .state
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        Ok(guard.attempts.clone())
    }
}

/// Aggregates repositories behind trait objects for easy backend swapping.
#[derive(Clone)]
pub struct Storage {
    pub attempts: Arc<dyn AttemptRepository>,
}

impl Storage {
    #[must_use]
    pub fn in_memory() -> Self {
        let attempts: Arc<dyn AttemptRepository> = Arc::new(InMemoryRepository::new());
        Self { attempts }
    }
}
