use quiz_core::model::{AttemptId, AttemptRecord, NewAttempt};

use super::{SqliteRepository, mapping::map_attempt_row};
use crate::repository::{AttemptRepository, StorageError};

#[async_trait::async_trait]
impl AttemptRepository for SqliteRepository {
    async fn append_attempt(&self, attempt: &NewAttempt) -> Result<AttemptRecord, StorageError> {
        let res = sqlx::query(
            r"
                INSERT INTO quiz_attempts (score, total_questions, completed_at)
                VALUES (?1, ?2, ?3)
            ",
        )
        .bind(i64::from(attempt.score()))
        .bind(i64::from(attempt.total_questions()))
        .bind(attempt.timestamp())
        .execute(&self.pool)
        .await
        .map_err(|e| StorageError::Connection(e.to_string()))?;

        Ok(attempt.assign_id(AttemptId::new(res.last_insert_rowid())))
    }

    async fn list_attempts(&self) -> Result<Vec<AttemptRecord>, StorageError> {
        let rows = sqlx::query(
            r"
                SELECT id, score, total_questions, completed_at
                FROM quiz_attempts
            ",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| StorageError::Connection(e.to_string()))?;

        let mut out = Vec::with_capacity(rows.len());
        for row in rows {
            out.push(map_attempt_row(&row)?);
        }
        Ok(out)
    }
}
