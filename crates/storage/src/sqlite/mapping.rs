use quiz_core::model::{AttemptId, AttemptRecord};
use sqlx::Row;

use crate::repository::StorageError;

pub(crate) fn ser<E: core::fmt::Display>(e: E) -> StorageError {
    StorageError::Serialization(e.to_string())
}

pub(crate) fn u32_from_i64(field: &'static str, v: i64) -> Result<u32, StorageError> {
    u32::try_from(v).map_err(|_| StorageError::Serialization(format!("invalid {field}: {v}")))
}

pub(crate) fn map_attempt_row(row: &sqlx::sqlite::SqliteRow) -> Result<AttemptRecord, StorageError> {
    let id = AttemptId::new(row.try_get::<i64, _>("id").map_err(ser)?);
    let score = u32_from_i64("score", row.try_get::<i64, _>("score").map_err(ser)?)?;
    let total_questions = u32_from_i64(
        "total_questions",
        row.try_get::<i64, _>("total_questions").map_err(ser)?,
    )?;
    let completed_at = row.try_get("completed_at").map_err(ser)?;

    AttemptRecord::from_persisted(id, score, total_questions, completed_at).map_err(ser)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn u32_conversion_rejects_negative_and_overflow() {
        assert_eq!(u32_from_i64("score", 7).unwrap(), 7);
        assert!(matches!(
            u32_from_i64("score", -1),
            Err(StorageError::Serialization(msg)) if msg == "invalid score: -1"
        ));
        assert!(u32_from_i64("score", i64::from(u32::MAX) + 1).is_err());
    }
}
