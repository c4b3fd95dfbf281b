use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::AttemptId;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum AttemptError {
    #[error("attempt must cover at least one question")]
    NoQuestions,

    #[error("score {score} exceeds total questions {total}")]
    ScoreExceedsTotal { score: u32, total: u32 },
}

fn check_counts(score: u32, total_questions: u32) -> Result<(), AttemptError> {
    if total_questions == 0 {
        return Err(AttemptError::NoQuestions);
    }
    if score > total_questions {
        return Err(AttemptError::ScoreExceedsTotal {
            score,
            total: total_questions,
        });
    }
    Ok(())
}

/// Outcome of a session at the moment it reaches `Completed`.
///
/// Emitted exactly once per session by the state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompletedAttempt {
    pub score: u32,
    pub total_questions: u32,
    pub started_at: DateTime<Utc>,
    pub completed_at: DateTime<Utc>,
}

/// An attempt ready to be stored; the store assigns the id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewAttempt {
    score: u32,
    total_questions: u32,
    timestamp: DateTime<Utc>,
}

impl NewAttempt {
    /// # Errors
    ///
    /// Returns `AttemptError` if the counts are inconsistent.
    pub fn new(
        score: u32,
        total_questions: u32,
        timestamp: DateTime<Utc>,
    ) -> Result<Self, AttemptError> {
        check_counts(score, total_questions)?;
        Ok(Self {
            score,
            total_questions,
            timestamp,
        })
    }

    /// # Errors
    ///
    /// Returns `AttemptError` if the counts are inconsistent.
    pub fn from_completed(completed: &CompletedAttempt) -> Result<Self, AttemptError> {
        Self::new(
            completed.score,
            completed.total_questions,
            completed.completed_at,
        )
    }

    #[must_use]
    pub fn score(&self) -> u32 {
        self.score
    }

    #[must_use]
    pub fn total_questions(&self) -> u32 {
        self.total_questions
    }

    #[must_use]
    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    #[must_use]
    pub fn assign_id(self, id: AttemptId) -> AttemptRecord {
        AttemptRecord {
            id,
            score: self.score,
            total_questions: self.total_questions,
            timestamp: self.timestamp,
        }
    }
}

/// Immutable, persisted summary of one completed quiz.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttemptRecord {
    id: AttemptId,
    score: u32,
    total_questions: u32,
    timestamp: DateTime<Utc>,
}

impl AttemptRecord {
    /// Rehydrate an attempt from persisted storage.
    ///
    /// # Errors
    ///
    /// Returns `AttemptError` if the stored counts are inconsistent.
    pub fn from_persisted(
        id: AttemptId,
        score: u32,
        total_questions: u32,
        timestamp: DateTime<Utc>,
    ) -> Result<Self, AttemptError> {
        Ok(NewAttempt::new(score, total_questions, timestamp)?.assign_id(id))
    }

    #[must_use]
    pub fn id(&self) -> AttemptId {
        self.id
    }

    #[must_use]
    pub fn score(&self) -> u32 {
        self.score
    }

    #[must_use]
    pub fn total_questions(&self) -> u32 {
        self.total_questions
    }

    #[must_use]
    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    /// Completion instant as an ISO-8601 string with millisecond precision.
    #[must_use]
    pub fn timestamp_iso8601(&self) -> String {
        self.timestamp.to_rfc3339_opts(SecondsFormat::Millis, true)
    }
}

/// Sort attempts newest first. Equal timestamps fall back to the higher id.
pub fn sort_newest_first(records: &mut [AttemptRecord]) {
    records.sort_by(|a, b| {
        b.timestamp
            .cmp(&a.timestamp)
            .then_with(|| b.id.cmp(&a.id))
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::fixed_now;
    use chrono::Duration;

    #[test]
    fn new_attempt_validates_counts() {
        let now = fixed_now();
        assert_eq!(
            NewAttempt::new(3, 0, now).unwrap_err(),
            AttemptError::NoQuestions
        );
        assert_eq!(
            NewAttempt::new(11, 10, now).unwrap_err(),
            AttemptError::ScoreExceedsTotal {
                score: 11,
                total: 10
            }
        );
        assert!(NewAttempt::new(10, 10, now).is_ok());
    }

    #[test]
    fn from_completed_uses_completion_time() {
        let now = fixed_now();
        let completed = CompletedAttempt {
            score: 7,
            total_questions: 10,
            started_at: now - Duration::minutes(3),
            completed_at: now,
        };
        let attempt = NewAttempt::from_completed(&completed).unwrap();
        assert_eq!(attempt.score(), 7);
        assert_eq!(attempt.timestamp(), now);
    }

    #[test]
    fn serializes_in_record_shape() {
        let attempt = NewAttempt::new(4, 10, fixed_now()).unwrap();
        let json = serde_json::to_value(attempt).unwrap();
        assert_eq!(json["score"], 4);
        assert_eq!(json["totalQuestions"], 10);
        assert_eq!(json["timestamp"], "2023-11-14T22:13:20Z");
    }

    #[test]
    fn timestamp_renders_as_iso8601() {
        let record = AttemptRecord::from_persisted(AttemptId::new(1), 5, 10, fixed_now()).unwrap();
        assert_eq!(record.timestamp_iso8601(), "2023-11-14T22:13:20.000Z");
    }

    #[test]
    fn sort_is_newest_first_with_id_tiebreak() {
        let now = fixed_now();
        let rec = |id, offset| {
            AttemptRecord::from_persisted(AttemptId::new(id), 1, 10, now + Duration::minutes(offset))
                .unwrap()
        };
        let mut records = vec![rec(1, 0), rec(2, 5), rec(3, -5), rec(4, 5)];
        sort_newest_first(&mut records);

        let ids: Vec<i64> = records.iter().map(|r| r.id().value()).collect();
        assert_eq!(ids, vec![4, 2, 1, 3]);
        assert!(
            records
                .windows(2)
                .all(|w| w[0].timestamp() >= w[1].timestamp())
        );
    }
}
