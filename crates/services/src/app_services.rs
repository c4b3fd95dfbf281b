use std::sync::Arc;

use quiz_core::model::{QuestionBank, QuizSettings};
use storage::repository::Storage;

use crate::Clock;
use crate::error::AppServicesError;
use crate::history::HistoryService;
use crate::quiz::{QuizHandle, QuizRunner};

/// Assembles app-facing services around one storage backend.
#[derive(Clone)]
pub struct AppServices {
    clock: Clock,
    history: HistoryService,
}

impl AppServices {
    /// Build services backed by `SQLite` storage.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError` if storage initialization fails.
    pub async fn new_sqlite(db_url: &str, clock: Clock) -> Result<Self, AppServicesError> {
        let storage = Storage::sqlite(db_url).await?;
        Ok(Self::from_storage(&storage, clock))
    }

    #[must_use]
    pub fn in_memory(clock: Clock) -> Self {
        Self::from_storage(&Storage::in_memory(), clock)
    }

    #[must_use]
    pub fn from_storage(storage: &Storage, clock: Clock) -> Self {
        Self {
            clock,
            history: HistoryService::new(Arc::clone(&storage.attempts)),
        }
    }

    #[must_use]
    pub fn history(&self) -> &HistoryService {
        &self.history
    }

    /// Spawn a quiz runner wired to this service's history store.
    #[must_use]
    pub fn spawn_quiz(&self, bank: Arc<QuestionBank>, settings: QuizSettings) -> QuizHandle {
        QuizRunner::spawn(bank, settings, Some(self.history.clone()), self.clock)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quiz_core::model::SessionPhase;
    use quiz_core::time::fixed_clock;

    #[tokio::test]
    async fn in_memory_services_run_a_quiz() {
        let services = AppServices::in_memory(fixed_clock());
        let bank = Arc::new(QuestionBank::general_knowledge().unwrap());
        let quiz = services.spawn_quiz(bank, QuizSettings::default());

        assert_eq!(quiz.view().phase, SessionPhase::NotStarted);
        quiz.start().unwrap();
        let view = quiz
            .wait_for(|v| v.phase == SessionPhase::InProgress)
            .await
            .unwrap();
        assert_eq!(view.question_index, 0);
        quiz.shutdown();
    }
}
