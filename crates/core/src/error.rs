use thiserror::Error;

use crate::model::{AttemptError, QuestionBankError, QuestionError, QuizSettingsError};

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Question(#[from] QuestionError),
    #[error(transparent)]
    Bank(#[from] QuestionBankError),
    #[error(transparent)]
    Attempt(#[from] AttemptError),
    #[error(transparent)]
    Settings(#[from] QuizSettingsError),
}
