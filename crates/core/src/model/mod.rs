mod attempt;
mod bank;
mod ids;
mod question;
mod session;
mod settings;

pub use attempt::{AttemptError, AttemptRecord, CompletedAttempt, NewAttempt, sort_newest_first};
pub use bank::{QuestionBank, QuestionBankError};
pub use ids::{AttemptId, ParseIdError};
pub use question::{AnswerKey, Question, QuestionError, QuestionKind, Response};
pub use session::{AdvanceReason, QuizSession, SessionPhase, Step};
pub use settings::{DEFAULT_SECONDS_PER_QUESTION, QuizSettings, QuizSettingsDraft, QuizSettingsError};
