#![forbid(unsafe_code)]

pub mod app_services;
pub mod error;
pub mod history;
pub mod quiz;

pub use quiz_core::Clock;

pub use app_services::AppServices;
pub use error::{AppServicesError, HistoryError, QuizError};
pub use history::{AttemptListItem, HistoryService};
pub use quiz::{QuestionView, QuizHandle, QuizIntent, QuizRunner, QuizView};
