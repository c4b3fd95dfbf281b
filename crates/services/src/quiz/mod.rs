mod countdown;
mod intent;
mod runner;
mod view;

// Public API of the quiz subsystem.
pub use intent::QuizIntent;
pub use runner::{QuizHandle, QuizRunner};
pub use view::{QuestionView, QuizView};
