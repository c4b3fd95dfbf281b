use serde::Serialize;

use quiz_core::model::{AttemptId, Question, QuestionKind, QuizSession, SessionPhase};

use crate::history::AttemptListItem;

/// The question currently on screen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionView {
    pub kind: QuestionKind,
    pub prompt: String,
    pub options: Vec<String>,
}

impl From<&Question> for QuestionView {
    fn from(question: &Question) -> Self {
        Self {
            kind: question.kind(),
            prompt: question.prompt().to_owned(),
            options: question.options().to_vec(),
        }
    }
}

/// Everything a presentation shell needs to render the quiz.
///
/// A snapshot: it is rebuilt after every applied event and never shares
/// state with the running session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizView {
    pub phase: SessionPhase,
    pub question_index: usize,
    pub total_questions: usize,
    pub question: Option<QuestionView>,
    pub selected_option: Option<usize>,
    pub text_input: String,
    pub seconds_remaining: u32,
    pub seconds_per_question: u32,
    pub score: u32,
    pub is_last_question: bool,
    pub show_welcome_screen: bool,
    /// Stored attempts, newest first.
    pub history: Vec<AttemptListItem>,
    pub last_attempt_id: Option<AttemptId>,
}

impl QuizView {
    #[must_use]
    pub fn from_session(
        session: &QuizSession,
        history: &[AttemptListItem],
        last_attempt_id: Option<AttemptId>,
    ) -> Self {
        let settings = session.settings();
        Self {
            phase: session.phase(),
            question_index: session.question_index(),
            total_questions: session.total_questions(),
            question: session.current_question().map(QuestionView::from),
            selected_option: session.selected_option(),
            text_input: session.text_input().to_owned(),
            seconds_remaining: session.seconds_remaining(),
            seconds_per_question: settings.seconds_per_question(),
            score: session.score(),
            is_last_question: session.is_last_question(),
            show_welcome_screen: settings.show_welcome_screen(),
            history: history.to_vec(),
            last_attempt_id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quiz_core::model::{QuestionBank, QuizSettings};
    use quiz_core::time::fixed_now;
    use std::sync::Arc;

    fn session() -> QuizSession {
        QuizSession::new(
            Arc::new(QuestionBank::general_knowledge().unwrap()),
            QuizSettings::default(),
        )
    }

    #[test]
    fn welcome_view_has_no_question() {
        let view = QuizView::from_session(&session(), &[], None);
        assert_eq!(view.phase, SessionPhase::NotStarted);
        assert!(view.question.is_none());
        assert_eq!(view.total_questions, 10);
        assert_eq!(view.seconds_remaining, 30);
        assert!(view.show_welcome_screen);
    }

    #[test]
    fn in_progress_view_exposes_current_question() {
        let mut s = session();
        s.start(fixed_now());
        s.select_option(2);
        let view = QuizView::from_session(&s, &[], None);

        let question = view.question.expect("question");
        assert_eq!(question.kind, QuestionKind::MultipleChoice);
        assert_eq!(question.prompt, "Which planet is closest to the Sun?");
        assert_eq!(question.options.len(), 4);
        assert_eq!(view.selected_option, Some(2));
        assert!(!view.is_last_question);
    }

    #[test]
    fn serializes_with_camel_case_fields() {
        let json = serde_json::to_value(QuizView::from_session(&session(), &[], None)).unwrap();
        assert_eq!(json["phase"], "not_started");
        assert_eq!(json["questionIndex"], 0);
        assert_eq!(json["secondsRemaining"], 30);
        assert!(json["history"].as_array().unwrap().is_empty());
    }
}
