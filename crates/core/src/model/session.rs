use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::model::{CompletedAttempt, Question, QuestionBank, QuestionKind, QuizSettings, Response};

//
// ─── PHASE ────────────────────────────────────────────────────────────────────
//

/// Coarse lifecycle stage of a quiz session.
///
/// Phases only move forward. The only way back to `NotStarted` is `reset`,
/// which rebuilds the session from scratch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionPhase {
    NotStarted,
    InProgress,
    Completed,
}

impl SessionPhase {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            SessionPhase::NotStarted => "not_started",
            SessionPhase::InProgress => "in_progress",
            SessionPhase::Completed => "completed",
        }
    }
}

/// Why the session moved past a question.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdvanceReason {
    /// Explicit "next" / "finish" intent.
    Manual,
    /// The countdown ran out.
    TimerExpired,
}

/// What applying an intent did to the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// Intent was not valid in the current phase or for the current question.
    Ignored,
    /// Session entered `InProgress` at question 0.
    Started,
    /// Answer fields changed; question and timer untouched.
    Updated,
    /// Countdown moved down by one second.
    Ticked { seconds_remaining: u32 },
    /// Previous question was scored and the session moved to `question_index`.
    Advanced {
        question_index: usize,
        correct: bool,
        reason: AdvanceReason,
    },
    /// Last question was scored and the session is now `Completed`.
    Completed {
        correct: bool,
        reason: AdvanceReason,
        attempt: CompletedAttempt,
    },
    /// Session was rebuilt in `NotStarted`.
    Reset,
}

impl Step {
    /// True when the active question changed and a fresh countdown applies.
    #[must_use]
    pub fn starts_question(&self) -> bool {
        matches!(self, Step::Started | Step::Advanced { .. })
    }

    /// True when the session is no longer `InProgress` after this step.
    #[must_use]
    pub fn leaves_progress(&self) -> bool {
        matches!(self, Step::Completed { .. } | Step::Reset)
    }
}

//
// ─── SESSION ──────────────────────────────────────────────────────────────────
//

/// Timed quiz session over an injected question bank.
///
/// The session is a plain state machine: it never schedules anything itself.
/// Callers feed it intents and one `tick` per elapsed second, strictly one at a
/// time, and react to the returned `Step`.
#[derive(Debug, Clone)]
pub struct QuizSession {
    bank: Arc<QuestionBank>,
    settings: QuizSettings,
    phase: SessionPhase,
    question_index: usize,
    selected_option: Option<usize>,
    text_input: String,
    score: u32,
    seconds_remaining: u32,
    started_at: Option<DateTime<Utc>>,
    completed_at: Option<DateTime<Utc>>,
}

impl QuizSession {
    #[must_use]
    pub fn new(bank: Arc<QuestionBank>, settings: QuizSettings) -> Self {
        Self {
            bank,
            settings,
            phase: SessionPhase::NotStarted,
            question_index: 0,
            selected_option: None,
            text_input: String::new(),
            score: 0,
            seconds_remaining: settings.seconds_per_question(),
            started_at: None,
            completed_at: None,
        }
    }

    #[must_use]
    pub fn settings(&self) -> QuizSettings {
        self.settings
    }

    #[must_use]
    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    #[must_use]
    pub fn question_index(&self) -> usize {
        self.question_index
    }

    #[must_use]
    pub fn total_questions(&self) -> usize {
        self.bank.total_questions()
    }

    #[must_use]
    pub fn selected_option(&self) -> Option<usize> {
        self.selected_option
    }

    #[must_use]
    pub fn text_input(&self) -> &str {
        &self.text_input
    }

    #[must_use]
    pub fn score(&self) -> u32 {
        self.score
    }

    #[must_use]
    pub fn seconds_remaining(&self) -> u32 {
        self.seconds_remaining
    }

    #[must_use]
    pub fn started_at(&self) -> Option<DateTime<Utc>> {
        self.started_at
    }

    #[must_use]
    pub fn completed_at(&self) -> Option<DateTime<Utc>> {
        self.completed_at
    }

    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.phase == SessionPhase::Completed
    }

    #[must_use]
    pub fn is_last_question(&self) -> bool {
        self.question_index + 1 >= self.bank.total_questions()
    }

    /// The question being answered, only while `InProgress`.
    #[must_use]
    pub fn current_question(&self) -> Option<&Question> {
        match self.phase {
            SessionPhase::InProgress => Some(self.bank.question_at(self.question_index)),
            SessionPhase::NotStarted | SessionPhase::Completed => None,
        }
    }

    fn current_kind(&self) -> Option<QuestionKind> {
        self.current_question().map(Question::kind)
    }

    /// Begin the quiz at question 0 with a full countdown.
    pub fn start(&mut self, now: DateTime<Utc>) -> Step {
        if self.phase != SessionPhase::NotStarted {
            return Step::Ignored;
        }

        self.phase = SessionPhase::InProgress;
        self.question_index = 0;
        self.score = 0;
        self.clear_answer();
        self.started_at = Some(now);
        Step::Started
    }

    /// Choose an option on a multiple choice question. Later calls overwrite.
    pub fn select_option(&mut self, index: usize) -> Step {
        let Some(question) = self.current_question() else {
            return Step::Ignored;
        };
        if question.kind() != QuestionKind::MultipleChoice || index >= question.option_count() {
            return Step::Ignored;
        }

        self.selected_option = Some(index);
        Step::Updated
    }

    /// Store raw text for an integer question. Parsing waits until scoring.
    pub fn set_text_input(&mut self, raw: impl Into<String>) -> Step {
        if self.current_kind() != Some(QuestionKind::Integer) {
            return Step::Ignored;
        }

        self.text_input = raw.into();
        Step::Updated
    }

    /// Consume one elapsed second.
    ///
    /// The tick that would bring the countdown to zero advances the question
    /// instead, so `seconds_remaining` never reaches zero while `InProgress`.
    pub fn tick(&mut self, now: DateTime<Utc>) -> Step {
        if self.phase != SessionPhase::InProgress {
            return Step::Ignored;
        }

        if self.seconds_remaining > 1 {
            self.seconds_remaining -= 1;
            return Step::Ticked {
                seconds_remaining: self.seconds_remaining,
            };
        }

        self.advance_with(now, AdvanceReason::TimerExpired)
    }

    /// Score the current question and move on, completing after the last one.
    pub fn advance(&mut self, now: DateTime<Utc>) -> Step {
        self.advance_with(now, AdvanceReason::Manual)
    }

    /// Discard all in-memory state and return to `NotStarted`.
    pub fn reset(&mut self) -> Step {
        *self = Self::new(Arc::clone(&self.bank), self.settings);
        Step::Reset
    }

    fn advance_with(&mut self, now: DateTime<Utc>, reason: AdvanceReason) -> Step {
        if self.phase != SessionPhase::InProgress {
            return Step::Ignored;
        }

        let correct = self.evaluate_current();
        if correct {
            self.score += 1;
        }

        if self.question_index + 1 < self.bank.total_questions() {
            self.question_index += 1;
            self.clear_answer();
            return Step::Advanced {
                question_index: self.question_index,
                correct,
                reason,
            };
        }

        self.phase = SessionPhase::Completed;
        self.completed_at = Some(now);
        let attempt = CompletedAttempt {
            score: self.score,
            total_questions: u32::try_from(self.bank.total_questions()).unwrap_or(u32::MAX),
            started_at: self.started_at.unwrap_or(now),
            completed_at: now,
        };
        Step::Completed {
            correct,
            reason,
            attempt,
        }
    }

    fn evaluate_current(&self) -> bool {
        let question = self.bank.question_at(self.question_index);
        let response = match question.kind() {
            QuestionKind::MultipleChoice => Response::Choice(self.selected_option),
            QuestionKind::Integer => Response::Text(&self.text_input),
        };
        question.is_correct(response)
    }

    fn clear_answer(&mut self) {
        self.selected_option = None;
        self.text_input.clear();
        self.seconds_remaining = self.settings.seconds_per_question();
    }
}

//
// ─── TESTS ────────────────────────────────────────────────────────────────────
//
