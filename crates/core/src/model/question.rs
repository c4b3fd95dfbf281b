use serde::{Deserialize, Serialize};
use thiserror::Error;

//
// ─── ERRORS ───────────────────────────────────────────────────────────────────
//

/// Validation failures when building a question.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum QuestionError {
    #[error("question prompt cannot be empty")]
    EmptyPrompt,

    #[error("multiple choice question needs at least 2 options, got {len}")]
    TooFewOptions { len: usize },

    #[error("option {index} is empty")]
    EmptyOption { index: usize },

    #[error("correct option {correct} is out of range for {len} options")]
    CorrectOutOfRange { correct: usize, len: usize },
}

//
// ─── QUESTION KIND ────────────────────────────────────────────────────────────
//

/// How a question is answered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestionKind {
    /// Pick one option from a fixed list.
    MultipleChoice,
    /// Type a whole number.
    Integer,
}

impl QuestionKind {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            QuestionKind::MultipleChoice => "multiple_choice",
            QuestionKind::Integer => "integer",
        }
    }
}

/// The correct answer, shaped by the question kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnswerKey {
    MultipleChoice { options: Vec<String>, correct: usize },
    Integer { answer: i64 },
}

/// What the user has entered for the current question.
///
/// Only the variant matching the question kind is ever evaluated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Response<'a> {
    Choice(Option<usize>),
    Text(&'a str),
}

//
// ─── QUESTION ─────────────────────────────────────────────────────────────────
//

/// Immutable quiz question.
///
/// Constructed only through validating constructors (or deserialization, which
/// runs the same checks), so the answer key always references a valid option.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "QuestionRecord", into = "QuestionRecord")]
pub struct Question {
    prompt: String,
    key: AnswerKey,
}

impl Question {
    /// Build a multiple choice question.
    ///
    /// # Errors
    ///
    /// Returns `QuestionError` if the prompt or any option is blank, there are fewer
    /// than two options, or `correct` does not index into `options`.
    pub fn multiple_choice(
        prompt: impl Into<String>,
        options: Vec<String>,
        correct: usize,
    ) -> Result<Self, QuestionError> {
        let prompt = normalize_prompt(prompt.into())?;
        if options.len() < 2 {
            return Err(QuestionError::TooFewOptions { len: options.len() });
        }
        if let Some(index) = options.iter().position(|o| o.trim().is_empty()) {
            return Err(QuestionError::EmptyOption { index });
        }
        if correct >= options.len() {
            return Err(QuestionError::CorrectOutOfRange {
                correct,
                len: options.len(),
            });
        }

        Ok(Self {
            prompt,
            key: AnswerKey::MultipleChoice { options, correct },
        })
    }

    /// Build an integer-answer question.
    ///
    /// # Errors
    ///
    /// Returns `QuestionError::EmptyPrompt` if the prompt is blank.
    pub fn integer(prompt: impl Into<String>, answer: i64) -> Result<Self, QuestionError> {
        Ok(Self {
            prompt: normalize_prompt(prompt.into())?,
            key: AnswerKey::Integer { answer },
        })
    }

    #[must_use]
    pub fn kind(&self) -> QuestionKind {
        match self.key {
            AnswerKey::MultipleChoice { .. } => QuestionKind::MultipleChoice,
            AnswerKey::Integer { .. } => QuestionKind::Integer,
        }
    }

    #[must_use]
    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    #[must_use]
    pub fn key(&self) -> &AnswerKey {
        &self.key
    }

    /// Options in display order; empty for integer questions.
    #[must_use]
    pub fn options(&self) -> &[String] {
        match &self.key {
            AnswerKey::MultipleChoice { options, .. } => options,
            AnswerKey::Integer { .. } => &[],
        }
    }

    #[must_use]
    pub fn option_count(&self) -> usize {
        self.options().len()
    }

    /// Evaluate a response against the answer key.
    ///
    /// Integer answers must parse as a whole number once surrounding whitespace is
    /// trimmed. Empty or unparseable text is simply wrong. A response of the wrong
    /// shape for this question never matches.
    #[must_use]
    pub fn is_correct(&self, response: Response<'_>) -> bool {
        match (&self.key, response) {
            (AnswerKey::MultipleChoice { correct, .. }, Response::Choice(selected)) => {
                selected == Some(*correct)
            }
            (AnswerKey::Integer { answer }, Response::Text(raw)) => {
                raw.trim().parse::<i64>() == Ok(*answer)
            }
            _ => false,
        }
    }
}

fn normalize_prompt(prompt: String) -> Result<String, QuestionError> {
    let trimmed = prompt.trim();
    if trimmed.is_empty() {
        return Err(QuestionError::EmptyPrompt);
    }
    Ok(trimmed.to_owned())
}

//
// ─── SERDE SHAPE ──────────────────────────────────────────────────────────────
//

#[derive(Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
enum QuestionRecord {
    MultipleChoice {
        prompt: String,
        options: Vec<String>,
        correct: usize,
    },
    Integer {
        prompt: String,
        answer: i64,
    },
}

impl TryFrom<QuestionRecord> for Question {
    type Error = QuestionError;

    fn try_from(record: QuestionRecord) -> Result<Self, Self::Error> {
        match record {
            QuestionRecord::MultipleChoice {
                prompt,
                options,
                correct,
            } => Question::multiple_choice(prompt, options, correct),
            QuestionRecord::Integer { prompt, answer } => Question::integer(prompt, answer),
        }
    }
}

impl From<Question> for QuestionRecord {
    fn from(question: Question) -> Self {
        match question.key {
            AnswerKey::MultipleChoice { options, correct } => QuestionRecord::MultipleChoice {
                prompt: question.prompt,
                options,
                correct,
            },
            AnswerKey::Integer { answer } => QuestionRecord::Integer {
                prompt: question.prompt,
                answer,
            },
        }
    }
}

//
// ─── TESTS ────────────────────────────────────────────────────────────────────
//
