use thiserror::Error;

use crate::model::question::{Question, QuestionError};

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum QuestionBankError {
    #[error("question bank is empty")]
    Empty,

    #[error(transparent)]
    Question(#[from] QuestionError),

    #[error("invalid question bank: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Fixed, ordered sequence of questions.
///
/// A bank is read-only once built and is shared between sessions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestionBank {
    questions: Vec<Question>,
}

impl QuestionBank {
    /// # Errors
    ///
    /// Returns `QuestionBankError::Empty` if no questions are given.
    pub fn new(questions: Vec<Question>) -> Result<Self, QuestionBankError> {
        if questions.is_empty() {
            return Err(QuestionBankError::Empty);
        }
        Ok(Self { questions })
    }

    /// Parse a bank from a JSON array of questions.
    ///
    /// # Errors
    ///
    /// Returns `QuestionBankError::Parse` for malformed JSON or invalid questions,
    /// and `QuestionBankError::Empty` for an empty array.
    pub fn from_json_str(raw: &str) -> Result<Self, QuestionBankError> {
        let questions: Vec<Question> = serde_json::from_str(raw)?;
        Self::new(questions)
    }

    /// The built-in ten question bank: five multiple choice, five integer.
    ///
    /// # Errors
    ///
    /// Only fails if the built-in data itself is invalid.
    pub fn general_knowledge() -> Result<Self, QuestionBankError> {
        fn opts(items: [&str; 4]) -> Vec<String> {
            items.iter().map(|s| (*s).to_owned()).collect()
        }

        Self::new(vec![
            Question::multiple_choice(
                "Which planet is closest to the Sun?",
                opts(["Venus", "Mercury", "Earth", "Mars"]),
                1,
            )?,
            Question::multiple_choice(
                "Which data structure organizes items in a FIFO manner?",
                opts(["Stack", "Queue", "Tree", "Graph"]),
                1,
            )?,
            Question::multiple_choice(
                "Which of the following is primarily used for structuring web pages?",
                opts(["Python", "Java", "HTML", "C++"]),
                2,
            )?,
            Question::multiple_choice(
                "Which chemical symbol stands for Gold?",
                opts(["Au", "Gd", "Ag", "Pt"]),
                0,
            )?,
            Question::multiple_choice(
                "Which of these processes is not typically involved in refining petroleum?",
                opts([
                    "Fractional distillation",
                    "Cracking",
                    "Polymerization",
                    "Filtration",
                ]),
                3,
            )?,
            Question::integer("What is the value of 12 + 28?", 40)?,
            Question::integer("How many states are there in the United States?", 50)?,
            Question::integer(
                "In which year was the Declaration of Independence signed?",
                1776,
            )?,
            Question::integer(
                "What is the value of pi rounded to the nearest integer?",
                3,
            )?,
            Question::integer(
                "If a car travels at 60 mph for 2 hours, how many miles does it travel?",
                120,
            )?,
        ])
    }

    #[must_use]
    pub fn total_questions(&self) -> usize {
        self.questions.len()
    }

    /// Question at `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index >= total_questions()`. Callers own the index bounds.
    #[must_use]
    pub fn question_at(&self, index: usize) -> &Question {
        assert!(
            index < self.questions.len(),
            "question index {index} out of range for bank of {}",
            self.questions.len()
        );
        &self.questions[index]
    }

    #[must_use]
    pub fn get(&self, index: usize) -> Option<&Question> {
        self.questions.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Question> {
        self.questions.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::question::{AnswerKey, QuestionKind};

    #[test]
    fn general_knowledge_has_ten_fixed_questions() {
        let bank = QuestionBank::general_knowledge().unwrap();
        assert_eq!(bank.total_questions(), 10);

        let kinds: Vec<_> = bank.iter().map(Question::kind).collect();
        assert!(kinds[..5].iter().all(|k| *k == QuestionKind::MultipleChoice));
        assert!(kinds[5..].iter().all(|k| *k == QuestionKind::Integer));

        let answers: Vec<i64> = bank
            .iter()
            .map(|q| match q.key() {
                AnswerKey::MultipleChoice { correct, .. } => *correct as i64,
                AnswerKey::Integer { answer } => *answer,
            })
            .collect();
        assert_eq!(answers, vec![1, 1, 2, 0, 3, 40, 50, 1776, 3, 120]);
    }

    #[test]
    fn empty_bank_is_rejected() {
        assert!(matches!(
            QuestionBank::new(Vec::new()),
            Err(QuestionBankError::Empty)
        ));
        assert!(matches!(
            QuestionBank::from_json_str("[]"),
            Err(QuestionBankError::Empty)
        ));
    }

    #[test]
    fn parses_bank_from_json() {
        let bank = QuestionBank::from_json_str(
            r#"[
                {"kind":"multiple_choice","prompt":"FIFO?","options":["Stack","Queue"],"correct":1},
                {"kind":"integer","prompt":"12 + 28?","answer":40}
            ]"#,
        )
        .unwrap();
        assert_eq!(bank.total_questions(), 2);
        assert_eq!(bank.question_at(1).prompt(), "12 + 28?");
        assert!(bank.get(2).is_none());
    }

    #[test]
    fn malformed_json_is_a_parse_error() {
        let err = QuestionBank::from_json_str(r#"[{"kind":"essay"}]"#).unwrap_err();
        assert!(matches!(err, QuestionBankError::Parse(_)));
    }

    #[test]
    #[should_panic(expected = "out of range")]
    fn question_at_panics_out_of_bounds() {
        let bank = QuestionBank::general_knowledge().unwrap();
        let _ = bank.question_at(10);
    }
}
