use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default countdown per question, in seconds.
pub const DEFAULT_SECONDS_PER_QUESTION: u32 = 30;

/// Behavior flags for a quiz session.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuizSettings {
    show_welcome_screen: bool,
    persist_history: bool,
    seconds_per_question: u32,
}

#[derive(Clone, Debug, Default)]
pub struct QuizSettingsDraft {
    pub show_welcome_screen: Option<bool>,
    pub persist_history: Option<bool>,
    pub seconds_per_question: Option<u32>,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum QuizSettingsError {
    #[error("seconds per question must be at least 1")]
    ZeroCountdown,
}

impl QuizSettingsDraft {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Fill unset fields with defaults and validate.
    ///
    /// # Errors
    ///
    /// Returns `QuizSettingsError::ZeroCountdown` if the countdown is zero.
    pub fn validate(self) -> Result<QuizSettings, QuizSettingsError> {
        let defaults = QuizSettings::default();
        let seconds_per_question = self
            .seconds_per_question
            .unwrap_or(defaults.seconds_per_question);
        if seconds_per_question == 0 {
            return Err(QuizSettingsError::ZeroCountdown);
        }

        Ok(QuizSettings {
            show_welcome_screen: self
                .show_welcome_screen
                .unwrap_or(defaults.show_welcome_screen),
            persist_history: self.persist_history.unwrap_or(defaults.persist_history),
            seconds_per_question,
        })
    }
}

impl QuizSettings {
    /// Whether the session waits on the welcome screen for an explicit start.
    #[must_use]
    pub fn show_welcome_screen(&self) -> bool {
        self.show_welcome_screen
    }

    /// Whether completed attempts are written to and read from the history store.
    #[must_use]
    pub fn persist_history(&self) -> bool {
        self.persist_history
    }

    #[must_use]
    pub fn seconds_per_question(&self) -> u32 {
        self.seconds_per_question
    }
}

impl Default for QuizSettings {
    fn default() -> Self {
        Self {
            show_welcome_screen: true,
            persist_history: true,
            seconds_per_question: DEFAULT_SECONDS_PER_QUESTION,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_draft_uses_defaults() {
        let settings = QuizSettingsDraft::new().validate().unwrap();
        assert_eq!(settings, QuizSettings::default());
        assert!(settings.show_welcome_screen());
        assert!(settings.persist_history());
        assert_eq!(settings.seconds_per_question(), 30);
    }

    #[test]
    fn zero_countdown_is_rejected() {
        let draft = QuizSettingsDraft {
            seconds_per_question: Some(0),
            ..QuizSettingsDraft::default()
        };
        assert_eq!(draft.validate(), Err(QuizSettingsError::ZeroCountdown));
    }

    #[test]
    fn overrides_are_kept() {
        let settings = QuizSettingsDraft {
            show_welcome_screen: Some(false),
            persist_history: Some(false),
            seconds_per_question: Some(5),
        }
        .validate()
        .unwrap();
        assert!(!settings.show_welcome_screen());
        assert!(!settings.persist_history());
        assert_eq!(settings.seconds_per_question(), 5);
    }
}
