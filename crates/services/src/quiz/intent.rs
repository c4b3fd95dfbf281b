/// User intents forwarded by a presentation shell.
///
/// This is the entire inbound surface of a running quiz.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum QuizIntent {
    Start,
    SelectOption(usize),
    SetTextInput(String),
    Advance,
    Reset,
}

impl QuizIntent {
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            QuizIntent::Start => "start",
            QuizIntent::SelectOption(_) => "select_option",
            QuizIntent::SetTextInput(_) => "set_text_input",
            QuizIntent::Advance => "advance",
            QuizIntent::Reset => "reset",
        }
    }
}
