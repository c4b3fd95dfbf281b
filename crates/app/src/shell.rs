//! Line-oriented terminal front end for a running quiz.

use std::fmt::Write as _;

use chrono::Local;
use quiz_core::model::{QuestionKind, SessionPhase};
use services::{AttemptListItem, QuizHandle, QuizIntent, QuizView};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::watch;
use tracing::debug;

/// Seconds below which the timer is shown as a warning.
const TIMER_WARNING_BELOW: u32 = 10;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    Intent(QuizIntent),
    Quit,
}

/// Interpret one line of user input against the view it was typed at.
///
/// Blank lines yield `None`. A single letter picks an option only while a
/// multiple-choice question is on screen; every other unrecognized line is
/// answer text.
pub fn parse_line(line: &str, view: &QuizView) -> Option<Input> {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return None;
    }

    let input = match trimmed.to_ascii_lowercase().as_str() {
        "quit" | "exit" | "q" => Input::Quit,
        "start" => Input::Intent(QuizIntent::Start),
        "next" | "n" => Input::Intent(QuizIntent::Advance),
        "reset" => Input::Intent(QuizIntent::Reset),
        lower => match (option_letter(lower), current_kind(view)) {
            (Some(index), Some(QuestionKind::MultipleChoice)) => {
                Input::Intent(QuizIntent::SelectOption(index))
            }
            _ => Input::Intent(QuizIntent::SetTextInput(trimmed.to_owned())),
        },
    };
    Some(input)
}

fn option_letter(raw: &str) -> Option<usize> {
    let mut chars = raw.chars();
    match (chars.next(), chars.next()) {
        (Some(c @ 'a'..='z'), None) => Some(usize::from(c as u8 - b'a')),
        _ => None,
    }
}

fn letter_for(index: usize) -> char {
    u8::try_from(index)
        .ok()
        .filter(|i| *i < 26)
        .map_or('?', |i| char::from(b'a' + i))
}

fn current_kind(view: &QuizView) -> Option<QuestionKind> {
    view.question.as_ref().map(|q| q.kind)
}

//
// ─── RENDERING ────────────────────────────────────────────────────────────────
//

/// Text to print for `view`, given the view printed before it.
///
/// Screen changes redraw everything; countdown and input changes print a
/// single status line. Returns an empty string when nothing visible changed.
pub fn render(previous: Option<&QuizView>, view: &QuizView) -> String {
    match previous {
        Some(prev) if same_screen(prev, view) => render_delta(prev, view),
        _ => render_screen(view),
    }
}

fn same_screen(a: &QuizView, b: &QuizView) -> bool {
    a.phase == b.phase
        && a.question_index == b.question_index
        && a.score == b.score
        && a.history == b.history
        && a.last_attempt_id == b.last_attempt_id
}

fn render_delta(prev: &QuizView, view: &QuizView) -> String {
    let mut out = String::new();
    if view.phase != SessionPhase::InProgress {
        return out;
    }
    if prev.selected_option != view.selected_option {
        if let (Some(index), Some(question)) = (view.selected_option, &view.question) {
            let label = question.options.get(index).map_or("", String::as_str);
            let _ = writeln!(out, "Selected {}) {label}", letter_for(index));
        }
    }
    if prev.text_input != view.text_input {
        let _ = writeln!(out, "Answer: {}", view.text_input);
    }
    if prev.seconds_remaining != view.seconds_remaining {
        let _ = writeln!(out, "{}", timer_line(view.seconds_remaining));
    }
    out
}

fn render_screen(view: &QuizView) -> String {
    let mut out = String::new();
    match view.phase {
        SessionPhase::NotStarted => {
            let _ = writeln!(out, "Welcome to the quiz!");
            let _ = writeln!(
                out,
                "{} questions, {} seconds each.",
                view.total_questions, view.seconds_per_question
            );
            write_history(&mut out, view);
            let _ = writeln!(out, "Type `start` to begin, `quit` to exit.");
        }
        SessionPhase::InProgress => {
            let _ = writeln!(
                out,
                "Question {}/{}    Score: {}",
                view.question_index + 1,
                view.total_questions,
                view.score
            );
            if let Some(question) = &view.question {
                let _ = writeln!(out, "{}", question.prompt);
                match question.kind {
                    QuestionKind::MultipleChoice => {
                        for (i, option) in question.options.iter().enumerate() {
                            let marker = if view.selected_option == Some(i) { '*' } else { ' ' };
                            let _ = writeln!(out, " {marker}{}) {option}", letter_for(i));
                        }
                    }
                    QuestionKind::Integer => {
                        let _ = writeln!(out, "  (type a whole number)");
                    }
                }
            }
            let _ = writeln!(out, "{}", timer_line(view.seconds_remaining));
            let action = if view.is_last_question {
                "Finish Quiz"
            } else {
                "Next Question"
            };
            let _ = writeln!(out, "Type `next` for {action}.");
        }
        SessionPhase::Completed => {
            let _ = writeln!(
                out,
                "Quiz complete! Score: {}/{}",
                view.score, view.total_questions
            );
            write_history(&mut out, view);
            let _ = writeln!(out, "Type `reset` to play again, `quit` to exit.");
        }
    }
    out
}

fn timer_line(seconds: u32) -> String {
    if seconds < TIMER_WARNING_BELOW {
        format!("Time left: {seconds}s  (hurry!)")
    } else {
        format!("Time left: {seconds}s")
    }
}

fn write_history(out: &mut String, view: &QuizView) {
    if view.history.is_empty() {
        return;
    }
    let _ = writeln!(out, "Previous attempts:");
    for item in &view.history {
        let _ = writeln!(
            out,
            "  {}{}",
            history_line(item),
            if view.last_attempt_id == Some(item.id) {
                "  (this attempt)"
            } else {
                ""
            }
        );
    }
}

fn history_line(item: &AttemptListItem) -> String {
    let local = item.completed_at.with_timezone(&Local);
    format!(
        "Score: {}/{}  {}",
        item.score,
        item.total_questions,
        local.format("%Y-%m-%d %H:%M:%S")
    )
}

//
// ─── LOOPS ────────────────────────────────────────────────────────────────────
//

/// Print every view change until the runner stops.
pub async fn render_loop(mut views: watch::Receiver<QuizView>) {
    let mut previous: Option<QuizView> = None;
    loop {
        let view = (*views.borrow_and_update()).clone();
        let text = render(previous.as_ref(), &view);
        if !text.is_empty() {
            if previous.as_ref().is_some_and(|p| !same_screen(p, &view)) {
                println!();
            }
            print!("{text}");
        }
        previous = Some(view);

        if views.changed().await.is_err() {
            break;
        }
    }
}

/// Forward stdin lines to the quiz until `quit`, end of input, or the runner
/// stops.
///
/// # Errors
///
/// Returns I/O errors from reading stdin.
pub async fn input_loop(quiz: &QuizHandle) -> std::io::Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        match parse_line(&line, &quiz.view()) {
            None => {}
            Some(Input::Quit) => break,
            Some(Input::Intent(intent)) => {
                debug!(intent = intent.name(), "user intent");
                if quiz.send(intent).is_err() {
                    break;
                }
            }
        }
    }
    Ok(())
}
