use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use tokio::sync::{mpsc, watch};
use tracing::{debug, info, warn};

use quiz_core::Clock;
use quiz_core::model::{
    AttemptId, CompletedAttempt, QuestionBank, QuizSession, QuizSettings, Step,
};

use super::countdown::Countdown;
use super::intent::QuizIntent;
use super::view::QuizView;
use crate::error::QuizError;
use crate::history::{AttemptListItem, HistoryService};

const TICK_PERIOD: Duration = Duration::from_secs(1);

/// Everything the runner reacts to, in arrival order.
pub(crate) enum Event {
    Intent(QuizIntent),
    Tick {
        generation: u64,
    },
    HistoryLoaded {
        read_seq: u64,
        items: Option<Vec<AttemptListItem>>,
        recorded: Option<Recorded>,
    },
    Shutdown,
}

/// Id assigned to the attempt of the `completion`-th finished session.
pub(crate) struct Recorded {
    completion: u64,
    id: AttemptId,
}

//
// ─── RUNNER ───────────────────────────────────────────────────────────────────
//

/// Drives one `QuizSession` from a single task.
///
/// Intents, countdown ticks and finished store operations all arrive on one
/// queue and are applied one at a time. Store I/O runs in detached tasks and
/// reports back through the same queue, so a slow or failing store never holds
/// up the session.
pub struct QuizRunner {
    session: QuizSession,
    clock: Clock,
    history: Option<HistoryService>,
    history_items: Vec<AttemptListItem>,
    /// Bumped by each history task right before it lists, so a higher value
    /// always reflects every append committed before a lower one.
    read_seq: Arc<AtomicU64>,
    applied_read_seq: u64,
    completions: u64,
    last_attempt: Option<(u64, AttemptId)>,
    countdown: Countdown,
    events: mpsc::WeakUnboundedSender<Event>,
    view: watch::Sender<QuizView>,
}

impl QuizRunner {
    /// Spawn a runner on the current tokio runtime.
    ///
    /// `history` is ignored when `settings.persist_history()` is off. When the
    /// welcome screen is disabled the session is already `InProgress` in the
    /// first published view.
    ///
    /// # Panics
    ///
    /// Panics if called outside a tokio runtime.
    #[must_use]
    pub fn spawn(
        bank: Arc<QuestionBank>,
        settings: QuizSettings,
        history: Option<HistoryService>,
        clock: Clock,
    ) -> QuizHandle {
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        let session = QuizSession::new(bank, settings);
        let (view_tx, view_rx) = watch::channel(QuizView::from_session(&session, &[], None));

        let mut runner = Self {
            session,
            clock,
            history: history.filter(|_| settings.persist_history()),
            history_items: Vec::new(),
            read_seq: Arc::new(AtomicU64::new(0)),
            applied_read_seq: 0,
            completions: 0,
            last_attempt: None,
            countdown: Countdown::new(TICK_PERIOD),
            events: events_tx.downgrade(),
            view: view_tx,
        };
        runner.bootstrap();
        tokio::spawn(runner.run(events_rx));

        QuizHandle {
            events: events_tx,
            view: view_rx,
        }
    }

    fn bootstrap(&mut self) {
        self.refresh_history(None);
        if !self.session.settings().show_welcome_screen() {
            self.apply(QuizIntent::Start);
        }
        self.publish();
    }

    async fn run(mut self, mut events: mpsc::UnboundedReceiver<Event>) {
        debug!(
            total_questions = self.session.total_questions(),
            persist_history = self.history.is_some(),
            "quiz runner started"
        );

        while let Some(event) = events.recv().await {
            match event {
                Event::Intent(intent) => self.apply(intent),
                Event::Tick { generation } => self.on_tick(generation),
                Event::HistoryLoaded {
                    read_seq,
                    items,
                    recorded,
                } => self.on_history(read_seq, items, recorded),
                Event::Shutdown => break,
            }
            self.publish();
        }

        self.countdown.cancel();
        debug!("quiz runner stopped");
    }

    fn apply(&mut self, intent: QuizIntent) {
        let name = intent.name();
        let now = self.clock.now();
        let step = match intent {
            QuizIntent::Start => self.session.start(now),
            QuizIntent::SelectOption(index) => self.session.select_option(index),
            QuizIntent::SetTextInput(raw) => self.session.set_text_input(raw),
            QuizIntent::Advance => self.session.advance(now),
            QuizIntent::Reset => self.session.reset(),
        };

        if step == Step::Ignored {
            debug!(
                intent = name,
                phase = self.session.phase().as_str(),
                "ignored intent"
            );
        }
        self.after_step(step);
    }

    fn on_tick(&mut self, generation: u64) {
        if !self.countdown.is_current(generation) {
            debug!(generation, "dropping stale tick");
            return;
        }
        let step = self.session.tick(self.clock.now());
        self.after_step(step);
    }

    fn after_step(&mut self, step: Step) {
        if step.starts_question() {
            self.countdown.arm(&self.events);
        } else if step.leaves_progress() {
            self.countdown.cancel();
        }

        match step {
            Step::Advanced {
                question_index,
                correct,
                reason,
            } => {
                debug!(question_index, correct, ?reason, "advanced");
            }
            Step::Completed {
                correct,
                reason,
                attempt,
            } => {
                info!(
                    score = attempt.score,
                    total_questions = attempt.total_questions,
                    last_correct = correct,
                    ?reason,
                    "quiz completed"
                );
                self.refresh_history(Some(attempt));
            }
            Step::Reset if !self.session.settings().show_welcome_screen() => {
                let restarted = self.session.start(self.clock.now());
                self.after_step(restarted);
            }
            _ => {}
        }
    }

    /// Optionally save `completed`, then reload the sorted history, off-task.
    fn refresh_history(&mut self, completed: Option<CompletedAttempt>) {
        let Some(history) = self.history.clone() else {
            return;
        };
        let completed = completed.map(|attempt| {
            self.completions += 1;
            (self.completions, attempt)
        });
        let read_seq = Arc::clone(&self.read_seq);
        let events = self.events.clone();

        tokio::spawn(async move {
            let recorded = match completed {
                Some((completion, attempt)) => match history.record(&attempt).await {
                    Ok(record) => {
                        info!(id = %record.id(), "saved quiz attempt");
                        Some(Recorded {
                            completion,
                            id: record.id(),
                        })
                    }
                    Err(err) => {
                        warn!(error = %err, "failed to save quiz attempt");
                        None
                    }
                },
                None => None,
            };

            let seq = read_seq.fetch_add(1, Ordering::SeqCst) + 1;
            let items = match history.list_sorted().await {
                Ok(items) => Some(items),
                Err(err) => {
                    warn!(error = %err, "failed to load quiz history");
                    None
                }
            };
            if let Some(tx) = events.upgrade() {
                let _ = tx.send(Event::HistoryLoaded {
                    read_seq: seq,
                    items,
                    recorded,
                });
            }
        });
    }

    fn on_history(
        &mut self,
        read_seq: u64,
        items: Option<Vec<AttemptListItem>>,
        recorded: Option<Recorded>,
    ) {
        if let Some(Recorded { completion, id }) = recorded {
            if self.last_attempt.is_none_or(|(latest, _)| completion > latest) {
                self.last_attempt = Some((completion, id));
            }
        }
        let Some(items) = items else {
            return;
        };
        if read_seq < self.applied_read_seq {
            debug!(read_seq, applied = self.applied_read_seq, "dropping stale history");
            return;
        }
        self.applied_read_seq = read_seq;
        self.history_items = items;
    }

    fn publish(&self) {
        let next = QuizView::from_session(
            &self.session,
            &self.history_items,
            self.last_attempt.map(|(_, id)| id),
        );
        self.view.send_if_modified(|current| {
            if *current == next {
                false
            } else {
                *current = next;
                true
            }
        });
    }
}

//
// ─── HANDLE ───────────────────────────────────────────────────────────────────
//

/// Cloneable handle used by a presentation shell to drive a running quiz.
///
/// The runner stops once every handle is dropped or `shutdown` is called.
#[derive(Clone)]
pub struct QuizHandle {
    events: mpsc::UnboundedSender<Event>,
    view: watch::Receiver<QuizView>,
}

impl QuizHandle {
    /// Queue an intent.
    ///
    /// # Errors
    ///
    /// Returns `QuizError::Closed` if the runner has stopped.
    pub fn send(&self, intent: QuizIntent) -> Result<(), QuizError> {
        self.events
            .send(Event::Intent(intent))
            .map_err(|_| QuizError::Closed)
    }

    /// # Errors
    ///
    /// Returns `QuizError::Closed` if the runner has stopped.
    pub fn start(&self) -> Result<(), QuizError> {
        self.send(QuizIntent::Start)
    }

    /// # Errors
    ///
    /// Returns `QuizError::Closed` if the runner has stopped.
    pub fn select_option(&self, index: usize) -> Result<(), QuizError> {
        self.send(QuizIntent::SelectOption(index))
    }

    /// # Errors
    ///
    /// Returns `QuizError::Closed` if the runner has stopped.
    pub fn set_text_input(&self, raw: impl Into<String>) -> Result<(), QuizError> {
        self.send(QuizIntent::SetTextInput(raw.into()))
    }

    /// # Errors
    ///
    /// Returns `QuizError::Closed` if the runner has stopped.
    pub fn advance(&self) -> Result<(), QuizError> {
        self.send(QuizIntent::Advance)
    }

    /// # Errors
    ///
    /// Returns `QuizError::Closed` if the runner has stopped.
    pub fn reset(&self) -> Result<(), QuizError> {
        self.send(QuizIntent::Reset)
    }

    /// Latest published view.
    #[must_use]
    pub fn view(&self) -> QuizView {
        (*self.view.borrow()).clone()
    }

    /// Receiver notified on every view change.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<QuizView> {
        self.view.clone()
    }

    /// Wait until the published view satisfies `predicate`.
    ///
    /// # Errors
    ///
    /// Returns `QuizError::Closed` if the runner stops first.
    pub async fn wait_for(
        &self,
        predicate: impl FnMut(&QuizView) -> bool,
    ) -> Result<QuizView, QuizError> {
        let mut rx = self.view.clone();
        let view = rx.wait_for(predicate).await.map_err(|_| QuizError::Closed)?;
        Ok((*view).clone())
    }

    /// Ask the runner to stop after the events already queued.
    pub fn shutdown(&self) {
        let _ = self.events.send(Event::Shutdown);
    }

    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.events.is_closed()
    }
}

impl std::fmt::Debug for QuizHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QuizHandle")
            .field("closed", &self.events.is_closed())
            .finish_non_exhaustive()
    }
}
