use std::time::Duration;

use tokio::sync::mpsc::WeakUnboundedSender;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};

use super::runner::Event;

/// Periodic tick source for the active question.
///
/// At most one trigger task is alive. Every `arm`/`cancel` bumps the
/// generation, and ticks from an older generation are rejected by
/// `is_current`, so a tick already queued when the question changed is dropped.
pub(crate) struct Countdown {
    period: Duration,
    generation: u64,
    task: Option<JoinHandle<()>>,
}

impl Countdown {
    pub(crate) fn new(period: Duration) -> Self {
        Self {
            period,
            generation: 0,
            task: None,
        }
    }

    /// Start a fresh trigger, replacing any pending one.
    pub(crate) fn arm(&mut self, events: &WeakUnboundedSender<Event>) {
        self.cancel();

        let generation = self.generation;
        let period = self.period;
        let events = events.clone();
        self.task = Some(tokio::spawn(async move {
            let mut interval = tokio::time::interval_at(Instant::now() + period, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                interval.tick().await;
                let Some(tx) = events.upgrade() else {
                    break;
                };
                if tx.send(Event::Tick { generation }).is_err() {
                    break;
                }
            }
        }));
    }

    pub(crate) fn cancel(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
        self.generation = self.generation.wrapping_add(1);
    }

    pub(crate) fn is_armed(&self) -> bool {
        self.task.is_some()
    }

    pub(crate) fn is_current(&self, generation: u64) -> bool {
        self.is_armed() && generation == self.generation
    }
}

impl Drop for Countdown {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc;

    #[tokio::test(start_paused = true)]
    async fn ticks_carry_the_armed_generation() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut countdown = Countdown::new(Duration::from_secs(1));
        countdown.arm(&tx.downgrade());

        let Some(Event::Tick { generation }) = rx.recv().await else {
            panic!("expected a tick");
        };
        assert!(countdown.is_current(generation));
    }

    #[tokio::test(start_paused = true)]
    async fn rearming_invalidates_old_generation() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut countdown = Countdown::new(Duration::from_secs(1));
        countdown.arm(&tx.downgrade());
        let Some(Event::Tick { generation: old }) = rx.recv().await else {
            panic!("expected a tick");
        };

        countdown.arm(&tx.downgrade());
        assert!(!countdown.is_current(old));

        let Some(Event::Tick { generation: new }) = rx.recv().await else {
            panic!("expected a tick");
        };
        assert!(countdown.is_current(new));
    }

    #[tokio::test(start_paused = true)]
    async fn cancel_stops_ticks() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut countdown = Countdown::new(Duration::from_secs(1));
        countdown.arm(&tx.downgrade());
        countdown.cancel();
        assert!(!countdown.is_armed());

        tokio::time::sleep(Duration::from_secs(5)).await;
        assert!(rx.try_recv().is_err());
    }
}
