use crate::clock::Clock;
use crate::notifier::{FiredKeys, Notifier, Reminder, check_due, deliver};
use crate::tracker::SharedTracker;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info};

/// Periodically checks exercise schedules and delivers due reminders.
///
/// Owns its fired-key state for the lifetime of the task.
pub struct ReminderTask {
    tracker: SharedTracker,
    clock: Arc<dyn Clock>,
    notifier: Arc<dyn Notifier>,
    tolerance: chrono::Duration,
    fired: FiredKeys,
}

impl ReminderTask {
    pub fn new(
        tracker: SharedTracker,
        clock: Arc<dyn Clock>,
        notifier: Arc<dyn Notifier>,
        tolerance: chrono::Duration,
    ) -> Self {
        Self {
            tracker,
            clock,
            notifier,
            tolerance,
            fired: FiredKeys::new(),
        }
    }

    pub fn fired(&self) -> &FiredKeys {
        &self.fired
    }

    /// Runs one check at the clock's current time.
    pub fn tick(&mut self) -> Vec<Reminder> {
        if !self.notifier.is_permitted() {
            return Vec::new();
        }
        let now = self.clock.now();
        let due = {
            let guard = self.tracker.read();
            check_due(guard.exercises(), &now, self.tolerance, &mut self.fired)
        };
        if !due.is_empty() {
            info!(count = due.len(), "delivering exercise reminders");
        }
        deliver(self.notifier.as_ref(), &due);
        due
    }

    /// Starts ticking every `period`, first tick immediately.
    pub fn spawn(mut self, period: Duration) -> ReminderHandle {
        let (cancel_tx, mut cancel_rx) = oneshot::channel::<()>();
        let join = tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                tokio::select! {
                    _ = &mut cancel_rx => break,
                    _ = interval.tick() => {
                        self.tick();
                    }
                }
            }
            debug!("reminder task stopped");
        });
        ReminderHandle {
            cancel: Some(cancel_tx),
            join: Some(join),
        }
    }
}

/// Stops the reminder task when cancelled or dropped.
pub struct ReminderHandle {
    cancel: Option<oneshot::Sender<()>>,
    join: Option<JoinHandle<()>>,
}

impl ReminderHandle {
    pub fn is_finished(&self) -> bool {
        self.join.as_ref().is_none_or(JoinHandle::is_finished)
    }

    /// Signals the task and waits for it to exit.
    pub async fn cancel(mut self) {
        if let Some(cancel) = self.cancel.take() {
            let _ = cancel.send(());
        }
        if let Some(join) = self.join.take() {
            let _ = join.await;
        }
    }
}

impl Drop for ReminderHandle {
    fn drop(&mut self) {
        if let Some(join) = self.join.take() {
            join.abort();
        }
    }
}
