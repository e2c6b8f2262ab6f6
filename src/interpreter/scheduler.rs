//! Virtual-clock timer scheduler.
//!
//! The scheduler never reads ambient time. Its clock is a monotonic
//! millisecond counter advanced only by the host (through
//! [`Interpreter::advance`](crate::Interpreter::advance)), which keeps
//! timed behavior fully deterministic and testable without a real UI host.
//!
//! Due entries are delivered one at a time in (deadline, arm-order) order
//! so the interpreter can cancel not-yet-delivered timers mid-drain when a
//! firing causes a state exit. Cancellation is idempotent: once `cancel`
//! returns, that timer's task can never be observed again.

use tracing::trace;

use crate::machine::state::{EverySpec, TransitionSpec};

/// Opaque handle to a scheduled timer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct TimerId(u64);

/// What to do when a timer fires.
#[derive(Clone, Debug)]
pub(crate) enum TimerTask {
    /// One-shot `after` transition.
    After(TransitionSpec),
    /// Recurring `every` action list.
    Every(EverySpec),
}

#[derive(Debug)]
struct Entry {
    id: TimerId,
    fire_at: u64,
    /// Recurrence interval; one-shot when `None`.
    interval: Option<u64>,
    seq: u64,
    task: TimerTask,
}

/// A due timer popped from the scheduler.
#[derive(Debug)]
pub(crate) struct Firing {
    pub id: TimerId,
    pub task: TimerTask,
}

#[derive(Debug, Default)]
pub(crate) struct Scheduler {
    now: u64,
    next_id: u64,
    next_seq: u64,
    entries: Vec<Entry>,
}

impl Scheduler {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Current virtual time in milliseconds.
    pub(crate) fn now(&self) -> u64 {
        self.now
    }

    /// Arm a one-shot timer `delay_ms` from now.
    pub(crate) fn schedule_after(&mut self, delay_ms: u64, task: TimerTask) -> TimerId {
        self.push(delay_ms, None, task)
    }

    /// Arm a recurring timer firing every `interval_ms` from now. A zero
    /// interval would re-arm at the same instant and never drain, so it is
    /// clamped to one millisecond.
    pub(crate) fn schedule_every(&mut self, interval_ms: u64, task: TimerTask) -> TimerId {
        let interval_ms = interval_ms.max(1);
        self.push(interval_ms, Some(interval_ms), task)
    }

    fn push(&mut self, delay_ms: u64, interval: Option<u64>, task: TimerTask) -> TimerId {
        let id = TimerId(self.next_id);
        self.next_id += 1;
        let seq = self.next_seq;
        self.next_seq += 1;
        let fire_at = self.now.saturating_add(delay_ms);
        trace!(?id, fire_at, recurring = interval.is_some(), "timer armed");
        self.entries.push(Entry {
            id,
            fire_at,
            interval,
            seq,
            task,
        });
        id
    }

    /// Disarm a timer. Idempotent: canceling an already-fired or unknown
    /// id is a no-op.
    pub(crate) fn cancel(&mut self, id: TimerId) {
        let before = self.entries.len();
        self.entries.retain(|entry| entry.id != id);
        if self.entries.len() != before {
            trace!(?id, "timer canceled");
        }
    }

    /// Disarm everything.
    pub(crate) fn cancel_all(&mut self) {
        if !self.entries.is_empty() {
            trace!(count = self.entries.len(), "all timers canceled");
        }
        self.entries.clear();
    }

    /// Pop the earliest entry due at or before `until`, advancing the clock
    /// to its deadline. When nothing is due the clock advances to `until`
    /// and `None` is returned.
    ///
    /// Recurring entries are re-armed for one interval past their deadline
    /// before being returned; the returned [`TimerId`] stays valid for
    /// cancellation.
    pub(crate) fn pop_due(&mut self, until: u64) -> Option<Firing> {
        let idx = self
            .entries
            .iter()
            .enumerate()
            .filter(|(_, e)| e.fire_at <= until)
            .min_by_key(|(_, e)| (e.fire_at, e.seq))
            .map(|(idx, _)| idx)?;

        let fire_at = self.entries[idx].fire_at;
        self.now = self.now.max(fire_at);

        let entry = &mut self.entries[idx];
        let firing = match entry.interval {
            Some(interval) => {
                entry.fire_at = fire_at.saturating_add(interval);
                entry.seq = self.next_seq;
                self.next_seq += 1;
                Firing {
                    id: entry.id,
                    task: entry.task.clone(),
                }
            }
            None => {
                let entry = self.entries.swap_remove(idx);
                Firing {
                    id: entry.id,
                    task: entry.task,
                }
            }
        };
        trace!(id = ?firing.id, at = self.now, "timer fired");
        Some(firing)
    }

    /// Advance the clock to `until` without delivering anything. Called
    /// after the pop loop exhausts due entries.
    pub(crate) fn settle(&mut self, until: u64) {
        self.now = self.now.max(until);
    }

    #[cfg(test)]
    fn pending(&self) -> usize {
        self.entries.len()
    }
}
