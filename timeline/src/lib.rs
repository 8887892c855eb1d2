#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Deterministic schedule of cancellable delayed tasks.
//!
//! Every task belongs to the [`LifecycleId`] that scheduled it so an owner
//! can cancel all of its outstanding work when it exits. Tasks fire in due
//! order; tasks due at the same instant fire in the order they were
//! scheduled. Time only moves when the consumer pops or settles.

use std::{
    collections::{BTreeMap, HashMap},
    time::Duration,
};

use dark_spiral_core::LifecycleId;

/// Handle used to cancel a single scheduled task.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TaskHandle(u64);

/// Task removed from the schedule because its due time was reached.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Fired<T> {
    /// Handle the task was scheduled under.
    pub handle: TaskHandle,
    /// Lifecycle that scheduled the task.
    pub owner: LifecycleId,
    /// Instant at which the task was due.
    pub due: Duration,
    /// Scheduled payload.
    pub task: T,
}

#[derive(Clone, Debug)]
struct Entry<T> {
    owner: LifecycleId,
    task: T,
}

/// Simulated clock paired with a queue of pending tasks.
#[derive(Clone, Debug)]
pub struct Timeline<T> {
    now: Duration,
    next_sequence: u64,
    pending: BTreeMap<(Duration, u64), Entry<T>>,
    due_by_handle: HashMap<u64, Duration>,
}

impl<T> Default for Timeline<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Timeline<T> {
    /// Creates an empty timeline positioned at time zero.
    #[must_use]
    pub fn new() -> Self {
        Self {
            now: Duration::ZERO,
            next_sequence: 0,
            pending: BTreeMap::new(),
            due_by_handle: HashMap::new(),
        }
    }

    /// Current simulated time.
    #[must_use]
    pub fn now(&self) -> Duration {
        self.now
    }

    /// Number of pending tasks.
    #[must_use]
    pub fn len(&self) -> usize {
        self.pending.len()
    }

    /// Reports whether no tasks are pending.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Schedules `task` to fire `delay` after the current time.
    pub fn schedule_after(&mut self, delay: Duration, owner: LifecycleId, task: T) -> TaskHandle {
        let due = self.now.saturating_add(delay);
        let sequence = self.next_sequence;
        self.next_sequence = self.next_sequence.wrapping_add(1);
        let _ = self.pending.insert((due, sequence), Entry { owner, task });
        let _ = self.due_by_handle.insert(sequence, due);
        TaskHandle(sequence)
    }

    /// Cancels a single task. Returns `false` when it already fired or was cancelled.
    pub fn cancel(&mut self, handle: TaskHandle) -> bool {
        let Some(due) = self.due_by_handle.remove(&handle.0) else {
            return false;
        };
        self.pending.remove(&(due, handle.0)).is_some()
    }

    /// Cancels every task scheduled by `owner`, returning how many were removed.
    pub fn cancel_owner(&mut self, owner: LifecycleId) -> usize {
        let doomed: Vec<(Duration, u64)> = self
            .pending
            .iter()
            .filter(|(_, entry)| entry.owner == owner)
            .map(|(key, _)| *key)
            .collect();
        for key in &doomed {
            let _ = self.pending.remove(key);
            let _ = self.due_by_handle.remove(&key.1);
        }
        doomed.len()
    }

    /// Cancels every pending task.
    pub fn cancel_all(&mut self) -> usize {
        let cancelled = self.pending.len();
        self.pending.clear();
        self.due_by_handle.clear();
        cancelled
    }

    /// Reports whether the handle still refers to a pending task.
    #[must_use]
    pub fn is_pending(&self, handle: TaskHandle) -> bool {
        self.due_by_handle.contains_key(&handle.0)
    }

    /// Due time of the earliest pending task.
    #[must_use]
    pub fn next_due(&self) -> Option<Duration> {
        self.pending.keys().next().map(|(due, _)| *due)
    }

    /// Removes the earliest task due at or before `until`, moving the clock to its due time.
    pub fn pop_due(&mut self, until: Duration) -> Option<Fired<T>> {
        let (&(due, sequence), _) = self.pending.iter().next()?;
        if due > until {
            return None;
        }
        let entry = self.pending.remove(&(due, sequence))?;
        let _ = self.due_by_handle.remove(&sequence);
        if due > self.now {
            self.now = due;
        }
        Some(Fired {
            handle: TaskHandle(sequence),
            owner: entry.owner,
            due,
            task: entry.task,
        })
    }

    /// Moves the clock forward to `until` without firing anything.
    ///
    /// The clock never moves backwards.
    pub fn settle(&mut self, until: Duration) {
        if until > self.now {
            self.now = until;
        }
    }
}
