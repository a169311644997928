//! Explicit scheduler owning the simulation's named tasks.

use std::{collections::BTreeMap, time::Duration};

use route_defence_core::SimTime;

const MIN_PERIOD: Duration = Duration::from_millis(1);

/// Named tasks driven by the simulation clock.
///
/// The declaration order breaks ties between tasks due at the same instant.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TaskId {
    /// Periodic movement tick.
    Movement,
    /// Periodic combat tick.
    Combat,
    /// Periodic wave monitor poll.
    WaveMonitor,
    /// One-shot delay between a cleared wave and the next spawn.
    InterWaveDelay,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct Task {
    period: Option<Duration>,
    next_due: SimTime,
}

/// Single-threaded clock and task table.
#[derive(Debug, Default)]
pub struct Scheduler {
    now: SimTime,
    tasks: BTreeMap<TaskId, Task>,
}

impl Scheduler {
    /// Creates a scheduler at [`SimTime::ZERO`] with no tasks.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Current simulated time.
    #[must_use]
    pub fn now(&self) -> SimTime {
        self.now
    }

    /// Starts a periodic task first due one period from now.
    ///
    /// Starting a task that is already scheduled keeps its current cadence.
    pub fn start(&mut self, task: TaskId, period: Duration) {
        let period = period.max(MIN_PERIOD);
        let now = self.now;
        let _ = self.tasks.entry(task).or_insert(Task {
            period: Some(period),
            next_due: now.saturating_add(period),
        });
    }

    /// Arms a one-shot task due after `delay`, replacing any pending instance.
    pub fn arm_once(&mut self, task: TaskId, delay: Duration) {
        let _ = self.tasks.insert(
            task,
            Task {
                period: None,
                next_due: self.now.saturating_add(delay),
            },
        );
    }

    /// Stops a task. Returns `false` when it was not scheduled.
    pub fn stop(&mut self, task: TaskId) -> bool {
        self.tasks.remove(&task).is_some()
    }

    /// Cancels every scheduled task.
    pub fn cancel_all(&mut self) {
        self.tasks.clear();
    }

    /// Reports whether the task is scheduled.
    #[must_use]
    pub fn is_scheduled(&self, task: TaskId) -> bool {
        self.tasks.contains_key(&task)
    }

    /// Pops the earliest task due no later than `until` and moves the clock to it.
    ///
    /// Periodic tasks are re-armed one period later; one-shot tasks are removed.
    pub fn pop_due(&mut self, until: SimTime) -> Option<TaskId> {
        let (id, task) = self
            .tasks
            .iter()
            .filter(|(_, task)| task.next_due <= until)
            .min_by_key(|(id, task)| (task.next_due, **id))
            .map(|(id, task)| (*id, *task))?;

        self.now = self.now.max(task.next_due);
        match task.period {
            Some(period) => {
                let _ = self.tasks.insert(
                    id,
                    Task {
                        period: Some(period),
                        next_due: task.next_due.saturating_add(period),
                    },
                );
            }
            None => {
                let _ = self.tasks.remove(&id);
            }
        }
        Some(id)
    }

    /// Moves the clock forward to `until` once every due task ran.
    pub fn settle(&mut self, until: SimTime) {
        self.now = self.now.max(until);
    }
}
