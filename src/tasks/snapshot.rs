//! # Task snapshots.
//!
//! [`TaskSnapshot`] is the read-only view of a task published on its channel
//! and returned by [`Scheduler::list`](crate::Scheduler::list). It carries the
//! last resolved result but never the timer handle, owner object or callback.

use crate::tasks::{kind::ExecutionType, options::ScheduleOptions, value::TaskOutput};

/// Point-in-time view of a registered task.
#[derive(Clone, Debug)]
pub struct TaskSnapshot {
    /// Unique task name.
    pub name: String,
    /// Trigger kind.
    pub kind: ExecutionType,
    /// Options after defaults were filled.
    pub options: ScheduleOptions,
    /// True while a timer is armed for the task.
    pub running: bool,
    /// Most recent terminal value (`None` until a tick publishes one).
    pub response: Option<TaskOutput>,
}

impl TaskSnapshot {
    /// Borrows the last result as `T`.
    pub fn response_as<T: 'static>(&self) -> Option<&T> {
        self.response.as_ref().and_then(|r| r.downcast_ref::<T>())
    }
}
