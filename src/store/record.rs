use crate::adapters::TaskHandle;
use crate::tasks::{ScheduleTask, TaskOutput, TaskSnapshot};

/// Canonical per-task state owned by the store.
pub(crate) struct TaskRecord {
    pub(crate) task: ScheduleTask,
    /// Admission counter; a re-added name gets a new one.
    pub(crate) generation: u64,
    /// Armed timer; `None` while stopped.
    pub(crate) handle: Option<TaskHandle>,
    /// Last resolved result.
    pub(crate) response: Option<TaskOutput>,
}

impl TaskRecord {
    pub(crate) fn new(task: ScheduleTask, generation: u64) -> Self {
        Self {
            task,
            generation,
            handle: None,
            response: None,
        }
    }

    pub(crate) fn is_running(&self) -> bool {
        self.handle.as_ref().is_some_and(TaskHandle::is_armed)
    }

    pub(crate) fn snapshot(&self) -> TaskSnapshot {
        TaskSnapshot {
            name: self.task.name().to_string(),
            kind: self.task.kind(),
            options: self.task.options().clone(),
            running: self.is_running(),
            response: self.response.clone(),
        }
    }
}
