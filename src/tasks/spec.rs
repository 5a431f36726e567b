//! # Task descriptors.
//!
//! Defines [`ScheduleTask`] the descriptor handed to the scheduler: trigger kind,
//! unique name, kind-specific options, optional owner object and the callback.
//!
//! A descriptor can be created:
//! - **Explicitly** with [`ScheduleTask::new`] (full control)
//! - **Fluently** with [`ScheduleTask::builder`] or the per-kind shortcuts
//!   ([`ScheduleTask::cron`], [`ScheduleTask::interval`], ...)
//!
//! Descriptors are plain data; nothing is validated until
//! [`Scheduler::add`](crate::Scheduler::add).

use std::fmt;
use std::sync::Arc;

use crate::tasks::{
    callback::{CallbackRef, ContextRef},
    kind::ExecutionType,
    options::ScheduleOptions,
};

/// Descriptor of a schedulable task.
///
/// ## Example
/// ```rust
/// use cronvisor::{CallbackFn, ContextRef, ExecutionError, ExecutionType, ScheduleOptions, ScheduleTask, TaskValue};
///
/// let task = ScheduleTask::new(
///     ExecutionType::Interval,
///     "heartbeat",
///     ScheduleOptions::ms(10_000),
///     CallbackFn::arc(|_ctx: Option<ContextRef>| async move {
///         Ok::<_, ExecutionError>(TaskValue::empty())
///     }),
/// );
/// assert_eq!(task.name(), "heartbeat");
/// assert_eq!(task.kind(), ExecutionType::Interval);
/// ```
#[derive(Clone)]
pub struct ScheduleTask {
    kind: ExecutionType,
    name: String,
    options: ScheduleOptions,
    context: Option<ContextRef>,
    callback: CallbackRef,
}

impl ScheduleTask {
    /// Creates a new descriptor.
    pub fn new(
        kind: ExecutionType,
        name: impl Into<String>,
        options: ScheduleOptions,
        callback: CallbackRef,
    ) -> Self {
        Self {
            kind,
            name: name.into(),
            options,
            context: None,
            callback,
        }
    }

    /// Returns a new descriptor bound to an owner object.
    pub fn with_context<C>(mut self, context: Arc<C>) -> Self
    where
        C: Send + Sync + 'static,
    {
        self.context = Some(context);
        self
    }

    /// Returns a new descriptor bound to an already type-erased owner object.
    pub fn with_context_ref(mut self, context: ContextRef) -> Self {
        self.context = Some(context);
        self
    }

    /// Returns a new descriptor with replaced options.
    pub fn with_options(mut self, options: ScheduleOptions) -> Self {
        self.options = options;
        self
    }

    /// Trigger kind.
    pub fn kind(&self) -> ExecutionType {
        self.kind
    }

    /// Unique task name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Schedule options.
    pub fn options(&self) -> &ScheduleOptions {
        &self.options
    }

    /// Owner object, if any.
    pub fn context(&self) -> Option<&ContextRef> {
        self.context.as_ref()
    }

    /// Callback handle.
    pub fn callback(&self) -> &CallbackRef {
        &self.callback
    }

    pub(crate) fn options_mut(&mut self) -> &mut ScheduleOptions {
        &mut self.options
    }
}

impl fmt::Debug for ScheduleTask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScheduleTask")
            .field("kind", &self.kind)
            .field("name", &self.name)
            .field("options", &self.options)
            .field("context", &self.context.is_some())
            .finish_non_exhaustive()
    }
}
