use std::future::Future;
use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::error::ExecutionError;
use crate::tasks::{
    callback::{CallbackFn, CallbackRef, ContextRef},
    kind::ExecutionType,
    options::ScheduleOptions,
    spec::ScheduleTask,
    value::TaskValue,
};

/// Builder for ScheduleTask with fluent API
#[derive(Clone)]
pub struct ScheduleTaskBuilder {
    kind: ExecutionType,
    name: String,
    options: ScheduleOptions,
    context: Option<ContextRef>,
}

impl ScheduleTaskBuilder {
    /// Creates a new builder for the given kind and task name
    pub fn new(kind: ExecutionType, name: impl Into<String>) -> Self {
        Self {
            kind,
            name: name.into(),
            options: ScheduleOptions::default(),
            context: None,
        }
    }

    pub fn with_priority(mut self, priority: i64) -> Self {
        self.options.priority = Some(priority);
        self
    }

    pub fn with_cron_time(mut self, expr: impl Into<String>) -> Self {
        self.options.cron_time = Some(expr.into());
        self
    }

    pub fn with_ms(mut self, ms: i64) -> Self {
        self.options.ms = Some(ms);
        self
    }

    pub fn with_run_at(mut self, at: DateTime<Utc>) -> Self {
        self.options.run_at = Some(at);
        self
    }

    pub fn with_time_zone(mut self, zone: impl Into<String>) -> Self {
        self.options.time_zone = Some(zone.into());
        self
    }

    pub fn with_context<C>(mut self, context: Arc<C>) -> Self
    where
        C: Send + Sync + 'static,
    {
        self.context = Some(context);
        self
    }

    /// Build ScheduleTask from a closure
    pub fn build<F, Fut>(self, f: F) -> ScheduleTask
    where
        F: Fn(Option<ContextRef>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<TaskValue, ExecutionError>> + Send + 'static,
    {
        self.build_from_callback(CallbackFn::arc(f))
    }

    /// Build ScheduleTask from an existing CallbackRef
    pub fn build_from_callback(self, callback: CallbackRef) -> ScheduleTask {
        let task = ScheduleTask::new(self.kind, self.name, self.options, callback);
        match self.context {
            Some(ctx) => task.with_context_ref(ctx),
            None => task,
        }
    }
}

impl ScheduleTask {
    /// Creates a builder for constructing ScheduleTask with fluent API
    pub fn builder(kind: ExecutionType, name: impl Into<String>) -> ScheduleTaskBuilder {
        ScheduleTaskBuilder::new(kind, name)
    }

    /// Builder for a cron task
    pub fn cron(name: impl Into<String>, expr: impl Into<String>) -> ScheduleTaskBuilder {
        ScheduleTaskBuilder::new(ExecutionType::Cron, name).with_cron_time(expr)
    }

    /// Builder for an interval task
    pub fn interval(name: impl Into<String>, ms: i64) -> ScheduleTaskBuilder {
        ScheduleTaskBuilder::new(ExecutionType::Interval, name).with_ms(ms)
    }

    /// Builder for a delay task
    pub fn delay(name: impl Into<String>, ms: i64) -> ScheduleTaskBuilder {
        ScheduleTaskBuilder::new(ExecutionType::Delay, name).with_ms(ms)
    }

    /// Builder for a run-at task
    pub fn run_at(name: impl Into<String>, at: DateTime<Utc>) -> ScheduleTaskBuilder {
        ScheduleTaskBuilder::new(ExecutionType::RunAt, name).with_run_at(at)
    }
}
