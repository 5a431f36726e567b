//! # Task data model.
//!
//! This module provides the task-related types:
//! - [`ExecutionType`] - trigger kind (Cron / Interval / Delay / RunAt)
//! - [`ScheduleOptions`] - kind-specific schedule fields
//! - [`ScheduleTask`] - descriptor handed to the scheduler (+ fluent builder)
//! - [`Callback`] / [`CallbackFn`] - the work invoked on every trigger
//! - [`TaskValue`] / [`TaskOutput`] - callback return shapes and terminal values
//! - [`TaskSnapshot`] - read-only view published to subscribers

mod callback;
mod kind;
mod options;
mod snapshot;
mod spec;
mod spec_builder;
mod value;

pub use callback::{BoxCallbackFuture, Callback, CallbackFn, CallbackRef, ContextRef};
pub use kind::ExecutionType;
pub use options::ScheduleOptions;
pub use snapshot::TaskSnapshot;
pub use spec::ScheduleTask;
pub use spec_builder::ScheduleTaskBuilder;
pub use value::{BoxValueFuture, BoxValueStream, ResultKind, TaskOutput, TaskValue};
