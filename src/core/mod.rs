//! Lifecycle controller.
//!
//! The public API of this module is [`Scheduler`] and its [`SchedulerBuilder`],
//! plus the [`IntoNames`]/[`IntoTasks`] inputs of the batch operations.
//!
//! Internal modules:
//! - [`scheduler`]: add/remove/start/stop/restart, subscriptions and shutdown;
//! - [`builder`]: assembles the bus, store, subscribers and registration table;
//! - [`batch`]: single-or-many inputs;
//! - [`shutdown`]: cross-platform termination signals.

mod batch;
mod builder;
mod scheduler;
mod shutdown;

pub use batch::{IntoNames, IntoTasks};
pub use builder::SchedulerBuilder;
pub use scheduler::Scheduler;
