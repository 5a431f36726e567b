//! # cronvisor
//!
//! **Cronvisor** is an in-process task scheduler for tokio applications.
//!
//! Tasks are named callbacks fired by one of four triggers (cron expression,
//! fixed interval, one-shot delay, absolute instant). Each task keeps the last
//! result its callback produced and publishes it on a per-task channel that
//! replays the latest snapshot to new subscribers.
//!
//! ## Architecture
//! ### Overview
//! ```text
//!     ┌──────────────┐   ┌──────────────┐   ┌──────────────┐
//!     │ ScheduleTask │   │ ScheduleTask │   │ ScheduleTask │
//!     │    (Cron)    │   │  (Interval)  │   │   (RunAt)    │
//!     └──────┬───────┘   └──────┬───────┘   └──────┬───────┘
//!            ▼                  ▼                  ▼
//! ┌───────────────────────────────────────────────────────────────────┐
//! │  Scheduler (lifecycle controller)                                 │
//! │  - validate + fill defaults                                       │
//! │  - TaskStore (records + watch channel per task)                   │
//! │  - Bus (lifecycle events) → SubscriberSet                         │
//! └──────┬──────────────────┬──────────────────┬──────────────────────┘
//!        ▼                  ▼                  ▼
//!   cron loop         interval loop       delay loop      (adapters)
//!        │ fire             │ fire             │ fire
//!        ▼                  ▼                  ▼
//! ┌───────────────────────────────────────────────────────────────────┐
//! │  Tick: callback(context) → resolve → TaskStore::update            │
//! └────────────────────────────────┬──────────────────────────────────┘
//!                                  ▼
//!                    TaskWatch streams (replay last snapshot)
//! ```
//!
//! ### Lifecycle
//! ```text
//! add ──► validate ──► fill defaults ──► insert ──► start (arm timer)
//!
//! start    arm the adapter for the task kind; replaces a current arming
//! stop     cancel the timer, clear the last result (idempotent)
//! restart  stop + start
//! remove   stop + evict the record and its channel
//!
//! tick:
//!   ├─► TickStarting
//!   ├─► callback(context)
//!   │     └─ Err/panic ─► TickFailed (result untouched)
//!   ├─► resolve(callable → deferred → stream → plain)
//!   │     └─ Err       ─► TickFailed (result cleared)
//!   ├─► store.update(response)   ─► TaskWatch subscribers
//!   └─► TickCompleted
//! ```
//!
//! ## Features
//! | Area              | Description                                                   | Key types / traits                                |
//! |-------------------|---------------------------------------------------------------|---------------------------------------------------|
//! | **Tasks**         | Descriptors, fluent builders, callbacks and result shapes.   | [`ScheduleTask`], [`Callback`], [`TaskValue`]     |
//! | **Lifecycle**     | Batch add/remove/start/stop/restart, bootstrap, shutdown.     | [`Scheduler`], [`SchedulerBuilder`]               |
//! | **Subscriptions** | Per-task replay-last-value streams of snapshots.              | [`TaskWatch`], [`TaskSnapshot`]                   |
//! | **Resolution**    | Normalize nested callable/deferred/stream results.            | [`resolve`], [`try_resolve`]                      |
//! | **Events**        | Lifecycle events for logging and metrics.                     | [`Event`], [`Subscribe`], [`LogWriter`]           |
//! | **Errors**        | Typed validation, API and execution errors.                   | [`ValidationError`], [`SchedulerError`], [`ExecutionError`] |
//! | **Configuration** | Bus capacity, resolver depth, shutdown grace.                 | [`SchedulerConfig`]                               |
//!
//! ## Example
//! ```rust
//! use futures::StreamExt;
//! use cronvisor::{ExecutionError, Scheduler, SchedulerConfig, ScheduleTask, TaskValue};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let sched = Scheduler::new(SchedulerConfig::default());
//!
//!     sched
//!         .add(ScheduleTask::delay("answer", 10).build(|_ctx| async {
//!             Ok::<_, ExecutionError>(TaskValue::deferred(async { Ok(TaskValue::plain(42_u32)) }))
//!         }))
//!         .await?;
//!
//!     let mut watch = sched.subscribe("answer").await;
//!     while let Some(snap) = watch.next().await {
//!         if let Some(n) = snap.as_ref().and_then(|s| s.response_as::<u32>()) {
//!             assert_eq!(*n, 42);
//!             break;
//!         }
//!     }
//!
//!     sched.remove("answer").await?;
//!     Ok(())
//! }
//! ```

mod adapters;
mod config;
mod core;
mod error;
mod events;
mod resolve;
mod store;
mod subscribers;
mod tasks;
mod validate;

// ---- Public re-exports ----

pub use config::SchedulerConfig;
pub use crate::core::{IntoNames, IntoTasks, Scheduler, SchedulerBuilder};
pub use error::{ExecutionError, SchedulerError, ValidationError};
pub use events::{Bus, Event, EventKind};
pub use resolve::{resolve, try_resolve};
pub use store::{TaskStore, TaskWatch};
pub use subscribers::{LogWriter, Subscribe, SubscriberSet};
pub use tasks::{
    BoxCallbackFuture, BoxValueFuture, BoxValueStream, Callback, CallbackFn, CallbackRef,
    ContextRef, ExecutionType, ResultKind, ScheduleOptions, ScheduleTask, ScheduleTaskBuilder,
    TaskOutput, TaskSnapshot, TaskValue,
};
pub use validate::{fill_defaults, fill_defaults_at, validate_task, validate_task_at};
