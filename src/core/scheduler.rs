//! # Scheduler: lifecycle control over named tasks.
//!
//! The [`Scheduler`] owns the [`TaskStore`], the event [`Bus`] and the
//! [`SubscriberSet`]. It validates and admits tasks, arms the execution adapter
//! matching each task's kind, and exposes per-task subscriptions.
//!
//! ## Architecture
//! ```text
//! add(tasks) ──► TaskStore::admit (validate + defaults) ──► start ──► adapters::arm
//!                                                                        │
//!                        timer fires ──► Tick (tracker) ──► callback ──► resolve
//!                                                                        │
//! subscribe(name) ◄── TaskWatch ◄── watch channel ◄── TaskStore::update ◄┘
//!
//! Lifecycle events:
//!   Scheduler / Tick ── publish ──► Bus ──► subscriber_listener ──► SubscriberSet::emit
//!
//! Shutdown path (run_until_shutdown):
//!   signal ──► ShutdownRequested ──► stop every task ──► wait tracker (grace)
//!                                        ├─ drained  → AllStoppedWithinGrace
//!                                        └─ deadline → GraceExceeded
//! ```
//!
//! ## Rules
//! - Lifecycle calls are serialized; ticks are not (they may overlap, even for one task).
//! - Name-addressed calls check every name first; an unknown name fails with
//!   [`SchedulerError::NotFound`] before anything changes.
//! - Within a batch, items are processed in input order and the first failure aborts the rest.
//! - `stop` is idempotent and clears the last result.
//! - `start` on a running task replaces its arming.
//!
//! ## Example
//! ```rust,no_run
//! use cronvisor::{ExecutionError, LogWriter, Scheduler, SchedulerConfig, ScheduleTask, Subscribe, TaskValue};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let subs: Vec<Arc<dyn Subscribe>> = vec![Arc::new(LogWriter::new())];
//!     let sched = Scheduler::builder(SchedulerConfig::default())
//!         .with_subscribers(subs)
//!         .with_tasks(ScheduleTask::cron("report", "0 */5 * * * *").build(|_ctx| async {
//!             Ok::<_, ExecutionError>(TaskValue::plain("sent"))
//!         }))
//!         .build();
//!
//!     sched.bootstrap().await?;
//!     sched.run_until_shutdown().await?;
//!     Ok(())
//! }
//! ```

use std::sync::Arc;

use tokio::sync::{Mutex, broadcast};
use tokio_util::sync::CancellationToken;

use crate::adapters::{self, TickEnv};
use crate::config::SchedulerConfig;
use crate::core::batch::{IntoNames, IntoTasks};
use crate::core::builder::SchedulerBuilder;
use crate::core::shutdown;
use crate::error::SchedulerError;
use crate::events::{Bus, Event, EventKind};
use crate::store::{TaskStore, TaskWatch};
use crate::subscribers::SubscriberSet;
use crate::tasks::{ScheduleTask, TaskSnapshot};

/// In-process scheduling engine.
pub struct Scheduler {
    cfg: SchedulerConfig,
    bus: Bus,
    subs: Arc<SubscriberSet>,
    store: Arc<TaskStore>,
    env: TickEnv,
    runtime_token: CancellationToken,
    /// Serializes lifecycle calls.
    control: Mutex<()>,
    /// Registration table consumed by `bootstrap`.
    initial: Mutex<Vec<ScheduleTask>>,
}

impl Scheduler {
    /// Returns a builder.
    pub fn builder(cfg: SchedulerConfig) -> SchedulerBuilder {
        SchedulerBuilder::new(cfg)
    }

    /// Builds a scheduler without subscribers or initial tasks.
    ///
    /// Must be called inside a tokio runtime.
    pub fn new(cfg: SchedulerConfig) -> Arc<Self> {
        SchedulerBuilder::new(cfg).build()
    }

    pub(crate) fn new_internal(
        cfg: SchedulerConfig,
        bus: Bus,
        subs: Arc<SubscriberSet>,
        store: Arc<TaskStore>,
        env: TickEnv,
        initial: Vec<ScheduleTask>,
    ) -> Self {
        Self {
            cfg,
            bus,
            subs,
            store,
            env,
            runtime_token: CancellationToken::new(),
            control: Mutex::new(()),
            initial: Mutex::new(initial),
        }
    }

    /// Active configuration.
    pub fn config(&self) -> &SchedulerConfig {
        &self.cfg
    }

    /// Receiver of lifecycle events published after this call.
    pub fn events(&self) -> broadcast::Receiver<Event> {
        self.bus.subscribe()
    }

    /// Activates the registration table given to the builder.
    ///
    /// Tasks are added in ascending priority; tasks without a priority follow
    /// in the order they were given. Calling it again is a no-op.
    pub async fn bootstrap(&self) -> Result<(), SchedulerError> {
        let mut tasks = std::mem::take(&mut *self.initial.lock().await);
        tasks.sort_by_key(|task| match task.options().effective_priority() {
            Some(priority) => (false, priority),
            None => (true, 0),
        });
        self.add(tasks).await
    }

    /// Validates, inserts and starts each task in order.
    pub async fn add(&self, tasks: impl IntoTasks) -> Result<(), SchedulerError> {
        let _control = self.control.lock().await;

        for task in tasks.into_tasks() {
            let name = task.name().to_string();
            let kind = task.kind();

            self.store.admit(task).await?;
            self.bus.publish(
                Event::new(EventKind::TaskAdded)
                    .with_task(name.as_str())
                    .with_reason(kind.as_str()),
            );
            self.start_one(&name).await;
        }
        Ok(())
    }

    /// Stops the tasks and evicts them with their subscription channels.
    pub async fn remove(&self, names: impl IntoNames) -> Result<(), SchedulerError> {
        let _control = self.control.lock().await;

        for name in self.resolve_names(names).await? {
            if let Some(record) = self.store.remove(&name).await {
                if let Some(handle) = record.handle {
                    handle.disarm();
                }
                self.bus
                    .publish(Event::new(EventKind::TaskRemoved).with_task(name.as_str()));
            }
        }
        Ok(())
    }

    /// Cancels the tasks' timers and clears their last result.
    pub async fn stop(&self, names: impl IntoNames) -> Result<(), SchedulerError> {
        let _control = self.control.lock().await;

        for name in self.resolve_names(names).await? {
            self.stop_one(&name).await;
        }
        Ok(())
    }

    /// Arms the tasks' timers, replacing any current arming.
    pub async fn start(&self, names: impl IntoNames) -> Result<(), SchedulerError> {
        let _control = self.control.lock().await;

        for name in self.resolve_names(names).await? {
            self.start_one(&name).await;
        }
        Ok(())
    }

    /// Stops then starts each task, one after another.
    pub async fn restart(&self, names: impl IntoNames) -> Result<(), SchedulerError> {
        let _control = self.control.lock().await;

        for name in self.resolve_names(names).await? {
            self.stop_one(&name).await;
            self.start_one(&name).await;
        }
        Ok(())
    }

    /// Subscribes to snapshots of `name`; see [`TaskWatch`].
    pub async fn subscribe(&self, name: &str) -> TaskWatch {
        self.store.subscribe(name).await
    }

    /// Snapshots of every task, sorted by name.
    pub async fn list(&self) -> Vec<TaskSnapshot> {
        self.store.list().await
    }

    /// Snapshot of `name`, if registered.
    pub async fn get(&self, name: &str) -> Option<TaskSnapshot> {
        self.store.get(name).await
    }

    /// True if `name` is registered.
    pub async fn exist(&self, name: &str) -> bool {
        self.store.exist(name).await
    }

    /// Sorted names of registered tasks.
    pub async fn names(&self) -> Vec<String> {
        self.store.names().await
    }

    /// Number of registered tasks.
    pub async fn len(&self) -> usize {
        self.store.len().await
    }

    /// True if no task is registered.
    pub async fn is_empty(&self) -> bool {
        self.store.is_empty().await
    }

    /// Waits for a termination signal, then performs [`Scheduler::shutdown`].
    pub async fn run_until_shutdown(&self) -> Result<(), SchedulerError> {
        let signal = shutdown::wait_for_shutdown_signal()
            .await
            .map_err(|e| SchedulerError::Signal {
                reason: e.to_string(),
            })?;

        tracing::info!(%signal, "termination signal received");
        self.bus
            .publish(Event::new(EventKind::ShutdownRequested).with_reason(signal.to_string()));
        self.shutdown().await
    }

    /// Stops every task and waits up to [`SchedulerConfig::grace`] for in-flight ticks.
    ///
    /// Tasks stay registered and can be started again afterwards.
    pub async fn shutdown(&self) -> Result<(), SchedulerError> {
        {
            let _control = self.control.lock().await;
            for name in self.store.names().await {
                self.stop_one(&name).await;
            }
        }

        let tracker = &self.env.tracker;
        tracker.close();
        let drained = tokio::time::timeout(self.cfg.grace, tracker.wait()).await;
        tracker.reopen();

        match drained {
            Ok(()) => {
                self.bus.publish(Event::new(EventKind::AllStoppedWithinGrace));
                Ok(())
            }
            Err(_elapsed) => {
                let in_flight = tracker.len();
                self.bus.publish(
                    Event::new(EventKind::GraceExceeded).with_reason(in_flight.to_string()),
                );
                Err(SchedulerError::GraceExceeded {
                    grace: self.cfg.grace,
                    in_flight,
                })
            }
        }
    }

    /// Forwards bus events to the subscriber set until the scheduler is dropped.
    pub(crate) fn subscriber_listener(&self) {
        let mut rx = self.bus.subscribe();
        let set = Arc::clone(&self.subs);
        let token = self.runtime_token.clone();

        tokio::spawn(async move {
            loop {
                tokio::select! {
                    _ = token.cancelled() => break,
                    msg = rx.recv() => match msg {
                        Ok(ev) => set.emit(&ev),
                        Err(broadcast::error::RecvError::Lagged(skipped)) => {
                            tracing::warn!(skipped, "subscriber listener lagged behind the bus");
                        }
                        Err(broadcast::error::RecvError::Closed) => break,
                    }
                }
            }
        });
    }

    async fn resolve_names(&self, names: impl IntoNames) -> Result<Vec<String>, SchedulerError> {
        let names = names.into_names();
        match self.store.first_missing(&names).await {
            Some(missing) => Err(SchedulerError::NotFound {
                name: missing.to_string(),
            }),
            None => Ok(names),
        }
    }

    async fn start_one(&self, name: &str) {
        let token = self.runtime_token.child_token();
        let env = &self.env;

        let replaced = self
            .store
            .update(name, |rec| {
                let handle = adapters::arm(&rec.task, rec.generation, env, token);
                rec.handle.replace(handle)
            })
            .await;

        if let Some(previous) = replaced {
            if let Some(handle) = previous {
                handle.disarm();
            }
            self.bus
                .publish(Event::new(EventKind::TaskStarted).with_task(name));
        }
    }

    async fn stop_one(&self, name: &str) {
        let taken = self
            .store
            .update(name, |rec| {
                rec.response = None;
                rec.handle.take()
            })
            .await
            .flatten();

        if let Some(handle) = taken {
            handle.disarm();
            self.bus
                .publish(Event::new(EventKind::TaskStopped).with_task(name));
        }
    }
}

impl Drop for Scheduler {
    fn drop(&mut self) {
        self.runtime_token.cancel();
    }
}
