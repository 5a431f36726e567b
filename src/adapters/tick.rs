//! # Wrapped-callback procedure run on every trigger.
//!
//! ```text
//! fire() ─► tracker.spawn(run):
//!   publish TickStarting
//!   invoke callback(context)
//!     ├─ Err / panic ─► warn! + TickFailed, result untouched, done
//!     └─ Ok(value)   ─► try_resolve(value, depth_limit)
//!                         ├─ Ok(out) ─► response = out
//!                         └─ Err     ─► warn! + TickFailed, response = None
//!   store.update_current(name, generation)   (no-op if the task was removed
//!                                             or re-added meanwhile)
//!   publish TickCompleted
//! ```

use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::FutureExt;
use tokio_util::task::TaskTracker;

use crate::error::ExecutionError;
use crate::events::{Bus, Event, EventKind};
use crate::resolve::try_resolve;
use crate::store::TaskStore;
use crate::subscribers::panic_message;
use crate::tasks::{CallbackRef, ContextRef, ScheduleTask};

/// Shared environment of every tick.
#[derive(Clone)]
pub(crate) struct TickEnv {
    pub(crate) store: Arc<TaskStore>,
    pub(crate) bus: Bus,
    pub(crate) depth_limit: Option<usize>,
    /// Tracks in-flight ticks for graceful shutdown.
    pub(crate) tracker: TaskTracker,
}

impl TickEnv {
    fn report(&self, name: &Arc<str>, err: &ExecutionError) {
        tracing::warn!(task = %name, error = %err, label = err.as_label(), "tick failed");
        self.bus.publish(
            Event::new(EventKind::TickFailed)
                .with_task(Arc::clone(name))
                .with_reason(err.to_string()),
        );
    }
}

/// One task's callback, bound to its context, ready to fire.
#[derive(Clone)]
pub(crate) struct Tick {
    env: TickEnv,
    name: Arc<str>,
    generation: u64,
    callback: CallbackRef,
    context: Option<ContextRef>,
}

impl Tick {
    pub(crate) fn new(env: TickEnv, task: &ScheduleTask, generation: u64) -> Self {
        Self {
            env,
            name: Arc::from(task.name()),
            generation,
            callback: Arc::clone(task.callback()),
            context: task.context().cloned(),
        }
    }

    pub(crate) fn name(&self) -> &str {
        &self.name
    }

    /// Runs the procedure detached from the caller.
    pub(crate) fn fire(&self) {
        self.env.tracker.spawn(self.clone().run());
    }

    pub(crate) async fn run(self) {
        let Tick {
            env,
            name,
            generation,
            callback,
            context,
        } = self;
        env.bus
            .publish(Event::new(EventKind::TickStarting).with_task(Arc::clone(&name)));

        let invoked = AssertUnwindSafe(async move { callback.invoke(context).await })
            .catch_unwind()
            .await;
        let value = match invoked {
            Ok(Ok(value)) => value,
            Ok(Err(err)) => return env.report(&name, &err),
            Err(payload) => {
                let err = ExecutionError::fail(format!("panicked: {}", panic_message(&*payload)));
                return env.report(&name, &err);
            }
        };

        let response = match try_resolve(value, env.depth_limit).await {
            Ok(out) => out,
            Err(err) => {
                env.report(&name, &err);
                None
            }
        };

        let written = env
            .store
            .update_current(&name, generation, |rec| rec.response = response)
            .await;
        if written.is_none() {
            tracing::debug!(task = %name, generation, "task removed or replaced, result dropped");
            return;
        }
        env.bus
            .publish(Event::new(EventKind::TickCompleted).with_task(name));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tasks::{TaskOutput, TaskValue};

    fn env() -> TickEnv {
        TickEnv {
            store: Arc::new(TaskStore::new()),
            bus: Bus::new(64),
            depth_limit: None,
            tracker: TaskTracker::new(),
        }
    }

    async fn admitted(env: &TickEnv, task: ScheduleTask) -> Tick {
        let generation = env.store.admit(task.clone()).await.unwrap();
        Tick::new(env.clone(), &task, generation)
    }

    #[tokio::test]
    async fn test_result_is_written_and_completed() {
        let env = env();
        let mut rx = env.bus.subscribe();
        let tick = admitted(
            &env,
            ScheduleTask::delay("ok", 0).build(|_ctx| async {
                Ok(TaskValue::deferred(async { Ok(TaskValue::plain(42_i32)) }))
            }),
        )
        .await;

        tick.run().await;

        let snap = env.store.get("ok").await.unwrap();
        assert_eq!(snap.response_as::<i32>(), Some(&42));
        assert_eq!(rx.recv().await.unwrap().kind, EventKind::TickStarting);
        assert_eq!(rx.recv().await.unwrap().kind, EventKind::TickCompleted);
    }

    #[tokio::test]
    async fn test_callback_failure_keeps_previous_result() {
        let env = env();
        let tick = admitted(
            &env,
            ScheduleTask::delay("bad", 0).build(|_ctx| async { Err(ExecutionError::fail("boom")) }),
        )
        .await;
        env.store
            .update("bad", |rec| rec.response = Some(TaskOutput::new(1_u8)))
            .await;
        let mut rx = env.bus.subscribe();

        tick.run().await;

        assert_eq!(env.store.get("bad").await.unwrap().response_as::<u8>(), Some(&1));
        assert_eq!(rx.recv().await.unwrap().kind, EventKind::TickStarting);
        let failed = rx.recv().await.unwrap();
        assert_eq!(failed.kind, EventKind::TickFailed);
        assert_eq!(failed.reason.as_deref(), Some("callback failed: boom"));
    }

    async fn explode(_ctx: Option<ContextRef>) -> Result<TaskValue, ExecutionError> {
        panic!("oops")
    }

    #[tokio::test]
    async fn test_panicking_callback_is_contained() {
        let env = env();
        let mut rx = env.bus.subscribe();
        let tick = admitted(
            &env,
            ScheduleTask::delay("panics", 0).build(explode),
        )
        .await;

        tick.run().await;

        rx.recv().await.unwrap();
        let failed = rx.recv().await.unwrap();
        assert_eq!(failed.kind, EventKind::TickFailed);
        assert_eq!(failed.reason.as_deref(), Some("callback failed: panicked: oops"));
    }

    #[tokio::test]
    async fn test_failed_deferred_writes_absent_result() {
        let env = env();
        let tick = admitted(
            &env,
            ScheduleTask::delay("deferred", 0).build(|_ctx| async {
                Ok(TaskValue::deferred(async { Err(ExecutionError::fail("db down")) }))
            }),
        )
        .await;
        env.store
            .update("deferred", |rec| rec.response = Some(TaskOutput::new(1_u8)))
            .await;

        tick.run().await;

        assert!(env.store.get("deferred").await.unwrap().response.is_none());
    }

    #[tokio::test]
    async fn test_late_tick_after_removal_is_dropped() {
        let env = env();
        let tick = admitted(
            &env,
            ScheduleTask::delay("gone", 0).build(|_ctx| async { Ok(TaskValue::plain(1_u8)) }),
        )
        .await;
        env.store.remove("gone").await;
        let mut rx = env.bus.subscribe();

        tick.run().await;

        assert!(!env.store.exist("gone").await);
        assert_eq!(rx.recv().await.unwrap().kind, EventKind::TickStarting);
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_late_tick_skips_readded_task() {
        let env = env();
        let tick = admitted(
            &env,
            ScheduleTask::delay("t", 0).build(|_ctx| async { Ok(TaskValue::plain("old")) }),
        )
        .await;
        env.store.remove("t").await;
        admitted(
            &env,
            ScheduleTask::interval("t", 1_000).build(|_ctx| async { Ok(TaskValue::plain("new")) }),
        )
        .await;
        let mut watch = env.store.subscribe("t").await;
        let mut rx = env.bus.subscribe();

        tick.run().await;

        let snap = env.store.get("t").await.unwrap();
        assert!(snap.response.is_none());
        assert_eq!(snap.kind, crate::tasks::ExecutionType::Interval);
        assert!(watch.latest().unwrap().response.is_none());
        assert_eq!(rx.recv().await.unwrap().kind, EventKind::TickStarting);
        assert!(rx.try_recv().is_err());
    }
}
