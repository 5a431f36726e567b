use std::sync::Arc;

use tokio_util::task::TaskTracker;

use crate::{
    adapters::TickEnv,
    config::SchedulerConfig,
    core::batch::IntoTasks,
    events::Bus,
    store::TaskStore,
    subscribers::{Subscribe, SubscriberSet},
    tasks::ScheduleTask,
};

use super::scheduler::Scheduler;

/// Builder for a [`Scheduler`] with subscribers and a registration table.
pub struct SchedulerBuilder {
    cfg: SchedulerConfig,
    subscribers: Vec<Arc<dyn Subscribe>>,
    tasks: Vec<ScheduleTask>,
}

impl SchedulerBuilder {
    /// Creates a new builder with the given configuration.
    pub fn new(cfg: SchedulerConfig) -> Self {
        Self {
            cfg,
            subscribers: Vec::new(),
            tasks: Vec::new(),
        }
    }

    /// Sets event subscribers.
    ///
    /// Subscribers receive lifecycle events through dedicated workers with bounded queues.
    pub fn with_subscribers(mut self, subscribers: Vec<Arc<dyn Subscribe>>) -> Self {
        self.subscribers = subscribers;
        self
    }

    /// Appends tasks to the registration table activated by
    /// [`Scheduler::bootstrap`].
    pub fn with_tasks(mut self, tasks: impl IntoTasks) -> Self {
        self.tasks.extend(tasks.into_tasks());
        self
    }

    /// Builds the scheduler. Must be called inside a tokio runtime.
    ///
    /// Initializes the event bus, the task store, the subscriber workers and
    /// the listener forwarding bus events to them. Nothing is armed until
    /// `bootstrap` or `add` runs.
    pub fn build(self) -> Arc<Scheduler> {
        let bus = Bus::new(self.cfg.bus_capacity_clamped());
        let subs = Arc::new(SubscriberSet::new(self.subscribers, bus.clone()));
        let store = Arc::new(TaskStore::new());

        let env = TickEnv {
            store: Arc::clone(&store),
            bus: bus.clone(),
            depth_limit: self.cfg.resolve_depth_limit(),
            tracker: TaskTracker::new(),
        };

        let sched = Arc::new(Scheduler::new_internal(
            self.cfg, bus, subs, store, env, self.tasks,
        ));
        sched.subscriber_listener();
        sched
    }
}
