//! # Task store and per-task subscription channels.
//!
//! [`TaskStore`] maps task names to their records and keeps one
//! [`tokio::sync::watch`] channel per observed name. The channel caches the
//! last pushed snapshot, so a late subscriber gets it immediately.
//!
//! ```text
//!               ┌──────────────── TaskStore (RwLock) ────────────────┐
//!   admit() ───►│ records:  name → TaskRecord { task, handle, resp } │
//!   update() ──►│                      │ snapshot()                  │
//!   remove() ──►│ channels: name → watch::Sender<Option<Snapshot>> ──┼──► TaskWatch (replay + updates)
//!               └────────────────────────────────────────────────────┘
//! ```
//!
//! ## Rules
//! - Every mutation of a record pushes its new snapshot to the channel, if one exists.
//! - `subscribe()` creates the channel lazily, seeded with the current snapshot (or `None`).
//! - `remove()` drops both the record and the channel; open subscriptions end.
//! - `update()` on an absent name is a silent no-op (late tick after removal).
//! - Each admission gets a fresh generation; `update_current()` ignores records
//!   admitted after the caller's generation (late tick after remove + re-add).
//! - Channels of names that are never registered stay until `remove()` is called
//!   for that name.

mod record;
mod watch;

use std::collections::HashMap;

use tokio::sync::{RwLock, watch as channel};

use crate::error::ValidationError;
use crate::tasks::{ScheduleTask, TaskSnapshot};
use crate::validate::{fill_defaults, validate_task};

pub(crate) use record::TaskRecord;
pub use watch::TaskWatch;

#[derive(Default)]
struct State {
    records: HashMap<String, TaskRecord>,
    channels: HashMap<String, channel::Sender<Option<TaskSnapshot>>>,
    generation: u64,
}

impl State {
    fn push(&self, name: &str, snapshot: Option<TaskSnapshot>) {
        if let Some(tx) = self.channels.get(name) {
            tx.send_replace(snapshot);
        }
    }
}

/// Registry of tasks and their subscription channels.
#[derive(Default)]
pub struct TaskStore {
    state: RwLock<State>,
}

impl TaskStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Validates `task` against the registered ones, fills its defaults and inserts it.
    ///
    /// Returns the generation assigned to the new record.
    pub(crate) async fn admit(&self, mut task: ScheduleTask) -> Result<u64, ValidationError> {
        let mut guard = self.state.write().await;
        let state = &mut *guard;

        validate_task(
            task.kind(),
            task.name(),
            task.options(),
            state
                .records
                .iter()
                .map(|(name, rec)| (name.as_str(), rec.task.options())),
        )?;
        fill_defaults(&mut task);

        state.generation += 1;
        let generation = state.generation;
        let name = task.name().to_string();
        let record = TaskRecord::new(task, generation);
        let snapshot = record.snapshot();
        state.records.insert(name.clone(), record);
        state.push(&name, Some(snapshot));
        Ok(generation)
    }

    /// Applies `f` to the record of `name` and pushes the resulting snapshot.
    ///
    /// Returns `None` without side effects if the task is absent.
    pub(crate) async fn update<R>(&self, name: &str, f: impl FnOnce(&mut TaskRecord) -> R) -> Option<R> {
        let mut guard = self.state.write().await;
        let state = &mut *guard;

        let record = state.records.get_mut(name)?;
        let out = f(record);
        let snapshot = record.snapshot();
        state.push(name, Some(snapshot));
        Some(out)
    }

    /// Like [`TaskStore::update`], but only if `name` still holds the record of `generation`.
    pub(crate) async fn update_current<R>(
        &self,
        name: &str,
        generation: u64,
        f: impl FnOnce(&mut TaskRecord) -> R,
    ) -> Option<R> {
        let mut guard = self.state.write().await;
        let state = &mut *guard;

        let record = state
            .records
            .get_mut(name)
            .filter(|rec| rec.generation == generation)?;
        let out = f(record);
        let snapshot = record.snapshot();
        state.push(name, Some(snapshot));
        Some(out)
    }

    /// Evicts `name` from the store and closes its channel, registered or not.
    pub(crate) async fn remove(&self, name: &str) -> Option<TaskRecord> {
        let mut state = self.state.write().await;
        state.channels.remove(name);
        state.records.remove(name)
    }

    /// Subscribes to snapshots of `name`. The name does not have to exist yet;
    /// the channel then lives until the name is removed.
    pub async fn subscribe(&self, name: &str) -> TaskWatch {
        let mut guard = self.state.write().await;
        let state = &mut *guard;

        if let Some(tx) = state.channels.get(name) {
            return TaskWatch::new(tx.subscribe());
        }

        let current = state.records.get(name).map(TaskRecord::snapshot);
        let (tx, rx) = channel::channel(current);
        state.channels.insert(name.to_string(), tx);
        TaskWatch::new(rx)
    }

    /// Snapshot of `name`, if registered.
    pub async fn get(&self, name: &str) -> Option<TaskSnapshot> {
        self.state.read().await.records.get(name).map(TaskRecord::snapshot)
    }

    /// True if `name` is registered.
    pub async fn exist(&self, name: &str) -> bool {
        self.state.read().await.records.contains_key(name)
    }

    /// Returns the first of `names` that is not registered.
    pub(crate) async fn first_missing<'a>(&self, names: &'a [String]) -> Option<&'a str> {
        let state = self.state.read().await;
        names
            .iter()
            .find(|name| !state.records.contains_key(name.as_str()))
            .map(String::as_str)
    }

    /// Number of registered tasks.
    pub async fn len(&self) -> usize {
        self.state.read().await.records.len()
    }

    /// True if no task is registered.
    pub async fn is_empty(&self) -> bool {
        self.state.read().await.records.is_empty()
    }

    /// Sorted names of registered tasks.
    pub async fn names(&self) -> Vec<String> {
        let state = self.state.read().await;
        let mut names: Vec<String> = state.records.keys().cloned().collect();
        names.sort_unstable();
        names
    }

    /// Snapshots of every registered task, sorted by name.
    pub async fn list(&self) -> Vec<TaskSnapshot> {
        let state = self.state.read().await;
        let mut list: Vec<TaskSnapshot> = state.records.values().map(TaskRecord::snapshot).collect();
        list.sort_unstable_by(|a, b| a.name.cmp(&b.name));
        list
    }
}
