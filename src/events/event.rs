//! # Runtime events emitted by the scheduler and its ticks.
//!
//! The [`EventKind`] enum classifies event types across three categories:
//! - **Management events**: task registry changes (added, started, stopped, removed)
//! - **Tick events**: one trigger of a task (starting, completed, failed)
//! - **Runtime events**: shutdown and subscriber health
//!
//! The [`Event`] struct carries additional metadata such as timestamps, task name and reasons.
//!
//! ## Ordering guarantees
//! Each event has a globally unique sequence number (`seq`) that increases monotonically.
//! Use `seq` to restore the exact order when events are delivered out of order.
//!
//! ## Example
//! ```rust
//! use cronvisor::{Event, EventKind};
//!
//! let ev = Event::new(EventKind::TickFailed)
//!     .with_task("nightly-report")
//!     .with_reason("callback failed: boom");
//!
//! assert_eq!(ev.kind, EventKind::TickFailed);
//! assert_eq!(ev.task.as_deref(), Some("nightly-report"));
//! assert_eq!(ev.reason.as_deref(), Some("callback failed: boom"));
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::time::SystemTime;

/// Global sequence counter for event ordering.
static EVENT_SEQ: AtomicU64 = AtomicU64::new(0);

/// Classification of runtime events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    // === Subscriber events ===
    /// Subscriber panicked during event processing.
    ///
    /// Sets:
    /// - `task`: subscriber name
    /// - `reason`: panic info/message
    SubscriberPanicked,

    /// Subscriber dropped an event (queue full or worker closed).
    ///
    /// Sets:
    /// - `task`: subscriber name
    /// - `reason`: reason string (e.g., "full", "closed")
    SubscriberOverflow,

    // === Shutdown events ===
    /// Shutdown requested (OS signal observed).
    ShutdownRequested,

    /// Every in-flight tick finished within the grace period.
    AllStoppedWithinGrace,

    /// Grace period elapsed while ticks were still running.
    ///
    /// Sets:
    /// - `reason`: number of ticks still in flight
    GraceExceeded,

    // === Task management events ===
    /// Task validated and inserted into the store.
    ///
    /// Sets:
    /// - `task`: task name
    /// - `reason`: trigger kind
    TaskAdded,

    /// Timer armed for the task.
    ///
    /// Sets:
    /// - `task`: task name
    TaskStarted,

    /// Timer cancelled for the task (in-flight ticks keep running).
    ///
    /// Sets:
    /// - `task`: task name
    TaskStopped,

    /// Task evicted from the store and its channel closed.
    ///
    /// Sets:
    /// - `task`: task name
    TaskRemoved,

    // === Tick events ===
    /// A trigger fired and the callback is being invoked.
    ///
    /// Sets:
    /// - `task`: task name
    TickStarting,

    /// The tick finished and its resolved result was published.
    ///
    /// Sets:
    /// - `task`: task name
    TickCompleted,

    /// The callback, or a value it returned, failed.
    ///
    /// Sets:
    /// - `task`: task name
    /// - `reason`: failure message
    TickFailed,
}

/// Runtime event with optional metadata.
///
/// - `seq`: monotonic global sequence for ordering
/// - `at`: wall-clock timestamp (for logs)
/// - other optional fields are set depending on the [`EventKind`]
#[derive(Clone, Debug)]
pub struct Event {
    /// Globally unique, monotonically increasing sequence number.
    pub seq: u64,
    /// Wall-clock timestamp.
    pub at: SystemTime,
    /// Event classification.
    pub kind: EventKind,
    /// Name of the task, if applicable.
    pub task: Option<Arc<str>>,
    /// Human-readable reason (errors, overflow details, etc.).
    pub reason: Option<Arc<str>>,
}

impl Event {
    /// Creates a new event of the given kind with current timestamp and next sequence number.
    pub fn new(kind: EventKind) -> Self {
        Self {
            seq: EVENT_SEQ.fetch_add(1, AtomicOrdering::Relaxed),
            at: SystemTime::now(),
            kind,
            task: None,
            reason: None,
        }
    }

    /// Attaches a human-readable reason.
    #[inline]
    pub fn with_reason(mut self, reason: impl Into<Arc<str>>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    /// Attaches a task name.
    #[inline]
    pub fn with_task(mut self, task: impl Into<Arc<str>>) -> Self {
        self.task = Some(task.into());
        self
    }

    /// Creates a subscriber overflow event.
    #[inline]
    pub fn subscriber_overflow(subscriber: &'static str, reason: &'static str) -> Self {
        Event::new(EventKind::SubscriberOverflow)
            .with_task(subscriber)
            .with_reason(format!("subscriber={subscriber} reason={reason}"))
    }

    /// Creates a subscriber panic event.
    #[inline]
    pub fn subscriber_panicked(subscriber: &'static str, info: String) -> Self {
        Event::new(EventKind::SubscriberPanicked)
            .with_task(subscriber)
            .with_reason(info)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seq_is_monotonic() {
        let a = Event::new(EventKind::TaskAdded);
        let b = Event::new(EventKind::TaskStarted);
        assert!(b.seq > a.seq);
    }
}
