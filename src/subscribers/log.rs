//! # LogWriter: event logger
//!
//! A subscriber that forwards every [`Event`] to `tracing`, so scheduler
//! activity lands in whatever collector the host installed.
//!
//! ## Example output (fmt collector)
//! ```text
//! INFO  cronvisor: task added task="nightly" kind="Cron"
//! INFO  cronvisor: task started task="nightly"
//! DEBUG cronvisor: tick starting task="nightly"
//! WARN  cronvisor: tick failed task="nightly" reason="callback failed: boom"
//! INFO  cronvisor: task removed task="nightly"
//! ```

use async_trait::async_trait;
use tracing::{debug, info, warn};

use crate::events::{Event, EventKind};
use crate::subscribers::Subscribe;

/// Event writer subscriber.
#[derive(Default)]
pub struct LogWriter;

impl LogWriter {
    /// Construct a new [`LogWriter`].
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Subscribe for LogWriter {
    async fn on_event(&self, e: &Event) {
        let task = e.task.as_deref().unwrap_or("-");
        let reason = e.reason.as_deref().unwrap_or("-");

        match e.kind {
            EventKind::TaskAdded => info!(target: "cronvisor", task, kind = reason, "task added"),
            EventKind::TaskStarted => info!(target: "cronvisor", task, "task started"),
            EventKind::TaskStopped => info!(target: "cronvisor", task, "task stopped"),
            EventKind::TaskRemoved => info!(target: "cronvisor", task, "task removed"),
            EventKind::TickStarting => debug!(target: "cronvisor", task, "tick starting"),
            EventKind::TickCompleted => debug!(target: "cronvisor", task, "tick completed"),
            EventKind::TickFailed => warn!(target: "cronvisor", task, reason, "tick failed"),
            EventKind::ShutdownRequested => info!(target: "cronvisor", "shutdown requested"),
            EventKind::AllStoppedWithinGrace => info!(target: "cronvisor", "all ticks finished within grace"),
            EventKind::GraceExceeded => {
                warn!(target: "cronvisor", in_flight = reason, "grace exceeded")
            }
            EventKind::SubscriberOverflow => {
                warn!(target: "cronvisor", subscriber = task, reason, "subscriber overflow")
            }
            EventKind::SubscriberPanicked => {
                warn!(target: "cronvisor", subscriber = task, reason, "subscriber panicked")
            }
        }
    }

    fn name(&self) -> &'static str {
        "LogWriter"
    }
}
