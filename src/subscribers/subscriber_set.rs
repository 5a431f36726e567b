//! # Fan-out of lifecycle events to subscribers.
//!
//! [`SubscriberSet`] gives every [`Subscribe`] implementation its own bounded
//! queue and worker, so one slow or broken subscriber never holds back the
//! scheduler or its peers.
//!
//! ```text
//! emit(event) ─┬─► [queue: LogWriter] ──► worker ──► on_event()
//!              ├─► [queue: metrics]   ──► worker ──► on_event()
//!              └─► [queue: ...]       ──► worker ──► on_event()
//!                        │                   │
//!                   full/closed           panicked
//!                        ▼                   ▼
//!              Bus: SubscriberOverflow  Bus: SubscriberPanicked
//! ```
//!
//! ## Rules
//! - `emit()` never awaits (`try_send`); a full queue drops the event for that subscriber only.
//! - Each subscriber sees events in FIFO order; there is no ordering across subscribers.
//! - A panicking `on_event` is caught (`AssertUnwindSafe` + `catch_unwind`) and the worker moves on.
//! - Overflow notices are never re-reported when they themselves overflow.

use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::FutureExt;
use tokio::{sync::mpsc, task::JoinHandle};

use crate::events::{Bus, Event, EventKind};
use crate::subscribers::Subscribe;

/// Queue feeding one subscriber worker.
struct Lane {
    name: &'static str,
    tx: mpsc::Sender<Arc<Event>>,
}

/// Per-subscriber queues and workers.
pub struct SubscriberSet {
    lanes: Vec<Lane>,
    workers: Vec<JoinHandle<()>>,
    bus: Bus,
}

impl SubscriberSet {
    /// Spawns one worker per subscriber. Requires a running tokio runtime.
    #[must_use]
    pub fn new(subs: Vec<Arc<dyn Subscribe>>, bus: Bus) -> Self {
        let mut lanes = Vec::with_capacity(subs.len());
        let mut workers = Vec::with_capacity(subs.len());

        for sub in subs {
            let (tx, rx) = mpsc::channel::<Arc<Event>>(sub.queue_capacity().max(1));
            lanes.push(Lane {
                name: sub.name(),
                tx,
            });
            workers.push(tokio::spawn(drain(sub, rx, bus.clone())));
        }

        Self {
            lanes,
            workers,
            bus,
        }
    }

    /// Queues `event` for every subscriber without waiting.
    pub fn emit(&self, event: &Event) {
        let event = Arc::new(event.clone());
        let is_overflow = event.kind == EventKind::SubscriberOverflow;

        for lane in &self.lanes {
            let reason = match lane.tx.try_send(Arc::clone(&event)) {
                Ok(()) => continue,
                Err(mpsc::error::TrySendError::Full(_)) => "full",
                Err(mpsc::error::TrySendError::Closed(_)) => "closed",
            };
            if !is_overflow {
                self.bus.publish(Event::subscriber_overflow(lane.name, reason));
            }
        }
    }

    /// Number of registered subscribers.
    pub fn len(&self) -> usize {
        self.lanes.len()
    }

    /// True if no subscribers are registered.
    pub fn is_empty(&self) -> bool {
        self.lanes.is_empty()
    }

    /// Closes every queue and waits for the workers to finish what they hold.
    pub async fn shutdown(self) {
        drop(self.lanes);
        for worker in self.workers {
            let _ = worker.await;
        }
    }
}

async fn drain(sub: Arc<dyn Subscribe>, mut rx: mpsc::Receiver<Arc<Event>>, bus: Bus) {
    while let Some(ev) = rx.recv().await {
        let delivered = AssertUnwindSafe(sub.on_event(&ev)).catch_unwind().await;
        if let Err(payload) = delivered {
            bus.publish(Event::subscriber_panicked(sub.name(), panic_message(&*payload)));
        }
    }
}

/// Extracts a printable message from a panic payload.
pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(msg) = payload.downcast_ref::<&'static str>() {
        (*msg).to_string()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::time::Duration;

    struct Exploding;

    #[async_trait]
    impl Subscribe for Exploding {
        async fn on_event(&self, _ev: &Event) {
            panic!("kaboom");
        }

        fn name(&self) -> &'static str {
            "exploding"
        }
    }

    #[tokio::test]
    async fn test_panic_is_reported_on_bus() {
        let bus = Bus::new(16);
        let mut rx = bus.subscribe();
        let set = SubscriberSet::new(vec![Arc::new(Exploding)], bus.clone());

        set.emit(&Event::new(EventKind::TaskAdded));

        let ev = tokio::time::timeout(Duration::from_secs(1), rx.recv())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(ev.kind, EventKind::SubscriberPanicked);
        assert_eq!(ev.task.as_deref(), Some("exploding"));
        assert_eq!(ev.reason.as_deref(), Some("kaboom"));

        set.shutdown().await;
    }
}
