use std::pin::Pin;
use std::task::{Context, Poll};

use futures::Stream;
use tokio::sync::watch;
use tokio_stream::wrappers::WatchStream;

use crate::tasks::TaskSnapshot;

/// Subscription to one task's snapshots.
///
/// Yields the current snapshot first (`None` if the task does not exist yet),
/// then every later update. A consumer that falls behind skips straight to the
/// newest snapshot. The stream ends once the task is removed.
///
/// ## Example
/// ```rust,no_run
/// use futures::StreamExt;
/// # async fn demo(sched: &cronvisor::Scheduler) {
/// let mut watch = sched.subscribe("report").await;
/// while let Some(snap) = watch.next().await {
///     if let Some(n) = snap.as_ref().and_then(|s| s.response_as::<u64>()) {
///         println!("report produced {n}");
///     }
/// }
/// # }
/// ```
pub struct TaskWatch {
    rx: watch::Receiver<Option<TaskSnapshot>>,
    stream: WatchStream<Option<TaskSnapshot>>,
}

impl TaskWatch {
    pub(crate) fn new(rx: watch::Receiver<Option<TaskSnapshot>>) -> Self {
        Self {
            stream: WatchStream::new(rx.clone()),
            rx,
        }
    }

    /// Most recent snapshot, without waiting.
    pub fn latest(&self) -> Option<TaskSnapshot> {
        self.rx.borrow().clone()
    }

    /// True once the task was removed and no further snapshot will arrive.
    pub fn is_closed(&self) -> bool {
        self.rx.has_changed().is_err()
    }
}

impl Stream for TaskWatch {
    type Item = Option<TaskSnapshot>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        Pin::new(&mut self.stream).poll_next(cx)
    }
}
