//! # Execution adapters: one timer loop per trigger kind.
//!
//! [`arm`] spawns the loop matching the task's [`ExecutionType`] and returns a
//! [`TaskHandle`]. Each trigger hands a [`Tick`] to a task tracker so that ticks
//! run detached from the loop and may overlap.
//!
//! ```text
//! Cron      upcoming(expr, tz) ─► sleep until next ─► fire ─► repeat
//! Interval  interval(ms)       ─► tick             ─► fire ─► repeat
//! Delay     sleep(ms)          ─► fire             ─► done
//! RunAt     sleep(runAt - now) ─► fire             ─► done
//! ```
//!
//! ## Rules
//! - Disarming cancels the loop only; ticks already fired run to completion.
//! - A one-shot loop ends after it fires; the task stays registered.
//! - Interval periods below 1 ms are raised to 1 ms.

mod cron;
mod delay;
mod interval;
mod tick;

use std::time::Duration;

use chrono::Utc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::tasks::{ExecutionType, ScheduleOptions, ScheduleTask};
use crate::validate::{parse_time_zone, run_at_delay_ms};

pub(crate) use tick::{Tick, TickEnv};

/// Armed timer of one task.
pub(crate) struct TaskHandle {
    cancel: CancellationToken,
    join: JoinHandle<()>,
}

impl TaskHandle {
    /// True until the handle is disarmed or a one-shot timer fired.
    pub(crate) fn is_armed(&self) -> bool {
        !self.cancel.is_cancelled() && !self.join.is_finished()
    }

    /// Cancels the timer loop. In-flight ticks are not affected.
    pub(crate) fn disarm(self) {
        self.cancel.cancel();
    }
}

/// Spawns the timer loop for `task`.
///
/// `token` should be a child of the scheduler's runtime token; `generation`
/// is the store record the ticks write to.
pub(crate) fn arm(
    task: &ScheduleTask,
    generation: u64,
    env: &TickEnv,
    token: CancellationToken,
) -> TaskHandle {
    let tick = Tick::new(env.clone(), task, generation);
    let opts = task.options();

    let join = match task.kind() {
        ExecutionType::Cron => tokio::spawn(cron::run(
            opts.cron_time.clone().unwrap_or_default(),
            opts.time_zone.as_deref().and_then(parse_time_zone),
            tick,
            token.clone(),
        )),
        ExecutionType::Interval => tokio::spawn(interval::run(millis(opts.ms), tick, token.clone())),
        ExecutionType::Delay => tokio::spawn(delay::run(millis(opts.ms), tick, token.clone())),
        ExecutionType::RunAt => tokio::spawn(delay::run(run_at_wait(opts), tick, token.clone())),
    };

    TaskHandle {
        cancel: token,
        join,
    }
}

fn millis(ms: Option<i64>) -> Duration {
    Duration::from_millis(ms.and_then(|ms| u64::try_from(ms).ok()).unwrap_or(0))
}

/// Wait for a RunAt task, recomputed from the instant so a restart still targets it.
fn run_at_wait(opts: &ScheduleOptions) -> Duration {
    match opts.run_at {
        Some(at) => {
            let zone = opts.time_zone.as_deref().and_then(parse_time_zone);
            millis(Some(run_at_delay_ms(at, zone, Utc::now())))
        }
        None => millis(opts.ms),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use tokio_util::task::TaskTracker;

    use crate::events::Bus;
    use crate::store::TaskStore;
    use crate::tasks::TaskValue;

    fn env() -> TickEnv {
        TickEnv {
            store: Arc::new(TaskStore::new()),
            bus: Bus::new(64),
            depth_limit: None,
            tracker: TaskTracker::new(),
        }
    }

    fn counting(builder: crate::ScheduleTaskBuilder, hits: &Arc<AtomicUsize>) -> ScheduleTask {
        let hits = hits.clone();
        builder.build(move |_ctx| {
            hits.fetch_add(1, Ordering::SeqCst);
            async { Ok(TaskValue::empty()) }
        })
    }

    #[test]
    fn test_millis_clamps_negative_and_missing() {
        assert_eq!(millis(None), Duration::ZERO);
        assert_eq!(millis(Some(-5)), Duration::ZERO);
        assert_eq!(millis(Some(250)), Duration::from_millis(250));
    }

    #[tokio::test(start_paused = true)]
    async fn test_delay_fires_once_and_disarms_itself() {
        let hits = Arc::new(AtomicUsize::new(0));
        let task = counting(ScheduleTask::delay("d", 20), &hits);
        let handle = arm(&task, 0, &env(), CancellationToken::new());
        assert!(handle.is_armed());

        tokio::time::sleep(Duration::from_millis(100)).await;
        assert_eq!(hits.load(Ordering::SeqCst), 1);
        assert!(!handle.is_armed());
    }

    #[tokio::test(start_paused = true)]
    async fn test_interval_repeats_until_disarmed() {
        let hits = Arc::new(AtomicUsize::new(0));
        let task = counting(ScheduleTask::interval("i", 10), &hits);
        let handle = arm(&task, 0, &env(), CancellationToken::new());

        tokio::time::sleep(Duration::from_millis(35)).await;
        assert_eq!(hits.load(Ordering::SeqCst), 3);

        handle.disarm();
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(hits.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_disarm_before_delay_elapses() {
        let hits = Arc::new(AtomicUsize::new(0));
        let task = counting(ScheduleTask::delay("d", 50), &hits);
        arm(&task, 0, &env(), CancellationToken::new()).disarm();

        tokio::time::sleep(Duration::from_millis(100)).await;
        assert_eq!(hits.load(Ordering::SeqCst), 0);
    }
}
