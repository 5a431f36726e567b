//! # Result Subscription Example
//!
//! Follows one task's results through its replaying subscription, then
//! restarts, stops and removes it.
//!
//! ## Run
//! ```bash
//! cargo run --example subscribe
//! ```

use std::{
    sync::Arc,
    sync::atomic::{AtomicU64, Ordering},
    time::Duration,
};

use cronvisor::{ScheduleTask, Scheduler, SchedulerConfig, TaskValue};
use futures::{StreamExt, stream};
use tracing_subscriber::EnvFilter;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .init();

    let sched = Scheduler::new(SchedulerConfig::default());
    let samples = Arc::new(AtomicU64::new(0));

    // Each tick returns a stream; only its first item becomes the result.
    let task = ScheduleTask::interval("sampler", 300).build(move |_ctx| {
        let n = samples.fetch_add(1, Ordering::Relaxed);
        async move {
            let readings = stream::iter((0..3).map(move |i| Ok(TaskValue::plain(n * 10 + i))));
            Ok(TaskValue::stream(readings))
        }
    });

    let mut watch = sched.subscribe("sampler").await;
    sched.add(task).await?;

    let mut seen = 0;
    while let Some(snap) = watch.next().await {
        match snap {
            None => println!("sampler: not registered yet"),
            Some(s) => match s.response_as::<u64>() {
                Some(v) => {
                    println!("sampler: reading {v}");
                    seen += 1;
                }
                None => println!("sampler: running={} no reading", s.running),
            },
        }
        if seen == 3 {
            break;
        }
    }

    // A late subscriber sees the latest reading right away.
    let late = sched.subscribe("sampler").await;
    println!("late subscriber replay: {:?}", late.latest().and_then(|s| s.response));

    sched.restart("sampler").await?;
    tokio::time::sleep(Duration::from_millis(700)).await;
    sched.stop("sampler").await?;
    println!("after stop: {:?}", sched.get("sampler").await.map(|s| (s.running, s.response)));

    sched.remove("sampler").await?;
    while watch.next().await.is_some() {}
    println!("sampler removed, subscription closed");
    Ok(())
}
