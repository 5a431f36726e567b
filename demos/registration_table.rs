//! # Registration Table Example
//!
//! Declares every task up front, hands the table to the builder and lets
//! `bootstrap` activate it in priority order.
//!
//! Part of the table is loaded from JSON, the way a host would read it from
//! its configuration; callbacks are then attached by name.
//!
//! ## Run
//! ```bash
//! RUST_LOG=cronvisor=debug cargo run --example registration_table
//! ```
//! Stop with Ctrl-C.

use std::{
    sync::Arc,
    sync::atomic::{AtomicU64, Ordering},
};

use cronvisor::{
    ExecutionError, ExecutionType, LogWriter, ScheduleOptions, ScheduleTask, Scheduler,
    SchedulerConfig, Subscribe, TaskValue,
};
use serde::Deserialize;
use tracing_subscriber::EnvFilter;

const TABLE: &str = r#"[
    { "type": "Interval", "name": "heartbeat", "options": { "ms": 2000, "priority": 0 } },
    { "type": "Cron", "name": "minutely", "options": { "cronTime": "* * * * *", "timeZone": "UTC" } },
    { "type": "Delay", "name": "warmup", "options": { "ms": 500, "priority": 1 } }
]"#;

#[derive(Deserialize)]
struct Entry {
    #[serde(rename = "type")]
    kind: ExecutionType,
    name: String,
    options: ScheduleOptions,
}

struct Cache {
    hits: AtomicU64,
}

fn callback_for(entry: Entry, cache: &Arc<Cache>) -> ScheduleTask {
    let builder = ScheduleTask::builder(entry.kind, entry.name.clone());
    let task = match entry.name.as_str() {
        "heartbeat" => builder.build(|_ctx| async { Ok(TaskValue::plain("alive")) }),
        "warmup" => builder.with_context(Arc::clone(cache)).build(|ctx| async move {
            let cache = ctx
                .as_ref()
                .and_then(|c| c.downcast_ref::<Cache>())
                .ok_or_else(|| ExecutionError::fail("cache missing"))?;
            let hits = cache.hits.fetch_add(1, Ordering::Relaxed) + 1;
            Ok(TaskValue::plain(hits))
        }),
        _ => builder.build(|_ctx| async {
            Ok(TaskValue::deferred(async { Ok(TaskValue::plain(chrono::Utc::now())) }))
        }),
    };
    task.with_options(entry.options)
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cache = Arc::new(Cache {
        hits: AtomicU64::new(0),
    });

    let entries: Vec<Entry> = serde_json::from_str(TABLE)?;
    let mut table: Vec<ScheduleTask> = entries.into_iter().map(|e| callback_for(e, &cache)).collect();

    table.push(
        ScheduleTask::run_at("launch", chrono::Utc::now() + chrono::Duration::seconds(3))
            .with_time_zone("Europe/Paris")
            .build(|_ctx| async { Ok(TaskValue::plain("launched")) }),
    );

    let subs: Vec<Arc<dyn Subscribe>> = vec![Arc::new(LogWriter::new())];
    let sched = Scheduler::builder(SchedulerConfig::default())
        .with_subscribers(subs)
        .with_tasks(table)
        .build();

    sched.bootstrap().await?;
    for snap in sched.list().await {
        println!("{:<10} {:<8} running={}", snap.name, snap.kind.as_str(), snap.running);
    }

    sched.run_until_shutdown().await?;
    Ok(())
}
