use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use chrono::Utc;
use cronvisor::{
    EventKind, ExecutionType, ScheduleOptions, ScheduleTask, ScheduleTaskBuilder, Scheduler,
    SchedulerConfig, SchedulerError, TaskValue, ValidationError, validate_task_at,
};
use tokio::sync::broadcast;

fn noop(builder: ScheduleTaskBuilder) -> ScheduleTask {
    builder.build(|_ctx| async { Ok(TaskValue::empty()) })
}

fn counting(builder: ScheduleTaskBuilder, hits: &Arc<AtomicUsize>) -> ScheduleTask {
    let hits = Arc::clone(hits);
    builder.build(move |_ctx| {
        hits.fetch_add(1, Ordering::SeqCst);
        async { Ok(TaskValue::empty()) }
    })
}

fn drain(rx: &mut broadcast::Receiver<cronvisor::Event>) -> Vec<(EventKind, String)> {
    let mut out = Vec::new();
    while let Ok(ev) = rx.try_recv() {
        out.push((ev.kind, ev.task.as_deref().unwrap_or_default().to_string()));
    }
    out
}

#[tokio::test]
async fn duplicate_name_is_rejected_and_first_task_keeps_running() {
    let sched = Scheduler::new(SchedulerConfig::default());
    sched.add(noop(ScheduleTask::interval("job", 1_000))).await.unwrap();

    let err = sched
        .add(noop(ScheduleTask::delay("job", 5)))
        .await
        .unwrap_err();
    assert_eq!(
        err,
        SchedulerError::Validation(ValidationError::DuplicateName { name: "job".into() })
    );

    let snap = sched.get("job").await.unwrap();
    assert_eq!(snap.kind, ExecutionType::Interval);
    assert!(snap.running);
    assert_eq!(sched.len().await, 1);
}

#[tokio::test]
async fn duplicate_priority_is_rejected() {
    let sched = Scheduler::new(SchedulerConfig::default());
    sched
        .add(noop(ScheduleTask::interval("a", 1_000).with_priority(3)))
        .await
        .unwrap();

    let err = sched
        .add(noop(ScheduleTask::interval("b", 1_000).with_priority(3)))
        .await
        .unwrap_err();
    assert_eq!(err.as_label(), "validation_duplicate_priority");

    // Negative priorities are cleared and never collide.
    sched
        .add([
            noop(ScheduleTask::interval("c", 1_000).with_priority(-1)),
            noop(ScheduleTask::interval("d", 1_000).with_priority(-1)),
        ])
        .await
        .unwrap();
    assert_eq!(sched.get("c").await.unwrap().options.priority, None);
}

#[tokio::test]
async fn run_at_boundary() {
    let sched = Scheduler::new(SchedulerConfig::default());

    let past = Utc::now() - chrono::Duration::seconds(1);
    let err = sched.add(noop(ScheduleTask::run_at("past", past))).await.unwrap_err();
    assert!(matches!(
        err,
        SchedulerError::Validation(ValidationError::PastRunAt { .. })
    ));
    assert!(!sched.exist("past").await);

    let future = Utc::now() + chrono::Duration::hours(1);
    sched.add(noop(ScheduleTask::run_at("future", future))).await.unwrap();
    let ms = sched.get("future").await.unwrap().options.ms.unwrap();
    assert!(ms > 3_500_000 && ms <= 3_600_000);

    let now = Utc::now();
    let opts = ScheduleOptions::run_at(now);
    assert!(validate_task_at(ExecutionType::RunAt, "now", &opts, std::iter::empty(), now).is_ok());
}

#[tokio::test]
async fn ms_must_be_present_and_non_negative() {
    let sched = Scheduler::new(SchedulerConfig::default());

    let missing = ScheduleTask::builder(ExecutionType::Delay, "missing");
    let err = sched.add(noop(missing)).await.unwrap_err();
    assert_eq!(err.to_string(), "Delay tasks require a valid ms");

    let err = sched.add(noop(ScheduleTask::interval("neg", -1))).await.unwrap_err();
    assert_eq!(err.to_string(), "Interval tasks require a valid ms");

    sched.add(noop(ScheduleTask::interval("zero", 0))).await.unwrap();
    assert!(sched.exist("zero").await);
}

#[tokio::test]
async fn invalid_cron_and_zone_are_rejected() {
    let sched = Scheduler::new(SchedulerConfig::default());

    let err = sched.add(noop(ScheduleTask::cron("c", "not a cron"))).await.unwrap_err();
    assert_eq!(err.as_label(), "validation_invalid_cron_time");

    let err = sched
        .add(noop(ScheduleTask::cron("c", "0 0 * * *").with_time_zone("Nowhere/Atlantis")))
        .await
        .unwrap_err();
    assert_eq!(err.as_label(), "validation_invalid_time_zone");

    sched
        .add(noop(ScheduleTask::cron("c", "0 0 * * *").with_time_zone("Europe/Berlin")))
        .await
        .unwrap();
}

#[tokio::test]
async fn bootstrap_starts_in_priority_order() {
    let sched = Scheduler::builder(SchedulerConfig::default())
        .with_tasks(vec![
            noop(ScheduleTask::interval("p2", 1_000).with_priority(2)),
            noop(ScheduleTask::interval("free-a", 1_000)),
            noop(ScheduleTask::interval("p0", 1_000).with_priority(0)),
            noop(ScheduleTask::interval("free-b", 1_000)),
            noop(ScheduleTask::interval("p1", 1_000).with_priority(1)),
        ])
        .build();
    let mut rx = sched.events();

    sched.bootstrap().await.unwrap();

    let started: Vec<String> = drain(&mut rx)
        .into_iter()
        .filter(|(kind, _)| *kind == EventKind::TaskStarted)
        .map(|(_, name)| name)
        .collect();
    assert_eq!(started, vec!["p0", "p1", "p2", "free-a", "free-b"]);

    // The table is consumed once.
    sched.bootstrap().await.unwrap();
    assert_eq!(sched.len().await, 5);
}

#[tokio::test]
async fn stop_twice_is_ok_and_start_rearms() {
    let sched = Scheduler::new(SchedulerConfig::default());
    sched.add(noop(ScheduleTask::interval("job", 1_000))).await.unwrap();

    sched.stop("job").await.unwrap();
    sched.stop("job").await.unwrap();
    assert!(!sched.get("job").await.unwrap().running);

    sched.start("job").await.unwrap();
    assert!(sched.get("job").await.unwrap().running);

    sched.restart(vec!["job"]).await.unwrap();
    assert!(sched.get("job").await.unwrap().running);
}

#[tokio::test]
async fn remove_unknown_name_fails_without_mutation() {
    let sched = Scheduler::new(SchedulerConfig::default());
    sched.add(noop(ScheduleTask::interval("keep", 1_000))).await.unwrap();

    let err = sched.remove(["keep", "ghost"]).await.unwrap_err();
    assert!(err.is_not_found());
    assert_eq!(err.to_string(), "task 'ghost' not found");
    assert!(sched.exist("keep").await);
    assert!(sched.get("keep").await.unwrap().running);

    sched.remove("keep").await.unwrap();
    assert!(sched.is_empty().await);
    assert!(sched.remove("keep").await.unwrap_err().is_not_found());
}

#[tokio::test]
async fn every_name_addressed_call_reports_not_found() {
    let sched = Scheduler::new(SchedulerConfig::default());
    assert!(sched.start("ghost").await.unwrap_err().is_not_found());
    assert!(sched.stop("ghost").await.unwrap_err().is_not_found());
    assert!(sched.restart("ghost").await.unwrap_err().is_not_found());
}

#[tokio::test(start_paused = true)]
async fn zero_delay_fires_exactly_once() {
    let hits = Arc::new(AtomicUsize::new(0));
    let sched = Scheduler::new(SchedulerConfig::default());
    sched.add(counting(ScheduleTask::delay("d1", 0), &hits)).await.unwrap();

    tokio::time::sleep(Duration::from_millis(10)).await;
    assert_eq!(hits.load(Ordering::SeqCst), 1);

    tokio::time::sleep(Duration::from_secs(5)).await;
    assert_eq!(hits.load(Ordering::SeqCst), 1);
    assert!(sched.exist("d1").await);
    assert!(!sched.get("d1").await.unwrap().running);
}

#[tokio::test(start_paused = true)]
async fn start_while_armed_replaces_the_pending_fire() {
    let hits = Arc::new(AtomicUsize::new(0));
    let sched = Scheduler::new(SchedulerConfig::default());
    sched.add(counting(ScheduleTask::delay("d1", 50), &hits)).await.unwrap();

    tokio::time::sleep(Duration::from_millis(20)).await;
    sched.start("d1").await.unwrap();

    tokio::time::sleep(Duration::from_millis(40)).await;
    assert_eq!(hits.load(Ordering::SeqCst), 0);

    tokio::time::sleep(Duration::from_millis(40)).await;
    assert_eq!(hits.load(Ordering::SeqCst), 1);

    tokio::time::sleep(Duration::from_secs(1)).await;
    assert_eq!(hits.load(Ordering::SeqCst), 1);
}

#[tokio::test(start_paused = true)]
async fn interval_ticks_until_stopped() {
    let hits = Arc::new(AtomicUsize::new(0));
    let sched = Scheduler::new(SchedulerConfig::default());
    sched.add(counting(ScheduleTask::interval("i", 100), &hits)).await.unwrap();

    tokio::time::sleep(Duration::from_millis(350)).await;
    assert_eq!(hits.load(Ordering::SeqCst), 3);

    sched.stop("i").await.unwrap();
    tokio::time::sleep(Duration::from_secs(1)).await;
    assert_eq!(hits.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn shutdown_reports_grace_exceeded() {
    let cfg = SchedulerConfig {
        grace: Duration::from_millis(20),
        ..SchedulerConfig::default()
    };
    let sched = Scheduler::new(cfg);
    sched
        .add(ScheduleTask::delay("slow", 0).build(|_ctx| async {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Ok(TaskValue::empty())
        }))
        .await
        .unwrap();
    tokio::time::sleep(Duration::from_millis(20)).await;

    let err = sched.shutdown().await.unwrap_err();
    assert_eq!(err.as_label(), "scheduler_grace_exceeded");
    assert!(matches!(err, SchedulerError::GraceExceeded { in_flight: 1, .. }));
}

#[tokio::test(start_paused = true)]
async fn tick_in_flight_across_remove_and_readd_is_discarded() {
    let sched = Scheduler::new(SchedulerConfig::default());
    sched
        .add(ScheduleTask::delay("t", 0).build(|_ctx| async {
            tokio::time::sleep(Duration::from_millis(100)).await;
            Ok(TaskValue::plain("old"))
        }))
        .await
        .unwrap();

    tokio::time::sleep(Duration::from_millis(10)).await;
    sched.remove("t").await.unwrap();
    sched
        .add(ScheduleTask::interval("t", 1_000).build(|_ctx| async { Ok(TaskValue::plain("new")) }))
        .await
        .unwrap();

    tokio::time::sleep(Duration::from_millis(200)).await;
    let snap = sched.get("t").await.unwrap();
    assert_eq!(snap.kind, ExecutionType::Interval);
    assert!(snap.response_as::<&str>().is_none());

    tokio::time::sleep(Duration::from_millis(1_000)).await;
    let snap = sched.get("t").await.unwrap();
    assert_eq!(snap.response_as::<&str>(), Some(&"new"));
}
